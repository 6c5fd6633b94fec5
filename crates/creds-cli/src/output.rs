//! Output formatting for fetched credentials

use creds_core::ClientCredentials;
use serde::Serialize;

/// Number of secret characters shown when masked
const VISIBLE_PREFIX: usize = 4;

#[derive(Serialize)]
struct CredentialOutput<'a> {
    username: &'a str,
    token: String,
}

/// Mask a secret, keeping a short prefix for recognition
pub fn mask(secret: &str) -> String {
    if secret.chars().count() <= VISIBLE_PREFIX * 2 {
        return "****".to_string();
    }

    let prefix: String = secret.chars().take(VISIBLE_PREFIX).collect();
    format!("{}...", prefix)
}

/// Render credentials as plain text or JSON
pub fn render(
    credentials: &ClientCredentials,
    show_token: bool,
    json: bool,
) -> Result<String, serde_json::Error> {
    let token = if show_token {
        credentials.secret.expose().to_string()
    } else {
        mask(credentials.secret.expose())
    };

    if json {
        serde_json::to_string_pretty(&CredentialOutput {
            username: &credentials.client_id,
            token,
        })
    } else {
        Ok(format!(
            "username: {}\ntoken:    {}",
            credentials.client_id, token
        ))
    }
}

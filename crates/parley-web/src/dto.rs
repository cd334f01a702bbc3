use serde::{Deserialize, Serialize};

/// Form body of `POST /token`.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

/// JSON body of `POST /signup`.
///
/// `hashed_password` keeps its wire name for existing clients but carries
/// the plaintext password; the server hashes it once.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub hashed_password: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

use serde::{Deserialize, Serialize};

/// JWT payload binding a user's email and role to an expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub email: String,   // user email
    #[serde(default)]
    pub role: String,    // user role, recorded but not interpreted here
    pub exp: usize,      // expires at (unix timestamp)
    #[serde(default)]
    pub iat: usize,      // issued at (unix timestamp)
    #[serde(default)]
    pub jti: String,     // random nonce, keeps tokens minted in the same second distinct
}

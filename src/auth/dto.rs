use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::auth::repo_types::User;

/// Form fields shared by register and login; absent fields are empty.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub address: String,
    pub phone_number: String,
    pub role: String,
}

impl UserForm {
    pub fn from_fields(mut fields: HashMap<String, String>) -> Self {
        let mut take = |key: &str| fields.remove(key).unwrap_or_default();
        Self {
            email: take("email"),
            password: take("password"),
            full_name: take("full_name"),
            address: take("address"),
            phone_number: take("phone_number"),
            role: take("role"),
        }
    }
}

/// Query parameters of the user lookup route. `id` wins over `email`.
#[derive(Debug, Clone, Default)]
pub struct LookupQuery {
    pub id: String,
    pub email: String,
}

impl LookupQuery {
    pub fn from_fields(mut fields: HashMap<String, String>) -> Self {
        Self {
            id: fields.remove("id").unwrap_or_default(),
            email: fields.remove("email").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub role: String,
}

/// Always serializes as `""`; it has nowhere to hold a digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Redacted;

impl Serialize for Redacted {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("")
    }
}

/// User record handed to clients and sibling services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub email: String,
    pub password: Redacted,
    pub full_name: String,
    pub address: String,
    pub phone_number: String,
    pub role: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            password: Redacted,
            full_name: user.full_name,
            address: user.address,
            phone_number: user.phone_number,
            role: user.role,
        }
    }
}

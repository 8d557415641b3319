use sqlx::FromRow;

use crate::auth::{
    dto::UserForm,
    password::{self, CredentialError},
};

/// User row in `account_user`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,        // PHC / bcrypt digest, never plaintext
    pub full_name: String,
    pub address: String,
    pub phone_number: String,
    pub role: String,
}

/// Session row in `account_usersession`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Session {
    pub id: i32,
    pub token: String,
    #[sqlx(rename = "account_user_id")]
    pub user_id: i32,
}

/// A session joined with its owning user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SessionRecord {
    pub session_id: i32,
    pub token: String,
    #[sqlx(flatten)]
    pub user: User,
}

/// Which key a user is looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserKey<'a> {
    Id(i32),
    Email(&'a str),
}

/// A user ready for insertion. Can only be built by hashing the password,
/// so the store never sees plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    email: String,
    password_hash: String,
    full_name: String,
    address: String,
    phone_number: String,
    role: String,
}

impl NewUser {
    pub async fn hash(form: UserForm) -> Result<Self, CredentialError> {
        let password_hash = password::hash_password_blocking(form.password).await?;
        Ok(Self {
            email: form.email,
            password_hash,
            full_name: form.full_name,
            address: form.address,
            phone_number: form.phone_number,
            role: form.role,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub(crate) fn into_user(self, id: i32) -> User {
        User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            full_name: self.full_name,
            address: self.address,
            phone_number: self.phone_number,
            role: self.role,
        }
    }
}

use axum::extract::FromRef;
use tracing::{error, info, warn};

use crate::{
    auth::{
        dto::{LookupQuery, PublicUser, UserForm},
        errors::AccountError,
        form::{self, FormKind},
        jwt::JwtKeys,
        password::{self, CredentialError, Verification},
        repo::StoreError,
        repo_types::{NewUser, User, UserKey},
    },
    state::AppState,
};

/// A successful login: the fresh token and the user it was minted for.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: String,
    pub user: User,
}

pub async fn register(st: &AppState, form: UserForm) -> Result<User, AccountError> {
    form::validate(&form, FormKind::Register).map_err(AccountError::Validation)?;

    let new_user = NewUser::hash(form).await?;
    let user = st.accounts.create_user(new_user).await.map_err(|e| match e {
        StoreError::DuplicateEmail => AccountError::DuplicateEmail,
        other => AccountError::Storage(other),
    })?;

    info!(user_id = user.id, "user registered");
    Ok(user)
}

/// Checks credentials, mints a token and makes it the user's only session.
pub async fn login(st: &AppState, form: UserForm) -> Result<LoginSession, AccountError> {
    form::validate(&form, FormKind::Login).map_err(AccountError::Validation)?;

    let user = match st.accounts.get_user(UserKey::Email(&form.email)).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            warn!("login for unknown email");
            return Err(AccountError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    match password::verify_password_blocking(user.password_hash.clone(), form.password).await {
        Ok(Verification::Match) => {}
        Ok(Verification::Mismatch) => {
            warn!(user_id = user.id, "login with wrong password");
            return Err(AccountError::InvalidCredentials);
        }
        Err(CredentialError::MalformedDigest) => {
            error!(user_id = user.id, "stored password digest is malformed");
            return Err(AccountError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    }

    let keys = JwtKeys::from_ref(st);
    let token = keys.mint(&user.email, &user.role)?;
    st.accounts.create_session(user.id, &token).await?;

    info!(user_id = user.id, "user logged in");
    Ok(LoginSession { token, user })
}

/// Exchanges a token for its user. The token must verify cryptographically
/// and still be the user's stored session.
pub async fn authorize(st: &AppState, token: &str) -> Result<PublicUser, AccountError> {
    if form::is_blank(token) {
        return Err(AccountError::MissingToken);
    }

    let keys = JwtKeys::from_ref(st);
    let claims = keys.verify(token).map_err(|e| {
        warn!(reason = %e, "token failed verification");
        AccountError::InvalidToken
    })?;

    // a valid signature for a user that no longer exists is a server-side problem
    let user = st.accounts.get_user(UserKey::Email(&claims.email)).await?;

    if st.accounts.get_session(token, user.id).await?.is_none() {
        warn!(user_id = user.id, "token has no live session");
        return Err(AccountError::InvalidToken);
    }

    info!(user_id = user.id, "token authorized");
    Ok(PublicUser::from(user))
}

/// Drops the session holding `token`. The signature is not checked, so a
/// session can be evicted even after the secret has rotated.
pub async fn logout(st: &AppState, token: &str) -> Result<(), AccountError> {
    if form::is_blank(token) {
        return Err(AccountError::MissingToken);
    }
    st.accounts.delete_session(token).await?;

    info!("user logged out");
    Ok(())
}

pub async fn lookup(st: &AppState, query: LookupQuery) -> Result<PublicUser, AccountError> {
    let user = if !form::is_blank(&query.id) {
        let id = query.id.trim().parse::<i32>().map_err(AccountError::InvalidUserId)?;
        // id 0 is the store's "by email" sentinel; no email travels with it
        let key = if id == 0 {
            UserKey::Email("")
        } else {
            UserKey::Id(id)
        };
        st.accounts.get_user(key).await?
    } else if !form::is_blank(&query.email) {
        st.accounts.get_user(UserKey::Email(&query.email)).await?
    } else {
        return Err(AccountError::MissingLookupKey);
    };

    Ok(PublicUser::from(user))
}

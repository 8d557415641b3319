use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;

use crate::auth::{
    repo::{AccountStore, StoreError},
    repo_types::{NewUser, Session, SessionRecord, User, UserKey},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<Session>,
    next_user_id: i32,
    next_session_id: i32,
}

/// `AccountStore` over in-process vectors. Enforces the same unique and
/// cascade rules as the Postgres schema.
#[derive(Default)]
pub struct MemoryAccountStore {
    tables: Mutex<Tables>,
    broken: AtomicBool,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with a database error.
    pub fn break_storage(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn sessions_for(&self, user_id: i32) -> Vec<Session> {
        self.lock()
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn delete_user(&self, id: i32) {
        let mut tables = self.lock();
        tables.users.retain(|u| u.id != id);
        tables.sessions.retain(|s| s.user_id != id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.check()?;
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.email == user.email()) {
            return Err(StoreError::DuplicateEmail);
        }
        tables.next_user_id += 1;
        let user = user.into_user(tables.next_user_id);
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, key: UserKey<'_>) -> Result<User, StoreError> {
        self.check()?;
        let tables = self.lock();
        tables
            .users
            .iter()
            .find(|u| match key {
                UserKey::Id(id) => u.id == id,
                UserKey::Email(email) => u.email == email,
            })
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_session(&self, user_id: i32, token: &str) -> Result<Session, StoreError> {
        self.check()?;
        let mut tables = self.lock();
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::Database(sqlx::Error::Protocol(
                "foreign key violation on account_usersession".into(),
            )));
        }
        if tables
            .sessions
            .iter()
            .any(|s| s.token == token && s.user_id != user_id)
        {
            return Err(StoreError::Database(sqlx::Error::Protocol(
                "duplicate key value violates unique constraint \"account_usersession_token_key\""
                    .into(),
            )));
        }
        tables.sessions.retain(|s| s.user_id != user_id);
        tables.next_session_id += 1;
        let session = Session {
            id: tables.next_session_id,
            token: token.to_owned(),
            user_id,
        };
        tables.sessions.push(session.clone());
        Ok(session)
    }

    async fn get_session(
        &self,
        token: &str,
        user_id: i32,
    ) -> Result<Option<SessionRecord>, StoreError> {
        self.check()?;
        let tables = self.lock();
        let Some(session) = tables
            .sessions
            .iter()
            .find(|s| s.token == token && s.user_id == user_id)
        else {
            return Ok(None);
        };
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|user| SessionRecord {
                session_id: session.id,
                token: session.token.clone(),
                user: user.clone(),
            }))
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        self.check()?;
        self.lock().sessions.retain(|s| s.token != token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::dto::UserForm;

    async fn add_user(store: &MemoryAccountStore, email: &str) -> User {
        let form = UserForm {
            email: email.into(),
            password: "x".into(),
            full_name: "A".into(),
            address: "A".into(),
            phone_number: "0".into(),
            role: "user".into(),
        };
        store
            .create_user(NewUser::hash(form).await.unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn rejected_session_leaves_the_old_one_in_place() {
        let store = MemoryAccountStore::new();
        let alice = add_user(&store, "a@b.c").await;
        let bob = add_user(&store, "d@e.f").await;
        store.create_session(alice.id, "shared").await.unwrap();
        let kept = store.create_session(bob.id, "bob-token").await.unwrap();

        let err = store.create_session(bob.id, "shared").await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
        assert_eq!(store.sessions_for(bob.id), vec![kept]);
        assert_eq!(store.sessions_for(alice.id).len(), 1);
    }

    #[tokio::test]
    async fn reusing_own_token_replaces_the_row() {
        let store = MemoryAccountStore::new();
        let user = add_user(&store, "a@b.c").await;
        let first = store.create_session(user.id, "same").await.unwrap();
        let second = store.create_session(user.id, "same").await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(store.sessions_for(user.id), vec![second]);
    }
}

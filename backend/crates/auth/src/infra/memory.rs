//! In-Memory User Store
//!
//! Keyed by user name; email uniqueness is checked on insert. Used by the
//! test suite and for running the API without a database.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_name::UserName, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserName, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the blocked flag (administrative action, not exposed over HTTP)
    pub async fn set_blocked(&self, user_name: &UserName, blocked: bool) -> bool {
        match self.users.write().await.get_mut(user_name) {
            Some(user) => {
                user.is_blocked = blocked;
                true
            }
            None => false,
        }
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(user_name).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.user_name) || users.values().any(|u| u.email == user.email) {
            return Err(AuthError::UserAlreadyExists);
        }
        users.insert(user.user_name.clone(), user.clone());
        Ok(())
    }

    async fn update_verification(&self, email: &Email) -> AuthResult<bool> {
        let mut users = self.users.write().await;
        match users.values_mut().find(|u| &u.email == email) {
            Some(user) => {
                user.is_verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_password(&self, email: &Email, password: &UserPassword) -> AuthResult<bool> {
        let mut users = self.users.write().await;
        match users.values_mut().find(|u| &u.email == email) {
            Some(user) => {
                user.password_hash = password.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

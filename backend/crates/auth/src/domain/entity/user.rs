//! User Entity
//!
//! Registration state machine: created `pending` (unverified), flipped to
//! verified by the registration link. Blocking is an administrative flag
//! checked on every authenticated request.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    UserId, email::Email, phone_number::PhoneNumber, user_name::UserName,
    user_password::UserPassword, user_role::UserRole,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub user_name: UserName,
    pub email: Email,
    pub phone_number: PhoneNumber,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: UserPassword,
    pub user_role: UserRole,
    pub is_blocked: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied at registration
#[derive(Debug)]
pub struct NewUser {
    pub user_name: UserName,
    pub email: Email,
    pub phone_number: PhoneNumber,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: UserPassword,
}

impl User {
    /// Create a new, unverified user with the default role
    pub fn new(fields: NewUser) -> Self {
        Self {
            user_id: UserId::new(),
            user_name: fields.user_name,
            email: fields.email,
            phone_number: fields.phone_number,
            first_name: fields.first_name,
            last_name: fields.last_name,
            password_hash: fields.password_hash,
            user_role: UserRole::default(),
            is_blocked: false,
            is_verified: false,
            created_at: Utc::now(),
        }
    }
}

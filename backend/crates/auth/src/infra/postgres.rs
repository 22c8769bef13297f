//! PostgreSQL User Store

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    UserId, email::Email, phone_number::PhoneNumber, user_name::UserName,
    user_password::UserPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

const UNIQUE_VIOLATION: &str = "23505";

const SELECT_USER: &str = r#"
    SELECT
        user_id,
        user_name,
        email,
        phone_number,
        first_name,
        last_name,
        password_hash,
        user_role,
        is_blocked,
        is_verified,
        created_at
    FROM users
"#;

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, filter: &str, value: &str) -> AuthResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE {filter} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }
}

impl UserRepository for PgUserRepository {
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        self.find_one("user_name", user_name.as_str()).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        self.find_one("email", email.as_str()).await
    }

    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                user_name,
                email,
                phone_number,
                first_name,
                last_name,
                password_hash,
                user_role,
                is_blocked,
                is_verified,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.phone_number.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.password_hash.as_str())
        .bind(user.user_role.code())
        .bind(user.is_blocked)
        .bind(user.is_verified)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UserAlreadyExists
            } else {
                AuthError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn update_verification(&self, email: &Email) -> AuthResult<bool> {
        let updated = sqlx::query("UPDATE users SET is_verified = TRUE WHERE email = $1")
            .bind(email.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }

    async fn update_password(&self, email: &Email, password: &UserPassword) -> AuthResult<bool> {
        let updated = sqlx::query("UPDATE users SET password_hash = $2 WHERE email = $1")
            .bind(email.as_str())
            .bind(password.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    email: String,
    phone_number: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    user_role: String,
    is_blocked: bool,
    is_verified: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let user_role = UserRole::from_code(&self.user_role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user_role: {}", self.user_role)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_db(self.user_name),
            email: Email::from_db(self.email),
            phone_number: PhoneNumber::from_db(self.phone_number),
            first_name: self.first_name,
            last_name: self.last_name,
            password_hash: UserPassword::from_db(self.password_hash)?,
            user_role,
            is_blocked: self.is_blocked,
            is_verified: self.is_verified,
            created_at: self.created_at,
        })
    }
}

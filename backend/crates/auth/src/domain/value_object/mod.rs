//! Value Object Module

pub mod email;
pub mod phone_number;
pub mod user_name;
pub mod user_password;
pub mod user_role;

pub use kernel::id::UserId;

//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64, CSRF token material)
//! - Signed, time-limited token codec
//! - Password hashing (Argon2id)
//! - Cookie management
//! - Client identification (IP, device fingerprint)

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod signed;

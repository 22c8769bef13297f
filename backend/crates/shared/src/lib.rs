//! Shared Kernel - Domain-crossing minimal core
//!
//! The vocabulary every backend crate agrees on:
//! - Unified error type ([`error::app_error::AppError`]) and its classification
//! - Typed identifiers for persisted entities
//!
//! Only things that are hard to change and mean the same in every domain
//! belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;

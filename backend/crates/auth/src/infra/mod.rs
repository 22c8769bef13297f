//! Infrastructure Layer
//!
//! User stores and mail senders.

pub mod mail;
pub mod memory;
pub mod postgres;

pub use mail::{LogMailSender, SmtpMailSender, SmtpSettings};
pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

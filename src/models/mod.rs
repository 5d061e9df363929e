//! Typed read-only views over decoded API payloads.

pub mod user;
pub use user::User;

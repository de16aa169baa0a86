//! Request guards.
//!
//! - [`auth::ReseedAuth`] -- Gates the destructive reseed endpoint in production.

pub mod auth;

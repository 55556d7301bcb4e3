//! Session management for authenticated users.
//!
//! This module provides a trait-based session storage system with a backend
//! on top of the document store. Other backends can implement
//! [`SessionStore`] directly.

mod document;
mod store;

pub use document::{DocumentSessionStore, SESSIONS_COLLECTION};
pub use store::{Session, SessionManager, SessionStore};

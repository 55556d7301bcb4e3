//! # authstore - persistence and throttling for credential issuance
//!
//! The stateful core behind a username/password and passwordless login flow.
//! Routing, templates and email delivery live in the consuming application;
//! this crate provides what they call into.
//!
//! ## Features
//!
//! - **Document Store**: one JSON file per record under `root/{collection}/{key}.json`,
//!   atomic replace on write, per-collection locking
//! - **Rate Limiting**: sliding window per (subject, endpoint) with timed lockout
//!   and background eviction of stale keys
//! - **Sessions**: trait-based session storage with a document-store backend
//! - **Cookies**: session cookie construction that never forces `Secure` over plain HTTP
//! - **Credentials**: password strength policy and one-time code generation
//!
//! ## Quick Start
//!
//! ```rust
//! use authstore::store::{Store, StoreOptions};
//! use authstore::rate_limit::{RateLimiter, RateLimiterConfig};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = Store::open(dir.path(), StoreOptions::default()).unwrap();
//! let limiter = RateLimiter::new(RateLimiterConfig::default());
//!
//! let decision = limiter.check("203.0.113.7", "login");
//! if decision.allowed {
//!     store.write("users", "alice", &serde_json::json!({ "email": "alice@example.com" })).unwrap();
//! }
//!
//! limiter.stop();
//! ```

pub mod code;
pub mod error;
pub mod session;
pub mod store;
pub mod validation;

#[cfg(feature = "cookie")]
pub mod cookie;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports for convenience
pub use code::{generate_code, generate_session_token, CodeFormat};
pub use error::{AuthError, AuthResult};
pub use session::{DocumentSessionStore, Session, SessionManager, SessionStore};
pub use store::{Store, StoreOptions};
pub use validation::{validate_password_strength, PasswordPolicy};

#[cfg(feature = "cookie")]
pub use cookie::{Cookie, CookieCodec, CookieConfig, SameSite};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{RateLimitDecision, RateLimiter, RateLimiterConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum collection or key length in bytes (keeps file names portable)
pub const MAX_IDENTIFIER_LENGTH: usize = 200;

/// Random bytes in a session token (32 bytes = 256 bits)
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Default session and cookie lifetime in seconds (2 hours)
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7200;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::code::{generate_code, CodeFormat};
    pub use crate::error::{AuthError, AuthResult};
    pub use crate::session::{DocumentSessionStore, Session, SessionManager, SessionStore};
    pub use crate::store::{Store, StoreOptions};
    pub use crate::validation::{validate_password_strength, PasswordPolicy};

    #[cfg(feature = "cookie")]
    pub use crate::cookie::{CookieCodec, CookieConfig};

    #[cfg(feature = "rate-limit")]
    pub use crate::rate_limit::{RateLimitDecision, RateLimiter, RateLimiterConfig};
}

//! Session store example
//!
//! Walks through a login: rate limit check, password policy, session
//! issuance, cookie handling and logout, with sessions persisted in the
//! document store.
//!
//! Run with: cargo run --example with_session_store

use std::sync::Arc;

use authstore::cookie::{CookieCodec, CookieConfig};
use authstore::rate_limit::{RateLimiter, RateLimiterConfig};
use authstore::session::{DocumentSessionStore, SessionManager};
use authstore::store::{Store, StoreOptions};
use authstore::validation::{validate_password_strength, PasswordPolicy};
use http::header::COOKIE;
use http::{HeaderMap, HeaderValue};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Setup
    let dir = tempfile::tempdir()?;
    let store = Arc::new(Store::open(dir.path(), StoreOptions::default())?);
    let limiter = RateLimiter::new(RateLimiterConfig::default().with_max_attempts(3));
    let cookies = CookieCodec::new(CookieConfig::default().with_secure(true));
    let policy = PasswordPolicy::strict();

    // Create session manager with auto-extend enabled
    let sessions = SessionManager::new(DocumentSessionStore::new(Arc::clone(&store)))
        .with_auto_extend(true, 3600); // Extend by 1 hour on each access

    println!("=== Session Management Example ===\n");

    println!("1. Registration");
    for candidate in ["password", "Correct-Horse-Battery-9"] {
        match validate_password_strength(candidate, Some(&policy)) {
            Ok(()) => println!("   [OK] {candidate:?} accepted"),
            Err(e) => println!("   [FAIL] {candidate:?} rejected: {e}"),
        }
    }

    println!();
    println!("2. User Login");
    let decision = limiter.check("198.51.100.4", "login");
    if !decision.allowed {
        println!("   [FAIL] Rate limited, retry in {}s", decision.retry_after_secs());
        return Ok(());
    }

    let (session, token) = sessions.create_session("user-1", Some("user@example.com".into()))?;
    println!("   [OK] Session created");
    println!("      Expires in: {} seconds", session.remaining_seconds());

    // Plain HTTP request: the cookie is not marked Secure
    let set_cookie = cookies.set(false, &token);
    println!("      Set-Cookie: {}", set_cookie.name);

    println!();
    println!("3. Subsequent Request");
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("{}={}", set_cookie.name, set_cookie.value))?,
    );
    let presented = cookies.get(&headers);

    match sessions.validate(&presented) {
        Ok(session) => println!("   [OK] Session valid for: {}", session.user_id),
        Err(e) => println!("   [FAIL] Session invalid: {e}"),
    }

    println!();
    println!("4. Another Device");
    sessions.create_session("user-1", None)?;
    let user_sessions = sessions.get_user_sessions("user-1")?;
    println!("   Now has {} sessions", user_sessions.len());

    println!();
    println!("5. Logout (invalidate first session)");
    sessions.invalidate(&presented)?;
    println!("   [OK] Cookie cleared: {}", cookies.remove(false));

    println!();
    println!("6. Logout All Devices");
    let deleted = sessions.invalidate_all_for_user("user-1")?;
    println!("   [OK] Deleted {deleted} session(s)");

    println!();
    println!("7. Session Cleanup");
    // In production, run this periodically (e.g., every hour)
    let cleaned = sessions.cleanup()?;
    println!("   Cleaned up {cleaned} expired session(s)");

    limiter.stop();

    println!();
    println!("=== Example Complete ===");

    Ok(())
}

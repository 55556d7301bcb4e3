//! Document store example
//!
//! Persists user records, issues a one-time login code and shows how the
//! store reports missing and corrupt documents.
//!
//! Run with: cargo run --example document_store

use authstore::code::{generate_code, verify_code, CodeFormat};
use authstore::{AuthError, Store, StoreOptions};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize)]
struct User {
    email: String,
    verified: bool,
    pending_code: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let store = Store::open(dir.path(), StoreOptions::default())?;

    println!("=== Document Store Example ===\n");

    // Passwordless login: hardened codes only when rate limiting is off
    let format = CodeFormat::for_rate_limiting(true);
    let code = generate_code(format);

    let user = User {
        email: "alice@example.com".to_string(),
        verified: false,
        pending_code: Some(code.clone()),
    };
    store.write("users", "alice", &user)?;
    println!("[OK] Stored user, login code {code}");

    let typed = code.to_lowercase();
    let loaded: User = store.read("users", "alice")?;
    let expected = loaded.pending_code.as_deref().unwrap_or_default();
    if verify_code(format, expected, &typed) {
        store.update("users", "alice", |u: &mut User| {
            u.verified = true;
            u.pending_code = None;
        })?;
        println!("[OK] Code accepted, user verified");
    }

    match store.read::<User>("users", "bob") {
        Err(AuthError::NotFound) => println!("[OK] bob is not registered yet"),
        other => println!("[??] unexpected: {other:?}"),
    }

    let all: Vec<User> = store.read_all("users")?;
    println!("[OK] {} user(s) on disk under {}", all.len(), store.root().display());

    store.delete("users", "")?;
    println!("[OK] Collection removed");

    println!();
    println!("=== Example Complete ===");

    Ok(())
}

//! Session cookie construction and extraction.
//!
//! One cookie carries the opaque session token. `Secure` is only emitted when
//! the configuration asks for it and the current request arrived over TLS, so
//! plain-HTTP local development keeps working.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use http::header::{InvalidHeaderValue, COOKIE};
use http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::DEFAULT_SESSION_TTL_SECS;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "auth_session";

/// Value written when clearing the cookie.
pub const REMOVED_COOKIE_VALUE: &str = "deleted";

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => f.write_str("Strict"),
            SameSite::Lax => f.write_str("Lax"),
            SameSite::None => f.write_str("None"),
        }
    }
}

/// Cookie settings. Unset fields fall back to the defaults noted on each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Request the `Secure` attribute (only honored over TLS)
    pub secure: bool,

    /// `SameSite` attribute (default: Lax)
    pub same_site: Option<SameSite>,

    /// Cookie path (default: "/")
    pub path: Option<String>,

    /// Lifetime of the cookie (default: 2 hours)
    pub max_age: Option<Duration>,
}

impl CookieConfig {
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }
}

/// A `Set-Cookie` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    /// Seconds; negative means "delete now"
    pub max_age: i64,
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl Cookie {
    /// Whether the browser should drop this cookie immediately.
    pub fn is_expired(&self) -> bool {
        self.max_age < 0 || self.expires.is_some_and(|at| at <= Utc::now())
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.to_string())
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}; Path={}", self.name, self.value, self.path)?;
        if let Some(expires) = self.expires {
            write!(f, "; Expires={}", expires.format("%a, %d %b %Y %H:%M:%S GMT"))?;
        }
        // Max-Age=0 is the wire form of "delete now"
        write!(f, "; Max-Age={}", self.max_age.max(0))?;
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        write!(f, "; SameSite={}", self.same_site)
    }
}

/// Builds and reads the session cookie.
///
/// # Example
///
/// ```rust
/// use authstore::cookie::{CookieCodec, CookieConfig};
///
/// let codec = CookieCodec::new(CookieConfig::default().with_secure(true));
///
/// assert!(!codec.set(false, "token").secure);
/// assert!(codec.set(true, "token").secure);
/// assert!(codec.remove(true).is_expired());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CookieCodec {
    config: CookieConfig,
}

impl CookieCodec {
    pub fn new(config: CookieConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// Session cookie carrying `token`.
    pub fn set(&self, request_is_tls: bool, token: &str) -> Cookie {
        let max_age = self
            .config
            .max_age
            .map(|age| i64::try_from(age.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);
        self.build(request_is_tls, token, max_age, None)
    }

    /// Cookie that clears the session cookie in the browser.
    ///
    /// Path, `SameSite` and `Secure` resolve exactly as in [`CookieCodec::set`]
    /// so the browser matches it against the original.
    pub fn remove(&self, request_is_tls: bool) -> Cookie {
        self.build(
            request_is_tls,
            REMOVED_COOKIE_VALUE,
            -1,
            Some(DateTime::<Utc>::UNIX_EPOCH),
        )
    }

    /// Session token from the request's `Cookie` headers, or an empty string.
    pub fn get(&self, headers: &HeaderMap) -> String {
        for header in headers.get_all(COOKIE) {
            let value = match header.to_str() {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unreadable Cookie header");
                    continue;
                }
            };
            for pair in value.split(';') {
                let Some((name, val)) = pair.trim().split_once('=') else {
                    continue;
                };
                if name.trim() == SESSION_COOKIE_NAME {
                    return val.trim().trim_matches('"').to_string();
                }
            }
        }
        String::new()
    }

    fn build(
        &self,
        request_is_tls: bool,
        value: &str,
        max_age: i64,
        expires: Option<DateTime<Utc>>,
    ) -> Cookie {
        Cookie {
            name: SESSION_COOKIE_NAME.to_string(),
            value: value.to_string(),
            path: self.config.path.clone().unwrap_or_else(|| "/".to_string()),
            max_age,
            expires,
            secure: self.config.secure && request_is_tls,
            http_only: true,
            same_site: self.config.same_site.unwrap_or_default(),
        }
    }
}

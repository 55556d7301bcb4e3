//! One-time codes and session tokens.
//!
//! Codes are typed by people, so the normal format trades entropy for
//! readability. The hardened format is for deployments that run without the
//! rate limiter, where an attacker could otherwise walk the whole code space.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, Rng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{AuthError, AuthResult};
use crate::SESSION_TOKEN_BYTES;

/// Consonants only: no vowels (no accidental words) and nothing easily misread.
const NORMAL_ALPHABET: &[u8] = b"BCDFGHJKLMNPQRSTVWXZ";
const NORMAL_LENGTH: usize = 8;

/// Mixed case and digits without I, O, l, o, 0 or 1.
const HARDENED_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";
const HARDENED_LENGTH: usize = 12;

/// Alphabet and length of a one-time code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeFormat {
    alphabet: &'static [u8],
    length: usize,
    case_sensitive: bool,
}

impl CodeFormat {
    /// 8 characters from a 20-symbol, upper-case consonant alphabet.
    pub const NORMAL: CodeFormat = CodeFormat {
        alphabet: NORMAL_ALPHABET,
        length: NORMAL_LENGTH,
        case_sensitive: false,
    };

    /// 12 characters from a mixed-case alphanumeric alphabet.
    pub const HARDENED: CodeFormat = CodeFormat {
        alphabet: HARDENED_ALPHABET,
        length: HARDENED_LENGTH,
        case_sensitive: true,
    };

    /// Pick the format for a deployment: hardened only when rate limiting is off.
    pub fn for_rate_limiting(enabled: bool) -> Self {
        if enabled {
            Self::NORMAL
        } else {
            Self::HARDENED
        }
    }

    pub fn alphabet(&self) -> &'static [u8] {
        self.alphabet
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Canonical form of user input: whitespace and dashes dropped, and
    /// upper-cased when the format is case-insensitive.
    pub fn normalize(&self, input: &str) -> String {
        input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .map(|c| {
                if self.case_sensitive {
                    c
                } else {
                    c.to_ascii_uppercase()
                }
            })
            .collect()
    }

    /// Whether `code` could have been produced by this format.
    pub fn is_well_formed(&self, code: &str) -> bool {
        code.len() == self.length && code.bytes().all(|b| self.alphabet.contains(&b))
    }
}

/// Generate a one-time code using the OS random source.
pub fn generate_code(format: CodeFormat) -> String {
    generate_code_with_rng(&mut OsRng, format)
}

fn generate_code_with_rng<R: RngCore + ?Sized>(rng: &mut R, format: CodeFormat) -> String {
    (0..format.length)
        .map(|_| format.alphabet[rng.gen_range(0..format.alphabet.len())] as char)
        .collect()
}

/// Compare a stored code with user input in constant time.
pub fn verify_code(format: CodeFormat, expected: &str, provided: &str) -> bool {
    let provided = format.normalize(provided);
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

/// Create a new bearer token for the session cookie.
pub fn generate_session_token() -> AuthResult<String> {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Internal(format!("Failed to generate session token: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session token so raw values never touch disk.
///
/// The result is base64url, so it is usable directly as a store key.
pub fn hash_session_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

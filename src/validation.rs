//! Input validation: store identifiers and password strength.

use serde::{Deserialize, Serialize};
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::error::{AuthError, AuthResult};
use crate::MAX_IDENTIFIER_LENGTH;

/// Passwords rejected outright when `forbid_common` is set.
const COMMON_PASSWORDS: &[&str] = &[
    "123456",
    "12345678",
    "123456789",
    "1234567890",
    "password",
    "password1",
    "password123",
    "qwerty",
    "qwerty123",
    "abc123",
    "letmein",
    "welcome",
    "admin",
    "iloveyou",
    "monkey",
    "dragon",
    "football",
    "baseball",
    "sunshine",
    "princess",
    "111111",
    "000000",
];

/// Validate a collection name.
///
/// Collection names become directory names, so they must be non-empty and
/// must not reach outside the store root.
pub fn validate_collection(collection: &str) -> AuthResult<()> {
    if collection.is_empty() {
        return Err(AuthError::MissingCollection);
    }
    validate_path_component("collection", collection)
}

/// Validate a resource key.
pub fn validate_key(key: &str) -> AuthResult<()> {
    if key.is_empty() {
        return Err(AuthError::MissingResource);
    }
    validate_path_component("key", key)
}

fn validate_path_component(kind: &str, value: &str) -> AuthResult<()> {
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(AuthError::InvalidIdentifier(format!(
            "{} exceeds maximum length of {} bytes",
            kind, MAX_IDENTIFIER_LENGTH
        )));
    }

    if value == "." || value == ".." {
        return Err(AuthError::InvalidIdentifier(format!(
            "{} cannot be '{}'",
            kind, value
        )));
    }

    if value.chars().any(|c| c == '/' || c == '\\' || c == '\0') {
        return Err(AuthError::InvalidIdentifier(format!(
            "{} contains a path separator or NUL byte",
            kind
        )));
    }

    Ok(())
}

/// Password rules checked during registration and password change.
///
/// A zero `min_length` and all flags off accepts every password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    /// Minimum length in characters
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    /// Require at least one punctuation or symbol character
    pub require_special: bool,
    /// Reject well-known passwords (exact, case-insensitive match)
    pub forbid_common: bool,
}

impl PasswordPolicy {
    /// Policy with every rule enabled and a 12 character minimum.
    pub fn strict() -> Self {
        Self {
            min_length: 12,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
            forbid_common: true,
        }
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }

    pub fn with_uppercase(mut self, required: bool) -> Self {
        self.require_uppercase = required;
        self
    }

    pub fn with_lowercase(mut self, required: bool) -> Self {
        self.require_lowercase = required;
        self
    }

    pub fn with_digit(mut self, required: bool) -> Self {
        self.require_digit = required;
        self
    }

    pub fn with_special(mut self, required: bool) -> Self {
        self.require_special = required;
        self
    }

    pub fn with_forbid_common(mut self, forbid: bool) -> Self {
        self.forbid_common = forbid;
        self
    }
}

/// Check `password` against `policy`.
///
/// No policy means every password is accepted. Otherwise rules are checked in
/// order (length, character classes, common-password list) and the first
/// violation is returned as [`AuthError::WeakPassword`].
///
/// # Examples
///
/// ```rust
/// use authstore::validation::{validate_password_strength, PasswordPolicy};
///
/// let policy = PasswordPolicy::default().with_min_length(8);
///
/// assert!(validate_password_strength("long enough", Some(&policy)).is_ok());
/// assert!(validate_password_strength("short", Some(&policy)).is_err());
/// assert!(validate_password_strength("x", None).is_ok());
/// ```
pub fn validate_password_strength(password: &str, policy: Option<&PasswordPolicy>) -> AuthResult<()> {
    let Some(policy) = policy else {
        return Ok(());
    };

    if password.chars().count() < policy.min_length {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {} characters long",
            policy.min_length
        )));
    }

    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;
    let mut has_special = false;
    for c in password.chars() {
        match get_general_category(c) {
            GeneralCategory::UppercaseLetter => has_upper = true,
            GeneralCategory::LowercaseLetter => has_lower = true,
            GeneralCategory::DecimalNumber => has_digit = true,
            category if is_punctuation_or_symbol(category) => has_special = true,
            _ => {}
        }
    }

    if policy.require_uppercase && !has_upper {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    if policy.require_lowercase && !has_lower {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }

    if policy.require_digit && !has_digit {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one digit".to_string(),
        ));
    }

    if policy.require_special && !has_special {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one special character".to_string(),
        ));
    }

    if policy.forbid_common && is_common_password(password) {
        return Err(AuthError::WeakPassword(
            "Password is too common".to_string(),
        ));
    }

    Ok(())
}

fn is_punctuation_or_symbol(category: GeneralCategory) -> bool {
    matches!(
        category,
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
            | GeneralCategory::MathSymbol
            | GeneralCategory::CurrencySymbol
            | GeneralCategory::ModifierSymbol
            | GeneralCategory::OtherSymbol
    )
}

fn is_common_password(password: &str) -> bool {
    let lowered = password.to_lowercase();
    COMMON_PASSWORDS.iter().any(|common| *common == lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_classes() -> PasswordPolicy {
        PasswordPolicy::default()
            .with_min_length(1)
            .with_uppercase(true)
            .with_lowercase(true)
            .with_digit(true)
            .with_special(true)
    }

    // Identifier Tests
    #[test]
    fn test_valid_identifiers() {
        assert!(validate_collection("users").is_ok());
        assert!(validate_collection("sessions-v2").is_ok());
        assert!(validate_key("alice@example.com").is_ok());
        assert!(validate_key("a.b.c").is_ok());
        assert!(validate_key("..hidden").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(matches!(validate_collection(""), Err(AuthError::MissingCollection)));
        assert!(matches!(validate_key(""), Err(AuthError::MissingResource)));

        assert!(validate_collection(".").is_err());
        assert!(validate_collection("..").is_err());
        assert!(validate_collection("a/b").is_err());
        assert!(validate_key("a\\b").is_err());
        assert!(validate_key("nul\0byte").is_err());
        assert!(validate_key(&"k".repeat(MAX_IDENTIFIER_LENGTH + 1)).is_err());
    }

    // Password Tests
    #[test]
    fn test_no_policy_accepts_anything() {
        assert!(validate_password_strength("", None).is_ok());
        assert!(validate_password_strength("password", None).is_ok());
    }

    #[test]
    fn test_all_classes_present() {
        assert!(validate_password_strength("Aa1!", Some(&all_classes())).is_ok());
    }

    #[test]
    fn test_each_missing_class_fails() {
        let policy = all_classes();
        for password in ["a1!", "A1!", "Aa!", "Aa1"] {
            assert!(
                matches!(
                    validate_password_strength(password, Some(&policy)),
                    Err(AuthError::WeakPassword(_))
                ),
                "{password} should be rejected"
            );
        }
    }

    #[test]
    fn test_unicode_classes() {
        let policy = all_classes();
        // Non-ASCII uppercase, lowercase, digit and symbol
        assert!(validate_password_strength("Ää٣€", Some(&policy)).is_ok());
        // Euro sign counts as a symbol
        assert!(validate_password_strength("Aa1€", Some(&policy)).is_ok());
    }

    #[test]
    fn test_min_length_counts_characters() {
        let policy = PasswordPolicy::default().with_min_length(4);
        assert!(validate_password_strength("äöüß", Some(&policy)).is_ok());
        assert!(validate_password_strength("äöü", Some(&policy)).is_err());
    }

    #[test]
    fn test_first_violation_reported() {
        let policy = all_classes().with_min_length(10);
        let err = validate_password_strength("abc", Some(&policy)).unwrap_err();
        assert!(err.to_string().contains("at least 10 characters"));

        let err = validate_password_strength("abcdefghij", Some(&policy)).unwrap_err();
        assert!(err.to_string().contains("uppercase"));
    }

    #[test]
    fn test_common_passwords() {
        let policy = PasswordPolicy::default().with_forbid_common(true);
        assert!(validate_password_strength("password", Some(&policy)).is_err());
        assert!(validate_password_strength("PassWord", Some(&policy)).is_err());
        assert!(validate_password_strength("uniquepassword", Some(&policy)).is_ok());
        assert!(validate_password_strength("password!", Some(&policy)).is_ok());
    }

    #[test]
    fn test_strict_policy() {
        let policy = PasswordPolicy::strict();
        assert!(validate_password_strength("Correct-Horse-9", Some(&policy)).is_ok());
        assert!(validate_password_strength("Short-9a", Some(&policy)).is_err());
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: PasswordPolicy =
            serde_json::from_str(r#"{"min_length": 8, "forbid_common": true}"#).unwrap();
        assert_eq!(policy.min_length, 8);
        assert!(policy.forbid_common);
        assert!(!policy.require_digit);
    }
}

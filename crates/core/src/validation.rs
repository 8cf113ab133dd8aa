//! Credential and configuration validation support

use config::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});
static UPPERCASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Lu}").expect("uppercase pattern is a valid regex"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("digit pattern is a valid regex"));
static SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("symbol pattern is a valid regex"));

/// Local validation failures. None of these reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid email format")]
    InvalidEmail,

    #[error(
        "Password must be at least 8 characters and include an uppercase letter, a number and a symbol"
    )]
    WeakPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("{0} is required")]
    Required(&'static str),
}

/// Check an email against the RFC-lite pattern
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Check password strength
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let strong = password.chars().count() >= MIN_PASSWORD_LEN
        && UPPERCASE.is_match(password)
        && DIGIT.is_match(password)
        && SYMBOL.is_match(password);

    if strong {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword)
    }
}

/// Validate a registration form: email, then strength, then confirmation
pub fn validate_registration(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password)?;
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Reject blank form fields
pub fn validate_required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

/// Trait for validating configuration values
pub trait ValidateConfig: Serialize + for<'de> Deserialize<'de> {
    /// Validate the configuration
    ///
    /// Returns Ok(()) if valid, or an error describing what's wrong
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Common validation helpers
pub mod validators {
    use config::ConfigError;

    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::Message(format!("{field}: cannot be empty")));
        }
        Ok(())
    }

    /// Validate URL format and require an http(s) scheme
    pub fn validate_url(url: &str, field: &str) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| ConfigError::Message(format!("{field}: invalid URL - {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "{field}: unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        Ok(())
    }

    /// Validate that a value is within range
    pub fn validate_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<(), ConfigError> {
        if value < min || value > max {
            return Err(ConfigError::Message(format!(
                "{field}: must be between {min} and {max}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_emails_rejected() {
        for email in [
            "",
            "plain",
            "missing-at.com",
            "a@b",
            "@b.com",
            "a@.com ",
            "a b@c.com",
            "a@@b.com",
        ] {
            assert_eq!(
                validate_email(email),
                Err(ValidationError::InvalidEmail),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_well_formed_emails_accepted() {
        for email in ["a@b.com", "first.last+tag@example.co.uk", "x@y.z"] {
            assert!(validate_email(email).is_ok(), "{email:?} should be accepted");
        }
    }

    #[test]
    fn test_weak_passwords_rejected() {
        for password in [
            "",
            "Pa1!",
            "password123!",
            "PASSWORD!!!",
            "Password123",
            "Password!!!",
            "Pass 123 word",
        ] {
            assert_eq!(
                validate_password(password),
                Err(ValidationError::WeakPassword),
                "{password:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(validate_password("Password123!").is_ok());
        assert!(validate_password("Zz9#Zz9#").is_ok());
    }

    #[test]
    fn test_registration_checks_confirmation_last() {
        assert_eq!(
            validate_registration("a@b.com", "Password123!", "Password123?"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_registration("bad", "weak", "other"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_registration("a@b.com", "weak", "weak"),
            Err(ValidationError::WeakPassword)
        );
        assert!(validate_registration("a@b.com", "Password123!", "Password123!").is_ok());
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(
            validate_required("   ", "Phone number"),
            Err(ValidationError::Required("Phone number"))
        );
        assert!(validate_required("123456", "OTP").is_ok());
    }

    #[test]
    fn test_url_validator() {
        assert!(validators::validate_url("http://localhost:5000/api", "api.base_url").is_ok());
        assert!(validators::validate_url("ftp://example.com", "api.base_url").is_err());
        assert!(validators::validate_url("not a url", "api.base_url").is_err());
    }
}

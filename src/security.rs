//! Input validation and sanitization helpers
//!
//! Everything here is pure: no I/O, no shared state.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters that count as "special" for password rules
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9+\-() ]{7,20}$").unwrap());

/// Simple structural email check (something@something.tld)
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(&email.to_lowercase())
}

/// Phone numbers are optional: an empty value is valid
pub fn is_valid_phone(phone: &str) -> bool {
    phone.is_empty() || PHONE_RE.is_match(phone)
}

/// Trim and drop angle brackets from free-form input
pub fn sanitize_input(input: &str) -> String {
    input.trim().chars().filter(|c| *c != '<' && *c != '>').collect()
}

/// Render text as it would appear inside an HTML text node.
///
/// Only `&`, `<` and `>` are escaped; quotes are left alone since the output
/// is never placed inside an attribute.
pub fn sanitize_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape HTML entities, quotes included, for interpolation into markup
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn has_special(password: &str) -> bool {
    password.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
}

fn has_mixed_case(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase()) && password.chars().any(|c| c.is_ascii_lowercase())
}

fn has_digit(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_digit())
}

/// Reason a password was rejected, in the order the rules are checked
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must be at least {} characters long", MIN_PASSWORD_LENGTH)]
    TooShort,
    #[error("Password must contain both uppercase and lowercase letters")]
    MissingMixedCase,
    #[error("Password must contain at least one number")]
    MissingDigit,
    #[error("Password must contain at least one special character")]
    MissingSpecial,
}

/// Accept a password only if it is long enough and mixes case, digits and symbols
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if !has_mixed_case(password) {
        return Err(PasswordError::MissingMixedCase);
    }
    if !has_digit(password) {
        return Err(PasswordError::MissingDigit);
    }
    if !has_special(password) {
        return Err(PasswordError::MissingSpecial);
    }
    Ok(())
}

/// Qualitative password strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    VeryWeak = 0,
    Weak = 1,
    Fair = 2,
    Good = 3,
    Strong = 4,
}

impl From<u8> for PasswordStrength {
    fn from(score: u8) -> Self {
        match score {
            0 => PasswordStrength::VeryWeak,
            1 => PasswordStrength::Weak,
            2 => PasswordStrength::Fair,
            3 => PasswordStrength::Good,
            _ => PasswordStrength::Strong,
        }
    }
}

impl std::fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PasswordStrength::VeryWeak => "Very Weak",
            PasswordStrength::Weak => "Weak",
            PasswordStrength::Fair => "Fair",
            PasswordStrength::Good => "Good",
            PasswordStrength::Strong => "Strong",
        };
        write!(f, "{}", label)
    }
}

/// Password strength score from 0 to 4.
///
/// One point each for: 8+ characters, 12+ characters, mixed case, a digit,
/// a special character. Capped at 4.
pub fn password_score(password: &str) -> u8 {
    let len = password.chars().count();
    let score = [
        len >= 8,
        len >= 12,
        has_mixed_case(password),
        has_digit(password),
        has_special(password),
    ]
    .iter()
    .filter(|hit| **hit)
    .count() as u8;

    score.min(4)
}

pub fn password_strength(password: &str) -> PasswordStrength {
    PasswordStrength::from(password_score(password))
}

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Characters accepted as the "special character" of a password.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*._-";
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PHONE_MIN_LEN: usize = 10;
pub const VERIFICATION_CODE_LEN: usize = 6;

/// Form field a validation message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Phone,
    MealName,
    Calories,
    VerificationCode,
}

/// A failed local check. Never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: Field,
    pub message: &'static str,
}

impl ValidationError {
    pub const fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type Validation = Result<(), ValidationError>;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

pub fn validate_email(email: &str) -> Validation {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new(Field::Email, "Please enter a valid email"))
    }
}

pub fn validate_password(password: &str) -> Validation {
    let long_enough = password.chars().count() >= PASSWORD_MIN_LEN;
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if long_enough && has_digit && has_lower && has_upper && has_symbol {
        Ok(())
    } else {
        Err(ValidationError::new(
            Field::Password,
            "Password must be at least 8 characters long and contain uppercase, lowercase, number, and special character",
        ))
    }
}

pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Validation {
    if password == confirmation {
        Ok(())
    } else {
        Err(ValidationError::new(
            Field::ConfirmPassword,
            "Passwords do not match",
        ))
    }
}

pub fn validate_phone(phone: &str) -> Validation {
    if phone.chars().count() >= PHONE_MIN_LEN {
        Ok(())
    } else {
        Err(ValidationError::new(
            Field::Phone,
            "Please enter a valid phone number",
        ))
    }
}

pub fn validate_full_name(name: &str) -> Validation {
    if name.trim().is_empty() {
        Err(ValidationError::new(Field::Name, "Please enter your full name"))
    } else {
        Ok(())
    }
}

pub fn validate_meal_name(name: &str) -> Validation {
    if name.trim().is_empty() {
        Err(ValidationError::new(
            Field::MealName,
            "Please enter a meal name",
        ))
    } else {
        Ok(())
    }
}

/// Entry-time filter for the calories field: keeps digits only.
pub fn sanitize_calories(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Parses an already sanitized calories value.
pub fn parse_calories(input: &str) -> Result<u32, ValidationError> {
    input
        .parse::<u32>()
        .map_err(|_| ValidationError::new(Field::Calories, "Calories must be a number"))
}

/// The code field only submits once it holds exactly six digits.
pub fn validate_verification_code(code: &str) -> Validation {
    if code.len() == VERIFICATION_CODE_LEN && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new(
            Field::VerificationCode,
            "Enter the 6-digit code",
        ))
    }
}

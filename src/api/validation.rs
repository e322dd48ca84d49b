//! Field validation rules for user request payloads.
//!
//! The full profile (create / full update) uses `validator` derive
//! attributes on the request DTOs plus the custom rules below. The partial
//! profile (PATCH) routes every supplied field through the `optional_*`
//! variants, which treat an empty string as "not supplied": an empty string
//! is the merge layer's no-change sentinel and must not be rejected.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use validator::{ValidateEmail, ValidationError};

use crate::config::DEFAULT_MINIMUM_ADULT_AGE;

/// Phone numbers are exactly 10 digits
pub static PHONE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}$").unwrap());

/// Configured minimum adult age, set once at startup
static MINIMUM_ADULT_AGE: OnceCell<u8> = OnceCell::new();

/// Install the configured minimum adult age.
///
/// Later calls are ignored; rules fall back to the default when the
/// server never set a value (e.g. in unit tests).
pub fn set_minimum_adult_age(age: u8) {
    let _ = MINIMUM_ADULT_AGE.set(age);
}

fn minimum_adult_age() -> u8 {
    MINIMUM_ADULT_AGE
        .get()
        .copied()
        .unwrap_or(DEFAULT_MINIMUM_ADULT_AGE)
}

fn rule_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Whole-year difference between two dates, using calendar arithmetic.
///
/// The year count only increases once the month/day of `to` has reached
/// the month/day of `from`; leap years fall out of the comparison.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}

/// Check whether a birth date reaches the given age today
pub fn is_at_least_age(birth_date: NaiveDate, today: NaiveDate, min_age: u8) -> bool {
    years_between(birth_date, today) >= i32::from(min_age)
}

/// Birth date rule: strictly in the past, holder at least the configured age
pub fn birth_date_rules(birth_date: &NaiveDate) -> Result<(), ValidationError> {
    let today = Utc::now().date_naive();
    if *birth_date >= today {
        return Err(rule_error(
            "birth_date_past",
            "birth date must be in the past".to_string(),
        ));
    }
    let min_age = minimum_adult_age();
    if !is_at_least_age(*birth_date, today, min_age) {
        return Err(rule_error(
            "adult_age",
            format!("user must be at least {min_age} years old"),
        ));
    }
    Ok(())
}

/// Non-blank rule used by the full profile for the last name
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("non_blank", "must not be blank".to_string()));
    }
    Ok(())
}

/// Partial-profile email rule: empty string means "no change"
pub fn optional_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    if !value.validate_email() {
        return Err(rule_error(
            "email",
            "invalid email format".to_string(),
        ));
    }
    Ok(())
}

/// Partial-profile first name rule: empty string means "no change"
pub fn optional_first_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let length = value.chars().count();
    if !(3..=30).contains(&length) {
        return Err(rule_error(
            "length",
            "first name must be 3-30 characters".to_string(),
        ));
    }
    Ok(())
}

/// Partial-profile last name rule: empty string means "no change"
pub fn optional_last_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    non_blank(value)
}

/// Partial-profile phone rule: empty string means "no change"
pub fn optional_phone_number(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    if !PHONE_NUMBER_RE.is_match(value) {
        return Err(rule_error(
            "phone_number",
            "phone number must be exactly 10 digits".to_string(),
        ));
    }
    Ok(())
}

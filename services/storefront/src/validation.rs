//! Input validation utilities
//!
//! Every validator returns the user-facing message for the first rule a
//! field breaks. Request types gather those messages through [`Validate`] so
//! a single response lists every invalid field.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Request payloads that can check their own fields
pub trait Validate {
    /// Return every validation message, or `Ok` when the payload is acceptable
    fn validate(&self) -> Result<(), Vec<String>>;
}

/// Fold individual field checks into one result
pub fn collect<I>(checks: I) -> Result<(), Vec<String>>
where
    I: IntoIterator<Item = Result<(), String>>,
{
    let errors: Vec<String> = checks.into_iter().filter_map(Result::err).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Canonical form used to store and look up email addresses
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    let username = username.trim();

    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    let length = username.chars().count();

    if length < 6 {
        return Err("Username should have a minimum length of 6".to_string());
    }

    if length > 15 {
        return Err("Username should have a maximum length of 15".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();

    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Please provide a valid email address".to_string());
    }

    Ok(())
}

/// Validate a new password; `label` names the field in messages
pub fn validate_password(password: &str, label: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err(format!("{} is required", label));
    }

    let length = password.chars().count();

    if length < 6 {
        return Err(format!("{} should have a minimum length of 6", label));
    }

    if length > 128 {
        return Err(format!("{} should have a maximum length of 128", label));
    }

    Ok(())
}

/// Reject blank strings
pub fn validate_required(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

/// Validate a product price: present, numeric, not negative
pub fn validate_price(price: Option<&Value>) -> Result<(), String> {
    let price = price
        .filter(|value| !value.is_null())
        .ok_or_else(|| "Price is required".to_string())?;

    let price = price
        .as_f64()
        .filter(|price| price.is_finite())
        .ok_or_else(|| "Price must be a number".to_string())?;

    if price < 0.0 {
        return Err("Price cannot be negative".to_string());
    }

    Ok(())
}

/// Validate a stock quantity: present, integral, not negative
pub fn validate_quantity(quantity: Option<&Value>) -> Result<(), String> {
    let quantity = quantity
        .filter(|value| !value.is_null())
        .ok_or_else(|| "Quantity is required".to_string())?;

    let quantity = quantity
        .as_f64()
        .ok_or_else(|| "Quantity must be a number".to_string())?;

    if quantity.fract() != 0.0 {
        return Err("Quantity must be an integer".to_string());
    }

    if quantity < 0.0 {
        return Err("Quantity cannot be negative".to_string());
    }

    if quantity > f64::from(i32::MAX) {
        return Err(format!("Quantity cannot exceed {}", i32::MAX));
    }

    Ok(())
}

/// Validate a list of product identifiers sent for bulk deletion
pub fn validate_id_list(ids: Option<&Value>) -> Result<(), String> {
    let ids = ids
        .filter(|value| !value.is_null())
        .ok_or_else(|| "Product IDs are required".to_string())?;

    let ids = ids
        .as_array()
        .ok_or_else(|| "Product IDs must be an array".to_string())?;

    if ids.is_empty() {
        return Err("At least one product ID is required".to_string());
    }

    let all_strings = ids
        .iter()
        .all(|id| id.as_str().is_some_and(|id| !id.trim().is_empty()));

    if !all_strings {
        return Err("All product IDs must be strings".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn username_length_bounds() {
        assert_eq!(
            validate_username("").unwrap_err(),
            "Username is required"
        );
        assert_eq!(
            validate_username("bob").unwrap_err(),
            "Username should have a minimum length of 6"
        );
        assert_eq!(
            validate_username("a_really_long_username").unwrap_err(),
            "Username should have a maximum length of 15"
        );
        assert!(validate_username("shopper_1").is_ok());
    }

    #[test]
    fn username_characters() {
        assert!(validate_username("shop per").is_err());
        assert!(validate_username("shop-per").is_err());
    }

    #[test]
    fn email_format() {
        assert!(validate_email("admin@example.com").is_ok());
        assert!(validate_email("  admin@example.com ").is_ok());
        assert_eq!(
            validate_email("not-an-email").unwrap_err(),
            "Please provide a valid email address"
        );
        assert_eq!(validate_email(" ").unwrap_err(), "Email is required");
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  Admin@Example.COM "), "admin@example.com");
    }

    #[test]
    fn password_messages_use_label() {
        assert_eq!(
            validate_password("", "New password").unwrap_err(),
            "New password is required"
        );
        assert_eq!(
            validate_password("12345", "Password").unwrap_err(),
            "Password should have a minimum length of 6"
        );
        assert!(validate_password("123456", "Password").is_ok());
    }

    #[test]
    fn price_rules() {
        assert_eq!(validate_price(None).unwrap_err(), "Price is required");
        assert_eq!(
            validate_price(Some(&Value::Null)).unwrap_err(),
            "Price is required"
        );
        assert_eq!(
            validate_price(Some(&json!("cheap"))).unwrap_err(),
            "Price must be a number"
        );
        assert_eq!(
            validate_price(Some(&json!(-1))).unwrap_err(),
            "Price cannot be negative"
        );
        assert!(validate_price(Some(&json!(0))).is_ok());
        assert!(validate_price(Some(&json!(19.99))).is_ok());
    }

    #[test]
    fn quantity_rules() {
        assert_eq!(validate_quantity(None).unwrap_err(), "Quantity is required");
        assert_eq!(
            validate_quantity(Some(&json!(1.5))).unwrap_err(),
            "Quantity must be an integer"
        );
        assert_eq!(
            validate_quantity(Some(&json!(-3))).unwrap_err(),
            "Quantity cannot be negative"
        );
        assert!(validate_quantity(Some(&json!(0))).is_ok());
        assert!(validate_quantity(Some(&json!(12.0))).is_ok());
    }

    #[test]
    fn id_list_rules() {
        assert_eq!(
            validate_id_list(None).unwrap_err(),
            "Product IDs are required"
        );
        assert_eq!(
            validate_id_list(Some(&json!("abc"))).unwrap_err(),
            "Product IDs must be an array"
        );
        assert_eq!(
            validate_id_list(Some(&json!([]))).unwrap_err(),
            "At least one product ID is required"
        );
        assert_eq!(
            validate_id_list(Some(&json!(["a", 1]))).unwrap_err(),
            "All product IDs must be strings"
        );
        assert!(validate_id_list(Some(&json!(["a", "b"]))).is_ok());
    }

    #[test]
    fn collect_keeps_every_message() {
        let result = collect([
            validate_username(""),
            validate_email("ok@example.com"),
            validate_password("", "Password"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            vec!["Username is required", "Password is required"]
        );
    }
}

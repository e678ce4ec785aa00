use std::fmt;

pub const NAME_MAX_LEN: usize = 100;
pub const PHONE_MIN_LEN: usize = 10;
pub const PHONE_MAX_LEN: usize = 15;
pub const PIN_LEN: usize = 4;
pub const DESCRIPTION_MAX_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Band codes compare case-insensitively; the canonical form is uppercase.
pub fn normalize_band_code(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_phone(phone: &str) -> ValidationResult {
    let phone = sanitize_string(phone);
    validate_required("phone", &phone)?;

    if phone.len() < PHONE_MIN_LEN || phone.len() > PHONE_MAX_LEN {
        return Err(ValidationError::new(
            "phone",
            format!(
                "must be between {} and {} digits",
                PHONE_MIN_LEN, PHONE_MAX_LEN
            ),
        ));
    }

    if !phone.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::new("phone", "must contain only digits"));
    }

    Ok(())
}

pub fn validate_pin(pin: &str) -> ValidationResult {
    if pin.len() != PIN_LEN || !pin.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::new(
            "pin",
            format!("must be exactly {} digits", PIN_LEN),
        ));
    }

    Ok(())
}

pub fn validate_name(name: &str) -> ValidationResult {
    let name = sanitize_string(name);
    validate_required("name", &name)?;
    validate_max_len("name", &name, NAME_MAX_LEN)?;

    Ok(())
}

/// Amounts cross the wire as integers in minor units.
pub fn validate_amount(amount_minor: i64) -> ValidationResult {
    if amount_minor <= 0 {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string("single"), "single");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("ab\u{0000}cd\u{0007}"), "abcd");
    }

    #[test]
    fn normalizes_band_codes() {
        assert_eq!(normalize_band_code("  nkm-a1b2c3d  "), "NKM-A1B2C3D");
        assert_eq!(normalize_band_code("NKM-XY99ZZ1"), "NKM-XY99ZZ1");
    }

    #[test]
    fn validates_phone() {
        assert!(validate_phone("9000000001").is_ok());
        assert!(validate_phone("  9000000001  ").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("1234567890123456").is_err());
        assert!(validate_phone("90000000ab").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn validates_pin() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("0000").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("12a4").is_err());
    }

    #[test]
    fn validates_name() {
        assert!(validate_name("Asha Verma").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(NAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn validates_amount() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(50_000).is_ok());
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(-200).is_err());
    }
}

//! Phone value normalization and validation

/// Strips every non-digit character from a phone value
///
/// # Examples
///
/// ```
/// use csv_harvest::pipeline::clean_phone;
///
/// assert_eq!(clean_phone("(555) 123-4567"), "5551234567");
/// assert_eq!(clean_phone("n/a"), "");
/// ```
pub fn clean_phone(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Returns true if `value` is all ASCII digits and at least `min_digits` long
pub fn is_valid_phone(value: &str, min_digits: usize) -> bool {
    value.len() >= min_digits && !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

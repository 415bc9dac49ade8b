//! Passcode generation, expiry policy, and message formatting.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Minutes a passcode stays valid after issuance.
pub const CODE_TTL_MINUTES: i64 = 10;

/// Uniformly samples a fresh 4-digit numeric code.
///
/// Collisions across records are permitted; no uniqueness constraint is
/// enforced over the verification table.
pub fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(1000..10_000);
    code.to_string()
}

/// Expiry timestamp for a code issued at `issued_at`.
pub fn expiry_from(issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + Duration::minutes(CODE_TTL_MINUTES)
}

/// Text-message body carrying the code to the user.
pub fn message_body(product: &str, code: &str) -> String {
    format!(
        "Your {} verification code is: {}. This code expires in 10 minutes.",
        product, code
    )
}

/// Formats a destination number for the carrier.
///
/// Numbers already carrying a country prefix pass through unchanged; bare
/// national numbers get the configured calling code prepended.
pub fn to_international(phone_number: &str, default_country_code: &str) -> String {
    if phone_number.starts_with('+') {
        phone_number.to_string()
    } else {
        format!("+{}{}", default_country_code, phone_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_four_digits() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 4);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn expiry_is_ten_minutes_after_issuance() {
        let issued = Utc::now();
        assert_eq!(expiry_from(issued) - issued, Duration::minutes(10));
    }

    #[test]
    fn message_carries_product_and_code() {
        assert_eq!(
            message_body("Discountmithra", "1234"),
            "Your Discountmithra verification code is: 1234. This code expires in 10 minutes."
        );
    }

    #[test]
    fn bare_national_numbers_get_country_code() {
        assert_eq!(to_international("9876543210", "91"), "+919876543210");
    }

    #[test]
    fn international_numbers_pass_through() {
        assert_eq!(to_international("+15005550006", "91"), "+15005550006");
    }
}

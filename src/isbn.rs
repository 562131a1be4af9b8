//! ISBN checksum validation.
//!
//! Which checksum applies is decided by the length of the ISBN column alone:
//!
//! - 10 characters: ISBN-10, `sum(k * digit[10 - k] for k in 10..=1)` must be
//!   divisible by 11. A final `X` counts as 10.
//! - 13 characters: ISBN-13, digits at odd positions weigh 3 and at even
//!   positions 1; the sum must be divisible by 10.
//! - Any other length: no checksum applies and the ISBN is passed through.
//!
//! A 10- or 13-character ISBN containing any other non-digit fails its
//! checksum. Hyphens are not stripped; `0-306-40615-2` is 13 characters and
//! is checked (and rejected) as an ISBN-13.

/// Outcome of checking an ISBN column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsbnCheck {
    /// A valid ISBN-10.
    ValidIsbn10,
    /// A valid ISBN-13.
    ValidIsbn13,
    /// Ten characters that fail the ISBN-10 checksum.
    InvalidIsbn10,
    /// Thirteen characters that fail the ISBN-13 checksum.
    InvalidIsbn13,
    /// Neither 10 nor 13 characters; no checksum was computed.
    NotApplicable,
}

impl IsbnCheck {
    /// Whether the record may proceed past the ISBN check.
    #[must_use]
    pub fn is_acceptable(self) -> bool {
        !matches!(self, IsbnCheck::InvalidIsbn10 | IsbnCheck::InvalidIsbn13)
    }
}

/// ISBN checksum validator
#[derive(Debug)]
pub struct IsbnValidator;

impl IsbnValidator {
    /// Classify an ISBN column.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelver::isbn::{IsbnCheck, IsbnValidator};
    ///
    /// assert_eq!(IsbnValidator::check("0201038013"), IsbnCheck::ValidIsbn10);
    /// assert_eq!(IsbnValidator::check("9780306406157"), IsbnCheck::ValidIsbn13);
    /// assert_eq!(IsbnValidator::check("12345"), IsbnCheck::NotApplicable);
    /// ```
    #[must_use]
    pub fn check(isbn: &str) -> IsbnCheck {
        match isbn.chars().count() {
            10 if Self::validate_isbn10(isbn) => IsbnCheck::ValidIsbn10,
            10 => IsbnCheck::InvalidIsbn10,
            13 if Self::validate_isbn13(isbn) => IsbnCheck::ValidIsbn13,
            13 => IsbnCheck::InvalidIsbn13,
            _ => IsbnCheck::NotApplicable,
        }
    }

    /// Validate an ISBN-10 checksum
    ///
    /// The first character weighs 10, the last weighs 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelver::isbn::IsbnValidator;
    ///
    /// assert!(IsbnValidator::validate_isbn10("0201038013"));
    /// assert!(IsbnValidator::validate_isbn10("043942089X"));
    /// assert!(!IsbnValidator::validate_isbn10("0201038014"));
    /// ```
    #[must_use]
    pub fn validate_isbn10(isbn: &str) -> bool {
        if isbn.chars().count() != 10 {
            return false;
        }

        let mut sum = 0;
        for (i, ch) in isbn.chars().enumerate() {
            let digit = if i == 9 && (ch == 'X' || ch == 'x') {
                10
            } else if let Some(d) = ch.to_digit(10) {
                d
            } else {
                return false;
            };

            sum += digit * (10 - u32::try_from(i).unwrap_or(0));
        }

        sum % 11 == 0
    }

    /// Validate an ISBN-13 checksum
    ///
    /// Unlike a bookland EAN check, any 13-digit prefix is allowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelver::isbn::IsbnValidator;
    ///
    /// assert!(IsbnValidator::validate_isbn13("9780306406157"));
    /// assert!(!IsbnValidator::validate_isbn13("9780306406158"));
    /// ```
    #[must_use]
    pub fn validate_isbn13(isbn: &str) -> bool {
        if isbn.chars().count() != 13 {
            return false;
        }

        let mut sum = 0;
        for (i, ch) in isbn.chars().enumerate() {
            if let Some(digit) = ch.to_digit(10) {
                let weight = if i % 2 == 0 { 1 } else { 3 };
                sum += digit * weight;
            } else {
                return false;
            }
        }

        sum % 10 == 0
    }
}

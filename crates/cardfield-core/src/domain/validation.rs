//! Card field validation rules.
//!
//! These are the rules a certified widget applies to raw field text.  They
//! live in the core crate so the headless widget and the tests agree on what
//! "valid" means.  All inputs are already normalised to digits (number, CVC,
//! expiry as `MMYY`).

use chrono::{Datelike, Utc};

use crate::domain::card::{CardBrand, FieldState};

/// Shortest CVC any network accepts.
pub const MIN_CVC_LENGTH: usize = 3;

/// Longest postal code the widget accepts.
pub const MAX_POSTAL_CODE_LENGTH: usize = 10;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: u32,
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` unless `month` is in `1..=12`.
    pub fn new(year: u32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The current month in UTC.
    pub fn current() -> Self {
        let now = Utc::now();
        Self { year: u32::try_from(now.year()).unwrap_or(0), month: now.month() }
    }
}

// ── Number ────────────────────────────────────────────────────────────────────

/// Classifies a (possibly partial) card number by its prefix.
pub fn brand_for_number(digits: &str) -> CardBrand {
    let prefix = |n: usize| -> Option<u32> { digits.get(..n).and_then(|p| p.parse().ok()) };

    if digits.starts_with('4') {
        return CardBrand::Visa;
    }
    if matches!(prefix(2), Some(34 | 37)) {
        return CardBrand::AmericanExpress;
    }
    if matches!(prefix(2), Some(51..=55)) || matches!(prefix(4), Some(2221..=2720)) {
        return CardBrand::MasterCard;
    }
    if digits.starts_with("6011")
        || digits.starts_with("65")
        || matches!(prefix(3), Some(644..=649))
    {
        return CardBrand::Discover;
    }
    if digits.starts_with("62") {
        return CardBrand::UnionPay;
    }
    if matches!(prefix(4), Some(3528..=3589)) {
        return CardBrand::Jcb;
    }
    if matches!(prefix(3), Some(300..=305)) || matches!(prefix(2), Some(36 | 38 | 39)) {
        return CardBrand::DinersClub;
    }
    CardBrand::Unknown
}

/// Luhn (mod 10) checksum over a digit string.
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// State of the card number field.
///
/// A number is `Valid` at an issued length for its brand with a correct
/// checksum.  Shorter numbers are `Entering`; numbers at the maximum length
/// that fail the checksum, or whose brand is unrecognised, are `Invalid`.
pub fn number_state(digits: &str) -> FieldState {
    if digits.is_empty() {
        return FieldState::Empty;
    }
    let brand = brand_for_number(digits);
    let max = brand.max_number_length();
    let len = digits.len();

    if len > max {
        return FieldState::Invalid;
    }
    if brand != CardBrand::Unknown
        && brand.valid_number_lengths().contains(&len)
        && luhn_valid(digits)
    {
        return FieldState::Valid;
    }
    if len < max {
        FieldState::Entering
    } else {
        FieldState::Invalid
    }
}

/// The last four digits, once at least four are known.
pub fn last4(digits: &str) -> Option<String> {
    let count = digits.chars().count();
    (count >= 4).then(|| digits.chars().skip(count - 4).collect())
}

// ── Expiry ────────────────────────────────────────────────────────────────────

/// Parses `MMYY` digits into `(month, four-digit year)`, each present once
/// enough digits are typed.
pub fn parse_expiry(digits: &str) -> (Option<u32>, Option<u32>) {
    let month = digits.get(..2).and_then(|m| m.parse().ok());
    let year = if digits.len() == 4 {
        digits.get(2..4).and_then(|y| y.parse::<u32>().ok()).map(|y| 2000 + y)
    } else {
        None
    };
    (month, year)
}

/// State of the expiry field relative to `today`.
///
/// A card expiring in the current month is still valid.
pub fn expiry_state(digits: &str, today: YearMonth) -> FieldState {
    match digits.len() {
        0 => return FieldState::Empty,
        1 => {
            return if digits.starts_with(&['0', '1'][..]) {
                FieldState::Entering
            } else {
                FieldState::Invalid
            }
        }
        n if n > 4 => return FieldState::Invalid,
        _ => {}
    }

    let (month, year) = parse_expiry(digits);
    let Some(month) = month.filter(|m| (1..=12).contains(m)) else {
        return FieldState::Invalid;
    };
    match year {
        None => FieldState::Entering,
        Some(year) => match YearMonth::new(year, month) {
            Some(expiry) if expiry >= today => FieldState::Valid,
            _ => FieldState::Invalid,
        },
    }
}

// ── CVC ───────────────────────────────────────────────────────────────────────

/// State of the CVC field for the given brand.
pub fn cvc_state(digits: &str, brand: CardBrand) -> FieldState {
    let len = digits.len();
    if len == 0 {
        FieldState::Empty
    } else if len < MIN_CVC_LENGTH {
        FieldState::Entering
    } else if len <= brand.max_cvc_length() {
        FieldState::Valid
    } else {
        FieldState::Invalid
    }
}

// ── Postal code ───────────────────────────────────────────────────────────────

/// State of the postal code field.  Any non-empty code is accepted.
pub fn postal_code_state(text: &str) -> FieldState {
    if text.trim().is_empty() {
        FieldState::Empty
    } else {
        FieldState::Valid
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

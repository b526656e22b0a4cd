use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{AppError, AppResult};

pub const MAX_NAME_LENGTH: usize = 100;

static VISA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^4[0-9]{12}(?:[0-9]{3})?$").unwrap());
static MASTERCARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^5[1-5][0-9]{14}$").unwrap());
static AMEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^3[47][0-9]{13}$").unwrap());
static JCB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:2131|1800|35\d{3})\d{11}$").unwrap());
static DISCOVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^6(?:011|5[0-9]{2})[0-9]{12}$").unwrap());
static DIGITS_13_19_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{13,19}$").unwrap());
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").unwrap());
static CVV3_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3}$").unwrap());
static CVV4_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardBrand {
    #[serde(rename = "VISA")]
    Visa,
    #[serde(rename = "MASTERCARD")]
    Mastercard,
    #[serde(rename = "AMEX")]
    Amex,
    #[serde(rename = "JCB")]
    Jcb,
    #[serde(rename = "Discover")]
    Discover,
}

impl CardBrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "VISA",
            CardBrand::Mastercard => "MASTERCARD",
            CardBrand::Amex => "AMEX",
            CardBrand::Jcb => "JCB",
            CardBrand::Discover => "Discover",
        }
    }

    fn patterns() -> [(CardBrand, &'static LazyLock<Regex>); 5] {
        [
            (CardBrand::Visa, &VISA_RE),
            (CardBrand::Mastercard, &MASTERCARD_RE),
            (CardBrand::Amex, &AMEX_RE),
            (CardBrand::Jcb, &JCB_RE),
            (CardBrand::Discover, &DISCOVER_RE),
        ]
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly card numbers are checked before a payment row is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardPolicy {
    /// The number must match one of the known brand patterns.
    #[default]
    Strict,
    /// Any 13 to 19 digit number; the brand comes from the prefix hint.
    Loose,
}

impl FromStr for CardPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(CardPolicy::Strict),
            "loose" => Ok(CardPolicy::Loose),
            other => Err(AppError::ConfigError(format!("unknown card policy: {other}"))),
        }
    }
}

pub fn normalize_card_number(card_number: &str) -> String {
    card_number.replace(' ', "")
}

/// Classifies a (space-free) card number against the full brand patterns.
pub fn classify_brand(card_number: &str) -> Option<CardBrand> {
    CardBrand::patterns()
        .into_iter()
        .find(|(_, re)| re.is_match(card_number))
        .map(|(brand, _)| brand)
}

/// Prefix-only guess used for the live "Card Type" hint while typing.
pub fn detect_brand_by_prefix(card_number: &str) -> Option<CardBrand> {
    let n = normalize_card_number(card_number);
    let starts_with_any = |prefixes: &[&str]| prefixes.iter().any(|p| n.starts_with(p));

    if n.starts_with('4') {
        Some(CardBrand::Visa)
    } else if starts_with_any(&["51", "52", "53", "54", "55"]) {
        Some(CardBrand::Mastercard)
    } else if starts_with_any(&["34", "37"]) {
        Some(CardBrand::Amex)
    } else if starts_with_any(&["2131", "1800", "35"]) {
        Some(CardBrand::Jcb)
    } else if starts_with_any(&["6011", "65"]) {
        Some(CardBrand::Discover)
    } else {
        None
    }
}

/// Checks a card number under `policy` and returns the brand it was matched to.
/// Under the loose policy the brand can be unknown.
pub fn validate_card_number(card_number: &str, policy: CardPolicy) -> AppResult<Option<CardBrand>> {
    let clean = normalize_card_number(card_number);
    match policy {
        CardPolicy::Strict => classify_brand(&clean).map(Some).ok_or_else(|| {
            AppError::ValidationError(
                "Invalid card number. Please enter a valid Visa, Mastercard, AMEX, or Discover card number."
                    .to_string(),
            )
        }),
        CardPolicy::Loose => {
            if DIGITS_13_19_RE.is_match(&clean) {
                Ok(classify_brand(&clean).or_else(|| detect_brand_by_prefix(&clean)))
            } else {
                Err(AppError::ValidationError(
                    "Invalid card number. It must contain 13 to 19 digits.".to_string(),
                ))
            }
        }
    }
}

pub fn validate_expiry(expiry: &str) -> AppResult<()> {
    if !EXPIRY_RE.is_match(expiry) {
        return Err(AppError::ValidationError(
            "Invalid expiry date. Use MM/YY format.".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_cvv(cvv: &str, brand: Option<CardBrand>) -> AppResult<()> {
    if brand == Some(CardBrand::Amex) {
        if !CVV4_RE.is_match(cvv) {
            return Err(AppError::ValidationError(
                "Invalid CVV. AMEX cards require a 4-digit CVV.".to_string(),
            ));
        }
    } else if !CVV3_RE.is_match(cvv) {
        return Err(AppError::ValidationError(
            "Invalid CVV. Please enter a 3-digit CVV.".to_string(),
        ));
    }

    // Only digits got this far, so the parse cannot overflow a u32.
    if cvv.parse::<u32>().unwrap_or(0) == 0 {
        return Err(AppError::ValidationError(
            "CVV must be greater than 0.".to_string(),
        ));
    }
    Ok(())
}

/// Replaces every digit except the last four with `*`.
pub fn mask_card_number(card_number: &str) -> String {
    let clean = normalize_card_number(card_number);
    let keep_from = clean.chars().count().saturating_sub(4);
    clean
        .chars()
        .enumerate()
        .map(|(i, c)| if i < keep_from { '*' } else { c })
        .collect()
}

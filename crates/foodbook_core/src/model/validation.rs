//! Field-level validation rules shared by client and delivery models.
//!
//! # Responsibility
//! - Own the textual format rules for names, phones, emails and tags.
//! - Report violations as typed `ValidationError` kinds.
//!
//! # Invariants
//! - Validators never normalize input; they only accept or reject it.
//! - Client identity stays case-sensitive, so name checks do not fold case.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 ]*$").expect("valid name regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{3,}$").expect("valid phone regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9+_.\-]*[A-Za-z0-9])?@(?:[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?\.)*[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?$",
    )
    .expect("valid email regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid tag regex"));

/// Validation errors for client/delivery field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidName(String),
    InvalidPhone(String),
    InvalidEmail(String),
    BlankAddress,
    InvalidTag(String),
    TooManyTags { count: usize, max: usize },
    BlankRemarks,
    InvalidCost(String),
    /// Delivery ids start at 1.
    ZeroDeliveryId,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(
                f,
                "invalid name `{value}`: names use letters, digits and spaces and must not start with a space"
            ),
            Self::InvalidPhone(value) => {
                write!(f, "invalid phone `{value}`: expected at least 3 digits")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email `{value}`"),
            Self::BlankAddress => write!(f, "address must not be blank"),
            Self::InvalidTag(value) => {
                write!(f, "invalid tag `{value}`: tags must be alphanumeric")
            }
            Self::TooManyTags { count, max } => {
                write!(f, "too many tags: {count} given, at most {max} allowed")
            }
            Self::BlankRemarks => write!(f, "remarks must not be blank"),
            Self::InvalidCost(value) => write!(
                f,
                "invalid cost `{value}`: expected a non-negative amount with at most 2 decimal places"
            ),
            Self::ZeroDeliveryId => write!(f, "delivery id must be at least 1"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn is_valid_name(value: &str) -> bool {
    NAME_RE.is_match(value)
}

pub(crate) fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// Email domain's last label must have at least two characters.
pub(crate) fn is_valid_email(value: &str) -> bool {
    if !EMAIL_RE.is_match(value) {
        return false;
    }
    value
        .split_once('@')
        .and_then(|(_, domain)| domain.rsplit('.').next())
        .is_some_and(|last_label| last_label.len() >= 2)
}

pub(crate) fn is_valid_tag(value: &str) -> bool {
    TAG_RE.is_match(value)
}

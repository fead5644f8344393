//! Client domain model.
//!
//! # Responsibility
//! - Define the contact record deliveries are made for.
//! - Validate field formats before the record enters the store.
//!
//! # Invariants
//! - Identity is the exact, case-sensitive full name: "Alice Tan" and
//!   "alice tan" are two different clients.
//! - A client carries at most `MAX_CLIENT_TAGS` tags.
//! - Full equality compares every field and is used for change detection.

use crate::model::error::EntityKind;
use crate::model::tag::Tag;
use crate::model::unique_list::Identified;
use crate::model::validation::{is_valid_email, is_valid_name, is_valid_phone, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Upper bound on tags attached to one client.
pub const MAX_CLIENT_TAGS: usize = 3;

/// Contact record identified by its full name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Identity key. Compared exactly, never case-folded.
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    /// Ordered so equality and serialization are deterministic.
    pub tags: BTreeSet<Tag>,
}

impl Client {
    /// Builds a client without tags.
    ///
    /// Does not validate; callers go through `validate()` (the facade does this
    /// on every write path).
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            address: address.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Returns a copy with `tags` replacing the current tag set.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Checks field formats and the tag bound.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_name(&self.name) {
            return Err(ValidationError::InvalidName(self.name.clone()));
        }
        if !is_valid_phone(&self.phone) {
            return Err(ValidationError::InvalidPhone(self.phone.clone()));
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        if self.address.trim().is_empty() {
            return Err(ValidationError::BlankAddress);
        }
        if self.tags.len() > MAX_CLIENT_TAGS {
            return Err(ValidationError::TooManyTags {
                count: self.tags.len(),
                max: MAX_CLIENT_TAGS,
            });
        }
        Ok(())
    }

    /// Same real-world client, regardless of contact details.
    pub fn is_same_client(&self, other: &Client) -> bool {
        self.name == other.name
    }
}

impl Identified for Client {
    type Key = String;
    const KIND: EntityKind = EntityKind::Client;

    fn identity(&self) -> &String {
        &self.name
    }
}

impl Display for Client {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}; Phone: {}; Email: {}; Address: {}",
            self.name, self.phone, self.email, self.address
        )?;
        if !self.tags.is_empty() {
            f.write_str("; Tags: ")?;
            for tag in &self.tags {
                write!(f, "[{tag}]")?;
            }
        }
        Ok(())
    }
}

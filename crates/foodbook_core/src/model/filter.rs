//! Typed view predicates and filtered projections.
//!
//! # Responsibility
//! - Describe the active client/delivery filters as comparable data.
//! - Compute the visible subsequence of a collection on demand.
//!
//! # Invariants
//! - Filters are pure: `matches` has no side effects.
//! - Projections are recomputed on every read; nothing is cached, so a view
//!   always reflects the latest collection content.
//! - Keyword filters match whole words, ignoring ASCII case.

use crate::model::client::Client;
use crate::model::delivery::{Delivery, DeliveryStatus};
use crate::model::tag::Tag;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Predicate over one entity type.
pub trait EntityFilter<T> {
    fn matches(&self, item: &T) -> bool;
}

/// Active predicate for the client list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ClientFilter {
    #[default]
    All,
    /// Any keyword equals a whole word of the client name.
    NameKeywords(Vec<String>),
    /// Client carries this tag.
    Tag(Tag),
}

impl EntityFilter<Client> for ClientFilter {
    fn matches(&self, client: &Client) -> bool {
        match self {
            Self::All => true,
            Self::NameKeywords(keywords) => contains_any_word(&client.name, keywords),
            Self::Tag(tag) => client.tags.contains(tag),
        }
    }
}

/// Active predicate for the delivery list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum DeliveryFilter {
    #[default]
    All,
    /// Any keyword equals a whole word of the referenced client's name.
    ClientNameKeywords(Vec<String>),
    /// Any keyword equals a whole word of the remarks.
    RemarksKeywords(Vec<String>),
    /// Exact client identity.
    Client(String),
    Status(DeliveryStatus),
    /// Scheduled on this calendar day.
    ScheduledOn(NaiveDate),
    Tag(Tag),
    /// Every inner filter matches. An empty list matches everything.
    AllOf(Vec<DeliveryFilter>),
}

impl EntityFilter<Delivery> for DeliveryFilter {
    fn matches(&self, delivery: &Delivery) -> bool {
        match self {
            Self::All => true,
            Self::ClientNameKeywords(keywords) => {
                contains_any_word(&delivery.client.name, keywords)
            }
            Self::RemarksKeywords(keywords) => contains_any_word(&delivery.remarks, keywords),
            Self::Client(name) => delivery.client.name == *name,
            Self::Status(status) => delivery.status == *status,
            Self::ScheduledOn(date) => delivery.scheduled_at.date() == *date,
            Self::Tag(tag) => delivery.tag.as_ref() == Some(tag),
            Self::AllOf(filters) => filters.iter().all(|filter| filter.matches(delivery)),
        }
    }
}

/// Both active filters, captured together by checkpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilters {
    pub client: ClientFilter,
    pub delivery: DeliveryFilter,
}

/// Returns the items matching `filter`, in collection order.
pub fn filtered_view<'a, T, F>(items: &'a [T], filter: &F) -> Vec<&'a T>
where
    F: EntityFilter<T> + ?Sized,
{
    items.iter().filter(|item| filter.matches(item)).collect()
}

fn contains_any_word(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| {
        let keyword = keyword.trim();
        !keyword.is_empty()
            && text
                .split_whitespace()
                .any(|word| word.eq_ignore_ascii_case(keyword))
    })
}

//! Seed content for a first run without a data file.

use crate::model::client::Client;
use crate::model::delivery::{Cost, Delivery, DeliveryStatus};
use crate::model::food_book::FoodBookSnapshot;
use crate::model::tag::Tag;
use chrono::{NaiveDate, NaiveDateTime};

/// Small, valid book with three clients and three deliveries.
pub fn sample_food_book() -> FoodBookSnapshot {
    let alex = Client::new(
        "Alex Yeoh",
        "87438807",
        "alexyeoh@example.com",
        "Blk 30 Geylang Street 29, #06-40",
    )
    .with_tags(tags(&["regular"]));
    let bernice = Client::new(
        "Bernice Yu",
        "99272758",
        "berniceyu@example.com",
        "Blk 30 Lorong 3 Serangoon Gardens, #07-18",
    )
    .with_tags(tags(&["vegetarian", "office"]));
    let charlotte = Client::new(
        "Charlotte Oliveiro",
        "93210283",
        "charlotte@example.com",
        "Blk 11 Ang Mo Kio Street 74, #11-04",
    );

    let deliveries = vec![
        Delivery::new(
            1,
            alex.clone(),
            at(2024, 6, 3, 11, 30),
            "Two chicken rice, less oil",
            Cost::from_cents(1250),
        )
        .with_status(DeliveryStatus::Delivered),
        Delivery::new(
            2,
            bernice.clone(),
            at(2024, 6, 4, 12, 0),
            "Vegetarian bento for the team",
            Cost::from_cents(4800),
        )
        .with_tag(Tag::parse("bulk").ok()),
        Delivery::new(
            3,
            alex.clone(),
            at(2024, 6, 5, 18, 45),
            "Dinner set, leave at door",
            Cost::from_cents(890),
        ),
    ];

    FoodBookSnapshot {
        clients: vec![alex, bernice, charlotte],
        deliveries,
    }
}

fn tags(values: &[&str]) -> Vec<Tag> {
    values
        .iter()
        .filter_map(|value| Tag::parse(*value).ok())
        .collect()
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

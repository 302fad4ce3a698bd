//! Parsing of the `ordering` query parameter.
//!
//! A leading `-` means descending. An absent or unrecognized key falls back
//! to the most recently updated first.

use sea_orm::Order;

use crate::models::reviews;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferSortKey {
    CreatedAt,
    UpdatedAt,
    MinPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferOrdering {
    pub key: OfferSortKey,
    pub descending: bool,
}

impl Default for OfferOrdering {
    fn default() -> Self {
        Self {
            key: OfferSortKey::UpdatedAt,
            descending: true,
        }
    }
}

fn split_direction(raw: &str) -> (&str, bool) {
    match raw.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (raw, false),
    }
}

fn direction(descending: bool) -> Order {
    if descending { Order::Desc } else { Order::Asc }
}

impl OfferOrdering {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::default();
        };
        let (name, descending) = split_direction(raw);
        let key = match name {
            "created_at" => OfferSortKey::CreatedAt,
            "updated_at" => OfferSortKey::UpdatedAt,
            "min_price" => OfferSortKey::MinPrice,
            _ => return Self::default(),
        };
        Self { key, descending }
    }

    pub fn order(&self) -> Order {
        direction(self.descending)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReviewOrdering {
    pub column: reviews::Column,
    pub descending: bool,
}

impl Default for ReviewOrdering {
    fn default() -> Self {
        Self {
            column: reviews::Column::UpdatedAt,
            descending: true,
        }
    }
}

impl ReviewOrdering {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::default();
        };
        let (name, descending) = split_direction(raw);
        let column = match name {
            "updated_at" => reviews::Column::UpdatedAt,
            "rating" => reviews::Column::Rating,
            _ => return Self::default(),
        };
        Self { column, descending }
    }

    pub fn order(&self) -> Order {
        direction(self.descending)
    }
}

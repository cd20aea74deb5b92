use serde::{Deserialize, Serialize};
use std::fmt;

use crate::plugins::trackers::PriceTracker;

pub const NO_TITLE: &str = "No title";

/// Where an entry's price text came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriceOrigin {
    /// Text of the first price-selector match.
    Selector,
    /// Number-like run found by scanning the item's whole text.
    TextScan,
    /// Neither strategy produced usable text.
    Missing,
}

/// One candidate listing as found on the page, before any judgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawEntry {
    pub title: String,
    pub price_text: Option<String>,
    pub price_origin: PriceOrigin,
    pub link: String,
}

/// An entry whose price parsed. Entries without one never get this far.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedEntry {
    pub title: String,
    pub price_text: Option<String>,
    pub price: f64,
    pub link: String,
}

impl RawEntry {
    pub fn normalize(self, prices: &PriceTracker) -> Option<NormalizedEntry> {
        let price = prices.normalize(self.price_text.as_deref())?;
        Some(NormalizedEntry {
            title: self.title,
            price_text: self.price_text,
            price,
            link: self.link,
        })
    }
}

impl NormalizedEntry {
    pub fn identity(&self) -> EntryIdentity {
        EntryIdentity::of(self)
    }

    /// Text shown as the price in notifications: what the page said, or
    /// the parsed number when the page text was blank.
    pub fn display_price(&self) -> String {
        match self.price_text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!("{}", self.price),
        }
    }
}

/// Dedup key: `"<link-or-title>|<price>"`.
///
/// The price is part of the key, so a listing that changes price is a new
/// identity and is announced again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryIdentity(String);

impl EntryIdentity {
    pub fn of(entry: &NormalizedEntry) -> Self {
        let subject = if entry.link.is_empty() {
            &entry.title
        } else {
            &entry.link
        };
        // A zero price is written as an empty suffix, as in existing seen files.
        if entry.price == 0.0 {
            EntryIdentity(format!("{}|", subject))
        } else {
            EntryIdentity(format!("{}|{}", subject, entry.price))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntryIdentity {
    fn from(value: String) -> Self {
        EntryIdentity(value)
    }
}

impl fmt::Display for EntryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

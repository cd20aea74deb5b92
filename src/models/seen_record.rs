use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::NormalizedEntry;

/// What the dedup store keeps for an announced entry. Written once, never
/// updated. Field names match the on-disk layout (`ts` in epoch millis).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeenRecord {
    #[serde(rename = "ts", with = "chrono::serde::ts_milliseconds")]
    pub notified_at: DateTime<Utc>,
    pub title: String,
    pub price: f64,
    pub link: String,
}

impl SeenRecord {
    pub fn new(entry: &NormalizedEntry, notified_at: DateTime<Utc>) -> Self {
        Self {
            notified_at,
            title: entry.title.clone(),
            price: entry.price,
            link: entry.link.clone(),
        }
    }
}

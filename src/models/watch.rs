use serde::{Deserialize, Serialize};
use validator::Validate;

/// One configured listing page plus the selectors and thresholds used to
/// judge its entries. Loaded once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchDefinition {
    #[serde(default)]
    pub name: String,

    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,

    #[validate(length(min = 1, message = "itemSelector must not be empty"))]
    pub item_selector: String,

    #[serde(default)]
    pub title_selector: Option<String>,
    #[serde(default)]
    pub price_selector: Option<String>,
    #[serde(default)]
    pub link_selector: Option<String>,

    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub expected_resale_value: Option<f64>,
    #[serde(default)]
    pub min_profit: Option<f64>,
}

impl WatchDefinition {
    /// Name used in logs and notification footers.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.url
        } else {
            &self.name
        }
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{EvaluationResult, NormalizedEntry, WatchDefinition, format_amount};
use crate::utils::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Everything a sink needs to announce one qualifying entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationMessage {
    pub title: String,
    pub link: String,
    pub fields: Vec<NotificationField>,
    /// Watch the entry came from.
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl NotificationMessage {
    pub fn for_entry(
        entry: &NormalizedEntry,
        watch: &WatchDefinition,
        evaluation: &EvaluationResult,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut fields = vec![
            NotificationField {
                name: "Price".to_string(),
                value: entry.display_price(),
                inline: true,
            },
            NotificationField {
                name: "Max price".to_string(),
                value: watch
                    .max_price
                    .map(format_amount)
                    .unwrap_or_else(|| "none".to_string()),
                inline: true,
            },
        ];

        if let Some(profit) = evaluation.profit {
            fields.push(NotificationField {
                name: "Estimated profit".to_string(),
                value: format_amount(profit),
                inline: true,
            });
        }

        Self {
            title: entry.title.clone(),
            link: entry.link.clone(),
            fields,
            source: watch.label().to_string(),
            timestamp,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// A destination for notifications.
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Check that the destination is reachable. Run once at startup.
    async fn test_connection(&self) -> Result<()>;

    async fn notify(&self, message: &NotificationMessage) -> Result<()>;
}

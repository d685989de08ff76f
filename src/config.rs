use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    Kept,
    NoShow,
    Cancelled,
    Unclassified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayHours {
    pub opens: String,
    pub closes: String,
    pub enabled: bool,
}

impl DayHours {
    pub fn open_hour(&self) -> u32 {
        parse_hour(&self.opens)
    }

    pub fn close_hour(&self) -> u32 {
        parse_hour(&self.closes)
    }
}

// Open/closed is decided at whole-hour granularity; "09:30" opens at hour 9.
// An unparseable value yields hour 0, which leaves the day without open hours.
fn parse_hour(value: &str) -> u32 {
    value
        .split(':')
        .next()
        .and_then(|h| h.trim().parse::<u32>().ok())
        .filter(|h| *h <= 24)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub chairs: u32,
    pub slot_minutes: u32,
    pub week: [DayHours; 7],
    pub kept_statuses: Vec<String>,
    pub noshow_statuses: Vec<String>,
    pub cancelled_statuses: Vec<String>,
}

impl Default for ShopConfig {
    fn default() -> Self {
        let closed = DayHours {
            opens: "00:00".to_string(),
            closes: "00:00".to_string(),
            enabled: false,
        };
        let open = DayHours {
            opens: "09:00".to_string(),
            closes: "19:00".to_string(),
            enabled: true,
        };

        ShopConfig {
            chairs: 2,
            slot_minutes: 30,
            week: [
                closed.clone(),
                closed,
                open.clone(),
                open.clone(),
                open.clone(),
                open.clone(),
                open,
            ],
            kept_statuses: vec![
                "completed".to_string(),
                "kept".to_string(),
                "showed".to_string(),
            ],
            noshow_statuses: vec![
                "no-show".to_string(),
                "noshow".to_string(),
                "missed".to_string(),
            ],
            cancelled_statuses: vec!["cancelled".to_string(), "canceled".to_string()],
        }
    }
}

impl ShopConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<ShopConfig> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                let config = serde_json::from_str(&raw)
                    .with_context(|| format!("invalid config {}", path.display()))?;
                Ok(config)
            }
            None => Ok(ShopConfig::default()),
        }
    }

    pub fn classify_status(&self, status: &str) -> StatusBucket {
        let needle = status.trim();
        if matches_any(&self.kept_statuses, needle) {
            StatusBucket::Kept
        } else if matches_any(&self.noshow_statuses, needle) {
            StatusBucket::NoShow
        } else if matches_any(&self.cancelled_statuses, needle) {
            StatusBucket::Cancelled
        } else {
            StatusBucket::Unclassified
        }
    }
}

fn matches_any(set: &[String], needle: &str) -> bool {
    set.iter().any(|entry| entry.trim().eq_ignore_ascii_case(needle))
}

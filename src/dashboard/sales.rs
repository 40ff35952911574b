//! Monthly Sales Ranking
//!
//! View model for the "top seller of the month" donut chart and the agent
//! ranking next to it. `aggregate` is pure; `SalesWidget` adds the fetch and
//! the presentation helpers (colours, podium, tooltip, title).

use chrono::{DateTime, Datelike, TimeZone};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use crate::api::{paths, ApiClient, ClientResult, RawWeeklySales};

/// Name of the placeholder slice shown when nobody sold anything
pub const NO_DATA_LABEL: &str = "Aucun agent";

/// Slice colours, assigned by rank modulo length
pub const PALETTE: [&str; 6] = ["#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#AA46BE", "#33A1FD"];

pub const SENTINEL_COLOR: &str = "#E5E7EB";

/// Markers for the first three ranks
pub const PODIUM: [&str; 3] = ["🏆", "🥈", "🥉"];

const MONTHS_FR: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
    "octobre", "novembre", "décembre",
];

/// One slice of the chart / one line of the ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankEntry {
    pub name: String,
    /// Total sales for the month
    pub value: f64,
    /// Share of the grand total, one decimal place
    pub percent: f64,
    /// The "no data" placeholder; rendered grey and not interactive
    pub is_sentinel: bool,
}

impl RankEntry {
    fn sentinel() -> Self {
        Self {
            name: NO_DATA_LABEL.to_string(),
            value: 1.0,
            percent: 100.0,
            is_sentinel: true,
        }
    }
}

/// Sum of every numeric leaf under `value`, whatever the nesting
fn sum_leaves(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Object(map) => map.values().map(sum_leaves).sum(),
        Value::Array(items) => items.iter().map(sum_leaves).sum(),
        _ => 0.0,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Rank agents by total monthly sales
///
/// Agents without sales are dropped. If nobody sold anything the result is a
/// single sentinel entry. Otherwise entries carry their percentage of the
/// grand total and are sorted by total, descending; ties keep input order.
pub fn aggregate(raw: &RawWeeklySales) -> Vec<RankEntry> {
    let totals: Vec<(String, f64)> = raw
        .iter()
        .map(|(agent, weeks)| (agent.clone(), sum_leaves(weeks)))
        .filter(|(_, total)| *total > 0.0)
        .collect();

    let grand_total: f64 = totals.iter().map(|(_, total)| total).sum();
    if grand_total == 0.0 {
        return vec![RankEntry::sentinel()];
    }

    let mut entries: Vec<RankEntry> = totals
        .into_iter()
        .map(|(name, value)| RankEntry {
            name,
            value,
            percent: round1(value / grand_total * 100.0),
            is_sentinel: false,
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    entries
}

/// Format a count without a trailing ".0"
fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Chart title for the month containing `now`, in `now`'s own time zone
///
/// Callers pass local time so the title flips at local midnight.
pub fn month_title<Tz: TimeZone>(now: DateTime<Tz>) -> String {
    let month = MONTHS_FR[now.month0() as usize];
    let mut chars = month.chars();
    let capitalised: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("Top Vendeur du mois : {}", capitalised)
}

/// Sales chart + ranking state
#[derive(Debug, Clone, Default)]
pub struct SalesWidget {
    entries: Vec<RankEntry>,
}

impl SalesWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(raw: &RawWeeklySales) -> Self {
        Self {
            entries: aggregate(raw),
        }
    }

    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    /// Fetch and aggregate this month's sales
    ///
    /// On failure the error is logged and the previous entries are kept.
    pub async fn load(&mut self, client: &ApiClient) -> bool {
        let entries = fetch_monthly_ranking(client).await;
        if entries.is_empty() {
            return false;
        }
        self.entries = entries;
        true
    }

    /// True when only the placeholder is shown
    pub fn is_empty(&self) -> bool {
        matches!(self.entries.as_slice(), [only] if only.is_sentinel)
    }

    pub fn color(&self, index: usize) -> &'static str {
        match self.entries.get(index) {
            Some(entry) if entry.is_sentinel => SENTINEL_COLOR,
            _ => PALETTE[index % PALETTE.len()],
        }
    }

    pub fn podium(index: usize) -> Option<&'static str> {
        PODIUM.get(index).copied()
    }

    /// Hover text for a slice
    pub fn tooltip(&self, entry: &RankEntry) -> String {
        if self.is_empty() && entry.is_sentinel {
            "Pas de ventes réalisées".to_string()
        } else {
            format!(
                "{:.1}% du total ({} ventes)",
                entry.percent,
                format_count(entry.value)
            )
        }
    }

    /// Ranking lines as displayed next to the chart
    pub fn ranking_lines(&self) -> Vec<String> {
        if self.is_empty() {
            return vec![NO_DATA_LABEL.to_string()];
        }

        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let marker = Self::podium(idx).unwrap_or("  ");
                format!(
                    "{} {}. {} — {} ventes ({:.1}%)",
                    marker,
                    idx + 1,
                    entry.name,
                    format_count(entry.value),
                    entry.percent
                )
            })
            .collect()
    }
}

/// `GET /sales/monthly-agents-charthorizontal`
pub async fn fetch_raw_sales(client: &ApiClient) -> ClientResult<RawWeeklySales> {
    client.get_json(paths::MONTHLY_SALES).await
}

/// Fetch and rank this month's sales; empty only when the request failed
pub async fn fetch_monthly_ranking(client: &ApiClient) -> Vec<RankEntry> {
    match fetch_raw_sales(client).await {
        Ok(raw) => {
            let entries = aggregate(&raw);
            tracing::debug!(agents = entries.len(), "Sales ranking loaded");
            entries
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load monthly sales");
            Vec::new()
        }
    }
}

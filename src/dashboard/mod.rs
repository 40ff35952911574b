//! Dashboard Widgets
//!
//! View models for the data-visualization cards.

pub mod sales;

pub use sales::{
    aggregate, fetch_monthly_ranking, fetch_raw_sales, month_title, RankEntry, SalesWidget,
    NO_DATA_LABEL,
};

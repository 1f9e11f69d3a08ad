//! Transport-layer types and display formatting shared by the dashboard
//! controller and its browser bindings.
//!
//! The payload structs mirror what the dashboard endpoints return so both
//! sides decode responses without duplicating shapes.

mod format;
mod payload;

pub use format::{
    CURRENCY_CODE, StatFormat, format_currency, format_date, format_millions, format_naive_date,
    format_number, format_stat_value,
};
pub use payload::{SeriesPayload, StatValue, StatsSnapshot};

//! Stat aggregation shown in the table and the detail overlay.

use crate::types::Stat;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatSummary {
    pub total: u32,
    /// None when there are no stats to average.
    pub average: Option<f64>,
}

pub fn summarize(stats: &[Stat]) -> StatSummary {
    let total: u32 = stats.iter().map(|s| s.base_stat).sum();
    let average = if stats.is_empty() {
        None
    } else {
        Some(total as f64 / stats.len() as f64)
    };
    StatSummary { total, average }
}

pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// Bar length for `value` relative to `max_value`, at most `width` cells.
pub fn bar_width(value: u32, max_value: u32, width: u16) -> u16 {
    if max_value == 0 || width == 0 {
        return 0;
    }
    let cells = (value.min(max_value) as u64 * width as u64) / max_value as u64;
    cells as u16
}

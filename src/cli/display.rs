//! Number formatting for terminal output

use crate::core::{round_up_count, MetricUnit};

/// Insert `,` every three digits
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

/// Whole dollars: `$15,000`
pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    if rounded < 0 {
        format!("-${}", group_thousands(-rounded))
    } else {
        format!("${}", group_thousands(rounded))
    }
}

/// Plan requirement, rounded up to whole units
pub fn format_count(value: f64) -> String {
    group_thousands(round_up_count(value) as i64)
}

/// Projected volume: fractions below one keep two decimals
pub fn format_projected(value: f64) -> String {
    if value > 0.0 && value < 1.0 {
        format!("{:.2}", value)
    } else {
        group_thousands(value.round() as i64)
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

pub fn format_metric(value: f64, unit: MetricUnit) -> String {
    match unit {
        MetricUnit::Percent => format_percent(value),
        MetricUnit::Currency => format_currency(value),
        MetricUnit::Days => format!("{} days", value.round() as i64),
    }
}

/// Gap magnitude; the sign is conveyed by an arrow
pub fn format_gap(gap: f64, unit: MetricUnit) -> String {
    let arrow = if gap > 0.0 {
        "▲"
    } else if gap < 0.0 {
        "▼"
    } else {
        "="
    };
    let magnitude = match unit {
        MetricUnit::Percent => format_percent(gap.abs()),
        MetricUnit::Currency => format_currency(gap.abs()),
        MetricUnit::Days => format!("{}", gap.abs().round() as i64),
    };
    format!("{} {}", arrow, magnitude)
}

/// Fixed-width bar for a 0-100 percentage
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(-45_000), "-45,000");
    }

    #[test]
    fn test_currency_and_counts() {
        assert_eq!(format_currency(15_000.0), "$15,000");
        assert_eq!(format_currency(27_890.625), "$27,891");
        assert_eq!(format_count(2083.333), "2,084");
        assert_eq!(format_count(100.000_000_000_01), "100");
        assert_eq!(format_projected(0.45), "0.45");
        assert_eq!(format_projected(5.578), "6");
    }

    #[test]
    fn test_metrics_and_gaps() {
        assert_eq!(format_metric(30.0, MetricUnit::Percent), "30.00%");
        assert_eq!(format_metric(30.0, MetricUnit::Days), "30 days");
        assert_eq!(format_gap(-5.0, MetricUnit::Percent), "▼ 5.00%");
        assert_eq!(format_gap(0.0, MetricUnit::Currency), "= $0");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(50.0, 10), "█████░░░░░");
        assert_eq!(progress_bar(150.0, 4), "████");
        assert_eq!(progress_bar(0.0, 4), "░░░░");
    }
}

//! Display strings for a damage summary.

use crate::types::{DamageSummary, EstimateType};

/// Appended after the persistent totals.
pub const PERSISTENT_MARKER: &str = r#"<i class="fa-duotone fa-hourglass"></i>"#;

/// Rule drawn between the roll button's own label and the estimate.
const SEPARATOR_HTML: &str = r#"<hr style="width:80%; opacity:0.5">"#;

/// Midpoint of the bounds rounded to one decimal, halves toward positive infinity.
/// Scales and offsets as two separately rounded steps, like `Math.round(x * 10) / 10`.
#[allow(clippy::suboptimal_flops, reason = "fused multiply-add rounds once and drifts from the host's result")]
fn average(min: f64, max: f64) -> f64 {
    let midpoint = (min + max) / 2.0;
    return (midpoint * 10.0 + 0.5).floor() / 10.0;
}

/// Render one pair of bounds in the requested mode.
/// `Disabled` never reaches here in practice and renders like average-and-range.
fn damage_string(min: f64, max: f64, estimate_type: EstimateType) -> String {
    let min_text = display_number(min);
    let max_text = display_number(max);

    return match estimate_type {
        EstimateType::Average => display_number(average(min, max)),
        EstimateType::AverageAndRange | EstimateType::Disabled => {
            format!("{} ({min_text}~{max_text})", display_number(average(min, max)))
        },
        EstimateType::Range => format!("{min_text}~{max_text}"),
    };
}

/// Shortest round-trip rendering: `10`, `3.5`. Negative zero prints as `0`.
pub fn display_number(value: f64) -> String {
    let normalized = value + 0.0;
    return format!("{normalized}");
}

/// Render the estimate text, or `None` when the estimate is disabled.
pub fn format_estimate(summary: &DamageSummary, estimate_type: EstimateType) -> Option<String> {
    if estimate_type == EstimateType::Disabled {
        return None;
    }

    let mut text = damage_string(summary.min_total, summary.max_total, estimate_type);
    if summary.has_persistent {
        let persistent = damage_string(
            summary.min_persistent_total,
            summary.max_persistent_total,
            estimate_type,
        );
        text.push_str(&format!(" + {persistent} {PERSISTENT_MARKER}"));
    }
    return Some(text);
}

/// Wrap an estimate for appending to the roll button.
pub fn wrap_html(display: &str) -> String {
    return format!(r#"{SEPARATOR_HTML}<span class="damage instance color">{display}</span>"#);
}

//! Core domain types for damage segments, summaries, and display modes.

/// One parsed piece of a compound damage formula.
/// Built once per segment during extraction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DamageSegment {
    /// Trimmed damage text, still in dice notation (e.g. `2d6+3`).
    pub formula: String,
    /// Whether the segment's markup marked it as persistent or bleed damage.
    pub is_persistent: bool,
    /// `formula` with every `NdS` rewritten to `(N * S)`.
    pub max_expression: String,
    /// Result of evaluating `max_expression`.
    pub max_value: f64,
    /// `formula` with every `NdS` rewritten to `(N)`.
    pub min_expression: String,
    /// Result of evaluating `min_expression`.
    pub min_value: f64,
}

/// Aggregate bounds across all segments of one formula.
/// Ordinary and persistent damage are summed separately and never mixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct DamageSummary {
    /// True if at least one segment was persistent.
    pub has_persistent: bool,
    /// Sum of `max_value` over persistent segments.
    pub max_persistent_total: f64,
    /// Sum of `max_value` over ordinary segments.
    pub max_total: f64,
    /// Sum of `min_value` over persistent segments.
    pub min_persistent_total: f64,
    /// Sum of `min_value` over ordinary segments.
    pub min_total: f64,
}

impl DamageSummary {
    /// Fold one segment into the running totals.
    pub fn absorb(self, segment: &DamageSegment) -> Self {
        if segment.is_persistent {
            return Self {
                has_persistent: true,
                max_persistent_total: self.max_persistent_total + segment.max_value,
                min_persistent_total: self.min_persistent_total + segment.min_value,
                ..self
            };
        }

        return Self {
            max_total: self.max_total + segment.max_value,
            min_total: self.min_total + segment.min_value,
            ..self
        };
    }

    /// Aggregate a full list of segments, starting from all-zero totals.
    pub fn from_segments(segments: &[DamageSegment]) -> Self {
        return segments.iter().fold(Self::default(), Self::absorb);
    }
}

/// How the estimate is displayed. Chosen by the viewer, stored by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EstimateType {
    /// Average only, e.g. `10`.
    Average,
    /// Average followed by the range, e.g. `10 (5~15)`.
    #[default]
    AverageAndRange,
    /// No estimate at all; the caller skips rendering.
    Disabled,
    /// Range only, e.g. `5~15`.
    Range,
}

impl EstimateType {
    /// Map the host's stored integer setting back to a display mode.
    /// Unknown values render like average-and-range.
    pub const fn from_host_value(value: u8) -> Self {
        return match value {
            0 => Self::Disabled,
            1 => Self::Average,
            2 => Self::Range,
            _ => Self::AverageAndRange,
        };
    }
}

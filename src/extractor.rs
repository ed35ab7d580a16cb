//! Damage extraction: dice rewrite, bound evaluation, classification, and aggregation.

use regex::Regex;
use tracing::debug;

use crate::error::Error;
use crate::evaluator;
use crate::markup::{self, MarkupSegment};
use crate::types::{DamageSegment, DamageSummary};

/// Icon class marking bleed damage.
const BLEED_ICON: &str = "fa-droplet";

/// `NdS` dice notation: count, literal `d`, sides.
const DICE_PATTERN: &str = r"([0-9]+)d([0-9]+)";

/// Icon class marking persistent damage.
const PERSISTENT_ICON: &str = "fa-hourglass";

/// Rewrite, evaluate, and classify one segment.
///
/// # Errors
///
/// Returns evaluator errors for damage text that is not valid arithmetic
/// once dice notation has been rewritten.
fn evaluate_segment(segment: &MarkupSegment, dice: &Regex) -> Result<DamageSegment, Error> {
    let is_persistent = is_persistent_markup(&segment.markup);

    // A tagged element with no text still counts, as a zero-valued segment.
    let text = if segment.damage_text.is_empty() { "0" } else { segment.damage_text.as_str() };

    let min_expression = rewrite_dice_to_minimum(text, dice);
    let max_expression = rewrite_dice_to_maximum(text, dice);
    let min_value = evaluator::evaluate(&min_expression)?;
    let max_value = evaluator::evaluate(&max_expression)?;

    debug!(
        formula = %segment.damage_text,
        min_value,
        max_value,
        is_persistent,
        "extracted damage segment"
    );

    return Ok(DamageSegment {
        formula: segment.damage_text.clone(),
        is_persistent,
        max_expression,
        max_value,
        min_expression,
        min_value,
    });
}

/// Estimate the damage bounds of a tagged formula.
///
/// # Errors
///
/// Returns `Error::MarkupParseFailed` if the formula cannot be parsed, or
/// evaluator errors if a segment's damage text is not valid arithmetic.
pub fn extract_damage(raw_formula: &str) -> Result<DamageSummary, Error> {
    let segments = extract_segments(raw_formula)?;
    return Ok(DamageSummary::from_segments(&segments));
}

/// Parse a tagged formula into evaluated damage segments, in formula order.
///
/// # Errors
///
/// Returns `Error::MarkupParseFailed` if the formula cannot be parsed, or
/// evaluator errors if a segment's damage text is not valid arithmetic.
///
/// # Panics
///
/// Panics if the hardcoded dice regex is invalid (compile-time invariant).
pub fn extract_segments(raw_formula: &str) -> Result<Vec<DamageSegment>, Error> {
    #[allow(clippy::expect_used, reason = "hardcoded pattern, checked by tests")]
    let dice = Regex::new(DICE_PATTERN).expect("valid regex");

    let cleaned = markup::strip_precision(raw_formula)?;
    return markup::segments(&cleaned)?
        .iter()
        .map(|segment| return evaluate_segment(segment, &dice))
        .collect();
}

/// Persistent or bleed damage is flagged by its icon anywhere in the segment markup.
fn is_persistent_markup(markup: &str) -> bool {
    return markup.contains(PERSISTENT_ICON) || markup.contains(BLEED_ICON);
}

/// Every die shows its highest face: `NdS` becomes `(N * S)`.
fn rewrite_dice_to_maximum(text: &str, dice: &Regex) -> String {
    return dice.replace_all(text, "($1 * $2)").into_owned();
}

/// Every die shows a one: `NdS` becomes `(N)`.
fn rewrite_dice_to_minimum(text: &str, dice: &Regex) -> String {
    return dice.replace_all(text, "($1)").into_owned();
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    const FIRE_AND_BLEED: &str = concat!(
        r#"<span class="instance color fire">2d6+3 <i class="fa-solid fa-fire"></i></span>"#,
        r#"<span class="instance color bleed">1d6 <i class="fa-duotone fa-hourglass"></i>"#,
        r#"<i class="fa-solid fa-droplet"></i></span>"#,
    );

    fn dice() -> Regex {
        Regex::new(DICE_PATTERN).unwrap()
    }

    #[test]
    fn empty_formula_is_all_zero() {
        let summary = extract_damage("").unwrap();
        assert_eq!(summary, DamageSummary::default());
        assert!(!summary.has_persistent);
    }

    #[test]
    fn ordinary_and_persistent_are_summed_apart() {
        let summary = extract_damage(FIRE_AND_BLEED).unwrap();
        assert_eq!(summary.min_total, 5.0);
        assert_eq!(summary.max_total, 15.0);
        assert!(summary.has_persistent);
        assert_eq!(summary.min_persistent_total, 1.0);
        assert_eq!(summary.max_persistent_total, 6.0);
    }

    #[test]
    fn extraction_is_repeatable() {
        assert_eq!(extract_damage(FIRE_AND_BLEED).unwrap(), extract_damage(FIRE_AND_BLEED).unwrap());
    }

    #[test]
    fn bare_dice_bounds_are_count_and_count_times_sides() {
        let segments = extract_segments(r#"<span class="instance">4d8</span>"#).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].min_value, 4.0);
        assert_eq!(segments[0].max_value, 32.0);
    }

    #[test]
    fn rewrites_every_dice_group_before_evaluating() {
        let segments = extract_segments(r#"<span class="instance">2d6 + 1d4 + 3</span>"#).unwrap();
        assert_eq!(segments[0].min_expression, "(2) + (1) + 3");
        assert_eq!(segments[0].max_expression, "(2 * 6) + (1 * 4) + 3");
        assert_eq!(segments[0].min_value, 6.0);
        assert_eq!(segments[0].max_value, 19.0);
    }

    #[test]
    fn flat_damage_has_equal_bounds() {
        let segments = extract_segments(r#"<span class="instance">7</span>"#).unwrap();
        assert_eq!(segments[0].min_value, 7.0);
        assert_eq!(segments[0].max_value, 7.0);
        assert!(!segments[0].is_persistent);
    }

    #[test]
    fn multiplied_dice_keep_their_multiplier() {
        let segments = extract_segments(r#"<span class="instance">(2d6+4)*2 <i class="fa-fire"></i></span>"#).unwrap();
        assert_eq!(segments[0].min_value, 12.0);
        assert_eq!(segments[0].max_value, 32.0);
    }

    #[test]
    fn precision_damage_merges_into_its_segment() {
        let formula = concat!(
            r#"<span class="instance piercing">1d8+4 + "#,
            r#"<span class="precision">1d6<i class="fa-solid fa-crosshairs"></i></span>"#,
            r#" <i class="fa-solid fa-bow-arrow"></i></span>"#,
        );
        let segments = extract_segments(formula).unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].formula, "1d8+4 + 1d6");
        assert_eq!(segments[0].min_value, 6.0);
        assert_eq!(segments[0].max_value, 18.0);
    }

    #[test]
    fn bleed_icon_alone_marks_persistent() {
        let summary = extract_damage(r#"<span class="instance">1d4 <i class="fa-droplet"></i></span>"#).unwrap();
        assert!(summary.has_persistent);
        assert_eq!(summary.min_total, 0.0);
        assert_eq!(summary.max_persistent_total, 4.0);
    }

    #[test]
    fn empty_tagged_element_contributes_zero() {
        let formula = r#"<span class="instance">1d6</span><span class="instance"></span>"#;
        let segments = extract_segments(formula).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].min_value, 0.0);
        assert_eq!(segments[1].max_value, 0.0);
        assert_eq!(extract_damage(formula).unwrap().max_total, 6.0);
    }

    #[test]
    fn self_closing_persistent_icon_counts_as_persistent_zero() {
        let formula = r#"<span class="instance">1d6</span><i class="fa-duotone fa-hourglass"/>"#;
        let summary = extract_damage(formula).unwrap();
        assert!(summary.has_persistent);
        assert_eq!(summary.min_total, 1.0);
        assert_eq!(summary.max_total, 6.0);
        assert_eq!(summary.max_persistent_total, 0.0);

        assert_eq!(extract_segments("<span>1d6</span><br/><span>2</span>").unwrap().len(), 3);
    }

    #[test]
    fn untagged_debris_is_ignored() {
        let summary = extract_damage(r#"<span class="instance">1d10</span> + 99"#).unwrap();
        assert_eq!(summary.min_total, 1.0);
        assert_eq!(summary.max_total, 10.0);
    }

    #[test]
    fn evaluator_errors_propagate() {
        let result = extract_damage(r#"<span class="instance">2d6/0</span>"#);
        assert!(matches!(result, Err(Error::DivisionByZero { .. })));

        let result = extract_damage(r#"<span class="instance">2d6 fire</span>"#);
        assert!(matches!(result, Err(Error::MalformedExpression { .. })));
    }

    #[test]
    fn dice_rewrite_leaves_flat_arithmetic_alone() {
        assert_eq!(rewrite_dice_to_minimum("12d10+(3*2)", &dice()), "(12)+(3*2)");
        assert_eq!(rewrite_dice_to_maximum("12d10+(3*2)", &dice()), "(12 * 10)+(3*2)");
    }
}

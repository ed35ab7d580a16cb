//! CLI commands for damage-estimate: estimate, segments, eval, dialog.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::dialog::{self, DialogPayload};
use crate::error;
use crate::evaluator;
use crate::extractor;
use crate::formatter;
use crate::types::{DamageSegment, EstimateType};

/// Run the dialog hook on a JSON payload and print the update as JSON.
/// Prints nothing when the hook decides not to render.
///
/// # Errors
///
/// Returns `Error::Io` if the payload cannot be read, `Error::Json` if it is
/// not a valid payload, or config loading errors.
pub fn dialog(payload_path: Option<&Path>) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;

    let raw = match payload_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => read_stdin()?,
    };
    let payload: DialogPayload = serde_json::from_str(&raw)?;

    if let Some(update) = dialog::on_damage_dialog_rendered(&payload, &config) {
        println!("{}", serde_json::to_string_pretty(&update)?);
    }
    return Ok(());
}

/// Extract a formula's damage bounds and print the estimate.
///
/// # Errors
///
/// Returns config, input, markup, or evaluation errors.
pub fn estimate(formula: Option<&str>, mode: Option<EstimateType>, html: bool) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?.with_estimate_type(mode);

    if config.estimate_type == EstimateType::Disabled {
        return Ok(());
    }

    let formula = formula_or_stdin(formula)?;
    let summary = extractor::extract_damage(&formula)?;
    let Some(display) = formatter::format_estimate(&summary, config.estimate_type) else {
        return Ok(());
    };

    if html {
        println!("{}", formatter::wrap_html(&display));
    } else {
        println!("{display}");
    }
    return Ok(());
}

/// Evaluate a plain arithmetic expression and print the result.
///
/// # Errors
///
/// Returns `Error::MalformedExpression` or `Error::DivisionByZero`.
pub fn eval(expression: &str) -> Result<(), error::Error> {
    let value = evaluator::evaluate(expression)?;
    println!("{}", formatter::display_number(value));
    return Ok(());
}

/// Use the formula argument, or read it from stdin when none was given.
///
/// # Errors
///
/// Returns `Error::Io` if stdin cannot be read.
fn formula_or_stdin(formula: Option<&str>) -> Result<String, error::Error> {
    return match formula {
        Some(text) => Ok(text.to_string()),
        None => read_stdin(),
    };
}

/// Render one segment as a single breakdown line.
fn format_segment_line(index: usize, segment: &DamageSegment) -> String {
    let persistent = if segment.is_persistent { "  [persistent]" } else { "" };
    return format!(
        "#{}  {}  min {} = {}  max {} = {}{persistent}",
        index.saturating_add(1),
        segment.formula,
        segment.min_expression,
        formatter::display_number(segment.min_value),
        segment.max_expression,
        formatter::display_number(segment.max_value),
    );
}

/// Read all of stdin into a string.
///
/// # Errors
///
/// Returns `Error::Io` if stdin cannot be read.
fn read_stdin() -> Result<String, error::Error> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    return Ok(input);
}

/// Print the per-segment breakdown of a formula.
///
/// # Errors
///
/// Returns input, markup, evaluation, or JSON serialization errors.
pub fn segments(formula: Option<&str>, json: bool) -> Result<(), error::Error> {
    let formula = formula_or_stdin(formula)?;
    let segments = extractor::extract_segments(&formula)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
        return Ok(());
    }

    if segments.is_empty() {
        eprintln!("No damage segments found.");
        return Ok(());
    }

    for (index, segment) in segments.iter().enumerate() {
        println!("{}", format_segment_line(index, segment));
    }
    return Ok(());
}

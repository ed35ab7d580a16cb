use crate::config::CONFIG_FILE;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is
/// one, how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::DivisionByZero { expression } => render_division_by_zero(expression),
        Error::MalformedExpression { expression, reason } => render_malformed_expression(expression, reason),
        Error::TomlDe(err) => render_invalid_config(&err.to_string()),
        _ => render_generic(e),
    }
}

fn render_division_by_zero(expression: &str) -> String {
    format!("\
# Error: Division By Zero

A divisor in `{expression}` evaluates to zero.

## Fix

Remove the `/0` modifier from the damage formula.
")
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::Io(err) => format!("\
# Error: I/O

{err}
"),
        Error::Json(err) => format!("\
# Error: Invalid JSON

{err}

## Fix

A dialog payload needs at least a `formula` string:

    {{\"formula\": \"<span class=\\\"instance\\\">2d6</span>\"}}
"),
        Error::MarkupParseFailed { reason } => format!("\
# Error: Markup Parse Failed

Could not parse the damage formula: {reason}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_invalid_config(reason: &str) -> String {
    format!("\
# Error: Invalid Config

`{CONFIG_FILE}` could not be read: {reason}

## Fix

Valid keys:

    only_gm = false
    estimate_type = \"average-and-range\"   # or \"average\", \"range\", \"disabled\"
")
}

fn render_malformed_expression(expression: &str, reason: &str) -> String {
    format!("\
# Error: Malformed Expression

`{expression}`: {reason}

Only digits, `+ - * /`, parentheses, and `NdS` dice are understood.
")
}

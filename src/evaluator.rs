//! Single-pass arithmetic evaluation over `+ - * /` and parentheses.
//!
//! Multiplication and division are folded into the top of the term stack as
//! soon as their right operand closes; addition and subtraction push signed
//! terms that are summed once the group ends. Parenthesized groups recurse.

use crate::error::Error;

/// Deepest parenthesis nesting accepted before the input is rejected.
const MAX_NESTING: usize = 64;

/// A value waiting for the next operator.
#[derive(Clone, Copy)]
enum Operand {
    /// Result of a closed parenthesized group; no digits may follow it.
    Group(f64),
    /// Literal still accumulating base-10 digits.
    Number(f64),
}

impl Operand {
    /// The numeric value regardless of where it came from.
    const fn value(self) -> f64 {
        return match self {
            Operand::Group(value) | Operand::Number(value) => value,
        };
    }
}

/// Binary operator waiting for its right-hand operand.
#[derive(Clone, Copy)]
enum Operator {
    /// `+`
    Add,
    /// `/`
    Divide,
    /// `*`
    Multiply,
    /// `-`
    Subtract,
}

impl Operator {
    /// Map an operator character, or `None` for anything else.
    const fn from_char(c: char) -> Option<Self> {
        return match c {
            '*' => Some(Self::Multiply),
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            '/' => Some(Self::Divide),
            _ => None,
        };
    }
}

/// Whitespace-free view of one expression, plus the original text for errors.
struct Scanner<'a> {
    /// Non-whitespace characters in input order.
    chars: Vec<char>,
    /// The expression as the caller passed it.
    expression: &'a str,
}

impl Scanner<'_> {
    /// Combine `value` into the term stack using the pending operator.
    ///
    /// # Errors
    ///
    /// Returns `Error::DivisionByZero` for a zero divisor and
    /// `Error::MalformedExpression` if the result leaves the finite range.
    fn apply(&self, operator: Operator, value: f64, terms: &mut Vec<f64>) -> Result<(), Error> {
        let term = match operator {
            Operator::Add => value,
            Operator::Divide => {
                if value == 0.0 {
                    return Err(Error::DivisionByZero {
                        expression: self.expression.to_string(),
                    });
                }
                self.pop_term(terms)? / value
            },
            Operator::Multiply => self.pop_term(terms)? * value,
            Operator::Subtract => -value,
        };
        terms.push(self.finite(term)?);
        return Ok(());
    }

    /// Pass `value` through if it is finite.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedExpression` for infinities and NaN.
    fn finite(&self, value: f64) -> Result<f64, Error> {
        if value.is_finite() {
            return Ok(value);
        }
        return Err(self.malformed("value out of range"));
    }

    /// Build a `MalformedExpression` error for this expression.
    fn malformed(&self, reason: &str) -> Error {
        return Error::MalformedExpression {
            expression: self.expression.to_string(),
            reason: reason.to_string(),
        };
    }

    /// Take the left operand of `*` or `/` off the term stack.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedExpression` if the stack is empty.
    fn pop_term(&self, terms: &mut Vec<f64>) -> Result<f64, Error> {
        return terms
            .pop()
            .ok_or_else(|| return self.malformed("operator has no left operand"));
    }

    /// Fold one digit into the operand under construction.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedExpression` if the digit directly follows `)`
    /// or the literal no longer fits in an `f64`.
    fn push_digit(&self, operand: Option<Operand>, digit: u32) -> Result<Operand, Error> {
        return match operand {
            None => Ok(Operand::Number(f64::from(digit))),
            Some(Operand::Number(value)) => {
                Ok(Operand::Number(self.finite(value.mul_add(10.0, f64::from(digit)))?))
            },
            Some(Operand::Group(_)) => Err(self.malformed("digit directly after `)`")),
        };
    }

    /// Scan from `start` until the end of input (depth 0) or the matching `)`.
    /// Returns the group's value and the index just past where scanning stopped.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedExpression` on unbalanced parentheses, missing
    /// operands, unknown characters, or excessive nesting, and
    /// `Error::DivisionByZero` for a zero divisor.
    fn scan_group(&self, start: usize, depth: usize) -> Result<(f64, usize), Error> {
        if depth > MAX_NESTING {
            return Err(self.malformed("parentheses nested too deeply"));
        }

        let mut terms: Vec<f64> = Vec::new();
        let mut pending = Operator::Add;
        let mut operand: Option<Operand> = None;
        let mut index = start;

        loop {
            let Some(&c) = self.chars.get(index) else {
                if depth > 0 {
                    return Err(self.malformed("unclosed `(`"));
                }
                let value = operand.ok_or_else(|| return self.malformed("expression ends with an operator"))?;
                self.apply(pending, value.value(), &mut terms)?;
                return Ok((self.finite(terms.iter().sum())?, index));
            };

            if let Some(digit) = c.to_digit(10) {
                operand = Some(self.push_digit(operand, digit)?);
                index = index.saturating_add(1);
                continue;
            }

            match c {
                '(' => {
                    if operand.is_some() {
                        return Err(self.malformed("missing operator before `(`"));
                    }
                    let (value, next) = self.scan_group(index.saturating_add(1), depth.saturating_add(1))?;
                    operand = Some(Operand::Group(value));
                    index = next;
                    continue;
                },
                ')' => {
                    if depth == 0 {
                        return Err(self.malformed("unmatched `)`"));
                    }
                    let value = operand.ok_or_else(|| return self.malformed("missing operand before `)`"))?;
                    self.apply(pending, value.value(), &mut terms)?;
                    return Ok((self.finite(terms.iter().sum())?, index.saturating_add(1)));
                },
                _ => {},
            }

            let Some(operator) = Operator::from_char(c) else {
                return Err(self.malformed(&format!("unexpected character `{c}`")));
            };

            // A sign at the start of a group negates the first operand.
            let value = match operand.take() {
                Some(closed) => closed.value(),
                None if terms.is_empty() && matches!(operator, Operator::Add | Operator::Subtract) => 0.0,
                None => return Err(self.malformed("operator without an operand")),
            };
            self.apply(pending, value, &mut terms)?;
            pending = operator;
            index = index.saturating_add(1);
        }
    }
}

/// Evaluate an arithmetic expression of non-negative integers, `+ - * /`,
/// and parentheses. Whitespace is ignored. Division is never truncated.
///
/// # Errors
///
/// Returns `Error::MalformedExpression` for empty or ill-formed input and
/// `Error::DivisionByZero` when any divisor evaluates to zero.
pub fn evaluate(expression: &str) -> Result<f64, Error> {
    let scanner = Scanner {
        chars: expression.chars().filter(|c| return !c.is_whitespace()).collect(),
        expression,
    };

    if scanner.chars.is_empty() {
        return Err(scanner.malformed("empty expression"));
    }

    let (value, _) = scanner.scan_group(0, 0)?;
    return Ok(value);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    fn assert_malformed(expression: &str) {
        match evaluate(expression) {
            Err(Error::MalformedExpression { .. }) => {},
            other => panic!("expected malformed error for `{expression}`, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(evaluate("2+3*4").unwrap(), 14.0);
        assert_eq!(evaluate("2*3+4*5").unwrap(), 26.0);
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(evaluate("(2+3)*4").unwrap(), 20.0);
        assert_eq!(evaluate("((1+2)*(3+4))").unwrap(), 21.0);
        assert_eq!(evaluate("2*(3+(4-1)*2)").unwrap(), 18.0);
    }

    #[test]
    fn division_is_fractional() {
        assert_eq!(evaluate("10/4").unwrap(), 2.5);
        assert_eq!(evaluate("7/2+1").unwrap(), 4.5);
    }

    #[test]
    fn same_precedence_is_left_associative() {
        assert_eq!(evaluate("10-4-3").unwrap(), 3.0);
        assert_eq!(evaluate("8/4/2").unwrap(), 1.0);
        assert_eq!(evaluate("2-6/3").unwrap(), 0.0);
    }

    #[test]
    fn whitespace_is_ignored() {
        assert_eq!(evaluate("  ( 2 * 6 ) + 3 ").unwrap(), 15.0);
        assert_eq!(evaluate("1 2").unwrap(), 12.0);
    }

    #[test]
    fn leading_sign_negates_first_operand() {
        assert_eq!(evaluate("-5").unwrap(), -5.0);
        assert_eq!(evaluate("-2*3").unwrap(), -6.0);
        assert_eq!(evaluate("(-3)*2").unwrap(), -6.0);
        assert_eq!(evaluate("+4").unwrap(), 4.0);
    }

    #[test]
    fn multi_digit_numbers_accumulate() {
        assert_eq!(evaluate("120+35").unwrap(), 155.0);
    }

    #[test]
    fn zero_divisor_is_an_error() {
        assert!(matches!(evaluate("5/0"), Err(Error::DivisionByZero { .. })));
        assert!(matches!(evaluate("1/(2-2)"), Err(Error::DivisionByZero { .. })));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_malformed("");
        assert_malformed("   ");
        assert_malformed("(1+2");
        assert_malformed("1+2)");
        assert_malformed("3+");
        assert_malformed("2*-3");
        assert_malformed("()");
        assert_malformed("(2)3");
        assert_malformed("2(3)");
        assert_malformed("2d6");
        assert_malformed("1.5");
    }

    #[test]
    fn rejects_excessive_nesting() {
        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_malformed(&deep);

        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(evaluate(&shallow).unwrap(), 1.0);
    }

    #[test]
    fn rejects_values_beyond_f64_range() {
        let huge = "9".repeat(308);
        assert!(evaluate(&huge).unwrap().is_finite());

        assert_malformed(&"1".repeat(400));
        assert_malformed(&format!("{huge} * 10"));
        assert_malformed(&format!("{huge} + {huge}"));
        assert_malformed(&format!("({0}0 - {0}0) / 2", "1".repeat(400)));
    }
}

//! Numeric text entry.
//!
//! Normalizes what a user typed into an amount or price field. The
//! result keeps the formatted text for redisplay and, when the text is
//! a complete number, the committed value. Arithmetic never sees the
//! locale separator.

use rust_decimal::Decimal;

use super::decimal;
use super::order::AmountInput;

/// Default number of fractional digits accepted in a field.
pub const DEFAULT_INPUT_SCALE: u32 = 8;

/// Result of parsing one edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    /// Field emptied; commit `AmountInput::Cleared`.
    Cleared,
    /// Complete number; commit the value.
    Accepted { text: String, value: Decimal },
    /// Keep the text on screen but commit nothing (e.g. `"12."`).
    Incomplete { text: String },
}

impl ParsedInput {
    /// Value to commit to the store, if any.
    pub const fn commit(&self) -> Option<AmountInput> {
        match self {
            Self::Cleared => Some(AmountInput::Cleared),
            Self::Accepted { value, .. } => Some(AmountInput::Value(*value)),
            Self::Incomplete { .. } => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Cleared => "",
            Self::Accepted { text, .. } | Self::Incomplete { text } => text,
        }
    }
}

/// Parses raw field text.
///
/// `,` is always read as the decimal separator, minus signs are
/// dropped, a leading separator is dropped, everything else that is
/// not a digit is ignored, only the first separator is kept and the
/// fraction is cut to `scale` digits.
pub fn parse_amount(raw: &str, separator: char, scale: u32) -> ParsedInput {
    let mut text: String = raw
        .chars()
        .filter(|c| *c != '-')
        .map(|c| if c == ',' || c == '.' { separator } else { c })
        .collect();
    if text.starts_with(separator) {
        text.remove(0);
    }
    if text.is_empty() {
        return ParsedInput::Cleared;
    }

    let mut integer = String::new();
    let mut fraction: Option<String> = None;
    for c in text.chars() {
        if c == separator {
            fraction.get_or_insert_with(String::new);
        } else if c.is_ascii_digit() {
            match fraction.as_mut() {
                Some(frac) if frac.len() < scale as usize => frac.push(c),
                Some(_) => {}
                None => integer.push(c),
            }
        }
    }

    if integer.is_empty() {
        return ParsedInput::Incomplete {
            text: fraction.map(|f| format!("{separator}{f}")).unwrap_or_default(),
        };
    }

    let formatted = match &fraction {
        Some(frac) if scale > 0 => format!("{integer}{separator}{frac}"),
        _ => integer.clone(),
    };

    let canonical = match &fraction {
        Some(frac) if !frac.is_empty() => format!("{integer}.{frac}"),
        Some(_) if scale > 0 => return ParsedInput::Incomplete { text: formatted },
        _ => integer,
    };

    match decimal::parse(&canonical) {
        Ok(value) => ParsedInput::Accepted {
            text: formatted,
            value,
        },
        Err(_) => ParsedInput::Incomplete { text: formatted },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_is_cleared() {
        assert_eq!(parse_amount("", '.', 8), ParsedInput::Cleared);
        assert_eq!(parse_amount("-", '.', 8), ParsedInput::Cleared);
        assert_eq!(parse_amount("", '.', 8).commit(), Some(AmountInput::Cleared));
    }

    #[test]
    fn test_plain_number() {
        let parsed = parse_amount("12.5", '.', 8);
        assert_eq!(parsed.commit(), Some(AmountInput::Value(dec!(12.5))));
        assert_eq!(parsed.text(), "12.5");
    }

    #[test]
    fn test_comma_is_separator() {
        let parsed = parse_amount("12,5", '.', 8);
        assert_eq!(parsed.commit(), Some(AmountInput::Value(dec!(12.5))));

        let parsed = parse_amount("12.5", ',', 8);
        assert_eq!(parsed.text(), "12,5");
        assert_eq!(parsed.commit(), Some(AmountInput::Value(dec!(12.5))));
    }

    #[test]
    fn test_trailing_separator_is_incomplete() {
        let parsed = parse_amount("12.", '.', 8);
        assert_eq!(parsed, ParsedInput::Incomplete { text: "12.".to_string() });
        assert_eq!(parsed.commit(), None);
    }

    #[test]
    fn test_minus_and_leading_separator_stripped() {
        assert_eq!(
            parse_amount("-3", '.', 8).commit(),
            Some(AmountInput::Value(dec!(3)))
        );
        assert_eq!(
            parse_amount(".5", '.', 8).commit(),
            Some(AmountInput::Value(dec!(5)))
        );
    }

    #[test]
    fn test_fraction_cut_to_scale() {
        let parsed = parse_amount("1.123456789", '.', 8);
        assert_eq!(parsed.text(), "1.12345678");
        assert_eq!(parsed.commit(), Some(AmountInput::Value(dec!(1.12345678))));
    }

    #[test]
    fn test_second_separator_ignored() {
        let parsed = parse_amount("1.2.3", '.', 8);
        assert_eq!(parsed.commit(), Some(AmountInput::Value(dec!(1.23))));
    }
}

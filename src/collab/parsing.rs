use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Pull the first balanced JSON object out of model output.
///
/// Reasoning models sometimes wrap answers in `<think>` blocks or code fences;
/// both are skipped. Braces inside string literals do not affect nesting.
pub(crate) fn extract_json_object(input: &str) -> Option<&str> {
    let mut rest = input;
    let cleaned_start = loop {
        match (rest.find("<think>"), rest.find('{')) {
            (Some(think), Some(brace)) if think < brace => {
                let after = &rest[think..];
                match after.find("</think>") {
                    Some(end) => rest = &after[end + "</think>".len()..],
                    None => return None,
                }
            }
            (_, Some(brace)) => break brace,
            (_, None) => return None,
        }
    };

    let candidate = &rest[cleaned_start..];
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in candidate.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&candidate[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

/// Parse exactly one monetary amount: `1300`, `"$1,300"`, `"USD 99.50"`,
/// `"1,300 EUR"`. Ranges, several numbers, magnitude suffixes like `5k`,
/// and fractions longer than two digits (`"€1.300"`) are rejected.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let text = strip_code_suffix(strip_code_prefix(raw.trim()));
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    };
    let text = text.strip_prefix(CURRENCY_SYMBOLS).unwrap_or(text);

    let value = parse_grouped_number(text)?;
    Some(if negative { -value } else { value })
}

fn is_currency_code(text: &str) -> bool {
    text.len() == 3 && text.bytes().all(|byte| byte.is_ascii_uppercase())
}

fn strip_code_prefix(text: &str) -> &str {
    match (text.get(..3), text.get(3..)) {
        (Some(code), Some(rest)) if is_currency_code(code) => rest.trim_start(),
        _ => text,
    }
}

fn strip_code_suffix(text: &str) -> &str {
    let split = text.len().saturating_sub(3);
    match (text.get(..split), text.get(split..)) {
        (Some(rest), Some(code)) if is_currency_code(code) => rest.trim_end(),
        _ => text,
    }
}

/// Digits with optional `,` thousands groups and an optional one or two
/// digit fraction. Nothing else may appear.
fn parse_grouped_number(text: &str) -> Option<f64> {
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };
    if fraction.is_some_and(|fraction| fraction.len() > 2 || !all_digits(fraction)) {
        return None;
    }

    let mut groups = whole.split(',');
    let lead = groups.next()?;
    if !all_digits(lead) || (whole.contains(',') && lead.len() > 3) {
        return None;
    }
    let mut digits = lead.to_string();
    for group in groups {
        if group.len() != 3 || !all_digits(group) {
            return None;
        }
        digits.push_str(group);
    }

    let normalized = match fraction {
        Some(fraction) => format!("{digits}.{fraction}"),
        None => digits,
    };
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Deserialize an amount that may be a JSON number, a currency string, or
/// null. Null counts as `0.0`; a string that is not exactly one amount is an
/// error rather than a guess.
pub(crate) fn amount_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(0.0),
        serde_json::Value::Number(number) => number
            .as_f64()
            .filter(|value| value.is_finite())
            .ok_or_else(|| D::Error::custom(format!("unreadable amount {number}"))),
        serde_json::Value::String(text) => parse_amount(&text)
            .ok_or_else(|| D::Error::custom(format!("unreadable amount {text:?}"))),
        other => Err(D::Error::custom(format!("unreadable amount {other}"))),
    }
}

/// Deserialize a night count that may arrive as a number or numeric string.
pub(crate) fn lenient_nights<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(number) => number
            .as_u64()
            .map(|n| n.min(u32::MAX as u64) as u32)
            .or_else(|| number.as_f64().map(|n| n.max(0.0).round() as u32)),
        serde_json::Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    }
    .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_object() {
        assert_eq!(
            extract_json_object(r#"{"origin":"London"}"#),
            Some(r#"{"origin":"London"}"#)
        );
    }

    #[test]
    fn skips_think_blocks_and_fences() {
        let raw = "<think>maybe {\"draft\":1}</think>\n```json\n{\"a\":{\"b\":2}}\n```";
        assert_eq!(extract_json_object(raw), Some(r#"{"a":{"b":2}}"#));
    }

    #[test]
    fn ignores_braces_inside_strings() {
        let raw = r#"{"description":"use } carefully","n":1} trailing"#;
        assert_eq!(
            extract_json_object(raw),
            Some(r#"{"description":"use } carefully","n":1}"#)
        );
    }

    #[test]
    fn rejects_unbalanced_and_unclosed_think() {
        assert_eq!(extract_json_object(r#"{"a":1"#), None);
        assert_eq!(extract_json_object("<think>never closed {\"a\":1}"), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn parses_single_amounts() {
        assert_eq!(parse_amount("$1,300"), Some(1300.0));
        assert_eq!(parse_amount("USD 99.50"), Some(99.5));
        assert_eq!(parse_amount("1,300 EUR"), Some(1300.0));
        assert_eq!(parse_amount("£1,234,567.8"), Some(1234567.8));
        assert_eq!(parse_amount(" 650 "), Some(650.0));
        assert_eq!(parse_amount("-$20"), Some(-20.0));
    }

    #[test]
    fn rejects_anything_but_one_amount() {
        for raw in [
            "Free",
            "",
            "$",
            "$1,300 - $1,500",
            "$4,000-5,000",
            "2 x $650",
            "$5k",
            "€1.300",
            "€4.000",
            "1,30",
            "13,00,000",
            "1.2.3",
            "about $900",
        ] {
            assert_eq!(parse_amount(raw), None, "{raw:?}");
        }
    }

    #[derive(Debug, Deserialize)]
    struct Priced {
        #[serde(deserialize_with = "amount_or_zero", default)]
        price: f64,
        #[serde(deserialize_with = "lenient_nights", default)]
        nights: u32,
    }

    #[test]
    fn lenient_fields_accept_mixed_shapes() {
        let priced: Priced = serde_json::from_str(r#"{"price":"$2,000","nights":"4"}"#).unwrap();
        assert_eq!(priced.price, 2000.0);
        assert_eq!(priced.nights, 4);

        let priced: Priced = serde_json::from_str(r#"{"price":null,"nights":2}"#).unwrap();
        assert_eq!(priced.price, 0.0);
        assert_eq!(priced.nights, 2);

        let priced: Priced = serde_json::from_str("{}").unwrap();
        assert_eq!(priced.price, 0.0);
    }

    #[test]
    fn garbled_amount_is_a_deserialize_error() {
        let err = serde_json::from_str::<Priced>(r#"{"price":"$1,300 - $1,500"}"#).unwrap_err();
        assert!(err.to_string().contains("unreadable amount"), "{err}");
        assert!(serde_json::from_str::<Priced>(r#"{"price":true}"#).is_err());
    }
}

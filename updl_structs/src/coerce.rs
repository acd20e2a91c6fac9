use serde_json::Value;

/// Loose numeric coercion for node fields: numbers, numeric strings and booleans.
/// Anything that would end up non-finite is rejected so callers substitute their default.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Strings pass through; numbers and booleans are rendered. Empty strings count as absent.
pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Formats a number the way it is written into generated scripts.
/// Integral values drop the fraction and negative zero prints as `0`.
pub fn script_number(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    let n = n + 0.0;
    format!("{n}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_coerce() {
        assert_eq!(to_number(&json!(3)), Some(3.0));
        assert_eq!(to_number(&json!(-1.5)), Some(-1.5));
        assert_eq!(to_number(&json!(" 2.25 ")), Some(2.25));
        assert_eq!(to_number(&json!(true)), Some(1.0));
    }

    #[test]
    fn garbage_does_not_coerce() {
        assert_eq!(to_number(&json!("abc")), None);
        assert_eq!(to_number(&json!("")), None);
        assert_eq!(to_number(&json!("NaN")), None);
        assert_eq!(to_number(&json!(null)), None);
        assert_eq!(to_number(&json!([1])), None);
    }

    #[test]
    fn bools_accept_common_spellings() {
        assert_eq!(to_bool(&json!("Yes")), Some(true));
        assert_eq!(to_bool(&json!(0)), Some(false));
        assert_eq!(to_bool(&json!("maybe")), None);
    }

    #[test]
    fn script_numbers_are_compact() {
        assert_eq!(script_number(1.0), "1");
        assert_eq!(script_number(0.5), "0.5");
        assert_eq!(script_number(-0.0), "0");
        assert_eq!(script_number(f64::NAN), "0");
    }
}

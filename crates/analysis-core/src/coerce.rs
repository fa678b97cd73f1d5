//! Permissive numeric coercion.
//!
//! Statement rows arrive as loosely-typed field maps: numbers, formatted
//! strings, nulls and the occasional junk value. Every extraction point in
//! the engines goes through [`to_f64`] so the null-vs-zero distinction is
//! made in exactly one place: `None` means "not reported", `Some(0.0)` means
//! "reported as zero", and downstream rules rely on the difference.

use serde_json::Value;

/// Coerce a heterogeneous stored value to a finite f64, or `None`.
///
/// Accepted: JSON numbers (non-finite rejected), numeric strings with
/// thousands separators and either decimal mark ("1,234.56" / "1.234,56"),
/// and a trailing percent mark (stripped, not rescaled). Everything else —
/// null, booleans, arrays, objects, placeholder strings ("", "-", "N/A") —
/// is `None`.
pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_str(s),
        _ => None,
    }
}

fn parse_str(raw: &str) -> Option<f64> {
    let mut s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.ends_with('%') {
        s = s[..s.len() - 1].trim_end();
    }
    match s {
        "" | "-" | "--" => return None,
        _ if s.eq_ignore_ascii_case("n/a") || s.eq_ignore_ascii_case("na") => return None,
        _ => {}
    }

    let normalized = normalize_separators(s);
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Resolve '.' vs ',' ambiguity: when both occur, the right-most one is the
/// decimal mark; a lone comma is a decimal comma, repeated commas are
/// thousands separators.
fn normalize_separators(s: &str) -> String {
    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');
    match (last_dot, last_comma) {
        (Some(d), Some(c)) if c > d => s.replace('.', "").replacen(',', ".", 1),
        (Some(_), Some(_)) => s.replace(',', ""),
        (None, Some(_)) => {
            if s.matches(',').count() == 1 {
                s.replacen(',', ".", 1)
            } else {
                s.replace(',', "")
            }
        }
        _ => s.to_string(),
    }
}

/// Look up the first present field among `keys` in a JSON object and coerce.
pub fn field(map: &Value, keys: &[&str]) -> Option<f64> {
    let obj = map.as_object()?;
    for key in keys {
        if let Some(value) = obj.get(*key) {
            if let Some(parsed) = to_f64(value) {
                return Some(parsed);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_pass_through() {
        assert_eq!(to_f64(&json!(12.5)), Some(12.5));
        assert_eq!(to_f64(&json!(-3)), Some(-3.0));
        assert_eq!(to_f64(&json!(0)), Some(0.0));
    }

    #[test]
    fn null_and_zero_are_distinct() {
        assert_eq!(to_f64(&Value::Null), None);
        assert_eq!(to_f64(&json!(0.0)), Some(0.0));
    }

    #[test]
    fn plain_strings_parse() {
        assert_eq!(to_f64(&json!("42")), Some(42.0));
        assert_eq!(to_f64(&json!("  -7.25 ")), Some(-7.25));
    }

    #[test]
    fn separator_styles() {
        assert_eq!(to_f64(&json!("1,234.56")), Some(1234.56));
        assert_eq!(to_f64(&json!("1.234,56")), Some(1234.56));
        assert_eq!(to_f64(&json!("3,5")), Some(3.5));
        assert_eq!(to_f64(&json!("1,234,567")), Some(1_234_567.0));
    }

    #[test]
    fn percent_mark_is_stripped_not_rescaled() {
        assert_eq!(to_f64(&json!("12.5%")), Some(12.5));
        assert_eq!(to_f64(&json!("8 %")), Some(8.0));
    }

    #[test]
    fn placeholders_and_junk_are_none() {
        for v in ["", "-", "--", "N/A", "na", "abc"] {
            assert_eq!(to_f64(&json!(v)), None, "value {v:?}");
        }
        assert_eq!(to_f64(&json!(true)), None);
        assert_eq!(to_f64(&json!([1, 2])), None);
        assert_eq!(to_f64(&json!({"v": 1})), None);
    }

    #[test]
    fn field_takes_first_usable_alias() {
        let row = json!({"receita": "1.000,00", "revenue": null});
        assert_eq!(field(&row, &["revenue", "receita"]), Some(1000.0));
        assert_eq!(field(&row, &["missing"]), None);
        assert_eq!(field(&json!(3), &["revenue"]), None);
    }
}

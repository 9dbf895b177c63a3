use serde_json::Value;

use super::format_scalar;

/// Headline answer of each calculator, checked in order.
const PRIORITY_KEYS: [&str; 11] = [
    "monthly_payment",
    "eligible",
    "recommendation",
    "decision",
    "savings",
    "interest_saved",
    "metrics",
    "monthly_cash_flow",
    "summary",
    "break_even_year",
    "cleared",
];

/// Print just the key answer value from the output.
///
/// Looks for the calculator's headline field, descending one level into
/// nested summaries, then falls back to the first field of the result.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    println!("{}", headline(result_obj));
}

fn headline(result: &Value) -> String {
    let Value::Object(map) = result else {
        return format_scalar(result);
    };

    for key in PRIORITY_KEYS {
        match map.get(key) {
            Some(Value::Null) | None => continue,
            Some(nested @ Value::Object(_)) => return headline(nested),
            Some(val) => return format_scalar(val),
        }
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_scalar(val)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_wins() {
        let r = json!({ "loan_amount": "360000", "monthly_payment": "1798.65" });
        assert_eq!(headline(&r), "1798.65");
    }

    #[test]
    fn test_descends_into_summary() {
        let r = json!({ "entries": [], "summary": { "monthly_payment": "1798.65" } });
        assert_eq!(headline(&r), "1798.65");
    }

    #[test]
    fn test_fallback_first_field() {
        assert_eq!(headline(&json!({ "a": 1 })), "a: 1");
    }
}

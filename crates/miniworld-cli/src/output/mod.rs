pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into dotted keys (`financials.noi`). Arrays of
/// objects are kept as single values.
pub fn flatten(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut rows = Vec::new();
    flatten_into("", map, &mut rows);
    rows
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, rows: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&full, inner, rows),
            _ => rows.push((full, val.clone())),
        }
    }
}

/// Render a scalar for a table cell or CSV field.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested() {
        let value = json!({
            "financials": { "noi": "430174.8", "dscr": "0.55" },
            "dashboard": { "walk_compliance": "5-Min Walk Compliant" },
            "tenant_count": 4
        });
        let rows = flatten(value.as_object().unwrap());
        let keys: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();

        assert!(keys.contains(&"financials.noi"));
        assert!(keys.contains(&"dashboard.walk_compliance"));
        assert!(keys.contains(&"tenant_count"));
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_format_value_scalars() {
        assert_eq!(format_value(&json!("Car Dependent")), "Car Dependent");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&Value::Null), "");
        assert_eq!(format_value(&json!([1, 2])), "[1,2]");
    }
}

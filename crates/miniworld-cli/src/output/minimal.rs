use serde_json::Value;

use super::format_value;

/// Headline fields, most specific first. Report output nests them one
/// level down, so sections are searched too.
const PRIORITY_KEYS: [&str; 6] = [
    "final_score",
    "dscr",
    "total_project_cost",
    "noi",
    "id",
    "name",
];

const SECTIONS: [&str; 2] = ["financials", "walkability"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result_obj else {
        return format_value(result_obj);
    };

    for key in PRIORITY_KEYS {
        if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
            return format_value(val);
        }
    }

    // Report: one headline per section
    let headlines: Vec<String> = SECTIONS
        .iter()
        .filter_map(|section| map.get(*section).and_then(Value::as_object))
        .filter_map(|inner| {
            PRIORITY_KEYS
                .iter()
                .find_map(|k| inner.get(*k).map(|v| format!("{k}: {}", format_value(v))))
        })
        .collect();
    if !headlines.is_empty() {
        return headlines.join(", ");
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_value(val)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_walkability_headline() {
        let out = json!({ "result": { "avg_walk_distance": "266.6", "final_score": "48.25" } });
        assert_eq!(minimal_line(&out), "48.25");
    }

    #[test]
    fn test_report_headlines() {
        let out = json!({
            "result": {
                "financials": { "total_project_cost": "13707000", "dscr": "0.5567" },
                "walkability": { "final_score": "48.25" }
            }
        });
        assert_eq!(minimal_line(&out), "dscr: 0.5567, final_score: 48.25");
    }

    #[test]
    fn test_fallback_first_field() {
        let out = json!({ "result": { "leased_sf": "21700" } });
        assert_eq!(minimal_line(&out), "leased_sf: 21700");
    }
}

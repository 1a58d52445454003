use serde_json::Value;

/// Key answers in order of priority, as paths into the result object.
const PRIORITY_PATHS: [&[&str]; 6] = [
    &["irr", "irr_pct"],
    &["irr_pct"],
    &["monthly_payment"],
    &["roi"],
    &["total_net_cash_flow"],
    &["monthly_rent"],
];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(answer) = key_answer(result_obj) {
        println!("{}", format_minimal(answer));
        return;
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn key_answer(result: &Value) -> Option<&Value> {
    PRIORITY_PATHS.iter().find_map(|path| {
        path.iter()
            .try_fold(result, |node, key| node.get(*key))
            .filter(|v| !v.is_null())
    })
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

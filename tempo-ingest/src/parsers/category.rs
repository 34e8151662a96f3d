//! Category references arrive either as plain labels or as embedded category
//! documents (`{"_id": ..., "name": "Math", "color": "#f00"}`). Both collapse to
//! a single canonical [`Category`].

use serde_json::Value;
use tempo_core::Category;

const LABEL_KEYS: [&str; 3] = ["name", "label", "title"];

pub fn category_from_value(value: &Value) -> Option<Category> {
    let label = match value {
        Value::String(s) => s.trim(),
        Value::Object(map) => LABEL_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))?
            .trim(),
        _ => return None,
    };
    if label.is_empty() {
        return None;
    }
    Some(Category::new(label))
}

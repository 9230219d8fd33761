use serde_json::{Map, Value};

/// Converts a snake_case key to camelCase. Inverse of [`camel_to_snake`]
/// for keys made of lowercase ASCII words.
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Converts a camelCase key to snake_case.
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Rebuilds a JSON object with every key run through `transform`, values
/// untouched.
pub fn convert_keys(
    props: &Map<String, Value>,
    transform: impl Fn(&str) -> String,
) -> Map<String, Value> {
    props
        .iter()
        .map(|(key, value)| (transform(key), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snake_to_camel_joins_words() {
        assert_eq!(snake_to_camel("created_at"), "createdAt");
        assert_eq!(snake_to_camel("a_b_c"), "aBC");
        assert_eq!(snake_to_camel("title"), "title");
    }

    #[test]
    fn camel_to_snake_splits_on_uppercase() {
        assert_eq!(camel_to_snake("createdAt"), "created_at");
        assert_eq!(camel_to_snake("dueAt"), "due_at");
        assert_eq!(camel_to_snake("title"), "title");
    }

    #[test]
    fn round_trip_preserves_compound_keys() {
        for key in ["due_at", "created_at", "completed_at", "edited_at", "status"] {
            assert_eq!(camel_to_snake(&snake_to_camel(key)), key);
        }
        for key in ["dueAt", "createdAt", "completedAt", "editedAt", "title"] {
            assert_eq!(snake_to_camel(&camel_to_snake(key)), key);
        }
    }

    #[test]
    fn convert_keys_transforms_keys_only() {
        let mut props = Map::new();
        props.insert("dueAt".to_string(), json!("2026-01-01T00:00:00Z"));
        props.insert("title".to_string(), json!("groceries"));

        let converted = convert_keys(&props, camel_to_snake);

        assert_eq!(converted.get("due_at"), Some(&json!("2026-01-01T00:00:00Z")));
        assert_eq!(converted.get("title"), Some(&json!("groceries")));
        assert_eq!(converted.len(), 2);
    }
}

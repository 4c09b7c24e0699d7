use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Rewrite every snake_case object key in a JSON tree to camelCase.
///
/// Nested objects and arrays are processed recursively; scalars pass through
/// unchanged. Arrays keep their order and length. Key order within an object
/// is whatever the map yields. Total: keys that don't look snake_case are
/// kept verbatim.
pub fn snake_to_camel(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let converted: Map<String, Value> = map
                .into_iter()
                .map(|(key, val)| (camel_key(&key), snake_to_camel(val)))
                .collect();
            Value::Object(converted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(snake_to_camel).collect()),
        scalar => scalar,
    }
}

/// Convert a single key: an underscore immediately followed by an ASCII
/// lowercase letter is dropped and the letter uppercased. Leading and
/// trailing underscores, and underscores before digits or uppercase, are
/// kept as-is. Already-camelCase keys come back unchanged.
fn camel_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    let mut seen_word_char = false;

    while let Some(c) = chars.next() {
        if c == '_' && seen_word_char {
            match chars.peek() {
                Some(next) if next.is_ascii_lowercase() => {
                    // consume the underscore, uppercase the following letter
                    let next = chars.next().unwrap_or('_');
                    out.push(next.to_ascii_uppercase());
                    continue;
                }
                _ => {}
            }
        }
        if c != '_' {
            seen_word_char = true;
        }
        out.push(c);
    }

    out
}

/// Serde helper: accept a string or a number for identifier fields. The
/// backend serializes record ids as integers; the client treats every id as
/// an opaque string.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

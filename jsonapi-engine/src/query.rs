//! Bracket-notation query-string parser
//!
//! Turns `key=value` pairs joined by `&` into a JSON object, applied left to
//! right with later keys overwriting earlier ones at the same path:
//!
//! | Pair | Result |
//! |---|---|
//! | `key=v` | `{"key": "v"}` |
//! | `key[]=v` | `{"key": ["v"]}`, appending on repeats |
//! | `key[sub]=v` | `{"key": {"sub": "v"}}` |
//! | `a[b][c]=v` | `{"a[b]": {"c": "v"}}` |
//!
//! Nesting is a single level: the key is split at its **last** `[`, so
//! multiple bracket pairs do not produce deeper objects. Values are kept as
//! strings and are not percent-decoded. Pairs without `=` are ignored; only
//! the first `=` separates key from value.
//!
//! # Example
//!
//! ```rust
//! use jsonapi_engine::query::parse_query;
//! use serde_json::json;
//!
//! let query = parse_query("page[size]=10&page[number]=2&tags[]=a&tags[]=b");
//! assert_eq!(
//!     serde_json::Value::Object(query),
//!     json!({ "page": { "size": "10", "number": "2" }, "tags": ["a", "b"] })
//! );
//! ```

use serde_json::{Map, Value};

/// Parsed query: top-level key to string, string array, or one-level object
pub type QueryMap = Map<String, Value>;

/// Parse a query string; a leading `?` is ignored
pub fn parse_query(query: &str) -> QueryMap {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut result = QueryMap::new();

    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        insert(&mut result, key, value);
    }

    result
}

/// Parse the query component of a request URI
pub fn parse_uri_query(uri: &http::Uri) -> QueryMap {
    uri.query().map(parse_query).unwrap_or_default()
}

fn insert(result: &mut QueryMap, key: &str, value: &str) {
    let value = Value::String(value.to_string());

    if let Some(array_key) = key.strip_suffix("[]") {
        match result.get_mut(array_key) {
            Some(Value::Array(values)) => values.push(value),
            _ => {
                result.insert(array_key.to_string(), Value::Array(vec![value]));
            }
        }
        return;
    }

    if let Some((outer, inner)) = split_nested(key) {
        match result.get_mut(outer) {
            Some(Value::Object(nested)) => {
                nested.insert(inner.to_string(), value);
            }
            _ => {
                let mut nested = Map::new();
                nested.insert(inner.to_string(), value);
                result.insert(outer.to_string(), Value::Object(nested));
            }
        }
        return;
    }

    result.insert(key.to_string(), value);
}

// `outer[inner]` split at the last `[`. A key that is a single bracket
// group (`[x]`) or does not end with `]` is scalar.
fn split_nested(key: &str) -> Option<(&str, &str)> {
    if !key.ends_with(']') {
        return None;
    }
    let open = key.rfind('[')?;
    if key.starts_with('[') && key.matches('[').count() == 1 {
        return None;
    }
    Some((&key[..open], &key[open + 1..key.len() - 1]))
}

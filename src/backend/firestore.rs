//! Typed value encoding used by the hosted document REST API.
//!
//! Documents travel as `{"fields": {"title": {"stringValue": "..."}}}`. The
//! rest of the crate works with plain JSON objects, so this module converts
//! in both directions. Integers are strings on the wire.

use super::{Collection, Fields, Filter, StoredDocument};
use crate::error::{BackendError, BackendResult};
use serde_json::{json, Map, Value};

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(fields: &Fields) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect();
    Value::Object(encoded)
}

pub fn decode_value(value: &Value) -> BackendResult<Value> {
    let (kind, inner) = value
        .as_object()
        .and_then(|obj| obj.iter().next())
        .ok_or_else(|| BackendError::Decode(format!("untyped value: {value}")))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| BackendError::Decode(format!("bad boolean: {inner}"))),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(|i| json!(i))
                .ok_or_else(|| BackendError::Decode(format!("bad integer: {inner}")))
        }
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner.clone()),
            _ => Err(BackendError::Decode(format!("bad double: {inner}"))),
        },
        "stringValue" | "timestampValue" | "referenceValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| BackendError::Decode(format!("bad {kind}: {inner}"))),
        "arrayValue" => {
            // An empty array arrives without `values`.
            let items = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<BackendResult<Vec<_>>>()?,
                _ => Vec::new(),
            };
            Ok(Value::Array(items))
        }
        "mapValue" => decode_fields(inner.get("fields")).map(Value::Object),
        other => Err(BackendError::Decode(format!("unsupported value type `{other}`"))),
    }
}

pub fn decode_fields(fields: Option<&Value>) -> BackendResult<Fields> {
    match fields {
        None => Ok(Fields::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
            .collect(),
        Some(other) => Err(BackendError::Decode(format!("fields is not an object: {other}"))),
    }
}

/// Last path segment of a document resource name.
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

pub fn decode_document(doc: &Value) -> BackendResult<StoredDocument> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::Decode("document without name".to_string()))?;
    Ok(StoredDocument {
        id: document_id(name).to_string(),
        fields: decode_fields(doc.get("fields"))?,
    })
}

/// Body for a `:runQuery` request: equality filters joined with AND.
pub fn structured_query(collection: Collection, filters: &[Filter]) -> Value {
    let field_filters: Vec<Value> = filters
        .iter()
        .map(|filter| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": filter.field },
                    "op": "EQUAL",
                    "value": encode_value(&filter.value),
                }
            })
        })
        .collect();

    let mut query = json!({ "from": [{ "collectionId": collection.as_str() }] });
    match field_filters.len() {
        0 => {}
        1 => query["where"] = field_filters[0].clone(),
        _ => {
            query["where"] = json!({
                "compositeFilter": { "op": "AND", "filters": field_filters }
            })
        }
    }
    json!({ "structuredQuery": query })
}

/// Documents out of a `:runQuery` response; entries without a document are
/// progress markers and are skipped.
pub fn decode_query_response(rows: &[Value]) -> BackendResult<Vec<StoredDocument>> {
    rows.iter()
        .filter_map(|row| row.get("document"))
        .map(decode_document)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_nested_document() {
        let fields = json!({
            "title": "Read",
            "completed": false,
            "durationMinutes": 30,
            "itemOrder": ["a", "b"],
            "date": null
        })
        .as_object()
        .cloned()
        .unwrap();

        let encoded = encode_fields(&fields);
        assert_eq!(encoded["title"], json!({"stringValue": "Read"}));
        assert_eq!(encoded["completed"], json!({"booleanValue": false}));
        assert_eq!(encoded["durationMinutes"], json!({"integerValue": "30"}));
        assert_eq!(
            encoded["itemOrder"],
            json!({"arrayValue": {"values": [{"stringValue": "a"}, {"stringValue": "b"}]}})
        );
        assert_eq!(encoded["date"], json!({"nullValue": null}));

        let decoded = decode_fields(Some(&encoded)).unwrap();
        assert_eq!(decoded, fields);
    }

    #[test]
    fn test_decode_empty_array_and_timestamp() {
        let wire = json!({
            "itemOrder": {"arrayValue": {}},
            "createdAt": {"timestampValue": "2026-10-01T08:00:00Z"},
            "ratio": {"doubleValue": 0.5}
        });
        let decoded = decode_fields(Some(&wire)).unwrap();
        assert_eq!(decoded["itemOrder"], json!([]));
        assert_eq!(decoded["createdAt"], json!("2026-10-01T08:00:00Z"));
        assert_eq!(decoded["ratio"], json!(0.5));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let wire = json!({"pos": {"geoPointValue": {"latitude": 1.0}}});
        assert!(matches!(
            decode_fields(Some(&wire)),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn test_document_id_from_name() {
        assert_eq!(
            document_id("projects/p/databases/(default)/documents/tasks/abc123"),
            "abc123"
        );
    }

    #[test]
    fn test_query_response_skips_progress_rows() {
        let rows = vec![
            json!({"readTime": "2026-10-01T08:00:00Z"}),
            json!({"document": {
                "name": "projects/p/databases/(default)/documents/lists/l1",
                "fields": {"name": {"stringValue": "Groceries"}}
            }}),
        ];
        let docs = decode_query_response(&rows).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "l1");
        assert_eq!(docs[0].fields["name"], json!("Groceries"));
    }

    #[test]
    fn test_structured_query_shapes() {
        let single = structured_query(Collection::Tasks, &[Filter::eq("userId", "u1")]);
        assert_eq!(
            single["structuredQuery"]["where"]["fieldFilter"]["field"]["fieldPath"],
            json!("userId")
        );

        let composite = structured_query(
            Collection::ListItems,
            &[Filter::eq("userId", "u1"), Filter::eq("listId", "l1")],
        );
        let where_clause = &composite["structuredQuery"]["where"]["compositeFilter"];
        assert_eq!(where_clause["op"], json!("AND"));
        assert_eq!(where_clause["filters"].as_array().map(Vec::len), Some(2));
        assert_eq!(
            composite["structuredQuery"]["from"][0]["collectionId"],
            json!("listItems")
        );
    }
}

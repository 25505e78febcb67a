//! Denormalization of JSON:API documents.
//!
//! Joins each primary resource to the `included` resources its
//! `relationships` point at, producing flat records an agent can consume
//! without chasing type/id references. The join is lenient: a reference the
//! server declared but did not ship resolves to null (to-one) or is dropped
//! (to-many) — the remote's completeness is not this crate's to enforce.

use crate::document::{Document, RelationshipData, Resource};
use crate::query::IncludeSpec;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A primary resource's attributes merged with its joined relationships.
/// Built fresh per response and handed straight back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlatRecord(pub Map<String, Value>);

impl FlatRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Flatten every primary resource in `document`, joining the relationships
/// named in `requested`. Output order follows `data`.
pub fn flatten(document: &Document, requested: &IncludeSpec) -> Vec<FlatRecord> {
    let lookup: HashMap<(&str, &str), &Resource> = document
        .included
        .iter()
        .map(|resource| ((resource.kind.as_str(), resource.id.as_str()), resource))
        .collect();

    document
        .resources()
        .iter()
        .map(|resource| flatten_resource(resource, requested, &lookup))
        .collect()
}

fn flatten_resource(
    resource: &Resource,
    requested: &IncludeSpec,
    lookup: &HashMap<(&str, &str), &Resource>,
) -> FlatRecord {
    let mut record = Map::new();
    record.insert("id".to_string(), Value::String(resource.id.clone()));
    record.insert("type".to_string(), Value::String(resource.kind.clone()));
    for (key, value) in &resource.attributes {
        record.insert(key.clone(), value.clone());
    }

    for include in requested.iter() {
        let name = include.as_str();
        let linkage = resource
            .relationships
            .get(name)
            .and_then(|relationship| relationship.data.as_ref());

        let joined = match linkage {
            // To-many: preserve the order the relationship declares;
            // references missing from `included` are dropped.
            Some(RelationshipData::Many(refs)) => Value::Array(
                refs.iter()
                    .filter_map(|reference| {
                        lookup
                            .get(&(reference.kind.as_str(), reference.id.as_str()))
                            .map(|found| related_object(found))
                    })
                    .collect(),
            ),
            Some(RelationshipData::One(reference)) => lookup
                .get(&(reference.kind.as_str(), reference.id.as_str()))
                .map(|found| related_object(found))
                .unwrap_or(Value::Null),
            None => Value::Null,
        };
        record.insert(name.to_string(), joined);
    }

    FlatRecord(record)
}

fn related_object(resource: &Resource) -> Value {
    let mut object = Map::new();
    object.insert("id".to_string(), Value::String(resource.id.clone()));
    for (key, value) in &resource.attributes {
        object.insert(key.clone(), value.clone());
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Include;
    use serde_json::json;

    fn document(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn joins_each_primary_to_its_included_resource() {
        let doc = document(json!({
            "data": [
                {
                    "type": "Person", "id": "1",
                    "attributes": {"first_name": "Ada"},
                    "relationships": {"phone_numbers": {"data": [{"type": "PhoneNumber", "id": "p1"}]}}
                },
                {
                    "type": "Person", "id": "2",
                    "attributes": {"first_name": "Grace"},
                    "relationships": {"phone_numbers": {"data": [{"type": "PhoneNumber", "id": "p2"}]}}
                }
            ],
            "included": [
                {"type": "PhoneNumber", "id": "p1", "attributes": {"number": "555-0100"}},
                {"type": "PhoneNumber", "id": "p2", "attributes": {"number": "555-0101"}}
            ]
        }));

        let includes = IncludeSpec::new().with(Include::PhoneNumbers);
        let records = flatten(&doc, &includes);

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].get("phone_numbers").unwrap(),
            &json!([{"id": "p1", "number": "555-0100"}])
        );
        assert_eq!(
            records[1].get("phone_numbers").unwrap(),
            &json!([{"id": "p2", "number": "555-0101"}])
        );
        assert_eq!(records[0].get("first_name").unwrap(), &json!("Ada"));
    }

    #[test]
    fn missing_reference_resolves_to_null_not_error() {
        let doc = document(json!({
            "data": [
                {
                    "type": "Person", "id": "1",
                    "relationships": {"household": {"data": {"type": "Household", "id": "gone"}}}
                }
            ],
            "included": []
        }));

        let includes = IncludeSpec::new().with(Include::Household);
        let records = flatten(&doc, &includes);
        assert_eq!(records[0].get("household").unwrap(), &Value::Null);
    }

    #[test]
    fn to_many_preserves_relationship_order_and_drops_missing() {
        let doc = document(json!({
            "data": [{
                "type": "Person", "id": "1",
                "relationships": {"emails": {"data": [
                    {"type": "Email", "id": "e2"},
                    {"type": "Email", "id": "missing"},
                    {"type": "Email", "id": "e1"}
                ]}}
            }],
            "included": [
                {"type": "Email", "id": "e1", "attributes": {"address": "first@example.com"}},
                {"type": "Email", "id": "e2", "attributes": {"address": "second@example.com"}}
            ]
        }));

        let includes = IncludeSpec::new().with(Include::Emails);
        let records = flatten(&doc, &includes);
        // Order follows the relationship linkage, not `included`; the
        // unresolvable reference is dropped.
        assert_eq!(
            records[0].get("emails").unwrap(),
            &json!([
                {"id": "e2", "address": "second@example.com"},
                {"id": "e1", "address": "first@example.com"}
            ])
        );
    }

    #[test]
    fn requested_relationship_absent_from_resource_is_null() {
        let doc = document(json!({
            "data": [{"type": "Person", "id": "1", "attributes": {"first_name": "Ada"}}]
        }));

        let includes = IncludeSpec::new().with(Include::Addresses);
        let records = flatten(&doc, &includes);
        assert_eq!(records[0].get("addresses").unwrap(), &Value::Null);
    }

    #[test]
    fn unrequested_relationships_are_not_joined() {
        let doc = document(json!({
            "data": [{
                "type": "Person", "id": "1",
                "relationships": {"emails": {"data": [{"type": "Email", "id": "e1"}]}}
            }],
            "included": [{"type": "Email", "id": "e1", "attributes": {"address": "a@example.com"}}]
        }));

        let records = flatten(&doc, &IncludeSpec::new());
        assert!(records[0].get("emails").is_none());
    }

    #[test]
    fn output_preserves_data_order() {
        let doc = document(json!({
            "data": [
                {"type": "Person", "id": "9"},
                {"type": "Person", "id": "3"},
                {"type": "Person", "id": "7"}
            ]
        }));

        let records = flatten(&doc, &IncludeSpec::new());
        let ids: Vec<&Value> = records.iter().map(|r| r.get("id").unwrap()).collect();
        assert_eq!(ids, vec![&json!("9"), &json!("3"), &json!("7")]);
    }
}

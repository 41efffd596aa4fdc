//! Property-based tests for the store encoding boundary
//!
//! Arbitrary nested property maps, non-ASCII text included, must survive
//! encode/decode unchanged and encode to one sorted-key text. Whole
//! entities must survive the trip through a primitive node record.

#[path = "../common/mod.rs"]
mod common;

use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;
use topology_engine::features::model::{ContainerAttributes, PodAttributes};
use topology_engine::{decode_properties, encode_properties, Entity, EntityAttributes, PropertyMap};

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9f64).prop_map(Value::from),
        "[ -~]{0,12}".prop_map(Value::String),
        "\\PC{0,12}".prop_map(Value::String),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("\\PC{1,8}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn property_map() -> impl Strategy<Value = PropertyMap> {
    prop::collection::btree_map("[a-z]\\PC{0,10}", json_value(), 0..8)
}

/// Distinct key/value pairs in arbitrary order
fn shuffled_pairs() -> impl Strategy<Value = Vec<(String, Value)>> {
    property_map()
        .prop_map(|map| map.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

/// Reference rendering: compact JSON with object keys sorted at every depth
fn sorted_text(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let body: Vec<String> = entries
                .into_iter()
                .map(|(key, value)| format!("{}:{}", Value::String(key.clone()), sorted_text(value)))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(sorted_text).collect();
            format!("[{}]", body.join(","))
        }
        leaf => leaf.to_string(),
    }
}

fn string_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z][a-z./-]{0,12}", "[ -~]{0,16}", 0..5)
}

proptest! {
    #[test]
    fn prop_properties_roundtrip(props in property_map()) {
        let encoded = encode_properties(&props).unwrap();
        prop_assert_eq!(decode_properties(&encoded).unwrap(), props);
    }

    #[test]
    fn prop_encoding_is_canonical(pairs in shuffled_pairs()) {
        // Same pairs nested as an object built in arbitrary insertion order
        let nested: serde_json::Map<String, Value> = pairs.iter().cloned().collect();
        let mut props: PropertyMap = pairs.into_iter().collect();
        props.insert("nested".to_string(), Value::Object(nested));

        let encoded = encode_properties(&props).unwrap();
        let expected = sorted_text(&Value::Object(props.clone().into_iter().collect()));
        prop_assert_eq!(&encoded, &expected);

        let reencoded = encode_properties(&decode_properties(&encoded).unwrap()).unwrap();
        prop_assert_eq!(reencoded, encoded);
    }

    #[test]
    fn prop_pod_record_roundtrip(
        name in "[A-Za-z][A-Za-z0-9 -]{0,15}",
        namespace in "[a-z][a-z-]{0,10}",
        labels in string_map(),
        annotations in string_map(),
        restarts in prop::option::of(0u32..1000),
        props in property_map(),
        tags in prop::collection::vec("[a-z]{1,6}", 0..4),
    ) {
        let attributes = EntityAttributes::KubernetesPod(PodAttributes {
            namespace,
            labels,
            annotations,
            restart_count: restarts,
            ..Default::default()
        });
        let entity = Entity::new(name, attributes, props).unwrap().with_tags(tags);

        let record = entity.to_record().unwrap();
        prop_assert_eq!(record.label.as_str(), "KubernetesPod");
        prop_assert_eq!(Entity::from_record(&record).unwrap(), entity);
    }

    #[test]
    fn prop_container_record_roundtrip(
        image in "[a-z]{1,8}(/[a-z]{1,8})?",
        ports in prop::collection::vec("[0-9]{2,5}/(tcp|udp)", 0..4),
        env in string_map(),
    ) {
        let attributes = EntityAttributes::Container(ContainerAttributes {
            image,
            ports,
            environment_vars: env,
            ..Default::default()
        });
        let entity = Entity::new("web-1", attributes, PropertyMap::new()).unwrap();
        let record = entity.to_record().unwrap();
        prop_assert_eq!(Entity::from_record(&record).unwrap(), entity);
    }
}

#[test]
fn test_non_object_payload_rejected() {
    assert!(decode_properties("[1, 2]").is_err());
    assert!(decode_properties("").unwrap().is_empty());

    let mut props = PropertyMap::new();
    props.insert(" ".to_string(), Value::Null);
    assert!(encode_properties(&props).is_err());
}

#[test]
fn test_non_ascii_text_encoded_verbatim() {
    let mut props = PropertyMap::new();
    props.insert("zone".to_string(), Value::from("東京-1"));
    props.insert("été".to_string(), serde_json::json!({"ñ": "ü", "a": "\u{1F600}"}));
    let encoded = encode_properties(&props).unwrap();
    assert_eq!(encoded, "{\"zone\":\"東京-1\",\"été\":{\"a\":\"\u{1F600}\",\"ñ\":\"ü\"}}");
    assert_eq!(decode_properties(&encoded).unwrap(), props);
}

#[test]
fn test_nested_keys_sorted_in_encoding() {
    let encoded = encode_properties(&common::owner_properties("infra")).unwrap();
    assert_eq!(encoded, r#"{"owner":{"pager":true,"team":"infra"}}"#);
}

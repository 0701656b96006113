//! Property tests for module normalization.

use std::collections::HashSet;

use chrono::NaiveDate;
use modulo_core::{normalize_on, ModuleBody, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 13).unwrap()
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-5_000i64..5_000).prop_map(Value::from),
        (-5_000.0f64..5_000.0).prop_map(Value::from),
        "[a-z0-9#(), -]{0,12}".prop_map(Value::from),
        prop_oneof![
            Just("note"),
            Just("task-list"),
            Just("calendar"),
            Just("small"),
            Just("large"),
            Just("weekly"),
            Just("daily"),
            Just("2024-02-29"),
            Just("2024-06-13T09:30:00"),
            Just("#ABC"),
            Just("rgb(1, 2, 3)"),
        ]
        .prop_map(Value::from),
    ]
}

fn item() -> impl Strategy<Value = Value> {
    prop_oneof![
        scalar(),
        (
            proptest::option::of(prop_oneof![Just("a"), Just("b"), Just("c")]),
            proptest::option::of(scalar()),
            proptest::option::of(scalar()),
            proptest::option::of(scalar()),
        )
            .prop_map(|(id, text, done, date)| {
                let mut map = Map::new();
                if let Some(id) = id {
                    map.insert("id".into(), Value::from(id));
                }
                for (key, value) in [("text", text), ("done", done), ("date", date)] {
                    if let Some(value) = value {
                        map.insert(key.into(), value);
                    }
                }
                Value::Object(map)
            }),
    ]
}

fn raw_module() -> impl Strategy<Value = Value> {
    let keys = [
        "id", "type", "title", "size", "width", "height", "color", "view", "viewDate",
    ];
    (
        proptest::collection::vec(proptest::option::of(scalar()), keys.len()),
        proptest::option::of(proptest::collection::vec(item(), 0..6)),
        proptest::option::of((proptest::option::of(scalar()), proptest::option::of(scalar()))),
    )
        .prop_map(move |(values, items, position)| {
            let mut map = Map::new();
            for (key, value) in keys.iter().zip(values) {
                if let Some(value) = value {
                    map.insert((*key).to_string(), value);
                }
            }
            if let Some(items) = items {
                map.insert("items".into(), Value::Array(items));
            }
            if let Some((x, y)) = position {
                let mut pos = Map::new();
                if let Some(x) = x {
                    pos.insert("x".into(), x);
                }
                if let Some(y) = y {
                    pos.insert("y".into(), y);
                }
                map.insert("position".into(), Value::Object(pos));
            }
            Value::Object(map)
        })
}

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in raw_module()) {
        let once = normalize_on(&raw, today());
        let twice = normalize_on(&once.to_value(), today());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_satisfies_invariants(raw in raw_module()) {
        let module = normalize_on(&raw, today());
        prop_assert!(!module.id.trim().is_empty());
        prop_assert!(!module.title.trim().is_empty());
        prop_assert!(module.width.map_or(true, |w| (MIN_WIDTH..=MAX_WIDTH).contains(&w)));
        prop_assert!(module.height.map_or(true, |h| (MIN_HEIGHT..=MAX_HEIGHT).contains(&h)));
        prop_assert_eq!(module.color.len(), 7);
        prop_assert!(module.color.starts_with('#'));

        let ids = module.body.item_ids();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());

        let value = module.to_value();
        prop_assert!(value["items"].is_array());
        if let ModuleBody::TaskList { items } = &module.body {
            for (item, raw_item) in items.iter().zip(value["items"].as_array().unwrap()) {
                prop_assert_eq!(raw_item["done"].as_bool(), Some(item.done));
            }
        }
        if let ModuleBody::Calendar { .. } = &module.body {
            prop_assert!(value["view"].is_string());
            prop_assert!(value["viewDate"].is_string());
        }
    }

    #[test]
    fn extreme_sizes_are_bounded(
        width in prop_oneof![any::<f64>(), Just(f64::MAX), Just(1e12), Just(-1e12)],
        height in prop_oneof![any::<f64>(), Just(f64::MAX), Just(1e12), Just(-1e12)],
    ) {
        let raw = json!({ "width": width, "height": height });
        let module = normalize_on(&raw, today());
        prop_assert!((MIN_WIDTH..=MAX_WIDTH).contains(&module.effective_width()));
        prop_assert!((MIN_HEIGHT..=MAX_HEIGHT).contains(&module.effective_height()));
    }

    #[test]
    fn non_object_inputs_never_panic(raw in scalar()) {
        let module = normalize_on(&raw, today());
        prop_assert!(module.body.is_empty());
    }
}

#[test]
fn empty_object_satisfies_invariants() {
    let module = normalize_on(&json!({}), today());
    assert_eq!(module.to_value()["type"], json!("note"));
    assert_eq!(module.to_value()["items"], json!([]));
}

//! Normalization: the total function from a loaded (possibly partial or
//! legacy) record to a canonical [`Module`].
//!
//! `normalize` never fails. Every missing or malformed field takes its
//! default, and `normalize(normalize(r)) == normalize(r)` holds for every
//! input. The only non-determinism is id generation for records without one.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::calendar::{self, parse_day};
use crate::color::{normalize_color, DEFAULT_COLOR};
use crate::id::{generate_id, id_from_value, IdScope};
use crate::items::{calendar_events, note_items, task_items};
use crate::module::{
    CalendarView, Module, ModuleBody, ModuleKind, ModuleSize, Position, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH,
};

/// Normalize one raw record, using the local date for date defaults.
pub fn normalize(raw: &Value) -> Module {
    normalize_on(raw, calendar::today())
}

/// Normalize one raw record with an explicit "today".
pub fn normalize_on(raw: &Value, today: NaiveDate) -> Module {
    let empty = Map::new();
    let fields = raw.as_object().unwrap_or(&empty);

    let kind = str_field(fields, "type")
        .and_then(ModuleKind::parse)
        .unwrap_or(ModuleKind::Note);

    let title = str_field(fields, "title")
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| kind.label());

    let body = match kind {
        ModuleKind::Note => ModuleBody::Note { items: note_items(fields.get("items")) },
        ModuleKind::TaskList => ModuleBody::TaskList { items: task_items(fields.get("items")) },
        ModuleKind::Calendar => ModuleBody::Calendar {
            view: str_field(fields, "view")
                .and_then(CalendarView::parse)
                .unwrap_or_default(),
            view_date: str_field(fields, "viewDate").and_then(parse_day).unwrap_or(today),
            items: calendar_events(fields.get("items"), today),
        },
    };

    Module {
        id: id_from_value(fields.get("id")).unwrap_or_else(generate_id),
        title,
        size: str_field(fields, "size")
            .and_then(ModuleSize::parse)
            .unwrap_or_default(),
        width: pixels(fields.get("width"), MIN_WIDTH, MAX_WIDTH),
        height: pixels(fields.get("height"), MIN_HEIGHT, MAX_HEIGHT),
        color: str_field(fields, "color")
            .map(normalize_color)
            .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        position: position(fields.get("position")),
        body,
    }
}

/// Normalize a whole snapshot, then make module ids unique across it.
pub fn normalize_workspace(raws: &[Value], today: NaiveDate) -> Vec<Module> {
    let mut modules: Vec<Module> = raws.iter().map(|raw| normalize_on(raw, today)).collect();
    dedupe_module_ids(&mut modules);
    modules
}

/// Give every module after the first holder of an id a fresh one.
/// Returns how many ids were replaced.
pub fn dedupe_module_ids(modules: &mut [Module]) -> usize {
    let mut scope = IdScope::new();
    let mut replaced = 0;
    for module in modules.iter_mut() {
        if scope.claim(&mut module.id) {
            replaced += 1;
        }
    }
    replaced
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

/// Rounded pixel size clamped to `floor..=ceiling`; absent or non-numeric
/// is `None`.
fn pixels(value: Option<&Value>, floor: u32, ceiling: u32) -> Option<u32> {
    let raw = value?.as_f64()?;
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(f64::from(floor), f64::from(ceiling)) as u32)
}

fn coordinate(value: Option<&Value>) -> Option<u32> {
    let raw = value?.as_f64()?;
    raw.is_finite()
        .then(|| raw.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// Both coordinates or nothing: a half-specified position counts as unplaced.
fn position(value: Option<&Value>) -> Option<Position> {
    let fields = value?.as_object()?;
    Some(Position {
        x: coordinate(fields.get("x"))?,
        y: coordinate(fields.get("y"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 13).unwrap()
    }

    #[test]
    fn test_empty_object_gets_all_defaults() {
        let module = normalize_on(&json!({}), today());
        assert_eq!(module.kind(), ModuleKind::Note);
        assert_eq!(module.title, "Note");
        assert_eq!(module.size, ModuleSize::Medium);
        assert_eq!(module.color, "#ffffff");
        assert!(module.position.is_none());
        assert!(module.width.is_none());
        assert!(!module.id.is_empty());
        assert!(module.body.is_empty());
    }

    #[test]
    fn test_non_object_input_is_treated_as_empty() {
        for raw in [json!(null), json!("note"), json!([1, 2]), json!(3)] {
            let module = normalize_on(&raw, today());
            assert_eq!(module.kind(), ModuleKind::Note);
        }
    }

    #[test]
    fn test_calendar_defaults() {
        let module = normalize_on(&json!({ "type": "calendar", "viewDate": "nope" }), today());
        match module.body {
            ModuleBody::Calendar { view, view_date, .. } => {
                assert_eq!(view, CalendarView::Monthly);
                assert_eq!(view_date, today());
            }
            other => panic!("expected calendar body, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_position_is_absent() {
        let half = normalize_on(&json!({ "position": { "x": 10 } }), today());
        assert!(half.position.is_none());
        let text = normalize_on(&json!({ "position": { "x": "1", "y": 2 } }), today());
        assert!(text.position.is_none());
        let full = normalize_on(&json!({ "position": { "x": 10.6, "y": -4 } }), today());
        assert_eq!(full.position, Some(Position::new(11, 0)));
    }

    #[test]
    fn test_sizes_respect_floor() {
        let module = normalize_on(&json!({ "width": 100, "height": 500.4 }), today());
        assert_eq!(module.width, Some(MIN_WIDTH));
        assert_eq!(module.height, Some(500));
    }

    #[test]
    fn test_legacy_sample_record() {
        let raw = json!({
            "type": "note",
            "title": "Notes",
            "items": ["Welcome to your workspace", "Connect the API to load your data"],
            "size": "small"
        });
        let module = normalize_on(&raw, today());
        assert_eq!(module.size, ModuleSize::Small);
        match &module.body {
            ModuleBody::Note { items } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].text, "Connect the API to load your data");
            }
            other => panic!("expected note body, got {other:?}"),
        }
    }

    #[test]
    fn test_task_shape_in_note_drops_done() {
        let raw = json!({ "type": "note", "items": [{ "id": "a", "text": "x", "done": true }] });
        let value = normalize_on(&raw, today()).to_value();
        assert_eq!(value["items"][0], json!({ "id": "a", "text": "x" }));
    }

    #[test]
    fn test_roundtrip_is_identity() {
        let raw = json!({
            "id": "m1",
            "type": "calendar",
            "color": "Teal",
            "view": "weekly",
            "viewDate": "2024-06-01",
            "items": [{ "date": "2024-06-02T10:00:00", "text": "Demo" }],
            "position": { "x": 5, "y": 6 },
            "width": 300
        });
        let once = normalize_on(&raw, today());
        let twice = normalize_on(&once.to_value(), today());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_workspace_dedupes_module_ids() {
        let raws = vec![json!({ "id": "dup" }), json!({ "id": "dup" }), json!({ "id": "other" })];
        let modules = normalize_workspace(&raws, today());
        assert_eq!(modules[0].id, "dup");
        assert_ne!(modules[1].id, "dup");
        assert_eq!(modules[2].id, "other");
    }

    #[test]
    fn test_dedupe_counts_replaced_ids() {
        let raws = vec![json!({ "id": "a" }), json!({ "id": "a" }), json!({ "id": "a" }), json!({ "id": "b" })];
        let mut modules: Vec<Module> = raws.iter().map(|raw| normalize_on(raw, today())).collect();
        assert_eq!(dedupe_module_ids(&mut modules), 2);
        assert_eq!(dedupe_module_ids(&mut modules), 0);
    }

    #[test]
    fn test_sizes_capped() {
        let module = normalize_on(&json!({ "width": 1e12, "height": 1e12 }), today());
        assert_eq!(module.width, Some(MAX_WIDTH));
        assert_eq!(module.height, Some(MAX_HEIGHT));
    }
}

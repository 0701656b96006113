//! Per-type item records.
//!
//! A module's `items` sequence is always one of these three shapes, chosen
//! by the module type. Legacy snapshots stored plain strings; those are
//! upgraded here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calendar;
use crate::id::{generate_id, id_from_value, IdScope};

/// A line of free text in a note module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteItem {
    pub id: String,
    pub text: String,
}

/// A checklist entry in a task-list module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: String,
    pub text: String,
    pub done: bool,
}

/// An event on a calendar module, pinned to one calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub date: NaiveDate,
    pub text: String,
}

impl NoteItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self { id: generate_id(), text: text.into() }
    }
}

impl TaskItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self { id: generate_id(), text: text.into(), done: false }
    }
}

impl CalendarEvent {
    pub fn new(date: NaiveDate, text: impl Into<String>) -> Self {
        Self { id: generate_id(), date, text: text.into() }
    }
}

// ---------------------------------------------------------------
// Raw item decoding
// ---------------------------------------------------------------

/// Shape-agnostic view of one loaded item, before it is fitted to a type.
struct RawItem {
    id: String,
    text: String,
    done: bool,
    date: Option<NaiveDate>,
}

fn text_from_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn raw_item(value: &Value) -> Option<RawItem> {
    match value {
        Value::Null => None,
        Value::Object(map) => Some(RawItem {
            id: id_from_value(map.get("id")).unwrap_or_else(generate_id),
            text: text_from_value(map.get("text")),
            done: map.get("done").and_then(Value::as_bool).unwrap_or(false),
            date: map.get("date").and_then(Value::as_str).and_then(calendar::parse_day),
        }),
        // Legacy entries: a bare string (or scalar) is the item's text.
        other => Some(RawItem {
            id: generate_id(),
            text: text_from_value(Some(other)),
            done: false,
            date: None,
        }),
    }
}

fn raw_items(value: Option<&Value>) -> Vec<RawItem> {
    let mut scope = IdScope::new();
    value
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(raw_item).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .map(|mut item| {
            scope.claim(&mut item.id);
            item
        })
        .collect()
}

pub(crate) fn note_items(value: Option<&Value>) -> Vec<NoteItem> {
    raw_items(value)
        .into_iter()
        .map(|raw| NoteItem { id: raw.id, text: raw.text })
        .collect()
}

pub(crate) fn task_items(value: Option<&Value>) -> Vec<TaskItem> {
    raw_items(value)
        .into_iter()
        .map(|raw| TaskItem { id: raw.id, text: raw.text, done: raw.done })
        .collect()
}

/// Events with a missing or unreadable date land on `today`.
pub(crate) fn calendar_events(value: Option<&Value>, today: NaiveDate) -> Vec<CalendarEvent> {
    raw_items(value)
        .into_iter()
        .map(|raw| CalendarEvent {
            id: raw.id,
            date: raw.date.unwrap_or(today),
            text: raw.text,
        })
        .collect()
}

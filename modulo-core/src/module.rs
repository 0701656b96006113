//! The `Module` record: one widget instance on the workspace canvas.
//!
//! The item shape is carried by [`ModuleBody`], so a module's type is a
//! property of its body and cannot drift from its items. Serialization
//! produces the flat snapshot shape (`{"type": "task-list", "items": ...}`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::{normalize_color, DEFAULT_COLOR};
use crate::id::{generate_id, IdScope};
use crate::items::{CalendarEvent, NoteItem, TaskItem};

/// Smallest width a module can be resized to.
pub const MIN_WIDTH: u32 = 240;
/// Smallest height a module can be resized to.
pub const MIN_HEIGHT: u32 = 160;
/// Largest width a module can be resized to.
pub const MAX_WIDTH: u32 = 4096;
/// Largest height a module can be resized to.
pub const MAX_HEIGHT: u32 = 4096;
/// Height used until a module is explicitly resized.
pub const DEFAULT_HEIGHT: u32 = 260;

// ───────────────────────────────────────────────────────────────────
// Enumerations
// ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleKind {
    Note,
    TaskList,
    Calendar,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 3] = [ModuleKind::Note, ModuleKind::TaskList, ModuleKind::Calendar];

    /// Snapshot spelling of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Note => "note",
            ModuleKind::TaskList => "task-list",
            ModuleKind::Calendar => "calendar",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|k| k.as_str().eq_ignore_ascii_case(raw))
    }

    /// Human label: `task-list` becomes `Task List`.
    pub fn label(&self) -> String {
        self.as_str()
            .split('-')
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ModuleSize {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "small" => Some(ModuleSize::Small),
            "medium" => Some(ModuleSize::Medium),
            "large" => Some(ModuleSize::Large),
            _ => None,
        }
    }

    /// Width a module of this size takes in snap mode.
    pub fn default_width(&self) -> u32 {
        match self {
            ModuleSize::Small => 280,
            ModuleSize::Medium => 360,
            ModuleSize::Large => 560,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl CalendarView {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(CalendarView::Daily),
            "weekly" => Some(CalendarView::Weekly),
            "monthly" => Some(CalendarView::Monthly),
            _ => None,
        }
    }
}

/// Absolute canvas position used in free mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

// ───────────────────────────────────────────────────────────────────
// Module
// ───────────────────────────────────────────────────────────────────

/// Type-specific part of a module.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ModuleBody {
    #[serde(rename = "note")]
    Note { items: Vec<NoteItem> },
    #[serde(rename = "task-list")]
    TaskList { items: Vec<TaskItem> },
    #[serde(rename = "calendar", rename_all = "camelCase")]
    Calendar {
        view: CalendarView,
        view_date: NaiveDate,
        items: Vec<CalendarEvent>,
    },
}

impl ModuleBody {
    /// Empty body for a freshly added module.
    pub fn empty(kind: ModuleKind, today: NaiveDate) -> Self {
        match kind {
            ModuleKind::Note => ModuleBody::Note { items: Vec::new() },
            ModuleKind::TaskList => ModuleBody::TaskList { items: Vec::new() },
            ModuleKind::Calendar => ModuleBody::Calendar {
                view: CalendarView::default(),
                view_date: today,
                items: Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> ModuleKind {
        match self {
            ModuleBody::Note { .. } => ModuleKind::Note,
            ModuleBody::TaskList { .. } => ModuleKind::TaskList,
            ModuleBody::Calendar { .. } => ModuleKind::Calendar,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ModuleBody::Note { items } => items.len(),
            ModuleBody::TaskList { items } => items.len(),
            ModuleBody::Calendar { items, .. } => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item ids in sequence order.
    pub fn item_ids(&self) -> Vec<&str> {
        match self {
            ModuleBody::Note { items } => items.iter().map(|i| i.id.as_str()).collect(),
            ModuleBody::TaskList { items } => items.iter().map(|i| i.id.as_str()).collect(),
            ModuleBody::Calendar { items, .. } => items.iter().map(|i| i.id.as_str()).collect(),
        }
    }

    fn item_ids_mut(&mut self) -> Vec<&mut String> {
        match self {
            ModuleBody::Note { items } => items.iter_mut().map(|i| &mut i.id).collect(),
            ModuleBody::TaskList { items } => items.iter_mut().map(|i| &mut i.id).collect(),
            ModuleBody::Calendar { items, .. } => items.iter_mut().map(|i| &mut i.id).collect(),
        }
    }
}

/// One widget on the workspace.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub size: ModuleSize,
    /// Explicit width from a free-mode resize; `None` derives it from `size`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub color: String,
    /// `None` until the free-mode packer (or a drag) places the module.
    pub position: Option<Position>,
    #[serde(flatten)]
    pub body: ModuleBody,
}

impl Module {
    /// A module as created by the "add module" action: no items, default
    /// size and color, not yet placed.
    pub fn new(kind: ModuleKind, today: NaiveDate) -> Self {
        Self {
            id: generate_id(),
            title: kind.label(),
            size: ModuleSize::default(),
            width: None,
            height: None,
            color: DEFAULT_COLOR.to_string(),
            position: None,
            body: ModuleBody::empty(kind, today),
        }
    }

    pub fn kind(&self) -> ModuleKind {
        self.body.kind()
    }

    /// Width used in free mode.
    pub fn effective_width(&self) -> u32 {
        self.width.unwrap_or_else(|| self.size.default_width()).clamp(MIN_WIDTH, MAX_WIDTH)
    }

    pub fn effective_height(&self) -> u32 {
        self.height.unwrap_or(DEFAULT_HEIGHT).clamp(MIN_HEIGHT, MAX_HEIGHT)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Re-establish every record invariant after an in-memory mutation.
    ///
    /// Typed fields already carry the right shape; this covers what an edit
    /// can still break: blank titles, raw colors, out-of-range sizes and
    /// duplicate item ids.
    pub fn normalize_in_place(&mut self) {
        if self.id.trim().is_empty() {
            self.id = generate_id();
        }
        if self.title.trim().is_empty() {
            self.title = self.kind().label();
        }
        self.color = normalize_color(&self.color);
        self.width = self.width.map(|w| w.clamp(MIN_WIDTH, MAX_WIDTH));
        self.height = self.height.map(|h| h.clamp(MIN_HEIGHT, MAX_HEIGHT));

        let mut scope = IdScope::new();
        for id in self.body.item_ids_mut() {
            if id.trim().is_empty() {
                *id = generate_id();
            }
            scope.claim(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 13).unwrap()
    }

    #[test]
    fn test_kind_labels_and_parse() {
        assert_eq!(ModuleKind::TaskList.label(), "Task List");
        assert_eq!(ModuleKind::Note.label(), "Note");
        assert_eq!(ModuleKind::parse(" Task-List "), Some(ModuleKind::TaskList));
        assert_eq!(ModuleKind::parse("gallery"), None);
    }

    #[test]
    fn test_new_module_defaults() {
        let module = Module::new(ModuleKind::Calendar, today());
        assert_eq!(module.title, "Calendar");
        assert_eq!(module.size, ModuleSize::Medium);
        assert_eq!(module.color, "#ffffff");
        assert!(module.position.is_none());
        assert!(module.body.is_empty());
        assert_eq!(module.effective_width(), 360);
        assert_eq!(module.effective_height(), DEFAULT_HEIGHT);
    }

    #[test]
    fn test_serialized_shape() {
        let module = Module::new(ModuleKind::Calendar, today());
        let value = module.to_value();
        assert_eq!(value["type"], json!("calendar"));
        assert_eq!(value["view"], json!("monthly"));
        assert_eq!(value["viewDate"], json!("2024-06-13"));
        assert_eq!(value["position"], Value::Null);
        assert!(value.get("width").is_none());

        let tasks = Module::new(ModuleKind::TaskList, today()).to_value();
        assert_eq!(tasks["type"], json!("task-list"));
        assert!(tasks.get("view").is_none());
    }

    #[test]
    fn test_normalize_in_place_repairs_edits() {
        let mut module = Module::new(ModuleKind::Note, today());
        module.title = "   ".into();
        module.color = "RED".into();
        module.width = Some(10);
        module.body = ModuleBody::Note {
            items: vec![
                NoteItem { id: "same".into(), text: "a".into() },
                NoteItem { id: "same".into(), text: "b".into() },
            ],
        };
        module.normalize_in_place();
        assert_eq!(module.title, "Note");
        assert_eq!(module.color, "#ff0000");
        assert_eq!(module.width, Some(MIN_WIDTH));
        let ids = module.body.item_ids();
        assert_ne!(ids[0], ids[1]);
    }
}

//! Render frames: what the page shell draws after each re-render.
//!
//! A [`Frame`] lists modules in visual order with their geometry and typed
//! content. Calendar content is built here from the pure date grids; the
//! monthly display cap and overflow counts live at this layer only.

use chrono::NaiveDate;
use modulo_core::calendar::{bucket_events, month_grid, week_of};
use modulo_core::{CalendarEvent, CalendarView, Module, ModuleBody, ModuleSize, NoteItem, TaskItem};
use modulo_layout::{Geometry, LayoutMode};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    /// Bumped on every full re-render; live edits patch the frame in place.
    pub generation: u64,
    pub mode: LayoutMode,
    pub modules: Vec<RenderedModule>,
}

impl Frame {
    pub fn module(&self, id: &str) -> Option<&RenderedModule> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Module ids in visual order.
    pub fn order(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.id.as_str()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedModule {
    pub id: String,
    pub title: String,
    /// Type label shown next to the title.
    pub chip: String,
    pub color: String,
    pub size: ModuleSize,
    pub geometry: Geometry,
    pub content: ModuleContent,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ModuleContent {
    Note { items: Vec<NoteItem> },
    TaskList { items: Vec<TaskItem>, completed: usize },
    Calendar(CalendarContent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarContent {
    pub view: CalendarView,
    pub view_date: NaiveDate,
    pub heading: String,
    pub days: Vec<DayView>,
}

/// One rendered day: a daily page, a week column or a month cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: NaiveDate,
    pub label: String,
    pub in_month: bool,
    pub is_today: bool,
    pub events: Vec<CalendarEvent>,
    /// Events hidden by the display cap.
    pub overflow: usize,
}

pub fn render_module(module: &Module, geometry: Geometry, today: NaiveDate, monthly_cap: usize) -> RenderedModule {
    RenderedModule {
        id: module.id.clone(),
        title: module.title.clone(),
        chip: module.kind().label(),
        color: module.color.clone(),
        size: module.size,
        geometry,
        content: render_content(&module.body, today, monthly_cap),
    }
}

pub fn render_content(body: &ModuleBody, today: NaiveDate, monthly_cap: usize) -> ModuleContent {
    match body {
        ModuleBody::Note { items } => ModuleContent::Note { items: items.clone() },
        ModuleBody::TaskList { items } => ModuleContent::TaskList {
            items: items.clone(),
            completed: items.iter().filter(|t| t.done).count(),
        },
        ModuleBody::Calendar { view, view_date, items } => {
            ModuleContent::Calendar(calendar_content(*view, *view_date, items, today, monthly_cap))
        }
    }
}

pub fn calendar_content(
    view: CalendarView,
    anchor: NaiveDate,
    events: &[CalendarEvent],
    today: NaiveDate,
    monthly_cap: usize,
) -> CalendarContent {
    let day = |date: NaiveDate, label: String, in_month: bool, cap: Option<usize>| {
        let bucket = bucket_events(events, date);
        let shown = cap.unwrap_or(bucket.len()).min(bucket.len());
        DayView {
            date,
            label,
            in_month,
            is_today: date == today,
            events: bucket[..shown].iter().map(|e| (*e).clone()).collect(),
            overflow: bucket.len() - shown,
        }
    };

    let (heading, days) = match view {
        CalendarView::Daily => (
            anchor.format("%A, %B %-d, %Y").to_string(),
            vec![day(anchor, anchor.format("%a %-d").to_string(), true, None)],
        ),
        CalendarView::Weekly => {
            let week = week_of(anchor);
            (
                format!("Week of {}", week[0].format("%b %-d, %Y")),
                week.into_iter()
                    .map(|date| day(date, date.format("%a %-d").to_string(), true, None))
                    .collect(),
            )
        }
        CalendarView::Monthly => (
            anchor.format("%B %Y").to_string(),
            month_grid(anchor, today)
                .into_iter()
                .map(|cell| day(cell.date, cell.label, cell.in_month, Some(monthly_cap)))
                .collect(),
        ),
    };

    CalendarContent { view, view_date: anchor, heading, days }
}

// ============================================================================
// Tests
// ============================================================================

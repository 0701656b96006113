//! The Workspace Store: sole owner of the session's module list.
//!
//! Every mutation goes through here and ends in one of two ways:
//!
//! - **commit**: normalize, pack (free mode), full re-render, persist. Used
//!   for structural edits and natural commit points.
//! - **live**: normalize and patch the affected module in the current frame
//!   without a full re-render or a save. Used for high-frequency inline edits
//!   (text, title, color); [`WorkspaceStore::commit_edits`] flushes them.
//!
//! Gesture previews (reorder, move, resize) only touch the frame, never the
//! model, so dropping a preview always restores the committed geometry.

use std::collections::HashMap;

use chrono::NaiveDate;
use modulo_core::calendar::{self, parse_day, shift_anchor};
use modulo_core::{
    dedupe_module_ids, normalize_color, normalize_workspace, CalendarEvent, CalendarView, Module,
    ModuleBody, ModuleKind, ModuleSize, NoteItem, Position, TaskItem, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT,
    MIN_WIDTH,
};
use modulo_layout::{Geometry, HitRegion, LayoutEngine, LayoutMode, SpatialIndex};
use modulo_sync::{Persister, SyncEvent};
use serde::Serialize;
use serde_json::Value;

use crate::config::WorkspaceConfig;
use crate::error::InteractionError;
use crate::view::{render_module, Frame};

pub const SAVE_FAILED_MESSAGE: &str = "Changes could not be saved. They are kept on this device for now.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Sign in again to keep saving.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    #[default]
    Neutral,
    Success,
    Error,
}

/// Transient message shown above the workspace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, level: StatusLevel) -> Self {
        Self { text: text.into(), level }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, StatusLevel::Error)
    }
}

pub struct WorkspaceStore {
    modules: Vec<Module>,
    mode: LayoutMode,
    engine: LayoutEngine,
    /// `None` while signed out: edits stay local.
    persister: Option<Persister>,
    today: NaiveDate,
    monthly_event_cap: usize,

    frame: Frame,
    index: SpatialIndex,
    geometry_preview: HashMap<String, Geometry>,
    /// Model indices in visual order while a reorder drag is hovering.
    order_preview: Option<Vec<usize>>,

    pending_edits: bool,
    status: Option<StatusMessage>,
    needs_reauth: bool,
}

impl WorkspaceStore {
    pub fn new(config: &WorkspaceConfig) -> Self {
        let mut store = Self {
            modules: Vec::new(),
            mode: LayoutMode::default(),
            engine: LayoutEngine::new(config.layout.clone()),
            persister: None,
            today: calendar::today(),
            monthly_event_cap: config.monthly_event_cap,
            frame: Frame { generation: 0, mode: LayoutMode::default(), modules: Vec::new() },
            index: SpatialIndex::new(SpatialIndex::CELL_SIZE),
            geometry_preview: HashMap::new(),
            order_preview: None,
            pending_edits: false,
            status: None,
            needs_reauth: false,
        };
        store.rerender();
        store
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.id == id)
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, status: Option<StatusMessage>) {
        self.status = status;
    }

    /// Set after an authorization failure; cleared by loading a new session.
    pub fn needs_reauth(&self) -> bool {
        self.needs_reauth
    }

    /// Stop saving and ask the user to sign in again.
    pub fn require_reauth(&mut self) {
        self.needs_reauth = true;
        self.persister = None;
        self.status = Some(StatusMessage::error(SESSION_EXPIRED_MESSAGE));
    }

    pub fn has_pending_edits(&self) -> bool {
        self.pending_edits
    }

    pub fn is_persisting(&self) -> bool {
        self.persister.is_some()
    }

    /// Revision of the most recent save issued this session.
    pub fn last_revision(&self) -> Option<u64> {
        self.persister.as_ref().map(Persister::last_issued)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Pin "today" (tests, or a session crossing midnight).
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
        self.rerender();
    }

    pub fn layout_config(&self) -> &modulo_layout::LayoutConfig {
        self.engine.config()
    }

    /// The workspace as sent to the remote store.
    pub fn snapshot(&self) -> Vec<Value> {
        self.modules.iter().map(Module::to_value).collect()
    }

    /// Rendered geometry of a module in the current frame.
    pub fn geometry_of(&self, id: &str) -> Option<Geometry> {
        self.frame.module(id).map(|m| m.geometry)
    }

    /// Topmost module under a canvas point, and the card region hit.
    pub fn hit_test(&self, px: f32, py: f32) -> Option<(String, HitRegion)> {
        let hit = self.index.hit_test(px, py, self.engine.config())?;
        let module = self.frame.modules.get(hit.slot)?;
        Some((module.id.clone(), hit.region))
    }

    // ---------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------

    /// Replace the workspace with a loaded snapshot. Positions assigned by
    /// the packer here are not persisted until the next commit.
    pub fn load(&mut self, raw: &[Value], persister: Option<Persister>) {
        self.modules = normalize_workspace(raw, self.today);
        if self.mode == LayoutMode::Free {
            self.engine.pack(&mut self.modules);
        }
        self.persister = persister;
        self.needs_reauth = false;
        self.pending_edits = false;
        self.geometry_preview.clear();
        self.order_preview = None;
        log::info!("Loaded workspace with {} module(s)", self.modules.len());
        self.rerender();
    }

    /// Stop persisting (sign-out). The module list stays on screen.
    pub fn detach_persister(&mut self) -> Option<Persister> {
        self.persister.take()
    }

    // ---------------------------------------------------------------
    // Modules
    // ---------------------------------------------------------------

    pub fn add_module(&mut self, kind: ModuleKind) -> String {
        let module = Module::new(kind, self.today);
        let id = module.id.clone();
        log::debug!("Adding {} module {id}", kind.as_str());
        self.modules.push(module);
        self.commit();
        id
    }

    pub fn delete_module(&mut self, id: &str) -> Result<Module, InteractionError> {
        let index = self.require(id)?;
        let removed = self.modules.remove(index);
        self.geometry_preview.remove(id);
        self.commit();
        Ok(removed)
    }

    /// Splice the module at `from` into position `to`.
    pub fn move_module(&mut self, from: usize, to: usize) -> Result<(), InteractionError> {
        let len = self.modules.len();
        for index in [from, to] {
            if index >= len {
                return Err(InteractionError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        let module = self.modules.remove(from);
        self.modules.insert(to, module);
        self.commit();
        Ok(())
    }

    pub fn set_size(&mut self, id: &str, size: ModuleSize) -> Result<(), InteractionError> {
        let index = self.require(id)?;
        let module = &mut self.modules[index];
        module.size = size;
        module.width = None;
        self.commit();
        Ok(())
    }

    pub fn set_position(&mut self, id: &str, position: Position) -> Result<(), InteractionError> {
        let index = self.require(id)?;
        self.modules[index].position = Some(position);
        self.geometry_preview.remove(id);
        self.commit();
        Ok(())
    }

    pub fn set_dimensions(&mut self, id: &str, width: u32, height: u32) -> Result<(), InteractionError> {
        let index = self.require(id)?;
        let module = &mut self.modules[index];
        module.width = Some(width.clamp(MIN_WIDTH, MAX_WIDTH));
        module.height = Some(height.clamp(MIN_HEIGHT, MAX_HEIGHT));
        self.geometry_preview.remove(id);
        self.commit();
        Ok(())
    }

    /// Live title edit.
    pub fn set_title(&mut self, id: &str, title: &str) -> Result<(), InteractionError> {
        let index = self.require(id)?;
        self.modules[index].title = title.to_string();
        self.live(index);
        Ok(())
    }

    /// Live color edit.
    pub fn set_color(&mut self, id: &str, color: &str) -> Result<(), InteractionError> {
        let index = self.require(id)?;
        self.modules[index].color = normalize_color(color);
        self.live(index);
        Ok(())
    }

    /// Persist outstanding live edits (field blur). Returns whether anything
    /// was pending.
    pub fn commit_edits(&mut self) -> bool {
        if !self.pending_edits {
            return false;
        }
        self.commit();
        true
    }

    // ---------------------------------------------------------------
    // Items
    // ---------------------------------------------------------------

    /// Append an item. Calendar modules get an event on their view date.
    pub fn add_item(&mut self, id: &str, text: &str) -> Result<String, InteractionError> {
        let text = required_text(text)?;
        let index = self.require(id)?;
        let item_id = match &mut self.modules[index].body {
            ModuleBody::Note { items } => push_id(items, NoteItem::new(text), |i| &i.id),
            ModuleBody::TaskList { items } => push_id(items, TaskItem::new(text), |i| &i.id),
            ModuleBody::Calendar { view_date, items, .. } => {
                push_id(items, CalendarEvent::new(*view_date, text), |i| &i.id)
            }
        };
        self.commit();
        Ok(item_id)
    }

    pub fn add_event(&mut self, id: &str, date: &str, text: &str) -> Result<String, InteractionError> {
        let text = required_text(text)?;
        let date = parse_date(date)?;
        let index = self.require(id)?;
        let items = calendar_items(&mut self.modules[index])?;
        let item_id = push_id(items, CalendarEvent::new(date, text), |i| &i.id);
        self.commit();
        Ok(item_id)
    }

    /// Live text edit of any item.
    pub fn edit_item(&mut self, id: &str, item_id: &str, text: &str) -> Result<(), InteractionError> {
        let index = self.require(id)?;
        let slot = match &mut self.modules[index].body {
            ModuleBody::Note { items } => items.iter_mut().find(|i| i.id == item_id).map(|i| &mut i.text),
            ModuleBody::TaskList { items } => items.iter_mut().find(|i| i.id == item_id).map(|i| &mut i.text),
            ModuleBody::Calendar { items, .. } => items.iter_mut().find(|i| i.id == item_id).map(|i| &mut i.text),
        };
        let slot = slot.ok_or_else(|| unknown_item(id, item_id))?;
        *slot = text.to_string();
        self.live(index);
        Ok(())
    }

    /// Flip a task's `done` flag. Returns the new value.
    pub fn toggle_item(&mut self, id: &str, item_id: &str) -> Result<bool, InteractionError> {
        let index = self.require(id)?;
        let module = &mut self.modules[index];
        let ModuleBody::TaskList { items } = &mut module.body else {
            return Err(wrong_kind(module, ModuleKind::TaskList));
        };
        let task = items
            .iter_mut()
            .find(|t| t.id == item_id)
            .ok_or_else(|| unknown_item(id, item_id))?;
        task.done = !task.done;
        let done = task.done;
        self.commit();
        Ok(done)
    }

    pub fn set_event_date(&mut self, id: &str, item_id: &str, date: &str) -> Result<(), InteractionError> {
        let date = parse_date(date)?;
        let index = self.require(id)?;
        let items = calendar_items(&mut self.modules[index])?;
        let event = items
            .iter_mut()
            .find(|e| e.id == item_id)
            .ok_or_else(|| unknown_item(id, item_id))?;
        event.date = date;
        self.commit();
        Ok(())
    }

    /// Remove an item. A note never ends up empty: removing its last line
    /// leaves one fresh blank line in its place.
    pub fn delete_item(&mut self, id: &str, item_id: &str) -> Result<(), InteractionError> {
        let index = self.require(id)?;
        let removed = match &mut self.modules[index].body {
            ModuleBody::Note { items } => {
                let removed = remove_by_id(items, item_id, |i| &i.id);
                if removed && items.is_empty() {
                    items.push(NoteItem::new(""));
                }
                removed
            }
            ModuleBody::TaskList { items } => remove_by_id(items, item_id, |i| &i.id),
            ModuleBody::Calendar { items, .. } => remove_by_id(items, item_id, |i| &i.id),
        };
        if !removed {
            return Err(unknown_item(id, item_id));
        }
        self.commit();
        Ok(())
    }

    // ---------------------------------------------------------------
    // Calendar navigation
    // ---------------------------------------------------------------

    pub fn set_view(&mut self, id: &str, view: CalendarView) -> Result<(), InteractionError> {
        let index = self.require(id)?;
        let module = &mut self.modules[index];
        let ModuleBody::Calendar { view: current, .. } = &mut module.body else {
            return Err(wrong_kind(module, ModuleKind::Calendar));
        };
        *current = view;
        self.commit();
        Ok(())
    }

    pub fn set_view_date(&mut self, id: &str, date: &str) -> Result<(), InteractionError> {
        let date = parse_date(date)?;
        let index = self.require(id)?;
        let module = &mut self.modules[index];
        let ModuleBody::Calendar { view_date, .. } = &mut module.body else {
            return Err(wrong_kind(module, ModuleKind::Calendar));
        };
        *view_date = date;
        self.commit();
        Ok(())
    }

    /// Previous (`steps < 0`) or next period for the module's current view.
    pub fn shift_view_date(&mut self, id: &str, steps: i32) -> Result<NaiveDate, InteractionError> {
        let index = self.require(id)?;
        let module = &mut self.modules[index];
        let ModuleBody::Calendar { view, view_date, .. } = &mut module.body else {
            return Err(wrong_kind(module, ModuleKind::Calendar));
        };
        *view_date = shift_anchor(*view_date, *view, steps);
        let anchor = *view_date;
        self.commit();
        Ok(anchor)
    }

    // ---------------------------------------------------------------
    // Layout mode and previews
    // ---------------------------------------------------------------

    /// Switch layout mode. Entering free mode packs every unplaced module;
    /// the new positions are persisted.
    pub fn set_mode(&mut self, mode: LayoutMode) {
        if mode == self.mode {
            return;
        }
        log::info!("Layout mode {} -> {}", self.mode.as_str(), mode.as_str());
        self.mode = mode;
        self.order_preview = None;
        self.geometry_preview.clear();
        if mode == LayoutMode::Free && self.engine.pack(&mut self.modules) > 0 {
            self.commit();
        } else {
            self.rerender();
        }
    }

    /// Show `source` moved to `target` without touching the model.
    pub fn preview_reorder(&mut self, source: usize, target: usize) -> Result<(), InteractionError> {
        let len = self.modules.len();
        for index in [source, target] {
            if index >= len {
                return Err(InteractionError::IndexOutOfRange { index, len });
            }
        }
        let mut order: Vec<usize> = (0..len).collect();
        let moved = order.remove(source);
        order.insert(target, moved);
        self.order_preview = Some(order);
        self.rerender();
        Ok(())
    }

    pub fn clear_reorder_preview(&mut self) {
        if self.order_preview.take().is_some() {
            self.rerender();
        }
    }

    /// Draw a module at `geometry` until the preview is cleared or committed.
    pub fn preview_geometry(&mut self, id: &str, geometry: Geometry) -> Result<(), InteractionError> {
        self.require(id)?;
        self.geometry_preview.insert(id.to_string(), geometry);
        self.rerender();
        Ok(())
    }

    pub fn clear_geometry_preview(&mut self, id: &str) {
        if self.geometry_preview.remove(id).is_some() {
            self.rerender();
        }
    }

    /// Full re-render of the frame from the model plus active previews.
    pub fn rerender(&mut self) {
        let reordered: Option<Vec<Module>> = match (&self.order_preview, self.mode) {
            (Some(order), LayoutMode::Snap) if order.len() == self.modules.len() => {
                Some(order.iter().map(|&i| self.modules[i].clone()).collect())
            }
            _ => None,
        };
        let visual: &[Module] = reordered.as_deref().unwrap_or(&self.modules);

        let geometry = match self.engine.compute(self.mode, visual) {
            Ok(geometry) => geometry,
            Err(e) => {
                log::warn!("Snap layout failed, falling back to free geometry: {e}");
                self.engine.compute_free(visual)
            }
        };

        let mut rendered = Vec::with_capacity(visual.len());
        let mut index = SpatialIndex::new(SpatialIndex::CELL_SIZE);
        for (module, computed) in visual.iter().zip(geometry) {
            let geometry = self.geometry_preview.get(&module.id).copied().unwrap_or(computed);
            index.push(geometry);
            rendered.push(render_module(module, geometry, self.today, self.monthly_event_cap));
        }

        self.frame = Frame {
            generation: self.frame.generation + 1,
            mode: self.mode,
            modules: rendered,
        };
        self.index = index;
    }

    // ---------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------

    /// Apply completed saves to the status line.
    pub fn poll_sync(&mut self) -> Vec<SyncEvent> {
        let Some(persister) = self.persister.as_mut() else {
            return Vec::new();
        };
        let events = persister.drain();
        for event in &events {
            match event {
                SyncEvent::Saved { revision } => {
                    log::debug!("Revision {revision} saved");
                    if self.status.as_ref().is_some_and(|s| s.text == SAVE_FAILED_MESSAGE) {
                        self.status = None;
                    }
                }
                SyncEvent::Failed { error, .. } if error.is_authorization() => {
                    log::warn!("Saving stopped until sign-in: {error}");
                    self.require_reauth();
                }
                SyncEvent::Failed { .. } => {
                    self.status = Some(StatusMessage::error(SAVE_FAILED_MESSAGE));
                }
            }
        }
        events
    }

    /// Wait for in-flight saves, then apply their outcomes.
    pub async fn flush(&mut self) -> Vec<SyncEvent> {
        if let Some(persister) = self.persister.as_mut() {
            persister.flush().await;
        }
        self.poll_sync()
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn require(&self, id: &str) -> Result<usize, InteractionError> {
        self.index_of(id)
            .ok_or_else(|| InteractionError::UnknownModule(id.to_string()))
    }

    fn commit(&mut self) {
        for module in &mut self.modules {
            module.normalize_in_place();
        }
        dedupe_module_ids(&mut self.modules);
        if self.mode == LayoutMode::Free {
            self.engine.pack(&mut self.modules);
        }
        self.pending_edits = false;
        self.rerender();
        self.persist();
    }

    fn live(&mut self, index: usize) {
        let module = &mut self.modules[index];
        module.normalize_in_place();
        self.pending_edits = true;
        if let Some(rendered) = self.frame.modules.iter_mut().find(|r| r.id == module.id) {
            *rendered = render_module(module, rendered.geometry, self.today, self.monthly_event_cap);
        }
    }

    fn persist(&mut self) {
        let snapshot = self.snapshot();
        match self.persister.as_mut() {
            Some(persister) => {
                let revision = persister.submit(snapshot);
                log::debug!("Persisting {} module(s) as revision {revision}", self.modules.len());
            }
            None => log::debug!("Not signed in; keeping changes local"),
        }
    }
}

fn required_text(text: &str) -> Result<&str, InteractionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(InteractionError::EmptyText)
    } else {
        Ok(trimmed)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, InteractionError> {
    parse_day(raw).ok_or_else(|| InteractionError::InvalidDate(raw.to_string()))
}

fn unknown_item(module: &str, item: &str) -> InteractionError {
    InteractionError::UnknownItem { module: module.to_string(), item: item.to_string() }
}

fn wrong_kind(module: &Module, expected: ModuleKind) -> InteractionError {
    InteractionError::WrongKind { module: module.id.clone(), expected, actual: module.kind() }
}

fn calendar_items(module: &mut Module) -> Result<&mut Vec<CalendarEvent>, InteractionError> {
    let actual = module.kind();
    match &mut module.body {
        ModuleBody::Calendar { items, .. } => Ok(items),
        _ => Err(InteractionError::WrongKind {
            module: module.id.clone(),
            expected: ModuleKind::Calendar,
            actual,
        }),
    }
}

fn push_id<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> &String) -> String {
    let item_id = id(&item).clone();
    items.push(item);
    item_id
}

fn remove_by_id<T>(items: &mut Vec<T>, item_id: &str, id: impl Fn(&T) -> &String) -> bool {
    let before = items.len();
    items.retain(|item| id(item) != item_id);
    items.len() != before
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 13).unwrap()
    }

    fn store() -> WorkspaceStore {
        let mut store = WorkspaceStore::new(&WorkspaceConfig::default());
        store.set_today(today());
        store
    }

    fn ids(store: &WorkspaceStore) -> Vec<String> {
        store.modules().iter().map(|m| m.id.clone()).collect()
    }

    #[test]
    fn test_add_module_renders() {
        let mut store = store();
        let before = store.frame().generation;
        let id = store.add_module(ModuleKind::TaskList);
        assert_eq!(store.frame().order(), vec![id.as_str()]);
        assert!(store.frame().generation > before);
        assert_eq!(store.frame().modules[0].chip, "Task List");
    }

    #[test]
    fn test_move_module_splices() {
        let mut store = store();
        let a = store.add_module(ModuleKind::Note);
        let b = store.add_module(ModuleKind::Note);
        let c = store.add_module(ModuleKind::Note);
        store.move_module(0, 2).unwrap();
        assert_eq!(ids(&store), vec![b, c, a]);
        assert!(matches!(
            store.move_module(0, 3),
            Err(InteractionError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_empty_item_text_rejected() {
        let mut store = store();
        let id = store.add_module(ModuleKind::Note);
        let generation = store.frame().generation;
        assert_eq!(store.add_item(&id, "   "), Err(InteractionError::EmptyText));
        assert_eq!(store.frame().generation, generation);
        assert!(store.module(&id).unwrap().body.is_empty());
    }

    #[test]
    fn test_delete_last_note_item_leaves_placeholder() {
        let mut store = store();
        let id = store.add_module(ModuleKind::Note);
        let item = store.add_item(&id, "only line").unwrap();
        store.delete_item(&id, &item).unwrap();
        match &store.module(&id).unwrap().body {
            ModuleBody::Note { items } => {
                assert_eq!(items.len(), 1);
                assert_ne!(items[0].id, item);
                assert!(items[0].text.is_empty());
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_delete_last_task_and_event_leaves_empty() {
        let mut store = store();
        let tasks = store.add_module(ModuleKind::TaskList);
        let task = store.add_item(&tasks, "only task").unwrap();
        store.delete_item(&tasks, &task).unwrap();
        assert!(store.module(&tasks).unwrap().body.is_empty());

        let cal = store.add_module(ModuleKind::Calendar);
        let event = store.add_item(&cal, "standup").unwrap();
        store.delete_item(&cal, &event).unwrap();
        assert!(store.module(&cal).unwrap().body.is_empty());
    }

    #[test]
    fn test_toggle_requires_task_list() {
        let mut store = store();
        let note = store.add_module(ModuleKind::Note);
        let item = store.add_item(&note, "x").unwrap();
        assert!(matches!(
            store.toggle_item(&note, &item),
            Err(InteractionError::WrongKind { expected: ModuleKind::TaskList, .. })
        ));
    }

    #[test]
    fn test_calendar_item_uses_view_date() {
        let mut store = store();
        let cal = store.add_module(ModuleKind::Calendar);
        store.set_view_date(&cal, "2024-07-04").unwrap();
        store.add_item(&cal, "fireworks").unwrap();
        let ModuleBody::Calendar { items, .. } = &store.module(&cal).unwrap().body else {
            panic!("not a calendar");
        };
        assert_eq!(items[0].date, NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
    }

    #[test]
    fn test_invalid_event_date_rejected() {
        let mut store = store();
        let cal = store.add_module(ModuleKind::Calendar);
        assert_eq!(
            store.add_event(&cal, "someday", "x"),
            Err(InteractionError::InvalidDate("someday".into()))
        );
    }

    #[test]
    fn test_shift_view_date_by_month() {
        let mut store = store();
        let cal = store.add_module(ModuleKind::Calendar);
        store.set_view_date(&cal, "2024-01-31").unwrap();
        let anchor = store.shift_view_date(&cal, 1).unwrap();
        assert_eq!(anchor, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_live_edits_defer_commit() {
        let mut store = store();
        let id = store.add_module(ModuleKind::Note);
        let generation = store.frame().generation;
        store.set_color(&id, "RED").unwrap();
        store.set_title(&id, "Groceries").unwrap();
        assert!(store.has_pending_edits());
        assert_eq!(store.frame().generation, generation);
        let rendered = store.frame().module(&id).unwrap();
        assert_eq!(rendered.color, "#ff0000");
        assert_eq!(rendered.title, "Groceries");

        assert!(store.commit_edits());
        assert!(!store.has_pending_edits());
        assert!(store.frame().generation > generation);
        assert!(!store.commit_edits());
    }

    #[test]
    fn test_set_size_clears_width() {
        let mut store = store();
        let id = store.add_module(ModuleKind::Note);
        store.set_dimensions(&id, 500, 300).unwrap();
        store.set_size(&id, ModuleSize::Large).unwrap();
        let module = store.module(&id).unwrap();
        assert_eq!(module.width, None);
        assert_eq!(module.height, Some(300));
    }

    #[test]
    fn test_dimensions_floor() {
        let mut store = store();
        let id = store.add_module(ModuleKind::Note);
        store.set_dimensions(&id, 10, 10).unwrap();
        let module = store.module(&id).unwrap();
        assert_eq!((module.width, module.height), (Some(MIN_WIDTH), Some(MIN_HEIGHT)));
    }

    #[test]
    fn test_free_mode_packs_unplaced() {
        let mut store = store();
        store.add_module(ModuleKind::Note);
        store.add_module(ModuleKind::Note);
        assert!(store.modules().iter().all(|m| m.position.is_none()));
        store.set_mode(LayoutMode::Free);
        let positions: Vec<_> = store.modules().iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![Some(Position::new(20, 20)), Some(Position::new(400, 20))]);

        // Placed modules do not feed the running column heights.
        let added = store.add_module(ModuleKind::Note);
        assert_eq!(store.module(&added).unwrap().position, Some(Position::new(20, 20)));
    }

    #[test]
    fn test_load_normalizes_and_dedupes() {
        let mut store = store();
        store.load(&[json!({"id": "x", "type": "note"}), json!({"id": "x"}), json!("junk")], None);
        assert_eq!(store.modules().len(), 3);
        let ids = ids(&store);
        assert_eq!(ids[0], "x");
        assert_ne!(ids[1], "x");
        assert!(!store.has_pending_edits());
    }

    #[test]
    fn test_reorder_preview_leaves_model() {
        let mut store = store();
        let a = store.add_module(ModuleKind::Note);
        let b = store.add_module(ModuleKind::Note);
        store.preview_reorder(0, 1).unwrap();
        assert_eq!(store.frame().order(), vec![b.as_str(), a.as_str()]);
        assert_eq!(ids(&store), vec![a.clone(), b.clone()]);
        store.clear_reorder_preview();
        assert_eq!(store.frame().order(), vec![a.as_str(), b.as_str()]);
    }

    #[test]
    fn test_hit_test_resolves_header() {
        let mut store = store();
        let id = store.add_module(ModuleKind::Note);
        let geometry = store.geometry_of(&id).unwrap();
        let hit = store.hit_test(geometry.x as f32 + 10.0, geometry.y as f32 + 10.0);
        assert_eq!(hit, Some((id, HitRegion::Header)));
        assert_eq!(store.hit_test(5.0, 5.0), None);
    }

    #[test]
    fn test_signed_out_commits_stay_local() {
        let mut store = store();
        store.add_module(ModuleKind::Note);
        assert!(!store.is_persisting());
        assert!(store.poll_sync().is_empty());
    }

    #[test]
    fn test_oversized_records_load_in_free_mode() {
        let mut store = store();
        store.set_mode(LayoutMode::Free);
        store.load(&[json!({ "height": 1e12 }), json!({ "height": 1e12, "width": 1e12 })], None);
        let first = store.module(&ids(&store)[0]).unwrap();
        assert_eq!(first.height, Some(MAX_HEIGHT));
        let second = store.module(&ids(&store)[1]).unwrap();
        assert_eq!(second.width, Some(MAX_WIDTH));
        assert_eq!(store.frame().modules.len(), 2);
    }

    #[test]
    fn test_set_dimensions_caps_size() {
        let mut store = store();
        store.set_mode(LayoutMode::Free);
        let id = store.add_module(ModuleKind::Note);
        store.set_dimensions(&id, u32::MAX, u32::MAX).unwrap();
        let module = store.module(&id).unwrap();
        assert_eq!((module.width, module.height), (Some(MAX_WIDTH), Some(MAX_HEIGHT)));
    }
}

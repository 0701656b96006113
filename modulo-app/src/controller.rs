//! Pointer gestures on the module canvas.
//!
//! ```text
//!            drag_start ──► drag_over* ──► drag_end     (snap: reorder)
//!                                    └───► drag_cancel
//! pointer_down ─► begin_move/resize ──► pointer_move* ──► pointer_up      (free)
//!                                                  └───► pointer_cancel
//! ```
//!
//! Every intermediate step is a frame preview only; the model changes (and
//! one save is issued) on the closing event. At most one gesture may be in
//! progress per module; a second start on the same module is rejected.
//! Cancelling drops the preview, which re-renders the committed geometry.

use std::collections::HashMap;

use modulo_core::{Position, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH};
use modulo_layout::{Geometry, HitRegion, LayoutMode};

use crate::error::InteractionError;
use crate::store::WorkspaceStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Reorder,
    Move,
    Resize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Reorder {
        source: usize,
        target: usize,
    },
    Move {
        start: (f32, f32),
        origin: Geometry,
    },
    Resize {
        start: (f32, f32),
        origin: Geometry,
    },
}

impl Gesture {
    fn kind(&self) -> GestureKind {
        match self {
            Gesture::Reorder { .. } => GestureKind::Reorder,
            Gesture::Move { .. } => GestureKind::Move,
            Gesture::Resize { .. } => GestureKind::Resize,
        }
    }

    /// Geometry the pointer at `(px, py)` implies for a move or resize.
    fn track(&self, px: f32, py: f32) -> Option<Geometry> {
        match *self {
            Gesture::Reorder { .. } => None,
            Gesture::Move { start, origin } => Some(Geometry {
                x: offset(origin.x, px - start.0, 0, u32::MAX),
                y: offset(origin.y, py - start.1, 0, u32::MAX),
                ..origin
            }),
            // Top-left stays put; only the bottom-right corner follows.
            Gesture::Resize { start, origin } => Some(Geometry {
                width: offset(origin.width, px - start.0, MIN_WIDTH, MAX_WIDTH),
                height: offset(origin.height, py - start.1, MIN_HEIGHT, MAX_HEIGHT),
                ..origin
            }),
        }
    }
}

fn offset(base: u32, delta: f32, floor: u32, ceiling: u32) -> u32 {
    (base as f32 + delta).round().clamp(floor as f32, ceiling as f32) as u32
}

#[derive(Debug, Default)]
pub struct InteractionController {
    gestures: HashMap<String, Gesture>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self, id: &str) -> Option<GestureKind> {
        self.gestures.get(id).map(Gesture::kind)
    }

    pub fn active_count(&self) -> usize {
        self.gestures.len()
    }

    fn claim(&mut self, id: &str, gesture: Gesture) -> Result<(), InteractionError> {
        if self.gestures.contains_key(id) {
            log::debug!("Rejecting second gesture on module {id}");
            return Err(InteractionError::GestureInProgress(id.to_string()));
        }
        self.gestures.insert(id.to_string(), gesture);
        Ok(())
    }

    fn release(&mut self, id: &str) -> Result<Gesture, InteractionError> {
        self.gestures
            .remove(id)
            .ok_or_else(|| InteractionError::NoGesture(id.to_string()))
    }

    // ---------------------------------------------------------------
    // Reorder (snap mode)
    // ---------------------------------------------------------------

    /// Start dragging the module at `index`. Returns its id.
    ///
    /// The store holds a single order preview, so only one reorder can run
    /// at a time; moves and resizes on other modules are unaffected.
    pub fn drag_start(&mut self, store: &WorkspaceStore, index: usize) -> Result<String, InteractionError> {
        require_mode(store, LayoutMode::Snap)?;
        if let Some(active) = self.gestures.iter().find_map(|(id, g)| {
            matches!(g, Gesture::Reorder { .. }).then(|| id.clone())
        }) {
            return Err(InteractionError::ReorderInProgress(active));
        }
        let len = store.modules().len();
        let id = store
            .modules()
            .get(index)
            .map(|m| m.id.clone())
            .ok_or(InteractionError::IndexOutOfRange { index, len })?;
        self.claim(&id, Gesture::Reorder { source: index, target: index })?;
        log::debug!("Reorder drag started on {id} at {index}");
        Ok(id)
    }

    /// Hover over `target`. Returns whether the preview changed; hovers
    /// over the source itself or outside the list are ignored.
    pub fn drag_over(&mut self, store: &mut WorkspaceStore, id: &str, target: usize) -> Result<bool, InteractionError> {
        let Some(Gesture::Reorder { source, target: current }) = self.gestures.get_mut(id) else {
            return Err(InteractionError::NoGesture(id.to_string()));
        };
        if target >= store.modules().len() || target == *current {
            return Ok(false);
        }
        *current = target;
        if target == *source {
            store.clear_reorder_preview();
        } else {
            store.preview_reorder(*source, target)?;
        }
        Ok(true)
    }

    /// Drop: commit the previewed order with a single save. Returns whether
    /// the order changed.
    pub fn drag_end(&mut self, store: &mut WorkspaceStore, id: &str) -> Result<bool, InteractionError> {
        let Gesture::Reorder { source, target } = self.release_kind(id, GestureKind::Reorder)? else {
            return Err(InteractionError::NoGesture(id.to_string()));
        };
        store.clear_reorder_preview();
        if source == target || store.index_of(id) != Some(source) {
            return Ok(false);
        }
        store.move_module(source, target)?;
        log::debug!("Reordered {id}: {source} -> {target}");
        Ok(true)
    }

    pub fn drag_cancel(&mut self, store: &mut WorkspaceStore, id: &str) -> Result<(), InteractionError> {
        self.release_kind(id, GestureKind::Reorder)?;
        store.clear_reorder_preview();
        Ok(())
    }

    // ---------------------------------------------------------------
    // Move / resize (free mode)
    // ---------------------------------------------------------------

    /// Route a pointer press: header starts a move, the corner handle a
    /// resize, anything else is left to inline editing.
    pub fn pointer_down(
        &mut self,
        store: &WorkspaceStore,
        px: f32,
        py: f32,
    ) -> Result<Option<(String, GestureKind)>, InteractionError> {
        if store.mode() != LayoutMode::Free {
            return Ok(None);
        }
        let Some((id, region)) = store.hit_test(px, py) else {
            return Ok(None);
        };
        let kind = match region {
            HitRegion::Header => {
                self.begin_move(store, &id, px, py)?;
                GestureKind::Move
            }
            HitRegion::ResizeHandle => {
                self.begin_resize(store, &id, px, py)?;
                GestureKind::Resize
            }
            HitRegion::Body => return Ok(None),
        };
        Ok(Some((id, kind)))
    }

    pub fn begin_move(&mut self, store: &WorkspaceStore, id: &str, px: f32, py: f32) -> Result<(), InteractionError> {
        let origin = free_geometry(store, id)?;
        self.claim(id, Gesture::Move { start: (px, py), origin })
    }

    pub fn begin_resize(&mut self, store: &WorkspaceStore, id: &str, px: f32, py: f32) -> Result<(), InteractionError> {
        let origin = free_geometry(store, id)?;
        self.claim(id, Gesture::Resize { start: (px, py), origin })
    }

    /// Follow the pointer visually. Nothing is persisted.
    pub fn pointer_move(
        &mut self,
        store: &mut WorkspaceStore,
        id: &str,
        px: f32,
        py: f32,
    ) -> Result<Geometry, InteractionError> {
        let geometry = self
            .gestures
            .get(id)
            .and_then(|g| g.track(px, py))
            .ok_or_else(|| InteractionError::NoGesture(id.to_string()))?;
        store.preview_geometry(id, geometry)?;
        Ok(geometry)
    }

    /// Release: commit the final position or size with a single save.
    pub fn pointer_up(
        &mut self,
        store: &mut WorkspaceStore,
        id: &str,
        px: f32,
        py: f32,
    ) -> Result<Geometry, InteractionError> {
        let gesture = self.release(id)?;
        let Some(geometry) = gesture.track(px, py) else {
            self.gestures.insert(id.to_string(), gesture);
            return Err(InteractionError::NoGesture(id.to_string()));
        };
        let committed = match gesture {
            Gesture::Resize { .. } => store.set_dimensions(id, geometry.width, geometry.height),
            _ => store.set_position(id, Position::new(geometry.x, geometry.y)),
        };
        if let Err(e) = committed {
            store.clear_geometry_preview(id);
            return Err(e);
        }
        log::debug!("{:?} on {id} committed at {geometry:?}", gesture.kind());
        Ok(geometry)
    }

    /// Pointer capture lost: drop the preview so the frame shows the model.
    pub fn pointer_cancel(&mut self, store: &mut WorkspaceStore, id: &str) -> Result<(), InteractionError> {
        let gesture = self.release(id)?;
        if gesture.kind() == GestureKind::Reorder {
            store.clear_reorder_preview();
        } else {
            store.clear_geometry_preview(id);
        }
        log::debug!("{:?} on {id} cancelled", gesture.kind());
        Ok(())
    }

    /// Abort every gesture (e.g. the window lost focus or the mode changed).
    pub fn cancel_all(&mut self, store: &mut WorkspaceStore) {
        for (id, gesture) in self.gestures.drain() {
            match gesture.kind() {
                GestureKind::Reorder => store.clear_reorder_preview(),
                _ => store.clear_geometry_preview(&id),
            }
        }
    }

    fn release_kind(&mut self, id: &str, kind: GestureKind) -> Result<Gesture, InteractionError> {
        match self.gestures.get(id) {
            Some(gesture) if gesture.kind() == kind => self.release(id),
            _ => Err(InteractionError::NoGesture(id.to_string())),
        }
    }
}

fn require_mode(store: &WorkspaceStore, mode: LayoutMode) -> Result<(), InteractionError> {
    if store.mode() == mode {
        Ok(())
    } else {
        Err(InteractionError::WrongMode(mode))
    }
}

fn free_geometry(store: &WorkspaceStore, id: &str) -> Result<Geometry, InteractionError> {
    require_mode(store, LayoutMode::Free)?;
    store
        .geometry_of(id)
        .ok_or_else(|| InteractionError::UnknownModule(id.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

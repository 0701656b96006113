//! Greedy column packing for free mode.
//!
//! The canvas is cut into fixed-width columns, each with a running "next
//! free y" starting at the top margin. Every unplaced module, in sequence
//! order, goes to the top of the currently shortest column (lowest index on
//! ties), which then grows by the module's height plus the gap.
//!
//! This does not optimise packing globally. It guarantees that modules it
//! places in the same column never overlap vertically, and it is fully
//! deterministic given module order and heights. Modules that already have
//! a position are left alone and do not feed the running heights.

use modulo_core::{Module, Position};

use crate::engine::LayoutConfig;

#[derive(Debug, Clone)]
pub struct ColumnPacker {
    column_width: u32,
    margin: u32,
    gap: u32,
    next_y: Vec<u32>,
}

impl ColumnPacker {
    pub fn new(config: &LayoutConfig) -> Self {
        let columns = (config.canvas_width / config.column_width.max(1)).max(1) as usize;
        Self {
            column_width: config.column_width,
            margin: config.margin,
            gap: config.gap,
            next_y: vec![config.margin; columns],
        }
    }

    pub fn columns(&self) -> usize {
        self.next_y.len()
    }

    /// Reserve a slot of `height` pixels and return its top-left corner.
    pub fn place(&mut self, height: u32) -> Position {
        let (column, y) = self
            .next_y
            .iter()
            .copied()
            .enumerate()
            .min_by_key(|&(index, y)| (y, index))
            .unwrap_or((0, self.margin));

        if let Some(next) = self.next_y.get_mut(column) {
            *next = y.saturating_add(height).saturating_add(self.gap);
        }
        let x = (column as u32)
            .saturating_mul(self.column_width)
            .saturating_add(self.margin);
        Position::new(x, y)
    }
}

/// Give every module with `position == None` a packed position.
/// Returns the number of modules placed.
pub fn pack_unplaced(modules: &mut [Module], config: &LayoutConfig) -> usize {
    let mut packer = ColumnPacker::new(config);
    let mut placed = 0;
    for module in modules.iter_mut().filter(|m| m.position.is_none()) {
        let position = packer.place(module.effective_height());
        log::debug!("packed module {} at ({}, {})", module.id, position.x, position.y);
        module.position = Some(position);
        placed += 1;
    }
    placed
}

use modulo_core::{Module, MIN_WIDTH};
use serde::{Deserialize, Serialize};
use taffy::{
    AlignContent, AlignItems, AvailableSpace, Dimension, Display, FlexDirection, FlexWrap,
    LengthPercentage, NodeId, Size, Style, TaffyError, TaffyTree,
};
use thiserror::Error;

use crate::packing::ColumnPacker;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Taffy error: {0}")]
    Taffy(#[from] TaffyError),
}

/// Workspace-wide layout mode. Stored client-locally, never in module records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Snap,
    Free,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Snap => "snap",
            LayoutMode::Free => "free",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "snap" => Some(LayoutMode::Snap),
            "free" => Some(LayoutMode::Free),
            _ => None,
        }
    }
}

/// Canvas metrics shared by both modes.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Width available to the canvas, in pixels.
    pub canvas_width: u32,
    /// Width of one free-mode packing column (module slot plus gutter).
    pub column_width: u32,
    /// Gap between modules, both axes.
    pub gap: u32,
    /// Outer margin; also the initial running height of every packing column.
    pub margin: u32,
    /// Height of the draggable card header.
    pub header_height: u32,
    /// Side of the square resize handle in a card's bottom-right corner.
    pub resize_handle: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200,
            column_width: 380,
            gap: 20,
            margin: 20,
            header_height: 44,
            resize_handle: 18,
        }
    }
}

/// Computed rectangle of one module, in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Whether two rectangles share any interior area.
    pub fn overlaps(&self, other: &Geometry) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Computes module geometry for either layout mode.
///
/// Snap mode runs a taffy flex-wrap pass; the tree is rebuilt on every
/// computation since module order and sizes change together.
pub struct LayoutEngine {
    taffy: TaffyTree,
    config: LayoutConfig,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            taffy: TaffyTree::new(),
            config,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn set_canvas_width(&mut self, width: u32) {
        self.config.canvas_width = width;
    }

    /// Geometry for every module, index-aligned with `modules`.
    pub fn compute(&mut self, mode: LayoutMode, modules: &[Module]) -> Result<Vec<Geometry>, LayoutError> {
        match mode {
            LayoutMode::Snap => self.compute_snap(modules),
            LayoutMode::Free => Ok(self.compute_free(modules)),
        }
    }

    // ---------------------------------------------------------------
    // Snap mode
    // ---------------------------------------------------------------

    fn container_style(&self) -> Style {
        let gap = LengthPercentage::length(self.config.gap as f32);
        let margin = LengthPercentage::length(self.config.margin as f32);
        Style {
            display: Display::Flex,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::Wrap,
            align_items: Some(AlignItems::FlexStart),
            align_content: Some(AlignContent::FlexStart),
            gap: Size { width: gap, height: gap },
            padding: taffy::Rect { left: margin, right: margin, top: margin, bottom: margin },
            size: Size {
                width: Dimension::length(self.config.canvas_width as f32),
                height: Dimension::auto(),
            },
            ..Style::default()
        }
    }

    fn card_style(width: u32, height: u32) -> Style {
        Style {
            size: Size {
                width: Dimension::length(width as f32),
                height: Dimension::length(height as f32),
            },
            flex_shrink: 0.0,
            ..Style::default()
        }
    }

    /// Snap width: size-derived, capped to the canvas content width.
    pub fn snap_width(&self, module: &Module) -> u32 {
        let content = self
            .config
            .canvas_width
            .saturating_sub(2 * self.config.margin)
            .max(MIN_WIDTH);
        module.size.default_width().min(content)
    }

    /// Flow layout in sequence order. Positions stored on modules are ignored.
    pub fn compute_snap(&mut self, modules: &[Module]) -> Result<Vec<Geometry>, LayoutError> {
        self.taffy.clear();

        let mut cards: Vec<NodeId> = Vec::with_capacity(modules.len());
        for module in modules {
            let style = Self::card_style(self.snap_width(module), module.effective_height());
            cards.push(self.taffy.new_leaf(style)?);
        }
        let root = self.taffy.new_with_children(self.container_style(), &cards)?;

        self.taffy.compute_layout(
            root,
            Size {
                width: AvailableSpace::Definite(self.config.canvas_width as f32),
                height: AvailableSpace::MaxContent,
            },
        )?;

        let mut geometry = Vec::with_capacity(cards.len());
        for node in cards {
            let layout = self.taffy.layout(node)?;
            geometry.push(Geometry {
                x: layout.location.x.round().max(0.0) as u32,
                y: layout.location.y.round().max(0.0) as u32,
                width: layout.size.width.round().max(0.0) as u32,
                height: layout.size.height.round().max(0.0) as u32,
            });
        }
        log::trace!("snap layout computed for {} modules", geometry.len());
        Ok(geometry)
    }

    // ---------------------------------------------------------------
    // Free mode
    // ---------------------------------------------------------------

    /// Absolute layout. Modules still lacking a position (the store packs
    /// before rendering, so this is a fallback) get a transient packed slot.
    pub fn compute_free(&self, modules: &[Module]) -> Vec<Geometry> {
        let mut packer = ColumnPacker::new(&self.config);
        modules
            .iter()
            .map(|module| {
                let height = module.effective_height();
                let position = module.position.unwrap_or_else(|| packer.place(height));
                Geometry::new(position.x, position.y, module.effective_width(), height)
            })
            .collect()
    }

    /// Assign positions to every unplaced module. Returns how many were placed.
    pub fn pack(&self, modules: &mut [Module]) -> usize {
        crate::packing::pack_unplaced(modules, &self.config)
    }
}

// ===================================================================
// Tests
// ===================================================================

//! # modulo-layout: geometry for the module canvas
//!
//! Two mutually exclusive modes:
//!
//! - **snap**: modules flow in sequence order, wrapped into rows by a taffy
//!   flex container, each at its size-derived width;
//! - **free**: modules sit at absolute positions; unplaced ones are given a
//!   spot by the greedy [`packing::ColumnPacker`].
//!
//! [`spatial::SpatialIndex`] turns a pointer position back into a module
//! and the region of the card under it.

pub mod engine;
pub mod packing;
pub mod spatial;

pub use engine::{Geometry, LayoutConfig, LayoutEngine, LayoutError, LayoutMode};
pub use packing::{pack_unplaced, ColumnPacker};
pub use spatial::{Aabb, Hit, HitRegion, SpatialIndex};

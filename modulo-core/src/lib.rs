//! # modulo-core: workspace data model for Modulo
//!
//! Canonical module records, their normalization from loaded snapshots, and
//! the pure date-grid functions the calendar module renders from.
//!
//! ## Modules
//!
//! - [`module`]: `Module`, its typed body and geometry defaults
//! - [`items`]: per-type item records (notes, tasks, calendar events)
//! - [`normalize`]: total, idempotent completion of raw/legacy records
//! - [`calendar`]: daily / weekly / monthly date grids and event buckets
//! - [`color`]: canonical `#rrggbb` colors
//! - [`id`]: opaque identifier generation

pub mod calendar;
pub mod color;
pub mod id;
pub mod items;
pub mod module;
pub mod normalize;

pub use calendar::{bucket_events, month_cells, same_day, shift_anchor, week_dates, MonthCell};
pub use color::{normalize_color, DEFAULT_COLOR};
pub use id::generate_id;
pub use items::{CalendarEvent, NoteItem, TaskItem};
pub use module::{
    CalendarView, Module, ModuleBody, ModuleKind, ModuleSize, Position, DEFAULT_HEIGHT,
    MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH,
};
pub use normalize::{dedupe_module_ids, normalize, normalize_on, normalize_workspace};

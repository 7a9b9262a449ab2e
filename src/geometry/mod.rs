//! Box geometry
//!
//! Boxes live in two shapes:
//! - [`BoundingBox`]: normalized center format `(class_id, cx, cy, w, h)`, the
//!   on-disk YOLO layout and the public boundary of the pipeline.
//! - [`TrackedBox`]: normalized corner format used while a sample moves
//!   through the compositor. It carries the cumulative fraction of the
//!   original area that is still visible.
//!
//! Class ids travel inside the box, so box/label alignment can never drift.

mod bbox;
mod frame;

pub use bbox::{BoundingBox, TrackedBox, GEOMETRY_TOLERANCE};
pub use frame::{Frame, PixelRect, Sample};

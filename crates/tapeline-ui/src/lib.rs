//! Widgets for the tapeline ruler input.
//!
//! [`TickSurface`] renders the static tick track as a draw-command list,
//! [`DragAdapter`] turns pointer traffic into scroll-offset motion, and
//! [`RulerInput`] assembles both with the core synchronizer into the full
//! widget.

pub mod drag;
pub mod ruler;
pub mod surface;

pub use drag::{DragAdapter, DragDirection};
pub use ruler::{DragSource, RulerInput};
pub use surface::{Color, DrawCommand, Rect, TickSurface};

//! # Tapeline core
//!
//! Headless model for a scrollable tick-ruler numeric input:
//!
//! - [`RulerSpec`] — the immutable value domain and quantization grid.
//! - [`ScrollState`] — clamped horizontal offset with fling physics.
//! - [`RulerSync`] — the scroll/value synchronizer state machine, including
//!   debounced snap-to-tick and persisted pixel-bias self-calibration.
//! - [`CalibrationStore`] — per-kind bias map over a [`Storage`] adapter.
//!
//! Everything is single-threaded and `Rc`-based; hosts pump [`RulerSync::tick`]
//! (and [`ScrollState::tick`] for fling) once per frame.

pub mod calibrate;
pub mod clock;
pub mod geometry;
pub mod input;
pub mod scroll;
pub mod signal;
pub mod storage;
pub mod sync;

pub use calibrate::CalibrationStore;
pub use clock::{Clock, SystemClock, TestClock};
pub use geometry::{RulerSpec, SpecError, Vec2, Viewport};
pub use input::{PointerButton, PointerEvent, PointerEventKind, PointerId, PointerKind};
pub use scroll::ScrollState;
pub use signal::{Signal, signal};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use sync::{RulerSync, SyncConfig, SyncPhase};

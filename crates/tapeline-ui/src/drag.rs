//! Drag-to-scroll adapter.
//!
//! One abstraction for all three drag sources of the ruler (the track, its
//! wrapping container, and the dedicated pointer handle): press captures a
//! single pointer, moves translate horizontal pointer deltas into scroll
//! offsets, and Up/Cancel/Leave all release the capture so a drag can never
//! stick. Dragging only moves the offset — value adoption happens in the
//! synchronizer's scroll path.

use std::cell::Cell;
use std::rc::Rc;

use tapeline_core::{PointerEvent, PointerEventKind, PointerId, ScrollState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragDirection {
    /// Content moves opposite the finger (track and wrapper drags).
    Inverted,
    /// Target follows the finger (the dedicated pointer handle).
    Direct,
}

pub struct DragAdapter {
    scroll: Rc<ScrollState>,
    direction: DragDirection,
    active: Cell<Option<PointerId>>,
    start_x: Cell<f32>,
    start_offset: Cell<f32>,
}

impl DragAdapter {
    pub fn new(scroll: Rc<ScrollState>, direction: DragDirection) -> Self {
        Self {
            scroll,
            direction,
            active: Cell::new(None),
            start_x: Cell::new(0.0),
            start_offset: Cell::new(0.0),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active.get().is_some()
    }

    pub fn handle(&self, ev: &PointerEvent) {
        match ev.event {
            PointerEventKind::Down(_) => {
                if self.active.get().is_none() {
                    self.active.set(Some(ev.id));
                    self.start_x.set(ev.position.x);
                    self.start_offset.set(self.scroll.get());
                }
            }
            PointerEventKind::Move => {
                if self.active.get() == Some(ev.id) {
                    let dx = ev.position.x - self.start_x.get();
                    let off = match self.direction {
                        DragDirection::Inverted => self.start_offset.get() - dx,
                        DragDirection::Direct => self.start_offset.get() + dx,
                    };
                    self.scroll.set_offset(off);
                }
            }
            PointerEventKind::Up(_) | PointerEventKind::Cancel | PointerEventKind::Leave => {
                if self.active.get() == Some(ev.id) {
                    self.active.set(None);
                }
            }
        }
    }
}

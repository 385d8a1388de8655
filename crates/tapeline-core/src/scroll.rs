//! Horizontal scroll model for the ruler track.
//!
//! Stores viewport size, content size, a clamped X offset, and fling
//! velocity. `scroll_immediate` consumes a requested delta and returns the
//! leftover motion; `tick` advances fling physics one frame. The offset is a
//! [`Signal`], so the synchronizer observes every change (user drag, fling,
//! and programmatic snap alike) from one place.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use web_time::Instant;

use crate::clock::Clock;
use crate::signal::{Signal, signal};

const FLING_FRICTION: f32 = 0.9;
const FLING_STOP_VEL: f32 = 0.05;

pub struct ScrollState {
    offset: Signal<f32>,
    viewport_width: Cell<f32>,
    content_width: Cell<f32>,

    // fling physics
    vel: Cell<f32>,
    last_t: RefCell<Instant>,
    animating: Cell<bool>,
    clock: Rc<dyn Clock>,
}

impl ScrollState {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            offset: signal(0.0),
            viewport_width: Cell::new(0.0),
            content_width: Cell::new(0.0),
            vel: Cell::new(0.0),
            last_t: RefCell::new(now),
            animating: Cell::new(false),
            clock,
        }
    }

    pub fn set_viewport_width(&self, w: f32) {
        self.viewport_width.set(w.max(0.0));
        self.clamp();
    }

    pub fn set_content_width(&self, w: f32) {
        self.content_width.set(w.max(0.0));
        self.clamp();
    }

    fn max_offset(&self) -> f32 {
        (self.content_width.get() - self.viewport_width.get()).max(0.0)
    }

    pub fn set_offset(&self, off: f32) {
        self.offset.set(off.clamp(0.0, self.max_offset()));
    }

    fn clamp(&self) {
        let max_off = self.max_offset();
        let cur = self.offset.get();
        if cur < 0.0 || cur > max_off {
            self.offset.set(cur.clamp(0.0, max_off));
        }
    }

    pub fn get(&self) -> f32 {
        self.offset.get()
    }

    pub fn offset_signal(&self) -> &Signal<f32> {
        &self.offset
    }

    /// Consume dx (pixels), clamp to bounds, return leftover.
    pub fn scroll_immediate(&self, dx: f32) -> f32 {
        let before = self.offset.get();
        let new_off = (before + dx).clamp(0.0, self.max_offset());
        self.offset.set(new_off);

        let consumed = new_off - before;
        self.vel.set(consumed); // px/frame baseline
        self.animating.set(consumed.abs() > 0.25);
        dx - consumed
    }

    /// Advance fling physics one tick; returns true while still moving.
    pub fn tick(&self) -> bool {
        if !self.animating.get() {
            return false;
        }
        let now = self.clock.now();
        let dt = now
            .saturating_duration_since(*self.last_t.borrow())
            .as_secs_f32()
            .min(0.1);
        *self.last_t.borrow_mut() = now;
        if dt <= 0.0 {
            return false;
        }

        let vel = self.vel.get();
        if vel.abs() < FLING_STOP_VEL {
            self.vel.set(0.0);
            self.animating.set(false);
            return false;
        }

        let before = self.offset.get();
        let new_off = (before + vel).clamp(0.0, self.max_offset());
        self.offset.set(new_off);
        self.vel.set(vel * FLING_FRICTION);
        true
    }
}

//! # Scroll/value synchronizer
//!
//! Bidirectional binding between an external numeric value and the ruler's
//! scroll offset.
//!
//! The synchronizer is an explicit state machine rather than an ad-hoc
//! "programmatic scroll" flag:
//!
//! - `Idle` — at rest; the offset matches the committed value within 1 px.
//! - `Programmatic` — the synchronizer itself assigned the offset; scroll
//!   notifications are self-induced and ignored until the next frame.
//! - `UserScroll` — a gesture or fling is moving the track; candidate values
//!   are adopted live and the settle debounce keeps restarting.
//! - `Snapping` — the debounce fired (or a spurious jump was rejected) and
//!   the track is being driven back onto the exact tick offset.
//!
//! On settle, the residual distance between the resting offset and the
//! theoretical offset of the nearest tick is folded into the persisted
//! per-kind bias when it is within `auto_bias_cap` — sub-pixel layout drift
//! from fonts, zoom, or DPI self-corrects over time. A manual [`recenter`]
//! folds the full residual, uncapped.
//!
//! Scheduling is cooperative: the host calls [`tick`] once per frame. Time
//! comes from an injected [`Clock`] so tests drive settling deterministically.
//!
//! [`recenter`]: RulerSync::recenter
//! [`tick`]: RulerSync::tick

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use web_time::{Duration, Instant};

use crate::calibrate::CalibrationStore;
use crate::clock::Clock;
use crate::geometry::{RulerSpec, Viewport};
use crate::scroll::ScrollState;
use crate::signal::{Signal, signal};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Programmatic,
    UserScroll,
    Snapping,
}

#[derive(Clone, Copy, Debug)]
pub struct SyncConfig {
    /// Debounce between the last scroll movement and the snap-to-tick.
    pub settle_delay: Duration,
    /// Largest residual the automatic path will fold into the bias. Manual
    /// recenter ignores this cap.
    pub auto_bias_cap: f32,
    /// Candidate values further than this (in value units) from the last
    /// committed value are rejected as spurious and re-snapped instead.
    pub jump_threshold: f32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(100),
            auto_bias_cap: 1.0,
            jump_threshold: 5.0,
        }
    }
}

pub struct RulerSync {
    spec: RulerSpec,
    scroll: Rc<ScrollState>,
    calibration: Rc<CalibrationStore>,
    clock: Rc<dyn Clock>,
    config: SyncConfig,

    viewport: Cell<Viewport>,
    phase: Cell<SyncPhase>,
    /// Raised while a self-assigned offset is settling; cleared next frame.
    guard: Cell<bool>,
    value: Signal<f32>,
    committed: Cell<f32>,
    settle_at: Cell<Option<Instant>>,
    /// Snap deferred to the next frame. A scroll observer must not write the
    /// offset signal it is observing, so rejections park the target here.
    pending_snap: Cell<Option<usize>>,

    on_input: RefCell<Option<Rc<dyn Fn(f32)>>>,
    on_commit: RefCell<Option<Rc<dyn Fn(f32)>>>,
}

impl RulerSync {
    /// Build the synchronizer, subscribe it to the scroll offset, and drive
    /// the track to `initial` using the persisted bias for `spec.kind`.
    pub fn new(
        spec: RulerSpec,
        scroll: Rc<ScrollState>,
        calibration: Rc<CalibrationStore>,
        clock: Rc<dyn Clock>,
        config: SyncConfig,
        viewport: Viewport,
        initial: f32,
    ) -> Rc<Self> {
        let initial = spec.quantize(initial);
        let sync = Rc::new(Self {
            spec,
            scroll,
            calibration,
            clock,
            config,
            viewport: Cell::new(viewport),
            phase: Cell::new(SyncPhase::Idle),
            guard: Cell::new(false),
            value: signal(initial),
            committed: Cell::new(initial),
            settle_at: Cell::new(None),
            pending_snap: Cell::new(None),
            on_input: RefCell::new(None),
            on_commit: RefCell::new(None),
        });

        let weak = Rc::downgrade(&sync);
        sync.scroll.offset_signal().subscribe(move |off| {
            if let Some(s) = weak.upgrade() {
                s.handle_scroll(*off);
            }
        });

        let idx = sync.spec.index_for_value(initial);
        sync.drive_to(idx, SyncPhase::Programmatic);
        sync
    }

    pub fn spec(&self) -> &RulerSpec {
        &self.spec
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase.get()
    }

    pub fn value(&self) -> f32 {
        self.value.get()
    }

    pub fn value_signal(&self) -> &Signal<f32> {
        &self.value
    }

    pub fn committed(&self) -> f32 {
        self.committed.get()
    }

    /// Live notification while a gesture is in flight.
    pub fn set_on_input(&self, cb: impl Fn(f32) + 'static) {
        *self.on_input.borrow_mut() = Some(Rc::new(cb));
    }

    /// Committed-value notification, fired at settle.
    pub fn set_on_commit(&self, cb: impl Fn(f32) + 'static) {
        *self.on_commit.borrow_mut() = Some(Rc::new(cb));
    }

    /// Layout metrics changed (resize, zoom, reflow). Takes effect on the
    /// next conversion; the settle path always reads the latest metrics.
    pub fn set_viewport(&self, vp: Viewport) {
        self.viewport.set(vp);
    }

    /// External value change: quantize, then drive the track to its offset.
    ///
    /// Must not be called from inside an `on_input` callback; it assigns the
    /// scroll offset, and the offset signal is still mid-notification there.
    pub fn set_value(&self, v: f32) {
        let v = self.spec.quantize(v);
        self.committed.set(v);
        if self.value.get() != v {
            self.value.set(v);
        }
        self.settle_at.set(None);
        self.pending_snap.set(None);
        self.drive_to(self.spec.index_for_value(v), SyncPhase::Programmatic);
    }

    /// Manual realignment: fold the FULL offset discrepancy for the current
    /// value into the persisted bias, then snap. Idempotent — a second call
    /// without intervening scroll finds a zero residual.
    pub fn recenter(&self) {
        let vp = self.viewport.get();
        let bias = self.calibration.get(&self.spec.kind);
        let idx = self.spec.index_for_value(self.committed.get());
        let exact = self.spec.offset_for_index(idx, vp, bias);
        let residual = self.scroll.get() - exact;
        if residual != 0.0 {
            log::debug!(
                "ruler {}: manual recenter folds {residual:.3}px into bias",
                self.spec.kind
            );
            self.calibration.set(&self.spec.kind, bias + residual);
        }
        self.settle_at.set(None);
        self.pending_snap.set(None);
        self.drive_to(idx, SyncPhase::Programmatic);
    }

    /// Frame pump: clears the reentrancy guard one frame after a
    /// programmatic assignment, executes deferred snaps, and fires the
    /// settle debounce.
    pub fn tick(&self) {
        if self.guard.get() {
            // The self-induced scroll notification has been delivered by
            // now; re-enable the user-scroll path.
            self.guard.set(false);
            self.phase.set(SyncPhase::Idle);
            return;
        }

        if let Some(idx) = self.pending_snap.take() {
            self.drive_to(idx, SyncPhase::Snapping);
            return;
        }

        if let Some(deadline) = self.settle_at.get()
            && self.clock.now() >= deadline
        {
            self.settle_at.set(None);
            self.settle();
        }
    }

    /// Observer for every offset change: user drag, fling, and our own
    /// programmatic assignments (which the guard filters out).
    fn handle_scroll(&self, offset: f32) {
        if self.guard.get() {
            return;
        }

        let vp = self.viewport.get();
        let bias = self.calibration.get(&self.spec.kind);
        let idx = self.spec.index_for_offset(offset, vp, bias);
        let candidate = self.spec.value_for_index(idx);
        // Compare against the last value this widget accepted (live or
        // committed); a legitimate drag only ever moves a fraction of a
        // step per event.
        let current = self.value.get();

        if (candidate - current).abs() > self.config.jump_threshold {
            // Spurious delta (forced scroll, mid-drag resize). Drop the
            // candidate and park a snap back to the accepted value.
            log::debug!(
                "ruler {}: rejecting jump {current} -> {candidate}",
                self.spec.kind
            );
            self.phase.set(SyncPhase::Snapping);
            self.settle_at.set(None);
            self.pending_snap.set(Some(self.spec.index_for_value(current)));
            return;
        }

        self.phase.set(SyncPhase::UserScroll);
        if current != candidate {
            self.value.set(candidate);
            let cb = self.on_input.borrow().clone();
            if let Some(cb) = cb {
                cb(candidate);
            }
        }
        self.settle_at
            .set(Some(self.clock.now() + self.config.settle_delay));
    }

    /// Debounce fired: quantize the resting offset, self-calibrate, snap.
    fn settle(&self) {
        let vp = self.viewport.get();
        let bias = self.calibration.get(&self.spec.kind);
        let actual = self.scroll.get();
        let idx = self.spec.index_for_offset(actual, vp, bias);
        let exact = self.spec.offset_for_index(idx, vp, bias);
        let residual = actual - exact;

        if residual != 0.0 && residual.abs() <= self.config.auto_bias_cap {
            log::debug!(
                "ruler {}: folding {residual:.3}px residual into bias",
                self.spec.kind
            );
            self.calibration.set(&self.spec.kind, bias + residual);
        }

        let v = self.spec.value_for_index(idx);
        self.committed.set(v);
        if self.value.get() != v {
            self.value.set(v);
        }
        let cb = self.on_commit.borrow().clone();
        if let Some(cb) = cb {
            cb(v);
        }
        self.drive_to(idx, SyncPhase::Snapping);
    }

    fn drive_to(&self, idx: usize, phase: SyncPhase) {
        let vp = self.viewport.get();
        let bias = self.calibration.get(&self.spec.kind);
        let target = self.spec.offset_for_index(idx, vp, bias);
        self.phase.set(phase);
        self.guard.set(true);
        self.scroll.set_offset(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TestClock;
    use crate::storage::{MemoryStorage, Storage};
    
    const VP: Viewport = Viewport {
        width: 360.0,
        left_padding: 180.0,
    };

    fn weight_spec() -> RulerSpec {
        RulerSpec::new("weight", 40.0, 80.0, 0.1, 24.0, "kg").unwrap()
    }

    struct Rig {
        sync: Rc<RulerSync>,
        scroll: Rc<ScrollState>,
        calibration: Rc<CalibrationStore>,
        clock: TestClock,
    }

    fn rig_with_storage(storage: Rc<dyn Storage>, initial: f32) -> Rig {
        let clock = TestClock::new();
        let scroll = Rc::new(ScrollState::new(Rc::new(clock.clone())));
        let spec = weight_spec();
        scroll.set_viewport_width(VP.width);
        scroll.set_content_width(spec.content_width(VP));
        let calibration = Rc::new(CalibrationStore::open(storage, "ruler_bias"));
        let sync = RulerSync::new(
            spec,
            scroll.clone(),
            calibration.clone(),
            Rc::new(clock.clone()),
            SyncConfig::default(),
            VP,
            initial,
        );
        sync.tick(); // absorb the initial programmatic drive
        Rig {
            sync,
            scroll,
            calibration,
            clock,
        }
    }

    fn rig(initial: f32) -> Rig {
        rig_with_storage(Rc::new(MemoryStorage::new()), initial)
    }

    /// Run the debounce out and absorb the snap-back frame.
    fn settle(r: &Rig) {
        r.clock.advance(Duration::from_millis(120));
        r.sync.tick(); // fires settle, drives the snap
        r.sync.tick(); // clears the guard
    }

    #[test]
    fn programmatic_set_drives_exact_offset_and_returns_to_idle() {
        let r = rig(60.0);
        r.sync.set_value(53.5);
        let expected = 135.0 * 24.0; // index * pps, padding and center cancel
        assert_eq!(r.scroll.get(), expected);
        assert_eq!(r.sync.phase(), SyncPhase::Programmatic);
        assert_eq!(r.sync.value(), 53.5);
        r.sync.tick();
        assert_eq!(r.sync.phase(), SyncPhase::Idle);
        // self-induced scroll must not schedule a settle
        settle(&r);
        assert_eq!(r.calibration.get("weight"), 0.0);
    }

    #[test]
    fn out_of_range_input_is_quantized_and_clamped() {
        let r = rig(60.0);
        r.sync.set_value(200.0);
        assert_eq!(r.sync.value(), 80.0);
        r.sync.set_value(53.4499);
        assert_eq!(r.sync.value(), 53.4);
    }

    #[test]
    fn user_scroll_adopts_candidate_live_then_commits_on_settle() {
        let r = rig(60.0);
        let inputs = Rc::new(RefCell::new(Vec::new()));
        let commits = Rc::new(RefCell::new(Vec::new()));
        {
            let inputs = inputs.clone();
            r.sync.set_on_input(move |v| inputs.borrow_mut().push(v));
            let commits = commits.clone();
            r.sync.set_on_commit(move |v| commits.borrow_mut().push(v));
        }

        // drag to exactly the tick for 61.2
        let idx = r.sync.spec().index_for_value(61.2);
        let target = r.sync.spec().offset_for_index(idx, VP, 0.0);
        r.scroll.set_offset(target);
        assert_eq!(r.sync.phase(), SyncPhase::UserScroll);
        assert_eq!(r.sync.value(), 61.2);
        assert_eq!(inputs.borrow().as_slice(), &[61.2]);
        assert!(commits.borrow().is_empty());

        settle(&r);
        assert_eq!(commits.borrow().as_slice(), &[61.2]);
        assert_eq!(r.sync.committed(), 61.2);
        assert_eq!(r.sync.phase(), SyncPhase::Idle);
        // zero residual: no bias change
        assert_eq!(r.calibration.get("weight"), 0.0);
        assert_eq!(r.scroll.get(), target);
    }

    #[test]
    fn one_pixel_residual_folds_into_bias_without_value_jump() {
        let r = rig(53.5);
        let idx = r.sync.spec().index_for_value(53.5);
        let exact = r.sync.spec().offset_for_index(idx, VP, 0.0);
        r.scroll.set_offset(exact + 1.0);
        settle(&r);
        assert_eq!(r.sync.committed(), 53.5);
        assert_eq!(r.calibration.get("weight"), 1.0);
        // the snap target already includes the folded bias, so the track
        // rests exactly where it stopped
        assert_eq!(r.scroll.get(), exact + 1.0);
    }

    #[test]
    fn residual_beyond_cap_is_not_folded() {
        let r = rig(53.5);
        let idx = r.sync.spec().index_for_value(53.5);
        let exact = r.sync.spec().offset_for_index(idx, VP, 0.0);
        r.scroll.set_offset(exact + 3.0); // same tick, but past the 1px cap
        settle(&r);
        assert_eq!(r.sync.committed(), 53.5);
        assert_eq!(r.calibration.get("weight"), 0.0);
        // snapped back onto the exact tick offset instead
        assert_eq!(r.scroll.get(), exact);
    }

    #[test]
    fn spurious_jump_is_rejected_and_resnapped() {
        let r = rig(53.5);
        let before = r.scroll.get();
        let far = r.sync.spec().offset_for_index(
            r.sync.spec().index_for_value(75.0),
            VP,
            0.0,
        );
        r.scroll.set_offset(far);
        assert_eq!(r.sync.phase(), SyncPhase::Snapping);
        assert_eq!(r.sync.value(), 53.5, "candidate must not be adopted");
        r.sync.tick(); // executes the parked snap
        assert_eq!(r.scroll.get(), before);
        r.sync.tick();
        assert_eq!(r.sync.phase(), SyncPhase::Idle);
        // the rejected gesture never commits
        settle(&r);
        assert_eq!(r.sync.committed(), 53.5);
    }

    #[test]
    fn forced_offset_near_range_end_commits_clamped_max() {
        let r = rig(78.0);
        // an offset "for value 200" clamps at the content edge, which is
        // exactly the last tick (80.0)
        r.scroll.set_offset(1_000_000.0);
        assert_eq!(r.sync.value(), 80.0);
        settle(&r);
        assert_eq!(r.sync.committed(), 80.0);
    }

    #[test]
    fn recenter_folds_full_residual_and_is_idempotent() {
        let r = rig(50.0);
        let idx = r.sync.spec().index_for_value(50.0);
        let exact = r.sync.spec().offset_for_index(idx, VP, 0.0);
        // 3px drift: past the auto cap, but manual correction trusts it
        r.scroll.set_offset(exact + 3.0);
        r.sync.recenter();
        assert_eq!(r.calibration.get("weight"), 3.0);
        r.sync.tick();
        assert_eq!(r.sync.phase(), SyncPhase::Idle);

        r.sync.recenter();
        assert_eq!(r.calibration.get("weight"), 3.0, "second fold is a no-op");
        assert_eq!(r.sync.committed(), 50.0);
    }

    #[test]
    fn persisted_bias_shapes_the_first_programmatic_drive() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        {
            let store = CalibrationStore::open(storage.clone(), "ruler_bias");
            store.set("weight", 4.0);
        }
        let r = rig_with_storage(storage, 53.5);
        let expected = 135.0 * 24.0 + 4.0;
        assert_eq!(r.scroll.get(), expected);
    }

    #[test]
    fn fling_feeds_the_user_scroll_path() {
        let r = rig(60.0);
        r.scroll.scroll_immediate(30.0);
        assert_eq!(r.sync.phase(), SyncPhase::UserScroll);
        for _ in 0..100 {
            r.clock.advance(Duration::from_millis(16));
            r.scroll.tick();
            r.sync.tick();
        }
        // momentum ended, debounce fired, value committed on-grid
        assert_eq!(r.sync.phase(), SyncPhase::Idle);
        let v = r.sync.committed();
        assert_eq!(v, r.sync.spec().quantize(v));
        assert!(v > 60.0);
    }
}

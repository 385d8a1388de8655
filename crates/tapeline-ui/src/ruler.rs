//! # Ruler input widget
//!
//! Assembles the full widget: a [`ScrollState`] for the track, the
//! [`RulerSync`] state machine, the persisted calibration bias, a static
//! [`TickSurface`], and three [`DragAdapter`]s (track, wrapper, pointer
//! handle) feeding the same offset.
//!
//! The host pumps [`RulerInput::tick`] once per frame and routes pointer
//! traffic through [`RulerInput::pointer`]; everything else flows through
//! the synchronizer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tapeline_core::{
    CalibrationStore, Clock, PointerEvent, RulerSpec, RulerSync, ScrollState, Signal, SyncConfig,
    Viewport,
};

use crate::drag::{DragAdapter, DragDirection};
use crate::surface::TickSurface;

/// Which element the pointer event landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragSource {
    Track,
    Wrapper,
    Handle,
}

pub struct RulerInput {
    spec: RulerSpec,
    scroll: Rc<ScrollState>,
    sync: Rc<RulerSync>,
    calibration: Rc<CalibrationStore>,
    surface: RefCell<TickSurface>,
    viewport: Cell<Viewport>,
    scale: Cell<f32>,

    track_drag: DragAdapter,
    wrapper_drag: DragAdapter,
    handle_drag: DragAdapter,
}

impl RulerInput {
    pub fn new(
        spec: RulerSpec,
        calibration: Rc<CalibrationStore>,
        clock: Rc<dyn Clock>,
        viewport: Viewport,
        scale: f32,
        initial: f32,
    ) -> Self {
        let scroll = Rc::new(ScrollState::new(clock.clone()));
        scroll.set_viewport_width(viewport.width);
        scroll.set_content_width(spec.content_width(viewport));

        let sync = RulerSync::new(
            spec.clone(),
            scroll.clone(),
            calibration.clone(),
            clock,
            SyncConfig::default(),
            viewport,
            initial,
        );
        let surface = TickSurface::build(&spec, viewport.left_padding, scale);

        Self {
            track_drag: DragAdapter::new(scroll.clone(), DragDirection::Inverted),
            wrapper_drag: DragAdapter::new(scroll.clone(), DragDirection::Inverted),
            handle_drag: DragAdapter::new(scroll.clone(), DragDirection::Direct),
            spec,
            scroll,
            sync,
            calibration,
            surface: RefCell::new(surface),
            viewport: Cell::new(viewport),
            scale: Cell::new(scale),
        }
    }

    pub fn spec(&self) -> &RulerSpec {
        &self.spec
    }

    pub fn surface(&self) -> std::cell::Ref<'_, TickSurface> {
        self.surface.borrow()
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn sync(&self) -> &RulerSync {
        &self.sync
    }

    pub fn value(&self) -> f32 {
        self.sync.value()
    }

    pub fn value_signal(&self) -> &Signal<f32> {
        self.sync.value_signal()
    }

    /// External form control pushed a new value.
    pub fn set_value(&self, v: f32) {
        self.sync.set_value(v);
    }

    pub fn set_on_input(&self, cb: impl Fn(f32) + 'static) {
        self.sync.set_on_input(cb);
    }

    pub fn set_on_commit(&self, cb: impl Fn(f32) + 'static) {
        self.sync.set_on_commit(cb);
    }

    /// Current value formatted for the bound display: two decimals plus the
    /// unit suffix ("53.50kg").
    pub fn formatted_value(&self) -> String {
        format!("{:.2}{}", self.sync.value(), self.spec.unit)
    }

    /// Route a pointer event to the drag adapter for its source element.
    pub fn pointer(&self, source: DragSource, ev: &PointerEvent) {
        match source {
            DragSource::Track => self.track_drag.handle(ev),
            DragSource::Wrapper => self.wrapper_drag.handle(ev),
            DragSource::Handle => self.handle_drag.handle(ev),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.track_drag.is_dragging()
            || self.wrapper_drag.is_dragging()
            || self.handle_drag.is_dragging()
    }

    /// Frame pump: fling physics, then the synchronizer's guard/settle work.
    pub fn tick(&self) {
        self.scroll.tick();
        self.sync.tick();
    }

    /// Manual realignment (double-activating the value label).
    pub fn recenter(&self) {
        self.sync.recenter();
    }

    /// Layout changed: new viewport metrics and/or device pixel ratio. The
    /// tick surface is rebuilt only when its inputs actually changed.
    pub fn set_viewport(&self, viewport: Viewport, scale: f32) {
        let rebuild = viewport.left_padding != self.viewport.get().left_padding
            || scale != self.scale.get();
        self.viewport.set(viewport);
        self.scale.set(scale);
        self.scroll.set_viewport_width(viewport.width);
        self.scroll.set_content_width(self.spec.content_width(viewport));
        self.sync.set_viewport(viewport);
        if rebuild {
            log::debug!("ruler {}: re-recording tick surface", self.spec.kind);
            *self.surface.borrow_mut() =
                TickSurface::build(&self.spec, viewport.left_padding, scale);
        }
    }

    /// Index of the major tick nearest the viewport center, for label
    /// emphasis.
    pub fn nearest_major_index(&self) -> usize {
        let vp = self.viewport.get();
        let bias = self.calibration.get(&self.spec.kind);
        let idx = self.spec.index_for_offset(self.scroll.get(), vp, bias);
        let every = self.spec.major_every();
        let major = (idx + every / 2) / every * every;
        major.min(self.spec.total_steps())
    }
}

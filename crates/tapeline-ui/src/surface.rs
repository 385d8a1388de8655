//! # Tick surface
//!
//! Static rendering of the ruler track: one tick per step index, taller
//! labeled ticks on whole units. The surface is recorded once per spec as a
//! draw-command list (replayed by whatever paints the widget) and is only
//! rebuilt on resize or scale change — scrolling never re-records it.

use tapeline_core::RulerSpec;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    pub const MINOR_TICK: Color = Color(0x94, 0xa3, 0xb8, 0xff);
    pub const MAJOR_TICK: Color = Color(0x47, 0x55, 0x69, 0xff);
    pub const LABEL: Color = Color(0x47, 0x55, 0x69, 0xff);
}

#[derive(Clone, Debug)]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        color: Color,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        color: Color,
        size: f32,
    },
}

const TRACK_HEIGHT: f32 = 48.0;
const MINOR_TICK_HEIGHT: f32 = 8.0;
const MAJOR_TICK_HEIGHT: f32 = 14.0;
const TICK_WIDTH: f32 = 1.5;
const LABEL_SIZE: f32 = 10.0;

/// Major ticks label the whole value; `f32`'s shortest-round-trip display
/// already drops a trailing ".0" ("54" not "54.0", "53.5" stays).
fn tick_label(v: f32) -> String {
    format!("{v}")
}

pub struct TickSurface {
    commands: Vec<DrawCommand>,
    /// Logical width: padding on both ends plus one stride per step.
    width: f32,
    height: f32,
    /// Device pixel ratio; the drawable allocation is `width * scale` by
    /// `height * scale` so ticks stay crisp on dense displays.
    scale: f32,
}

impl TickSurface {
    pub fn build(spec: &RulerSpec, left_padding: f32, scale: f32) -> Self {
        let total = spec.total_steps();
        let major_every = spec.major_every();
        let mut commands = Vec::with_capacity(total + 1 + total / major_every + 1);

        for i in 0..=total {
            let x = left_padding + i as f32 * spec.pixels_per_step;
            let major = i % major_every == 0;
            let h = if major {
                MAJOR_TICK_HEIGHT
            } else {
                MINOR_TICK_HEIGHT
            };
            commands.push(DrawCommand::Rect {
                rect: Rect {
                    x: x - TICK_WIDTH * 0.5,
                    y: 0.0,
                    w: TICK_WIDTH,
                    h,
                },
                color: if major {
                    Color::MAJOR_TICK
                } else {
                    Color::MINOR_TICK
                },
            });
            if major {
                commands.push(DrawCommand::Text {
                    text: tick_label(spec.value_for_index(i)),
                    x,
                    y: MAJOR_TICK_HEIGHT + 4.0,
                    color: Color::LABEL,
                    size: LABEL_SIZE,
                });
            }
        }

        Self {
            commands,
            width: left_padding * 2.0 + spec.pixels_per_step * total as f32,
            height: TRACK_HEIGHT,
            scale: scale.max(1.0),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Physical allocation, in device pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width * self.scale).ceil() as u32,
            (self.height * self.scale).ceil() as u32,
        )
    }
}

//! Pure geometry for the tick ruler: value <-> step index <-> scroll offset.
//!
//! The round-trip law `index_for_offset(offset_for_index(i, b), b) == i` for
//! every valid index and any bias is the correctness anchor for the whole
//! widget; see the tests at the bottom.

use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Metrics the host re-reads from layout: visible width and the padding
/// before the first tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub left_padding: f32,
}

impl Viewport {
    pub fn center(&self) -> f32 {
        self.width * 0.5
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SpecError {
    #[error("step must be positive, got {0}")]
    StepNotPositive(f32),
    #[error("pixels_per_step must be positive, got {0}")]
    PixelsPerStepNotPositive(f32),
    #[error("max_value {max} must exceed min_value {min}")]
    EmptyRange { min: f32, max: f32 },
    #[error("step {step} does not evenly divide range {min}..{max}")]
    StepDoesNotDivideRange { min: f32, max: f32, step: f32 },
}

/// Immutable definition of one ruler: value domain, quantization grid, and
/// pixel density. `kind` keys the persisted calibration bias.
#[derive(Clone, Debug, PartialEq)]
pub struct RulerSpec {
    pub kind: String,
    pub min_value: f32,
    pub max_value: f32,
    pub step: f32,
    pub pixels_per_step: f32,
    pub unit: String,
}

impl RulerSpec {
    pub fn new(
        kind: impl Into<String>,
        min_value: f32,
        max_value: f32,
        step: f32,
        pixels_per_step: f32,
        unit: impl Into<String>,
    ) -> Result<Self, SpecError> {
        if step <= 0.0 {
            return Err(SpecError::StepNotPositive(step));
        }
        if pixels_per_step <= 0.0 {
            return Err(SpecError::PixelsPerStepNotPositive(pixels_per_step));
        }
        if max_value <= min_value {
            return Err(SpecError::EmptyRange {
                min: min_value,
                max: max_value,
            });
        }
        let steps = (max_value - min_value) / step;
        if (steps - steps.round()).abs() > 1e-3 {
            return Err(SpecError::StepDoesNotDivideRange {
                min: min_value,
                max: max_value,
                step,
            });
        }
        Ok(Self {
            kind: kind.into(),
            min_value,
            max_value,
            step,
            pixels_per_step,
            unit: unit.into(),
        })
    }

    /// Number of step intervals; valid indices are `0..=total_steps()`.
    pub fn total_steps(&self) -> usize {
        ((self.max_value - self.min_value) / self.step).round() as usize
    }

    /// Index stride between major (labeled) ticks: one per whole unit.
    pub fn major_every(&self) -> usize {
        (1.0 / self.step).round().max(1.0) as usize
    }

    fn decimals(&self) -> i32 {
        for d in 0..=6 {
            let scaled = self.step * 10f32.powi(d);
            if (scaled - scaled.round()).abs() < 1e-4 {
                return d;
            }
        }
        6
    }

    /// Round to the step's decimal precision, so repeated conversions cannot
    /// accumulate float drift.
    pub fn round_to_precision(&self, v: f32) -> f32 {
        let q = 10f32.powi(self.decimals());
        (v * q).round() / q
    }

    pub fn index_for_value(&self, v: f32) -> usize {
        let raw = ((v - self.min_value) / self.step).round();
        raw.clamp(0.0, self.total_steps() as f32) as usize
    }

    pub fn value_for_index(&self, i: usize) -> f32 {
        self.round_to_precision(self.min_value + i as f32 * self.step)
    }

    /// Snap to the grid and clamp into `[min_value, max_value]`.
    pub fn quantize(&self, v: f32) -> f32 {
        self.value_for_index(self.index_for_value(self.round_to_precision(v)))
    }

    pub fn offset_for_index(&self, i: usize, vp: Viewport, bias: f32) -> f32 {
        i as f32 * self.pixels_per_step + vp.left_padding - vp.center() + bias
    }

    pub fn index_for_offset(&self, offset: f32, vp: Viewport, bias: f32) -> usize {
        let raw = ((offset + vp.center() - vp.left_padding - bias) / self.pixels_per_step).round();
        raw.clamp(0.0, self.total_steps() as f32) as usize
    }

    /// Full drawable width: padding on both ends plus one stride per step.
    pub fn content_width(&self, vp: Viewport) -> f32 {
        vp.left_padding * 2.0 + self.pixels_per_step * self.total_steps() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight_spec() -> RulerSpec {
        RulerSpec::new("weight", 40.0, 80.0, 0.1, 24.0, "kg").unwrap()
    }

    fn vp() -> Viewport {
        Viewport {
            width: 360.0,
            left_padding: 180.0,
        }
    }

    #[test]
    fn rejects_bad_specs() {
        assert!(matches!(
            RulerSpec::new("w", 0.0, 10.0, -1.0, 24.0, ""),
            Err(SpecError::StepNotPositive(_))
        ));
        assert!(matches!(
            RulerSpec::new("w", 10.0, 10.0, 0.1, 24.0, ""),
            Err(SpecError::EmptyRange { .. })
        ));
        assert!(matches!(
            RulerSpec::new("w", 0.0, 10.05, 0.1, 24.0, ""),
            Err(SpecError::StepDoesNotDivideRange { .. })
        ));
    }

    #[test]
    fn round_trip_law_holds_for_every_index_and_bias() {
        let spec = weight_spec();
        for bias in [-7.3f32, -1.0, 0.0, 0.4, 2.0, 13.9] {
            for i in 0..=spec.total_steps() {
                let off = spec.offset_for_index(i, vp(), bias);
                assert_eq!(spec.index_for_offset(off, vp(), bias), i, "bias {bias}");
            }
        }
    }

    #[test]
    fn value_53_5_maps_to_index_135_and_back() {
        let spec = weight_spec();
        let i = spec.index_for_value(53.5);
        assert_eq!(i, 135);
        assert_eq!(spec.value_for_index(i), 53.5);
        let expected = 135.0 * 24.0 + 180.0 - 180.0 + 2.5;
        assert_eq!(spec.offset_for_index(i, vp(), 2.5), expected);
    }

    #[test]
    fn quantize_snaps_and_clamps() {
        let spec = weight_spec();
        assert_eq!(spec.quantize(53.4400001), 53.4);
        assert_eq!(spec.quantize(53.46), 53.5);
        assert_eq!(spec.quantize(200.0), 80.0);
        assert_eq!(spec.quantize(-3.0), 40.0);
    }

    #[test]
    fn index_for_offset_clamps_out_of_range_offsets() {
        let spec = weight_spec();
        assert_eq!(spec.index_for_offset(-10_000.0, vp(), 0.0), 0);
        assert_eq!(
            spec.index_for_offset(1_000_000.0, vp(), 0.0),
            spec.total_steps()
        );
    }

    #[test]
    fn major_tick_stride_is_one_whole_unit() {
        assert_eq!(weight_spec().major_every(), 10);
        let coarse = RulerSpec::new("reps", 0.0, 50.0, 1.0, 16.0, "").unwrap();
        assert_eq!(coarse.major_every(), 1);
    }
}

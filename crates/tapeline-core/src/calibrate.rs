//! Persisted pixel-bias map, one entry per ruler kind.
//!
//! The bias compensates for sub-pixel layout drift (fonts, zoom, DPI)
//! between a ruler's theoretical scroll offset and where the surface
//! actually rests. It outlives any widget instance: every re-init of the
//! same kind starts from the stored value. Mutations flush immediately;
//! losing a few bytes of calibration is low-severity, but it should not
//! silently revert either.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::storage::Storage;

pub struct CalibrationStore {
    storage: Rc<dyn Storage>,
    key: String,
    biases: RefCell<HashMap<String, f32>>,
}

impl CalibrationStore {
    /// Load the bias map from `storage[key]`. Malformed or absent JSON
    /// degrades to an empty map, never an error.
    pub fn open(storage: Rc<dyn Storage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let biases = match storage.read(&key) {
            Some(raw) => match serde_json::from_str::<HashMap<String, f32>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!("calibration blob {key:?} unreadable, resetting: {e}");
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };
        Self {
            storage,
            key,
            biases: RefCell::new(biases),
        }
    }

    /// Bias in pixels for `kind`; unknown kinds are 0.
    pub fn get(&self, kind: &str) -> f32 {
        self.biases.borrow().get(kind).copied().unwrap_or(0.0)
    }

    pub fn set(&self, kind: &str, bias_px: f32) {
        self.biases.borrow_mut().insert(kind.into(), bias_px);
        self.flush();
    }

    fn flush(&self) {
        let raw = match serde_json::to_string(&*self.biases.borrow()) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("calibration serialize failed: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.write(&self.key, &raw) {
            log::warn!("calibration flush failed: {e}");
        }
    }
}

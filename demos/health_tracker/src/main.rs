//! Scripted health-tracker session: three rulers bound to weight, body-fat,
//! and muscle-mass, records persisted next to the calibration blob, plus a
//! chart-series dump and a JSON export/import round trip.
//!
//! Run with `RUST_LOG=debug` to watch the synchronizer fold residuals.

mod chart;
mod records;

use std::rc::Rc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tapeline_core::{
    CalibrationStore, FileStorage, PointerButton, PointerEvent, PointerEventKind, RulerSpec,
    Storage, SystemClock, Viewport,
};
use tapeline_ui::{DragSource, RulerInput};

use chart::{Period, series};
use records::{HealthRecord, RecordStore};

const DATA_DIR: &str = "tapeline-data";

const VIEWPORT: Viewport = Viewport {
    width: 360.0,
    left_padding: 180.0,
};

fn ruler(
    calibration: &Rc<CalibrationStore>,
    kind: &str,
    min: f32,
    max: f32,
    unit: &str,
    initial: f32,
) -> Result<RulerInput> {
    let spec = RulerSpec::new(kind, min, max, 0.1, 24.0, unit)?;
    Ok(RulerInput::new(
        spec,
        calibration.clone(),
        Rc::new(SystemClock),
        VIEWPORT,
        2.0,
        initial,
    ))
}

/// Pump a few frames of the cooperative loop (fling + guard + settle).
fn pump(rulers: &[&RulerInput], frames: usize) {
    for _ in 0..frames {
        for r in rulers {
            r.tick();
        }
        thread::sleep(Duration::from_millis(16));
    }
}

/// Drag the track in small steps, like a finger flick. Positive `finger_dx`
/// moves the finger right, which scrolls the content back (value decreases).
fn drag_track(r: &RulerInput, finger_dx: f32) {
    let down = PointerEvent::mouse(PointerEventKind::Down(PointerButton::Primary), 200.0, 24.0);
    r.pointer(DragSource::Track, &down);
    let steps = 6;
    for i in 1..=steps {
        let x = 200.0 + finger_dx * i as f32 / steps as f32;
        r.pointer(
            DragSource::Track,
            &PointerEvent::mouse(PointerEventKind::Move, x, 24.0),
        );
        pump(&[r], 1);
    }
    r.pointer(
        DragSource::Track,
        &PointerEvent::mouse(PointerEventKind::Up(PointerButton::Primary), 200.0 + finger_dx, 24.0),
    );
}

fn main() -> Result<()> {
    env_logger::init();

    let storage: Rc<dyn Storage> = Rc::new(FileStorage::open(DATA_DIR)?);
    let calibration = Rc::new(CalibrationStore::open(storage.clone(), "ruler_bias"));
    let store = RecordStore::open(storage);

    let weight = ruler(&calibration, "weight", 30.0, 80.0, "kg", 60.0)?;
    let fat = ruler(&calibration, "fat", 10.0, 40.0, "%", 25.0)?;
    let muscle = ruler(&calibration, "muscle", 10.0, 50.0, "kg", 30.0)?;
    let rulers = [&weight, &fat, &muscle];
    pump(&rulers, 1);

    weight.set_on_commit(|v| log::info!("weight committed at {v:.2}"));

    // Nudge the weight ruler two steps down, let it settle and commit.
    drag_track(&weight, 48.0);
    pump(&rulers, 10);
    println!(
        "weight {}  fat {}  muscle {}",
        weight.formatted_value(),
        fat.formatted_value(),
        muscle.formatted_value()
    );

    // Realign after the simulated layout drift, then persist today's entry.
    weight.recenter();
    pump(&rulers, 1);

    let today = chrono::Local::now().date_naive();
    let record = HealthRecord {
        date: today,
        weight: weight.value(),
        fat: fat.value(),
        muscle: muscle.value(),
    };
    match store.add(record) {
        Ok(()) => println!("saved entry for {today}"),
        Err(e) => println!("{e}"),
    }

    println!("\n-- records --");
    for r in store.list() {
        println!(
            "{} | weight {:.1}kg | fat {:.1}% | muscle {:.1}kg",
            r.date, r.weight, r.fat, r.muscle
        );
    }

    let weekly = series(&store.list(), Period::Week, today);
    println!("\n-- last 7 days --");
    for (i, label) in weekly.labels.iter().enumerate() {
        println!(
            "{label}: {:.1}kg / {:.1}% / {:.1}kg",
            weekly.weight[i], weekly.fat[i], weekly.muscle[i]
        );
    }

    // Export, then verify a re-import adds nothing new.
    let export_path = format!("{DATA_DIR}/export.json");
    std::fs::write(&export_path, store.export_json())?;
    let added = store.import_json(&std::fs::read_to_string(&export_path)?)?;
    println!("\nexported to {export_path} (re-import added {added} records)");

    Ok(())
}

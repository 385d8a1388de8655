//! Daily measurement records: CRUD over the storage adapter, one entry per
//! date, plus JSON import/export.
//!
//! A malformed stored blob silently degrades to an empty list; a malformed
//! IMPORT is the one parse failure that surfaces to the user.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tapeline_core::Storage;
use thiserror::Error;

pub const RECORDS_KEY: &str = "healthData";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub date: NaiveDate,
    pub weight: f32,
    pub fat: f32,
    pub muscle: f32,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("a record for {0} already exists; select it from the list to edit")]
    DuplicateDate(NaiveDate),
    #[error("no record for {0}")]
    NotFound(NaiveDate),
    #[error(transparent)]
    Storage(#[from] tapeline_core::StorageError),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] tapeline_core::StorageError),
}

pub struct RecordStore {
    storage: Rc<dyn Storage>,
    records: RefCell<Vec<HealthRecord>>,
}

impl RecordStore {
    pub fn open(storage: Rc<dyn Storage>) -> Self {
        let records = match storage.read(RECORDS_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<HealthRecord>>(&raw) {
                Ok(list) => list,
                Err(e) => {
                    log::warn!("stored records unreadable, starting empty: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Self {
            storage,
            records: RefCell::new(records),
        }
    }

    /// All records, newest first.
    pub fn list(&self) -> Vec<HealthRecord> {
        let mut out = self.records.borrow().clone();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        out
    }

    pub fn find(&self, date: NaiveDate) -> Option<HealthRecord> {
        self.records.borrow().iter().find(|r| r.date == date).cloned()
    }

    pub fn add(&self, record: HealthRecord) -> Result<(), RecordError> {
        if self.find(record.date).is_some() {
            return Err(RecordError::DuplicateDate(record.date));
        }
        self.records.borrow_mut().push(record);
        self.flush()?;
        Ok(())
    }

    /// Replace the record originally saved for `date` (the date itself may
    /// be edited).
    pub fn update(&self, date: NaiveDate, record: HealthRecord) -> Result<(), RecordError> {
        let mut records = self.records.borrow_mut();
        let idx = records
            .iter()
            .position(|r| r.date == date)
            .ok_or(RecordError::NotFound(date))?;
        records[idx] = record;
        drop(records);
        self.flush()?;
        Ok(())
    }

    pub fn delete(&self, date: NaiveDate) -> Result<(), RecordError> {
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|r| r.date != date);
        if records.len() == before {
            return Err(RecordError::NotFound(date));
        }
        drop(records);
        self.flush()?;
        Ok(())
    }

    /// Pretty JSON of the full data set.
    pub fn export_json(&self) -> String {
        serde_json::to_string_pretty(&*self.records.borrow()).unwrap_or_else(|_| "[]".into())
    }

    /// Merge an exported data set; records for dates already present are
    /// skipped. Returns how many were added.
    pub fn import_json(&self, raw: &str) -> Result<usize, ImportError> {
        let imported: Vec<HealthRecord> = serde_json::from_str(raw)?;
        let mut added = 0;
        {
            let mut records = self.records.borrow_mut();
            for rec in imported {
                if !records.iter().any(|r| r.date == rec.date) {
                    records.push(rec);
                    added += 1;
                }
            }
        }
        self.flush()?;
        Ok(added)
    }

    fn flush(&self) -> Result<(), tapeline_core::StorageError> {
        let raw = serde_json::to_string(&*self.records.borrow())
            .unwrap_or_else(|_| "[]".into());
        self.storage.write(RECORDS_KEY, &raw)
    }
}

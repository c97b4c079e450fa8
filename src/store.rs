//! append‑only session collection of emotion records

use std::collections::HashMap;

use bevy::log::info;
use bevy::prelude::Resource;

use crate::error::RecordError;
use crate::record::EmotionRecord;

/// Every record the session knows about, own and hydrated.
///
/// Records are never edited: the store only grows, or is emptied as a
/// whole. `generation` changes on every clear so downstream owners of
/// derived state (render handles) know to drop everything.
#[derive(Resource, Debug, Default)]
pub struct EmotionRecordStore {
    records: Vec<EmotionRecord>,
    by_id: HashMap<String, usize>,
    generation: u64,
}

/// What `append` did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appended {
    New,
    AlreadyPresent,
}

impl EmotionRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record. Re‑adding an identical record is a no‑op; an id that
    /// reappears with different contents is rejected and the store is left
    /// untouched.
    pub fn append(&mut self, record: EmotionRecord) -> Result<Appended, RecordError> {
        if self.check(&record)? == Appended::AlreadyPresent {
            return Ok(Appended::AlreadyPresent);
        }
        self.by_id.insert(record.id().to_string(), self.records.len());
        self.records.push(record);
        Ok(Appended::New)
    }

    /// What `append` would do with `record`, without touching the store.
    pub fn check(&self, record: &EmotionRecord) -> Result<Appended, RecordError> {
        match self.by_id.get(record.id()) {
            None => Ok(Appended::New),
            Some(&idx) if self.records[idx] == *record => Ok(Appended::AlreadyPresent),
            Some(_) => Err(RecordError::ConflictingId(record.id().to_string())),
        }
    }

    /// All‑or‑nothing batch append. Returns how many records were new.
    pub fn extend<I>(&mut self, batch: I) -> Result<usize, RecordError>
    where
        I: IntoIterator<Item = EmotionRecord>,
    {
        let batch: Vec<EmotionRecord> = batch.into_iter().collect();

        /* validate against the store and within the batch first --------- */
        let mut seen: HashMap<&str, &EmotionRecord> = HashMap::with_capacity(batch.len());
        for rec in &batch {
            if let Some(&idx) = self.by_id.get(rec.id()) {
                if self.records[idx] != *rec {
                    return Err(RecordError::ConflictingId(rec.id().to_string()));
                }
            }
            if let Some(prev) = seen.insert(rec.id(), rec) {
                if prev != rec {
                    return Err(RecordError::ConflictingId(rec.id().to_string()));
                }
            }
        }

        let mut added = 0;
        for rec in batch {
            if self.append(rec)? == Appended::New {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Drop every record (sign‑out).
    pub fn clear(&mut self) {
        let dropped = self.records.len();
        self.records.clear();
        self.by_id.clear();
        self.generation = self.generation.wrapping_add(1);
        info!("record store cleared ({dropped} records dropped)");
    }

    pub fn records(&self) -> &[EmotionRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&EmotionRecord> {
        self.by_id.get(id).map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Deepest record, used to bound "jump to oldest".
    pub fn max_depth(&self) -> Option<f64> {
        self.records.iter().map(EmotionRecord::depth).reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;
    use chrono::{TimeZone, Utc};

    fn rec(id: &str, strength: f64, depth: f64) -> EmotionRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        EmotionRecord::new(id, Category::Joy, strength, depth, at).unwrap()
    }

    #[test]
    fn append_is_idempotent_for_identical_records() {
        let mut store = EmotionRecordStore::new();
        assert_eq!(store.append(rec("a", 0.5, 10.0)), Ok(Appended::New));
        assert_eq!(store.append(rec("a", 0.5, 10.0)), Ok(Appended::AlreadyPresent));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn check_reports_without_appending() {
        let mut store = EmotionRecordStore::new();
        assert_eq!(store.check(&rec("a", 0.5, 10.0)), Ok(Appended::New));
        assert!(store.is_empty());

        store.append(rec("a", 0.5, 10.0)).unwrap();
        assert_eq!(store.check(&rec("a", 0.5, 10.0)), Ok(Appended::AlreadyPresent));
        assert_eq!(
            store.check(&rec("a", 0.9, 10.0)),
            Err(RecordError::ConflictingId("a".into()))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn conflicting_ids_are_rejected_without_mutation() {
        let mut store = EmotionRecordStore::new();
        store.append(rec("a", 0.5, 10.0)).unwrap();
        assert_eq!(
            store.append(rec("a", 0.6, 10.0)),
            Err(RecordError::ConflictingId("a".into()))
        );
        assert_eq!(store.get("a").unwrap().strength(), 0.5);
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let mut store = EmotionRecordStore::new();
        store.append(rec("a", 0.5, 10.0)).unwrap();

        let bad = vec![rec("b", 0.1, 1.0), rec("a", 0.9, 10.0)];
        assert!(store.extend(bad).is_err());
        assert_eq!(store.len(), 1);
        assert!(store.get("b").is_none());

        let dup_in_batch = vec![rec("c", 0.1, 1.0), rec("c", 0.2, 1.0)];
        assert!(store.extend(dup_in_batch).is_err());
        assert_eq!(store.len(), 1);

        let good = vec![rec("a", 0.5, 10.0), rec("b", 0.1, 1.0), rec("c", 0.2, 30.0)];
        assert_eq!(store.extend(good), Ok(2));
        assert_eq!(store.len(), 3);
        assert_eq!(store.max_depth(), Some(30.0));
    }

    #[test]
    fn clear_bumps_generation() {
        let mut store = EmotionRecordStore::new();
        store.append(rec("a", 0.5, 10.0)).unwrap();
        let g = store.generation();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.max_depth(), None);
        assert_ne!(store.generation(), g);
        assert!(store.append(rec("a", 0.9, 3.0)).is_ok());
    }
}

//! contracts with the outside world: the text classifier and persistence
//!
//! Both complete out‑of‑band. The engine only ever sees their results
//! appended to the record store; on failure the store keeps whatever it
//! already had and the error goes back to the caller.

use chrono::{DateTime, Utc};
use bevy::log::{info, warn};
use serde::Deserialize;

use crate::constants::MAX_ANNOTATION_CHARS;
use crate::error::{ClassifyError, RecordError, SourceError};
use crate::record::{Category, EmotionRecord, Owner, PartialRecord};
use crate::seed::seed_from_id;
use crate::store::EmotionRecordStore;

/* ===========================================================
   classification
   =========================================================== */
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: Category,
    pub strength: f64,
    pub analysis: String,
}

#[derive(Deserialize)]
struct RawClassification {
    category: String,
    strength: f64,
    #[serde(default, alias = "annotation")]
    analysis: String,
}

impl Classification {
    /// Parse the classifier's reply. The JSON object may be wrapped in
    /// prose or a fenced code block; anything around the outermost braces is
    /// ignored.
    pub fn from_json(reply: &str) -> Result<Self, ClassifyError> {
        let body = match (reply.find('{'), reply.rfind('}')) {
            (Some(start), Some(end)) if start < end => &reply[start..=end],
            _ => reply,
        };
        let raw: RawClassification = serde_json::from_str(body)?;

        let category = raw
            .category
            .parse::<Category>()
            .map_err(|_| ClassifyError::InvalidCategory(raw.category.clone()))?;
        if !(0.0..=1.0).contains(&raw.strength) {
            return Err(ClassifyError::StrengthOutOfRange(raw.strength));
        }
        let analysis: String = raw.analysis.trim().chars().take(MAX_ANNOTATION_CHARS).collect();

        Ok(Self { category, strength: raw.strength, analysis })
    }
}

/// Text → category/strength service (an LLM behind a network call).
pub trait ClassificationService {
    fn classify(&self, text: &str) -> Result<Classification, ClassifyError>;
}

/// Classify a message and place it at the viewer's current depth.
pub fn submit_message(
    text: &str,
    classifier: &dyn ClassificationService,
    depth: f64,
    now: DateTime<Utc>,
    owner_id: &str,
) -> Result<EmotionRecord, ClassifyError> {
    let c = classifier.classify(text)?;
    let id = format!(
        "{owner_id}-{}-{:08x}",
        now.timestamp_millis(),
        seed_from_id(text)
    );
    let record = EmotionRecord::new(id, c.category, c.strength, depth, now)?
        .with_owner(Owner::User(owner_id.to_string()))
        .with_analysis(c.analysis)?;
    Ok(record)
}

/* ===========================================================
   persistence
   =========================================================== */
pub trait RecordSource {
    /// Every record owned by the signed‑in user.
    fn list_own(&self) -> Result<Vec<EmotionRecord>, SourceError>;
    /// Other users' records in `depth_min..=depth_max`, stripped of text.
    fn list_others(&self, depth_min: f64, depth_max: f64) -> Result<Vec<PartialRecord>, SourceError>;
    fn append(&mut self, record: &EmotionRecord) -> Result<(), SourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HydrationReport {
    pub own: usize,
    pub others: usize,
    pub added: usize,
}

/// Load own and (optionally) other users' records into the store.
///
/// Nothing is written unless every fetch and every conversion succeeded;
/// a failing source leaves the store exactly as it was.
pub fn hydrate(
    store: &mut EmotionRecordStore,
    source: &dyn RecordSource,
    others_range: Option<(f64, f64)>,
) -> Result<HydrationReport, SourceError> {
    let result = fetch_all(source, others_range).and_then(|(own, others)| {
        let report = HydrationReport { own: own.len(), others: others.len(), added: 0 };
        let added = store.extend(own.into_iter().chain(others))?;
        Ok(HydrationReport { added, ..report })
    });

    match &result {
        Ok(r) => info!(
            "hydrated {} own + {} shared records ({} new), store now holds {}",
            r.own,
            r.others,
            r.added,
            store.len()
        ),
        Err(e) => warn!("hydration failed, keeping {} cached records: {e}", store.len()),
    }
    result
}

fn fetch_all(
    source: &dyn RecordSource,
    others_range: Option<(f64, f64)>,
) -> Result<(Vec<EmotionRecord>, Vec<EmotionRecord>), SourceError> {
    let own = source.list_own()?;
    let others = match others_range {
        Some((lo, hi)) => source
            .list_others(lo, hi)?
            .into_iter()
            .map(PartialRecord::into_record)
            .collect::<Result<Vec<_>, RecordError>>()?,
        None => Vec::new(),
    };
    Ok((own, others))
}

/// Persist a freshly submitted record and add it to the store.
///
/// A record the store would reject (conflicting id) is never sent to the
/// source. Otherwise it is stored locally even if persistence fails, so the
/// viewer sees their message either way; the persistence error is returned.
pub fn commit(
    record: EmotionRecord,
    store: &mut EmotionRecordStore,
    source: &mut dyn RecordSource,
) -> Result<(), SourceError> {
    store.check(&record)?;
    let persisted = source.append(&record);
    store.append(record)?;
    if let Err(e) = &persisted {
        warn!("record kept locally but not persisted: {e}");
    }
    persisted
}

/* ===========================================================
   in‑memory source
   =========================================================== */
/// `RecordSource` over plain vectors, for tests and the demo.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordSource {
    pub own: Vec<EmotionRecord>,
    pub others: Vec<PartialRecord>,
    failure: Option<String>,
}

impl InMemoryRecordSource {
    pub fn new(own: Vec<EmotionRecord>, others: Vec<PartialRecord>) -> Self {
        Self { own, others, failure: None }
    }

    /// A source whose every call fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { failure: Some(reason.into()), ..Self::default() }
    }

    fn check(&self) -> Result<(), SourceError> {
        match &self.failure {
            Some(reason) => Err(SourceError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl RecordSource for InMemoryRecordSource {
    fn list_own(&self) -> Result<Vec<EmotionRecord>, SourceError> {
        self.check()?;
        Ok(self.own.clone())
    }

    fn list_others(&self, depth_min: f64, depth_max: f64) -> Result<Vec<PartialRecord>, SourceError> {
        self.check()?;
        Ok(self
            .others
            .iter()
            .filter(|p| (depth_min..=depth_max).contains(&p.depth))
            .cloned()
            .collect())
    }

    fn append(&mut self, record: &EmotionRecord) -> Result<(), SourceError> {
        self.check()?;
        self.own.push(record.clone());
        Ok(())
    }
}

//! emotion records – the only input the ecosystem grows from

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    FIELD_HALF_WIDTH, GROUND_PLANE, JITTER_SALT, LATERAL_SALT, MAX_ANNOTATION_CHARS,
    OTHER_JITTER,
};
use crate::error::RecordError;
use crate::seed::{hash_signed, seed_from_id};

/* ===========================================================
   categories
   =========================================================== */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Joy,
    Peace,
    Stress,
    Sadness,
    Inspiration,
    Nostalgia,
    Confusion,
}

/// Colour/lighting grouping the environment fields key off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryGroup {
    Warm,
    Calm,
    Alarm,
    Sepia,
    Murk,
}

impl Category {
    pub const COUNT: usize = 7;
    pub const ALL: [Category; Category::COUNT] = [
        Category::Joy,
        Category::Peace,
        Category::Stress,
        Category::Sadness,
        Category::Inspiration,
        Category::Nostalgia,
        Category::Confusion,
    ];

    /// Dense index into per-category arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Joy         => "joy",
            Category::Peace       => "peace",
            Category::Stress      => "stress",
            Category::Sadness     => "sadness",
            Category::Inspiration => "inspiration",
            Category::Nostalgia   => "nostalgia",
            Category::Confusion   => "confusion",
        }
    }

    pub fn group(self) -> CategoryGroup {
        match self {
            Category::Joy | Category::Inspiration => CategoryGroup::Warm,
            Category::Peace | Category::Sadness   => CategoryGroup::Calm,
            Category::Stress                      => CategoryGroup::Alarm,
            Category::Nostalgia                   => CategoryGroup::Sepia,
            Category::Confusion                   => CategoryGroup::Murk,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| RecordError::UnknownCategory(s.to_string()))
    }
}

/* ===========================================================
   ownership
   =========================================================== */
/// Whose message produced the record. Records of other users never carry
/// annotation text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    User(String),
    Other,
}

impl Owner {
    pub fn is_other(&self) -> bool {
        matches!(self, Owner::Other)
    }
}

/* ===========================================================
   record
   =========================================================== */
/// One classified message. Immutable once built; all validation happens in
/// the constructors so the pipeline downstream can trust every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordRow", into = "RecordRow")]
pub struct EmotionRecord {
    id: String,
    category: Category,
    strength: f64,
    depth: f64,
    analysis: Option<String>,
    created_at: DateTime<Utc>,
    owner: Owner,
}

impl EmotionRecord {
    pub fn new(
        id: impl Into<String>,
        category: Category,
        strength: f64,
        depth: f64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RecordError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RecordError::EmptyId);
        }
        validate_strength(strength)?;
        if !depth.is_finite() {
            return Err(RecordError::NonFiniteDepth);
        }
        Ok(Self {
            id,
            category,
            strength,
            depth,
            analysis: None,
            created_at,
            owner: Owner::Other,
        })
    }

    /// Attach the short human-readable annotation.
    pub fn with_analysis(mut self, analysis: impl Into<String>) -> Result<Self, RecordError> {
        let analysis = analysis.into();
        let len = analysis.chars().count();
        if len > MAX_ANNOTATION_CHARS {
            return Err(RecordError::AnnotationTooLong { len, max: MAX_ANNOTATION_CHARS });
        }
        self.analysis = (!analysis.is_empty()).then_some(analysis);
        Ok(self)
    }

    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = owner;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn category(&self) -> Category {
        self.category
    }
    pub fn strength(&self) -> f64 {
        self.strength
    }
    pub fn depth(&self) -> f64 {
        self.depth
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Annotation text; never exposed for other users' records.
    pub fn annotation(&self) -> Option<&str> {
        match self.owner {
            Owner::User(_) => self.analysis.as_deref(),
            Owner::Other => None,
        }
    }

    pub fn seed(&self) -> i64 {
        seed_from_id(&self.id)
    }

    /// Phase seed for external animation (sway, flutter); millis since epoch.
    pub fn phase_seed(&self) -> i64 {
        self.created_at.timestamp_millis()
    }

    /// Lateral position the record's entities cluster around.
    ///
    /// Other users' records get an extra deterministic jitter so two
    /// sessions looking at the same shared data do not stack exactly.
    pub fn anchor_x(&self) -> f64 {
        let seed = self.seed();
        let mut x = hash_signed(seed + LATERAL_SALT) * FIELD_HALF_WIDTH;
        if self.owner.is_other() {
            x += hash_signed(seed + JITTER_SALT) * OTHER_JITTER;
        }
        x
    }

    /// At or below the ground plane.
    pub fn is_buried(&self) -> bool {
        self.depth >= GROUND_PLANE
    }
}

fn validate_strength(strength: f64) -> Result<(), RecordError> {
    // NaN fails `contains`
    if (0.0..=1.0).contains(&strength) {
        Ok(())
    } else {
        Err(RecordError::StrengthOutOfRange(strength))
    }
}

/* ===========================================================
   other users' partial records
   =========================================================== */
/// What the persistence layer hands out for other users: no id, no text,
/// no owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialRecord {
    pub category: Category,
    pub strength: f64,
    pub depth: f64,
    pub created_at: DateTime<Utc>,
}

impl PartialRecord {
    /// Stable synthetic id so the same shared row always expands into the
    /// same child entities.
    pub fn synthetic_id(&self) -> String {
        format!(
            "other:{}:{}:{:016x}",
            self.created_at.timestamp_millis(),
            self.category,
            self.depth.to_bits()
        )
    }

    pub fn into_record(self) -> Result<EmotionRecord, RecordError> {
        let id = self.synthetic_id();
        EmotionRecord::new(id, self.category, self.strength, self.depth, self.created_at)
            .map(|r| r.with_owner(Owner::Other))
    }
}

/* ===========================================================
   wire form
   =========================================================== */
/// Row shape used by persistence; every deserialised record passes through
/// `EmotionRecord::new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordRow {
    id: String,
    category: String,
    strength: f64,
    depth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    analysis: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner_id: Option<String>,
}

impl TryFrom<RecordRow> for EmotionRecord {
    type Error = RecordError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let category = row.category.parse()?;
        let mut record =
            EmotionRecord::new(row.id, category, row.strength, row.depth, row.created_at)?;
        if let Some(owner_id) = row.owner_id {
            record = record.with_owner(Owner::User(owner_id));
        }
        match row.analysis {
            Some(text) => record.with_analysis(text),
            None => Ok(record),
        }
    }
}

impl From<EmotionRecord> for RecordRow {
    fn from(r: EmotionRecord) -> Self {
        let owner_id = match r.owner {
            Owner::User(id) => Some(id),
            Owner::Other => None,
        };
        RecordRow {
            id: r.id,
            category: r.category.name().to_string(),
            strength: r.strength,
            depth: r.depth,
            analysis: owner_id.as_ref().and(r.analysis),
            created_at: r.created_at,
            owner_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(" Joy ".parse::<Category>().unwrap(), Category::Joy);
        assert_eq!("NOSTALGIA".parse::<Category>().unwrap(), Category::Nostalgia);
        assert_eq!(
            "anger".parse::<Category>(),
            Err(RecordError::UnknownCategory("anger".into()))
        );
        for c in Category::ALL {
            assert_eq!(c.name().parse::<Category>().unwrap(), c);
            assert_eq!(Category::ALL[c.index()], c);
        }
    }

    #[test]
    fn groups_follow_palette_pairs() {
        assert_eq!(Category::Inspiration.group(), CategoryGroup::Warm);
        assert_eq!(Category::Sadness.group(), CategoryGroup::Calm);
        assert_eq!(Category::Stress.group(), CategoryGroup::Alarm);
        assert_eq!(Category::Nostalgia.group(), CategoryGroup::Sepia);
        assert_eq!(Category::Confusion.group(), CategoryGroup::Murk);
    }

    #[test]
    fn constructor_rejects_bad_values() {
        assert_eq!(
            EmotionRecord::new("", Category::Joy, 0.5, 1.0, t0()),
            Err(RecordError::EmptyId)
        );
        assert!(matches!(
            EmotionRecord::new("a", Category::Joy, 1.01, 1.0, t0()),
            Err(RecordError::StrengthOutOfRange(_))
        ));
        assert!(matches!(
            EmotionRecord::new("a", Category::Joy, f64::NAN, 1.0, t0()),
            Err(RecordError::StrengthOutOfRange(_))
        ));
        assert_eq!(
            EmotionRecord::new("a", Category::Joy, 0.5, f64::INFINITY, t0()),
            Err(RecordError::NonFiniteDepth)
        );
        assert!(EmotionRecord::new("a", Category::Joy, 0.0, -4.0, t0()).is_ok());
        assert!(EmotionRecord::new("a", Category::Joy, 1.0, 4.0, t0()).is_ok());
    }

    #[test]
    fn annotation_length_is_bounded() {
        let r = EmotionRecord::new("a", Category::Peace, 0.4, 3.0, t0()).unwrap();
        let long = "x".repeat(MAX_ANNOTATION_CHARS + 1);
        assert!(matches!(
            r.clone().with_analysis(long),
            Err(RecordError::AnnotationTooLong { .. })
        ));
        assert!(r.with_analysis("x".repeat(MAX_ANNOTATION_CHARS)).is_ok());
    }

    #[test]
    fn other_users_never_expose_text() {
        let own = EmotionRecord::new("a", Category::Peace, 0.4, 3.0, t0())
            .unwrap()
            .with_analysis("calm evening walk")
            .unwrap()
            .with_owner(Owner::User("u1".into()));
        assert_eq!(own.annotation(), Some("calm evening walk"));

        let other = own.clone().with_owner(Owner::Other);
        assert_eq!(other.annotation(), None);
    }

    #[test]
    fn partial_records_get_stable_ids_and_jitter() {
        let p = PartialRecord {
            category: Category::Stress,
            strength: 0.7,
            depth: 120.0,
            created_at: t0(),
        };
        let a = p.clone().into_record().unwrap();
        let b = p.into_record().unwrap();
        assert_eq!(a.id(), b.id());
        assert!(a.id().starts_with("other:"));
        assert!(a.owner().is_other());
        assert_eq!(a.anchor_x(), b.anchor_x());
        assert!(a.anchor_x().abs() <= FIELD_HALF_WIDTH + OTHER_JITTER);
    }

    #[test]
    fn json_rows_are_validated() {
        let good = r#"{"id":"r1","category":"Joy","strength":0.9,"depth":650.0,
            "analysis":"sunny","created_at":"2024-05-01T12:00:00Z","owner_id":"u1"}"#;
        let rec: EmotionRecord = serde_json::from_str(good).unwrap();
        assert_eq!(rec.category(), Category::Joy);
        assert_eq!(rec.annotation(), Some("sunny"));

        let bad = r#"{"id":"r1","category":"joy","strength":1.5,"depth":1.0,
            "created_at":"2024-05-01T12:00:00Z"}"#;
        assert!(serde_json::from_str::<EmotionRecord>(bad).is_err());

        let unknown = r#"{"id":"r1","category":"rage","strength":0.5,"depth":1.0,
            "created_at":"2024-05-01T12:00:00Z"}"#;
        assert!(serde_json::from_str::<EmotionRecord>(unknown).is_err());
    }
}

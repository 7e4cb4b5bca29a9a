//! Static cell index: grid coordinate → sound metadata.
//!
//! Built once from the flat `"{x}_{y_stored}" -> record` JSON table and never
//! mutated afterwards. Lookups are O(1) through a dense slot table laid out
//! in storage order.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::coord::{self, GridCoord};

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("invalid index JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed cell key {0:?}")]
    MalformedKey(String),
    #[error("cell key {key:?} lies outside the {size}x{size} grid")]
    OutOfBounds { key: String, size: u32 },
    #[error("unknown {field} {value:?} in cell {key:?}")]
    UnknownLabel { key: String, field: &'static str, value: String },
}

// ── Labels ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundType {
    Sigh,
    Throatclearing,
    Sniff,
    Laughter,
    Sneeze,
    Cough,
}

impl SoundType {
    pub const ALL: [SoundType; 6] = [
        SoundType::Sigh,
        SoundType::Throatclearing,
        SoundType::Sniff,
        SoundType::Laughter,
        SoundType::Sneeze,
        SoundType::Cough,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SoundType::Sigh => "Sigh",
            SoundType::Throatclearing => "Throatclearing",
            SoundType::Sniff => "Sniff",
            SoundType::Laughter => "Laughter",
            SoundType::Sneeze => "Sneeze",
            SoundType::Cough => "Cough",
        }
    }
}

impl FromStr for SoundType {
    type Err = ();

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, ()> {
        let s = s.trim();
        Self::ALL.into_iter().find(|t| t.label().eq_ignore_ascii_case(s)).ok_or(())
    }
}

impl fmt::Display for SoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        let s = s.trim();
        Self::ALL.into_iter().find(|g| g.label().eq_ignore_ascii_case(s)).ok_or(())
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct CellRecord {
    pub id: String,
    pub sound_type: SoundType,
    pub gender: Gender,
    /// `None` when the source age was missing or not a number.
    pub age: Option<u32>,
    /// Shared stem of the tile image and the audio clip.
    pub file_key: String,
}

/// Scalars in the source table are sometimes numbers, sometimes strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s,
        }
    }

    fn as_age(&self) -> Option<u32> {
        let value = match self {
            Scalar::Int(n) => *n as f64,
            Scalar::Float(f) => *f,
            Scalar::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value >= 0.0 && value <= u32::MAX as f64).then(|| value as u32)
    }
}

#[derive(Deserialize)]
struct RawRecord {
    id: Scalar,
    sound_type: String,
    gender: String,
    #[serde(default)]
    age: Option<Scalar>,
    file_name: String,
}

impl RawRecord {
    fn into_record(self, key: &str) -> Result<CellRecord, IndexError> {
        let sound_type = self.sound_type.parse().map_err(|_| IndexError::UnknownLabel {
            key: key.to_string(),
            field: "sound_type",
            value: self.sound_type.clone(),
        })?;
        let gender = self.gender.parse().map_err(|_| IndexError::UnknownLabel {
            key: key.to_string(),
            field: "gender",
            value: self.gender.clone(),
        })?;
        Ok(CellRecord {
            id: self.id.into_text(),
            sound_type,
            gender,
            age: self.age.as_ref().and_then(Scalar::as_age),
            file_key: self.file_name,
        })
    }
}

// ── Index ────────────────────────────────────────────────────────────────────

pub struct GridIndex {
    size: u32,
    /// `slots[y_stored * size + x]` → position in `records`.
    slots: Vec<Option<u32>>,
    /// Display coordinate alongside each record, in key order.
    records: Vec<(GridCoord, CellRecord)>,
}

impl GridIndex {
    pub fn empty(size: u32) -> Self {
        Self {
            size,
            slots: vec![None; (size as usize) * (size as usize)],
            records: Vec::new(),
        }
    }

    /// Parse the JSON table. Only a document that is not a table of records
    /// fails; an entry with a bad key or an unknown label is skipped with a
    /// warning and the rest of the grid still loads.
    pub fn from_json(text: &str, size: u32) -> Result<Self, IndexError> {
        let raw: BTreeMap<String, RawRecord> = serde_json::from_str(text)?;
        let mut index = Self::empty(size);
        let mut skipped = 0usize;
        for (key, raw) in raw {
            if let Err(e) = index.insert_raw(&key, raw) {
                log::warn!("skipping index entry: {e}");
                skipped += 1;
            }
        }
        log::debug!(
            "grid index: {} cells on a {}x{} grid, {} skipped",
            index.len(),
            size,
            size,
            skipped
        );
        Ok(index)
    }

    fn insert_raw(&mut self, key: &str, raw: RawRecord) -> Result<(), IndexError> {
        let coord = coord::parse_storage_key(key, self.size)
            .ok_or_else(|| IndexError::MalformedKey(key.to_string()))?;
        let record = raw.into_record(key)?;
        self.insert_at(key, coord, record)
    }

    /// Build from already-typed records keyed by display coordinate.
    pub fn from_records(
        size: u32,
        records: impl IntoIterator<Item = (GridCoord, CellRecord)>,
    ) -> Result<Self, IndexError> {
        let mut index = Self::empty(size);
        for (coord, record) in records {
            let key = coord::storage_key(coord, size);
            index.insert_at(&key, coord, record)?;
        }
        Ok(index)
    }

    fn insert_at(&mut self, key: &str, coord: GridCoord, record: CellRecord) -> Result<(), IndexError> {
        if !coord.in_bounds(self.size) {
            return Err(IndexError::OutOfBounds { key: key.to_string(), size: self.size });
        }
        let slot = self.slot(coord);
        match self.slots[slot] {
            Some(existing) => self.records[existing as usize] = (coord, record),
            None => {
                self.slots[slot] = Some(self.records.len() as u32);
                self.records.push((coord, record));
            }
        }
        Ok(())
    }

    fn slot(&self, coord: GridCoord) -> usize {
        let y_stored = coord::display_to_storage(coord.y, self.size);
        y_stored as usize * self.size as usize + coord.x as usize
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at a display coordinate, if the cell is occupied.
    pub fn lookup(&self, x: i32, y: i32) -> Option<&CellRecord> {
        self.get(GridCoord::new(x, y))
    }

    pub fn get(&self, coord: GridCoord) -> Option<&CellRecord> {
        if !coord.in_bounds(self.size) {
            return None;
        }
        let idx = self.slots[self.slot(coord)]?;
        self.records.get(idx as usize).map(|(_, r)| r)
    }

    /// Every occupied cell exactly once, with its display coordinate.
    pub fn occupied(&self) -> impl Iterator<Item = (GridCoord, &CellRecord)> + '_ {
        self.records.iter().map(|(c, r)| (*c, r))
    }

    /// Distinct file keys in first-seen order.
    pub fn file_keys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|(_, r)| seen.insert(r.file_key.as_str()))
            .map(|(_, r)| r.file_key.clone())
            .collect()
    }
}

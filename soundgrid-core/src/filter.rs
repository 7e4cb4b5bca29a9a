//! Filter predicate shared by compositing and selection.
//!
//! A filter entry names a sound type, a gender, or an age range
//! (`"Age: 18–24"`). Active entries are ANDed; with none active every record
//! matches. [`CompiledFilters`] is the one place that decides visibility.

use serde::{Deserialize, Serialize};

use crate::index::{CellRecord, Gender, SoundType};

pub const AGE_PREFIX: &str = "Age: ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgeRange {
    pub label: &'static str,
    pub min: u32,
    /// Inclusive; `None` is open-ended.
    pub max: Option<u32>,
}

impl AgeRange {
    pub fn contains(&self, age: u32) -> bool {
        age >= self.min && self.max.map_or(true, |max| age <= max)
    }

    pub fn filter_name(&self) -> String {
        format!("{AGE_PREFIX}{}", self.label)
    }
}

pub const AGE_RANGES: [AgeRange; 6] = [
    AgeRange { label: "18–24", min: 18, max: Some(24) },
    AgeRange { label: "25–34", min: 25, max: Some(34) },
    AgeRange { label: "35–44", min: 35, max: Some(44) },
    AgeRange { label: "45–54", min: 45, max: Some(54) },
    AgeRange { label: "55–64", min: 55, max: Some(64) },
    AgeRange { label: "65+", min: 65, max: None },
];

pub fn age_range_for(age: u32) -> Option<&'static AgeRange> {
    AGE_RANGES.iter().find(|r| r.contains(age))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub name: String,
    pub active: bool,
}

impl FilterEntry {
    pub fn active(name: impl Into<String>) -> Self {
        Self { name: name.into(), active: true }
    }
}

/// Every name the filter UI can offer: sound types, genders, age ranges.
pub fn filter_vocabulary() -> Vec<String> {
    SoundType::ALL
        .iter()
        .map(|t| t.label().to_string())
        .chain(Gender::ALL.iter().map(|g| g.label().to_string()))
        .chain(AGE_RANGES.iter().map(AgeRange::filter_name))
        .collect()
}

// ── Predicate ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
enum Criterion {
    SoundType(SoundType),
    Gender(Gender),
    Age(&'static AgeRange),
    /// Unrecognised name: matches nothing.
    Never,
}

impl Criterion {
    fn parse(name: &str) -> Self {
        // Gender labels compare exactly, sound types ignore case.
        if let Some(g) = Gender::ALL.into_iter().find(|g| g.label() == name) {
            return Criterion::Gender(g);
        }
        if let Ok(t) = name.parse::<SoundType>() {
            return Criterion::SoundType(t);
        }
        let label = name.strip_prefix(AGE_PREFIX).unwrap_or(name).replace('-', "–");
        match AGE_RANGES.iter().find(|r| r.label == label) {
            Some(range) => Criterion::Age(range),
            None => Criterion::Never,
        }
    }

    fn accepts(&self, record: &CellRecord) -> bool {
        match self {
            Criterion::SoundType(t) => record.sound_type == *t,
            Criterion::Gender(g) => record.gender == *g,
            Criterion::Age(range) => record.age.is_some_and(|a| range.contains(a)),
            Criterion::Never => false,
        }
    }
}

/// Active filters parsed once, ready to test thousands of records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledFilters {
    criteria: Vec<Criterion>,
}

impl CompiledFilters {
    pub fn new(entries: &[FilterEntry]) -> Self {
        Self {
            criteria: entries
                .iter()
                .filter(|e| e.active)
                .map(|e| Criterion::parse(&e.name))
                .collect(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.criteria.is_empty()
    }

    /// An empty cell never matches; with no active criteria every record does.
    pub fn matches(&self, record: Option<&CellRecord>) -> bool {
        let Some(r) = record else { return false };
        self.criteria.iter().all(|c| c.accepts(r))
    }
}

pub fn matches(record: Option<&CellRecord>, filters: &[FilterEntry]) -> bool {
    CompiledFilters::new(filters).matches(record)
}

// ── Filter set ───────────────────────────────────────────────────────────────

/// Order-independent identity of the active filters, used as a cache key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FilterSignature(Vec<String>);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSet {
    entries: Vec<FilterEntry>,
}

impl FilterSet {
    pub fn new(entries: Vec<FilterEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    /// Add `name` as an active filter. Re-adding an existing name re-activates it.
    pub fn add(&mut self, name: &str) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(e) => e.active = true,
            None => self.entries.push(FilterEntry::active(name)),
        }
    }

    pub fn toggle(&mut self, name: &str) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.name == name) {
            e.active = !e.active;
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|e| e.name != name);
    }

    pub fn compile(&self) -> CompiledFilters {
        CompiledFilters::new(&self.entries)
    }

    pub fn signature(&self) -> FilterSignature {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.active)
            .map(|e| e.name.clone())
            .collect();
        names.sort();
        names.dedup();
        FilterSignature(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sound_type: SoundType, gender: Gender, age: Option<u32>) -> CellRecord {
        CellRecord {
            id: "x".into(),
            sound_type,
            gender,
            age,
            file_key: "x".into(),
        }
    }

    #[test]
    fn test_no_active_filters_matches_everything() {
        let r = record(SoundType::Sigh, Gender::Male, Some(20));
        assert!(matches(Some(&r), &[]));
        assert!(matches(Some(&r), &[FilterEntry { name: "Cough".into(), active: false }]));
        assert!(!matches(None, &[]));
    }

    #[test]
    fn test_missing_record_never_matches_active_filters() {
        assert!(!matches(None, &[FilterEntry::active("Cough")]));
    }

    #[test]
    fn test_and_semantics() {
        let filters = [FilterEntry::active("Cough"), FilterEntry::active("Male")];
        assert!(!matches(Some(&record(SoundType::Cough, Gender::Female, Some(30))), &filters));
        assert!(matches(Some(&record(SoundType::Cough, Gender::Male, Some(30))), &filters));
    }

    #[test]
    fn test_sound_type_ignores_case_gender_does_not() {
        let r = record(SoundType::Throatclearing, Gender::Female, None);
        assert!(matches(Some(&r), &[FilterEntry::active("throatclearing")]));
        assert!(!matches(Some(&r), &[FilterEntry::active("female")]));
        assert!(matches(Some(&r), &[FilterEntry::active("Female")]));
    }

    #[test]
    fn test_age_ranges() {
        let filters = [FilterEntry::active("Age: 25–34")];
        assert!(matches(Some(&record(SoundType::Sigh, Gender::Male, Some(25))), &filters));
        assert!(matches(Some(&record(SoundType::Sigh, Gender::Male, Some(34))), &filters));
        assert!(!matches(Some(&record(SoundType::Sigh, Gender::Male, Some(35))), &filters));
        assert!(!matches(Some(&record(SoundType::Sigh, Gender::Male, None)), &filters));

        let open = [FilterEntry::active("Age: 65+")];
        assert!(matches(Some(&record(SoundType::Sigh, Gender::Male, Some(90))), &open));
        assert!(!matches(Some(&record(SoundType::Sigh, Gender::Male, Some(64))), &open));
    }

    #[test]
    fn test_unknown_filter_matches_nothing() {
        let r = record(SoundType::Sigh, Gender::Male, Some(20));
        assert!(!matches(Some(&r), &[FilterEntry::active("Age: 10–12")]));
        assert!(!matches(Some(&r), &[FilterEntry::active("Whistle")]));
    }

    #[test]
    fn test_adding_filters_never_grows_matches() {
        let pool: Vec<CellRecord> = SoundType::ALL
            .iter()
            .flat_map(|&t| Gender::ALL.iter().map(move |&g| (t, g)))
            .flat_map(|(t, g)| [Some(19), Some(40), Some(70), None].map(|a| record(t, g, a)))
            .collect();
        let count = |set: &FilterSet| {
            let compiled = set.compile();
            pool.iter().filter(|r| compiled.matches(Some(r))).count()
        };

        let mut set = FilterSet::default();
        let full = count(&set);
        assert_eq!(full, pool.len());
        let mut last = full;
        for name in ["Sneeze", "Female", "Age: 35–44"] {
            set.add(name);
            let now = count(&set);
            assert!(now <= last);
            last = now;
        }
        for name in ["Sneeze", "Female", "Age: 35–44"] {
            set.remove(name);
        }
        assert_eq!(count(&set), full);
    }

    #[test]
    fn test_signature_ignores_order_and_inactive() {
        let mut a = FilterSet::default();
        a.add("Male");
        a.add("Cough");
        let mut b = FilterSet::default();
        b.add("Cough");
        b.add("Male");
        b.add("Sigh");
        b.toggle("Sigh");
        assert_eq!(a.signature(), b.signature());
        b.toggle("Sigh");
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn test_vocabulary_lists_every_label() {
        let vocab = filter_vocabulary();
        assert_eq!(vocab.len(), 6 + 2 + 6);
        assert!(vocab.contains(&"Age: 65+".to_string()));
        for name in &vocab {
            assert_ne!(Criterion::parse(name), Criterion::Never, "{name}");
        }
    }
}

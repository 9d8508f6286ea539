use crate::error::{KeyswarmError, Result};
use crate::normalize::{normalize, normalize_keyword};
use serde::{Deserialize, Serialize};

/// Binary message label. In the input table `0` marks an irrelevant message
/// and `1` a relevant one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Relevant,
    Irrelevant,
}

impl Label {
    pub fn from_class(class: &str) -> Option<Self> {
        match class.trim().parse::<i64>().ok()? {
            0 => Some(Label::Irrelevant),
            1 => Some(Label::Relevant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Normalized text (see [`crate::normalize::normalize`]).
    pub text: String,
    pub label: Label,
}

/// A row as read from the input table, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    /// 1-based line in the source, used in error messages.
    pub line: usize,
    pub text: Option<String>,
    pub class: Option<String>,
}

/// Which records a keyword count ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    Any,
    IrrelevantOnly,
}

/// Immutable in-memory corpus of normalized, labeled records.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    records: Vec<Record>,
    irrelevant: usize,
}

impl CorpusStore {
    /// Validate and normalize raw rows. Any row missing its text or class, or
    /// whose class is not `0`/`1`, aborts the load.
    pub fn load<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut records = Vec::new();
        for row in rows {
            let text = row.text.ok_or_else(|| KeyswarmError::MalformedRecord {
                line: row.line,
                reason: "missing text column".into(),
            })?;
            let class = row.class.ok_or_else(|| KeyswarmError::MalformedRecord {
                line: row.line,
                reason: "missing class column".into(),
            })?;
            let label = Label::from_class(&class).ok_or_else(|| KeyswarmError::MalformedRecord {
                line: row.line,
                reason: format!("class must be 0 or 1, got {class:?}"),
            })?;
            records.push(Record { text: normalize(&text), label });
        }
        let store = Self::from_records(records)?;
        tracing::info!(
            total = store.total_count(),
            irrelevant = store.irrelevant_count(),
            relevant = store.relevant_count(),
            "corpus loaded"
        );
        Ok(store)
    }

    /// Build from records whose text is already normalized.
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        if records.is_empty() {
            return Err(KeyswarmError::EmptyCorpus);
        }
        let irrelevant = records.iter().filter(|r| r.label == Label::Irrelevant).count();
        Ok(Self { records, irrelevant })
    }

    pub fn total_count(&self) -> usize { self.records.len() }

    pub fn irrelevant_count(&self) -> usize { self.irrelevant }

    pub fn relevant_count(&self) -> usize { self.records.len() - self.irrelevant }

    /// Number of records in `scope` whose text contains `keyword`.
    pub fn count_matching(&self, keyword: &str, scope: MatchScope) -> usize {
        let needle = normalize_keyword(keyword);
        self.records
            .iter()
            .filter(|r| scope == MatchScope::Any || r.label == Label::Irrelevant)
            .filter(|r| r.text.contains(needle.as_str()))
            .count()
    }
}

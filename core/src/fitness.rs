//! Irrelevance/collectibility objective.
//!
//! For a keyword `k`:
//!
//! * `irrelevance_rate(k)` is the share of irrelevant records containing `k`,
//! * `inverse_collectibility(k)` is `1 -` the share of all records containing `k`,
//!
//! and its score is the mean of the two. A keyword set scores the mean of its
//! keywords' scores; the empty set scores `+inf`. Lower is better.

use crate::codebook::{Codebook, KeywordSet};
use crate::corpus::{CorpusStore, MatchScope};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How the irrelevance term enters the per-keyword score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    /// `irrelevance_rate` is added as is, so minimization favors keywords that
    /// are rare among irrelevant messages.
    #[default]
    AsWritten,
    /// `1 - irrelevance_rate` is added instead, favoring keywords concentrated
    /// in irrelevant messages.
    FavorIrrelevant,
}

impl std::str::FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "as-written" => Ok(Polarity::AsWritten),
            "favor-irrelevant" => Ok(Polarity::FavorIrrelevant),
            other => Err(format!("unknown polarity {other:?} (expected as-written or favor-irrelevant)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordStats {
    pub irrelevant_hits: usize,
    pub total_hits: usize,
}

impl KeywordStats {
    pub fn collect(keyword: &str, corpus: &CorpusStore) -> Self {
        Self {
            irrelevant_hits: corpus.count_matching(keyword, MatchScope::IrrelevantOnly),
            total_hits: corpus.count_matching(keyword, MatchScope::Any),
        }
    }

    /// Hits among irrelevant records over the irrelevant count, or 0 when the
    /// corpus has no irrelevant record.
    pub fn irrelevance_rate(&self, corpus: &CorpusStore) -> f64 {
        match corpus.irrelevant_count() {
            0 => 0.0,
            n => self.irrelevant_hits as f64 / n as f64,
        }
    }

    pub fn inverse_collectibility(&self, corpus: &CorpusStore) -> f64 {
        1.0 - self.total_hits as f64 / corpus.total_count() as f64
    }

    pub fn score(&self, corpus: &CorpusStore, polarity: Polarity) -> f64 {
        let irrelevance = match polarity {
            Polarity::AsWritten => self.irrelevance_rate(corpus),
            Polarity::FavorIrrelevant => 1.0 - self.irrelevance_rate(corpus),
        };
        (irrelevance + self.inverse_collectibility(corpus)) / 2.0
    }
}

/// Score a keyword set against the corpus with the default polarity.
pub fn score(keywords: &[String], corpus: &CorpusStore) -> f64 {
    score_with(keywords, corpus, Polarity::default())
}

pub fn score_with(keywords: &[String], corpus: &CorpusStore, polarity: Polarity) -> f64 {
    if keywords.is_empty() {
        return f64::INFINITY;
    }
    if corpus.irrelevant_count() == 0 {
        tracing::warn!("corpus has no irrelevant records; irrelevance rate treated as 0");
    }
    let total: f64 = keywords
        .iter()
        .map(|k| KeywordStats::collect(k, corpus).score(corpus, polarity))
        .sum();
    total / keywords.len() as f64
}

/// Per-candidate scores computed once for a whole codebook, so particles can
/// be scored without rescanning the corpus.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    /// Indexed like the codebook; slot 0 is unused.
    scores: Vec<f64>,
    stats: Vec<KeywordStats>,
    polarity: Polarity,
}

impl KeywordScorer {
    pub fn new(corpus: &CorpusStore, codebook: &Codebook, polarity: Polarity) -> Self {
        if corpus.irrelevant_count() == 0 {
            tracing::warn!("corpus has no irrelevant records; irrelevance rate treated as 0");
        }
        let empty = KeywordStats { irrelevant_hits: 0, total_hits: 0 };
        let mut stats = vec![empty];
        stats.par_extend(codebook.keywords().par_iter().map(|k| KeywordStats::collect(k, corpus)));
        let scores = stats.iter().map(|s| s.score(corpus, polarity)).collect();
        tracing::debug!(candidates = codebook.max_index(), "keyword statistics cached");
        Self { scores, stats, polarity }
    }

    pub fn polarity(&self) -> Polarity { self.polarity }

    pub fn stats(&self, index: usize) -> Option<&KeywordStats> {
        self.stats.get(index).filter(|_| index != 0)
    }

    /// Mean cached score over codebook indices; `+inf` for an empty slice.
    pub fn score_indices(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return f64::INFINITY;
        }
        let total: f64 = indices.iter().map(|&i| self.scores[i]).sum();
        total / indices.len() as f64
    }

    /// Score a decoded keyword set through the codebook.
    pub fn score_set(&self, codebook: &Codebook, keywords: &KeywordSet) -> f64 {
        let indices: Vec<usize> = keywords.iter().filter_map(|k| codebook.encode(k)).collect();
        self.score_indices(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Label, Record};

    fn corpus() -> CorpusStore {
        CorpusStore::from_records(vec![
            Record { text: "free entry win now".into(), label: Label::Irrelevant },
            Record { text: "thanks for the update".into(), label: Label::Relevant },
        ])
        .unwrap()
    }

    #[test]
    fn scenario_free_scores_three_quarters() {
        let c = corpus();
        assert!((score(&["free".to_string()], &c) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn favor_irrelevant_flips_the_rate() {
        let c = corpus();
        let s = score_with(&["free".to_string()], &c, Polarity::FavorIrrelevant);
        assert!((s - 0.25).abs() < 1e-12);
    }

    #[test]
    fn empty_set_is_infinite() {
        assert_eq!(score(&[], &corpus()), f64::INFINITY);
    }

    #[test]
    fn no_irrelevant_records_degrades_to_zero_rate() {
        let c = CorpusStore::from_records(vec![
            Record { text: "hello there".into(), label: Label::Relevant },
            Record { text: "general update".into(), label: Label::Relevant },
        ])
        .unwrap();
        let s = score(&["hello".to_string()], &c);
        assert!((s - 0.25).abs() < 1e-12);
    }

    #[test]
    fn polarity_parses() {
        assert_eq!("favor-irrelevant".parse::<Polarity>().unwrap(), Polarity::FavorIrrelevant);
        assert!("sideways".parse::<Polarity>().is_err());
    }
}

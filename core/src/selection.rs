use crate::codebook::{Codebook, KeywordSet};
use crate::config::{SelectorConfig, SwarmConfig};
use crate::constraint::UniquenessConstraint;
use crate::corpus::CorpusStore;
use crate::error::Result;
use crate::fitness::{KeywordScorer, Polarity};
use crate::swarm::{Bounds, Objective, StopFlag, StopReason, Swarm, SwarmOutcome};
use serde::{Deserialize, Serialize};

/// Scores a particle by decoding it through the codebook and averaging the
/// cached per-candidate scores.
pub struct KeywordObjective<'a> {
    codebook: &'a Codebook,
    scorer: &'a KeywordScorer,
}

impl<'a> KeywordObjective<'a> {
    pub fn new(codebook: &'a Codebook, scorer: &'a KeywordScorer) -> Self {
        Self { codebook, scorer }
    }
}

impl Objective for KeywordObjective<'_> {
    fn evaluate(&self, position: &[f64]) -> f64 {
        self.scorer.score_indices(&self.codebook.indices_of(position))
    }
}

/// Record counts of the corpus a search ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusCounts {
    pub total: usize,
    pub irrelevant: usize,
    pub relevant: usize,
}

impl CorpusCounts {
    pub fn of(corpus: &CorpusStore) -> Self {
        Self {
            total: corpus.total_count(),
            irrelevant: corpus.irrelevant_count(),
            relevant: corpus.relevant_count(),
        }
    }
}

/// Match counts of one selected keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordHits {
    pub keyword: String,
    pub irrelevant_hits: usize,
    pub total_hits: usize,
}

/// Result of one keyword search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionReport {
    pub keywords: KeywordSet,
    /// `None` when no feasible particle was found.
    pub fitness: Option<f64>,
    pub position: Vec<f64>,
    pub feasible: bool,
    /// Some particle kept its slots distinct but decoded to no keyword at all.
    pub constraint_satisfied: bool,
    pub iterations: usize,
    pub stop_reason: StopReason,
    pub polarity: Polarity,
    pub corpus: CorpusCounts,
    pub keyword_hits: Vec<KeywordHits>,
    pub lower_bound: Vec<f64>,
    pub upper_bound: Vec<f64>,
    /// Global-best fitness after initialization and each iteration; `None`
    /// while nothing feasible had been found.
    pub history: Vec<Option<f64>>,
}

impl SelectionReport {
    fn from_outcome(
        outcome: SwarmOutcome,
        codebook: &Codebook,
        scorer: &KeywordScorer,
        bounds: &Bounds,
        corpus: CorpusCounts,
    ) -> Self {
        let keywords = if outcome.feasible {
            codebook.decode_position(&outcome.best_position)
        } else {
            Vec::new()
        };
        let keyword_hits = keywords
            .iter()
            .filter_map(|k| {
                let stats = codebook.encode(k).and_then(|i| scorer.stats(i))?;
                Some(KeywordHits {
                    keyword: k.clone(),
                    irrelevant_hits: stats.irrelevant_hits,
                    total_hits: stats.total_hits,
                })
            })
            .collect();
        Self {
            keywords,
            fitness: outcome.feasible.then_some(outcome.best_fitness),
            position: outcome.best_position,
            feasible: outcome.feasible,
            constraint_satisfied: outcome.constraint_satisfied,
            iterations: outcome.iterations,
            stop_reason: outcome.stop_reason,
            polarity: scorer.polarity(),
            corpus,
            keyword_hits,
            lower_bound: bounds.lower().to_vec(),
            upper_bound: bounds.upper().to_vec(),
            history: outcome.history.into_iter().map(|f| f.is_finite().then_some(f)).collect(),
        }
    }

    /// Human-readable summary for the console.
    pub fn summary(&self) -> String {
        match self.fitness {
            Some(fitness) => {
                let mut out = format!(
                    "OPTIMAL POSITION: {:?}\nMINIMUM LOSS OBTAINED: {}\nSELECTED KEYWORDS:\n{:?}",
                    self.position, fitness, self.keywords
                );
                for hit in &self.keyword_hits {
                    out.push_str(&format!(
                        "\n  {:<20} {}/{} irrelevant, {}/{} overall",
                        hit.keyword, hit.irrelevant_hits, self.corpus.irrelevant, hit.total_hits, self.corpus.total
                    ));
                }
                out
            }
            None if self.constraint_satisfied => format!(
                "NO FEASIBLE KEYWORD SET FOUND after {} iterations ({:?}): particles with distinct \
                 slots only ever decoded to the empty keyword set; try a larger dimension",
                self.iterations, self.stop_reason
            ),
            None => format!(
                "NO FEASIBLE KEYWORD SET FOUND after {} iterations ({:?}); \
                 try a smaller dimension, a larger swarm or more iterations",
                self.iterations, self.stop_reason
            ),
        }
    }
}

/// Runs the swarm over `[0, M]^D` against a shared, read-only corpus and
/// codebook.
pub struct KeywordSelector<'a> {
    codebook: &'a Codebook,
    corpus: CorpusCounts,
    scorer: KeywordScorer,
    swarm: Swarm,
}

impl<'a> KeywordSelector<'a> {
    pub fn new(corpus: &'a CorpusStore, codebook: &'a Codebook, swarm: SwarmConfig, polarity: Polarity) -> Result<Self> {
        let bounds = Bounds::uniform(swarm.dimension, 0.0, codebook.max_index() as f64)?;
        let swarm = Swarm::new(swarm, bounds)?;
        let scorer = KeywordScorer::new(corpus, codebook, polarity);
        Ok(Self { codebook, corpus: CorpusCounts::of(corpus), scorer, swarm })
    }

    pub fn from_config(corpus: &'a CorpusStore, codebook: &'a Codebook, config: &SelectorConfig) -> Result<Self> {
        Self::new(corpus, codebook, config.swarm.clone(), config.fitness.polarity)
    }

    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.swarm = self.swarm.with_stop_flag(stop);
        self
    }

    pub fn stop_flag(&self) -> StopFlag { self.swarm.stop_flag() }

    pub fn bounds(&self) -> &Bounds { self.swarm.bounds() }

    pub fn run(&self) -> SelectionReport {
        let cfg = self.swarm.config();
        tracing::info!(
            dimension = cfg.dimension,
            swarm_size = cfg.swarm_size,
            iterations = cfg.iterations,
            candidates = self.codebook.max_index(),
            "starting keyword search"
        );
        let objective = KeywordObjective::new(self.codebook, &self.scorer);
        let outcome = self.swarm.optimize(&objective, &[&UniquenessConstraint]);
        let report = SelectionReport::from_outcome(outcome, self.codebook, &self.scorer, self.swarm.bounds(), self.corpus);
        if report.feasible {
            tracing::info!(keywords = ?report.keywords, fitness = ?report.fitness, "keyword search complete");
        } else {
            tracing::warn!(iterations = report.iterations, "keyword search found no feasible keyword set");
        }
        report
    }
}

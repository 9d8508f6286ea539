use crate::error::{KeyswarmError, Result};
use crate::normalize::normalize_keyword;
use std::collections::HashMap;

/// Index reserved for "no keyword".
pub const EMPTY_SLOT: usize = 0;

/// Decoded keywords of one particle: distinct, non-empty, in slot order.
pub type KeywordSet = Vec<String>;

/// Bidirectional mapping between `[0, M]` and the candidate keywords.
/// Index 0 always maps to the empty string.
#[derive(Debug, Clone)]
pub struct Codebook {
    keywords: Vec<String>,
    index: HashMap<String, usize>,
}

impl Codebook {
    /// Assign indices `1..=M` to the candidates in order. Candidates are
    /// normalized like corpus text; blanks are skipped and repeats keep the
    /// index of their first occurrence.
    pub fn build<I, S>(candidates: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords = vec![String::new()];
        let mut index = HashMap::new();
        index.insert(String::new(), EMPTY_SLOT);
        for candidate in candidates {
            let kw = normalize_keyword(candidate.as_ref());
            if kw.is_empty() {
                continue;
            }
            if index.contains_key(&kw) {
                tracing::warn!(keyword = %kw, "duplicate candidate keyword collapsed");
                continue;
            }
            index.insert(kw.clone(), keywords.len());
            keywords.push(kw);
        }
        if keywords.len() == 1 {
            return Err(KeyswarmError::EmptyCandidateList);
        }
        Ok(Self { keywords, index })
    }

    /// Highest valid index, `M`.
    pub fn max_index(&self) -> usize { self.keywords.len() - 1 }

    /// Number of entries including the sentinel (`M + 1`).
    pub fn len(&self) -> usize { self.keywords.len() }

    pub fn is_empty(&self) -> bool { self.keywords.len() <= 1 }

    /// Candidate keywords without the sentinel.
    pub fn keywords(&self) -> &[String] { &self.keywords[1..] }

    pub fn decode(&self, index: usize) -> Result<&str> {
        self.keywords
            .get(index)
            .map(String::as_str)
            .ok_or(KeyswarmError::IndexOutOfRange { index, max: self.max_index() })
    }

    pub fn encode(&self, keyword: &str) -> Option<usize> {
        self.index.get(&normalize_keyword(keyword)).copied()
    }

    /// Round to nearest (half away from zero) and clamp into `[0, M]`.
    pub fn discretize(&self, coordinate: f64) -> usize {
        if coordinate.is_nan() || coordinate <= 0.0 {
            return EMPTY_SLOT;
        }
        (coordinate.round() as usize).min(self.max_index())
    }

    /// Discretized indices of a position, sentinel slots removed, first
    /// occurrence kept.
    pub fn indices_of(&self, position: &[f64]) -> Vec<usize> {
        let mut out = Vec::with_capacity(position.len());
        for &x in position {
            let idx = self.discretize(x);
            if idx != EMPTY_SLOT && !out.contains(&idx) {
                out.push(idx);
            }
        }
        out
    }

    /// Decode a particle position into its keyword set.
    pub fn decode_position(&self, position: &[f64]) -> KeywordSet {
        self.indices_of(position)
            .into_iter()
            .map(|i| self.keywords[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserves_sentinel_and_dedups() {
        let cb = Codebook::build(["free", "Win", "free", "  ", "prize"]).unwrap();
        assert_eq!(cb.max_index(), 3);
        assert_eq!(cb.decode(0).unwrap(), "");
        assert_eq!(cb.decode(2).unwrap(), "win");
        assert_eq!(cb.encode("FREE"), Some(1));
        assert_eq!(cb.encode("prize"), Some(3));
        assert_eq!(cb.encode("nope"), None);
        assert!(matches!(cb.decode(4), Err(KeyswarmError::IndexOutOfRange { index: 4, max: 3 })));
    }

    #[test]
    fn empty_candidates_rejected() {
        let none: [&str; 0] = [];
        assert!(matches!(Codebook::build(none), Err(KeyswarmError::EmptyCandidateList)));
        assert!(matches!(Codebook::build(["", " "]), Err(KeyswarmError::EmptyCandidateList)));
    }

    #[test]
    fn discretize_rounds_and_clamps() {
        let cb = Codebook::build(["a", "b", "c"]).unwrap();
        assert_eq!(cb.discretize(-0.7), 0);
        assert_eq!(cb.discretize(0.49), 0);
        assert_eq!(cb.discretize(0.5), 1);
        assert_eq!(cb.discretize(2.5), 3);
        assert_eq!(cb.discretize(3.0), 3);
        assert_eq!(cb.discretize(17.2), 3);
        assert_eq!(cb.discretize(f64::NAN), 0);
    }

    #[test]
    fn decode_position_drops_sentinel_and_repeats() {
        let cb = Codebook::build(["a", "b", "c"]).unwrap();
        assert_eq!(cb.decode_position(&[0.2, 2.1, 1.9, 3.0]), vec!["b", "c"]);
        assert!(cb.decode_position(&[0.0, 0.4]).is_empty());
    }
}

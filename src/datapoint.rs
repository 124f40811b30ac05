//! Query-candidate datapoints of a search result

use serde::{Deserialize, Serialize};

/// One query-candidate pair of a search result
///
/// Equality (`PartialEq`) must be structural: two datapoints are equal iff
/// they represent the same query/candidate pair at the same distance.
/// Rank lookup, overlap and rank agreement all rely on it.
pub trait Datapoint: PartialEq {
    /// Whether ground truth judges the candidate relevant for the query
    fn is_relevant(&self) -> bool;

    /// Distance between query and candidate (smaller is a better match)
    fn distance(&self) -> f64;
}

impl<D: Datapoint> Datapoint for &D {
    fn is_relevant(&self) -> bool {
        (**self).is_relevant()
    }

    fn distance(&self) -> f64 {
        (**self).distance()
    }
}

/// A scored match between a query and a candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// Query identifier
    pub query: String,
    /// Candidate identifier
    pub candidate: String,
    /// Distance between query and candidate
    pub distance: f64,
    /// Relevance judgment
    pub relevant: bool,
}

impl Match {
    /// Create a new match
    #[must_use]
    pub fn new(
        query: impl Into<String>,
        candidate: impl Into<String>,
        distance: f64,
        relevant: bool,
    ) -> Self {
        Self {
            query: query.into(),
            candidate: candidate.into(),
            distance,
            relevant,
        }
    }

    /// Create a match judged relevant
    #[must_use]
    pub fn relevant(query: impl Into<String>, candidate: impl Into<String>, distance: f64) -> Self {
        Self::new(query, candidate, distance, true)
    }

    /// Create a match judged irrelevant
    #[must_use]
    pub fn irrelevant(
        query: impl Into<String>,
        candidate: impl Into<String>,
        distance: f64,
    ) -> Self {
        Self::new(query, candidate, distance, false)
    }
}

// Relevance is a judgment about the pair, not part of its identity.
impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        self.query == other.query
            && self.candidate == other.candidate
            && self.distance == other.distance
    }
}

impl Datapoint for Match {
    fn is_relevant(&self) -> bool {
        self.relevant
    }

    fn distance(&self) -> f64 {
        self.distance
    }
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} ({:.4}{})",
            self.query,
            self.candidate,
            self.distance,
            if self.relevant { ", relevant" } else { "" }
        )
    }
}

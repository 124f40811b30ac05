//! Ranked search results and the measures computed over them
//!
//! A [`RankedResult`] owns the datapoints returned for one query together
//! with the ground-truth number of relevant items. Measures that depend on
//! rank positions are read through a [`Ranking`], a borrowed view obtained
//! from [`RankedResult::ranking`] once the order has been resolved.
//!
//! # Example
//!
//! ```rust
//! use search_eval::{Match, RankedResult};
//!
//! let mut result = RankedResult::by_distance(2);
//! result.push(Match::irrelevant("q", "c", 0.6));
//! result.push(Match::relevant("q", "a", 0.1));
//! result.push(Match::relevant("q", "b", 0.3));
//!
//! let ranking = result.ranking();
//! assert_eq!(ranking.get(0).map(|m| m.candidate.as_str()), Some("a"));
//! assert!((ranking.avg_precision() - 1.0).abs() < 1e-12);
//! assert!((ranking.r_precision().unwrap() - 1.0).abs() < 1e-12);
//! ```
//!
//! # Sources
//!
//! - M. Guentert, M. Kunze, M. Weske. Evaluation Measures for Similarity
//!   Search Results in Process Model Repositories. ER 2012.
//! - M. Kunze, M. Weske. Methods for Evaluating Process Model Search.
//!   PMC-MR 2013.

use crate::combinatorics::binomial_coefficient;
use crate::{Datapoint, Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Comparator placing the better match first
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

enum OrderingRule<T> {
    ByDistance,
    Custom(Comparator<T>),
}

impl<T> Clone for OrderingRule<T> {
    fn clone(&self) -> Self {
        match self {
            Self::ByDistance => Self::ByDistance,
            Self::Custom(rule) => Self::Custom(Arc::clone(rule)),
        }
    }
}

/// Search result of a single query
///
/// Without an ordering rule the insertion order is the rank order. With
/// one, the datapoints are stably sorted by the rule the first time the
/// order is resolved after a modification.
///
/// Not synchronized: a result shared between threads must be guarded by
/// the caller.
pub struct RankedResult<T> {
    items: Vec<T>,
    total_relevant: usize,
    ordering: Option<OrderingRule<T>>,
    resolved: bool,
}

impl<T> RankedResult<T> {
    /// Create an empty result whose insertion order is its rank order
    #[must_use]
    pub fn new(total_relevant: usize) -> Self {
        Self {
            items: Vec::new(),
            total_relevant,
            ordering: None,
            resolved: true,
        }
    }

    /// Create an empty result ranked by a comparator
    #[must_use]
    pub fn with_ordering<F>(total_relevant: usize, rule: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            items: Vec::new(),
            total_relevant,
            ordering: Some(OrderingRule::Custom(Arc::new(rule))),
            resolved: false,
        }
    }

    /// Create a result from datapoints that are already in rank order
    #[must_use]
    pub fn from_ranked(total_relevant: usize, items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
            total_relevant,
            ordering: None,
            resolved: true,
        }
    }

    /// Append a datapoint
    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.resolved = self.ordering.is_none();
    }

    /// Number of datapoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the result holds no datapoints
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ground-truth number of relevant items for the query
    #[must_use]
    pub fn total_relevant(&self) -> usize {
        self.total_relevant
    }

    /// Whether datapoints are reordered by a rule
    #[must_use]
    pub fn has_ordering_rule(&self) -> bool {
        self.ordering.is_some()
    }

    /// Whether the stored order is the rank order
    #[must_use]
    pub fn is_order_resolved(&self) -> bool {
        self.resolved
    }

    /// Datapoints in their current stored order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Datapoint at `index` of the current stored order
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// The rank view, if the order is already resolved
    #[must_use]
    pub fn resolved(&self) -> Option<Ranking<'_, T>> {
        self.resolved
            .then(|| Ranking::new(&self.items, self.total_relevant))
    }
}

impl<T: Datapoint> RankedResult<T> {
    /// Create an empty result ranked by ascending distance
    #[must_use]
    pub fn by_distance(total_relevant: usize) -> Self {
        Self {
            items: Vec::new(),
            total_relevant,
            ordering: Some(OrderingRule::ByDistance),
            resolved: false,
        }
    }

    /// Sort by the ordering rule unless the order is already resolved
    pub fn resolve_order(&mut self) {
        if self.resolved {
            return;
        }

        match &self.ordering {
            Some(OrderingRule::ByDistance) => self
                .items
                .sort_by(|a, b| a.distance().total_cmp(&b.distance())),
            Some(OrderingRule::Custom(rule)) => self.items.sort_by(|a, b| rule(a, b)),
            None => {}
        }
        self.resolved = true;

        trace!(
            len = self.items.len(),
            rule = self.ordering.is_some(),
            "resolved ranking order"
        );
    }

    /// Resolve the order and return the rank view
    pub fn ranking(&mut self) -> Ranking<'_, T> {
        self.resolve_order();
        Ranking::new(&self.items, self.total_relevant)
    }

    /// Number of relevant datapoints contained
    #[must_use]
    pub fn count_relevant_found(&self) -> usize {
        self.unordered().count_relevant_found()
    }

    /// See [`Ranking::precision`]
    #[must_use]
    pub fn precision(&self) -> f64 {
        self.unordered().precision()
    }

    /// See [`Ranking::recall`]
    #[must_use]
    pub fn recall(&self) -> f64 {
        self.unordered().recall()
    }

    /// See [`Ranking::f_measure`]
    #[must_use]
    pub fn f_measure(&self, beta: f64) -> f64 {
        self.unordered().f_measure(beta)
    }

    // Only for measures that ignore positions.
    fn unordered(&self) -> Ranking<'_, T> {
        Ranking::new(&self.items, self.total_relevant)
    }
}

impl<T: Clone> Clone for RankedResult<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            total_relevant: self.total_relevant,
            ordering: self.ordering.clone(),
            resolved: self.resolved,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RankedResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = match self.ordering {
            None => "insertion",
            Some(OrderingRule::ByDistance) => "distance",
            Some(OrderingRule::Custom(_)) => "custom",
        };
        f.debug_struct("RankedResult")
            .field("items", &self.items)
            .field("total_relevant", &self.total_relevant)
            .field("ordering", &rule)
            .field("resolved", &self.resolved)
            .finish()
    }
}

impl<T> Extend<T> for RankedResult<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
        self.resolved = self.ordering.is_none();
    }
}

impl<'r, T> IntoIterator for &'r RankedResult<T> {
    type Item = &'r T;
    type IntoIter = std::slice::Iter<'r, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Read-only view of datapoints in rank order
///
/// Windows of a ranking share its `total_relevant` and are already in
/// rank order.
#[derive(Debug)]
pub struct Ranking<'a, T> {
    items: &'a [T],
    total_relevant: usize,
}

impl<T> Clone for Ranking<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ranking<'_, T> {}

impl<'a, T> IntoIterator for Ranking<'a, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, T> Ranking<'a, T> {
    /// View over datapoints that are already in rank order
    #[must_use]
    pub fn new(items: &'a [T], total_relevant: usize) -> Self {
        Self {
            items,
            total_relevant,
        }
    }

    /// Number of ranked datapoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the ranking is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ground-truth number of relevant items for the query
    #[must_use]
    pub fn total_relevant(&self) -> usize {
        self.total_relevant
    }

    /// Datapoints in rank order
    #[must_use]
    pub fn as_slice(&self) -> &'a [T] {
        self.items
    }

    /// Datapoint at rank `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a T> {
        self.items.get(index)
    }

    /// Datapoints in rank order
    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        self.items.iter()
    }

    /// Ranks `from` (inclusive) to `to` (exclusive) as a ranking of their own
    pub fn window(&self, from: usize, to: usize) -> Result<Self> {
        let len = self.items.len();
        if from > to || to > len {
            return Err(Error::WindowOutOfRange { from, to, len });
        }
        Ok(Self::new(&self.items[from..to], self.total_relevant))
    }
}

impl<'a, T: Datapoint> Ranking<'a, T> {
    /// Rank of the first datapoint equal to `item`
    #[must_use]
    pub fn rank(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|d| d == item)
    }

    /// Number of relevant datapoints contained
    #[must_use]
    pub fn count_relevant_found(&self) -> usize {
        self.items.iter().filter(|d| d.is_relevant()).count()
    }

    /// Fraction of datapoints that are relevant
    ///
    /// 1 when there is nothing to find or nothing was returned.
    #[must_use]
    pub fn precision(&self) -> f64 {
        if self.total_relevant == 0 || self.items.is_empty() {
            return 1.0;
        }
        self.count_relevant_found() as f64 / self.items.len() as f64
    }

    /// Precision over the first `k` ranks
    pub fn precision_at_k(&self, k: usize) -> Result<f64> {
        let size = self.items.len();
        if k > size {
            return Err(Error::CutoffOutOfRange { k, size });
        }
        if k == size {
            return Ok(self.precision());
        }
        Ok(self.window(0, k)?.precision())
    }

    /// Precision at the rank equal to the ground-truth relevant count
    pub fn r_precision(&self) -> Result<f64> {
        self.precision_at_k(self.total_relevant)
    }

    /// Sum of the precisions at each relevant rank, over `total_relevant`
    ///
    /// 1 for an empty ranking and for a query without relevant items.
    #[must_use]
    pub fn avg_precision(&self) -> f64 {
        if self.items.is_empty() || self.total_relevant == 0 {
            return 1.0;
        }

        let mut found = 0usize;
        let mut sum_precision = 0.0;
        for (rank, d) in self.items.iter().enumerate() {
            if d.is_relevant() {
                found += 1;
                sum_precision += found as f64 / (rank + 1) as f64;
            }
        }

        sum_precision / self.total_relevant as f64
    }

    /// Precision at the first rank whose running recall reaches `recall`
    ///
    /// 0 if the recall level is never reached.
    pub fn precision_at_recall(&self, recall: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&recall) {
            return Err(Error::InvalidArgument(format!(
                "recall must be within [0, 1], is {recall}"
            )));
        }
        if recall == 0.0 || self.items.is_empty() || self.total_relevant == 0 {
            return Ok(1.0);
        }

        let total = self.total_relevant as f64;
        let mut found = 0usize;
        for (rank, d) in self.items.iter().enumerate() {
            if d.is_relevant() {
                found += 1;
            }
            if found as f64 / total >= recall {
                return Ok(found as f64 / (rank + 1) as f64);
            }
        }

        Ok(0.0)
    }

    /// Fraction of the ground-truth relevant items that were returned
    ///
    /// 0 for an empty ranking; otherwise 1 for a query without relevant
    /// items.
    #[must_use]
    pub fn recall(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        if self.total_relevant == 0 {
            return 1.0;
        }
        self.count_relevant_found() as f64 / self.total_relevant as f64
    }

    /// F-measure `(1 + β)·P·R / (β·P + R)`
    ///
    /// 0 when both precision and recall are 0.
    #[must_use]
    pub fn f_measure(&self, beta: f64) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        let denominator = beta * precision + recall;

        if denominator == 0.0 {
            0.0
        } else {
            (1.0 + beta) * (precision * recall) / denominator
        }
    }

    /// Harmonic mean of precision and recall
    #[must_use]
    pub fn f1(&self) -> f64 {
        self.f_measure(1.0)
    }

    /// Distance of the best ranked datapoint
    pub fn d_min(&self) -> Result<f64> {
        self.items
            .first()
            .map(Datapoint::distance)
            .ok_or_else(|| Error::empty("d_min"))
    }

    /// Distance of the datapoint at rank `len / 2`
    pub fn d_med(&self) -> Result<f64> {
        self.items
            .get(self.items.len() / 2)
            .map(Datapoint::distance)
            .ok_or_else(|| Error::empty("d_med"))
    }

    /// Distance of the worst ranked datapoint
    pub fn d_max(&self) -> Result<f64> {
        self.items
            .last()
            .map(Datapoint::distance)
            .ok_or_else(|| Error::empty("d_max"))
    }

    fn check_ordering(&self) -> Result<()> {
        if self.items.is_empty() {
            return Ok(());
        }
        let (min, max) = (self.d_min()?, self.d_max()?);
        if max < min {
            return Err(Error::InconsistentOrdering { min, max });
        }
        Ok(())
    }

    /// Zero-width intervals, including the empty ranking, yield `None`
    fn distance_interval(&self) -> Result<Option<f64>> {
        self.check_ordering()?;
        if self.items.is_empty() {
            return Ok(None);
        }
        let interval = self.d_max()? - self.d_min()?;
        Ok((interval > 0.0).then_some(interval))
    }

    /// How much better the best match is than the median match, `1 - dMin/dMed`
    ///
    /// 0 below two datapoints or when the median distance is 0.
    pub fn confidence_first(&self) -> Result<f64> {
        self.check_ordering()?;
        if self.items.len() < 2 {
            return Ok(0.0);
        }

        let d_med = self.d_med()?;
        if d_med == 0.0 {
            return Ok(0.0);
        }
        Ok(1.0 - self.d_min()? / d_med)
    }

    /// How much better the superior half is than the inferior one
    ///
    /// Splits at `k = len / 2` into ranks `[0, k + 1)` and `[k + 1, len)`
    /// and compares their median distances. A two-element ranking leaves
    /// the inferior window empty and fails with
    /// [`Error::InsufficientSamples`].
    pub fn confidence_most(&self) -> Result<f64> {
        self.check_ordering()?;
        let len = self.items.len();
        if len < 2 {
            return Ok(0.0);
        }

        let k = len / 2;
        let superior = self.window(0, k + 1)?;
        let inferior = self.window(k + 1, len)?;

        let inferior_med = inferior.d_med()?;
        if inferior_med == 0.0 {
            return Ok(0.0);
        }
        Ok(1.0 - superior.d_med()? / inferior_med)
    }

    /// Position of the median distance within the distance interval
    pub fn discrimination_most(&self) -> Result<f64> {
        let Some(interval) = self.distance_interval()? else {
            return Ok(0.0);
        };
        Ok((self.d_med()? - self.d_min()?) / interval)
    }

    /// How evenly the distances spread over the distance interval
    ///
    /// 1 when all adjacent ranks are equally far apart.
    pub fn discrimination_all(&self) -> Result<f64> {
        let Some(interval) = self.distance_interval()? else {
            return Ok(0.0);
        };

        let even_step = interval / (self.items.len() - 1) as f64;
        let deviation: f64 = self
            .items
            .windows(2)
            .map(|pair| ((pair[0].distance() - pair[1].distance()).abs() - even_step).abs())
            .sum();

        Ok(1.0 - deviation / (2.0 * interval))
    }

    /// Mutual agreement of this and `others` on the ranks of shared datapoints
    ///
    /// Sums `|rank_a - rank_b|` over every pair of rankings and every
    /// datapoint of this ranking, normalized by the largest possible sum.
    /// All rankings must hold the same datapoints; one missing from a
    /// compared ranking fails with [`Error::MissingDatapoint`].
    pub fn rank_agreement(&self, others: &[Ranking<'a, T>]) -> Result<f64> {
        let rankings: Vec<&Ranking<'a, T>> = others.iter().chain(std::iter::once(self)).collect();
        let n = self.items.len();

        let mut score = 0usize;
        for (u, first) in rankings.iter().enumerate() {
            for second in &rankings[u + 1..] {
                for (position, d) in self.items.iter().enumerate() {
                    let missing = || Error::MissingDatapoint { position };
                    let ru = first.rank(d).ok_or_else(missing)?;
                    let rv = second.rank(d).ok_or_else(missing)?;
                    score += ru.abs_diff(rv);
                }
            }
        }

        let pairs = binomial_coefficient(rankings.len() as u64, 2) as f64;
        let parity = if n % 2 == 0 { 0.0 } else { -2.0 };
        let denominator = pairs * 0.25 * (2.0 * (n * n) as f64 + parity);

        // Fewer than two rankings or datapoints cannot disagree.
        if denominator == 0.0 {
            return Ok(1.0);
        }

        let agreement = 1.0 - score as f64 / denominator;
        debug!(
            rankings = rankings.len(),
            size = n,
            score,
            agreement,
            "computed rank agreement"
        );
        Ok(agreement)
    }

    /// Rank agreement with a single other ranking
    pub fn rank_agreement_with(&self, other: &Ranking<'a, T>) -> Result<f64> {
        self.rank_agreement(std::slice::from_ref(other))
    }

    /// Share of common datapoints among the top `k` of both rankings
    ///
    /// The count is divided by `k` even when either ranking is shorter.
    pub fn overlap(&self, other: &Ranking<'_, T>, k: usize) -> Result<f64> {
        if k == 0 {
            return Err(Error::InvalidArgument(
                "overlap requires k > 0".to_string(),
            ));
        }

        let top = k.min(self.items.len()).min(other.items.len());
        let ours = &self.items[..top];
        let theirs = &other.items[..top];

        let common = ours
            .iter()
            .map(|a| theirs.iter().filter(|b| a == *b).count())
            .sum::<usize>();

        Ok(common as f64 / k as f64)
    }
}

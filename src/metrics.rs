//! Per-query metric snapshots and their aggregation over many queries

use crate::{
    AggregateSeries, Datapoint, Error, EvaluationConfig, RankedResult, Ranking, Result, Summary,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Evaluation measures of a single query's ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMetrics {
    /// Precision over the whole ranking
    pub precision: f64,
    /// Recall over the whole ranking
    pub recall: f64,
    /// F-measure with the configured beta
    pub f_measure: f64,
    /// Average precision
    pub avg_precision: f64,
    /// R-precision, absent when more items are relevant than were returned
    pub r_precision: Option<f64>,
    /// Precision@k for the configured cutoffs that fit the ranking
    pub precision_at_k: BTreeMap<usize, f64>,
    /// (recall level, precision) for the configured recall levels
    pub precision_at_recall: Vec<(f64, f64)>,
    /// Confidence of the best match
    pub confidence_first: f64,
    /// Confidence of the superior half, absent when undefined
    pub confidence_most: Option<f64>,
    /// Discrimination of the superior half
    pub discrimination_most: f64,
    /// Evenness of the distance spread
    pub discrimination_all: f64,
}

impl QueryMetrics {
    /// Compute all measures for one ranking
    pub fn compute<T: Datapoint>(ranking: &Ranking<'_, T>, config: &EvaluationConfig) -> Result<Self> {
        config.validate()?;

        let r_precision = if ranking.total_relevant() <= ranking.len() {
            Some(ranking.r_precision()?)
        } else {
            debug!(
                total_relevant = ranking.total_relevant(),
                len = ranking.len(),
                "r-precision undefined for query"
            );
            None
        };

        let precision_at_k = config
            .cutoffs
            .iter()
            .filter(|&&k| k <= ranking.len())
            .map(|&k| ranking.precision_at_k(k).map(|p| (k, p)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        let precision_at_recall = config
            .recall_levels
            .iter()
            .map(|&level| ranking.precision_at_recall(level).map(|p| (level, p)))
            .collect::<Result<Vec<_>>>()?;

        let confidence_most = match ranking.confidence_most() {
            Ok(value) => Some(value),
            Err(Error::InsufficientSamples { .. }) => {
                debug!(len = ranking.len(), "confidence_most undefined for query");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            precision: ranking.precision(),
            recall: ranking.recall(),
            f_measure: ranking.f_measure(config.beta),
            avg_precision: ranking.avg_precision(),
            r_precision,
            precision_at_k,
            precision_at_recall,
            confidence_first: ranking.confidence_first()?,
            confidence_most,
            discrimination_most: ranking.discrimination_most()?,
            discrimination_all: ranking.discrimination_all()?,
        })
    }
}

/// Measures of one search technique collected over many queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    /// Precision per query
    pub precision: AggregateSeries<f64>,
    /// Recall per query
    pub recall: AggregateSeries<f64>,
    /// F-measure per query
    pub f_measure: AggregateSeries<f64>,
    /// Average precision per query
    pub avg_precision: AggregateSeries<f64>,
    /// R-precision of the queries where it is defined
    pub r_precision: AggregateSeries<f64>,
    /// Precision@k per cutoff
    pub precision_at_k: BTreeMap<usize, AggregateSeries<f64>>,
    /// Precision per recall level, in configured order
    pub precision_at_recall: Vec<(f64, AggregateSeries<f64>)>,
    /// Confidence of the best match per query
    pub confidence_first: AggregateSeries<f64>,
    /// Confidence of the superior half where defined
    pub confidence_most: AggregateSeries<f64>,
    /// Discrimination of the superior half per query
    pub discrimination_most: AggregateSeries<f64>,
    /// Evenness of the distance spread per query
    pub discrimination_all: AggregateSeries<f64>,
    /// Number of queries
    pub query_count: usize,
}

impl AggregatedMetrics {
    /// Aggregate snapshots from multiple queries
    #[must_use]
    pub fn aggregate(metrics: &[QueryMetrics]) -> Self {
        let mut agg = Self {
            query_count: metrics.len(),
            ..Default::default()
        };

        for m in metrics {
            agg.precision.push(m.precision);
            agg.recall.push(m.recall);
            agg.f_measure.push(m.f_measure);
            agg.avg_precision.push(m.avg_precision);
            agg.r_precision.extend(m.r_precision);
            agg.confidence_first.push(m.confidence_first);
            agg.confidence_most.extend(m.confidence_most);
            agg.discrimination_most.push(m.discrimination_most);
            agg.discrimination_all.push(m.discrimination_all);

            for (&k, &value) in &m.precision_at_k {
                agg.precision_at_k.entry(k).or_default().push(value);
            }

            for &(level, value) in &m.precision_at_recall {
                match agg
                    .precision_at_recall
                    .iter_mut()
                    .find(|(known, _)| *known == level)
                {
                    Some((_, series)) => series.push(value),
                    None => agg
                        .precision_at_recall
                        .push((level, std::iter::once(value).collect())),
                }
            }
        }

        debug!(query_count = agg.query_count, "aggregated query metrics");
        agg
    }

    /// Compute and aggregate the measures of every result
    pub fn evaluate<T: Datapoint>(
        results: &mut [RankedResult<T>],
        config: &EvaluationConfig,
    ) -> Result<Self> {
        let metrics = results
            .iter_mut()
            .map(|result| QueryMetrics::compute(&result.ranking(), config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::aggregate(&metrics))
    }

    /// Mean of the per-query average precisions (MAP)
    pub fn mean_average_precision(&self) -> Result<f64> {
        self.avg_precision.avg()
    }

    /// [`summaries`](Self::summaries) rounded to the configured report precision
    pub fn summaries_with(&self, config: &EvaluationConfig) -> Result<BTreeMap<String, Summary>> {
        self.summaries(config.report_precision)
    }

    /// Rounded summary of every non-empty series, keyed by measure name
    pub fn summaries(&self, precision: u32) -> Result<BTreeMap<String, Summary>> {
        let mut named: Vec<(String, &AggregateSeries<f64>)> = vec![
            ("precision".to_string(), &self.precision),
            ("recall".to_string(), &self.recall),
            ("f_measure".to_string(), &self.f_measure),
            ("avg_precision".to_string(), &self.avg_precision),
            ("r_precision".to_string(), &self.r_precision),
            ("confidence_first".to_string(), &self.confidence_first),
            ("confidence_most".to_string(), &self.confidence_most),
            ("discrimination_most".to_string(), &self.discrimination_most),
            ("discrimination_all".to_string(), &self.discrimination_all),
        ];
        named.extend(
            self.precision_at_k
                .iter()
                .map(|(k, series)| (format!("precision@{k}"), series)),
        );
        named.extend(
            self.precision_at_recall
                .iter()
                .map(|(level, series)| (format!("precision@recall={level}"), series)),
        );

        named
            .into_iter()
            .filter(|(_, series)| !series.is_empty())
            .map(|(name, series)| series.summary(precision).map(|s| (name, s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Match};

    fn result(total_relevant: usize, points: &[(f64, bool)]) -> RankedResult<Match> {
        let mut result = RankedResult::by_distance(total_relevant);
        result.extend(
            points
                .iter()
                .enumerate()
                .map(|(i, &(d, r))| Match::new("q", format!("c{i}"), d, r)),
        );
        result
    }

    fn config() -> EvaluationConfig {
        EvaluationConfig::default()
            .with_cutoffs([1, 3, 10])
            .with_recall_levels([0.5, 1.0])
    }

    // ============ Query Metrics Tests ============

    #[test]
    fn test_compute_query_metrics() {
        let mut r = result(
            2,
            &[(0.1, true), (0.2, false), (0.3, true), (0.4, false), (0.5, false)],
        );
        let metrics = QueryMetrics::compute(&r.ranking(), &config()).unwrap();

        assert!((metrics.precision - 0.4).abs() < 1e-9);
        assert!((metrics.recall - 1.0).abs() < 1e-9);
        assert!((metrics.avg_precision - (1.0 + 2.0 / 3.0) / 2.0).abs() < 1e-9);
        assert!((metrics.r_precision.unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(metrics.precision_at_k.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert!((metrics.precision_at_k[&3] - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.precision_at_recall.len(), 2);
        assert!((metrics.precision_at_recall[1].1 - 2.0 / 3.0).abs() < 1e-9);
        assert!(metrics.confidence_most.is_some());
    }

    #[test]
    fn test_compute_skips_undefined_measures() {
        let mut r = result(5, &[(0.1, true), (0.2, false)]);
        let metrics = QueryMetrics::compute(&r.ranking(), &config()).unwrap();

        assert!(metrics.r_precision.is_none());
        assert!(metrics.confidence_most.is_none());
        assert!((metrics.confidence_first - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_compute_uses_configured_beta() {
        let mut r = result(4, &[(0.1, true), (0.2, false)]);
        let ranking = r.ranking();
        let metrics =
            QueryMetrics::compute(&ranking, &EvaluationConfig::default().with_beta(0.5)).unwrap();
        assert!((metrics.f_measure - ranking.f_measure(0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_compute_propagates_inconsistent_ordering() {
        let mut r = RankedResult::with_ordering(1, |a: &Match, b: &Match| {
            b.distance.total_cmp(&a.distance)
        });
        r.extend([Match::relevant("q", "a", 0.1), Match::irrelevant("q", "b", 0.9)]);

        let err = QueryMetrics::compute(&r.ranking(), &config()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_compute_rejects_invalid_config() {
        let mut r = result(1, &[(0.1, true)]);
        let bad = EvaluationConfig::default().with_beta(-2.0);
        assert!(QueryMetrics::compute(&r.ranking(), &bad).is_err());
    }

    #[test]
    fn test_evaluate_rejects_repeated_recall_level() {
        let mut results = vec![result(1, &[(0.1, true), (0.2, false)])];
        let cfg = config().with_recall_levels([0.5, 0.5]);

        let err = AggregatedMetrics::evaluate(&mut results, &cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_repeated_cutoffs_sampled_once() {
        let mut results = vec![result(1, &[(0.1, true), (0.2, false)])];
        let cfg = config().with_cutoffs([1, 1]);

        let agg = AggregatedMetrics::evaluate(&mut results, &cfg).unwrap();
        assert_eq!(agg.query_count, 1);
        assert_eq!(agg.precision_at_k[&1].len(), 1);
        assert!(agg.precision_at_recall.iter().all(|(_, s)| s.len() == 1));
    }

    #[test]
    fn test_query_metrics_serialization() {
        let mut r = result(1, &[(0.1, true), (0.3, false), (0.4, false)]);
        let metrics = QueryMetrics::compute(&r.ranking(), &config()).unwrap();
        let json = serde_json::to_string(&metrics).unwrap();
        let back: QueryMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(metrics, back);
    }

    // ============ Aggregation Tests ============

    #[test]
    fn test_aggregate_empty() {
        let agg = AggregatedMetrics::aggregate(&[]);
        assert_eq!(agg.query_count, 0);
        assert!(agg.mean_average_precision().is_err());
        assert!(agg.summaries(3).unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_multiple() {
        let mut perfect = result(2, &[(0.1, true), (0.2, true), (0.3, false)]);
        let mut half = result(2, &[(0.1, false), (0.2, true), (0.3, false)]);
        let cfg = config();

        let metrics = vec![
            QueryMetrics::compute(&perfect.ranking(), &cfg).unwrap(),
            QueryMetrics::compute(&half.ranking(), &cfg).unwrap(),
        ];
        let agg = AggregatedMetrics::aggregate(&metrics);

        assert_eq!(agg.query_count, 2);
        assert_eq!(agg.precision.len(), 2);
        // AP: 1.0 and (1/2) / 2
        assert!((agg.mean_average_precision().unwrap() - 0.625).abs() < 1e-9);
        assert_eq!(agg.precision_at_k[&1].as_slice(), &[1.0, 0.0]);
        assert_eq!(agg.precision_at_recall.len(), 2);
        assert_eq!(agg.precision_at_recall[0].1.len(), 2);
    }

    #[test]
    fn test_aggregate_optional_measures() {
        let mut short = result(3, &[(0.1, true), (0.2, false)]);
        let mut long = result(1, &[(0.1, true), (0.2, false), (0.4, false)]);
        let cfg = config();

        let agg = AggregatedMetrics::aggregate(&[
            QueryMetrics::compute(&short.ranking(), &cfg).unwrap(),
            QueryMetrics::compute(&long.ranking(), &cfg).unwrap(),
        ]);

        assert_eq!(agg.r_precision.len(), 1);
        assert_eq!(agg.confidence_most.len(), 1);
        assert_eq!(agg.confidence_first.len(), 2);
    }

    #[test]
    fn test_evaluate_results() {
        let mut results = vec![
            result(1, &[(0.4, false), (0.1, true), (0.9, false)]),
            result(2, &[(0.2, true), (0.3, true), (0.5, false), (0.8, false)]),
        ];
        let agg = AggregatedMetrics::evaluate(&mut results, &config()).unwrap();

        assert_eq!(agg.query_count, 2);
        assert!((agg.mean_average_precision().unwrap() - 1.0).abs() < 1e-9);
        assert!(results.iter().all(RankedResult::is_order_resolved));
    }

    #[test]
    fn test_summaries() {
        let mut results = vec![
            result(1, &[(0.1, true), (0.3, false), (0.6, false)]),
            result(1, &[(0.2, false), (0.4, true), (0.7, false)]),
        ];
        let agg = AggregatedMetrics::evaluate(&mut results, &config()).unwrap();
        let summaries = agg.summaries(3).unwrap();

        assert!(summaries.contains_key("precision"));
        assert!(summaries.contains_key("precision@1"));
        assert!(summaries.contains_key("precision@recall=0.5"));
        assert!(!summaries.contains_key("precision@10"));

        let ap = &summaries["avg_precision"];
        assert_eq!(ap.size, 2);
        assert!((ap.min - 0.5).abs() < 1e-9);
        assert!((ap.max - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_summaries_with_uses_report_precision() {
        let mut results = vec![
            result(3, &[(0.1, true), (0.3, false), (0.6, true)]),
            result(3, &[(0.2, true), (0.4, true), (0.7, false)]),
        ];
        let cfg = config().with_report_precision(2);
        let agg = AggregatedMetrics::evaluate(&mut results, &cfg).unwrap();

        let summaries = agg.summaries_with(&cfg).unwrap();
        assert_eq!(summaries, agg.summaries(2).unwrap());
        // precision 2/3 per query, rounded to two places
        assert_eq!(summaries["precision"].avg, 0.67);
        assert_ne!(summaries, agg.summaries(4).unwrap());
    }
}

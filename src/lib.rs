//! Search-Eval: Evaluation Measures for Ranked Similarity Search Results
//!
//! This crate scores the ranked result list of a similarity search against
//! ground-truth relevance judgments and aggregates the scores of many
//! queries into descriptive statistics.
//!
//! # Quick Start
//!
//! ```rust
//! use search_eval::{Match, RankedResult};
//!
//! // Three relevant candidates exist for the query
//! let mut result = RankedResult::by_distance(3);
//! result.push(Match::relevant("q1", "m1", 0.10));
//! result.push(Match::irrelevant("q1", "m7", 0.35));
//! result.push(Match::relevant("q1", "m2", 0.20));
//! result.push(Match::irrelevant("q1", "m9", 0.80));
//!
//! // Order-independent measures
//! assert!((result.precision() - 0.5).abs() < 1e-12);
//! assert!((result.recall() - 2.0 / 3.0).abs() < 1e-12);
//!
//! // Rank-sensitive measures are read from the resolved ranking
//! let ranking = result.ranking();
//! assert_eq!(ranking.get(1).map(|m| m.candidate.as_str()), Some("m2"));
//! assert!((ranking.avg_precision() - 2.0 / 3.0).abs() < 1e-12);
//! ```
//!
//! # Measures
//!
//! Relevance based:
//!
//! - [`Ranking::precision`], [`Ranking::recall`], [`Ranking::f_measure`]
//! - [`Ranking::precision_at_k`], [`Ranking::r_precision`]
//! - [`Ranking::avg_precision`], [`Ranking::precision_at_recall`]
//!
//! Distance based, no ground truth needed:
//!
//! - [`Ranking::confidence_first`], [`Ranking::confidence_most`]
//! - [`Ranking::discrimination_most`], [`Ranking::discrimination_all`]
//!
//! Comparing techniques on the same query:
//!
//! - [`Ranking::rank_agreement`] - Normalized rank displacement
//! - [`Ranking::overlap`] - Shared top-k datapoints
//!
//! # Example: Aggregating Many Queries
//!
//! ```rust
//! use search_eval::{AggregatedMetrics, EvaluationConfig, Match, RankedResult};
//!
//! let mut results = vec![
//!     RankedResult::from_ranked(1, [Match::relevant("q1", "a", 0.1), Match::irrelevant("q1", "b", 0.4)]),
//!     RankedResult::from_ranked(1, [Match::irrelevant("q2", "c", 0.2), Match::relevant("q2", "d", 0.3)]),
//! ];
//!
//! let config = EvaluationConfig::default().with_cutoffs([1, 2]);
//! let metrics = AggregatedMetrics::evaluate(&mut results, &config).unwrap();
//! assert_eq!(metrics.query_count, 2);
//! assert!((metrics.mean_average_precision().unwrap() - 0.75).abs() < 1e-12);
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod aggregate;
pub mod combinatorics;
pub mod config;
pub mod datapoint;
pub mod error;
pub mod metrics;
pub mod ranking;

pub use aggregate::{round, round_to, AggregateSeries, Numeric, Summary};
pub use combinatorics::binomial_coefficient;
pub use config::EvaluationConfig;
pub use datapoint::{Datapoint, Match};
pub use error::{Error, ErrorKind, Result};
pub use metrics::{AggregatedMetrics, QueryMetrics};
pub use ranking::{Comparator, RankedResult, Ranking};

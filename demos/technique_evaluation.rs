//! Search Technique Evaluation Example
//!
//! Run with: cargo run --example technique_evaluation

use search_eval::{AggregatedMetrics, EvaluationConfig, Match, RankedResult};

/// (query, candidate, distance, relevant)
type Scored = (&'static str, &'static str, f64, bool);

const SCORED: &[Scored] = &[
    ("q1", "m1", 0.05, true),
    ("q1", "m2", 0.20, true),
    ("q1", "m3", 0.45, false),
    ("q1", "m4", 0.60, true),
    ("q1", "m5", 0.90, false),
    ("q2", "m6", 0.10, false),
    ("q2", "m7", 0.15, true),
    ("q2", "m8", 0.50, false),
    ("q2", "m9", 0.70, true),
];

/// Ground-truth relevant counts per query
const RELEVANT: &[(&str, usize)] = &[("q1", 4), ("q2", 2)];

fn results_of(reorder: bool) -> Vec<RankedResult<Match>> {
    RELEVANT
        .iter()
        .map(|&(query, total_relevant)| {
            let mut result = if reorder {
                // Prefer relevant judgments, then distance
                RankedResult::with_ordering(total_relevant, |a: &Match, b: &Match| {
                    b.relevant
                        .cmp(&a.relevant)
                        .then(a.distance.total_cmp(&b.distance))
                })
            } else {
                RankedResult::by_distance(total_relevant)
            };
            result.extend(
                SCORED
                    .iter()
                    .filter(|(q, ..)| *q == query)
                    .map(|&(q, c, d, r)| Match::new(q, c, d, r)),
            );
            result
        })
        .collect()
}

fn main() -> search_eval::Result<()> {
    println!("=== Search Technique Evaluation ===\n");

    let config = EvaluationConfig::default().with_cutoffs([1, 3]);
    config.validate()?;

    let mut by_distance = results_of(false);
    let mut relevance_first = results_of(true);

    for (name, results) in [
        ("distance", &mut by_distance),
        ("relevance-first", &mut relevance_first),
    ] {
        let metrics = AggregatedMetrics::evaluate(results, &config)?;

        println!("--- Technique: {name} ({} queries) ---", metrics.query_count);
        println!("MAP: {:.4}", metrics.mean_average_precision()?);

        for (measure, summary) in metrics.summaries_with(&config)? {
            println!("{measure}: avg {} median {}", summary.avg, summary.median);
        }
        println!();
    }

    println!("=== Technique Comparison per Query ===\n");

    for (a, b) in by_distance.iter_mut().zip(relevance_first.iter_mut()) {
        let (a, b) = (a.ranking(), b.ranking());
        let query = a.get(0).map_or("?", |m| m.query.as_str());

        println!(
            "{query}: rank agreement {:.3}, overlap@3 {:.3}",
            a.rank_agreement_with(&b)?,
            a.overlap(&b, 3)?
        );
    }

    println!();
    println!("=== Full Summary of Average Precision (distance) ===\n");

    let metrics = AggregatedMetrics::evaluate(&mut by_distance, &config)?;
    println!("{}", metrics.avg_precision.summary(config.report_precision)?);

    Ok(())
}

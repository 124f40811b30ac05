//! Combinatorial helpers

/// Number of ways to choose `k` elements out of `n`
///
/// Evaluated multiplicatively over the larger of `k` and `n - k`, so the
/// intermediate products stay exact for the small arguments used when
/// normalizing rank agreement. Returns 0 when `k > n`.
#[must_use]
pub fn binomial_coefficient(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }

    let k = k.max(n - k);
    let mut bin: u64 = 1;
    for (j, i) in ((k + 1)..=n).rev().enumerate() {
        bin = bin * i / (j as u64 + 1);
    }
    bin
}

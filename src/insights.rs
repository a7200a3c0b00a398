use rand::Rng;

/// Lowest score `analyze` can produce.
pub const SCORE_MIN: u8 = 70;
/// Highest score `analyze` can produce.
pub const SCORE_MAX: u8 = 100;

/// Aggregate lap statistics plus a simulated productivity score.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductivityReport {
    /// Sum of all lap durations, in seconds.
    pub total_time: f64,
    /// Mean lap duration, in seconds.
    pub average_lap: f64,
    /// Uniform random integer in `[SCORE_MIN, SCORE_MAX]`. Purely
    /// illustrative — it is not derived from the lap data, and two calls on
    /// identical laps will usually disagree.
    pub score: u8,
}

/// Compute a report over the recorded laps. Returns `None` when there is no
/// lap data to analyze.
pub fn analyze(laps: &[f64]) -> Option<ProductivityReport> {
    if laps.is_empty() {
        return None;
    }
    let total_time: f64 = laps.iter().sum();
    let average_lap = total_time / laps.len() as f64;
    let score = rand::thread_rng().gen_range(SCORE_MIN..=SCORE_MAX);
    Some(ProductivityReport {
        total_time,
        average_lap,
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_laps_yield_no_report() {
        assert_eq!(analyze(&[]), None);
    }

    #[test]
    fn totals_and_average_are_computed() {
        let report = analyze(&[1.0, 2.0, 6.0]).unwrap();
        assert!((report.total_time - 9.0).abs() < 1e-9);
        assert!((report.average_lap - 3.0).abs() < 1e-9);
    }

    #[test]
    fn score_stays_within_bounds() {
        for _ in 0..200 {
            let report = analyze(&[2.5]).unwrap();
            assert!((SCORE_MIN..=SCORE_MAX).contains(&report.score));
        }
    }

    #[test]
    fn single_lap_average_equals_total() {
        let report = analyze(&[4.2]).unwrap();
        assert!((report.total_time - report.average_lap).abs() < 1e-9);
    }
}

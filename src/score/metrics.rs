//! Per-round figures derived from a raw per-hole score array.
//!
//! A score holds one entry per hole: a positive stroke count, `0` for a hole
//! not yet reported, or `-1` for a hole the player picked up on. Picked-up
//! holes count as played but add nothing to the stroke or par totals. Every
//! function here is total: scores and pars of different lengths are compared
//! up to the shorter of the two.

/// Number of holes with anything reported, picked-up holes included.
#[must_use]
pub fn holes_played(score: &[i32]) -> usize {
    score.iter().filter(|&&s| s != 0).count()
}

/// Strokes over every hole with a positive entry.
#[must_use]
pub fn gross_score(score: &[i32]) -> i32 {
    score.iter().filter(|&&s| s > 0).sum()
}

/// Strokes minus par over the holes with a positive entry.
#[must_use]
pub fn relative_to_par(score: &[i32], pars: &[i32]) -> i32 {
    score
        .iter()
        .zip(pars)
        .filter(|&(&s, _)| s > 0)
        .map(|(&s, &par)| s - par)
        .sum()
}

/// The three figures together, as the leaderboard consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundMetrics {
    pub holes_played: usize,
    pub gross_total: i32,
    pub relative_to_par: i32,
}

impl RoundMetrics {
    #[must_use]
    pub fn from_score(score: &[i32], pars: &[i32]) -> Self {
        let len = score.len().min(pars.len());
        let score = &score[..len];
        Self {
            holes_played: holes_played(score),
            gross_total: gross_score(score),
            relative_to_par: relative_to_par(score, pars),
        }
    }

    /// A hand-entered total stands in for the whole round.
    #[must_use]
    pub fn from_manual_total(manual_total: i32, pars: &[i32]) -> Self {
        Self {
            holes_played: pars.len(),
            gross_total: manual_total,
            relative_to_par: manual_total - pars.iter().sum::<i32>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARS: [i32; 18] = [4, 4, 3, 5, 4, 4, 3, 4, 5, 4, 4, 3, 5, 4, 4, 3, 4, 5];

    #[test]
    fn sentinel_counts_as_played_but_adds_nothing() {
        let score = [5, -1, 3, 0, 0];
        assert_eq!(holes_played(&score), 3);
        assert_eq!(gross_score(&score), 8);
        assert_eq!(relative_to_par(&score, &PARS), 1);
    }

    #[test]
    fn all_zero_score_is_all_zero() {
        let score = [0; 18];
        assert_eq!(RoundMetrics::from_score(&score, &PARS), RoundMetrics::default());
        assert_eq!(RoundMetrics::from_score(&[], &PARS), RoundMetrics::default());
    }

    #[test]
    fn longer_score_truncates_to_pars() {
        let pars = [4, 3];
        let score = [5, 3, 7, 7];
        let m = RoundMetrics::from_score(&score, &pars);
        assert_eq!(m.holes_played, 2);
        assert_eq!(m.gross_total, 8);
        assert_eq!(m.relative_to_par, 1);
    }

    #[test]
    fn manual_total_covers_the_round() {
        let m = RoundMetrics::from_manual_total(80, &PARS);
        assert_eq!(m.holes_played, 18);
        assert_eq!(m.gross_total, 80);
        assert_eq!(m.relative_to_par, 80 - 72);
    }
}

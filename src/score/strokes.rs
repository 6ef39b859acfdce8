use tracing::debug;

use crate::config::HandicapConfig;
use crate::model::{Course, HOLES_PER_ROUND, Tee};

/// True when `stroke_index` ranks 18 holes 1..=18 with no repeats.
#[must_use]
pub fn is_valid_stroke_index(stroke_index: &[i32]) -> bool {
    if stroke_index.len() != HOLES_PER_ROUND {
        return false;
    }
    let mut seen = [false; HOLES_PER_ROUND];
    for &si in stroke_index {
        let Some(slot) = usize::try_from(si)
            .ok()
            .and_then(|si| si.checked_sub(1))
            .and_then(|i| seen.get_mut(i))
        else {
            return false;
        };
        if *slot {
            return false;
        }
        *slot = true;
    }
    true
}

/// Tee stroke index, then the course's, then the configured default. An
/// index that isn't a permutation of 1..=18 is skipped.
#[must_use]
pub fn resolve_stroke_index<'a>(
    tee: Option<&'a Tee>,
    course: &'a Course,
    config: &'a HandicapConfig,
) -> &'a [i32] {
    let candidates = [
        tee.and_then(|t| t.stroke_index.as_deref()),
        course.stroke_index.as_deref(),
    ];
    for candidate in candidates.into_iter().flatten() {
        if is_valid_stroke_index(candidate) {
            return candidate;
        }
        debug!(course_id = course.course_id, "ignoring invalid stroke index");
    }
    &config.default_stroke_index
}

/// Spread a course handicap over the holes by difficulty.
///
/// Every hole gets `|ch| / 18` strokes and the hardest `|ch| % 18` holes one
/// more, all carrying the sign of `ch`. Display only; the net total is
/// worked out from the round gross.
#[must_use]
pub fn allocate_strokes(course_handicap: i32, stroke_index: &[i32]) -> Vec<i32> {
    let sign = course_handicap.signum();
    let magnitude = course_handicap.unsigned_abs();
    let per_hole = magnitude / HOLES_PER_ROUND as u32;
    let extra = magnitude % HOLES_PER_ROUND as u32;

    stroke_index
        .iter()
        .map(|&si| {
            let bonus = u32::from(u32::try_from(si).is_ok_and(|si| si <= extra));
            sign * (per_hole + bonus) as i32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_STROKE_INDEX;

    #[test]
    fn twenty_strokes_gives_two_extra() {
        let strokes = allocate_strokes(20, &DEFAULT_STROKE_INDEX);
        assert_eq!(strokes.iter().sum::<i32>(), 20);
        // SI 1 is hole 1, SI 2 is hole 10
        assert_eq!(strokes[0], 2);
        assert_eq!(strokes[9], 2);
        assert_eq!(strokes[1], 1);
    }

    #[test]
    fn plus_handicap_gives_strokes_back() {
        let strokes = allocate_strokes(-3, &DEFAULT_STROKE_INDEX);
        assert_eq!(strokes.iter().sum::<i32>(), -3);
        assert_eq!(strokes[0], -1);
        assert_eq!(strokes[1], -1);
        assert_eq!(strokes[9], -1);
        assert_eq!(strokes[2], 0);
    }

    #[test]
    fn zero_handicap_gives_nothing() {
        assert!(allocate_strokes(0, &DEFAULT_STROKE_INDEX).iter().all(|&s| s == 0));
    }

    #[test]
    fn stroke_index_validation() {
        assert!(is_valid_stroke_index(&DEFAULT_STROKE_INDEX));
        let mut dup = DEFAULT_STROKE_INDEX;
        dup[0] = 3;
        assert!(!is_valid_stroke_index(&dup));
        assert!(!is_valid_stroke_index(&[1, 2, 3]));
        let mut zero = DEFAULT_STROKE_INDEX;
        zero[0] = 0;
        assert!(!is_valid_stroke_index(&zero));
    }
}

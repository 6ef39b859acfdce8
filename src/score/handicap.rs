//! Course handicap and net figures from a handicap index and the tee a
//! participant plays off.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::HandicapConfig;
use crate::model::{Gender, Tee};

/// Where a resolved rating came from, in fallback order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RatingSource {
    GenderRating,
    OnlyRating,
    TeeRating,
    Fallback,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ResolvedRating {
    pub course_rating: f64,
    pub slope_rating: i32,
    pub source: RatingSource,
}

#[derive(Debug, Clone, Copy)]
pub struct HandicapCalculator<'a> {
    config: &'a HandicapConfig,
}

impl<'a> HandicapCalculator<'a> {
    #[must_use]
    pub fn new(config: &'a HandicapConfig) -> Self {
        Self { config }
    }

    /// Pick the rating a participant plays off.
    ///
    /// A rating for the participant's gender wins; otherwise a tee with a
    /// single rating uses that one; otherwise the tee's own course/slope
    /// rating; otherwise the configured fallback, where the course rating
    /// defaults to `course_par` when one is known.
    #[must_use]
    pub fn rating(
        &self,
        tee: Option<&Tee>,
        gender: Option<Gender>,
        course_par: Option<i32>,
    ) -> ResolvedRating {
        if let Some(tee) = tee {
            if let Some(r) = gender.and_then(|g| tee.ratings.iter().find(|r| r.gender == g)) {
                return ResolvedRating {
                    course_rating: r.course_rating,
                    slope_rating: r.slope_rating,
                    source: RatingSource::GenderRating,
                };
            }
            if let [only] = tee.ratings.as_slice() {
                return ResolvedRating {
                    course_rating: only.course_rating,
                    slope_rating: only.slope_rating,
                    source: RatingSource::OnlyRating,
                };
            }
            if let Some(course_rating) = tee.course_rating {
                return ResolvedRating {
                    course_rating,
                    slope_rating: tee.slope_rating.unwrap_or(self.config.default_slope),
                    source: RatingSource::TeeRating,
                };
            }
            debug!(tee_id = tee.tee_id, "tee has no usable rating, using fallback");
        }

        let course_rating = self
            .config
            .default_course_rating
            .or_else(|| course_par.map(f64::from))
            .unwrap_or(self.config.fallback_course_rating);
        ResolvedRating {
            course_rating,
            slope_rating: self.config.default_slope,
            source: RatingSource::Fallback,
        }
    }

    /// `round(index * slope / 113 + (course rating - par))`, rounding half
    /// away from zero. `None` without a handicap index.
    #[must_use]
    pub fn course_handicap(
        &self,
        handicap_index: Option<f64>,
        rating: &ResolvedRating,
        par: i32,
    ) -> Option<i32> {
        let index = handicap_index.filter(|i| i.is_finite())?;
        let raw = index * f64::from(rating.slope_rating) / self.config.standard_slope
            + (rating.course_rating - f64::from(par));
        Some(raw.round() as i32)
    }
}

/// Handicap strokes come off the round total once, not hole by hole.
#[must_use]
pub fn net_score(gross_total: i32, course_handicap: i32) -> i32 {
    gross_total - course_handicap
}

#[must_use]
pub fn net_relative_to_par(net_score: i32, total_par: i32) -> i32 {
    net_score - total_par
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TeeRating;

    fn tee(ratings: Vec<TeeRating>, base: Option<(f64, i32)>) -> Tee {
        Tee {
            tee_id: 1,
            name: "White".to_string(),
            course_rating: base.map(|b| b.0),
            slope_rating: base.map(|b| b.1),
            ratings,
            stroke_index: None,
        }
    }

    #[test]
    fn worked_example() {
        let config = HandicapConfig::default();
        let calc = HandicapCalculator::new(&config);
        let t = tee(vec![], Some((71.3, 125)));
        let rating = calc.rating(Some(&t), Some(Gender::Men), Some(72));
        assert_eq!(rating.source, RatingSource::TeeRating);
        let ch = calc.course_handicap(Some(10.5), &rating, 72);
        assert_eq!(ch, Some(11));
        let net = net_score(72, 11);
        assert_eq!(net, 61);
        assert_eq!(net_relative_to_par(net, 72), -11);
    }

    #[test]
    fn gender_rating_beats_single_rating() {
        let config = HandicapConfig::default();
        let calc = HandicapCalculator::new(&config);
        let t = tee(
            vec![
                TeeRating {
                    gender: Gender::Men,
                    course_rating: 70.1,
                    slope_rating: 120,
                },
                TeeRating {
                    gender: Gender::Women,
                    course_rating: 74.0,
                    slope_rating: 131,
                },
            ],
            Some((69.0, 110)),
        );
        let r = calc.rating(Some(&t), Some(Gender::Women), Some(72));
        assert_eq!(r.source, RatingSource::GenderRating);
        assert_eq!(r.slope_rating, 131);

        // two ratings and no gender: neither is "the only one"
        let r = calc.rating(Some(&t), None, Some(72));
        assert_eq!(r.source, RatingSource::TeeRating);
        assert_eq!(r.slope_rating, 110);
    }

    #[test]
    fn only_rating_used_for_other_gender() {
        let config = HandicapConfig::default();
        let calc = HandicapCalculator::new(&config);
        let t = tee(
            vec![TeeRating {
                gender: Gender::Men,
                course_rating: 70.1,
                slope_rating: 120,
            }],
            None,
        );
        let r = calc.rating(Some(&t), Some(Gender::Women), Some(72));
        assert_eq!(r.source, RatingSource::OnlyRating);
        assert!((r.course_rating - 70.1).abs() < f64::EPSILON);
    }

    #[test]
    fn unrated_or_missing_tee_falls_back_to_par() {
        let config = HandicapConfig::default();
        let calc = HandicapCalculator::new(&config);
        let r = calc.rating(None, None, Some(70));
        assert_eq!(r.source, RatingSource::Fallback);
        assert_eq!(r.slope_rating, 113);
        assert!((r.course_rating - 70.0).abs() < f64::EPSILON);

        let r = calc.rating(Some(&tee(vec![], None)), None, None);
        assert!((r.course_rating - 72.0).abs() < f64::EPSILON);
    }

    #[test]
    fn plus_handicap_and_missing_index() {
        let config = HandicapConfig::default();
        let calc = HandicapCalculator::new(&config);
        let r = calc.rating(None, None, Some(72));
        assert_eq!(calc.course_handicap(Some(-2.4), &r, 72), Some(-2));
        assert_eq!(calc.course_handicap(Some(-2.5), &r, 72), Some(-3));
        assert_eq!(calc.course_handicap(None, &r, 72), None);
    }
}

use crate::core::scorer::ScoringError;
use crate::models::{Category, CategoryScores};

/// Upper bound of a single category score
pub const MAX_CATEGORY_SCORE: f64 = 100.0;

/// The largest possible distance between two score vectors: the distance
/// between (0,0,0,0,0) and (100,100,100,100,100), sqrt(5 * 100^2).
pub fn max_distance() -> f64 {
    (Category::ALL.len() as f64 * MAX_CATEGORY_SCORE * MAX_CATEGORY_SCORE).sqrt()
}

/// Euclidean norm of the per-category difference between two vectors.
#[inline]
pub fn euclidean_distance(a: &CategoryScores, b: &CategoryScores) -> f64 {
    a.to_array()
        .iter()
        .zip(b.to_array().iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

/// Compatibility between two score vectors, 0-100, higher = more similar.
///
/// The Euclidean distance between the vectors is normalized against
/// [`max_distance`] and inverted:
/// `compatibility = max(0, 100 - distance / max_distance * 100)`.
///
/// Distance is symmetric, so `compatibility_score(a, b)` equals
/// `compatibility_score(b, a)` exactly, and identical vectors score
/// exactly 100. With both inputs inside [0, 100] the distance can never
/// exceed the maximum, so the lower clamp is the only one needed.
///
/// # Errors
/// [`ScoringError::ScoreOutOfRange`] if any component of either vector
/// falls outside [0, 100] (NaN included). Out-of-range inputs are rejected
/// rather than clamped: a fabricated component would yield a meaningless
/// score.
pub fn compatibility_score(a: &CategoryScores, b: &CategoryScores) -> Result<f64, ScoringError> {
    validate_vector(a)?;
    validate_vector(b)?;

    let distance = euclidean_distance(a, b);
    Ok((100.0 - distance / max_distance() * 100.0).max(0.0))
}

fn validate_vector(scores: &CategoryScores) -> Result<(), ScoringError> {
    for category in Category::ALL {
        let value = scores.get(category);
        if !(0.0..=MAX_CATEGORY_SCORE).contains(&value) {
            return Err(ScoringError::ScoreOutOfRange { category, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors_score_exactly_100() {
        let v = CategoryScores::uniform(60.0);
        assert_eq!(compatibility_score(&v, &v).unwrap(), 100.0);
    }

    #[test]
    fn test_opposite_extremes_score_zero() {
        let lo = CategoryScores::uniform(0.0);
        let hi = CategoryScores::uniform(100.0);

        assert_eq!(euclidean_distance(&lo, &hi), max_distance());
        assert_eq!(compatibility_score(&lo, &hi).unwrap(), 0.0);
    }

    #[test]
    fn test_symmetry_exact() {
        let a = CategoryScores {
            mindset: 72.5,
            self_management: 40.0,
            interactions: 88.0,
            personality: 55.0,
            resilience: 61.0,
        };
        let b = CategoryScores {
            mindset: 20.0,
            self_management: 95.0,
            interactions: 33.3,
            personality: 70.0,
            resilience: 48.0,
        };

        assert_eq!(
            compatibility_score(&a, &b).unwrap(),
            compatibility_score(&b, &a).unwrap()
        );
    }

    #[test]
    fn test_bounds() {
        let pairs = [
            (CategoryScores::uniform(0.0), CategoryScores::uniform(100.0)),
            (CategoryScores::uniform(50.0), CategoryScores::uniform(50.0)),
            (
                CategoryScores {
                    mindset: 100.0,
                    self_management: 0.0,
                    interactions: 100.0,
                    personality: 0.0,
                    resilience: 100.0,
                },
                CategoryScores {
                    mindset: 0.0,
                    self_management: 100.0,
                    interactions: 0.0,
                    personality: 100.0,
                    resilience: 0.0,
                },
            ),
        ];

        for (a, b) in pairs {
            let score = compatibility_score(&a, &b).unwrap();
            assert!((0.0..=100.0).contains(&score), "score {} out of range", score);
        }
    }

    #[test]
    fn test_monotonic_in_single_dimension() {
        let base = CategoryScores::uniform(50.0);

        let mut previous = compatibility_score(&base, &base).unwrap();
        for offset in [5.0, 10.0, 20.0, 40.0, 50.0] {
            let mut other = base;
            other.mindset = 50.0 + offset;
            let score = compatibility_score(&base, &other).unwrap();
            assert!(
                score < previous,
                "larger difference must not increase compatibility"
            );
            previous = score;
        }
    }

    #[test]
    fn test_out_of_range_component_rejected() {
        let ok = CategoryScores::uniform(50.0);

        for bad_value in [-0.1, 100.1, f64::NAN] {
            let mut bad = CategoryScores::uniform(50.0);
            bad.interactions = bad_value;

            let err = compatibility_score(&ok, &bad).unwrap_err();
            assert!(matches!(
                err,
                ScoringError::ScoreOutOfRange {
                    category: crate::models::Category::Interactions,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_known_distance() {
        // Single dimension differs by 30: distance 30, ratio 30/223.607
        let a = CategoryScores::uniform(50.0);
        let mut b = a;
        b.personality = 80.0;

        let distance = euclidean_distance(&a, &b);
        assert!((distance - 30.0).abs() < 1e-9);

        let score = compatibility_score(&a, &b).unwrap();
        let expected = 100.0 - 30.0 / max_distance() * 100.0;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_max_distance_value() {
        assert!((max_distance() - 223.60679).abs() < 1e-4);
    }
}

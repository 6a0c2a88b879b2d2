use crate::core::scorer::ScoringError;
use crate::models::{Category, CategoryScores, SurveyResponse};

/// Number of questions in a complete survey
pub const SURVEY_LENGTH: usize = 40;

/// Lowest valid Likert answer
pub const LIKERT_MIN: u8 = 1;

/// Highest valid Likert answer
pub const LIKERT_MAX: u8 = 5;

/// Factor mapping a 1-5 Likert mean onto the 0-100 score range
pub const SCORE_SCALE: f64 = 20.0;

/// Reduce a complete response set to one score per category.
///
/// For each category the score is the arithmetic mean of its answers
/// scaled by [`SCORE_SCALE`] (a mean of 5 maps to 100). A category with no
/// assigned questions scores 0.0; the seeded question set assigns 8
/// questions to every category, so that path is a defensive default.
///
/// The computation is pure and idempotent: the same response set always
/// produces the same vector.
///
/// # Errors
/// * [`ScoringError::IncompleteSubmission`] if the response count differs
///   from `expected`.
/// * [`ScoringError::AnswerOutOfRange`] if any answer falls outside
///   [`LIKERT_MIN`]..=[`LIKERT_MAX`].
pub fn aggregate_scores(
    responses: &[SurveyResponse],
    expected: usize,
) -> Result<CategoryScores, ScoringError> {
    if responses.len() != expected {
        return Err(ScoringError::IncompleteSubmission {
            expected,
            actual: responses.len(),
        });
    }

    let mut sums = [0.0f64; Category::ALL.len()];
    let mut counts = [0u32; Category::ALL.len()];

    for response in responses {
        if response.answer < LIKERT_MIN || response.answer > LIKERT_MAX {
            return Err(ScoringError::AnswerOutOfRange {
                question_id: response.question_id,
                value: response.answer,
            });
        }
        let idx = response.category as usize;
        sums[idx] += response.answer as f64;
        counts[idx] += 1;
    }

    Ok(CategoryScores::from_fn(|category| {
        let idx = category as usize;
        if counts[idx] == 0 {
            0.0
        } else {
            sums[idx] / counts[idx] as f64 * SCORE_SCALE
        }
    }))
}

use crate::core::aggregator::{aggregate_scores, SURVEY_LENGTH};
use crate::core::compatibility::compatibility_score;
use crate::models::{Category, CategoryScores, SurveyResponse};
use thiserror::Error;

/// Errors produced by the scoring core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("incomplete submission: expected {expected} responses, got {actual}")]
    IncompleteSubmission { expected: usize, actual: usize },

    #[error("answer {value} for question {question_id} is outside the Likert range 1-5")]
    AnswerOutOfRange { question_id: i64, value: u8 },

    #[error("{category} score {value} is outside the 0-100 range")]
    ScoreOutOfRange { category: Category, value: f64 },
}

/// Outcome of a compatibility request for a user pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompatibilityOutcome {
    /// Both vectors were present; the pair's score was computed.
    Computed(f64),
    /// At least one vector is absent. Nothing was computed and nothing
    /// should be written.
    Skipped,
}

/// Entry point for the scoring pipeline.
///
/// A `Scorer` carries only the survey shape (how many responses make a
/// complete submission); every computation is a pure function of its
/// arguments. Reads are gathered by the caller before invoking it and the
/// single result write happens after it returns.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    expected_responses: usize,
}

impl Scorer {
    pub fn new(expected_responses: usize) -> Self {
        Self { expected_responses }
    }

    /// A scorer for the standard 40-question survey.
    pub fn with_default_survey() -> Self {
        Self::new(SURVEY_LENGTH)
    }

    pub fn expected_responses(&self) -> usize {
        self.expected_responses
    }

    /// Score one user's complete submission.
    ///
    /// The result replaces any previously stored vector for the user
    /// (upsert semantics at the store); recomputing from the same
    /// responses yields the same vector.
    pub fn score_submission(
        &self,
        responses: &[SurveyResponse],
    ) -> Result<CategoryScores, ScoringError> {
        aggregate_scores(responses, self.expected_responses)
    }

    /// Compute a pair's compatibility if both vectors exist.
    ///
    /// Returns [`CompatibilityOutcome::Skipped`] when either vector is
    /// absent: a missing vector is a normal pre-survey state, not an
    /// error, and fabricating a default vector would produce a
    /// meaningless score. The caller persists only a `Computed` outcome.
    pub fn compatibility_if_ready(
        &self,
        a: Option<&CategoryScores>,
        b: Option<&CategoryScores>,
    ) -> Result<CompatibilityOutcome, ScoringError> {
        match (a, b) {
            (Some(a), Some(b)) => Ok(CompatibilityOutcome::Computed(compatibility_score(a, b)?)),
            _ => Ok(CompatibilityOutcome::Skipped),
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::with_default_survey()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_survey(answer: u8) -> Vec<SurveyResponse> {
        let mut responses = Vec::with_capacity(SURVEY_LENGTH);
        let mut question_id = 1;
        for category in Category::ALL {
            for _ in 0..8 {
                responses.push(SurveyResponse {
                    question_id,
                    category,
                    answer,
                });
                question_id += 1;
            }
        }
        responses
    }

    #[test]
    fn test_score_submission_produces_five_scores() {
        let scorer = Scorer::with_default_survey();
        let scores = scorer.score_submission(&full_survey(3)).unwrap();

        assert_eq!(scores.to_array().len(), 5);
        assert!(scores.to_array().iter().all(|&s| s == 60.0));
    }

    #[test]
    fn test_score_submission_respects_configured_length() {
        let scorer = Scorer::new(10);
        let responses: Vec<SurveyResponse> = full_survey(3).into_iter().take(10).collect();

        assert!(scorer.score_submission(&responses).is_ok());
        assert!(matches!(
            scorer.score_submission(&full_survey(3)),
            Err(ScoringError::IncompleteSubmission { expected: 10, .. })
        ));
    }

    #[test]
    fn test_compatibility_if_ready_computes_when_both_present() {
        let scorer = Scorer::with_default_survey();
        let a = CategoryScores::uniform(60.0);
        let b = CategoryScores::uniform(60.0);

        let outcome = scorer.compatibility_if_ready(Some(&a), Some(&b)).unwrap();
        assert_eq!(outcome, CompatibilityOutcome::Computed(100.0));
    }

    #[test]
    fn test_compatibility_if_ready_skips_missing_vectors() {
        let scorer = Scorer::with_default_survey();
        let v = CategoryScores::uniform(60.0);

        assert_eq!(
            scorer.compatibility_if_ready(None, Some(&v)).unwrap(),
            CompatibilityOutcome::Skipped
        );
        assert_eq!(
            scorer.compatibility_if_ready(Some(&v), None).unwrap(),
            CompatibilityOutcome::Skipped
        );
        assert_eq!(
            scorer.compatibility_if_ready(None, None).unwrap(),
            CompatibilityOutcome::Skipped
        );
    }

    #[test]
    fn test_compatibility_if_ready_propagates_domain_errors() {
        let scorer = Scorer::with_default_survey();
        let ok = CategoryScores::uniform(60.0);
        let bad = CategoryScores::uniform(150.0);

        assert!(scorer.compatibility_if_ready(Some(&ok), Some(&bad)).is_err());
    }
}

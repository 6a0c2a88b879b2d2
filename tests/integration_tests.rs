// Integration tests for Affinity Algo: the full scoring pipeline from raw
// responses to a stored-shape compatibility outcome.

use affinity_algo::core::{CompatibilityOutcome, Scorer, ScoringError};
use affinity_algo::models::{Category, CategoryScores, SurveyResponse};

fn build_survey(mut answer_for: impl FnMut(Category, usize) -> u8) -> Vec<SurveyResponse> {
    let mut responses = Vec::with_capacity(40);
    let mut question_id = 1;
    for category in Category::ALL {
        for i in 0..8 {
            responses.push(SurveyResponse {
                question_id,
                category,
                answer: answer_for(category, i),
            });
            question_id += 1;
        }
    }
    responses
}

#[test]
fn test_pipeline_end_to_end() {
    let scorer = Scorer::with_default_survey();

    // Two users submit; their vectors are then compared.
    let user_a = scorer.score_submission(&build_survey(|_, _| 4)).unwrap();
    let user_b = scorer
        .score_submission(&build_survey(|category, _| match category {
            Category::Mindset => 5,
            Category::SelfManagement => 4,
            _ => 3,
        }))
        .unwrap();

    assert_eq!(user_a, CategoryScores::uniform(80.0));
    assert_eq!(user_b.mindset, 100.0);
    assert_eq!(user_b.self_management, 80.0);
    assert_eq!(user_b.interactions, 60.0);

    let outcome = scorer
        .compatibility_if_ready(Some(&user_a), Some(&user_b))
        .unwrap();

    match outcome {
        CompatibilityOutcome::Computed(score) => {
            assert!((0.0..=100.0).contains(&score));
            // Distance sqrt(20^2 + 0 + 20^2 + 20^2 + 20^2) = 40
            let expected = 100.0 - 40.0 / (5.0f64 * 100.0 * 100.0).sqrt() * 100.0;
            assert!((score - expected).abs() < 1e-9);
        }
        CompatibilityOutcome::Skipped => panic!("both vectors present, must compute"),
    }
}

#[test]
fn test_pipeline_identical_submissions_fully_compatible() {
    let scorer = Scorer::with_default_survey();
    let survey = build_survey(|_, i| (i % 5 + 1) as u8);

    let a = scorer.score_submission(&survey).unwrap();
    let b = scorer.score_submission(&survey).unwrap();

    assert_eq!(
        scorer.compatibility_if_ready(Some(&a), Some(&b)).unwrap(),
        CompatibilityOutcome::Computed(100.0)
    );
}

#[test]
fn test_pipeline_resubmission_replaces_vector() {
    let scorer = Scorer::with_default_survey();

    let first = scorer.score_submission(&build_survey(|_, _| 2)).unwrap();
    let second = scorer.score_submission(&build_survey(|_, _| 5)).unwrap();

    // The second submission stands alone; nothing of the first leaks in.
    assert_eq!(first, CategoryScores::uniform(40.0));
    assert_eq!(second, CategoryScores::uniform(100.0));
}

#[test]
fn test_pipeline_skips_until_both_parties_submitted() {
    let scorer = Scorer::with_default_survey();
    let submitted = scorer.score_submission(&build_survey(|_, _| 3)).unwrap();

    // Invite redeemed before the creator took the survey: no result.
    assert_eq!(
        scorer
            .compatibility_if_ready(Some(&submitted), None)
            .unwrap(),
        CompatibilityOutcome::Skipped
    );
    assert_eq!(
        scorer
            .compatibility_if_ready(None, Some(&submitted))
            .unwrap(),
        CompatibilityOutcome::Skipped
    );
    assert_eq!(
        scorer.compatibility_if_ready(None, None).unwrap(),
        CompatibilityOutcome::Skipped
    );
}

#[test]
fn test_pipeline_recomputation_idempotent() {
    let scorer = Scorer::with_default_survey();
    let a = scorer.score_submission(&build_survey(|_, i| (i % 3 + 1) as u8)).unwrap();
    let b = scorer.score_submission(&build_survey(|_, i| (i % 4 + 2) as u8)).unwrap();

    // Concurrent invite redemptions replay the same computation; the
    // result must be byte-identical so at-least-once execution is safe.
    let first = scorer.compatibility_if_ready(Some(&a), Some(&b)).unwrap();
    let second = scorer.compatibility_if_ready(Some(&a), Some(&b)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_pipeline_rejects_incomplete_submission_without_partial_output() {
    let scorer = Scorer::with_default_survey();
    let mut responses = build_survey(|_, _| 3);
    responses.truncate(20);

    let err = scorer.score_submission(&responses).unwrap_err();
    assert_eq!(
        err,
        ScoringError::IncompleteSubmission {
            expected: 40,
            actual: 20
        }
    );
}

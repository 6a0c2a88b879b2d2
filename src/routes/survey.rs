use actix_web::{web, HttpRequest, HttpResponse, Responder};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use validator::Validate;

use crate::core::CompatibilityOutcome;
use crate::models::{
    Category, CategoryScores, CompatibilityDetailResponse, CompatibilityListEntry,
    CompatibilityListResponse, ErrorResponse, HealthResponse, InviteResponse, ParticipantScores,
    Question, QuestionsResponse, ScoresResponse, SubmitSurveyRequest, SubmitSurveyResponse,
    SurveyResponse,
};
use crate::routes::{authenticate, AppState};
use crate::services::{CacheKey, CompatibilityRow, PostgresError, StoredScores};

const INVITE_CODE_LENGTH: usize = 8;
const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const INVITE_CODE_ATTEMPTS: usize = 4;

/// Configure survey and compatibility routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/survey/questions", web::get().to(get_questions))
        .route("/survey/submit", web::post().to(submit_survey))
        .route("/survey/scores", web::get().to(get_scores))
        .route("/invites", web::post().to(create_invite))
        .route("/compatibility", web::get().to(list_compatibility))
        .route(
            "/compatibility/{other_user_id}",
            web::get().to(get_compatibility_detail),
        );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// List the survey questions in display order
///
/// GET /api/v1/survey/questions
async fn get_questions(state: web::Data<AppState>) -> impl Responder {
    if let Ok(questions) = state.cache.get::<Vec<Question>>(&CacheKey::questions()).await {
        return HttpResponse::Ok().json(QuestionsResponse { questions });
    }

    match state.postgres.get_questions().await {
        Ok(questions) => {
            if let Err(e) = state.cache.set(&CacheKey::questions(), &questions).await {
                tracing::warn!("Failed to cache question list: {}", e);
            }
            HttpResponse::Ok().json(QuestionsResponse { questions })
        }
        Err(e) => {
            tracing::error!("Failed to fetch questions: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch questions".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Submit a completed survey
///
/// POST /api/v1/survey/submit
///
/// Request body:
/// ```json
/// {
///   "responses": [{"questionId": 1, "value": 3}, ...],
///   "inviteCode": "A1B2C3D4"
/// }
/// ```
///
/// Replaces any previous submission and recomputes the caller's score
/// vector. When a valid invite code names another user, also computes
/// the pair's compatibility if both vectors exist.
async fn submit_survey(
    state: web::Data<AppState>,
    req: web::Json<SubmitSurveyRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let claims = match authenticate(&state, &http_req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };

    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let user_id = claims.sub;

    // Resolve each answer against the question set before anything is
    // written; an unknown or duplicated question id rejects the whole
    // submission.
    let questions = match state.postgres.get_questions().await {
        Ok(questions) => questions,
        Err(e) => {
            tracing::error!("Failed to fetch questions: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch questions".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let categories: HashMap<i64, Category> =
        questions.iter().map(|q| (q.id, q.category)).collect();

    let mut seen = HashSet::with_capacity(req.responses.len());
    let mut responses = Vec::with_capacity(req.responses.len());
    for answer in &req.responses {
        if !seen.insert(answer.question_id) {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid submission".to_string(),
                message: format!("duplicate response for question {}", answer.question_id),
                status_code: 400,
            });
        }
        let category = match categories.get(&answer.question_id) {
            Some(category) => *category,
            None => {
                return HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Invalid submission".to_string(),
                    message: format!("unknown question id {}", answer.question_id),
                    status_code: 400,
                });
            }
        };
        responses.push(SurveyResponse {
            question_id: answer.question_id,
            category,
            answer: answer.value,
        });
    }

    let scores = match state.scorer.score_submission(&responses) {
        Ok(scores) => scores,
        Err(e) => {
            tracing::info!("Rejected submission from user {}: {}", user_id, e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid submission".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
    };

    if let Err(e) = state
        .postgres
        .replace_submission(user_id, &responses, &scores)
        .await
    {
        tracing::error!("Failed to store submission for user {}: {}", user_id, e);
        return HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Failed to store submission".to_string(),
            message: e.to_string(),
            status_code: 500,
        });
    }

    if let Err(e) = state.cache.delete(&CacheKey::scores(user_id)).await {
        tracing::warn!("Failed to invalidate score cache for {}: {}", user_id, e);
    }

    if let Some(code) = &req.invite_code {
        link_via_invite(&state, user_id, code, &scores).await;
    }

    tracing::info!("Stored submission for user {}", user_id);

    HttpResponse::Ok().json(SubmitSurveyResponse {
        submission_id: uuid::Uuid::new_v4().to_string(),
        scores,
    })
}

/// Redeem an invite code and, if it pairs two distinct users, compute
/// their compatibility.
///
/// The invite outcome never fails the submission: an unknown or used
/// code is logged and ignored, and a partner without a stored vector
/// skips the computation entirely.
async fn link_via_invite(
    state: &AppState,
    user_id: i64,
    code: &str,
    own_scores: &CategoryScores,
) {
    let creator_id = match state.postgres.redeem_invite(code, user_id).await {
        Ok(Some(creator_id)) => creator_id,
        Ok(None) => {
            tracing::info!("Invite code {} invalid or already used", code);
            return;
        }
        Err(e) => {
            tracing::warn!("Failed to redeem invite {}: {}", code, e);
            return;
        }
    };

    if creator_id == user_id {
        tracing::debug!("Invite {} redeemed by its creator; no pair to compare", code);
        return;
    }

    let partner = match state.postgres.get_scores(creator_id).await {
        Ok(partner) => partner,
        Err(e) => {
            tracing::warn!("Failed to fetch scores for user {}: {}", creator_id, e);
            return;
        }
    };

    let outcome = match state
        .scorer
        .compatibility_if_ready(Some(own_scores), partner.as_ref().map(|s| &s.scores))
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(
                "Compatibility for pair ({}, {}) rejected: {}",
                user_id,
                creator_id,
                e
            );
            return;
        }
    };

    match outcome {
        CompatibilityOutcome::Computed(score) => {
            if let Err(e) = state
                .postgres
                .upsert_compatibility(user_id, creator_id, score)
                .await
            {
                tracing::error!(
                    "Failed to store compatibility for pair ({}, {}): {}",
                    user_id,
                    creator_id,
                    e
                );
                return;
            }

            for id in [user_id, creator_id] {
                if let Err(e) = state.cache.delete(&CacheKey::compatibility(id)).await {
                    tracing::warn!("Failed to invalidate compatibility cache for {}: {}", id, e);
                }
            }

            tracing::info!(
                "Computed compatibility {:.2} for pair ({}, {})",
                score,
                user_id,
                creator_id
            );
        }
        CompatibilityOutcome::Skipped => {
            tracing::debug!(
                "User {} has no stored scores yet; compatibility skipped",
                creator_id
            );
        }
    }
}

/// Fetch the caller's personality scores
///
/// GET /api/v1/survey/scores
async fn get_scores(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let claims = match authenticate(&state, &http_req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };

    let cache_key = CacheKey::scores(claims.sub);
    if let Ok(stored) = state.cache.get::<StoredScores>(&cache_key).await {
        return scores_response(&claims.username, stored);
    }

    match state.postgres.get_scores(claims.sub).await {
        Ok(Some(stored)) => {
            if let Err(e) = state.cache.set(&cache_key, &stored).await {
                tracing::warn!("Failed to cache scores for {}: {}", claims.sub, e);
            }
            scores_response(&claims.username, stored)
        }
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "No scores found".to_string(),
            message: "Complete the survey first".to_string(),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch scores for {}: {}", claims.sub, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch scores".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

fn scores_response(username: &str, stored: StoredScores) -> HttpResponse {
    HttpResponse::Ok().json(ScoresResponse {
        username: username.to_string(),
        scores: stored.scores,
        calculated_at: stored.calculated_at,
    })
}

/// Create a fresh invite code
///
/// POST /api/v1/invites
async fn create_invite(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let claims = match authenticate(&state, &http_req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };

    // Retry on the (unlikely) collision with an existing code
    for _ in 0..INVITE_CODE_ATTEMPTS {
        let code = generate_invite_code();
        match state.postgres.create_invite(&code, claims.sub).await {
            Ok(()) => {
                return HttpResponse::Ok().json(InviteResponse { invite_code: code });
            }
            Err(PostgresError::Conflict(_)) => continue,
            Err(e) => {
                tracing::error!("Failed to create invite for {}: {}", claims.sub, e);
                return HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to create invite".to_string(),
                    message: e.to_string(),
                    status_code: 500,
                });
            }
        }
    }

    tracing::error!("Exhausted invite code attempts for user {}", claims.sub);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "Failed to create invite".to_string(),
        message: "Could not allocate a unique invite code".to_string(),
        status_code: 500,
    })
}

/// List every compatibility result involving the caller, best first
///
/// GET /api/v1/compatibility
async fn list_compatibility(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let claims = match authenticate(&state, &http_req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };

    let cache_key = CacheKey::compatibility(claims.sub);
    if let Ok(rows) = state.cache.get::<Vec<CompatibilityRow>>(&cache_key).await {
        return HttpResponse::Ok().json(list_response(rows));
    }

    match state.postgres.list_compatibility(claims.sub).await {
        Ok(rows) => {
            if let Err(e) = state.cache.set(&cache_key, &rows).await {
                tracing::warn!(
                    "Failed to cache compatibility list for {}: {}",
                    claims.sub,
                    e
                );
            }
            HttpResponse::Ok().json(list_response(rows))
        }
        Err(e) => {
            tracing::error!("Failed to list compatibility for {}: {}", claims.sub, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch compatibility results".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

fn list_response(rows: Vec<CompatibilityRow>) -> CompatibilityListResponse {
    CompatibilityListResponse {
        results: rows
            .into_iter()
            .map(|row| CompatibilityListEntry {
                other_user_id: row.other_user_id,
                other_username: row.other_username,
                compatibility_score: row.compatibility_score,
            })
            .collect(),
    }
}

/// Fetch one pair's compatibility with both participants' scores
///
/// GET /api/v1/compatibility/{otherUserId}
async fn get_compatibility_detail(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    http_req: HttpRequest,
) -> impl Responder {
    let claims = match authenticate(&state, &http_req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };

    let other_user_id = path.into_inner();
    if other_user_id == claims.sub {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid request".to_string(),
            message: "Cannot compare with yourself".to_string(),
            status_code: 400,
        });
    }

    let score = match state.postgres.get_compatibility(claims.sub, other_user_id).await {
        Ok(Some(score)) => score,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Not found".to_string(),
                message: "Compatibility data not found".to_string(),
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!(
                "Failed to fetch compatibility for pair ({}, {}): {}",
                claims.sub,
                other_user_id,
                e
            );
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch compatibility".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let other_username = match state.postgres.get_username(other_user_id).await {
        Ok(Some(username)) => username,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Not found".to_string(),
                message: "User not found".to_string(),
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to look up user {}: {}", other_user_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch user".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let (own, partner) = match (
        state.postgres.get_scores(claims.sub).await,
        state.postgres.get_scores(other_user_id).await,
    ) {
        (Ok(Some(own)), Ok(Some(partner))) => (own, partner),
        (Ok(_), Ok(_)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Not found".to_string(),
                message: "Personality scores not found for both users".to_string(),
                status_code: 404,
            });
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to fetch pair scores: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch scores".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    HttpResponse::Ok().json(CompatibilityDetailResponse {
        user: ParticipantScores {
            user_id: claims.sub,
            username: claims.username,
            scores: own.scores,
        },
        partner: ParticipantScores {
            user_id: other_user_id,
            username: other_username,
            scores: partner.scores,
        },
        compatibility_score: score,
    })
}

/// Generate a random invite code (A-Z, 0-9).
fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LENGTH)
        .map(|_| INVITE_CODE_ALPHABET[rng.gen_range(0..INVITE_CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_code_shape() {
        for _ in 0..32 {
            let code = generate_invite_code();
            assert_eq!(code.len(), INVITE_CODE_LENGTH);
            assert!(code
                .bytes()
                .all(|b| INVITE_CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}

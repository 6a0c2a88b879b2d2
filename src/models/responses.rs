use crate::models::domain::{CategoryScores, Question};
use serde::{Deserialize, Serialize};

/// Response for successful registration or login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
}

/// Response for the question listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub questions: Vec<Question>,
}

/// Response for a successful survey submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitSurveyResponse {
    #[serde(rename = "submissionId")]
    pub submission_id: String,
    pub scores: CategoryScores,
}

/// Response for the own-scores endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoresResponse {
    pub username: String,
    pub scores: CategoryScores,
    #[serde(rename = "calculatedAt")]
    pub calculated_at: chrono::DateTime<chrono::Utc>,
}

/// Response for invite creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteResponse {
    #[serde(rename = "inviteCode")]
    pub invite_code: String,
}

/// One row of the compatibility listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityListEntry {
    #[serde(rename = "otherUserId")]
    pub other_user_id: i64,
    #[serde(rename = "otherUsername")]
    pub other_username: String,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: f64,
}

/// Response listing every pair result involving the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityListResponse {
    pub results: Vec<CompatibilityListEntry>,
}

/// One participant's side of a compatibility detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantScores {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    pub scores: CategoryScores,
}

/// Response for the pairwise compatibility detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityDetailResponse {
    pub user: ParticipantScores,
    pub partner: ParticipantScores,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: f64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

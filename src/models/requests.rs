use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a new account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Request to log in
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// One answered question as sent by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerInput {
    #[serde(alias = "question_id", rename = "questionId")]
    pub question_id: i64,
    pub value: u8,
}

/// Request to submit a completed survey
///
/// The optional invite code links this submission to the invite's creator
/// for compatibility comparison.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitSurveyRequest {
    #[validate(length(min = 1))]
    pub responses: Vec<AnswerInput>,
    #[serde(default)]
    #[serde(alias = "invite_code", rename = "inviteCode")]
    pub invite_code: Option<String>,
}

// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Category, CategoryScores, Question, SurveyResponse};
pub use requests::{AnswerInput, LoginRequest, RegisterRequest, SubmitSurveyRequest};
pub use responses::{
    AuthResponse, CompatibilityDetailResponse, CompatibilityListEntry, CompatibilityListResponse,
    ErrorResponse, HealthResponse, InviteResponse, ParticipantScores, QuestionsResponse,
    ScoresResponse, SubmitSurveyResponse,
};

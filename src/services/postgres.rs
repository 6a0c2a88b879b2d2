use crate::models::{Category, CategoryScores, Question, SurveyResponse};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// A registered user account
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A stored score vector with its computation timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredScores {
    pub scores: CategoryScores,
    pub calculated_at: chrono::DateTime<chrono::Utc>,
}

/// One pair result as listed for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityRow {
    pub other_user_id: i64,
    pub other_username: String,
    pub compatibility_score: f64,
}

/// Canonical ordering for an unordered user pair.
///
/// Every read and write of a pair result goes through this, so the store
/// holds at most one row per pair regardless of which direction the pair
/// was supplied in.
pub(crate) fn canonical_pair(a: i64, b: i64) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// PostgreSQL client for the compatibility service.
///
/// Owns the authoritative copies of accounts, questions, responses,
/// derived score vectors, invites, and pair results. Derived data is only
/// ever written alongside the inputs it was derived from.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Create a user account, returning its id.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, PostgresError> {
        let query = r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PostgresError::Conflict("username or email already exists".to_string())
                } else {
                    e.into()
                }
            })?;

        let id: i64 = row.get("id");
        tracing::info!("Created user {} ({})", username, id);
        Ok(id)
    }

    /// Look up an account by username (for login).
    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, PostgresError> {
        let query = r#"
            SELECT id, username, email, password_hash
            FROM users
            WHERE username = $1
        "#;

        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| UserRecord {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
        }))
    }

    /// Look up a username by user id.
    pub async fn get_username(&self, user_id: i64) -> Result<Option<String>, PostgresError> {
        let row = sqlx::query("SELECT username FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("username")))
    }

    /// Fetch the full question set in display order.
    pub async fn get_questions(&self) -> Result<Vec<Question>, PostgresError> {
        let query = r#"
            SELECT id, category, question_text, question_number
            FROM questions
            ORDER BY question_number
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                let label: String = row.get("category");
                let category = Category::from_label(&label).ok_or_else(|| {
                    PostgresError::InvalidData(format!("unknown question category: {}", label))
                })?;
                Ok(Question {
                    id: row.get("id"),
                    category,
                    text: row.get("question_text"),
                    number: row.get("question_number"),
                })
            })
            .collect()
    }

    /// Fetch a user's complete response set, joined with each question's
    /// category, in question order.
    pub async fn get_responses(&self, user_id: i64) -> Result<Vec<SurveyResponse>, PostgresError> {
        let query = r#"
            SELECT sr.question_id, q.category, sr.answer
            FROM survey_responses sr
            JOIN questions q ON q.id = sr.question_id
            WHERE sr.user_id = $1
            ORDER BY q.question_number
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let label: String = row.get("category");
                let category = Category::from_label(&label).ok_or_else(|| {
                    PostgresError::InvalidData(format!("unknown question category: {}", label))
                })?;
                let answer: i16 = row.get("answer");
                Ok(SurveyResponse {
                    question_id: row.get("question_id"),
                    category,
                    answer: answer as u8,
                })
            })
            .collect()
    }

    /// Replace a user's response set and store the vector derived from it.
    ///
    /// Runs as one transaction: delete prior responses, insert the new
    /// set, upsert the score vector. Either everything commits or nothing
    /// does, so a reader never observes responses without their vector or
    /// a half-replaced response set.
    pub async fn replace_submission(
        &self,
        user_id: i64,
        responses: &[SurveyResponse],
        scores: &CategoryScores,
    ) -> Result<(), PostgresError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM survey_responses WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for response in responses {
            sqlx::query(
                "INSERT INTO survey_responses (user_id, question_id, answer) VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(response.question_id)
            .bind(response.answer as i16)
            .execute(&mut *tx)
            .await?;
        }

        Self::upsert_scores_tx(&mut tx, user_id, scores).await?;

        tx.commit().await?;

        tracing::debug!(
            "Stored submission for user {} ({} responses)",
            user_id,
            responses.len()
        );

        Ok(())
    }

    async fn upsert_scores_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        scores: &CategoryScores,
    ) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO personality_scores
                (user_id, mindset, self_management, interactions, personality, resilience)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id)
            DO UPDATE SET
                mindset = EXCLUDED.mindset,
                self_management = EXCLUDED.self_management,
                interactions = EXCLUDED.interactions,
                personality = EXCLUDED.personality,
                resilience = EXCLUDED.resilience,
                calculated_at = NOW()
        "#;

        sqlx::query(query)
            .bind(user_id)
            .bind(scores.mindset)
            .bind(scores.self_management)
            .bind(scores.interactions)
            .bind(scores.personality)
            .bind(scores.resilience)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Fetch a user's stored score vector, if the survey has been taken.
    pub async fn get_scores(&self, user_id: i64) -> Result<Option<StoredScores>, PostgresError> {
        let query = r#"
            SELECT mindset, self_management, interactions, personality, resilience, calculated_at
            FROM personality_scores
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| StoredScores {
            scores: CategoryScores {
                mindset: row.get("mindset"),
                self_management: row.get("self_management"),
                interactions: row.get("interactions"),
                personality: row.get("personality"),
                resilience: row.get("resilience"),
            },
            calculated_at: row.get("calculated_at"),
        }))
    }

    /// Create an invite code owned by `user_id`.
    pub async fn create_invite(&self, code: &str, user_id: i64) -> Result<(), PostgresError> {
        sqlx::query("INSERT INTO invites (invite_code, created_by_user_id) VALUES ($1, $2)")
            .bind(code)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PostgresError::Conflict(format!("invite code {} already exists", code))
                } else {
                    PostgresError::from(e)
                }
            })?;

        tracing::debug!("Created invite {} for user {}", code, user_id);
        Ok(())
    }

    /// Redeem an unused invite code for `user_id`.
    ///
    /// Marks the invite used and returns its creator's id, or `None` when
    /// the code is unknown or already used.
    pub async fn redeem_invite(
        &self,
        code: &str,
        user_id: i64,
    ) -> Result<Option<i64>, PostgresError> {
        let query = r#"
            UPDATE invites
            SET used_by_user_id = $2, is_used = TRUE, used_at = NOW()
            WHERE invite_code = $1 AND is_used = FALSE
            RETURNING created_by_user_id
        "#;

        let row = sqlx::query(query)
            .bind(code)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("created_by_user_id")))
    }

    /// Store a pair's compatibility score, overwriting any prior result.
    pub async fn upsert_compatibility(
        &self,
        user_a: i64,
        user_b: i64,
        score: f64,
    ) -> Result<(), PostgresError> {
        let (lo, hi) = canonical_pair(user_a, user_b);

        let query = r#"
            INSERT INTO compatibility_results (user_a_id, user_b_id, compatibility_score)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_a_id, user_b_id)
            DO UPDATE SET
                compatibility_score = EXCLUDED.compatibility_score,
                calculated_at = NOW()
        "#;

        sqlx::query(query)
            .bind(lo)
            .bind(hi)
            .bind(score)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            "Stored compatibility {:.2} for pair ({}, {})",
            score,
            lo,
            hi
        );
        Ok(())
    }

    /// Fetch a pair's compatibility score, if one has been computed.
    pub async fn get_compatibility(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> Result<Option<f64>, PostgresError> {
        let (lo, hi) = canonical_pair(user_a, user_b);

        let row = sqlx::query(
            "SELECT compatibility_score FROM compatibility_results WHERE user_a_id = $1 AND user_b_id = $2",
        )
        .bind(lo)
        .bind(hi)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get("compatibility_score")))
    }

    /// List every pair result involving `user_id`, best score first.
    pub async fn list_compatibility(
        &self,
        user_id: i64,
    ) -> Result<Vec<CompatibilityRow>, PostgresError> {
        let query = r#"
            SELECT
                CASE WHEN cr.user_a_id = $1 THEN cr.user_b_id ELSE cr.user_a_id END AS other_user_id,
                u.username AS other_username,
                cr.compatibility_score
            FROM compatibility_results cr
            JOIN users u
                ON u.id = CASE WHEN cr.user_a_id = $1 THEN cr.user_b_id ELSE cr.user_a_id END
            WHERE cr.user_a_id = $1 OR cr.user_b_id = $1
            ORDER BY cr.compatibility_score DESC
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| CompatibilityRow {
                other_user_id: row.get("other_user_id"),
                other_username: row.get("other_username"),
                compatibility_score: row.get("compatibility_score"),
            })
            .collect())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pair_orders_ascending() {
        assert_eq!(canonical_pair(3, 7), (3, 7));
        assert_eq!(canonical_pair(7, 3), (3, 7));
        assert_eq!(canonical_pair(5, 5), (5, 5));
    }

    #[test]
    fn test_canonical_pair_insensitive_to_argument_order() {
        for (a, b) in [(1, 2), (42, 17), (100, 99)] {
            assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
        }
    }
}

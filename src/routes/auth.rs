use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::auth::{hash_password, verify_password};
use crate::models::{AuthResponse, ErrorResponse, LoginRequest, RegisterRequest};
use crate::routes::AppState;
use crate::services::PostgresError;

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/register", web::post().to(register))
        .route("/auth/login", web::post().to(login));
}

/// Create an account
///
/// POST /api/v1/auth/register
async fn register(state: web::Data<AppState>, req: web::Json<RegisterRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let password_hash = match hash_password(&req.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Registration failed".to_string(),
                message: "Internal error".to_string(),
                status_code: 500,
            });
        }
    };

    let user_id = match state
        .postgres
        .create_user(&req.username, &req.email, &password_hash)
        .await
    {
        Ok(id) => id,
        Err(PostgresError::Conflict(message)) => {
            return HttpResponse::Conflict().json(ErrorResponse {
                error: "Registration failed".to_string(),
                message,
                status_code: 409,
            });
        }
        Err(e) => {
            tracing::error!("Failed to create user {}: {}", req.username, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Registration failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    match state.tokens.issue(user_id, &req.username) {
        Ok(token) => HttpResponse::Created().json(AuthResponse {
            token,
            user_id,
            username: req.username.clone(),
        }),
        Err(e) => {
            tracing::error!("Failed to issue token for {}: {}", user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Registration failed".to_string(),
                message: "Internal error".to_string(),
                status_code: 500,
            })
        }
    }
}

/// Log in with username and password
///
/// POST /api/v1/auth/login
async fn login(state: web::Data<AppState>, req: web::Json<LoginRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let user = match state.postgres.get_user_by_username(&req.username).await {
        Ok(Some(user)) => user,
        Ok(None) => return invalid_credentials(),
        Err(e) => {
            tracing::error!("Failed to look up user {}: {}", req.username, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Login failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    match verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(e) => {
            tracing::error!("Password verification failed for {}: {}", user.id, e);
            return invalid_credentials();
        }
    }

    match state.tokens.issue(user.id, &user.username) {
        Ok(token) => HttpResponse::Ok().json(AuthResponse {
            token,
            user_id: user.id,
            username: user.username,
        }),
        Err(e) => {
            tracing::error!("Failed to issue token for {}: {}", user.id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Login failed".to_string(),
                message: "Internal error".to_string(),
                status_code: 500,
            })
        }
    }
}

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse {
        error: "Login failed".to_string(),
        message: "Invalid username or password".to_string(),
        status_code: 401,
    })
}

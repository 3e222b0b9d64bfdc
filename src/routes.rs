//! HTTP routes for the task tracking API
//!
//! Protected routes run the auth gate as a filter right after path and method
//! matching, so a bad credential short-circuits before the body is read or
//! any handler touches storage.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::convert::Infallible;
use warp::http::header::AUTHORIZATION;
use warp::http::{HeaderMap, StatusCode};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::auth::guard::authenticate;
use crate::auth::token::TokenManager;
use crate::auth::user::Identity;
use crate::error::{Result, RustyTasksError};
use crate::handlers;
use crate::handlers::admin::{RoleUpdateRequest, SeedRequest};
use crate::handlers::auth::{LoginRequest, RegisterRequest, ResendVerificationRequest};
use crate::handlers::tasks::{CreateTaskRequest, UpdateStatusRequest, UpdateTaskRequest};
use crate::security::with_api_security_headers;
use crate::security_logger::{log_security_event, SecurityEvent};
use crate::state::AppState;

/// Largest JSON body accepted by any route
const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Verification links carry their token as the last path segment
const VERIFY_PATH_PREFIX: &str = "/api/auth/verify/";

/// Error body sent for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub error: String,
}

/// Full filter tree, with rejection recovery and request logging
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let root = warp::path::end()
        .and(warp::get())
        .map(|| with_api_security_headers("Backend is running"));

    let health = warp::path!("health")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(health_check);

    root.or(health)
        .or(auth_routes(state.clone()))
        .or(user_routes(state.clone()))
        .or(task_routes(state.clone()))
        .or(admin_routes(state))
        .recover(handle_rejection)
        .with(warp::log::custom(log_request))
}

/// Access log line; tokens in the path never reach the log
fn log_request(info: warp::log::Info<'_>) {
    log::info!(
        target: "rusty_tasks::http",
        "{} {} {} {:?}",
        info.method(),
        redacted_path(info.path()),
        info.status().as_u16(),
        info.elapsed()
    );
}

fn redacted_path(path: &str) -> Cow<'_, str> {
    match path.strip_prefix(VERIFY_PATH_PREFIX) {
        Some(rest) if !rest.is_empty() && rest != "resend" => {
            Cow::Owned(format!("{}<redacted>", VERIFY_PATH_PREFIX))
        }
        _ => Cow::Borrowed(path),
    }
}

// Helper function to include state in request
pub fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn identity_from_headers(headers: &HeaderMap, tokens: &TokenManager) -> Result<Identity> {
    let header = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| RustyTasksError::MalformedHeader))
        .transpose()?;
    authenticate(header, tokens)
}

async fn auth_rejection(err: RustyTasksError) -> Rejection {
    log_security_event(SecurityEvent::AuthenticationFailed {
        code: err.error_code(),
    })
    .await;
    warp::reject::custom(err)
}

/// Auth gate: yields the caller's identity or rejects the request
pub fn with_identity(state: AppState) -> impl Filter<Extract = (Identity,), Error = Rejection> + Clone {
    warp::header::headers_cloned()
        .and(with_state(state))
        .and_then(|headers: HeaderMap, state: AppState| async move {
            match identity_from_headers(&headers, &state.session_tokens) {
                Ok(identity) => Ok(identity),
                Err(e) => Err(auth_rejection(e).await),
            }
        })
}

/// Like [`with_identity`], but a request without credentials passes as `None`.
/// Credentials that are present must still be valid.
pub fn with_optional_identity(
    state: AppState,
) -> impl Filter<Extract = (Option<Identity>,), Error = Rejection> + Clone {
    warp::header::headers_cloned()
        .and(with_state(state))
        .and_then(|headers: HeaderMap, state: AppState| async move {
            if !headers.contains_key(AUTHORIZATION) {
                return Ok(None);
            }
            match identity_from_headers(&headers, &state.session_tokens) {
                Ok(identity) => Ok(Some(identity)),
                Err(e) => Err(auth_rejection(e).await),
            }
        })
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn respond<T: Serialize>(result: Result<T>) -> std::result::Result<Response, Rejection> {
    result
        .map(|value| with_api_security_headers(warp::reply::json(&value)).into_response())
        .map_err(warp::reject::custom)
}

async fn health_check(state: AppState) -> std::result::Result<Response, Rejection> {
    let healthy = state.storage.health_check().await.unwrap_or(false);
    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };
    let body = warp::reply::json(&serde_json::json!({ "status": label }));
    Ok(warp::reply::with_status(with_api_security_headers(body), status).into_response())
}

pub fn auth_routes(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let register = warp::path!("api" / "auth" / "register")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(|request: RegisterRequest, state: AppState| async move {
            respond(handlers::auth::register(&state, request).await)
        });

    let verify = warp::path!("api" / "auth" / "verify" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(|token: String, state: AppState| async move {
            respond(handlers::auth::verify_email(&state, &token).await)
        });

    let resend = warp::path!("api" / "auth" / "verify" / "resend")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(|request: ResendVerificationRequest, state: AppState| async move {
            respond(handlers::auth::resend_verification(&state, request).await)
        });

    let login = warp::path!("api" / "auth" / "login")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state))
        .and_then(|request: LoginRequest, state: AppState| async move {
            respond(handlers::auth::login(&state, request).await)
        });

    register.or(verify).unify().or(resend).unify().or(login).unify()
}

pub fn user_routes(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "users" / i64)
        .and(warp::get())
        .and(with_identity(state.clone()))
        .and(with_state(state))
        .and_then(|user_id: i64, identity: Identity, state: AppState| async move {
            respond(handlers::users::get_user(&state, &identity, user_id).await)
        })
}

pub fn task_routes(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let list = warp::path!("api" / "tasks")
        .and(warp::get())
        .and(with_identity(state.clone()))
        .and(with_state(state.clone()))
        .and_then(|identity: Identity, state: AppState| async move {
            respond(handlers::tasks::list_tasks(&state, &identity).await)
        });

    let create = warp::path!("api" / "tasks")
        .and(warp::post())
        .and(with_identity(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(
            |identity: Identity, request: CreateTaskRequest, state: AppState| async move {
                respond(handlers::tasks::create_task(&state, &identity, request).await)
            },
        );

    let get = warp::path!("api" / "tasks" / i64)
        .and(warp::get())
        .and(with_identity(state.clone()))
        .and(with_state(state.clone()))
        .and_then(|task_id: i64, identity: Identity, state: AppState| async move {
            respond(handlers::tasks::get_task(&state, &identity, task_id).await)
        });

    let update = warp::path!("api" / "tasks" / i64)
        .and(warp::put())
        .and(with_identity(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(
            |task_id: i64, identity: Identity, request: UpdateTaskRequest, state: AppState| async move {
                respond(handlers::tasks::update_task(&state, &identity, task_id, request).await)
            },
        );

    let status = warp::path!("api" / "tasks" / i64 / "status")
        .and(warp::put())
        .and(with_identity(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(
            |task_id: i64, identity: Identity, request: UpdateStatusRequest, state: AppState| async move {
                respond(handlers::tasks::update_status(&state, &identity, task_id, request).await)
            },
        );

    let delete = warp::path!("api" / "tasks" / i64)
        .and(warp::delete())
        .and(with_identity(state.clone()))
        .and(with_state(state))
        .and_then(|task_id: i64, identity: Identity, state: AppState| async move {
            respond(handlers::tasks::delete_task(&state, &identity, task_id).await)
        });

    list.or(create)
        .unify()
        .or(get)
        .unify()
        .or(update)
        .unify()
        .or(status)
        .unify()
        .or(delete)
        .unify()
}

pub fn admin_routes(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let list_users = warp::path!("api" / "admin" / "users")
        .and(warp::get())
        .and(with_identity(state.clone()))
        .and(with_state(state.clone()))
        .and_then(|identity: Identity, state: AppState| async move {
            respond(handlers::admin::list_users(&state, &identity).await)
        });

    let update_role = warp::path!("api" / "admin" / "users" / i64 / "role")
        .and(warp::put())
        .and(with_identity(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(
            |user_id: i64, identity: Identity, request: RoleUpdateRequest, state: AppState| async move {
                respond(handlers::admin::update_role(&state, &identity, user_id, request).await)
            },
        );

    let delete_user = warp::path!("api" / "admin" / "users" / i64)
        .and(warp::delete())
        .and(with_identity(state.clone()))
        .and(with_state(state.clone()))
        .and_then(|user_id: i64, identity: Identity, state: AppState| async move {
            respond(handlers::admin::delete_user(&state, &identity, user_id).await)
        });

    let list_tasks = warp::path!("api" / "admin" / "tasks")
        .and(warp::get())
        .and(with_identity(state.clone()))
        .and(with_state(state.clone()))
        .and_then(|identity: Identity, state: AppState| async move {
            respond(handlers::admin::list_all_tasks(&state, &identity).await)
        });

    let delete_task = warp::path!("api" / "admin" / "tasks" / i64)
        .and(warp::delete())
        .and(with_identity(state.clone()))
        .and(with_state(state.clone()))
        .and_then(|task_id: i64, identity: Identity, state: AppState| async move {
            respond(handlers::admin::delete_task(&state, &identity, task_id).await)
        });

    let seed = warp::path!("api" / "admin" / "seed")
        .and(warp::post())
        .and(with_optional_identity(state.clone()))
        .and(json_body())
        .and(with_state(state))
        .and_then(
            |caller: Option<Identity>, request: SeedRequest, state: AppState| async move {
                respond(handlers::admin::seed_admin(&state, caller.as_ref(), request).await)
            },
        );

    list_users
        .or(update_role)
        .unify()
        .or(delete_user)
        .unify()
        .or(list_tasks)
        .unify()
        .or(delete_task)
        .unify()
        .or(seed)
        .unify()
}

/// Turns every rejection into a JSON error body with a stable code
pub async fn handle_rejection(err: Rejection) -> std::result::Result<impl Reply, Infallible> {
    let (status, code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found".to_string())
    } else if let Some(e) = err.find::<RustyTasksError>() {
        if e.status_code().is_server_error() {
            log::error!("Request failed: {}", e);
        }
        (e.status_code(), e.error_code(), e.public_message())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Invalid request body: {}", e),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "PAYLOAD_TOO_LARGE",
            "Request body too large".to_string(),
        )
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_MEDIA_TYPE",
            "Expected application/json".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "METHOD_NOT_ALLOWED",
            "Method not allowed".to_string(),
        )
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "SYSTEM_ERROR",
            "Internal server error".to_string(),
        )
    };

    let body = warp::reply::json(&ErrorResponse { code, error: message });
    Ok(with_api_security_headers(warp::reply::with_status(body, status)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_token_redacted_from_log_path() {
        let path = "/api/auth/verify/eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOjF9.c2lnbmF0dXJl";
        let logged = redacted_path(path);
        assert_eq!(logged, "/api/auth/verify/<redacted>");
        assert!(!logged.contains("eyJ"));
    }

    #[test]
    fn test_other_paths_logged_verbatim() {
        for path in ["/api/auth/verify/resend", "/api/tasks/3", "/", "/api/auth/verify/"] {
            assert_eq!(redacted_path(path), path);
        }
    }
}

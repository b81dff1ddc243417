//! REST routes and handlers.
//!
//! Every dynamic endpoint runs the same linear sequence per request:
//! authenticate, fetch, map, serialize. Nothing is cached between requests.

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http::{StatusCode, header};
use serde::Serialize;
use tracing::error;

use crate::error::UpstreamError;
use crate::services::calls::{self, CallStatus};
use crate::services::devices::{self, SipDevice};
use crate::services::directory::{self, Contact};
use crate::services::phonebook;
use crate::startup::AppState;

/// Fixed liveness message.
const HEALTH_MESSAGE: &str = "Company Phonebook Directory Server is running";

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct DirectoryResponse {
    success: bool,
    contacts: Vec<Contact>,
    total: usize,
}

#[derive(Serialize)]
struct CallsResponse {
    success: bool,
    calls: Vec<CallStatus>,
}

#[derive(Serialize)]
struct DevicesResponse {
    success: bool,
    devices: Vec<SipDevice>,
}

/// JSON failure envelope shared by all API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Build the application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/directory", get(directory_handler))
        .route("/phonebook.xml", get(phonebook_handler))
        .route("/api/calls", get(calls_handler))
        .route("/api/devices", get(devices_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(state.index_html.as_ref().to_owned())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: HEALTH_MESSAGE,
    })
}

async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("Route not found")),
    )
        .into_response()
}

/// Authenticate and fetch the normalized contact list.
async fn load_contacts(state: &AppState) -> Result<Vec<Contact>, UpstreamError> {
    let session = state.upstream.authenticate().await?;
    let users = state.upstream.list_users(&session).await?;
    Ok(directory::normalize(users))
}

async fn directory_handler(State(state): State<AppState>) -> Response {
    match load_contacts(&state).await {
        Ok(contacts) => {
            let total = contacts.len();
            Json(DirectoryResponse {
                success: true,
                contacts,
                total,
            })
            .into_response()
        }
        Err(err) => {
            error!(error = %err, "Directory request failed");
            json_error(&err)
        }
    }
}

async fn phonebook_handler(State(state): State<AppState>) -> Response {
    match load_contacts(&state).await {
        Ok(contacts) => xml_response(StatusCode::OK, phonebook::render_phonebook(&contacts)),
        Err(err) => {
            error!(error = %err, "Phonebook request failed");
            xml_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                phonebook::render_error(&err.user_message()),
            )
        }
    }
}

async fn calls_handler(State(state): State<AppState>) -> Response {
    let result = async {
        let session = state.upstream.authenticate().await?;
        let active = state.upstream.active_calls(&session).await?;
        Ok::<_, UpstreamError>(calls::summarize(active))
    }
    .await;

    match result {
        Ok(calls) => Json(CallsResponse {
            success: true,
            calls,
        })
        .into_response(),
        Err(err) => {
            error!(error = %err, "Calls request failed");
            json_error(&err)
        }
    }
}

async fn devices_handler(State(state): State<AppState>) -> Response {
    let session = match state.upstream.authenticate().await {
        Ok(session) => session,
        Err(err) => {
            error!(error = %err, "Devices request failed");
            return json_error(&UpstreamError::from(err));
        }
    };

    let Some(user_id) = session.user_id.clone() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(
                "Error: user id not found in login response",
            )),
        )
            .into_response();
    };

    match state.upstream.list_devices(&session).await {
        Ok(device_map) => Json(DevicesResponse {
            success: true,
            devices: devices::provision(device_map, &user_id, &state.config),
        })
        .into_response(),
        Err(err) => {
            error!(error = %err, "Devices request failed");
            json_error(&UpstreamError::from(err))
        }
    }
}

fn json_error(err: &UpstreamError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(err.user_message())),
    )
        .into_response()
}

fn xml_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/xml")],
        body,
    )
        .into_response()
}

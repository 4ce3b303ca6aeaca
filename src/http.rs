// 🌐 HTTP layer - axum router, handlers and the error sink
//
//   GET  /api/v1/health
//   POST /api/v1/internal/bank

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Environment;
use crate::crud::{AuthError, Authenticator, CrudController, CrudError, Permission, SecurityConfig};
use crate::entities::{BankError, BankRegistry};
use crate::response::{error_response, success_response};
use crate::schema::{CreateBankSchema, RequestParams, ValidationError};

const BANK_SECURABLE: &str = "BANK";

// ============================================================================
// ERROR SINK
// ============================================================================

/// An error on its way to the client
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    /// Always sent (e.g. field errors)
    pub details: Option<Value>,
    /// Only sent in development
    pub debug: Option<String>,
}

impl HttpError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        HttpError {
            status,
            code,
            message: message.into(),
            details: None,
            debug: None,
        }
    }

    /// The fixed 500 every unexpected failure collapses to
    pub fn general() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An unexpected error occurred",
        )
    }

    pub fn validation(errors: &[ValidationError]) -> Self {
        let mut err = Self::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Request validation failed",
        );
        err.details = serde_json::to_value(errors).ok();
        err
    }

    pub fn with_debug(mut self, source: &(dyn std::error::Error + 'static)) -> Self {
        self.debug = Some(error_chain(source));
        self
    }
}

impl From<CrudError> for HttpError {
    fn from(err: CrudError) -> Self {
        match err {
            CrudError::Validation(errors) => HttpError::validation(&errors),
            CrudError::Auth(auth @ AuthError::Unauthenticated(_)) => {
                HttpError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", auth.to_string())
            }
            CrudError::Auth(auth @ AuthError::Forbidden { .. }) => {
                HttpError::new(StatusCode::FORBIDDEN, "FORBIDDEN", auth.to_string())
            }
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::new(StatusCode::BAD_REQUEST, "INVALID_JSON", rejection.body_text())
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Renders [`HttpError`]s as error envelopes and logs them
#[derive(Debug, Clone, Copy)]
pub struct ErrorSink {
    expose_debug: bool,
}

impl ErrorSink {
    pub fn new(environment: Environment) -> Self {
        ErrorSink {
            expose_debug: environment.is_development(),
        }
    }

    pub fn render(&self, err: HttpError, method: &Method, uri: &Uri) -> Response {
        if err.status.is_server_error() {
            tracing::error!(
                code = err.code,
                message = %err.message,
                method = %method,
                path = uri.path(),
                debug = ?err.debug,
                "request failed"
            );
        } else {
            tracing::warn!(
                code = err.code,
                message = %err.message,
                method = %method,
                path = uri.path(),
                "request rejected"
            );
        }

        let mut body = error_response(err.message, Some(err.code));
        let debug = err.debug.filter(|_| self.expose_debug).map(Value::String);
        if let Some(details) = err.details.or(debug) {
            body = body.with_details(details);
        }

        (err.status, Json(body)).into_response()
    }
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub banks: Arc<BankRegistry>,
    pub authenticator: Arc<dyn Authenticator>,
    pub errors: ErrorSink,
}

impl AppState {
    pub fn new(
        banks: BankRegistry,
        authenticator: impl Authenticator + 'static,
        environment: Environment,
    ) -> Self {
        AppState {
            banks: Arc::new(banks),
            authenticator: Arc::new(authenticator),
            errors: ErrorSink::new(environment),
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/v1/health
async fn health_check() -> impl IntoResponse {
    Json(success_response("OK"))
}

/// POST /api/v1/internal/bank
async fn create_bank(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    path: Option<Path<HashMap<String, String>>>,
    Query(query): Query<HashMap<String, String>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(Value::Object(map))) => map,
        Ok(Json(_)) => {
            let err = HttpError::validation(&[ValidationError::new("body", "Expected object")]);
            return state.errors.render(err, &method, &uri);
        }
        Err(rejection) => return state.errors.render(rejection.into(), &method, &uri),
    };

    let request = RequestParams {
        path: path.map(|Path(p)| p).unwrap_or_default(),
        query,
        body,
    };

    let operation = CrudController::new(
        vec![SecurityConfig::new(BANK_SECURABLE, Permission::Create)],
        Arc::clone(&state.authenticator),
    );

    let validated = match operation.create(&request, &CreateBankSchema::new()) {
        Ok(validated) => validated,
        Err(err) => return state.errors.render(err.into(), &method, &uri),
    };

    match state.banks.create_bank(
        validated.credential.account_id,
        validated.credential.user_id,
        &validated.params.code,
        &validated.params.name,
    ) {
        Ok(bank) => (StatusCode::CREATED, Json(success_response(bank))).into_response(),
        Err(BankError::DuplicateCode { .. }) => (
            StatusCode::CONFLICT,
            Json(error_response("Bank code already exists", Some("DUPLICATE_CODE"))),
        )
            .into_response(),
        Err(err) => state
            .errors
            .render(HttpError::general().with_debug(&err), &method, &uri),
    }
}

/// Fallback for unknown routes
async fn not_found(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let err = HttpError::new(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        format!("Route {} {} not found", method, uri.path()),
    );
    state.errors.render(err, &method, &uri)
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let internal_routes = Router::new().route("/bank", post(create_bank));

    let v1_routes = Router::new()
        .route("/health", get(health_check))
        .nest("/internal", internal_routes);

    Router::new()
        .nest("/api/v1", v1_routes)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

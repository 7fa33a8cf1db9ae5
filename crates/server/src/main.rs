use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get},
    Form, Json, Router,
};
use server_api::{
    create_document_set, delete_document_set, health, home_page, list_document_sets, ApiContext,
    CreateOutcome,
};
use shared::{
    domain::{DocumentSet, DocumentSetId},
    error::ApiError,
    form::DocumentSetFormData,
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod views;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

pub(crate) const DOCUMENT_SETS_ROUTE: &str = "/documentSets";

const MAX_FORM_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext::new(storage),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/healthz", get(healthz))
        .route(
            DOCUMENT_SETS_ROUTE,
            get(show_document_sets).post(new_document_set),
        )
        .route(
            "/documentSets/:id",
            delete(remove_document_set).post(remove_document_set),
        )
        .route("/api/documentSets", get(api_list_document_sets))
        .layer(RequestBodyLimitLayer::new(MAX_FORM_BYTES))
        .with_state(state)
}

/// Failure rendered as an HTML page. Validation failures never take this
/// path; they are re-rendered forms.
struct PageError(ApiError);

impl From<ApiError> for PageError {
    fn from(value: ApiError) -> Self {
        Self(value)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error!(code = ?self.0.code, message = %self.0.message, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            views::error_page(&self.0.message),
        )
            .into_response()
    }
}

async fn home() -> Html<String> {
    views::home(&home_page())
}

async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match health(&state.api).await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            error!(message = %err.message, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    }
}

async fn show_document_sets(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, PageError> {
    let page = list_document_sets(&state.api).await?;
    Ok(views::document_sets(&page))
}

async fn new_document_set(
    State(state): State<Arc<AppState>>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Response, PageError> {
    // An unreadable body binds nothing, so it is rejected by validation like
    // an empty submission.
    let data = match form {
        Ok(Form(pairs)) => DocumentSetFormData::from_pairs(pairs),
        Err(rejection) => {
            warn!(%rejection, "unreadable document set form");
            DocumentSetFormData::default()
        }
    };
    match create_document_set(&state.api, data).await? {
        CreateOutcome::Created(_) => Ok(Redirect::to(DOCUMENT_SETS_ROUTE).into_response()),
        CreateOutcome::Rejected(page) => {
            Ok((StatusCode::BAD_REQUEST, views::document_sets(&page)).into_response())
        }
    }
}

async fn remove_document_set(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Redirect, PageError> {
    delete_document_set(&state.api, DocumentSetId(id)).await?;
    Ok(Redirect::to(DOCUMENT_SETS_ROUTE))
}

async fn api_list_document_sets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DocumentSet>>, (StatusCode, Json<ApiError>)> {
    let page = list_document_sets(&state.api)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(e)))?;
    Ok(Json(page.document_sets))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

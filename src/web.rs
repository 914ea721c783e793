//! Web server for the catalog UI
//!
//! Exposes the curation and listing contracts as a small JSON API plus a
//! static index page. Rendering decisions (including how many columns to
//! ask for) belong to the page, not to this layer.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::curation::{Curation, CurationForm, CurationOutcome, CurationRequest};
use crate::database::{list_artist_names, list_skip_sequences};
use crate::error::TrackerError;
use crate::models::Product;
use crate::query::{list_products, partition_into_rows, ProductFilter};

/// Shared application state (thread-safe database connection + curation service)
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    curation: Arc<Curation>,
}

/// Listing query parameters
#[derive(Deserialize)]
struct ListingParams {
    artist: Option<String>,
    #[serde(default = "default_columns")]
    columns: usize,
}

fn default_columns() -> usize {
    3
}

/// Skip sequence query parameters
#[derive(Deserialize)]
struct SkipParams {
    artist: String,
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Product listing response: row-groups ready for grid layout
#[derive(Serialize)]
struct ListingData {
    rows: Vec<Vec<Product>>,
}

/// GET / - Serve the web UI (single HTML page)
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// GET /api/artists - tracked artist names for the configured site
async fn artists_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, StatusCode> {
    let conn = state.db.lock().unwrap();
    match list_artist_names(&conn, state.curation.site()) {
        Ok(names) => Ok(Json(ApiResponse {
            success: true,
            data: Some(names),
            error: None,
        })),
        Err(e) => {
            log::error!("Failed to list artists: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/products?artist={name}&columns={n}
async fn products_handler(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Response {
    let conn = state.db.lock().unwrap();
    let filter = ProductFilter {
        artist: params.artist,
    };

    let products = match list_products(&conn, &filter) {
        Ok(products) => products,
        Err(e) => {
            log::error!("Failed to list products: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match partition_into_rows(products, params.columns) {
        Ok(rows) => Json(ApiResponse {
            success: true,
            data: Some(ListingData { rows }),
            error: None,
        })
        .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<ListingData> {
                success: false,
                data: None,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

/// GET /api/skip-sequences?artist={name}
async fn skip_sequences_handler(
    State(state): State<AppState>,
    Query(params): Query<SkipParams>,
) -> Result<Json<ApiResponse<Vec<String>>>, StatusCode> {
    let conn = state.db.lock().unwrap();
    match list_skip_sequences(&conn, &params.artist, state.curation.site()) {
        Ok(sequences) => Ok(Json(ApiResponse {
            success: true,
            data: Some(sequences),
            error: None,
        })),
        Err(e) => {
            log::error!("Failed to list skip sequences: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/curation - form-shaped curation request
///
/// Unknown or incomplete actions are accepted no-ops. A duplicate artist is
/// the one validation failure reported as an explicit error (409).
async fn curation_handler(State(state): State<AppState>, Json(form): Json<CurationForm>) -> Response {
    let Some(request) = CurationRequest::from_form(&form) else {
        log::debug!("Ignoring curation request with unknown action {:?}", form.action);
        return Json(ApiResponse {
            success: true,
            data: Some("ignored"),
            error: None,
        })
        .into_response();
    };

    let mut conn = state.db.lock().unwrap();
    match state.curation.handle(&mut conn, request) {
        Ok(CurationOutcome::Applied) => Json(ApiResponse {
            success: true,
            data: Some("applied"),
            error: None,
        })
        .into_response(),
        Ok(CurationOutcome::Ignored) => Json(ApiResponse {
            success: true,
            data: Some("ignored"),
            error: None,
        })
        .into_response(),
        Err(e @ TrackerError::DuplicateArtist { .. }) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<&str> {
                success: false,
                data: None,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
        Err(e) => {
            log::error!("Curation request failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Build the web server router
pub fn create_router(db: Arc<Mutex<Connection>>, curation: Arc<Curation>) -> Router {
    let state = AppState { db, curation };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/artists", get(artists_handler))
        .route("/api/products", get(products_handler))
        .route("/api/skip-sequences", get(skip_sequences_handler))
        .route("/api/curation", post(curation_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server (async)
///
/// Binds to 0.0.0.0 (all interfaces) to work with Docker port mapping.
/// When running locally, use firewall rules to restrict access.
pub async fn serve(
    db: Arc<Mutex<Connection>>,
    curation: Arc<Curation>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(db, curation);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Web UI listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

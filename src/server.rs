//! REST facade over the scraper.
//!
//! A stateless set of axum handlers around one shared `Scraper`. All input
//! validation happens here; the core never sees a missing term or an
//! out-of-bounds count.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::options::{DateRange, SearchOptions, MAX_RESULTS, MIN_RESULTS};
use crate::search::Scraper;

/// Query parameters for the simple search endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search term.
    pub q: Option<String>,
    /// Number of results.
    pub num: Option<usize>,
    /// Language code.
    pub lang: Option<String>,
    /// Safe search flag.
    pub safe: Option<bool>,
}

/// JSON body for the advanced search endpoint.
#[derive(Debug, Deserialize)]
pub struct AdvancedSearchRequest {
    /// Search term.
    pub query: String,
    /// Restrict to a single domain.
    pub site: Option<String>,
    /// Restrict to a file extension.
    pub filetype: Option<String>,
    /// Recency filter name (day, week, month, year); unknown values are
    /// silently dropped.
    pub date_range: Option<String>,
    /// Language code.
    pub language: Option<String>,
    /// Number of results.
    pub num_results: Option<usize>,
    /// Safe search flag.
    pub safe_search: Option<bool>,
}

/// Builds the facade router over a shared scraper.
pub fn router(scraper: Arc<Scraper>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", get(simple_search))
        .route("/search/advanced", post(advanced_search))
        .route("/search/site/:domain", get(site_search))
        .route("/search/filetype/:ext", get(filetype_search))
        .route("/stats", get(stats))
        .route("/reset", post(reset))
        .with_state(scraper)
}

/// Binds and serves the facade until ctrl-c.
pub async fn serve(scraper: Arc<Scraper>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, router(scraper))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}

/// Checks term and count bounds; the core is only reached on `Ok`.
fn validate(term: Option<&str>, num: Option<usize>) -> Result<(String, usize), String> {
    let term = term.unwrap_or_default().trim().to_string();
    if term.is_empty() {
        return Err("query term is required".to_string());
    }
    let num = num.unwrap_or(10);
    if !(MIN_RESULTS..=MAX_RESULTS).contains(&num) {
        return Err(format!(
            "num must be between {} and {}",
            MIN_RESULTS, MAX_RESULTS
        ));
    }
    Ok((term, num))
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

async fn index() -> Response {
    Json(json!({
        "service": "serpscout",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "search": "/search",
            "advanced_search": "/search/advanced",
            "site_search": "/search/site/{domain}",
            "filetype_search": "/search/filetype/{ext}",
            "stats": "/stats",
            "reset": "/reset",
        },
    }))
    .into_response()
}

async fn simple_search(
    State(scraper): State<Arc<Scraper>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let (term, num) = match validate(params.q.as_deref(), params.num) {
        Ok(valid) => valid,
        Err(message) => return bad_request(message),
    };
    let options = SearchOptions::new(term)
        .with_num_results(num)
        .with_language(params.lang.unwrap_or_else(|| "en".to_string()))
        .with_safe_search(params.safe.unwrap_or(false));
    Json(scraper.search(&options).await).into_response()
}

async fn advanced_search(
    State(scraper): State<Arc<Scraper>>,
    Json(request): Json<AdvancedSearchRequest>,
) -> Response {
    let (term, num) = match validate(Some(&request.query), request.num_results) {
        Ok(valid) => valid,
        Err(message) => return bad_request(message),
    };
    let mut options = SearchOptions::new(term)
        .with_num_results(num)
        .with_language(request.language.unwrap_or_else(|| "en".to_string()))
        .with_safe_search(request.safe_search.unwrap_or(false));
    if let Some(site) = request.site {
        options = options.with_site(site);
    }
    if let Some(filetype) = request.filetype {
        options = options.with_filetype(filetype);
    }
    if let Some(range) = request.date_range.as_deref().and_then(DateRange::parse) {
        options = options.with_date_range(range);
    }
    Json(scraper.search(&options).await).into_response()
}

async fn site_search(
    State(scraper): State<Arc<Scraper>>,
    Path(domain): Path<String>,
    Query(params): Query<SearchParams>,
) -> Response {
    let (term, num) = match validate(params.q.as_deref(), params.num) {
        Ok(valid) => valid,
        Err(message) => return bad_request(message),
    };
    let options = SearchOptions::new(term)
        .with_num_results(num)
        .with_language(params.lang.unwrap_or_else(|| "en".to_string()))
        .with_site(domain);
    Json(scraper.search(&options).await).into_response()
}

async fn filetype_search(
    State(scraper): State<Arc<Scraper>>,
    Path(ext): Path<String>,
    Query(params): Query<SearchParams>,
) -> Response {
    let (term, num) = match validate(params.q.as_deref(), params.num) {
        Ok(valid) => valid,
        Err(message) => return bad_request(message),
    };
    let options = SearchOptions::new(term)
        .with_num_results(num)
        .with_language(params.lang.unwrap_or_else(|| "en".to_string()))
        .with_filetype(ext);
    Json(scraper.search(&options).await).into_response()
}

async fn stats(State(scraper): State<Arc<Scraper>>) -> Response {
    Json(scraper.stats().await).into_response()
}

async fn reset(State(scraper): State<Arc<Scraper>>) -> Response {
    scraper.reset().await;
    Json(json!({ "message": "scraper reset" })).into_response()
}

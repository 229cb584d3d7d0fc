use crate::config::Config;
use crate::error::{error_response, ApiError};
use crate::media::{MediaType, SearchType};
use crate::rate_limit::{rate_limit, RateLimiter};
use crate::tmdb::{TmdbApi, TmdbClient};
use anyhow::Result;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    middleware,
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::{any::Any, net::SocketAddr, path::Path, sync::Arc};
use tower_http::{
    catch_panic::CatchPanicLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, info};

const MSG_TYPE_MOVIE_TV: &str = "Parâmetro \"type\" deve ser movie ou tv";
const MSG_TYPE_SEARCH: &str = "Parâmetro \"type\" deve ser movie, tv ou multi";
const MSG_QUERY_REQUIRED: &str = "Parâmetro \"query\" é obrigatório";
const MSG_ID_TYPE_REQUIRED: &str = "Parâmetros \"id\" e \"type\" são obrigatórios";
const MSG_ID_INVALID: &str = "Parâmetro \"id\" deve ser um número inteiro positivo";
const MSG_BAD_QUERY: &str = "Parâmetros de consulta inválidos";

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
}

pub async fn run_server(config: Config) -> Result<()> {
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::new(
        config.tmdb_api_key.clone(),
        config.tmdb_base_url.clone(),
    )?);
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max,
        config.rate_limit_window_secs,
    ));
    info!(
        "Rate limit: {} requests per {}s per caller",
        config.rate_limit_max, config.rate_limit_window_secs
    );

    let app = build_router(AppState { tmdb }, limiter, &config.static_dir);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

/// API routes under `/api` (rate limited), `/health`, and the entry document
/// served from `static_dir` for every other path.
pub fn build_router(state: AppState, limiter: Arc<RateLimiter>, static_dir: &Path) -> Router {
    let api = Router::new()
        .route("/trending", get(trending))
        .route("/search", get(search))
        .route("/details", get(details))
        .route("/credits", get(credits))
        .route("/recommendations", get(recommendations))
        .route_layer(middleware::from_fn_with_state(limiter, rate_limit))
        .with_state(state);

    let index = static_dir.join("index.html");
    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    #[serde(rename = "type")]
    media_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    query: Option<String>,
    #[serde(rename = "type")]
    search_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MediaParams {
    id: Option<String>,
    #[serde(rename = "type")]
    media_type: Option<String>,
}

async fn trending(
    State(state): State<AppState>,
    params: Result<Query<TrendingParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params.map_err(|_| ApiError::invalid(MSG_BAD_QUERY))?;
    let media = parse_or_default::<MediaType>(params.media_type.as_deref(), MSG_TYPE_MOVIE_TV)?;
    state
        .tmdb
        .trending(media)
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream("Erro ao buscar trending", e))
}

async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params.map_err(|_| ApiError::invalid(MSG_BAD_QUERY))?;
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::invalid(MSG_QUERY_REQUIRED))?;
    let kind = parse_or_default::<SearchType>(params.search_type.as_deref(), MSG_TYPE_SEARCH)?;
    state
        .tmdb
        .search(kind, query)
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream("Erro ao buscar no TMDB", e))
}

async fn details(
    State(state): State<AppState>,
    params: Result<Query<MediaParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let (media, id) = media_target(params)?;
    state
        .tmdb
        .details(media, id)
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream("Erro ao buscar detalhes", e))
}

async fn credits(
    State(state): State<AppState>,
    params: Result<Query<MediaParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let (media, id) = media_target(params)?;
    state
        .tmdb
        .credits(media, id)
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream("Erro ao buscar créditos", e))
}

async fn recommendations(
    State(state): State<AppState>,
    params: Result<Query<MediaParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let (media, id) = media_target(params)?;
    state
        .tmdb
        .recommendations(media, id)
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream("Erro ao buscar recomendações", e))
}

/// Missing or blank selects the default; anything else must parse.
fn parse_or_default<T>(raw: Option<&str>, message: &str) -> Result<T, ApiError>
where
    T: std::str::FromStr + Default,
{
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(T::default()),
        Some(v) => v.parse().map_err(|_| ApiError::invalid(message)),
    }
}

fn media_target(
    params: Result<Query<MediaParams>, QueryRejection>,
) -> Result<(MediaType, u64), ApiError> {
    let Query(params) = params.map_err(|_| ApiError::invalid(MSG_BAD_QUERY))?;
    let present = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(id), Some(media)) = (present(params.id), present(params.media_type)) else {
        return Err(ApiError::invalid(MSG_ID_TYPE_REQUIRED));
    };
    let media: MediaType = media
        .parse()
        .map_err(|_| ApiError::invalid(MSG_TYPE_MOVIE_TV))?;
    let id = parse_tmdb_id(&id).ok_or_else(|| ApiError::invalid(MSG_ID_INVALID))?;
    Ok((media, id))
}

/// TMDB ids are positive integers; anything else would splice into the upstream path.
pub fn parse_tmdb_id(input: &str) -> Option<u64> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    input.parse().ok().filter(|id| *id > 0)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno do servidor")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmdb_id_must_be_positive_digits() {
        assert_eq!(parse_tmdb_id("550"), Some(550));
        assert_eq!(parse_tmdb_id("0"), None);
        assert_eq!(parse_tmdb_id("-1"), None);
        assert_eq!(parse_tmdb_id("550/videos"), None);
        assert_eq!(parse_tmdb_id("abc"), None);
        assert_eq!(parse_tmdb_id(""), None);
    }

    #[test]
    fn blank_type_selects_default() {
        let media: MediaType = parse_or_default(Some(" "), MSG_TYPE_MOVIE_TV).unwrap();
        assert_eq!(media, MediaType::Movie);
        let kind: SearchType = parse_or_default(Some("multi"), MSG_TYPE_SEARCH).unwrap();
        assert_eq!(kind, SearchType::Multi);
        assert!(parse_or_default::<MediaType>(Some("person"), MSG_TYPE_MOVIE_TV).is_err());
    }
}

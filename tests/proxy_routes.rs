use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use telaflix::app::{build_router, AppState};
use telaflix::media::{MediaType, SearchType};
use telaflix::rate_limit::RateLimiter;
use telaflix::tmdb::TmdbApi;
use tempfile::TempDir;
use tower::util::ServiceExt;

const INDEX_HTML: &str = "<!DOCTYPE html><title>Telaflix</title>";
const STYLE_CSS: &str = "body { margin: 0; }";

#[derive(Default)]
struct FakeTmdb {
    calls: Mutex<Vec<String>>,
    fail: bool,
    panic: bool,
}

impl FakeTmdb {
    fn respond(&self, call: String) -> anyhow::Result<Value> {
        if self.panic {
            panic!("upstream exploded");
        }
        self.calls.lock().unwrap().push(call.clone());
        if self.fail {
            anyhow::bail!("503 from upstream with secret detail");
        }
        Ok(json!({ "page": 1, "call": call, "results": [] }))
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn trending(&self, media: MediaType) -> anyhow::Result<Value> {
        self.respond(format!("trending/{media}"))
    }
    async fn search(&self, kind: SearchType, query: &str) -> anyhow::Result<Value> {
        self.respond(format!("search/{kind}?{query}"))
    }
    async fn details(&self, media: MediaType, id: u64) -> anyhow::Result<Value> {
        self.respond(format!("{media}/{id}"))
    }
    async fn credits(&self, media: MediaType, id: u64) -> anyhow::Result<Value> {
        self.respond(format!("{media}/{id}/credits"))
    }
    async fn recommendations(&self, media: MediaType, id: u64) -> anyhow::Result<Value> {
        self.respond(format!("{media}/{id}/recommendations"))
    }
}

struct TestApp {
    router: Router,
    tmdb: Arc<FakeTmdb>,
    _static_dir: TempDir,
}

fn app_with(tmdb: FakeTmdb, rate_limit_max: u32) -> TestApp {
    let static_dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(static_dir.path().join("index.html"), INDEX_HTML).expect("write index");
    std::fs::write(static_dir.path().join("style.css"), STYLE_CSS).expect("write stylesheet");
    let tmdb = Arc::new(tmdb);
    let state = AppState { tmdb: tmdb.clone() };
    let limiter = Arc::new(RateLimiter::new(rate_limit_max, 60));
    TestApp {
        router: build_router(state, limiter, static_dir.path()),
        tmdb,
        _static_dir: static_dir,
    }
}

fn app() -> TestApp {
    app_with(FakeTmdb::default(), 1000)
}

async fn get(router: &Router, uri: &str) -> Response {
    router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("json body")
}

async fn body_text(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn trending_relays_upstream_body_for_both_types() {
    let app = app();
    for media in ["movie", "tv"] {
        let res = get(&app.router, &format!("/api/trending?type={media}")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["call"], format!("trending/{media}"));
        assert_eq!(body["page"], 1);
    }
    assert_eq!(app.tmdb.calls(), vec!["trending/movie", "trending/tv"]);
}

#[tokio::test]
async fn trending_defaults_to_movie() {
    let app = app();
    let res = get(&app.router, "/api/trending").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(app.tmdb.calls(), vec!["trending/movie"]);
}

#[tokio::test]
async fn trending_rejects_unknown_type_without_upstream_call() {
    let app = app();
    let res = get(&app.router, "/api/trending?type=person").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert!(body["error"].as_str().unwrap().contains("\"type\""));
    assert!(app.tmdb.calls().is_empty());
}

#[tokio::test]
async fn search_requires_non_blank_query() {
    let app = app();
    for uri in ["/api/search", "/api/search?query=", "/api/search?query=%20%20"] {
        let res = get(&app.router, uri).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = body_json(res).await;
        assert_eq!(body["error"], "Parâmetro \"query\" é obrigatório");
    }
    assert!(app.tmdb.calls().is_empty());
}

#[tokio::test]
async fn search_validates_type_and_forwards_trimmed_query() {
    let app = app();
    let res = get(&app.router, "/api/search?query=duna&type=person").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(app.tmdb.calls().is_empty());

    let res = get(&app.router, "/api/search?query=%20o%20poderoso%20&type=multi").await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = get(&app.router, "/api/search?query=duna").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        app.tmdb.calls(),
        vec!["search/multi?o poderoso", "search/movie?duna"]
    );
}

#[tokio::test]
async fn details_without_id_is_rejected_before_upstream() {
    let app = app();
    let res = get(&app.router, "/api/details?type=movie").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert_eq!(body, json!({ "error": "Parâmetros \"id\" e \"type\" são obrigatórios" }));
    assert!(app.tmdb.calls().is_empty());
}

#[tokio::test]
async fn media_routes_validate_id_and_type() {
    let app = app();
    for uri in [
        "/api/credits?id=550",
        "/api/credits?id=abc&type=movie",
        "/api/recommendations?id=550&type=person",
        "/api/details?id=550%2Fvideos&type=movie",
    ] {
        let res = get(&app.router, uri).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
    assert!(app.tmdb.calls().is_empty());
}

#[tokio::test]
async fn media_routes_forward_to_upstream() {
    let app = app();
    for uri in [
        "/api/details?id=550&type=movie",
        "/api/credits?id=1399&type=tv",
        "/api/recommendations?id=550&type=movie",
    ] {
        let res = get(&app.router, uri).await;
        assert_eq!(res.status(), StatusCode::OK, "{uri}");
    }
    assert_eq!(
        app.tmdb.calls(),
        vec!["movie/550", "tv/1399/credits", "movie/550/recommendations"]
    );
}

#[tokio::test]
async fn upstream_failure_is_generic_500() {
    let app = app_with(
        FakeTmdb {
            fail: true,
            ..Default::default()
        },
        1000,
    );
    let cases = [
        ("/api/trending?type=tv", "Erro ao buscar trending"),
        ("/api/search?query=x", "Erro ao buscar no TMDB"),
        ("/api/details?id=1&type=movie", "Erro ao buscar detalhes"),
        ("/api/credits?id=1&type=movie", "Erro ao buscar créditos"),
        ("/api/recommendations?id=1&type=tv", "Erro ao buscar recomendações"),
    ];
    for (uri, message) in cases {
        let res = get(&app.router, uri).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        let text = body_text(res).await;
        assert!(!text.contains("secret detail"));
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body, json!({ "error": message }));
    }
}

#[tokio::test]
async fn panicking_handler_becomes_json_500() {
    let app = app_with(
        FakeTmdb {
            panic: true,
            ..Default::default()
        },
        1000,
    );
    let res = get(&app.router, "/api/trending").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(res).await;
    assert_eq!(body["error"], "Erro interno do servidor");
}

#[tokio::test]
async fn rate_limit_reports_headers_and_rejects_over_quota() {
    let app = app_with(FakeTmdb::default(), 2);
    let request = |ip: &str| {
        Request::get("/api/trending")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    let res = app.router.clone().oneshot(request("198.51.100.1")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["ratelimit-limit"], "2");
    assert_eq!(res.headers()["ratelimit-remaining"], "1");
    assert!(res.headers().contains_key("ratelimit-reset"));

    let res = app.router.clone().oneshot(request("198.51.100.1")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(request("198.51.100.1")).await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers()["ratelimit-remaining"], "0");
    assert!(res.headers().contains_key("retry-after"));
    let body = body_json(res).await;
    assert!(body["error"].is_string());

    let res = app.router.clone().oneshot(request("198.51.100.2")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(app.tmdb.calls().len(), 3);
}

#[tokio::test]
async fn unmatched_paths_serve_entry_document() {
    let app = app();
    for uri in ["/", "/filmes/550", "/qualquer/coisa", "/api/desconhecido"] {
        let res = get(&app.router, uri).await;
        assert_eq!(res.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_text(res).await, INDEX_HTML);
    }
    let res = get(&app.router, "/style.css").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_text(res).await, STYLE_CSS);
    let res = get(&app.router, "/health").await;
    assert_eq!(body_text(res).await, "OK");
    assert!(app.tmdb.calls().is_empty());
}

//! Axum gateway for Medley: one JSON route per sidebar screen plus the
//! static single-page UI. Config-driven via MedleyConfig; the LLM API
//! key stays in the backend, the frontend never sees it.

mod handlers;
mod state;

use axum::routing::{delete, get, post};
use axum::Router;
use medley_core::{
    CompletionBridge, MarketDataClient, MedleyConfig, MemoizedGenerator, SessionRegistry,
    TextGenerator, UnconfiguredGenerator,
};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load .env first: the API key must be present before the bridge is built.
    if let Err(e) = dotenvy::dotenv() {
        eprintln!(
            "[medley-gateway] .env not loaded: {} (using system environment)",
            e
        );
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(MedleyConfig::from_env());

    let generator: Arc<dyn TextGenerator> = match CompletionBridge::from_env() {
        Some(bridge) => Arc::new(MemoizedGenerator::new(Arc::new(
            bridge
                .with_model(&config.model)
                .with_base_url(&config.completion_base)
                .with_timeout(config.request_timeout_secs),
        ))),
        None => {
            tracing::warn!(
                "OPENROUTER_API_KEY not set; the travel screen will show a visible error"
            );
            Arc::new(UnconfiguredGenerator)
        }
    };

    let market = Arc::new(
        MarketDataClient::new(&config.market_base).with_timeout(config.request_timeout_secs),
    );

    let state = AppState {
        generator,
        market,
        sessions: Arc::new(SessionRegistry::new()),
        config: Arc::clone(&config),
    };

    let addr: SocketAddr = config.bind_addr.parse()?;
    let app = build_app(state);
    tracing::info!(%addr, "medley gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Full route table: exactly one route set per sidebar module, the
/// session/transcript surface, and the static UI as fallback.
fn build_app(state: AppState) -> Router {
    let serve_dir = ServeDir::new(resolve_static_dir()).append_index_html_on_directories(true);
    Router::new()
        .route("/api/v1/health", get(handlers::sessions::health))
        .route("/api/v1/modules", get(handlers::sessions::modules_list))
        .route(
            "/api/v1/modules/:id",
            get(handlers::sessions::module_descriptor),
        )
        .route("/api/v1/session", post(handlers::sessions::open_session))
        .route(
            "/api/v1/session/:id",
            delete(handlers::sessions::close_session),
        )
        .route(
            "/api/v1/session/:id/transcript",
            get(handlers::sessions::transcript),
        )
        .route("/api/v1/travel/plan", post(handlers::travel::plan))
        .route("/api/v1/travel/download", post(handlers::travel::download))
        .route("/api/v1/table/summary", post(handlers::tables::summary))
        .route("/api/v1/table/chart", post(handlers::tables::chart))
        .route("/api/v1/map", get(handlers::sessions::map_view))
        .route("/api/v1/stocks/simulated", get(handlers::stocks::simulated))
        .route("/api/v1/stocks/symbols", get(handlers::stocks::symbols))
        .route("/api/v1/stocks/closes", post(handlers::stocks::closes))
        .layer(CorsLayer::permissive())
        .with_state(state)
        .fallback_service(serve_dir)
}

/// Static UI directory: next to the manifest in a checkout, cwd-relative
/// when run from the workspace root.
fn resolve_static_dir() -> PathBuf {
    let compiled = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");
    if compiled.exists() {
        return compiled;
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    cwd.join("add-ons").join("medley-gateway").join("static")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use medley_core::ToolError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct ScriptedGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn complete(&self, prompt: &str) -> Result<String, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("itinerary for [{}]", prompt))
        }
    }

    fn test_app() -> (Router, Arc<ScriptedGenerator>, AppState) {
        let scripted = Arc::new(ScriptedGenerator {
            calls: AtomicUsize::new(0),
        });
        let generator: Arc<dyn TextGenerator> = Arc::new(MemoizedGenerator::new(
            Arc::clone(&scripted) as Arc<dyn TextGenerator>
        ));
        let state = AppState {
            generator,
            // Unroutable: any test that reaches the network fails loudly.
            market: Arc::new(MarketDataClient::new("http://127.0.0.1:1")),
            sessions: Arc::new(SessionRegistry::new()),
            config: Arc::new(MedleyConfig::default()),
        };
        (build_app(state.clone()), scripted, state)
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _, _) = test_app();
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn modules_lists_all_seven() {
        let (app, _, _) = test_app();
        let res = app
            .oneshot(Request::get("/api/v1/modules").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(res).await;
        assert_eq!(body.as_array().unwrap().len(), 7);
        assert_eq!(body[0]["id"], "travel_planner");
    }

    #[tokio::test]
    async fn unknown_module_id_is_rejected() {
        let (app, _, _) = test_app();
        let res = app
            .oneshot(
                Request::get("/api/v1/modules/spreadsheet")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["kind"], "validation");
    }

    #[tokio::test]
    async fn travel_plan_memoizes_and_appends_in_order() {
        let (app, scripted, state) = test_app();
        let session_id = state.sessions.open();

        for city in ["Kyoto", "Kyoto", "Lisbon"] {
            let res = app
                .clone()
                .oneshot(json_post(
                    "/api/v1/travel/plan",
                    serde_json::json!({ "session_id": session_id, "city": city }),
                ))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        // Two distinct cities -> two upstream calls; the repeat was a cache hit.
        assert_eq!(scripted.calls.load(Ordering::SeqCst), 2);

        let res = app
            .oneshot(
                Request::get(format!("/api/v1/session/{}/transcript", session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(res).await;
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["query"], "Kyoto");
        assert_eq!(entries[2]["query"], "Lisbon");
    }

    #[tokio::test]
    async fn travel_plan_rejects_blank_city() {
        let (app, scripted, state) = test_app();
        let session_id = state.sessions.open();
        let res = app
            .oneshot(json_post(
                "/api/v1/travel/plan",
                serde_json::json!({ "session_id": session_id, "city": "   " }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(scripted.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn travel_plan_unknown_session_is_404() {
        let (app, _, _) = test_app();
        let res = app
            .oneshot(json_post(
                "/api/v1/travel/plan",
                serde_json::json!({ "session_id": uuid::Uuid::new_v4(), "city": "Kyoto" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn download_sets_filename_header() {
        let (app, _, _) = test_app();
        let res = app
            .oneshot(json_post(
                "/api/v1/travel/download",
                serde_json::json!({ "city": "Lisbon" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let disposition = res
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("Lisbon_trip.md"));
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"# Lisbon\n\n"));
    }

    #[tokio::test]
    async fn failed_download_carries_a_json_error_body() {
        // No API key wired: the download re-generates and fails upstream.
        // The UI shows this body inline, so it must always be present.
        let state = AppState {
            generator: Arc::new(medley_core::UnconfiguredGenerator),
            market: Arc::new(MarketDataClient::new("http://127.0.0.1:1")),
            sessions: Arc::new(SessionRegistry::new()),
            config: Arc::new(MedleyConfig::default()),
        };
        let res = build_app(state)
            .oneshot(json_post(
                "/api/v1/travel/download",
                serde_json::json!({ "city": "Lisbon" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(res).await;
        assert_eq!(body["kind"], "remote");
        assert!(body["error"].as_str().unwrap().contains("OPENROUTER_API_KEY"));
    }

    #[tokio::test]
    async fn csv_summary_round_trips() {
        let (app, _, _) = test_app();
        let res = app
            .oneshot(
                Request::post("/api/v1/table/summary")
                    .header("content-type", "text/csv")
                    .body(Body::from("x,y\n1,2\n3,4\n"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["row_count"], 2);
        assert_eq!(body["columns"][0]["name"], "x");
        assert_eq!(body["columns"][0]["dtype"], "numeric");
    }

    #[tokio::test]
    async fn malformed_csv_is_400_with_message() {
        let (app, _, _) = test_app();
        let res = app
            .oneshot(
                Request::post("/api/v1/table/summary")
                    .header("content-type", "text/csv")
                    .body(Body::from("x,y\n1,2\n3,4,5\n"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["kind"], "malformed_input");
    }

    #[tokio::test]
    async fn negative_pie_values_are_422() {
        let (app, _, _) = test_app();
        let res = app
            .oneshot(json_post(
                "/api/v1/table/chart",
                serde_json::json!({
                    "csv": "label,v\na,5\nb,-1\n",
                    "chart_type": "pie",
                    "x": "label",
                    "y": "v",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(res).await;
        assert_eq!(body["kind"], "render");
    }

    #[tokio::test]
    async fn inverted_date_range_never_reaches_the_network() {
        let (app, _, _) = test_app();
        let res = app
            .oneshot(json_post(
                "/api/v1/stocks/closes",
                serde_json::json!({
                    "symbols": ["AAPL"],
                    "start": "2023-06-01",
                    "end": "2023-01-01",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["kind"], "validation");
    }

    #[tokio::test]
    async fn empty_symbol_set_is_an_empty_chart() {
        let (app, _, _) = test_app();
        let res = app
            .oneshot(json_post(
                "/api/v1/stocks/closes",
                serde_json::json!({
                    "symbols": [],
                    "start": "2023-01-01",
                    "end": "2023-06-01",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["points"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn simulated_series_honors_seed_and_points() {
        let (app, _, _) = test_app();
        let res = app
            .clone()
            .oneshot(
                Request::get("/api/v1/stocks/simulated?points=10&seed=7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let a = body_json(res).await;
        let res = app
            .oneshot(
                Request::get("/api/v1/stocks/simulated?points=10&seed=7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let b = body_json(res).await;
        assert_eq!(a["ys"].as_array().unwrap().len(), 10);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn map_returns_fixed_points() {
        let (app, _, _) = test_app();
        let res = app
            .oneshot(Request::get("/api/v1/map").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(res).await;
        assert_eq!(body["kind"], "map");
        assert_eq!(body["points"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn closing_a_session_drops_its_transcript() {
        let (app, _, state) = test_app();
        let session_id = state.sessions.open();
        let res = app
            .clone()
            .oneshot(
                Request::delete(format!("/api/v1/session/{}", session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let res = app
            .oneshot(
                Request::get(format!("/api/v1/session/{}/transcript", session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}

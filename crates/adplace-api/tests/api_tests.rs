//! API integration tests.

use std::path::PathBuf;

use adplace_ai::{AiConfig, RetryConfig};
use adplace_api::services::{ANALYSIS_FILE, REPORT_FILE};
use adplace_api::{create_router, ApiConfig, AppState};
use adplace_models::AdCandidate;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    router: Router,
    output_dir: PathBuf,
    _dir: TempDir,
}

fn write_personas(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("persona_categories.json");
    let catalog = json!({
        "personas": [
            {"name": "Casual Viewer", "category": "general", "motto": "Just here for the fun"},
            {"name": "Sports Fan", "category": "sports", "evaluation_focus": ["highlights"]}
        ]
    });
    std::fs::write(&path, catalog.to_string()).unwrap();
    path
}

fn test_app_with(ai: AiConfig, configure: impl FnOnce(&mut ApiConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ApiConfig {
        output_dir: dir.path().join("json"),
        persona_file: write_personas(&dir),
        index_poll_interval_ms: 1,
        index_max_polls: 3,
        ..Default::default()
    };
    configure(&mut config);

    let output_dir = config.output_dir.clone();
    let state = AppState::new(config, &ai).unwrap();
    TestApp {
        router: create_router(state, None),
        output_dir,
        _dir: dir,
    }
}

fn test_app() -> TestApp {
    test_app_with(AiConfig::default(), |_| {})
}

fn mock_ai_config(server: &MockServer) -> AiConfig {
    let mut config = AiConfig::default().with_base_url(&server.uri());
    config.twelvelabs.api_key = Some("tl-key".to_string());
    config.twelvelabs.index_id = Some("index-1".to_string());
    config.gemini.api_key = Some("gm-key".to_string());
    config.gemini.models = vec!["test-model".to_string()];
    config.bedrock.bearer_token = Some("br-token".to_string());
    config.retry = RetryConfig::none();
    config
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_file(uri: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "adplace-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: video/mp4\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn analysis(persona: &str, category: &str, overview: &str, overall: f64) -> Value {
    json!({
        "persona": persona,
        "status": "success",
        "category": category,
        "content_overview": overview,
        "scores": {
            "content_alignment": overall,
            "emotional_resonance": overall,
            "engagement_potential": overall,
            "visual_appeal": overall,
            "brand_suitability": overall
        },
        "overall_score": overall
    })
}

fn ranking_videos() -> Value {
    json!([
        {
            "id": "main-1",
            "name": "Main Sports Video",
            "role": "main",
            "persona_analyses": {
                "Sports Fan": analysis("Sports Fan", "sports", "players grab an energy drink and cola", 7.0)
            }
        },
        {
            "id": "ad-vw",
            "name": "Volkswagen Ad",
            "persona_analyses": {
                "Sports Fan": analysis("Sports Fan", "sports", "a luxury car on a mountain drive", 7.0)
            }
        },
        {
            "id": "ad-cola",
            "name": "Cola Ad",
            "persona_analyses": {
                "Sports Fan": analysis("Sports Fan", "sports", "ice cold cola drink to refresh", 7.0)
            }
        }
    ])
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = send(&app.router, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_root_message() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to the FastAPI model API!");
}

#[tokio::test]
async fn test_ready_reports_unconfigured_services() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["video_understanding"]["status"], "error");
    assert_eq!(body["checks"]["persona_catalog"]["status"], "ok");
}

#[tokio::test]
async fn test_ready_when_everything_configured() {
    let server = MockServer::start().await;
    let app = test_app_with(mock_ai_config(&server), |_| {});
    let (status, body) = send(&app.router, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_personas_listed_in_file_order() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/personas")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["personas"][0]["name"], "Casual Viewer");
    assert_eq!(body["categories"], json!(["general", "sports"]));
    assert_eq!(body["required_scores"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_ad_placement_without_input() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/ad_placement")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["result"],
        "No file or video_id provided. Either provide one of them"
    );
}

#[tokio::test]
async fn test_ad_placement_requires_configured_services() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/ad_placement?video_id=main-1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["detail"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn test_rank_orders_candidates() {
    let app = test_app();
    let (status, body) = send(&app.router, post_json("/rank", &json!({"videos": ranking_videos()}))).await;

    assert_eq!(status, StatusCode::OK);
    let ranking = body["final_ranking"].as_array().unwrap();
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0]["candidate"], "Cola Ad");
    assert_eq!(ranking[0]["rank"], 1);
    assert_eq!(body["analysis_metadata"]["reference_video"], "Main Sports Video");
    assert_eq!(body["analysis_metadata"]["missing_reference"], false);
}

#[tokio::test]
async fn test_rank_with_unknown_reference_is_empty() {
    let app = test_app();
    let request = json!({"videos": ranking_videos(), "reference": "Another Video"});
    let (status, body) = send(&app.router, post_json("/rank", &request)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["final_ranking"].as_array().unwrap().is_empty());
    assert_eq!(body["analysis_metadata"]["missing_reference"], true);
}

#[tokio::test]
async fn test_rank_rejects_duplicate_names() {
    let app = test_app();
    let mut videos = ranking_videos();
    videos[2]["name"] = json!("Volkswagen Ad");

    let (status, body) = send(&app.router, post_json("/rank", &json!({"videos": videos}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("videos[2].name"));
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn test_rank_rescores_supplied_overall_scores() {
    let app = test_app();
    let mut videos = ranking_videos();

    // Out-of-range sub-score with an inflated overall on the main video
    videos[0]["persona_analyses"]["Sports Fan"] = analysis(
        "Sports Fan",
        "sports",
        "players grab an energy drink and cola",
        50.0,
    );
    // Incomplete score set claiming a high overall
    videos[2]["persona_analyses"]["Sports Fan"]["scores"] = json!({"content_alignment": 9.0});
    videos[2]["persona_analyses"]["Sports Fan"]["overall_score"] = json!(8.0);

    let (status, body) = send(&app.router, post_json("/rank", &json!({"videos": videos}))).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    let affinities = &body["persona_affinity_scores"];
    assert_eq!(affinities["Main Sports Video"], 6.0);
    assert_eq!(affinities["Volkswagen Ad"], 4.2);
    assert_eq!(affinities["Cola Ad"], 0.0);

    for (name, score) in body["comprehensive_scores"].as_object().unwrap() {
        let composite = score["composite_score"].as_f64().unwrap();
        let alignment = score["audience_alignment"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&composite), "{} composite {}", name, composite);
        assert!((0.0..=1.0).contains(&alignment), "{} alignment {}", name, alignment);
    }
}

#[tokio::test]
async fn test_rank_rejects_duplicate_persona_keys() {
    let app = test_app();
    let body = r#"{"videos": [{
        "id": "ad-cola",
        "name": "Cola Ad",
        "persona_analyses": {
            "Sports Fan": {"persona": "Sports Fan", "status": "success"},
            "Sports Fan": {"persona": "Sports Fan", "status": "error"}
        }
    }]}"#;
    let request = Request::builder()
        .method("POST")
        .uri("/rank")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("duplicate key `Sports Fan`"), "{}", text);
}

#[tokio::test]
async fn test_rank_rejects_negative_weight() {
    let app = test_app();
    let request = json!({
        "videos": ranking_videos(),
        "weights": {"content_relevance_weight": -1.0, "audience_alignment_weight": 0.5}
    });
    let (status, body) = send(&app.router, post_json("/rank", &request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("weights.content_relevance_weight"));
}

#[tokio::test]
async fn test_create_stitched_video() {
    let app = test_app();
    let request = json!({
        "mainVideo": {"url": "https://cdn.example.com/main.mp4"},
        "adSegments": [{"id": "a1", "duration": 15.0, "type": "ad"}],
        "sequence": [
            {"id": "v1", "order": 0, "type": "video", "startTime": 0.0, "endTime": 10.0},
            {"id": "a1", "order": 1, "type": "ad", "startTime": 0.0, "endTime": 15.0}
        ]
    });
    let (status, body) = send(&app.router, post_json("/create-stitched-video", &request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["stitchedVideoId"].as_str().unwrap().starts_with("stitched_"));
    assert_eq!(body["sequence"][1]["startTime"], 10.0);
    assert_eq!(body["processingResults"]["adSegments"], 1);
}

#[tokio::test]
async fn test_create_stitched_video_empty_sequence() {
    let app = test_app();
    let request = json!({"mainVideo": {"url": "https://cdn.example.com/main.mp4"}, "sequence": []});
    let (status, body) = send(&app.router, post_json("/create-stitched-video", &request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["metadata"]["error"].is_string());
}

#[tokio::test]
async fn test_stitching_readiness() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/test-stitching")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoint"], "/create-stitched-video");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("X-Request-ID", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-request-id"], "req-42");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_unknown_route_and_disabled_metrics() {
    let app = test_app();
    let (status, _) = send(&app.router, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, get("/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rate_limiting() {
    let app = test_app_with(AiConfig::default(), |config| {
        config.rate_limit_rps = 1;
        config.rate_limit_burst = 1;
    });
    let request = || {
        let mut request = post_json("/rank", &json!({"videos": []}));
        request
            .headers_mut()
            .insert("X-Forwarded-For", "203.0.113.9".parse().unwrap());
        request
    };

    let (first, _) = send(&app.router, request()).await;
    assert_eq!(first, StatusCode::OK);

    let (second, body) = send(&app.router, request()).await;
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "rate_limited");

    // Health checks are not rate limited
    let (health, _) = send(&app.router, get("/health")).await;
    assert_eq!(health, StatusCode::OK);
}

async fn mount_pipeline_mocks(server: &MockServer) {
    let reply = |overview: &str| {
        let data = json!({
            "content_overview": overview,
            "scores": {
                "content_alignment": 8,
                "emotional_resonance": 7,
                "engagement_potential": 8,
                "visual_appeal": 6,
                "brand_suitability": 7
            }
        });
        ResponseTemplate::new(200).set_body_json(json!({ "data": data.to_string() }))
    };

    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_partial_json(json!({"video_id": "main-1"})))
        .respond_with(reply("players grab an energy drink and cola at halftime"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_partial_json(json!({"video_id": "ad-cola"})))
        .respond_with(reply("ice cold cola drink to refresh"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_partial_json(json!({"video_id": "ad-vw"})))
        .respond_with(reply("a luxury car on a mountain drive"))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .and(body_partial_json(json!({"generationConfig": {"responseMimeType": "application/json"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"categories\": [{\"timestamp\": \"00:45:00\", \"category\": \"beverages\"}]}"}]}}]
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .and(body_string_contains("emotion timeline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "```csv\nstart_time,end_time,emotion,intensity\n0,45,excitement,0.9\n```"}]}}]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/model/.+/converse$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"message": {"content": [{"text": "{\"segment\": \"0-45\", \"transition\": \"cut\"}"}]}}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_ad_placement_full_pipeline() {
    let server = MockServer::start().await;
    mount_pipeline_mocks(&server).await;

    let app = test_app_with(mock_ai_config(&server), |config| {
        config.ad_candidates = AdCandidate::parse_list("ad-vw=Volkswagen Ad,ad-cola=Cola Ad");
    });

    let request = Request::builder()
        .method("POST")
        .uri("/ad_placement?video_id=main-1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    let result = &body["result"];
    assert_eq!(result["video_id"], "main-1");
    assert_eq!(
        result["emotion_graph"],
        "start_time,end_time,emotion,intensity\n0,45,excitement,0.9"
    );
    assert_eq!(result["ad_categories"]["categories"][0]["category"], "beverages");

    let ranking = result["ranking"].as_array().unwrap();
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0]["candidate"], "Cola Ad");

    let suggestions = result["ad_placement_report"].as_array().unwrap();
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0]["rank"], 1);
    assert_eq!(suggestions[0]["suggestion"]["transition"], "cut");

    let analysis: Value =
        serde_json::from_slice(&std::fs::read(app.output_dir.join(ANALYSIS_FILE)).unwrap()).unwrap();
    assert_eq!(analysis["summary"]["total_analyses"], 6);
    assert_eq!(analysis["summary"]["failed_analyses"], 0);
    assert_eq!(analysis["analysis_metadata"]["index_id"], "index-1");
    assert_eq!(
        analysis["video_analyses"][0]["persona_analyses"]["Casual Viewer"]["overall_score"],
        7.2
    );

    let affinity = &analysis["persona_affinity_metrics"];
    assert_eq!(affinity["weighting"]["general_personas"], "40%");
    assert_eq!(affinity["video_affinities"]["Cola Ad"]["persona_affinity"], 7.2);
    assert_eq!(affinity["ranking"].as_array().unwrap().len(), 3);
    assert_eq!(affinity["persona_ranking"][0]["persona"], "Casual Viewer");
    assert_eq!(affinity["persona_ranking"][0]["video_count"], 3);
    assert!(app.output_dir.join(REPORT_FILE).exists());
}

#[tokio::test]
async fn test_persona_failures_are_recorded() {
    let server = MockServer::start().await;
    mount_pipeline_mocks(&server).await;

    // No mock for this ad id, so every persona analysis on it fails
    let app = test_app_with(mock_ai_config(&server), |config| {
        config.ad_candidates = AdCandidate::parse_list("ad-missing=Mystery Ad");
    });

    let request = Request::builder()
        .method("POST")
        .uri("/ad_placement?video_id=main-1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    let analysis: Value =
        serde_json::from_slice(&std::fs::read(app.output_dir.join(ANALYSIS_FILE)).unwrap()).unwrap();
    assert_eq!(analysis["summary"]["failed_analyses"], 2);
    let failed = &analysis["video_analyses"][1]["persona_analyses"]["Casual Viewer"];
    assert_eq!(failed["status"], "error");
    assert_eq!(failed["motto"], "Just here for the fun");
}

#[tokio::test]
async fn test_get_file_ad_uploads_and_waits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"_id": "task-1", "video_id": "ad-new"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/task-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ready"})))
        .mount(&server)
        .await;

    let app = test_app_with(mock_ai_config(&server), |_| {});
    let (status, body) = send(&app.router, post_file("/get_file_ad", "ad.mp4", &[1, 2, 3, 4])).await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["result"]["ad_id"], "ad-new");
}

#[tokio::test]
async fn test_get_file_ad_requires_file() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/get_file_ad")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("file"));
}

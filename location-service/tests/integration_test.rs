use location_service::cache::WeatherCache;
use location_service::config::Config;
use location_service::create_router;
use location_service::handlers::AppState;
use location_service::history::InMemoryHistory;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const PROVIDER_PATH: &str = "/data/2.5/weather";

struct TestApp {
    base_url: String,
    client: reqwest::Client,
}

impl TestApp {
    async fn get(&self, route: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, route))
            .send()
            .await
            .expect("Failed to send request")
    }

    async fn create_location(&self, name: &str, latitude: f64, longitude: f64) -> Value {
        let response = self
            .client
            .post(format!("{}/locations", self.base_url))
            .json(&json!({ "name": name, "latitude": latitude, "longitude": longitude }))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.expect("Failed to parse JSON")
    }
}

async fn spawn_app(provider: &MockServer, extra: &[(&str, &str)], cache_ttl: Duration) -> TestApp {
    let provider_url = format!("{}{}", provider.uri(), PROVIDER_PATH);
    let mut vars = vec![
        ("OPEN_WEATHER_MAP_API_KEY".to_string(), "test-key".to_string()),
        ("OPEN_WEATHER_MAP_URL".to_string(), provider_url),
        ("HTTP_TIMEOUT_SECONDS".to_string(), "2".to_string()),
    ];
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    let config = Config::from_lookup(|key| {
        vars.iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .expect("valid config");

    let state = AppState::with_parts(
        &config,
        Arc::new(WeatherCache::new(cache_ttl)),
        Arc::new(InMemoryHistory::new()),
    )
    .expect("state");
    let app = create_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("server error");
    });

    TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
    }
}

fn provider_body(temp: f64) -> Value {
    json!({
        "main": { "temp": temp, "humidity": 72 },
        "wind": { "speed": 3.6 }
    })
}

#[tokio::test]
async fn test_location_crud_lifecycle() {
    let provider = MockServer::start().await;
    let app = spawn_app(&provider, &[], Duration::from_secs(3600)).await;

    let created = app.create_location("Bergen", 60.39, 5.32).await;
    assert_eq!(created["id"], 1);

    let fetched: Value = app.get("/locations/1").await.json().await.unwrap();
    assert_eq!(fetched, created);

    let listed: Value = app.get("/locations").await.json().await.unwrap();
    assert_eq!(listed, json!([created]));

    let updated: Value = app
        .client
        .put(format!("{}/locations/1", app.base_url))
        .json(&json!({ "name": "Bjørgvin", "latitude": 0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        updated,
        json!({ "id": 1, "name": "Bjørgvin", "latitude": 60.39, "longitude": 5.32 })
    );

    let deleted = app
        .client
        .delete(format!("{}/locations/1", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    let body: Value = deleted.json().await.unwrap();
    assert_eq!(body["message"], "Location Deleted Successfully");

    let missing = app.get("/locations/1").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "Location Not Found");

    let next = app.create_location("Tromsø", 69.65, 18.96).await;
    assert_eq!(next["id"], 2);
}

#[tokio::test]
async fn test_not_found_cases() {
    let provider = MockServer::start().await;
    let app = spawn_app(&provider, &[], Duration::from_secs(3600)).await;

    assert_eq!(app.get("/locations/42").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/locations/abc").await.status(), StatusCode::NOT_FOUND);

    let put = app
        .client
        .put(format!("{}/locations/42", app.base_url))
        .json(&json!({ "name": "Nowhere" }))
        .send()
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::NOT_FOUND);

    let delete = app
        .client
        .delete(format!("{}/locations/42", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);

    assert_eq!(app.get("/history/42").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_all_fields() {
    let provider = MockServer::start().await;
    let app = spawn_app(&provider, &[], Duration::from_secs(3600)).await;

    let response = app
        .client
        .post(format!("{}/locations", app.base_url))
        .json(&json!({ "name": "Half" }))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    let listed: Value = app.get("/locations").await.json().await.unwrap();
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_weather_is_cached_within_window() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROVIDER_PATH))
        .and(query_param("lat", "60.39"))
        .and(query_param("lon", "5.32"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_body(8.5)))
        .expect(1)
        .mount(&provider)
        .await;

    let app = spawn_app(&provider, &[], Duration::from_secs(3600)).await;
    app.create_location("Bergen", 60.39, 5.32).await;

    let first = app.get("/weather/1").await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = first.bytes().await.unwrap();

    let second = app.get("/weather/1").await.bytes().await.unwrap();
    assert_eq!(first, second);

    let snapshot: Value = serde_json::from_slice(&first).unwrap();
    assert_eq!(
        snapshot,
        json!({ "temperature": 8.5, "humidity": 72.0, "windSpeed": 3.6 })
    );
}

#[tokio::test]
async fn test_weather_refetched_after_window() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROVIDER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_body(8.5)))
        .expect(2)
        .mount(&provider)
        .await;

    let app = spawn_app(&provider, &[], Duration::from_millis(200)).await;
    app.create_location("Bergen", 60.39, 5.32).await;

    assert_eq!(app.get("/weather/1").await.status(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(app.get("/weather/1").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_weather_for_unknown_location_skips_provider() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_body(8.5)))
        .expect(0)
        .mount(&provider)
        .await;

    let app = spawn_app(&provider, &[], Duration::from_secs(3600)).await;

    let response = app.get("/weather/7").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_provider_failure_is_500() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(1)
        .mount(&provider)
        .await;

    let app = spawn_app(&provider, &[], Duration::from_secs(3600)).await;
    app.create_location("Bergen", 60.39, 5.32).await;

    let response = app.get("/weather/1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Error Fetching Weather Data");

    // The service keeps serving after the failure
    assert_eq!(app.get("/locations/1").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unreachable_provider_is_500() {
    let provider = MockServer::start().await;
    let app = spawn_app(
        &provider,
        &[("OPEN_WEATHER_MAP_URL", "http://127.0.0.1:1/data/2.5/weather")],
        Duration::from_secs(3600),
    )
    .await;
    app.create_location("Bergen", 60.39, 5.32).await;

    let response = app.get("/weather/1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_history_records_provider_fetches() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_body(10.0)))
        .up_to_n_times(1)
        .mount(&provider)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_body(20.0)))
        .mount(&provider)
        .await;

    let app = spawn_app(&provider, &[], Duration::from_millis(100)).await;
    app.create_location("Bergen", 60.39, 5.32).await;

    let empty: Value = app.get("/history/1").await.json().await.unwrap();
    assert_eq!(empty, json!({ "historicalData": [], "summary": null }));

    app.get("/weather/1").await;
    tokio::time::sleep(Duration::from_millis(250)).await;
    app.get("/weather/1").await;

    let history: Value = app.get("/history/1").await.json().await.unwrap();
    let records = history["historicalData"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["locationId"], 1);
    assert_eq!(records[0]["temperature"], 10.0);
    assert_eq!(history["summary"]["averageTemperature"], 15.0);
    assert_eq!(history["summary"]["maxTemperature"], 20.0);
    assert_eq!(history["summary"]["minTemperature"], 10.0);
}

#[tokio::test]
async fn test_name_lookup_is_uncached_with_cors() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROVIDER_PATH))
        .and(query_param("q", "New York"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_body(21.0)))
        .expect(2)
        .mount(&provider)
        .await;

    let app = spawn_app(
        &provider,
        &[("WEATHER_LOOKUP", "name")],
        Duration::from_secs(3600),
    )
    .await;

    let first = app
        .client
        .get(format!("{}/weather/New%20York", app.base_url))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(
        first.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );

    let second: Value = app.get("/weather/New%20York").await.json().await.unwrap();
    assert_eq!(second["temperature"], 21.0);
}

#[tokio::test]
async fn test_coordinate_variant_has_no_cors() {
    let provider = MockServer::start().await;
    let app = spawn_app(&provider, &[], Duration::from_secs(3600)).await;

    let response = app
        .client
        .get(format!("{}/locations", app.base_url))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_rate_limit_applies_to_api_routes_only() {
    let provider = MockServer::start().await;
    let app = spawn_app(
        &provider,
        &[("RATE_LIMIT_MAX_REQUESTS", "2")],
        Duration::from_secs(3600),
    )
    .await;

    assert_eq!(app.get("/locations").await.status(), StatusCode::OK);
    assert_eq!(app.get("/locations").await.status(), StatusCode::OK);

    let limited = app.get("/locations/1").await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = limited.json().await.unwrap();
    assert_eq!(body["error"], "Too many requests, please try again later.");

    assert_eq!(app.get("/health").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let provider = MockServer::start().await;
    let app = spawn_app(&provider, &[], Duration::from_secs(3600)).await;

    let doc: Value = app.get("/api-docs/openapi.json").await.json().await.unwrap();
    assert!(doc["paths"]["/locations/{id}"].is_object());
    assert!(doc["paths"]["/weather/{id}"].is_object());
}

#[tokio::test]
async fn test_location_ids_read_leading_integer() {
    let provider = MockServer::start().await;
    let app = spawn_app(&provider, &[], Duration::from_secs(3600)).await;
    let created = app.create_location("Bergen", 60.39, 5.32).await;

    for route in ["/locations/1abc", "/locations/1.5", "/locations/01"] {
        let response = app.get(route).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", route);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, created);
    }
}

#[tokio::test]
async fn test_name_variant_has_no_history_route() {
    let provider = MockServer::start().await;
    let app = spawn_app(
        &provider,
        &[("WEATHER_LOOKUP", "name")],
        Duration::from_secs(3600),
    )
    .await;
    app.create_location("Bergen", 60.39, 5.32).await;

    assert_eq!(app.get("/history/1").await.status(), StatusCode::NOT_FOUND);

    let doc: Value = app.get("/api-docs/openapi.json").await.json().await.unwrap();
    assert!(doc["paths"]["/history/{id}"].is_null());
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_requests_logged_at_info() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let provider = MockServer::start().await;
    let app = spawn_app(&provider, &[], Duration::from_secs(3600)).await;
    assert_eq!(app.get("/locations").await.status(), StatusCode::OK);

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("started processing request"), "{}", output);
    assert!(output.contains("finished processing request"), "{}", output);
    assert!(output.contains("uri=/locations"), "{}", output);
}

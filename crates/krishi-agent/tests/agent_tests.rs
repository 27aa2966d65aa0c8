// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use krishi_agent::KrishiMitra;
use krishi_config::model::{AgentConfig, LlmConfig, MemoryConfig, WeatherConfig};
use krishi_memory::ConversationMemory;
use krishi_test_utils::{MockEmbedder, MockProvider};
use krishi_weather::{SharedLocation, WEATHER_UNAVAILABLE_HTML, WeatherClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    provider: Arc<MockProvider>,
    embedder: Arc<MockEmbedder>,
    mitra: KrishiMitra,
}

fn offline_weather() -> WeatherClient {
    WeatherClient::new(&WeatherConfig {
        api_key: Some(String::new()),
        ..Default::default()
    })
    .unwrap()
}

async fn fixture(weather: WeatherClient, window: usize) -> Fixture {
    let provider = Arc::new(MockProvider::new());
    let embedder = Arc::new(MockEmbedder::new());
    let memory = Arc::new(ConversationMemory::new(
        embedder.clone(),
        &MemoryConfig {
            transcript_window: window,
            ..Default::default()
        },
    ));
    let mitra = KrishiMitra::new(
        provider.clone(),
        memory,
        weather,
        SharedLocation::new("Pune"),
        &AgentConfig::default(),
        &LlmConfig::default(),
    )
    .await;
    Fixture {
        provider,
        embedder,
        mitra,
    }
}

#[tokio::test]
async fn answer_is_parsed_and_remembered() {
    let f = fixture(offline_weather(), 10).await;
    f.provider
        .add_response("```html\n<p>Sow wheat in November.</p>\n```")
        .await;

    let answer = f.mitra.ask("When to sow wheat?").await;
    assert_eq!(answer, "<p>Sow wheat in November.</p>");
    assert_eq!(f.mitra.memory().sizes().await, (1, 1));

    let request = &f.provider.requests().await[0];
    assert_eq!(request.model, "meta-llama/Meta-Llama-3-8B-Instruct");
    assert_eq!(request.max_tokens, 512);
    assert!((request.temperature - 0.7).abs() < f32::EPSILON);
    let prompt = &request.messages[0].content;
    assert!(prompt.contains(WEATHER_UNAVAILABLE_HTML));
    assert!(prompt.contains("User Query: When to sow wheat?"));
}

#[tokio::test]
async fn second_prompt_carries_history() {
    let f = fixture(offline_weather(), 10).await;
    f.provider.add_response("<p>Drip irrigation.</p>").await;
    f.mitra.ask("How to water tomatoes?").await;

    f.mitra.ask("And how often?").await;
    let prompt = f.provider.last_prompt().await.unwrap();
    assert!(prompt.contains("HUMAN: How to water tomatoes?\nAI: <p>Drip irrigation.</p>"));
}

#[tokio::test]
async fn provider_failure_returns_apology_and_saves_nothing() {
    let f = fixture(offline_weather(), 10).await;
    f.provider.add_error("API returned 503: Model is loading").await;

    let answer = f.mitra.ask("Any pest alerts?").await;
    assert!(answer.starts_with("<p>Sorry, I encountered an error processing your request:"));
    assert!(answer.contains("Model is loading"));
    assert_eq!(f.mitra.memory().sizes().await, (0, 0));
}

#[tokio::test]
async fn clear_memory_removes_prior_turns_from_prompt() {
    let f = fixture(offline_weather(), 10).await;
    f.provider.add_response("<p>Neem oil.</p>").await;
    f.mitra.ask("Aphids on mustard?").await;

    f.mitra.clear_memory().await;
    f.mitra.ask("What did I ask before?").await;

    let prompt = f.provider.last_prompt().await.unwrap();
    assert!(!prompt.contains("Aphids on mustard?"));
    assert!(!prompt.contains("Neem oil"));
}

#[tokio::test]
async fn history_failure_does_not_block_query() {
    let f = fixture(offline_weather(), 10).await;
    f.mitra.ask("first").await;
    f.embedder.set_failing(true);

    // History degrades to empty; saving then fails, so the reply is the apology.
    let answer = f.mitra.ask("second").await;
    assert!(answer.contains("embedding error"));
    assert_eq!(f.provider.requests().await.len(), 2);
}

#[tokio::test]
async fn crop_advice_goes_through_pipeline() {
    let f = fixture(offline_weather(), 10).await;
    f.provider.add_response("<h3>Cotton</h3>").await;
    assert_eq!(f.mitra.crop_advice("cotton").await, "<h3>Cotton</h3>");
    let prompt = f.provider.last_prompt().await.unwrap();
    assert!(prompt.contains("growing cotton"));
}

#[tokio::test]
async fn update_location_refreshes_weather_context() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current.json"))
        .and(query_param("q", "Mumbai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "location": {"name": "Mumbai", "region": "Maharashtra", "country": "India"},
            "current": {"temp_c": 29.0, "feelslike_c": 33.0, "condition": {"text": "Haze"},
                        "humidity": 74, "wind_kph": 13.0, "wind_dir": "W", "precip_mm": 0.0,
                        "cloud": 25, "uv": 5.0}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"forecast": {"forecastday": []}})),
        )
        .mount(&server)
        .await;

    let weather = WeatherClient::new(&WeatherConfig {
        api_key: Some("k".into()),
        ..Default::default()
    })
    .unwrap()
    .with_base_url(server.uri());

    // Pune is not mocked, so the initial context is unavailable.
    let f = fixture(weather, 10).await;
    assert_eq!(f.mitra.weather_context().await, WEATHER_UNAVAILABLE_HTML);

    f.mitra.update_location("Mumbai").await;
    assert_eq!(f.mitra.location().await, "Mumbai");
    assert!(
        f.mitra
            .weather_context()
            .await
            .contains("Current Weather in Mumbai, Maharashtra")
    );

    f.mitra.ask("Should I spray today?").await;
    let prompt = f.provider.last_prompt().await.unwrap();
    assert!(prompt.contains("<strong>Conditions:</strong> Haze"));
}

fn current_weather(city: &str, region: &str) -> serde_json::Value {
    serde_json::json!({
        "location": {"name": city, "region": region, "country": "India"},
        "current": {"temp_c": 30.0, "feelslike_c": 32.0, "condition": {"text": "Clear"},
                    "humidity": 35, "wind_kph": 11.0, "wind_dir": "N", "precip_mm": 0.0,
                    "cloud": 5, "uv": 7.0}
    })
}

#[tokio::test]
async fn overlapping_location_updates_keep_weather_in_step() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current.json"))
        .and(query_param("q", "Nashik"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_weather("Nashik", "Maharashtra"))
                .set_delay(std::time::Duration::from_millis(600)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/current.json"))
        .and(query_param("q", "Indore"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_weather("Indore", "Madhya Pradesh")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"forecast": {"forecastday": []}})),
        )
        .mount(&server)
        .await;

    let weather = WeatherClient::new(&WeatherConfig {
        api_key: Some("k".into()),
        ..Default::default()
    })
    .unwrap()
    .with_base_url(server.uri());
    let f = fixture(weather, 10).await;
    let mitra = Arc::new(f.mitra);

    let slow = tokio::spawn({
        let mitra = mitra.clone();
        async move { mitra.update_location("Nashik").await }
    });
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    mitra.update_location("Indore").await;
    slow.await.unwrap();

    assert_eq!(mitra.location().await, "Indore");
    let context = mitra.weather_context().await;
    assert!(context.contains("Current Weather in Indore"), "{context}");
    assert!(!context.contains("Nashik"), "{context}");

    f.provider.add_response("<p>ok</p>").await;
    mitra.ask("Irrigate today?").await;
    let prompt = f.provider.last_prompt().await.unwrap();
    assert!(prompt.contains("Current Weather in Indore"));
}

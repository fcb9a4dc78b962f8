// Shared helpers for the integration test suite

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::post,
    Router,
};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use wordle_royale::channel::InMemoryChatClient;
use wordle_royale::entry::{handlers as entry_handlers, InMemoryEntryRepository};
use wordle_royale::shared::{AppState, BotConfig, BotReply};
use wordle_royale::stats::handlers as stats_handlers;
use wordle_royale::user::{handlers as user_handlers, InMemoryUserRepository};
use wordle_royale::ChatClient;

/// Everything a workflow test needs: the wired router plus concrete handles
/// for seeding and asserting against the in-memory backends.
pub struct TestHarness {
    pub app: Router,
    pub state: AppState,
    pub user_repository: Arc<InMemoryUserRepository>,
    pub entry_repository: Arc<InMemoryEntryRepository>,
    pub chat_client: Arc<InMemoryChatClient>,
    pub submissions_channel_id: String,
}

pub fn harness() -> TestHarness {
    let config = BotConfig::default();

    let user_repository = Arc::new(InMemoryUserRepository::new());
    let entry_repository = Arc::new(InMemoryEntryRepository::new());
    let chat_client = Arc::new(InMemoryChatClient::new("bot-user"));
    let submissions = chat_client.seed_channel(&config.submissions_channel, false);

    let state = AppState::new(
        user_repository.clone(),
        entry_repository.clone(),
        chat_client.clone() as Arc<dyn ChatClient>,
        config,
    );

    let app = Router::new()
        .route("/events/message", post(entry_handlers::message_event))
        .route("/commands/register", post(user_handlers::register_command))
        .route(
            "/commands/leaderboard",
            post(stats_handlers::leaderboard_command),
        )
        .route("/commands/stats", post(stats_handlers::stats_command))
        .with_state(state.clone());

    TestHarness {
        app,
        state,
        user_repository,
        entry_repository,
        chat_client,
        submissions_channel_id: submissions.id,
    }
}

/// Posts a JSON body and decodes the bot reply
pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> BotReply {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn register_user(harness: &TestHarness, user_id: &str, name: &str) {
    let reply = post_json(
        &harness.app,
        "/commands/register",
        serde_json::json!({ "user_id": user_id, "name": name }),
    )
    .await;
    assert!(reply.reply.is_some());
}

pub async fn submit_message(harness: &TestHarness, user_id: &str, text: &str) -> BotReply {
    post_json(
        &harness.app,
        "/events/message",
        serde_json::json!({
            "channel_id": harness.submissions_channel_id,
            "user_id": user_id,
            "text": text,
        }),
    )
    .await
}

use axum::{routing::post, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wordle_royale::channel::reset_task::start_reset_task;
use wordle_royale::channel::{ChatClient, InMemoryChatClient, MembershipService};
use wordle_royale::entry::{handlers as entry_handlers, InMemoryEntryRepository};
use wordle_royale::shared::{AppState, BotConfig};
use wordle_royale::stats::handlers as stats_handlers;
use wordle_royale::user::{handlers as user_handlers, InMemoryUserRepository};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wordle_royale=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting wordle-royale bot backend");

    let config = BotConfig::from_env();

    // Create shared application state with dependency injection
    // Easy to switch between implementations:
    let user_repository = Arc::new(InMemoryUserRepository::new());
    let entry_repository = Arc::new(InMemoryEntryRepository::new());

    // For production with PostgreSQL:
    // let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    // let pool = sqlx::PgPool::connect(&database_url).await.expect("Failed to connect to database");
    // let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    // let entry_repository = Arc::new(PostgresEntryRepository::new(pool));

    // A platform-backed ChatClient implementation replaces this in production
    let chat_client = Arc::new(InMemoryChatClient::new("bot-user"));
    chat_client.seed_channel(&config.submissions_channel, false);

    let chat: Arc<dyn ChatClient> = chat_client;

    // Nightly results-channel membership reset
    let membership = Arc::new(MembershipService::new(
        Arc::clone(&chat),
        config.channel_scope,
    ));
    tokio::spawn(start_reset_task(membership, config.results_channel.clone()));

    let app_state = AppState::new(user_repository, entry_repository, chat, config);

    // build our application routes
    let app = Router::new()
        .route("/events/message", post(entry_handlers::message_event))
        .route("/commands/register", post(user_handlers::register_command))
        .route(
            "/commands/leaderboard",
            post(stats_handlers::leaderboard_command),
        )
        .route("/commands/stats", post(stats_handlers::stats_command))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}

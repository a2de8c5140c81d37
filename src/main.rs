use std::sync::Arc;

use teloxide::Bot;
use tracing::info;
use tracing_subscriber::prelude::*;

use voicenote::config::Config;
use voicenote::gemini::GeminiClient;
use voicenote::telegram::TelegramClient;
use voicenote::webhook::{AppState, router};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    // Guard must stay alive for the file appender to flush
    let _guard = init_tracing(&config);

    info!("🚀 Starting voicenote…");
    match config.allowed_user_id {
        Some(user_id) => info!("Allowed user: {user_id}"),
        None => info!("No allowed user configured; answering everyone"),
    }
    info!(
        "Models: transcribe={}, note={}",
        config.transcribe_model, config.note_model
    );

    let bot = Bot::new(&config.bot_token);
    let bind_addr = config.bind_addr;

    let state = Arc::new(AppState {
        telegram: TelegramClient::new(bot),
        gemini: GeminiClient::new(
            config.gemini_api_key.clone(),
            config.transcribe_model.clone(),
            config.note_model.clone(),
        ),
        config,
    });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .expect("Failed to bind webhook address");
    info!("Listening on {bind_addr}");

    axum::serve(listener, app).await.expect("Webhook server failed");
}

fn init_tracing(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        );

    let registry = tracing_subscriber::registry().with(stdout_layer);

    match &config.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir).ok();
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_dir.join("voicenote.log"))
                .expect("Failed to open log file");
            let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_filter(
                            tracing_subscriber::EnvFilter::from_default_env()
                                .add_directive(tracing::Level::INFO.into()),
                        ),
                )
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

use std::sync::Arc;

use anyhow::Context;
use axum::http::{self, HeaderValue, Method};
use dotenvy::dotenv;
use env_logger::Builder;
use log::LevelFilter;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use server::{
    app,
    models::config::RuleConfig,
    state::AppState,
    store::{FileGameStore, GameStore, InMemoryGameStore},
    utils::config::{ServerConfig, StoreBackend},
};

// ログ設定
fn init_logger(level: LevelFilter) {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .filter_module("tower_http", level)
        .filter_module("axum", level)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 環境変数をロード
    let dotenv_result = dotenv();

    // 設定の警告を出せるように、先にログだけ初期化する
    init_logger(ServerConfig::log_level_from_env());
    let config = ServerConfig::from_env();
    if let Err(e) = dotenv_result {
        log::warn!("Could not load .env file: {}", e);
    }

    let store: Arc<dyn GameStore> = match config.store {
        StoreBackend::Memory => Arc::new(InMemoryGameStore::new()),
        StoreBackend::File => Arc::new(
            FileGameStore::new(&config.data_dir)
                .with_context(|| format!("opening data dir {}", config.data_dir.display()))?,
        ),
    };
    let rules = RuleConfig::from_env();
    log::info!("Store: {:?}, rules: {:?}", config.store, rules);

    // CORSレイヤーの設定
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .context("invalid MAFIA_CORS_ORIGIN")?;
    let cors = CorsLayer::new()
        .allow_origin([origin])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([http::header::CONTENT_TYPE]);

    // ルーティングの設定
    let app = app::create_app_with_state(AppState::with_store(store, rules))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http() // HTTPトレースログを有効化
                .make_span_with(|request: &http::Request<_>| {
                    tracing::info_span!(
                        "HTTP request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
        );

    // サーバーの起動
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;

    log::info!("Server started: http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

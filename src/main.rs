use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use recipy_server::{
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    routes::{catch_panic_layer, json_error_middleware, router},
    services::ServiceContext,
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;
    init_tracing(&cfg.logging.rust_log);

    let db_cfg = cfg
        .database
        .as_ref()
        .context("database config is required (set APP_DATABASE__URL)")?;
    let db = connection::connect(db_cfg).await?;

    let demo = ServiceContext::new(&db).demo(&cfg.demo);
    if cfg.demo.provision_on_start {
        let outcome = demo.ensure_demo_user().await?;
        tracing::info!("{}", outcome.message());
    }
    let _reset = demo.spawn_reset_scheduler();

    let state = AppState::new(cfg, db);

    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http());

    let general = &state.config.general;
    let addr: SocketAddr = format!("{}:{}", general.host, general.port)
        .parse()
        .with_context(|| format!("invalid host/port {}:{}", general.host, general.port))?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

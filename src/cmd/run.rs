//! `webguard run`: start the demo server behind the pipeline.
//!
//! Loads configuration from file (or defaults), applies CLI overrides,
//! builds the pipeline in front of the demo application, and serves it
//! with Axum until SIGTERM / Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config;
use crate::config::validation::validate;
use crate::demo::demo_app;
use crate::error::WebguardError;
use crate::logging;
use crate::middleware::OsEntropy;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), WebguardError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let (mut config, origin) = config::load(args.config.as_deref()).await?;
    args.apply_overrides(&mut config);
    if let Err(errors) = validate(&config) {
        return Err(WebguardError::ConfigValidation { errors });
    }

    let pipeline = server::build_pipeline(&config, Arc::new(OsEntropy), demo_app());
    let state = Arc::new(AppState {
        pipeline,
        max_request_body_len: config.max_request_body_len,
    });
    let router = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        config = %origin,
        max_request_body_len = config.max_request_body_len,
        check_xsrf = config.check_xsrf,
        debug_logging = config.debug_logging,
        "webguard started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("webguard stopped");
    Ok(())
}

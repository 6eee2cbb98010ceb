//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It wires storage, caches, background tasks and routes together
//! and runs the actix-web server until shutdown.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::warn;

use crate::api::health::AppStartTime;
use crate::api::{api_routes, health_routes};
use crate::cache::PageCache;
use crate::config::{Args, get_config};
use crate::services::{CleanupService, VisitService};
use crate::storage::backend::infer_backend_from_url;
use crate::storage::SeaOrmStorage;
use crate::tracking::{ViewManager, VisitRecorder};

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(args: &Args) -> Result<()> {
    // Record application start time
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let config = get_config();

    // Storage
    let database_url = config.database.database_url.clone();
    let backend_name = infer_backend_from_url(&database_url)?;
    let storage = Arc::new(SeaOrmStorage::new(&database_url, &backend_name).await?);

    // View buffer + background flush
    let view_manager = ViewManager::new(
        storage.as_view_sink(),
        Duration::from_secs(config.tracking.flush_interval_secs),
        config.tracking.flush_threshold,
    );
    let flush_manager = view_manager.clone();
    tokio::spawn(async move {
        flush_manager.start_background_task().await;
    });

    let recorder = VisitRecorder::new(view_manager, Arc::clone(&storage));
    let cache = PageCache::new(&config.cache);
    let visit_service = VisitService::new(Arc::clone(&storage), cache, recorder.clone());

    // Background cleanup of expired history / stale sessions
    let cleanup_service = CleanupService::new(
        Arc::clone(&storage),
        config.tracking.session_ttl_minutes,
        Duration::from_secs(config.tracking.cleanup_interval_secs),
    );
    let cleanup_background = cleanup_service.clone();
    tokio::spawn(async move {
        cleanup_background.start_background_task().await;
    });

    let host = args.host.clone().unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let cpu_count = config.server.cpu_count.min(32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", host, port);
    warn!("Starting server at http://{}", bind_address);

    let server = HttpServer::new(move || {
        // 访客 API 被跨域的落地页前端消费
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(Compress::default())
            .app_data(web::Data::new(Arc::clone(&storage)))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::Data::new(visit_service.clone()))
            .app_data(web::Data::new(cleanup_service.clone()))
            .app_data(web::PayloadConfig::new(64 * 1024))
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Keep-Alive", "timeout=30, max=1000"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(api_routes())
            .service(health_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count)
    .bind(&bind_address)?
    .run();

    server.await?;

    // 停机前把缓冲里的计数刷出去
    warn!("Server stopped, flushing view buffer");
    recorder.flush().await;

    Ok(())
}

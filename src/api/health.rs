//! 健康检查接口

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::SeaOrmStorage;
use std::sync::Arc;

/// 程序启动时间（启动时注入 app_data）
#[derive(Clone)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct HealthSnapshot {
    status: &'static str,
    backend: String,
    uptime_secs: i64,
}

pub struct HealthService {}

impl HealthService {
    /// GET /health
    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let uptime = Utc::now() - start_time.start_datetime;

        HttpResponse::Ok().json(HealthSnapshot {
            status: "ok",
            backend: storage.backend_name().to_string(),
            uptime_secs: uptime.num_seconds(),
        })
    }
}

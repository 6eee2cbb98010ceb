//! 清理接口
//!
//! 供外部 cron 调用。配置了 cleanup_token 时要求
//! `Authorization: Bearer <token>`，否则开放调用。

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::Utc;
use serde::Serialize;

use crate::config::get_config;
use crate::services::CleanupService;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CleanupResponse {
    success: bool,
    removed_sessions: u64,
    removed_history: u64,
    timestamp: String,
}

pub struct MaintenanceService {}

impl MaintenanceService {
    /// POST /api/cleanup
    pub async fn cleanup(
        req: HttpRequest,
        service: web::Data<CleanupService>,
    ) -> impl Responder {
        if let Some(token) = get_config().tracking.cleanup_token.as_deref()
            && !token.is_empty()
        {
            let authorized = req
                .headers()
                .get("authorization")
                .and_then(|h| h.to_str().ok())
                .is_some_and(|h| h == format!("Bearer {}", token));
            if !authorized {
                return HttpResponse::Unauthorized()
                    .json(serde_json::json!({ "error": "Unauthorized" }));
            }
        }

        let outcome = service.run_once().await;

        HttpResponse::Ok().json(CleanupResponse {
            success: true,
            removed_sessions: outcome.removed_sessions,
            removed_history: outcome.removed_history,
            timestamp: Utc::now().to_rfc3339(),
        })
    }
}

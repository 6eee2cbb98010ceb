//! HTTP API
//!
//! 薄处理器：参数提取、机器人闸门、JSON 映射，业务全部委托
//! VisitService / CleanupService。响应 JSON 字段沿用既有前端的
//! camelCase 形状。

pub mod health;
pub mod maintenance;
pub mod page;
pub mod redirects;
pub mod track;

use actix_web::{HttpRequest, web};
use chrono::Utc;

use crate::redirect::classify_bot;
use crate::redirect::pipeline::VisitContext;
use crate::utils::ip::extract_client_ip;

/// /api 路由
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .route("/page/{slug}", web::get().to(page::PageService::page_context))
        .route("/track", web::post().to(track::TrackService::track))
        .route(
            "/smart-redirect",
            web::post().to(redirects::RedirectApi::smart_redirect),
        )
        .route(
            "/playback-ended",
            web::post().to(redirects::RedirectApi::playback_ended),
        )
        .route(
            "/random-link",
            web::get().to(redirects::RedirectApi::random_link),
        )
        .route(
            "/cleanup",
            web::post().to(maintenance::MaintenanceService::cleanup),
        )
}

/// /health 路由
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health").route("", web::get().to(health::HealthService::health_check))
}

/// 请求自报的 User-Agent（缺失按空串处理，分类为机器人）
pub(crate) fn user_agent(req: &HttpRequest) -> String {
    req.headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn is_bot_request(req: &HttpRequest) -> bool {
    classify_bot(&user_agent(req))
}

/// 组装访客上下文
///
/// 访客标识优先级：客户端显式提供 > 客户端 IP > 随机 UUID。
/// 最后一档没有稳定性，daily 模式退化为每次访问独立，只影响
/// 完全不带标识的客户端。
pub(crate) fn visit_context(req: &HttpRequest, visitor_id: Option<String>) -> VisitContext {
    let address = extract_client_ip(req);
    let visitor_id = visitor_id
        .filter(|v| !v.is_empty())
        .or_else(|| address.clone())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    VisitContext {
        address,
        visitor_id,
        today: Utc::now().date_naive(),
    }
}

//! 落地页上下文接口

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::trace;

use crate::services::VisitService;
use crate::utils::is_valid_slug;

use super::{is_bot_request, visit_context};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// 客户端持有的访客标识（daily 模式的决策键）
    pub visitor_id: Option<String>,
}

pub struct PageService {}

impl PageService {
    /// GET /api/page/{slug}
    pub async fn page_context(
        req: HttpRequest,
        path: web::Path<String>,
        query: web::Query<PageQuery>,
        service: web::Data<VisitService>,
    ) -> impl Responder {
        let slug = path.into_inner();

        if !is_valid_slug(&slug) {
            // 非法 slug 直接 404，不进缓存
            trace!("Invalid slug rejected: {}", &slug);
            return Self::not_found_response();
        }

        let is_bot = is_bot_request(&req);
        let ctx = visit_context(&req, query.into_inner().visitor_id);

        match service.page_context(&slug, &ctx, is_bot).await {
            Some(context) => HttpResponse::Ok().json(context),
            None => Self::not_found_response(),
        }
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "application/json; charset=utf-8"))
            .insert_header(("Cache-Control", "public, max-age=60"))
            .json(serde_json::json!({ "error": "Not Found" }))
    }
}

//! 访问统计接口
//!
//! 统计永不阻塞内容：不合法的 slug、机器人、后端故障全部
//! 返回同样的成功响应，不向客户端泄露任何差异信号。

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;

use crate::services::VisitService;
use crate::utils::is_valid_slug;

use super::is_bot_request;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub link_slug: String,
    pub session_id: Option<String>,
}

pub struct TrackService {}

impl TrackService {
    /// POST /api/track
    pub async fn track(
        req: HttpRequest,
        body: web::Json<TrackRequest>,
        service: web::Data<VisitService>,
    ) -> impl Responder {
        let TrackRequest {
            link_slug,
            session_id,
        } = body.into_inner();

        if is_valid_slug(&link_slug) {
            service
                .track(&link_slug, session_id.as_deref(), is_bot_request(&req))
                .await;
        }

        HttpResponse::Ok().json(serde_json::json!({ "success": true }))
    }
}

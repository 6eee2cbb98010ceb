//! 跳转评估接口
//!
//! smart-redirect 保持既有前端的 { shouldRedirect, url } 形状；
//! 评估失败一律回 { shouldRedirect: false }，访客侧永远拿到
//! 合法 JSON。

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};

use crate::services::VisitService;
use crate::utils::ip::extract_client_ip;
use crate::utils::is_valid_slug;

use super::is_bot_request;

#[derive(Debug, Deserialize)]
pub struct SmartRedirectRequest {
    pub slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackEndedRequest {
    pub slug: String,
    #[serde(default)]
    pub already_redirected: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectResponse {
    pub should_redirect: bool,
    pub url: Option<String>,
}

impl RedirectResponse {
    fn hit(url: String) -> Self {
        Self {
            should_redirect: true,
            url: Some(url),
        }
    }

    fn miss() -> Self {
        Self {
            should_redirect: false,
            url: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RandomLinkQuery {
    pub current: Option<String>,
}

pub struct RedirectApi {}

impl RedirectApi {
    /// POST /api/smart-redirect
    pub async fn smart_redirect(
        req: HttpRequest,
        body: web::Json<SmartRedirectRequest>,
        service: web::Data<VisitService>,
    ) -> impl Responder {
        let slug = body.into_inner().slug;

        if !is_valid_slug(&slug) || is_bot_request(&req) {
            return HttpResponse::Ok().json(RedirectResponse::miss());
        }

        let address = extract_client_ip(&req);
        let response = match service.smart_redirect(&slug, address.as_deref()).await {
            Some(url) => RedirectResponse::hit(url),
            None => RedirectResponse::miss(),
        };

        HttpResponse::Ok().json(response)
    }

    /// POST /api/playback-ended
    pub async fn playback_ended(
        req: HttpRequest,
        body: web::Json<PlaybackEndedRequest>,
        service: web::Data<VisitService>,
    ) -> impl Responder {
        let PlaybackEndedRequest {
            slug,
            already_redirected,
        } = body.into_inner();

        if !is_valid_slug(&slug) || is_bot_request(&req) {
            return HttpResponse::Ok().json(RedirectResponse::miss());
        }

        let response = match service.playback_ended(&slug, already_redirected).await {
            Some(url) => RedirectResponse::hit(url),
            None => RedirectResponse::miss(),
        };

        HttpResponse::Ok().json(response)
    }

    /// GET /api/random-link?current={slug}
    pub async fn random_link(
        query: web::Query<RandomLinkQuery>,
        service: web::Data<VisitService>,
    ) -> impl Responder {
        let current = query.into_inner().current;
        let exclude = current.as_deref().filter(|s| is_valid_slug(s));

        match service.random_slug(exclude).await {
            Some(slug) => HttpResponse::Ok()
                .insert_header(("Cache-Control", "public, s-maxage=60, stale-while-revalidate=120"))
                .json(serde_json::json!({ "slug": slug })),
            None => HttpResponse::NotFound()
                .json(serde_json::json!({ "error": "No other links available" })),
        }
    }
}

//! IP 地址处理工具
//!
//! 提供统一的客户端 IP 提取：直连时取 peer 地址，
//! 连接来自私有网段（即反向代理）时取 X-Forwarded-For / X-Real-IP。

use std::net::IpAddr;

use actix_web::HttpRequest;
use tracing::debug;

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            // fc00::/7 (ULA) + fe80::/10 (link-local) + ::1
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// 从 HeaderMap 提取转发的 IP
pub fn extract_forwarded_ip_from_headers(
    headers: &actix_web::http::header::HeaderMap,
) -> Option<String> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端 IP）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            // 其次 X-Real-IP
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        })
}

/// 从 HttpRequest 提取真实客户端 IP
///
/// 策略（按优先级）：
/// 1. 连接来自私有 IP/localhost → 假设有反向代理，优先 X-Forwarded-For
/// 2. 默认 → 使用连接 IP（公网直连场景，防止伪造）
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    let conn_info = req.connection_info();
    let peer_ip = conn_info.peer_addr()?;

    if let Ok(ip_addr) = peer_ip.parse::<IpAddr>()
        && is_private_or_local(&ip_addr)
    {
        if let Some(real_ip) = extract_forwarded_ip_from_headers(req.headers()) {
            debug!(
                "Auto-detect proxy (private IP {}): using forwarded IP: {}",
                peer_ip, real_ip
            );
            return Some(real_ip);
        }
        debug!("Private IP {} without X-Forwarded-For", peer_ip);
    }

    Some(peer_ip.to_string())
}

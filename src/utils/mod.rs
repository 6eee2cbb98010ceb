pub mod ip;

use url::Url;

use crate::errors::{Result, VidgateError};

/// slug 允许的最大长度
const MAX_SLUG_LEN: usize = 64;

/// 生成的 slug 固定以 mp4 结尾，前面 5 位随机小写字母数字
const GENERATED_PREFIX_LEN: usize = 5;
const GENERATED_SUFFIX: &str = "mp4";

/// 校验 slug 格式：小写字母、数字、`-`、`_`
///
/// 非法 slug 在进入任何缓存或数据库查询前被拒绝。
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

/// 生成随机 slug（5 位随机字符 + "mp4" 后缀）
pub fn generate_slug() -> String {
    use std::iter;

    let chars = b"abcdefghijklmnopqrstuvwxyz0123456789";

    let mut slug: String = iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(GENERATED_PREFIX_LEN)
        .collect();
    slug.push_str(GENERATED_SUFFIX);
    slug
}

/// 危险协议列表
const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// 验证跳转目标 URL
///
/// 检查项目：
/// 1. URL 不为空
/// 2. 不是危险协议（javascript:, data:, file: 等）
/// 3. 必须是 http:// 或 https://
/// 4. URL 格式有效
pub fn validate_url(url: &str) -> Result<()> {
    let url = url.trim();

    if url.is_empty() {
        return Err(VidgateError::validation("URL cannot be empty"));
    }

    let url_lower = url.to_lowercase();

    for proto in DANGEROUS_PROTOCOLS {
        if url_lower.starts_with(proto) {
            return Err(VidgateError::validation(format!(
                "Dangerous protocol blocked: {}",
                proto
            )));
        }
    }

    if !url_lower.starts_with("http://") && !url_lower.starts_with("https://") {
        return Err(VidgateError::validation(format!(
            "Invalid protocol in URL: {}. Only http:// and https:// are allowed",
            url
        )));
    }

    Url::parse(url)
        .map_err(|e| VidgateError::validation(format!("Invalid URL format: {}", e)))?;

    Ok(())
}

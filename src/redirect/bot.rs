//! 机器人识别
//!
//! 对请求自报的 User-Agent 做大小写不敏感的子串匹配。
//! 允许名单（主流搜索引擎）优先于拒绝名单，保证收录不受影响；
//! 空串或过短的 UA 一律按机器人处理。纯函数，永不失败。

/// 已知机器人的产品标识（全部小写）
///
/// 只收具体的产品 token，不收裸词 "bot"，
/// 避免误伤真实浏览器 UA 里无关 token 的巧合子串。
const BOT_PATTERNS: &[&str] = &[
    // 社交平台预览抓取
    "facebookexternalhit",
    "facebot",
    "facebookplatform",
    "twitterbot",
    "linkedinbot",
    "slackbot-linkexpanding",
    "discordbot",
    "telegrambot",
    "vkshare",
    "pinterestbot",
    // HTTP 库与抓取框架
    "curl/",
    "wget/",
    "python-requests",
    "python-urllib",
    "scrapy",
    "httpclient",
    "java/",
    "okhttp",
    "axios/",
    // 无头浏览器与自动化
    "headlesschrome",
    "phantomjs",
    "selenium",
    "webdriver",
    // SEO 爬虫
    "ahrefsbot",
    "semrushbot",
    "mj12bot",
    "dotbot",
    "blexbot",
    "yandexbot",
    "baiduspider",
    "sogou",
    "exabot",
    "ia_archiver",
    "archive.org_bot",
    "petalbot",
    "dataforseobot",
    "siteauditbot",
    "screaming frog",
    // AI 爬虫
    "gptbot",
    "chatgpt-user",
    "ccbot",
    "anthropic-ai",
    "claude-web",
    "bytespider",
    "amazonbot",
    "meta-externalagent",
    // Google 广告抓取
    "mediapartners-google",
    "adsbot-google",
    "storebot-google",
];

/// 允许放行的搜索引擎爬虫（全部小写）
const ALLOWED_BOTS: &[&str] = &["googlebot", "bingbot", "applebot", "duckduckbot"];

/// UA 短于该长度视为机器人
const MIN_PLAUSIBLE_UA_LEN: usize = 10;

/// 判断 User-Agent 是否为机器人
///
/// 调用方拿到 true 后应跳过全部统计与跳转逻辑，
/// 并返回无副作用的成功响应（不向对方泄露错误信号）。
pub fn classify_bot(user_agent: &str) -> bool {
    if user_agent.len() < MIN_PLAUSIBLE_UA_LEN {
        return true;
    }

    let lower = user_agent.to_lowercase();

    for allowed in ALLOWED_BOTS {
        if lower.contains(allowed) {
            return false;
        }
    }

    for pattern in BOT_PATTERNS {
        if lower.contains(pattern) {
            return true;
        }
    }

    false
}

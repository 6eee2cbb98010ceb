//! Bot classifier tests
//!
//! 机器人闸门是全函数：任何输入都有结论、永不 panic。

use vidgate::redirect::classify_bot;

#[test]
fn test_real_chrome_ua_is_not_bot() {
    assert!(!classify_bot(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
    ));
}

#[test]
fn test_social_preview_fetcher_is_bot() {
    assert!(classify_bot("facebookexternalhit/1.1"));
    assert!(classify_bot(
        "Mozilla/5.0 (compatible; TelegramBot (like TwitterBot))"
    ));
}

#[test]
fn test_allow_listed_search_bots_pass() {
    assert!(!classify_bot(
        "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"
    ));
    assert!(!classify_bot(
        "DuckDuckBot/1.0; (+http://duckduckgo.com/duckduckbot.html)"
    ));
}

#[test]
fn test_empty_ua_is_bot() {
    assert!(classify_bot(""));
}

#[test]
fn test_short_ua_is_bot() {
    assert!(classify_bot("Mozilla"));
}

#[test]
fn test_automation_frameworks_are_bots() {
    assert!(classify_bot(
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 HeadlessChrome/119.0.0.0"
    ));
    assert!(classify_bot("python-requests/2.31.0"));
}

#[test]
fn test_browser_with_incidental_bot_substring_passes() {
    // 无关 token 里包含 "bot" 不应误判
    assert!(!classify_bot(
        "Mozilla/5.0 (X11; Linux x86_64) RobotoRenderer/2.0 Gecko/20100101 Firefox/121.0"
    ));
}

//! Storage backend integration tests
//!
//! 链接与设置的边界操作：CRUD 层真正用到的那部分读写。

use std::sync::{Arc, Once};

use chrono::Utc;
use tempfile::TempDir;

use vidgate::config::init_config;
use vidgate::storage::models::{GlobalSettings, Link, LuckyMode, LuckySettings};
use vidgate::storage::SeaOrmStorage;
use vidgate::utils::generate_slug;

static INIT: Once = Once::new();

async fn setup_storage() -> (TempDir, Arc<SeaOrmStorage>) {
    INIT.call_once(init_config);

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("storage_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    (temp_dir, storage)
}

fn link(slug: &str) -> Link {
    Link {
        slug: slug.to_string(),
        account_id: "acct-1".to_string(),
        video_url: "https://cdn.example/video.webm".to_string(),
        destination_url: Some("https://dest.example".to_string()),
        redirect_enabled: true,
        telegram_url: Some("https://t.me/channel".to_string()),
        web_url: None,
        lucky_override: Some(LuckySettings::new(true, 42, LuckyMode::Daily)),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[actix_rt::test]
async fn test_create_and_get_link_round_trip() {
    let (_dir, storage) = setup_storage().await;

    storage.create_link(&link("abcmp4")).await.unwrap();

    let loaded = storage.get_link("abcmp4").await.expect("link must exist");
    assert_eq!(loaded.slug, "abcmp4");
    assert_eq!(loaded.account_id, "acct-1");
    assert!(loaded.redirect_enabled);
    let over = loaded.lucky_override.expect("override must survive");
    assert_eq!(over.percentage, 42);
    assert_eq!(over.mode, LuckyMode::Daily);
}

#[actix_rt::test]
async fn test_duplicate_slug_is_rejected() {
    let (_dir, storage) = setup_storage().await;

    storage.create_link(&link("dupmp4")).await.unwrap();
    let second = storage.create_link(&link("dupmp4")).await;
    assert!(second.is_err(), "slug is immutable and unique");
}

#[actix_rt::test]
async fn test_get_unknown_link_is_none() {
    let (_dir, storage) = setup_storage().await;
    assert!(storage.get_link("ghostmp4").await.is_none());
}

#[actix_rt::test]
async fn test_global_settings_upsert_never_duplicates() {
    let (_dir, storage) = setup_storage().await;

    let mut settings = GlobalSettings {
        lucky: LuckySettings::new(true, 25, LuckyMode::Random),
        timed_enabled: true,
        timed_delay_secs: 7,
        ..GlobalSettings::defaults_for("acct-2")
    };
    storage.upsert_global_settings(&settings).await.unwrap();

    settings.lucky = LuckySettings::new(true, 60, LuckyMode::Daily);
    settings.telegram_url = Some("https://t.me/other".to_string());
    storage.upsert_global_settings(&settings).await.unwrap();

    let loaded = storage.get_global_settings("acct-2").await;
    assert_eq!(loaded.lucky.percentage, 60);
    assert_eq!(loaded.lucky.mode, LuckyMode::Daily);
    assert_eq!(loaded.telegram_url.as_deref(), Some("https://t.me/other"));
    assert_eq!(loaded.timed_delay_secs, 7);
}

#[actix_rt::test]
async fn test_missing_settings_fall_back_to_defaults() {
    let (_dir, storage) = setup_storage().await;

    let settings = storage.get_global_settings("never-saved").await;
    assert!(!settings.lucky.enabled);
    assert_eq!(settings.lucky.percentage, 10);
    assert!(!settings.timed_enabled);
}

#[actix_rt::test]
async fn test_url_pools_filter_disabled_and_stay_separate() {
    let (_dir, storage) = setup_storage().await;

    let id_a = storage
        .add_redirect_url("acct-3", "https://a.example")
        .await
        .unwrap();
    storage
        .add_redirect_url("acct-3", "https://b.example")
        .await
        .unwrap();
    storage
        .add_timed_redirect_url("acct-3", "https://timed.example")
        .await
        .unwrap();

    // 其它账号的池互不可见
    storage
        .add_redirect_url("acct-other", "https://other.example")
        .await
        .unwrap();

    let primary = storage.get_enabled_redirect_urls("acct-3").await;
    assert_eq!(primary.len(), 2);
    assert!(!primary.contains(&"https://timed.example".to_string()));
    assert!(!primary.contains(&"https://other.example".to_string()));

    let timed = storage.get_enabled_timed_redirect_urls("acct-3").await;
    assert_eq!(timed, vec!["https://timed.example".to_string()]);

    // 停用后退出选择
    storage.set_redirect_url_enabled(id_a, false).await.unwrap();
    let primary = storage.get_enabled_redirect_urls("acct-3").await;
    assert_eq!(primary, vec!["https://b.example".to_string()]);
}

#[actix_rt::test]
async fn test_add_redirect_url_validates_target() {
    let (_dir, storage) = setup_storage().await;

    assert!(
        storage
            .add_redirect_url("acct-4", "javascript:alert(1)")
            .await
            .is_err()
    );
    assert!(storage.add_redirect_url("acct-4", "").await.is_err());
}

#[actix_rt::test]
async fn test_random_slug_excludes_current() {
    let (_dir, storage) = setup_storage().await;

    storage.create_link(&link("firstmp4")).await.unwrap();
    storage.create_link(&link("secondmp4")).await.unwrap();

    for _ in 0..20 {
        let picked = storage.random_slug(Some("firstmp4")).await.unwrap();
        assert_eq!(picked, "secondmp4");
    }

    // 只剩一条且被排除时没有候选
    let (_dir2, lonely) = setup_storage().await;
    lonely.create_link(&link("onlymp4")).await.unwrap();
    assert!(lonely.random_slug(Some("onlymp4")).await.is_none());
}

#[actix_rt::test]
async fn test_generated_slugs_are_storable() {
    let (_dir, storage) = setup_storage().await;

    let slug = generate_slug();
    storage.create_link(&link(&slug)).await.unwrap();
    assert!(storage.get_link(&slug).await.is_some());
}

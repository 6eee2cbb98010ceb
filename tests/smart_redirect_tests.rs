//! Smart/IP redirect integration tests
//!
//! 跑在临时 SQLite 上，覆盖：2 次上限、第二次换目标、
//! 窗口过期复位、并发占位不超限。

use std::sync::{Arc, Once};

use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tempfile::TempDir;

use migration::entities::redirect_history;
use vidgate::config::init_config;
use vidgate::redirect::SmartRedirector;
use vidgate::storage::SeaOrmStorage;

static INIT: Once = Once::new();

async fn setup_storage() -> (TempDir, Arc<SeaOrmStorage>) {
    INIT.call_once(init_config);

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("smart_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    (temp_dir, storage)
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// 把某地址的历史行直接改成已过期
async fn age_history(storage: &SeaOrmStorage, address: &str) {
    let past = Utc::now() - Duration::seconds(1);
    redirect_history::Entity::update_many()
        .col_expr(redirect_history::Column::ExpiresAt, Expr::value(past))
        .filter(redirect_history::Column::Address.eq(address))
        .exec(storage.get_db())
        .await
        .expect("Failed to age history row");
}

#[actix_rt::test]
async fn test_two_redirects_then_capped() {
    let (_dir, storage) = setup_storage().await;
    let redirector = SmartRedirector::new(Arc::clone(&storage));
    let pool = urls(&["https://a.example", "https://b.example", "https://c.example"]);
    let address = "203.0.113.10";

    let first = redirector.evaluate(address, &pool).await;
    assert!(first.is_some(), "first visit must redirect");

    let second = redirector.evaluate(address, &pool).await;
    assert!(second.is_some(), "second visit must redirect");

    // 第三次：窗口内已达上限
    let third = redirector.evaluate(address, &pool).await;
    assert!(third.is_none(), "third visit within window must not redirect");
}

#[actix_rt::test]
async fn test_second_redirect_uses_different_url() {
    let (_dir, storage) = setup_storage().await;
    let redirector = SmartRedirector::new(Arc::clone(&storage));
    let pool = urls(&["https://a.example", "https://b.example"]);
    let address = "203.0.113.11";

    let first = redirector.evaluate(address, &pool).await.unwrap();
    let second = redirector.evaluate(address, &pool).await.unwrap();

    assert_ne!(first, second, "second redirect must pick a different URL");
}

#[actix_rt::test]
async fn test_single_url_pool_repeats_on_second_redirect() {
    let (_dir, storage) = setup_storage().await;
    let redirector = SmartRedirector::new(Arc::clone(&storage));
    let pool = urls(&["https://only.example"]);
    let address = "203.0.113.12";

    assert_eq!(
        redirector.evaluate(address, &pool).await.as_deref(),
        Some("https://only.example")
    );
    assert_eq!(
        redirector.evaluate(address, &pool).await.as_deref(),
        Some("https://only.example")
    );
    assert!(redirector.evaluate(address, &pool).await.is_none());
}

#[actix_rt::test]
async fn test_history_row_after_first_redirect() {
    let (_dir, storage) = setup_storage().await;
    let redirector = SmartRedirector::new(Arc::clone(&storage));
    let pool = urls(&["https://a.example"]);
    let address = "203.0.113.13";

    let chosen = redirector.evaluate(address, &pool).await.unwrap();

    let history = storage
        .get_redirect_history(address, Utc::now())
        .await
        .unwrap()
        .expect("history row must exist");
    assert_eq!(history.redirect_count, 1);
    assert_eq!(history.last_redirect_url.as_deref(), Some(chosen.as_str()));
    assert!(history.expires_at > Utc::now());
}

#[actix_rt::test]
async fn test_expired_window_resets_to_fresh() {
    let (_dir, storage) = setup_storage().await;
    let redirector = SmartRedirector::new(Arc::clone(&storage));
    let pool = urls(&["https://a.example", "https://b.example"]);
    let address = "203.0.113.14";

    // 用满两次
    redirector.evaluate(address, &pool).await.unwrap();
    redirector.evaluate(address, &pool).await.unwrap();
    assert!(redirector.evaluate(address, &pool).await.is_none());

    // 窗口过期后地址复位，重新可跳
    age_history(&storage, address).await;
    let after_expiry = redirector.evaluate(address, &pool).await;
    assert!(after_expiry.is_some(), "expired address must reset to fresh");

    // 复位后的历史从 1 重新计数
    let history = storage
        .get_redirect_history(address, Utc::now())
        .await
        .unwrap()
        .expect("history row must exist");
    assert_eq!(history.redirect_count, 1);
}

#[actix_rt::test]
async fn test_expired_rows_are_purged_on_lookup() {
    let (_dir, storage) = setup_storage().await;
    let redirector = SmartRedirector::new(Arc::clone(&storage));
    let pool = urls(&["https://a.example"]);
    let address = "203.0.113.15";

    redirector.evaluate(address, &pool).await.unwrap();
    age_history(&storage, address).await;

    // 查询顺手清理过期行
    let history = storage
        .get_redirect_history(address, Utc::now())
        .await
        .unwrap();
    assert!(history.is_none(), "expired row must be treated as absent");

    let remaining = redirect_history::Entity::find()
        .filter(redirect_history::Column::Address.eq(address))
        .one(storage.get_db())
        .await
        .unwrap();
    assert!(remaining.is_none(), "expired row must be deleted");
}

#[actix_rt::test]
async fn test_empty_pool_never_redirects() {
    let (_dir, storage) = setup_storage().await;
    let redirector = SmartRedirector::new(Arc::clone(&storage));

    assert!(redirector.evaluate("203.0.113.16", &[]).await.is_none());
}

#[actix_rt::test]
async fn test_concurrent_claims_do_not_exceed_cap() {
    let (_dir, storage) = setup_storage().await;
    let pool = urls(&["https://a.example", "https://b.example"]);
    let address = "203.0.113.17";

    const TASKS: usize = 20;
    let mut handles = Vec::with_capacity(TASKS);
    for _ in 0..TASKS {
        let redirector = SmartRedirector::new(Arc::clone(&storage));
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            redirector.evaluate(address, &pool).await.is_some()
        }));
    }

    let mut hits = 0;
    for handle in handles {
        if handle.await.unwrap() {
            hits += 1;
        }
    }

    assert!(hits >= 1, "at least one concurrent request must win a claim");
    assert!(
        hits <= 2,
        "concurrent requests pushed past the cap: {} redirects",
        hits
    );

    // 没用满的名额允许继续用掉，然后窗口内不再放行
    let redirector = SmartRedirector::new(Arc::clone(&storage));
    for _ in hits..2 {
        redirector.evaluate(address, &pool).await;
    }
    assert!(redirector.evaluate(address, &pool).await.is_none());
}

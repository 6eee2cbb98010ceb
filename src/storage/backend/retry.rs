//! 数据库操作重试
//!
//! 只重试瞬时错误：断线、取连接超时、死锁、锁等待、SQLite BUSY/LOCKED、
//! 序列化失败。其余错误第一时间向上返回。退避是指数的，带随机抖动，
//! 封顶在配置的最大延迟。

use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// 驱动层标成这些错误码的失败值得再试一次
///
/// MySQL: 1213 死锁 / 1205 锁等待超时；
/// PostgreSQL: 40001 序列化失败 / 40P01 死锁；
/// SQLite: 5 BUSY / 6 LOCKED。
fn is_transient_code(code: &str) -> bool {
    matches!(code, "1213" | "1205" | "40001" | "40P01" | "5" | "6")
}

/// 错误码拿不到时退而求其次的消息匹配
const TRANSIENT_MESSAGE_MARKS: &[&str] = &[
    "deadlock",
    "lock wait timeout",
    "database is locked",
    "serialization failure",
];

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    let runtime_err = match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => return true,
        DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return false,
    };

    let message = match runtime_err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(db_err) = sqlx_err.deref().as_database_error()
                && let Some(code) = db_err.code()
            {
                return is_transient_code(code.as_ref());
            }
            sqlx_err.to_string().to_lowercase()
        }
        RuntimeErr::Internal(msg) => msg.to_lowercase(),
        #[allow(unreachable_patterns)]
        _ => return false,
    };

    TRANSIENT_MESSAGE_MARKS.iter().any(|m| message.contains(m))
}

/// 重试配置
#[derive(Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    /// 第 attempt 次重试前等多久：base * 2^(attempt-1)，封顶后加 0-25% 抖动
    fn delay_ms(&self, attempt: u32) -> u64 {
        use rand::Rng;
        let exponential = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt - 1));
        let capped = exponential.min(self.max_delay_ms);
        capped.saturating_add(rand::rng().random_range(0..=capped / 4))
    }
}

/// 执行一个数据库操作，瞬时失败按配置退避重试
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(
                        "Operation '{}' recovered after {} retries",
                        operation_name, attempt
                    );
                }
                return Ok(value);
            }
            Err(e) if is_retryable_error(&e) && attempt < config.max_retries => {
                attempt += 1;
                let delay = config.delay_ms(attempt);
                warn!(
                    "Operation '{}' hit transient error (attempt {}/{}): {}; backing off {} ms",
                    operation_name, attempt, config.max_retries, e, delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_connection_errors_are_retryable() {
        let err = DbErr::ConnectionAcquire(sea_orm::error::ConnAcquireErr::Timeout);
        assert!(is_retryable_error(&err));

        let err = DbErr::Conn(RuntimeErr::Internal("connection lost".to_string()));
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_lock_errors_are_retryable() {
        let err = DbErr::Query(RuntimeErr::Internal("database is locked".to_string()));
        assert!(is_retryable_error(&err));

        let err = DbErr::Exec(RuntimeErr::Internal(
            "Deadlock found when trying to get lock".to_string(),
        ));
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_not_found_is_not_retryable() {
        let err = DbErr::RecordNotFound("not found".to_string());
        assert!(!is_retryable_error(&err));
    }

    #[test]
    fn test_delay_is_exponential_and_capped() {
        let config = RetryConfig {
            max_retries: 10,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        };

        assert!((100..=125).contains(&config.delay_ms(1)));
        assert!((200..=250).contains(&config.delay_ms(2)));
        // 深度重试被上限拦住
        assert!((2000..=2500).contains(&config.delay_ms(10)));
    }

    #[tokio::test]
    async fn test_with_retry_success_after_retries() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: 10,
            max_delay_ms: 50,
        };
        let call_count = AtomicU32::new(0);

        let result = with_retry("test_op", config, || {
            let count = call_count.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err(DbErr::ConnectionAcquire(
                        sea_orm::error::ConnAcquireErr::Timeout,
                    ))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_non_retryable_error_fails_fast() {
        let config = RetryConfig::default();
        let call_count = AtomicU32::new(0);

        let result = with_retry("test_op", config, || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>(DbErr::RecordNotFound("not found".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_after_max_retries() {
        let config = RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        };
        let call_count = AtomicU32::new(0);

        let result = with_retry("test_op", config, || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<i32, _>(DbErr::ConnectionAcquire(
                    sea_orm::error::ConnAcquireErr::Timeout,
                ))
            }
        })
        .await;

        assert!(result.is_err());
        // 首次执行 + 2 次重试
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }
}

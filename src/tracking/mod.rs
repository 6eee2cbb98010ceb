//! 访问统计
//!
//! 浏览计数先进内存缓冲，定时/阈值触发批量刷盘；
//! 在线会话由 recorder 直接 upsert。两者都不阻塞访客响应。

pub mod manager;
pub mod recorder;
pub mod sink;

pub use manager::ViewManager;
pub use recorder::VisitRecorder;
pub use sink::ViewSink;

use chrono::NaiveDate;

/// 浏览计数缓冲键：(链接 slug, UTC 日期)
pub type ViewKey = (String, NaiveDate);

//! Business services
//!
//! 访问编排与后台清理，HTTP 层只做参数提取和 JSON 映射。

pub mod cleanup;
pub mod visit_service;

pub use cleanup::CleanupService;
pub use visit_service::{PageContext, VisitService};

//! 内容条目翻译核心
//!
//! 围绕结构化内容条目的机器翻译核心库：
//!
//! - `dispatch` — 单条目字段调度：取值、按格式分组、并发调用后端、按位置写回
//! - `job` — 批量翻译任务：状态机、提交与协作式的暂停/恢复/取消
//! - `report` — 各内容类型与语言的翻译状况汇总
//! - `provider` — 翻译后端接口与内置 HTTP 实现
//! - `storage` — 条目、任务与注册表的协作方接口及内存实现
//!
//! 典型用法是通过 [`service::TranslatorService`] 组装全部组件：
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use content_translator::config::TranslatorConfig;
//! use content_translator::service::{Collaborators, TranslatorService};
//! use content_translator::storage::memory::{
//!     CountingCompletenessChecker, MemoryContentTypeRegistry, MemoryEntryStore,
//!     MemoryJobStore, MemoryLocaleRegistry,
//! };
//! use content_translator::storage::Locale;
//!
//! # fn main() -> content_translator::error::TranslateResult<()> {
//! let entries = MemoryEntryStore::new();
//! let collaborators = Collaborators {
//!     entries: Arc::new(entries.clone()),
//!     jobs: Arc::new(MemoryJobStore::new()),
//!     content_types: Arc::new(MemoryContentTypeRegistry::new(vec![])),
//!     locales: Arc::new(MemoryLocaleRegistry::new(vec![Locale::new("en", "English")])),
//!     completeness: Arc::new(CountingCompletenessChecker::new(entries, "en")),
//! };
//! let service = TranslatorService::with_http_provider(collaborators, TranslatorConfig::load()?)?;
//! # let _ = service;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod job;
pub mod path;
pub mod provider;
pub mod report;
pub mod service;
pub mod storage;

pub use config::TranslatorConfig;
pub use dispatch::{estimate_usage, FieldDispatcher, TranslationField, TranslationRequest};
pub use error::{TranslateError, TranslateResult};
pub use job::{Job, JobManager, JobParams, JobProgress, JobStatus};
pub use path::{FieldPath, PathSegment};
pub use provider::{HttpProvider, Priority, ProviderRequest, TranslationProvider};
pub use report::{Report, ReportAggregator};
pub use service::{Collaborators, TranslatorService};

/// 库版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

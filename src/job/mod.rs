//! 批量翻译任务模块
//!
//! `state` 定义状态机，`manager` 负责任务的提交与控制，
//! 本文件定义任务记录本身。

pub mod manager;
pub mod state;

pub use manager::JobManager;
pub use state::JobStatus;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::Priority;

/// 任务进度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    /// 已翻译并写入的条目数
    pub processed: usize,
    /// 待翻译条目总数（恢复运行时重新推导）
    pub total: usize,
    /// 导致任务中止的失败条目数（单条失败即中止，不跳过）
    pub failed: usize,
}

/// 批量翻译任务记录
///
/// 记录是任务的唯一权威状态：后台循环在条目边界重读记录上的
/// 状态来响应暂停与取消，控制接口只修改记录而不直接打断循环。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// 任务标识
    pub id: u64,
    /// 内容类型标识
    pub content_type: String,
    /// 源语言代码
    pub source_locale: String,
    /// 目标语言代码
    pub target_locale: String,
    /// 当前状态
    pub status: JobStatus,
    /// 进度
    pub progress: JobProgress,
    /// 失败原因（仅 Failed 状态有值）
    pub failure_reason: Option<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 最近更新时间
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// 创建一条新任务记录，初始状态为 [`JobStatus::Created`]
    pub fn new(id: u64, content_type: &str, source_locale: &str, target_locale: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            content_type: content_type.to_string(),
            source_locale: source_locale.to_string(),
            target_locale: target_locale.to_string(),
            status: JobStatus::Created,
            progress: JobProgress::default(),
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 刷新最近更新时间
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// 任务提交参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobParams {
    /// 内容类型标识
    pub content_type: String,
    /// 源语言代码
    pub source_locale: String,
    /// 目标语言代码
    pub target_locale: String,
    /// 调度优先级提示，缺省时使用配置中的默认值
    #[serde(default)]
    pub priority: Option<Priority>,
}

//! 任务状态机模块
//!
//! 定义批量翻译任务的状态集合与迁移表。迁移表是唯一的合法性来源，
//! 任何不在表中的迁移请求都会被拒绝，不允许跳过中间状态。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TranslateError, TranslateResult};

/// 批量翻译任务状态
///
/// `Completed`、`Cancelled`、`Failed` 为终态，没有出边；
/// 暂停可逆（`Paused -> Running`），取消不可逆。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// 已创建，尚未入队
    Created,
    /// 已入队，等待处理启动
    Queued,
    /// 处理中
    Running,
    /// 已暂停，可恢复
    Paused,
    /// 全部条目处理完成（终态）
    Completed,
    /// 已取消（终态）
    Cancelled,
    /// 处理失败（终态）
    Failed,
}

impl JobStatus {
    /// 是否为终态
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Cancelled | JobStatus::Failed
        )
    }

    /// 迁移表：检查从当前状态到目标状态是否合法
    pub fn can_transition(self, to: JobStatus) -> bool {
        matches!(
            (self, to),
            (JobStatus::Created, JobStatus::Queued)
                | (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Paused)
                | (JobStatus::Paused, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Cancelled)
                | (JobStatus::Paused, JobStatus::Cancelled)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    /// 执行一次状态迁移
    ///
    /// 迁移不合法时返回 [`TranslateError::InvalidStateTransition`]。
    pub fn transition(self, to: JobStatus) -> TranslateResult<JobStatus> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(TranslateError::InvalidStateTransition { from: self, to })
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Created => "created",
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Paused => "paused",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

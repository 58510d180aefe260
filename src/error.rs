//! 翻译核心统一错误处理
//!
//! 提供结构化错误类型和错误处理机制。调度与任务控制的同步错误
//! 直接返回给调用方；任务后台循环中的错误则记录在任务记录上。

use thiserror::Error;

use crate::job::state::JobStatus;

/// 翻译核心错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// 参数校验错误（未知内容类型、未知语言、非法字段形状等）
    #[error("参数校验失败: {0}")]
    Validation(String),

    /// 翻译后端错误（原样透传，核心层不做重试）
    #[error("翻译后端错误: {0}")]
    Backend(String),

    /// 任务不存在
    #[error("翻译任务不存在: {0}")]
    JobNotFound(u64),

    /// 非法的任务状态迁移
    #[error("非法的任务状态迁移: {from:?} -> {to:?}")]
    InvalidStateTransition {
        /// 迁移前状态
        from: JobStatus,
        /// 请求的目标状态
        to: JobStatus,
    },

    /// 同一 (内容类型, 目标语言) 已存在未结束的任务
    #[error("内容类型 {content_type} 到 {target_locale} 的翻译任务已在进行中")]
    JobAlreadyActive {
        /// 内容类型标识
        content_type: String,
        /// 目标语言代码
        target_locale: String,
    },

    /// 任务后台处理失败（记录在任务记录上，通常不直接抛出）
    #[error("任务处理失败: {0}")]
    Processing(String),

    /// 存储层错误（条目存储、任务存储或注册表）
    #[error("存储错误: {0}")]
    Store(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

impl TranslateError {
    /// 检查错误是否可重试
    ///
    /// 核心层自身不做重试，此标记供上层调用方参考。
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslateError::Backend(_) => true,
            TranslateError::Store(_) => true,
            TranslateError::Validation(_) => false,
            TranslateError::JobNotFound(_) => false,
            TranslateError::InvalidStateTransition { .. } => false,
            TranslateError::JobAlreadyActive { .. } => false,
            TranslateError::Processing(_) => false,
            TranslateError::Config(_) => false,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslateError::Validation(_) => ErrorCategory::Input,
            TranslateError::Backend(_) => ErrorCategory::Backend,
            TranslateError::JobNotFound(_) => ErrorCategory::Job,
            TranslateError::InvalidStateTransition { .. } => ErrorCategory::Job,
            TranslateError::JobAlreadyActive { .. } => ErrorCategory::Job,
            TranslateError::Processing(_) => ErrorCategory::Job,
            TranslateError::Store(_) => ErrorCategory::Store,
            TranslateError::Config(_) => ErrorCategory::Configuration,
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 输入与参数问题
    Input,
    /// 翻译后端问题
    Backend,
    /// 任务生命周期问题
    Job,
    /// 存储层问题
    Store,
    /// 配置问题
    Configuration,
}

/// 标准错误转换
impl From<serde_json::Error> for TranslateError {
    fn from(error: serde_json::Error) -> Self {
        TranslateError::Validation(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslateError {
    fn from(error: toml::de::Error) -> Self {
        TranslateError::Config(format!("TOML解析错误: {}", error))
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(error: reqwest::Error) -> Self {
        TranslateError::Backend(format!("HTTP请求错误: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslateResult<T> = Result<T, TranslateError>;

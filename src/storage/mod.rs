//! 外部协作方接口模块
//!
//! 内容条目存储、任务存储、语言与内容类型注册表、完整度检查器
//! 都在本核心之外实现，这里只定义其能力接口与共享数据类型。
//! `memory` 子模块提供用于测试和小规模部署的内存实现。

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch::TranslationField;
use crate::error::TranslateResult;
use crate::job::{Job, JobProgress, JobStatus};

/// 语言/区域标识
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// 语言代码（如 "en"、"de"）
    pub code: String,
    /// 展示名称
    pub name: String,
}

impl Locale {
    /// 便捷构造
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

/// 内容类型描述
///
/// 注册表负责声明每个内容类型是否参与本地化，以及其中哪些字段
/// 需要翻译、各自的格式标签。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentTypeInfo {
    /// 内容类型标识（如 "api::article.article"）
    pub uid: String,
    /// 展示名称
    pub display_name: String,
    /// 是否参与本地化
    pub localized: bool,
    /// 需要翻译的字段及格式
    pub fields: Vec<TranslationField>,
}

/// 一条内容条目：某内容类型在某语言下的一条记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// 条目标识，跨语言变体共享
    pub id: String,
    /// 所属内容类型
    pub content_type: String,
    /// 语言代码
    pub locale: String,
    /// 数据树
    pub data: Value,
}

/// 内容条目存储能力
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// 枚举在目标语言中尚无翻译的源语言条目
    ///
    /// 返回顺序必须稳定：同一任务暂停后恢复时，依赖此顺序
    /// 从第一个未处理条目继续。
    async fn find_untranslated(
        &self,
        content_type: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<Vec<Entry>>;

    /// 统计某内容类型在某语言下的条目数
    async fn count(&self, content_type: &str, locale: &str) -> TranslateResult<usize>;

    /// 持久化一条翻译后的条目
    async fn save_translated(&self, entry: Entry) -> TranslateResult<()>;
}

/// 任务记录存储能力
#[async_trait]
pub trait JobStore: Send + Sync {
    /// 创建任务记录
    async fn create(&self, job: Job) -> TranslateResult<()>;

    /// 更新任务记录
    async fn update(&self, job: Job) -> TranslateResult<()>;

    /// 原子地更新进度字段并刷新更新时间，不触碰状态
    ///
    /// 实现必须保证与并发的状态写入互不覆盖；返回更新后的记录。
    async fn update_progress(&self, id: u64, progress: JobProgress) -> TranslateResult<Job>;

    /// 仅当当前状态等于 `from` 时原子地迁移到 `to`
    ///
    /// 状态已被并发修改时返回 `Ok(None)`，不做任何写入；
    /// 成功时返回更新后的记录。
    async fn transition_status(
        &self,
        id: u64,
        from: JobStatus,
        to: JobStatus,
    ) -> TranslateResult<Option<Job>>;

    /// 按标识查找任务
    async fn find(&self, id: u64) -> TranslateResult<Option<Job>>;

    /// 查找某 (内容类型, 目标语言) 下未结束的任务
    async fn find_active(
        &self,
        content_type: &str,
        target_locale: &str,
    ) -> TranslateResult<Option<Job>>;

    /// 查找某 (内容类型, 目标语言) 下最近更新的任务
    async fn find_latest(
        &self,
        content_type: &str,
        target_locale: &str,
    ) -> TranslateResult<Option<Job>>;
}

/// 语言注册表能力
#[async_trait]
pub trait LocaleRegistry: Send + Sync {
    /// 列出所有已注册语言
    async fn find(&self) -> TranslateResult<Vec<Locale>>;
}

/// 内容类型注册表能力
#[async_trait]
pub trait ContentTypeRegistry: Send + Sync {
    /// 列出所有内容类型
    async fn find(&self) -> TranslateResult<Vec<ContentTypeInfo>>;

    /// 按标识查找内容类型
    async fn get(&self, uid: &str) -> TranslateResult<Option<ContentTypeInfo>>;
}

/// 翻译完整度检查能力
#[async_trait]
pub trait CompletenessChecker: Send + Sync {
    /// 判断某内容类型在某语言下是否已完整翻译
    async fn is_fully_translated(&self, content_type: &str, locale: &str)
        -> TranslateResult<bool>;
}

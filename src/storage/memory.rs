//! 内存存储实现（简化版）
//!
//! 为测试、示例和小规模单进程部署提供所有协作方接口的内存实现。
//! 条目按插入顺序保存，满足 [`EntryStore::find_untranslated`]
//! 的稳定顺序要求。

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{TranslateError, TranslateResult};
use crate::job::{Job, JobProgress, JobStatus};
use crate::storage::{
    CompletenessChecker, ContentTypeInfo, ContentTypeRegistry, Entry, EntryStore, JobStore, Locale,
    LocaleRegistry,
};

/// 内存条目存储
///
/// 以 (内容类型, 语言) 为键保存条目列表，列表保持插入顺序。
#[derive(Debug, Default, Clone)]
pub struct MemoryEntryStore {
    entries: Arc<DashMap<(String, String), Vec<Entry>>>,
}

impl MemoryEntryStore {
    /// 创建空的条目存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一条条目（同 id 覆盖，否则追加到末尾）
    pub fn insert(&self, entry: Entry) {
        let key = (entry.content_type.clone(), entry.locale.clone());
        let mut list = self.entries.entry(key).or_default();
        match list.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => list.push(entry),
        }
    }

    /// 读取某内容类型在某语言下的全部条目（插入顺序）
    pub fn list(&self, content_type: &str, locale: &str) -> Vec<Entry> {
        self.entries
            .get(&(content_type.to_string(), locale.to_string()))
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn find_untranslated(
        &self,
        content_type: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<Vec<Entry>> {
        let translated: Vec<String> = self
            .list(content_type, target_locale)
            .into_iter()
            .map(|e| e.id)
            .collect();
        Ok(self
            .list(content_type, source_locale)
            .into_iter()
            .filter(|entry| !translated.contains(&entry.id))
            .collect())
    }

    async fn count(&self, content_type: &str, locale: &str) -> TranslateResult<usize> {
        Ok(self.list(content_type, locale).len())
    }

    async fn save_translated(&self, entry: Entry) -> TranslateResult<()> {
        self.insert(entry);
        Ok(())
    }
}

/// 内存任务存储
#[derive(Debug, Default, Clone)]
pub struct MemoryJobStore {
    jobs: Arc<DashMap<u64, Job>>,
}

impl MemoryJobStore {
    /// 创建空的任务存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 列出全部任务记录（无序）
    pub fn all(&self) -> Vec<Job> {
        self.jobs.iter().map(|j| j.clone()).collect()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: Job) -> TranslateResult<()> {
        if self.jobs.contains_key(&job.id) {
            return Err(TranslateError::Store(format!("任务 {} 已存在", job.id)));
        }
        self.jobs.insert(job.id, job);
        Ok(())
    }

    async fn update(&self, job: Job) -> TranslateResult<()> {
        if !self.jobs.contains_key(&job.id) {
            return Err(TranslateError::Store(format!("任务 {} 不存在", job.id)));
        }
        self.jobs.insert(job.id, job);
        Ok(())
    }

    async fn update_progress(&self, id: u64, progress: JobProgress) -> TranslateResult<Job> {
        // get_mut 持有分片锁，进度写入对并发的状态写入原子
        let mut job = self
            .jobs
            .get_mut(&id)
            .ok_or_else(|| TranslateError::Store(format!("任务 {} 不存在", id)))?;
        job.progress = progress;
        job.touch();
        Ok(job.clone())
    }

    async fn transition_status(
        &self,
        id: u64,
        from: JobStatus,
        to: JobStatus,
    ) -> TranslateResult<Option<Job>> {
        let mut job = self
            .jobs
            .get_mut(&id)
            .ok_or_else(|| TranslateError::Store(format!("任务 {} 不存在", id)))?;
        if job.status != from {
            return Ok(None);
        }
        job.status = to;
        job.touch();
        Ok(Some(job.clone()))
    }

    async fn find(&self, id: u64) -> TranslateResult<Option<Job>> {
        Ok(self.jobs.get(&id).map(|j| j.clone()))
    }

    async fn find_active(
        &self,
        content_type: &str,
        target_locale: &str,
    ) -> TranslateResult<Option<Job>> {
        Ok(self
            .jobs
            .iter()
            .filter(|j| {
                j.content_type == content_type
                    && j.target_locale == target_locale
                    && !j.status.is_terminal()
            })
            .map(|j| j.clone())
            .next())
    }

    async fn find_latest(
        &self,
        content_type: &str,
        target_locale: &str,
    ) -> TranslateResult<Option<Job>> {
        Ok(self
            .jobs
            .iter()
            .filter(|j| j.content_type == content_type && j.target_locale == target_locale)
            .map(|j| j.clone())
            .max_by_key(|j| j.updated_at))
    }
}

/// 内存语言注册表
#[derive(Debug, Clone)]
pub struct MemoryLocaleRegistry {
    locales: Vec<Locale>,
}

impl MemoryLocaleRegistry {
    /// 以给定语言列表创建注册表
    pub fn new(locales: Vec<Locale>) -> Self {
        Self { locales }
    }
}

#[async_trait]
impl LocaleRegistry for MemoryLocaleRegistry {
    async fn find(&self) -> TranslateResult<Vec<Locale>> {
        Ok(self.locales.clone())
    }
}

/// 内存内容类型注册表
#[derive(Debug, Clone)]
pub struct MemoryContentTypeRegistry {
    types: Vec<ContentTypeInfo>,
}

impl MemoryContentTypeRegistry {
    /// 以给定内容类型列表创建注册表
    pub fn new(types: Vec<ContentTypeInfo>) -> Self {
        Self { types }
    }
}

#[async_trait]
impl ContentTypeRegistry for MemoryContentTypeRegistry {
    async fn find(&self) -> TranslateResult<Vec<ContentTypeInfo>> {
        Ok(self.types.clone())
    }

    async fn get(&self, uid: &str) -> TranslateResult<Option<ContentTypeInfo>> {
        Ok(self.types.iter().find(|t| t.uid == uid).cloned())
    }
}

/// 基于条目计数的完整度检查器
///
/// 当基准语言中的每个条目在目标语言中都有同 id 的翻译时视为完整。
#[derive(Debug, Clone)]
pub struct CountingCompletenessChecker {
    entries: MemoryEntryStore,
    base_locale: String,
}

impl CountingCompletenessChecker {
    /// 以条目存储与基准语言创建检查器
    pub fn new(entries: MemoryEntryStore, base_locale: &str) -> Self {
        Self {
            entries,
            base_locale: base_locale.to_string(),
        }
    }
}

#[async_trait]
impl CompletenessChecker for CountingCompletenessChecker {
    async fn is_fully_translated(
        &self,
        content_type: &str,
        locale: &str,
    ) -> TranslateResult<bool> {
        if locale == self.base_locale {
            return Ok(true);
        }
        let base = self.entries.list(content_type, &self.base_locale);
        let translated = self.entries.list(content_type, locale);
        Ok(base
            .iter()
            .all(|entry| translated.iter().any(|t| t.id == entry.id)))
    }
}

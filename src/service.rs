//! 翻译核心服务门面
//!
//! 把字段调度、任务管理与报告汇总组装成单一入口，并维护
//! 简单的运行统计。上层（HTTP 层、插件宿主）只依赖本模块。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::TranslatorConfig;
use crate::dispatch::{self, FieldDispatcher, TranslationField, TranslationRequest};
use crate::error::TranslateResult;
use crate::job::{Job, JobManager, JobParams};
use crate::provider::{HttpProvider, TranslationProvider};
use crate::report::{Report, ReportAggregator};
use crate::storage::{
    CompletenessChecker, ContentTypeRegistry, EntryStore, JobStore, LocaleRegistry,
};

/// 服务依赖的外部协作方集合
#[derive(Clone)]
pub struct Collaborators {
    /// 内容条目存储
    pub entries: Arc<dyn EntryStore>,
    /// 任务存储
    pub jobs: Arc<dyn JobStore>,
    /// 内容类型注册表
    pub content_types: Arc<dyn ContentTypeRegistry>,
    /// 语言注册表
    pub locales: Arc<dyn LocaleRegistry>,
    /// 完整度检查器
    pub completeness: Arc<dyn CompletenessChecker>,
}

/// 运行统计
#[derive(Debug, Default)]
struct ServiceStats {
    translate_calls: AtomicU64,
    translate_failures: AtomicU64,
    jobs_submitted: AtomicU64,
}

/// 运行统计快照
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsSnapshot {
    /// 单条目翻译调用次数
    pub translate_calls: u64,
    /// 单条目翻译失败次数
    pub translate_failures: u64,
    /// 已提交的批量任务数
    pub jobs_submitted: u64,
}

/// 翻译核心服务
pub struct TranslatorService {
    dispatcher: Arc<FieldDispatcher>,
    manager: JobManager,
    reports: ReportAggregator,
    stats: ServiceStats,
}

impl TranslatorService {
    /// 以给定后端与协作方创建服务
    pub fn new(
        provider: Arc<dyn TranslationProvider>,
        collaborators: Collaborators,
        config: TranslatorConfig,
    ) -> Self {
        let dispatcher = Arc::new(FieldDispatcher::new(provider));
        let manager = JobManager::new(
            Arc::clone(&collaborators.jobs),
            Arc::clone(&collaborators.entries),
            Arc::clone(&collaborators.content_types),
            Arc::clone(&collaborators.locales),
            Arc::clone(&dispatcher),
            config,
        );
        let reports = ReportAggregator::new(
            collaborators.entries,
            collaborators.jobs,
            collaborators.content_types,
            collaborators.locales,
            collaborators.completeness,
        );
        Self {
            dispatcher,
            manager,
            reports,
            stats: ServiceStats::default(),
        }
    }

    /// 按配置创建使用 HTTP 后端的服务
    pub fn with_http_provider(
        collaborators: Collaborators,
        config: TranslatorConfig,
    ) -> TranslateResult<Self> {
        let provider = Arc::new(HttpProvider::new(&config)?);
        Ok(Self::new(provider, collaborators, config))
    }

    /// 估算一组字段的翻译用量（Unicode 字符数）
    pub fn estimate_usage(&self, data: &Value, fields: &[TranslationField]) -> usize {
        dispatch::estimate_usage(data, fields)
    }

    /// 翻译单条目数据树中的指定字段
    pub async fn translate(&self, request: TranslationRequest) -> TranslateResult<Value> {
        self.stats.translate_calls.fetch_add(1, Ordering::Relaxed);
        let result = self.dispatcher.translate(request).await;
        if result.is_err() {
            self.stats
                .translate_failures
                .fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// 提交批量翻译任务
    pub async fn submit_job(&self, params: JobParams) -> TranslateResult<Job> {
        let job = self.manager.submit_job(params).await?;
        self.stats.jobs_submitted.fetch_add(1, Ordering::Relaxed);
        Ok(job)
    }

    /// 暂停任务
    pub async fn pause_job(&self, id: u64) -> TranslateResult<Job> {
        self.manager.pause_job(id).await
    }

    /// 恢复任务
    pub async fn resume_job(&self, id: u64) -> TranslateResult<Job> {
        self.manager.resume_job(id).await
    }

    /// 取消任务
    pub async fn cancel_job(&self, id: u64) -> TranslateResult<Job> {
        self.manager.cancel_job(id).await
    }

    /// 查询任务记录
    pub async fn job(&self, id: u64) -> TranslateResult<Job> {
        self.manager.job(id).await
    }

    /// 汇总全量翻译状况报告
    pub async fn report(&self) -> TranslateResult<Report> {
        self.reports.content_types().await
    }

    /// 获取运行统计快照
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            translate_calls: self.stats.translate_calls.load(Ordering::Relaxed),
            translate_failures: self.stats.translate_failures.load(Ordering::Relaxed),
            jobs_submitted: self.stats.jobs_submitted.load(Ordering::Relaxed),
        }
    }
}

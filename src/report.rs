//! 翻译状况报告模块
//!
//! 汇总各内容类型在各语言下的条目数、完整度与最近一次批量任务，
//! 供管理界面一次性拉取。报告是只读快照，任何存储错误都让整个
//! 报告失败，不返回部分结果。

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;

use crate::error::TranslateResult;
use crate::job::Job;
use crate::storage::{
    CompletenessChecker, ContentTypeInfo, ContentTypeRegistry, EntryStore, JobStore, Locale,
    LocaleRegistry,
};

/// 某内容类型在单一语言下的报告
#[derive(Debug, Clone, Serialize)]
pub struct LocaleReport {
    /// 该语言下的条目数
    pub count: usize,
    /// 是否已完整翻译
    pub complete: bool,
    /// 最近更新的批量任务（含已结束的）
    pub job: Option<Job>,
}

/// 单个内容类型的报告
#[derive(Debug, Clone, Serialize)]
pub struct ContentTypeReport {
    /// 内容类型标识
    pub uid: String,
    /// 展示名称
    pub display_name: String,
    /// 按语言代码索引的各语言报告
    pub locale_reports: HashMap<String, LocaleReport>,
}

/// 全量翻译状况报告
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// 参与本地化的内容类型报告
    pub content_types: Vec<ContentTypeReport>,
    /// 已注册语言列表
    pub locales: Vec<Locale>,
}

/// 报告汇总器
pub struct ReportAggregator {
    entries: Arc<dyn EntryStore>,
    jobs: Arc<dyn JobStore>,
    content_types: Arc<dyn ContentTypeRegistry>,
    locales: Arc<dyn LocaleRegistry>,
    completeness: Arc<dyn CompletenessChecker>,
}

impl ReportAggregator {
    /// 创建报告汇总器
    pub fn new(
        entries: Arc<dyn EntryStore>,
        jobs: Arc<dyn JobStore>,
        content_types: Arc<dyn ContentTypeRegistry>,
        locales: Arc<dyn LocaleRegistry>,
        completeness: Arc<dyn CompletenessChecker>,
    ) -> Self {
        Self {
            entries,
            jobs,
            content_types,
            locales,
            completeness,
        }
    }

    /// 汇总全量翻译状况报告
    ///
    /// 未启用本地化的内容类型不出现在报告中。
    pub async fn content_types(&self) -> TranslateResult<Report> {
        let (types, locales) = tokio::try_join!(self.content_types.find(), self.locales.find())?;
        let localized: Vec<ContentTypeInfo> =
            types.into_iter().filter(|info| info.localized).collect();

        let reports = try_join_all(
            localized
                .iter()
                .map(|info| self.content_type_report(info, &locales)),
        )
        .await?;

        tracing::debug!(
            "生成翻译报告: {} 个内容类型, {} 种语言",
            reports.len(),
            locales.len()
        );
        Ok(Report {
            content_types: reports,
            locales,
        })
    }

    async fn content_type_report(
        &self,
        info: &ContentTypeInfo,
        locales: &[Locale],
    ) -> TranslateResult<ContentTypeReport> {
        let per_locale = try_join_all(
            locales
                .iter()
                .map(|locale| self.locale_report(&info.uid, &locale.code)),
        )
        .await?;

        let locale_reports = locales
            .iter()
            .map(|locale| locale.code.clone())
            .zip(per_locale)
            .collect();
        Ok(ContentTypeReport {
            uid: info.uid.clone(),
            display_name: info.display_name.clone(),
            locale_reports,
        })
    }

    async fn locale_report(&self, uid: &str, locale: &str) -> TranslateResult<LocaleReport> {
        let (count, complete, job) = tokio::try_join!(
            self.entries.count(uid, locale),
            self.completeness.is_fully_translated(uid, locale),
            self.jobs.find_latest(uid, locale),
        )?;
        Ok(LocaleReport {
            count,
            complete,
            job,
        })
    }
}

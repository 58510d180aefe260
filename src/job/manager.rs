//! 批量翻译任务管理器
//!
//! 负责任务的提交、暂停、恢复与取消，以及后台处理循环。
//! 控制接口通过 [`JobStore::transition_status`] 的比较交换修改状态，
//! 后台循环在每个条目边界重读任务记录，据此协作式地停下；
//! 进度经由 [`JobStore::update_progress`] 原子写入，不触碰状态，
//! 因此并发设置的暂停或取消永远不会被循环覆盖。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::TranslatorConfig;
use crate::dispatch::{FieldDispatcher, TranslationRequest};
use crate::error::{TranslateError, TranslateResult};
use crate::job::state::JobStatus;
use crate::job::{Job, JobParams};
use crate::provider::Priority;
use crate::storage::{ContentTypeRegistry, Entry, EntryStore, JobStore, LocaleRegistry};

/// 批量翻译任务管理器
pub struct JobManager {
    jobs: Arc<dyn JobStore>,
    entries: Arc<dyn EntryStore>,
    content_types: Arc<dyn ContentTypeRegistry>,
    locales: Arc<dyn LocaleRegistry>,
    dispatcher: Arc<FieldDispatcher>,
    config: TranslatorConfig,
    next_id: AtomicU64,
}

impl JobManager {
    /// 创建任务管理器
    pub fn new(
        jobs: Arc<dyn JobStore>,
        entries: Arc<dyn EntryStore>,
        content_types: Arc<dyn ContentTypeRegistry>,
        locales: Arc<dyn LocaleRegistry>,
        dispatcher: Arc<FieldDispatcher>,
        config: TranslatorConfig,
    ) -> Self {
        Self {
            jobs,
            entries,
            content_types,
            locales,
            dispatcher,
            config,
            next_id: AtomicU64::new(1),
        }
    }

    /// 提交批量翻译任务
    ///
    /// 校验内容类型与语言后创建任务记录并启动后台处理。
    /// 同一 (内容类型, 目标语言) 已有未结束任务时拒绝提交。
    pub async fn submit_job(&self, params: JobParams) -> TranslateResult<Job> {
        if params.source_locale == params.target_locale {
            return Err(TranslateError::Validation(
                "源语言与目标语言不能相同".to_string(),
            ));
        }

        let locales = self.locales.find().await?;
        for code in [&params.source_locale, &params.target_locale] {
            if !locales.iter().any(|locale| &locale.code == code) {
                return Err(TranslateError::Validation(format!("未知语言: {}", code)));
            }
        }

        let info = self
            .content_types
            .get(&params.content_type)
            .await?
            .ok_or_else(|| {
                TranslateError::Validation(format!("未知内容类型: {}", params.content_type))
            })?;
        if !info.localized {
            return Err(TranslateError::Validation(format!(
                "内容类型 {} 未启用本地化",
                params.content_type
            )));
        }

        if let Some(active) = self
            .jobs
            .find_active(&params.content_type, &params.target_locale)
            .await?
        {
            tracing::warn!(
                "拒绝重复提交: 任务 #{} 仍在进行 ({})",
                active.id,
                active.status
            );
            return Err(TranslateError::JobAlreadyActive {
                content_type: params.content_type,
                target_locale: params.target_locale,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut job = Job::new(
            id,
            &params.content_type,
            &params.source_locale,
            &params.target_locale,
        );
        self.jobs.create(job.clone()).await?;

        job.status = job.status.transition(JobStatus::Queued)?;
        job.touch();
        self.jobs.update(job.clone()).await?;

        let priority = params.priority.unwrap_or(self.config.default_priority);
        self.spawn_run(id, priority);

        tracing::info!(
            "提交翻译任务 #{}: {} {} -> {}",
            id,
            job.content_type,
            job.source_locale,
            job.target_locale
        );
        Ok(job)
    }

    /// 暂停任务
    ///
    /// 状态立即写入存储；后台循环在下一个条目边界停下，
    /// 已开始的条目会先完成并入库。
    pub async fn pause_job(&self, id: u64) -> TranslateResult<Job> {
        let job = self.request_transition(id, JobStatus::Paused).await?;
        tracing::info!("暂停翻译任务 #{}", id);
        Ok(job)
    }

    /// 恢复已暂停的任务
    ///
    /// 仅对 `Paused` 状态的任务开放：`Queued -> Running` 属于处理
    /// 启动迁移，由提交时已经生成的循环完成，恢复不得再启动第二个
    /// 循环。待处理条目从存储中重新推导，已翻译的条目不会被再次处理。
    pub async fn resume_job(&self, id: u64) -> TranslateResult<Job> {
        let job = self.job(id).await?;
        if job.status != JobStatus::Paused {
            return Err(TranslateError::InvalidStateTransition {
                from: job.status,
                to: JobStatus::Running,
            });
        }
        // 比较交换保证并发的重复恢复中最多一个生成处理循环
        match self
            .jobs
            .transition_status(id, JobStatus::Paused, JobStatus::Running)
            .await?
        {
            Some(updated) => {
                self.spawn_run(id, self.config.default_priority);
                tracing::info!("恢复翻译任务 #{}", id);
                Ok(updated)
            }
            None => {
                let fresh = self.job(id).await?;
                Err(TranslateError::InvalidStateTransition {
                    from: fresh.status,
                    to: JobStatus::Running,
                })
            }
        }
    }

    /// 取消任务（不可逆）
    pub async fn cancel_job(&self, id: u64) -> TranslateResult<Job> {
        let job = self.request_transition(id, JobStatus::Cancelled).await?;
        tracing::info!("取消翻译任务 #{}", id);
        Ok(job)
    }

    /// 校验并以比较交换方式执行一次控制迁移
    async fn request_transition(&self, id: u64, to: JobStatus) -> TranslateResult<Job> {
        let job = self.job(id).await?;
        let target = job.status.transition(to)?;
        match self.jobs.transition_status(id, job.status, target).await? {
            Some(updated) => Ok(updated),
            None => {
                // 状态在校验与写入之间被并发修改，按最新状态报告
                let fresh = self.job(id).await?;
                Err(TranslateError::InvalidStateTransition {
                    from: fresh.status,
                    to: target,
                })
            }
        }
    }

    /// 按标识查询任务记录
    pub async fn job(&self, id: u64) -> TranslateResult<Job> {
        self.jobs
            .find(id)
            .await?
            .ok_or(TranslateError::JobNotFound(id))
    }

    /// 启动后台处理循环
    fn spawn_run(&self, job_id: u64, priority: Priority) {
        let jobs = Arc::clone(&self.jobs);
        let entries = Arc::clone(&self.entries);
        let content_types = Arc::clone(&self.content_types);
        let dispatcher = Arc::clone(&self.dispatcher);
        let entry_delay = self.config.entry_delay();
        tokio::spawn(async move {
            if let Err(error) = Self::process(
                &jobs,
                &entries,
                &content_types,
                &dispatcher,
                entry_delay,
                priority,
                job_id,
            )
            .await
            {
                tracing::error!("翻译任务 #{} 处理失败: {}", job_id, error);
                Self::mark_failed(&jobs, job_id, &error).await;
            }
        });
    }

    /// 后台处理循环主体
    ///
    /// 暂停与取消通过返回 Ok 干净退出；错误上抛由调用方标记 Failed。
    async fn process(
        jobs: &Arc<dyn JobStore>,
        entries: &Arc<dyn EntryStore>,
        content_types: &Arc<dyn ContentTypeRegistry>,
        dispatcher: &Arc<FieldDispatcher>,
        entry_delay: Duration,
        priority: Priority,
        job_id: u64,
    ) -> TranslateResult<()> {
        let found = jobs
            .find(job_id)
            .await?
            .ok_or(TranslateError::JobNotFound(job_id))?;
        let job = if found.status == JobStatus::Running {
            found
        } else {
            found.status.transition(JobStatus::Running)?;
            match jobs
                .transition_status(job_id, found.status, JobStatus::Running)
                .await?
            {
                Some(updated) => updated,
                // 启动前状态已被并发修改（如已取消），放弃处理
                None => return Ok(()),
            }
        };

        let info = content_types.get(&job.content_type).await?.ok_or_else(|| {
            TranslateError::Validation(format!("未知内容类型: {}", job.content_type))
        })?;
        let pending = entries
            .find_untranslated(&job.content_type, &job.source_locale, &job.target_locale)
            .await?;

        let mut progress = job.progress;
        progress.total = progress.processed + pending.len();
        jobs.update_progress(job_id, progress).await?;

        tracing::info!("翻译任务 #{} 开始处理 {} 个条目", job_id, pending.len());

        for entry in pending {
            // 条目边界检查点：从存储重读权威状态
            let current = jobs
                .find(job_id)
                .await?
                .ok_or(TranslateError::JobNotFound(job_id))?;
            match current.status {
                JobStatus::Running => {}
                JobStatus::Paused => {
                    tracing::info!("翻译任务 #{} 在条目边界暂停", job_id);
                    return Ok(());
                }
                JobStatus::Cancelled => {
                    tracing::info!("翻译任务 #{} 在条目边界取消", job_id);
                    return Ok(());
                }
                other => {
                    tracing::warn!("翻译任务 #{} 状态异常 ({}), 停止处理", job_id, other);
                    return Ok(());
                }
            }

            let translated = dispatcher
                .translate(TranslationRequest {
                    data: entry.data.clone(),
                    source_locale: job.source_locale.clone(),
                    target_locale: job.target_locale.clone(),
                    fields: info.fields.clone(),
                    priority,
                })
                .await?;
            entries
                .save_translated(Entry {
                    id: entry.id.clone(),
                    content_type: job.content_type.clone(),
                    locale: job.target_locale.clone(),
                    data: translated,
                })
                .await?;

            // 进度原子写入，不触碰并发设置的状态
            progress.processed += 1;
            jobs.update_progress(job_id, progress).await?;
            tracing::debug!("翻译任务 #{} 完成条目 {}", job_id, entry.id);

            if !entry_delay.is_zero() {
                tokio::time::sleep(entry_delay).await;
            }
        }

        // 比较交换收尾：最后一个条目之后落下的暂停/取消优先生效
        if let Some(done) = jobs
            .transition_status(job_id, JobStatus::Running, JobStatus::Completed)
            .await?
        {
            tracing::info!(
                "翻译任务 #{} 完成: {}/{} 个条目",
                job_id,
                done.progress.processed,
                done.progress.total
            );
        }
        Ok(())
    }

    /// 将任务标记为失败并记录原因
    ///
    /// 比较交换只在任务仍为 `Running` 时生效；进入终态后记录不再
    /// 有并发写入方，补写失败原因是安全的。
    async fn mark_failed(jobs: &Arc<dyn JobStore>, job_id: u64, error: &TranslateError) {
        match jobs
            .transition_status(job_id, JobStatus::Running, JobStatus::Failed)
            .await
        {
            Ok(Some(mut job)) => {
                job.failure_reason = Some(error.to_string());
                job.progress.failed += 1;
                job.touch();
                if let Err(store_error) = jobs.update(job).await {
                    tracing::warn!(
                        "记录任务 #{} 失败状态时出错: {}",
                        job_id,
                        store_error
                    );
                }
            }
            Ok(None) => {}
            Err(store_error) => {
                tracing::warn!("标记任务 #{} 失败时出错: {}", job_id, store_error);
            }
        }
    }
}

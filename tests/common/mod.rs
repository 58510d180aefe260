// 集成测试公共模块
//
// 提供脚本化的翻译后端、测试环境构建与状态轮询辅助

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tokio::time::sleep;

use content_translator::config::TranslatorConfig;
use content_translator::dispatch::TranslationField;
use content_translator::error::{TranslateError, TranslateResult};
use content_translator::job::{Job, JobStatus};
use content_translator::provider::{ProviderRequest, TranslationProvider};
use content_translator::service::{Collaborators, TranslatorService};
use content_translator::storage::memory::{
    CountingCompletenessChecker, MemoryContentTypeRegistry, MemoryEntryStore, MemoryJobStore,
    MemoryLocaleRegistry,
};
use content_translator::storage::{ContentTypeInfo, Entry, Locale};

/// 文章内容类型标识
pub const ARTICLE: &str = "api::article.article";
/// 未启用本地化的内容类型标识
pub const SETTINGS: &str = "api::settings.settings";

/// 确定性的"翻译"变换，便于断言结果来源
pub fn transform(text: &str, target_locale: &str) -> String {
    format!("{}@{}", text, target_locale)
}

/// 脚本化后端：记录每次调用并按确定性变换返回译文
#[derive(Default)]
pub struct ScriptedProvider {
    calls: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ProviderRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TranslationProvider for ScriptedProvider {
    async fn translate(&self, request: ProviderRequest) -> TranslateResult<Vec<String>> {
        let translated = request
            .text
            .iter()
            .map(|text| transform(text, &request.target_locale))
            .collect();
        self.calls.lock().unwrap().push(request);
        Ok(translated)
    }
}

/// 始终失败的后端
pub struct FailingProvider;

#[async_trait]
impl TranslationProvider for FailingProvider {
    async fn translate(&self, _request: ProviderRequest) -> TranslateResult<Vec<String>> {
        Err(TranslateError::Backend(
            "simulated backend outage".to_string(),
        ))
    }
}

/// 返回数量不一致的后端
pub struct CountMismatchProvider;

#[async_trait]
impl TranslationProvider for CountMismatchProvider {
    async fn translate(&self, _request: ProviderRequest) -> TranslateResult<Vec<String>> {
        Ok(vec!["only-one".to_string()])
    }
}

/// 门控后端：每次调用消耗一个许可，测试通过 [`GatedProvider::release`]
/// 逐次放行，从而在确定的条目边界上观察暂停与取消
pub struct GatedProvider {
    gate: Semaphore,
    started: AtomicUsize,
    completed: AtomicUsize,
}

impl GatedProvider {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn release(&self, permits: usize) {
        self.gate.add_permits(permits);
    }

    /// 已发起的调用数（含仍在门上等待的）
    pub fn started_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// 已放行并返回译文的调用数
    pub fn call_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for GatedProvider {
    async fn translate(&self, request: ProviderRequest) -> TranslateResult<Vec<String>> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| TranslateError::Backend("gate closed".to_string()))?;
        permit.forget();
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(request
            .text
            .iter()
            .map(|text| transform(text, &request.target_locale))
            .collect())
    }
}

/// 集成测试环境：内存存储 + 预注册的语言与内容类型
pub struct TestEnvironment {
    pub entries: MemoryEntryStore,
    pub jobs: MemoryJobStore,
    pub service: TranslatorService,
}

impl TestEnvironment {
    /// 以给定后端构建测试环境
    ///
    /// 注册语言 en/de/fr；文章类型的全部字段共用 "plain" 格式，
    /// 因此每个条目恰好对应一次后端调用。
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        init_tracing();
        let entries = MemoryEntryStore::new();
        let jobs = MemoryJobStore::new();
        let content_types = MemoryContentTypeRegistry::new(vec![
            ContentTypeInfo {
                uid: ARTICLE.to_string(),
                display_name: "Article".to_string(),
                localized: true,
                fields: vec![
                    TranslationField::new("title", "plain"),
                    TranslationField::new("body", "plain"),
                    TranslationField::new("tags", "plain"),
                ],
            },
            ContentTypeInfo {
                uid: SETTINGS.to_string(),
                display_name: "Settings".to_string(),
                localized: false,
                fields: vec![],
            },
        ]);
        let locales = MemoryLocaleRegistry::new(vec![
            Locale::new("en", "English"),
            Locale::new("de", "German"),
            Locale::new("fr", "French"),
        ]);
        let collaborators = Collaborators {
            entries: Arc::new(entries.clone()),
            jobs: Arc::new(jobs.clone()),
            content_types: Arc::new(content_types),
            locales: Arc::new(locales),
            completeness: Arc::new(CountingCompletenessChecker::new(entries.clone(), "en")),
        };
        let service = TranslatorService::new(provider, collaborators, TranslatorConfig::default());
        Self {
            entries,
            jobs,
            service,
        }
    }

    /// 写入一条英文文章条目
    pub fn seed_article(&self, id: &str) {
        self.entries.insert(article_entry(id, "en"));
    }

    /// 读取某语言下的文章条目数
    pub fn article_count(&self, locale: &str) -> usize {
        self.entries.list(ARTICLE, locale).len()
    }
}

/// 构造一条文章条目
pub fn article_entry(id: &str, locale: &str) -> Entry {
    Entry {
        id: id.to_string(),
        content_type: ARTICLE.to_string(),
        locale: locale.to_string(),
        data: article_data(id),
    }
}

/// 构造文章数据树
pub fn article_data(id: &str) -> Value {
    json!({
        "title": format!("Title {}", id),
        "body": format!("Body {}", id),
        "tags": ["news", "tech"],
        "slug": format!("slug-{}", id),
    })
}

/// 轮询等待任务到达指定状态
pub async fn wait_for_status(service: &TranslatorService, id: u64, status: JobStatus) -> Job {
    for _ in 0..500 {
        let job = service.job(id).await.expect("job record should exist");
        if job.status == status {
            return job;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for job {} to reach {}", id, status);
}

/// 轮询等待条件成立
pub async fn wait_until<F: Fn() -> bool>(condition: F, what: &str) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {}", what);
}

/// 留给后台循环抵达下一个条目边界的时间
pub async fn settle() {
    sleep(Duration::from_millis(150)).await;
}

/// 初始化测试日志输出（重复调用安全）
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

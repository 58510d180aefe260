//! 翻译后端接口模块
//!
//! 定义统一的翻译后端能力接口，以及内置的 DeepLX 风格 HTTP 后端实现。
//! 后端契约：输入是一个有序的文本序列，输出必须是等长且同序的译文序列；
//! 后端错误原样上抛，核心层不做重试或退避。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TranslatorConfig;
use crate::error::{TranslateError, TranslateResult};

/// 调度优先级提示（透传给后端，不影响核心语义）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// 低优先级
    Low,
    /// 普通优先级
    #[default]
    Normal,
    /// 高优先级
    High,
}

/// 传给后端的一次翻译调用
///
/// `text` 中的顺序即结果顺序；`format` 是不透明标签，
/// 由后端决定纯文本与富文本等不同形态的处理方式。
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    /// 有序的待翻译文本序列
    pub text: Vec<String>,
    /// 源语言代码
    pub source_locale: String,
    /// 目标语言代码
    pub target_locale: String,
    /// 调度优先级提示
    pub priority: Priority,
    /// 字段格式标签
    pub format: String,
}

/// 翻译后端能力接口
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// 翻译一组有序文本
    ///
    /// 实现必须按输入顺序返回等长的译文序列；任何失败都应作为错误
    /// 上抛而不是返回部分结果。
    async fn translate(&self, request: ProviderRequest) -> TranslateResult<Vec<String>>;
}

/// DeepLX 风格的 HTTP 翻译后端
///
/// 以 JSON POST 调用外部翻译 API，请求与响应格式见 [`HttpProviderRequest`]
/// 与 [`HttpProviderResponse`]。超时等边界控制由 `reqwest` 客户端承担，
/// 核心层不额外包装。
pub struct HttpProvider {
    client: reqwest::Client,
    api_url: String,
}

/// HTTP 后端的请求体
#[derive(Debug, Serialize)]
struct HttpProviderRequest<'a> {
    text: &'a [String],
    source_lang: &'a str,
    target_lang: &'a str,
    priority: Priority,
    format: &'a str,
}

/// HTTP 后端的响应体
#[derive(Debug, Deserialize)]
struct HttpProviderResponse {
    data: Vec<String>,
}

impl HttpProvider {
    /// 根据配置创建 HTTP 后端
    pub fn new(config: &TranslatorConfig) -> TranslateResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TranslateError::Config(format!("创建HTTP客户端失败: {}", e)))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl TranslationProvider for HttpProvider {
    async fn translate(&self, request: ProviderRequest) -> TranslateResult<Vec<String>> {
        let expected = request.text.len();
        if expected == 0 {
            return Ok(Vec::new());
        }

        tracing::debug!(
            "调用翻译后端: {} 段文本, {} -> {}, 格式 {}",
            expected,
            request.source_locale,
            request.target_locale,
            request.format
        );

        let body = HttpProviderRequest {
            text: &request.text,
            source_lang: &request.source_locale,
            target_lang: &request.target_locale,
            priority: request.priority,
            format: &request.format,
        };

        let response = self.client.post(&self.api_url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Backend(format!(
                "翻译后端返回错误状态: {}",
                status
            )));
        }

        let payload: HttpProviderResponse = response.json().await?;
        if payload.data.len() != expected {
            return Err(TranslateError::Backend(format!(
                "翻译后端返回数量不一致: 期望 {}, 实际 {}",
                expected,
                payload.data.len()
            )));
        }
        Ok(payload.data)
    }
}

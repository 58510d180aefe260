//! 字段调度模块
//!
//! 单条目翻译的核心：从数据树中按字段路径取出可翻译文本，
//! 按格式标签分组后并发调用翻译后端，再按位置写回数据树副本。
//! 分组内的文本顺序与写回顺序由同一索引序列决定，后端只要保持
//! 输入输出同序等长，结果就不会串位。

use std::sync::Arc;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TranslateError, TranslateResult};
use crate::path::FieldPath;
use crate::provider::{Priority, ProviderRequest, TranslationProvider};

/// 待翻译字段描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationField {
    /// 字段在数据树中的路径
    pub path: FieldPath,
    /// 格式标签（如 "plain"、"markdown"），对核心不透明
    pub format: String,
}

impl TranslationField {
    /// 便捷构造
    pub fn new(path: &str, format: &str) -> Self {
        Self {
            path: FieldPath::parse(path),
            format: format.to_string(),
        }
    }
}

/// 一次单条目翻译请求
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// 源数据树
    pub data: Value,
    /// 源语言代码
    pub source_locale: String,
    /// 目标语言代码
    pub target_locale: String,
    /// 待翻译字段列表
    pub fields: Vec<TranslationField>,
    /// 调度优先级提示
    pub priority: Priority,
}

/// 字段取值结果
///
/// 区分标量与数组是为了写回时恢复原有形状：数组在送往后端前
/// 被展平一层，写回时按原数组长度切分。
#[derive(Debug, Clone)]
enum FieldValue {
    /// 单个字符串（缺失路径按空串处理）
    Scalar(String),
    /// 字符串数组（仅支持一层，元素必须是字符串）
    List(Vec<String>),
}

impl FieldValue {
    fn len(&self) -> usize {
        match self {
            FieldValue::Scalar(_) => 1,
            FieldValue::List(items) => items.len(),
        }
    }
}

/// 估算一组字段的翻译用量（Unicode 字符数）
///
/// 与 [`FieldDispatcher::translate`] 对相同输入计数一致：缺失路径
/// 与非字符串叶子计 0，字符串数组按元素长度求和。纯函数，不访问后端。
pub fn estimate_usage(data: &Value, fields: &[TranslationField]) -> usize {
    fields
        .iter()
        .map(|field| match field.path.get(data) {
            Some(Value::String(text)) => text.chars().count(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.chars().count(),
                    _ => 0,
                })
                .sum(),
            _ => 0,
        })
        .sum()
}

/// 字段调度器
///
/// 持有翻译后端，不持有任何状态；同一实例可被任意多的任务共享。
pub struct FieldDispatcher {
    provider: Arc<dyn TranslationProvider>,
}

impl FieldDispatcher {
    /// 以给定后端创建调度器
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self { provider }
    }

    /// 翻译单条目数据树中的指定字段
    ///
    /// 源语言与目标语言相同时直接返回原数据，不调用后端。
    /// 未列出的字段原样保留；后端失败时整个条目失败，不产生部分写回。
    pub async fn translate(&self, request: TranslationRequest) -> TranslateResult<Value> {
        if request.source_locale == request.target_locale {
            tracing::debug!(
                "源语言与目标语言相同 ({}), 跳过翻译",
                request.source_locale
            );
            return Ok(request.data);
        }

        // 先完成全部取值校验，再发起任何后端调用
        let mut values = Vec::with_capacity(request.fields.len());
        for field in &request.fields {
            values.push(extract_field(&request.data, field)?);
        }

        // 按格式分组，保持首次出现顺序；组内字段保持列表顺序
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (index, field) in request.fields.iter().enumerate() {
            match groups.iter_mut().find(|(format, _)| *format == field.format) {
                Some((_, members)) => members.push(index),
                None => groups.push((field.format.clone(), vec![index])),
            }
        }

        let calls = groups.iter().map(|(format, members)| {
            let text: Vec<String> = members
                .iter()
                .flat_map(|&index| match &values[index] {
                    FieldValue::Scalar(text) => vec![text.clone()],
                    FieldValue::List(items) => items.clone(),
                })
                .collect();
            self.provider.translate(ProviderRequest {
                text,
                source_locale: request.source_locale.clone(),
                target_locale: request.target_locale.clone(),
                priority: request.priority,
                format: format.clone(),
            })
        });
        let translated_groups = try_join_all(calls).await?;

        // 按位置写回：每组的译文序列按原字段顺序与数组长度切分
        let mut output = request.data;
        for ((format, members), translated) in groups.iter().zip(translated_groups) {
            let expected: usize = members.iter().map(|&index| values[index].len()).sum();
            if translated.len() != expected {
                return Err(TranslateError::Backend(format!(
                    "格式 {} 的译文数量不一致: 期望 {}, 实际 {}",
                    format,
                    expected,
                    translated.len()
                )));
            }
            let mut cursor = translated.into_iter();
            for &index in members {
                let field = &request.fields[index];
                let value = match &values[index] {
                    FieldValue::Scalar(_) => cursor
                        .next()
                        .map(Value::String)
                        .unwrap_or(Value::Null),
                    FieldValue::List(items) => Value::Array(
                        cursor
                            .by_ref()
                            .take(items.len())
                            .map(Value::String)
                            .collect(),
                    ),
                };
                field.path.set(&mut output, value)?;
            }
        }
        Ok(output)
    }
}

/// 取出单个字段的待翻译文本
///
/// 缺失路径与 null 视为空串；字符串与字符串数组之外的形状
/// 一律拒绝，数组嵌套不展开第二层。
fn extract_field(data: &Value, field: &TranslationField) -> TranslateResult<FieldValue> {
    match field.path.get(data) {
        None | Some(Value::Null) => Ok(FieldValue::Scalar(String::new())),
        Some(Value::String(text)) => Ok(FieldValue::Scalar(text.clone())),
        Some(Value::Array(items)) => {
            let mut texts = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(text) => texts.push(text.clone()),
                    other => {
                        return Err(TranslateError::Validation(format!(
                            "字段 {} 的数组元素不是字符串: {}",
                            field.path, other
                        )))
                    }
                }
            }
            Ok(FieldValue::List(texts))
        }
        Some(other) => Err(TranslateError::Validation(format!(
            "字段 {} 不是可翻译的形状: {}",
            field.path, other
        ))),
    }
}

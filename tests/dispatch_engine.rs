//! 字段调度集成测试
//!
//! 覆盖单条目翻译的取值、分组、并发调用与按位置写回

use std::sync::Arc;

use serde_json::json;

use content_translator::dispatch::{
    estimate_usage, FieldDispatcher, TranslationField, TranslationRequest,
};
use content_translator::error::TranslateError;
use content_translator::provider::Priority;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{transform, CountMismatchProvider, FailingProvider, ScriptedProvider};

fn request(data: serde_json::Value, fields: Vec<TranslationField>) -> TranslationRequest {
    TranslationRequest {
        data,
        source_locale: "en".to_string(),
        target_locale: "de".to_string(),
        fields,
        priority: Priority::Normal,
    }
}

/// 源语言与目标语言相同时不得触碰后端
#[tokio::test]
async fn test_same_locale_translation_is_noop() {
    let provider = Arc::new(ScriptedProvider::new());
    let dispatcher = FieldDispatcher::new(provider.clone());

    let data = json!({"title": "Hello", "tags": ["a", "b"]});
    let mut req = request(
        data.clone(),
        vec![TranslationField::new("title", "plain")],
    );
    req.target_locale = "en".to_string();

    let result = dispatcher.translate(req).await.expect("same locale should succeed");
    assert_eq!(result, data, "data must be returned unchanged");
    assert_eq!(provider.call_count(), 0, "provider must not be called");
}

/// 标量与数组字段按位置写回，未列出的字段原样保留
#[tokio::test]
async fn test_scalar_and_array_fields_reassemble_in_place() {
    let provider = Arc::new(ScriptedProvider::new());
    let dispatcher = FieldDispatcher::new(provider.clone());

    let data = json!({
        "title": "Hello",
        "tags": ["first", "second"],
        "body": "Some **markdown**",
        "slug": "hello-post",
    });
    let fields = vec![
        TranslationField::new("title", "plain"),
        TranslationField::new("tags", "plain"),
        TranslationField::new("body", "markdown"),
    ];

    let result = dispatcher.translate(request(data, fields)).await.unwrap();

    assert_eq!(result["title"], transform("Hello", "de"));
    assert_eq!(
        result["tags"],
        json!([transform("first", "de"), transform("second", "de")])
    );
    assert_eq!(result["body"], transform("Some **markdown**", "de"));
    assert_eq!(result["slug"], "hello-post", "unlisted fields must survive");

    // 两个格式组各对应一次后端调用，组内文本保持字段顺序
    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].format, "plain");
    assert_eq!(calls[0].text, vec!["Hello", "first", "second"]);
    assert_eq!(calls[1].format, "markdown");
    assert_eq!(calls[1].text, vec!["Some **markdown**"]);
}

/// 缺失路径与 null 按空串送往后端并写回
#[tokio::test]
async fn test_missing_field_contributes_empty_string() {
    let provider = Arc::new(ScriptedProvider::new());
    let dispatcher = FieldDispatcher::new(provider.clone());

    let data = json!({"title": "Hi", "subtitle": null});
    let fields = vec![
        TranslationField::new("title", "plain"),
        TranslationField::new("subtitle", "plain"),
        TranslationField::new("teaser", "plain"),
    ];

    let result = dispatcher.translate(request(data, fields)).await.unwrap();

    assert_eq!(result["title"], transform("Hi", "de"));
    assert_eq!(result["subtitle"], transform("", "de"));
    assert_eq!(result["teaser"], transform("", "de"));
    assert_eq!(provider.calls()[0].text, vec!["Hi", "", ""]);
}

/// 用量估算逐字段可加，与调度取值口径一致
#[tokio::test]
async fn test_estimate_usage_is_additive() {
    let data = json!({
        "title": "Héllo",
        "tags": ["ab", "cde"],
        "count": 7,
    });
    let title = TranslationField::new("title", "plain");
    let tags = TranslationField::new("tags", "plain");
    let count = TranslationField::new("count", "plain");
    let missing = TranslationField::new("missing", "plain");

    let all = vec![title.clone(), tags.clone(), count.clone(), missing.clone()];
    let sum: usize = [title, tags, count, missing]
        .iter()
        .map(|field| estimate_usage(&data, std::slice::from_ref(field)))
        .sum();
    assert_eq!(estimate_usage(&data, &all), sum);
    assert_eq!(estimate_usage(&data, &all), 5 + 5);
}

/// 不可翻译的字段形状在任何后端调用之前被拒绝
#[tokio::test]
async fn test_invalid_field_shape_is_rejected() {
    let provider = Arc::new(ScriptedProvider::new());
    let dispatcher = FieldDispatcher::new(provider.clone());

    let data = json!({"count": 7, "blocks": [["nested"]]});

    let err = dispatcher
        .translate(request(data.clone(), vec![TranslationField::new("count", "plain")]))
        .await
        .unwrap_err();
    assert!(matches!(err, TranslateError::Validation(_)));

    let err = dispatcher
        .translate(request(data, vec![TranslationField::new("blocks", "plain")]))
        .await
        .unwrap_err();
    assert!(matches!(err, TranslateError::Validation(_)));

    assert_eq!(provider.call_count(), 0, "validation must precede backend calls");
}

/// 后端返回数量不一致时整个条目失败
#[tokio::test]
async fn test_provider_length_mismatch_fails() {
    let dispatcher = FieldDispatcher::new(Arc::new(CountMismatchProvider));
    let data = json!({"title": "Hello", "body": "World"});
    let fields = vec![
        TranslationField::new("title", "plain"),
        TranslationField::new("body", "plain"),
    ];

    let err = dispatcher.translate(request(data, fields)).await.unwrap_err();
    assert!(matches!(err, TranslateError::Backend(_)));
}

/// 后端失败原样上抛且标记为可重试
#[tokio::test]
async fn test_backend_failure_propagates() {
    let dispatcher = FieldDispatcher::new(Arc::new(FailingProvider));
    let data = json!({"title": "Hello"});

    let err = dispatcher
        .translate(request(data, vec![TranslationField::new("title", "plain")]))
        .await
        .unwrap_err();
    assert!(matches!(err, TranslateError::Backend(_)));
    assert!(err.is_retryable());
}

//! 字段路径解析模块
//!
//! 提供类型化的字段路径表示以及对数据树的读写解析器。
//! 路径是有序的访问段列表，仅支持对象键与单层数组索引两种访问段；
//! 更深的嵌套（数组套数组、对象数组）不在支持范围内。

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{TranslateError, TranslateResult};

/// 路径访问段
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// 对象键访问
    Key(String),
    /// 数组索引访问
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// 字段路径（有序访问段列表）
///
/// 文本形式使用点号分隔，如 `"meta.tags.0"`；纯数字段解析为数组索引。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// 从访问段列表构造路径
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// 解析点号分隔的路径文本
    ///
    /// 空文本产生空路径；空路径的读取返回数据树根。
    pub fn parse(text: &str) -> Self {
        let segments = text
            .split('.')
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Key(part.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// 获取访问段列表
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// 在数据树中读取路径指向的值
    pub fn get<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        let mut current = data;
        for segment in &self.segments {
            current = match segment {
                PathSegment::Key(key) => current.as_object()?.get(key)?,
                PathSegment::Index(index) => current.as_array()?.get(*index)?,
            };
        }
        Some(current)
    }

    /// 在数据树中写入路径指向的值
    ///
    /// 缺失的对象键段会被创建为空对象；数组索引段允许写入已有位置
    /// 或紧随末尾的位置，越界写入视为非法路径。
    pub fn set(&self, data: &mut Value, value: Value) -> TranslateResult<()> {
        if self.segments.is_empty() {
            *data = value;
            return Ok(());
        }

        let mut current = data;
        for segment in &self.segments[..self.segments.len() - 1] {
            current = match segment {
                PathSegment::Key(key) => {
                    let map = current.as_object_mut().ok_or_else(|| {
                        TranslateError::Validation(format!("路径 {} 经过了非对象节点", self))
                    })?;
                    map.entry(key.clone()).or_insert_with(|| Value::Object(Default::default()))
                }
                PathSegment::Index(index) => {
                    let list = current.as_array_mut().ok_or_else(|| {
                        TranslateError::Validation(format!("路径 {} 经过了非数组节点", self))
                    })?;
                    list.get_mut(*index).ok_or_else(|| {
                        TranslateError::Validation(format!("路径 {} 的数组索引越界", self))
                    })?
                }
            };
        }

        match &self.segments[self.segments.len() - 1] {
            PathSegment::Key(key) => {
                let map = current.as_object_mut().ok_or_else(|| {
                    TranslateError::Validation(format!("路径 {} 的末端不是对象", self))
                })?;
                map.insert(key.clone(), value);
            }
            PathSegment::Index(index) => {
                let list = current.as_array_mut().ok_or_else(|| {
                    TranslateError::Validation(format!("路径 {} 的末端不是数组", self))
                })?;
                if *index < list.len() {
                    list[*index] = value;
                } else if *index == list.len() {
                    list.push(value);
                } else {
                    return Err(TranslateError::Validation(format!(
                        "路径 {} 的数组索引越界",
                        self
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.is_empty() {
            return Err(D::Error::custom("字段路径不能为空"));
        }
        Ok(Self::parse(&text))
    }
}

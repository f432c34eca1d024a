// crates/nbs_config/src/input_file.rs

//! 键值输入文件解析
//!
//! 常数文件采用 `name = value  # comment` 的文本格式：
//!
//! ```text
//! # light micro-environment
//! lme = True
//! Ikmax = 372.32   # maximum saturation light-intensity
//! species = 'Acropora'
//! ages = [1, 2, 3]
//! ```
//!
//! 值可以是数字、布尔量（`True/False/true/false`）、带引号的字符串，
//! 或 `[a, b, ...]` 数值列表。未加引号且不是数字的值按字符串保存。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// 输入值
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    /// 数值
    Number(f64),
    /// 布尔量
    Bool(bool),
    /// 字符串
    Text(String),
    /// 数值列表
    List(Vec<f64>),
}

impl InputValue {
    fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("缺少值".into());
        }

        match raw {
            "True" | "true" => return Ok(Self::Bool(true)),
            "False" | "false" => return Ok(Self::Bool(false)),
            _ => {}
        }

        if let Some(inner) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let items = inner
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<f64>().map_err(|_| format!("无法解析列表元素 '{s}'")))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::List(items));
        }

        for quote in ['"', '\''] {
            if let Some(inner) = raw.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
                return Ok(Self::Text(inner.to_string()));
            }
        }

        match raw.parse::<f64>() {
            Ok(v) => Ok(Self::Number(v)),
            Err(_) => Ok(Self::Text(raw.to_string())),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Text(_) => "string",
            Self::List(_) => "list",
        }
    }
}

/// 输入文件中的全部参数
#[derive(Debug, Clone, Default)]
pub struct InputParameters {
    source: Option<PathBuf>,
    values: BTreeMap<String, InputValue>,
}

impl InputParameters {
    /// 从文件读取
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content, Some(path))
    }

    /// 解析文本内容
    pub fn parse_str(content: &str, source: Option<&Path>) -> Result<Self, ConfigError> {
        let file = source.map(Path::to_path_buf).unwrap_or_default();
        let mut values = BTreeMap::new();

        for (i, line) in content.lines().enumerate() {
            let line = match line.find('#') {
                Some(pos) => &line[..pos],
                None => line,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::ParseLine {
                    file: file.clone(),
                    line: i + 1,
                    message: format!("缺少 '=': '{line}'"),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::ParseLine {
                    file: file.clone(),
                    line: i + 1,
                    message: "缺少参数名".into(),
                });
            }
            let value = InputValue::parse(value).map_err(|message| ConfigError::ParseLine {
                file: file.clone(),
                line: i + 1,
                message,
            })?;
            values.insert(key.to_string(), value);
        }

        Ok(Self {
            source: source.map(Path::to_path_buf),
            values,
        })
    }

    /// 来源文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 参数个数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 是否包含参数
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// 全部参数名（有序）
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// 原始值
    pub fn get(&self, key: &str) -> Option<&InputValue> {
        self.values.get(key)
    }

    fn mismatch(key: &str, value: &InputValue, expected: &str) -> ConfigError {
        ConfigError::invalid(
            key,
            format!("{value:?}"),
            format!("期望 {expected}, 实际为 {}", value.type_name()),
        )
    }

    /// 数值参数，整数形式的布尔量也可接受
    pub fn get_f64(&self, key: &str) -> Result<Option<f64>, ConfigError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(InputValue::Number(v)) => Ok(Some(*v)),
            Some(InputValue::Bool(b)) => Ok(Some(if *b { 1.0 } else { 0.0 })),
            Some(other) => Err(Self::mismatch(key, other, "number")),
        }
    }

    /// 布尔参数（`0/1` 亦可）
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(InputValue::Bool(b)) => Ok(Some(*b)),
            Some(InputValue::Number(v)) if *v == 0.0 || *v == 1.0 => Ok(Some(*v == 1.0)),
            Some(other) => Err(Self::mismatch(key, other, "bool")),
        }
    }

    /// 字符串参数
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(InputValue::Text(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(Self::mismatch(key, other, "string")),
        }
    }

    /// 数值列表参数，单个数值视为长度为 1 的列表
    pub fn get_f64_list(&self, key: &str) -> Result<Option<Vec<f64>>, ConfigError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(InputValue::List(v)) => Ok(Some(v.clone())),
            Some(InputValue::Number(v)) => Ok(Some(vec![*v])),
            Some(other) => Err(Self::mismatch(key, other, "list")),
        }
    }

    /// 在多个候选名中取第一个存在的数值参数
    pub fn first_f64(&self, keys: &[&str]) -> Result<Option<f64>, ConfigError> {
        for key in keys {
            if let Some(v) = self.get_f64(key)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    /// 在多个候选名中取第一个存在的字符串参数
    pub fn first_str(&self, keys: &[&str]) -> Result<Option<&str>, ConfigError> {
        for key in keys {
            if let Some(v) = self.get_str(key)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    /// 在多个候选名中取第一个存在的布尔参数
    pub fn first_bool(&self, keys: &[&str]) -> Result<Option<bool>, ConfigError> {
        for key in keys {
            if let Some(v) = self.get_bool(key)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }
}

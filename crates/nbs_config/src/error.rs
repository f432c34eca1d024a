// crates/nbs_config/src/error.rs

//! 配置层错误类型

use std::path::PathBuf;

use nbs_foundation::NbsError;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 行级解析错误
    #[error("解析错误: {file}:{line} - {message}")]
    ParseLine {
        /// 文件路径
        file: PathBuf,
        /// 行号
        line: usize,
        /// 错误信息
        message: String,
    },

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },

    /// 缺失配置
    #[error("缺失配置: {0}")]
    Missing(String),

    /// 未知物种
    #[error("未知物种: {0}")]
    UnknownSpecies(String),
}

impl ConfigError {
    /// 构造无效值错误
    pub fn invalid(key: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for NbsError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => NbsError::io_with_source("读取配置失败", e),
            ConfigError::Parse(msg) => NbsError::config(msg),
            ConfigError::ParseLine { file, line, message } => NbsError::parse(file, line, message),
            ConfigError::InvalidValue { key, value, reason } => {
                NbsError::invalid_config(key, value, reason)
            }
            ConfigError::Missing(key) => NbsError::missing_config(key),
            ConfigError::UnknownSpecies(name) => NbsError::config(format!("未知物种: {name}")),
        }
    }
}

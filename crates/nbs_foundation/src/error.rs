// crates/nbs_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `NbsError` 枚举和 `NbsResult` 类型别名，用于整个项目的错误处理。
//! 各层（配置、IO、水动力）定义自己的错误枚举，并统一转换为 `NbsError`。
//!
//! # 示例
//!
//! ```
//! use nbs_foundation::error::{NbsError, NbsResult};
//!
//! fn read_constants() -> NbsResult<()> {
//!     Err(NbsError::config("常数文件格式错误"))
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type NbsResult<T> = Result<T, NbsError>;

/// NbsDynamics 错误类型
#[derive(Error, Debug)]
pub enum NbsError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 文件解析错误
    #[error("文件解析错误: {file} 第{line}行: {message}")]
    ParseError {
        /// 文件路径
        file: PathBuf,
        /// 行号
        line: usize,
        /// 错误信息
        message: String,
    },

    // ========================================================================
    // 数据错误
    // ========================================================================
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    // ========================================================================
    // 配置错误
    // ========================================================================
    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 缺少配置项
    #[error("缺少必需的配置项: {key}")]
    MissingConfig {
        /// 配置键名
        key: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 未知的运行模式
    #[error("未知的模式: {mode} (支持的模式: {supported:?})")]
    UnknownMode {
        /// 输入的模式名
        mode: String,
        /// 支持的模式列表
        supported: Vec<String>,
    },

    // ========================================================================
    // 运行时错误
    // ========================================================================
    /// 组件尚未初始化
    #[error("{component} 尚未初始化, 请先调用 {hint}")]
    NotInitialized {
        /// 组件名称
        component: String,
        /// 需要先调用的方法
        hint: String,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    /// BMI 耦合错误
    #[error("BMI 错误: {message}")]
    Bmi {
        /// 具体错误信息
        message: String,
    },

    /// 功能未实现
    #[error("功能未实现: {feature}")]
    NotImplemented {
        /// 未实现的功能描述
        feature: String,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl NbsError {
    /// 从信息创建 IO 错误
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 从IO错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 解析错误
    pub fn parse(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 缺少配置
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig { key: key.into() }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 未知模式
    pub fn unknown_mode(mode: impl Into<String>, supported: &[&str]) -> Self {
        Self::UnknownMode {
            mode: mode.into(),
            supported: supported.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// 未初始化
    pub fn not_initialized(component: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::NotInitialized {
            component: component.into(),
            hint: hint.into(),
        }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// BMI 错误
    pub fn bmi(message: impl Into<String>) -> Self {
        Self::Bmi {
            message: message.into(),
        }
    }

    /// 功能未实现
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl NbsError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> NbsResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }
}

impl From<std::io::Error> for NbsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NbsError::config("测试配置错误");
        assert!(err.to_string().contains("配置错误"));
    }

    #[test]
    fn test_file_not_found() {
        let err = NbsError::file_not_found("/path/to/TS_PAR.txt");
        assert!(err.to_string().contains("TS_PAR.txt"));
    }

    #[test]
    fn test_unknown_mode_lists_supported() {
        let err = NbsError::unknown_mode("Delft4D", &["Transect", "FlowFMModel"]);
        let msg = err.to_string();
        assert!(msg.contains("Delft4D"));
        assert!(msg.contains("FlowFMModel"));
    }

    #[test]
    fn test_check_size() {
        assert!(NbsError::check_size("cover", 10, 10).is_ok());
        assert!(matches!(
            NbsError::check_size("cover", 10, 5),
            Err(NbsError::SizeMismatch { expected: 10, actual: 5, .. })
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: NbsError = io_err.into();
        assert!(matches!(err, NbsError::Io { .. }));
    }
}

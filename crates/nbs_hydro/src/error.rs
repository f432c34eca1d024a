// crates/nbs_hydro/src/error.rs
//! 水动力层错误类型

use std::path::PathBuf;

use nbs_foundation::NbsError;
use thiserror::Error;

/// 水动力模块结果类型别名
pub type HydroResult<T> = Result<T, HydroError>;

/// 水动力错误枚举
#[derive(Error, Debug)]
pub enum HydroError {
    /// 未知的水动力模式
    #[error("{mode} not in {supported:?}.")]
    UnknownMode {
        /// 请求的模式
        mode: String,
        /// 支持的模式
        supported: Vec<&'static str>,
    },

    /// 模型尚未初始化
    #[error("{component} 尚未初始化, 请先调用 {hint}")]
    NotInitialized {
        /// 组件
        component: &'static str,
        /// 提示
        hint: &'static str,
    },

    /// 该模式不支持的操作
    #[error("{mode} 不支持 {operation}")]
    NotImplemented {
        /// 模式名
        mode: &'static str,
        /// 操作
        operation: &'static str,
    },

    /// BMI 模式缺少计算引擎
    #[error("{0} 需要 BMI 计算引擎")]
    MissingEngine(&'static str),

    /// 缺少设置项
    #[error("缺少水动力设置: {0}")]
    MissingSetting(&'static str),

    /// 文件读取失败
    #[error("文件读取失败: {path}: {source}")]
    File {
        /// 文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 输入文件解析错误
    #[error("文件解析错误: {file}:{line} - {message}")]
    Parse {
        /// 文件
        file: PathBuf,
        /// 行号
        line: usize,
        /// 错误信息
        message: String,
    },

    /// BMI 引擎错误
    #[error("BMI 错误: {0}")]
    Bmi(String),

    /// 基础层错误转换
    #[error("基础层错误: {0}")]
    Foundation(#[from] NbsError),
}

impl HydroError {
    /// 解析错误
    pub fn parse(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// BMI 错误
    pub fn bmi(message: impl Into<String>) -> Self {
        Self::Bmi(message.into())
    }
}

impl From<HydroError> for NbsError {
    fn from(err: HydroError) -> Self {
        match err {
            HydroError::UnknownMode { mode, supported } => NbsError::unknown_mode(mode, &supported),
            HydroError::NotInitialized { component, hint } => {
                NbsError::not_initialized(component, hint)
            }
            HydroError::NotImplemented { mode, operation } => {
                NbsError::not_implemented(format!("{mode}: {operation}"))
            }
            HydroError::File { path, source } => {
                NbsError::io_with_source(format!("{}", path.display()), source)
            }
            HydroError::Parse { file, line, message } => NbsError::parse(file, line, message),
            HydroError::Bmi(msg) => NbsError::bmi(msg),
            HydroError::Foundation(e) => e,
            other => NbsError::config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_mode_conversion() {
        let err = HydroError::UnknownMode {
            mode: "Reef1D".into(),
            supported: vec!["Reef0D", "Transect"],
        };
        assert!(err.to_string().starts_with("Reef1D not in"));
        let nbs: NbsError = err.into();
        assert!(matches!(nbs, NbsError::UnknownMode { .. }));
    }
}

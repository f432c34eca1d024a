// crates/nbs_io/src/error.rs
//! IO 错误类型定义
//!
//! 提供 IO 模块的统一错误枚举，支持通过 thiserror 自动转换底层错误。
//! 所有错误最终可转换为 NbsError 以实现跨层错误传递。

use std::path::PathBuf;

use nbs_foundation::NbsError;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 文件读写失败
    #[error("文件读写失败: {path}: {source}")]
    File {
        /// 文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 文件路径
        path: PathBuf,
    },

    /// 解析错误
    #[error("文件解析错误: {file}:{line} - {message}")]
    ParseError {
        /// 文件
        file: PathBuf,
        /// 行号
        line: usize,
        /// 错误信息
        message: String,
    },

    /// 时间序列中含缺失值
    #[error("NaNs detected in time series {path}")]
    NanInSeries {
        /// 文件路径
        path: PathBuf,
    },

    /// 未知的环境参数
    #[error("Entered parameter ({0}) not included")]
    UnknownParameter(String),

    /// 尚未定义日期
    #[error(
        "No dates are defined. Please, first specify the dates before setting the time-series of {parameter}; or make use of the \"from_file\"-method."
    )]
    DatesUndefined {
        /// 参数名
        parameter: String,
    },

    /// 缺少环境数据
    #[error("缺少环境数据: {0}")]
    MissingData(String),

    /// 时间序列日期非严格递增
    #[error("时间序列日期非严格递增: {series} 在 {date}")]
    UnorderedDates {
        /// 序列名称
        series: String,
        /// 出错日期
        date: String,
    },

    /// 数据长度不匹配
    #[error("数据长度不匹配: {name} 期望 {expected}, 实际 {actual}")]
    LengthMismatch {
        /// 数据名称
        name: String,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 维度不存在
    #[error("维度不存在: {0}")]
    DimensionNotFound(String),

    /// 变量不存在
    #[error("变量不存在: {0}")]
    VariableNotFound(String),

    /// 名称重复
    #[error("名称重复: {0}")]
    Duplicate(String),

    /// 特性未启用
    #[error("需要启用 '{0}' 特性")]
    FeatureDisabled(&'static str),

    /// 序列化失败
    #[error("序列化失败: {0}")]
    Serialization(String),

    /// NetCDF 写出失败
    #[error("NetCDF 错误: {0}")]
    NetCdf(String),

    /// 基础层错误转换
    #[error("基础层错误: {0}")]
    Foundation(#[from] NbsError),
}

impl IoError {
    /// 带路径的文件错误
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::File { path, source }
        }
    }
}

#[cfg(feature = "netcdf")]
impl From<netcdf::error::Error> for IoError {
    fn from(e: netcdf::error::Error) -> Self {
        IoError::NetCdf(e.to_string())
    }
}

impl From<IoError> for NbsError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::File { path, source } => {
                NbsError::io_with_source(format!("{}", path.display()), source)
            }
            IoError::FileNotFound { path } => NbsError::file_not_found(path),
            IoError::ParseError { file, line, message } => NbsError::parse(file, line, message),
            IoError::LengthMismatch { name, expected, actual } => NbsError::invalid_input(
                format!("数据长度不匹配: {name} 期望 {expected}, 实际 {actual}"),
            ),
            IoError::Serialization(msg) => NbsError::serialization(msg),
            IoError::FeatureDisabled(feature) => {
                NbsError::not_implemented(format!("需要启用 '{feature}' 特性"))
            }
            IoError::Foundation(e) => e,
            other => NbsError::invalid_input(other.to_string()),
        }
    }
}

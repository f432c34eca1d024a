// crates/nbs_simulation/src/error.rs

//! 模拟错误类型定义

use std::path::PathBuf;

use nbs_biota::BiotaError;
use nbs_config::ConfigError;
use nbs_foundation::NbsError;
use nbs_hydro::HydroError;
use nbs_io::IoError;
use thiserror::Error;

/// 模拟结果类型别名
pub type SimulationResult<T> = Result<T, SimulationError>;

/// 模拟错误
#[derive(Debug, Error)]
pub enum SimulationError {
    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 输入输出错误
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// 水动力错误
    #[error("Hydrodynamics error: {0}")]
    Hydro(#[from] HydroError),

    /// 生物过程错误
    #[error("Biota error: {0}")]
    Biota(#[from] BiotaError),

    /// 底层错误
    #[error(transparent)]
    Foundation(#[from] NbsError),

    /// 目录创建失败
    #[error("无法创建目录 {path}: {source}")]
    Directory {
        /// 目录
        path: PathBuf,
        /// 原因
        #[source]
        source: std::io::Error,
    },

    /// 模拟尚未初始化
    #[error("{0} simulation is not initiated, call initiate() first")]
    NotInitiated(&'static str),

    /// 生物类型不支持该水动力模式
    #[error("{biota} simulation does not support hydrodynamic mode {mode}")]
    UnsupportedMode {
        /// 生物类型
        biota: &'static str,
        /// 模式名
        mode: &'static str,
    },

    /// 物种数不正确
    #[error("Vegetation simulation needs 1 or 2 species, got {0}")]
    SpeciesCount(usize),

    /// 某年缺少环境数据
    #[error("No {parameter} data for year {year}")]
    MissingYear {
        /// 参数名
        parameter: &'static str,
        /// 年份
        year: i32,
    },
}

impl SimulationError {
    /// 目录错误
    pub fn directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Directory {
            path: path.into(),
            source,
        }
    }
}

// crates/nbs_io/src/lib.rs

//! NbsDynamics IO Layer (Layer 2)
//!
//! IO 层，负责环境时间序列的读取和模拟结果的写出。
//!
//! # 模块概览
//!
//! - [`timeseries`]: 制表符分隔的日序列 / 年序列
//! - [`environment`]: 光照、温度、文石饱和度、风暴等级
//! - [`output`]: 数据集、map / his 输出和输出包装器
//! - [`error`]: IO 错误类型
//!
//! # 特性
//!
//! - `netcdf`: 以 netCDF 格式写出结果（需要系统 NetCDF 库）

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod environment;
pub mod error;
pub mod output;
pub mod timeseries;

/// 层级标识
pub const LAYER: u8 = 2;

pub use environment::{EnvParameter, Environment, ParameterValue};
pub use error::{IoError, IoResult};
pub use output::{Dataset, HisOutput, MapOutput, OutputWrapper, VariableSpec};
pub use timeseries::{read_annual_series, read_daily_series, AnnualSeries, DailySeries};

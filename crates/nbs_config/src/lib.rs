// crates/nbs_config/src/lib.rs

//! NbsDynamics Config Layer (Layer 2)
//!
//! 配置层，提供生物常数、键值输入文件解析和模拟配置。
//!
//! # 模块概览
//!
//! - [`input_file`]: `name = value` 格式的常数文件
//! - [`coral`]: 珊瑚模型常数与过程开关
//! - [`vegetation`]: 盐沼植被物种常数
//! - [`mangrove`]: 红树林常数
//! - [`simulation_config`]: SimulationConfig 模拟配置（JSON）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: nbs_cli        ─> uses SimulationConfig
//! Layer 4: nbs_simulation ─> builds simulations from constants
//! Layer 3: nbs_biota      ─> reads constants
//! Layer 2: nbs_config     ─> constants, SimulationConfig (本层)
//! Layer 1: nbs_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coral;
pub mod error;
pub mod input_file;
pub mod mangrove;
pub mod simulation_config;
pub mod vegetation;

/// 层级标识
pub const LAYER: u8 = 2;

// 重导出核心类型
pub use coral::CoralConstants;
pub use error::ConfigError;
pub use input_file::{InputParameters, InputValue};
pub use mangrove::MangroveConstants;
pub use simulation_config::{
    BiotaKind, EnvironmentConfig, HydrodynamicsConfig, InitialConfig, OutputConfig,
    OutputFormat, ParameterSource, SimulationConfig, BMI_MODES, SUPPORTED_MODES,
};
pub use vegetation::{PerLifeStage, VegetationConstants, NUM_LIFE_STAGES};

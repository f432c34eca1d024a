// crates/nbs_simulation/src/lib.rs

//! NbsDynamics Simulation Layer (Layer 4)
//!
//! 模拟层，把生物模型、水动力模型和输出组合成完整的模拟。
//!
//! # 模块概览
//!
//! - [`protocol`]: `SimulationProtocol` 与多生物模拟接口
//! - [`directories`]: 工作、输入、输出、图件目录
//! - [`biota_wrapper`]: 生物对象与其输出
//! - [`coral`]: 珊瑚模拟（Reef0D / Transect / FlowFM / DIMR）
//! - [`vegetation`]: 盐沼植被模拟（FlowFM / DIMR，1 或 2 个物种）
//! - [`mangrove`]: 红树林模拟（FlowFM / DIMR）
//! - [`builder`]: 由 `SimulationConfig` 构建模拟
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: nbs_cli
//! Layer 4: nbs_simulation (本层)
//! Layer 3: nbs_biota, nbs_hydro
//! Layer 2: nbs_config, nbs_io
//! Layer 1: nbs_foundation
//! ```
//!
//! # 示例
//!
//! ```ignore
//! use nbs_simulation::{build_simulation, run_simulation};
//!
//! let config = nbs_config::SimulationConfig::from_file("simulation.json")?;
//! let mut simulation = build_simulation(&config)?;
//! let summary = run_simulation(simulation.as_mut(), &config)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod biota_wrapper;
pub mod builder;
pub mod coral;
pub mod directories;
pub mod error;
pub mod mangrove;
pub mod protocol;
pub mod vegetation;

/// 层级标识
pub const LAYER: u8 = 4;

pub use biota_wrapper::BiotaWrapper;
pub use builder::{build_simulation, build_simulation_with_engine, load_environment, run_simulation};
pub use coral::CoralSimulation;
pub use directories::SimulationDirectories;
pub use error::{SimulationError, SimulationResult};
pub use mangrove::MangroveSimulation;
pub use protocol::{MultipleBiotaSimulationProtocol, RunSummary, SimulationProtocol};
pub use vegetation::VegetationSimulation;

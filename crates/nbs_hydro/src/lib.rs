// crates/nbs_hydro/src/lib.rs

//! NbsDynamics Hydrodynamics Layer (Layer 3)
//!
//! 水动力层，为生物模型提供流速、波浪、水位和床面高程。
//!
//! # 模块概览
//!
//! - [`protocol`]: HydrodynamicProtocol 与生物反馈接口
//! - [`mode`]: 水动力模式
//! - [`factory`]: 按模式名创建模型
//! - [`reef0d`]: 单点模型
//! - [`transect`]: 一维断面模型
//! - [`delft3d`]: Delft3D FlowFM / DIMR（BMI）
//! - [`waves`]: 波浪轨道速度

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod delft3d;
pub mod error;
pub mod factory;
pub mod mode;
pub mod protocol;
pub mod reef0d;
pub mod transect;
pub mod waves;

/// 层级标识
pub const LAYER: u8 = 3;

pub use delft3d::{BmiEngine, Delft3D, Delft3DKind, MemoryEngine};
pub use error::{HydroError, HydroResult};
pub use factory::HydrodynamicsFactory;
pub use mode::HydroMode;
pub use protocol::{HydroCoupling, HydroMorphoSeries, HydroUpdate, HydrodynamicProtocol, NoCoupling};
pub use reef0d::Reef0D;
pub use transect::Transect;

// crates/nbs_biota/src/lib.rs

//! NbsDynamics Biota Layer (Layer 3)
//!
//! 生物层：珊瑚、盐沼植被与红树林模型及其生物过程。
//!
//! # 模块概览
//!
//! - [`coral`]: 珊瑚（光照、流动、温度、光合、种群、钙化、形态、风暴、补充）
//! - [`vegetation`]: 盐沼植被（生命阶段、水动力-地貌、死亡、生长、定殖）
//! - [`mangrove`]: 红树林（淹没与竞争胁迫、KiWi 生长、定殖）
//! - [`error`]: 错误类型
//!
//! 各模型都实现 [`nbs_hydro::HydroCoupling`]，把植被特征反馈给水动力模型。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coral;
pub mod error;
pub mod mangrove;
pub mod vegetation;

/// 层级标识
pub const LAYER: u8 = 3;

pub use coral::{Coral, CoralMorphology, CoralOutputGroup};
pub use error::{BiotaError, BiotaResult};
pub use mangrove::Mangrove;
pub use vegetation::{LifeStage, LifeStages, Vegetation};

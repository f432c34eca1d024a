// crates/nbs_biota/src/vegetation/mod.rs

//! 盐沼植被模型
//!
//! 一年划分为若干生态时间步 (ets)，每步依次执行：
//!
//! ```text
//! HydroMorphodynamics → Mortality → Growth → Colonisation
//! ```
//!
//! 年末调用 [`Vegetation::update_lifestages`]。

pub mod colonisation;
pub mod growth;
pub mod hydro_morphodynamics;
pub mod life_stages;
pub mod model;
pub mod mortality;
pub mod output;

pub use colonisation::Colonisation;
pub use growth::Growth;
pub use hydro_morphodynamics::{HydroMorphoState, HydroMorphodynamics};
pub use life_stages::{LifeStage, LifeStages};
pub use model::Vegetation;
pub use mortality::Mortality;

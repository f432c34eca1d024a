// crates/nbs_hydro/src/delft3d/mod.rs

//! Delft3D 耦合
//!
//! - [`bmi`]: BMI 引擎接口与内存引擎
//! - [`model`]: FlowFM / DIMR 水动力模型

pub mod bmi;
pub mod model;

pub use bmi::{BmiEngine, MemoryEngine};
pub use model::{Delft3D, Delft3DKind, DIMR_PREFIX};

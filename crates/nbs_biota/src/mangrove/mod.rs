// crates/nbs_biota/src/mangrove/mod.rs

//! 红树林模型
//!
//! 每个生态时间步依次执行水动力-地貌更新、死亡、生长与定殖。

pub mod colonisation;
pub mod growth;
pub mod hydro_morphodynamics;
pub mod model;
pub mod mortality;
pub mod output;

pub use colonisation::MangroveColonisation;
pub use growth::MangroveGrowth;
pub use hydro_morphodynamics::MangroveHydroMorphodynamics;
pub use model::Mangrove;
pub use mortality::MangroveMortality;

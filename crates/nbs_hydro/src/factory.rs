// crates/nbs_hydro/src/factory.rs

//! 水动力模型工厂

use std::path::Path;

use nbs_config::HydrodynamicsConfig;
use tracing::debug;

use crate::delft3d::{BmiEngine, Delft3D, Delft3DKind};
use crate::error::{HydroError, HydroResult};
use crate::mode::HydroMode;
use crate::protocol::HydrodynamicProtocol;
use crate::reef0d::Reef0D;
use crate::transect::Transect;

/// 水动力模型工厂
pub struct HydrodynamicsFactory;

impl HydrodynamicsFactory {
    /// 支持的模式名
    pub fn supported_modes() -> Vec<&'static str> {
        HydroMode::names()
    }

    /// 创建不需要 BMI 引擎的模型
    pub fn create(
        mode: &str,
        working_dir: &Path,
        config: &HydrodynamicsConfig,
    ) -> HydroResult<Box<dyn HydrodynamicProtocol>> {
        let mode: HydroMode = mode.parse()?;
        debug!("创建水动力模型 {mode}");
        match mode {
            HydroMode::Reef0D => Ok(Box::new(Reef0D::from_config(config))),
            HydroMode::Transect => Ok(Box::new(Transect::new(working_dir, config))),
            HydroMode::FlowFm | HydroMode::Dimr => Err(HydroError::MissingEngine(mode.name())),
        }
    }

    /// 创建模型，BMI 模式使用给定引擎
    pub fn create_with_engine(
        mode: &str,
        working_dir: &Path,
        config: &HydrodynamicsConfig,
        engine: Box<dyn BmiEngine>,
    ) -> HydroResult<Box<dyn HydrodynamicProtocol>> {
        let mode: HydroMode = mode.parse()?;
        let kind = match mode {
            HydroMode::FlowFm => Delft3DKind::FlowFm,
            HydroMode::Dimr => Delft3DKind::Dimr,
            _ => return Self::create(mode.name(), working_dir, config),
        };
        let mut model = Delft3D::new(kind, engine);
        model.set_simulation_hydrodynamics(working_dir, config);
        debug!("创建水动力模型 {mode}");
        Ok(Box::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delft3d::MemoryEngine;

    #[test]
    fn test_create_simple_modes() {
        let config = HydrodynamicsConfig::default();
        let reef = HydrodynamicsFactory::create("Reef0D", Path::new("."), &config).unwrap();
        assert_eq!(reef.mode(), HydroMode::Reef0D);
        let transect = HydrodynamicsFactory::create("Transect", Path::new("."), &config).unwrap();
        assert_eq!(transect.mode(), HydroMode::Transect);
    }

    #[test]
    fn test_unknown_and_engine_modes() {
        let config = HydrodynamicsConfig::default();
        assert!(matches!(
            HydrodynamicsFactory::create("Reef1D", Path::new("."), &config),
            Err(HydroError::UnknownMode { .. })
        ));
        assert!(matches!(
            HydrodynamicsFactory::create("FlowFMModel", Path::new("."), &config),
            Err(HydroError::MissingEngine("FlowFMModel"))
        ));
        let dimr = HydrodynamicsFactory::create_with_engine(
            "DimrModel",
            Path::new("."),
            &config,
            Box::new(MemoryEngine::new()),
        )
        .unwrap();
        assert_eq!(dimr.mode(), HydroMode::Dimr);
        assert!(dimr.settings().contains("DimrModel"));
    }
}

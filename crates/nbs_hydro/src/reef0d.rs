// crates/nbs_hydro/src/reef0d.rs

//! Reef0D：单点、固定水动力条件

use glam::DVec2;
use nbs_config::HydrodynamicsConfig;
use ndarray::Array1;

use crate::error::HydroResult;
use crate::mode::HydroMode;
use crate::protocol::{HydroCoupling, HydroUpdate, HydrodynamicProtocol};
use crate::waves::soulsby_orbital_velocity;

/// 单点模型
#[derive(Debug, Clone)]
pub struct Reef0D {
    /// 水深 [m]
    pub water_depth: f64,
    /// 流速 [m s-1]
    pub current_velocity: f64,
    /// 有效波高 [m]
    pub wave_height: f64,
    /// 峰值周期 [s]
    pub wave_period: f64,
    xy: [DVec2; 1],
}

impl Default for Reef0D {
    fn default() -> Self {
        Self::from_config(&HydrodynamicsConfig::default())
    }
}

impl Reef0D {
    /// 由水动力配置创建
    pub fn from_config(config: &HydrodynamicsConfig) -> Self {
        Self {
            water_depth: config.water_depth,
            current_velocity: config.current_velocity,
            wave_height: config.wave_height,
            wave_period: config.wave_period,
            xy: [DVec2::ZERO],
        }
    }
}

impl HydrodynamicProtocol for Reef0D {
    fn mode(&self) -> HydroMode {
        HydroMode::Reef0D
    }

    fn settings(&self) -> String {
        format!(
            "Reef0D: h = {} m, Uc = {} m/s, Hs = {} m, Tp = {} s",
            self.water_depth, self.current_velocity, self.wave_height, self.wave_period
        )
    }

    fn xy_coordinates(&self) -> &[DVec2] {
        &self.xy
    }

    fn water_depth(&self) -> HydroResult<Array1<f64>> {
        Ok(Array1::from_elem(1, self.water_depth))
    }

    fn outpoint(&self) -> Vec<bool> {
        vec![true]
    }

    fn initiate(&mut self) -> HydroResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        _coupling: &dyn HydroCoupling,
        _storm_category: u8,
    ) -> HydroResult<HydroUpdate> {
        let wave_vel =
            soulsby_orbital_velocity(self.wave_height, self.wave_period, self.water_depth);
        Ok(HydroUpdate {
            current_vel: Array1::from_elem(1, self.current_velocity),
            wave_vel: Array1::from_elem(1, wave_vel),
            wave_per: Array1::from_elem(1, self.wave_period),
        })
    }

    fn finalise(&mut self) -> HydroResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HydroError;
    use crate::protocol::NoCoupling;

    #[test]
    fn test_single_point() {
        let reef = Reef0D::default();
        assert_eq!(reef.space(), 1);
        assert_eq!(reef.x_coordinates(), vec![0.0]);
        assert_eq!(reef.outpoint(), vec![true]);
        assert_eq!(reef.water_depth().unwrap()[0], 10.0);
    }

    #[test]
    fn test_fixed_forcing() {
        let mut reef = Reef0D::default();
        let coupling = NoCoupling { space: 1 };
        let calm = reef.update(&coupling, 0).unwrap();
        let storm = reef.update(&coupling, 3).unwrap();
        assert_eq!(calm, storm);
        assert_eq!(calm.current_vel[0], 0.5);
        assert_eq!(calm.wave_per[0], 4.0);
        assert!(calm.wave_vel[0] > 0.0);
    }

    #[test]
    fn test_hydromorphodynamics_unsupported() {
        let mut reef = Reef0D::default();
        let err = reef
            .update_hydromorphodynamics(&NoCoupling { space: 1 }, 4)
            .unwrap_err();
        assert!(matches!(err, HydroError::NotImplemented { .. }));
    }
}

// crates/nbs_biota/src/mangrove/hydro_morphodynamics.rs

//! 红树林的水动力-地貌更新
//!
//! 在植被统计量之外计算相对淹没时长 `inun_rel`：水深为正的时刻比例。

use nbs_hydro::HydroMorphoSeries;
use ndarray::Axis;

use super::model::Mangrove;
use crate::error::BiotaResult;

/// 判定淹没的水深阈值 [m]
const WET_DEPTH: f64 = 0.0;

/// 水动力-地貌过程
#[derive(Debug, Clone)]
pub struct MangroveHydroMorphodynamics {
    /// 本生态时间步的时间序列
    pub series: HydroMorphoSeries,
}

impl MangroveHydroMorphodynamics {
    /// 创建
    pub fn new(series: HydroMorphoSeries) -> Self {
        Self { series }
    }

    /// 更新水动力状态与相对淹没时长
    pub fn update(&self, mangrove: &mut Mangrove) -> BiotaResult<()> {
        mangrove.hydro.update(&self.series, WET_DEPTH)?;
        let depth = mangrove.hydro.water_depth_ts();
        let steps = depth.ncols() as f64;
        mangrove.inun_rel = depth
            .mapv(|d| if d > WET_DEPTH { 1.0 } else { 0.0 })
            .sum_axis(Axis(1))
            / steps;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbs_config::MangroveConstants;
    use ndarray::Array2;

    #[test]
    fn test_relative_hydroperiod() {
        let mut m = Mangrove::new(MangroveConstants::default(), 2);
        let bed: [f64; 2] = [0.0, -1.0];
        let wl: [f64; 4] = [-0.5, 0.2, 0.4, -0.2];
        let series = HydroMorphoSeries {
            tau: Array2::zeros((2, 4)),
            velocity: Array2::zeros((2, 4)),
            water_level: Array2::from_shape_fn((2, 4), |(i, t)| wl[t].max(bed[i])),
            bed_level: Array2::from_shape_fn((2, 4), |(i, _)| bed[i]),
        };
        MangroveHydroMorphodynamics::new(series).update(&mut m).unwrap();
        assert!((m.inun_rel[0] - 0.5).abs() < 1e-12);
        assert!((m.inun_rel[1] - 1.0).abs() < 1e-12);
        assert_eq!(m.hydro.updates(), 1);
    }
}

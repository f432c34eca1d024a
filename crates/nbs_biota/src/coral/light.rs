// crates/nbs_biota/src/coral/light.rs

//! 光照微环境
//!
//! 群体的顶面、侧面和基部分别接收衰减后的入射光，
//! 代表性光强为三者之和除以受光生物量。

use std::f64::consts::PI;

use nbs_foundation::{DataReshape, Dim, SpaceTime};
use ndarray::Array2;

use super::model::Coral;
use crate::error::{BiotaError, BiotaResult};

/// 光照过程
#[derive(Debug, Clone)]
pub struct Light {
    /// 水面入射光强 [µE m-2 s-1] (space × time)
    pub i0: Array2<f64>,
    /// 光衰减系数 [m-1] (space × time)
    pub kd: Array2<f64>,
    /// 水深 [m] (space × time)
    pub h: Array2<f64>,
}

impl Light {
    /// 由逐日光强、光衰减系数和各网格水深创建
    pub fn new(
        spacetime: SpaceTime,
        light_in: &[f64],
        lac: &[f64],
        depth: &[f64],
    ) -> BiotaResult<Self> {
        let reshape = DataReshape::new(spacetime);
        Ok(Self {
            i0: reshape.variable2matrix(light_in, Dim::Time)?,
            kd: reshape.variable2matrix(lac, Dim::Time)?,
            h: reshape.variable2matrix(depth, Dim::Space)?,
        })
    }

    /// 光线入射角 θ = θmax·exp(−Kd·(h − hc + tc))
    fn theta(&self, theta_max: f64, i: usize, t: usize, hc: f64, tc: f64) -> f64 {
        theta_max * (-self.kd[[i, t]] * (self.h[[i, t]] - hc + tc)).exp()
    }

    /// 计算代表性光强与受光生物量，写入 `coral.light` 与 `coral.light_bc`
    pub fn rep_light(&self, coral: &mut Coral) -> BiotaResult<()> {
        let (space, time) = self.i0.dim();
        BiotaError::check_len("space", coral.space(), space)?;

        let theta_max = coral.constants.theta_max;
        let lme = coral.constants.lme;
        let mut light = Array2::zeros((space, time));
        let mut biomass = Array2::zeros((space, time));

        for i in 0..space {
            let (dc, hc, bc, tc) = (coral.dc[i], coral.hc[i], coral.bc[i], coral.tc[i]);
            for t in 0..time {
                let i0 = self.i0[[i, t]];
                let kd = self.kd[[i, t]];
                let h = self.h[[i, t]];

                if !lme {
                    // 无微环境：顶面面积上的水下光强
                    let bm = 0.25 * PI * dc * dc;
                    biomass[[i, t]] = bm;
                    if bm > 0.0 {
                        light[[i, t]] = i0 * (-kd * h).exp();
                    }
                    continue;
                }

                let theta = self.theta(theta_max, i, t, hc, tc);
                let half_tan = (0.5 * theta).tan();
                let base = if half_tan > 0.0 {
                    (hc - tc - (dc - bc) / (2.0 * half_tan)).max(0.0)
                } else {
                    0.0
                };
                let side_corr = (0.5 * theta).sin();

                let bm = PI * (0.25 * dc * dc + dc * tc + bc * base);
                biomass[[i, t]] = bm;
                if bm <= 0.0 {
                    continue;
                }

                let top = 0.25 * PI * dc * dc * i0 * (-kd * (h - hc)).exp();
                let (side, base_light) = if kd > 0.0 {
                    let side = PI * dc * i0 / kd
                        * ((-kd * (h - hc)).exp() - (-kd * (h - hc + tc)).exp())
                        * side_corr;
                    let base_light = PI * bc * i0 / kd
                        * ((-kd * (h - base)).exp() - (-kd * h).exp())
                        * side_corr;
                    (side, base_light)
                } else {
                    // Kd → 0 的极限
                    (PI * dc * i0 * tc * side_corr, PI * bc * i0 * base * side_corr)
                };
                light[[i, t]] = (top + side + base_light) / bm;
            }
        }

        coral.light = light;
        coral.light_bc = biomass;
        Ok(())
    }
}

// crates/nbs_biota/src/coral/morphology.rs

//! 形态发展
//!
//! 年钙化量转化为体积增量，形态比以体积加权向当前光照与流动
//! 条件下的最优比值松弛。

use ndarray::{Array1, Axis};

use super::model::Coral;
use crate::error::{BiotaError, BiotaResult};

/// 冠层内流速的下限 [m s-1]
const UCM_FLOOR: f64 = 1e-6;

/// 形态过程
#[derive(Debug, Clone)]
pub struct Morphology {
    /// 年钙化总量（每个网格）
    pub calc_sum: Array1<f64>,
    /// 年平均入射光强 [µE m-2 s-1]
    pub mean_light_in: f64,
    /// 时间步长 [yr]
    pub dt_year: f64,
}

/// 最优形态比
#[derive(Debug, Clone)]
pub struct OptimalRatios {
    /// 形态比
    pub rf: Array1<f64>,
    /// 板比
    pub rp: Array1<f64>,
    /// 间距比
    pub rs: Array1<f64>,
}

impl Morphology {
    /// 由年钙化总量与当年逐日入射光强创建
    pub fn new(calc_sum: Array1<f64>, light_in: &[f64]) -> Self {
        let mean_light_in = if light_in.is_empty() {
            0.0
        } else {
            light_in.iter().sum::<f64>() / light_in.len() as f64
        };
        Self {
            calc_sum,
            mean_light_in,
            dt_year: 1.0,
        }
    }

    /// 当年各网格的平均代表性光强与入射光强之比
    fn light_ratio(&self, coral: &Coral) -> Array1<f64> {
        if coral.light.ncols() == 0 || self.mean_light_in <= 0.0 {
            return Array1::zeros(coral.space());
        }
        coral
            .light
            .mean_axis(Axis(1))
            .unwrap_or_else(|| Array1::zeros(coral.space()))
            / self.mean_light_in
    }

    /// 最优形态比
    pub fn optimal_ratios(&self, coral: &Coral) -> OptimalRatios {
        let k = &coral.constants;
        let light_ratio = self.light_ratio(coral);
        let u0 = k.u0;
        let flow = |ucm: f64, factor: f64| 1.0 + (factor * (ucm - u0) / u0).tanh();

        let n = coral.space();
        let mut rf = Array1::zeros(n);
        let mut rp = Array1::zeros(n);
        let mut rs = Array1::zeros(n);
        for i in 0..n {
            let ucm = if coral.ucm[i] > 0.0 { coral.ucm[i] } else { UCM_FLOOR };
            rf[i] = k.prop_form * light_ratio[i] * (u0 / ucm);
            rp[i] = k.prop_plate * flow(coral.ucm[i], k.prop_plate_flow);
            rs[i] = k.prop_space
                * (1.0 - (k.prop_space_light * light_ratio[i]).tanh())
                * flow(coral.ucm[i], k.prop_space_flow);
        }
        OptimalRatios { rf, rp, rs }
    }

    /// 体积增量 `ΔV = ½·ac²·ΣG·dt/ρc·mean(light_bc)`
    pub fn delta_volume(&self, coral: &Coral) -> Array1<f64> {
        let k = &coral.constants;
        let biomass = if coral.light_bc.ncols() == 0 {
            Array1::zeros(coral.space())
        } else {
            coral
                .light_bc
                .mean_axis(Axis(1))
                .unwrap_or_else(|| Array1::zeros(coral.space()))
        };
        Array1::from_shape_fn(coral.space(), |i| {
            0.5 * coral.ac[i].powi(2) * self.calc_sum[i] * self.dt_year / k.rho_c * biomass[i]
        })
    }

    /// 更新珊瑚形态
    pub fn update(&self, coral: &mut Coral) -> BiotaResult<()> {
        BiotaError::check_len("calc_sum", coral.space(), self.calc_sum.len())?;

        let volume = coral.volume();
        let delta = self.delta_volume(coral);
        let optimal = self.optimal_ratios(coral);

        let relax = |old: &Array1<f64>, opt: &Array1<f64>| {
            Array1::from_shape_fn(old.len(), |i| {
                let denominator = volume[i] + delta[i];
                if denominator > 0.0 {
                    (volume[i] * old[i] + delta[i] * opt[i]) / denominator
                } else {
                    old[i]
                }
            })
        };
        let rf = relax(&coral.rf(), &optimal.rf);
        let rp = relax(&coral.rp(), &optimal.rp);
        let rs = relax(&coral.rs(), &optimal.rs);

        let new_volume = &volume + &delta;
        coral.update_morphology(&new_volume, &rf, &rp, &rs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coral::model::CoralMorphology;
    use nbs_config::CoralConstants;
    use ndarray::Array2;

    fn coral() -> Coral {
        let mut c = Coral::new(CoralConstants::default(), CoralMorphology::default(), 1.0, 1);
        c.light = Array2::from_elem((1, 4), 300.0);
        c.light_bc = Array2::from_elem((1, 4), 0.15);
        c.ucm = Array1::from(vec![0.2]);
        c
    }

    #[test]
    fn test_optimal_ratios_at_reference_flow() {
        let c = coral();
        let m = Morphology::new(Array1::from(vec![1.0]), &[600.0; 4]);
        let opt = m.optimal_ratios(&c);
        let k = &c.constants;
        // ucm = u0: 流动项为 1
        assert!((opt.rf[0] - k.prop_form * 0.5).abs() < 1e-12);
        assert!((opt.rp[0] - k.prop_plate).abs() < 1e-12);
        let rs = k.prop_space * (1.0 - (k.prop_space_light * 0.5).tanh());
        assert!((opt.rs[0] - rs).abs() < 1e-12);
    }

    #[test]
    fn test_growth_increases_volume() {
        let mut c = coral();
        let before = c.volume()[0];
        let m = Morphology::new(Array1::from(vec![100.0]), &[600.0; 4]);
        let delta = m.delta_volume(&c)[0];
        assert!(delta > 0.0);
        m.update(&mut c).unwrap();
        assert!((c.volume()[0] - (before + delta)).abs() < 1e-12);
    }

    #[test]
    fn test_no_growth_keeps_ratios() {
        let mut c = coral();
        let rf = c.rf()[0];
        let m = Morphology::new(Array1::from(vec![0.0]), &[600.0; 4]);
        m.update(&mut c).unwrap();
        assert!((c.rf()[0] - rf).abs() < 1e-12);
        assert!((c.dc[0] - 0.2).abs() < 1e-12);
    }
}

// crates/nbs_biota/src/coral/dislodgement.rs

//! 风暴引起的群体脱落
//!
//! 比较力学阈值（DMT）与群体形状因子（CSF）：CSF 超过 DMT 的群体
//! 被部分移除，存活比例为 `DMT / CSF`。

use std::f64::consts::PI;

use ndarray::Array1;

use super::model::Coral;
use super::population_states::last_states;

/// 无流速时的力学阈值
const DMT_NO_FLOW: f64 = 1e20;

/// 脱落过程
#[derive(Debug, Clone, Default)]
pub struct Dislodgement {
    /// 力学阈值
    pub dmt: Array1<f64>,
    /// 群体形状因子
    pub csf: Array1<f64>,
    /// 存活比例
    pub survival: Array1<f64>,
}

impl Dislodgement {
    /// 创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 力学阈值 `σt / (ρw·Cd·um²)`
    pub fn dislodgement_mechanical_threshold(&mut self, coral: &Coral) {
        let k = &coral.constants;
        self.dmt = coral.um.mapv(|um| {
            if um > 0.0 {
                k.sigma_t / (k.rho_w * k.cd * um * um)
            } else {
                DMT_NO_FLOW
            }
        });
    }

    /// 群体形状因子
    pub fn colony_shape_factor(&mut self, coral: &Coral) {
        self.csf = Array1::from_shape_fn(coral.space(), |i| {
            let (dc, hc, bc, tc) = (coral.dc[i], coral.hc[i], coral.bc[i], coral.tc[i]);
            if bc <= 0.0 {
                return 0.0;
            }
            let arm = (hc - 0.5 * tc) * dc * tc + 0.5 * bc * (hc - tc).powi(2);
            16.0 / (PI * bc.powi(3)) * arm
        });
    }

    /// 存活比例
    pub fn partial_dislodgement(&mut self) {
        self.survival = ndarray::Zip::from(&self.dmt)
            .and(&self.csf)
            .map_collect(|&dmt, &csf| if dmt <= csf { dmt / csf } else { 1.0 });
    }

    /// 完整更新：按存活比例缩减末日种群，写入 `coral.p0`
    pub fn update(&mut self, coral: &mut Coral) {
        self.dislodgement_mechanical_threshold(coral);
        self.colony_shape_factor(coral);
        self.partial_dislodgement();

        let last = last_states(&coral.pop_states).unwrap_or_else(|| coral.p0.clone());
        let mut p0 = last;
        for (mut row, &s) in p0.rows_mut().into_iter().zip(self.survival.iter()) {
            row *= s;
        }
        coral.p0 = p0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coral::model::CoralMorphology;
    use nbs_config::CoralConstants;

    fn coral(um: f64) -> Coral {
        let mut c = Coral::new(CoralConstants::default(), CoralMorphology::default(), 1.0, 1);
        c.initiate_coral_morphology(&Array1::from(vec![1.0])).unwrap();
        c.um = Array1::from(vec![um]);
        c
    }

    #[test]
    fn test_calm_conditions_no_dislodgement() {
        let mut c = coral(0.0);
        let mut d = Dislodgement::new();
        d.update(&mut c);
        assert_eq!(d.survival[0], 1.0);
        assert_eq!(c.p0[[0, 0]], 1.0);
    }

    #[test]
    fn test_severe_storm_removes_colonies() {
        let mut c = coral(30.0);
        let mut d = Dislodgement::new();
        d.update(&mut c);
        assert!(d.dmt[0] < d.csf[0]);
        assert!(d.survival[0] < 1.0);
        assert!((c.p0[[0, 0]] - d.survival[0]).abs() < 1e-12);
    }

    #[test]
    fn test_shape_factor() {
        let c = coral(1.0);
        let mut d = Dislodgement::new();
        d.colony_shape_factor(&c);
        let arm = (0.3 - 0.075) * 0.2 * 0.15 + 0.5 * 0.1 * 0.15f64.powi(2);
        assert!((d.csf[0] - 16.0 / (PI * 0.001) * arm).abs() < 1e-9);
    }
}

// crates/nbs_biota/src/coral/population_states.rs

//! 种群动态
//!
//! 四种状态（健康 PH、恢复 PR、苍白 PP、白化 PB）以逐日隐式格式更新。
//! 光合速率为正时种群生长与恢复，为负时白化。覆盖度为承载能力。

use ndarray::{Array2, Array3};

use super::model::{Coral, NUM_POP_STATES};
use crate::error::{BiotaError, BiotaResult};

/// 容量检查的相对容差
const CAPACITY_TOLERANCE: f64 = 1.0001;

/// 种群动态过程
#[derive(Debug, Clone, Copy)]
pub struct PopulationStates {
    /// 时间步长 [d]
    pub dt: f64,
}

impl Default for PopulationStates {
    fn default() -> Self {
        Self { dt: 1.0 }
    }
}

impl PopulationStates {
    /// 以 1 天步长创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 推进一年，写入 `coral.pop_states` 并更新 `coral.p0` 为末日状态
    pub fn pop_states(&self, coral: &mut Coral) -> BiotaResult<()> {
        let (space, time) = coral.photo_rate.dim();
        BiotaError::check_len("space", coral.space(), space)?;

        let mut states = Array3::zeros((space, time, NUM_POP_STATES));
        let mut last = coral.p0.clone();
        for i in 0..space {
            let cover = coral.cover[i];
            if cover <= 0.0 {
                for s in 0..NUM_POP_STATES {
                    last[[i, s]] = 0.0;
                }
                continue;
            }
            let mut p = [last[[i, 0]], last[[i, 1]], last[[i, 2]], last[[i, 3]]];
            for t in 0..time {
                p = self.step(coral, p, coral.photo_rate[[i, t]], cover);
                let total: f64 = p.iter().sum();
                if total > CAPACITY_TOLERANCE * cover {
                    return Err(BiotaError::CarryingCapacity {
                        cell: i,
                        total,
                        capacity: cover,
                    });
                }
                for (s, v) in p.iter().enumerate() {
                    states[[i, t, s]] = *v;
                }
            }
            for (s, v) in p.iter().enumerate() {
                last[[i, s]] = *v;
            }
        }

        coral.pop_states = states;
        coral.p0 = last;
        Ok(())
    }

    /// 单日更新
    fn step(&self, coral: &Coral, p0: [f64; 4], ps: f64, cover: f64) -> [f64; 4] {
        if ps > 0.0 {
            self.growth(coral, p0, ps, cover)
        } else {
            self.bleaching(coral, p0, ps)
        }
    }

    /// 光合速率为正：白化 → 苍白 → 恢复 → 健康
    fn growth(&self, coral: &Coral, p0: [f64; 4], ps: f64, cover: f64) -> [f64; 4] {
        let k = &coral.constants;
        let csp = coral.species_constant;
        let dt = self.dt;
        let (rg, rr, rm) = (k.r_growth, k.r_recovery, k.r_mortality);

        let pb = p0[3] / (1.0 + dt * (8.0 * rr * ps / csp + rm * csp));
        let pp = (p0[2] + 8.0 * dt * rr * ps / csp * pb) / (1.0 + dt * rr * ps * csp);
        let pr = (p0[1] + dt * rr * ps * csp * pp) / (1.0 + 0.5 * dt * rr * ps * csp);

        let a = dt * rg * ps * csp / cover;
        let b = 1.0 - dt * rg * ps * csp * (1.0 - (pr + pp + pb) / cover);
        let c = -(p0[0] + 0.5 * dt * rr * ps * csp * pr);
        let ph = if a.abs() < f64::EPSILON {
            -c / b
        } else {
            (-b + (b * b - 4.0 * a * c).max(0.0).sqrt()) / (2.0 * a)
        };
        [ph, pr, pp, pb]
    }

    /// 光合速率非正：健康与恢复 → 苍白 → 白化
    fn bleaching(&self, coral: &Coral, p0: [f64; 4], ps: f64) -> [f64; 4] {
        let rb = coral.constants.r_bleaching;
        let csp = coral.species_constant;
        let x = self.dt * rb * ps * csp;

        let ph = p0[0] / (1.0 - x);
        let pr = p0[1] / (1.0 - x);
        let pp = (p0[2] - x * (ph + pr)) / (1.0 - 0.5 * x);
        let pb = (p0[3] - 0.5 * x * pp) / (1.0 - 0.25 * x);
        [ph, pr, pp, pb]
    }
}

/// 末日状态 (space × 4)
pub fn last_states(pop_states: &Array3<f64>) -> Option<Array2<f64>> {
    let time = pop_states.dim().1;
    (time > 0).then(|| pop_states.index_axis(ndarray::Axis(1), time - 1).to_owned())
}

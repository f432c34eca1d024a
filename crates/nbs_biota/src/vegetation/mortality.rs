// crates/nbs_biota/src/vegetation/mortality.rs

//! 植被死亡
//!
//! 干旱、淹没和拔起的死亡比例均为 `slope·(x − threshold)`，截断到
//! [0, 1]；床面淤积超过株高（掩埋）或冲刷超过根长时该年龄组全部死亡。

use nbs_config::VegetationConstants;
use ndarray::Array1;

use super::hydro_morphodynamics::HydroMorphoState;
use super::life_stages::LifeStages;
use super::model::Vegetation;

/// 死亡比例 `clip(slope·(x − threshold), 0, 1)`
pub fn mortality_fraction(x: f64, threshold: f64, slope: f64) -> f64 {
    (slope * (x - threshold)).clamp(0.0, 1.0)
}

/// 死亡过程
#[derive(Debug, Clone, Copy, Default)]
pub struct Mortality;

impl Mortality {
    /// 创建
    pub fn new() -> Self {
        Self
    }

    /// 按当前水动力-地貌状态更新各生命阶段
    pub fn update(&self, veg: &mut Vegetation) {
        let constants = veg.constants.clone();
        let hydro = veg.hydro.clone();
        let bl_change = hydro.bed_level_change();
        for stage in veg.stages_mut() {
            apply(&constants, &hydro, &bl_change, stage);
        }
    }
}

/// 每个网格的存活比例（干旱、淹没、拔起的组合）
pub fn survival(k: &VegetationConstants, hydro: &HydroMorphoState, ls: usize) -> Array1<f64> {
    Array1::from_shape_fn(hydro.max_u.len(), |i| {
        let desiccation =
            mortality_fraction(hydro.dry_frac[i], k.des_mort_thres[ls], k.des_mort_slope[ls]);
        let flooding =
            mortality_fraction(hydro.fl_frac[i], k.flo_mort_thres[ls], k.flo_mort_slope[ls]);
        let uprooting = mortality_fraction(hydro.max_u[i], k.vel_thres[ls], k.vel_slope[ls]);
        (1.0 - desiccation) * (1.0 - flooding) * (1.0 - uprooting)
    })
}

fn apply(
    k: &VegetationConstants,
    hydro: &HydroMorphoState,
    bl_change: &Array1<f64>,
    stage: &mut LifeStages,
) {
    let survive = survival(k, hydro, stage.stage.param_index());
    for ((i, j), frac) in stage.veg_frac.indexed_iter_mut() {
        if *frac <= 0.0 {
            continue;
        }
        let burial = bl_change[i] > stage.veg_height[[i, j]];
        let scour = -bl_change[i] > stage.root_len[[i, j]];
        if burial || scour {
            *frac = 0.0;
        } else {
            *frac *= survive[i];
        }
    }
    stage.clear_dead();
}

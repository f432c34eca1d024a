// crates/nbs_biota/src/vegetation/growth.rs

//! 植被生长
//!
//! 生长季内株高、茎径和根长按生长天数线性趋近各生命阶段的最大值；
//! 冬季株高被截断到冬季最大株高。

use nbs_config::VegetationConstants;

use super::life_stages::LifeStages;
use super::model::Vegetation;

/// 生长过程
#[derive(Debug, Clone, Copy, Default)]
pub struct Growth;

impl Growth {
    /// 创建
    pub fn new() -> Self {
        Self
    }

    /// 第 `ets` 个生态时间步的生长
    pub fn update(&self, veg: &mut Vegetation, ets: usize) {
        let season: usize = veg.growth_days.iter().sum();
        let growth_days = veg.growth_days.get(ets).copied().unwrap_or(0);
        let winter = veg.winter_days.get(ets).copied().unwrap_or(0) > 0;

        let constants = veg.constants.clone();
        for stage in veg.stages_mut() {
            if growth_days > 0 && season > 0 {
                let fraction = growth_days as f64 / season as f64;
                grow(&constants, stage, fraction);
            }
            if winter {
                winter_cap(&constants, stage);
            }
        }
    }
}

fn grow(k: &VegetationConstants, stage: &mut LifeStages, fraction: f64) {
    let ls = stage.stage.param_index();
    let increments = [
        (k.max_growth_h[ls] - k.ini_shoot) * fraction,
        (k.max_dia[ls] - k.ini_dia) * fraction,
        (k.max_root[ls] - k.ini_root) * fraction,
    ];
    let maxima = [k.max_growth_h[ls], k.max_dia[ls], k.max_root[ls]];

    let frac = stage.veg_frac.clone();
    for (field, (inc, max)) in [
        &mut stage.veg_height,
        &mut stage.stem_dia,
        &mut stage.root_len,
    ]
    .into_iter()
    .zip(increments.into_iter().zip(maxima))
    {
        ndarray::Zip::from(field).and(&frac).for_each(|v, &f| {
            if f > 0.0 {
                *v = (*v + inc).min(max);
            }
        });
    }
    ndarray::Zip::from(&mut stage.stem_num)
        .and(&frac)
        .for_each(|n, &f| {
            if f > 0.0 {
                *n = k.num_stem[ls];
            }
        });
}

fn winter_cap(k: &VegetationConstants, stage: &mut LifeStages) {
    let cap = k.max_h_winter[stage.stage.param_index()];
    stage.veg_height.mapv_inplace(|h| h.min(cap));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn veg() -> Vegetation {
        let mut veg = Vegetation::new(VegetationConstants::spartina(), 1);
        let k = veg.constants.clone();
        veg.initial.veg_frac[[0, 0]] = 0.6;
        veg.initial.veg_height[[0, 0]] = k.ini_shoot;
        veg.initial.stem_dia[[0, 0]] = k.ini_dia;
        veg.initial.root_len[[0, 0]] = k.ini_root;
        veg
    }

    fn first_growth_step(veg: &Vegetation) -> usize {
        veg.growth_days.iter().position(|&d| d > 0).unwrap()
    }

    #[test]
    fn test_linear_growth_towards_maximum() {
        let mut veg = veg();
        let ets = first_growth_step(&veg);
        let season: usize = veg.growth_days.iter().sum();
        let fraction = veg.growth_days[ets] as f64 / season as f64;
        Growth::new().update(&mut veg, ets);

        let k = &veg.constants;
        let expected = k.ini_shoot + (k.max_growth_h[0] - k.ini_shoot) * fraction;
        assert!((veg.initial.veg_height[[0, 0]] - expected).abs() < 1e-12);
        assert_eq!(veg.initial.stem_num[[0, 0]], k.num_stem[0]);
    }

    #[test]
    fn test_full_season_reaches_maximum() {
        let mut veg = veg();
        for ets in 0..veg.growth_days.len() {
            Growth::new().update(&mut veg, ets);
        }
        let k = &veg.constants;
        // 根长与茎径不受冬季截断
        assert!((veg.initial.root_len[[0, 0]] - k.max_root[0]).abs() < 1e-9);
        assert!((veg.initial.stem_dia[[0, 0]] - k.max_dia[0]).abs() < 1e-9);
        assert!(veg.initial.veg_height[[0, 0]] <= k.max_h_winter[0] + 1e-12);
    }

    #[test]
    fn test_winter_cap() {
        let mut veg = veg();
        veg.initial.veg_height[[0, 0]] = 0.8;
        let ets = veg.winter_days.iter().position(|&d| d > 0).unwrap();
        Growth::new().update(&mut veg, ets);
        assert!(veg.initial.veg_height[[0, 0]] <= veg.constants.max_h_winter[0] + 1e-12);
    }

    #[test]
    fn test_empty_cells_do_not_grow() {
        let mut veg = Vegetation::new(VegetationConstants::spartina(), 1);
        let ets = first_growth_step(&veg);
        Growth::new().update(&mut veg, ets);
        assert_eq!(veg.initial.veg_height[[0, 0]], 0.0);
    }
}

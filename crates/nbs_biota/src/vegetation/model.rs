// crates/nbs_biota/src/vegetation/model.rs

//! 植被模型
//!
//! 一个物种由三个生命阶段组成，聚合量（总覆盖、茎密度、平均茎径、
//! 平均株高）反馈给水动力模型。

use nbs_config::VegetationConstants;
use nbs_hydro::HydroCoupling;
use ndarray::Array1;
use tracing::debug;

use super::hydro_morphodynamics::HydroMorphoState;
use super::life_stages::{weighted_mean, LifeStage, LifeStages};
use crate::error::{BiotaError, BiotaResult};

/// 植被
#[derive(Debug, Clone)]
pub struct Vegetation {
    /// 物种常数
    pub constants: VegetationConstants,
    /// 当年定殖的幼苗
    pub initial: LifeStages,
    /// 幼年
    pub juvenile: LifeStages,
    /// 成年
    pub mature: LifeStages,
    /// 每个生态时间步的生长天数
    pub growth_days: Vec<usize>,
    /// 每个生态时间步的定殖天数
    pub col_days: Vec<usize>,
    /// 每个生态时间步的冬季天数
    pub winter_days: Vec<usize>,
    /// 水动力-地貌状态
    pub hydro: HydroMorphoState,
}

impl Vegetation {
    /// 在 `space` 个网格上创建无植被的物种
    pub fn new(constants: VegetationConstants, space: usize) -> Self {
        let growth_days = constants.growth_days();
        let col_days = constants.col_days();
        let winter_days = constants.winter_days();
        Self {
            constants,
            initial: LifeStages::new(LifeStage::Initial, space, 1),
            juvenile: LifeStages::new(LifeStage::Juvenile, space, 0),
            mature: LifeStages::new(LifeStage::Mature, space, 0),
            growth_days,
            col_days,
            winter_days,
            hydro: HydroMorphoState::new(space),
        }
    }

    /// 网格单元数
    pub fn space(&self) -> usize {
        self.initial.space()
    }

    /// 物种名
    pub fn species(&self) -> &str {
        &self.constants.species
    }

    /// 三个生命阶段
    pub fn stages(&self) -> [&LifeStages; 3] {
        [&self.initial, &self.juvenile, &self.mature]
    }

    /// 三个生命阶段（可变）
    pub fn stages_mut(&mut self) -> [&mut LifeStages; 3] {
        [&mut self.initial, &mut self.juvenile, &mut self.mature]
    }

    /// 以覆盖度设置初始植被：作为年龄为 0 的幼年组
    pub fn initiate_vegetation_characteristics(&mut self, cover: &Array1<f64>) -> BiotaResult<()> {
        BiotaError::check_len("cover", self.space(), cover.len())?;
        if cover.iter().all(|&c| c <= 0.0) {
            return Ok(());
        }
        let k = &self.constants;
        let mut cohort = LifeStages::new(LifeStage::Juvenile, self.space(), 1);
        for (i, &c) in cover.iter().enumerate() {
            let c = c.clamp(0.0, 1.0);
            if c > 0.0 {
                cohort.veg_frac[[i, 0]] = c;
                cohort.veg_height[[i, 0]] = k.ini_shoot;
                cohort.stem_dia[[i, 0]] = k.ini_dia;
                cohort.root_len[[i, 0]] = k.ini_root;
                cohort.stem_num[[i, 0]] = k.num_stem[0];
            }
        }
        self.juvenile.prepend(&cohort);
        Ok(())
    }

    // ========================================================================
    // 聚合量
    // ========================================================================

    /// 总覆盖比例
    pub fn total_cover(&self) -> Array1<f64> {
        self.stages()
            .iter()
            .fold(Array1::zeros(self.space()), |acc, s| acc + s.cover())
    }

    /// 茎密度 Σ(stem_num·frac) [m-2]
    pub fn veg_den(&self) -> Array1<f64> {
        self.stages()
            .iter()
            .fold(Array1::zeros(self.space()), |acc, s| {
                acc + s.weighted_sum(&s.stem_num)
            })
    }

    /// 平均茎径 [m]
    pub fn av_stemdia(&self) -> Array1<f64> {
        weighted_mean(&self.stages(), |s| &s.stem_dia)
    }

    /// 平均株高 [m]
    pub fn av_height(&self) -> Array1<f64> {
        weighted_mean(&self.stages(), |s| &s.veg_height)
    }

    // ========================================================================
    // 年末
    // ========================================================================

    /// 年末更新生命阶段
    ///
    /// 所有年龄组增长一岁；幼苗并入幼年；超过幼年年限的转为成年；
    /// 超过最大年龄的移除。
    pub fn update_lifestages(&mut self) {
        for stage in self.stages_mut() {
            stage.age(1.0);
        }

        if !self.initial.is_empty() {
            let mut seedlings = self.initial.clone();
            seedlings.stage = LifeStage::Juvenile;
            self.juvenile.prepend(&seedlings);
        }
        self.initial.reset();

        let juvenile_years = self.constants.max_years_ls[0];
        let grown = self
            .juvenile
            .split_off(LifeStage::Mature, |age| age > juvenile_years);
        if !grown.is_empty() {
            self.mature.prepend(&grown);
        }

        let max_age = self.constants.max_age as f64;
        for stage in [&mut self.juvenile, &mut self.mature] {
            stage.remove_where(|age| age > max_age);
            stage.drop_empty_cohorts();
        }
        debug!(
            "{}: 年末生命阶段更新, 幼年 {} 组, 成年 {} 组",
            self.constants.species,
            self.juvenile.cohorts(),
            self.mature.cohorts()
        );
    }
}

impl HydroCoupling for Vegetation {
    fn vegetation_density(&self) -> Array1<f64> {
        self.veg_den()
    }

    fn stem_diameter(&self) -> Array1<f64> {
        self.av_stemdia()
    }

    fn stem_height(&self) -> Array1<f64> {
        self.av_height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(constants: VegetationConstants) -> Vegetation {
        let mut veg = Vegetation::new(constants, 2);
        let k = veg.constants.clone();
        veg.initial.veg_frac[[0, 0]] = k.ini_col_frac;
        veg.initial.veg_height[[0, 0]] = k.ini_shoot;
        veg.initial.stem_dia[[0, 0]] = k.ini_dia;
        veg.initial.stem_num[[0, 0]] = k.num_stem[0];
        veg
    }

    #[test]
    fn test_new_is_bare() {
        let veg = Vegetation::new(VegetationConstants::spartina(), 3);
        assert_eq!(veg.total_cover().to_vec(), vec![0.0; 3]);
        assert_eq!(veg.growth_days.len(), 24);
        assert_eq!(veg.av_height().to_vec(), vec![0.0; 3]);
    }

    #[test]
    fn test_aggregates() {
        let veg = seeded(VegetationConstants::spartina());
        assert!((veg.total_cover()[0] - 0.6).abs() < 1e-12);
        assert!((veg.veg_den()[0] - 700.0 * 0.6).abs() < 1e-9);
        assert!((veg.av_stemdia()[0] - 0.003).abs() < 1e-12);
        assert!((veg.av_height()[0] - 0.015).abs() < 1e-12);
        assert_eq!(veg.veg_den()[1], 0.0);
    }

    #[test]
    fn test_perennial_becomes_mature() {
        let mut veg = seeded(VegetationConstants::spartina());
        veg.update_lifestages();
        assert!(veg.initial.is_empty());
        // 一岁时仍为幼年
        assert_eq!(veg.juvenile.cohorts(), 1);
        assert_eq!(veg.juvenile.veg_age[[0, 0]], 1.0);
        assert_eq!(veg.mature.cohorts(), 0);
        assert!((veg.total_cover()[0] - 0.6).abs() < 1e-12);

        veg.update_lifestages();
        assert_eq!(veg.juvenile.cohorts(), 0);
        assert_eq!(veg.mature.cohorts(), 1);
        assert_eq!(veg.mature.veg_age[[0, 0]], 2.0);
        assert!((veg.total_cover()[0] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_annual_removed_past_max_age() {
        let mut veg = seeded(VegetationConstants::salicornia());
        veg.update_lifestages();
        assert_eq!(veg.juvenile.cohorts(), 1);
        assert!((veg.total_cover()[0] - 0.6).abs() < 1e-12);

        // 两岁超过最大年龄 1
        veg.update_lifestages();
        assert!(veg.total_cover().iter().all(|&c| c == 0.0));
        assert_eq!(veg.juvenile.cohorts(), 0);
        assert_eq!(veg.mature.cohorts(), 0);
    }

    #[test]
    fn test_slow_juvenile_stays_juvenile() {
        let mut veg = seeded(VegetationConstants::puccinellia());
        for _ in 0..2 {
            veg.update_lifestages();
            assert_eq!(veg.juvenile.cohorts(), 1);
            assert_eq!(veg.mature.cohorts(), 0);
        }
        veg.update_lifestages();
        assert_eq!(veg.juvenile.cohorts(), 0);
        assert_eq!(veg.mature.cohorts(), 1);
        assert_eq!(veg.mature.veg_age[[0, 0]], 3.0);
    }

    #[test]
    fn test_initial_cover() {
        let mut veg = Vegetation::new(VegetationConstants::spartina(), 2);
        veg.initiate_vegetation_characteristics(&Array1::from(vec![0.5, 0.0]))
            .unwrap();
        assert_eq!(veg.juvenile.cohorts(), 1);
        assert!((veg.total_cover()[0] - 0.5).abs() < 1e-12);
        assert!(veg
            .initiate_vegetation_characteristics(&Array1::from(vec![0.5]))
            .is_err());
    }
}

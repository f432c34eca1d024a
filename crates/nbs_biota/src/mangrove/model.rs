// crates/nbs_biota/src/mangrove/model.rs

//! 红树林模型
//!
//! 状态为 (cell × cohort) 的株数、胸径 [m] 与树高 [m]，新年龄组在前。

use nbs_config::MangroveConstants;
use nbs_hydro::HydroCoupling;
use ndarray::{Array1, Array2, Axis, Zip};

use crate::error::{BiotaError, BiotaResult};
use crate::vegetation::HydroMorphoState;

/// 红树林
#[derive(Debug, Clone)]
pub struct Mangrove {
    /// 物种常数
    pub constants: MangroveConstants,
    /// 株数 [1/cell]
    pub stem_num: Array2<f64>,
    /// 胸径 [m]
    pub stem_dia: Array2<f64>,
    /// 树高 [m]
    pub height: Array2<f64>,
    /// 水动力-地貌状态
    pub hydro: HydroMorphoState,
    /// 相对淹没时长 [-]
    pub inun_rel: Array1<f64>,
    /// 本年各生态时间步的淹没胁迫 (space × ets)
    pub inundation: Array2<f64>,
    /// 竞争胁迫 [-]
    pub competition: Array1<f64>,
    /// 生长受抑的累计年数
    pub mort: Array1<u32>,
    /// 每个生态时间步的定殖天数
    pub col_days: Vec<usize>,
}

impl Mangrove {
    /// 在 `space` 个网格上创建无红树林的状态
    pub fn new(constants: MangroveConstants, space: usize) -> Self {
        let col_days = constants.col_days();
        Self {
            constants,
            stem_num: Array2::zeros((space, 0)),
            stem_dia: Array2::zeros((space, 0)),
            height: Array2::zeros((space, 0)),
            hydro: HydroMorphoState::new(space),
            inun_rel: Array1::zeros(space),
            inundation: Array2::zeros((space, 0)),
            competition: Array1::ones(space),
            mort: Array1::zeros(space),
            col_days,
        }
    }

    /// 网格单元数
    pub fn space(&self) -> usize {
        self.stem_num.nrows()
    }

    /// 年龄组数
    pub fn cohorts(&self) -> usize {
        self.stem_num.ncols()
    }

    /// 单株地上生物量 `bio_a · D^bio_b`（D 以 cm 计）[kg]
    pub fn biomass(&self) -> Array2<f64> {
        let k = &self.constants;
        Zip::from(&self.stem_dia)
            .and(&self.stem_num)
            .map_collect(|&d, &n| {
                if n > 0.0 && d > 0.0 {
                    k.bio_a * (d * 100.0).powf(k.bio_b)
                } else {
                    0.0
                }
            })
    }

    /// 每个网格的总生物量 [kg/cell]
    pub fn bio_total_cell(&self) -> Array1<f64> {
        (&self.biomass() * &self.stem_num).sum_axis(Axis(1))
    }

    /// 每个网格的总株数
    pub fn total_stems(&self) -> Array1<f64> {
        self.stem_num.sum_axis(Axis(1))
    }

    /// 有红树林的网格为 1，否则为 0
    pub fn cover(&self) -> Array1<f64> {
        self.total_stems().mapv(|n| if n > 0.0 { 1.0 } else { 0.0 })
    }

    /// 平均淹没胁迫（本年各步）
    pub fn mean_inundation(&self) -> Array1<f64> {
        self.inundation
            .mean_axis(Axis(1))
            .unwrap_or_else(|| Array1::zeros(self.space()))
    }

    /// 最近一步的淹没胁迫
    pub fn last_inundation(&self) -> Array1<f64> {
        match self.inundation.ncols() {
            0 => Array1::zeros(self.space()),
            n => self.inundation.column(n - 1).to_owned(),
        }
    }

    /// 按当前生物量重新计算竞争胁迫
    pub fn update_competition(&mut self) {
        let k = &self.constants;
        self.competition = self.bio_total_cell().mapv(|b| k.competition_stress(b));
    }

    /// 在最前插入一个新年龄组
    pub fn prepend_cohort(&mut self, stem_num: &Array1<f64>, stem_dia: &Array1<f64>, height: &Array1<f64>) {
        for (field, column) in [
            (&mut self.stem_num, stem_num),
            (&mut self.stem_dia, stem_dia),
            (&mut self.height, height),
        ] {
            let old = std::mem::replace(field, Array2::zeros((0, 0)));
            let (space, n_old) = old.dim();
            *field = Array2::from_shape_fn((space, n_old + 1), |(i, j)| {
                if j == 0 {
                    column[i]
                } else {
                    old[[i, j - 1]]
                }
            });
        }
    }

    /// 株数为零处清空胸径与树高，并删除全空的年龄组
    pub fn clear_dead(&mut self) {
        Zip::from(&mut self.stem_dia)
            .and(&mut self.height)
            .and(&self.stem_num)
            .for_each(|d, h, &n| {
                if n <= 0.0 {
                    *d = 0.0;
                    *h = 0.0;
                }
            });
        let keep: Vec<usize> = (0..self.cohorts())
            .filter(|&j| self.stem_num.column(j).iter().any(|&n| n > 0.0))
            .collect();
        if keep.len() != self.cohorts() {
            self.stem_num = self.stem_num.select(Axis(1), &keep);
            self.stem_dia = self.stem_dia.select(Axis(1), &keep);
            self.height = self.height.select(Axis(1), &keep);
        }
    }

    /// 以初始覆盖设置红树林：覆盖为正的网格放置一个初始年龄组
    pub fn initiate(&mut self, cover: &Array1<f64>) -> BiotaResult<()> {
        BiotaError::check_len("cover", self.space(), cover.len())?;
        if cover.iter().all(|&c| c <= 0.0) {
            return Ok(());
        }
        let k = &self.constants;
        let present = cover.mapv(|c| if c > 0.0 { 1.0 } else { 0.0 });
        let num = &present * k.ini_num;
        let dia = &present * k.ini_dia;
        let h = &present * height_from_diameter(k, k.ini_dia);
        self.prepend_cohort(&num, &dia, &h);
        self.update_competition();
        Ok(())
    }

    fn stem_weighted(&self, attribute: &Array2<f64>) -> Array1<f64> {
        let total = self.total_stems();
        let weighted = (attribute * &self.stem_num).sum_axis(Axis(1));
        Zip::from(&weighted)
            .and(&total)
            .map_collect(|&w, &n| if n > 0.0 { w / n } else { 0.0 })
    }
}

/// 树高-胸径关系 `H = 137 + b2·D − b3·D²`（cm），返回 m，截断到最大树高
pub fn height_from_diameter(k: &MangroveConstants, dia_m: f64) -> f64 {
    let d = dia_m * 100.0;
    let h_cm = (137.0 + k.b2 * d - k.b3 * d * d).clamp(0.0, k.max_h);
    h_cm / 100.0
}

impl HydroCoupling for Mangrove {
    fn vegetation_density(&self) -> Array1<f64> {
        self.total_stems()
    }

    fn stem_diameter(&self) -> Array1<f64> {
        self.stem_weighted(&self.stem_dia)
    }

    fn stem_height(&self) -> Array1<f64> {
        self.stem_weighted(&self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planted() -> Mangrove {
        let mut m = Mangrove::new(MangroveConstants::default(), 3);
        m.initiate(&Array1::from(vec![1.0, 0.0, 0.5])).unwrap();
        m
    }

    #[test]
    fn test_new_is_bare() {
        let m = Mangrove::new(MangroveConstants::default(), 2);
        assert_eq!(m.cohorts(), 0);
        assert_eq!(m.bio_total_cell().to_vec(), vec![0.0, 0.0]);
        assert_eq!(m.col_days.len(), 24);
    }

    #[test]
    fn test_initiate_and_biomass() {
        let m = planted();
        assert_eq!(m.cohorts(), 1);
        assert_eq!(m.total_stems().to_vec(), vec![750.0, 0.0, 750.0]);
        // D = 1 cm → 0.308 kg
        assert!((m.biomass()[[0, 0]] - 0.308).abs() < 1e-12);
        assert!((m.bio_total_cell()[0] - 750.0 * 0.308).abs() < 1e-9);
        assert_eq!(m.cover().to_vec(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_height_allometry() {
        let k = MangroveConstants::default();
        let h = height_from_diameter(&k, 0.01);
        assert!((h - (137.0 + 48.04 - 0.172) / 100.0).abs() < 1e-12);
        // 大胸径时截断到最大树高
        assert!(height_from_diameter(&k, 1.4) <= k.max_h / 100.0);
    }

    #[test]
    fn test_coupling_averages() {
        let mut m = planted();
        m.prepend_cohort(
            &Array1::from(vec![250.0, 0.0, 0.0]),
            &Array1::from(vec![0.05, 0.0, 0.0]),
            &Array1::from(vec![3.0, 0.0, 0.0]),
        );
        assert_eq!(m.vegetation_density()[0], 1000.0);
        let d = m.stem_diameter();
        assert!((d[0] - (250.0 * 0.05 + 750.0 * 0.01) / 1000.0).abs() < 1e-12);
        assert_eq!(m.stem_height()[1], 0.0);
    }

    #[test]
    fn test_clear_dead_drops_empty_cohorts() {
        let mut m = planted();
        m.stem_num.fill(0.0);
        m.clear_dead();
        assert_eq!(m.cohorts(), 0);
    }
}

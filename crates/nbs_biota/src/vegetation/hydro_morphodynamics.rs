// crates/nbs_biota/src/vegetation/hydro_morphodynamics.rs

//! 每个生态时间步的水动力-地貌特征
//!
//! 由水动力模型在一个生态时间步内的时间序列 (space × steps)
//! 统计最大剪切应力、最大流速、最高/最低水深和步末床面高程，
//! 以及淹没与干燥的时间比例。

use nbs_hydro::HydroMorphoSeries;
use ndarray::{Array1, Array2, Axis, Zip};

use super::model::Vegetation;
use crate::error::{BiotaError, BiotaResult};

/// 水动力-地貌状态
#[derive(Debug, Clone, PartialEq)]
pub struct HydroMorphoState {
    /// 最大床面剪切应力 [N m-2]
    pub max_tau: Array1<f64>,
    /// 最大流速 [m s-1]
    pub max_u: Array1<f64>,
    /// 最大水深 [m]
    pub max_wl: Array1<f64>,
    /// 最小水深 [m]
    pub min_wl: Array1<f64>,
    /// 床面高程 [m]
    pub bl: Array1<f64>,

    /// 上一生态时间步的最大剪切应力
    pub max_tau_prev: Array1<f64>,
    /// 上一生态时间步的最大流速
    pub max_u_prev: Array1<f64>,
    /// 上一生态时间步的最大水深
    pub max_wl_prev: Array1<f64>,
    /// 上一生态时间步的最小水深
    pub min_wl_prev: Array1<f64>,
    /// 上一生态时间步的床面高程
    pub bl_prev: Array1<f64>,

    /// 剪切应力时间序列 (space × steps)
    pub tau_ts: Array2<f64>,
    /// 流速时间序列
    pub u_ts: Array2<f64>,
    /// 水位时间序列
    pub wl_ts: Array2<f64>,
    /// 床面高程时间序列
    pub bl_ts: Array2<f64>,

    /// 淹没时间比例 [-]
    pub fl_frac: Array1<f64>,
    /// 干燥时间比例 [-]
    pub dry_frac: Array1<f64>,

    updates: usize,
}

impl HydroMorphoState {
    /// 空状态
    pub fn new(space: usize) -> Self {
        let zeros = || Array1::zeros(space);
        let empty = || Array2::zeros((space, 0));
        Self {
            max_tau: zeros(),
            max_u: zeros(),
            max_wl: zeros(),
            min_wl: zeros(),
            bl: zeros(),
            max_tau_prev: zeros(),
            max_u_prev: zeros(),
            max_wl_prev: zeros(),
            min_wl_prev: zeros(),
            bl_prev: zeros(),
            tau_ts: empty(),
            u_ts: empty(),
            wl_ts: empty(),
            bl_ts: empty(),
            fl_frac: zeros(),
            dry_frac: zeros(),
            updates: 0,
        }
    }

    /// 已处理的生态时间步数
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// 床面高程变化（本步 − 上一步）
    pub fn bed_level_change(&self) -> Array1<f64> {
        &self.bl - &self.bl_prev
    }

    /// 各时刻水深 (space × steps)
    pub fn water_depth_ts(&self) -> Array2<f64> {
        &self.wl_ts - &self.bl_ts
    }

    /// 以一个生态时间步的时间序列更新；`fl_dr` 为淹没判定的水深阈值
    pub fn update(&mut self, series: &HydroMorphoSeries, fl_dr: f64) -> BiotaResult<()> {
        let space = self.max_tau.len();
        BiotaError::check_len("space", space, series.space())?;
        let steps = series.steps();
        if steps == 0 {
            return Err(BiotaError::MissingState("hydromorphodynamic time series"));
        }

        self.tau_ts = series.tau.clone();
        self.u_ts = series.velocity.clone();
        self.wl_ts = series.water_level.clone();
        self.bl_ts = series.bed_level.clone();
        let depth = self.water_depth_ts();

        let max_tau = max_axis(&self.tau_ts);
        let max_u = max_axis(&self.u_ts);
        let max_wl = max_axis(&depth);
        let min_wl = depth.fold_axis(Axis(1), f64::INFINITY, |acc, &x| acc.min(x));
        let bl = self.bl_ts.column(steps - 1).to_owned();

        if self.updates == 0 {
            self.max_tau_prev = max_tau.clone();
            self.max_u_prev = max_u.clone();
            self.max_wl_prev = max_wl.clone();
            self.min_wl_prev = min_wl.clone();
            self.bl_prev = bl.clone();
        } else {
            self.max_tau_prev = std::mem::replace(&mut self.max_tau, Array1::zeros(0));
            self.max_u_prev = std::mem::replace(&mut self.max_u, Array1::zeros(0));
            self.max_wl_prev = std::mem::replace(&mut self.max_wl, Array1::zeros(0));
            self.min_wl_prev = std::mem::replace(&mut self.min_wl, Array1::zeros(0));
            self.bl_prev = std::mem::replace(&mut self.bl, Array1::zeros(0));
        }
        self.max_tau = max_tau;
        self.max_u = max_u;
        self.max_wl = max_wl;
        self.min_wl = min_wl;
        self.bl = bl;

        let flooded = depth.mapv(|d| if d > fl_dr { 1.0 } else { 0.0 });
        self.fl_frac = flooded.sum_axis(Axis(1)) / steps as f64;
        self.dry_frac = self.fl_frac.mapv(|f| 1.0 - f);
        self.updates += 1;
        Ok(())
    }

    /// 定殖的淹没判据：高水时淹没且低水时干出
    pub fn inundation_criterion(&self) -> Vec<bool> {
        Zip::from(&self.max_wl)
            .and(&self.min_wl)
            .map_collect(|&max, &min| {
                let flooded_high = (max > 0.0) as i32;
                let flooded_low = (min > 0.0) as i32;
                flooded_high - flooded_low == 1
            })
            .to_vec()
    }
}

fn max_axis(matrix: &Array2<f64>) -> Array1<f64> {
    matrix.fold_axis(Axis(1), f64::NEG_INFINITY, |acc, &x| acc.max(x))
}

/// 水动力-地貌过程
#[derive(Debug, Clone)]
pub struct HydroMorphodynamics {
    /// 本生态时间步的时间序列
    pub series: HydroMorphoSeries,
}

impl HydroMorphodynamics {
    /// 创建
    pub fn new(series: HydroMorphoSeries) -> Self {
        Self { series }
    }

    /// 更新植被的水动力-地貌状态
    pub fn update(&self, veg: &mut Vegetation) -> BiotaResult<()> {
        let fl_dr = veg.constants.fl_dr;
        veg.hydro.update(&self.series, fl_dr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2 个网格、4 个时刻：单元 0 潮间带，单元 1 始终淹没
    fn series(bed: [f64; 2]) -> HydroMorphoSeries {
        let wl: [f64; 4] = [-0.5, 0.5, 1.0, 0.0];
        HydroMorphoSeries {
            tau: Array2::from_shape_fn((2, 4), |(i, t)| 0.1 * (i + t) as f64),
            velocity: Array2::from_shape_fn((2, 4), |(_, t)| 0.1 * t as f64),
            water_level: Array2::from_shape_fn((2, 4), |(i, t)| wl[t].max(bed[i])),
            bed_level: Array2::from_shape_fn((2, 4), |(i, _)| bed[i]),
        }
    }

    #[test]
    fn test_statistics() {
        let mut state = HydroMorphoState::new(2);
        state.update(&series([0.0, -2.0]), 0.05).unwrap();
        assert!((state.max_tau[1] - 0.4).abs() < 1e-12);
        assert!((state.max_u[0] - 0.3).abs() < 1e-12);
        assert!((state.max_wl[0] - 1.0).abs() < 1e-12);
        assert_eq!(state.min_wl[0], 0.0);
        assert!((state.min_wl[1] - 1.5).abs() < 1e-12);
        // 单元 0 在 2 个时刻淹没
        assert!((state.fl_frac[0] - 0.5).abs() < 1e-12);
        assert!((state.dry_frac[1]).abs() < 1e-12);
        assert_eq!(state.bed_level_change().to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_previous_values_shift() {
        let mut state = HydroMorphoState::new(2);
        state.update(&series([0.0, -2.0]), 0.05).unwrap();
        state.update(&series([0.1, -2.0]), 0.05).unwrap();
        assert_eq!(state.updates(), 2);
        assert_eq!(state.bl_prev[0], 0.0);
        assert!((state.bed_level_change()[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_inundation_criterion() {
        let mut state = HydroMorphoState::new(2);
        state.update(&series([0.0, -2.0]), 0.05).unwrap();
        assert_eq!(state.inundation_criterion(), vec![true, false]);
    }

    #[test]
    fn test_space_mismatch() {
        let mut state = HydroMorphoState::new(3);
        assert!(state.update(&series([0.0, 0.0]), 0.05).is_err());
    }
}

// crates/nbs_biota/src/coral/photosynthesis.rs

//! 光合作用
//!
//! 光合速率为光照依赖、温度依赖和流速依赖三者之积：
//!
//! ```text
//! photo_rate = pld · ptd · pfd
//! ```
//!
//! 温度依赖使用热适应：耐受区间 [Tlo, Thi] 取自前若干年的
//! 月平均温度极值（MMM）。

use ndarray::{Array1, Array2};
use tracing::debug;

use super::model::Coral;
use crate::error::{BiotaError, BiotaResult};

/// 光合作用过程
#[derive(Debug, Clone)]
pub struct Photosynthesis {
    /// 水面入射光强 [µE m-2 s-1]，逐日
    pub light_in: Vec<f64>,
    /// 每年的 (年, 月平均温度最小值, 月平均温度最大值) [K]
    pub temp_mmm: Vec<(i32, f64, f64)>,
    /// 当前年份
    pub year: i32,
}

/// 热适应结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalRange {
    /// 下限 [K]
    pub tlo: f64,
    /// 上限 [K]
    pub thi: f64,
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

impl Photosynthesis {
    /// 创建
    pub fn new(light_in: Vec<f64>, temp_mmm: Vec<(i32, f64, f64)>, year: i32) -> Self {
        Self {
            light_in,
            temp_mmm,
            year,
        }
    }

    /// 计算光合速率，写入 `coral.photo_rate`、`coral.tlo`、`coral.thi`
    pub fn photo_rate(&self, coral: &mut Coral) -> BiotaResult<()> {
        let (space, time) = coral.light.dim();
        BiotaError::check_len("light_in", time, self.light_in.len())?;
        if coral.temp.dim() != (space, time) {
            return Err(BiotaError::MissingState("temp"));
        }

        let pld = self.light_dependency(coral);
        let range = self.thermal_acclimation(coral)?;
        let ptd = self.thermal_dependency(coral, range);
        let pfd = self.flow_dependency(coral);

        coral.photo_rate =
            Array2::from_shape_fn((space, time), |(i, t)| pld[[i, t]] * ptd[[i, t]] * pfd[i]);
        coral.tlo = Array1::from_elem(space, range.tlo);
        coral.thi = Array1::from_elem(space, range.thi);
        Ok(())
    }

    /// 光照依赖（准稳态光适应）
    pub fn light_dependency(&self, coral: &Coral) -> Array2<f64> {
        let k = &coral.constants;
        let (space, time) = coral.light.dim();
        Array2::from_shape_fn((space, time), |(i, t)| {
            let i0 = self.light_in[t];
            let light = coral.light[[i, t]];
            if i0 <= 0.0 {
                return 0.0;
            }
            let ratio = (light / i0).max(0.0);
            let ik = k.ik_max * ratio.powf(k.beta_i);
            if ik <= 0.0 {
                return 0.0;
            }
            let pmax = k.pm_max * ratio.powf(k.beta_p);
            pmax * ((light / ik).tanh() - (k.i_comp * i0 / ik).tanh())
        })
    }

    /// 热适应：前 `nn / Csp` 年的 MMM 均值与标准差
    ///
    /// 无历史数据时使用当年的 MMM。
    pub fn thermal_acclimation(&self, coral: &Coral) -> BiotaResult<ThermalRange> {
        let k = &coral.constants;
        let span = (k.nn / coral.species_constant).max(1.0).round() as i32;
        let history: Vec<&(i32, f64, f64)> = self
            .temp_mmm
            .iter()
            .filter(|(y, _, _)| *y >= self.year - span && *y < self.year)
            .collect();
        let history = if history.is_empty() {
            debug!("年份 {} 之前没有温度记录, 以当年 MMM 进行热适应", self.year);
            self.temp_mmm
                .iter()
                .filter(|(y, _, _)| *y == self.year)
                .collect()
        } else {
            history
        };
        if history.is_empty() {
            return Err(BiotaError::MissingEnvironment(format!(
                "年份 {} 没有月平均温度",
                self.year
            )));
        }

        let mins: Vec<f64> = history.iter().map(|(_, lo, _)| *lo).collect();
        let maxs: Vec<f64> = history.iter().map(|(_, _, hi)| *hi).collect();
        let (mean_min, std_min) = mean_std(&mins);
        let (mean_max, std_max) = mean_std(&maxs);
        Ok(ThermalRange {
            tlo: mean_min - k.k_var * std_min,
            thi: mean_max + k.k_var * std_max,
        })
    }

    /// 温度依赖：适应后的温度响应 × 特异性 × 热包络
    pub fn thermal_dependency(&self, coral: &Coral, range: ThermalRange) -> Array2<f64> {
        let k = &coral.constants;
        let sqrt3 = 3f64.sqrt();
        let delta = range.thi - range.tlo;
        let topt = range.tlo + delta / sqrt3;
        let specialisation = 4e-4 * (-0.33 * (delta - 10.0)).exp();
        let envelope = ((k.ea / k.r) * (1.0 / 300.0 - 1.0 / topt)).exp();
        let floor = -2.0 * delta.powi(3) / (3.0 * sqrt3);

        coral.temp.mapv(|temp| {
            let x = temp - range.tlo;
            let response = if temp <= range.tlo - delta / sqrt3 {
                floor
            } else {
                -x * (x * x - delta * delta)
            };
            response * specialisation * envelope
        })
    }

    /// 流速依赖
    pub fn flow_dependency(&self, coral: &Coral) -> Array1<f64> {
        let k = &coral.constants;
        if !k.pfd {
            return Array1::ones(coral.space());
        }
        coral
            .ucm
            .mapv(|ucm| k.pfd_min + (1.0 - k.pfd_min) * (2.0 * ucm / k.ucr).tanh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coral::model::CoralMorphology;
    use nbs_config::CoralConstants;

    fn coral(time: usize) -> Coral {
        let mut c = Coral::new(CoralConstants::default(), CoralMorphology::default(), 1.0, 1);
        c.light = Array2::from_elem((1, time), 300.0);
        c.temp = Array2::from_elem((1, time), 300.0);
        c.ucm = Array1::from(vec![0.2]);
        c
    }

    fn mmm() -> Vec<(i32, f64, f64)> {
        vec![(1999, 297.0, 302.0), (2000, 298.0, 303.0)]
    }

    #[test]
    fn test_acclimation_uses_previous_years() {
        let c = coral(1);
        let ps = Photosynthesis::new(vec![600.0], mmm(), 2000);
        let range = ps.thermal_acclimation(&c).unwrap();
        // 仅 1999 一年：标准差为 0
        assert!((range.tlo - 297.0).abs() < 1e-12);
        assert!((range.thi - 302.0).abs() < 1e-12);
    }

    #[test]
    fn test_acclimation_first_year_falls_back() {
        let c = coral(1);
        let ps = Photosynthesis::new(vec![600.0], mmm(), 1999);
        let range = ps.thermal_acclimation(&c).unwrap();
        assert!((range.tlo - 297.0).abs() < 1e-12);
    }

    #[test]
    fn test_acclimation_with_spread() {
        let c = coral(1);
        let ps = Photosynthesis::new(vec![600.0], mmm(), 2001);
        let range = ps.thermal_acclimation(&c).unwrap();
        // mean 297.5, std 0.5
        let k_var = c.constants.k_var;
        assert!((range.tlo - (297.5 - k_var * 0.5)).abs() < 1e-12);
        assert!((range.thi - (302.5 + k_var * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_acclimation_without_data() {
        let c = coral(1);
        let ps = Photosynthesis::new(vec![600.0], vec![], 2000);
        assert!(ps.thermal_acclimation(&c).is_err());
    }

    #[test]
    fn test_thermal_dependency_shape() {
        let mut c = coral(3);
        c.temp = Array2::from_shape_vec((1, 3), vec![297.5, 300.0, 310.0]).unwrap();
        let ps = Photosynthesis::new(vec![600.0; 3], mmm(), 2000);
        let range = ThermalRange {
            tlo: 297.0,
            thi: 302.0,
        };
        let ptd = ps.thermal_dependency(&c, range);
        assert!(ptd[[0, 0]] > 0.0);
        assert!(ptd[[0, 1]] > 0.0);
        // 超出上限时为负（白化）
        assert!(ptd[[0, 2]] < 0.0);
    }

    #[test]
    fn test_light_dependency_positive() {
        let c = coral(1);
        let ps = Photosynthesis::new(vec![600.0], mmm(), 2000);
        let pld = ps.light_dependency(&c);
        assert!(pld[[0, 0]] > 0.0);
        assert!(pld[[0, 0]] <= c.constants.pm_max);

        let dark = Photosynthesis::new(vec![0.0], mmm(), 2000);
        assert_eq!(dark.light_dependency(&c)[[0, 0]], 0.0);
    }

    #[test]
    fn test_flow_dependency() {
        let mut c = coral(1);
        let ps = Photosynthesis::new(vec![600.0], mmm(), 2000);
        let pfd = ps.flow_dependency(&c);
        assert!(pfd[0] > c.constants.pfd_min && pfd[0] < 1.0);
        c.constants.pfd = false;
        assert_eq!(ps.flow_dependency(&c)[0], 1.0);
    }

    #[test]
    fn test_photo_rate_fills_state() {
        let mut c = coral(2);
        let ps = Photosynthesis::new(vec![600.0, 600.0], mmm(), 2000);
        ps.photo_rate(&mut c).unwrap();
        assert_eq!(c.photo_rate.dim(), (1, 2));
        assert!(c.photo_rate[[0, 0]] > 0.0);
        assert!((c.tlo[0] - 297.0).abs() < 1e-12);
    }
}

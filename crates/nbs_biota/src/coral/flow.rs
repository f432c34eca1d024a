// crates/nbs_biota/src/coral/flow.rs

//! 流动微环境
//!
//! 冠层内流速由波浪和水流的衰减系数决定：波浪衰减系数以复数
//! Newton 迭代求解，水流衰减系数有解析解。

use std::f64::consts::PI;

use nbs_config::CoralConstants;
use ndarray::Array1;
use num_complex::Complex64;
use tracing::debug;

use super::model::Coral;
use crate::error::{BiotaError, BiotaResult};

/// 关闭流动微环境时使用的冠层内流速 [m s-1]
pub const UCM_DISABLED: f64 = 9999.0;

/// 流动过程
#[derive(Debug, Clone)]
pub struct Flow {
    /// 水流流速 [m s-1]
    pub uc: Array1<f64>,
    /// 波浪轨道速度 [m s-1]
    pub uw: Array1<f64>,
    /// 水深 [m]
    pub h: Array1<f64>,
    /// 波周期 [s]
    pub tp: Array1<f64>,
}

/// 冠层几何参数
#[derive(Debug, Clone, Copy)]
struct Canopy {
    /// 平面面积比
    lambda_p: f64,
    /// 剪切长度
    shear_length: f64,
    /// 拖曳长度
    drag_length: f64,
}

impl Canopy {
    fn new(constants: &CoralConstants, dc: f64, dc_rep: f64, hc: f64, ac: f64) -> Option<Self> {
        if ac <= 0.0 || hc <= 0.0 {
            return None;
        }
        let area = 0.5 * ac * ac;
        let lambda_p = 0.25 * PI * dc * dc / area;
        let lambda_f = dc_rep * hc / area;
        if lambda_f <= 0.0 || lambda_p >= 1.0 {
            return None;
        }
        Some(Self {
            lambda_p,
            shear_length: hc / (constants.cs * constants.cs),
            drag_length: 2.0 * hc * (1.0 - lambda_p) / (constants.cf * lambda_f),
        })
    }
}

impl Flow {
    /// 创建，所有数组长度需一致
    pub fn new(
        uc: Array1<f64>,
        uw: Array1<f64>,
        h: Array1<f64>,
        tp: Array1<f64>,
    ) -> BiotaResult<Self> {
        let n = uc.len();
        BiotaError::check_len("wave_vel", n, uw.len())?;
        BiotaError::check_len("water_depth", n, h.len())?;
        BiotaError::check_len("wave_per", n, tp.len())?;
        Ok(Self { uc, uw, h, tp })
    }

    /// 波浪与水流的合成流速
    fn wave_current(&self, constants: &CoralConstants, i: usize, alpha_w: f64, alpha_c: f64) -> f64 {
        let w = alpha_w * self.uw[i];
        let c = alpha_c * self.uc[i];
        (w * w + c * c + 2.0 * w * c * constants.wc_angle.cos())
            .max(0.0)
            .sqrt()
    }

    /// 冠层内与冠层上方的流速，写入 `coral.ucm` 与 `coral.um`
    pub fn velocities(&self, coral: &mut Coral, in_canopy: bool) -> BiotaResult<()> {
        BiotaError::check_len("space", coral.space(), self.uc.len())?;
        let constants = coral.constants.clone();
        let dc_rep = coral.dc_rep();
        let n = self.uc.len();

        let mut ucm = Array1::zeros(n);
        let mut um = Array1::zeros(n);
        for i in 0..n {
            um[i] = self.wave_current(&constants, i, 1.0, 1.0);
            ucm[i] = if !constants.fme {
                UCM_DISABLED
            } else if in_canopy {
                let canopy = Canopy::new(&constants, coral.dc[i], dc_rep[i], coral.hc[i], coral.ac[i]);
                let alpha_w = canopy
                    .map(|c| self.wave_attenuation(&constants, c, i))
                    .unwrap_or(1.0);
                let alpha_c = canopy
                    .map(|c| self.current_attenuation(c, coral.hc[i], i))
                    .unwrap_or(1.0);
                self.wave_current(&constants, i, alpha_w, alpha_c)
            } else {
                um[i]
            };
        }

        coral.ucm = ucm;
        coral.um = um;
        Ok(())
    }

    /// 波浪衰减系数：复数 Newton 迭代求解 |β|
    fn wave_attenuation(&self, constants: &CoralConstants, canopy: Canopy, i: usize) -> f64 {
        if self.h[i] <= 0.0 || self.uw[i] <= 0.0 || self.tp[i] <= 0.0 {
            return 1.0;
        }
        let above_motion = self.uw[i] * self.tp[i] / (2.0 * PI);
        let c = 8.0 * above_motion / (3.0 * PI);
        let Canopy {
            lambda_p,
            shear_length: ls,
            drag_length: ld,
        } = canopy;
        let im = Complex64::i();
        let inertia = im * constants.cm * lambda_p / (1.0 - lambda_p);
        let one = Complex64::new(1.0, 0.0);

        let mut beta = Complex64::new(0.1, 0.1);
        for iteration in 0..constants.max_iter_aw {
            let one_minus = one - beta;
            let f = im * (beta - one) - c / ls * one_minus.norm() * one_minus
                + c / ld * beta.norm() * beta
                + beta * inertia;
            let df = im
                + c * (-(one_minus * one_minus / one_minus.norm() - one_minus.norm()) / ls
                    + (beta * beta / beta.norm() + beta) / ld)
                + inertia;
            let next = beta - f / df;
            if !next.re.is_finite() || !next.im.is_finite() {
                debug!("波浪衰减迭代发散 (cell {i}), 取 1");
                return 1.0;
            }
            let converged = (next - beta).norm() <= constants.err;
            beta = next;
            if converged {
                debug!("波浪衰减在 {} 次迭代后收敛 (cell {i})", iteration + 1);
                break;
            }
        }
        beta.norm()
    }

    /// 水流衰减系数
    fn current_attenuation(&self, canopy: Canopy, hc: f64, i: usize) -> f64 {
        let h = self.h[i];
        if h <= hc {
            return 1.0;
        }
        let x = canopy.drag_length / canopy.shear_length * (hc / (h - hc) + 1.0);
        if (x - 1.0).abs() < f64::EPSILON || x <= 0.0 {
            return 1.0;
        }
        (x - x.sqrt()) / (x - 1.0)
    }

    /// 热边界层厚度，写入 `coral.delta_t`
    pub fn thermal_boundary_layer(&self, coral: &mut Coral) {
        let constants = &coral.constants;
        if !(constants.fme && constants.tme) {
            return;
        }
        let (rd, nu, alpha) = (constants.rd, constants.nu, constants.alpha);
        coral.delta_t = coral.ucm.mapv(|ucm| {
            if ucm > 0.0 {
                rd * nu / ucm * (alpha / nu).cbrt()
            } else {
                0.0
            }
        });
    }
}

// crates/nbs_biota/src/coral/model.rs

//! 珊瑚群体状态
//!
//! 形态以五个参数描述（均为每个网格单元一个值）：
//!
//! ```text
//!        |<--- dc --->|
//!        +------------+   ---
//!        |   plate    |  tc |
//!        +--+------+--+     | hc
//!           | base |        |
//!           |<-bc->|        |
//!  ---------+------+-------------
//!  |<--------- ac --------->|      (群体间距)
//! ```
//!
//! 过程（光照、流动、温度……）读取并写回 [`Coral`] 的状态字段。

use std::f64::consts::PI;

use nbs_config::CoralConstants;
use nbs_hydro::HydroCoupling;
use ndarray::{s, Array1, Array2, Array3, Axis, Zip};

use crate::error::{BiotaError, BiotaResult};

/// 种群状态数：健康、恢复、苍白、白化
pub const NUM_POP_STATES: usize = 4;

/// 初始形态（标量，广播到所有网格）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoralMorphology {
    /// 板径 [m]
    pub dc: f64,
    /// 群体高度 [m]
    pub hc: f64,
    /// 基部直径 [m]
    pub bc: f64,
    /// 板厚 [m]
    pub tc: f64,
    /// 群体间距 [m]
    pub ac: f64,
}

impl Default for CoralMorphology {
    fn default() -> Self {
        Self {
            dc: 0.2,
            hc: 0.3,
            bc: 0.1,
            tc: 0.15,
            ac: 0.3,
        }
    }
}

/// 珊瑚
#[derive(Debug, Clone)]
pub struct Coral {
    /// 模型常数
    pub constants: CoralConstants,
    /// 物种常数 Csp [-]
    pub species_constant: f64,

    /// 板径 [m]
    pub dc: Array1<f64>,
    /// 群体高度 [m]
    pub hc: Array1<f64>,
    /// 基部直径 [m]
    pub bc: Array1<f64>,
    /// 板厚 [m]
    pub tc: Array1<f64>,
    /// 群体间距 [m]
    pub ac: Array1<f64>,
    /// 覆盖度（承载能力）[-]
    pub cover: Array1<f64>,

    // ========================================================================
    // 过程状态
    // ========================================================================
    /// 代表性光强 [µE m-2 s-1] (space × time)
    pub light: Array2<f64>,
    /// 受光生物量 [m2] (space × time)
    pub light_bc: Array2<f64>,
    /// 冠层内流速 [m s-1]
    pub ucm: Array1<f64>,
    /// 冠层上方流速 [m s-1]
    pub um: Array1<f64>,
    /// 热边界层厚度 [m]
    pub delta_t: Array1<f64>,
    /// 珊瑚组织温升 [K] (space × time)
    pub dtc: Array2<f64>,
    /// 珊瑚温度 [K] (space × time)
    pub temp: Array2<f64>,
    /// 热耐受下限 [K]
    pub tlo: Array1<f64>,
    /// 热耐受上限 [K]
    pub thi: Array1<f64>,
    /// 光合速率 [-] (space × time)
    pub photo_rate: Array2<f64>,
    /// 种群状态 (space × time × 4)
    pub pop_states: Array3<f64>,
    /// 上一时刻的种群状态 (space × 4)
    pub p0: Array2<f64>,
    /// 钙化速率 [kg m-2 d-1] (space × time)
    pub calc: Array2<f64>,
}

impl Coral {
    /// 以标量形态创建 `space` 个网格上的珊瑚
    pub fn new(
        constants: CoralConstants,
        morphology: CoralMorphology,
        species_constant: f64,
        space: usize,
    ) -> Self {
        let full = |v: f64| Array1::from_elem(space, v);
        Self {
            constants,
            species_constant,
            dc: full(morphology.dc),
            hc: full(morphology.hc),
            bc: full(morphology.bc),
            tc: full(morphology.tc),
            ac: full(morphology.ac),
            cover: full(1.0),
            light: Array2::zeros((space, 0)),
            light_bc: Array2::zeros((space, 0)),
            ucm: full(0.0),
            um: full(0.0),
            delta_t: full(0.0),
            dtc: Array2::zeros((space, 0)),
            temp: Array2::zeros((space, 0)),
            tlo: full(0.0),
            thi: full(0.0),
            photo_rate: Array2::zeros((space, 0)),
            pop_states: Array3::zeros((space, 0, NUM_POP_STATES)),
            p0: Array2::zeros((space, NUM_POP_STATES)),
            calc: Array2::zeros((space, 0)),
        }
    }

    /// 网格单元数
    pub fn space(&self) -> usize {
        self.dc.len()
    }

    /// 以覆盖度初始化：无覆盖处形态置零，种群全部为健康状态
    pub fn initiate_coral_morphology(&mut self, cover: &Array1<f64>) -> BiotaResult<()> {
        BiotaError::check_len("cover", self.space(), cover.len())?;
        for (i, &c) in cover.iter().enumerate() {
            if c <= 0.0 {
                self.dc[i] = 0.0;
                self.hc[i] = 0.0;
                self.bc[i] = 0.0;
                self.tc[i] = 0.0;
                self.ac[i] = 0.0;
            }
        }
        self.cover = cover.clone();
        self.p0 = Array2::zeros((self.space(), NUM_POP_STATES));
        self.p0.column_mut(0).assign(cover);
        Ok(())
    }

    /// 由体积与形态比重建形态
    pub fn update_morphology(
        &mut self,
        volume: &Array1<f64>,
        rf: &Array1<f64>,
        rp: &Array1<f64>,
        rs: &Array1<f64>,
    ) -> BiotaResult<()> {
        let n = self.space();
        for (name, len) in [
            ("volume", volume.len()),
            ("rf", rf.len()),
            ("rp", rp.len()),
            ("rs", rs.len()),
        ] {
            BiotaError::check_len(name, n, len)?;
        }

        for i in 0..n {
            let dc = (4.0 * volume[i] / (PI * rf[i] * rp[i] * (1.0 + rp[i] - rp[i] * rp[i])))
                .cbrt();
            let dc = if dc.is_finite() { dc } else { 0.0 };
            self.dc[i] = dc;
            self.hc[i] = rf[i] * dc;
            self.bc[i] = rp[i] * dc;
            self.tc[i] = rp[i] * self.hc[i];
            self.ac[i] = if rs[i] > 0.0 { dc / rs[i] } else { 0.0 };
        }
        Ok(())
    }

    // ========================================================================
    // 派生量
    // ========================================================================

    /// 群体体积 [m3]
    pub fn volume(&self) -> Array1<f64> {
        Zip::from(&self.dc)
            .and(&self.hc)
            .and(&self.bc)
            .and(&self.tc)
            .map_collect(|&dc, &hc, &bc, &tc| 0.25 * PI * ((hc - tc) * bc * bc + tc * dc * dc))
    }

    /// 代表性直径 [m]
    pub fn dc_rep(&self) -> Array1<f64> {
        Zip::from(&self.dc)
            .and(&self.hc)
            .and(&self.bc)
            .and(&self.tc)
            .map_collect(|&dc, &hc, &bc, &tc| {
                if hc > 0.0 {
                    (bc * (hc - tc) + dc * tc) / hc
                } else {
                    0.0
                }
            })
    }

    /// 形态比 hc/dc
    pub fn rf(&self) -> Array1<f64> {
        ratio(&self.hc, &self.dc)
    }

    /// 板比 bc/dc
    pub fn rp(&self) -> Array1<f64> {
        ratio(&self.bc, &self.dc)
    }

    /// 间距比 dc/ac
    pub fn rs(&self) -> Array1<f64> {
        ratio(&self.dc, &self.ac)
    }

    /// 作为植被时的密度 [m-2]
    pub fn as_vegetation_density(&self) -> Array1<f64> {
        Zip::from(&self.dc_rep())
            .and(&self.ac)
            .map_collect(|&d, &a| if a > 0.0 { 2.0 * d / (a * a) } else { 0.0 })
    }

    /// 当前活珊瑚总量（四种状态之和）
    pub fn living_cover(&self) -> Array1<f64> {
        self.p0.sum_axis(Axis(1))
    }

    /// 末日的健康种群，尚无逐日状态时取当前状态
    pub fn last_healthy(&self) -> Array1<f64> {
        match self.pop_states.dim().1 {
            0 => self.p0.column(0).to_owned(),
            t => self.pop_states.slice(s![.., t - 1, 0]).to_owned(),
        }
    }

    /// 单元是否有珊瑚
    pub fn is_present(&self) -> Vec<bool> {
        self.cover.iter().map(|&c| c > 0.0).collect()
    }
}

fn ratio(a: &Array1<f64>, b: &Array1<f64>) -> Array1<f64> {
    Zip::from(a)
        .and(b)
        .map_collect(|&a, &b| if b > 0.0 { a / b } else { 0.0 })
}

impl HydroCoupling for Coral {
    fn vegetation_density(&self) -> Array1<f64> {
        self.as_vegetation_density()
    }

    fn stem_diameter(&self) -> Array1<f64> {
        self.dc_rep()
    }

    fn stem_height(&self) -> Array1<f64> {
        self.hc.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coral(space: usize) -> Coral {
        Coral::new(CoralConstants::default(), CoralMorphology::default(), 1.0, space)
    }

    #[test]
    fn test_derived_quantities() {
        let c = coral(1);
        // V = π/4 · ((0.3 - 0.15)·0.1² + 0.15·0.2²)
        let expected = 0.25 * PI * (0.15 * 0.01 + 0.15 * 0.04);
        assert!((c.volume()[0] - expected).abs() < 1e-12);
        // dc_rep = (0.1·0.15 + 0.2·0.15) / 0.3
        assert!((c.dc_rep()[0] - 0.15).abs() < 1e-12);
        assert!((c.rf()[0] - 1.5).abs() < 1e-12);
        assert!((c.rp()[0] - 0.5).abs() < 1e-12);
        assert!((c.rs()[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((c.as_vegetation_density()[0] - 2.0 * 0.15 / 0.09).abs() < 1e-12);
    }

    #[test]
    fn test_initiate_zero_cover() {
        let mut c = coral(2);
        c.initiate_coral_morphology(&Array1::from(vec![1.0, 0.0]))
            .unwrap();
        assert_eq!(c.dc[1], 0.0);
        assert_eq!(c.ac[1], 0.0);
        assert_eq!(c.dc[0], 0.2);
        assert_eq!(c.p0.row(0).to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(c.p0.row(1).to_vec(), vec![0.0; 4]);
        assert_eq!(c.as_vegetation_density()[1], 0.0);
        assert_eq!(c.dc_rep()[1], 0.0);
    }

    #[test]
    fn test_initiate_length_mismatch() {
        let mut c = coral(2);
        assert!(c
            .initiate_coral_morphology(&Array1::from(vec![1.0]))
            .is_err());
    }

    #[test]
    fn test_update_morphology_preserves_volume() {
        let mut c = coral(1);
        let volume = Array1::from(vec![0.01]);
        let rf = Array1::from(vec![0.8]);
        let rp = Array1::from(vec![0.6]);
        let rs = Array1::from(vec![0.5]);
        c.update_morphology(&volume, &rf, &rp, &rs).unwrap();

        assert!((c.volume()[0] - 0.01).abs() < 1e-12);
        assert!((c.rf()[0] - 0.8).abs() < 1e-12);
        assert!((c.rp()[0] - 0.6).abs() < 1e-12);
        assert!((c.rs()[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_update_morphology_zero_volume() {
        let mut c = coral(1);
        let zero = Array1::from(vec![0.0]);
        c.update_morphology(&zero, &zero, &zero, &zero).unwrap();
        assert_eq!(c.dc[0], 0.0);
        assert_eq!(c.ac[0], 0.0);
    }
}

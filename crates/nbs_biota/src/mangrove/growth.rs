// crates/nbs_biota/src/mangrove/growth.rs

//! 红树林生长（KiWi 模型）
//!
//! ```text
//! dD/dt = G·D·(1 − D·H/(Dmax·Hmax)) / (274 + 3·b2·D − 4·b3·D²) · I · C
//! ```
//!
//! D、H 以 cm 计，速率单位 cm/yr，按生态时间步长度折算。

use nbs_config::MangroveConstants;

use super::model::{height_from_diameter, Mangrove};

/// 胸径生长速率 [cm/yr]，`dia_cm` 与 `height_cm` 以 cm 计
pub fn diameter_rate(k: &MangroveConstants, dia_cm: f64, height_cm: f64, stress: f64) -> f64 {
    let limit = 1.0 - dia_cm * height_cm / (k.max_d * k.max_h);
    let denominator = 274.0 + 3.0 * k.b2 * dia_cm - 4.0 * k.b3 * dia_cm * dia_cm;
    if denominator <= 0.0 {
        return 0.0;
    }
    (k.g * dia_cm * limit / denominator * stress).max(0.0)
}

/// 生长过程
#[derive(Debug, Clone, Copy, Default)]
pub struct MangroveGrowth;

impl MangroveGrowth {
    /// 创建
    pub fn new() -> Self {
        Self
    }

    /// 一个生态时间步的生长
    pub fn update(&self, mangrove: &mut Mangrove) {
        let k = mangrove.constants.clone();
        let step_years = k.ets_duration() / 365.0;
        let stress = &mangrove.last_inundation() * &mangrove.competition;
        let max_d_m = k.max_d / 100.0;

        for ((i, j), dia) in mangrove.stem_dia.indexed_iter_mut() {
            if mangrove.stem_num[[i, j]] <= 0.0 {
                continue;
            }
            let d_cm = *dia * 100.0;
            let h_cm = mangrove.height[[i, j]] * 100.0;
            let rate = diameter_rate(&k, d_cm, h_cm, stress[i]);
            *dia = (*dia + rate * step_years / 100.0).min(max_d_m);
            mangrove.height[[i, j]] = height_from_diameter(&k, *dia);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn planted() -> Mangrove {
        let mut m = Mangrove::new(MangroveConstants::default(), 2);
        m.initiate(&Array1::from(vec![1.0, 1.0])).unwrap();
        m.inundation = ndarray::Array2::from_shape_vec((2, 1), vec![1.0, 0.0]).unwrap();
        m
    }

    #[test]
    fn test_rate_formula() {
        let k = MangroveConstants::default();
        let h = 137.0 + k.b2 - k.b3;
        let expected = k.g * (1.0 - h / (k.max_d * k.max_h)) / (274.0 + 3.0 * k.b2 - 4.0 * k.b3);
        assert!((diameter_rate(&k, 1.0, h, 1.0) - expected).abs() < 1e-12);
        assert_eq!(diameter_rate(&k, 1.0, h, 0.0), 0.0);
    }

    #[test]
    fn test_growth_scaled_by_stress() {
        let mut m = planted();
        let before = m.stem_dia.clone();
        MangroveGrowth::new().update(&mut m);
        assert!(m.stem_dia[[0, 0]] > before[[0, 0]]);
        // I = 0 时不生长
        assert_eq!(m.stem_dia[[1, 0]], before[[1, 0]]);
        let k = &m.constants;
        assert!((m.height[[0, 0]] - height_from_diameter(k, m.stem_dia[[0, 0]])).abs() < 1e-12);
    }

    #[test]
    fn test_diameter_capped() {
        let mut m = planted();
        m.stem_dia[[0, 0]] = 1.399;
        m.height[[0, 0]] = 5.0;
        MangroveGrowth::new().update(&mut m);
        assert!(m.stem_dia[[0, 0]] <= 1.4 + 1e-12);
    }
}

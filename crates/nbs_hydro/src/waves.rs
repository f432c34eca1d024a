// crates/nbs_hydro/src/waves.rs

//! 波浪近底轨道速度
//!
//! Soulsby (2006) 对 JONSWAP 谱的显式近似：
//!
//! ```text
//! Tz = Tp / 1.28
//! Tn = sqrt(h / g),  t = Tn / Tz
//! A  = (6500 + (0.56 + 15.54 t)^6)^(1/6)
//! Urms = (0.25 Hs / Tn) / (1 + A t²)³
//! ```

/// 重力加速度
const G: f64 = 9.81;

/// 峰值周期与跨零周期之比
const TP_TZ_RATIO: f64 = 1.28;

/// 最小水深 [m]
pub const MIN_DEPTH: f64 = 0.1;

/// 近底均方根轨道速度 [m s-1]
pub fn soulsby_orbital_velocity(wave_height: f64, peak_period: f64, depth: f64) -> f64 {
    if wave_height <= 0.0 || peak_period <= 0.0 {
        return 0.0;
    }
    let h = depth.max(MIN_DEPTH);
    let tz = peak_period / TP_TZ_RATIO;
    let tn = (h / G).sqrt();
    let t = tn / tz;
    let a = (6500.0 + (0.56 + 15.54 * t).powi(6)).powf(1.0 / 6.0);
    (0.25 * wave_height / tn) / (1.0 + a * t * t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_waves() {
        assert_eq!(soulsby_orbital_velocity(0.0, 8.0, 5.0), 0.0);
        assert_eq!(soulsby_orbital_velocity(1.0, 0.0, 5.0), 0.0);
    }

    #[test]
    fn test_decreases_with_depth() {
        let shallow = soulsby_orbital_velocity(1.0, 8.0, 2.0);
        let deep = soulsby_orbital_velocity(1.0, 8.0, 20.0);
        assert!(shallow > deep);
        assert!(deep > 0.0);
    }

    #[test]
    fn test_increases_with_height() {
        let low = soulsby_orbital_velocity(0.5, 6.0, 5.0);
        let high = soulsby_orbital_velocity(1.0, 6.0, 5.0);
        assert!((high - 2.0 * low).abs() < 1e-12);
    }

    #[test]
    fn test_minimum_depth() {
        let a = soulsby_orbital_velocity(1.0, 6.0, 0.0);
        let b = soulsby_orbital_velocity(1.0, 6.0, MIN_DEPTH);
        assert!((a - b).abs() < 1e-12);
    }
}

// crates/nbs_biota/src/coral/calcification.rs

//! 钙化

use ndarray::Array2;

use super::model::Coral;
use crate::error::{BiotaError, BiotaResult};

/// 钙化过程
#[derive(Debug, Clone, Default)]
pub struct Calcification;

impl Calcification {
    /// 创建
    pub fn new() -> Self {
        Self
    }

    /// 文石饱和度依赖 `(Ω − Ω0) / (κA + Ω − Ω0)`
    pub fn aragonite_dependency(&self, coral: &Coral, omega: f64) -> f64 {
        let k = &coral.constants;
        let excess = omega - k.omega0;
        excess / (k.kappa_a + excess)
    }

    /// 钙化速率 `G = g_c·Csp·PH·ac(Ω)·photo_rate`，写入 `coral.calc`
    pub fn calcification_rate(&self, coral: &mut Coral, omega: &[f64]) -> BiotaResult<()> {
        let (space, time, _) = coral.pop_states.dim();
        BiotaError::check_len("aragonite", time, omega.len())?;
        if coral.photo_rate.dim() != (space, time) {
            return Err(BiotaError::MissingState("photo_rate"));
        }

        let factor = coral.constants.g_c * coral.species_constant;
        let dependency: Vec<f64> = omega
            .iter()
            .map(|&o| self.aragonite_dependency(coral, o))
            .collect();
        coral.calc = Array2::from_shape_fn((space, time), |(i, t)| {
            factor * coral.pop_states[[i, t, 0]] * dependency[t] * coral.photo_rate[[i, t]]
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coral::model::CoralMorphology;
    use nbs_config::CoralConstants;
    use ndarray::Array3;

    #[test]
    fn test_calcification_rate() {
        let mut c = Coral::new(CoralConstants::default(), CoralMorphology::default(), 1.0, 2);
        c.pop_states = Array3::zeros((2, 2, 4));
        c.pop_states[[0, 0, 0]] = 1.0;
        c.pop_states[[0, 1, 0]] = 0.5;
        c.photo_rate = Array2::from_elem((2, 2), 0.8);

        let calc = Calcification::new();
        calc.calcification_rate(&mut c, &[5.0, 5.0]).unwrap();

        let k = &c.constants;
        let ac = (5.0 - k.omega0) / (k.kappa_a + 5.0 - k.omega0);
        assert!((c.calc[[0, 0]] - k.g_c * ac * 0.8).abs() < 1e-12);
        assert!((c.calc[[0, 1]] - k.g_c * 0.5 * ac * 0.8).abs() < 1e-12);
        assert_eq!(c.calc[[1, 0]], 0.0);
    }

    #[test]
    fn test_undersaturated_water_dissolves() {
        let c = Coral::new(CoralConstants::default(), CoralMorphology::default(), 1.0, 1);
        assert!(Calcification::new().aragonite_dependency(&c, 0.1) < 0.0);
    }

    #[test]
    fn test_wrong_aragonite_length() {
        let mut c = Coral::new(CoralConstants::default(), CoralMorphology::default(), 1.0, 1);
        c.pop_states = Array3::zeros((1, 3, 4));
        c.photo_rate = Array2::zeros((1, 3));
        assert!(Calcification::new()
            .calcification_rate(&mut c, &[5.0])
            .is_err());
    }
}

// crates/nbs_biota/src/coral/temperature.rs

//! 热微环境：珊瑚组织温度

use nbs_foundation::{DataReshape, Dim, SpaceTime};
use ndarray::Array2;

use super::model::Coral;
use crate::error::{BiotaError, BiotaResult};

/// 温度过程
#[derive(Debug, Clone)]
pub struct Temperature {
    /// 海水温度 [K] (space × time)
    pub temperature: Array2<f64>,
}

impl Temperature {
    /// 由逐日水温（K）创建
    pub fn new(spacetime: SpaceTime, temperature: &[f64]) -> BiotaResult<Self> {
        let reshape = DataReshape::new(spacetime);
        Ok(Self {
            temperature: reshape.variable2matrix(temperature, Dim::Time)?,
        })
    }

    /// 珊瑚温度 `T + ΔTc`，`ΔTc = δt·ap/(k·K0)·Iz`
    ///
    /// 关闭热微环境时珊瑚温度即水温。
    pub fn coral_temperature(&self, coral: &mut Coral) -> BiotaResult<()> {
        let (space, time) = self.temperature.dim();
        BiotaError::check_len("space", coral.space(), space)?;

        let constants = &coral.constants;
        if !constants.tme {
            coral.dtc = Array2::zeros((space, time));
            coral.temp = self.temperature.clone();
            return Ok(());
        }
        if coral.light.dim() != (space, time) {
            return Err(BiotaError::MissingState("light"));
        }

        let factor = constants.ap / (constants.k * constants.k0);
        let dtc = Array2::from_shape_fn((space, time), |(i, t)| {
            coral.delta_t[i] * factor * coral.light[[i, t]]
        });
        coral.temp = &self.temperature + &dtc;
        coral.dtc = dtc;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coral::model::CoralMorphology;
    use nbs_config::CoralConstants;
    use ndarray::Array1;

    fn coral() -> Coral {
        Coral::new(CoralConstants::default(), CoralMorphology::default(), 1.0, 1)
    }

    #[test]
    fn test_thermal_micro_environment() {
        let mut c = coral();
        c.light = Array2::from_elem((1, 2), 500.0);
        c.delta_t = Array1::from(vec![1e-3]);
        let temp = Temperature::new(SpaceTime::new(1, 2), &[300.0, 301.0]).unwrap();
        temp.coral_temperature(&mut c).unwrap();

        let k = &c.constants;
        let dtc = 1e-3 * k.ap / (k.k * k.k0) * 500.0;
        assert!((c.dtc[[0, 0]] - dtc).abs() < 1e-12);
        assert!((c.temp[[0, 1]] - (301.0 + dtc)).abs() < 1e-12);
    }

    #[test]
    fn test_without_thermal_micro_environment() {
        let mut c = coral();
        c.constants.tme = false;
        let temp = Temperature::new(SpaceTime::new(1, 2), &[300.0, 301.0]).unwrap();
        temp.coral_temperature(&mut c).unwrap();
        assert_eq!(c.temp[[0, 1]], 301.0);
        assert_eq!(c.dtc[[0, 0]], 0.0);
    }

    #[test]
    fn test_requires_light() {
        let mut c = coral();
        let temp = Temperature::new(SpaceTime::new(1, 2), &[300.0, 301.0]).unwrap();
        assert!(matches!(
            temp.coral_temperature(&mut c),
            Err(BiotaError::MissingState("light"))
        ));
    }
}

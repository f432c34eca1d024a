// crates/nbs_biota/src/mangrove/colonisation.rs

//! 红树林定殖
//!
//! 与盐沼植被相同的潮间带淹没判据；只在无红树林的网格上放置新年龄组
//! （`ini_num` 株，胸径 `ini_dia`）。

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::model::{height_from_diameter, Mangrove};

/// 定殖过程
#[derive(Debug, Clone)]
pub struct MangroveColonisation {
    rng: StdRng,
}

impl Default for MangroveColonisation {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MangroveColonisation {
    /// 创建；给定 `seed` 时随机定殖可复现
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// 可定殖单元
    pub fn col_location(&mut self, mangrove: &Mangrove) -> Vec<usize> {
        let stems = mangrove.total_stems();
        let candidates: Vec<usize> = mangrove
            .hydro
            .inundation_criterion()
            .into_iter()
            .enumerate()
            .filter_map(|(i, ok)| (ok && stems[i] <= 0.0).then_some(i))
            .collect();
        let random = mangrove.constants.random;
        if random <= 0.0 || candidates.is_empty() {
            return candidates;
        }
        let amount = ((candidates.len() as f64 / random).round() as usize).min(candidates.len());
        let mut picked: Vec<usize> =
            rand::seq::index::sample(&mut self.rng, candidates.len(), amount)
                .into_iter()
                .map(|k| candidates[k])
                .collect();
        picked.sort_unstable();
        picked
    }

    /// 在可定殖单元放置新年龄组
    pub fn update(&mut self, mangrove: &mut Mangrove) {
        let cells = self.col_location(mangrove);
        if cells.is_empty() {
            return;
        }
        let k = &mangrove.constants;
        let space = mangrove.space();
        let (mut num, mut dia, mut height) =
            (Array1::zeros(space), Array1::zeros(space), Array1::zeros(space));
        let h0 = height_from_diameter(k, k.ini_dia);
        for &i in &cells {
            num[i] = k.ini_num;
            dia[i] = k.ini_dia;
            height[i] = h0;
        }
        mangrove.prepend_cohort(&num, &dia, &height);
        mangrove.update_competition();
        debug!("{}: {} 个单元定殖", mangrove.constants.species, cells.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbs_config::MangroveConstants;
    use nbs_hydro::HydroMorphoSeries;
    use ndarray::Array2;

    /// 3 个单元：0、1 潮间带，2 始终淹没
    fn mangrove() -> Mangrove {
        let mut m = Mangrove::new(MangroveConstants::default(), 3);
        let bed: [f64; 3] = [0.0, 0.3, -2.0];
        let wl: [f64; 2] = [-1.0, 1.0];
        let series = HydroMorphoSeries {
            tau: Array2::zeros((3, 2)),
            velocity: Array2::zeros((3, 2)),
            water_level: Array2::from_shape_fn((3, 2), |(i, t)| wl[t].max(bed[i])),
            bed_level: Array2::from_shape_fn((3, 2), |(i, _)| bed[i]),
        };
        m.hydro.update(&series, 0.0).unwrap();
        m
    }

    #[test]
    fn test_new_cohort_on_bare_intertidal_cells() {
        let mut m = mangrove();
        MangroveColonisation::new(Some(3)).update(&mut m);
        assert_eq!(m.cohorts(), 1);
        assert_eq!(m.total_stems().to_vec(), vec![750.0, 750.0, 0.0]);
        assert!((m.stem_dia[[0, 0]] - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_occupied_cells_not_recolonised() {
        let mut m = mangrove();
        let mut col = MangroveColonisation::new(Some(3));
        col.update(&mut m);
        col.update(&mut m);
        assert_eq!(m.cohorts(), 1);
    }
}

// crates/nbs_biota/src/vegetation/colonisation.rs

//! 植被定殖
//!
//! 只在高水时淹没、低水时干出的潮间带单元可定殖；`random > 0` 时从候选
//! 单元中随机保留 `round(n / random)` 个。剩余空间不少于 `ini_col_frac`
//! 的单元获得当年幼苗。两个物种竞争同一单元时，若
//! `f1 + f2 > 1`，各自的定殖比例按 `1/(f1 + f2)` 缩放。

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::model::Vegetation;

/// 定殖过程
#[derive(Debug, Clone)]
pub struct Colonisation {
    rng: StdRng,
}

impl Default for Colonisation {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Colonisation {
    /// 创建；给定 `seed` 时随机定殖可复现
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// 可定殖单元（满足淹没判据，可能随机抽取）
    pub fn col_location(&mut self, veg: &Vegetation) -> Vec<usize> {
        let candidates: Vec<usize> = veg
            .hydro
            .inundation_criterion()
            .into_iter()
            .enumerate()
            .filter_map(|(i, ok)| ok.then_some(i))
            .collect();
        let random = veg.constants.random;
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

    /// 单物种定殖
    pub fn update(&mut self, veg: &mut Vegetation) {
        let locations = self.col_location(veg);
        let cover = veg.total_cover();
        let limit = 1.0 - veg.constants.ini_col_frac;
        let cells: Vec<usize> = locations
            .into_iter()
            .filter(|&i| cover[i] <= limit)
            .collect();
        seed(veg, &cells, 1.0);
        debug!("{}: {} 个单元定殖", veg.species(), cells.len());
    }

    /// 两个物种竞争定殖
    pub fn update_pair(&mut self, first: &mut Vegetation, second: &mut Vegetation) {
        let cover = first.total_cover() + second.total_cover();
        let loc1 = self.col_location(first);
        let loc2 = self.col_location(second);
        let cells1: Vec<usize> = loc1
            .into_iter()
            .filter(|&i| cover[i] <= 1.0 - first.constants.ini_col_frac)
            .collect();
        let cells2: Vec<usize> = loc2
            .into_iter()
            .filter(|&i| cover[i] <= 1.0 - second.constants.ini_col_frac)
            .collect();

        let combined = first.constants.ini_col_frac + second.constants.ini_col_frac;
        if combined > 1.0 {
            let scale = 1.0 / combined;
            let (shared1, own1): (Vec<usize>, Vec<usize>) =
                cells1.iter().copied().partition(|i| cells2.contains(i));
            let (shared2, own2): (Vec<usize>, Vec<usize>) =
                cells2.iter().copied().partition(|i| cells1.contains(i));
            seed(first, &own1, 1.0);
            seed(first, &shared1, scale);
            seed(second, &own2, 1.0);
            seed(second, &shared2, scale);
        } else {
            seed(first, &cells1, 1.0);
            seed(second, &cells2, 1.0);
        }
        debug!(
            "{} / {}: {} / {} 个单元定殖",
            first.species(),
            second.species(),
            cells1.len(),
            cells2.len()
        );
    }
}

fn seed(veg: &mut Vegetation, cells: &[usize], scale: f64) {
    let k = &veg.constants;
    let initial = &mut veg.initial;
    for &i in cells {
        initial.veg_frac[[i, 0]] = k.ini_col_frac * scale;
        initial.veg_height[[i, 0]] = k.ini_shoot;
        initial.stem_dia[[i, 0]] = k.ini_dia;
        initial.root_len[[i, 0]] = k.ini_root;
        initial.stem_num[[i, 0]] = k.num_stem[0];
        initial.veg_age[[i, 0]] = 0.0;
    }
}

// crates/nbs_biota/src/mangrove/mortality.rs

//! 红树林死亡
//!
//! 每个生态时间步记录淹没胁迫 `I = a·P² + b·P + c` 与竞争胁迫
//! `C = 1/(1 + exp(d·(B05 − B)))`。`C·mean(I) ≤ 0.5` 的网格生长受抑；
//! 年末累计受抑年数，达到 [`MORT_LIMIT`] 的网格逐轮移除植株，直到胁迫
//! 解除（标记回到 `MORT_LIMIT − 1`）或植株全部死亡。

use ndarray::{Array1, Array2};
use tracing::{debug, warn};

use super::model::Mangrove;

/// 触发移除植株的累计受抑年数
pub const MORT_LIMIT: u32 = 5;

/// 胁迫阈值
const STRESS_THRESHOLD: f64 = 0.5;

/// 单次年末处理的最大移除轮数
const MAX_ROUNDS: usize = 10_000;

/// 死亡过程
#[derive(Debug, Clone, Copy, Default)]
pub struct MangroveMortality;

impl MangroveMortality {
    /// 创建
    pub fn new() -> Self {
        Self
    }

    /// 第 `ets` 个生态时间步的更新
    pub fn update(&self, mangrove: &mut Mangrove, ets: usize) {
        if ets == 0 {
            mangrove.inundation = Array2::zeros((mangrove.space(), 0));
        }
        let marks = determine_stress(mangrove);
        if ets + 1 == mangrove.constants.t_eco_year {
            for (m, &mark) in mangrove.mort.iter_mut().zip(&marks) {
                if mark {
                    *m += 1;
                }
            }
            remove_stressed(mangrove);
        }
    }
}

/// 记录本步胁迫，返回生长受抑的网格
pub fn determine_stress(mangrove: &mut Mangrove) -> Vec<bool> {
    let k = &mangrove.constants;
    let current = mangrove.inun_rel.mapv(|p| k.inundation_stress(p));
    push_column(mangrove, &current);
    mangrove.update_competition();
    (&mangrove.competition * &mangrove.mean_inundation())
        .iter()
        .map(|&s| s <= STRESS_THRESHOLD)
        .collect()
}

fn push_column(mangrove: &mut Mangrove, column: &Array1<f64>) {
    let old = std::mem::replace(&mut mangrove.inundation, Array2::zeros((0, 0)));
    let (space, n) = (column.len(), old.ncols());
    mangrove.inundation = Array2::from_shape_fn((space, n + 1), |(i, j)| {
        if j < n {
            old[[i, j]]
        } else {
            column[i]
        }
    });
}

/// 移除累计受抑达到上限的网格中的植株
fn remove_stressed(mangrove: &mut Mangrove) {
    let mut rounds = 0;
    while mangrove.mort.iter().any(|&m| m >= MORT_LIMIT) {
        if rounds == MAX_ROUNDS {
            warn!("红树林死亡处理达到最大轮数 {}", MAX_ROUNDS);
            break;
        }
        rounds += 1;

        let stems = mangrove.total_stems();
        for (m, &n) in mangrove.mort.iter_mut().zip(&stems) {
            if *m >= MORT_LIMIT && n <= 0.0 {
                *m = 0;
            }
        }
        let marked: Vec<usize> = (0..mangrove.space())
            .filter(|&i| mangrove.mort[i] >= MORT_LIMIT)
            .collect();
        if marked.is_empty() {
            break;
        }

        // 最近一步淹没胁迫低的网格按平均淹没胁迫的倒数分配移除株数
        let last = mangrove.last_inundation();
        let mean = mangrove.mean_inundation();
        let (flooded, other): (Vec<usize>, Vec<usize>) =
            marked.iter().copied().partition(|&i| last[i] <= STRESS_THRESHOLD);
        let inverse_sum: f64 = flooded
            .iter()
            .filter(|&&i| mean[i] > 0.0)
            .map(|&i| 1.0 / mean[i])
            .sum();
        let mort_plant = mangrove.constants.mort_plant;
        for &i in &flooded {
            if mean[i] <= 0.0 {
                remove_from_cell(mangrove, i, f64::INFINITY);
            } else {
                let share = (mort_plant / (mean[i] * inverse_sum)).round();
                remove_from_cell(mangrove, i, share);
            }
        }
        for &i in &other {
            remove_from_cell(mangrove, i, mort_plant);
        }

        mangrove.update_competition();
        let stress = &mangrove.competition * &mean;
        let stems = mangrove.total_stems();
        for &i in &marked {
            if stems[i] <= 0.0 {
                mangrove.mort[i] = 0;
            } else if stress[i] > STRESS_THRESHOLD {
                mangrove.mort[i] = MORT_LIMIT - 1;
            }
        }
    }
    mangrove.clear_dead();
    debug!("红树林年末死亡处理 {} 轮", rounds);
}

/// 从网格 `i` 的每个年龄组移除 `count` 株（至少 1 株，不超过现有株数）
fn remove_from_cell(mangrove: &mut Mangrove, i: usize, count: f64) {
    let count = count.max(1.0);
    for n in mangrove.stem_num.row_mut(i) {
        *n = (*n - count).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbs_config::MangroveConstants;

    fn planted(inun_rel: f64) -> Mangrove {
        let mut m = Mangrove::new(MangroveConstants::default(), 2);
        m.initiate(&Array1::from(vec![1.0, 1.0])).unwrap();
        m.inun_rel = Array1::from_elem(2, inun_rel);
        m
    }

    #[test]
    fn test_stress_history_resets_each_year() {
        let mut m = planted(0.25);
        let mortality = MangroveMortality::new();
        for ets in 0..3 {
            mortality.update(&mut m, ets);
        }
        assert_eq!(m.inundation.ncols(), 3);
        mortality.update(&mut m, 0);
        assert_eq!(m.inundation.ncols(), 1);
    }

    #[test]
    fn test_favourable_conditions_not_marked() {
        // P = 0.25 → I = 1，幼苗生物量小 → C ≈ 1
        let mut m = planted(0.25);
        let marks = determine_stress(&mut m);
        assert_eq!(marks, vec![false, false]);
    }

    #[test]
    fn test_marks_accumulate_at_year_end() {
        // P = 1 → I = 0
        let mut m = planted(1.0);
        let mortality = MangroveMortality::new();
        let last = m.constants.t_eco_year - 1;
        mortality.update(&mut m, last);
        assert_eq!(m.mort.to_vec(), vec![1, 1]);
        assert_eq!(m.total_stems()[0], 750.0);
    }

    #[test]
    fn test_persistent_stress_kills_all() {
        let mut m = planted(1.0);
        m.mort.fill(MORT_LIMIT - 1);
        let last = m.constants.t_eco_year - 1;
        MangroveMortality::new().update(&mut m, last);
        assert_eq!(m.total_stems().to_vec(), vec![0.0, 0.0]);
        assert_eq!(m.mort.to_vec(), vec![0, 0]);
        assert_eq!(m.cohorts(), 0);
    }

    #[test]
    fn test_moderate_stress_thins_stand() {
        // P = 0.6 → I = -2.88 + 2.4 + 0.5 = 0.02：最近一步淹没胁迫低，逐轮移除
        let mut m = planted(0.6);
        m.mort[0] = MORT_LIMIT - 1;
        let last = m.constants.t_eco_year - 1;
        MangroveMortality::new().update(&mut m, last);
        assert!(m.total_stems()[0] < 750.0);
        assert_eq!(m.total_stems()[1], 750.0);
        assert!(m.mort[0] < MORT_LIMIT);
    }
}

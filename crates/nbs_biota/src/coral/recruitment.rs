// crates/nbs_biota/src/coral/recruitment.rs

//! 幼体补充：产卵与定居

use ndarray::Array1;

use super::model::Coral;
use crate::error::BiotaResult;

/// 补充量类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recruit {
    /// 珊瑚虫（种群）
    Polyps,
    /// 体积
    Volume,
}

impl Recruit {
    fn power(self) -> i32 {
        match self {
            Self::Polyps => 2,
            Self::Volume => 3,
        }
    }
}

/// 补充过程
#[derive(Debug, Clone, Default)]
pub struct Recruitment;

impl Recruitment {
    /// 创建
    pub fn new() -> Self {
        Self
    }

    /// 各网格的补充量
    ///
    /// 潜在补充量乘以全域平均健康种群，再按剩余空间比例分配。
    pub fn spawning(&self, coral: &Coral, recruit: Recruit) -> Array1<f64> {
        let k = &coral.constants;
        let potential = k.prob_settle * k.no_larvae * k.d_larvae.powi(recruit.power());
        let healthy = coral.last_healthy();
        let averaged_healthy = if healthy.is_empty() {
            0.0
        } else {
            healthy.sum() / healthy.len() as f64
        };
        let living = coral.living_cover();

        Array1::from_shape_fn(coral.space(), |i| {
            let cover = coral.cover[i];
            if cover > 0.0 {
                potential * averaged_healthy * (1.0 - living[i] / cover)
            } else {
                0.0
            }
        })
    }

    /// 更新种群与形态
    pub fn update(&self, coral: &mut Coral) -> BiotaResult<()> {
        let polyps = self.spawning(coral, Recruit::Polyps);
        let volume = self.spawning(coral, Recruit::Volume);

        for (i, p) in polyps.iter().enumerate() {
            coral.p0[[i, 0]] += p;
        }
        let new_volume = coral.volume() + &volume;
        let (rf, rp, rs) = (coral.rf(), coral.rp(), coral.rs());
        coral.update_morphology(&new_volume, &rf, &rp, &rs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coral::model::CoralMorphology;
    use nbs_config::CoralConstants;

    fn coral() -> Coral {
        let mut c = Coral::new(CoralConstants::default(), CoralMorphology::default(), 1.0, 2);
        c.initiate_coral_morphology(&Array1::from(vec![1.0, 0.0]))
            .unwrap();
        c
    }

    #[test]
    fn test_full_cover_no_space_for_recruits() {
        let c = coral();
        let r = Recruitment::new().spawning(&c, Recruit::Polyps);
        assert_eq!(r[0], 0.0);
        assert_eq!(r[1], 0.0);
    }

    #[test]
    fn test_recruits_fill_free_space() {
        let mut c = coral();
        c.p0[[0, 0]] = 0.5;
        let k = &c.constants;
        let potential = k.prob_settle * k.no_larvae * k.d_larvae.powi(2);
        let r = Recruitment::new().spawning(&c, Recruit::Polyps);
        // 平均健康种群 (0.5 + 0) / 2
        assert!((r[0] - potential * 0.25 * 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_update_grows_volume() {
        let mut c = coral();
        c.p0[[0, 0]] = 0.5;
        let before = c.volume()[0];
        Recruitment::new().update(&mut c).unwrap();
        assert!(c.p0[[0, 0]] > 0.5);
        assert!(c.volume()[0] > before);
        assert_eq!(c.volume()[1], 0.0);
    }
}

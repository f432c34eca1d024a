// crates/nbs_biota/src/vegetation/life_stages.rs

//! 植被生命阶段
//!
//! 每个阶段保存 (space × cohort) 矩阵，列为年龄组（新的在前）。
//! 初始阶段只有一列，存放当年定殖的幼苗。

use ndarray::{Array1, Array2, Axis};

/// 生命阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeStage {
    /// 当年定殖的幼苗
    Initial,
    /// 幼年
    Juvenile,
    /// 成年
    Mature,
}

impl LifeStage {
    /// 物种常数中 `[juvenile, mature]` 数组的索引
    pub fn param_index(&self) -> usize {
        match self {
            Self::Initial | Self::Juvenile => 0,
            Self::Mature => 1,
        }
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Juvenile => "juvenile",
            Self::Mature => "mature",
        }
    }
}

/// 一个生命阶段的全部年龄组
#[derive(Debug, Clone, PartialEq)]
pub struct LifeStages {
    /// 阶段
    pub stage: LifeStage,
    /// 覆盖比例 [-]
    pub veg_frac: Array2<f64>,
    /// 株高 [m]
    pub veg_height: Array2<f64>,
    /// 茎径 [m]
    pub stem_dia: Array2<f64>,
    /// 根长 [m]
    pub root_len: Array2<f64>,
    /// 茎密度 [m-2]
    pub stem_num: Array2<f64>,
    /// 年龄 [yr]
    pub veg_age: Array2<f64>,
}

impl LifeStages {
    /// `space` 个网格、`cohorts` 个空年龄组
    pub fn new(stage: LifeStage, space: usize, cohorts: usize) -> Self {
        let zeros = || Array2::zeros((space, cohorts));
        Self {
            stage,
            veg_frac: zeros(),
            veg_height: zeros(),
            stem_dia: zeros(),
            root_len: zeros(),
            stem_num: zeros(),
            veg_age: zeros(),
        }
    }

    /// 网格单元数
    pub fn space(&self) -> usize {
        self.veg_frac.nrows()
    }

    /// 年龄组数
    pub fn cohorts(&self) -> usize {
        self.veg_frac.ncols()
    }

    /// 各网格的覆盖比例之和
    pub fn cover(&self) -> Array1<f64> {
        self.veg_frac.sum_axis(Axis(1))
    }

    /// 是否没有任何覆盖
    pub fn is_empty(&self) -> bool {
        self.veg_frac.iter().all(|&f| f <= 0.0)
    }

    fn fields(&self) -> [&Array2<f64>; 6] {
        [
            &self.veg_frac,
            &self.veg_height,
            &self.stem_dia,
            &self.root_len,
            &self.stem_num,
            &self.veg_age,
        ]
    }

    fn fields_mut(&mut self) -> [&mut Array2<f64>; 6] {
        [
            &mut self.veg_frac,
            &mut self.veg_height,
            &mut self.stem_dia,
            &mut self.root_len,
            &mut self.stem_num,
            &mut self.veg_age,
        ]
    }

    /// 覆盖为零处清空其余属性
    pub fn clear_dead(&mut self) {
        let dead = self.veg_frac.mapv(|f| f <= 0.0);
        for field in self.fields_mut() {
            ndarray::Zip::from(field).and(&dead).for_each(|v, &d| {
                if d {
                    *v = 0.0;
                }
            });
        }
    }

    /// 全部清零（保留形状）
    pub fn reset(&mut self) {
        for field in self.fields_mut() {
            field.fill(0.0);
        }
    }

    /// 删除全空的年龄组
    pub fn drop_empty_cohorts(&mut self) {
        let keep: Vec<usize> = (0..self.cohorts())
            .filter(|&j| self.veg_frac.column(j).iter().any(|&f| f > 0.0))
            .collect();
        if keep.len() == self.cohorts() {
            return;
        }
        for field in self.fields_mut() {
            *field = field.select(Axis(1), &keep);
        }
    }

    /// 把另一阶段的年龄组放在最前
    pub fn prepend(&mut self, other: &LifeStages) {
        let space = self.space();
        let (n_new, n_old) = (other.cohorts(), self.cohorts());
        let sources = other.fields();
        for (field, source) in self.fields_mut().into_iter().zip(sources) {
            let old = std::mem::replace(field, Array2::zeros((0, 0)));
            *field = Array2::from_shape_fn((space, n_new + n_old), |(i, j)| {
                if j < n_new {
                    source[[i, j]]
                } else {
                    old[[i, j - n_new]]
                }
            });
        }
    }

    /// 取出满足条件（按单元、年龄组）的部分，作为 `stage` 阶段返回
    ///
    /// 被取出的条目在本阶段中清零。
    pub fn split_off(&mut self, stage: LifeStage, take: impl Fn(f64) -> bool) -> LifeStages {
        let mask = self
            .veg_frac
            .indexed_iter()
            .map(|((i, j), &f)| f > 0.0 && take(self.veg_age[[i, j]]))
            .collect::<Vec<bool>>();
        let shape = self.veg_frac.raw_dim();
        let mut taken = LifeStages::new(stage, shape[0], shape[1]);
        for (src, dst) in self.fields_mut().into_iter().zip(taken.fields_mut()) {
            for ((s, d), &m) in src.iter_mut().zip(dst.iter_mut()).zip(&mask) {
                if m {
                    *d = *s;
                    *s = 0.0;
                }
            }
        }
        taken
    }

    /// 移除年龄满足条件的条目，其余属性随覆盖一并清零
    pub fn remove_where(&mut self, remove: impl Fn(f64) -> bool) {
        ndarray::Zip::from(&mut self.veg_frac)
            .and(&self.veg_age)
            .for_each(|f, &a| {
                if *f > 0.0 && remove(a) {
                    *f = 0.0;
                }
            });
        self.clear_dead();
    }

    /// 存活条目的年龄加一
    pub fn age(&mut self, years: f64) {
        ndarray::Zip::from(&mut self.veg_age)
            .and(&self.veg_frac)
            .for_each(|a, &f| {
                if f > 0.0 {
                    *a += years;
                }
            });
    }

    /// 按覆盖比例加权的属性之和 Σ(attr·frac)
    pub fn weighted_sum(&self, attribute: &Array2<f64>) -> Array1<f64> {
        (attribute * &self.veg_frac).sum_axis(Axis(1))
    }
}

/// 多个阶段按覆盖比例加权的平均属性，无覆盖处为 0
pub fn weighted_mean(
    stages: &[&LifeStages],
    attribute: impl Fn(&LifeStages) -> &Array2<f64>,
) -> Array1<f64> {
    let Some(first) = stages.first() else {
        return Array1::zeros(0);
    };
    let space = first.space();
    let mut total = Array1::<f64>::zeros(space);
    let mut cover = Array1::<f64>::zeros(space);
    for stage in stages {
        total += &stage.weighted_sum(attribute(stage));
        cover += &stage.cover();
    }
    ndarray::Zip::from(&total)
        .and(&cover)
        .map_collect(|&t, &c| if c > 0.0 { t / c } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_with(frac: &[f64], age: f64) -> LifeStages {
        let mut ls = LifeStages::new(LifeStage::Juvenile, frac.len(), 1);
        for (i, &f) in frac.iter().enumerate() {
            ls.veg_frac[[i, 0]] = f;
            ls.veg_height[[i, 0]] = 0.2;
            ls.veg_age[[i, 0]] = age;
        }
        ls
    }

    #[test]
    fn test_param_index() {
        assert_eq!(LifeStage::Initial.param_index(), 0);
        assert_eq!(LifeStage::Juvenile.param_index(), 0);
        assert_eq!(LifeStage::Mature.param_index(), 1);
    }

    #[test]
    fn test_prepend_and_cover() {
        let mut ls = stage_with(&[0.2, 0.0], 1.0);
        ls.prepend(&stage_with(&[0.3, 0.4], 0.0));
        assert_eq!(ls.cohorts(), 2);
        assert_eq!(ls.veg_frac.column(0).to_vec(), vec![0.3, 0.4]);
        assert!((ls.cover()[0] - 0.5).abs() < 1e-12);
        assert_eq!(ls.veg_age[[0, 1]], 1.0);
    }

    #[test]
    fn test_drop_empty_cohorts() {
        let mut ls = stage_with(&[0.2, 0.1], 1.0);
        ls.prepend(&stage_with(&[0.0, 0.0], 0.0));
        assert_eq!(ls.cohorts(), 2);
        ls.drop_empty_cohorts();
        assert_eq!(ls.cohorts(), 1);
        assert_eq!(ls.veg_frac.column(0).to_vec(), vec![0.2, 0.1]);
    }

    #[test]
    fn test_split_off_by_age() {
        let mut ls = stage_with(&[0.2, 0.1], 2.0);
        ls.prepend(&stage_with(&[0.3, 0.0], 0.0));
        let old = ls.split_off(LifeStage::Mature, |age| age >= 2.0);
        assert_eq!(old.stage, LifeStage::Mature);
        assert_eq!(old.veg_frac.column(1).to_vec(), vec![0.2, 0.1]);
        assert_eq!(old.veg_frac.column(0).to_vec(), vec![0.0, 0.0]);
        assert_eq!(ls.veg_frac.column(1).to_vec(), vec![0.0, 0.0]);
        assert_eq!(ls.veg_frac[[0, 0]], 0.3);
    }

    #[test]
    fn test_remove_where_clears_old_cohorts() {
        let mut ls = stage_with(&[0.2, 0.1], 3.0);
        ls.prepend(&stage_with(&[0.3, 0.0], 1.0));
        ls.remove_where(|age| age > 2.0);
        assert_eq!(ls.veg_frac.column(1).to_vec(), vec![0.0, 0.0]);
        assert_eq!(ls.veg_age.column(1).to_vec(), vec![0.0, 0.0]);
        assert_eq!(ls.veg_height[[0, 1]], 0.0);
        assert_eq!(ls.veg_frac[[0, 0]], 0.3);
        assert_eq!(ls.veg_age[[0, 0]], 1.0);
        assert_eq!(ls.cohorts(), 2);
    }

    #[test]
    fn test_clear_dead_and_age() {
        let mut ls = stage_with(&[0.2, 0.0], 1.0);
        ls.clear_dead();
        assert_eq!(ls.veg_height[[1, 0]], 0.0);
        assert_eq!(ls.veg_age[[1, 0]], 0.0);
        ls.age(1.0);
        assert_eq!(ls.veg_age[[0, 0]], 2.0);
        assert_eq!(ls.veg_age[[1, 0]], 0.0);
    }

    #[test]
    fn test_weighted_mean() {
        let a = stage_with(&[0.2, 0.0], 1.0);
        let mut b = stage_with(&[0.2, 0.0], 1.0);
        b.veg_height[[0, 0]] = 0.4;
        let h = weighted_mean(&[&a, &b], |s| &s.veg_height);
        assert!((h[0] - 0.3).abs() < 1e-12);
        assert_eq!(h[1], 0.0);
    }
}

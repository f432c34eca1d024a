// crates/nbs_foundation/src/reshape.rs

//! 时空数据整形
//!
//! 生物过程在 (space × time) 矩阵上计算：行是网格单元，列是一年中的日。
//! `DataReshape` 持有当前的时空维度，负责把标量、空间向量、时间向量
//! 扩展为矩阵，以及把矩阵沿某一维度归约回向量。
//!
//! 维度由每个模拟实例显式持有并传递给各过程，不存在全局单例。

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{NbsError, NbsResult};

/// 时空维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceTime {
    /// 空间维度（网格单元数）
    pub space: usize,
    /// 时间维度（一年中的天数）
    pub time: usize,
}

impl Default for SpaceTime {
    fn default() -> Self {
        Self { space: 1, time: 1 }
    }
}

impl SpaceTime {
    /// 创建时空维度
    pub fn new(space: usize, time: usize) -> Self {
        Self { space, time }
    }

    /// 以元组形式返回
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.space, self.time)
    }
}

/// 向量所对应的维度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    /// 空间维度
    Space,
    /// 时间维度
    Time,
}

/// 矩阵归约方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Conversion {
    /// 平均值
    #[default]
    Mean,
    /// 最大值
    Max,
    /// 最小值
    Min,
    /// 求和
    Sum,
}

/// 时空数据整形器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataReshape {
    spacetime: SpaceTime,
}

impl DataReshape {
    /// 以给定维度创建
    pub fn new(spacetime: SpaceTime) -> Self {
        Self { spacetime }
    }

    /// 当前时空维度
    pub fn spacetime(&self) -> SpaceTime {
        self.spacetime
    }

    /// 设置时空维度
    pub fn set_spacetime(&mut self, spacetime: SpaceTime) {
        self.spacetime = spacetime;
    }

    /// 空间维度
    pub fn space(&self) -> usize {
        self.spacetime.space
    }

    /// 设置空间维度
    pub fn set_space(&mut self, space: usize) {
        self.spacetime.space = space;
    }

    /// 时间维度
    pub fn time(&self) -> usize {
        self.spacetime.time
    }

    /// 设置时间维度
    pub fn set_time(&mut self, time: usize) {
        self.spacetime.time = time;
    }

    /// 将标量或向量转换为一维数组
    pub fn variable2array(values: &[f64]) -> Array1<f64> {
        Array1::from(values.to_vec())
    }

    /// 将变量扩展为 (space × time) 矩阵
    ///
    /// - 长度为 1 的输入被广播到整个矩阵
    /// - `Dim::Space`: 长度必须等于空间维度，沿时间方向复制
    /// - `Dim::Time`: 长度必须等于时间维度，沿空间方向复制
    pub fn variable2matrix(&self, values: &[f64], dim: Dim) -> NbsResult<Array2<f64>> {
        let (space, time) = self.spacetime.as_tuple();

        if values.len() == 1 {
            return Ok(Array2::from_elem((space, time), values[0]));
        }

        match dim {
            Dim::Space => {
                NbsError::check_size("space", space, values.len())?;
                Ok(Array2::from_shape_fn((space, time), |(i, _)| values[i]))
            }
            Dim::Time => {
                NbsError::check_size("time", time, values.len())?;
                Ok(Array2::from_shape_fn((space, time), |(_, j)| values[j]))
            }
        }
    }

    /// 将矩阵沿某一维度归约为向量
    ///
    /// `Dim::Space` 返回每个网格单元的值（沿时间归约），
    /// `Dim::Time` 返回每个时刻的值（沿空间归约）。
    pub fn matrix2array(matrix: &Array2<f64>, dim: Dim, conversion: Conversion) -> Array1<f64> {
        let axis = match dim {
            Dim::Space => Axis(1),
            Dim::Time => Axis(0),
        };
        let n = matrix.len_of(axis).max(1) as f64;
        match conversion {
            Conversion::Sum => matrix.sum_axis(axis),
            Conversion::Mean => matrix.sum_axis(axis) / n,
            Conversion::Max => matrix.fold_axis(axis, f64::NEG_INFINITY, |acc, &x| acc.max(x)),
            Conversion::Min => matrix.fold_axis(axis, f64::INFINITY, |acc, &x| acc.min(x)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spacetime() {
        let reshape = DataReshape::default();
        assert_eq!(reshape.spacetime().as_tuple(), (1, 1));
    }

    #[test]
    fn test_shared_dimensions_follow_updates() {
        let mut reshape = DataReshape::default();
        reshape.set_spacetime(SpaceTime::new(2, 2));
        assert_eq!(reshape.spacetime(), SpaceTime::new(2, 2));
        reshape.set_time(365);
        assert_eq!(reshape.time(), 365);
        assert_eq!(reshape.space(), 2);
    }

    #[test]
    fn test_scalar_broadcast() {
        let reshape = DataReshape::new(SpaceTime::new(3, 4));
        let m = reshape.variable2matrix(&[2.5], Dim::Space).unwrap();
        assert_eq!(m.dim(), (3, 4));
        assert!(m.iter().all(|&x| (x - 2.5).abs() < 1e-12));
    }

    #[test]
    fn test_space_vector_repeated_over_time() {
        let reshape = DataReshape::new(SpaceTime::new(3, 2));
        let m = reshape.variable2matrix(&[1.0, 2.0, 3.0], Dim::Space).unwrap();
        assert_eq!(m[[2, 0]], 3.0);
        assert_eq!(m[[2, 1]], 3.0);
        assert_eq!(m[[0, 1]], 1.0);
    }

    #[test]
    fn test_time_vector_repeated_over_space() {
        let reshape = DataReshape::new(SpaceTime::new(2, 3));
        let m = reshape.variable2matrix(&[1.0, 2.0, 3.0], Dim::Time).unwrap();
        assert_eq!(m[[0, 2]], 3.0);
        assert_eq!(m[[1, 2]], 3.0);
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let reshape = DataReshape::new(SpaceTime::new(2, 3));
        assert!(reshape.variable2matrix(&[1.0, 2.0, 3.0], Dim::Space).is_err());
    }

    #[test]
    fn test_matrix2array_conversions() {
        let m = Array2::from_shape_vec((2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let mean = DataReshape::matrix2array(&m, Dim::Space, Conversion::Mean);
        assert!((mean[0] - 2.0).abs() < 1e-12);
        assert!((mean[1] - 5.0).abs() < 1e-12);
        let max = DataReshape::matrix2array(&m, Dim::Time, Conversion::Max);
        assert_eq!(max.to_vec(), vec![4.0, 5.0, 6.0]);
        let sum = DataReshape::matrix2array(&m, Dim::Space, Conversion::Sum);
        assert_eq!(sum.to_vec(), vec![6.0, 15.0]);
        let min = DataReshape::matrix2array(&m, Dim::Space, Conversion::Min);
        assert_eq!(min.to_vec(), vec![1.0, 4.0]);
    }
}

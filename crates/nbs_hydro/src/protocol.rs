// crates/nbs_hydro/src/protocol.rs

//! 水动力模型接口
//!
//! 生物模型通过 [`HydroCoupling`] 把植被特征提供给水动力模型，
//! 水动力模型通过 [`HydrodynamicProtocol`] 返回流速、波浪和水位。

use glam::DVec2;
use ndarray::{Array1, Array2};

use crate::error::{HydroError, HydroResult};
use crate::mode::HydroMode;

/// 生物对水动力的反馈（每个网格单元一个值）
pub trait HydroCoupling {
    /// 植被密度 [m-1]
    fn vegetation_density(&self) -> Array1<f64>;
    /// 代表茎径 [m]
    fn stem_diameter(&self) -> Array1<f64>;
    /// 茎高 [m]
    fn stem_height(&self) -> Array1<f64>;
}

/// 一次耦合更新的结果
#[derive(Debug, Clone, PartialEq)]
pub struct HydroUpdate {
    /// 流速 [m s-1]
    pub current_vel: Array1<f64>,
    /// 波浪轨道速度 [m s-1]
    pub wave_vel: Array1<f64>,
    /// 波周期 [s]
    pub wave_per: Array1<f64>,
}

/// 一个生态时间步内的水动力-地貌时间序列，均为 (space × steps)
#[derive(Debug, Clone, PartialEq)]
pub struct HydroMorphoSeries {
    /// 床面切应力 [N m-2]
    pub tau: Array2<f64>,
    /// 流速 [m s-1]
    pub velocity: Array2<f64>,
    /// 水位 [m]
    pub water_level: Array2<f64>,
    /// 床面高程 [m]
    pub bed_level: Array2<f64>,
}

impl HydroMorphoSeries {
    /// 空间维度
    pub fn space(&self) -> usize {
        self.tau.nrows()
    }

    /// 时间步数
    pub fn steps(&self) -> usize {
        self.tau.ncols()
    }
}

/// 水动力模型
pub trait HydrodynamicProtocol {
    /// 模式
    fn mode(&self) -> HydroMode;

    /// 设置摘要
    fn settings(&self) -> String;

    /// 网格单元坐标
    fn xy_coordinates(&self) -> &[DVec2];

    /// 网格单元数
    fn space(&self) -> usize {
        self.xy_coordinates().len()
    }

    /// x 坐标
    fn x_coordinates(&self) -> Vec<f64> {
        self.xy_coordinates().iter().map(|p| p.x).collect()
    }

    /// y 坐标
    fn y_coordinates(&self) -> Vec<f64> {
        self.xy_coordinates().iter().map(|p| p.y).collect()
    }

    /// 水深 [m]
    fn water_depth(&self) -> HydroResult<Array1<f64>>;

    /// 输出点标记
    fn outpoint(&self) -> Vec<bool>;

    /// 初始化
    fn initiate(&mut self) -> HydroResult<()>;

    /// 按风暴等级推进并返回流速、波浪
    fn update(&mut self, coupling: &dyn HydroCoupling, storm_category: u8)
        -> HydroResult<HydroUpdate>;

    /// 推进 `n_steps` 个耦合间隔并收集水动力-地貌时间序列
    fn update_hydromorphodynamics(
        &mut self,
        _coupling: &dyn HydroCoupling,
        _n_steps: usize,
    ) -> HydroResult<HydroMorphoSeries> {
        Err(HydroError::NotImplemented {
            mode: self.mode().name(),
            operation: "update_hydromorphodynamics",
        })
    }

    /// 结束
    fn finalise(&mut self) -> HydroResult<()>;
}

/// 没有生物反馈时使用的零耦合
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoCoupling {
    /// 网格单元数
    pub space: usize,
}

impl HydroCoupling for NoCoupling {
    fn vegetation_density(&self) -> Array1<f64> {
        Array1::zeros(self.space)
    }

    fn stem_diameter(&self) -> Array1<f64> {
        Array1::zeros(self.space)
    }

    fn stem_height(&self) -> Array1<f64> {
        Array1::zeros(self.space)
    }
}

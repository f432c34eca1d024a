// crates/nbs_hydro/src/delft3d/model.rs

//! Delft3D（FlowFM / DIMR）耦合
//!
//! FlowFM 以 mdu 文件初始化引擎，DIMR 以 dimr 配置初始化，
//! 并且 DIMR 下所有变量名带 `FlowFM/` 前缀。

use std::path::PathBuf;

use glam::DVec2;
use nbs_config::HydrodynamicsConfig;
use ndarray::{Array1, Array2};
use tracing::{debug, info};

use super::bmi::BmiEngine;
use crate::error::{HydroError, HydroResult};
use crate::mode::HydroMode;
use crate::protocol::{HydroCoupling, HydroMorphoSeries, HydroUpdate, HydrodynamicProtocol};

/// DIMR 下 FlowFM 组件的变量前缀
pub const DIMR_PREFIX: &str = "FlowFM/";

/// Delft3D 内核类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delft3DKind {
    /// 直接运行 D-Flow FM
    FlowFm,
    /// 通过 DIMR 运行
    Dimr,
}

impl Delft3DKind {
    /// 对应的水动力模式
    pub fn mode(&self) -> HydroMode {
        match self {
            Self::FlowFm => HydroMode::FlowFm,
            Self::Dimr => HydroMode::Dimr,
        }
    }

    /// `d3d_home` 下的缺省动态库
    fn default_library(&self) -> &'static str {
        match self {
            Self::FlowFm => "dflowfm/bin/dflowfm.dll",
            Self::Dimr => "dimr/bin/dimr_dll.dll",
        }
    }
}

/// Delft3D 水动力模型
#[derive(Debug)]
pub struct Delft3D<E: BmiEngine> {
    /// 内核类型
    pub kind: Delft3DKind,
    /// 工作目录
    pub working_dir: PathBuf,
    /// mdu 文件
    pub definition_file: Option<PathBuf>,
    /// dimr 配置文件
    pub config_file: Option<PathBuf>,
    /// Delft3D 安装目录
    pub d3d_home: Option<PathBuf>,
    /// 动态库
    pub dll_path: Option<PathBuf>,
    /// 耦合间隔 [s]
    pub update_interval: Option<f64>,
    /// 风暴耦合间隔 [s]
    pub update_interval_storm: Option<f64>,
    engine: E,
    xy: Vec<DVec2>,
    initialized: bool,
}

impl<E: BmiEngine> Delft3D<E> {
    /// 以注入的引擎创建
    pub fn new(kind: Delft3DKind, engine: E) -> Self {
        Self {
            kind,
            working_dir: PathBuf::from("."),
            definition_file: None,
            config_file: None,
            d3d_home: None,
            dll_path: None,
            update_interval: None,
            update_interval_storm: None,
            engine,
            xy: Vec::new(),
            initialized: false,
        }
    }

    /// 用配置补齐尚未设置的字段
    pub fn set_simulation_hydrodynamics(
        &mut self,
        working_dir: impl Into<PathBuf>,
        config: &HydrodynamicsConfig,
    ) {
        self.working_dir = working_dir.into();
        let resolve = |p: &Option<PathBuf>, base: &PathBuf| p.as_ref().map(|p| base.join(p));
        if self.definition_file.is_none() {
            self.definition_file = resolve(&config.definition_file, &self.working_dir);
        }
        if self.config_file.is_none() {
            self.config_file = resolve(&config.config_file, &self.working_dir);
        }
        if self.d3d_home.is_none() {
            self.d3d_home = config.d3d_home.clone();
        }
        if self.dll_path.is_none() {
            self.dll_path = config.dll_path.clone();
        }
        self.update_interval.get_or_insert(config.update_interval);
        self.update_interval_storm
            .get_or_insert(config.update_interval_storm);
    }

    /// 引擎
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// 可变引擎
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// 动态库路径：显式设置的路径，否则由 `d3d_home` 推出
    pub fn library_path(&self) -> Option<PathBuf> {
        self.dll_path.clone().or_else(|| {
            self.d3d_home
                .as_ref()
                .map(|home| home.join(self.kind.default_library()))
        })
    }

    /// 初始化引擎所用的文件
    fn model_file(&self) -> HydroResult<PathBuf> {
        match self.kind {
            Delft3DKind::FlowFm => self
                .definition_file
                .clone()
                .ok_or(HydroError::MissingSetting("definition_file")),
            Delft3DKind::Dimr => self
                .config_file
                .clone()
                .ok_or(HydroError::MissingSetting("config_file")),
        }
    }

    /// 引擎中的变量名
    pub fn variable_name(&self, name: &str) -> String {
        match self.kind {
            Delft3DKind::FlowFm => name.to_string(),
            Delft3DKind::Dimr => format!("{DIMR_PREFIX}{name}"),
        }
    }

    /// 读取变量
    pub fn get_variable(&self, name: &str) -> HydroResult<Vec<f64>> {
        self.engine.get_var(&self.variable_name(name))
    }

    /// 写入变量
    pub fn set_variable(&mut self, name: &str, values: &[f64]) -> HydroResult<()> {
        let name = self.variable_name(name);
        self.engine.set_var(&name, values)
    }

    fn ensure_initiated(&self) -> HydroResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(HydroError::NotInitialized {
                component: "Delft3D",
                hint: "initiate()",
            })
        }
    }

    /// 读取变量的前 `space` 个值
    fn cell_values(&self, name: &str) -> HydroResult<Array1<f64>> {
        let values = self.get_variable(name)?;
        let space = self.xy.len();
        if values.len() < space {
            return Err(HydroError::bmi(format!(
                "{name} 长度 {} 小于网格单元数 {space}",
                values.len()
            )));
        }
        Ok(Array1::from(values[..space].to_vec()))
    }

    /// 读取二维变量 (ndx × n) 的某一列，取前 `space` 行
    fn cell_column(&self, name: &str, column: usize) -> HydroResult<Array1<f64>> {
        let full = self.variable_name(name);
        let shape = self.engine.get_var_shape(&full)?;
        let values = self.engine.get_var(&full)?;
        let ncols = match shape.as_slice() {
            [_, n] => *n,
            _ => return Err(HydroError::bmi(format!("{name} 不是二维变量"))),
        };
        let space = self.xy.len();
        if column >= ncols || values.len() < space * ncols {
            return Err(HydroError::bmi(format!("{name} 形状 {shape:?} 不足")));
        }
        Ok((0..space).map(|i| values[i * ncols + column]).collect())
    }

    /// 把生物特征写入水动力模型
    fn set_vegetation(&mut self, coupling: &dyn HydroCoupling) -> HydroResult<()> {
        let density = coupling.vegetation_density();
        let diameter = coupling.stem_diameter();
        let height = coupling.stem_height();
        self.set_variable("rnveg", &density.to_vec())?;
        self.set_variable("diaveg", &diameter.to_vec())?;
        self.set_variable("stemheight", &height.to_vec())
    }

    /// 清零统计量
    fn reset_counters(&mut self) -> HydroResult<()> {
        for name in ["is_sumvalsnd", "is_maxvalsnd"] {
            let len = self.get_variable(name)?.len();
            self.set_variable(name, &vec![0.0; len])?;
        }
        self.set_variable("is_dtint", &[0.0])
    }

    fn interval(&self, storm: bool) -> f64 {
        let calm = self.update_interval.unwrap_or(300.0);
        if storm {
            self.update_interval_storm.unwrap_or(calm)
        } else {
            calm
        }
    }
}

impl<E: BmiEngine> HydrodynamicProtocol for Delft3D<E> {
    fn mode(&self) -> HydroMode {
        self.kind.mode()
    }

    fn settings(&self) -> String {
        let show = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".into())
        };
        format!(
            "Coupling with Delft3D model ({}) with the following settings:\n\tD3D home = {}\n\tDLL = {}\n\tmdu = {}\n\tconfig = {}",
            self.mode(),
            show(&self.d3d_home),
            show(&self.library_path()),
            show(&self.definition_file),
            show(&self.config_file),
        )
    }

    fn xy_coordinates(&self) -> &[DVec2] {
        &self.xy
    }

    fn water_depth(&self) -> HydroResult<Array1<f64>> {
        self.ensure_initiated()?;
        Ok(self.cell_values("s1")? - self.cell_values("bl")?)
    }

    fn outpoint(&self) -> Vec<bool> {
        self.xy.iter().map(|p| p.x >= 0.0).collect()
    }

    fn initiate(&mut self) -> HydroResult<()> {
        let model_file = self.model_file()?;
        self.engine.initialize(&model_file)?;

        let ndxi = self
            .get_variable("ndxi")?
            .first()
            .copied()
            .ok_or_else(|| HydroError::bmi("ndxi 为空"))?;
        if ndxi < 0.0 || ndxi.fract() != 0.0 {
            return Err(HydroError::bmi(format!("ndxi 无效: {ndxi}")));
        }
        let ndxi = ndxi as usize;
        let x = self.get_variable("xzw")?;
        let y = self.get_variable("yzw")?;
        if x.len() < ndxi || y.len() < ndxi {
            return Err(HydroError::bmi("xzw/yzw 长度小于 ndxi"));
        }
        self.xy = (0..ndxi).map(|i| DVec2::new(x[i], y[i])).collect();
        self.initialized = true;
        info!("{} 初始化: {} 个网格单元", self.mode(), ndxi);
        Ok(())
    }

    fn update(
        &mut self,
        coupling: &dyn HydroCoupling,
        storm_category: u8,
    ) -> HydroResult<HydroUpdate> {
        self.ensure_initiated()?;
        self.set_vegetation(coupling)?;

        let storm = storm_category > 0;
        let interval = self.interval(storm);
        self.engine.update(interval)?;
        debug!("{} 推进 {interval} s (风暴等级 {storm_category})", self.mode());

        let result = if storm {
            HydroUpdate {
                current_vel: self.cell_column("is_maxvalsnd", 1)?,
                wave_vel: self.cell_values("Uorb")?,
                wave_per: self.cell_values("twav")?,
            }
        } else {
            let dtint = self
                .get_variable("is_dtint")?
                .first()
                .copied()
                .unwrap_or(0.0);
            let sum = self.cell_column("is_sumvalsnd", 1)?;
            let current_vel = if dtint > 0.0 { sum / dtint } else { sum };
            HydroUpdate {
                current_vel,
                wave_vel: self.cell_values("Uorb")?,
                wave_per: self.cell_values("twav")?,
            }
        };
        self.reset_counters()?;
        Ok(result)
    }

    fn update_hydromorphodynamics(
        &mut self,
        coupling: &dyn HydroCoupling,
        n_steps: usize,
    ) -> HydroResult<HydroMorphoSeries> {
        self.ensure_initiated()?;
        self.set_vegetation(coupling)?;

        let space = self.xy.len();
        let mut tau = Array2::zeros((space, n_steps));
        let mut velocity = Array2::zeros((space, n_steps));
        let mut water_level = Array2::zeros((space, n_steps));
        let mut bed_level = Array2::zeros((space, n_steps));
        let interval = self.interval(false);
        for step in 0..n_steps {
            self.engine.update(interval)?;
            tau.column_mut(step).assign(&self.cell_values("taus")?);
            velocity.column_mut(step).assign(&self.cell_values("ucmag")?);
            water_level.column_mut(step).assign(&self.cell_values("s1")?);
            bed_level.column_mut(step).assign(&self.cell_values("bl")?);
        }
        debug!("{} 水动力-地貌推进 {n_steps} 步", self.mode());
        Ok(HydroMorphoSeries {
            tau,
            velocity,
            water_level,
            bed_level,
        })
    }

    fn finalise(&mut self) -> HydroResult<()> {
        if self.initialized {
            self.engine.finalize()?;
            self.initialized = false;
        }
        Ok(())
    }
}

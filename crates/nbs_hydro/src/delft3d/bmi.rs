// crates/nbs_hydro/src/delft3d/bmi.rs

//! BMI（Basic Model Interface）计算引擎
//!
//! Delft3D 通过 BMI 以动态库形式嵌入。本 crate 只定义接口，
//! 具体的库绑定由调用方注入；[`MemoryEngine`] 在内存中保存变量，
//! 用于回放预先计算好的水动力场。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{HydroError, HydroResult};

/// BMI 计算引擎
pub trait BmiEngine {
    /// 以模型配置文件初始化
    fn initialize(&mut self, config_file: &Path) -> HydroResult<()>;

    /// 推进 `dt` 秒
    fn update(&mut self, dt: f64) -> HydroResult<()>;

    /// 结束并释放资源
    fn finalize(&mut self) -> HydroResult<()>;

    /// 读取变量（行优先展平）
    fn get_var(&self, name: &str) -> HydroResult<Vec<f64>>;

    /// 变量形状，缺省视为一维
    fn get_var_shape(&self, name: &str) -> HydroResult<Vec<usize>> {
        Ok(vec![self.get_var(name)?.len()])
    }

    /// 写入变量
    fn set_var(&mut self, name: &str, values: &[f64]) -> HydroResult<()>;

    /// 当前模型时间 [s]
    fn get_current_time(&self) -> f64;
}

impl<E: BmiEngine + ?Sized> BmiEngine for Box<E> {
    fn initialize(&mut self, config_file: &Path) -> HydroResult<()> {
        (**self).initialize(config_file)
    }

    fn update(&mut self, dt: f64) -> HydroResult<()> {
        (**self).update(dt)
    }

    fn finalize(&mut self) -> HydroResult<()> {
        (**self).finalize()
    }

    fn get_var(&self, name: &str) -> HydroResult<Vec<f64>> {
        (**self).get_var(name)
    }

    fn get_var_shape(&self, name: &str) -> HydroResult<Vec<usize>> {
        (**self).get_var_shape(name)
    }

    fn set_var(&mut self, name: &str, values: &[f64]) -> HydroResult<()> {
        (**self).set_var(name, values)
    }

    fn get_current_time(&self) -> f64 {
        (**self).get_current_time()
    }
}

/// 内存中的 BMI 引擎
///
/// 变量在 `update` 之间保持不变，模型时间按 `dt` 累加。
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    variables: BTreeMap<String, (Vec<usize>, Vec<f64>)>,
    time: f64,
    config_file: Option<PathBuf>,
    finalized: bool,
}

impl MemoryEngine {
    /// 空引擎
    pub fn new() -> Self {
        Self::default()
    }

    /// 定义变量及其形状
    pub fn with_var(mut self, name: &str, shape: &[usize], values: Vec<f64>) -> Self {
        self.variables
            .insert(name.to_string(), (shape.to_vec(), values));
        self
    }

    /// 初始化时使用的配置文件
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// 是否已结束
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

impl BmiEngine for MemoryEngine {
    fn initialize(&mut self, config_file: &Path) -> HydroResult<()> {
        self.config_file = Some(config_file.to_path_buf());
        self.time = 0.0;
        self.finalized = false;
        Ok(())
    }

    fn update(&mut self, dt: f64) -> HydroResult<()> {
        if self.config_file.is_none() {
            return Err(HydroError::bmi("引擎尚未初始化"));
        }
        self.time += dt;
        Ok(())
    }

    fn finalize(&mut self) -> HydroResult<()> {
        self.finalized = true;
        Ok(())
    }

    fn get_var(&self, name: &str) -> HydroResult<Vec<f64>> {
        self.variables
            .get(name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| HydroError::bmi(format!("未知变量 {name}")))
    }

    fn get_var_shape(&self, name: &str) -> HydroResult<Vec<usize>> {
        self.variables
            .get(name)
            .map(|(s, _)| s.clone())
            .ok_or_else(|| HydroError::bmi(format!("未知变量 {name}")))
    }

    fn set_var(&mut self, name: &str, values: &[f64]) -> HydroResult<()> {
        let shape = self
            .variables
            .get(name)
            .map(|(s, _)| s.clone())
            .unwrap_or_else(|| vec![values.len()]);
        self.variables
            .insert(name.to_string(), (shape, values.to_vec()));
        Ok(())
    }

    fn get_current_time(&self) -> f64 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_engine() {
        let mut engine = MemoryEngine::new().with_var("s1", &[2], vec![1.0, 2.0]);
        assert!(engine.update(10.0).is_err());
        engine.initialize(Path::new("fm/FlowFM.mdu")).unwrap();
        engine.update(300.0).unwrap();
        engine.update(300.0).unwrap();
        assert_eq!(engine.get_current_time(), 600.0);
        assert_eq!(engine.get_var("s1").unwrap(), vec![1.0, 2.0]);
        assert!(engine.get_var("bl").is_err());

        engine.set_var("rnveg", &[0.5, 0.5]).unwrap();
        assert_eq!(engine.get_var_shape("rnveg").unwrap(), vec![2]);
        engine.finalize().unwrap();
        assert!(engine.is_finalized());
    }

    #[test]
    fn test_boxed_engine() {
        let mut engine: Box<dyn BmiEngine> = Box::new(MemoryEngine::new());
        engine.initialize(Path::new("dimr_config.xml")).unwrap();
        engine.set_var("x", &[1.0]).unwrap();
        assert_eq!(engine.get_var("x").unwrap(), vec![1.0]);
    }
}

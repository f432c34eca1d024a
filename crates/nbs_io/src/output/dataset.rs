// crates/nbs_io/src/output/dataset.rs

//! 内存数据集
//!
//! 采用 netCDF 的数据模型：命名维度（至多一个无限维度，作为记录维度
//! 必须是变量的第一维）、带 `long_name`/`units` 的 f64 变量，数据按行优先存储。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{IoError, IoResult};

/// 维度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// 名称
    pub name: String,
    /// 长度
    pub len: usize,
    /// 是否无限
    pub is_unlimited: bool,
}

/// 变量描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableSpec {
    /// 名称
    pub name: &'static str,
    /// 长名称
    pub long_name: &'static str,
    /// 单位
    pub units: &'static str,
}

impl VariableSpec {
    /// 创建
    pub const fn new(name: &'static str, long_name: &'static str, units: &'static str) -> Self {
        Self {
            name,
            long_name,
            units,
        }
    }
}

/// 变量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// 名称
    pub name: String,
    /// 维度名称列表
    pub dimensions: Vec<String>,
    /// 长名称
    pub long_name: String,
    /// 单位
    pub units: String,
    /// 数据（行优先）
    pub data: Vec<f64>,
}

/// 数据集
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// 描述
    pub description: String,
    /// 全局属性
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// 维度
    pub dimensions: Vec<Dimension>,
    /// 变量
    pub variables: Vec<Variable>,
}

impl Dataset {
    /// 创建空数据集
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// 添加固定长度维度
    pub fn add_dimension(&mut self, name: &str, len: usize) -> IoResult<()> {
        self.push_dimension(name, len, false)
    }

    /// 添加无限维度（记录维度）
    pub fn add_unlimited_dimension(&mut self, name: &str) -> IoResult<()> {
        if self.dimensions.iter().any(|d| d.is_unlimited) {
            return Err(IoError::Duplicate(format!("无限维度 {name}")));
        }
        self.push_dimension(name, 0, true)
    }

    fn push_dimension(&mut self, name: &str, len: usize, is_unlimited: bool) -> IoResult<()> {
        if self.dimension(name).is_some() {
            return Err(IoError::Duplicate(name.to_string()));
        }
        self.dimensions.push(Dimension {
            name: name.to_string(),
            len,
            is_unlimited,
        });
        Ok(())
    }

    /// 查找维度
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// 维度长度
    pub fn dim_len(&self, name: &str) -> IoResult<usize> {
        self.dimension(name)
            .map(|d| d.len)
            .ok_or_else(|| IoError::DimensionNotFound(name.to_string()))
    }

    /// 记录数（无限维度长度）
    pub fn num_records(&self) -> usize {
        self.dimensions
            .iter()
            .find(|d| d.is_unlimited)
            .map(|d| d.len)
            .unwrap_or(0)
    }

    /// 添加变量，数据初始化为 0
    pub fn add_variable(&mut self, spec: &VariableSpec, dims: &[&str]) -> IoResult<()> {
        if self.variable(spec.name).is_some() {
            return Err(IoError::Duplicate(spec.name.to_string()));
        }
        for (i, dim) in dims.iter().enumerate() {
            let d = self
                .dimension(dim)
                .ok_or_else(|| IoError::DimensionNotFound(dim.to_string()))?;
            if d.is_unlimited && i != 0 {
                return Err(IoError::DimensionNotFound(format!(
                    "无限维度 {dim} 必须是 {} 的第一维",
                    spec.name
                )));
            }
        }
        let size = dims
            .iter()
            .map(|d| self.dim_len(d))
            .collect::<IoResult<Vec<_>>>()?
            .iter()
            .product();
        self.variables.push(Variable {
            name: spec.name.to_string(),
            dimensions: dims.iter().map(|d| d.to_string()).collect(),
            long_name: spec.long_name.to_string(),
            units: spec.units.to_string(),
            data: vec![0.0; size],
        });
        Ok(())
    }

    /// 查找变量
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    fn variable_index(&self, name: &str) -> IoResult<usize> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| IoError::VariableNotFound(name.to_string()))
    }

    /// 变量形状
    pub fn shape(&self, name: &str) -> IoResult<Vec<usize>> {
        let var = &self.variables[self.variable_index(name)?];
        var.dimensions.iter().map(|d| self.dim_len(d)).collect()
    }

    /// 变量是否以记录维度开头
    fn is_record_variable(&self, var: &Variable) -> bool {
        var.dimensions
            .first()
            .and_then(|d| self.dimension(d))
            .map(|d| d.is_unlimited)
            .unwrap_or(false)
    }

    /// 单条记录的元素数
    fn record_size(&self, var: &Variable) -> usize {
        var.dimensions
            .iter()
            .skip(1)
            .filter_map(|d| self.dimension(d))
            .map(|d| d.len)
            .product()
    }

    /// 写入整个变量（非记录变量）
    pub fn put_values(&mut self, name: &str, values: &[f64]) -> IoResult<()> {
        let idx = self.variable_index(name)?;
        let expected = self.variables[idx].data.len();
        if values.len() != expected {
            return Err(IoError::LengthMismatch {
                name: name.to_string(),
                expected,
                actual: values.len(),
            });
        }
        self.variables[idx].data.copy_from_slice(values);
        Ok(())
    }

    /// 确保记录维度至少有 `n` 条记录，新记录填 0
    pub fn ensure_records(&mut self, n: usize) {
        let Some(pos) = self.dimensions.iter().position(|d| d.is_unlimited) else {
            return;
        };
        if self.dimensions[pos].len >= n {
            return;
        }
        self.dimensions[pos].len = n;
        let sizes: Vec<Option<usize>> = self
            .variables
            .iter()
            .map(|v| self.is_record_variable(v).then(|| self.record_size(v)))
            .collect();
        for (var, size) in self.variables.iter_mut().zip(sizes) {
            if let Some(size) = size {
                var.data.resize(n * size, 0.0);
            }
        }
    }

    /// 写入一条记录（按需扩展记录维度）
    pub fn put_record(&mut self, name: &str, record: usize, values: &[f64]) -> IoResult<()> {
        let idx = self.variable_index(name)?;
        if !self.is_record_variable(&self.variables[idx]) {
            return Err(IoError::DimensionNotFound(format!("{name} 不是记录变量")));
        }
        let size = self.record_size(&self.variables[idx]);
        if values.len() != size {
            return Err(IoError::LengthMismatch {
                name: name.to_string(),
                expected: size,
                actual: values.len(),
            });
        }
        self.ensure_records(record + 1);
        let start = record * size;
        self.variables[idx].data[start..start + size].copy_from_slice(values);
        Ok(())
    }

    /// 读取一条记录
    pub fn record(&self, name: &str, record: usize) -> IoResult<&[f64]> {
        let var = &self.variables[self.variable_index(name)?];
        let size = self.record_size(var);
        let start = record * size;
        var.data
            .get(start..start + size)
            .ok_or_else(|| IoError::LengthMismatch {
                name: name.to_string(),
                expected: record + 1,
                actual: self.num_records(),
            })
    }
}

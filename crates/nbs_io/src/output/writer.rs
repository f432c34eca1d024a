// crates/nbs_io/src/output/writer.rs

//! 数据集写出
//!
//! JSON 始终可用；netCDF 需要启用 `netcdf` 特性并安装 NetCDF 库。

use std::path::{Path, PathBuf};

use nbs_config::OutputFormat;

use super::dataset::Dataset;
use crate::error::{IoError, IoResult};

/// 保证文件扩展名与格式一致
pub fn ensure_extension(path: &Path, format: OutputFormat) -> PathBuf {
    let ext = format.extension();
    if path.extension().and_then(|e| e.to_str()) == Some(ext) {
        path.to_path_buf()
    } else {
        path.with_extension(ext)
    }
}

/// 写出数据集（覆盖已有文件）
pub fn write_dataset(path: &Path, dataset: &Dataset, format: OutputFormat) -> IoResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            std::fs::create_dir_all(parent).map_err(|e| IoError::file(parent, e))?;
        }
    }
    match format {
        OutputFormat::Json => write_json(path, dataset),
        OutputFormat::Netcdf => write_netcdf(path, dataset),
    }
}

/// 读取 JSON 数据集
pub fn read_json_dataset(path: &Path) -> IoResult<Dataset> {
    let content = std::fs::read_to_string(path).map_err(|e| IoError::file(path, e))?;
    serde_json::from_str(&content).map_err(|e| IoError::Serialization(e.to_string()))
}

fn write_json(path: &Path, dataset: &Dataset) -> IoResult<()> {
    let content =
        serde_json::to_string_pretty(dataset).map_err(|e| IoError::Serialization(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| IoError::file(path, e))
}

#[cfg(feature = "netcdf")]
fn write_netcdf(path: &Path, dataset: &Dataset) -> IoResult<()> {
    let mut file = netcdf::create(path)?;
    file.add_attribute("description", dataset.description.as_str())?;
    for (key, value) in &dataset.attributes {
        file.add_attribute(key, value.as_str())?;
    }

    for dim in &dataset.dimensions {
        if dim.is_unlimited {
            file.add_unlimited_dimension(&dim.name)?;
        } else {
            file.add_dimension(&dim.name, dim.len)?;
        }
    }

    for var in &dataset.variables {
        let dims: Vec<&str> = var.dimensions.iter().map(String::as_str).collect();
        let shape = dataset.shape(&var.name)?;
        let mut nc_var = file.add_variable::<f64>(&var.name, &dims)?;
        nc_var.add_attribute("long_name", var.long_name.as_str())?;
        nc_var.add_attribute("units", var.units.as_str())?;
        if var.data.is_empty() {
            continue;
        }
        let start = vec![0usize; shape.len()];
        nc_var.put_values(&var.data, Some(start.as_slice()), Some(shape.as_slice()))?;
    }
    Ok(())
}

#[cfg(not(feature = "netcdf"))]
fn write_netcdf(_path: &Path, _dataset: &Dataset) -> IoResult<()> {
    Err(IoError::FeatureDisabled("netcdf"))
}

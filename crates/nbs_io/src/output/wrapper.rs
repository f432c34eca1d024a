// crates/nbs_io/src/output/wrapper.rs

//! 输出包装器
//!
//! 把一个生物模型的 map 与 his 输出放在一起，并负责输出目录。

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use glam::DVec2;
use nbs_config::OutputFormat;
use tracing::debug;

use super::his::HisOutput;
use super::map::MapOutput;
use super::stations::get_xy_stations;
use crate::error::{IoError, IoResult};

/// 输出包装器
#[derive(Debug, Clone)]
pub struct OutputWrapper {
    /// 输出目录
    pub output_dir: PathBuf,
    /// 网格坐标
    pub xy_coordinates: Vec<DVec2>,
    /// 输出点标记
    pub outpoint: Vec<bool>,
    /// 首日
    pub first_date: NaiveDate,
    /// map 输出
    pub map_output: Option<MapOutput>,
    /// his 输出
    pub his_output: Option<HisOutput>,
}

impl OutputWrapper {
    /// 按开关创建 map / his 输出
    ///
    /// his 站点取 `outpoint` 标记的网格单元。
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        model_name: &str,
        output_dir: impl Into<PathBuf>,
        xy_coordinates: Vec<DVec2>,
        outpoint: Vec<bool>,
        first_date: NaiveDate,
        format: OutputFormat,
        map: bool,
        his: bool,
    ) -> Self {
        let output_dir = output_dir.into();
        let map_output = map.then(|| {
            MapOutput::new(
                model_name,
                &output_dir,
                first_date.year(),
                xy_coordinates.clone(),
                format,
            )
        });
        let his_output = his.then(|| {
            let (xy_stations, idx_stations) = get_xy_stations(&xy_coordinates, &outpoint);
            HisOutput::new(
                model_name,
                &output_dir,
                first_date,
                xy_stations,
                idx_stations,
                format,
            )
        });
        Self {
            output_dir,
            xy_coordinates,
            outpoint,
            first_date,
            map_output,
            his_output,
        }
    }

    /// 是否至少有一个输出已定义
    pub fn defined(&self) -> bool {
        self.map_output.as_ref().is_some_and(MapOutput::is_defined)
            || self.his_output.as_ref().is_some_and(HisOutput::is_defined)
    }

    /// 输出目录
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 站点网格索引（没有 his 输出时为空）
    pub fn idx_stations(&self) -> &[usize] {
        self.his_output
            .as_ref()
            .map(|h| h.idx_stations.as_slice())
            .unwrap_or(&[])
    }

    /// 创建输出目录并同步到各输出
    pub fn initialize_dirs(&mut self) -> IoResult<()> {
        if !self.output_dir.is_dir() {
            std::fs::create_dir_all(&self.output_dir)
                .map_err(|e| IoError::file(&self.output_dir, e))?;
            debug!("创建输出目录 {}", self.output_dir.display());
        }
        if let Some(map) = self.map_output.as_mut() {
            map.output_dir = self.output_dir.clone();
        }
        if let Some(his) = self.his_output.as_mut() {
            his.output_dir = self.output_dir.clone();
        }
        Ok(())
    }
}

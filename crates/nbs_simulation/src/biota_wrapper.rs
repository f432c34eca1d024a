// crates/nbs_simulation/src/biota_wrapper.rs

//! 生物对象与其输出的组合

use std::path::Path;

use chrono::NaiveDate;
use glam::DVec2;
use nbs_config::OutputConfig;
use nbs_io::{IoResult, OutputWrapper};
use ndarray::{Array1, Array2};

/// 生物对象及其输出
#[derive(Debug, Clone)]
pub struct BiotaWrapper<B> {
    /// 生物对象
    pub biota: B,
    /// 输出（未定义时不写出）
    pub output: Option<OutputWrapper>,
}

impl<B> BiotaWrapper<B> {
    /// 创建
    pub fn new(biota: B, output: Option<OutputWrapper>) -> Self {
        Self { biota, output }
    }

    /// 是否有已定义的输出
    pub fn has_output(&self) -> bool {
        self.output.as_ref().is_some_and(OutputWrapper::defined)
    }

    /// 写出一个时刻：map 写入第 `record` 条记录，his 写入 `date` 当天
    pub fn write_step(
        &mut self,
        record: usize,
        time: f64,
        date: NaiveDate,
        map_values: fn(&B) -> Vec<(&'static str, Array1<f64>)>,
        his_values: fn(&B, &[usize]) -> Vec<(&'static str, Array2<f64>)>,
    ) -> IoResult<()> {
        let Some(output) = self.output.as_mut() else {
            return Ok(());
        };
        let idx_stations = output.idx_stations().to_vec();
        if let Some(map) = output.map_output.as_mut() {
            map.update_record(record, time, &map_values(&self.biota))?;
        }
        if let Some(his) = output.his_output.as_mut() {
            his.update(&[date], &his_values(&self.biota, &idx_stations))?;
        }
        Ok(())
    }
}

/// 输出配置所需的网格信息
#[derive(Debug, Clone, Copy)]
pub struct OutputGrid<'a> {
    /// 网格坐标
    pub xy: &'a [DVec2],
    /// 输出点标记
    pub outpoint: &'a [bool],
    /// 首日
    pub first_date: NaiveDate,
}

/// 创建或补全输出包装器
///
/// 没有预设时按输出配置新建；预设已有网格坐标时原样保留；
/// 否则以水动力网格重建，保留预设的目录、首日、文件名和格式。
pub fn configure_output(
    preset: Option<OutputWrapper>,
    model_name: &str,
    grid: OutputGrid<'_>,
    config: &OutputConfig,
    output_dir: &Path,
) -> OutputWrapper {
    let Some(preset) = preset else {
        return OutputWrapper::new(
            model_name,
            output_dir,
            grid.xy.to_vec(),
            grid.outpoint.to_vec(),
            grid.first_date,
            config.format,
            config.map,
            config.his,
        );
    };
    if !preset.xy_coordinates.is_empty() {
        return preset;
    }

    let mut wrapper = OutputWrapper::new(
        model_name,
        &preset.output_dir,
        grid.xy.to_vec(),
        grid.outpoint.to_vec(),
        preset.first_date,
        config.format,
        preset.map_output.is_some(),
        preset.his_output.is_some(),
    );
    if let (Some(new), Some(old)) = (wrapper.map_output.as_mut(), preset.map_output) {
        new.file_name = old.file_name;
        new.format = old.format;
    }
    if let (Some(new), Some(old)) = (wrapper.his_output.as_mut(), preset.his_output) {
        new.file_name = old.file_name;
        new.format = old.format;
    }
    wrapper
}

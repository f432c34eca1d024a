// crates/nbs_io/src/output/map.rs

//! Map 输出：覆盖整个计算域，每条记录一个年份（或一个生态时间步）

use std::path::{Path, PathBuf};

use glam::DVec2;
use nbs_foundation::NbsError;
use nbs_config::OutputFormat;
use ndarray::Array1;
use tracing::{debug, warn};

use super::dataset::{Dataset, VariableSpec};
use super::writer::{ensure_extension, write_dataset};
use crate::error::{IoError, IoResult};

const TIME: VariableSpec = VariableSpec::new("time", "year", "years since 0 B.C.");
const FACE_X: VariableSpec = VariableSpec::new("nmesh2d_x", "x-coordinate", "m");
const FACE_Y: VariableSpec = VariableSpec::new("nmesh2d_y", "y-coordinate", "m");

/// 面维度名
pub const FACE_DIM: &str = "nmesh2d_face";

/// Map 输出
#[derive(Debug, Clone)]
pub struct MapOutput {
    /// 输出目录
    pub output_dir: PathBuf,
    /// 文件名，缺省为 `<model>_map`
    pub file_name: Option<PathBuf>,
    /// 首年
    pub first_year: i32,
    /// 网格坐标
    pub xy_coordinates: Vec<DVec2>,
    /// 输出格式
    pub format: OutputFormat,
    model_name: String,
    dataset: Option<Dataset>,
}

impl MapOutput {
    /// 创建，`model_name` 如 `CoralModel`
    pub fn new(
        model_name: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        first_year: i32,
        xy_coordinates: Vec<DVec2>,
        format: OutputFormat,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_name: None,
            first_year,
            xy_coordinates,
            format,
            model_name: model_name.into(),
            dataset: None,
        }
    }

    /// 网格单元数
    pub fn space(&self) -> usize {
        self.xy_coordinates.len()
    }

    /// 输出文件完整路径
    pub fn file_path(&self) -> PathBuf {
        let name = self
            .file_name
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_map", self.model_name)));
        ensure_extension(&self.output_dir.join(name), self.format)
    }

    /// 是否已定义（有输出变量）
    pub fn is_defined(&self) -> bool {
        self.dataset.is_some()
    }

    /// 当前数据集
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// 建立数据集并写出初始记录
    ///
    /// `initial` 给出首条记录的初值，未给出的变量为 0。
    /// 没有输出变量时不写任何文件。
    pub fn initialize(
        &mut self,
        description: &str,
        variables: &[VariableSpec],
        initial: &[(&str, Array1<f64>)],
    ) -> IoResult<()> {
        if variables.is_empty() {
            warn!("No output defined, so none exported ({})", self.file_path().display());
            self.dataset = None;
            return Ok(());
        }

        let space = self.space();
        let mut ds = Dataset::new(description);
        ds.add_unlimited_dimension("time")?;
        ds.add_dimension(FACE_DIM, space)?;
        ds.add_variable(&TIME, &["time"])?;
        ds.add_variable(&FACE_X, &[FACE_DIM])?;
        ds.add_variable(&FACE_Y, &[FACE_DIM])?;
        let x: Vec<f64> = self.xy_coordinates.iter().map(|p| p.x).collect();
        let y: Vec<f64> = self.xy_coordinates.iter().map(|p| p.y).collect();
        ds.put_values(FACE_X.name, &x)?;
        ds.put_values(FACE_Y.name, &y)?;

        for spec in variables {
            ds.add_variable(spec, &["time", FACE_DIM])?;
        }
        ds.put_record(TIME.name, 0, &[self.first_year as f64])?;
        for (name, values) in initial {
            if ds.variable(name).is_some() {
                ds.put_record(name, 0, &values.to_vec())?;
            }
        }

        self.dataset = Some(ds);
        self.flush()
    }

    /// 写入某一年的结果
    pub fn update(&mut self, year: i32, values: &[(&str, Array1<f64>)]) -> IoResult<()> {
        if year < self.first_year {
            return Err(IoError::Foundation(NbsError::invalid_input(format!(
                "年份 {year} 早于首年 {}",
                self.first_year
            ))));
        }
        let record = (year - self.first_year) as usize;
        self.update_record(record, year as f64, values)
    }

    /// 写入指定记录
    pub fn update_record(
        &mut self,
        record: usize,
        time: f64,
        values: &[(&str, Array1<f64>)],
    ) -> IoResult<()> {
        let Some(ds) = self.dataset.as_mut() else {
            return Ok(());
        };
        ds.put_record(TIME.name, record, &[time])?;
        for (name, v) in values {
            if ds.variable(name).is_some() {
                ds.put_record(name, record, &v.to_vec())?;
            }
        }
        debug!("map 记录 {record} 已更新");
        self.flush()
    }

    fn flush(&self) -> IoResult<()> {
        match &self.dataset {
            Some(ds) => write_dataset(&self.file_path(), ds, self.format),
            None => Ok(()),
        }
    }

    /// 输出目录
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::writer::read_json_dataset;

    const PT: VariableSpec = VariableSpec::new("PT", "total living coral population", "-");

    fn map(dir: &Path) -> MapOutput {
        MapOutput::new(
            "CoralModel",
            dir,
            2000,
            vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 2.0)],
            OutputFormat::Json,
        )
    }

    #[test]
    fn test_default_file_name() {
        let m = MapOutput::new("CoralModel", "out", 2000, vec![], OutputFormat::Netcdf);
        assert_eq!(m.file_path(), PathBuf::from("out/CoralModel_map.nc"));
    }

    #[test]
    fn test_undefined_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = map(dir.path());
        m.initialize("Mapped simulation data", &[], &[]).unwrap();
        assert!(!m.is_defined());
        m.update(2000, &[]).unwrap();
        assert!(!m.file_path().exists());
    }

    #[test]
    fn test_initialize_and_update() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = map(dir.path());
        let cover = Array1::from(vec![0.5, 1.0]);
        m.initialize("Mapped simulation data", &[PT], &[("PT", cover)])
            .unwrap();
        m.update(2001, &[("PT", Array1::from(vec![0.4, 0.9]))]).unwrap();

        let ds = read_json_dataset(&m.file_path()).unwrap();
        assert_eq!(ds.num_records(), 2);
        assert_eq!(ds.record("time", 1).unwrap(), &[2001.0]);
        assert_eq!(ds.record("PT", 0).unwrap(), &[0.5, 1.0]);
        assert_eq!(ds.record("PT", 1).unwrap(), &[0.4, 0.9]);
        assert_eq!(ds.variable("nmesh2d_y").unwrap().data, vec![0.0, 2.0]);
    }

    #[test]
    fn test_year_before_first_year_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = map(dir.path());
        m.initialize("x", &[PT], &[]).unwrap();
        assert!(m.update(1999, &[]).is_err());
    }
}

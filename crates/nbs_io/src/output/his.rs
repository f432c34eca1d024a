// crates/nbs_io/src/output/his.rs

//! His 输出：输出站点上的逐日（或逐步）时间序列

use std::path::PathBuf;

use chrono::NaiveDate;
use glam::DVec2;
use nbs_foundation::NbsError;
use nbs_config::OutputFormat;
use ndarray::Array2;
use tracing::{debug, warn};

use super::dataset::{Dataset, VariableSpec};
use super::writer::{ensure_extension, write_dataset};
use crate::error::{IoError, IoResult};

/// 站点维度名
pub const STATION_DIM: &str = "stations";

const STATION_X: VariableSpec = VariableSpec::new("station_x_coordinate", "x-coordinate", "m");
const STATION_Y: VariableSpec = VariableSpec::new("station_y_coordinate", "y-coordinate", "m");

/// His 输出
#[derive(Debug, Clone)]
pub struct HisOutput {
    /// 输出目录
    pub output_dir: PathBuf,
    /// 文件名，缺省为 `<model>_his`
    pub file_name: Option<PathBuf>,
    /// 首日
    pub first_date: NaiveDate,
    /// 站点坐标
    pub xy_stations: Vec<DVec2>,
    /// 站点对应的网格索引
    pub idx_stations: Vec<usize>,
    /// 输出格式
    pub format: OutputFormat,
    model_name: String,
    dataset: Option<Dataset>,
}

impl HisOutput {
    /// 创建
    pub fn new(
        model_name: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        first_date: NaiveDate,
        xy_stations: Vec<DVec2>,
        idx_stations: Vec<usize>,
        format: OutputFormat,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_name: None,
            first_date,
            xy_stations,
            idx_stations,
            format,
            model_name: model_name.into(),
            dataset: None,
        }
    }

    /// 输出文件完整路径
    pub fn file_path(&self) -> PathBuf {
        let name = self
            .file_name
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_his", self.model_name)));
        ensure_extension(&self.output_dir.join(name), self.format)
    }

    /// 是否已定义
    pub fn is_defined(&self) -> bool {
        self.dataset.is_some()
    }

    /// 当前数据集
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// 建立数据集
    pub fn initialize(&mut self, description: &str, variables: &[VariableSpec]) -> IoResult<()> {
        if variables.is_empty() {
            warn!("No output defined, so none exported ({})", self.file_path().display());
            self.dataset = None;
            return Ok(());
        }

        let time = VariableSpec::new("time", "days since first date", "days");

        let mut ds = Dataset::new(description);
        ds.add_unlimited_dimension("time")?;
        ds.add_dimension(STATION_DIM, self.xy_stations.len())?;
        ds.add_variable(&time, &["time"])?;
        ds.add_variable(&STATION_X, &[STATION_DIM])?;
        ds.add_variable(&STATION_Y, &[STATION_DIM])?;
        let x: Vec<f64> = self.xy_stations.iter().map(|p| p.x).collect();
        let y: Vec<f64> = self.xy_stations.iter().map(|p| p.y).collect();
        ds.put_values(STATION_X.name, &x)?;
        ds.put_values(STATION_Y.name, &y)?;
        // 时间变量的长名称包含首日
        if let Some(var) = ds.variables.iter_mut().find(|v| v.name == "time") {
            var.long_name = format!("days since {}", self.first_date);
        }
        for spec in variables {
            ds.add_variable(spec, &["time", STATION_DIM])?;
        }

        self.dataset = Some(ds);
        self.flush()
    }

    /// 写入若干日期的站点值，每个数组为 (time × stations)
    pub fn update(&mut self, dates: &[NaiveDate], values: &[(&str, Array2<f64>)]) -> IoResult<()> {
        let first_date = self.first_date;
        let Some(ds) = self.dataset.as_mut() else {
            return Ok(());
        };

        let offsets = dates
            .iter()
            .map(|d| {
                let days = (*d - first_date).num_days();
                usize::try_from(days).map_err(|_| {
                    IoError::Foundation(NbsError::invalid_input(format!(
                        "日期 {d} 早于首日 {first_date}"
                    )))
                })
            })
            .collect::<IoResult<Vec<usize>>>()?;

        for (t, &ti) in offsets.iter().enumerate() {
            ds.put_record("time", ti, &[ti as f64])?;
            for (name, matrix) in values {
                if ds.variable(name).is_none() {
                    continue;
                }
                if matrix.nrows() != offsets.len() {
                    return Err(IoError::LengthMismatch {
                        name: name.to_string(),
                        expected: offsets.len(),
                        actual: matrix.nrows(),
                    });
                }
                let row: Vec<f64> = matrix.row(t).to_vec();
                ds.put_record(name, ti, &row)?;
            }
        }
        debug!("his 写入 {} 条记录", offsets.len());
        self.flush()
    }

    fn flush(&self) -> IoResult<()> {
        match &self.dataset {
            Some(ds) => write_dataset(&self.file_path(), ds, self.format),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::writer::read_json_dataset;

    const PH: VariableSpec = VariableSpec::new("PH", "healthy coral population", "-");

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_update_at_day_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let mut his = HisOutput::new(
            "CoralModel",
            dir.path(),
            date(2000, 1, 1),
            vec![DVec2::new(1.0, 1.0)],
            vec![0],
            OutputFormat::Json,
        );
        his.initialize("Historic simulation data", &[PH]).unwrap();
        let values = Array2::from_shape_vec((2, 1), vec![0.8, 0.7]).unwrap();
        his.update(&[date(2000, 1, 3), date(2000, 1, 4)], &[("PH", values)])
            .unwrap();

        let ds = read_json_dataset(&his.file_path()).unwrap();
        assert_eq!(ds.num_records(), 4);
        assert_eq!(ds.record("PH", 2).unwrap(), &[0.8]);
        assert_eq!(ds.record("time", 3).unwrap(), &[3.0]);
        assert_eq!(
            ds.variable("time").unwrap().long_name,
            "days since 2000-01-01"
        );
        assert!(his.file_path().ends_with("CoralModel_his.json"));
    }

    #[test]
    fn test_dates_before_first_date_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut his = HisOutput::new(
            "CoralModel",
            dir.path(),
            date(2000, 1, 1),
            vec![DVec2::ZERO],
            vec![0],
            OutputFormat::Json,
        );
        his.initialize("x", &[PH]).unwrap();
        let values = Array2::zeros((1, 1));
        assert!(his.update(&[date(1999, 12, 31)], &[("PH", values)]).is_err());
    }

    #[test]
    fn test_row_count_checked() {
        let dir = tempfile::tempdir().unwrap();
        let mut his = HisOutput::new(
            "VegModel",
            dir.path(),
            date(2000, 1, 1),
            vec![DVec2::ZERO],
            vec![0],
            OutputFormat::Json,
        );
        his.initialize("x", &[PH]).unwrap();
        let values = Array2::zeros((3, 1));
        assert!(his.update(&[date(2000, 1, 1)], &[("PH", values)]).is_err());
    }
}

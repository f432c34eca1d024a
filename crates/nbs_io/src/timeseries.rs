// crates/nbs_io/src/timeseries.rs

//! 环境时间序列
//!
//! 日序列文件为制表符分隔，表头含 `date` 列和一个数值列：
//!
//! ```text
//! date        par
//! 2000-01-01  600.0
//! 2000-01-02  612.5
//! ```
//!
//! 年序列文件以 `year` 列代替 `date` 列。任何空值或 NaN 都视为错误。

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use nbs_foundation::calendar::parse_date;

use crate::error::{IoError, IoResult};

/// 日时间序列（日期严格递增）
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    /// 创建并检查日期顺序
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> IoResult<Self> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(IoError::LengthMismatch {
                name,
                expected: dates.len(),
                actual: values.len(),
            });
        }
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(IoError::UnorderedDates {
                series: name,
                date: w[1].to_string(),
            });
        }
        Ok(Self { name, dates, values })
    }

    /// 常数序列
    pub fn constant(name: impl Into<String>, dates: Vec<NaiveDate>, value: f64) -> IoResult<Self> {
        let values = vec![value; dates.len()];
        Self::new(name, dates, values)
    }

    /// 序列名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 日期
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// 数值
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 长度
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 首日
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// 末日
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// 某日的值
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|i| self.values[i])
    }

    /// 平均值
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// 按值映射
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            name: self.name.clone(),
            dates: self.dates.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// 闭区间内的子序列
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end);
        let (lo, hi) = (lo.min(hi), hi);
        Self {
            name: self.name.clone(),
            dates: self.dates[lo..hi].to_vec(),
            values: self.values[lo..hi].to_vec(),
        }
    }

    /// 某一年的子序列
    pub fn year(&self, year: i32) -> Self {
        match (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) {
            (Some(start), Some(end)) => self.between(start, end),
            _ => Self {
                name: self.name.clone(),
                dates: Vec::new(),
                values: Vec::new(),
            },
        }
    }

    /// 序列覆盖的年份（升序，去重）
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.dates.iter().map(|d| d.year()).collect();
        years.dedup();
        years
    }

    /// 每年各月平均值中的 (最小值, 最大值)
    pub fn monthly_mean_extremes(&self) -> Vec<(i32, f64, f64)> {
        let mut result: Vec<(i32, f64, f64)> = Vec::new();
        let mut i = 0;
        while i < self.dates.len() {
            let year = self.dates[i].year();
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            while i < self.dates.len() && self.dates[i].year() == year {
                let month = self.dates[i].month();
                let mut sum = 0.0;
                let mut n = 0usize;
                while i < self.dates.len()
                    && self.dates[i].year() == year
                    && self.dates[i].month() == month
                {
                    sum += self.values[i];
                    n += 1;
                    i += 1;
                }
                let mean = sum / n as f64;
                min = min.min(mean);
                max = max.max(mean);
            }
            result.push((year, min, max));
        }
        result
    }
}

/// 年时间序列
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualSeries {
    name: String,
    years: Vec<i32>,
    values: Vec<f64>,
}

impl AnnualSeries {
    /// 创建
    pub fn new(name: impl Into<String>, years: Vec<i32>, values: Vec<f64>) -> IoResult<Self> {
        let name = name.into();
        if years.len() != values.len() {
            return Err(IoError::LengthMismatch {
                name,
                expected: years.len(),
                actual: values.len(),
            });
        }
        Ok(Self { name, years, values })
    }

    /// 序列名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 年份
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// 数值
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 某年的值
    pub fn get(&self, year: i32) -> Option<f64> {
        self.years
            .iter()
            .position(|&y| y == year)
            .map(|i| self.values[i])
    }
}

/// 表格内容：列名和行
struct Table {
    header: Vec<String>,
    rows: Vec<(usize, Vec<String>)>,
}

fn read_table(path: &Path) -> IoResult<Table> {
    if !path.is_file() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| IoError::file(path, e))?;
    parse_table(&content, path)
}

fn parse_table(content: &str, path: &Path) -> IoResult<Table> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let header = match lines.next() {
        Some((_, line)) => line.split('\t').map(|s| s.trim().to_string()).collect(),
        None => {
            return Err(IoError::ParseError {
                file: path.to_path_buf(),
                line: 1,
                message: "缺少表头".into(),
            })
        }
    };
    let rows = lines
        .map(|(i, line)| (i + 1, line.split('\t').map(|s| s.trim().to_string()).collect()))
        .collect();
    Ok(Table { header, rows })
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("na")
}

/// 定位键列和数值列
fn key_and_value_columns(table: &Table, key: &str, path: &Path) -> IoResult<(usize, usize, String)> {
    let key_col = table
        .header
        .iter()
        .position(|h| h.eq_ignore_ascii_case(key))
        .ok_or_else(|| IoError::ParseError {
            file: path.to_path_buf(),
            line: 1,
            message: format!("缺少 '{key}' 列"),
        })?;
    let value_col = (0..table.header.len())
        .find(|&c| c != key_col)
        .ok_or_else(|| IoError::ParseError {
            file: path.to_path_buf(),
            line: 1,
            message: "缺少数值列".into(),
        })?;
    Ok((key_col, value_col, table.header[value_col].clone()))
}

/// 读取日时间序列
pub fn read_daily_series(path: &Path) -> IoResult<DailySeries> {
    let table = read_table(path)?;
    daily_from_table(table, path)
}

/// 从字符串解析日时间序列
pub fn parse_daily_series(content: &str, path: &Path) -> IoResult<DailySeries> {
    daily_from_table(parse_table(content, path)?, path)
}

fn daily_from_table(table: Table, path: &Path) -> IoResult<DailySeries> {
    let (date_col, value_col, name) = key_and_value_columns(&table, "date", path)?;

    let mut dates = Vec::with_capacity(table.rows.len());
    let mut values = Vec::with_capacity(table.rows.len());
    for (line, row) in &table.rows {
        let date_cell = row.get(date_col).map(String::as_str).unwrap_or("");
        let value_cell = row.get(value_col).map(String::as_str).unwrap_or("");
        if is_missing(date_cell) || is_missing(value_cell) {
            return Err(IoError::NanInSeries {
                path: path.to_path_buf(),
            });
        }
        let date = parse_date(date_cell).map_err(|e| IoError::ParseError {
            file: path.to_path_buf(),
            line: *line,
            message: e.to_string(),
        })?;
        let value = value_cell.parse::<f64>().map_err(|_| IoError::ParseError {
            file: path.to_path_buf(),
            line: *line,
            message: format!("无法解析数值 '{value_cell}'"),
        })?;
        if value.is_nan() {
            return Err(IoError::NanInSeries {
                path: path.to_path_buf(),
            });
        }
        dates.push(date);
        values.push(value);
    }
    DailySeries::new(name, dates, values)
}

/// 读取年时间序列
pub fn read_annual_series(path: &Path) -> IoResult<AnnualSeries> {
    let table = read_table(path)?;
    let (year_col, value_col, name) = key_and_value_columns(&table, "year", path)?;

    let mut years = Vec::with_capacity(table.rows.len());
    let mut values = Vec::with_capacity(table.rows.len());
    for (line, row) in &table.rows {
        let parse_err = |what: &str| IoError::ParseError {
            file: path.to_path_buf(),
            line: *line,
            message: format!("无法解析{what}"),
        };
        let year_cell = row.get(year_col).map(String::as_str).unwrap_or("");
        let value_cell = row.get(value_col).map(String::as_str).unwrap_or("");
        if is_missing(year_cell) || is_missing(value_cell) {
            return Err(IoError::NanInSeries {
                path: path.to_path_buf(),
            });
        }
        years.push(year_cell.parse::<i32>().map_err(|_| parse_err("年份"))?);
        values.push(value_cell.parse::<f64>().map_err(|_| parse_err("数值"))?);
    }
    AnnualSeries::new(name, years, values)
}

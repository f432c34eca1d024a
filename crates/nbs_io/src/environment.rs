// crates/nbs_io/src/environment.rs

//! 环境条件
//!
//! 保存模拟所需的环境时间序列：光照、光衰减系数、海表温度、
//! 文石饱和度（日序列）和风暴等级（年序列）。

use std::path::Path;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use nbs_foundation::calendar::date_range;
use tracing::{debug, info};

use crate::error::{IoError, IoResult};
use crate::timeseries::{read_annual_series, read_daily_series, AnnualSeries, DailySeries};

/// 环境参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvParameter {
    /// 入射光强 [µmol photons m-2 s-1]
    Light,
    /// 光衰减系数 [m-1]
    LightAttenuation,
    /// 海表温度 [K]
    Temperature,
    /// 文石饱和度 [-]
    Aragonite,
    /// 年风暴等级 [-]
    Storm,
}

impl EnvParameter {
    /// 规范名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::LightAttenuation => "light_attenuation",
            Self::Temperature => "temperature",
            Self::Aragonite => "aragonite",
            Self::Storm => "storm",
        }
    }

    /// 是否为日序列参数
    pub fn is_daily(&self) -> bool {
        !matches!(self, Self::Storm)
    }
}

impl FromStr for EnvParameter {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "LAC" | "light_attenuation" => Ok(Self::LightAttenuation),
            "temperature" => Ok(Self::Temperature),
            "aragonite" => Ok(Self::Aragonite),
            "storm" | "storm_category" => Ok(Self::Storm),
            other => Err(IoError::UnknownParameter(other.to_string())),
        }
    }
}

/// 设置参数时的取值
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// 整个时段上的常数
    Constant(f64),
    /// 逐日（或风暴参数的逐年）数值
    Series(Vec<f64>),
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Constant(v)
    }
}

impl From<Vec<f64>> for ParameterValue {
    fn from(v: Vec<f64>) -> Self {
        Self::Series(v)
    }
}

/// 环境条件
#[derive(Debug, Clone, Default)]
pub struct Environment {
    dates: Option<Vec<NaiveDate>>,
    /// 入射光强
    pub light: Option<DailySeries>,
    /// 光衰减系数
    pub light_attenuation: Option<DailySeries>,
    /// 海表温度
    pub temperature: Option<DailySeries>,
    /// 文石饱和度
    pub aragonite: Option<DailySeries>,
    /// 风暴等级
    pub storm_category: Option<AnnualSeries>,
}

impl Environment {
    /// 空环境
    pub fn new() -> Self {
        Self::default()
    }

    /// 连续日期序列（闭区间）
    pub fn dates_from(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        date_range(start, end)
    }

    /// 手动设置模拟日期，忽略时间序列中的日期
    pub fn set_dates(&mut self, start: NaiveDate, end: NaiveDate) {
        self.dates = Some(Self::dates_from(start, end));
    }

    /// 模拟日期：显式设置的日期，否则取温度或光照序列的日期
    pub fn dates(&self) -> Option<&[NaiveDate]> {
        if let Some(d) = &self.dates {
            return Some(d.as_slice());
        }
        self.temperature
            .as_ref()
            .or(self.light.as_ref())
            .map(|s| s.dates())
    }

    /// 模拟首日
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates().and_then(|d| d.first().copied())
    }

    /// 模拟的年份
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .dates()
            .map(|d| d.iter().map(|d| d.year()).collect())
            .unwrap_or_default();
        years.dedup();
        years
    }

    /// 从文件读取参数
    pub fn from_file(&mut self, parameter: &str, path: &Path) -> IoResult<()> {
        let parameter: EnvParameter = parameter.parse()?;
        if parameter == EnvParameter::Storm {
            self.storm_category = Some(read_annual_series(path)?);
        } else {
            let series = read_daily_series(path)?;
            debug!("读取 {}: {} 天", parameter.name(), series.len());
            self.set_daily(parameter, series);
        }
        Ok(())
    }

    fn set_daily(&mut self, parameter: EnvParameter, series: DailySeries) {
        match parameter {
            EnvParameter::Light => self.light = Some(series),
            EnvParameter::LightAttenuation => self.light_attenuation = Some(series),
            EnvParameter::Temperature => self.temperature = Some(series),
            EnvParameter::Aragonite => self.aragonite = Some(series),
            EnvParameter::Storm => {}
        }
    }

    /// 以常数或序列设置参数
    ///
    /// 需要先定义日期。`pre_date` 为时段向前延伸的年数，
    /// 用于热适应等需要历史数据的过程。
    pub fn set_parameter_values(
        &mut self,
        parameter: &str,
        value: impl Into<ParameterValue>,
        pre_date: Option<u32>,
    ) -> IoResult<()> {
        let dates = match self.dates() {
            Some(d) if !d.is_empty() => d.to_vec(),
            _ => {
                return Err(IoError::DatesUndefined {
                    parameter: parameter.to_string(),
                })
            }
        };
        let parameter: EnvParameter = parameter.parse()?;
        let value = value.into();

        if parameter == EnvParameter::Storm {
            let mut years: Vec<i32> = dates.iter().map(|d| d.year()).collect();
            years.dedup();
            let values = match value {
                ParameterValue::Constant(v) => vec![v; years.len()],
                ParameterValue::Series(v) => v,
            };
            self.storm_category = Some(AnnualSeries::new("stormcat", years, values)?);
            return Ok(());
        }

        let dates = match pre_date {
            None => dates,
            Some(n) => {
                let first = dates[0];
                let last = dates[dates.len() - 1];
                let start = first
                    .checked_sub_months(Months::new(12 * n))
                    .unwrap_or(first);
                date_range(start, last)
            }
        };
        let series = match value {
            ParameterValue::Constant(v) => DailySeries::constant(parameter.name(), dates, v)?,
            ParameterValue::Series(v) => DailySeries::new(parameter.name(), dates, v)?,
        };
        self.set_daily(parameter, series);
        Ok(())
    }

    /// 温度（K）；平均值小于 100 时视为摄氏度并转换
    pub fn temp_kelvin(&self) -> IoResult<DailySeries> {
        let temperature = self
            .temperature
            .as_ref()
            .ok_or_else(|| IoError::MissingData("temperature".into()))?;
        if temperature.mean() < 100.0 {
            Ok(temperature.map(|t| t + 273.15))
        } else {
            Ok(temperature.clone())
        }
    }

    /// 每年月平均温度的 (年, 最小值, 最大值)，单位 K
    pub fn temp_mmm(&self) -> IoResult<Vec<(i32, f64, f64)>> {
        Ok(self.temp_kelvin()?.monthly_mean_extremes())
    }

    /// 某年的风暴等级，未定义时为 0
    pub fn storm_category_for(&self, year: i32) -> u8 {
        self.storm_category
            .as_ref()
            .and_then(|s| s.get(year))
            .map(|v| v.round().clamp(0.0, u8::MAX as f64) as u8)
            .unwrap_or(0)
    }

    /// 检查珊瑚模拟所需数据，缺省的光衰减系数和文石饱和度以常数补齐
    pub fn validate_for_coral(&mut self, kd0: f64, omega_a0: f64) -> IoResult<()> {
        if self.light.is_none() {
            return Err(IoError::MissingData(
                "CoralModel simulation cannot run without data on light conditions.".into(),
            ));
        }
        if self.temperature.is_none() {
            return Err(IoError::MissingData(
                "CoralModel simulation cannot run without data on temperature conditions."
                    .into(),
            ));
        }
        if self.light_attenuation.is_none() {
            self.set_parameter_values("light_attenuation", kd0, None)?;
            info!("Light attenuation coefficient set to default: Kd = {kd0} [m-1]");
        }
        if self.aragonite.is_none() {
            self.set_parameter_values("aragonite", omega_a0, None)?;
            info!("Aragonite saturation state set to default: omega_a0 = {omega_a0} [-]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_set_value_without_dates_fails() {
        let mut env = Environment::new();
        let err = env.set_parameter_values("light", 600.0, None).unwrap_err();
        assert!(matches!(err, IoError::DatesUndefined { .. }));
        assert!(err.to_string().contains("light"));
    }

    #[test]
    fn test_set_constant_value() {
        let mut env = Environment::new();
        env.set_dates(date(2000, 1, 1), date(2000, 12, 31));
        env.set_parameter_values("light", 600.0, None).unwrap();
        let light = env.light.as_ref().unwrap();
        assert_eq!(light.len(), 366);
        assert!(light.values().iter().all(|&v| v == 600.0));
    }

    #[test]
    fn test_lac_alias_and_unknown_parameter() {
        let mut env = Environment::new();
        env.set_dates(date(2000, 1, 1), date(2000, 1, 10));
        env.set_parameter_values("LAC", 0.2, None).unwrap();
        assert!(env.light_attenuation.is_some());
        assert!(matches!(
            env.set_parameter_values("salinity", 35.0, None),
            Err(IoError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_pre_date_extends_series() {
        let mut env = Environment::new();
        env.set_dates(date(2001, 1, 1), date(2001, 12, 31));
        env.set_parameter_values("temperature", 300.0, Some(1)).unwrap();
        let t = env.temperature.as_ref().unwrap();
        assert_eq!(t.first_date(), Some(date(2000, 1, 1)));
        assert_eq!(t.len(), 366 + 365);
        // 显式日期不受影响
        assert_eq!(env.dates().unwrap().len(), 365);
    }

    #[test]
    fn test_series_length_checked() {
        let mut env = Environment::new();
        env.set_dates(date(2000, 1, 1), date(2000, 1, 3));
        assert!(env
            .set_parameter_values("aragonite", vec![1.0, 2.0], None)
            .is_err());
        assert!(env
            .set_parameter_values("aragonite", vec![1.0, 2.0, 3.0], None)
            .is_ok());
    }

    #[test]
    fn test_storm_per_year() {
        let mut env = Environment::new();
        env.set_dates(date(2000, 1, 1), date(2001, 12, 31));
        env.set_parameter_values("storm", vec![0.0, 2.0], None).unwrap();
        assert_eq!(env.storm_category_for(2000), 0);
        assert_eq!(env.storm_category_for(2001), 2);
        assert_eq!(env.storm_category_for(2010), 0);
    }

    #[test]
    fn test_temp_kelvin_conversion() {
        let mut env = Environment::new();
        env.set_dates(date(2000, 1, 1), date(2000, 1, 31));
        env.set_parameter_values("temperature", 27.0, None).unwrap();
        let t = env.temp_kelvin().unwrap();
        assert!((t.values()[0] - 300.15).abs() < 1e-10);

        env.set_parameter_values("temperature", 300.0, None).unwrap();
        let t = env.temp_kelvin().unwrap();
        assert!((t.values()[0] - 300.0).abs() < 1e-10);
    }

    #[test]
    fn test_dates_follow_temperature_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TS_SST.txt");
        std::fs::write(&path, "date\tsst\n2000-01-01\t300\n2000-01-02\t301\n").unwrap();
        let mut env = Environment::new();
        env.from_file("temperature", &path).unwrap();
        assert_eq!(env.dates().unwrap().len(), 2);
        assert_eq!(env.years(), vec![2000]);
    }

    #[test]
    fn test_validate_for_coral_fills_defaults() {
        let mut env = Environment::new();
        env.set_dates(date(2000, 1, 1), date(2000, 1, 5));
        assert!(env.validate_for_coral(0.1, 5.0).is_err());
        env.set_parameter_values("light", 600.0, None).unwrap();
        env.set_parameter_values("temperature", 300.0, None).unwrap();
        env.validate_for_coral(0.1, 5.0).unwrap();
        assert_eq!(env.aragonite.as_ref().unwrap().values()[0], 5.0);
        assert_eq!(env.light_attenuation.as_ref().unwrap().values()[0], 0.1);
    }
}

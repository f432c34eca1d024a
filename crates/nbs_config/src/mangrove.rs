// crates/nbs_config/src/mangrove.rs

//! 红树林常数（默认值对应 Avicennia marina）
//!
//! 生长采用 KiWi 模型，胸径与树高以 cm 参与公式计算，
//! 模型状态中以 m 存储。

use std::path::Path;

use chrono::NaiveDate;
use nbs_foundation::MonthDay;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::input_file::InputParameters;

/// 红树林常数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MangroveConstants {
    /// 物种名
    pub species: String,

    /// 淹没胁迫抛物线系数 a（`I = a·P² + b·P + c`）
    pub a: f64,
    /// 淹没胁迫抛物线系数 b
    pub b: f64,
    /// 淹没胁迫抛物线系数 c
    pub c: f64,
    /// 竞争胁迫系数
    pub d: f64,
    /// 竞争半饱和生物量 [kg/cell]
    pub b05: f64,
    /// 每次死亡移除的株数
    pub mort_plant: f64,

    /// 最大胸径 [cm]
    pub max_d: f64,
    /// 最大树高 [cm]
    pub max_h: f64,
    /// 树高-胸径关系系数 b2 [-]
    pub b2: f64,
    /// 树高-胸径关系系数 b3 [cm-1]
    pub b3: f64,
    /// 生长常数 G [cm yr-1]
    pub g: f64,

    /// 地上生物量异速生长系数（`AGB = bio_a · D^bio_b`，D 以 cm 计）
    pub bio_a: f64,
    /// 地上生物量异速生长指数
    pub bio_b: f64,

    /// 初始胸径 [m]
    pub ini_dia: f64,
    /// 初始株数 [1/cell]
    pub ini_num: f64,
    /// 定殖期开始
    pub col_start: MonthDay,
    /// 定殖期结束
    pub col_end: MonthDay,
    /// 随机定殖因子
    pub random: f64,

    /// 起始日期
    pub start_date: NaiveDate,
    /// 模拟年数
    pub sim_duration: usize,
    /// 每年的生态时间步数
    pub t_eco_year: usize,
}

impl Default for MangroveConstants {
    fn default() -> Self {
        Self {
            species: "Avicennia".into(),
            a: -8.0,
            b: 4.0,
            c: 0.5,
            d: -0.00002,
            b05: 250_000.0,
            mort_plant: 10.0,
            max_d: 140.0,
            max_h: 1000.0,
            b2: 48.04,
            b3: 0.172,
            g: 162.0,
            bio_a: 0.308,
            bio_b: 2.11,
            ini_dia: 0.01,
            ini_num: 750.0,
            col_start: MonthDay { month: 1, day: 1 },
            col_end: MonthDay { month: 12, day: 31 },
            random: 0.0,
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            sim_duration: 5,
            t_eco_year: 24,
        }
    }
}

impl MangroveConstants {
    /// 从键值输入文件读取
    pub fn from_input_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let params = InputParameters::from_file(path)?;
        let mut constants = Self::default();
        constants.apply(&params)?;
        constants.validate()?;
        Ok(constants)
    }

    /// 用输入参数覆盖当前值
    pub fn apply(&mut self, p: &InputParameters) -> Result<(), ConfigError> {
        if let Some(s) = p.get_str("species")? {
            self.species = s.to_string();
        }
        let fields: [(&[&str], &mut f64); 15] = [
            (&["a"], &mut self.a),
            (&["b"], &mut self.b),
            (&["c"], &mut self.c),
            (&["d"], &mut self.d),
            (&["B_05", "b05"], &mut self.b05),
            (&["Mort_plant", "mort_plant"], &mut self.mort_plant),
            (&["MaxD", "max_d"], &mut self.max_d),
            (&["MaxH", "max_h"], &mut self.max_h),
            (&["b2"], &mut self.b2),
            (&["b3"], &mut self.b3),
            (&["G", "g"], &mut self.g),
            (&["bio_a"], &mut self.bio_a),
            (&["bio_b"], &mut self.bio_b),
            (&["iniDia", "ini_dia"], &mut self.ini_dia),
            (&["iniNum", "ini_num"], &mut self.ini_num),
        ];
        for (keys, field) in fields {
            if let Some(v) = p.first_f64(keys)? {
                *field = v;
            }
        }
        if let Some(v) = p.get_f64("random")? {
            self.random = v;
        }
        if let Some(s) = p.first_str(&["ColStart", "col_start"])? {
            self.col_start = s
                .parse()
                .map_err(|e: nbs_foundation::NbsError| ConfigError::invalid("col_start", s, e.to_string()))?;
        }
        if let Some(s) = p.first_str(&["ColEnd", "col_end"])? {
            self.col_end = s
                .parse()
                .map_err(|e: nbs_foundation::NbsError| ConfigError::invalid("col_end", s, e.to_string()))?;
        }
        if let Some(s) = p.get_str("start_date")? {
            self.start_date = nbs_foundation::calendar::parse_date(s)
                .map_err(|e| ConfigError::invalid("start_date", s, e.to_string()))?;
        }
        if let Some(v) = p.get_f64("sim_duration")? {
            self.sim_duration = v.max(0.0) as usize;
        }
        if let Some(v) = p.get_f64("t_eco_year")? {
            self.t_eco_year = v.max(0.0) as usize;
        }
        Ok(())
    }

    /// 验证
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.t_eco_year == 0 {
            return Err(ConfigError::invalid("t_eco_year", self.t_eco_year, "必须为正"));
        }
        for (key, value) in [
            ("max_d", self.max_d),
            ("max_h", self.max_h),
            ("g", self.g),
            ("ini_dia", self.ini_dia),
            ("ini_num", self.ini_num),
            ("b05", self.b05),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::invalid(key, value, "必须为正"));
            }
        }
        if self.random < 0.0 {
            return Err(ConfigError::invalid("random", self.random, "不能为负"));
        }
        Ok(())
    }

    /// 生态时间步长度 [d]
    pub fn ets_duration(&self) -> f64 {
        365.0 / self.t_eco_year as f64
    }

    /// 每个生态时间步中的定殖天数
    pub fn col_days(&self) -> Vec<usize> {
        nbs_foundation::calendar::window_days_per_step(
            self.start_date,
            self.t_eco_year,
            self.ets_duration().round() as usize,
            self.col_start,
            self.col_end,
        )
    }

    /// 淹没胁迫 `I = a·P² + b·P + c`，截断为非负
    pub fn inundation_stress(&self, p: f64) -> f64 {
        (self.a * p * p + self.b * p + self.c).max(0.0)
    }

    /// 竞争胁迫 `C = 1 / (1 + exp(d·(B05 − B)))`
    pub fn competition_stress(&self, biomass: f64) -> f64 {
        1.0 / (1.0 + (self.d * (self.b05 - biomass)).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(MangroveConstants::default().validate().is_ok());
    }

    #[test]
    fn test_inundation_stress_peak_and_clip() {
        let c = MangroveConstants::default();
        // 顶点 P = -b/2a = 0.25, I = 1.0
        assert!((c.inundation_stress(0.25) - 1.0).abs() < 1e-12);
        assert_eq!(c.inundation_stress(1.0), 0.0);
    }

    #[test]
    fn test_competition_stress() {
        let c = MangroveConstants::default();
        assert!((c.competition_stress(c.b05) - 0.5).abs() < 1e-12);
        assert!(c.competition_stress(0.0) > 0.99);
        assert!(c.competition_stress(10.0 * c.b05) < 0.01);
    }

    #[test]
    fn test_apply_original_names() {
        let p = InputParameters::parse_str("MaxD = 100\nColStart = '03-01'\nB_05 = 1000\n", None)
            .unwrap();
        let mut c = MangroveConstants::default();
        c.apply(&p).unwrap();
        assert!((c.max_d - 100.0).abs() < 1e-12);
        assert!((c.b05 - 1000.0).abs() < 1e-12);
        assert_eq!(c.col_start, MonthDay { month: 3, day: 1 });
    }

    #[test]
    fn test_col_days_full_year_window() {
        let c = MangroveConstants::default();
        let days = c.col_days();
        assert_eq!(days.len(), 24);
        assert!(days.iter().all(|&d| d == 15));
    }
}

// crates/nbs_config/src/vegetation.rs

//! 盐沼植被物种常数
//!
//! 生命阶段参数以 `[juvenile, mature]` 两元素数组给出。
//! 内置三个物种（Salicornia、Spartina、Puccinellia），也可从 JSON 文档
//! 按物种名读取：
//!
//! ```json
//! { "Spartina": { "max_age": 20, "ini_col_frac": 0.6, ... } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use nbs_foundation::calendar::window_days_per_step;
use nbs_foundation::MonthDay;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 生命阶段数（幼年、成年）
pub const NUM_LIFE_STAGES: usize = 2;

/// 每个生命阶段一个值
pub type PerLifeStage = [f64; NUM_LIFE_STAGES];

/// 植被物种常数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegetationConstants {
    /// 物种名
    pub species: String,

    // ========================================================================
    // 定殖
    // ========================================================================
    /// 定殖期开始
    pub col_start: MonthDay,
    /// 定殖期结束
    pub col_end: MonthDay,
    /// 随机定殖因子，0 表示全部可定殖单元都定殖
    #[serde(default)]
    pub random: f64,
    /// 定殖所需泥沙含量 [-]
    #[serde(default)]
    pub mud_col: f64,
    /// 干湿判定的水深阈值 [m]
    #[serde(default = "default_fl_dr")]
    pub fl_dr: f64,
    /// 初始覆盖比例 [-]
    pub ini_col_frac: f64,
    /// 初始根长 [m]
    pub ini_root: f64,
    /// 初始株高 [m]
    pub ini_shoot: f64,
    /// 初始茎径 [m]
    pub ini_dia: f64,

    // ========================================================================
    // 生长
    // ========================================================================
    /// 最大年龄 [yr]
    pub max_age: usize,
    /// 生命阶段数
    #[serde(default = "default_num_ls")]
    pub num_ls: usize,
    /// 生长季开始
    pub growth_start: MonthDay,
    /// 生长季结束
    pub growth_end: MonthDay,
    /// 冬季开始
    pub winter_start: MonthDay,
    /// 最大株高 [m]
    pub max_growth_h: PerLifeStage,
    /// 最大茎径 [m]
    pub max_dia: PerLifeStage,
    /// 最大根长 [m]
    pub max_root: PerLifeStage,
    /// 各生命阶段持续年数
    pub max_years_ls: PerLifeStage,
    /// 茎密度 [m-2]
    pub num_stem: PerLifeStage,
    /// 阻力系数 [-]
    pub cd: PerLifeStage,
    /// 冬季最大株高 [m]
    pub max_h_winter: PerLifeStage,

    // ========================================================================
    // 死亡
    // ========================================================================
    /// 干旱死亡阈值（干燥时间比例）[-]
    pub des_mort_thres: PerLifeStage,
    /// 干旱死亡斜率 [-]
    pub des_mort_slope: PerLifeStage,
    /// 淹没死亡阈值（淹没时间比例）[-]
    pub flo_mort_thres: PerLifeStage,
    /// 淹没死亡斜率 [-]
    pub flo_mort_slope: PerLifeStage,
    /// 拔起死亡的流速阈值 [m s-1]
    pub vel_thres: PerLifeStage,
    /// 拔起死亡斜率 [s m-1]
    pub vel_slope: PerLifeStage,

    // ========================================================================
    // 模拟时间
    // ========================================================================
    /// 起始日期
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    /// 模拟年数
    #[serde(default = "default_sim_duration")]
    pub sim_duration: usize,
    /// 每年的生态时间步数
    #[serde(default = "default_t_eco_year")]
    pub t_eco_year: usize,
}

fn default_fl_dr() -> f64 { 0.05 }
fn default_num_ls() -> usize { NUM_LIFE_STAGES }
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default()
}
fn default_sim_duration() -> usize { 5 }
fn default_t_eco_year() -> usize { 24 }

fn md(month: u32, day: u32) -> MonthDay {
    MonthDay { month, day }
}

impl VegetationConstants {
    /// 内置物种名
    pub const BUILTIN_SPECIES: [&'static str; 3] = ["Salicornia", "Spartina", "Puccinellia"];

    /// 按名称取内置物种（大小写不敏感）
    pub fn builtin(species: &str) -> Result<Self, ConfigError> {
        match species.to_ascii_lowercase().as_str() {
            "salicornia" => Ok(Self::salicornia()),
            "spartina" => Ok(Self::spartina()),
            "puccinellia" => Ok(Self::puccinellia()),
            _ => Err(ConfigError::UnknownSpecies(species.to_string())),
        }
    }

    /// 一年生的 Salicornia
    pub fn salicornia() -> Self {
        Self {
            species: "Salicornia".into(),
            col_start: md(4, 1),
            col_end: md(5, 31),
            random: 0.0,
            mud_col: 0.0,
            fl_dr: default_fl_dr(),
            ini_col_frac: 0.6,
            ini_root: 0.02,
            ini_shoot: 0.015,
            ini_dia: 0.003,
            max_age: 1,
            num_ls: NUM_LIFE_STAGES,
            growth_start: md(4, 1),
            growth_end: md(9, 30),
            winter_start: md(10, 1),
            max_growth_h: [0.4, 0.4],
            max_dia: [0.004, 0.004],
            max_root: [0.15, 0.15],
            max_years_ls: [1.0, 0.0],
            num_stem: [700.0, 700.0],
            cd: [0.7, 0.7],
            max_h_winter: [0.0, 0.0],
            des_mort_thres: [0.95, 0.95],
            des_mort_slope: [2.0, 2.0],
            flo_mort_thres: [0.6, 0.6],
            flo_mort_slope: [0.5, 0.5],
            vel_thres: [0.25, 0.5],
            vel_slope: [3.0, 3.0],
            start_date: default_start_date(),
            sim_duration: default_sim_duration(),
            t_eco_year: default_t_eco_year(),
        }
    }

    /// 多年生的 Spartina anglica
    pub fn spartina() -> Self {
        Self {
            species: "Spartina".into(),
            col_start: md(5, 1),
            col_end: md(6, 30),
            random: 0.0,
            mud_col: 0.0,
            fl_dr: default_fl_dr(),
            ini_col_frac: 0.6,
            ini_root: 0.05,
            ini_shoot: 0.015,
            ini_dia: 0.003,
            max_age: 20,
            num_ls: NUM_LIFE_STAGES,
            growth_start: md(4, 1),
            growth_end: md(9, 30),
            winter_start: md(10, 1),
            max_growth_h: [0.8, 0.8],
            max_dia: [0.003, 0.005],
            max_root: [0.2, 1.0],
            max_years_ls: [1.0, 19.0],
            num_stem: [700.0, 700.0],
            cd: [1.1, 1.15],
            max_h_winter: [0.4, 0.4],
            des_mort_thres: [0.95, 0.95],
            des_mort_slope: [2.0, 2.0],
            flo_mort_thres: [0.4, 0.4],
            flo_mort_slope: [0.25, 0.25],
            vel_thres: [0.15, 0.25],
            vel_slope: [3.0, 3.0],
            start_date: default_start_date(),
            sim_duration: default_sim_duration(),
            t_eco_year: default_t_eco_year(),
        }
    }

    /// 多年生的 Puccinellia maritima
    pub fn puccinellia() -> Self {
        Self {
            species: "Puccinellia".into(),
            col_start: md(4, 15),
            col_end: md(6, 15),
            random: 0.0,
            mud_col: 0.0,
            fl_dr: default_fl_dr(),
            ini_col_frac: 0.4,
            ini_root: 0.03,
            ini_shoot: 0.02,
            ini_dia: 0.002,
            max_age: 10,
            num_ls: NUM_LIFE_STAGES,
            growth_start: md(3, 15),
            growth_end: md(9, 15),
            winter_start: md(10, 15),
            max_growth_h: [0.3, 0.4],
            max_dia: [0.002, 0.003],
            max_root: [0.1, 0.3],
            max_years_ls: [2.0, 8.0],
            num_stem: [1500.0, 1500.0],
            cd: [1.0, 1.0],
            max_h_winter: [0.15, 0.2],
            des_mort_thres: [0.98, 0.98],
            des_mort_slope: [2.0, 2.0],
            flo_mort_thres: [0.3, 0.3],
            flo_mort_slope: [0.3, 0.3],
            vel_thres: [0.2, 0.3],
            vel_slope: [3.0, 3.0],
            start_date: default_start_date(),
            sim_duration: default_sim_duration(),
            t_eco_year: default_t_eco_year(),
        }
    }

    /// 从按物种名组织的 JSON 文档读取
    pub fn from_json_file<P: AsRef<Path>>(path: P, species: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content, species)
    }

    /// 从 JSON 字符串读取
    pub fn from_json_str(content: &str, species: &str) -> Result<Self, ConfigError> {
        let mut all: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut value = all
            .remove(species)
            .ok_or_else(|| ConfigError::UnknownSpecies(species.to_string()))?;
        if let serde_json::Value::Object(map) = &mut value {
            map.entry("species")
                .or_insert_with(|| serde_json::Value::String(species.to_string()));
        }
        let constants: Self =
            serde_json::from_value(value).map_err(|e| ConfigError::Parse(e.to_string()))?;
        constants.validate()?;
        Ok(constants)
    }

    /// 验证
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.t_eco_year == 0 || self.t_eco_year > 365 {
            return Err(ConfigError::invalid(
                "t_eco_year",
                self.t_eco_year,
                "必须在 [1, 365] 范围内",
            ));
        }
        if !(0.0..=1.0).contains(&self.ini_col_frac) || self.ini_col_frac == 0.0 {
            return Err(ConfigError::invalid(
                "ini_col_frac",
                self.ini_col_frac,
                "必须在 (0, 1] 范围内",
            ));
        }
        if self.random < 0.0 {
            return Err(ConfigError::invalid("random", self.random, "不能为负"));
        }
        if self.num_ls != NUM_LIFE_STAGES {
            return Err(ConfigError::invalid(
                "num_ls",
                self.num_ls,
                format!("仅支持 {NUM_LIFE_STAGES} 个生命阶段"),
            ));
        }
        if self.max_age == 0 {
            return Err(ConfigError::invalid("max_age", self.max_age, "必须为正"));
        }
        Ok(())
    }

    /// 生态时间步长度 [d]
    pub fn ets_duration(&self) -> f64 {
        365.0 / self.t_eco_year as f64
    }

    /// 生态时间步长度取整 [d]
    fn ets_days(&self) -> usize {
        self.ets_duration().round() as usize
    }

    /// 每个生态时间步中的生长天数
    pub fn growth_days(&self) -> Vec<usize> {
        window_days_per_step(
            self.start_date,
            self.t_eco_year,
            self.ets_days(),
            self.growth_start,
            self.growth_end,
        )
    }

    /// 每个生态时间步中的定殖天数
    pub fn col_days(&self) -> Vec<usize> {
        window_days_per_step(
            self.start_date,
            self.t_eco_year,
            self.ets_days(),
            self.col_start,
            self.col_end,
        )
    }

    /// 每个生态时间步中的冬季天数（冬季开始至年末以及年初至生长季开始前）
    pub fn winter_days(&self) -> Vec<usize> {
        let year_end = md(12, 31);
        let year_start = md(1, 1);
        let late = window_days_per_step(
            self.start_date,
            self.t_eco_year,
            self.ets_days(),
            self.winter_start,
            year_end,
        );
        let early = if self.growth_start > year_start {
            let (m, d) = if self.growth_start.day > 1 {
                (self.growth_start.month, self.growth_start.day - 1)
            } else {
                let prev = self.growth_start.month.saturating_sub(1).max(1);
                (prev, last_day_of_month(prev))
            };
            window_days_per_step(
                self.start_date,
                self.t_eco_year,
                self.ets_days(),
                year_start,
                md(m, d),
            )
        } else {
            vec![0; self.t_eco_year]
        };
        late.iter().zip(early).map(|(a, b)| a + b).collect()
    }
}

fn last_day_of_month(month: u32) -> u32 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_species() {
        for name in VegetationConstants::BUILTIN_SPECIES {
            let c = VegetationConstants::builtin(name).unwrap();
            assert_eq!(c.species, name);
            assert!(c.validate().is_ok());
        }
        assert!(VegetationConstants::builtin("spartina").is_ok());
        assert!(matches!(
            VegetationConstants::builtin("Zostera"),
            Err(ConfigError::UnknownSpecies(_))
        ));
    }

    #[test]
    fn test_ets_duration() {
        let c = VegetationConstants::spartina();
        assert!((c.ets_duration() - 365.0 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_growth_and_col_days() {
        let c = VegetationConstants::spartina();
        let growth = c.growth_days();
        assert_eq!(growth.len(), 24);
        // 15 天一步: 第 1 步 1/1-1/15 不在生长季
        assert_eq!(growth[0], 0);
        // 第 8 步从 4/16 开始（第 106 天），整步位于生长季
        assert_eq!(growth[7], 15);
        let col = c.col_days();
        assert!(col.iter().sum::<usize>() > 0);
        assert_eq!(col[0], 0);
    }

    #[test]
    fn test_winter_days_cover_year_edges() {
        let c = VegetationConstants::spartina();
        let winter = c.winter_days();
        assert_eq!(winter[0], 15);
        assert_eq!(winter[10], 0);
    }

    #[test]
    fn test_from_json_str() {
        let mut c = VegetationConstants::spartina();
        c.ini_col_frac = 0.3;
        let json = serde_json::json!({ "Spartina": c }).to_string();
        let parsed = VegetationConstants::from_json_str(&json, "Spartina").unwrap();
        assert!((parsed.ini_col_frac - 0.3).abs() < 1e-12);
        assert_eq!(parsed.col_start, md(5, 1));
        assert!(VegetationConstants::from_json_str(&json, "Salicornia").is_err());
    }

    #[test]
    fn test_from_json_file_fills_species_name() {
        let mut value = serde_json::to_value(VegetationConstants::puccinellia()).unwrap();
        value.as_object_mut().unwrap().remove("species");
        value.as_object_mut().unwrap().remove("t_eco_year");
        let doc = serde_json::json!({ "Puccinellia": value });
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veg_constants.json");
        std::fs::write(&path, doc.to_string()).unwrap();
        let c = VegetationConstants::from_json_file(&path, "Puccinellia").unwrap();
        assert_eq!(c.species, "Puccinellia");
        assert_eq!(c.t_eco_year, 24);
    }
}

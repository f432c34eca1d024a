// crates/nbs_config/src/simulation_config.rs

//! SimulationConfig - 模拟配置（JSON）
//!
//! 描述一次模拟所需的全部输入：生物类型、水动力模式、环境时间序列、
//! 输出选项和初始覆盖范围。

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 支持的水动力模式名
pub const SUPPORTED_MODES: [&str; 4] = ["Reef0D", "Transect", "FlowFMModel", "DimrModel"];

/// 需要外部 BMI 引擎的模式
pub const BMI_MODES: [&str; 2] = ["FlowFMModel", "DimrModel"];

/// 生物类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BiotaKind {
    /// 珊瑚
    #[default]
    Coral,
    /// 盐沼植被
    Vegetation,
    /// 红树林
    Mangrove,
}

impl BiotaKind {
    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Coral => "Coral",
            Self::Vegetation => "Vegetation",
            Self::Mangrove => "Mangrove",
        }
    }
}

/// 模拟配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 模拟名称
    #[serde(default = "default_name")]
    pub name: String,

    /// 生物类型
    #[serde(default)]
    pub biota: BiotaKind,

    /// 水动力模式
    #[serde(default = "default_mode")]
    pub mode: String,

    /// 工作目录
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// 常数文件（珊瑚/红树林为键值文件，植被为 JSON）
    #[serde(default)]
    pub constants_file: Option<PathBuf>,

    /// 植被物种（1 或 2 个）
    #[serde(default)]
    pub species: Vec<String>,

    /// 环境输入
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// 水动力配置
    #[serde(default)]
    pub hydrodynamics: HydrodynamicsConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 初始覆盖
    #[serde(default)]
    pub initial: InitialConfig,

    /// 模拟年数，缺省时取常数中的值
    #[serde(default)]
    pub duration: Option<usize>,

    /// 随机定殖的种子
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_name() -> String { "nbs_simulation".to_string() }
fn default_mode() -> String { "Transect".to_string() }
fn default_working_dir() -> PathBuf { PathBuf::from(".") }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            biota: BiotaKind::default(),
            mode: default_mode(),
            working_dir: default_working_dir(),
            constants_file: None,
            species: Vec::new(),
            environment: EnvironmentConfig::default(),
            hydrodynamics: HydrodynamicsConfig::default(),
            output: OutputConfig::default(),
            initial: InitialConfig::default(),
            duration: None,
            seed: None,
        }
    }
}

/// 环境参数来源：常数或时间序列文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterSource {
    /// 常数值
    Constant(f64),
    /// 文件路径
    File(PathBuf),
}

/// 环境输入配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// 光照 [µE m-2 s-1]
    #[serde(default)]
    pub light: Option<ParameterSource>,
    /// 光衰减系数 [m-1]
    #[serde(default)]
    pub light_attenuation: Option<ParameterSource>,
    /// 温度 [K 或 °C]
    #[serde(default)]
    pub temperature: Option<ParameterSource>,
    /// 文石饱和度 [-]
    #[serde(default)]
    pub aragonite: Option<ParameterSource>,
    /// 风暴等级（按年）
    #[serde(default)]
    pub storm_category: Option<ParameterSource>,
    /// 起始日期（使用常数输入时需要）
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// 结束日期
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// 水动力配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrodynamicsConfig {
    /// 定义文件（mdu 或断面波浪文件）
    #[serde(default)]
    pub definition_file: Option<PathBuf>,
    /// 配置文件（dimr 配置或断面 CSV）
    #[serde(default)]
    pub config_file: Option<PathBuf>,
    /// Delft3D 安装目录
    #[serde(default)]
    pub d3d_home: Option<PathBuf>,
    /// 动态库路径
    #[serde(default)]
    pub dll_path: Option<PathBuf>,
    /// 耦合间隔 [s]
    #[serde(default = "default_update_interval")]
    pub update_interval: f64,
    /// 风暴耦合间隔 [s]
    #[serde(default = "default_update_interval")]
    pub update_interval_storm: f64,
    /// Reef0D 水深 [m]
    #[serde(default = "default_water_depth")]
    pub water_depth: f64,
    /// Reef0D 流速 [m s-1]
    #[serde(default = "default_current_velocity")]
    pub current_velocity: f64,
    /// Reef0D 波高 [m]
    #[serde(default = "default_wave_height")]
    pub wave_height: f64,
    /// Reef0D 波周期 [s]
    #[serde(default = "default_wave_period")]
    pub wave_period: f64,
}

fn default_update_interval() -> f64 { 300.0 }
fn default_water_depth() -> f64 { 10.0 }
fn default_current_velocity() -> f64 { 0.5 }
fn default_wave_height() -> f64 { 1.0 }
fn default_wave_period() -> f64 { 4.0 }

impl Default for HydrodynamicsConfig {
    fn default() -> Self {
        Self {
            definition_file: None,
            config_file: None,
            d3d_home: None,
            dll_path: None,
            update_interval: default_update_interval(),
            update_interval_storm: default_update_interval(),
            water_depth: default_water_depth(),
            current_velocity: default_current_velocity(),
            wave_height: default_wave_height(),
            wave_period: default_wave_period(),
        }
    }
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON 数据集
    #[default]
    Json,
    /// netCDF（需启用 `netcdf` 特性）
    #[serde(alias = "netCDF", alias = "nc")]
    Netcdf,
}

impl OutputFormat {
    /// 文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Netcdf => "nc",
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出格式
    #[serde(default)]
    pub format: OutputFormat,
    /// 是否输出 map 文件
    #[serde(default = "default_true")]
    pub map: bool,
    /// 是否输出 his 文件
    #[serde(default = "default_true")]
    pub his: bool,
    /// 输出变量组，空表示全部
    #[serde(default)]
    pub groups: Vec<String>,
    /// 输出目录，缺省为 `<working_dir>/output`
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_true() -> bool { true }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            map: true,
            his: true,
            groups: Vec::new(),
            directory: None,
        }
    }
}

/// 初始覆盖配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialConfig {
    /// x 范围
    #[serde(default)]
    pub x_range: Option<(f64, f64)>,
    /// y 范围
    #[serde(default)]
    pub y_range: Option<(f64, f64)>,
    /// 范围内的覆盖度 [-]
    #[serde(default = "default_cover")]
    pub cover: f64,
}

fn default_cover() -> f64 { 1.0 }

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            x_range: None,
            y_range: None,
            cover: default_cover(),
        }
    }
}

impl SimulationConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let config: SimulationConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 是否需要外部 BMI 引擎
    pub fn requires_bmi(&self) -> bool {
        BMI_MODES.contains(&self.mode.as_str())
    }

    /// 输出目录
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .directory
            .clone()
            .unwrap_or_else(|| self.working_dir.join("output"))
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_MODES.contains(&self.mode.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "mode".to_string(),
                value: self.mode.clone(),
                reason: format!("支持的模式: {:?}", SUPPORTED_MODES),
            });
        }

        if self.biota != BiotaKind::Coral && !self.requires_bmi() {
            return Err(ConfigError::InvalidValue {
                key: "mode".to_string(),
                value: self.mode.clone(),
                reason: format!("{} 模拟仅支持 {:?}", self.biota.name(), BMI_MODES),
            });
        }

        let hydro = &self.hydrodynamics;
        if hydro.update_interval <= 0.0 {
            return Err(ConfigError::invalid(
                "hydrodynamics.update_interval",
                hydro.update_interval,
                "耦合间隔必须为正",
            ));
        }
        if hydro.update_interval_storm <= 0.0 {
            return Err(ConfigError::invalid(
                "hydrodynamics.update_interval_storm",
                hydro.update_interval_storm,
                "耦合间隔必须为正",
            ));
        }
        if hydro.water_depth <= 0.0 {
            return Err(ConfigError::invalid(
                "hydrodynamics.water_depth",
                hydro.water_depth,
                "水深必须为正",
            ));
        }

        if !(0.0..=1.0).contains(&self.initial.cover) {
            return Err(ConfigError::invalid(
                "initial.cover",
                self.initial.cover,
                "覆盖度必须在 [0, 1] 范围内",
            ));
        }

        match self.biota {
            BiotaKind::Vegetation => {
                if self.species.is_empty() || self.species.len() > 2 {
                    return Err(ConfigError::invalid(
                        "species",
                        format!("{:?}", self.species),
                        "植被模拟需要 1 或 2 个物种",
                    ));
                }
            }
            BiotaKind::Mangrove | BiotaKind::Coral => {
                if self.species.len() > 1 {
                    return Err(ConfigError::invalid(
                        "species",
                        format!("{:?}", self.species),
                        "最多 1 个物种",
                    ));
                }
            }
        }

        if let (Some(start), Some(end)) = (self.environment.start_date, self.environment.end_date) {
            if end < start {
                return Err(ConfigError::invalid(
                    "environment.end_date",
                    end,
                    "结束日期早于起始日期",
                ));
            }
        }

        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mode, "Transect");
        assert!(!config.requires_bmi());
    }

    #[test]
    fn test_unknown_mode() {
        let config = SimulationConfig {
            mode: "Reef1D".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_vegetation_requires_bmi_mode_and_species() {
        let mut config = SimulationConfig {
            biota: BiotaKind::Vegetation,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.mode = "FlowFMModel".into();
        assert!(config.validate().is_err());
        config.species = vec!["Spartina".into(), "Salicornia".into()];
        assert!(config.validate().is_ok());
        config.species.push("Puccinellia".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_cover_and_interval() {
        let mut config = SimulationConfig::default();
        config.initial.cover = 1.5;
        assert!(config.validate().is_err());
        let mut config = SimulationConfig::default();
        config.hydrodynamics.update_interval = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parameter_source_untagged() {
        let json = r#"{
            "biota": "Coral",
            "mode": "Reef0D",
            "environment": {
                "light": 600.0,
                "temperature": "input/TS_TEMP.txt",
                "start_date": "2000-01-01",
                "end_date": "2001-12-31"
            },
            "output": { "format": "netcdf", "groups": ["lme", "pd"] }
        }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.environment.light, Some(ParameterSource::Constant(600.0)));
        assert_eq!(
            config.environment.temperature,
            Some(ParameterSource::File(PathBuf::from("input/TS_TEMP.txt")))
        );
        assert_eq!(config.output.format, OutputFormat::Netcdf);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simulation.json");
        let config = SimulationConfig {
            name: "reef".into(),
            duration: Some(3),
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();
        let loaded = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(loaded.name, "reef");
        assert_eq!(loaded.duration, Some(3));
        assert_eq!(loaded.output_dir(), PathBuf::from(".").join("output"));
    }
}

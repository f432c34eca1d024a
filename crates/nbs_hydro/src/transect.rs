// crates/nbs_hydro/src/transect.rs

//! 一维断面模型
//!
//! 配置文件（逗号分隔，带表头）给出每个点的 `x, y, z, Uc, outpoint`，
//! 定义文件（空白分隔）给出各风暴等级的 `stormcat Hs Tp wl`。

use std::path::{Path, PathBuf};

use glam::DVec2;
use nbs_config::HydrodynamicsConfig;
use ndarray::Array1;
use tracing::{debug, info};

use crate::error::{HydroError, HydroResult};
use crate::mode::HydroMode;
use crate::protocol::{HydroCoupling, HydroUpdate, HydrodynamicProtocol};
use crate::waves::{soulsby_orbital_velocity, MIN_DEPTH};

/// 风暴等级数（0..=3）
pub const NUM_STORM_CATEGORIES: usize = 4;

/// 某一风暴等级的海况
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StormCondition {
    /// 有效波高 [m]
    pub wave_height: f64,
    /// 峰值周期 [s]
    pub peak_period: f64,
    /// 水位 [m]
    pub water_level: f64,
}

/// 断面上的一个点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransectPoint {
    /// 坐标
    pub xy: DVec2,
    /// 床面高程 [m]
    pub bed_level: f64,
    /// 平均流速 [m s-1]
    pub current: f64,
    /// 是否为输出点
    pub outpoint: bool,
}

/// 断面模型
#[derive(Debug, Clone)]
pub struct Transect {
    /// 工作目录
    pub working_dir: PathBuf,
    /// 断面配置文件
    pub config_file: Option<PathBuf>,
    /// 风暴定义文件
    pub definition_file: Option<PathBuf>,
    points: Vec<TransectPoint>,
    xy: Vec<DVec2>,
    storms: Vec<Option<StormCondition>>,
}

impl Transect {
    /// 由水动力配置创建，相对路径以工作目录为基准
    pub fn new(working_dir: impl Into<PathBuf>, config: &HydrodynamicsConfig) -> Self {
        let working_dir = working_dir.into();
        let resolve = |p: &Option<PathBuf>| p.as_ref().map(|p| working_dir.join(p));
        Self {
            config_file: resolve(&config.config_file),
            definition_file: resolve(&config.definition_file),
            working_dir,
            points: Vec::new(),
            xy: Vec::new(),
            storms: Vec::new(),
        }
    }

    /// 已读取的断面点
    pub fn points(&self) -> &[TransectPoint] {
        &self.points
    }

    /// 某一风暴等级的海况
    pub fn storm_condition(&self, storm_category: u8) -> HydroResult<StormCondition> {
        if self.storms.is_empty() {
            return Err(self.not_initialized());
        }
        self.storms
            .get(storm_category as usize)
            .copied()
            .flatten()
            .ok_or_else(|| {
                HydroError::parse(
                    self.definition_file.clone().unwrap_or_default(),
                    0,
                    format!("未定义风暴等级 {storm_category}"),
                )
            })
    }

    fn not_initialized(&self) -> HydroError {
        HydroError::NotInitialized {
            component: "Transect",
            hint: "initiate()",
        }
    }

    fn ensure_initiated(&self) -> HydroResult<()> {
        if self.points.is_empty() {
            Err(self.not_initialized())
        } else {
            Ok(())
        }
    }
}

fn read_file(path: &Path) -> HydroResult<String> {
    std::fs::read_to_string(path).map_err(|source| HydroError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// 解析断面配置（逗号分隔）
pub fn parse_transect_config(content: &str, file: &Path) -> HydroResult<Vec<TransectPoint>> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());
    let header: Vec<String> = match lines.next() {
        Some((_, l)) => l.split(',').map(|s| s.trim().to_ascii_lowercase()).collect(),
        None => return Err(HydroError::parse(file, 1, "缺少表头")),
    };
    let column = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| HydroError::parse(file, 1, format!("缺少 '{name}' 列")))
    };
    let (cx, cy, cz, cu, co) = (
        column("x")?,
        column("y")?,
        column("z")?,
        column("uc")?,
        column("outpoint")?,
    );

    let mut points = Vec::new();
    for (i, line) in lines {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        let value = |c: usize| -> HydroResult<f64> {
            let cell = cells.get(c).copied().unwrap_or("");
            cell.parse::<f64>()
                .map_err(|_| HydroError::parse(file, i + 1, format!("无法解析数值 '{cell}'")))
        };
        points.push(TransectPoint {
            xy: DVec2::new(value(cx)?, value(cy)?),
            bed_level: value(cz)?,
            current: value(cu)?,
            outpoint: value(co)? != 0.0,
        });
    }
    Ok(points)
}

/// 解析风暴定义（空白分隔 `stormcat Hs Tp wl`，可带表头）
pub fn parse_storm_definition(
    content: &str,
    file: &Path,
) -> HydroResult<Vec<Option<StormCondition>>> {
    let mut storms = vec![None; NUM_STORM_CATEGORIES];
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let values: Result<Vec<f64>, _> = line.split_whitespace().map(str::parse::<f64>).collect();
        let values = match values {
            Ok(v) => v,
            // 首行可以是表头
            Err(_) if i == 0 => continue,
            Err(_) => return Err(HydroError::parse(file, i + 1, "无法解析数值")),
        };
        if values.len() < 4 {
            return Err(HydroError::parse(file, i + 1, "需要 stormcat Hs Tp wl 四列"));
        }
        let category = values[0];
        if category < 0.0 || category.fract() != 0.0 || category as usize >= NUM_STORM_CATEGORIES
        {
            return Err(HydroError::parse(
                file,
                i + 1,
                format!("风暴等级须为 0..{}", NUM_STORM_CATEGORIES - 1),
            ));
        }
        storms[category as usize] = Some(StormCondition {
            wave_height: values[1],
            peak_period: values[2],
            water_level: values[3],
        });
    }
    if storms[0].is_none() {
        return Err(HydroError::parse(file, 0, "缺少风暴等级 0 的海况"));
    }
    Ok(storms)
}

impl HydrodynamicProtocol for Transect {
    fn mode(&self) -> HydroMode {
        HydroMode::Transect
    }

    fn settings(&self) -> String {
        let show = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".into())
        };
        format!(
            "Transect: config = {}, definition = {}",
            show(&self.config_file),
            show(&self.definition_file)
        )
    }

    fn xy_coordinates(&self) -> &[DVec2] {
        &self.xy
    }

    fn water_depth(&self) -> HydroResult<Array1<f64>> {
        self.ensure_initiated()?;
        let calm = self.storm_condition(0)?;
        Ok(self
            .points
            .iter()
            .map(|p| (calm.water_level - p.bed_level).max(MIN_DEPTH))
            .collect())
    }

    fn outpoint(&self) -> Vec<bool> {
        self.points.iter().map(|p| p.outpoint).collect()
    }

    fn initiate(&mut self) -> HydroResult<()> {
        let config_file = self
            .config_file
            .clone()
            .ok_or(HydroError::MissingSetting("config_file"))?;
        let definition_file = self
            .definition_file
            .clone()
            .ok_or(HydroError::MissingSetting("definition_file"))?;

        self.points = parse_transect_config(&read_file(&config_file)?, &config_file)?;
        self.storms = parse_storm_definition(&read_file(&definition_file)?, &definition_file)?;
        self.xy = self.points.iter().map(|p| p.xy).collect();
        info!("Transect 初始化: {} 个点", self.points.len());
        Ok(())
    }

    fn update(
        &mut self,
        _coupling: &dyn HydroCoupling,
        storm_category: u8,
    ) -> HydroResult<HydroUpdate> {
        self.ensure_initiated()?;
        let calm = self.storm_condition(0)?;
        let sea = self.storm_condition(storm_category)?;
        let scale = if storm_category > 0 && calm.wave_height > 0.0 {
            sea.wave_height / calm.wave_height
        } else {
            1.0
        };
        debug!("Transect 更新: 风暴等级 {storm_category}, 流速比例 {scale}");

        let n = self.points.len();
        let current_vel: Array1<f64> = self.points.iter().map(|p| p.current * scale).collect();
        let wave_vel: Array1<f64> = self
            .points
            .iter()
            .map(|p| {
                let depth = sea.water_level - p.bed_level;
                soulsby_orbital_velocity(sea.wave_height, sea.peak_period, depth)
            })
            .collect();
        Ok(HydroUpdate {
            current_vel,
            wave_vel,
            wave_per: Array1::from_elem(n, sea.peak_period),
        })
    }

    fn finalise(&mut self) -> HydroResult<()> {
        Ok(())
    }
}

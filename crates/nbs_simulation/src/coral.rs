// crates/nbs_simulation/src/coral.rs

//! 珊瑚模拟
//!
//! 支持全部水动力模式。每年的过程链：
//!
//! ```text
//! 水动力 (stormcat 0) → 光照 → 流动 → 温度 → 光合 → 种群状态 → 钙化 → 形态
//!   → [风暴年] 水动力 (stormcat) → 脱落
//!   → 补充 → map / his 写出
//! ```

use chrono::Datelike;
use nbs_biota::coral::output::{his_values, his_variables, map_values, map_variables, parse_groups};
use nbs_biota::coral::{
    Calcification, Dislodgement, Flow, Light, Morphology, Photosynthesis, PopulationStates,
    Recruitment, Temperature,
};
use nbs_biota::{Coral, CoralMorphology, CoralOutputGroup};
use nbs_config::{CoralConstants, OutputConfig};
use nbs_foundation::SpaceTime;
use nbs_hydro::{HydroMode, HydrodynamicProtocol};
use nbs_io::{DailySeries, Environment, IoError, OutputWrapper};
use ndarray::Axis;
use tracing::{debug, info, info_span, warn};

use crate::biota_wrapper::{configure_output, BiotaWrapper, OutputGrid};
use crate::directories::SimulationDirectories;
use crate::error::{SimulationError, SimulationResult};
use crate::protocol::{initial_cover, Range, RunSummary, SimulationProtocol};

/// 输出文件使用的模型名
pub const MODEL_NAME: &str = "CoralModel";

/// 物种常数 Csp
const SPECIES_CONSTANT: f64 = 1.0;

/// 珊瑚模拟
pub struct CoralSimulation {
    /// 目录
    pub directories: SimulationDirectories,
    /// 珊瑚常数
    pub constants: CoralConstants,
    /// 初始形态
    pub morphology: CoralMorphology,
    /// 环境条件
    pub environment: Environment,
    /// 输出配置
    pub output_config: OutputConfig,
    /// 用户预设的输出，初始化时补全
    pub output: Option<OutputWrapper>,
    hydrodynamics: Box<dyn HydrodynamicProtocol>,
    coral: Option<BiotaWrapper<Coral>>,
}

impl CoralSimulation {
    /// 创建
    pub fn new(
        constants: CoralConstants,
        environment: Environment,
        hydrodynamics: Box<dyn HydrodynamicProtocol>,
        directories: SimulationDirectories,
    ) -> Self {
        Self {
            directories,
            constants,
            morphology: CoralMorphology::default(),
            environment,
            output_config: OutputConfig::default(),
            output: None,
            hydrodynamics,
            coral: None,
        }
    }

    /// 设置初始形态
    pub fn with_morphology(mut self, morphology: CoralMorphology) -> Self {
        self.morphology = morphology;
        self
    }

    /// 设置输出配置
    pub fn with_output_config(mut self, config: OutputConfig) -> Self {
        self.output_config = config;
        self
    }

    /// 预设输出
    pub fn with_output(mut self, output: OutputWrapper) -> Self {
        self.output = Some(output);
        self
    }

    /// 水动力模型
    pub fn hydrodynamics(&self) -> &dyn HydrodynamicProtocol {
        self.hydrodynamics.as_ref()
    }

    /// 珊瑚及其输出（初始化后可用）
    pub fn coral(&self) -> Option<&BiotaWrapper<Coral>> {
        self.coral.as_ref()
    }

    /// 初始化水动力模型
    pub fn configure_hydrodynamics(&mut self) -> SimulationResult<()> {
        self.hydrodynamics.initiate()?;
        info!("{}", self.hydrodynamics.settings());
        Ok(())
    }

    /// 创建或补全输出包装器，his 站点取水动力模型的输出点
    pub fn configure_output(&mut self) -> SimulationResult<OutputWrapper> {
        let first_date = self
            .environment
            .first_date()
            .ok_or_else(|| IoError::MissingData("simulation dates".into()))?;
        let outpoint = self.hydrodynamics.outpoint();
        let grid = OutputGrid {
            xy: self.hydrodynamics.xy_coordinates(),
            outpoint: &outpoint,
            first_date,
        };
        Ok(configure_output(
            self.output.take(),
            MODEL_NAME,
            grid,
            &self.output_config,
            &self.directories.output_dir,
        ))
    }

    fn initialize_output(
        &self,
        output: &mut OutputWrapper,
        groups: &[CoralOutputGroup],
        coral: &Coral,
    ) -> SimulationResult<()> {
        output.initialize_dirs()?;
        if let Some(map) = output.map_output.as_mut() {
            map.initialize(
                &format!("{MODEL_NAME} mapped data"),
                &map_variables(groups),
                &map_values(coral),
            )?;
        }
        if let Some(his) = output.his_output.as_mut() {
            his.initialize(&format!("{MODEL_NAME} history data"), &his_variables(groups))?;
        }
        Ok(())
    }
}

/// 某年的子序列，没有数据时报错
fn year_series(
    series: Option<&DailySeries>,
    parameter: &'static str,
    year: i32,
) -> SimulationResult<DailySeries> {
    series
        .map(|s| s.year(year))
        .filter(|s| !s.is_empty())
        .ok_or(SimulationError::MissingYear { parameter, year })
}

impl SimulationProtocol for CoralSimulation {
    fn mode(&self) -> HydroMode {
        self.hydrodynamics.mode()
    }

    fn initiate(&mut self, x_range: Range, y_range: Range, value: Option<f64>) -> SimulationResult<()> {
        self.directories.validate_simulation_directories()?;
        self.configure_hydrodynamics()?;
        self.environment
            .validate_for_coral(self.constants.kd0, self.constants.omega_a0)?;
        self.constants.correct_processes();

        let cover = initial_cover(
            self.hydrodynamics.xy_coordinates(),
            x_range,
            y_range,
            value.unwrap_or(1.0),
        );
        let mut coral = Coral::new(
            self.constants.clone(),
            self.morphology,
            SPECIES_CONSTANT,
            self.hydrodynamics.space(),
        );
        coral.initiate_coral_morphology(&cover)?;

        let groups = parse_groups(&self.output_config.groups)?;
        let mut output = self.configure_output()?;
        self.initialize_output(&mut output, &groups, &coral)?;
        if !output.defined() {
            warn!("No output defined, so none exported.");
        }

        info!(
            "珊瑚模拟已初始化: {} 个网格, 初始覆盖 {:.3}",
            coral.space(),
            cover.mean().unwrap_or(0.0)
        );
        self.coral = Some(BiotaWrapper::new(coral, Some(output)));
        Ok(())
    }

    fn run(&mut self, duration: Option<usize>) -> SimulationResult<RunSummary> {
        let Self {
            environment,
            hydrodynamics,
            coral: wrapper,
            ..
        } = self;
        let wrapper = wrapper
            .as_mut()
            .ok_or(SimulationError::NotInitiated(MODEL_NAME))?;

        let first_year = environment
            .first_date()
            .map(|d| d.year())
            .ok_or_else(|| IoError::MissingData("simulation dates".into()))?;
        let duration = duration.unwrap_or_else(|| environment.years().len());
        let years: Vec<i32> = (first_year..first_year + duration as i32).collect();

        let temp_kelvin = environment.temp_kelvin()?;
        let temp_mmm = environment.temp_mmm()?;
        let space = hydrodynamics.space();

        for &year in &years {
            let _span = info_span!("coral", year).entered();
            let coral = &mut wrapper.biota;

            let light = year_series(environment.light.as_ref(), "light", year)?;
            let lac = year_series(environment.light_attenuation.as_ref(), "light_attenuation", year)?;
            let temperature = year_series(Some(&temp_kelvin), "temperature", year)?;
            let aragonite = year_series(environment.aragonite.as_ref(), "aragonite", year)?;
            let spacetime = SpaceTime::new(space, light.len());

            // 水动力
            let hydro = hydrodynamics.update(&*coral, 0)?;
            let depth = hydrodynamics.water_depth()?;

            // 微环境
            Light::new(spacetime, light.values(), lac.values(), &depth.to_vec())?
                .rep_light(coral)?;
            let in_canopy = coral.constants.fme;
            let flow = Flow::new(hydro.current_vel, hydro.wave_vel, depth.clone(), hydro.wave_per)?;
            flow.velocities(coral, in_canopy)?;
            flow.thermal_boundary_layer(coral);
            Temperature::new(spacetime, temperature.values())?.coral_temperature(coral)?;

            // 生理
            Photosynthesis::new(light.values().to_vec(), temp_mmm.clone(), year)
                .photo_rate(coral)?;
            PopulationStates::new().pop_states(coral)?;
            Calcification::new().calcification_rate(coral, aragonite.values())?;

            // 形态
            Morphology::new(coral.calc.sum_axis(Axis(1)), light.values()).update(coral)?;

            // 风暴
            let stormcat = environment.storm_category_for(year);
            if stormcat > 0 {
                let storm = hydrodynamics.update(&*coral, stormcat)?;
                Flow::new(storm.current_vel, storm.wave_vel, depth, storm.wave_per)?
                    .velocities(coral, false)?;
                Dislodgement::new().update(coral);
                debug!("风暴等级 {stormcat}: 已计算脱落");
            }

            // 补充
            Recruitment::new().update(coral)?;

            // 写出
            if let Some(output) = wrapper.output.as_mut() {
                let idx_stations = output.idx_stations().to_vec();
                if let Some(map) = output.map_output.as_mut() {
                    map.update(year, &map_values(&wrapper.biota))?;
                }
                if let Some(his) = output.his_output.as_mut() {
                    his.update(light.dates(), &his_values(&wrapper.biota, &idx_stations))?;
                }
            }
            info!(
                "年份 {year} 完成, 平均活珊瑚覆盖 {:.4}",
                wrapper.biota.living_cover().mean().unwrap_or(0.0)
            );
        }

        Ok(RunSummary {
            model: MODEL_NAME,
            years,
            space,
            mean_cover: wrapper.biota.living_cover().mean().unwrap_or(0.0),
        })
    }

    fn finalise(&mut self) -> SimulationResult<()> {
        self.hydrodynamics.finalise()?;
        info!("{MODEL_NAME} 模拟结束");
        Ok(())
    }
}

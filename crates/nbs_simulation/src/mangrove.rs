// crates/nbs_simulation/src/mangrove.rs

//! 红树林模拟
//!
//! 需要 FlowFM 或 DIMR 模式。每个生态时间步依次执行
//! 水动力-地貌推进、死亡、生长、定殖（定殖期）并写出结果。

use nbs_biota::mangrove::output::{his_values, map_values, VARIABLES};
use nbs_biota::mangrove::{
    MangroveColonisation, MangroveGrowth, MangroveHydroMorphodynamics, MangroveMortality,
};
use nbs_biota::Mangrove;
use nbs_config::{MangroveConstants, OutputConfig};
use nbs_hydro::{HydroMode, HydrodynamicProtocol};
use tracing::{debug, info, info_span, warn};

use crate::biota_wrapper::{configure_output, BiotaWrapper, OutputGrid};
use crate::directories::SimulationDirectories;
use crate::error::{SimulationError, SimulationResult};
use crate::protocol::{
    calendar_year, ets_end_date, initial_cover, year_start, Range, RunSummary, SimulationProtocol,
};
use crate::vegetation::{coupling_steps, DEFAULT_UPDATE_INTERVAL};

/// 输出文件使用的模型名
pub const MODEL_NAME: &str = "MangroveModel";

/// 红树林模拟
pub struct MangroveSimulation {
    /// 目录
    pub directories: SimulationDirectories,
    /// 红树林常数
    pub constants: MangroveConstants,
    /// 输出配置
    pub output_config: OutputConfig,
    hydrodynamics: Box<dyn HydrodynamicProtocol>,
    colonisation: MangroveColonisation,
    coupling_steps: usize,
    mangrove: Option<BiotaWrapper<Mangrove>>,
}

impl MangroveSimulation {
    /// 创建
    pub fn new(
        constants: MangroveConstants,
        hydrodynamics: Box<dyn HydrodynamicProtocol>,
        directories: SimulationDirectories,
    ) -> SimulationResult<Self> {
        let mode = hydrodynamics.mode();
        if !mode.is_bmi() {
            return Err(SimulationError::UnsupportedMode {
                biota: "Mangrove",
                mode: mode.name(),
            });
        }
        let coupling_steps = coupling_steps(constants.ets_duration(), DEFAULT_UPDATE_INTERVAL);
        Ok(Self {
            directories,
            constants,
            output_config: OutputConfig::default(),
            hydrodynamics,
            colonisation: MangroveColonisation::default(),
            coupling_steps,
            mangrove: None,
        })
    }

    /// 设置输出配置
    pub fn with_output_config(mut self, config: OutputConfig) -> Self {
        self.output_config = config;
        self
    }

    /// 固定随机定殖的种子
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.colonisation = MangroveColonisation::new(Some(seed));
        self
    }

    /// 按耦合间隔 [s] 设置每个生态时间步的耦合次数
    pub fn with_update_interval(mut self, update_interval: f64) -> Self {
        self.coupling_steps = coupling_steps(self.constants.ets_duration(), update_interval);
        self
    }

    /// 直接设置每个生态时间步的耦合次数
    pub fn with_coupling_steps(mut self, steps: usize) -> Self {
        self.coupling_steps = steps.max(1);
        self
    }

    /// 红树林及其输出（初始化后可用）
    pub fn mangrove(&self) -> Option<&BiotaWrapper<Mangrove>> {
        self.mangrove.as_ref()
    }

    /// 初始化水动力模型
    pub fn configure_hydrodynamics(&mut self) -> SimulationResult<()> {
        self.hydrodynamics.initiate()?;
        info!("{}", self.hydrodynamics.settings());
        Ok(())
    }

    /// 建立输出并写出初始记录
    fn configure_output(&self, mangrove: &Mangrove) -> SimulationResult<nbs_io::OutputWrapper> {
        let outpoint = self.hydrodynamics.outpoint();
        let grid = OutputGrid {
            xy: self.hydrodynamics.xy_coordinates(),
            outpoint: &outpoint,
            first_date: self.constants.start_date,
        };
        let mut output = configure_output(
            None,
            MODEL_NAME,
            grid,
            &self.output_config,
            &self.directories.output_dir,
        );
        output.initialize_dirs()?;
        if let Some(map) = output.map_output.as_mut() {
            map.initialize(&format!("{MODEL_NAME} mapped data"), &VARIABLES, &map_values(mangrove))?;
        }
        if let Some(his) = output.his_output.as_mut() {
            his.initialize(&format!("{MODEL_NAME} history data"), &VARIABLES)?;
        }
        Ok(output)
    }
}

impl SimulationProtocol for MangroveSimulation {
    fn mode(&self) -> HydroMode {
        self.hydrodynamics.mode()
    }

    fn initiate(&mut self, x_range: Range, y_range: Range, value: Option<f64>) -> SimulationResult<()> {
        self.directories.validate_simulation_directories()?;
        self.configure_hydrodynamics()?;

        let cover = initial_cover(
            self.hydrodynamics.xy_coordinates(),
            x_range,
            y_range,
            value.unwrap_or(1.0),
        );
        let mut mangrove = Mangrove::new(self.constants.clone(), self.hydrodynamics.space());
        mangrove.initiate(&cover)?;

        let output = self.configure_output(&mangrove)?;
        if !output.defined() {
            warn!("No output defined, so none exported.");
        }
        info!(
            "红树林模拟已初始化: {} 个网格, {} 个网格有初始植株",
            mangrove.space(),
            mangrove.cover().sum()
        );
        self.mangrove = Some(BiotaWrapper::new(mangrove, Some(output)));
        Ok(())
    }

    fn run(&mut self, duration: Option<usize>) -> SimulationResult<RunSummary> {
        let Self {
            constants,
            hydrodynamics,
            colonisation,
            coupling_steps,
            mangrove: wrapper,
            ..
        } = self;
        let wrapper = wrapper
            .as_mut()
            .ok_or(SimulationError::NotInitiated(MODEL_NAME))?;

        let duration = duration.unwrap_or(constants.sim_duration);
        let t_eco_year = constants.t_eco_year;
        let ets_duration = constants.ets_duration();
        let start = constants.start_date;
        let mut years = Vec::with_capacity(duration);

        for offset in 0..duration {
            let year = calendar_year(start, offset);
            let _span = info_span!("mangrove", year).entered();
            let first_day = year_start(start, offset);

            for ets in 0..t_eco_year {
                let series = hydrodynamics.update_hydromorphodynamics(&wrapper.biota, *coupling_steps)?;
                let mangrove = &mut wrapper.biota;
                MangroveHydroMorphodynamics::new(series).update(mangrove)?;
                MangroveMortality::new().update(mangrove, ets);
                MangroveGrowth::new().update(mangrove);
                if mangrove.col_days[ets] > 0 {
                    colonisation.update(mangrove);
                }

                let record = offset * t_eco_year + ets + 1;
                let time = year as f64 + (ets + 1) as f64 / t_eco_year as f64;
                let date = ets_end_date(first_day, ets, ets_duration);
                wrapper.write_step(record, time, date, map_values, his_values)?;
                debug!("生态时间步 {ets} 完成");
            }

            years.push(year);
            info!(
                "年份 {year} 完成, 有红树林的网格 {}, 总株数 {:.0}",
                wrapper.biota.cover().sum(),
                wrapper.biota.total_stems().sum()
            );
        }

        Ok(RunSummary {
            model: MODEL_NAME,
            years,
            space: wrapper.biota.space(),
            mean_cover: wrapper.biota.cover().mean().unwrap_or(0.0),
        })
    }

    fn finalise(&mut self) -> SimulationResult<()> {
        self.hydrodynamics.finalise()?;
        info!("{MODEL_NAME} 模拟结束");
        Ok(())
    }
}

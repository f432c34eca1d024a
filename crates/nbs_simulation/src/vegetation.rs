// crates/nbs_simulation/src/vegetation.rs

//! 盐沼植被模拟（1 或 2 个物种）
//!
//! 需要 FlowFM 或 DIMR 模式。每个生态时间步：
//!
//! ```text
//! 水动力-地貌推进 → 死亡 → 生长（生长期） → 定殖（定殖期，物种竞争） → 写出
//! ```
//!
//! 年末更新生命阶段。两个物种时，水动力模型看到的是合并后的植被：
//! 茎密度相加，茎径与株高按茎密度加权。

use nbs_biota::vegetation::output::{his_values, map_values, VARIABLES};
use nbs_biota::vegetation::{Colonisation, Growth, HydroMorphodynamics, Mortality};
use nbs_biota::Vegetation;
use nbs_config::{ConfigError, OutputConfig, VegetationConstants};
use nbs_hydro::{HydroCoupling, HydroMode, HydrodynamicProtocol};
use ndarray::{Array1, Zip};
use tracing::{debug, info, info_span, warn};

use crate::biota_wrapper::{configure_output, BiotaWrapper, OutputGrid};
use crate::directories::SimulationDirectories;
use crate::error::{SimulationError, SimulationResult};
use crate::protocol::{
    calendar_year, ets_end_date, initial_cover, year_start, MultipleBiotaSimulationProtocol,
    Range, RunSummary, SimulationProtocol,
};

/// 输出文件使用的模型名
pub const MODEL_NAME: &str = "VegModel";

/// 缺省耦合间隔 [s]
pub const DEFAULT_UPDATE_INTERVAL: f64 = 300.0;

/// 一个生态时间步内的耦合次数
pub fn coupling_steps(ets_duration_days: f64, update_interval: f64) -> usize {
    if update_interval <= 0.0 {
        return 1;
    }
    ((ets_duration_days * 86_400.0 / update_interval).round() as usize).max(1)
}

/// 多个物种合并后的水动力反馈
struct SpeciesCoupling<'a> {
    species: &'a [BiotaWrapper<Vegetation>],
    space: usize,
}

impl SpeciesCoupling<'_> {
    fn density_weighted(&self, attribute: fn(&Vegetation) -> Array1<f64>) -> Array1<f64> {
        let mut weighted = Array1::<f64>::zeros(self.space);
        for w in self.species {
            weighted = weighted + w.biota.veg_den() * attribute(&w.biota);
        }
        let total = self.vegetation_density();
        Zip::from(&weighted)
            .and(&total)
            .map_collect(|&w, &n| if n > 0.0 { w / n } else { 0.0 })
    }
}

impl HydroCoupling for SpeciesCoupling<'_> {
    fn vegetation_density(&self) -> Array1<f64> {
        self.species
            .iter()
            .fold(Array1::<f64>::zeros(self.space), |acc, w| acc + w.biota.veg_den())
    }

    fn stem_diameter(&self) -> Array1<f64> {
        self.density_weighted(Vegetation::av_stemdia)
    }

    fn stem_height(&self) -> Array1<f64> {
        self.density_weighted(Vegetation::av_height)
    }
}

/// 植被模拟
pub struct VegetationSimulation {
    /// 目录
    pub directories: SimulationDirectories,
    /// 输出配置
    pub output_config: OutputConfig,
    species: Vec<VegetationConstants>,
    hydrodynamics: Box<dyn HydrodynamicProtocol>,
    colonisation: Colonisation,
    coupling_steps: usize,
    wrappers: Vec<BiotaWrapper<Vegetation>>,
}

impl VegetationSimulation {
    /// 创建；物种需共用生态时间步划分
    pub fn new(
        species: Vec<VegetationConstants>,
        hydrodynamics: Box<dyn HydrodynamicProtocol>,
        directories: SimulationDirectories,
    ) -> SimulationResult<Self> {
        let mode = hydrodynamics.mode();
        if !mode.is_bmi() {
            return Err(SimulationError::UnsupportedMode {
                biota: "Vegetation",
                mode: mode.name(),
            });
        }
        let first = match species.as_slice() {
            [first] | [first, _] => first,
            other => return Err(SimulationError::SpeciesCount(other.len())),
        };
        if species.iter().any(|k| k.t_eco_year != first.t_eco_year) {
            return Err(ConfigError::invalid(
                "t_eco_year",
                format!("{:?}", species.iter().map(|k| k.t_eco_year).collect::<Vec<_>>()),
                "物种的生态时间步数必须一致",
            )
            .into());
        }
        let coupling_steps = coupling_steps(first.ets_duration(), DEFAULT_UPDATE_INTERVAL);
        Ok(Self {
            directories,
            output_config: OutputConfig::default(),
            species,
            hydrodynamics,
            colonisation: Colonisation::default(),
            coupling_steps,
            wrappers: Vec::new(),
        })
    }

    /// 设置输出配置
    pub fn with_output_config(mut self, config: OutputConfig) -> Self {
        self.output_config = config;
        self
    }

    /// 固定随机定殖的种子
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.colonisation = Colonisation::new(Some(seed));
        self
    }

    /// 按耦合间隔 [s] 设置每个生态时间步的耦合次数
    pub fn with_update_interval(mut self, update_interval: f64) -> Self {
        self.coupling_steps = coupling_steps(self.species[0].ets_duration(), update_interval);
        self
    }

    /// 直接设置每个生态时间步的耦合次数
    pub fn with_coupling_steps(mut self, steps: usize) -> Self {
        self.coupling_steps = steps.max(1);
        self
    }

    /// 每个生态时间步的耦合次数
    pub fn coupling_steps(&self) -> usize {
        self.coupling_steps
    }

    /// 主物种常数
    fn constants(&self) -> &VegetationConstants {
        &self.species[0]
    }

    /// 输出文件名中的模型名
    fn model_name(&self, species: &str) -> String {
        if self.species.len() == 1 {
            MODEL_NAME.to_string()
        } else {
            format!("{MODEL_NAME}_{species}")
        }
    }

    /// 初始化水动力模型
    pub fn configure_hydrodynamics(&mut self) -> SimulationResult<()> {
        self.hydrodynamics.initiate()?;
        info!("{}", self.hydrodynamics.settings());
        Ok(())
    }

    /// 为每个物种建立输出并写出初始记录
    pub fn configure_output(&mut self) -> SimulationResult<()> {
        let outpoint = self.hydrodynamics.outpoint();
        let grid = OutputGrid {
            xy: self.hydrodynamics.xy_coordinates(),
            outpoint: &outpoint,
            first_date: self.constants().start_date,
        };
        let names: Vec<String> = self
            .wrappers
            .iter()
            .map(|w| self.model_name(w.biota.species()))
            .collect();
        for (wrapper, name) in self.wrappers.iter_mut().zip(names) {
            let mut output = configure_output(
                wrapper.output.take(),
                &name,
                grid,
                &self.output_config,
                &self.directories.output_dir,
            );
            output.initialize_dirs()?;
            if let Some(map) = output.map_output.as_mut() {
                map.initialize(
                    &format!("{name} mapped data"),
                    &VARIABLES,
                    &map_values(&wrapper.biota),
                )?;
            }
            if let Some(his) = output.his_output.as_mut() {
                his.initialize(&format!("{name} history data"), &VARIABLES)?;
            }
            wrapper.output = Some(output);
        }
        Ok(())
    }

    /// 当前各物种的总覆盖之和
    pub fn total_cover(&self) -> Array1<f64> {
        let space = self.hydrodynamics.space();
        self.wrappers
            .iter()
            .fold(Array1::<f64>::zeros(space), |acc, w| acc + w.biota.total_cover())
    }

    /// 一个生态时间步
    fn step(&mut self, ets: usize) -> SimulationResult<()> {
        let series = {
            let coupling = SpeciesCoupling {
                species: &self.wrappers,
                space: self.hydrodynamics.space(),
            };
            self.hydrodynamics
                .update_hydromorphodynamics(&coupling, self.coupling_steps)?
        };
        let hydro = HydroMorphodynamics::new(series);

        for wrapper in &mut self.wrappers {
            let veg = &mut wrapper.biota;
            hydro.update(veg)?;
            Mortality::new().update(veg);
            if veg.growth_days[ets] > 0 {
                Growth::new().update(veg, ets);
            }
        }

        match self.wrappers.as_mut_slice() {
            [first, second] if first.biota.col_days[ets] > 0 && second.biota.col_days[ets] > 0 => {
                self.colonisation.update_pair(&mut first.biota, &mut second.biota);
            }
            wrappers => {
                for wrapper in wrappers {
                    if wrapper.biota.col_days[ets] > 0 {
                        self.colonisation.update(&mut wrapper.biota);
                    }
                }
            }
        }
        Ok(())
    }
}

impl SimulationProtocol for VegetationSimulation {
    fn mode(&self) -> HydroMode {
        self.hydrodynamics.mode()
    }

    fn initiate(&mut self, x_range: Range, y_range: Range, value: Option<f64>) -> SimulationResult<()> {
        self.directories.validate_simulation_directories()?;
        self.configure_hydrodynamics()?;

        let space = self.hydrodynamics.space();
        // 初始覆盖在物种间均分
        let cover = initial_cover(
            self.hydrodynamics.xy_coordinates(),
            x_range,
            y_range,
            value.unwrap_or(1.0),
        ) / self.species.len() as f64;

        self.wrappers = self
            .species
            .iter()
            .map(|k| -> SimulationResult<BiotaWrapper<Vegetation>> {
                let mut veg = Vegetation::new(k.clone(), space);
                veg.initiate_vegetation_characteristics(&cover)?;
                Ok(BiotaWrapper::new(veg, None))
            })
            .collect::<SimulationResult<Vec<_>>>()?;

        self.configure_output()?;
        if !self.wrappers.iter().any(BiotaWrapper::has_output) {
            warn!("No output defined, so none exported.");
        }
        info!(
            "植被模拟已初始化: {} 个网格, 物种 {:?}",
            space,
            self.species.iter().map(|k| k.species.as_str()).collect::<Vec<_>>()
        );
        Ok(())
    }

    fn run(&mut self, duration: Option<usize>) -> SimulationResult<RunSummary> {
        if self.wrappers.is_empty() {
            return Err(SimulationError::NotInitiated(MODEL_NAME));
        }
        let constants = self.constants().clone();
        let duration = duration.unwrap_or(constants.sim_duration);
        let t_eco_year = constants.t_eco_year;
        let ets_duration = constants.ets_duration();
        let start = constants.start_date;
        let mut years = Vec::with_capacity(duration);

        for offset in 0..duration {
            let year = calendar_year(start, offset);
            let _span = info_span!("vegetation", year).entered();
            let first_day = year_start(start, offset);

            for ets in 0..t_eco_year {
                self.step(ets)?;

                let record = offset * t_eco_year + ets + 1;
                let time = year as f64 + (ets + 1) as f64 / t_eco_year as f64;
                let date = ets_end_date(first_day, ets, ets_duration);
                for wrapper in &mut self.wrappers {
                    wrapper.write_step(record, time, date, map_values, his_values)?;
                }
                debug!("生态时间步 {ets} 完成");
            }

            for wrapper in &mut self.wrappers {
                wrapper.biota.update_lifestages();
            }
            years.push(year);
            info!(
                "年份 {year} 完成, 平均植被覆盖 {:.4}",
                self.total_cover().mean().unwrap_or(0.0)
            );
        }

        Ok(RunSummary {
            model: MODEL_NAME,
            years,
            space: self.hydrodynamics.space(),
            mean_cover: self.total_cover().mean().unwrap_or(0.0),
        })
    }

    fn finalise(&mut self) -> SimulationResult<()> {
        self.hydrodynamics.finalise()?;
        info!("{MODEL_NAME} 模拟结束");
        Ok(())
    }
}

impl MultipleBiotaSimulationProtocol for VegetationSimulation {
    type Biota = Vegetation;

    fn biota_wrapper_list(&self) -> &[BiotaWrapper<Vegetation>] {
        &self.wrappers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbs_config::HydrodynamicsConfig;
    use nbs_hydro::HydrodynamicsFactory;
    use std::path::Path;

    #[test]
    fn test_coupling_steps() {
        // 365/24 天, 300 s 间隔
        assert_eq!(coupling_steps(365.0 / 24.0, 300.0), 4380);
        assert_eq!(coupling_steps(1.0, 1e9), 1);
        assert_eq!(coupling_steps(1.0, 0.0), 1);
    }

    #[test]
    fn test_requires_bmi_mode() {
        let hydro =
            HydrodynamicsFactory::create("Reef0D", Path::new("."), &HydrodynamicsConfig::default())
                .unwrap();
        let result = VegetationSimulation::new(
            vec![VegetationConstants::spartina()],
            hydro,
            SimulationDirectories::default(),
        );
        assert!(matches!(
            result,
            Err(SimulationError::UnsupportedMode { biota: "Vegetation", .. })
        ));
    }

    #[test]
    fn test_species_coupling_weights_by_density() {
        let mut a = Vegetation::new(VegetationConstants::spartina(), 2);
        let mut b = Vegetation::new(VegetationConstants::puccinellia(), 2);
        a.initiate_vegetation_characteristics(&Array1::from(vec![0.5, 0.0]))
            .unwrap();
        b.initiate_vegetation_characteristics(&Array1::from(vec![0.5, 0.0]))
            .unwrap();
        let species = vec![BiotaWrapper::new(a, None), BiotaWrapper::new(b, None)];
        let coupling = SpeciesCoupling {
            species: &species,
            space: 2,
        };

        let den: Vec<f64> = species.iter().map(|w| w.biota.veg_den()[0]).collect();
        let dia: Vec<f64> = species.iter().map(|w| w.biota.av_stemdia()[0]).collect();
        let density = coupling.vegetation_density();
        assert!((density[0] - (den[0] + den[1])).abs() < 1e-12);
        assert_eq!(density[1], 0.0);

        let expected = (den[0] * dia[0] + den[1] * dia[1]) / (den[0] + den[1]);
        assert!((coupling.stem_diameter()[0] - expected).abs() < 1e-12);
        assert_eq!(coupling.stem_height()[1], 0.0);
    }
}

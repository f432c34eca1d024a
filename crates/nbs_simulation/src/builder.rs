// crates/nbs_simulation/src/builder.rs

//! 由 [`SimulationConfig`] 构建模拟

use nbs_config::{
    BiotaKind, CoralConstants, EnvironmentConfig, MangroveConstants, ParameterSource,
    SimulationConfig, VegetationConstants,
};
use nbs_hydro::{BmiEngine, HydrodynamicProtocol, HydrodynamicsFactory};
use nbs_io::Environment;
use tracing::{debug, info};

use crate::coral::CoralSimulation;
use crate::directories::SimulationDirectories;
use crate::error::SimulationResult;
use crate::mangrove::MangroveSimulation;
use crate::protocol::{RunSummary, SimulationProtocol};
use crate::vegetation::VegetationSimulation;

/// 配置中的目录
pub fn directories(config: &SimulationConfig) -> SimulationDirectories {
    SimulationDirectories::new(&config.working_dir).with_output_dir(config.output_dir())
}

/// 读取环境条件
///
/// 先读取文件序列，再以常数补齐；使用常数时需要在配置中给出起止日期。
pub fn load_environment(
    config: &EnvironmentConfig,
    dirs: &SimulationDirectories,
) -> SimulationResult<Environment> {
    let mut environment = Environment::new();
    if let (Some(start), Some(end)) = (config.start_date, config.end_date) {
        environment.set_dates(start, end);
    }

    let parameters = [
        ("light", &config.light),
        ("light_attenuation", &config.light_attenuation),
        ("temperature", &config.temperature),
        ("aragonite", &config.aragonite),
        ("storm", &config.storm_category),
    ];
    for (name, source) in &parameters {
        if let Some(ParameterSource::File(path)) = source {
            let path = dirs.resolve(path);
            debug!("读取环境参数 {name}: {}", path.display());
            environment.from_file(name, &path)?;
        }
    }
    for (name, source) in &parameters {
        if let Some(ParameterSource::Constant(value)) = source {
            environment.set_parameter_values(name, *value, None)?;
        }
    }
    Ok(environment)
}

/// 构建不需要 BMI 引擎的模拟（Reef0D / Transect 上的珊瑚）
pub fn build_simulation(config: &SimulationConfig) -> SimulationResult<Box<dyn SimulationProtocol>> {
    config.validate()?;
    let hydrodynamics =
        HydrodynamicsFactory::create(&config.mode, &config.working_dir, &config.hydrodynamics)?;
    assemble(config, hydrodynamics)
}

/// 构建模拟，BMI 模式使用给定引擎
pub fn build_simulation_with_engine(
    config: &SimulationConfig,
    engine: Box<dyn BmiEngine>,
) -> SimulationResult<Box<dyn SimulationProtocol>> {
    config.validate()?;
    let hydrodynamics = HydrodynamicsFactory::create_with_engine(
        &config.mode,
        &config.working_dir,
        &config.hydrodynamics,
        engine,
    )?;
    assemble(config, hydrodynamics)
}

fn assemble(
    config: &SimulationConfig,
    hydrodynamics: Box<dyn HydrodynamicProtocol>,
) -> SimulationResult<Box<dyn SimulationProtocol>> {
    let dirs = directories(config);
    let constants_file = config.constants_file.as_ref().map(|p| dirs.resolve(p));
    info!("构建 {} 模拟 ({})", config.biota.name(), config.mode);

    match config.biota {
        BiotaKind::Coral => {
            let constants = match &constants_file {
                Some(path) => CoralConstants::from_input_file(path)?,
                None => CoralConstants::default(),
            };
            let environment = load_environment(&config.environment, &dirs)?;
            let simulation = CoralSimulation::new(constants, environment, hydrodynamics, dirs)
                .with_output_config(config.output.clone());
            Ok(Box::new(simulation))
        }
        BiotaKind::Vegetation => {
            let species = config
                .species
                .iter()
                .map(|name| match &constants_file {
                    Some(path) => VegetationConstants::from_json_file(path, name),
                    None => VegetationConstants::builtin(name),
                })
                .collect::<Result<Vec<_>, _>>()?;
            let mut simulation = VegetationSimulation::new(species, hydrodynamics, dirs)?
                .with_output_config(config.output.clone())
                .with_update_interval(config.hydrodynamics.update_interval);
            if let Some(seed) = config.seed {
                simulation = simulation.with_seed(seed);
            }
            Ok(Box::new(simulation))
        }
        BiotaKind::Mangrove => {
            let constants = match &constants_file {
                Some(path) => MangroveConstants::from_input_file(path)?,
                None => MangroveConstants::default(),
            };
            let mut simulation = MangroveSimulation::new(constants, hydrodynamics, dirs)?
                .with_output_config(config.output.clone())
                .with_update_interval(config.hydrodynamics.update_interval);
            if let Some(seed) = config.seed {
                simulation = simulation.with_seed(seed);
            }
            Ok(Box::new(simulation))
        }
    }
}

/// 按配置完整运行一次模拟：初始化、运行、结束
pub fn run_simulation(
    simulation: &mut dyn SimulationProtocol,
    config: &SimulationConfig,
) -> SimulationResult<RunSummary> {
    let initial = &config.initial;
    simulation.initiate(initial.x_range, initial.y_range, Some(initial.cover))?;
    let summary = simulation.run(config.duration)?;
    simulation.finalise()?;
    Ok(summary)
}

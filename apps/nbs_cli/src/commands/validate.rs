// apps/nbs_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 检查配置文件的语法、取值以及引用的输入文件。

use anyhow::{bail, Context, Result};
use clap::Args;
use nbs_biota::coral::output::parse_groups;
use nbs_config::{BiotaKind, ParameterSource, SimulationConfig, VegetationConstants};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== NbsDynamics 配置验证 ===");

    let mut result = ValidationResult::default();
    validate_config(&args.config, &mut result)?;
    print_validation_result(&result, args.strict)
}

fn validate_config(path: &Path, result: &mut ValidationResult) -> Result<()> {
    println!("检查配置文件: {}", path.display());

    if !path.exists() {
        result.add_error(format!("配置文件不存在: {}", path.display()));
        return Ok(());
    }

    let content = std::fs::read_to_string(path).context("无法读取配置文件")?;
    let config: SimulationConfig = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            result.add_error(format!("JSON 解析错误: {e}"));
            return Ok(());
        }
    };

    if let Err(e) = config.validate() {
        result.add_error(e.to_string());
        return Ok(());
    }
    println!("  ✓ 配置取值有效");

    if config.requires_bmi() {
        result.add_warning(format!(
            "模式 {} 需要外部 BMI 引擎，无法通过命令行运行",
            config.mode
        ));
    }

    let working_dir = &config.working_dir;
    check_file(working_dir, config.constants_file.as_deref(), "常数文件", result);
    check_file(
        working_dir,
        config.hydrodynamics.config_file.as_deref(),
        "水动力配置文件",
        result,
    );
    check_file(
        working_dir,
        config.hydrodynamics.definition_file.as_deref(),
        "水动力定义文件",
        result,
    );

    match config.biota {
        BiotaKind::Coral => validate_coral(&config, result),
        BiotaKind::Vegetation => {
            if config.constants_file.is_none() {
                for species in &config.species {
                    if let Err(e) = VegetationConstants::builtin(species) {
                        result.add_error(e.to_string());
                    }
                }
            }
        }
        BiotaKind::Mangrove => {}
    }

    Ok(())
}

fn validate_coral(config: &SimulationConfig, result: &mut ValidationResult) {
    let env = &config.environment;
    let sources = [
        ("light", &env.light),
        ("light_attenuation", &env.light_attenuation),
        ("temperature", &env.temperature),
        ("aragonite", &env.aragonite),
        ("storm", &env.storm_category),
    ];
    for (name, source) in &sources {
        match source {
            Some(ParameterSource::File(file)) => {
                check_file(&config.working_dir, Some(file), name, result);
            }
            Some(ParameterSource::Constant(_)) => {
                if env.start_date.is_none() || env.end_date.is_none() {
                    let has_series = sources
                        .iter()
                        .any(|(_, s)| matches!(s, Some(ParameterSource::File(_))));
                    if !has_series {
                        result.add_error(format!("{name} 使用常数时需要给出 start_date 和 end_date"));
                    }
                }
            }
            None => {}
        }
    }
    if env.light.is_none() {
        result.add_error("珊瑚模拟需要光照 (light)");
    }
    if env.temperature.is_none() {
        result.add_error("珊瑚模拟需要水温 (temperature)");
    }
    if env.storm_category.is_none() {
        result.add_warning("未给出风暴等级，模拟中不发生脱落");
    }

    if let Err(e) = parse_groups(&config.output.groups) {
        result.add_error(e.to_string());
    }
}

fn check_file(working_dir: &Path, file: Option<&Path>, label: &str, result: &mut ValidationResult) {
    let Some(file) = file else {
        return;
    };
    let path = if file.is_absolute() {
        file.to_path_buf()
    } else {
        working_dir.join(file)
    };
    if path.is_file() {
        println!("  ✓ {label}: {}", path.display());
    } else {
        result.add_warning(format!("{label} 不存在: {}", path.display()));
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}

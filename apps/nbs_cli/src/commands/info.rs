// apps/nbs_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 列出水动力模式、生物类型、珊瑚输出变量组和内置植被物种。

use anyhow::{Context, Result};
use clap::Args;
use nbs_biota::CoralOutputGroup;
use nbs_config::{BiotaKind, SimulationConfig, VegetationConstants};
use nbs_hydro::HydroMode;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== NbsDynamics 信息 ===");

    print_modes();
    println!();
    print_biota();
    println!();
    print_output_groups();

    if args.defaults {
        println!();
        print_default_config()?;
    }

    Ok(())
}

fn print_modes() {
    println!("=== 水动力模式 ===");
    for mode in HydroMode::ALL {
        let coupling = if mode.is_bmi() { "BMI 引擎" } else { "内置" };
        println!("  - {:<12} ({coupling})", mode.name());
    }
}

fn print_biota() {
    println!("=== 生物类型 ===");
    for kind in [BiotaKind::Coral, BiotaKind::Vegetation, BiotaKind::Mangrove] {
        println!("  - {}", kind.name());
    }

    println!("\n内置植被物种:");
    for species in [
        VegetationConstants::spartina(),
        VegetationConstants::puccinellia(),
        VegetationConstants::salicornia(),
    ] {
        println!(
            "  - {:<12} t_eco_year = {}, 模拟年数 = {}",
            species.species, species.t_eco_year, species.sim_duration
        );
    }
}

fn print_output_groups() {
    println!("=== 珊瑚输出变量组 ===");
    for group in CoralOutputGroup::ALL {
        let names: Vec<&str> = group.map_variables().iter().map(|v| v.name).collect();
        println!("  - {:<5} {}", group.name(), names.join(", "));
    }
}

fn print_default_config() -> Result<()> {
    println!("=== 默认配置 ===");
    let config = SimulationConfig::default();
    let json = serde_json::to_string_pretty(&config).context("无法序列化默认配置")?;
    println!("{json}");
    Ok(())
}

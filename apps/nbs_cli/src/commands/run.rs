// apps/nbs_cli/src/commands/run.rs

//! 运行模拟命令
//!
//! 读取 `SimulationConfig`，构建模拟并完整运行。
//! FlowFM / DIMR 模式需要外部 BMI 引擎，只能通过库接口
//! `build_simulation_with_engine` 运行。

use anyhow::{bail, Context, Result};
use clap::Args;
use nbs_config::SimulationConfig;
use nbs_simulation::{build_simulation, run_simulation};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// 运行模拟参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 输出目录（覆盖配置）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 模拟年数（覆盖配置）
    #[arg(short, long)]
    pub duration: Option<usize>,

    /// 随机定殖种子（覆盖配置）
    #[arg(long)]
    pub seed: Option<u64>,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== NbsDynamics 模拟启动 ===");

    let mut config = SimulationConfig::from_file(&args.config)
        .with_context(|| format!("无法读取配置文件: {}", args.config.display()))?;
    if let Some(output) = args.output {
        config.output.directory = Some(output);
    }
    if args.duration.is_some() {
        config.duration = args.duration;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    if config.requires_bmi() {
        bail!(
            "模式 {} 需要外部 BMI 引擎，命令行只运行 Reef0D / Transect",
            config.mode
        );
    }

    info!(
        "模拟: {} ({}, {})",
        config.name,
        config.biota.name(),
        config.mode
    );
    info!("输出目录: {}", config.output_dir().display());

    let start = Instant::now();
    let mut simulation = build_simulation(&config).context("构建模拟失败")?;
    let summary = run_simulation(simulation.as_mut(), &config).context("模拟运行失败")?;
    let elapsed = start.elapsed();

    info!("=== 模拟完成 ===");
    info!("模型: {}", summary.model);
    if let (Some(first), Some(last)) = (summary.years.first(), summary.years.last()) {
        info!("年份: {first} - {last} ({} 年)", summary.years.len());
    }
    info!("网格数: {}", summary.space);
    info!("平均覆盖: {:.4}", summary.mean_cover);
    info!("计算时间: {:.2} s", elapsed.as_secs_f64());

    Ok(())
}

// apps/nbs_cli/src/main.rs

//! NbsDynamics 命令行界面
//!
//! 运行珊瑚、盐沼植被和红树林模拟。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**：只接触 `SimulationConfig`
//! 和 `Box<dyn SimulationProtocol>`，不直接操作生物过程。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// NbsDynamics 生物动力学模拟命令行工具
#[derive(Parser)]
#[command(name = "nbs_cli")]
#[command(author = "NbsDynamics Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "NbsDynamics biota dynamics simulator", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行模拟
    Run(commands::run::RunArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}

// ==========================================
// 物料关键性评估系统 - 命令行入口
// ==========================================
// 用法: bom-criticality --input <文件> [--output <csv>] [--summary <json>]
// 退出码: 0 成功 / 1 运行失败 / 2 表结构错误 / 3 空数据集 / 4 配置错误
// ==========================================

use anyhow::Context;
use bom_criticality::{logging, CriticalityPipeline, EngineConfig, EngineError};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_SCHEMA: i32 = 2;
const EXIT_EMPTY: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Parser, Debug)]
#[command(name = "bom-criticality")]
#[command(about = "物料关键性评估: 评分 / 风险 / ABC-XYZ / 补货建议", long_about = None)]
#[command(version)]
struct Cli {
    /// 输入文件（CSV / Excel）
    #[arg(short, long)]
    input: PathBuf,

    /// 输出 CSV 路径
    #[arg(short, long, default_value = bom_criticality::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// 引擎配置（JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 汇总输出路径（JSON）
    #[arg(long)]
    summary: Option<PathBuf>,

    /// CSV 分隔符（缺省自动识别）
    #[arg(short, long)]
    delimiter: Option<char>,

    /// JSON 格式日志
    #[arg(long)]
    log_json: bool,

    /// 详细日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init_with_format(cli.log_json, cli.verbose);

    let start_time = Instant::now();
    info!("{} v{}", bom_criticality::APP_NAME, bom_criticality::VERSION);

    let code = match run(&cli) {
        Ok(()) => {
            info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "运行结束");
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            exit_code(&e)
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .map_err(EngineError::from)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if cli.delimiter.is_some() {
        config.delimiter = cli.delimiter;
    }

    let pipeline = CriticalityPipeline::new(config)?;
    let report = pipeline.run_to_file(&cli.input, &cli.output)?;

    if !report.dq_report.is_clean() {
        warn!(
            warnings = report.dq_report.warning_count(),
            infos = report.dq_report.info_count(),
            "数据质量报告非空，详见上方 DQ 日志"
        );
    }

    if let Some(path) = &cli.summary {
        pipeline
            .reporter()
            .write_summary_json(&report.summary, path)?;
    }

    info!(
        output = %cli.output.display(),
        rows = report.row_count(),
        at_risk = report.summary.at_risk_count,
        "[ok] 评估完成"
    );
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<EngineError>() {
        Some(e) if e.is_schema_error() => EXIT_SCHEMA,
        Some(EngineError::EmptyDataset) => EXIT_EMPTY,
        Some(EngineError::Config(_)) => EXIT_CONFIG,
        _ => EXIT_FAILURE,
    }
}

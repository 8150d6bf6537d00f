// ==========================================
// 商品目录导入系统 - 命令行入口
// ==========================================
// 子命令:
// - import: 按配置导入分隔文本文件，输出运行结果（JSON）
// - runs: 列出最近的导入运行
// - init-db: 创建目录库 schema
// ==========================================

use anyhow::{Context, Result};
use catalog_import::api::ImportApi;
use catalog_import::config::ImportSettings;
use catalog_import::db::default_db_path;
use catalog_import::logging;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "catalog-import", version, about = "Delimited-file product catalog importer")]
struct Cli {
    /// 目录库路径（缺省为用户数据目录下的 catalog_import.db）
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Import a delimited product file
    Import {
        /// JSON settings file (column mapping, delimiter, defaults)
        #[arg(long, value_name = "FILE")]
        settings: PathBuf,

        /// Delimited input file
        file: PathBuf,
    },
    /// List recent import runs
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Show per-row outcomes of one run
        #[arg(long, value_name = "RUN_ID")]
        run: Option<String>,
    },
    /// Create the catalog schema
    InitDb,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let db_path = cli
        .db
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(default_db_path);

    match cli.cmd {
        Cmd::Import { settings, file } => {
            let settings = ImportSettings::from_json_file(&settings)?;

            // 配置了日志文件时同时写入文件；guard 持有到进程结束
            let _guard = match &settings.log_file_path {
                Some(log_file) => Some(logging::init_with_log_file(log_file)?),
                None => {
                    logging::init();
                    None
                }
            };
            tracing::info!(db = %db_path, version = catalog_import::VERSION, "使用目录库");

            let api = ImportApi::open(&db_path).context("打开目录库失败")?;
            let response = api.import_file(&settings, &file)?;
            println!("{}", serde_json::to_string_pretty(&response)?);

            // 正常返回以便 guard 析构时刷出日志文件
            if response.fatal_error.is_some() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Cmd::Runs { limit, run } => {
            logging::init();
            let api = ImportApi::open(&db_path).context("打开目录库失败")?;
            match run {
                Some(run_id) => {
                    let outcomes = api.run_outcomes(&run_id)?;
                    println!("{}", serde_json::to_string_pretty(&outcomes)?);
                }
                None => {
                    let runs = api.recent_runs(limit)?;
                    println!("{}", serde_json::to_string_pretty(&runs)?);
                }
            }
        }
        Cmd::InitDb => {
            logging::init();
            ImportApi::open(&db_path).context("初始化目录库失败")?;
            tracing::info!(db = %db_path, "目录库 schema 已就绪");
        }
    }

    Ok(ExitCode::SUCCESS)
}

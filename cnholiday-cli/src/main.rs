mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cnholiday")]
#[command(about = "中国法定节假日日历生成工具")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 启用详细日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 生成节假日ICS文件
    Generate {
        /// 输出文件路径
        #[arg(short, long, default_value = "chinese_holiday.ics")]
        output: String,

        /// 只包含指定年份（可重复，默认全部内置年份）
        #[arg(short, long)]
        year: Vec<i32>,

        /// 从JSON文件读取节假日数据，替代内置数据
        #[arg(short, long, conflicts_with = "year")]
        input: Option<String>,

        /// 日历名称
        #[arg(long)]
        calendar_name: Option<String>,

        /// DTEND写入最后一天的次日
        #[arg(long)]
        exclusive_end: bool,

        /// 数据检查发现问题时中止
        #[arg(long)]
        strict: bool,
    },

    /// 列出内置节假日安排
    List {
        /// 只列出指定年份
        #[arg(short, long)]
        year: Vec<i32>,
    },

    /// 导出内置节假日数据到JSON文件
    Export {
        /// 输出文件路径
        file: String,

        /// 只导出指定年份
        #[arg(short, long)]
        year: Vec<i32>,
    },

    /// 读取ICS文件并统计放假日与补班日
    Check {
        /// ICS文件路径
        file: String,

        /// 文件的DTEND为最后一天的次日
        #[arg(long)]
        exclusive_end: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 设置日志级别
    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("cnholiday_cli={log_level},cnholiday_core={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Generate {
            output,
            year,
            input,
            calendar_name,
            exclusive_end,
            strict,
        } => commands::generate_command(&commands::GenerateParams {
            output,
            years: year,
            input,
            calendar_name,
            exclusive_end,
            strict,
        }),

        Commands::List { year } => commands::list_command(&year),

        Commands::Export { file, year } => commands::export_command(&file, &year),

        Commands::Check {
            file,
            exclusive_end,
        } => commands::check_command(&file, exclusive_end),
    }
}

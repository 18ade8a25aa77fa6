use chrono::NaiveDate;
use thiserror::Error;

/// 节假日日历生成过程中的错误
#[derive(Error, Debug)]
pub enum Error {
    /// JSON 解析失败
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// 日期解析失败
    #[error("Date/time parsing failed: {0}")]
    DateTime(#[from] chrono::ParseError),

    /// 文件读写失败
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 结束日期早于开始日期
    #[error("Invalid date range for {name}: {start} > {end}")]
    InvalidRange {
        /// 记录名称
        name: String,
        /// 开始日期
        start: NaiveDate,
        /// 结束日期
        end: NaiveDate,
    },

    /// ICS 内容无法解析
    #[error("ICS parsing failed: {0}")]
    IcsParse(String),

    /// 配置或输入文件错误
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// 节假日数据检查未通过
    #[error("Holiday data validation failed: {0}")]
    Validation(String),
}

/// 库内统一的结果类型
pub type Result<T> = std::result::Result<T, Error>;

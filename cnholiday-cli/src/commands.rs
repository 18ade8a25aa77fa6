use std::{collections::BTreeMap, fs};

use anyhow::Result;
use chrono::Datelike;
use cnholiday_core::{Error, prelude::*, tables};

/// 生成日历命令参数
pub struct GenerateParams {
    pub output: String,
    pub years: Vec<i32>,
    pub input: Option<String>,
    pub calendar_name: Option<String>,
    pub exclusive_end: bool,
    pub strict: bool,
}

/// 生成日历命令
pub fn generate_command(params: &GenerateParams) -> Result<()> {
    println!("正在生成中国节假日日历...");

    let (records, default_name) = match params.input {
        Some(ref path) => {
            tracing::info!("从 {} 读取节假日数据", path);
            (tables::load_json(path)?, DEFAULT_CALENDAR_NAME.to_string())
        }
        None => {
            let years = resolve_years(&params.years)?;
            (builtin_records(&years), default_calendar_name(&years))
        }
    };

    let issues = check_records(&records);
    for issue in &issues {
        tracing::warn!("{}", issue);
    }
    if params.strict && !issues.is_empty() {
        return Err(Error::Validation(format!("发现 {} 个数据问题", issues.len())).into());
    }

    let options = CalendarOptions {
        end_date: end_date_convention(params.exclusive_end),
        ..CalendarOptions::default()
    };
    let calendar_name = params.calendar_name.clone().unwrap_or(default_name);

    let generator = DocumentBuilder::new(options);
    let ics_content = generator.render_document(&records, &calendar_name);

    // 写入文件
    fs::write(&params.output, ics_content)?;
    tracing::info!("已写入 {} ({} 个事件)", params.output, records.len());

    println!("✓ 日历文件已生成: {}", params.output);
    for (year, count) in count_by_year(&records) {
        println!("✓ {}年: {} 个事件", year, count);
    }
    println!("✓ 总计: {} 个事件", records.len());
    println!("\n使用方法：");
    println!("1. 将此文件上传到可公开访问的位置（如 GitHub Pages）");
    println!("2. 在日历应用中通过URL订阅该文件");

    Ok(())
}

/// 列出内置数据命令
pub fn list_command(years: &[i32]) -> Result<()> {
    for year in resolve_years(years)? {
        println!("{}年:", year);
        for record in tables::holidays_for_year(year).unwrap_or_default() {
            let range = if record.start_date() == record.end_date() {
                record.start_date().to_string()
            } else {
                format!("{} ~ {}", record.start_date(), record.end_date())
            };
            println!("  {:<24} {}", range, build_summary(&record));
        }
    }

    Ok(())
}

/// 导出内置数据命令
pub fn export_command(file: &str, years: &[i32]) -> Result<()> {
    let records = builtin_records(&resolve_years(years)?);
    let json_content = tables::to_json(&records)?;

    fs::write(file, json_content)?;
    println!("✓ 已导出 {} 条节假日记录到: {}", records.len(), file);

    Ok(())
}

/// 检查ICS文件命令
pub fn check_command(file: &str, exclusive_end: bool) -> Result<()> {
    let calendar = HolidayCalendar::from_path(file, end_date_convention(exclusive_end))?;

    println!("{}:", file);
    println!("  事件: {}", calendar.records().len());
    println!("  放假日: {}", calendar.rest_days().len());
    println!("  补班日: {}", calendar.makeup_days().len());

    let issues = check_records(calendar.records());
    if issues.is_empty() {
        println!("✓ 未发现数据问题");
    } else {
        for issue in &issues {
            println!("  ! {}", issue);
        }
    }

    Ok(())
}

fn end_date_convention(exclusive_end: bool) -> EndDateConvention {
    if exclusive_end {
        EndDateConvention::Exclusive
    } else {
        EndDateConvention::Inclusive
    }
}

/// 未指定年份时使用全部内置年份；指定了不支持的年份时报错
fn resolve_years(years: &[i32]) -> Result<Vec<i32>> {
    if years.is_empty() {
        return Ok(tables::builtin_years().to_vec());
    }

    let mut resolved = Vec::with_capacity(years.len());
    for &year in years {
        if !tables::builtin_years().contains(&year) {
            return Err(anyhow::anyhow!(
                "没有 {} 年的内置数据，可用年份: {:?}",
                year,
                tables::builtin_years()
            ));
        }
        if !resolved.contains(&year) {
            resolved.push(year);
        }
    }
    resolved.sort_unstable();
    Ok(resolved)
}

fn builtin_records(years: &[i32]) -> Vec<HolidayRecord> {
    years
        .iter()
        .filter_map(|&year| tables::holidays_for_year(year))
        .flatten()
        .collect()
}

fn default_calendar_name(years: &[i32]) -> String {
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if first == last => {
            format!("{} ({})", DEFAULT_CALENDAR_NAME, first)
        }
        (Some(first), Some(last)) => format!("{} ({}-{})", DEFAULT_CALENDAR_NAME, first, last),
        _ => DEFAULT_CALENDAR_NAME.to_string(),
    }
}

fn count_by_year(records: &[HolidayRecord]) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.start_date().year()).or_insert(0) += 1;
    }
    counts
}

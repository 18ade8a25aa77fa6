//! 内置的节假日安排数据
//!
//! 数据来自国务院办公厅每年发布的放假安排通知。

use std::{fs, path::Path};

use chrono::NaiveDate;

use crate::{Error, HolidayRecord, Result};

type DateParts = (i32, u32, u32);

/// 内置数据覆盖的年份
pub fn builtin_years() -> &'static [i32] {
    &[2025, 2026]
}

/// 按年份获取内置节假日安排
pub fn holidays_for_year(year: i32) -> Option<Vec<HolidayRecord>> {
    match year {
        2025 => Some(holidays_2025()),
        2026 => Some(holidays_2026()),
        _ => None,
    }
}

/// 按年份顺序拼接全部内置数据
pub fn all_holidays() -> Vec<HolidayRecord> {
    builtin_years()
        .iter()
        .filter_map(|&year| holidays_for_year(year))
        .flatten()
        .collect()
}

/// 2025 年的节假日安排
pub fn holidays_2025() -> Vec<HolidayRecord> {
    vec![
        // 元旦
        rest("元旦", (2025, 1, 1), (2025, 1, 1), "2025年元旦假期"),
        // 春节
        rest("春节", (2025, 1, 28), (2025, 2, 4), "2025年春节假期"),
        makeup("春节调休", (2025, 1, 26), "春节调休补班"),
        makeup("春节调休", (2025, 2, 8), "春节调休补班"),
        // 清明节
        rest("清明节", (2025, 4, 4), (2025, 4, 6), "2025年清明节假期"),
        // 劳动节
        rest("劳动节", (2025, 5, 1), (2025, 5, 5), "2025年劳动节假期"),
        makeup("劳动节调休", (2025, 4, 27), "劳动节调休补班"),
        // 端午节
        rest("端午节", (2025, 5, 31), (2025, 6, 2), "2025年端午节假期"),
        makeup("端午节调休", (2025, 5, 31), "端午节调休补班"),
        // 中秋节
        rest("中秋节", (2025, 10, 6), (2025, 10, 8), "2025年中秋节假期"),
        makeup("中秋节调休", (2025, 9, 28), "中秋节调休补班"),
        makeup("中秋节调休", (2025, 10, 11), "中秋节调休补班"),
        // 国庆节
        rest("国庆节", (2025, 10, 1), (2025, 10, 8), "2025年国庆节假期"),
    ]
}

/// 2026 年的节假日安排（国办发明电〔2025〕7号）
pub fn holidays_2026() -> Vec<HolidayRecord> {
    vec![
        // 元旦：1月1日至3日放假调休，共3天。1月4日（周日）上班
        rest("元旦", (2026, 1, 1), (2026, 1, 3), "2026年元旦假期"),
        makeup("元旦调休", (2026, 1, 4), "元旦调休补班"),
        // 春节：2月15日至23日放假调休，共9天。2月14日（周六）、2月28日（周六）上班
        rest(
            "春节",
            (2026, 2, 15),
            (2026, 2, 23),
            "2026年春节假期（农历腊月廿八至正月初七）",
        ),
        makeup("春节调休", (2026, 2, 14), "春节调休补班"),
        makeup("春节调休", (2026, 2, 28), "春节调休补班"),
        // 清明节：4月4日（周六）至6日（周一）放假，共3天
        rest("清明节", (2026, 4, 4), (2026, 4, 6), "2026年清明节假期"),
        // 劳动节：5月1日（周五）至5日（周二）放假调休，共5天。5月9日（周六）上班
        rest("劳动节", (2026, 5, 1), (2026, 5, 5), "2026年劳动节假期"),
        makeup("劳动节调休", (2026, 5, 9), "劳动节调休补班"),
        // 端午节：6月19日（周五）至21日（周日）放假，共3天
        rest("端午节", (2026, 6, 19), (2026, 6, 21), "2026年端午节假期"),
        // 中秋节：9月25日（周五）至27日（周日）放假，共3天
        rest("中秋节", (2026, 9, 25), (2026, 9, 27), "2026年中秋节假期"),
        // 国庆节：10月1日（周四）至7日（周三）放假调休，共7天。9月20日（周日）、10月10日（周六）上班
        rest("国庆节", (2026, 10, 1), (2026, 10, 7), "2026年国庆节假期"),
        makeup("国庆节调休", (2026, 9, 20), "国庆节调休补班"),
        makeup("国庆节调休", (2026, 10, 10), "国庆节调休补班"),
    ]
}

/// 从JSON文件加载节假日记录
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<HolidayRecord>> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(path_ref).map_err(|err| {
        Error::Config(format!(
            "无法读取节假日数据文件 {}: {}",
            path_ref.display(),
            err
        ))
    })?;
    from_json(&content)
}

/// 从JSON字符串解析节假日记录
pub fn from_json(json_data: &str) -> Result<Vec<HolidayRecord>> {
    let records: Vec<HolidayRecord> = serde_json::from_str(json_data)?;
    tracing::debug!("从JSON加载了 {} 条节假日记录", records.len());
    Ok(records)
}

/// 导出节假日记录为JSON
pub fn to_json(records: &[HolidayRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

fn ymd((year, month, day): DateParts) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("built-in holiday table has a valid date")
}

fn rest(name: &str, start: DateParts, end: DateParts, description: &str) -> HolidayRecord {
    HolidayRecord::new(name, ymd(start), ymd(end))
        .expect("built-in holiday table has an ordered range")
        .with_description(description)
}

fn makeup(name: &str, date: DateParts, description: &str) -> HolidayRecord {
    HolidayRecord::single_day(name, ymd(date))
        .workday()
        .with_description(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_sizes() {
        assert_eq!(holidays_2025().len(), 13);
        assert_eq!(holidays_2026().len(), 13);
        assert_eq!(all_holidays().len(), 26);
        assert!(holidays_for_year(2024).is_none());
    }

    #[test]
    fn all_holidays_keeps_year_order() {
        let all = all_holidays();
        assert_eq!(all[0].name(), "元旦");
        assert_eq!(all[0].start_date().to_string(), "2025-01-01");
        assert_eq!(all[13].start_date().to_string(), "2026-01-01");
    }

    #[test]
    fn national_day_2026_makeup_days() {
        let makeups: Vec<_> = holidays_2026()
            .into_iter()
            .filter(|r| r.is_workday() && r.name() == "国庆节调休")
            .map(|r| r.start_date().to_string())
            .collect();
        assert_eq!(makeups, vec!["2026-09-20", "2026-10-10"]);
    }

    #[test]
    fn json_export_import_preserves_table() {
        let records = holidays_2026();
        let json = to_json(&records).unwrap();
        assert!(json.contains("\"start_date\": \"2026-02-15\""));
        assert_eq!(from_json(&json).unwrap(), records);
    }

    #[test]
    fn json_import_reports_bad_range() {
        let err = from_json(r#"[{"name":"x","start_date":"2026-01-02","end_date":"2026-01-01"}]"#)
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn load_json_missing_file() {
        let err = load_json("/nonexistent/holidays.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

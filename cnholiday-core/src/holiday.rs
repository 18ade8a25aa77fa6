use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ical::parser::ical::{IcalParser, component::IcalEvent};
use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use crate::{
    EndDateConvention, Error, HolidayRecord, REST_MARKER, Result, WORKDAY_MARKER,
    ics::unescape_text,
};

/// 从ICS读回的节假日调休信息
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    records: Vec<HolidayRecord>,
    rest_days: BTreeSet<NaiveDate>,
    makeup_days: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// 从文件路径加载节假日ICS
    pub fn from_path<P: AsRef<Path>>(path: P, convention: EndDateConvention) -> Result<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref).map_err(|err| {
            Error::Config(format!(
                "无法打开节假日ICS文件 {}: {}",
                path_ref.display(),
                err
            ))
        })?;
        Self::from_reader(file, convention)
    }

    /// 从字节切片加载节假日ICS
    pub fn from_bytes(bytes: impl AsRef<[u8]>, convention: EndDateConvention) -> Result<Self> {
        let cursor = std::io::Cursor::new(bytes.as_ref());
        Self::from_reader(cursor, convention)
    }

    /// 从读取器中加载节假日ICS
    pub fn from_reader<R: Read>(reader: R, convention: EndDateConvention) -> Result<Self> {
        let parser = IcalParser::new(BufReader::new(reader));
        let mut records = Vec::new();

        for calendar in parser {
            let calendar =
                calendar.map_err(|err| Error::IcsParse(format!("节假日ICS解析失败: {}", err)))?;

            for event in calendar.events {
                let Some(kind) = classify_event(&event) else {
                    tracing::debug!(
                        "跳过无法识别的事件: {:?}",
                        event_property(&event, "SUMMARY")
                    );
                    continue;
                };

                records.push(event_to_record(&event, kind, convention)?);
            }
        }

        Ok(Self::from_records(records))
    }

    /// 由记录列表构建
    pub fn from_records(records: Vec<HolidayRecord>) -> Self {
        let mut rest_days = BTreeSet::new();
        let mut makeup_days = BTreeSet::new();

        for record in &records {
            if record.is_workday() {
                makeup_days.extend(record.dates());
            } else {
                rest_days.extend(record.dates());
            }
        }

        tracing::debug!(
            "节假日日历: {} 条记录, {} 个放假日, {} 个补班日",
            records.len(),
            rest_days.len(),
            makeup_days.len()
        );

        Self {
            records,
            rest_days,
            makeup_days,
        }
    }

    /// 读回的记录，保持文件中的顺序
    pub fn records(&self) -> &[HolidayRecord] {
        &self.records
    }

    /// 是否为放假日
    pub fn is_rest_day(&self, date: NaiveDate) -> bool {
        self.rest_days.contains(&date)
    }

    /// 是否为调休上班日
    pub fn is_makeup_day(&self, date: NaiveDate) -> bool {
        self.makeup_days.contains(&date)
    }

    /// 全部放假日
    pub fn rest_days(&self) -> &BTreeSet<NaiveDate> {
        &self.rest_days
    }

    /// 全部调休补班日
    pub fn makeup_days(&self) -> &BTreeSet<NaiveDate> {
        &self.makeup_days
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HolidayEventKind {
    Rest,
    Makeup,
}

fn classify_event(event: &IcalEvent) -> Option<HolidayEventKind> {
    if let Some(kind) = event_property(event, "X-APPLE-SPECIAL-DAY") {
        return match kind {
            "WORK-HOLIDAY" => Some(HolidayEventKind::Rest),
            "ALTERNATE-WORKDAY" => Some(HolidayEventKind::Makeup),
            _ => None,
        };
    }

    let summary = event_property(event, "SUMMARY")?;
    let normalized = summary.replace([' ', '\t'], "");
    // 生成器写入的后缀优先于关键字匹配
    if normalized.ends_with(&format!("({WORKDAY_MARKER})")) {
        return Some(HolidayEventKind::Makeup);
    }
    if normalized.ends_with(&format!("({REST_MARKER})")) {
        return Some(HolidayEventKind::Rest);
    }
    if normalized.contains('班') {
        return Some(HolidayEventKind::Makeup);
    }
    if normalized.contains('休') || normalized.contains("放假") {
        return Some(HolidayEventKind::Rest);
    }

    None
}

fn event_to_record(
    event: &IcalEvent,
    kind: HolidayEventKind,
    convention: EndDateConvention,
) -> Result<HolidayRecord> {
    let (start, end) = extract_event_range(event, convention)?;
    let summary = event_property(event, "SUMMARY").map(unescape_text).unwrap_or_default();
    let name = strip_kind_suffix(&summary).to_string();
    let description = event_property(event, "DESCRIPTION")
        .map(unescape_text)
        .unwrap_or_default();

    let record = HolidayRecord::new(name, start, end)?.with_description(description);
    Ok(match kind {
        HolidayEventKind::Rest => record,
        HolidayEventKind::Makeup => record.workday(),
    })
}

fn strip_kind_suffix(summary: &str) -> &str {
    [WORKDAY_MARKER, REST_MARKER]
        .iter()
        .find_map(|marker| summary.strip_suffix(&format!(" ({marker})")))
        .unwrap_or(summary)
}

fn extract_event_range(
    event: &IcalEvent,
    convention: EndDateConvention,
) -> Result<(NaiveDate, NaiveDate)> {
    let start_raw = event_property(event, "DTSTART")
        .ok_or_else(|| Error::IcsParse("节假日ICS事件缺少DTSTART字段".to_string()))?;

    let start = parse_date(start_raw).map_err(|err| {
        Error::IcsParse(format!("无法解析节假日开始日期 {}: {}", start_raw, err))
    })?;

    let end = match event_property(event, "DTEND") {
        Some(value) => {
            let dtend = parse_date(value).map_err(|err| {
                Error::IcsParse(format!("无法解析节假日结束日期 {}: {}", value, err))
            })?;
            convention.last_day(start, dtend)
        }
        None => start,
    };

    Ok((start, end))
}

fn event_property<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a str> {
    event
        .properties
        .iter()
        .find(|prop| prop.name.eq_ignore_ascii_case(name))
        .and_then(|prop| prop.value.as_deref())
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%SZ").map(|dt| dt.date()))
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CalendarOptions, ics::DocumentBuilder, tables};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn load_calendar(convention: EndDateConvention) -> HolidayCalendar {
        let builder = DocumentBuilder::new(CalendarOptions {
            end_date: convention,
            ..CalendarOptions::default()
        });
        let document = builder.render_document(&tables::holidays_2026(), "中国法定节假日");
        HolidayCalendar::from_bytes(document, convention)
            .expect("failed to load generated calendar")
    }

    #[test]
    fn round_trip_records() {
        for convention in [EndDateConvention::Inclusive, EndDateConvention::Exclusive] {
            let calendar = load_calendar(convention);
            assert_eq!(calendar.records(), tables::holidays_2026().as_slice());
        }
    }

    #[test]
    fn spring_festival_2026_adjustments() {
        let calendar = load_calendar(EndDateConvention::Inclusive);

        for offset in 0..9 {
            let day = date(2026, 2, 15) + chrono::Duration::days(offset);
            assert!(calendar.is_rest_day(day), "expected {} to be a rest day", day);
        }
        assert!(!calendar.is_rest_day(date(2026, 2, 24)));
        assert!(calendar.is_makeup_day(date(2026, 2, 14)));
        assert!(calendar.is_makeup_day(date(2026, 2, 28)));
        assert!(!calendar.is_makeup_day(date(2026, 2, 15)));
        assert_eq!(calendar.makeup_days().len(), 6);
    }

    #[test]
    fn apple_special_day_events() {
        let ics = "BEGIN:VCALENDAR\r\n\
            VERSION:2.0\r\n\
            BEGIN:VEVENT\r\n\
            UID:a\r\n\
            DTSTART;VALUE=DATE:20251001\r\n\
            DTEND;VALUE=DATE:20251009\r\n\
            SUMMARY:国庆节\r\n\
            X-APPLE-SPECIAL-DAY:WORK-HOLIDAY\r\n\
            END:VEVENT\r\n\
            BEGIN:VEVENT\r\n\
            UID:b\r\n\
            DTSTART;VALUE=DATE:20250928\r\n\
            DTEND;VALUE=DATE:20250929\r\n\
            SUMMARY:国庆节\r\n\
            X-APPLE-SPECIAL-DAY:ALTERNATE-WORKDAY\r\n\
            END:VEVENT\r\n\
            BEGIN:VEVENT\r\n\
            UID:c\r\n\
            DTSTART;VALUE=DATE:20250910\r\n\
            SUMMARY:教师节\r\n\
            END:VEVENT\r\n\
            END:VCALENDAR\r\n";
        let calendar = HolidayCalendar::from_bytes(ics, EndDateConvention::Exclusive).unwrap();

        assert_eq!(calendar.records().len(), 2);
        assert_eq!(calendar.rest_days().len(), 8);
        assert!(calendar.is_rest_day(date(2025, 10, 8)));
        assert!(!calendar.is_rest_day(date(2025, 10, 9)));
        assert!(calendar.is_makeup_day(date(2025, 9, 28)));
        assert!(!calendar.is_rest_day(date(2025, 9, 10)));
    }

    #[test]
    fn missing_dtstart_is_an_error() {
        let ics = "BEGIN:VCALENDAR\r\n\
            BEGIN:VEVENT\r\n\
            SUMMARY:元旦 (假期)\r\n\
            END:VEVENT\r\n\
            END:VCALENDAR\r\n";
        let err = HolidayCalendar::from_bytes(ics, EndDateConvention::Inclusive).unwrap_err();
        assert!(matches!(err, Error::IcsParse(_)));
    }

    #[test]
    fn keyword_classification() {
        let ics = "BEGIN:VCALENDAR\r\n\
            BEGIN:VEVENT\r\n\
            DTSTART;VALUE=DATE:20251011\r\n\
            SUMMARY:国庆 上班\r\n\
            END:VEVENT\r\n\
            BEGIN:VEVENT\r\n\
            DTSTART;VALUE=DATE:20251002\r\n\
            SUMMARY:国庆放假\r\n\
            END:VEVENT\r\n\
            END:VCALENDAR\r\n";
        let calendar = HolidayCalendar::from_bytes(ics, EndDateConvention::Inclusive).unwrap();

        assert!(calendar.is_makeup_day(date(2025, 10, 11)));
        assert!(calendar.is_rest_day(date(2025, 10, 2)));
        assert!(calendar.records()[0].is_workday());
        assert_eq!(calendar.records()[0].name(), "国庆 上班");
    }

    #[test]
    fn summary_suffix_is_stripped() {
        assert_eq!(strip_kind_suffix("春节调休 (补班)"), "春节调休");
        assert_eq!(strip_kind_suffix("春节 (假期)"), "春节");
        assert_eq!(strip_kind_suffix("春节"), "春节");
    }
}

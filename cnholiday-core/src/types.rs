use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// 调休补班事件标题后缀
pub const WORKDAY_MARKER: &str = "补班";
/// 放假事件标题后缀
pub const REST_MARKER: &str = "假期";
/// 默认日历名称
pub const DEFAULT_CALENDAR_NAME: &str = "中国法定节假日";

/// 一条节假日记录：带标签的日期区间
///
/// 字段只读，构造后不可修改。`start_date <= end_date` 由构造函数和反序列化保证。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHolidayRecord")]
pub struct HolidayRecord {
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_workday: bool,
    description: String,
}

impl HolidayRecord {
    /// 创建放假区间，结束日期早于开始日期时返回错误
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self> {
        let name = name.into();
        if end_date < start_date {
            return Err(Error::InvalidRange {
                name,
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            name,
            start_date,
            end_date,
            is_workday: false,
            description: String::new(),
        })
    }

    /// 创建单日记录
    pub fn single_day(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date: date,
            end_date: date,
            is_workday: false,
            description: String::new(),
        }
    }

    /// 标记为调休补班日
    #[must_use]
    pub fn workday(mut self) -> Self {
        self.is_workday = true;
        self
    }

    /// 附加描述
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 名称，如 `春节`、`春节调休`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 第一天
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// 最后一天（含）
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// 是否为调休补班日（而非放假）
    pub fn is_workday(&self) -> bool {
        self.is_workday
    }

    /// 描述，可为空
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 去重用的身份：同名且同一天开始的记录视为同一事件
    pub fn identity(&self) -> (&str, NaiveDate) {
        (&self.name, self.start_date)
    }

    /// 生成UID使用的种子字符串，形如 `元旦-2025-01-01`
    pub fn uid_seed(&self) -> String {
        format!("{}-{}", self.name, self.start_date.format("%Y-%m-%d"))
    }

    /// 标题后缀（补班/假期）
    pub fn kind_label(&self) -> &'static str {
        if self.is_workday {
            WORKDAY_MARKER
        } else {
            REST_MARKER
        }
    }

    /// 区间覆盖的天数（含首尾）
    pub fn days(&self) -> i64 {
        self.end_date.signed_duration_since(self.start_date).num_days() + 1
    }

    /// 日期是否落在区间内
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// 两个区间是否至少共享一天
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    /// 逐日迭代区间内的日期
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |date| *date <= self.end_date)
    }
}

/// JSON中的原始记录，`end_date` 缺省表示单日
#[derive(Deserialize)]
struct RawHolidayRecord {
    name: String,
    start_date: NaiveDate,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    is_workday: bool,
    #[serde(default)]
    description: String,
}

impl TryFrom<RawHolidayRecord> for HolidayRecord {
    type Error = Error;

    fn try_from(raw: RawHolidayRecord) -> Result<Self> {
        let end_date = raw.end_date.unwrap_or(raw.start_date);
        let record =
            Self::new(raw.name, raw.start_date, end_date)?.with_description(raw.description);
        Ok(if raw.is_workday { record.workday() } else { record })
    }
}

/// 全天事件DTEND的取值约定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndDateConvention {
    /// DTEND 写入区间最后一天
    #[default]
    Inclusive,
    /// DTEND 写入最后一天的次日（RFC 5545 的开区间写法）
    Exclusive,
}

impl EndDateConvention {
    /// 由区间最后一天计算DTEND
    ///
    /// `Exclusive` 在 `NaiveDate::MAX` 处没有次日，此时DTEND保持为最后一天，
    /// 读回时按单日处理。
    pub fn dtend_for(self, end_date: NaiveDate) -> NaiveDate {
        match self {
            Self::Inclusive => end_date,
            Self::Exclusive => end_date.succ_opt().unwrap_or(end_date),
        }
    }

    /// 由DTSTART/DTEND还原区间最后一天
    ///
    /// DTEND不晚于DTSTART时一律视为单日事件。
    pub fn last_day(self, start: NaiveDate, dtend: NaiveDate) -> NaiveDate {
        if dtend <= start {
            return start;
        }
        match self {
            Self::Inclusive => dtend,
            Self::Exclusive => dtend - Duration::days(1),
        }
    }
}

/// ICS生成选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarOptions {
    /// PRODID
    pub product_id: String,
    /// X-WR-TIMEZONE
    pub timezone: String,
    /// X-WR-CALDESC
    pub description: String,
    /// UID 的 `@` 后缀
    pub uid_domain: String,
    /// DTEND 取值约定
    pub end_date: EndDateConvention,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            product_id: "-//Chinese Holiday Calendar//CN".to_string(),
            timezone: "Asia/Shanghai".to_string(),
            description: "中国法定节假日及调休安排".to_string(),
            uid_domain: "chinese-holiday".to_string(),
            end_date: EndDateConvention::Inclusive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_reversed_range() {
        let err = HolidayRecord::new("春节", date(2025, 2, 4), date(2025, 1, 28)).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    #[test]
    fn spring_festival_covers_eight_days() {
        let record = HolidayRecord::new("春节", date(2025, 1, 28), date(2025, 2, 4)).unwrap();
        assert_eq!(record.days(), 8);
        assert_eq!(record.dates().count(), 8);
        assert!(record.contains(date(2025, 2, 1)));
        assert!(!record.contains(date(2025, 2, 5)));
        assert_eq!(record.kind_label(), REST_MARKER);
    }

    #[test]
    fn uid_seed_uses_iso_date() {
        let record = HolidayRecord::single_day("元旦", date(2025, 1, 1));
        assert_eq!(record.uid_seed(), "元旦-2025-01-01");
        assert_eq!(record.identity(), ("元旦", date(2025, 1, 1)));
    }

    #[test]
    fn json_defaults_to_single_rest_day() {
        let record: HolidayRecord =
            serde_json::from_str(r#"{"name":"元旦","start_date":"2025-01-01"}"#).unwrap();
        assert_eq!(record.end_date(), date(2025, 1, 1));
        assert!(!record.is_workday());
        assert_eq!(record.description(), "");
    }

    #[test]
    fn json_rejects_reversed_range() {
        let result: std::result::Result<HolidayRecord, _> = serde_json::from_str(
            r#"{"name":"国庆节","start_date":"2026-10-07","end_date":"2026-10-01"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn end_date_conventions() {
        let start = date(2026, 10, 1);
        let end = date(2026, 10, 7);
        assert_eq!(EndDateConvention::Inclusive.dtend_for(end), end);
        assert_eq!(EndDateConvention::Exclusive.dtend_for(end), date(2026, 10, 8));
        assert_eq!(EndDateConvention::Exclusive.last_day(start, date(2026, 10, 8)), end);
        assert_eq!(EndDateConvention::Inclusive.last_day(start, end), end);
        assert_eq!(EndDateConvention::Exclusive.last_day(start, start), start);
    }

    #[test]
    fn exclusive_end_saturates_at_max_date() {
        let last = NaiveDate::MAX;
        assert_eq!(EndDateConvention::Exclusive.dtend_for(last), last);
        assert_eq!(EndDateConvention::Exclusive.last_day(last, last), last);
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{CalendarOptions, HolidayRecord};


/// 内容行的最大字节数（不含CRLF）
const MAX_LINE_OCTETS: usize = 75;

/// ICS日历生成器
pub struct DocumentBuilder {
    options: CalendarOptions,
}

impl DocumentBuilder {
    /// 以指定选项创建生成器
    pub fn new(options: CalendarOptions) -> Self {
        Self { options }
    }

    /// 当前使用的选项
    pub fn options(&self) -> &CalendarOptions {
        &self.options
    }

    /// 生成完整的ICS日历内容
    ///
    /// 事件按输入顺序输出，不做排序、过滤或去重。所有事件共用同一个DTSTAMP。
    pub fn render_document(&self, records: &[HolidayRecord], calendar_name: &str) -> String {
        self.render_document_at(records, calendar_name, Utc::now())
    }

    /// 以指定的生成时间生成日历
    pub fn render_document_at(
        &self,
        records: &[HolidayRecord],
        calendar_name: &str,
        stamp: DateTime<Utc>,
    ) -> String {
        tracing::debug!("生成日历 {}: {} 个事件", calendar_name, records.len());

        let mut ics_content = String::new();

        // ICS文件头部
        push_line(&mut ics_content, "BEGIN:VCALENDAR");
        push_line(&mut ics_content, "VERSION:2.0");
        push_line(&mut ics_content, &format!("PRODID:{}", self.options.product_id));
        push_line(&mut ics_content, "CALSCALE:GREGORIAN");
        push_line(&mut ics_content, "METHOD:PUBLISH");
        push_line(
            &mut ics_content,
            &format!("X-WR-CALNAME:{}", escape_text(calendar_name)),
        );
        push_line(
            &mut ics_content,
            &format!("X-WR-TIMEZONE:{}", self.options.timezone),
        );
        push_line(
            &mut ics_content,
            &format!("X-WR-CALDESC:{}", escape_text(&self.options.description)),
        );

        for record in records {
            self.add_holiday_event(&mut ics_content, record, stamp);
        }

        // ICS文件尾部
        push_line(&mut ics_content, "END:VCALENDAR");

        ics_content
    }

    /// 生成单个事件块，DTSTAMP取当前时间
    pub fn render_event(&self, record: &HolidayRecord) -> String {
        self.render_event_at(record, Utc::now())
    }

    /// 以指定的生成时间生成单个事件块
    pub fn render_event_at(&self, record: &HolidayRecord, stamp: DateTime<Utc>) -> String {
        let mut block = String::new();
        self.add_holiday_event(&mut block, record, stamp);
        block
    }

    /// 事件UID：`uuid5(DNS, "{name}-{start_date}")@{uid_domain}`
    pub fn event_uid(&self, record: &HolidayRecord) -> String {
        let uuid = Uuid::new_v5(&Uuid::NAMESPACE_DNS, record.uid_seed().as_bytes());
        format!("{}@{}", uuid, self.options.uid_domain)
    }

    /// 添加单个节假日事件
    fn add_holiday_event(
        &self,
        ics_content: &mut String,
        record: &HolidayRecord,
        stamp: DateTime<Utc>,
    ) {
        let dtend = self.options.end_date.dtend_for(record.end_date());

        push_line(ics_content, "BEGIN:VEVENT");
        push_line(ics_content, &format!("UID:{}", self.event_uid(record)));
        push_line(
            ics_content,
            &format!("DTSTAMP:{}", stamp.format("%Y%m%dT%H%M%SZ")),
        );
        push_line(
            ics_content,
            &format!("DTSTART;VALUE=DATE:{}", format_date(record.start_date())),
        );
        push_line(
            ics_content,
            &format!("DTEND;VALUE=DATE:{}", format_date(dtend)),
        );
        push_line(
            ics_content,
            &format!("SUMMARY:{}", escape_text(&build_summary(record))),
        );
        push_line(
            ics_content,
            &format!("DESCRIPTION:{}", escape_text(record.description())),
        );
        push_line(ics_content, "STATUS:CONFIRMED");
        push_line(ics_content, "TRANSP:TRANSPARENT");
        push_line(ics_content, "END:VEVENT");
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new(CalendarOptions::default())
    }
}

/// 使用默认选项生成单个事件块
pub fn render_event(record: &HolidayRecord) -> String {
    DocumentBuilder::default().render_event(record)
}

/// 使用默认选项生成完整日历
pub fn render_document(records: &[HolidayRecord], calendar_name: &str) -> String {
    DocumentBuilder::default().render_document(records, calendar_name)
}

/// 事件标题，例如 `春节 (假期)`、`春节调休 (补班)`
pub fn build_summary(record: &HolidayRecord) -> String {
    format!("{} ({})", record.name(), record.kind_label())
}

/// 格式化为 `YYYYMMDD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// 转义ICS文本内容
pub fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace('\r', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

/// 还原转义过的ICS文本
pub fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// 按75字节折行，只在UTF-8字符边界处断开
///
/// 解析器会裁掉每个物理行末尾的空白，所以折行点前移到空白之前，
/// 让空白落在续行开头。整段都是空白时无法避免，按原位置断开。
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut rest = line;
    let mut limit = MAX_LINE_OCTETS;
    while rest.len() > limit {
        let mut split = limit;
        while !rest.is_char_boundary(split) {
            split -= 1;
        }
        let trimmed = rest[..split].trim_end().len();
        if trimmed > 0 {
            split = trimmed;
        }

        folded.push_str(&rest[..split]);
        folded.push_str("\r\n ");
        rest = &rest[split..];
        // 续行的前导空格占一个字节
        limit = MAX_LINE_OCTETS - 1;
    }
    folded.push_str(rest);
    folded
}

fn push_line(ics_content: &mut String, line: &str) {
    ics_content.push_str(&fold_line(line));
    ics_content.push_str("\r\n");
}

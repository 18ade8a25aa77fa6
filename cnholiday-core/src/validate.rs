//! 节假日数据检查
//!
//! 只报告问题，不修改也不拒绝输入；生成器本身保持宽松。

use std::{collections::HashMap, fmt};

use chrono::NaiveDate;

use crate::HolidayRecord;

/// 数据检查发现的问题，下标指向输入切片
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// 两条记录同名且开始日期相同，会得到相同的UID
    DuplicateIdentity {
        /// 先出现的记录
        first: usize,
        /// 重复的记录
        second: usize,
        /// 共同的名称
        name: String,
        /// 共同的开始日期
        start_date: NaiveDate,
    },
    /// 两段放假区间至少重叠一天
    OverlappingRest {
        /// 先出现的区间
        first: usize,
        /// 后出现的区间
        second: usize,
    },
    /// 调休补班日落在某段放假区间内
    MakeupInsideRest {
        /// 补班记录
        makeup: usize,
        /// 包含该日的放假记录
        rest: usize,
        /// 第一个冲突日期
        date: NaiveDate,
    },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateIdentity {
                first,
                second,
                name,
                start_date,
            } => write!(
                f,
                "记录 #{first} 与 #{second} 重复: {name} ({start_date})"
            ),
            Self::OverlappingRest { first, second } => {
                write!(f, "放假区间 #{first} 与 #{second} 重叠")
            }
            Self::MakeupInsideRest { makeup, rest, date } => {
                write!(f, "补班日 #{makeup} ({date}) 落在放假区间 #{rest} 内")
            }
        }
    }
}

/// 检查记录列表，按发现顺序返回问题
pub fn check_records(records: &[HolidayRecord]) -> Vec<Issue> {
    let mut issues = Vec::new();

    let mut seen: HashMap<(&str, NaiveDate), usize> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        if let Some(&first) = seen.get(&record.identity()) {
            issues.push(Issue::DuplicateIdentity {
                first,
                second: idx,
                name: record.name().to_string(),
                start_date: record.start_date(),
            });
        } else {
            seen.insert(record.identity(), idx);
        }
    }

    let rests: Vec<(usize, &HolidayRecord)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_workday())
        .collect();

    for (i, &(first, a)) in rests.iter().enumerate() {
        for &(second, b) in &rests[i + 1..] {
            if a.overlaps(b) {
                issues.push(Issue::OverlappingRest { first, second });
            }
        }
    }

    for (makeup, record) in records.iter().enumerate().filter(|(_, r)| r.is_workday()) {
        for &(rest, period) in &rests {
            if let Some(date) = record.dates().find(|date| period.contains(*date)) {
                issues.push(Issue::MakeupInsideRest { makeup, rest, date });
            }
        }
    }

    for issue in &issues {
        tracing::debug!("节假日数据问题: {}", issue);
    }

    issues
}

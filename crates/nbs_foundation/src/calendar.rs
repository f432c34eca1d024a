// crates/nbs_foundation/src/calendar.rs

//! 日历工具
//!
//! 年内日期序列、月-日窗口（生长季、定殖期等）以及生态时间步
//! (ecological time step, ets) 内窗口天数的统计。

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{NbsError, NbsResult};

/// 解析日期字符串（`YYYY-MM-DD`，允许附带时间部分）
pub fn parse_date(s: &str) -> NbsResult<NaiveDate> {
    let trimmed = s.trim();
    let date_part = trimmed.split([' ', 'T']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y/%m/%d"))
        .map_err(|e| NbsError::invalid_input(format!("无法解析日期 '{}': {}", s, e)))
}

/// 一年的天数
pub fn days_in_year(year: i32) -> usize {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// 闭区间日期序列
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// 某一年的全部日期
pub fn year_dates(year: i32) -> Vec<NaiveDate> {
    match (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) {
        (Some(start), Some(end)) => date_range(start, end),
        _ => Vec::new(),
    }
}

/// 与年份无关的月-日
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    /// 月 (1-12)
    pub month: u32,
    /// 日 (1-31)
    pub day: u32,
}

impl MonthDay {
    /// 创建并校验
    pub fn new(month: u32, day: u32) -> NbsResult<Self> {
        // 2000 年为闰年，允许 02-29
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(NbsError::invalid_input(format!(
                "无效的月-日: {:02}-{:02}",
                month, day
            )));
        }
        Ok(Self { month, day })
    }

    /// 取日期的月-日
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = NbsError;

    /// 接受 `MM-DD` 或 `YYYY-MM-DD`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        let (m, d) = match parts.as_slice() {
            [m, d] => (*m, *d),
            [_, m, d] => {
                let d: &str = d;
                (*m, d.split([' ', 'T']).next().unwrap_or(d))
            }
            _ => {
                return Err(NbsError::invalid_input(format!("无效的月-日: '{}'", s)));
            }
        };
        let month = m
            .parse::<u32>()
            .map_err(|_| NbsError::invalid_input(format!("无效的月份: '{}'", s)))?;
        let day = d
            .parse::<u32>()
            .map_err(|_| NbsError::invalid_input(format!("无效的日: '{}'", s)))?;
        Self::new(month, day)
    }
}

impl TryFrom<String> for MonthDay {
    type Error = NbsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}

/// 判断日期是否位于月-日窗口内
///
/// 月份须在 `[start.month, end.month]` 内；在起始月要求日 ≥ 起始日，
/// 在结束月要求日 ≤ 结束日。窗口不跨年。
pub fn in_window(date: NaiveDate, start: MonthDay, end: MonthDay) -> bool {
    let month = date.month();
    let day = date.day();
    if month < start.month || month > end.month {
        return false;
    }
    if month == start.month {
        return start.day <= day && (month != end.month || day <= end.day);
    }
    if month == end.month {
        return day <= end.day;
    }
    true
}

/// 统计每个生态时间步内位于窗口中的天数
///
/// 从 `start_date` 开始连续计日，每步 `step_days` 天，共 `n_steps` 步。
pub fn window_days_per_step(
    start_date: NaiveDate,
    n_steps: usize,
    step_days: usize,
    start: MonthDay,
    end: MonthDay,
) -> Vec<usize> {
    let mut current = start_date;
    let mut counts = Vec::with_capacity(n_steps);
    for _ in 0..n_steps {
        let mut count = 0;
        for _ in 0..step_days {
            if in_window(current, start, end) {
                count += 1;
            }
            current += Duration::days(1);
        }
        counts.push(count);
    }
    counts
}

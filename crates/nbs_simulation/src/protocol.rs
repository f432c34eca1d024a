// crates/nbs_simulation/src/protocol.rs

//! 模拟接口
//!
//! 所有模拟按 `initiate → run → finalise` 的顺序使用：
//!
//! ```text
//! initiate(x_range, y_range, value)  目录、水动力、初始覆盖、输出文件
//! run(duration)                      逐年（或逐生态时间步）推进并写出结果
//! finalise()                         结束水动力模型
//! ```

use chrono::{Datelike, Days, Months, NaiveDate};
use glam::DVec2;
use nbs_hydro::HydroMode;
use ndarray::Array1;

use crate::biota_wrapper::BiotaWrapper;
use crate::error::SimulationResult;

/// 坐标范围（闭区间）
pub type Range = Option<(f64, f64)>;

/// 一次运行的摘要
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// 模型名
    pub model: &'static str,
    /// 模拟的年份
    pub years: Vec<i32>,
    /// 网格单元数
    pub space: usize,
    /// 结束时的平均覆盖度
    pub mean_cover: f64,
}

/// 模拟
pub trait SimulationProtocol {
    /// 水动力模式
    fn mode(&self) -> HydroMode;

    /// 初始化；范围内的网格覆盖度为 `value`，其余为 0
    fn initiate(&mut self, x_range: Range, y_range: Range, value: Option<f64>)
        -> SimulationResult<()>;

    /// 运行 `duration` 年，缺省时取常数中的模拟时长
    fn run(&mut self, duration: Option<usize>) -> SimulationResult<RunSummary>;

    /// 结束
    fn finalise(&mut self) -> SimulationResult<()>;
}

/// 包含多个生物对象的模拟
pub trait MultipleBiotaSimulationProtocol: SimulationProtocol {
    /// 生物类型
    type Biota;

    /// 各生物对象及其输出
    fn biota_wrapper_list(&self) -> &[BiotaWrapper<Self::Biota>];
}

/// 按坐标范围设置初始覆盖
pub fn initial_cover(xy: &[DVec2], x_range: Range, y_range: Range, value: f64) -> Array1<f64> {
    let inside = |v: f64, range: Range| range.map_or(true, |(lo, hi)| lo <= v && v <= hi);
    xy.iter()
        .map(|p| {
            if inside(p.x, x_range) && inside(p.y, y_range) {
                value
            } else {
                0.0
            }
        })
        .collect()
}

/// 第 `offset` 个模拟年的起始日期（与 `start` 同月同日）
pub fn year_start(start: NaiveDate, offset: usize) -> NaiveDate {
    start
        .checked_add_months(Months::new(12 * offset as u32))
        .unwrap_or(start)
}

/// 模拟年内第 `ets` 个生态时间步的最后一天
pub fn ets_end_date(year_start: NaiveDate, ets: usize, ets_duration: f64) -> NaiveDate {
    let days = ((ets + 1) as f64 * ets_duration).round().max(1.0) as u64 - 1;
    year_start
        .checked_add_days(Days::new(days))
        .unwrap_or(year_start)
}

/// 第 `offset` 个模拟年的日历年份
pub fn calendar_year(start: NaiveDate, offset: usize) -> i32 {
    year_start(start, offset).year()
}

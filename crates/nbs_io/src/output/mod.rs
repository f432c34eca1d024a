// crates/nbs_io/src/output/mod.rs

//! 模拟结果输出
//!
//! - [`dataset`]: netCDF 数据模型的内存数据集
//! - [`writer`]: JSON / netCDF 写出
//! - [`stations`]: 输出站点选择
//! - [`map`]: 整个计算域的年度（或逐步）输出
//! - [`his`]: 站点时间序列输出
//! - [`wrapper`]: map 与 his 的组合

pub mod dataset;
pub mod his;
pub mod map;
pub mod stations;
pub mod wrapper;
pub mod writer;

pub use dataset::{Dataset, Dimension, Variable, VariableSpec};
pub use his::{HisOutput, STATION_DIM};
pub use map::{MapOutput, FACE_DIM};
pub use stations::{get_xy_stations, nearest_cell, select_stations, tile_stations};
pub use wrapper::OutputWrapper;
pub use writer::{ensure_extension, read_json_dataset, write_dataset};

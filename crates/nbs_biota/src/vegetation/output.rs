// crates/nbs_biota/src/vegetation/output.rs

//! 植被输出变量定义
//!
//! 每个生态时间步写一条记录。`_j` 变量汇总幼苗与幼年阶段，`_m` 为成年阶段；
//! 各属性按覆盖比例加权平均。

use nbs_io::output::tile_stations;
use nbs_io::VariableSpec;
use ndarray::{Array1, Array2};

use super::life_stages::{weighted_mean, LifeStages};
use super::model::Vegetation;

/// 植被输出变量（map 与 his 相同）
pub const VARIABLES: [VariableSpec; 12] = [
    VariableSpec::new("veg_frac_j", "juvenile vegetation fraction", "-"),
    VariableSpec::new("veg_frac_m", "mature vegetation fraction", "-"),
    VariableSpec::new("veg_height_j", "juvenile vegetation height", "m"),
    VariableSpec::new("veg_height_m", "mature vegetation height", "m"),
    VariableSpec::new("stem_dia_j", "juvenile stem diameter", "m"),
    VariableSpec::new("stem_dia_m", "mature stem diameter", "m"),
    VariableSpec::new("root_len_j", "juvenile root length", "m"),
    VariableSpec::new("root_len_m", "mature root length", "m"),
    VariableSpec::new("stem_num_j", "juvenile stem density", "m-2"),
    VariableSpec::new("stem_num_m", "mature stem density", "m-2"),
    VariableSpec::new("cover", "total vegetation cover", "-"),
    VariableSpec::new("veg_den", "vegetation density", "m-2"),
];

const JUVENILE: [&str; 5] = ["veg_frac_j", "veg_height_j", "stem_dia_j", "root_len_j", "stem_num_j"];
const MATURE: [&str; 5] = ["veg_frac_m", "veg_height_m", "stem_dia_m", "root_len_m", "stem_num_m"];

fn stage_values(
    space: usize,
    stages: &[&LifeStages],
    names: [&'static str; 5],
) -> Vec<(&'static str, Array1<f64>)> {
    let frac = stages
        .iter()
        .fold(Array1::zeros(space), |acc, s| acc + s.cover());
    vec![
        (names[0], frac),
        (names[1], weighted_mean(stages, |s| &s.veg_height)),
        (names[2], weighted_mean(stages, |s| &s.stem_dia)),
        (names[3], weighted_mean(stages, |s| &s.root_len)),
        (names[4], weighted_mean(stages, |s| &s.stem_num)),
    ]
}

/// 每个网格一个值
pub fn map_values(veg: &Vegetation) -> Vec<(&'static str, Array1<f64>)> {
    let mut values = stage_values(veg.space(), &[&veg.initial, &veg.juvenile], JUVENILE);
    values.extend(stage_values(veg.space(), &[&veg.mature], MATURE));
    values.push(("cover", veg.total_cover()));
    values.push(("veg_den", veg.veg_den()));
    values
}

/// 站点取值（一个时刻 × stations）
pub fn his_values(veg: &Vegetation, idx_stations: &[usize]) -> Vec<(&'static str, Array2<f64>)> {
    map_values(veg)
        .into_iter()
        .map(|(name, v)| (name, tile_stations(&v, idx_stations, 1)))
        .collect()
}

// crates/nbs_biota/src/mangrove/output.rs

//! 红树林输出变量定义

use nbs_io::output::tile_stations;
use nbs_io::VariableSpec;
use nbs_hydro::HydroCoupling;
use ndarray::{Array1, Array2};

use super::model::Mangrove;

/// 红树林输出变量（map 与 his 相同）
pub const VARIABLES: [VariableSpec; 5] = [
    VariableSpec::new("height", "mean mangrove height", "m"),
    VariableSpec::new("stem_dia", "mean stem diameter", "m"),
    VariableSpec::new("stem_num", "number of stems", "cell-1"),
    VariableSpec::new("biomass", "above-ground biomass", "kg cell-1"),
    VariableSpec::new("cover", "mangrove presence", "-"),
];

/// 每个网格一个值
pub fn map_values(mangrove: &Mangrove) -> Vec<(&'static str, Array1<f64>)> {
    vec![
        ("height", mangrove.stem_height()),
        ("stem_dia", mangrove.stem_diameter()),
        ("stem_num", mangrove.total_stems()),
        ("biomass", mangrove.bio_total_cell()),
        ("cover", mangrove.cover()),
    ]
}

/// 站点取值（一个时刻 × stations）
pub fn his_values(mangrove: &Mangrove, idx_stations: &[usize]) -> Vec<(&'static str, Array2<f64>)> {
    map_values(mangrove)
        .into_iter()
        .map(|(name, v)| (name, tile_stations(&v, idx_stations, 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbs_config::MangroveConstants;

    #[test]
    fn test_values() {
        let mut m = Mangrove::new(MangroveConstants::default(), 2);
        m.initiate(&Array1::from(vec![0.0, 1.0])).unwrap();
        let values = map_values(&m);
        assert_eq!(values.len(), VARIABLES.len());
        let stems = &values.iter().find(|(n, _)| *n == "stem_num").unwrap().1;
        assert_eq!(stems.to_vec(), vec![0.0, 750.0]);
        let his = his_values(&m, &[1]);
        assert!(his.iter().all(|(_, v)| v.dim() == (1, 1)));
        assert_eq!(his[4].1[[0, 0]], 1.0);
    }
}

// crates/nbs_biota/src/coral/output.rs

//! 珊瑚输出变量定义
//!
//! 变量按过程分组，map 输出每年一条记录（年平均或年末值），
//! his 输出为站点上的逐日值。

use std::fmt;
use std::str::FromStr;

use nbs_foundation::NbsError;
use nbs_io::output::{select_stations, tile_stations};
use nbs_io::VariableSpec;
use ndarray::{s, Array1, Array2, Axis};

use super::model::Coral;

/// 输出变量组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoralOutputGroup {
    /// 光照微环境
    Lme,
    /// 流动微环境
    Fme,
    /// 热微环境
    Tme,
    /// 光合作用
    Pd,
    /// 种群状态
    Ps,
    /// 钙化
    Calc,
    /// 形态
    Md,
}

impl CoralOutputGroup {
    /// 全部变量组
    pub const ALL: [Self; 7] = [
        Self::Lme,
        Self::Fme,
        Self::Tme,
        Self::Pd,
        Self::Ps,
        Self::Calc,
        Self::Md,
    ];

    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lme => "lme",
            Self::Fme => "fme",
            Self::Tme => "tme",
            Self::Pd => "pd",
            Self::Ps => "ps",
            Self::Calc => "calc",
            Self::Md => "md",
        }
    }

    /// map 输出变量
    pub fn map_variables(&self) -> &'static [VariableSpec] {
        match self {
            Self::Lme => &[IZ],
            Self::Fme => &[UCM],
            Self::Tme => &[TC, TLO, THI],
            Self::Pd => &[PD],
            Self::Ps => &[PT, PH, PR, PP, PB],
            Self::Calc => &[CALC],
            Self::Md => &MORPHOLOGY,
        }
    }

    /// his 输出变量
    pub fn his_variables(&self) -> &'static [VariableSpec] {
        match self {
            Self::Calc => &[G],
            other => other.map_variables(),
        }
    }
}

impl fmt::Display for CoralOutputGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CoralOutputGroup {
    type Err = NbsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|g| g.name()).collect();
                NbsError::unknown_mode(s, &names)
            })
    }
}

/// 解析变量组名称，空列表表示全部
pub fn parse_groups(names: &[String]) -> Result<Vec<CoralOutputGroup>, NbsError> {
    if names.is_empty() {
        return Ok(CoralOutputGroup::ALL.to_vec());
    }
    names.iter().map(|n| n.parse()).collect()
}

// ============================================================
// 变量
// ============================================================

const IZ: VariableSpec = VariableSpec::new("Iz", "representative light-intensity", "micro-mol photons m-2 s-1");
const UCM: VariableSpec = VariableSpec::new("ucm", "in-canopy flow", "m s-1");
const TC: VariableSpec = VariableSpec::new("Tc", "coral temperature", "K");
const TLO: VariableSpec = VariableSpec::new("Tlo", "lower thermal limit", "K");
const THI: VariableSpec = VariableSpec::new("Thi", "upper thermal limit", "K");
const PD: VariableSpec = VariableSpec::new("PD", "photosynthetic rate", "-");
const PT: VariableSpec = VariableSpec::new("PT", "total living coral population", "-");
const PH: VariableSpec = VariableSpec::new("PH", "healthy coral population", "-");
const PR: VariableSpec = VariableSpec::new("PR", "recovering coral population", "-");
const PP: VariableSpec = VariableSpec::new("PP", "pale coral population", "-");
const PB: VariableSpec = VariableSpec::new("PB", "bleached coral population", "-");
const CALC: VariableSpec = VariableSpec::new("calc", "annual calcification", "kg m-2 yr-1");
const G: VariableSpec = VariableSpec::new("G", "calcification", "kg m-2 d-1");
const MORPHOLOGY: [VariableSpec; 6] = [
    VariableSpec::new("dc", "coral plate diameter", "m"),
    VariableSpec::new("hc", "coral height", "m"),
    VariableSpec::new("bc", "coral base diameter", "m"),
    VariableSpec::new("tc", "coral plate thickness", "m"),
    VariableSpec::new("ac", "coral axial distance", "m"),
    VariableSpec::new("Vc", "coral volume", "m3"),
];

/// 选中变量组的 map 变量
pub fn map_variables(groups: &[CoralOutputGroup]) -> Vec<VariableSpec> {
    groups
        .iter()
        .flat_map(|g| g.map_variables().iter().copied())
        .collect()
}

/// 选中变量组的 his 变量
pub fn his_variables(groups: &[CoralOutputGroup]) -> Vec<VariableSpec> {
    groups
        .iter()
        .flat_map(|g| g.his_variables().iter().copied())
        .collect()
}

// ============================================================
// 取值
// ============================================================

fn mean_over_time(matrix: &Array2<f64>, space: usize) -> Array1<f64> {
    matrix
        .mean_axis(Axis(1))
        .unwrap_or_else(|| Array1::zeros(space))
}

fn population(coral: &Coral, state: usize) -> Array2<f64> {
    coral.pop_states.slice(s![.., .., state]).to_owned()
}

/// 年度 map 取值（每个网格一个值）
pub fn map_values(coral: &Coral) -> Vec<(&'static str, Array1<f64>)> {
    let n = coral.space();
    let p = &coral.p0;
    vec![
        ("Iz", mean_over_time(&coral.light, n)),
        ("ucm", coral.ucm.clone()),
        ("Tc", mean_over_time(&coral.temp, n)),
        ("Tlo", coral.tlo.clone()),
        ("Thi", coral.thi.clone()),
        ("PD", mean_over_time(&coral.photo_rate, n)),
        ("PT", p.sum_axis(Axis(1))),
        ("PH", p.column(0).to_owned()),
        ("PR", p.column(1).to_owned()),
        ("PP", p.column(2).to_owned()),
        ("PB", p.column(3).to_owned()),
        ("calc", coral.calc.sum_axis(Axis(1))),
        ("dc", coral.dc.clone()),
        ("hc", coral.hc.clone()),
        ("bc", coral.bc.clone()),
        ("tc", coral.tc.clone()),
        ("ac", coral.ac.clone()),
        ("Vc", coral.volume()),
    ]
}

/// 逐日 his 取值 (time × stations)
pub fn his_values(coral: &Coral, idx_stations: &[usize]) -> Vec<(&'static str, Array2<f64>)> {
    let time = coral.photo_rate.ncols();
    let daily = |m: &Array2<f64>| select_stations(m, idx_stations);
    let fixed = |v: &Array1<f64>| tile_stations(v, idx_stations, time);
    let total = coral.pop_states.sum_axis(Axis(2));
    vec![
        ("Iz", daily(&coral.light)),
        ("ucm", fixed(&coral.ucm)),
        ("Tc", daily(&coral.temp)),
        ("Tlo", fixed(&coral.tlo)),
        ("Thi", fixed(&coral.thi)),
        ("PD", daily(&coral.photo_rate)),
        ("PT", daily(&total)),
        ("PH", daily(&population(coral, 0))),
        ("PR", daily(&population(coral, 1))),
        ("PP", daily(&population(coral, 2))),
        ("PB", daily(&population(coral, 3))),
        ("G", daily(&coral.calc)),
        ("dc", fixed(&coral.dc)),
        ("hc", fixed(&coral.hc)),
        ("bc", fixed(&coral.bc)),
        ("tc", fixed(&coral.tc)),
        ("ac", fixed(&coral.ac)),
        ("Vc", fixed(&coral.volume())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coral::model::CoralMorphology;
    use nbs_config::CoralConstants;
    use ndarray::Array3;

    #[test]
    fn test_parse_groups() {
        assert_eq!(parse_groups(&[]).unwrap().len(), 7);
        let groups = parse_groups(&["PS".to_string(), "md".to_string()]).unwrap();
        assert_eq!(groups, vec![CoralOutputGroup::Ps, CoralOutputGroup::Md]);
        assert!(parse_groups(&["light".to_string()]).is_err());
    }

    #[test]
    fn test_variables_per_group() {
        let map = map_variables(&[CoralOutputGroup::Calc, CoralOutputGroup::Md]);
        let names: Vec<&str> = map.iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["calc", "dc", "hc", "bc", "tc", "ac", "Vc"]);
        let his = his_variables(&[CoralOutputGroup::Calc]);
        assert_eq!(his[0].name, "G");
    }

    #[test]
    fn test_values_shapes() {
        let mut c = Coral::new(CoralConstants::default(), CoralMorphology::default(), 1.0, 3);
        c.initiate_coral_morphology(&Array1::from(vec![1.0, 1.0, 0.0]))
            .unwrap();
        c.light = Array2::from_elem((3, 5), 100.0);
        c.temp = Array2::from_elem((3, 5), 300.0);
        c.photo_rate = Array2::from_elem((3, 5), 0.5);
        c.calc = Array2::from_elem((3, 5), 0.1);
        c.pop_states = Array3::from_elem((3, 5, 4), 0.25);

        let map = map_values(&c);
        assert!(map.iter().all(|(_, v)| v.len() == 3));
        let calc = map.iter().find(|(n, _)| *n == "calc").unwrap();
        assert!((calc.1[0] - 0.5).abs() < 1e-12);

        let his = his_values(&c, &[0, 2]);
        assert!(his.iter().all(|(_, v)| v.dim() == (5, 2)));
        let pt = his.iter().find(|(n, _)| *n == "PT").unwrap();
        assert!((pt.1[[0, 0]] - 1.0).abs() < 1e-12);
    }
}

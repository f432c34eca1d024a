// crates/nbs_hydro/src/mode.rs

//! 水动力模式

use std::fmt;
use std::str::FromStr;

use crate::error::HydroError;

/// 水动力模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HydroMode {
    /// 单点，固定水动力条件
    Reef0D,
    /// 一维断面
    Transect,
    /// Delft3D FlowFM（BMI）
    FlowFm,
    /// Delft3D DIMR（BMI）
    Dimr,
}

impl HydroMode {
    /// 所有模式
    pub const ALL: [HydroMode; 4] = [Self::Reef0D, Self::Transect, Self::FlowFm, Self::Dimr];

    /// 模式名
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reef0D => "Reef0D",
            Self::Transect => "Transect",
            Self::FlowFm => "FlowFMModel",
            Self::Dimr => "DimrModel",
        }
    }

    /// 所有模式名
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(HydroMode::name).collect()
    }

    /// 是否通过 BMI 耦合
    pub fn is_bmi(&self) -> bool {
        matches!(self, Self::FlowFm | Self::Dimr)
    }
}

impl fmt::Display for HydroMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HydroMode {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| HydroError::UnknownMode {
                mode: s.to_string(),
                supported: Self::names(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for mode in HydroMode::ALL {
            assert_eq!(mode.name().parse::<HydroMode>().unwrap(), mode);
        }
        assert!(HydroMode::FlowFm.is_bmi());
        assert!(!HydroMode::Transect.is_bmi());
    }

    #[test]
    fn test_unknown_mode() {
        let err = "Reef1D".parse::<HydroMode>().unwrap_err();
        assert!(matches!(err, HydroError::UnknownMode { .. }));
    }
}

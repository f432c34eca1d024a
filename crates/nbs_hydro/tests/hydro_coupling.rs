//! 水动力耦合测试
//!
//! 通过工厂创建各模式的模型，并以简单的生物反馈推进。

use std::path::Path;

use nbs_config::HydrodynamicsConfig;
use nbs_hydro::{
    HydroCoupling, HydroError, HydrodynamicProtocol, HydrodynamicsFactory, MemoryEngine,
};
use ndarray::Array1;

/// 固定的植被特征
struct Meadow {
    space: usize,
}

impl HydroCoupling for Meadow {
    fn vegetation_density(&self) -> Array1<f64> {
        Array1::from_elem(self.space, 2.5)
    }

    fn stem_diameter(&self) -> Array1<f64> {
        Array1::from_elem(self.space, 0.01)
    }

    fn stem_height(&self) -> Array1<f64> {
        Array1::from_elem(self.space, 0.4)
    }
}

// ============================================================
// 断面
// ============================================================

#[test]
fn transect_from_factory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("transect.csv"),
        "x,y,z,Uc,outpoint\n0,0,-4,0.2,1\n50,0,-3,0.2,1\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("waves.txt"), "0 1.0 6.0 0.0\n1 1.5 7.0 0.3\n").unwrap();

    let config = HydrodynamicsConfig {
        config_file: Some("transect.csv".into()),
        definition_file: Some("waves.txt".into()),
        ..Default::default()
    };
    let mut model = HydrodynamicsFactory::create("Transect", dir.path(), &config).unwrap();
    model.initiate().unwrap();
    let meadow = Meadow { space: model.space() };
    let update = model.update(&meadow, 1).unwrap();
    assert_eq!(update.current_vel.len(), 2);
    assert!((update.current_vel[0] - 0.3).abs() < 1e-12);
    model.finalise().unwrap();
}

// ============================================================
// Delft3D
// ============================================================

fn flowfm_engine() -> MemoryEngine {
    MemoryEngine::new()
        .with_var("ndxi", &[1], vec![3.0])
        .with_var("xzw", &[3], vec![0.0, 1.0, 2.0])
        .with_var("yzw", &[3], vec![0.0, 0.0, 0.0])
        .with_var("s1", &[3], vec![0.5, 0.5, 0.5])
        .with_var("bl", &[3], vec![-0.5, 0.0, 1.0])
        .with_var("taus", &[3], vec![0.2, 0.1, 0.0])
        .with_var("ucmag", &[3], vec![0.3, 0.2, 0.0])
}

#[test]
fn flowfm_feeds_vegetation_back() {
    let config = HydrodynamicsConfig {
        definition_file: Some("FlowFM.mdu".into()),
        update_interval: 3600.0,
        ..Default::default()
    };
    let mut model = HydrodynamicsFactory::create_with_engine(
        "FlowFMModel",
        Path::new("work"),
        &config,
        Box::new(flowfm_engine()),
    )
    .unwrap();
    model.initiate().unwrap();
    assert_eq!(model.space(), 3);

    let depth = model.water_depth().unwrap();
    assert_eq!(depth.to_vec(), vec![1.0, 0.5, -0.5]);

    let series = model
        .update_hydromorphodynamics(&Meadow { space: 3 }, 4)
        .unwrap();
    assert_eq!(series.space(), 3);
    assert_eq!(series.steps(), 4);
    assert!(series.water_level.iter().all(|&wl| wl == 0.5));
    model.finalise().unwrap();
}

#[test]
fn bmi_mode_needs_engine() {
    let err = HydrodynamicsFactory::create(
        "DimrModel",
        Path::new("."),
        &HydrodynamicsConfig::default(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, HydroError::MissingEngine(_)));
}

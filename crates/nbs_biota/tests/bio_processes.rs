//! 生物过程链测试
//!
//! 以合成的环境与水动力时间序列依次执行各模型的完整年度循环。

use nbs_biota::coral::{
    Calcification, Dislodgement, Flow, Light, Morphology, Photosynthesis, PopulationStates,
    Recruitment, Temperature,
};
use nbs_biota::mangrove::{
    MangroveColonisation, MangroveGrowth, MangroveHydroMorphodynamics, MangroveMortality,
};
use nbs_biota::vegetation::{Colonisation, Growth, HydroMorphodynamics, Mortality};
use nbs_biota::{Coral, CoralMorphology, Mangrove, Vegetation};
use nbs_config::{CoralConstants, MangroveConstants, VegetationConstants};
use nbs_foundation::SpaceTime;
use nbs_hydro::HydroMorphoSeries;
use ndarray::{Array1, Array2, Axis};

// ============================================================
// 珊瑚
// ============================================================

#[test]
fn coral_year_cycle() {
    let days = 365;
    let depth = [5.0, 8.0];
    let mut coral = Coral::new(CoralConstants::default(), CoralMorphology::default(), 1.0, 2);
    coral
        .initiate_coral_morphology(&Array1::from(vec![1.0, 1.0]))
        .unwrap();
    let volume_before = coral.volume();

    let spacetime = SpaceTime::new(2, days);
    let light_in = vec![600.0; days];
    Light::new(spacetime, &light_in, &[0.1], &depth)
        .unwrap()
        .rep_light(&mut coral)
        .unwrap();

    let flow = Flow::new(
        Array1::from(vec![0.2, 0.2]),
        Array1::from(vec![0.3, 0.3]),
        Array1::from(depth.to_vec()),
        Array1::from(vec![4.0, 4.0]),
    )
    .unwrap();
    flow.velocities(&mut coral, true).unwrap();
    flow.thermal_boundary_layer(&mut coral);

    Temperature::new(spacetime, &vec![300.0; days])
        .unwrap()
        .coral_temperature(&mut coral)
        .unwrap();

    let mmm = vec![(1999, 297.0, 302.0), (2000, 298.0, 303.0)];
    Photosynthesis::new(light_in.clone(), mmm, 2001)
        .photo_rate(&mut coral)
        .unwrap();
    PopulationStates::new().pop_states(&mut coral).unwrap();
    Calcification::new()
        .calcification_rate(&mut coral, &vec![5.0; days])
        .unwrap();

    let calc_sum = coral.calc.sum_axis(Axis(1));
    assert!(calc_sum.iter().all(|&c| c > 0.0));
    Morphology::new(calc_sum, &light_in)
        .update(&mut coral)
        .unwrap();
    Dislodgement::new().update(&mut coral);
    Recruitment::new().update(&mut coral).unwrap();

    let volume_after = coral.volume();
    for i in 0..2 {
        assert!(volume_after[i] > volume_before[i]);
        assert!(coral.living_cover()[i] <= coral.cover[i] * 1.0001);
        assert!(coral.dc[i].is_finite() && coral.dc[i] > 0.0);
    }
    // 浅水单元光照更强
    let light_mean = coral.light.mean_axis(Axis(1)).unwrap();
    assert!(light_mean[0] > light_mean[1]);
}

// ============================================================
// 盐沼植被
// ============================================================

/// 3 个单元：0、1 潮间带，2 始终淹没；一半时刻淹没
fn tidal_series(space_bed: &[f64]) -> HydroMorphoSeries {
    let wl: [f64; 4] = [-1.0, 0.5, 1.0, -0.5];
    let n = space_bed.len();
    HydroMorphoSeries {
        tau: Array2::from_elem((n, 4), 0.1),
        velocity: Array2::from_elem((n, 4), 0.05),
        water_level: Array2::from_shape_fn((n, 4), |(i, t)| wl[t].max(space_bed[i])),
        bed_level: Array2::from_shape_fn((n, 4), |(i, _)| space_bed[i]),
    }
}

#[test]
fn vegetation_two_year_cycle() {
    let bed: [f64; 3] = [0.0, 0.2, -3.0];
    let mut veg = Vegetation::new(VegetationConstants::spartina(), 3);
    let mut colonisation = Colonisation::new(Some(42));
    let hydro = HydroMorphodynamics::new(tidal_series(&bed));
    let t_eco_year = veg.constants.t_eco_year;

    for _year in 0..2 {
        for ets in 0..t_eco_year {
            hydro.update(&mut veg).unwrap();
            Mortality::new().update(&mut veg);
            if veg.growth_days[ets] > 0 {
                Growth::new().update(&mut veg, ets);
            }
            if veg.col_days[ets] > 0 {
                colonisation.update(&mut veg);
            }
            assert!(veg.total_cover().iter().all(|&c| (0.0..=1.0 + 1e-12).contains(&c)));
        }
        veg.update_lifestages();
    }

    let cover = veg.total_cover();
    assert!(cover[0] > 0.0);
    assert!(cover[1] > 0.0);
    assert_eq!(cover[2], 0.0);
    assert!(veg.mature.cohorts() >= 1);
    assert!(veg.veg_den()[0] > 0.0);
}

#[test]
fn competing_species_share_space() {
    let bed: [f64; 3] = [0.0, 0.2, -3.0];
    let mut first = Vegetation::new(VegetationConstants::spartina(), 3);
    let mut second = Vegetation::new(VegetationConstants::puccinellia(), 3);
    let hydro = HydroMorphodynamics::new(tidal_series(&bed));
    hydro.update(&mut first).unwrap();
    hydro.update(&mut second).unwrap();

    Colonisation::new(Some(1)).update_pair(&mut first, &mut second);
    let total = first.total_cover() + second.total_cover();
    assert!(total.iter().all(|&c| c <= 1.0 + 1e-12));
    assert!(total[0] > 0.0);
}

// ============================================================
// 红树林
// ============================================================

#[test]
fn mangrove_two_year_cycle() {
    // 4 个时刻中 1 个淹没：相对淹没时长 0.25，淹没胁迫最小
    let bed: [f64; 2] = [0.0, 0.0];
    let wl: [f64; 4] = [-1.0, -0.5, 0.5, -0.2];
    let series = HydroMorphoSeries {
        tau: Array2::zeros((2, 4)),
        velocity: Array2::zeros((2, 4)),
        water_level: Array2::from_shape_fn((2, 4), |(i, t)| wl[t].max(bed[i])),
        bed_level: Array2::zeros((2, 4)),
    };
    let mut mangrove = Mangrove::new(MangroveConstants::default(), 2);
    let hydro = MangroveHydroMorphodynamics::new(series);
    let mut colonisation = MangroveColonisation::new(Some(5));
    let t_eco_year = mangrove.constants.t_eco_year;

    for _year in 0..2 {
        for ets in 0..t_eco_year {
            hydro.update(&mut mangrove).unwrap();
            MangroveMortality::new().update(&mut mangrove, ets);
            MangroveGrowth::new().update(&mut mangrove);
            if mangrove.col_days[ets] > 0 {
                colonisation.update(&mut mangrove);
            }
        }
    }

    assert!((mangrove.inun_rel[0] - 0.25).abs() < 1e-12);
    assert_eq!(mangrove.cohorts(), 1);
    assert_eq!(mangrove.total_stems().to_vec(), vec![750.0, 750.0]);
    assert!(mangrove.stem_dia[[0, 0]] > mangrove.constants.ini_dia);
    assert!(mangrove.mort.iter().all(|&m| m == 0));
}

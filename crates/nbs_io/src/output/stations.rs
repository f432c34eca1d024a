// crates/nbs_io/src/output/stations.rs

//! 输出站点
//!
//! 对每个标记为输出点的坐标，取平方距离最小的网格单元作为站点。

use glam::DVec2;
use ndarray::{Array1, Array2};

/// 由输出点标记确定站点坐标和网格索引
pub fn get_xy_stations(xy_coordinates: &[DVec2], outpoint: &[bool]) -> (Vec<DVec2>, Vec<usize>) {
    let idx: Vec<usize> = xy_coordinates
        .iter()
        .zip(outpoint)
        .filter(|(_, out)| **out)
        .map(|(station, _)| nearest_cell(xy_coordinates, *station))
        .collect();
    let xy = idx.iter().map(|&i| xy_coordinates[i]).collect();
    (xy, idx)
}

/// 最近的网格单元（平方距离最小，距离相同时取较小索引）
pub fn nearest_cell(xy_coordinates: &[DVec2], point: DVec2) -> usize {
    xy_coordinates
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, best_d), (i, p)| {
            let d = p.distance_squared(point);
            if d < best_d {
                (i, d)
            } else {
                (best, best_d)
            }
        })
        .0
}

/// 从 (space × time) 矩阵中取站点，返回 (time × stations)
pub fn select_stations(matrix: &Array2<f64>, idx_stations: &[usize]) -> Array2<f64> {
    let n_time = matrix.ncols();
    Array2::from_shape_fn((n_time, idx_stations.len()), |(t, s)| {
        matrix[[idx_stations[s], t]]
    })
}

/// 把空间向量在站点上复制 `n_time` 次，返回 (time × stations)
pub fn tile_stations(values: &Array1<f64>, idx_stations: &[usize], n_time: usize) -> Array2<f64> {
    Array2::from_shape_fn((n_time, idx_stations.len()), |(_, s)| values[idx_stations[s]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stations_follow_outpoint() {
        let xy = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
        ];
        let outpoint = vec![false, true, true];
        let (xy_st, idx) = get_xy_stations(&xy, &outpoint);
        assert_eq!(idx, vec![1, 2]);
        assert_eq!(xy_st, vec![DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.0)]);
    }

    #[test]
    fn test_nearest_cell() {
        let xy = vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 10.0)];
        assert_eq!(nearest_cell(&xy, DVec2::new(8.0, 7.0)), 1);
        assert_eq!(nearest_cell(&xy, DVec2::new(1.0, -1.0)), 0);
    }

    #[test]
    fn test_select_and_tile() {
        let m = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let s = select_stations(&m, &[2, 0]);
        assert_eq!(s.dim(), (2, 2));
        assert_eq!(s[[0, 0]], 5.0);
        assert_eq!(s[[1, 1]], 2.0);

        let v = Array1::from(vec![7.0, 8.0, 9.0]);
        let t = tile_stations(&v, &[1], 4);
        assert_eq!(t.dim(), (4, 1));
        assert!(t.iter().all(|&x| x == 8.0));
    }
}

// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use lsm_toolbox::fmm::{
    compute_distance_function, compute_extension_fields, solve_eikonal_equation,
    SpatialDerivativeOrder,
};
use lsm_toolbox::grid::Real;

/// Two circles of radius 0.2 centered at (0.25, 0.25) and (-0.25, -0.25)
/// on [-1, 1]^2, 64x64 nodes, two source fields sin((k+1)x) + cos((2k+1)y),
/// first-order scheme. The computed distance must match the true signed
/// distance to the union of the circles, and each extension field must
/// match the source value at the nearest point on the union.
#[test]
fn two_circle_extension_fields_2d() {
    let cells = 63;
    let dims = cells + 1;
    let h = 2.0 / cells as Real;
    let n = dims * dims;

    let centers = [[0.25, 0.25], [-0.25, -0.25]];
    let radius = 0.2;

    let coord = |idx: usize| -> (Real, Real) {
        let x = -1.0 + (idx % dims) as Real * h;
        let y = -1.0 + (idx / dims) as Real * h;
        (x, y)
    };
    let circle_dists = |x: Real, y: Real| -> (Real, Real) {
        let d1 = ((x - centers[0][0]).powi(2) + (y - centers[0][1]).powi(2)).sqrt() - radius;
        let d2 = ((x - centers[1][0]).powi(2) + (y - centers[1][1]).powi(2)).sqrt() - radius;
        (d1, d2)
    };

    let mut phi = vec![0.0; n];
    let mut sources = vec![vec![0.0; n], vec![0.0; n]];
    for idx in 0..n {
        let (x, y) = coord(idx);
        let (d1, d2) = circle_dists(x, y);
        phi[idx] = d1.min(d2);
        for (k, source) in sources.iter_mut().enumerate() {
            let k = k as Real;
            source[idx] = ((k + 1.0) * x).sin() + ((2.0 * k + 1.0) * y).cos();
        }
    }

    let mut distance = vec![0.0; n];
    let mut ext0 = vec![0.0; n];
    let mut ext1 = vec![0.0; n];
    compute_extension_fields::<2>(
        &mut distance,
        &mut [&mut ext0, &mut ext1],
        &phi,
        None,
        &[&sources[0], &sources[1]],
        SpatialDerivativeOrder::Order1,
        [dims, dims],
        [h, h],
    )
    .unwrap();

    let mut max_dist_err_near: Real = 0.0;
    let mut max_dist_err: Real = 0.0;
    let mut max_ext_err_near: Real = 0.0;
    for idx in 0..n {
        let (x, y) = coord(idx);
        let (d1, d2) = circle_dists(x, y);
        let exact = d1.min(d2);
        let err = (distance[idx] - exact).abs();
        max_dist_err = max_dist_err.max(err);
        if exact.abs() < 0.1 {
            max_dist_err_near = max_dist_err_near.max(err);

            // Nearest point on the closer circle.
            let c = if d1 <= d2 { centers[0] } else { centers[1] };
            let dx = x - c[0];
            let dy = y - c[1];
            let scale = radius / (dx * dx + dy * dy).sqrt().max(1e-12);
            let fx = c[0] + scale * dx;
            let fy = c[1] + scale * dy;
            for (k, ext) in [&ext0, &ext1].iter().enumerate() {
                let k = k as Real;
                let expected = ((k + 1.0) * fx).sin() + ((2.0 * k + 1.0) * fy).cos();
                max_ext_err_near = max_ext_err_near.max((ext[idx] - expected).abs());
            }
        }
    }

    assert!(
        max_dist_err_near <= 0.02,
        "near-front distance error {}",
        max_dist_err_near
    );
    assert!(
        max_dist_err <= 2.5 * h,
        "global distance error {}",
        max_dist_err
    );
    assert!(
        max_ext_err_near <= 0.05,
        "near-front extension error {}",
        max_ext_err_near
    );
}

/// Re-distancing a field that is already a signed distance leaves it
/// unchanged to within O(h).
#[test]
fn signed_distance_round_trip() {
    let dims = 64;
    let h = 2.0 / (dims - 1) as Real;
    let n = dims * dims;
    let phi: Vec<Real> = (0..n)
        .map(|idx| {
            let x = -1.0 + (idx % dims) as Real * h;
            let y = -1.0 + (idx / dims) as Real * h;
            (x * x + y * y).sqrt() - 0.6
        })
        .collect();

    let mut distance = vec![0.0; n];
    compute_distance_function::<2>(
        &mut distance,
        &phi,
        None,
        SpatialDerivativeOrder::Order1,
        [dims, dims],
        [h, h],
    )
    .unwrap();

    let mut max_err: Real = 0.0;
    for idx in 0..n {
        let x = -1.0 + (idx % dims) as Real * h;
        let y = -1.0 + (idx / dims) as Real * h;
        // The distance function kinks at the circle center.
        if (x * x + y * y).sqrt() < 0.15 {
            continue;
        }
        max_err = max_err.max((distance[idx] - phi[idx]).abs());
    }
    assert!(max_err <= 2.0 * h, "round-trip error {}", max_err);
}

/// The re-distanced field keeps the sign of phi at every node, so the set
/// of sign-change cells (the zero level set) is preserved.
#[test]
fn zero_level_set_preserved() {
    let dims = 64;
    let h = 2.0 / (dims - 1) as Real;
    let n = dims * dims;
    // Smooth multi-lobed field, deterministic.
    let phi: Vec<Real> = (0..n)
        .map(|idx| {
            let x = -1.0 + (idx % dims) as Real * h;
            let y = -1.0 + (idx / dims) as Real * h;
            (2.3 * x + 0.4).sin() * (1.7 * y - 0.2).cos() + 0.15 * (3.1 * (x + y)).sin() - 0.1
        })
        .collect();

    let mut distance = vec![0.0; n];
    compute_distance_function::<2>(
        &mut distance,
        &phi,
        None,
        SpatialDerivativeOrder::Order1,
        [dims, dims],
        [h, h],
    )
    .unwrap();

    for idx in 0..n {
        if phi[idx] != 0.0 {
            assert!(
                (distance[idx] < 0.0) == (phi[idx] < 0.0),
                "sign flipped at {}",
                idx
            );
        }
    }
}

/// Point-source Eikonal with F = 1: |T(i,j) - h sqrt(i^2 + j^2)| <= C h
/// for a mesh-independent C. Check O(h) convergence by comparing the two
/// resolutions, as the error should roughly halve.
#[test]
fn eikonal_point_source_convergence() {
    let domain = 2.0;

    let run = |dims: usize| -> Real {
        let h = domain / (dims - 1) as Real;
        let n = dims * dims;
        let speed = vec![1.0; n];
        let mut tt = vec![Real::INFINITY; n];
        let c = dims / 2;
        tt[c + c * dims] = 0.0;
        solve_eikonal_equation::<2>(
            &mut tt,
            &speed,
            None,
            SpatialDerivativeOrder::Order1,
            [dims, dims],
            [h, h],
        )
        .unwrap();

        let mut max_err: Real = 0.0;
        for j in 0..dims {
            for i in 0..dims {
                let dist = (((i as i32 - c as i32).pow(2) + (j as i32 - c as i32).pow(2)) as Real)
                    .sqrt()
                    * h;
                if dist < 3.0 * h {
                    continue;
                }
                max_err = max_err.max((tt[i + j * dims] - dist).abs());
            }
        }
        max_err
    };

    let err_coarse = run(65);
    let err_fine = run(129);
    let ratio = err_coarse / err_fine;
    assert!(
        ratio > 1.2 && ratio < 3.0,
        "convergence ratio {} (errors {} vs {})",
        ratio,
        err_coarse,
        err_fine
    );
}

/// With a mask, only the marked cells are treated as fixed boundary data;
/// every other node is solved regardless of its input value.
#[test]
fn eikonal_mask_marks_boundary_cells() {
    let dims = 33;
    let h = 1.0;
    let n = dims * dims;
    let speed = vec![1.0; n];

    let mut tt = vec![Real::INFINITY; n];
    let mut mask = vec![0u8; n];
    let source = 16 * dims;
    tt[source] = 0.0;
    mask[source] = 1;

    solve_eikonal_equation::<2>(
        &mut tt,
        &speed,
        Some(&mask),
        SpatialDerivativeOrder::Order1,
        [dims, dims],
        [h, h],
    )
    .unwrap();

    // All reachable nodes finite, increasing away from the source.
    for (idx, &t) in tt.iter().enumerate() {
        assert!(t.is_finite(), "node {} unreachable", idx);
        assert!(t >= 0.0);
    }
    assert_eq!(tt[source], 0.0);
    assert!(tt[source + 10] > tt[source + 5]);
}

/// 3D distance function for a plane front is exact for the first-order
/// scheme, since every update chain is axis-aligned.
#[test]
fn plane_distance_3d_exact() {
    let dims = 12;
    let h = 0.5;
    let n = dims * dims * dims;
    let phi: Vec<Real> = (0..n)
        .map(|idx| (idx % dims) as Real * h - 2.8)
        .collect();
    let mut distance = vec![0.0; n];
    compute_distance_function::<3>(
        &mut distance,
        &phi,
        None,
        SpatialDerivativeOrder::Order1,
        [dims, dims, dims],
        [h, h, h],
    )
    .unwrap();
    for idx in 0..n {
        assert!(
            (distance[idx] - phi[idx]).abs() < 1e-9,
            "node {}: {} vs {}",
            idx,
            distance[idx],
            phi[idx]
        );
    }
}

/// 3D extension of a constant source stays constant.
#[test]
fn extension_fields_3d_constant() {
    let dims = 17;
    let h = 2.0 / (dims - 1) as Real;
    let n = dims * dims * dims;
    let phi: Vec<Real> = (0..n)
        .map(|idx| {
            let x = -1.0 + (idx % dims) as Real * h;
            let y = -1.0 + ((idx / dims) % dims) as Real * h;
            let z = -1.0 + (idx / (dims * dims)) as Real * h;
            (x * x + y * y + z * z).sqrt() - 0.5
        })
        .collect();
    let source = vec![-1.5; n];
    let mut distance = vec![0.0; n];
    let mut ext = vec![0.0; n];
    compute_extension_fields::<3>(
        &mut distance,
        &mut [&mut ext],
        &phi,
        None,
        &[&source],
        SpatialDerivativeOrder::Order1,
        [dims, dims, dims],
        [h, h, h],
    )
    .unwrap();
    for &e in &ext {
        assert!((e + 1.5).abs() < 1e-9, "extension value {}", e);
    }
}

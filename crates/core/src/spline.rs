//! Thin-plate-spline interpolation and warping
//!
//! Scattered ignition-time observations are densified with a thin-plate
//! radial-basis interpolant (kernel `U(r) = r² ln r`), and a prior forecast
//! raster is corrected by a control-point warp built from two such splines
//! (one per coordinate). Both operate in cell-index space: observation cells
//! are the sample sites and every grid cell is an evaluation site.
//!
//! The full fit augments the kernel system with an affine part, which needs
//! at least three non-collinear sites; when the augmented system is singular
//! (or fewer than three sites exist) the fit falls back to the kernel-only
//! system before giving up.

use crate::core_types::{Cell, CellState};
use crate::error::AssessError;
use crate::grid::{FireMap, RasterLayer};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Thin-plate kernel `U(r) = r² ln r`, evaluated from the squared radius.
///
/// `U(0) = 0` by continuity.
#[inline]
fn kernel(r2: f64) -> f64 {
    if r2 > 0.0 {
        0.5 * r2 * r2.ln()
    } else {
        0.0
    }
}

/// A fitted thin-plate-spline interpolant over scattered 2D samples.
#[derive(Debug, Clone)]
pub struct ThinPlateSpline {
    sites: Vec<(f64, f64)>,
    weights: DVector<f64>,
    /// Affine part `a0 + a1·x + a2·y`; all zero for a kernel-only fit
    affine: [f64; 3],
}

impl ThinPlateSpline {
    /// Fit an interpolant through `values` at `sites`.
    ///
    /// Exact at every site. Returns [`AssessError::Degenerate`] when both
    /// the augmented and the kernel-only systems are singular, and
    /// [`AssessError::InsufficientData`] for an empty site set.
    pub fn fit(sites: &[(f64, f64)], values: &[f64]) -> Result<Self, AssessError> {
        assert_eq!(sites.len(), values.len(), "one value per site");
        let n = sites.len();
        if n == 0 {
            return Err(AssessError::InsufficientData { needed: 1, got: 0 });
        }

        if n >= 3 {
            if let Some(spline) = Self::fit_augmented(sites, values) {
                return Ok(spline);
            }
        }
        Self::fit_kernel_only(sites, values)
            .ok_or_else(|| AssessError::Degenerate("thin-plate system".into()))
    }

    /// Kernel + affine system: `[[K, P], [Pᵀ, 0]] [w; a] = [v; 0]`.
    fn fit_augmented(sites: &[(f64, f64)], values: &[f64]) -> Option<Self> {
        let n = sites.len();
        let m = n + 3;
        let mut l = DMatrix::<f64>::zeros(m, m);
        for i in 0..n {
            for j in 0..n {
                l[(i, j)] = kernel(dist2(sites[i], sites[j]));
            }
            l[(i, n)] = 1.0;
            l[(i, n + 1)] = sites[i].0;
            l[(i, n + 2)] = sites[i].1;
            l[(n, i)] = 1.0;
            l[(n + 1, i)] = sites[i].0;
            l[(n + 2, i)] = sites[i].1;
        }
        let mut rhs = DVector::<f64>::zeros(m);
        for (i, v) in values.iter().enumerate() {
            rhs[i] = *v;
        }

        let solution = l.lu().solve(&rhs)?;
        if solution.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(Self {
            sites: sites.to_vec(),
            weights: DVector::from_iterator(n, solution.iter().take(n).copied()),
            affine: [solution[n], solution[n + 1], solution[n + 2]],
        })
    }

    /// Kernel-only system `K w = v`, the fallback for degenerate site sets.
    fn fit_kernel_only(sites: &[(f64, f64)], values: &[f64]) -> Option<Self> {
        let n = sites.len();
        let mut k = DMatrix::<f64>::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                k[(i, j)] = kernel(dist2(sites[i], sites[j]));
            }
        }
        let rhs = DVector::from_column_slice(values);

        let weights = k.lu().solve(&rhs)?;
        if weights.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(Self {
            sites: sites.to_vec(),
            weights,
            affine: [0.0; 3],
        })
    }

    /// Evaluate the interpolant at an arbitrary point.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let mut acc = self.affine[0] + self.affine[1] * x + self.affine[2] * y;
        for (site, w) in self.sites.iter().zip(self.weights.iter()) {
            acc += w * kernel(dist2(*site, (x, y)));
        }
        acc
    }
}

#[inline]
fn dist2(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

/// Densify scattered per-cell samples over a whole grid.
///
/// Sample sites and evaluation sites are both cell indices of `shape`.
/// Evaluation runs cell-parallel.
pub fn interpolate<U>(
    sites: &[(f64, f64)],
    values: &[f64],
    shape: &RasterLayer<U>,
) -> Result<RasterLayer<f64>, AssessError> {
    let spline = ThinPlateSpline::fit(sites, values)?;
    let width = shape.width();

    let dense: Vec<f64> = (0..shape.len())
        .into_par_iter()
        .map(|i| spline.evaluate((i % width) as f64, (i / width) as f64))
        .collect();

    let mut out = RasterLayer::filled_like(shape, 0.0);
    out.values_mut().copy_from_slice(&dense);
    Ok(out)
}

/// Warp a fire map through control-point correspondences.
///
/// `control_from` are cells of `prior`, `control_to` their corrected
/// positions. The result carries `prior[control_from[i]]` at
/// `control_to[i]` exactly (up to nearest-cell sampling) and deforms
/// smoothly elsewhere, preserving the prior's front geometry in
/// unconstrained regions.
///
/// Implemented as a backward mapping: two splines fitted at `control_to`
/// recover the source coordinate for every output cell, which is then
/// sampled nearest-neighbor so cell tags survive the warp. Source positions
/// falling outside the prior stay unburnt.
pub fn warp_fire_map(
    prior: &FireMap,
    control_from: &[Cell],
    control_to: &[Cell],
) -> Result<FireMap, AssessError> {
    assert_eq!(
        control_from.len(),
        control_to.len(),
        "control points must pair up"
    );
    if control_to.len() < 3 {
        return Err(AssessError::InsufficientData {
            needed: 3,
            got: control_to.len(),
        });
    }

    let to_sites: Vec<(f64, f64)> = control_to
        .iter()
        .map(|c| (c.x as f64, c.y as f64))
        .collect();
    let from_x: Vec<f64> = control_from.iter().map(|c| c.x as f64).collect();
    let from_y: Vec<f64> = control_from.iter().map(|c| c.y as f64).collect();

    let spline_x = ThinPlateSpline::fit(&to_sites, &from_x)?;
    let spline_y = ThinPlateSpline::fit(&to_sites, &from_y)?;

    let width = prior.width();
    let warped: Vec<CellState> = (0..prior.len())
        .into_par_iter()
        .map(|i| {
            let x = (i % width) as f64;
            let y = (i / width) as f64;
            let sx = spline_x.evaluate(x, y).round();
            let sy = spline_y.evaluate(x, y).round();
            if sx >= 0.0 && sy >= 0.0 {
                let source = Cell::new(sx as usize, sy as usize);
                prior.get(source).copied().unwrap_or(CellState::Unburnt)
            } else {
                CellState::Unburnt
            }
        })
        .collect();

    let mut out = FireMap::empty_like(prior);
    out.values_mut().copy_from_slice(&warped);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_at_sites() {
        let sites = [(2.0, 2.0), (7.0, 3.0), (4.0, 8.0), (9.0, 9.0)];
        let values = [10.0, 25.0, 40.0, 55.0];
        let spline = ThinPlateSpline::fit(&sites, &values).unwrap();
        for (s, v) in sites.iter().zip(values.iter()) {
            assert_relative_eq!(spline.evaluate(s.0, s.1), *v, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_two_sites_fall_back_to_kernel_only() {
        let sites = [(2.0, 2.0), (5.0, 5.0)];
        let values = [10.0, 40.0];
        let spline = ThinPlateSpline::fit(&sites, &values).unwrap();
        assert_relative_eq!(spline.evaluate(2.0, 2.0), 10.0, epsilon = 1e-8);
        assert_relative_eq!(spline.evaluate(5.0, 5.0), 40.0, epsilon = 1e-8);
    }

    #[test]
    fn test_affine_data_reproduced_exactly() {
        // Values lying on a plane: the affine part carries everything and
        // extrapolation stays linear.
        let sites = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)];
        let values: Vec<f64> = sites.iter().map(|(x, y)| 1.0 + 2.0 * x + 3.0 * y).collect();
        let spline = ThinPlateSpline::fit(&sites, &values).unwrap();
        assert_relative_eq!(spline.evaluate(20.0, 20.0), 101.0, epsilon = 1e-6);
    }

    #[test]
    fn test_duplicate_sites_are_degenerate() {
        let sites = [(1.0, 1.0), (1.0, 1.0)];
        let values = [3.0, 4.0];
        assert!(matches!(
            ThinPlateSpline::fit(&sites, &values),
            Err(AssessError::Degenerate(_))
        ));
    }

    #[test]
    fn test_empty_sites_rejected() {
        assert_eq!(
            ThinPlateSpline::fit(&[], &[]).unwrap_err(),
            AssessError::InsufficientData { needed: 1, got: 0 }
        );
    }

    #[test]
    fn test_interpolate_shape_and_sites() {
        let shape = RasterLayer::filled(12, 12, 1.0, 0.0, 0.0, 0.0_f64);
        let sites = [(2.0, 2.0), (9.0, 4.0), (5.0, 10.0)];
        let values = [0.0, 50.0, 100.0];
        let dense = interpolate(&sites, &values, &shape).unwrap();
        assert_eq!(dense.len(), 144);
        for (s, v) in sites.iter().zip(values.iter()) {
            let c = Cell::new(s.0 as usize, s.1 as usize);
            assert_relative_eq!(dense[c], *v, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_identity_warp_preserves_map() {
        let mut prior = FireMap::empty_firemap(10, 10, 1.0, 0.0, 0.0);
        for y in 0..10 {
            for x in 0..10 {
                prior.set(Cell::new(x, y), CellState::Ignited((x + y) as f64));
            }
        }
        let controls = vec![
            Cell::new(1, 1),
            Cell::new(8, 1),
            Cell::new(1, 8),
            Cell::new(8, 8),
        ];
        let warped = warp_fire_map(&prior, &controls, &controls).unwrap();
        assert_eq!(warped, prior);
    }

    #[test]
    fn test_warp_requires_three_pairs() {
        let prior = FireMap::empty_firemap(4, 4, 1.0, 0.0, 0.0);
        let pairs = vec![Cell::new(0, 0), Cell::new(1, 1)];
        assert_eq!(
            warp_fire_map(&prior, &pairs, &pairs),
            Err(AssessError::InsufficientData { needed: 3, got: 2 })
        );
    }
}

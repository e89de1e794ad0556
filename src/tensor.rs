use nalgebra::{Matrix3, SymmetricEigen, Vector3};

use crate::error::{DepthPlotError, Result};

// ---------------------------------------------------------------------------
// Tensor string parsing
// ---------------------------------------------------------------------------

/// Decode an `aniso_s` cell: exactly six colon-separated numeric components
/// of a symmetric 3×3 anisotropy tensor, in the order
/// `s11:s22:s33:s12:s23:s13`.
pub fn parse_aniso_s(specimen: &str, value: &str) -> Result<[f64; 6]> {
    let malformed = |reason: String| DepthPlotError::MalformedTensor {
        specimen: specimen.to_string(),
        value: value.to_string(),
        reason,
    };

    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 6 {
        return Err(malformed(format!(
            "expected 6 components, found {}",
            parts.len()
        )));
    }

    let mut s = [0.0; 6];
    for (i, part) in parts.iter().enumerate() {
        s[i] = part
            .trim()
            .parse::<f64>()
            .map_err(|_| malformed(format!("component {} is not a number", i + 1)))?;
    }
    Ok(s)
}

// ---------------------------------------------------------------------------
// Hext statistics
// ---------------------------------------------------------------------------

/// Per-specimen Hext eigenanalysis results: eigenvalues in descending order
/// and the principal directions as declination/inclination pairs (degrees,
/// lower hemisphere).
#[derive(Debug, Clone, Copy)]
pub struct HextStats {
    pub t1: f64,
    pub t2: f64,
    pub t3: f64,
    pub v1_dec: f64,
    pub v1_inc: f64,
    pub v2_dec: f64,
    pub v2_inc: f64,
    pub v3_dec: f64,
    pub v3_inc: f64,
    pub f: f64,
    pub f12: f64,
    pub f23: f64,
}

impl HextStats {
    /// Anisotropy degree, ratio of maximum to minimum eigenvalue.
    /// Unguarded: `t3 = 0` yields infinity.
    pub fn p(&self) -> f64 {
        self.t1 / self.t3
    }
}

/// Build the symmetric matrix from the six independent components.
fn s_to_matrix(s: &[f64; 6]) -> Matrix3<f64> {
    Matrix3::new(
        s[0], s[3], s[5], //
        s[3], s[1], s[4], //
        s[5], s[4], s[2],
    )
}

/// Convert a cartesian eigenvector to declination/inclination in degrees,
/// flipped into the lower hemisphere.
fn to_dec_inc(v: Vector3<f64>) -> (f64, f64) {
    let norm = v.norm();
    if norm == 0.0 {
        return (0.0, 0.0);
    }
    let mut dec = v.y.atan2(v.x).to_degrees().rem_euclid(360.0);
    let mut inc = (v.z / norm).asin().to_degrees();
    if inc < 0.0 {
        inc = -inc;
        dec = (dec + 180.0).rem_euclid(360.0);
    }
    (dec, inc)
}

/// Hext (1963) eigenanalysis of a six-component anisotropy tensor.
///
/// `nf` is the number of degrees of freedom (`n_measurements - 6`) and
/// `sigma` the residual error estimate. Eigenvalues and directions are
/// always computed; the F statistics need a positive `nf` and a non-zero
/// `sigma` and are zeroed otherwise.
pub fn dohext(nf: i64, sigma: f64, s: &[f64; 6]) -> HextStats {
    let eigen = SymmetricEigen::new(s_to_matrix(s));

    // Sort eigenpairs descending by eigenvalue.
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let tau: Vec<f64> = order.iter().map(|&i| eigen.eigenvalues[i]).collect();
    let dirs: Vec<(f64, f64)> = order
        .iter()
        .map(|&i| to_dec_inc(eigen.eigenvectors.column(i).into_owned()))
        .collect();

    let (f, f12, f23) = if nf > 0 && sigma != 0.0 {
        let t2sum: f64 = tau.iter().map(|t| t * t).sum();
        let chibar = (s[0] + s[1] + s[2]) / 3.0;
        (
            0.4 * (t2sum * 3.0 - 9.0 * chibar * chibar) / (sigma * sigma),
            0.5 * ((tau[0] - tau[1]) / sigma).powi(2),
            0.5 * ((tau[1] - tau[2]) / sigma).powi(2),
        )
    } else {
        (0.0, 0.0, 0.0)
    };

    HextStats {
        t1: tau[0],
        t2: tau[1],
        t3: tau[2],
        v1_dec: dirs[0].0,
        v1_inc: dirs[0].1,
        v2_dec: dirs[1].0,
        v2_inc: dirs[1].1,
        v3_dec: dirs[2].0,
        v3_inc: dirs[2].1,
        f,
        f12,
        f23,
    }
}

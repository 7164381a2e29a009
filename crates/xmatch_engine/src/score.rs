//! Ellipsoid match scoring.

use crate::ellipsoid::ErrorEllipsoid;
use crate::value::Value;

/// Scores a pair of tuples against the error ellipsoid.
///
/// Returns `None` when the points do not match. Otherwise, the separation:
/// either the Euclidean distance, or (when `normalize` is set) the same
/// distance scaled so that 0 is coincident and 1 lies on the ellipsoid
/// boundary.
///
/// Tuples shorter than the ellipsoid's dimensionality, or carrying a
/// non-numeric coordinate, never match.
pub fn ellipsoid_score(
    ellipsoid: &ErrorEllipsoid,
    tuple1: &[Value],
    tuple2: &[Value],
    normalize: bool,
) -> Option<f64> {
    let ndim = ellipsoid.dimensions();
    if tuple1.len() < ndim || tuple2.len() < ndim {
        return None;
    }

    // Cheap per-axis rejection first; this turns away nearly every candidate.
    for i in 0..ndim {
        let d = delta(&tuple1[i], &tuple2[i])?;
        if d.abs() > ellipsoid.error(i) {
            return None;
        }
    }

    let mut space_dist2 = 0.0;
    let mut norm_dist2 = 0.0;
    for i in 0..ndim {
        let d = delta(&tuple1[i], &tuple2[i])?;
        let d2 = d * d;
        space_dist2 += d2;
        norm_dist2 += d2 * ellipsoid.inverse_square(i);
    }

    if norm_dist2 <= 1.0 {
        Some(if normalize {
            norm_dist2.sqrt()
        } else {
            space_dist2.sqrt()
        })
    } else {
        None
    }
}

/// Scores two plain coordinate arrays. Same rules as [`ellipsoid_score`].
pub fn coord_score(
    ellipsoid: &ErrorEllipsoid,
    coords1: &[f64],
    coords2: &[f64],
    normalize: bool,
) -> Option<f64> {
    let ndim = ellipsoid.dimensions();
    if coords1.len() < ndim || coords2.len() < ndim {
        return None;
    }
    if (0..ndim).any(|i| (coords1[i] - coords2[i]).abs() > ellipsoid.error(i)) {
        return None;
    }
    let (space_dist2, norm_dist2) = (0..ndim).fold((0.0, 0.0), |(space, norm), i| {
        let d = coords1[i] - coords2[i];
        let d2 = d * d;
        (space + d2, norm + d2 * ellipsoid.inverse_square(i))
    });
    (norm_dist2 <= 1.0).then(|| {
        if normalize {
            norm_dist2.sqrt()
        } else {
            space_dist2.sqrt()
        }
    })
}

#[inline]
fn delta(a: &Value, b: &Value) -> Option<f64> {
    Some(a.as_f64()? - b.as_f64()?)
}

//! Closed Catmull-Rom track curve.
//!
//! Model:
//! - N control points, closed: segment i blends points (i-1, i, i+1, i+2) mod N.
//! - Raw parameter t in [0,1) covers all N segments uniformly (segment = floor(N*t)).
//! - Arc-length parameter u in [0,1) is mapped to t through a cumulative chord-length
//!   table so equal steps in u cover equal distances along the track.
//!
//! Segment polynomials and the arc-length table are built once in `new`; queries are
//! pure and allocation-free.

use serde::{Deserialize, Serialize};

use crate::error::RideError;
use crate::math::{self, Vec3};

/// Minimum number of control points for a meaningful closed spline.
pub const MIN_CONTROL_POINTS: usize = 4;

/// Chord samples used to build the arc-length table.
pub const ARC_LENGTH_DIVISIONS: usize = 200;

const CATMULL_ROM_TENSION: f32 = 0.5;

/// Knot spacing below this is treated as coincident points.
const KNOT_EPSILON: f32 = 1e-4;

/// Knot parameterization for the Catmull-Rom segments.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// Uniform knots, tension 0.5.
    #[default]
    Uniform,
    /// Knot spacing = distance^0.5; avoids cusps and self-intersections on uneven spacing.
    Centripetal,
    /// Knot spacing = distance.
    Chordal,
}

/// Cubic in Hermite form: p(w) = c0 + c1 w + c2 w^2 + c3 w^3, w in [0,1].
#[derive(Copy, Clone, Debug)]
struct CubicPoly {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl CubicPoly {
    fn hermite(x0: Vec3, x1: Vec3, t0: Vec3, t1: Vec3) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: std::array::from_fn(|i| -3.0 * x0[i] + 3.0 * x1[i] - 2.0 * t0[i] - t1[i]),
            c3: std::array::from_fn(|i| 2.0 * x0[i] - 2.0 * x1[i] + t0[i] + t1[i]),
        }
    }

    fn uniform(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self::hermite(
            p1,
            p2,
            math::scale(math::sub(p2, p0), CATMULL_ROM_TENSION),
            math::scale(math::sub(p3, p1), CATMULL_ROM_TENSION),
        )
    }

    /// Non-uniform Catmull-Rom; `power` is alpha / 2 applied to squared distances.
    fn nonuniform(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, power: f32) -> Self {
        let mut dt0 = math::length_squared(math::sub(p0, p1)).powf(power);
        let mut dt1 = math::length_squared(math::sub(p1, p2)).powf(power);
        let mut dt2 = math::length_squared(math::sub(p2, p3)).powf(power);

        if dt1 < KNOT_EPSILON {
            dt1 = 1.0;
        }
        if dt0 < KNOT_EPSILON {
            dt0 = dt1;
        }
        if dt2 < KNOT_EPSILON {
            dt2 = dt1;
        }

        let t1: Vec3 = std::array::from_fn(|i| {
            ((p1[i] - p0[i]) / dt0 - (p2[i] - p0[i]) / (dt0 + dt1) + (p2[i] - p1[i]) / dt1) * dt1
        });
        let t2: Vec3 = std::array::from_fn(|i| {
            ((p2[i] - p1[i]) / dt1 - (p3[i] - p1[i]) / (dt1 + dt2) + (p3[i] - p2[i]) / dt2) * dt1
        });
        Self::hermite(p1, p2, t1, t2)
    }

    #[inline]
    fn eval(&self, w: f32) -> Vec3 {
        let w2 = w * w;
        let w3 = w2 * w;
        std::array::from_fn(|i| self.c0[i] + self.c1[i] * w + self.c2[i] * w2 + self.c3[i] * w3)
    }

    #[inline]
    fn derivative(&self, w: f32) -> Vec3 {
        let w2 = w * w;
        std::array::from_fn(|i| self.c1[i] + 2.0 * self.c2[i] * w + 3.0 * self.c3[i] * w2)
    }
}

/// Closed, arc-length parameterizable 3D track.
#[derive(Clone, Debug)]
pub struct ClosedCurve {
    points: Vec<Vec3>,
    curve_type: CurveType,
    segments: Vec<CubicPoly>,
    /// Cumulative chord length at t = i / ARC_LENGTH_DIVISIONS.
    arc_lengths: Vec<f32>,
}

/// Reject u outside [0,1) (and NaN).
#[inline]
pub fn check_domain(u: f32) -> Result<(), RideError> {
    if u.is_finite() && (0.0..1.0).contains(&u) {
        Ok(())
    } else {
        Err(RideError::InvalidDomain { u })
    }
}

impl ClosedCurve {
    /// Build the curve from ordered control points.
    pub fn new(points: Vec<Vec3>, curve_type: CurveType) -> Result<Self, RideError> {
        if points.len() < MIN_CONTROL_POINTS {
            return Err(RideError::config(format!(
                "closed track needs at least {MIN_CONTROL_POINTS} control points, got {}",
                points.len()
            )));
        }
        if let Some(idx) = points.iter().position(|p| !math::is_finite(*p)) {
            return Err(RideError::config(format!(
                "control point {idx} has a non-finite coordinate"
            )));
        }

        let n = points.len();
        let segments = (0..n)
            .map(|i| {
                let p0 = points[(i + n - 1) % n];
                let p1 = points[i];
                let p2 = points[(i + 1) % n];
                let p3 = points[(i + 2) % n];
                match curve_type {
                    CurveType::Uniform => CubicPoly::uniform(p0, p1, p2, p3),
                    CurveType::Centripetal => CubicPoly::nonuniform(p0, p1, p2, p3, 0.25),
                    CurveType::Chordal => CubicPoly::nonuniform(p0, p1, p2, p3, 0.5),
                }
            })
            .collect();

        let mut curve = Self {
            points,
            curve_type,
            segments,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.build_arc_lengths(ARC_LENGTH_DIVISIONS);
        Ok(curve)
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn curve_type(&self) -> CurveType {
        self.curve_type
    }

    /// Total arc length (chord approximation).
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at raw spline parameter t in [0,1).
    pub fn point(&self, t: f32) -> Result<Vec3, RideError> {
        check_domain(t)?;
        Ok(self.eval_raw(t))
    }

    /// Unit tangent at raw spline parameter t in [0,1).
    pub fn tangent(&self, t: f32) -> Result<Vec3, RideError> {
        check_domain(t)?;
        Ok(math::normalize(self.derivative_raw(t)))
    }

    /// Point at arc-length parameter u in [0,1).
    pub fn point_at(&self, u: f32) -> Result<Vec3, RideError> {
        check_domain(u)?;
        Ok(self.eval_raw(self.u_to_t(u)))
    }

    /// Unit tangent at arc-length parameter u in [0,1).
    /// Zero where the track has a stationary point (coincident control points).
    pub fn tangent_at(&self, u: f32) -> Result<Vec3, RideError> {
        check_domain(u)?;
        Ok(math::normalize(self.derivative_raw(self.u_to_t(u))))
    }

    /// Map arc-length fraction u to the raw parameter t.
    pub fn u_to_t(&self, u: f32) -> f32 {
        let total = self.length();
        if total <= 0.0 {
            return u;
        }
        let divisions = self.arc_lengths.len() - 1;
        let target = u * total;

        // First entry strictly greater than target; arc_lengths[0] == 0 so i >= 0.
        let upper = self.arc_lengths.partition_point(|&l| l <= target);
        let i = upper.saturating_sub(1).min(divisions - 1);

        let before = self.arc_lengths[i];
        let segment_len = self.arc_lengths[i + 1] - before;
        let fraction = if segment_len > 0.0 {
            ((target - before) / segment_len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        ((i as f32 + fraction) / divisions as f32).min(1.0)
    }

    /// Segment index and local weight for raw t; any t wraps onto the closed loop.
    #[inline]
    fn locate(&self, t: f32) -> (usize, f32) {
        let n = self.segments.len();
        let p = n as f32 * t;
        let whole = p.floor();
        let weight = p - whole;
        let idx = (whole as i64).rem_euclid(n as i64) as usize;
        (idx, weight)
    }

    fn eval_raw(&self, t: f32) -> Vec3 {
        let (idx, w) = self.locate(t);
        self.segments[idx].eval(w)
    }

    fn derivative_raw(&self, t: f32) -> Vec3 {
        let (idx, w) = self.locate(t);
        // dp/dt = dp/dw * N
        math::scale(self.segments[idx].derivative(w), self.segments.len() as f32)
    }

    fn build_arc_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut last = self.eval_raw(0.0);
        let mut sum = 0.0f32;
        lengths.push(0.0);
        for i in 1..=divisions {
            let current = self.eval_raw(i as f32 / divisions as f32);
            sum += math::distance(current, last);
            lengths.push(sum);
            last = current;
        }
        lengths
    }
}

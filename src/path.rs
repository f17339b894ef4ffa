//! Closed Catmull-Rom flight path.
//!
//! The tunnel is swept along a closed centripetal Catmull-Rom spline. The
//! curve exposes two parameterizations: the raw curve parameter `t` (fast,
//! unevenly spaced) and the arc-length fraction `u` (uniform speed along the
//! curve). Everything that flies or sweeps uses the arc-length variants so
//! rings are evenly spaced and the camera moves at constant speed.
//!
//! # Example
//!
//! ```ignore
//! use rand::{rngs::StdRng, SeedableRng};
//! use tunnelfx::path::{TunnelPath, DEFAULT_WAYPOINTS};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let path = TunnelPath::from_waypoints(&DEFAULT_WAYPOINTS, &mut rng);
//! let eye = path.point_at(0.25);
//! let frames = path.frenet_frames(1600, true);
//! ```

use glam::{Quat, Vec3};
use rand::Rng;

/// The ground-plan waypoints of the default tunnel circuit, as (x, z) pairs.
///
/// Heights are not part of the layout; [`TunnelPath::from_waypoints`] assigns
/// each control point a random y so every run threads a different 3D course
/// over the same floor plan.
pub const DEFAULT_WAYPOINTS: [[f32; 2]; 8] = [
    [68.5, 185.5],
    [1.0, 262.5],
    [270.9, 281.9],
    [345.5, 212.8],
    [178.0, 155.7],
    [240.3, 72.3],
    [153.4, 0.6],
    [52.6, 53.3],
];

/// Maximum height assigned to a control point by [`TunnelPath::from_waypoints`].
pub const WAYPOINT_MAX_HEIGHT: f32 = 100.0;

/// Subdivisions used for the cumulative arc-length table.
const ARC_LENGTH_DIVISIONS: usize = 200;

/// Step used for the central-difference tangent.
const TANGENT_DELTA: f32 = 0.0001;

/// A closed centripetal Catmull-Rom curve through a set of control points.
pub struct TunnelPath {
    points: Vec<Vec3>,
    /// Cumulative chord lengths at `ARC_LENGTH_DIVISIONS + 1` stations.
    lengths: Vec<f32>,
}

/// Tangent/normal/binormal triads at evenly spaced stations along a path.
///
/// Produced by [`TunnelPath::frenet_frames`]. All three vectors are unit
/// length and mutually orthogonal at every station; for a closed path the
/// first and last frames agree so a swept surface has no seam.
pub struct FrenetFrames {
    pub tangents: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub binormals: Vec<Vec3>,
}

impl TunnelPath {
    /// Build a closed path through `points`.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two control points are given.
    pub fn new(points: Vec<Vec3>) -> Self {
        assert!(
            points.len() >= 2,
            "a tunnel path needs at least two control points"
        );
        let mut path = Self {
            points,
            lengths: Vec::new(),
        };
        path.lengths = path.compute_lengths(ARC_LENGTH_DIVISIONS);
        path
    }

    /// Build a closed path from 2D (x, z) waypoints, lifting each control
    /// point to a random height in `[0, WAYPOINT_MAX_HEIGHT)`.
    ///
    /// The first waypoint is repeated at the end of the control polygon (with
    /// its own height), so the course returns to where it started.
    pub fn from_waypoints<R: Rng>(waypoints: &[[f32; 2]], rng: &mut R) -> Self {
        let points = waypoints
            .iter()
            .chain(waypoints.first())
            .map(|&[x, z]| Vec3::new(x, rng.gen_range(0.0..WAYPOINT_MAX_HEIGHT), z))
            .collect();
        Self::new(points)
    }

    /// The control points of the curve.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Total arc length of one full loop.
    pub fn length(&self) -> f32 {
        self.lengths[self.lengths.len() - 1]
    }

    /// Evaluate the curve at raw parameter `t` in `[0, 1]`.
    ///
    /// Segments between control points cover unequal amounts of `t` depending
    /// on control-point spacing; use [`TunnelPath::point_at`] for uniform
    /// motion.
    pub fn point(&self, t: f32) -> Vec3 {
        let l = self.points.len() as isize;
        let p = self.points.len() as f32 * t;
        let int_point = p.floor() as isize;
        let weight = p - p.floor();

        let pt = |k: isize| self.points[k.rem_euclid(l) as usize];
        let p0 = pt(int_point - 1);
        let p1 = pt(int_point);
        let p2 = pt(int_point + 1);
        let p3 = pt(int_point + 2);

        // Centripetal knot spacing. Degenerate intervals (coincident control
        // points) fall back to the center interval.
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        catmull_rom(p0, p1, p2, p3, dt0, dt1, dt2, weight)
    }

    /// Unit tangent at raw parameter `t`, by central differencing.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let t1 = (t - TANGENT_DELTA).max(0.0);
        let t2 = (t + TANGENT_DELTA).min(1.0);
        (self.point(t2) - self.point(t1)).normalize()
    }

    /// Evaluate the curve at arc-length fraction `u`.
    ///
    /// `u` outside `[0, 1]` wraps around the loop, so a monotonically growing
    /// flight percentage can be passed straight in.
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(wrap_fraction(u)))
    }

    /// Unit tangent at arc-length fraction `u` (wrapped like [`point_at`]).
    ///
    /// [`point_at`]: TunnelPath::point_at
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        self.tangent(self.u_to_t(wrap_fraction(u)))
    }

    /// Map an arc-length fraction to the raw curve parameter.
    ///
    /// Binary search on the cumulative length table, then linear interpolation
    /// within the found subdivision.
    fn u_to_t(&self, u: f32) -> f32 {
        let target = u * self.length();
        let il = self.lengths.len();

        // Index of the last table entry at or below the target length.
        let i = self
            .lengths
            .partition_point(|&len| len <= target)
            .saturating_sub(1);
        if i + 1 >= il {
            return 1.0;
        }

        let before = self.lengths[i];
        let after = self.lengths[i + 1];
        let fraction = if after > before {
            (target - before) / (after - before)
        } else {
            0.0
        };
        (i as f32 + fraction) / (il - 1) as f32
    }

    /// Compute `segments + 1` moving frames at arc-length-uniform stations.
    ///
    /// The first normal is seeded perpendicular to the first tangent (picking
    /// the world axis the tangent points along least), then each frame is the
    /// previous one rotated by the angle between consecutive tangents. When
    /// `closed` is set, the residual twist between the first and last frame is
    /// distributed back over the whole loop so the frame field meets itself.
    pub fn frenet_frames(&self, segments: usize, closed: bool) -> FrenetFrames {
        let mut tangents = Vec::with_capacity(segments + 1);
        for i in 0..=segments {
            tangents.push(self.tangent_at(i as f32 / segments as f32));
        }

        let mut normals = vec![Vec3::ZERO; segments + 1];
        let mut binormals = vec![Vec3::ZERO; segments + 1];

        // Seed the first normal from the smallest tangent component.
        let t0 = tangents[0];
        let mut min = f32::MAX;
        let mut axis = Vec3::ZERO;
        if t0.x.abs() <= min {
            min = t0.x.abs();
            axis = Vec3::X;
        }
        if t0.y.abs() <= min {
            min = t0.y.abs();
            axis = Vec3::Y;
        }
        if t0.z.abs() <= min {
            axis = Vec3::Z;
        }
        let vec = t0.cross(axis).normalize();
        normals[0] = t0.cross(vec);
        binormals[0] = t0.cross(normals[0]);

        // Propagate the frame by rotating with the bend between tangents.
        for i in 1..=segments {
            normals[i] = normals[i - 1];
            let bend = tangents[i - 1].cross(tangents[i]);
            if bend.length() > f32::EPSILON {
                let bend = bend.normalize();
                let theta = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
                normals[i] = Quat::from_axis_angle(bend, theta) * normals[i - 1];
            }
            binormals[i] = tangents[i].cross(normals[i]);
        }

        // Unwind the residual twist so the loop closes on itself.
        if closed {
            let mut theta =
                normals[0].dot(normals[segments]).clamp(-1.0, 1.0).acos() / segments as f32;
            if tangents[0].dot(normals[0].cross(normals[segments])) > 0.0 {
                theta = -theta;
            }
            for i in 1..=segments {
                normals[i] = Quat::from_axis_angle(tangents[i], theta * i as f32) * normals[i];
                binormals[i] = tangents[i].cross(normals[i]);
            }
        }

        FrenetFrames {
            tangents,
            normals,
            binormals,
        }
    }

    fn compute_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        lengths.push(0.0);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        for p in 1..=divisions {
            let current = self.point(p as f32 / divisions as f32);
            sum += current.distance(last);
            lengths.push(sum);
            last = current;
        }
        lengths
    }
}

/// Wrap an arc-length fraction into the loop, leaving `[0, 1]` untouched.
fn wrap_fraction(u: f32) -> f32 {
    if (0.0..=1.0).contains(&u) {
        u
    } else {
        u.rem_euclid(1.0)
    }
}

/// One segment of a non-uniform Catmull-Rom spline in Hermite form.
fn catmull_rom(
    p0: Vec3,
    p1: Vec3,
    p2: Vec3,
    p3: Vec3,
    dt0: f32,
    dt1: f32,
    dt2: f32,
    t: f32,
) -> Vec3 {
    // Knot-spacing-compensated tangents at the segment endpoints.
    let mut t1 = (p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1;
    let mut t2 = (p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2;
    t1 *= dt1;
    t2 *= dt1;

    let c0 = p1;
    let c1 = t1;
    let c2 = -3.0 * p1 + 3.0 * p2 - 2.0 * t1 - t2;
    let c3 = 2.0 * p1 - 2.0 * p2 + t1 + t2;
    ((c3 * t + c2) * t + c1) * t + c0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn default_path() -> TunnelPath {
        let mut rng = StdRng::seed_from_u64(42);
        TunnelPath::from_waypoints(&DEFAULT_WAYPOINTS, &mut rng)
    }

    /// Eight points on a circle of radius 100 in the xz plane.
    fn circle_path() -> TunnelPath {
        let points = (0..8)
            .map(|i| {
                let a = i as f32 / 8.0 * std::f32::consts::TAU;
                Vec3::new(a.cos() * 100.0, 0.0, a.sin() * 100.0)
            })
            .collect();
        TunnelPath::new(points)
    }

    #[test]
    fn from_waypoints_repeats_first_point() {
        let path = default_path();
        assert_eq!(path.points().len(), DEFAULT_WAYPOINTS.len() + 1);
        let first = path.points()[0];
        let last = path.points()[path.points().len() - 1];
        assert_eq!(first.x, last.x);
        assert_eq!(first.z, last.z);
        for p in path.points() {
            assert!(p.y >= 0.0 && p.y < WAYPOINT_MAX_HEIGHT);
        }
    }

    #[test]
    fn closed_curve_wraps() {
        let path = default_path();
        let start = path.point(0.0);
        let end = path.point(1.0);
        assert!(start.distance(end) < 1e-3, "{start} vs {end}");
        assert!(path.point_at(0.0).distance(path.point_at(1.0)) < 1e-3);
    }

    #[test]
    fn point_at_wraps_out_of_range_fractions() {
        let path = default_path();
        let a = path.point_at(0.25);
        let b = path.point_at(1.25);
        let c = path.point_at(-0.75);
        assert!(a.distance(b) < 1e-3);
        assert!(a.distance(c) < 1e-3);
    }

    #[test]
    fn arc_length_sampling_is_uniform() {
        let path = default_path();
        let n = 100;
        let mut min_step = f32::MAX;
        let mut max_step = f32::MIN;
        let mut prev = path.point_at(0.0);
        for i in 1..=n {
            let p = path.point_at(i as f32 / n as f32);
            let step = p.distance(prev);
            min_step = min_step.min(step);
            max_step = max_step.max(step);
            prev = p;
        }
        // The 200-entry length table is piecewise linear, so allow some slack.
        assert!(
            max_step / min_step < 1.25,
            "uneven arc-length steps: {min_step} .. {max_step}"
        );
    }

    #[test]
    fn curve_through_circle_stays_near_radius() {
        let path = circle_path();
        for i in 0..200 {
            let p = path.point_at(i as f32 / 200.0);
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!((r - 100.0).abs() < 5.0, "radius {r} at sample {i}");
            assert!(p.y.abs() < 1e-3);
        }
    }

    #[test]
    fn tangents_are_unit_length() {
        let path = default_path();
        for i in 0..50 {
            let t = path.tangent_at(i as f32 / 50.0);
            assert!((t.length() - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn frenet_frames_are_orthonormal() {
        let path = default_path();
        let frames = path.frenet_frames(256, true);
        assert_eq!(frames.tangents.len(), 257);
        assert_eq!(frames.normals.len(), 257);
        assert_eq!(frames.binormals.len(), 257);
        for i in 0..frames.tangents.len() {
            let t = frames.tangents[i];
            let n = frames.normals[i];
            let b = frames.binormals[i];
            assert!((t.length() - 1.0).abs() < 1e-2, "tangent {i}");
            assert!((n.length() - 1.0).abs() < 1e-2, "normal {i}");
            assert!((b.length() - 1.0).abs() < 1e-2, "binormal {i}");
            assert!(t.dot(n).abs() < 1e-2, "t.n at {i}");
            assert!(t.dot(b).abs() < 1e-2, "t.b at {i}");
            assert!(n.dot(b).abs() < 1e-2, "n.b at {i}");
        }
    }

    #[test]
    fn closed_frames_meet_at_the_seam() {
        let path = default_path();
        let segments = 256;
        let frames = path.frenet_frames(segments, true);
        let n0 = frames.normals[0];
        let n_end = frames.normals[segments];
        assert!(
            n0.dot(n_end) > 0.99,
            "seam normals diverge: dot = {}",
            n0.dot(n_end)
        );
    }

    #[test]
    fn length_is_positive_and_consistent() {
        let path = circle_path();
        // A Catmull-Rom loop through circle points approximates the
        // circumference of that circle.
        let circumference = std::f32::consts::TAU * 100.0;
        assert!((path.length() - circumference).abs() / circumference < 0.05);
    }
}

//! Particle tube swept along the flight path.
//!
//! The tube is not a mesh: it is a cloud of point sprites arranged in rings
//! around the path. Rings sit at arc-length-uniform stations, each ring is a
//! circle of particles in the plane spanned by that station's Frenet normal
//! and binormal, and the whole pattern twists slowly along the tube so the
//! walls shimmer instead of forming straight particle rails.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::path::TunnelPath;
use crate::visuals::Palette;

/// Extra rotation applied per unit of arc length, in radians.
///
/// Five half-turns over the full loop; enough that successive rings never
/// line up exactly.
const TWIST: f32 = 5.0 * PI;

/// One particle of the swept tube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeParticle {
    pub position: Vec3,
    pub color: Vec3,
}

/// Sweep `rings` rings of `particles_per_ring` particles along `path`.
///
/// Ring `i` sits at arc-length fraction `i / rings` and is colored by
/// sampling `palette` at that fraction. The returned list is ring-major:
/// all particles of ring 0, then ring 1, and so on.
pub fn sweep(
    path: &TunnelPath,
    rings: u32,
    particles_per_ring: u32,
    radius: f32,
    palette: &Palette,
) -> Vec<TubeParticle> {
    let frames = path.frenet_frames(rings as usize, true);
    let mut particles = Vec::with_capacity((rings * particles_per_ring) as usize);

    for i in 0..rings {
        let normal = frames.normals[i as usize];
        let binormal = frames.binormals[i as usize];

        let fraction = i as f32 / rings as f32;
        let center = path.point_at(fraction);
        let color = palette.sample(fraction);

        for j in 0..particles_per_ring {
            let angle = (j as f32 / particles_per_ring as f32) * TAU + fraction * TWIST;
            let sin = angle.sin();
            let cos = -angle.cos();

            let offset = normal * cos + binormal * sin;
            particles.push(TubeParticle {
                position: center + offset * radius,
                color,
            });
        }
    }

    particles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::DEFAULT_WAYPOINTS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const RINGS: u32 = 64;
    const PER_RING: u32 = 8;
    const RADIUS: f32 = 4.0;

    fn test_path() -> TunnelPath {
        let mut rng = StdRng::seed_from_u64(7);
        TunnelPath::from_waypoints(&DEFAULT_WAYPOINTS, &mut rng)
    }

    #[test]
    fn sweep_emits_rings_times_particles() {
        let path = test_path();
        let particles = sweep(&path, RINGS, PER_RING, RADIUS, &Palette::default());
        assert_eq!(particles.len(), (RINGS * PER_RING) as usize);
    }

    #[test]
    fn particles_sit_on_the_ring_circle() {
        let path = test_path();
        let particles = sweep(&path, RINGS, PER_RING, RADIUS, &Palette::default());
        for i in 0..RINGS {
            let center = path.point_at(i as f32 / RINGS as f32);
            for j in 0..PER_RING {
                let p = particles[(i * PER_RING + j) as usize];
                let d = p.position.distance(center);
                assert!(
                    (d - RADIUS).abs() < 1e-2,
                    "ring {i} particle {j} at distance {d}"
                );
            }
        }
    }

    #[test]
    fn rings_are_perpendicular_to_the_path() {
        let path = test_path();
        let particles = sweep(&path, RINGS, PER_RING, RADIUS, &Palette::default());
        for i in 0..RINGS {
            let fraction = i as f32 / RINGS as f32;
            let center = path.point_at(fraction);
            let tangent = path.tangent_at(fraction);
            for j in 0..PER_RING {
                let p = particles[(i * PER_RING + j) as usize];
                let radial = (p.position - center) / RADIUS;
                assert!(
                    radial.dot(tangent).abs() < 2e-2,
                    "ring {i} particle {j} leaves the ring plane"
                );
            }
        }
    }

    #[test]
    fn rings_twist_along_the_tube() {
        let path = test_path();
        let frames = path.frenet_frames(RINGS as usize, true);
        let particles = sweep(&path, RINGS, PER_RING, RADIUS, &Palette::default());

        // The first particle of ring i sits at angle `fraction * TWIST` in
        // that ring's (normal, binormal) basis, with the cosine negated.
        for i in [1u32, 13, 40] {
            let fraction = i as f32 / RINGS as f32;
            let center = path.point_at(fraction);
            let radial = (particles[(i * PER_RING) as usize].position - center) / RADIUS;
            let expected = fraction * TWIST;
            let n = frames.normals[i as usize];
            let b = frames.binormals[i as usize];
            assert!((radial.dot(n) - (-expected.cos())).abs() < 1e-2);
            assert!((radial.dot(b) - expected.sin()).abs() < 1e-2);
        }
    }

    #[test]
    fn ring_color_follows_the_palette() {
        let path = test_path();
        let palette = Palette::default();
        let particles = sweep(&path, RINGS, PER_RING, RADIUS, &palette);
        for i in [0u32, 17, 63] {
            let expected = palette.sample(i as f32 / RINGS as f32);
            for j in 0..PER_RING {
                assert_eq!(particles[(i * PER_RING + j) as usize].color, expected);
            }
        }
    }
}

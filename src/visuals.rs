//! Color and atmosphere configuration for the tunnel.
//!
//! Palettes map an arc-length fraction along the tube to a particle color.
//! The default [`Palette::HueWheel`] cycles the full hue circle several times
//! over the loop, which gives the classic rainbow-striped tunnel; the preset
//! gradients trade that for a calmer mood.

use glam::Vec3;

/// Linear fog blended over particle color by view depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    /// Depth at which fog starts to bite.
    pub near: f32,
    /// Depth at which particles are fully fogged out.
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: Vec3::ZERO,
            near: 30.0,
            far: 150.0,
        }
    }
}

/// How tube rings are colored along the loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Palette {
    /// Full-saturation hue circle, repeated `cycles` times along the tube.
    HueWheel { cycles: f32 },

    /// Vibrant pink/purple/cyan.
    Neon,

    /// Deep blues fading to cyan.
    Ocean,

    /// Black through red and orange to white-yellow.
    Fire,

    /// Black to white.
    Grayscale,
}

impl Default for Palette {
    fn default() -> Self {
        Palette::HueWheel { cycles: 4.0 }
    }
}

impl Palette {
    /// Sample the palette at arc-length fraction `t` in `[0, 1]`.
    pub fn sample(&self, t: f32) -> Vec3 {
        match self.stops() {
            Some(stops) => sample_gradient(&stops, t),
            None => match *self {
                Palette::HueWheel { cycles } => hsl_to_rgb(t * cycles * 360.0, 1.0, 0.5),
                _ => unreachable!("non-gradient palettes are handled above"),
            },
        }
    }

    /// Color stops for gradient palettes; `None` for computed palettes.
    fn stops(&self) -> Option<[Vec3; 5]> {
        match self {
            Palette::HueWheel { .. } => None,
            Palette::Neon => Some([
                Vec3::new(1.0, 0.0, 0.5), // Pink
                Vec3::new(0.5, 0.0, 1.0), // Purple
                Vec3::new(0.0, 0.5, 1.0), // Blue
                Vec3::new(0.0, 1.0, 1.0), // Cyan
                Vec3::new(0.5, 1.0, 0.5), // Green
            ]),
            Palette::Ocean => Some([
                Vec3::new(0.0, 0.05, 0.15), // Deep blue
                Vec3::new(0.0, 0.2, 0.4),   // Dark blue
                Vec3::new(0.0, 0.4, 0.6),   // Blue
                Vec3::new(0.2, 0.6, 0.8),   // Light blue
                Vec3::new(0.6, 0.9, 1.0),   // Cyan
            ]),
            Palette::Fire => Some([
                Vec3::new(0.1, 0.0, 0.0), // Dark red
                Vec3::new(0.5, 0.0, 0.0), // Red
                Vec3::new(1.0, 0.3, 0.0), // Orange
                Vec3::new(1.0, 0.7, 0.0), // Yellow-orange
                Vec3::new(1.0, 1.0, 0.8), // White-yellow
            ]),
            Palette::Grayscale => Some([
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.25, 0.25, 0.25),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(0.75, 0.75, 0.75),
                Vec3::new(1.0, 1.0, 1.0),
            ]),
        }
    }
}

/// Linearly interpolate five color stops over `t` in `[0, 1]`.
fn sample_gradient(stops: &[Vec3; 5], t: f32) -> Vec3 {
    let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
    let i = (scaled.floor() as usize).min(stops.len() - 2);
    let fraction = scaled - i as f32;
    stops[i].lerp(stops[i + 1], fraction)
}

/// Convert an HSL color to linear RGB.
///
/// `h` is in degrees (any value, wrapped), `s` and `l` in `[0, 1]`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(360.0) / 360.0;
    if s == 0.0 {
        return Vec3::splat(l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-4
    }

    #[test]
    fn hsl_primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(hsl_to_rgb(120.0, 1.0, 0.5), Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(hsl_to_rgb(240.0, 1.0, 0.5), Vec3::new(0.0, 0.0, 1.0)));
        assert!(close(hsl_to_rgb(180.0, 1.0, 0.5), Vec3::new(0.0, 1.0, 1.0)));
    }

    #[test]
    fn hsl_hue_wraps() {
        assert!(close(hsl_to_rgb(360.0, 1.0, 0.5), hsl_to_rgb(0.0, 1.0, 0.5)));
        assert!(close(hsl_to_rgb(480.0, 1.0, 0.5), hsl_to_rgb(120.0, 1.0, 0.5)));
        assert!(close(hsl_to_rgb(-120.0, 1.0, 0.5), hsl_to_rgb(240.0, 1.0, 0.5)));
    }

    #[test]
    fn hsl_extremes() {
        assert!(close(hsl_to_rgb(57.0, 1.0, 1.0), Vec3::ONE));
        assert!(close(hsl_to_rgb(212.0, 1.0, 0.0), Vec3::ZERO));
        assert!(close(hsl_to_rgb(90.0, 0.0, 0.3), Vec3::splat(0.3)));
    }

    #[test]
    fn hue_wheel_cycles_along_the_tube() {
        let palette = Palette::default();
        // Four cycles: every quarter of the tube starts over at red.
        assert!(close(palette.sample(0.0), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(palette.sample(0.25), palette.sample(0.0)));
        assert!(close(palette.sample(0.5), palette.sample(0.0)));
        // An eighth of the tube is half a cycle: cyan.
        assert!(close(palette.sample(0.125), Vec3::new(0.0, 1.0, 1.0)));
    }

    #[test]
    fn gradient_palettes_hit_their_endpoints() {
        for palette in [Palette::Neon, Palette::Ocean, Palette::Fire, Palette::Grayscale] {
            let stops = palette.stops().unwrap();
            assert!(close(palette.sample(0.0), stops[0]));
            assert!(close(palette.sample(1.0), stops[4]));
            assert!(close(palette.sample(0.5), stops[2]));
        }
    }

    #[test]
    fn gradient_sampling_clamps() {
        let palette = Palette::Ocean;
        assert!(close(palette.sample(-1.0), palette.sample(0.0)));
        assert!(close(palette.sample(2.0), palette.sample(1.0)));
    }

    #[test]
    fn default_fog_matches_the_scene() {
        let fog = Fog::default();
        assert_eq!(fog.color, Vec3::ZERO);
        assert_eq!(fog.near, 30.0);
        assert_eq!(fog.far, 150.0);
    }
}

//! Depth gradient for directory circles, interpolated in CIE HCL so the
//! perceived lightness changes evenly from the outer to the inner levels.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Depth mapped onto the start of the gradient.
pub const DEPTH_DOMAIN: (f64, f64) = (-1.0, 5.0);
/// `hsl(185,60%,99%)` → `hsl(187,40%,70%)`.
pub const GRADIENT: ((f64, f64, f64), (f64, f64, f64)) = ((185.0, 0.60, 0.99), (187.0, 0.40, 0.70));

/// Fill for a directory at `depth`. Depths past the domain clamp to its ends.
pub fn depth_color(depth: usize) -> Rgb {
    let (lo, hi) = DEPTH_DOMAIN;
    let t = ((depth as f64 - lo) / (hi - lo)).clamp(0.0, 1.0);
    let ((h0, s0, l0), (h1, s1, l1)) = GRADIENT;
    interpolate_hcl(hsl_to_rgb(h0, s0, l0), hsl_to_rgb(h1, s1, l1), t)
}

// ── Conversions ───────────────────────────────────────────────────────────────

/// Unrounded sRGB channels in `0.0..=255.0`.
type Channels = (f64, f64, f64);

pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Channels {
    let h = h.rem_euclid(360.0);
    let m2 = l + (if l < 0.5 { l } else { 1.0 - l }) * s;
    let m1 = 2.0 * l - m2;
    let channel = |h: f64| {
        255.0
            * if h < 60.0 {
                m1 + (m2 - m1) * h / 60.0
            } else if h < 180.0 {
                m2
            } else if h < 240.0 {
                m1 + (m2 - m1) * (240.0 - h) / 60.0
            } else {
                m1
            }
    };
    (
        channel(if h >= 240.0 { h - 240.0 } else { h + 120.0 }),
        channel(h),
        channel(if h < 120.0 { h + 240.0 } else { h - 120.0 }),
    )
}

// D50 reference white and Lab constants.
const XN: f64 = 0.96422;
const YN: f64 = 1.0;
const ZN: f64 = 0.82521;
const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

fn rgb_to_linear(v: f64) -> f64 {
    let v = v / 255.0;
    if v <= 0.04045 { v / 12.92 } else { ((v + 0.055) / 1.055).powf(2.4) }
}

fn linear_to_rgb(v: f64) -> f64 {
    255.0 * if v <= 0.003_130_8 { 12.92 * v } else { 1.055 * v.powf(1.0 / 2.4) - 0.055 }
}

fn xyz_to_lab(t: f64) -> f64 {
    if t > T3 { t.cbrt() } else { t / T2 + T0 }
}

fn lab_to_xyz(t: f64) -> f64 {
    if t > T1 { t * t * t } else { T2 * (t - T0) }
}

/// sRGB → (L, C, h°).
fn rgb_to_hcl((r, g, b): Channels) -> (f64, f64, f64) {
    let (r, g, b) = (rgb_to_linear(r), rgb_to_linear(g), rgb_to_linear(b));
    let y = xyz_to_lab((0.222_504_5 * r + 0.716_878_6 * g + 0.060_616_9 * b) / YN);
    let (x, z) = if r == g && g == b {
        (y, y)
    } else {
        (
            xyz_to_lab((0.436_074_7 * r + 0.385_064_9 * g + 0.143_080_4 * b) / XN),
            xyz_to_lab((0.013_932_2 * r + 0.097_104_5 * g + 0.714_173_3 * b) / ZN),
        )
    };
    let (l, a, bb) = (116.0 * y - 16.0, 500.0 * (x - y), 200.0 * (y - z));
    let c = (a * a + bb * bb).sqrt();
    let h = bb.atan2(a).to_degrees().rem_euclid(360.0);
    (l, c, h)
}

/// (L, C, h°) → sRGB channels.
fn hcl_to_rgb((l, c, h): (f64, f64, f64)) -> Channels {
    let h = h.to_radians();
    let (a, b) = (h.cos() * c, h.sin() * c);
    let y = (l + 16.0) / 116.0;
    let x = XN * lab_to_xyz(y + a / 500.0);
    let z = ZN * lab_to_xyz(y - b / 200.0);
    let y = YN * lab_to_xyz(y);
    (
        linear_to_rgb(3.133_856_1 * x - 1.616_866_7 * y - 0.490_614_6 * z),
        linear_to_rgb(-0.978_768_4 * x + 1.916_141_5 * y + 0.033_454_0 * z),
        linear_to_rgb(0.071_945_3 * x - 0.228_991_4 * y + 1.405_242_7 * z),
    )
}

fn to_rgb((r, g, b): Channels) -> Rgb {
    let q = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    Rgb { r: q(r), g: q(g), b: q(b) }
}

/// Interpolates two colours in HCL, taking the shorter way around the hue circle.
pub fn interpolate_hcl(from: Channels, to: Channels, t: f64) -> Rgb {
    let (l0, c0, h0) = rgb_to_hcl(from);
    let (l1, c1, h1) = rgb_to_hcl(to);
    let mut dh = h1 - h0;
    if dh > 180.0 || dh < -180.0 {
        dh -= 360.0 * (dh / 360.0).round();
    }
    to_rgb(hcl_to_rgb((l0 + (l1 - l0) * t, c0 + (c1 - c0) * t, h0 + dh * t)))
}

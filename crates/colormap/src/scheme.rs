//! Color schemes and multi-stop interpolation engine.
//!
//! Stops follow the ColorBrewer ramps used by common plotting tools:
//! diverging red-yellow-green for NDVI and single-hue ramps for masks.

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS hex notation, `#rrggbb`
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Available color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// Red -> Yellow -> Green, diverging (NDVI)
    RdYlGn,
    /// White -> dark blue (water)
    Blues,
    /// White -> dark green (vegetation)
    Greens,
    /// White -> dark red (soil)
    Reds,
    /// Black -> White
    Grayscale,
}

impl ColorScheme {
    pub const ALL: &[ColorScheme] = &[
        Self::RdYlGn,
        Self::Blues,
        Self::Greens,
        Self::Reds,
        Self::Grayscale,
    ];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RdYlGn => "RdYlGn",
            Self::Blues => "Blues",
            Self::Greens => "Greens",
            Self::Reds => "Reds",
            Self::Grayscale => "Grayscale",
        }
    }

    /// Look a scheme up by name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }
}

const RDYLGN_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 165, 0, 38),
    ColorStop::new(0.1, 215, 48, 39),
    ColorStop::new(0.2, 244, 109, 67),
    ColorStop::new(0.3, 253, 174, 97),
    ColorStop::new(0.4, 254, 224, 139),
    ColorStop::new(0.5, 255, 255, 191),
    ColorStop::new(0.6, 217, 239, 139),
    ColorStop::new(0.7, 166, 217, 106),
    ColorStop::new(0.8, 102, 189, 99),
    ColorStop::new(0.9, 26, 152, 80),
    ColorStop::new(1.0, 0, 104, 55),
];

const BLUES_STOPS: &[ColorStop] = &[
    ColorStop::new(0.000, 247, 251, 255),
    ColorStop::new(0.125, 222, 235, 247),
    ColorStop::new(0.250, 198, 219, 239),
    ColorStop::new(0.375, 158, 202, 225),
    ColorStop::new(0.500, 107, 174, 214),
    ColorStop::new(0.625, 66, 146, 198),
    ColorStop::new(0.750, 33, 113, 181),
    ColorStop::new(0.875, 8, 81, 156),
    ColorStop::new(1.000, 8, 48, 107),
];

const GREENS_STOPS: &[ColorStop] = &[
    ColorStop::new(0.000, 247, 252, 245),
    ColorStop::new(0.125, 229, 245, 224),
    ColorStop::new(0.250, 199, 233, 192),
    ColorStop::new(0.375, 161, 217, 155),
    ColorStop::new(0.500, 116, 196, 118),
    ColorStop::new(0.625, 65, 171, 93),
    ColorStop::new(0.750, 35, 139, 69),
    ColorStop::new(0.875, 0, 109, 44),
    ColorStop::new(1.000, 0, 68, 27),
];

const REDS_STOPS: &[ColorStop] = &[
    ColorStop::new(0.000, 255, 245, 240),
    ColorStop::new(0.125, 254, 224, 210),
    ColorStop::new(0.250, 252, 187, 161),
    ColorStop::new(0.375, 252, 146, 114),
    ColorStop::new(0.500, 251, 106, 74),
    ColorStop::new(0.625, 239, 59, 44),
    ColorStop::new(0.750, 203, 24, 29),
    ColorStop::new(0.875, 165, 15, 21),
    ColorStop::new(1.000, 103, 0, 13),
];

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    let first = stops[0];
    let last = stops[stops.len() - 1];
    if t <= first.t {
        return first.color;
    }
    if t >= last.t {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t <= hi.t {
            let ratio = (t - lo.t) / (hi.t - lo.t);
            return lerp_color(lo.color, hi.color, ratio);
        }
    }
    last.color
}

/// Evaluate a color scheme at normalized position `t` in [0, 1].
///
/// Positions outside the unit interval clamp to the end colors.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::RdYlGn => multi_stop(RDYLGN_STOPS, t),
        ColorScheme::Blues => multi_stop(BLUES_STOPS, t),
        ColorScheme::Greens => multi_stop(GREENS_STOPS, t),
        ColorScheme::Reds => multi_stop(REDS_STOPS, t),
        ColorScheme::Grayscale => {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
    }
}

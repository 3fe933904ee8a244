//! Named colormaps and their discretization into color buckets.

use image::Rgb;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Piecewise-linear channel: (position, intensity) pairs with positions
/// ascending from 0 to 1.
type Channel = &'static [(f64, f64)];

struct Segments {
    red: Channel,
    green: Channel,
    blue: Channel,
}

const JET: Segments = Segments {
    red: &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)],
    green: &[
        (0.0, 0.0),
        (0.125, 0.0),
        (0.375, 1.0),
        (0.64, 1.0),
        (0.91, 0.0),
        (1.0, 0.0),
    ],
    blue: &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)],
};

const HOT: Segments = Segments {
    red: &[(0.0, 0.0416), (0.365079, 1.0), (1.0, 1.0)],
    green: &[(0.0, 0.0), (0.365079, 0.0), (0.746032, 1.0), (1.0, 1.0)],
    blue: &[(0.0, 0.0), (0.746032, 0.0), (1.0, 1.0)],
};

const COOL: Segments = Segments {
    red: &[(0.0, 0.0), (1.0, 1.0)],
    green: &[(0.0, 1.0), (1.0, 0.0)],
    blue: &[(0.0, 1.0), (1.0, 1.0)],
};

const GRAY: Segments = Segments {
    red: &[(0.0, 0.0), (1.0, 1.0)],
    green: &[(0.0, 0.0), (1.0, 1.0)],
    blue: &[(0.0, 0.0), (1.0, 1.0)],
};

const SEISMIC: Segments = Segments {
    red: &[(0.0, 0.0), (0.25, 0.0), (0.5, 1.0), (0.75, 1.0), (1.0, 0.5)],
    green: &[(0.0, 0.0), (0.25, 0.0), (0.5, 1.0), (0.75, 0.0), (1.0, 0.0)],
    blue: &[(0.0, 0.3), (0.25, 1.0), (0.5, 1.0), (0.75, 0.0), (1.0, 0.0)],
};

/// Viridis sampled at nine evenly spaced positions. The ends are exact,
/// colors in between can differ from matplotlib's table by a few units.
const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

/// Continuous colormaps selectable by name.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Colormap {
    Jet,
    /// Approximation of matplotlib's viridis, interpolated from nine stops.
    Viridis,
    Gray,
    Hot,
    Cool,
    Rainbow,
    Seismic,
}

impl Colormap {
    pub const ALL: &'static [Colormap] = &[
        Colormap::Jet,
        Colormap::Viridis,
        Colormap::Gray,
        Colormap::Hot,
        Colormap::Cool,
        Colormap::Rainbow,
        Colormap::Seismic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Jet => "jet",
            Colormap::Viridis => "viridis",
            Colormap::Gray => "gray",
            Colormap::Hot => "hot",
            Colormap::Cool => "cool",
            Colormap::Rainbow => "rainbow",
            Colormap::Seismic => "seismic",
        }
    }

    /// Evaluates the colormap at `t`, clamped to [0, 1].
    pub fn evaluate(&self, t: f64) -> Rgb<u8> {
        let t = if t.is_nan() { 0.0 } else { t.max(0.0).min(1.0) };

        let (r, g, b) = match self {
            Colormap::Jet => JET.eval(t),
            Colormap::Hot => HOT.eval(t),
            Colormap::Cool => COOL.eval(t),
            Colormap::Gray => GRAY.eval(t),
            Colormap::Seismic => SEISMIC.eval(t),
            Colormap::Rainbow => (
                (2.0 * t - 0.5).abs().min(1.0),
                (std::f64::consts::PI * t).sin(),
                (std::f64::consts::FRAC_PI_2 * t).cos(),
            ),
            Colormap::Viridis => return viridis(t),
        };

        Rgb([to_u8(r), to_u8(g), to_u8(b)])
    }

    /// Samples `n` evenly spaced colors, the first at 0 and the last at 1.
    pub fn discretize(&self, n: usize) -> Vec<Rgb<u8>> {
        match n {
            0 => Vec::new(),
            1 => vec![self.evaluate(0.0)],
            _ => (0..n)
                .map(|i| self.evaluate(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap::Jet
    }
}

impl FromStr for Colormap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.to_lowercase();
        if name == "grey" || name == "grayscale" {
            return Ok(Colormap::Gray);
        }

        Colormap::ALL
            .iter()
            .copied()
            .find(|c| c.name() == name)
            .ok_or_else(|| Error::config(format!("unknown colormap `{}`", s)))
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders a color the way KML expects it: `aabbggrr` with full opacity.
pub fn kml_color(color: Rgb<u8>) -> String {
    let Rgb([r, g, b]) = color;
    format!("ff{:02x}{:02x}{:02x}", b, g, r)
}

impl Segments {
    fn eval(&self, t: f64) -> (f64, f64, f64) {
        (interp(self.red, t), interp(self.green, t), interp(self.blue, t))
    }
}

fn interp(channel: Channel, t: f64) -> f64 {
    for pair in channel.windows(2) {
        let ((t0, v0), (t1, v1)) = (pair[0], pair[1]);
        if t <= t1 {
            return v0 + (v1 - v0) * (t - t0) / (t1 - t0);
        }
    }
    channel[channel.len() - 1].1
}

fn viridis(t: f64) -> Rgb<u8> {
    let x = t * (VIRIDIS.len() - 1) as f64;
    let i = (x.floor() as usize).min(VIRIDIS.len() - 2);
    let f = x - i as f64;

    let lerp = |a: u8, b: u8| (a as f64 + f * (b as f64 - a as f64)).round() as u8;
    let ((r0, g0, b0), (r1, g1, b1)) = (VIRIDIS[i], VIRIDIS[i + 1]);
    Rgb([lerp(r0, r1), lerp(g0, g1), lerp(b0, b1)])
}

fn to_u8(v: f64) -> u8 {
    (v.max(0.0).min(1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jet_endpoints() {
        assert_eq!(Colormap::Jet.evaluate(0.0), Rgb([0, 0, 128]));
        assert_eq!(Colormap::Jet.evaluate(1.0), Rgb([128, 0, 0]));
        assert_eq!(Colormap::Jet.evaluate(0.5), Rgb([123, 255, 123]));
    }

    #[test]
    fn evaluate_clamps() {
        assert_eq!(Colormap::Gray.evaluate(-1.0), Rgb([0, 0, 0]));
        assert_eq!(Colormap::Gray.evaluate(2.0), Rgb([255, 255, 255]));
        assert_eq!(Colormap::Gray.evaluate(f64::NAN), Rgb([0, 0, 0]));
        assert_eq!(Colormap::Viridis.evaluate(1.0), Rgb([253, 231, 37]));
    }

    #[test]
    fn viridis_stops() {
        assert_eq!(Colormap::Viridis.evaluate(0.0), Rgb([68, 1, 84]));
        assert_eq!(Colormap::Viridis.evaluate(0.5), Rgb([33, 144, 141]));
        assert_eq!(Colormap::Viridis.evaluate(1.0), Rgb([253, 231, 37]));

        // halfway between the first two stops
        assert_eq!(Colormap::Viridis.evaluate(0.0625), Rgb([70, 23, 103]));
    }

    #[test]
    fn discretize_spans_whole_map() {
        let colors = Colormap::Gray.discretize(10);
        assert_eq!(colors.len(), 10);
        assert_eq!(colors[0], Rgb([0, 0, 0]));
        assert_eq!(colors[9], Rgb([255, 255, 255]));
        assert_eq!(Colormap::Jet.discretize(1), vec![Rgb([0, 0, 128])]);
        assert!(Colormap::Jet.discretize(0).is_empty());
    }

    #[test]
    fn kml_color_is_abgr() {
        assert_eq!(kml_color(Rgb([0x12, 0x34, 0x56])), "ff563412");
        assert_eq!(kml_color(Colormap::Jet.evaluate(0.0)), "ff800000");
    }

    #[test]
    fn parse_names() {
        assert_eq!("jet".parse::<Colormap>().unwrap(), Colormap::Jet);
        assert_eq!("Viridis".parse::<Colormap>().unwrap(), Colormap::Viridis);
        assert_eq!("grayscale".parse::<Colormap>().unwrap(), Colormap::Gray);
        assert!(matches!("nope".parse::<Colormap>(), Err(Error::Config(_))));
    }
}

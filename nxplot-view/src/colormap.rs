//! Colormap definitions and application logic.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Colormaps available to image plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Colormap {
    /// Viridis (approximate) - blue to teal to green to yellow.
    #[default]
    Viridis,
    /// Hot (Thermal) - black to red to yellow to white.
    Hot,
    /// Grayscale - black to white.
    Gray,
    /// Black to bright green.
    Green,
    /// Diverging blue to white to red.
    Coolwarm,
}

impl Colormap {
    /// Every colormap, in menu order.
    pub const ALL: [Colormap; 5] = [
        Colormap::Viridis,
        Colormap::Hot,
        Colormap::Gray,
        Colormap::Green,
        Colormap::Coolwarm,
    ];

    /// Short name accepted by [`Colormap::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Colormap::Viridis => "viridis",
            Colormap::Hot => "hot",
            Colormap::Gray => "gray",
            Colormap::Green => "green",
            Colormap::Coolwarm => "coolwarm",
        }
    }

    /// Whether the map is diverging (centred on zero by symmetric limits).
    pub fn is_diverging(self) -> bool {
        matches!(self, Colormap::Coolwarm)
    }

    /// Apply the colormap to a normalized value [0, 1] and return RGBA bytes.
    ///
    /// Values outside [0, 1] are clamped; NaN maps to a transparent pixel.
    #[must_use]
    pub fn apply(self, val: f32) -> [u8; 4] {
        if val.is_nan() {
            return [0, 0, 0, 0];
        }
        let val = val.clamp(0.0, 1.0);
        match self {
            Colormap::Green => {
                let v = f32_to_u8(val * 255.0);
                [0, v, 0, 255]
            }
            Colormap::Gray => {
                let v = f32_to_u8(val * 255.0);
                [v, v, v, 255]
            }
            Colormap::Hot => {
                if val < 1.0 / 3.0 {
                    [f32_to_u8(val * 3.0 * 255.0), 0, 0, 255]
                } else if val < 2.0 / 3.0 {
                    [255, f32_to_u8((val * 3.0 - 1.0) * 255.0), 0, 255]
                } else {
                    [255, 255, f32_to_u8((val * 3.0 - 2.0) * 255.0), 255]
                }
            }
            Colormap::Viridis => {
                let r = f32_to_u8(255.0 * val.powf(2.0));
                let g = f32_to_u8(255.0 * val);
                let b = f32_to_u8(255.0 * (1.0 - val));
                [r, g, b, 255]
            }
            Colormap::Coolwarm => {
                // blue (59, 76, 192) -> white -> red (180, 4, 38)
                let (from, to, t) = if val < 0.5 {
                    ([59.0, 76.0, 192.0], [221.0, 221.0, 221.0], val * 2.0)
                } else {
                    ([221.0, 221.0, 221.0], [180.0, 4.0, 38.0], (val - 0.5) * 2.0)
                };
                let mix = |i: usize| f32_to_u8(from[i] + (to[i] - from[i]) * t);
                [mix(0), mix(1), mix(2), 255]
            }
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colormap::Viridis => write!(f, "Viridis"),
            Colormap::Hot => write!(f, "Hot (Thermal)"),
            Colormap::Gray => write!(f, "Grayscale"),
            Colormap::Green => write!(f, "Green"),
            Colormap::Coolwarm => write!(f, "Coolwarm"),
        }
    }
}

impl FromStr for Colormap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viridis" => Ok(Colormap::Viridis),
            "hot" => Ok(Colormap::Hot),
            "gray" | "grey" | "grayscale" => Ok(Colormap::Gray),
            "green" => Ok(Colormap::Green),
            "coolwarm" => Ok(Colormap::Coolwarm),
            _ => Err(Error::option("cmap", s)),
        }
    }
}

/// Convert f32 to u8 with clamping to [0, 255].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn f32_to_u8(value: f32) -> u8 {
    let clamped = value.clamp(0.0, 255.0);
    clamped.round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("Viridis".parse::<Colormap>().unwrap(), Colormap::Viridis);
        assert_eq!("grey".parse::<Colormap>().unwrap(), Colormap::Gray);
        for cmap in Colormap::ALL {
            assert_eq!(cmap.name().parse::<Colormap>().unwrap(), cmap);
        }
        assert!(matches!(
            "jet".parse::<Colormap>(),
            Err(Error::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(Colormap::Gray.apply(0.0), [0, 0, 0, 255]);
        assert_eq!(Colormap::Gray.apply(1.0), [255, 255, 255, 255]);
        assert_eq!(Colormap::Hot.apply(1.0), [255, 255, 255, 255]);
        assert_eq!(Colormap::Gray.apply(2.0), [255, 255, 255, 255]);
        assert_eq!(Colormap::Viridis.apply(f32::NAN)[3], 0);
    }
}

//! Options accepted by `plot()` and the small enums they resolve to.

use std::str::FromStr;

use crate::colormap::Colormap;
use crate::config::PlotConfig;
use crate::{Error, Result};

/// Aspect ratio of the data axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Aspect {
    /// Fill the available area.
    #[default]
    Auto,
    /// One data unit is the same length on both axes.
    Equal,
    /// Fixed y/x ratio.
    Ratio(f64),
}

impl FromStr for Aspect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Aspect::Auto),
            "equal" => Ok(Aspect::Equal),
            other => match other.parse::<f64>() {
                Ok(ratio) if ratio.is_finite() && ratio > 0.0 => Ok(Aspect::Ratio(ratio)),
                _ => Err(Error::option("aspect", s)),
            },
        }
    }
}

/// Pixel interpolation for regular image plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Interpolation {
    /// Nearest neighbour.
    #[default]
    Nearest,
    /// Bilinear.
    Bilinear,
    /// Bicubic.
    Bicubic,
}

impl Interpolation {
    /// Every mode, in menu order.
    pub const ALL: [Interpolation; 3] = [
        Interpolation::Nearest,
        Interpolation::Bilinear,
        Interpolation::Bicubic,
    ];

    /// Short name accepted by [`Interpolation::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Bicubic => "bicubic",
        }
    }
}

impl FromStr for Interpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "none" => Ok(Interpolation::Nearest),
            "bilinear" => Ok(Interpolation::Bilinear),
            "bicubic" => Ok(Interpolation::Bicubic),
            _ => Err(Error::option("interpolation", s)),
        }
    }
}

/// Marker drawn at each point of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Marker {
    /// `.`
    Point,
    /// `o`
    Circle,
    /// `s`
    Square,
    /// `^`
    TriangleUp,
    /// `v`
    TriangleDown,
    /// `d` or `D`
    Diamond,
    /// `+`
    Plus,
    /// `x`
    Cross,
    /// `*`
    Star,
}

/// Line connecting the points of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineStyle {
    /// `-`
    Solid,
    /// `--`
    Dashed,
    /// `-.`
    DashDot,
    /// `:`
    Dotted,
}

/// Single-letter colour codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorCode {
    /// `b`
    Blue,
    /// `g`
    Green,
    /// `r`
    Red,
    /// `c`
    Cyan,
    /// `m`
    Magenta,
    /// `y`
    Yellow,
    /// `k`
    Black,
    /// `w`
    White,
}

impl ColorCode {
    /// RGB bytes of the colour.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            ColorCode::Blue => [31, 119, 180],
            ColorCode::Green => [44, 160, 44],
            ColorCode::Red => [214, 39, 40],
            ColorCode::Cyan => [23, 190, 207],
            ColorCode::Magenta => [227, 119, 194],
            ColorCode::Yellow => [188, 189, 34],
            ColorCode::Black => [0, 0, 0],
            ColorCode::White => [255, 255, 255],
        }
    }
}

/// Parsed matplotlib-style format string such as `"o-r"` or `"--b"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineFormat {
    /// Point marker.
    pub marker: Option<Marker>,
    /// Connecting line.
    pub line: Option<LineStyle>,
    /// Explicit colour; `None` lets the renderer cycle colours.
    pub color: Option<ColorCode>,
}

impl LineFormat {
    /// Circles without a line, the default for data plots.
    pub const POINTS: LineFormat = LineFormat {
        marker: Some(Marker::Circle),
        line: None,
        color: None,
    };
}

impl FromStr for LineFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut fmt = LineFormat::default();
        let mut rest = s.trim();
        while !rest.is_empty() {
            let line = ["--", "-.", "-", ":"]
                .into_iter()
                .find(|token| rest.starts_with(token));
            if let Some(token) = line {
                if fmt.line.is_some() {
                    return Err(Error::option("fmt", s));
                }
                fmt.line = Some(match token {
                    "--" => LineStyle::Dashed,
                    "-." => LineStyle::DashDot,
                    ":" => LineStyle::Dotted,
                    _ => LineStyle::Solid,
                });
                rest = &rest[token.len()..];
                continue;
            }
            let mut chars = rest.chars();
            let Some(c) = chars.next() else { break };
            let marker = match c {
                '.' => Some(Marker::Point),
                'o' => Some(Marker::Circle),
                's' => Some(Marker::Square),
                '^' => Some(Marker::TriangleUp),
                'v' => Some(Marker::TriangleDown),
                'd' | 'D' => Some(Marker::Diamond),
                '+' => Some(Marker::Plus),
                'x' => Some(Marker::Cross),
                '*' => Some(Marker::Star),
                _ => None,
            };
            let color = match c {
                'b' => Some(ColorCode::Blue),
                'g' => Some(ColorCode::Green),
                'r' => Some(ColorCode::Red),
                'c' => Some(ColorCode::Cyan),
                'm' => Some(ColorCode::Magenta),
                'y' => Some(ColorCode::Yellow),
                'k' => Some(ColorCode::Black),
                'w' => Some(ColorCode::White),
                _ => None,
            };
            match (marker, color) {
                (Some(m), _) if fmt.marker.is_none() => fmt.marker = Some(m),
                (_, Some(col)) if fmt.color.is_none() => fmt.color = Some(col),
                _ => return Err(Error::option("fmt", s)),
            }
            rest = chars.as_str();
        }
        Ok(fmt)
    }
}

/// Keyword options of a `plot()` call.
///
/// Text options are kept as given and resolved by [`PlotOptions::resolve`],
/// so an invalid value is reported before any view state changes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlotOptions {
    /// Marker/line format string for 1-D plots.
    pub fmt: Option<String>,
    /// Lower x limit.
    pub xmin: Option<f64>,
    /// Upper x limit.
    pub xmax: Option<f64>,
    /// Lower y limit.
    pub ymin: Option<f64>,
    /// Upper y limit.
    pub ymax: Option<f64>,
    /// Lower intensity limit.
    pub vmin: Option<f64>,
    /// Upper intensity limit.
    pub vmax: Option<f64>,
    /// Overlay a 1-D curve on the existing plot.
    pub over: bool,
    /// Log intensity (the y axis of 1-D plots).
    pub log: bool,
    /// Log x axis.
    pub logx: bool,
    /// Log y axis.
    pub logy: bool,
    /// Treat the signal as an RGB(A) image.
    pub image: bool,
    /// Colormap name.
    pub cmap: Option<String>,
    /// Interpolation name.
    pub interpolation: Option<String>,
    /// Aspect (`auto`, `equal` or a ratio).
    pub aspect: Option<String>,
}

/// [`PlotOptions`] with every text option parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    /// Curve format.
    pub fmt: LineFormat,
    /// Colormap.
    pub colormap: Colormap,
    /// Interpolation.
    pub interpolation: Interpolation,
    /// Aspect requested by the caller, if any.
    pub aspect: Option<Aspect>,
}

impl PlotOptions {
    /// Options for an overlay.
    #[must_use]
    pub fn overlay() -> Self {
        Self {
            over: true,
            ..Self::default()
        }
    }

    /// Sets the format string.
    #[must_use]
    pub fn with_fmt(mut self, fmt: impl Into<String>) -> Self {
        self.fmt = Some(fmt.into());
        self
    }

    /// Sets the colormap name.
    #[must_use]
    pub fn with_cmap(mut self, cmap: impl Into<String>) -> Self {
        self.cmap = Some(cmap.into());
        self
    }

    /// Sets the x limits.
    #[must_use]
    pub fn with_xlim(mut self, xmin: f64, xmax: f64) -> Self {
        self.xmin = Some(xmin);
        self.xmax = Some(xmax);
        self
    }

    /// Sets the y limits.
    #[must_use]
    pub fn with_ylim(mut self, ymin: f64, ymax: f64) -> Self {
        self.ymin = Some(ymin);
        self.ymax = Some(ymax);
        self
    }

    /// Sets the intensity limits.
    #[must_use]
    pub fn with_vlim(mut self, vmin: f64, vmax: f64) -> Self {
        self.vmin = Some(vmin);
        self.vmax = Some(vmax);
        self
    }

    /// Parses the text options, falling back to `config` defaults.
    ///
    /// # Errors
    /// `InvalidOption` for unknown names, malformed format strings and
    /// non-finite explicit limits.
    pub fn resolve(&self, config: &PlotConfig) -> Result<ResolvedOptions> {
        for (name, value) in [
            ("xmin", self.xmin),
            ("xmax", self.xmax),
            ("ymin", self.ymin),
            ("ymax", self.ymax),
            ("vmin", self.vmin),
            ("vmax", self.vmax),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(Error::option(name, v));
                }
            }
        }
        let fmt = match &self.fmt {
            Some(fmt) => fmt.parse()?,
            None => LineFormat::POINTS,
        };
        let colormap = match &self.cmap {
            Some(name) => name.parse()?,
            None => config.default_colormap,
        };
        let interpolation = match &self.interpolation {
            Some(name) => name.parse()?,
            None => config.default_interpolation,
        };
        let aspect = self.aspect.as_deref().map(str::parse).transpose()?;
        Ok(ResolvedOptions {
            fmt,
            colormap,
            interpolation,
            aspect,
        })
    }
}

//! Screen/data transforms, zoom-box gestures and the zoom history.

use crate::state::AxisRef;

const MIN_SPAN: f64 = 1e-12;

/// Zoom boxes smaller than this (in pixels, either side) are ignored.
const MIN_BOX_PIXELS: f64 = 2.0;

/// Point in screen pixels, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    /// Horizontal pixel.
    pub x: f64,
    /// Vertical pixel.
    pub y: f64,
}

impl ScreenPoint {
    /// Creates a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Screen rectangle of the data area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: ScreenPoint,
    /// Bottom-right corner.
    pub max: ScreenPoint,
}

impl ScreenRect {
    /// Creates a rectangle from two corners.
    pub fn new(min: ScreenPoint, max: ScreenPoint) -> Self {
        Self { min, max }
    }

    /// Width in pixels.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height in pixels.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Whether the rectangle has a positive finite area.
    pub fn is_valid(&self) -> bool {
        self.width().is_finite() && self.height().is_finite() && self.width() > 0.0 && self.height() > 0.0
    }
}

/// Axis scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scale {
    /// Linear scaling.
    #[default]
    Linear,
    /// Base-10 logarithmic scaling.
    Log,
}

impl Scale {
    /// Scale for an axis log flag.
    pub fn from_log(log: bool) -> Self {
        if log {
            Scale::Log
        } else {
            Scale::Linear
        }
    }

    /// Map a value into axis space.
    pub fn map_value(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Scale::Linear => Some(value),
            Scale::Log if value > 0.0 => Some(value.log10()),
            Scale::Log => None,
        }
    }

    /// Invert a value from axis space back into data space.
    pub fn invert_value(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Scale::Linear => Some(value),
            Scale::Log => Some(10_f64.powf(value)),
        }
    }
}

/// Transform between data coordinates and screen pixels.
///
/// With a skew angle `θ` (degrees between the x and y axes, 90 meaning
/// orthogonal) a data point `(x, y)` is drawn at `x + y / tan θ` before the
/// x limits are applied. Skew is only defined for linear axes.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTransform {
    screen: ScreenRect,
    x: (f64, f64),
    y: (f64, f64),
    x_scale: Scale,
    y_scale: Scale,
    shear: f64,
    x_reversed: bool,
    y_reversed: bool,
}

impl DataTransform {
    /// Creates a transform for the given limits and data area.
    ///
    /// Returns `None` for an empty screen rectangle, a log axis with
    /// non-positive limits, a skew on a log axis, or a skew angle outside
    /// `(0, 180)`.
    pub fn new(
        screen: ScreenRect,
        x_limits: (f64, f64),
        y_limits: (f64, f64),
        x_scale: Scale,
        y_scale: Scale,
        skew: Option<f64>,
    ) -> Option<Self> {
        if !screen.is_valid() {
            return None;
        }
        let shear = match skew {
            None => 0.0,
            Some(angle) if angle > 0.0 && angle < 180.0 => {
                if x_scale == Scale::Log || y_scale == Scale::Log {
                    return None;
                }
                1.0 / angle.to_radians().tan()
            }
            Some(_) => return None,
        };
        let x = map_limits(x_limits, x_scale)?;
        let y = map_limits(y_limits, y_scale)?;
        Some(Self {
            screen,
            x,
            y,
            x_scale,
            y_scale,
            shear,
            x_reversed: false,
            y_reversed: false,
        })
    }

    /// Draws axes whose coordinates decrease with their values running
    /// right-to-left and top-to-bottom.
    #[must_use]
    pub fn with_reversed(mut self, x: bool, y: bool) -> Self {
        self.x_reversed = x;
        self.y_reversed = y;
        self
    }

    /// Screen rectangle of the data area.
    pub fn screen(&self) -> ScreenRect {
        self.screen
    }

    /// Map a data point into screen space.
    pub fn data_to_screen(&self, x: f64, y: f64) -> Option<ScreenPoint> {
        let mx = self.x_scale.map_value(x)?;
        let my = self.y_scale.map_value(y)?;
        let mx = mx + self.shear * my;
        let x_norm = flip((mx - self.x.0) / (self.x.1 - self.x.0), self.x_reversed);
        let y_norm = flip((my - self.y.0) / (self.y.1 - self.y.0), self.y_reversed);
        Some(ScreenPoint::new(
            self.screen.min.x + x_norm * self.screen.width(),
            self.screen.max.y - y_norm * self.screen.height(),
        ))
    }

    /// Map a screen point into data space.
    pub fn screen_to_data(&self, point: ScreenPoint) -> Option<(f64, f64)> {
        let x_norm = flip((point.x - self.screen.min.x) / self.screen.width(), self.x_reversed);
        let y_norm = flip((self.screen.max.y - point.y) / self.screen.height(), self.y_reversed);
        let my = self.y.0 + y_norm * (self.y.1 - self.y.0);
        let mx = self.x.0 + x_norm * (self.x.1 - self.x.0) - self.shear * my;
        Some((self.x_scale.invert_value(mx)?, self.y_scale.invert_value(my)?))
    }
}

fn flip(fraction: f64, reversed: bool) -> f64 {
    if reversed {
        1.0 - fraction
    } else {
        fraction
    }
}

fn map_limits((lo, hi): (f64, f64), scale: Scale) -> Option<(f64, f64)> {
    let lo = scale.map_value(lo)?;
    let hi = scale.map_value(hi)?;
    if (hi - lo).abs() < MIN_SPAN {
        let mid = 0.5 * (lo + hi);
        Some((mid - MIN_SPAN, mid + MIN_SPAN))
    } else {
        Some((lo, hi))
    }
}

/// Mouse button that drew a zoom box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Commits the box into the axis limits.
    Left,
    /// Stages the box for the projection panel only.
    Right,
}

/// A rectangle-select gesture in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBox {
    /// Press position.
    pub start: ScreenPoint,
    /// Release position.
    pub end: ScreenPoint,
    /// Button held during the drag.
    pub button: MouseButton,
}

/// Data window of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisWindow {
    /// Axis the window applies to.
    pub axis: AxisRef,
    /// Lower limit.
    pub lo: f64,
    /// Upper limit.
    pub hi: f64,
}

/// A zoom box resolved to data limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRect {
    /// Horizontal window.
    pub x: AxisWindow,
    /// Vertical window.
    pub y: AxisWindow,
}

impl ZoomBox {
    /// Creates a gesture.
    pub fn new(start: ScreenPoint, end: ScreenPoint, button: MouseButton) -> Self {
        Self { start, end, button }
    }

    /// Converts the gesture to data limits.
    ///
    /// Both corners are inverted through `transform` and the results are
    /// min/max normalised, so drag direction and axis direction do not
    /// matter. Returns `None` for boxes under two pixels on either side.
    pub fn to_rect(&self, transform: &DataTransform, x: AxisRef, y: AxisRef) -> Option<ZoomRect> {
        if (self.end.x - self.start.x).abs() < MIN_BOX_PIXELS
            || (self.end.y - self.start.y).abs() < MIN_BOX_PIXELS
        {
            return None;
        }
        let (x0, y0) = transform.screen_to_data(self.start)?;
        let (x1, y1) = transform.screen_to_data(self.end)?;
        Some(ZoomRect {
            x: AxisWindow {
                axis: x,
                lo: x0.min(x1),
                hi: x0.max(x1),
            },
            y: AxisWindow {
                axis: y,
                lo: y0.min(y1),
                hi: y0.max(y1),
            },
        })
    }
}

/// Displayed x and y limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLimits {
    /// `(xmin, xmax)`.
    pub x: (f64, f64),
    /// `(ymin, ymax)`.
    pub y: (f64, f64),
}

/// Back/forward navigation over committed zoom windows.
///
/// Entry 0 is the home view. Pushing after going back discards the
/// forward entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZoomHistory {
    entries: Vec<ViewLimits>,
    position: usize,
}

impl ZoomHistory {
    /// Starts a history at `home`.
    pub fn new(home: ViewLimits) -> Self {
        Self {
            entries: vec![home],
            position: 0,
        }
    }

    /// Records a new view.
    pub fn push(&mut self, limits: ViewLimits) {
        if self.entries.is_empty() {
            self.entries.push(limits);
            self.position = 0;
            return;
        }
        self.entries.truncate(self.position + 1);
        self.entries.push(limits);
        self.position = self.entries.len() - 1;
    }

    /// Home view, which becomes current.
    pub fn home(&mut self) -> Option<ViewLimits> {
        let home = self.entries.first().copied()?;
        self.position = 0;
        Some(home)
    }

    /// Previous view, which becomes current.
    pub fn back(&mut self) -> Option<ViewLimits> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        self.entries.get(self.position).copied()
    }

    /// Next view, which becomes current.
    pub fn forward(&mut self) -> Option<ViewLimits> {
        if self.position + 1 >= self.entries.len() {
            return None;
        }
        self.position += 1;
        self.entries.get(self.position).copied()
    }

    /// Current view.
    pub fn current(&self) -> Option<ViewLimits> {
        self.entries.get(self.position).copied()
    }

    /// Number of recorded views.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

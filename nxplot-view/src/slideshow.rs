//! Slideshow state machine for stepping through z slices.
//!
//! The embedding event loop owns the timer. It asks [`Slideshow::interval`]
//! how long to wait and calls the view's tick when that elapses; pressing a
//! play button only ever replaces the state value, so timers cannot stack.

use std::time::Duration;

use crate::config::PlotConfig;

/// Stepping direction through the z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards higher indices.
    Forward,
    /// Towards lower indices.
    Backward,
}

impl Direction {
    /// Signed index step.
    pub fn steps(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Slideshow playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slideshow {
    /// Not playing.
    #[default]
    Stopped,
    /// Stepping one slice per `interval`.
    Playing {
        /// Stepping direction.
        direction: Direction,
        /// Time between steps.
        interval: Duration,
    },
}

impl Slideshow {
    /// State after pressing the play button for `direction`.
    ///
    /// Pressing the direction that is already playing halves the interval,
    /// bounded below by the configured minimum. Any other press starts at the
    /// configured interval.
    #[must_use]
    pub fn press(self, direction: Direction, config: &PlotConfig) -> Self {
        let interval = match self {
            Slideshow::Playing {
                direction: current,
                interval,
            } if current == direction => (interval / 2).max(config.min_slideshow_interval()),
            _ => config.slideshow_interval(),
        };
        Slideshow::Playing {
            direction,
            interval,
        }
    }

    /// State after pressing stop, or after stepping hits the end of the axis.
    #[must_use]
    pub fn stop(self) -> Self {
        Slideshow::Stopped
    }

    /// Whether a slideshow is running.
    pub fn is_playing(&self) -> bool {
        matches!(self, Slideshow::Playing { .. })
    }

    /// Direction being played.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Slideshow::Playing { direction, .. } => Some(*direction),
            Slideshow::Stopped => None,
        }
    }

    /// Time until the next step.
    pub fn interval(&self) -> Option<Duration> {
        match self {
            Slideshow::Playing { interval, .. } => Some(*interval),
            Slideshow::Stopped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_from_stopped() {
        let config = PlotConfig::default();
        let state = Slideshow::Stopped.press(Direction::Forward, &config);
        assert_eq!(state.direction(), Some(Direction::Forward));
        assert_eq!(state.interval(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_same_direction_halves_interval() {
        let config = PlotConfig::default();
        let state = Slideshow::Stopped
            .press(Direction::Backward, &config)
            .press(Direction::Backward, &config)
            .press(Direction::Backward, &config);
        assert_eq!(state.interval(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_interval_is_bounded() {
        let config = PlotConfig::default();
        let mut state = Slideshow::Stopped;
        for _ in 0..20 {
            state = state.press(Direction::Forward, &config);
        }
        assert_eq!(state.interval(), Some(config.min_slideshow_interval()));
    }

    #[test]
    fn test_reverse_restarts_and_stop() {
        let config = PlotConfig::default();
        let state = Slideshow::Stopped
            .press(Direction::Forward, &config)
            .press(Direction::Forward, &config)
            .press(Direction::Backward, &config);
        assert_eq!(state.direction(), Some(Direction::Backward));
        assert_eq!(state.interval(), Some(config.slideshow_interval()));
        assert!(!state.stop().is_playing());
    }
}

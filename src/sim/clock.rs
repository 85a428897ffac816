//! Day/night scheduler
//!
//! A cycle runs Day -> Sunset -> Night -> Sunrise. Night intensity eases
//! toward the current phase's target at a fixed rate, so it reaches full
//! darkness exactly as night begins and clears exactly as the cycle wraps.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_NIGHT_OPACITY;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    Day,
    Sunset,
    Night,
    Sunrise,
}

/// Something the clock wants the tick to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Darkness crossed the spawn threshold for the first time this cycle
    NightFell,
    NewDay { day: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldClock {
    /// Milliseconds into the current cycle
    pub cycle_ms: f64,
    pub day_length_ms: f64,
    pub sunset_start: f64,
    pub night_start: f64,
    pub sunrise_start: f64,
    /// 0 = full daylight, MAX_NIGHT_OPACITY = full night
    pub night_intensity: f32,
    pub day: u32,
    /// Whether this cycle's nightly spawn already fired
    pub spawned_tonight: bool,
}

impl WorldClock {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            cycle_ms: 0.0,
            day_length_ms: tuning.day_length_ms,
            sunset_start: tuning.sunset_start(),
            night_start: tuning.night_start,
            sunrise_start: tuning.sunrise_start(),
            night_intensity: 0.0,
            day: 1,
            spawned_tonight: false,
        }
    }

    /// Fraction of the cycle elapsed, in [0, 1)
    pub fn cycle_fraction(&self) -> f64 {
        self.cycle_ms / self.day_length_ms
    }

    pub fn phase(&self) -> DayPhase {
        let f = self.cycle_fraction();
        if f < self.sunset_start {
            DayPhase::Day
        } else if f < self.night_start {
            DayPhase::Sunset
        } else if f < self.sunrise_start {
            DayPhase::Night
        } else {
            DayPhase::Sunrise
        }
    }

    pub fn is_night(&self) -> bool {
        self.phase() == DayPhase::Night
    }

    fn target_intensity(phase: DayPhase) -> f32 {
        match phase {
            DayPhase::Day | DayPhase::Sunrise => 0.0,
            DayPhase::Sunset | DayPhase::Night => MAX_NIGHT_OPACITY,
        }
    }

    /// Intensity change per millisecond of transition
    fn ease_rate(&self) -> f64 {
        let transition_ms = (self.night_start - self.sunset_start) * self.day_length_ms;
        MAX_NIGHT_OPACITY as f64 / transition_ms
    }

    /// Advance by `dt_ms`, easing intensity and reporting phase milestones
    pub fn advance(&mut self, dt_ms: f64) -> Vec<ClockEvent> {
        let mut events = Vec::new();

        self.cycle_ms += dt_ms;
        while self.cycle_ms >= self.day_length_ms {
            self.cycle_ms -= self.day_length_ms;
            self.day += 1;
            events.push(ClockEvent::NewDay { day: self.day });
        }

        let phase = self.phase();
        let target = Self::target_intensity(phase);
        let step = (self.ease_rate() * dt_ms) as f32;
        self.night_intensity = if self.night_intensity < target {
            (self.night_intensity + step).min(target)
        } else {
            (self.night_intensity - step).max(target)
        };

        match phase {
            DayPhase::Day => self.spawned_tonight = false,
            DayPhase::Night
                if !self.spawned_tonight && self.night_intensity >= MAX_NIGHT_OPACITY * 0.5 =>
            {
                self.spawned_tonight = true;
                events.push(ClockEvent::NightFell);
            }
            _ => {}
        }

        events
    }
}

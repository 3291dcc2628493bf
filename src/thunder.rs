//! Thunder flashes.
//!
//! A strike is a short timed sequence: the backdrop turns bright and a
//! thunderclap plays, 200 ms later the backdrop goes dark again, and with
//! some probability a second flash follows with the same timing.
//!
//! ```text
//! Idle -> FlashOn -> FlashOff [-> FlashOn2 -> FlashOff2]? -> Idle
//! ```
//!
//! The trigger never touches audio or rendering. It returns
//! [`ThunderEvent`]s and the host applies them. Time is whatever the host's
//! clock says, passed in as a `Duration` since start; deadlines are chained
//! from the scheduled time rather than from `now`, so a late frame does not
//! stretch the sequence.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Where the flash sequence is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThunderState {
    Idle,
    FlashOn,
    FlashOff,
    FlashOn2,
    FlashOff2,
}

/// Background brightness requested by a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backdrop {
    Bright,
    Dark,
}

/// Playback request for the thunderclap sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioCue {
    /// Volume in `[min_volume, 1.0)`.
    pub volume: f32,
    /// Where in the clip playback starts.
    pub start_offset: Duration,
}

/// One state transition, to be applied by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThunderEvent {
    /// State entered.
    pub state: ThunderState,
    /// Scheduled time of the transition.
    pub at: Duration,
    pub backdrop: Backdrop,
    /// Present on the flash-on transitions.
    pub cue: Option<AudioCue>,
}

/// Thunder timing and look.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThunderConfig {
    /// How long each flash stays bright, and the gap before a second flash.
    #[serde(with = "crate::config::millis")]
    pub flash_duration: Duration,
    /// Probability of a second flash.
    pub second_flash_chance: f32,
    /// Random volumes below this are raised to it.
    pub min_volume: f32,
    /// Playback start offset into the thunderclap clip.
    #[serde(with = "crate::config::millis")]
    pub cue_offset: Duration,
    #[serde(with = "crate::config::hex_color")]
    pub bright: Vec3,
    #[serde(with = "crate::config::hex_color")]
    pub dark: Vec3,
    /// Average automatic strikes per minute. Zero means manual only.
    pub strikes_per_minute: f32,
}

impl Default for ThunderConfig {
    fn default() -> Self {
        Self {
            flash_duration: Duration::from_millis(200),
            second_flash_chance: 0.3,
            min_volume: 0.5,
            cue_offset: Duration::from_secs(1),
            bright: Vec3::ONE,
            dark: Vec3::ZERO,
            strikes_per_minute: 0.0,
        }
    }
}

impl ThunderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.second_flash_chance) {
            return Err(ConfigError::NotUnit {
                name: "second_flash_chance",
                value: self.second_flash_chance,
            });
        }
        if !(0.0..=1.0).contains(&self.min_volume) {
            return Err(ConfigError::NotUnit {
                name: "min_volume",
                value: self.min_volume,
            });
        }
        if !(self.strikes_per_minute.is_finite() && self.strikes_per_minute >= 0.0) {
            return Err(ConfigError::NonFinite("strikes_per_minute"));
        }
        if !(self.bright.is_finite() && self.dark.is_finite()) {
            return Err(ConfigError::NonFinite("backdrop color"));
        }
        Ok(())
    }

    /// Background color for a backdrop.
    pub fn color(&self, backdrop: Backdrop) -> Vec3 {
        match backdrop {
            Backdrop::Bright => self.bright,
            Backdrop::Dark => self.dark,
        }
    }
}

/// The flash state machine.
#[derive(Clone, Debug)]
pub struct ThunderTrigger {
    config: ThunderConfig,
    state: ThunderState,
    /// When the next transition is due. Meaningless while idle.
    deadline: Duration,
    backdrop: Backdrop,
}

impl ThunderTrigger {
    pub fn new(config: ThunderConfig) -> Self {
        Self {
            config,
            state: ThunderState::Idle,
            deadline: Duration::ZERO,
            backdrop: Backdrop::Dark,
        }
    }

    #[inline]
    pub fn state(&self) -> ThunderState {
        self.state
    }

    /// Backdrop set by the most recent transition.
    #[inline]
    pub fn backdrop(&self) -> Backdrop {
        self.backdrop
    }

    #[inline]
    pub fn config(&self) -> &ThunderConfig {
        &self.config
    }

    /// Whether a sequence is in progress.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state != ThunderState::Idle
    }

    /// Start a strike now: bright backdrop and thunderclap immediately.
    ///
    /// A strike during an active sequence restarts it from `FlashOn`.
    pub fn trigger<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> ThunderEvent {
        if self.is_active() {
            log::debug!("thunder retriggered during {:?}", self.state);
        }
        self.flash_on(ThunderState::FlashOn, now, rng)
    }

    /// Roll for an automatic strike over a frame of `dt` seconds.
    ///
    /// Only strikes while idle. Returns the `FlashOn` event when it fires.
    pub fn maybe_strike<R: Rng + ?Sized>(&mut self, now: Duration, dt: f32, rng: &mut R) -> Option<ThunderEvent> {
        if self.is_active() || self.config.strikes_per_minute <= 0.0 || dt <= 0.0 {
            return None;
        }
        let rate = self.config.strikes_per_minute / 60.0;
        let chance = 1.0 - (-rate * dt).exp();
        if rng.gen::<f32>() < chance {
            Some(self.trigger(now, rng))
        } else {
            None
        }
    }

    /// Apply every transition due at or before `now`, in order.
    pub fn update<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> Vec<ThunderEvent> {
        let mut events = Vec::new();
        while self.is_active() && now >= self.deadline {
            let at = self.deadline;
            let event = match self.state {
                ThunderState::FlashOn => {
                    let second = rng.gen::<f32>() < self.config.second_flash_chance;
                    if second {
                        self.state = ThunderState::FlashOff;
                        self.deadline = at + self.config.flash_duration;
                    } else {
                        self.state = ThunderState::Idle;
                    }
                    self.backdrop = Backdrop::Dark;
                    ThunderEvent {
                        state: ThunderState::FlashOff,
                        at,
                        backdrop: Backdrop::Dark,
                        cue: None,
                    }
                }
                ThunderState::FlashOff => self.flash_on(ThunderState::FlashOn2, at, rng),
                ThunderState::FlashOn2 => {
                    self.state = ThunderState::Idle;
                    self.backdrop = Backdrop::Dark;
                    ThunderEvent {
                        state: ThunderState::FlashOff2,
                        at,
                        backdrop: Backdrop::Dark,
                        cue: None,
                    }
                }
                // FlashOff2 is never held; it resolves straight to Idle
                ThunderState::FlashOff2 | ThunderState::Idle => break,
            };
            log::debug!("thunder: {:?} at {:?}", event.state, event.at);
            events.push(event);
        }
        events
    }

    fn flash_on<R: Rng + ?Sized>(&mut self, state: ThunderState, at: Duration, rng: &mut R) -> ThunderEvent {
        self.state = state;
        self.deadline = at + self.config.flash_duration;
        self.backdrop = Backdrop::Bright;
        ThunderEvent {
            state,
            at,
            backdrop: Backdrop::Bright,
            cue: Some(self.cue(rng)),
        }
    }

    fn cue<R: Rng + ?Sized>(&self, rng: &mut R) -> AudioCue {
        AudioCue {
            volume: rng.gen::<f32>().max(self.config.min_volume),
            start_offset: self.config.cue_offset,
        }
    }
}

impl Default for ThunderTrigger {
    fn default() -> Self {
        Self::new(ThunderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_trigger_flashes_immediately() {
        let mut thunder = ThunderTrigger::default();
        let mut rng = StdRng::seed_from_u64(1);
        let event = thunder.trigger(ms(1000), &mut rng);
        assert_eq!(event.state, ThunderState::FlashOn);
        assert_eq!(event.backdrop, Backdrop::Bright);
        assert_eq!(event.at, ms(1000));
        let cue = event.cue.unwrap();
        assert!(cue.volume >= 0.5 && cue.volume < 1.0);
        assert_eq!(cue.start_offset, Duration::from_secs(1));
        assert_eq!(thunder.state(), ThunderState::FlashOn);
    }

    #[test]
    fn test_flash_off_after_200ms() {
        let mut thunder = ThunderTrigger::default();
        let mut rng = StdRng::seed_from_u64(2);
        thunder.trigger(ms(0), &mut rng);
        assert!(thunder.update(ms(199), &mut rng).is_empty());
        let events = thunder.update(ms(200), &mut rng);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].state, ThunderState::FlashOff);
        assert_eq!(events[0].backdrop, Backdrop::Dark);
        assert_eq!(events[0].at, ms(200));
        assert_eq!(thunder.backdrop(), Backdrop::Dark);
    }

    #[test]
    fn test_single_flash_when_roll_fails() {
        // StepRng yielding u32::MAX gives gen::<f32>() just below 1.0: never below 0.3
        let mut rng = StepRng::new(u32::MAX as u64, 0);
        let mut thunder = ThunderTrigger::default();
        thunder.trigger(ms(0), &mut rng);
        let events = thunder.update(ms(10_000), &mut rng);
        assert_eq!(events.len(), 1);
        assert_eq!(thunder.state(), ThunderState::Idle);
    }

    #[test]
    fn test_double_flash_when_roll_succeeds() {
        // Zero rolls always take the second-flash branch
        let mut rng = StepRng::new(0, 0);
        let mut thunder = ThunderTrigger::default();
        let first = thunder.trigger(ms(0), &mut rng);
        // Zero roll is floored to the minimum volume
        assert_eq!(first.cue.unwrap().volume, 0.5);

        let events = thunder.update(ms(200), &mut rng);
        assert_eq!(events.len(), 1);
        assert_eq!(thunder.state(), ThunderState::FlashOff);

        let events = thunder.update(ms(400), &mut rng);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].state, ThunderState::FlashOn2);
        assert_eq!(events[0].backdrop, Backdrop::Bright);
        assert!(events[0].cue.is_some());

        let events = thunder.update(ms(600), &mut rng);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].state, ThunderState::FlashOff2);
        assert_eq!(thunder.state(), ThunderState::Idle);
        assert_eq!(thunder.backdrop(), Backdrop::Dark);
    }

    #[test]
    fn test_late_update_replays_all_transitions() {
        let mut rng = StepRng::new(0, 0);
        let mut thunder = ThunderTrigger::default();
        thunder.trigger(ms(0), &mut rng);
        let events = thunder.update(ms(5_000), &mut rng);
        let states: Vec<_> = events.iter().map(|e| e.state).collect();
        assert_eq!(states, vec![ThunderState::FlashOff, ThunderState::FlashOn2, ThunderState::FlashOff2]);
        let times: Vec<_> = events.iter().map(|e| e.at).collect();
        assert_eq!(times, vec![ms(200), ms(400), ms(600)]);
    }

    #[test]
    fn test_second_flash_frequency() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut doubles = 0;
        for trial in 0..1000u64 {
            let mut thunder = ThunderTrigger::default();
            let start = ms(trial * 10);
            thunder.trigger(start, &mut rng);
            let events = thunder.update(start + ms(1000), &mut rng);
            if events.len() == 3 {
                doubles += 1;
            } else {
                assert_eq!(events.len(), 1);
            }
        }
        assert!((240..=360).contains(&doubles), "second flash fired {} / 1000 times", doubles);
    }

    #[test]
    fn test_retrigger_restarts() {
        let mut rng = StepRng::new(0, 0);
        let mut thunder = ThunderTrigger::default();
        thunder.trigger(ms(0), &mut rng);
        thunder.update(ms(250), &mut rng);
        assert_eq!(thunder.state(), ThunderState::FlashOff);
        let event = thunder.trigger(ms(300), &mut rng);
        assert_eq!(event.state, ThunderState::FlashOn);
        assert!(thunder.update(ms(499), &mut rng).is_empty());
        assert_eq!(thunder.update(ms(500), &mut rng)[0].state, ThunderState::FlashOff);
    }

    #[test]
    fn test_manual_only_never_strikes() {
        let mut rng = StepRng::new(0, 0);
        let mut thunder = ThunderTrigger::default();
        assert!(thunder.maybe_strike(ms(0), 1.0, &mut rng).is_none());
    }

    #[test]
    fn test_auto_strike() {
        let config = ThunderConfig {
            strikes_per_minute: 60.0,
            ..ThunderConfig::default()
        };
        let mut thunder = ThunderTrigger::new(config);
        // A zero roll is below any positive chance
        let mut rng = StepRng::new(0, 0);
        let event = thunder.maybe_strike(ms(0), 1.0 / 60.0, &mut rng).unwrap();
        assert_eq!(event.state, ThunderState::FlashOn);
        // Busy: no second strike until the sequence ends
        assert!(thunder.maybe_strike(ms(16), 1.0 / 60.0, &mut rng).is_none());
    }

    #[test]
    fn test_config_colors_and_validation() {
        let config = ThunderConfig::default();
        assert_eq!(config.color(Backdrop::Bright), Vec3::ONE);
        assert_eq!(config.color(Backdrop::Dark), Vec3::ZERO);
        assert!(config.validate().is_ok());
        let bad = ThunderConfig {
            second_flash_chance: 1.5,
            ..ThunderConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}

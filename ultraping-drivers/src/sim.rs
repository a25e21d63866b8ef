//! Simulated sensor platform for driver tests
//!
//! A virtual microsecond clock plus a scripted sensor. Each falling edge
//! on the trigger pin pops the next scripted echo and schedules its
//! active interval relative to the edge. The clock advances by 1us per
//! `now_micros` call and by the exact amount of every delay; pin reads
//! are free.

use std::collections::VecDeque;
use std::vec::Vec;

use ultraping_hal::{Clock, Delay, DigitalIo, Level, PeriodicTimer, Pin, PinMode};

/// Scripted sensor response to one trigger pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Echo {
    /// Sensor never raises the echo line
    Silent,
    /// Echo line active for `duration_us`, starting `delay_us` after the trigger
    Pulse { delay_us: u32, duration_us: u32 },
}

impl Echo {
    pub(crate) const fn pulse(delay_us: u32, duration_us: u32) -> Self {
        Echo::Pulse {
            delay_us,
            duration_us,
        }
    }
}

/// Recorded pin activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SimEvent {
    Mode(Pin, PinMode),
    /// Pin, level, time of the write
    Write(Pin, Level, u64),
    /// Time of the read
    Read(u64),
}

pub(crate) struct SimPlatform {
    trigger: Pin,
    echo: Pin,
    now: u64,
    trigger_level: Level,
    script: VecDeque<Echo>,
    /// Scheduled active intervals `[start, end)`
    echoes: Vec<(u64, u64)>,
    /// Echo line forced active until this time
    held_until: u64,
    /// Echo line polarity (false for active-low sensors)
    pub active_high: bool,
    /// Time of every trigger falling edge
    pub triggers: Vec<u64>,
    pub log: Vec<SimEvent>,
}

impl SimPlatform {
    pub(crate) fn new(trigger: Pin, echo: Pin, script: &[Echo]) -> Self {
        Self {
            trigger,
            echo,
            now: 1_000,
            trigger_level: Level::Low,
            script: script.iter().copied().collect(),
            echoes: Vec::new(),
            held_until: 0,
            active_high: true,
            triggers: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Current virtual time, without advancing the clock
    pub(crate) fn now(&self) -> u64 {
        self.now
    }

    /// Let time pass
    pub(crate) fn advance(&mut self, us: u64) {
        self.now += us;
    }

    /// Append an echo to the script
    pub(crate) fn push_echo(&mut self, echo: Echo) {
        self.script.push_back(echo);
    }

    /// Force the echo line active until `until` (absolute time)
    pub(crate) fn hold_echo_active(&mut self, until: u64) {
        self.held_until = until;
    }

    fn echo_active(&self) -> bool {
        self.now < self.held_until
            || self
                .echoes
                .iter()
                .any(|&(start, end)| start <= self.now && self.now < end)
    }

    fn on_trigger_fall(&mut self) {
        self.triggers.push(self.now);
        if let Some(Echo::Pulse {
            delay_us,
            duration_us,
        }) = self.script.pop_front()
        {
            let start = self.now + delay_us as u64;
            self.echoes.push((start, start + duration_us as u64));
        }
    }
}

impl DigitalIo for SimPlatform {
    fn read_digital_input(&mut self, pin: Pin) -> bool {
        self.log.push(SimEvent::Read(self.now));
        if pin != self.echo {
            return false;
        }
        self.echo_active() == self.active_high
    }

    fn write_digital_output(&mut self, pin: Pin, level: Level) {
        self.log.push(SimEvent::Write(pin, level, self.now));
        if pin != self.trigger {
            return;
        }
        if self.trigger_level == Level::High && level == Level::Low {
            self.on_trigger_fall();
        }
        self.trigger_level = level;
    }

    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) {
        self.log.push(SimEvent::Mode(pin, mode));
    }
}

impl Clock for SimPlatform {
    fn now_micros(&mut self) -> u64 {
        let now = self.now;
        self.now += 1;
        now
    }
}

impl Delay for SimPlatform {
    fn delay_us(&mut self, us: u32) {
        self.now += us as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now += ms as u64 * 1000;
    }
}

/// Periodic timer that records what it was asked to do
#[derive(Default)]
pub(crate) struct MockTimer {
    scheduled: Option<(u32, fn())>,
    pub cancels: u32,
}

impl MockTimer {
    /// Interval of the active schedule
    pub(crate) fn interval_us(&self) -> Option<u32> {
        self.scheduled.map(|(interval, _)| interval)
    }
}

impl PeriodicTimer for MockTimer {
    fn schedule_periodic(&mut self, interval_us: u32, callback: fn()) {
        self.scheduled = Some((interval_us, callback));
    }

    fn cancel_periodic(&mut self) {
        self.scheduled = None;
        self.cancels += 1;
    }
}

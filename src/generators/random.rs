use crate::core::ChannelValue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Inclusive lower bound of the per-frame amplitude.
pub const AMPLITUDE_MIN: u32 = 100;
/// Exclusive upper bound of the per-frame amplitude.
pub const AMPLITUDE_MAX: u32 = 1000;
/// Integer channels are drawn without replacement from `[-amp, amp)`, so the
/// smallest amplitude caps how many can be drawn.
pub const MAX_INTEGER_CHANNELS: usize = 2 * AMPLITUDE_MIN as usize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomMode {
    /// Independent uniform floats in `[-amp, amp)`
    #[default]
    Float,
    /// Distinct integers in `[-amp, amp)`
    Integer,
}

/// Source of the non-deterministic channels.
pub struct RandomChannels {
    rng: fastrand::Rng,
    mode: RandomMode,
}

impl RandomChannels {
    pub fn new(mode: RandomMode, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self { rng, mode }
    }

    /// Draw the amplitude for one frame, in `[AMPLITUDE_MIN, AMPLITUDE_MAX)`.
    pub fn draw_amplitude(&mut self) -> u32 {
        self.rng.u32(AMPLITUDE_MIN..AMPLITUDE_MAX)
    }

    /// Produce `count` values bounded by `amp`. Zero yields an empty vec.
    ///
    /// In integer mode the values are distinct, so `count` must not exceed
    /// `2 * amp`.
    pub fn generate(&mut self, count: usize, amp: u32) -> Vec<ChannelValue> {
        match self.mode {
            RandomMode::Float => self.floats(count, amp),
            RandomMode::Integer => self.integers(count, amp),
        }
    }

    fn floats(&mut self, count: usize, amp: u32) -> Vec<ChannelValue> {
        let amp = amp as f64;
        (0..count)
            .map(|_| {
                // 2u - 1 lies in [-1, 1) exactly, so the product never reaches amp.
                let unit = 2.0 * self.rng.f64() - 1.0;
                ChannelValue::Float(amp * unit)
            })
            .collect()
    }

    fn integers(&mut self, count: usize, amp: u32) -> Vec<ChannelValue> {
        let amp = amp as i64;
        assert!(
            count <= (2 * amp) as usize,
            "cannot draw {} distinct integers from [-{}, {})",
            count,
            amp,
            amp
        );
        let mut seen = HashSet::with_capacity(count);
        let mut values = Vec::with_capacity(count);
        while values.len() < count {
            let v = self.rng.i64(-amp..amp);
            if seen.insert(v) {
                values.push(ChannelValue::Integer(v));
            }
        }
        values
    }
}

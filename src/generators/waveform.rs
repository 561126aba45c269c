use serde::{Deserialize, Serialize};

/// Period of every special pattern, in frames.
pub const PATTERN_LEN: u64 = 500;

const PEAK: f64 = 1000.0;
const HALF: u64 = PATTERN_LEN / 2;

/// Deterministic test waveforms emitted ahead of the random channels.
///
/// Each pattern is a pure function of the frame index and repeats every
/// [`PATTERN_LEN`] frames, so the shapes stay stable regardless of pacing or
/// dropped ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// 0 → 1000 over one period
    RampUp,
    /// 1000 for the first half, 0 for the second
    StepHigh,
    /// 1000 → 0 over one period
    RampDown,
    /// -1000 for the first half, 1000 for the second
    StepInverted,
}

impl Waveform {
    /// Catalog order is the channel order on the wire.
    pub const CATALOG: [Waveform; 4] = [
        Waveform::RampUp,
        Waveform::StepHigh,
        Waveform::RampDown,
        Waveform::StepInverted,
    ];

    pub fn value_at(self, idx: u64) -> f64 {
        let pos = idx % PATTERN_LEN;
        let step = PEAK / PATTERN_LEN as f64;
        match self {
            Self::RampUp => pos as f64 * step,
            Self::StepHigh => {
                if pos < HALF {
                    PEAK
                } else {
                    0.0
                }
            }
            Self::RampDown => PEAK - pos as f64 * step,
            Self::StepInverted => {
                if pos < HALF {
                    -PEAK
                } else {
                    PEAK
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RampUp => "ramp_up",
            Self::StepHigh => "step_high",
            Self::RampDown => "ramp_down",
            Self::StepInverted => "step_inverted",
        }
    }
}

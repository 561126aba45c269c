pub mod random;
pub mod waveform;

pub use random::{RandomChannels, RandomMode, AMPLITUDE_MAX, AMPLITUDE_MIN, MAX_INTEGER_CHANNELS};
pub use waveform::{Waveform, PATTERN_LEN};

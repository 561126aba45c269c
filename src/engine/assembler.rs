use crate::config::validate_channels;
use crate::core::{ChannelValue, Frame};
use crate::error::Result;
use crate::generators::{RandomChannels, RandomMode, Waveform};

/// Builds frames of exactly `channels` values: the special catalog sampled at
/// the frame index, followed by freshly drawn random channels.
pub struct FrameAssembler {
    channels: usize,
    random: RandomChannels,
}

impl FrameAssembler {
    pub fn new(channels: usize, mode: RandomMode, seed: Option<u64>) -> Result<Self> {
        validate_channels(channels, mode)?;
        Ok(Self {
            channels,
            random: RandomChannels::new(mode, seed),
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of random values drawn per frame.
    pub fn random_count(&self) -> usize {
        self.channels - Waveform::CATALOG.len()
    }

    pub fn assemble(&mut self, idx: u64) -> Frame {
        let amp = self.random.draw_amplitude();
        let random_count = self.random_count();

        let mut values = Vec::with_capacity(self.channels);
        values.extend(
            Waveform::CATALOG
                .iter()
                .map(|w| ChannelValue::Float(w.value_at(idx))),
        );
        values.extend(self.random.generate(random_count, amp));

        Frame::new(idx, amp, values)
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between values on the wire.
pub const DELIM: &str = ", ";

/// A single channel sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChannelValue {
    Float(f64),
    Integer(i64),
}

impl ChannelValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Float(v) => v,
            Self::Integer(v) => v as f64,
        }
    }
}

impl fmt::Display for ChannelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Debug keeps the shortest round-trip form and always prints a
            // fractional part, so 1000 renders as `1000.0`.
            Self::Float(v) => write!(f, "{:?}", v),
            Self::Integer(v) => write!(f, "{}", v),
        }
    }
}

/// One time sample across every channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Tick index this frame was assembled at
    pub index: u64,

    /// Amplitude bound used for the random channels
    pub amplitude: u32,

    /// Special channels first (catalog order), then random channels
    pub values: Vec<ChannelValue>,
}

impl Frame {
    pub fn new(index: u64, amplitude: u32, values: Vec<ChannelValue>) -> Self {
        Self {
            index,
            amplitude,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render as a newline-terminated wire line: `a, b, c\n`.
    pub fn to_line(&self) -> String {
        let mut line = self
            .values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(DELIM);
        line.push('\n');
        line
    }
}

pub mod frame;

pub use frame::{ChannelValue, Frame};

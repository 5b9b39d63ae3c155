mod audio;

pub use audio::{ChannelBuffer, SampleRate};

//! Streaming of DV (IEC 61834 / DIF block) video to an isochronous transmitter.
//!
//! [`driver::PacketSource`] is the pull-callback entry point: the transmitter
//! asks for one 480-byte packet at a time and playback commands (pause, seek)
//! are applied only at frame boundaries.

pub mod audio;
pub mod dif;
pub mod driver;
pub mod error;
pub mod frame;
pub mod playback;
pub mod scan;
pub mod source;
pub mod timecode;
pub mod transport;
pub mod version;

//! Interface to the isochronous transmitter that consumes packets.
//!
//! The transmitter owns timing: it decides when a packet slot is free and
//! pulls one packet per slot through a [`PullCallback`].

use std::io;
use std::time::Duration;

/// Status returned by a pull callback when a packet was delivered.
pub const PULL_OK: i32 = 0;
/// Status returned by a pull callback when the stream cannot continue.
pub const PULL_STOP: i32 = -1;

/// `(buffer, requested, dropped, context) -> status`.
///
/// `requested` is the number of packets wanted in this call, `dropped` the
/// number of slots the transmitter skipped since the previous call. A negative
/// status stops transmission.
pub type PullCallback<C> = fn(&mut [u8], i32, u32, &mut C) -> i32;

/// Outcome of one transmitter iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    /// All due packets were sent.
    Continue,
    /// The callback returned the given negative status.
    Stopped(i32),
}

/// A packet sink that pulls packets on its own schedule.
pub trait Transmitter {
    /// Wait up to `timeout` for at least one packet slot to become free.
    fn poll_ready(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Fill every free packet slot by invoking `callback` with `context`.
    fn iterate<C>(&mut self, callback: PullCallback<C>, context: &mut C) -> io::Result<Iteration>;
}

//! Paced packet writer standing in for an isochronous transmitter.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use dv::dif::{PACKET_SIZE, VideoStandard};
use dv::transport::{Iteration, PullCallback, Transmitter};

/// Number of packet slots due `elapsed` after the first slot at `rate` packets/s.
///
/// The first slot is due immediately.
pub fn packets_due(elapsed: Duration, rate: f64) -> u64 {
    (elapsed.as_secs_f64() * rate) as u64 + 1
}

/// Writes packets to `W` at the nominal DV packet rate of a video standard.
pub struct PacedSink<W: Write> {
    writer: W,
    rate: f64,
    max_burst: u32,
    start: Option<Instant>,
    /// Slots consumed so far, sent or dropped.
    slots: u64,
    /// Slots skipped since the last callback.
    dropped: u32,
    packet: [u8; PACKET_SIZE],
}

impl<W: Write> PacedSink<W> {
    pub fn new(writer: W, standard: VideoStandard, max_burst: u32) -> Self {
        Self {
            writer,
            rate: standard.packets_per_second(),
            max_burst: max_burst.max(1),
            start: None,
            slots: 0,
            dropped: 0,
            packet: [0u8; PACKET_SIZE],
        }
    }

    /// Start the schedule at `start` instead of at the first poll.
    #[cfg(test)]
    pub fn with_start(mut self, start: Instant) -> Self {
        self.start = Some(start);
        self
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    fn elapsed(&mut self) -> Duration {
        self.start.get_or_insert_with(Instant::now).elapsed()
    }

    fn due(&mut self) -> u64 {
        let elapsed = self.elapsed();
        packets_due(elapsed, self.rate).saturating_sub(self.slots)
    }

    /// Time until slot `self.slots` opens.
    fn until_next_slot(&mut self) -> Duration {
        let at = Duration::from_secs_f64(self.slots as f64 / self.rate);
        at.saturating_sub(self.elapsed())
    }
}

impl<W: Write> Transmitter for PacedSink<W> {
    fn poll_ready(&mut self, timeout: Duration) -> io::Result<bool> {
        if self.due() > 0 {
            return Ok(true);
        }
        let wait = self.until_next_slot().min(timeout);
        std::thread::sleep(wait);
        Ok(self.due() > 0)
    }

    fn iterate<C>(&mut self, callback: PullCallback<C>, context: &mut C) -> io::Result<Iteration> {
        let mut due = self.due();
        if due > self.max_burst as u64 {
            let skipped = due - self.max_burst as u64;
            self.slots += skipped;
            self.dropped = self.dropped.saturating_add(skipped.min(u32::MAX as u64) as u32);
            due = self.max_burst as u64;
        }

        for _ in 0..due {
            let status = callback(&mut self.packet, 1, self.dropped, context);
            self.dropped = 0;
            self.slots += 1;
            if status < 0 {
                self.writer.flush()?;
                return Ok(Iteration::Stopped(status));
            }
            self.writer.write_all(&self.packet)?;
        }
        self.writer.flush()?;
        Ok(Iteration::Continue)
    }
}

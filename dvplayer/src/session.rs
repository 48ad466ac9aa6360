use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};

use dv::driver::{PacketSource, read_packet};
use dv::error::{DvError, Result};
use dv::playback::Applied;
use dv::source::FrameSource;
use dv::transport::{Iteration, Transmitter};

use crate::config::SessionConfig;
use crate::display::StatusDisplay;
use crate::input::Command;

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    EndOfStream,
    Interrupted,
    Quit,
}

/// Drive `sink` from `source` until the stream ends, a quit command arrives
/// or `interrupted` is set.
pub fn run_session<S, T, W>(
    source: &mut PacketSource<S>,
    sink: &mut T,
    commands: &Receiver<Command>,
    interrupted: &AtomicBool,
    config: &SessionConfig,
    display: &mut StatusDisplay<W>,
) -> Result<SessionEnd>
where
    S: FrameSource,
    T: Transmitter,
    W: Write,
{
    loop {
        if interrupted.load(Ordering::SeqCst) {
            return Ok(SessionEnd::Interrupted);
        }

        let outcome = match sink.poll_ready(config.poll_interval) {
            Ok(true) => sink.iterate(read_packet::<S>, source),
            Ok(false) => Ok(Iteration::Continue),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(Iteration::Continue) => {}
            Ok(Iteration::Stopped(status)) => {
                return match source.take_error() {
                    Some(e) if e.is_end_of_stream() => Ok(SessionEnd::EndOfStream),
                    Some(e) => Err(e),
                    None => Err(DvError::Io(std::io::Error::other(format!(
                        "transmission stopped with status {status}"
                    )))),
                };
            }
            // A closed output raises SIGPIPE before the write fails
            Err(_) if interrupted.load(Ordering::SeqCst) => return Ok(SessionEnd::Interrupted),
            Err(e) => return Err(e.into()),
        }

        loop {
            match commands.try_recv() {
                Ok(Command::Quit) => return Ok(SessionEnd::Quit),
                Ok(Command::Intent(intent)) => {
                    if let Err(e) = source.post(intent) {
                        log::warn!("{e}");
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        for applied in source.drain_applied() {
            match applied {
                Applied::Pause(true) => log::info!("Paused"),
                Applied::Pause(false) => log::info!("Resumed"),
                Applied::Seek { frame, .. } => log::info!("Seek to frame {frame}"),
            }
        }

        if let Err(e) = display.update(&source.snapshot()) {
            log::debug!("Status display failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dv::dif::{FRAME_SIZE_NTSC, PACKET_SIZE};
    use dv::playback::Intent;
    use dv::source::Unseekable;
    use dv::transport::PullCallback;
    use std::io::{self, Cursor};
    use std::sync::mpsc;
    use std::time::Duration;

    /// Transmitter that is always ready and pulls a fixed number of packets.
    struct Immediate {
        per_iteration: usize,
        pulled: usize,
    }

    impl Transmitter for Immediate {
        fn poll_ready(&mut self, _timeout: Duration) -> io::Result<bool> {
            Ok(true)
        }

        fn iterate<C>(&mut self, callback: PullCallback<C>, context: &mut C) -> io::Result<Iteration> {
            let mut buf = [0u8; PACKET_SIZE];
            for _ in 0..self.per_iteration {
                let status = callback(&mut buf, 1, 0, context);
                if status < 0 {
                    return Ok(Iteration::Stopped(status));
                }
                self.pulled += 1;
            }
            Ok(Iteration::Continue)
        }
    }

    fn ntsc_frames(count: usize) -> Vec<u8> {
        vec![0u8; FRAME_SIZE_NTSC * count]
    }

    fn run<S: FrameSource>(
        source: &mut PacketSource<S>,
        sink: &mut Immediate,
        commands: &Receiver<Command>,
        interrupted: &AtomicBool,
    ) -> Result<SessionEnd> {
        let mut display = StatusDisplay::<io::Sink>::off();
        run_session(
            source,
            sink,
            commands,
            interrupted,
            &SessionConfig::default(),
            &mut display,
        )
    }

    #[test]
    fn test_plays_to_end_of_stream() {
        let mut source = PacketSource::open(Cursor::new(ntsc_frames(3))).unwrap();
        let mut sink = Immediate {
            per_iteration: 100,
            pulled: 0,
        };
        let (_tx, rx) = mpsc::channel();
        let end = run(&mut source, &mut sink, &rx, &AtomicBool::new(false)).unwrap();
        assert_eq!(end, SessionEnd::EndOfStream);
        assert_eq!(sink.pulled, 3 * 250);
    }

    #[test]
    fn test_interrupted_before_first_pull() {
        let mut source = PacketSource::open(Cursor::new(ntsc_frames(3))).unwrap();
        let mut sink = Immediate {
            per_iteration: 100,
            pulled: 0,
        };
        let (_tx, rx) = mpsc::channel();
        let end = run(&mut source, &mut sink, &rx, &AtomicBool::new(true)).unwrap();
        assert_eq!(end, SessionEnd::Interrupted);
        assert_eq!(sink.pulled, 0);
    }

    #[test]
    fn test_commands_reach_controller_before_quit() {
        let mut source = PacketSource::open(Cursor::new(ntsc_frames(3))).unwrap();
        let mut sink = Immediate {
            per_iteration: 10,
            pulled: 0,
        };
        let (tx, rx) = mpsc::channel();
        tx.send(Command::Intent(Intent::TogglePause)).unwrap();
        tx.send(Command::Intent(Intent::Seek(5))).unwrap();
        tx.send(Command::Quit).unwrap();

        let end = run(&mut source, &mut sink, &rx, &AtomicBool::new(false)).unwrap();
        assert_eq!(end, SessionEnd::Quit);
        assert_eq!(sink.pulled, 10);
        assert_eq!(source.controller().pending_pause(), Some(true));
        assert_eq!(source.controller().pending_seek(), Some(5));
    }

    #[test]
    fn test_refused_seek_does_not_end_session() {
        let mut source = PacketSource::open(Unseekable(Cursor::new(ntsc_frames(2)))).unwrap();
        let mut sink = Immediate {
            per_iteration: 1,
            pulled: 0,
        };
        let (tx, rx) = mpsc::channel();
        tx.send(Command::Intent(Intent::Seek(1))).unwrap();
        drop(tx);

        let end = run(&mut source, &mut sink, &rx, &AtomicBool::new(false)).unwrap();
        assert_eq!(end, SessionEnd::EndOfStream);
        assert_eq!(sink.pulled, 2 * 250);
    }
}

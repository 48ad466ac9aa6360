//! Single-key commands read from the controlling terminal.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::sync::mpsc;

use dv::playback::Intent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Left,
    Right,
}

pub const HELP: &str =
    "Keys: p pause/resume, f/r forward/rewind, Right/n next frame, Left/b previous frame, q quit";

/// Map a key press to a command. Unbound keys yield `None`.
pub fn command_for_key(key: Key, seek_step: i64) -> Option<Command> {
    let command = match key {
        Key::Right => Command::Intent(Intent::Seek(1)),
        Key::Left => Command::Intent(Intent::Seek(-1)),
        Key::Char(c) => match c.to_ascii_lowercase() {
            'p' => Command::Intent(Intent::TogglePause),
            'f' => Command::Intent(Intent::Seek(seek_step)),
            'r' => Command::Intent(Intent::Seek(-seek_step)),
            'n' | '.' => Command::Intent(Intent::Seek(1)),
            'b' | ',' => Command::Intent(Intent::Seek(-1)),
            'q' => Command::Quit,
            _ => return None,
        },
    };
    Some(command)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Escape {
    #[default]
    None,
    /// Got ESC
    Esc,
    /// Got ESC [ or ESC O
    Sequence,
}

/// Splits raw terminal bytes into keys, recognising the arrow key sequences.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    state: Escape,
}

impl KeyDecoder {
    pub fn push(&mut self, byte: u8) -> Option<Key> {
        match (self.state, byte) {
            (Escape::None, 0x1B) => {
                self.state = Escape::Esc;
                None
            }
            (Escape::None, _) => Some(Key::Char(byte as char)),
            (Escape::Esc, b'[' | b'O') => {
                self.state = Escape::Sequence;
                None
            }
            (Escape::Esc, 0x1B) => None,
            (Escape::Esc, _) => {
                self.state = Escape::None;
                Some(Key::Char(byte as char))
            }
            // Parameters such as the modifier in ESC [ 1 ; 5 C
            (Escape::Sequence, b'0'..=b'9' | b';') => None,
            (Escape::Sequence, _) => {
                self.state = Escape::None;
                match byte {
                    b'C' => Some(Key::Right),
                    b'D' => Some(Key::Left),
                    _ => None,
                }
            }
        }
    }
}

/// The controlling terminal switched to unbuffered, no-echo input.
///
/// The previous settings are restored on drop. Signal keys (Ctrl+C) keep
/// working.
pub struct Terminal {
    tty: File,
    #[cfg(unix)]
    saved: libc::termios,
}

impl Terminal {
    pub fn open() -> io::Result<Self> {
        let tty = OpenOptions::new().read(true).write(true).open("/dev/tty")?;
        #[cfg(unix)]
        let saved = enter_raw_mode(&tty)?;
        Ok(Self {
            tty,
            #[cfg(unix)]
            saved,
        })
    }

    /// A separate handle for the reader thread.
    pub fn reader(&self) -> io::Result<File> {
        self.tty.try_clone()
    }
}

#[cfg(unix)]
fn enter_raw_mode(tty: &File) -> io::Result<libc::termios> {
    use std::os::fd::AsRawFd;

    let fd = tty.as_raw_fd();
    unsafe {
        let mut saved: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut saved) != 0 {
            return Err(io::Error::last_os_error());
        }
        let mut raw = saved;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO);
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        if libc::tcsetattr(fd, libc::TCSANOW, &raw) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(saved)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        #[cfg(unix)]
        unsafe {
            use std::os::fd::AsRawFd;
            libc::tcsetattr(self.tty.as_raw_fd(), libc::TCSANOW, &self.saved);
        }
    }
}

/// Forward commands for keys read from `reader` until it ends or the receiver is gone.
pub fn spawn_reader<R: Read + Send + 'static>(
    reader: R,
    seek_step: i64,
    tx: mpsc::Sender<Command>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut decoder = KeyDecoder::default();
        for byte in reader.bytes() {
            let Ok(byte) = byte else {
                break;
            };
            if let Some(command) = decoder
                .push(byte)
                .and_then(|key| command_for_key(key, seek_step))
                && tx.send(command).is_err()
            {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn keys(bytes: &[u8]) -> Vec<Key> {
        let mut decoder = KeyDecoder::default();
        bytes.iter().filter_map(|&b| decoder.push(b)).collect()
    }

    #[test]
    fn test_key_bindings() {
        let seek = |d| Some(Command::Intent(Intent::Seek(d)));
        assert_eq!(command_for_key(Key::Char('p'), 50), Some(Command::Intent(Intent::TogglePause)));
        assert_eq!(command_for_key(Key::Char('f'), 50), seek(50));
        assert_eq!(command_for_key(Key::Char('R'), 25), seek(-25));
        assert_eq!(command_for_key(Key::Right, 50), seek(1));
        assert_eq!(command_for_key(Key::Left, 50), seek(-1));
        assert_eq!(command_for_key(Key::Char('.'), 50), seek(1));
        assert_eq!(command_for_key(Key::Char(','), 50), seek(-1));
        assert_eq!(command_for_key(Key::Char('q'), 50), Some(Command::Quit));
        assert_eq!(command_for_key(Key::Char('x'), 50), None);
        assert_eq!(command_for_key(Key::Char('\n'), 50), None);
    }

    #[test]
    fn test_decoder_arrow_sequences() {
        assert_eq!(
            keys(b"p\x1b[C\x1b[Dq"),
            vec![Key::Char('p'), Key::Right, Key::Left, Key::Char('q')]
        );
        // Application cursor mode and modified arrows
        assert_eq!(keys(b"\x1bOC\x1b[1;5D"), vec![Key::Right, Key::Left]);
        // Up/down are swallowed without leaking their final byte
        assert_eq!(keys(b"\x1b[A\x1b[Bf"), vec![Key::Char('f')]);
    }

    #[test]
    fn test_reader_thread_forwards_commands() {
        let (tx, rx) = mpsc::channel();
        let input = Cursor::new(b"px\x1b[Cq".to_vec());
        spawn_reader(input, 50, tx).join().unwrap();

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                Command::Intent(Intent::TogglePause),
                Command::Intent(Intent::Seek(1)),
                Command::Quit,
            ]
        );
    }
}

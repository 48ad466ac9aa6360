use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom, StdinLock};
use std::path::Path;

use flate2::read::GzDecoder;

/// A byte source frames are read from.
///
/// Frame Store and Playback Controller only need "fill this buffer" and
/// "move by a signed number of bytes", so they can be driven from a file, a
/// pipe or an in-memory buffer alike.
pub trait FrameSource {
    /// Read until `buf` is full or the source is exhausted, returning the number of bytes read.
    fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Move the read position by `offset` bytes relative to the current position.
    fn seek_relative(&mut self, offset: i64) -> io::Result<()>;

    /// Whether [`FrameSource::seek_relative`] is supported.
    fn is_seekable(&self) -> bool;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_full(buf)
    }

    fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
        (**self).seek_relative(offset)
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }
}

/// Fill `buf` from `reader`, stopping early only at EOF.
pub fn fill<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl<T: AsRef<[u8]>> FrameSource for Cursor<T> {
    fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        fill(self, buf)
    }

    fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
        self.seek(SeekFrom::Current(offset)).map(|_| ())
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// Adapter presenting any reader as a non-seekable source (e.g. a pipe).
pub struct Unseekable<R>(pub R);

impl<R: Read> FrameSource for Unseekable<R> {
    fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        fill(&mut self.0, buf)
    }

    fn seek_relative(&mut self, _offset: i64) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "source is not seekable",
        ))
    }

    fn is_seekable(&self) -> bool {
        false
    }
}

/// A reader over plain `.dv` files, gzip-compressed `.dv.gz` files or stdin.
pub enum DvReader {
    File(BufReader<File>),
    Memory(Cursor<Vec<u8>>),
    Stdin(StdinLock<'static>),
}

impl Read for DvReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            DvReader::File(r) => r.read(buf),
            DvReader::Memory(r) => r.read(buf),
            DvReader::Stdin(r) => r.read(buf),
        }
    }
}

impl FrameSource for DvReader {
    fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        fill(self, buf)
    }

    fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
        match self {
            // Keeps the buffer when the target is still inside it
            DvReader::File(r) => r.seek_relative(offset),
            DvReader::Memory(r) => r.seek(SeekFrom::Current(offset)).map(|_| ()),
            DvReader::Stdin(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "cannot seek on stdin",
            )),
        }
    }

    fn is_seekable(&self) -> bool {
        !matches!(self, DvReader::Stdin(_))
    }
}

/// Open a DV stream: `-` for stdin, `.gz` files are decompressed into memory.
///
/// Decompressing fully keeps gzip fixtures seekable; production playback reads
/// plain files or pipes.
pub fn open_dv(path: &Path) -> io::Result<DvReader> {
    if path.as_os_str() == "-" {
        return Ok(DvReader::Stdin(io::stdin().lock()));
    }

    let is_gz = path
        .to_str()
        .map(|s| s.ends_with(".gz"))
        .unwrap_or(false);

    let file = File::open(path)?;
    if is_gz {
        let mut decoder = GzDecoder::new(file);
        let mut buf = Vec::new();
        decoder.read_to_end(&mut buf)?;
        Ok(DvReader::Memory(Cursor::new(buf)))
    } else {
        Ok(DvReader::File(BufReader::new(file)))
    }
}

//! Streaming line splitter.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::ScanConfig;
use crate::domain::{ForecastError, LineDescriptor};

/// A line found by the splitter, with up to `max_prefix_len` leading bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub descriptor: LineDescriptor,
    pub prefix: Vec<u8>,
}

/// What the splitter produced next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitEvent {
    /// `offset` bytes of `size` have been read.
    Progress { offset: u64, size: u64 },
    Line(RawLine),
}

/// Splits a byte stream into lines without holding more than one read
/// buffer and one line prefix in memory.
///
/// Reads are not line-aligned: a read may end inside a line or contain many
/// line ends. The sequence is forward-only; once the end of the stream (or a
/// read error) is reached the reader is dropped and no further lines are
/// produced.
pub struct LineSplitter<R> {
    reader: Option<R>,
    buf: Box<[u8]>,
    /// Next unscanned byte in `buf`.
    pos: usize,
    /// Number of valid bytes in `buf`.
    filled: usize,
    /// File offset of `buf[0]`.
    chunk_start: u64,
    /// Total bytes read from the stream.
    offset: u64,
    line_start: u64,
    prefix: Vec<u8>,
    max_prefix_len: usize,
    size: u64,
    progress_step: u64,
    last_progress: u64,
}

impl<R: AsyncRead + Unpin> LineSplitter<R> {
    /// Create a splitter over `reader`, which yields `size` bytes in total.
    pub fn new(reader: R, size: u64, config: &ScanConfig) -> Self {
        Self {
            reader: Some(reader),
            buf: vec![0; config.read_chunk_size.max(1)].into_boxed_slice(),
            pos: 0,
            filled: 0,
            chunk_start: 0,
            offset: 0,
            line_start: 0,
            prefix: Vec::with_capacity(config.max_prefix_len),
            max_prefix_len: config.max_prefix_len,
            size,
            progress_step: config.file_progress_step,
            last_progress: 0,
        }
    }

    /// Produce the next line or progress report; `None` once exhausted.
    pub async fn next_event(&mut self) -> Result<Option<SplitEvent>, ForecastError> {
        loop {
            if self.pos < self.filled {
                let rest = &self.buf[self.pos..self.filled];
                let newline = rest.iter().position(|&b| b == b'\n');
                let line_bytes = newline.unwrap_or(rest.len());
                let take = line_bytes.min(self.max_prefix_len - self.prefix.len());
                self.prefix.extend_from_slice(&rest[..take]);

                if let Some(i) = newline {
                    let end = self.chunk_start + (self.pos + i) as u64;
                    self.pos += i + 1;
                    return Ok(Some(SplitEvent::Line(self.take_line(end))));
                }
                self.pos = self.filled;
            }

            let Some(reader) = self.reader.as_mut() else {
                return Ok(None);
            };
            let n = match reader.read(&mut self.buf).await {
                Ok(n) => n,
                Err(err) => {
                    self.reader = None;
                    return Err(err.into());
                }
            };

            if n == 0 {
                self.reader = None;
                if self.offset > self.line_start {
                    let end = self.offset;
                    return Ok(Some(SplitEvent::Line(self.take_line(end))));
                }
                return Ok(None);
            }

            self.chunk_start = self.offset;
            self.offset += n as u64;
            self.pos = 0;
            self.filled = n;

            if self.offset - self.last_progress >= self.progress_step {
                self.last_progress = self.offset;
                return Ok(Some(SplitEvent::Progress {
                    offset: self.offset,
                    size: self.size,
                }));
            }
        }
    }

    fn take_line(&mut self, end: u64) -> RawLine {
        let descriptor = LineDescriptor::new(self.line_start, end);
        self.line_start = end + 1;
        RawLine {
            descriptor,
            prefix: std::mem::take(&mut self.prefix),
        }
    }
}

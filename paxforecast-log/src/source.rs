//! Byte sources: the files (or buffers) forecast logs are read from.
//!
//! A source is read twice: once sequentially while building the line index,
//! then by byte range whenever a single line is parsed.

use std::future::Future;
use std::io::{self, Cursor, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, Take};

/// Random-access byte source of known size.
pub trait ByteSource: Send + Sync {
    type Reader: AsyncRead + Unpin + Send;

    /// Total size in bytes.
    fn size(&self) -> u64;

    /// A reader over the whole source, from the first byte.
    fn stream(&self) -> impl Future<Output = io::Result<Self::Reader>> + Send;

    /// A reader over `[begin, end)`.
    fn slice(&self, begin: u64, end: u64) -> impl Future<Output = io::Result<Self::Reader>> + Send;
}

/// A log file on disk.
///
/// Every read opens its own handle, so readers never share a file position.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    size: u64,
}

impl FileSource {
    /// Open the file at `path`, recording its current size.
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(Self {
            path,
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    type Reader = Take<File>;

    fn size(&self) -> u64 {
        self.size
    }

    async fn stream(&self) -> io::Result<Self::Reader> {
        let file = File::open(&self.path).await?;
        Ok(file.take(self.size))
    }

    async fn slice(&self, begin: u64, end: u64) -> io::Result<Self::Reader> {
        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::Start(begin)).await?;
        Ok(file.take(end.saturating_sub(begin)))
    }
}

/// An in-memory source, for embedding and tests.
#[derive(Debug, Clone)]
pub struct MemorySource {
    bytes: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            bytes: bytes.into(),
        }
    }

    fn reader(&self, begin: u64, end: u64) -> Take<Cursor<Arc<[u8]>>> {
        let size = self.size();
        let begin = begin.min(size);
        let end = end.clamp(begin, size);
        let mut cursor = Cursor::new(Arc::clone(&self.bytes));
        cursor.set_position(begin);
        cursor.take(end - begin)
    }
}

impl ByteSource for MemorySource {
    type Reader = Take<Cursor<Arc<[u8]>>>;

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    async fn stream(&self) -> io::Result<Self::Reader> {
        Ok(self.reader(0, self.size()))
    }

    async fn slice(&self, begin: u64, end: u64) -> io::Result<Self::Reader> {
        Ok(self.reader(begin, end))
    }
}

//! Line indexing: splitting a byte stream into lines and peeking at each
//! line's leading bytes.

mod index;
mod prefix_time;
mod splitter;

pub use index::index_lines;
pub use prefix_time::extract_system_time;
pub use splitter::{LineSplitter, RawLine, SplitEvent};

//! Building the line index of a source.

use tracing::debug;

use super::{LineSplitter, SplitEvent, extract_system_time};
use crate::config::ScanConfig;
use crate::domain::{ForecastError, LineDescriptor};
use crate::source::ByteSource;

/// Split `source` into lines and recover each line's snapshot time.
///
/// `progress(offset, size)` is called every `file_progress_step` bytes.
/// Prefixes are dropped once the time is extracted, so the index holds
/// nothing but descriptors.
pub async fn index_lines<S, P>(
    source: &S,
    config: &ScanConfig,
    mut progress: P,
) -> Result<Vec<LineDescriptor>, ForecastError>
where
    S: ByteSource,
    P: FnMut(u64, u64),
{
    let reader = source.stream().await?;
    let mut splitter = LineSplitter::new(reader, source.size(), config);
    let mut lines = Vec::new();

    while let Some(event) = splitter.next_event().await? {
        match event {
            SplitEvent::Progress { offset, size } => progress(offset, size),
            SplitEvent::Line(raw) => {
                let mut descriptor = raw.descriptor;
                descriptor.system_time = extract_system_time(&raw.prefix);
                if descriptor.system_time.is_none() {
                    debug!(begin = descriptor.begin, "line without system_time");
                }
                lines.push(descriptor);
            }
        }
    }
    Ok(lines)
}

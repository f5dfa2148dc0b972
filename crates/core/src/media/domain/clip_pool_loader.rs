use std::path::Path;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::shared::error::WarpError;

/// Domain interface for loading the pool of foreign clips mixed into chunks.
pub trait ClipPoolLoader: Send {
    /// Every usable clip under `dir`, in a stable order.
    ///
    /// An empty directory is an empty pool, not an error. A missing or
    /// unreadable directory is `ResourceExhausted`.
    fn list_clips(&self, dir: &Path) -> Result<Vec<AudioBuffer>, WarpError>;
}

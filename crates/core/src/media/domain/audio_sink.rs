use std::path::Path;

use crate::shared::error::WarpError;

/// Domain interface for persisting encoded output.
pub trait AudioSink: Send {
    fn write(&self, bytes: &[u8], destination: &Path) -> Result<(), WarpError>;
}

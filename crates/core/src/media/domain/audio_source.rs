use crate::shared::error::WarpError;

/// Domain interface for obtaining the raw bytes of the input recording.
pub trait AudioSource: Send {
    /// Resolve `identifier` (a path, a URL) to the bytes of an encoded audio file.
    fn fetch(&self, identifier: &str) -> Result<Vec<u8>, WarpError>;
}

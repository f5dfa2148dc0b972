use std::fs;
use std::io::Write;
use std::path::Path;

use crate::media::domain::audio_sink::AudioSink;
use crate::shared::error::WarpError;

/// Writes encoded output to disk.
///
/// Bytes go to `<dest>.part` first and are renamed into place, so a failed
/// run never leaves a truncated file at the destination.
pub struct FileAudioSink;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> WarpError + '_ {
    move |source| WarpError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl AudioSink for FileAudioSink {
    fn write(&self, bytes: &[u8], destination: &Path) -> Result<(), WarpError> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err(parent))?;
            }
        }

        let mut temp_name = destination.as_os_str().to_owned();
        temp_name.push(".part");
        let temp_path = Path::new(&temp_name);

        let result = (|| {
            let mut file = fs::File::create(temp_path).map_err(io_err(temp_path))?;
            file.write_all(bytes).map_err(io_err(temp_path))?;
            file.flush().map_err(io_err(temp_path))?;
            drop(file);
            fs::rename(temp_path, destination).map_err(io_err(destination))
        })();

        if result.is_err() {
            let _ = fs::remove_file(temp_path);
        }
        result
    }
}

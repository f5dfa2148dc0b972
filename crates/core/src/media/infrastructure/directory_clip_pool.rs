use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::media::domain::audio_decoder::AudioDecoder;
use crate::media::domain::clip_pool_loader::ClipPoolLoader;
use crate::shared::constants::CLIP_EXTENSIONS;
use crate::shared::error::WarpError;

/// Loads every decodable audio file in a directory as a foreign clip.
///
/// Files are visited in sorted filename order so a seeded run picks the same
/// clips on every machine. Subdirectories are not searched.
pub struct DirectoryClipPool {
    decoder: Arc<dyn AudioDecoder>,
    extensions: Vec<String>,
}

impl DirectoryClipPool {
    pub fn new(decoder: Arc<dyn AudioDecoder>) -> Self {
        Self {
            decoder,
            extensions: CLIP_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_ascii_lowercase()).collect();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
                .unwrap_or(false)
    }
}

impl ClipPoolLoader for DirectoryClipPool {
    fn list_clips(&self, dir: &Path) -> Result<Vec<AudioBuffer>, WarpError> {
        let exhausted = |source: std::io::Error| WarpError::ResourceExhausted {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(exhausted)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| self.accepts(p))
            .collect();
        paths.sort();

        let mut clips = Vec::with_capacity(paths.len());
        for path in &paths {
            let decoded = fs::read(path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| self.decoder.decode(&bytes).map_err(|e| e.to_string()));
            match decoded {
                Ok(clip) if clip.is_empty() => {
                    log::warn!("Skipping empty clip {}", path.display());
                }
                Ok(clip) => clips.push(clip),
                Err(reason) => {
                    log::warn!("Skipping clip {}: {reason}", path.display());
                }
            }
        }

        log::info!(
            "Loaded {} foreign clip(s) from {}",
            clips.len(),
            dir.display()
        );
        Ok(clips)
    }
}

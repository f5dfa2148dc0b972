use super::audio_buffer::AudioBuffer;

/// A contiguous frame range `[start, end)` of a parent buffer together with
/// an owned copy of those frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    index: usize,
    start: usize,
    end: usize,
    audio: AudioBuffer,
}

impl Chunk {
    pub fn new(index: usize, start: usize, audio: AudioBuffer) -> Self {
        let end = start + audio.frames();
        Self {
            index,
            start,
            end,
            audio,
        }
    }

    /// Temporal position among its siblings.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn frames(&self) -> usize {
        self.end - self.start
    }

    pub fn audio(&self) -> &AudioBuffer {
        &self.audio
    }
}

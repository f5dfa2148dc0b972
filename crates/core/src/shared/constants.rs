pub const DEFAULT_CHUNK_MS: u64 = 500;

/// Chunks shorter than this are passed through the tempo scaler unchanged.
pub const MIN_TEMPO_CHUNK_MS: u64 = 150;

pub const DEFAULT_FADE_MS: u64 = 10;

/// Boost applied to the undistorted original before the overlay.
pub const DEFAULT_ORIGINAL_GAIN_DB: f64 = 8.0;

pub const DEFAULT_PITCH_RANGE: (f64, f64) = (-2.0, 2.0);
pub const DEFAULT_SPEED_RANGE: (f64, f64) = (0.9, 1.1);
pub const DEFAULT_REVERB_RANGE: (i32, i32) = (45, 55);
pub const DEFAULT_GAIN_RANGE: (i32, i32) = (-5, 5);

pub const MAX_REVERB_LEVEL: f64 = 100.0;

/// Offsets beyond this many semitones either way are clamped.
pub const MAX_PITCH_SHIFT_SEMITONES: f64 = 96.0;

/// Largest shift done in a single resample-and-restore pass.
pub const PITCH_SHIFT_PASS_SEMITONES: f64 = 12.0;

pub const DEFAULT_OUTPUT_FILENAME: &str = "manipulated_audio.wav";

#[cfg(not(feature = "ffmpeg"))]
pub const CLIP_EXTENSIONS: &[&str] = &["wav"];
#[cfg(feature = "ffmpeg")]
pub const CLIP_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg", "m4a"];

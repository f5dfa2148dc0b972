pub mod band_filter_transformer;
pub mod gain_transformer;
pub mod phase_vocoder;
pub mod pitch_shift_transformer;
pub mod spectral_pitch_analyzer;
pub mod tempo_scale_transformer;
pub mod wsola;

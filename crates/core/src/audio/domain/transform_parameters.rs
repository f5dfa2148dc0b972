use rand::Rng;

use crate::shared::error::WarpError;

/// Distortion settings for one chunk. Drawn immediately before the chunk is
/// transformed and dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParameters {
    pub pitch_semitones: f64,
    pub speed_ratio: f64,
    pub reverb_level: f64,
    pub gain_db: f64,
    /// Index into the foreign clip pool, if a clip was mixed in.
    pub foreign_clip: Option<usize>,
}

/// Inclusive ranges the per-chunk parameters are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRanges {
    pub pitch: (f64, f64),
    pub speed: (f64, f64),
    /// Optional tighter band the drawn speed ratio is clamped into.
    pub speed_clamp: Option<(f64, f64)>,
    pub reverb: (i32, i32),
    pub gain: (i32, i32),
}

impl ParameterRanges {
    pub fn validate(&self) -> Result<(), WarpError> {
        check_range("pitch range", self.pitch)?;
        check_range("speed range", self.speed)?;
        if self.speed.0 <= 0.0 {
            return Err(WarpError::invalid(format!(
                "speed ratios must be positive, got {:?}",
                self.speed
            )));
        }
        if let Some(clamp) = self.speed_clamp {
            check_range("speed clamp", clamp)?;
            if clamp.0 <= 0.0 {
                return Err(WarpError::invalid(format!(
                    "speed clamp must be positive, got {clamp:?}"
                )));
            }
        }
        if self.reverb.0 > self.reverb.1 {
            return Err(WarpError::invalid(format!(
                "reverb range is inverted: {:?}",
                self.reverb
            )));
        }
        if self.gain.0 > self.gain.1 {
            return Err(WarpError::invalid(format!(
                "gain range is inverted: {:?}",
                self.gain
            )));
        }
        Ok(())
    }

    /// Draw pitch, speed, reverb level and gain, in that order.
    ///
    /// Pitch and speed are continuous; reverb level and gain are whole numbers.
    /// Ranges must have passed [`validate`](Self::validate).
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> TransformParameters {
        let pitch_semitones = rng.gen_range(self.pitch.0..=self.pitch.1);
        let mut speed_ratio = rng.gen_range(self.speed.0..=self.speed.1);
        if let Some((lo, hi)) = self.speed_clamp {
            speed_ratio = speed_ratio.max(lo).min(hi);
        }
        let reverb_level = rng.gen_range(self.reverb.0..=self.reverb.1) as f64;
        let gain_db = rng.gen_range(self.gain.0..=self.gain.1) as f64;

        TransformParameters {
            pitch_semitones,
            speed_ratio,
            reverb_level,
            gain_db,
            foreign_clip: None,
        }
    }
}

fn check_range(name: &str, (min, max): (f64, f64)) -> Result<(), WarpError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(WarpError::invalid(format!("{name} must be finite")));
    }
    if min > max {
        return Err(WarpError::invalid(format!(
            "{name} is inverted: ({min}, {max})"
        )));
    }
    Ok(())
}

use serde::{Deserialize, Serialize};

use super::pattern::Mood;

// Knobs for the sound service. Missing fields in a saved file fall back to
// these defaults, so old config files keep loading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub master_gain: f32,
    pub beat_seconds: f64, // one quarter note
    pub ambient_volume: f32,
    pub ambient_fade_in_seconds: f64,
    pub ambient_fade_out_seconds: f64,
    pub ambient_teardown_seconds: f64, // a little longer than the fade out
    pub ambient_volume_time_constant: f64,
    pub start_muted: bool,
    pub default_mood: Mood,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            master_gain: 0.5,
            beat_seconds: 0.5, // ~120 bpm
            ambient_volume: 0.5,
            ambient_fade_in_seconds: 2.0,
            ambient_fade_out_seconds: 0.5,
            ambient_teardown_seconds: 0.55,
            ambient_volume_time_constant: 0.5,
            start_muted: false,
            default_mood: Mood::default(),
        }
    }
}

impl EngineConfig {
    // clamp what can be clamped, reject what can't
    pub fn validated(mut self) -> anyhow::Result<Self> {
        anyhow::ensure!(
            self.beat_seconds.is_finite() && self.beat_seconds > 0.0,
            "beat_seconds must be positive, got {}",
            self.beat_seconds
        );
        for (name, secs) in [
            ("ambient_fade_in_seconds", self.ambient_fade_in_seconds),
            ("ambient_fade_out_seconds", self.ambient_fade_out_seconds),
            ("ambient_volume_time_constant", self.ambient_volume_time_constant),
        ] {
            anyhow::ensure!(secs.is_finite() && secs > 0.0, "{name} must be positive, got {secs}");
        }
        // teardown must not cut the fade short
        self.ambient_teardown_seconds = self.ambient_teardown_seconds.max(self.ambient_fade_out_seconds);
        self.master_gain = self.master_gain.clamp(0.0, 1.0);
        self.ambient_volume = self.ambient_volume.clamp(0.0, 1.0);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let c = EngineConfig::default().validated().unwrap();
        assert_eq!(c, EngineConfig::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c: EngineConfig = serde_json::from_str(r#"{ "beat_seconds": 0.25 }"#).unwrap();
        assert_eq!(c.beat_seconds, 0.25);
        assert_eq!(c.master_gain, 0.5);
        assert_eq!(c.default_mood, Mood::Excited);
    }

    #[test]
    fn test_rejects_zero_tempo() {
        let c = EngineConfig { beat_seconds: 0.0, ..Default::default() };
        assert!(c.validated().is_err());
    }

    #[test]
    fn test_clamps_gains_and_teardown() {
        let c = EngineConfig {
            master_gain: 3.0,
            ambient_volume: -1.0,
            ambient_teardown_seconds: 0.1,
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(c.master_gain, 1.0);
        assert_eq!(c.ambient_volume, 0.0);
        assert_eq!(c.ambient_teardown_seconds, c.ambient_fade_out_seconds);
    }
}

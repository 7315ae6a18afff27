use rand::Rng;

use super::instruments::Tone;
use crate::audio_api::Waveform;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SoundEffect {
    Boot,
    Click,
    Hover,
    KeyStroke,
    Flip,
    InsertTape,
    EjectTape,
    PowerDown,
    Delete,
    Success,
    Error,
    Processing,
    Static { seconds: f64 },
}

// one voice of an effect; offsets are relative to the trigger
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Layer {
    Tone(Tone),
    Sweep {
        waveform: Waveform,
        from_hz: f32,
        to_hz: f32,
        volume: f32,
        duration: f64,
    },
    Static { duration: f64 },
}

pub const DEFAULT_STATIC_SECONDS: f64 = 0.5;

impl SoundEffect {
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Boot => "boot",
            SoundEffect::Click => "click",
            SoundEffect::Hover => "hover",
            SoundEffect::KeyStroke => "keystroke",
            SoundEffect::Flip => "flip",
            SoundEffect::InsertTape => "insert",
            SoundEffect::EjectTape => "eject",
            SoundEffect::PowerDown => "power-down",
            SoundEffect::Delete => "delete",
            SoundEffect::Success => "success",
            SoundEffect::Error => "error",
            SoundEffect::Processing => "processing",
            SoundEffect::Static { .. } => "static",
        }
    }

    pub fn layers(self) -> Vec<Layer> {
        use Waveform::*;
        let t = |hz, wave, secs| Layer::Tone(Tone::new(hz, wave, secs));
        let tv = |hz, wave, secs, vol| Layer::Tone(Tone::new(hz, wave, secs).volume(vol));

        match self {
            SoundEffect::Boot => vec![t(110.0, Square, 0.1)],
            SoundEffect::Click => vec![tv(1200.0, Square, 0.05, 0.05)],
            SoundEffect::Hover => vec![tv(600.0, Sawtooth, 0.02, 0.02)],
            SoundEffect::KeyStroke => {
                // a little pitch jitter so typing doesn't sound like a metronome
                let hz = 800.0 + rand::rng().random_range(0.0f32..200.0);
                vec![tv(hz, Square, 0.02, 0.03)]
            }
            SoundEffect::Flip => vec![
                tv(400.0, Square, 0.05, 0.05),
                Layer::Tone(Tone::new(300.0, Square, 0.05).volume(0.05).at(0.05)),
            ],
            SoundEffect::InsertTape => vec![
                Layer::Tone(Tone::new(100.0, Sawtooth, 0.2).at(0.1)),
                t(80.0, Square, 0.3),
            ],
            SoundEffect::EjectTape => vec![
                t(150.0, Sawtooth, 0.2),
                Layer::Tone(Tone::new(200.0, Square, 0.1).at(0.2)),
            ],
            SoundEffect::PowerDown => vec![Layer::Sweep {
                waveform: Sine,
                from_hz: 400.0,
                to_hz: 10.0,
                volume: 0.3,
                duration: 0.4,
            }],
            SoundEffect::Delete => vec![tv(100.0, Sawtooth, 0.1, 0.2), Layer::Static { duration: 0.2 }],
            SoundEffect::Success => vec![
                t(523.25, Triangle, 0.1),
                Layer::Tone(Tone::new(659.25, Triangle, 0.1).at(0.1)),
                Layer::Tone(Tone::new(783.99, Triangle, 0.4).at(0.2)),
            ],
            SoundEffect::Error => vec![Layer::Tone(
                Tone::new(220.0, Sawtooth, 0.3).volume(0.1).glide_down(),
            )],
            SoundEffect::Processing => vec![tv(880.0, Sine, 0.04, 0.02)],
            SoundEffect::Static { seconds } => vec![Layer::Static { duration: seconds.max(0.0) }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tones(effect: SoundEffect) -> Vec<Tone> {
        effect
            .layers()
            .into_iter()
            .filter_map(|l| match l {
                Layer::Tone(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_success_is_an_ascending_triad() {
        let t = tones(SoundEffect::Success);
        let hz: Vec<f32> = t.iter().map(|t| t.frequency).collect();
        let at: Vec<f64> = t.iter().map(|t| t.offset).collect();
        assert_eq!(hz, vec![523.25, 659.25, 783.99]);
        assert_eq!(at, vec![0.0, 0.1, 0.2]);
        assert!(t.iter().all(|t| t.waveform == Waveform::Triangle));
    }

    #[test]
    fn test_keystroke_pitch_stays_in_range() {
        for _ in 0..100 {
            let hz = tones(SoundEffect::KeyStroke)[0].frequency;
            assert!((800.0..1000.0).contains(&hz), "{hz}");
        }
    }

    #[test]
    fn test_delete_layers_static() {
        let layers = SoundEffect::Delete.layers();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1], Layer::Static { duration: 0.2 });
    }

    #[test]
    fn test_error_glides() {
        assert!(tones(SoundEffect::Error)[0].glide_down);
    }
}

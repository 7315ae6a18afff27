use std::f64::consts::TAU;

use super::filter::Filter;
use super::noise::NoiseBuffer;
use super::param::Automation;
use crate::audio_api::{NodeId, Output, SourceSpec, VoiceKind, VoiceSpec, Waveform};

impl Waveform {
    // phase is in cycles, [0, 1)
    #[inline]
    pub fn sample(self, phase: f64) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin() as f32,
            Waveform::Square => {
                if phase < 0.5 { 1.0 } else { -1.0 }
            }
            Waveform::Sawtooth => (2.0 * phase - 1.0) as f32,
            Waveform::Triangle => (1.0 - 4.0 * (phase - 0.5).abs()) as f32,
        }
    }
}

enum Source {
    Oscillator {
        waveform: Waveform,
        phase: f64,
        frequency: Automation,
        detune_cents: Automation,
    },
    Noise {
        buffer: NoiseBuffer,
        pos: usize,
        looping: bool,
    },
}

// idle -> sounding -> finished; the engine drops finished voices after each block
pub struct VoiceNode {
    pub id: NodeId,
    pub kind: VoiceKind,
    output: Output,
    source: Source,
    filter: Option<Filter>,
    gain: Automation,
    start: f64,
    stop: Option<f64>,
    finished: bool,
}

impl VoiceNode {
    pub fn from_spec(spec: VoiceSpec, sample_rate: f32) -> Self {
        let source = match spec.source {
            SourceSpec::Oscillator { waveform, frequency, detune_cents } => Source::Oscillator {
                waveform,
                phase: 0.0,
                frequency,
                detune_cents,
            },
            SourceSpec::Noise { buffer, looping } => Source::Noise { buffer, pos: 0, looping },
        };
        Self {
            id: spec.id,
            kind: spec.kind,
            output: spec.output,
            source,
            filter: spec.filter.and_then(|f| Filter::new(f, sample_rate)),
            gain: spec.gain,
            start: spec.start,
            stop: spec.stop,
            finished: false,
        }
    }

    pub fn output(&self) -> Output {
        self.output
    }

    // When the voice goes quiet without being told to. None for a voice only
    // a StopVoice can end (looped noise or an oscillator with no stop time).
    pub fn natural_end(&self) -> Option<f64> {
        if self.finished {
            return Some(f64::NEG_INFINITY);
        }
        match (&self.source, self.stop) {
            (_, Some(stop)) => Some(stop),
            (Source::Noise { looping: false, .. }, None) => Some(self.start),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    // a stop can only ever come earlier, never postpone a scheduled one
    pub fn stop_at(&mut self, at: f64) {
        self.stop = Some(match self.stop {
            Some(existing) => existing.min(at),
            None => at,
        });
    }

    pub fn next_sample(&mut self, time: f64, sample_rate: f32) -> f32 {
        if self.finished || time < self.start {
            return 0.0;
        }
        if let Some(stop) = self.stop {
            if time >= stop {
                self.finished = true;
                return 0.0;
            }
        }

        let raw = match &mut self.source {
            Source::Oscillator { waveform, phase, frequency, detune_cents } => {
                let cents = detune_cents.value_at(time);
                let hz = frequency.value_at(time) as f64 * 2f64.powf(cents as f64 / 1200.0);
                let s = waveform.sample(*phase);
                *phase += hz / sample_rate as f64;
                *phase -= phase.floor();
                s
            }
            Source::Noise { buffer, pos, looping } => {
                if *pos >= buffer.len() {
                    if *looping && !buffer.is_empty() {
                        *pos = 0;
                    } else {
                        self.finished = true;
                        return 0.0;
                    }
                }
                let s = buffer.get(*pos).unwrap_or(0.0);
                *pos += 1;
                s
            }
        };

        let filtered = match self.filter.as_mut() {
            Some(f) => f.process(raw),
            None => raw,
        };
        filtered * self.gain.value_at(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_api::VoiceKind;

    fn tone_spec(start: f64, stop: Option<f64>) -> VoiceSpec {
        VoiceSpec {
            id: NodeId(1),
            kind: VoiceKind::Tone,
            source: SourceSpec::Oscillator {
                waveform: Waveform::Square,
                frequency: Automation::constant(100.0),
                detune_cents: Automation::constant(0.0),
            },
            filter: None,
            gain: Automation::constant(0.5),
            output: Output::Master,
            start,
            stop,
        }
    }

    #[test]
    fn test_waveform_shapes() {
        assert_eq!(Waveform::Square.sample(0.25), 1.0);
        assert_eq!(Waveform::Square.sample(0.75), -1.0);
        assert_eq!(Waveform::Sawtooth.sample(0.0), -1.0);
        assert_eq!(Waveform::Triangle.sample(0.5), 1.0);
        assert_eq!(Waveform::Triangle.sample(0.0), -1.0);
        assert!(Waveform::Sine.sample(0.0).abs() < 1e-6);
    }

    #[test]
    fn test_silent_before_start_and_finished_after_stop() {
        let sr = 1000.0;
        let mut v = VoiceNode::from_spec(tone_spec(0.5, Some(0.6)), sr);
        assert_eq!(v.next_sample(0.1, sr), 0.0);
        assert!(!v.is_finished());
        assert_eq!(v.next_sample(0.5, sr), 0.5);
        assert_eq!(v.next_sample(0.6, sr), 0.0);
        assert!(v.is_finished());
    }

    #[test]
    fn test_stop_only_moves_earlier() {
        let mut v = VoiceNode::from_spec(tone_spec(0.0, Some(1.0)), 1000.0);
        v.stop_at(2.0);
        assert_eq!(v.stop, Some(1.0));
        v.stop_at(0.2);
        assert_eq!(v.stop, Some(0.2));
    }

    #[test]
    fn test_one_shot_noise_runs_out() {
        let noise = NoiseBuffer::generate(2); // four samples
        let spec = VoiceSpec {
            source: SourceSpec::Noise { buffer: noise, looping: false },
            gain: Automation::constant(1.0),
            stop: None,
            ..tone_spec(0.0, None)
        };
        let mut v = VoiceNode::from_spec(spec, 2.0);
        for i in 0..4 {
            v.next_sample(i as f64 * 0.5, 2.0);
        }
        assert!(!v.is_finished());
        v.next_sample(2.0, 2.0);
        assert!(v.is_finished());
    }
}

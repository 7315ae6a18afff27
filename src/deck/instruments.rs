// Synthesis recipes. Each one only describes a voice; nothing sounds until
// the VoiceSpec is submitted to the device. Start times are on the render
// clock, durations in seconds.

use crate::audio::{Automation, NoiseBuffer, SILENCE_FLOOR, next_node_id};
use crate::audio_api::{FilterSpec, Output, SourceSpec, VoiceKind, VoiceSpec, Waveform};
use crate::pipeline::pattern::{NoteStep, TrackRole};

const ATTACK: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub waveform: Waveform,
    pub duration: f64,
    pub offset: f64,
    pub volume: f32,
    pub glide_down: bool,
}

impl Tone {
    pub fn new(frequency: f32, waveform: Waveform, duration: f64) -> Self {
        Self {
            frequency,
            waveform,
            duration,
            offset: 0.0,
            volume: 0.1,
            glide_down: false,
        }
    }

    pub fn at(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    // slide down an octave over the note
    pub fn glide_down(mut self) -> Self {
        self.glide_down = true;
        self
    }
}

fn oscillator(waveform: Waveform, frequency: Automation) -> SourceSpec {
    SourceSpec::Oscillator {
        waveform,
        frequency,
        detune_cents: Automation::constant(0.0),
    }
}

fn drifting(waveform: Waveform, hz: f32, start: f64, duration: f64, cents: f32) -> SourceSpec {
    SourceSpec::Oscillator {
        waveform,
        frequency: Automation::starting_at(start, hz),
        detune_cents: Automation::starting_at(start, 0.0).linear_to(start + duration, cents),
    }
}

// silence -> peak over `attack`, then an exponential fall to the floor by `end`
fn swell(start: f64, attack: f64, peak: f32, end: f64) -> Automation {
    Automation::starting_at(start, 0.0)
        .linear_to(start + attack, peak)
        .exponential_to(end, SILENCE_FLOOR)
}

// hit at full level, then straight down
fn strike(start: f64, peak: f32, decay: f64) -> Automation {
    Automation::starting_at(start, peak).exponential_to(start + decay, SILENCE_FLOOR)
}

pub fn tone(t: Tone, now: f64, output: Output) -> VoiceSpec {
    let start = now + t.offset;
    let end = start + t.duration;
    let frequency = if t.glide_down {
        Automation::starting_at(start, t.frequency).exponential_to(end, t.frequency * 0.5)
    } else {
        Automation::starting_at(start, t.frequency)
    };
    VoiceSpec {
        id: next_node_id(),
        kind: VoiceKind::Tone,
        source: oscillator(t.waveform, frequency),
        filter: None,
        gain: swell(start, ATTACK, t.volume, end),
        output,
        start,
        stop: Some(end),
    }
}

// pitch sweep with a linear fade, for power-down
pub fn sweep(
    waveform: Waveform,
    from_hz: f32,
    to_hz: f32,
    volume: f32,
    start: f64,
    duration: f64,
) -> VoiceSpec {
    let end = start + duration;
    VoiceSpec {
        id: next_node_id(),
        kind: VoiceKind::Sweep,
        source: oscillator(waveform, Automation::starting_at(start, from_hz).exponential_to(end, to_hz)),
        filter: None,
        gain: Automation::starting_at(start, volume).linear_to(end, 0.0),
        output: Output::Master,
        start,
        stop: Some(end),
    }
}

// radio static: looping noise fading linearly out over the burst
pub fn static_burst(noise: NoiseBuffer, start: f64, duration: f64) -> VoiceSpec {
    let end = start + duration;
    VoiceSpec {
        id: next_node_id(),
        kind: VoiceKind::Static,
        source: SourceSpec::Noise { buffer: noise, looping: true },
        filter: None,
        gain: Automation::starting_at(start, 0.05).linear_to(end, 0.0),
        output: Output::Master,
        start,
        stop: Some(end),
    }
}

// no stop time; the owning session stops it
pub fn hiss(noise: NoiseBuffer, cutoff_hz: f32, level: f32, start: f64, output: Output) -> VoiceSpec {
    VoiceSpec {
        id: next_node_id(),
        kind: VoiceKind::Hiss,
        source: SourceSpec::Noise { buffer: noise, looping: true },
        filter: Some(FilterSpec::low_pass(cutoff_hz)),
        gain: Automation::constant(level),
        output,
        start,
        stop: None,
    }
}

pub fn melody(hz: f32, start: f64, duration: f64, output: Output) -> VoiceSpec {
    let end = start + duration;
    VoiceSpec {
        id: next_node_id(),
        kind: VoiceKind::Melody,
        source: drifting(Waveform::Square, hz, start, duration, 5.0),
        filter: Some(FilterSpec::low_pass(2500.0)),
        gain: swell(start, 0.02, 0.03, end),
        output,
        start,
        stop: Some(end),
    }
}

pub fn bass(hz: f32, start: f64, duration: f64, output: Output) -> VoiceSpec {
    let end = start + duration;
    VoiceSpec {
        id: next_node_id(),
        kind: VoiceKind::Bass,
        source: oscillator(Waveform::Triangle, Automation::starting_at(start, hz)),
        filter: None,
        gain: swell(start, 0.02, 0.06, end),
        output,
        start,
        stop: Some(end),
    }
}

pub fn kick(start: f64, output: Output) -> VoiceSpec {
    VoiceSpec {
        id: next_node_id(),
        kind: VoiceKind::Kick,
        source: oscillator(
            Waveform::Square,
            Automation::starting_at(start, 120.0).exponential_to(start + 0.08, 50.0),
        ),
        filter: Some(FilterSpec::low_pass(150.0)),
        gain: strike(start, 0.15, 0.1),
        output,
        start,
        stop: Some(start + 0.1),
    }
}

pub fn snare(noise: NoiseBuffer, start: f64, output: Output) -> VoiceSpec {
    VoiceSpec {
        id: next_node_id(),
        kind: VoiceKind::Snare,
        source: SourceSpec::Noise { buffer: noise, looping: false },
        filter: Some(FilterSpec::low_pass(3000.0)),
        gain: strike(start, 0.05, 0.08),
        output,
        start,
        stop: Some(start + 0.1),
    }
}

pub fn hihat(noise: NoiseBuffer, start: f64, output: Output) -> VoiceSpec {
    VoiceSpec {
        id: next_node_id(),
        kind: VoiceKind::HiHat,
        source: SourceSpec::Noise { buffer: noise, looping: false },
        filter: Some(FilterSpec::high_pass(6000.0)),
        gain: strike(start, 0.02, 0.03),
        output,
        start,
        stop: Some(start + 0.05),
    }
}

// rings for `duration` and gets a short tail before the hard stop
pub fn pluck(hz: f32, start: f64, duration: f64, output: Output) -> VoiceSpec {
    VoiceSpec {
        id: next_node_id(),
        kind: VoiceKind::Pluck,
        source: oscillator(Waveform::Square, Automation::starting_at(start, hz)),
        filter: Some(FilterSpec::low_pass(800.0)),
        gain: swell(start, 0.02, 0.08, start + duration),
        output,
        start,
        stop: Some(start + duration + 0.1),
    }
}

pub fn lead(hz: f32, start: f64, duration: f64, output: Output) -> VoiceSpec {
    let end = start + duration;
    VoiceSpec {
        id: next_node_id(),
        kind: VoiceKind::Lead,
        source: drifting(Waveform::Square, hz, start, duration, 8.0),
        filter: Some(FilterSpec::low_pass(1200.0)),
        gain: swell(start, 0.05, 0.08, end),
        output,
        start,
        stop: Some(end),
    }
}

// None for a rest. Noise voices stay silent without the session's buffer.
pub fn for_step(
    role: TrackRole,
    step: &NoteStep,
    start: f64,
    duration: f64,
    output: Output,
    noise: Option<&NoiseBuffer>,
) -> Option<VoiceSpec> {
    if step.is_rest() {
        return None;
    }
    // a note missing from the pitch table plays as a rest too
    let hz = step.frequency()?;
    let spec = match role {
        TrackRole::Melody => melody(hz, start, duration, output),
        TrackRole::Bass => bass(hz, start, duration, output),
        TrackRole::Kick => kick(start, output),
        TrackRole::Snare => snare(noise?.clone(), start, output),
        TrackRole::HiHat => hihat(noise?.clone(), start, output),
        TrackRole::Pluck => pluck(hz, start, duration * 2.0, output),
        TrackRole::Lead => lead(hz, start, duration, output),
    };
    Some(spec)
}

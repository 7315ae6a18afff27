// What the control side sends to the render engine. The engine never blocks or
// allocates on its own; everything a voice needs is built up-front in a
// VoiceSpec and moved across the channel.

pub use crate::audio::{Automation, NoiseBuffer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BusId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

// where a voice's output lands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    Master,
    Bus(BusId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub cutoff_hz: f32,
}

impl FilterSpec {
    pub fn low_pass(cutoff_hz: f32) -> Self {
        Self { kind: FilterKind::LowPass, cutoff_hz }
    }

    pub fn high_pass(cutoff_hz: f32) -> Self {
        Self { kind: FilterKind::HighPass, cutoff_hz }
    }
}

#[derive(Clone, Debug)]
pub enum SourceSpec {
    Oscillator {
        waveform: Waveform,
        frequency: Automation,
        detune_cents: Automation,
    },
    Noise {
        buffer: NoiseBuffer,
        looping: bool,
    },
}

// which recipe produced a voice; the engine ignores it, callers and tests read it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoiceKind {
    Tone,
    Sweep,
    Static,
    Hiss,
    Melody,
    Bass,
    Kick,
    Snare,
    HiHat,
    Pluck,
    Lead,
}

#[derive(Clone, Debug)]
pub struct VoiceSpec {
    pub id: NodeId,
    pub kind: VoiceKind,
    pub source: SourceSpec,
    pub filter: Option<FilterSpec>,
    pub gain: Automation,
    pub output: Output,
    pub start: f64,
    pub stop: Option<f64>, // None keeps sounding until a StopVoice arrives
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GainMove {
    Linear { to: f32, over: f64 },
    Approach { to: f32, time_constant: f64 },
}

#[derive(Clone, Debug)]
pub enum GraphCommand {
    SetMasterGain(f32),
    CreateBus { id: BusId, gain: Automation },
    MoveBusGain { id: BusId, at: f64, change: GainMove },
    // drops the bus and everything still routed into it
    RemoveBus { id: BusId },
    StartVoice(Box<VoiceSpec>),
    StopVoice { id: NodeId, at: f64 },
}

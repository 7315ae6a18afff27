use tracing::debug;

use super::frame::StereoFrame;
use super::param::Automation;
use super::voice::VoiceNode;
use crate::audio_api::{BusId, GainMove, GraphCommand, Output};

const MAX_VOICES: usize = 64; // hard cap so we wont malloc in audio callback
const MAX_BUSES: usize = 8;

struct Bus {
    id: BusId,
    gain: Automation,
}

// The render side of the graph. Lives inside the output callback (or an
// offline renderer) and only ever hears about the world through GraphCommands.
pub struct Engine {
    sample_rate: f32,
    frames_rendered: u64,
    master_gain: f32,
    buses: Vec<Bus>,
    voices: Vec<VoiceNode>,
    bus_mix: Vec<f32>, // per-bus scratch for the sample being mixed
}

impl Engine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            frames_rendered: 0,
            master_gain: 1.0,
            buses: Vec::with_capacity(MAX_BUSES),
            voices: Vec::with_capacity(MAX_VOICES),
            bus_mix: vec![0.0; MAX_BUSES],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate as u32
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn now(&self) -> f64 {
        self.frames_rendered as f64 / self.sample_rate as f64
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_finished()).count()
    }

    #[cfg(test)]
    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    pub fn handle_cmd(&mut self, cmd: GraphCommand) {
        match cmd {
            GraphCommand::SetMasterGain(gain) => self.master_gain = gain.clamp(0.0, 1.0),
            GraphCommand::CreateBus { id, gain } => self.create_bus(id, gain),
            GraphCommand::MoveBusGain { id, at, change } => self.move_bus_gain(id, at, change),
            GraphCommand::RemoveBus { id } => self.remove_bus(id),
            GraphCommand::StartVoice(spec) => {
                let voice = VoiceNode::from_spec(*spec, self.sample_rate);
                self.start_voice(voice);
            }
            GraphCommand::StopVoice { id, at } => {
                if let Some(v) = self.voices.iter_mut().find(|v| v.id == id) {
                    v.stop_at(at);
                }
            }
        }
    }

    fn create_bus(&mut self, id: BusId, gain: Automation) {
        if self.buses.len() >= MAX_BUSES {
            debug!(?id, "bus limit reached, dropping oldest bus");
            let oldest = self.buses[0].id;
            self.remove_bus(oldest);
        }
        self.buses.push(Bus { id, gain });
    }

    fn move_bus_gain(&mut self, id: BusId, at: f64, change: GainMove) {
        let Some(bus) = self.buses.iter_mut().find(|b| b.id == id) else {
            return;
        };
        bus.gain.cancel_and_hold(at);
        let held = std::mem::replace(&mut bus.gain, Automation::constant(0.0));
        bus.gain = match change {
            GainMove::Linear { to, over } => held.linear_to(at + over.max(0.0), to),
            GainMove::Approach { to, time_constant } => held.approach(at, to, time_constant),
        };
    }

    fn remove_bus(&mut self, id: BusId) {
        self.buses.retain(|b| b.id != id);
        self.voices.retain(|v| v.output() != Output::Bus(id));
    }

    fn start_voice(&mut self, voice: VoiceNode) {
        if self.voices.len() >= MAX_VOICES {
            // steal the voice closest to ending on its own; endless voices
            // belong to a session and only it may stop them
            let victim = self
                .voices
                .iter()
                .enumerate()
                .filter_map(|(idx, v)| v.natural_end().map(|end| (idx, end)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(idx, _)| idx);
            match victim {
                Some(idx) => {
                    let stolen = self.voices.swap_remove(idx);
                    debug!(kind = ?stolen.kind, "voice pool full, stole a voice");
                }
                None => {
                    debug!(kind = ?voice.kind, "voice pool full of endless voices, dropping new voice");
                    return;
                }
            }
        }
        self.voices.push(voice);
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        let sr = self.sample_rate;
        for (i, frame) in out.iter_mut().enumerate() {
            let time = (self.frames_rendered + i as u64) as f64 / sr as f64;

            let mut master = 0.0f32;
            for slot in self.bus_mix.iter_mut() {
                *slot = 0.0;
            }

            for voice in self.voices.iter_mut() {
                let s = voice.next_sample(time, sr);
                if s == 0.0 {
                    continue;
                }
                match voice.output() {
                    Output::Master => master += s,
                    Output::Bus(id) => {
                        // voices on a bus that no longer exists stay silent until removed
                        if let Some(idx) = self.buses.iter().position(|b| b.id == id) {
                            self.bus_mix[idx] += s;
                        }
                    }
                }
            }

            for (bus, mixed) in self.buses.iter().zip(self.bus_mix.iter()) {
                master += mixed * bus.gain.value_at(time);
            }

            *frame = StereoFrame::splat(master * self.master_gain).clamped();
        }

        self.frames_rendered += out.len() as u64;
        self.voices.retain(|v| !v.is_finished());
    }
}

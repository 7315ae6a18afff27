// The sound service: everything the rest of the app can ask of the audio
// side. Single-threaded; the owner drives the sequencer by calling `tick`
// from its event loop.

mod clock;
mod context;
mod effects;
mod instruments;
mod sequencer;
#[cfg(test)]
mod testing;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use effects::{DEFAULT_STATIC_SECONDS, Layer, SoundEffect};
pub use sequencer::{LiveNode, TimerEvent, TrackHandle};

use tracing::{debug, warn};

use crate::audio::{Automation, DeviceFactory, next_bus_id};
use crate::audio_api::{GainMove, GraphCommand, Output, VoiceSpec};
use crate::pipeline::config::EngineConfig;
use crate::pipeline::pattern::{AMBIENT, Mood};
#[cfg(test)]
use crate::pipeline::pattern::TrackRole;
use context::ContextManager;
use sequencer::Session;
use timer::TimerQueue;

const MAIN_HISS_CUTOFF: f32 = 800.0;
const MAIN_HISS_LEVEL: f32 = 0.03;
const AMBIENT_HISS_CUTOFF: f32 = 1000.0;
const AMBIENT_HISS_LEVEL: f32 = 0.05;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Main,
    Ambient,
}

pub struct AudioService {
    ctx: ContextManager,
    clock: Box<dyn Clock>,
    timers: TimerQueue<TimerEvent>,
    main: Option<Session>,
    ambient: Option<Session>,
    ambient_volume: f32,
    muted: bool,
    config: EngineConfig,
}

impl AudioService {
    pub fn new(config: EngineConfig, factory: impl DeviceFactory + 'static, clock: impl Clock + 'static) -> Self {
        // a zero beat would make every step due forever
        let config = config.validated().unwrap_or_else(|e| {
            warn!("invalid engine config, using defaults: {e:#}");
            EngineConfig::default()
        });
        Self {
            ctx: ContextManager::new(factory, config.master_gain),
            clock: Box::new(clock),
            timers: TimerQueue::new(),
            main: None,
            ambient: None,
            ambient_volume: config.ambient_volume,
            muted: config.start_muted,
            config,
        }
    }

    // ── one-shot effects ──────────────────────────────────────────

    pub fn play_effect(&mut self, effect: SoundEffect) {
        if self.muted || !self.ctx.ensure_ready() {
            return;
        }
        let now = self.ctx.now();
        for layer in effect.layers() {
            let spec = match layer {
                Layer::Tone(t) => instruments::tone(t, now, Output::Master),
                Layer::Sweep { waveform, from_hz, to_hz, volume, duration } => {
                    instruments::sweep(waveform, from_hz, to_hz, volume, now, duration)
                }
                Layer::Static { duration } => {
                    let Some(noise) = self.ctx.noise_buffer() else { continue };
                    instruments::static_burst(noise, now, duration)
                }
            };
            self.start_voice(spec);
        }
    }

    pub fn play_boot(&mut self) {
        self.play_effect(SoundEffect::Boot);
    }

    pub fn play_click(&mut self) {
        self.play_effect(SoundEffect::Click);
    }

    pub fn play_hover(&mut self) {
        self.play_effect(SoundEffect::Hover);
    }

    pub fn play_key_stroke(&mut self) {
        self.play_effect(SoundEffect::KeyStroke);
    }

    pub fn play_flip(&mut self) {
        self.play_effect(SoundEffect::Flip);
    }

    pub fn play_insert_tape(&mut self) {
        self.play_effect(SoundEffect::InsertTape);
    }

    pub fn play_eject_tape(&mut self) {
        self.play_effect(SoundEffect::EjectTape);
    }

    pub fn play_power_down(&mut self) {
        self.play_effect(SoundEffect::PowerDown);
    }

    pub fn play_delete(&mut self) {
        self.play_effect(SoundEffect::Delete);
    }

    pub fn play_success(&mut self) {
        self.play_effect(SoundEffect::Success);
    }

    pub fn play_error(&mut self) {
        self.play_effect(SoundEffect::Error);
    }

    pub fn play_processing(&mut self) {
        self.play_effect(SoundEffect::Processing);
    }

    pub fn play_static_noise(&mut self, seconds: f64) {
        self.play_effect(SoundEffect::Static { seconds });
    }

    // ── main loop ─────────────────────────────────────────────────

    // anything from a color class to a mood word
    pub fn start_loop(&mut self, mood_key: &str) {
        self.start_mood_loop(Mood::from_key(mood_key));
    }

    pub fn start_default_loop(&mut self) {
        self.start_mood_loop(self.config.default_mood);
    }

    pub fn start_mood_loop(&mut self, mood: Mood) {
        if self.muted || !self.ctx.ensure_ready() {
            return;
        }
        self.stop_loop();

        let mut session = Session::new(mood.pattern(), Some(mood), Output::Master, self.clock.now());
        if let Some(noise) = self.ctx.noise_buffer() {
            let spec = instruments::hiss(noise, MAIN_HISS_CUTOFF, MAIN_HISS_LEVEL, self.ctx.now(), Output::Master);
            session.hiss = Some(spec.id);
            session.track_node(LiveNode::of(&spec), self.ctx.now());
            self.start_voice(spec);
        }
        debug!(mood = mood.label(), "main loop started");
        self.main = Some(session);
        self.kick_off(Slot::Main);
    }

    // hard stop, no fade
    pub fn stop_loop(&mut self) {
        let Some(mut session) = self.main.take() else {
            return;
        };
        let now = self.ctx.now();
        for id in session.dismantle(&mut self.timers, now) {
            self.ctx.submit(GraphCommand::StopVoice { id, at: now });
        }
        debug!(pattern = session.pattern.name, "main loop stopped");
    }

    // ── ambient loop ──────────────────────────────────────────────

    pub fn start_ambient_loop(&mut self) {
        if self.muted || !self.ctx.ensure_ready() {
            return;
        }

        if let Some(session) = self.ambient.as_mut() {
            if let Some(teardown) = session.teardown.take() {
                // stopped a moment ago and still fading: keep the session
                self.timers.cancel(teardown);
                session.running = true;
                debug!("ambient teardown cancelled by restart");
            }
            if session.running {
                self.set_ambient_volume(self.ambient_volume);
                return;
            }
        }

        let now = self.ctx.now();
        let bus = next_bus_id();
        self.ctx.submit(GraphCommand::CreateBus {
            id: bus,
            gain: Automation::starting_at(now, 0.0)
                .linear_to(now + self.config.ambient_fade_in_seconds, self.ambient_volume),
        });

        let mut session = Session::new(&AMBIENT, None, Output::Bus(bus), self.clock.now());
        if let Some(noise) = self.ctx.noise_buffer() {
            let spec = instruments::hiss(noise, AMBIENT_HISS_CUTOFF, AMBIENT_HISS_LEVEL, now, Output::Bus(bus));
            session.hiss = Some(spec.id);
            session.track_node(LiveNode::of(&spec), now);
            self.start_voice(spec);
        }
        debug!(?bus, "ambient loop started");
        self.ambient = Some(session);
        self.kick_off(Slot::Ambient);
    }

    /// Fades the ambient loop out and tears it down once the fade is over.
    /// The session counts as stopped right away.
    pub fn stop_ambient_loop(&mut self) {
        let Some(session) = self.ambient.as_mut() else {
            return;
        };
        session.running = false;
        if let Some(pending) = session.teardown.take() {
            self.timers.cancel(pending);
        }

        if let Some(bus) = session.bus {
            self.ctx.submit(GraphCommand::MoveBusGain {
                id: bus,
                at: self.ctx.now(),
                change: GainMove::Linear { to: 0.0, over: self.config.ambient_fade_out_seconds },
            });
        }
        let due = self.clock.now() + self.config.ambient_teardown_seconds;
        session.teardown = Some(self.timers.schedule(due, TimerEvent::AmbientTeardown { session: session.id }));
        debug!("ambient loop fading out");
    }

    pub fn set_ambient_volume(&mut self, level: f32) {
        self.ambient_volume = level.clamp(0.0, 1.0);
        let Some(session) = self.ambient.as_ref().filter(|s| s.running) else {
            return;
        };
        if let Some(bus) = session.bus {
            self.ctx.submit(GraphCommand::MoveBusGain {
                id: bus,
                at: self.ctx.now(),
                change: GainMove::Approach {
                    to: self.ambient_volume,
                    time_constant: self.config.ambient_volume_time_constant,
                },
            });
        }
    }

    pub fn ambient_volume(&self) -> f32 {
        self.ambient_volume
    }

    fn teardown_ambient(&mut self) {
        let Some(mut session) = self.ambient.take() else {
            return;
        };
        let now = self.ctx.now();
        for id in session.dismantle(&mut self.timers, now) {
            self.ctx.submit(GraphCommand::StopVoice { id, at: now });
        }
        if let Some(bus) = session.bus {
            self.ctx.submit(GraphCommand::RemoveBus { id: bus });
        }
        debug!("ambient loop torn down");
    }

    // ── transport ─────────────────────────────────────────────────

    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while let Some((id, _, event)) = self.timers.pop_due(now) {
            fired += 1;
            match event {
                TimerEvent::Step { session, track } => {
                    let slot = match (&self.main, &self.ambient) {
                        (Some(s), _) if s.id == session => Slot::Main,
                        (_, Some(s)) if s.id == session => Slot::Ambient,
                        _ => continue,
                    };
                    self.run_step(slot, track);
                }
                TimerEvent::AmbientTeardown { session } => {
                    let current = self
                        .ambient
                        .as_ref()
                        .is_some_and(|s| s.id == session && s.teardown == Some(id));
                    if current {
                        self.teardown_ambient();
                    }
                }
            }
        }
        fired
    }

    fn kick_off(&mut self, slot: Slot) {
        let tracks = self.session(slot).map_or(0, |s| s.tracks.len());
        for track in 0..tracks {
            self.run_step(slot, track);
        }
    }

    // Plays the track's current step and books the next one. Mute only
    // silences the step; the chain keeps its place.
    fn run_step(&mut self, slot: Slot, track: usize) {
        let beat = self.config.beat_seconds;
        let playing = !self.muted && self.ctx.is_running();
        let now = self.ctx.now();
        let clock_now = self.clock.now();
        let noise = if playing { self.ctx.noise_buffer() } else { None };

        let session = match slot {
            Slot::Main => self.main.as_mut(),
            Slot::Ambient => self.ambient.as_mut(),
        };
        let Some(session) = session else { return };
        let Some(handle) = session.tracks.get_mut(track) else { return };

        let role = handle.role();
        let step = handle.advance();
        let duration = step.duration(beat);
        handle.reschedule(duration, clock_now, &mut self.timers, TimerEvent::Step { session: session.id, track });

        if !playing {
            return;
        }
        if let Some(spec) = instruments::for_step(role, &step, now, duration, session.output, noise.as_ref()) {
            session.track_node(LiveNode::of(&spec), now);
            self.ctx.submit(GraphCommand::StartVoice(Box::new(spec)));
        }
    }

    fn start_voice(&mut self, spec: VoiceSpec) {
        self.ctx.submit(GraphCommand::StartVoice(Box::new(spec)));
    }

    fn session(&self, slot: Slot) -> Option<&Session> {
        match slot {
            Slot::Main => self.main.as_ref(),
            Slot::Ambient => self.ambient.as_ref(),
        }
    }

    // ── mute / gesture ────────────────────────────────────────────

    pub fn resume_on_user_gesture(&mut self) {
        self.ctx.resume_on_user_gesture();
    }

    pub fn set_muted(&mut self, muted: bool) {
        if self.muted != muted {
            debug!(muted, "mute toggled");
        }
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    // ── introspection ─────────────────────────────────────────────

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn live_node_count(&self) -> usize {
        let now = self.ctx.now();
        [&self.main, &self.ambient]
            .into_iter()
            .flatten()
            .map(|s| s.sounding(now).count())
            .sum()
    }

    pub fn is_looping(&self) -> bool {
        self.main.is_some()
    }

    pub fn is_ambient_playing(&self) -> bool {
        self.ambient.as_ref().is_some_and(|s| s.running)
    }

    pub fn current_mood(&self) -> Option<Mood> {
        self.main.as_ref().and_then(|s| s.mood)
    }

    #[cfg(test)]
    pub fn track_position(&self, role: TrackRole) -> Option<usize> {
        [&self.main, &self.ambient]
            .into_iter()
            .flatten()
            .find_map(|s| s.track(role))
            .map(TrackHandle::position)
    }

    // main loop first
    pub fn tracks(&self) -> impl Iterator<Item = &TrackHandle> {
        [&self.main, &self.ambient]
            .into_iter()
            .flatten()
            .flat_map(|s| s.tracks.iter())
    }

    #[cfg(test)]
    pub fn steps_played(&self, role: TrackRole) -> Option<u64> {
        [&self.main, &self.ambient]
            .into_iter()
            .flatten()
            .find_map(|s| s.track(role))
            .map(TrackHandle::steps_played)
    }

    pub fn is_audio_running(&self) -> bool {
        self.ctx.is_running()
    }

    pub fn is_audio_open(&self) -> bool {
        self.ctx.is_open()
    }

    pub fn is_audio_unavailable(&self) -> bool {
        self.ctx.is_unavailable()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

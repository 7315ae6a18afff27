use tracing::debug;

use crate::deck::{AudioService, SoundEffect};
use crate::pipeline::config::EngineConfig;
use crate::shared::{AudioStatus, DisplayState, InputEvent, Lane};

// Sits between the terminal and the sound service: turns input events into
// service calls and keeps the display state the TUI draws from.
pub struct Middle {
    pub service: AudioService,
    display: DisplayState,
}

impl Middle {
    pub fn new(service: AudioService) -> Self {
        let mut middle = Self {
            service,
            display: DisplayState::default(),
        };
        middle.refresh();
        middle
    }

    pub fn display_state(&self) -> &DisplayState {
        &self.display
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        // any key counts as a user gesture
        self.service.resume_on_user_gesture();

        let text = match event {
            InputEvent::StartMood(mood) => {
                self.service.start_mood_loop(mood);
                format!("PLAY {}", mood.label().to_uppercase())
            }
            InputEvent::StartDefaultLoop => {
                self.service.start_default_loop();
                String::from("PLAY TAPE")
            }
            InputEvent::StopLoop => {
                self.service.stop_loop();
                String::from("STOP")
            }
            InputEvent::ToggleAmbient => {
                if self.service.is_ambient_playing() {
                    self.service.stop_ambient_loop();
                    String::from("AMBIENT OFF")
                } else {
                    self.service.start_ambient_loop();
                    String::from("AMBIENT ON")
                }
            }
            InputEvent::AmbientVolume(delta) => {
                let level = self.service.ambient_volume() + delta;
                self.service.set_ambient_volume(level);
                format!("VOL {:.0}%", self.service.ambient_volume() * 100.0)
            }
            InputEvent::ToggleMute => {
                let muted = !self.service.is_muted();
                self.service.set_muted(muted);
                String::from(if muted { "MUTED" } else { "UNMUTED" })
            }
            InputEvent::Effect(effect) => {
                self.play(effect);
                format!("FX {}", effect.name().to_uppercase())
            }
            InputEvent::Quit => String::from("BYE"),
        };
        debug!(?event, "input handled");
        self.display.display_text = text;
        self.refresh();
    }

    fn play(&mut self, effect: SoundEffect) {
        let svc = &mut self.service;
        match effect {
            SoundEffect::Boot => svc.play_boot(),
            SoundEffect::Click => svc.play_click(),
            SoundEffect::Hover => svc.play_hover(),
            SoundEffect::KeyStroke => svc.play_key_stroke(),
            SoundEffect::Flip => svc.play_flip(),
            SoundEffect::InsertTape => svc.play_insert_tape(),
            SoundEffect::EjectTape => svc.play_eject_tape(),
            SoundEffect::PowerDown => svc.play_power_down(),
            SoundEffect::Delete => svc.play_delete(),
            SoundEffect::Success => svc.play_success(),
            SoundEffect::Error => svc.play_error(),
            SoundEffect::Processing => svc.play_processing(),
            SoundEffect::Static { seconds } => svc.play_static_noise(seconds),
        }
    }

    // drives the sequencer; call once per frame
    pub fn tick(&mut self) {
        self.service.tick();
        self.refresh();
    }

    pub fn config_to_save(&self) -> EngineConfig {
        let mut config = self.service.config().clone();
        config.ambient_volume = self.service.ambient_volume();
        config.start_muted = self.service.is_muted();
        config
    }

    fn refresh(&mut self) {
        let svc = &self.service;
        let d = &mut self.display;
        d.status = if svc.is_audio_unavailable() {
            AudioStatus::Unavailable
        } else if svc.is_audio_running() {
            AudioStatus::Running
        } else if svc.is_audio_open() {
            AudioStatus::Suspended
        } else {
            AudioStatus::NotStarted
        };
        d.mood = svc.current_mood();
        d.looping = svc.is_looping();
        d.ambient = svc.is_ambient_playing();
        d.ambient_volume = svc.ambient_volume();
        d.muted = svc.is_muted();
        d.pending_timers = svc.pending_timers();
        d.live_nodes = svc.live_node_count();
        d.lanes = svc
            .tracks()
            .map(|t| Lane {
                label: t.role().label(),
                steps: t.step_count(),
                position: Some(t.position()),
                played: t.steps_played(),
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioDevice, OfflineDevice};
    use crate::deck::ManualClock;
    use crate::error::AudioError;
    use crate::pipeline::pattern::Mood;
    use crate::shared::VOLUME_STEP;

    fn middle() -> Middle {
        let device = OfflineDevice::new(8_000);
        let service = AudioService::new(
            EngineConfig::default(),
            move || Ok::<_, AudioError>(Box::new(device.clone()) as Box<dyn AudioDevice>),
            ManualClock::new(),
        );
        Middle::new(service)
    }

    #[test]
    fn test_starts_idle() {
        let m = middle();
        assert_eq!(m.display_state().status, AudioStatus::NotStarted);
        assert!(m.display_state().lanes.is_empty());
    }

    #[test]
    fn test_mood_key_starts_loop_and_shows_lanes() {
        let mut m = middle();
        m.handle_input(InputEvent::StartMood(Mood::Relaxed));
        let d = m.display_state();
        assert_eq!(d.status, AudioStatus::Running);
        assert_eq!(d.mood, Some(Mood::Relaxed));
        assert_eq!(d.lanes.len(), 5);
        assert_eq!(d.lanes[0].label, "melody");
        assert_eq!(d.lanes[0].position, Some(1));
        assert_eq!(d.display_text, "PLAY RELAXED");

        m.handle_input(InputEvent::StopLoop);
        assert!(!m.display_state().looping);
        assert_eq!(m.display_state().pending_timers, 0);
    }

    #[test]
    fn test_ambient_toggle_and_volume() {
        let mut m = middle();
        m.handle_input(InputEvent::ToggleAmbient);
        assert!(m.display_state().ambient);
        m.handle_input(InputEvent::AmbientVolume(-VOLUME_STEP));
        assert!((m.display_state().ambient_volume - 0.45).abs() < 1e-6);
        m.handle_input(InputEvent::ToggleAmbient);
        assert!(!m.display_state().ambient);
    }

    #[test]
    fn test_effect_events_start_voices() {
        let device = OfflineDevice::new(8_000);
        let handle = device.clone();
        let service = AudioService::new(
            EngineConfig::default(),
            move || Ok::<_, AudioError>(Box::new(handle.clone()) as Box<dyn AudioDevice>),
            ManualClock::new(),
        );
        let mut m = Middle::new(service);
        m.handle_input(InputEvent::Effect(SoundEffect::Success));
        assert_eq!(device.active_voices(), 3);
        m.handle_input(InputEvent::Effect(SoundEffect::Static { seconds: 0.5 }));
        assert_eq!(device.active_voices(), 4);
        assert_eq!(m.display_state().display_text, "FX STATIC");
    }

    #[test]
    fn test_mute_is_saved() {
        let mut m = middle();
        m.handle_input(InputEvent::ToggleMute);
        m.handle_input(InputEvent::Effect(SoundEffect::Click));
        assert!(m.display_state().muted);
        assert_eq!(m.display_state().display_text, "FX CLICK");
        assert!(m.config_to_save().start_muted);
    }
}

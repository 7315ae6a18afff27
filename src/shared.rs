// Types shared between the terminal front-end and the middle layer.
//
// Keys (the TUI resolves these into InputEvents):
//   1 2 3 4 5 6   //  StartMood(happy ... mysterious)
//   0             //  StartMood(neutral)
//   l             //  StartDefaultLoop
//   s             //  StopLoop
//   a             //  ToggleAmbient
//   [ / ]         //  AmbientVolume(-0.05 or 0.05)
//   m             //  ToggleMute
//   ?             //  help overlay, stays in the TUI
//   Esc / Q       //  Quit
//
// Effects:
//   b boot   c click   h hover   k keystroke   f flip   i insert   e eject
//   p power-down   d delete   y success   x error   g processing   n static
//
// The middle layer owns the sound service; the TUI only draws DisplayState.

use crate::deck::SoundEffect;
use crate::pipeline::pattern::Mood;

pub const VOLUME_STEP: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    StartMood(Mood),
    StartDefaultLoop,
    StopLoop,
    ToggleAmbient,
    AmbientVolume(f32),
    ToggleMute,
    Effect(SoundEffect),
    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lane {
    pub label: &'static str,
    pub steps: usize,
    pub position: Option<usize>, // None while the lane isn't running
    pub played: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioStatus {
    NotStarted,
    Suspended,
    Running,
    Unavailable,
}

impl AudioStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AudioStatus::NotStarted => "IDLE",
            AudioStatus::Suspended => "SUSPENDED",
            AudioStatus::Running => "RUNNING",
            AudioStatus::Unavailable => "NO AUDIO",
        }
    }
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub status: AudioStatus,
    pub mood: Option<Mood>,
    pub looping: bool,
    pub ambient: bool,
    pub ambient_volume: f32,
    pub muted: bool,
    pub lanes: Vec<Lane>,
    pub pending_timers: usize,
    pub live_nodes: usize,
    pub display_text: String, // last thing that happened, e.g. "FX SUCCESS"
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            status: AudioStatus::NotStarted,
            mood: None,
            looping: false,
            ambient: false,
            ambient_volume: 0.0,
            muted: false,
            lanes: Vec::new(),
            pending_timers: 0,
            live_nodes: 0,
            display_text: String::from("READY"),
        }
    }
}

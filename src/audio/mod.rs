use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, error, info, warn};

use crate::audio_api::GraphCommand;
use crate::error::AudioError;

mod device;
mod engine;
mod filter;
mod frame;
mod node_id;
mod noise;
mod param;
mod voice;

pub use device::{AudioDevice, DeviceFactory, DeviceState, OfflineDevice};
pub use frame::StereoFrame;
pub use node_id::{next_bus_id, next_node_id};
pub use noise::NoiseBuffer;
pub use param::{Automation, SILENCE_FLOOR};
#[cfg(test)]
pub use param::ParamEvent;

use engine::Engine;

// The live output session. The stream is built paused; the sound service
// resumes it on the first sound request (or an explicit user gesture).
pub struct AudioHandle {
    tx: Sender<GraphCommand>,
    backlog: Backlog,
    frames_rendered: Arc<AtomicU64>,
    sample_rate: u32,
    state: DeviceState,
    stream: cpal::Stream,
}

impl AudioDevice for AudioHandle {
    fn state(&self) -> DeviceState {
        self.state
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.stream.play()?;
        self.state = DeviceState::Running;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.frames_rendered.load(Ordering::Relaxed) as f64 / self.sample_rate as f64
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn submit(&mut self, cmd: GraphCommand) {
        match self.tx.try_send(cmd) {
            Ok(()) => {
                if let Some(dropped) = self.backlog.sent() {
                    debug!(dropped, "audio command queue drained");
                }
            }
            Err(TrySendError::Full(_)) => {
                if self.backlog.dropped() {
                    warn!("audio command queue full, dropping commands");
                }
            }
            Err(TrySendError::Disconnected(_)) => {
                if self.backlog.dropped() {
                    warn!("{}", AudioError::Unavailable);
                }
            }
        }
    }
}

// Counts commands lost to a full or closed queue so only the first of a run
// gets logged.
#[derive(Debug, Default)]
struct Backlog {
    dropped: u64,
}

impl Backlog {
    // true for the first drop of a run
    fn dropped(&mut self) -> bool {
        self.dropped += 1;
        self.dropped == 1
    }

    // how many were lost, once the queue takes commands again
    fn sent(&mut self) -> Option<u64> {
        (self.dropped > 0).then(|| std::mem::take(&mut self.dropped))
    }
}

pub fn start_audio() -> Result<AudioHandle, AudioError> {
    let (tx, rx) = crossbeam_channel::bounded::<GraphCommand>(1024);

    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoOutputDevice)?;
    let config = device.default_output_config()?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;
    info!(sample_rate, channels, "opening audio output");

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let frames_rendered = Arc::new(AtomicU64::new(0));
            let stream = build_output_stream_f32(
                &device,
                &config.into(),
                rx,
                Arc::clone(&frames_rendered),
                sample_rate,
                channels,
            )?;
            // some hosts start streams on build; keep it quiet until someone resumes
            if let Err(e) = stream.pause() {
                warn!("could not pause fresh output stream: {e}");
            }

            Ok(AudioHandle {
                tx,
                backlog: Backlog::default(),
                frames_rendered,
                sample_rate,
                state: DeviceState::Suspended,
                stream,
            })
        }
        other => Err(AudioError::UnsupportedFormat(other)),
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<GraphCommand>,
    frames_rendered: Arc<AtomicU64>,
    sample_rate: u32,
    channels: usize,
) -> Result<cpal::Stream, AudioError> {
    let mut engine = Engine::new(sample_rate);
    let mut scratch: Vec<StereoFrame> = Vec::with_capacity(4096);

    let err_fn = |err| error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            scratch.clear();
            scratch.resize(n_frames, StereoFrame::zero());
            engine.render_block(&mut scratch);

            // spread the stereo mix over however many channels the device has
            for (out, frame) in data.chunks_mut(channels.max(1)).zip(scratch.iter()) {
                match out {
                    [mono] => *mono = 0.5 * (frame.left + frame.right),
                    [left, right, rest @ ..] => {
                        *left = frame.left;
                        *right = frame.right;
                        rest.fill(0.0);
                    }
                    [] => {}
                }
            }

            frames_rendered.store(engine.frames_rendered(), Ordering::Relaxed);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backlog_reports_first_drop_of_a_run() {
        let mut backlog = Backlog::default();
        assert_eq!(backlog.sent(), None);
        assert!(backlog.dropped());
        assert!(!backlog.dropped());
        assert!(!backlog.dropped());
        assert_eq!(backlog.sent(), Some(3));
        assert_eq!(backlog.sent(), None);
        assert!(backlog.dropped());
    }
}

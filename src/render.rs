// Offline bounce: drives the sound service against an in-process engine and
// a manual clock, so a loop can be written to disk faster than real time.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::audio::{AudioDevice, OfflineDevice, StereoFrame};
use crate::deck::{AudioService, Clock, ManualClock};
use crate::error::AudioError;
use crate::pipeline::config::EngineConfig;
use crate::pipeline::pattern::Mood;

pub const RENDER_SAMPLE_RATE: u32 = 44_100;
const BLOCK_FRAMES: usize = 512;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    Mood(Mood),
    Ambient,
}

impl RenderTarget {
    // "ambient" or anything the mood matcher understands
    pub fn parse(arg: &str) -> Self {
        if arg.eq_ignore_ascii_case("ambient") {
            RenderTarget::Ambient
        } else {
            RenderTarget::Mood(Mood::from_key(arg))
        }
    }
}

#[derive(Debug)]
pub struct RenderSummary {
    pub frames: usize,
    pub peak: f32,
    pub voices_at_end: usize,
}

fn to_pcm_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

pub fn render_to_wav(
    target: RenderTarget,
    seconds: f64,
    path: &Path,
    config: EngineConfig,
) -> anyhow::Result<RenderSummary> {
    anyhow::ensure!(seconds.is_finite() && seconds > 0.0, "length must be positive, got {seconds}");

    let device = OfflineDevice::new(RENDER_SAMPLE_RATE);
    let clock = ManualClock::new();
    let handle = device.clone();
    let mut service = AudioService::new(
        config,
        move || Ok::<_, AudioError>(Box::new(handle.clone()) as Box<dyn AudioDevice>),
        clock.clone(),
    );
    // the offline device never suspends, and nothing should be muted in a bounce
    service.set_muted(false);

    match target {
        RenderTarget::Mood(mood) => service.start_mood_loop(mood),
        RenderTarget::Ambient => service.start_ambient_loop(),
    }

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: RENDER_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("could not create {}", path.display()))?;

    let total = (seconds * RENDER_SAMPLE_RATE as f64).round() as usize;
    let mut block = vec![StereoFrame::zero(); BLOCK_FRAMES];
    let mut written = 0;
    let mut peak = 0.0f32;

    while written < total {
        let n = BLOCK_FRAMES.min(total - written);
        // timers fire at block granularity, about 12 ms
        clock.set(written as f64 / RENDER_SAMPLE_RATE as f64);
        service.tick();
        device.render(&mut block[..n]);

        for frame in &block[..n] {
            peak = peak.max(frame.left.abs()).max(frame.right.abs());
            writer.write_sample(to_pcm_i16(frame.left))?;
            writer.write_sample(to_pcm_i16(frame.right))?;
        }
        written += n;
    }
    writer.finalize().context("could not finish wav file")?;

    let voices_at_end = device.active_voices();
    info!(
        path = %path.display(),
        frames = written,
        peak,
        voices_at_end,
        seconds = clock.now(),
        "render finished"
    );
    Ok(RenderSummary { frames: written, peak, voices_at_end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(RenderTarget::parse("Ambient"), RenderTarget::Ambient);
        assert_eq!(RenderTarget::parse("pink"), RenderTarget::Mood(Mood::Happy));
        assert_eq!(RenderTarget::parse("nope"), RenderTarget::Mood(Mood::Neutral));
    }

    #[test]
    fn test_renders_audible_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("happy.wav");
        let summary = render_to_wav(RenderTarget::Mood(Mood::Happy), 1.0, &path, EngineConfig::default()).unwrap();
        assert_eq!(summary.frames, RENDER_SAMPLE_RATE as usize);
        assert!(summary.peak > 0.0 && summary.peak <= 1.0);
        // at least the hiss bed is still running
        assert!(summary.voices_at_end >= 1);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.duration(), RENDER_SAMPLE_RATE);
    }

    #[test]
    fn test_ambient_fades_in_from_silence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ambient.wav");
        render_to_wav(RenderTarget::Ambient, 0.5, &path, EngineConfig::default()).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        let loudest = |range: std::ops::Range<usize>| {
            samples[range].iter().map(|s| s.unsigned_abs()).max().unwrap_or(0)
        };
        // first 10 ms against the last 100 ms, both channels interleaved
        let early = loudest(0..882);
        let late = loudest(samples.len() - 8820..samples.len());
        assert!(early < late, "{early} !< {late}");
    }

    #[test]
    fn test_rejects_non_positive_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.wav");
        assert!(render_to_wav(RenderTarget::Ambient, 0.0, &path, EngineConfig::default()).is_err());
    }
}

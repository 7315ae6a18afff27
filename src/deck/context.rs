use tracing::{debug, error, info, warn};

use crate::audio::{AudioDevice, DeviceFactory, DeviceState, NoiseBuffer};
use crate::audio_api::GraphCommand;

/// Owns the one audio session of the process. The device is opened on the
/// first sound request and never closed; a failed open is permanent.
pub struct ContextManager {
    factory: Box<dyn DeviceFactory>,
    device: Option<Box<dyn AudioDevice>>,
    unavailable: bool,
    master_gain: f32,
    noise: Option<NoiseBuffer>,
}

impl ContextManager {
    pub fn new(factory: impl DeviceFactory + 'static, master_gain: f32) -> Self {
        Self {
            factory: Box::new(factory),
            device: None,
            unavailable: false,
            master_gain,
            noise: None,
        }
    }

    /// Opens the session if needed and resumes it if suspended. Returns true
    /// only when sound can actually be produced right now.
    pub fn ensure_ready(&mut self) -> bool {
        if self.unavailable {
            return false;
        }
        if self.device.is_none() {
            match self.factory.open() {
                Ok(mut device) => {
                    info!(sample_rate = device.sample_rate(), "audio session opened");
                    device.submit(GraphCommand::SetMasterGain(self.master_gain));
                    self.device = Some(device);
                }
                Err(e) => {
                    // logged once; from here on everything is a silent no-op
                    error!("audio unavailable, sound disabled: {e}");
                    self.unavailable = true;
                    return false;
                }
            }
        }
        self.try_resume()
    }

    // does not open a session nobody asked for yet
    pub fn resume_on_user_gesture(&mut self) {
        if self.device.is_some() {
            self.try_resume();
        }
    }

    fn try_resume(&mut self) -> bool {
        let Some(device) = self.device.as_mut() else {
            return false;
        };
        if device.state() == DeviceState::Running {
            return true;
        }
        match device.resume() {
            Ok(()) => {
                debug!("audio session resumed");
                true
            }
            Err(e) => {
                warn!("audio session still suspended: {e}");
                false
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.device
            .as_ref()
            .is_some_and(|d| d.state() == DeviceState::Running)
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    pub fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    pub fn now(&self) -> f64 {
        self.device.as_ref().map_or(0.0, |d| d.current_time())
    }

    // Used for teardown too, so it deliberately skips the running check:
    // stopping nodes on a suspended session is still correct bookkeeping.
    pub fn submit(&mut self, cmd: GraphCommand) {
        if let Some(device) = self.device.as_mut() {
            device.submit(cmd);
        }
    }

    pub fn noise_buffer(&mut self) -> Option<NoiseBuffer> {
        let sample_rate = self.device.as_ref()?.sample_rate();
        Some(
            self.noise
                .get_or_insert_with(|| NoiseBuffer::generate(sample_rate))
                .clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::testing::SpyDevice;
    use crate::error::AudioError;

    #[test]
    fn test_opens_lazily_and_sets_master_gain() {
        let spy = SpyDevice::new();
        let mut opened = 0;
        let handle = spy.clone();
        let mut ctx = ContextManager::new(
            move || {
                opened += 1;
                assert_eq!(opened, 1, "device opened twice");
                Ok::<_, AudioError>(Box::new(handle.clone()) as Box<dyn AudioDevice>)
            },
            0.5,
        );
        assert!(!ctx.is_running());
        assert_eq!(spy.commands().len(), 0);

        assert!(ctx.ensure_ready());
        assert!(ctx.ensure_ready());
        let cmds = spy.commands();
        assert_eq!(cmds.len(), 1);
        assert!(matches!(cmds[0], GraphCommand::SetMasterGain(g) if g == 0.5));
    }

    #[test]
    fn test_open_failure_is_permanent() {
        let mut attempts = 0;
        let mut ctx = ContextManager::new(
            move || {
                attempts += 1;
                assert_eq!(attempts, 1, "retried a failed open");
                Err::<Box<dyn AudioDevice>, _>(AudioError::NoOutputDevice)
            },
            0.5,
        );
        assert!(!ctx.ensure_ready());
        assert!(!ctx.ensure_ready());
        assert!(ctx.is_unavailable());
        assert!(ctx.noise_buffer().is_none());
    }

    #[test]
    fn test_suspended_until_gesture_allows_resume() {
        let spy = SpyDevice::suspended();
        spy.refuse_resume(true);
        let mut ctx = ContextManager::new(spy.factory(), 0.5);

        assert!(!ctx.ensure_ready());
        ctx.resume_on_user_gesture();
        assert!(!ctx.is_running());

        spy.refuse_resume(false);
        ctx.resume_on_user_gesture();
        assert!(ctx.is_running());
        assert!(ctx.ensure_ready());
    }

    #[test]
    fn test_noise_buffer_is_shared() {
        let spy = SpyDevice::new();
        let mut ctx = ContextManager::new(spy.factory(), 0.5);
        assert!(ctx.noise_buffer().is_none());
        ctx.ensure_ready();
        let a = ctx.noise_buffer().unwrap();
        let b = ctx.noise_buffer().unwrap();
        assert!(a.shares_storage_with(&b));
        assert_eq!(a.len(), spy.sample_rate() as usize * 2);
    }
}

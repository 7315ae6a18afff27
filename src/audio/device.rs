use std::cell::RefCell;
use std::rc::Rc;

use super::engine::Engine;
use super::frame::StereoFrame;
use crate::audio_api::GraphCommand;
use crate::error::AudioError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceState {
    Suspended,
    Running,
}

/// One open audio output session. The control side only reaches the render
/// engine through `submit`.
pub trait AudioDevice {
    fn state(&self) -> DeviceState;

    fn resume(&mut self) -> Result<(), AudioError>;

    // seconds on the render clock; voices are scheduled against this
    fn current_time(&self) -> f64;

    fn sample_rate(&self) -> u32;

    fn submit(&mut self, cmd: GraphCommand);
}

// opens a device lazily, the first time something wants to make a sound
pub trait DeviceFactory {
    fn open(&mut self) -> Result<Box<dyn AudioDevice>, AudioError>;
}

impl<F> DeviceFactory for F
where
    F: FnMut() -> Result<Box<dyn AudioDevice>, AudioError>,
{
    fn open(&mut self) -> Result<Box<dyn AudioDevice>, AudioError> {
        self()
    }
}

// Renders in-process instead of on a device callback. Clones share the same
// engine, so whoever drives `render` sees everything the service submitted.
#[derive(Clone)]
pub struct OfflineDevice {
    engine: Rc<RefCell<Engine>>,
}

impl OfflineDevice {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            engine: Rc::new(RefCell::new(Engine::new(sample_rate))),
        }
    }

    pub fn render(&self, out: &mut [StereoFrame]) {
        self.engine.borrow_mut().render_block(out);
    }

    pub fn active_voices(&self) -> usize {
        self.engine.borrow().active_voices()
    }
}

impl AudioDevice for OfflineDevice {
    fn state(&self) -> DeviceState {
        DeviceState::Running
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.engine.borrow().now()
    }

    fn sample_rate(&self) -> u32 {
        self.engine.borrow().sample_rate()
    }

    fn submit(&mut self, cmd: GraphCommand) {
        self.engine.borrow_mut().handle_cmd(cmd);
    }
}

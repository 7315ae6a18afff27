use std::cell::RefCell;
use std::rc::Rc;

use crate::audio::{AudioDevice, DeviceState};
use crate::audio_api::{BusId, GraphCommand, NodeId, VoiceSpec};
use crate::error::AudioError;

pub const SPY_SAMPLE_RATE: u32 = 8_000;

struct SpyState {
    commands: Vec<GraphCommand>,
    state: DeviceState,
    refuse_resume: bool,
    time: f64,
}

// Records everything the service submits. Clones share one recording so the
// test keeps a handle while the service owns the boxed device.
#[derive(Clone)]
pub struct SpyDevice {
    inner: Rc<RefCell<SpyState>>,
}

impl SpyDevice {
    pub fn new() -> Self {
        Self::with_state(DeviceState::Running)
    }

    pub fn suspended() -> Self {
        Self::with_state(DeviceState::Suspended)
    }

    fn with_state(state: DeviceState) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SpyState {
                commands: Vec::new(),
                state,
                refuse_resume: false,
                time: 0.0,
            })),
        }
    }

    pub fn factory(&self) -> impl FnMut() -> Result<Box<dyn AudioDevice>, AudioError> + 'static {
        let spy = self.clone();
        move || Ok(Box::new(spy.clone()) as Box<dyn AudioDevice>)
    }

    pub fn refuse_resume(&self, refuse: bool) {
        self.inner.borrow_mut().refuse_resume = refuse;
    }

    pub fn set_time(&self, time: f64) {
        self.inner.borrow_mut().time = time;
    }

    pub fn commands(&self) -> Vec<GraphCommand> {
        self.inner.borrow().commands.clone()
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().commands.clear();
    }

    pub fn started_voices(&self) -> Vec<VoiceSpec> {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                GraphCommand::StartVoice(spec) => Some((**spec).clone()),
                _ => None,
            })
            .collect()
    }

    pub fn stopped_voices(&self) -> Vec<NodeId> {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                GraphCommand::StopVoice { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn created_buses(&self) -> Vec<BusId> {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                GraphCommand::CreateBus { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn removed_buses(&self) -> Vec<BusId> {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                GraphCommand::RemoveBus { id } => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl AudioDevice for SpyDevice {
    fn state(&self) -> DeviceState {
        self.inner.borrow().state
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        let mut inner = self.inner.borrow_mut();
        if inner.refuse_resume {
            return Err(AudioError::Unavailable);
        }
        inner.state = DeviceState::Running;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.inner.borrow().time
    }

    fn sample_rate(&self) -> u32 {
        SPY_SAMPLE_RATE
    }

    fn submit(&mut self, cmd: GraphCommand) {
        self.inner.borrow_mut().commands.push(cmd);
    }
}

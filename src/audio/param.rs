// Scheduled parameter values, evaluated per sample by the render engine.
//
// Times are in seconds on the device clock. Events are kept in the order they
// were pushed, which callers keep non-decreasing in time.

// exponential curves can't touch zero, envelopes decay toward this instead
pub const SILENCE_FLOOR: f32 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamEvent {
    Set { at: f64, value: f32 },
    LinearTo { at: f64, value: f32 },
    ExponentialTo { at: f64, value: f32 },
    Approach { at: f64, target: f32, time_constant: f64 },
}

impl ParamEvent {
    pub fn time(&self) -> f64 {
        match *self {
            ParamEvent::Set { at, .. }
            | ParamEvent::LinearTo { at, .. }
            | ParamEvent::ExponentialTo { at, .. }
            | ParamEvent::Approach { at, .. } => at,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Automation {
    default: f32,
    events: Vec<ParamEvent>,
}

impl Automation {
    pub fn constant(value: f32) -> Self {
        Self { default: value, events: Vec::new() }
    }

    pub fn starting_at(at: f64, value: f32) -> Self {
        Self::constant(value).set(at, value)
    }

    pub fn set(mut self, at: f64, value: f32) -> Self {
        self.events.push(ParamEvent::Set { at, value });
        self
    }

    pub fn linear_to(mut self, at: f64, value: f32) -> Self {
        self.events.push(ParamEvent::LinearTo { at, value });
        self
    }

    pub fn exponential_to(mut self, at: f64, value: f32) -> Self {
        self.events.push(ParamEvent::ExponentialTo { at, value });
        self
    }

    pub fn approach(mut self, at: f64, target: f32, time_constant: f64) -> Self {
        self.events.push(ParamEvent::Approach { at, target, time_constant });
        self
    }

    #[cfg(test)]
    pub fn events(&self) -> &[ParamEvent] {
        &self.events
    }

    #[cfg(test)]
    pub fn initial_value(&self) -> f32 {
        self.events
            .iter()
            .find_map(|e| match *e {
                ParamEvent::Set { value, .. } => Some(value),
                _ => None,
            })
            .unwrap_or(self.default)
    }

    pub fn value_at(&self, time: f64) -> f32 {
        let mut value = self.default;
        let mut since = f64::NEG_INFINITY;

        for (i, event) in self.events.iter().enumerate() {
            match *event {
                ParamEvent::Set { at, value: v } => {
                    if at > time {
                        break;
                    }
                    value = v;
                    since = at;
                }
                ParamEvent::LinearTo { at, value: v } => {
                    if at <= time {
                        value = v;
                        since = at;
                        continue;
                    }
                    if !since.is_finite() || at <= since {
                        break;
                    }
                    let progress = ((time - since) / (at - since)) as f32;
                    return value + (v - value) * progress;
                }
                ParamEvent::ExponentialTo { at, value: v } => {
                    if at <= time {
                        value = v;
                        since = at;
                        continue;
                    }
                    // a curve between zero or opposite signs is undefined; hold
                    if !since.is_finite() || at <= since || value == 0.0 || v * value <= 0.0 {
                        break;
                    }
                    let progress = (time - since) / (at - since);
                    return value * (v / value).powf(progress as f32);
                }
                ParamEvent::Approach { at, target, time_constant } => {
                    if at > time {
                        break;
                    }
                    // a later event takes over once it is reached
                    let until = match self.events.get(i + 1) {
                        Some(next) if next.time() <= time => next.time(),
                        _ => time,
                    };
                    let elapsed = (until - at).max(0.0);
                    let decay = if time_constant > 0.0 {
                        (-elapsed / time_constant).exp() as f32
                    } else {
                        0.0
                    };
                    value = target + (value - target) * decay;
                    since = until;
                    if until >= time {
                        return value;
                    }
                }
            }
        }

        value
    }

    // freezes the curve at its value at `at` and drops everything later
    pub fn cancel_and_hold(&mut self, at: f64) {
        let held = self.value_at(at);
        self.events.clear();
        self.default = held;
        self.events.push(ParamEvent::Set { at, value: held });
    }
}

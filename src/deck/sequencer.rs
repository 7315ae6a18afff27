use std::sync::atomic::{AtomicU64, Ordering};

use super::timer::{TimerId, TimerQueue};
use crate::audio_api::{BusId, NodeId, Output, VoiceSpec};
use crate::pipeline::pattern::{Mood, NoteStep, Pattern, TrackPart, TrackRole};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        SessionId(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }
}

// what the timer queue hands back to the service when a deadline passes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Step { session: SessionId, track: usize },
    AmbientTeardown { session: SessionId },
}

// One track's self-rescheduling chain. The pending timer is the only thing
// keeping it alive; `cancel` revokes it.
pub struct TrackHandle {
    role: TrackRole,
    steps: &'static [NoteStep],
    next: usize,
    deadline: f64,
    timer: Option<TimerId>,
    played: u64,
}

impl TrackHandle {
    fn new(part: &TrackPart, start: f64) -> Self {
        Self {
            role: part.role,
            steps: part.steps,
            next: 0,
            deadline: start,
            timer: None,
            played: 0,
        }
    }

    pub fn role(&self) -> TrackRole {
        self.role
    }

    // index of the step that plays next
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    // rests included
    pub fn steps_played(&self) -> u64 {
        self.played
    }

    // returns the step to play now and wraps past the end
    pub(super) fn advance(&mut self) -> NoteStep {
        let step = self.steps[self.next % self.steps.len()];
        self.next = (self.next + 1) % self.steps.len();
        self.played += 1;
        step
    }

    // Chained off the previous deadline rather than the time the callback
    // actually ran, so late ticks don't pile up into extra drift. A track that
    // fell a whole step behind (host stall) restarts its chain from `now`
    // instead of replaying every missed step at once.
    pub(super) fn reschedule<E>(
        &mut self,
        after: f64,
        now: f64,
        timers: &mut TimerQueue<E>,
        event: E,
    ) {
        let next = self.deadline + after;
        self.deadline = if next <= now { now + after } else { next };
        self.timer = Some(timers.schedule(self.deadline, event));
    }

    pub fn cancel<E>(&mut self, timers: &mut TimerQueue<E>) {
        if let Some(id) = self.timer.take() {
            timers.cancel(id);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveNode {
    pub id: NodeId,
    pub ends_at: Option<f64>, // None runs until stopped
}

impl LiveNode {
    pub fn of(spec: &VoiceSpec) -> Self {
        Self { id: spec.id, ends_at: spec.stop }
    }

    pub fn is_sounding(&self, now: f64) -> bool {
        self.ends_at.is_none_or(|end| end > now)
    }
}

// One running loop: its tracks, the nodes it still owns, and for the ambient
// loop the sub-mix bus and the pending teardown.
pub struct Session {
    pub id: SessionId,
    pub pattern: &'static Pattern,
    pub mood: Option<Mood>,
    pub output: Output,
    pub bus: Option<BusId>,
    pub tracks: Vec<TrackHandle>,
    pub nodes: Vec<LiveNode>,
    pub hiss: Option<NodeId>,
    pub running: bool,
    pub teardown: Option<TimerId>,
}

impl Session {
    pub fn new(pattern: &'static Pattern, mood: Option<Mood>, output: Output, start: f64) -> Self {
        Self {
            id: SessionId::next(),
            pattern,
            mood,
            output,
            bus: match output {
                Output::Bus(id) => Some(id),
                Output::Master => None,
            },
            tracks: pattern.tracks.iter().map(|part| TrackHandle::new(part, start)).collect(),
            nodes: Vec::new(),
            hiss: None,
            running: true,
            teardown: None,
        }
    }

    #[cfg(test)]
    pub fn track(&self, role: TrackRole) -> Option<&TrackHandle> {
        self.tracks.iter().find(|t| t.role == role)
    }

    // forgets nodes that already ended on their own, then tracks the new one
    pub fn track_node(&mut self, node: LiveNode, now: f64) {
        self.nodes.retain(|n| n.is_sounding(now));
        self.nodes.push(node);
    }

    pub fn sounding(&self, now: f64) -> impl Iterator<Item = &LiveNode> {
        self.nodes.iter().filter(move |n| n.is_sounding(now))
    }

    pub fn cancel_timers<E>(&mut self, timers: &mut TimerQueue<E>) {
        for track in &mut self.tracks {
            track.cancel(timers);
        }
        if let Some(id) = self.teardown.take() {
            timers.cancel(id);
        }
    }

    // revokes every timer and hands back the nodes that still need a stop
    pub fn dismantle<E>(&mut self, timers: &mut TimerQueue<E>, now: f64) -> Vec<NodeId> {
        self.cancel_timers(timers);
        self.running = false;
        self.hiss = None;
        self.nodes
            .drain(..)
            .filter(|n| n.is_sounding(now))
            .map(|n| n.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pattern::{FALLBACK, HAPPY};

    #[test]
    fn test_track_wraps_to_start() {
        let mut s = Session::new(&FALLBACK, Some(Mood::Neutral), Output::Master, 0.0);
        let melody = &mut s.tracks[0];
        assert_eq!(melody.role(), TrackRole::Melody);
        let notes: Vec<&str> = (0..4).map(|_| melody.advance().note).collect();
        assert_eq!(notes, vec!["C5", "E5", "G5", "C5"]);
        assert_eq!(melody.position(), 1);
        assert_eq!(melody.steps_played(), 4);
    }

    #[test]
    fn test_reschedule_chains_deadlines() {
        let mut timers = TimerQueue::new();
        let mut s = Session::new(&HAPPY, None, Output::Master, 10.0);
        let track = &mut s.tracks[0];
        track.reschedule(0.25, 10.0, &mut timers, 0u8);
        track.reschedule(0.5, 10.26, &mut timers, 0u8);
        assert_eq!(track.deadline, 10.75);
        assert_eq!(timers.pop_due(10.3).map(|t| t.1), Some(10.25));
        track.cancel(&mut timers);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_reschedule_resyncs_after_stall() {
        let mut timers = TimerQueue::new();
        let mut s = Session::new(&HAPPY, None, Output::Master, 0.0);
        let track = &mut s.tracks[0];
        // slightly late: stays on the chain
        track.reschedule(0.25, 0.1, &mut timers, 0u8);
        assert_eq!(track.deadline, 0.25);
        // two seconds late: next step is booked one step after now
        track.reschedule(0.25, 2.0, &mut timers, 0u8);
        assert_eq!(track.deadline, 2.25);
        assert_eq!(timers.pop_due(2.0).map(|t| t.1), Some(0.25));
        assert!(timers.pop_due(2.0).is_none());
    }

    #[test]
    fn test_dismantle_only_stops_sounding_nodes() {
        let mut timers = TimerQueue::new();
        let mut s = Session::new(&HAPPY, None, Output::Master, 0.0);
        for (i, track) in s.tracks.iter_mut().enumerate() {
            track.reschedule(0.5, 0.0, &mut timers, i);
        }
        s.nodes = vec![
            LiveNode { id: NodeId(1), ends_at: Some(0.5) },
            LiveNode { id: NodeId(2), ends_at: Some(2.0) },
            LiveNode { id: NodeId(3), ends_at: None },
        ];

        let stops = s.dismantle(&mut timers, 1.0);
        assert_eq!(stops, vec![NodeId(2), NodeId(3)]);
        assert_eq!(timers.pending(), 0);
        assert!(s.nodes.is_empty());
        assert!(!s.running);
    }

    #[test]
    fn test_track_node_prunes_finished() {
        let mut s = Session::new(&HAPPY, None, Output::Master, 0.0);
        s.track_node(LiveNode { id: NodeId(1), ends_at: Some(0.1) }, 0.0);
        s.track_node(LiveNode { id: NodeId(2), ends_at: Some(0.6) }, 0.5);
        assert_eq!(s.nodes.len(), 1);
        assert_eq!(s.sounding(0.5).count(), 1);
        assert_eq!(s.sounding(0.6).count(), 0);
    }
}

use std::sync::atomic::{AtomicU64, Ordering};

use crate::audio_api::{BusId, NodeId};

static NEXT_NODE: AtomicU64 = AtomicU64::new(1);
static NEXT_BUS: AtomicU64 = AtomicU64::new(1);

// atomic counters so ids stay unique even with several services (offline renders, tests) alive
pub fn next_node_id() -> NodeId {
    NodeId(NEXT_NODE.fetch_add(1, Ordering::Relaxed))
}

pub fn next_bus_id() -> BusId {
    BusId(NEXT_BUS.fetch_add(1, Ordering::Relaxed))
}

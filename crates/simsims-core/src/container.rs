//! The two cross-place transfer primitives.
//!
//! - **Pull** ([`place_resource`]): a consumer withdraws one unit it accepts
//!   from a container.
//! - **Delivery** ([`give_resources`]): a node with waiting output hands
//!   every unit the target accepts over to it.
//!
//! Both extract under the source's lock and insert under the target's lock,
//! never holding the two at once. Because acceptance is a static type check
//! made before extraction, an extracted unit always lands in its target: a
//! unit is owned by exactly one place at any time.

use crate::config::ProductionRules;
use crate::place::Place;
use crate::resource::{Resource, ResourceKind};
use std::time::Instant;

/// Move one resource that `consumer` accepts out of `container` and into
/// `consumer`. Returns whether a transfer happened.
///
/// Safe to call concurrently from many threads on the same container; each
/// unit is withdrawn by at most one caller.
pub fn place_resource(container: &Place, consumer: &Place, rules: &ProductionRules) -> bool {
    let Some(resource) = container.take_for(consumer.kind()) else {
        return false;
    };
    let kind = resource.kind();
    if let Err(rejected) = consumer.offer(resource, rules) {
        // Unreachable while acceptance is type-only; keep the unit anyway.
        let _ = container.offer(rejected, rules);
        return false;
    }
    tracing::trace!(from = %container.id(), to = %consumer.id(), ?kind, "pulled resource");
    true
}

/// Hand the waiting units of `node` over to `target`, as many of each kind
/// as the target accepts and still has room for.
///
/// Does nothing unless the node has waiting output. Units the target does
/// not take stay queued on the node for a later delivery. Afterwards the
/// node's waiting flag reflects whether anything is left, and the node
/// rests for the delivery cooldown. Returns how many units moved.
pub fn give_resources(
    node: &Place,
    target: &Place,
    rules: &ProductionRules,
    now: Instant,
) -> usize {
    // Read before taking the node's lock.
    let mut room: Vec<(ResourceKind, usize)> = ResourceKind::ALL
        .into_iter()
        .map(|kind| (kind, target.room_for(kind)))
        .collect();

    let handed_over: Vec<Resource> = {
        let mut state = node.lock();
        if !state.waiting {
            return 0;
        }
        let mut give = Vec::new();
        let mut keep = Vec::new();
        for resource in std::mem::take(&mut state.resources) {
            match room.iter_mut().find(|(kind, _)| *kind == resource.kind()) {
                Some((_, left)) if *left > 0 => {
                    *left -= 1;
                    give.push(resource);
                }
                _ => keep.push(resource),
            }
        }
        state.resources = keep;
        state.waiting = !state.resources.is_empty();
        state.next_available = Some(now + rules.delivery_cooldown());
        give
    };

    let moved = handed_over.len();
    for resource in handed_over {
        if let Err(rejected) = target.offer(resource, rules) {
            let mut state = node.lock();
            state.resources.push(rejected);
            state.waiting = true;
        }
    }
    if moved > 0 {
        tracing::trace!(from = %node.id(), to = %target.id(), moved, "delivered output");
    }
    moved
}

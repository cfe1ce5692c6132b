//! Alliances, relation values and war membership.

use crate::defines::strategy::MAX_RELATION;
use crate::fixed::Fixed;
use crate::state::{NationId, War, WarId, WorldState};

/// Which side of a war a nation fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarSide {
    Attacker,
    Defender,
}

pub fn are_allied(state: &WorldState, a: NationId, b: NationId) -> bool {
    a != b && state.relation(a, b).allied
}

pub fn make_alliance(state: &mut WorldState, a: NationId, b: NationId) {
    if a == b {
        return;
    }
    state.relation_mut(a, b).allied = true;
}

pub fn cancel_alliance(state: &mut WorldState, a: NationId, b: NationId) {
    if let Some(rel) = state
        .diplomacy
        .relations
        .get_mut(&if a <= b { (a, b) } else { (b, a) })
    {
        rel.allied = false;
    }
}

/// Adds `delta` to the pair's relation value, clamped to ±200.
pub fn adjust_relationship(state: &mut WorldState, a: NationId, b: NationId, delta: Fixed) {
    if a == b {
        return;
    }
    let bound = Fixed::from_int(MAX_RELATION);
    let rel = state.relation_mut(a, b);
    rel.value = (rel.value + delta).clamp(-bound, bound);
}

/// Active wars with their handles.
pub fn wars(state: &WorldState) -> impl Iterator<Item = (WarId, &War)> + '_ {
    state
        .diplomacy
        .wars
        .iter()
        .enumerate()
        .filter_map(|(i, w)| w.as_ref().map(|w| (WarId(i as u32), w)))
}

pub fn war_side(war: &War, nation: NationId) -> Option<WarSide> {
    if war.attackers.contains(&nation) {
        Some(WarSide::Attacker)
    } else if war.defenders.contains(&nation) {
        Some(WarSide::Defender)
    } else {
        None
    }
}

pub fn is_at_war(state: &WorldState, nation: NationId) -> bool {
    wars(state).any(|(_, w)| w.involves(nation))
}

/// True when `a` and `b` fight on opposite sides of some war.
pub fn are_at_war(state: &WorldState, a: NationId, b: NationId) -> bool {
    wars(state).any(|(_, w)| match (war_side(w, a), war_side(w, b)) {
        (Some(sa), Some(sb)) => sa != sb,
        _ => false,
    })
}

/// `nation` is a participant of the war fought over the active crisis.
pub fn is_at_war_in_crisis(state: &WorldState, nation: NationId) -> bool {
    state
        .crisis
        .war
        .and_then(|id| state.diplomacy.wars.get(id.index()))
        .and_then(|w| w.as_ref())
        .is_some_and(|w| w.involves(nation))
}

pub fn declare_war(state: &mut WorldState, attacker: NationId, defender: NationId) -> WarId {
    let id = WarId(state.diplomacy.wars.len() as u32);
    state.diplomacy.wars.push(Some(War {
        attackers: vec![attacker],
        defenders: vec![defender],
    }));
    log::debug!("{} declared war on {}", attacker, defender);
    id
}

pub fn end_war(state: &mut WorldState, war: WarId) {
    if let Some(slot) = state.diplomacy.wars.get_mut(war.index()) {
        *slot = None;
    }
    if state.crisis.war == Some(war) {
        state.crisis.war = None;
    }
}

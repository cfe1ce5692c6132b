//! Ruling party appointment and issue rules.

use crate::state::{IssueRules, NationId, PartyId, WorldState};

pub fn can_appoint_ruling_party(state: &WorldState, nation: NationId) -> bool {
    state.nation(nation).government_can_appoint
}

pub fn is_election_ongoing(state: &WorldState, nation: NationId) -> bool {
    state.nation(nation).election_ongoing
}

/// The party is active and its ideology is permitted by the government.
pub fn party_is_allowed(state: &WorldState, nation: NationId, party: PartyId) -> bool {
    let p = state.party(party);
    let mask = 1u32.checked_shl(p.ideology as u32).unwrap_or(0);
    p.active && state.nation(nation).allowed_ideologies & mask != 0
}

pub fn appoint_ruling_party(state: &mut WorldState, nation: NationId, party: PartyId) {
    let date = state.date;
    let n = state.nation_mut(nation);
    n.ruling_party = Some(party);
    n.ruling_party_last_appointed = Some(date);
    recompute_issue_rules(state, nation);
    log::debug!("{} appointed {}", nation, state.party(party).name);
}

/// Combined rules = base rules | ruling party rules.
pub fn recompute_issue_rules(state: &mut WorldState, nation: NationId) {
    let party_rules = state
        .nation(nation)
        .ruling_party
        .map(|p| state.party(p).issue_rules)
        .unwrap_or(IssueRules::NONE);
    let n = state.nation_mut(nation);
    n.issue_rules = n.base_issue_rules | party_rules;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::WorldStateBuilder;

    #[test]
    fn test_appoint_updates_rules() {
        let mut state = WorldStateBuilder::new()
            .nations(1)
            .province(NationId(0))
            .party(NationId(0), "liberal", 1, IssueRules::BUILD_FACTORY)
            .build();
        state.nation_mut(NationId(0)).base_issue_rules = IssueRules::BUILD_RAILWAY;
        appoint_ruling_party(&mut state, NationId(0), PartyId(0));

        let n = state.nation(NationId(0));
        assert_eq!(n.ruling_party, Some(PartyId(0)));
        assert_eq!(n.ruling_party_last_appointed, Some(state.date));
        assert!(n.issue_rules.contains(IssueRules::BUILD_FACTORY));
        assert!(n.issue_rules.contains(IssueRules::BUILD_RAILWAY));
    }

    #[test]
    fn test_ideology_filter() {
        let mut state = WorldStateBuilder::new()
            .nations(1)
            .party(NationId(0), "reactionary", 3, IssueRules::NONE)
            .build();
        assert!(party_is_allowed(&state, NationId(0), PartyId(0)));
        state.nation_mut(NationId(0)).allowed_ideologies = !(1 << 3);
        assert!(!party_is_allowed(&state, NationId(0), PartyId(0)));
    }
}

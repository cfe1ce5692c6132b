//! Typed accessors over the world arena.
//!
//! Handles are always produced by the arena itself, so indexing is infallible; the
//! lookups that can legitimately miss (a relationship that was never created, a
//! project already in flight) return `Option` or `Result`.

use crate::error::ConstructionError;
use crate::state::*;

impl WorldState {
    // ========================================================================
    // Tables
    // ========================================================================

    #[inline]
    pub fn nation(&self, id: NationId) -> &NationState {
        &self.nations[id.index()]
    }

    #[inline]
    pub fn nation_mut(&mut self, id: NationId) -> &mut NationState {
        &mut self.nations[id.index()]
    }

    #[inline]
    pub fn province(&self, id: ProvinceId) -> &ProvinceState {
        &self.provinces[id.index()]
    }

    #[inline]
    pub fn province_mut(&mut self, id: ProvinceId) -> &mut ProvinceState {
        &mut self.provinces[id.index()]
    }

    #[inline]
    pub fn state_instance(&self, id: StateInstanceId) -> &StateInstance {
        &self.state_instances[id.index()]
    }

    #[inline]
    pub fn state_instance_mut(&mut self, id: StateInstanceId) -> &mut StateInstance {
        &mut self.state_instances[id.index()]
    }

    #[inline]
    pub fn state_definition(&self, id: StateDefId) -> &StateDefinition {
        &self.state_definitions[id.index()]
    }

    #[inline]
    pub fn technology(&self, id: TechId) -> &Technology {
        &self.technologies[id.index()]
    }

    pub fn tech_category(&self, id: TechId) -> TechCategory {
        self.tech_folders[self.technology(id).folder.index()].category
    }

    #[inline]
    pub fn factory_type(&self, id: FactoryTypeId) -> &FactoryType {
        &self.factory_types[id.index()]
    }

    #[inline]
    pub fn party(&self, id: PartyId) -> &PoliticalParty {
        &self.parties[id.index()]
    }

    #[inline]
    pub fn claim(&self, id: ClaimId) -> &ColonizationClaim {
        &self.claims[id.index()]
    }

    pub fn nation_ids(&self) -> impl Iterator<Item = NationId> {
        (0..self.nations.len() as u32).map(NationId)
    }

    /// Nations that still own territory.
    pub fn living_nations(&self) -> impl Iterator<Item = NationId> + '_ {
        self.nation_ids().filter(move |&n| self.nation(n).is_alive())
    }

    /// Living nations the AI plays.
    pub fn ai_nations(&self) -> impl Iterator<Item = NationId> + '_ {
        self.living_nations()
            .filter(move |&n| !self.nation(n).is_player_controlled)
    }

    pub fn subjects_of(&self, overlord: NationId) -> impl Iterator<Item = NationId> + '_ {
        self.nation_ids()
            .filter(move |&n| self.nation(n).overlord == Some(overlord))
    }

    pub fn technology_ids(&self) -> impl Iterator<Item = TechId> {
        (0..self.technologies.len() as u32).map(TechId)
    }

    pub fn factory_type_ids(&self) -> impl Iterator<Item = FactoryTypeId> {
        (0..self.factory_types.len() as u32).map(FactoryTypeId)
    }

    // ========================================================================
    // Relationship edges
    // ========================================================================

    #[inline]
    fn relation_key(a: NationId, b: NationId) -> (NationId, NationId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Symmetric relation; a pair with no record is neutral and unallied.
    pub fn relation(&self, a: NationId, b: NationId) -> DiplomaticRelation {
        self.diplomacy
            .relations
            .get(&Self::relation_key(a, b))
            .copied()
            .unwrap_or_default()
    }

    pub fn relation_mut(&mut self, a: NationId, b: NationId) -> &mut DiplomaticRelation {
        self.diplomacy
            .relations
            .entry(Self::relation_key(a, b))
            .or_default()
    }

    pub fn are_adjacent(&self, a: NationId, b: NationId) -> bool {
        self.nation(a).neighbors.contains(&b)
    }

    pub fn gp_relationship(&self, great_power: NationId, target: NationId) -> Option<GpRelationshipId> {
        self.gp_index.get(&(great_power, target)).copied()
    }

    /// Returns the existing relationship or creates a neutral one.
    pub fn force_create_gp_relationship(
        &mut self,
        great_power: NationId,
        target: NationId,
    ) -> GpRelationshipId {
        if let Some(id) = self.gp_relationship(great_power, target) {
            return id;
        }
        let id = GpRelationshipId(self.gp_relationships.len() as u32);
        self.gp_relationships.push(GpRelationship {
            great_power,
            target,
            influence: crate::fixed::Fixed::ZERO,
            status: InfluenceStatus::default(),
        });
        self.gp_index.insert((great_power, target), id);
        id
    }

    // ========================================================================
    // Map
    // ========================================================================

    /// Provinces of a state region that the instance's owner actually holds.
    pub fn provinces_of_state(&self, id: StateInstanceId) -> impl Iterator<Item = ProvinceId> + '_ {
        let si = self.state_instance(id);
        let owner = si.owner;
        self.state_definition(si.definition)
            .provinces
            .iter()
            .copied()
            .filter(move |&p| self.province(p).owner == Some(owner))
    }

    pub fn state_is_coastal(&self, id: StateInstanceId) -> bool {
        self.provinces_of_state(id).any(|p| self.province(p).is_coast)
    }

    pub fn state_is_colonial(&self, id: StateInstanceId) -> bool {
        self.province(self.state_instance(id).capital).is_colonial
    }

    /// Nations owning any province of the given state definition.
    pub fn owners_in_state(&self, def: StateDefId) -> impl Iterator<Item = NationId> + '_ {
        self.state_definition(def)
            .provinces
            .iter()
            .filter_map(move |&p| self.province(p).owner)
    }

    pub fn factory_type_available(&self, nation: NationId, ft: FactoryTypeId) -> bool {
        self.factory_type(ft).available_from_start
            || self.nation(nation).active_factory_types.contains(&ft)
    }

    /// Colonizing nations ordered by rank (rank 1 first).
    pub fn nations_by_colonial_rank(&self) -> Vec<NationId> {
        let mut ranked: Vec<NationId> = self
            .living_nations()
            .filter(|&n| self.nation(n).colonial_rank > 0)
            .collect();
        ranked.sort_by_key(|&n| (self.nation(n).colonial_rank, n));
        ranked
    }

    // ========================================================================
    // Construction projects
    // ========================================================================

    pub fn province_building_in_progress(&self, province: ProvinceId, kind: ProvinceBuildingKind) -> bool {
        self.province(province)
            .pending_buildings
            .iter()
            .any(|c| matches!(self.constructions[c.index()], ConstructionProject::Province { kind: k, .. } if k == kind))
    }

    /// Any build or upgrade of `factory_type` queued in the state.
    pub fn factory_in_progress(&self, state: StateInstanceId, factory_type: FactoryTypeId) -> bool {
        self.pending_factory_projects(state)
            .any(|(ft, _)| ft == factory_type)
    }

    pub fn factory_upgrade_in_progress(&self, state: StateInstanceId, factory_type: FactoryTypeId) -> bool {
        self.pending_factory_projects(state)
            .any(|(ft, upgrade)| upgrade && ft == factory_type)
    }

    /// (factory type, is upgrade) of every in-flight factory project in the state.
    fn pending_factory_projects(
        &self,
        state: StateInstanceId,
    ) -> impl Iterator<Item = (FactoryTypeId, bool)> + '_ {
        self.state_instance(state)
            .pending_factories
            .iter()
            .filter_map(move |c| match self.constructions[c.index()] {
                ConstructionProject::State {
                    factory_type,
                    is_upgrade,
                    ..
                } => Some((factory_type, is_upgrade)),
                ConstructionProject::Province { .. } => None,
            })
    }

    /// Factories standing in the state's provinces.
    pub fn factories_in_state(&self, state: StateInstanceId) -> impl Iterator<Item = &Factory> + '_ {
        self.provinces_of_state(state)
            .flat_map(move |p| self.province(p).factories.iter())
    }

    /// Existing factories plus queued new builds.
    pub fn state_factory_count(&self, state: StateInstanceId) -> usize {
        let queued = self
            .pending_factory_projects(state)
            .filter(|(_, upgrade)| !upgrade)
            .count();
        self.factories_in_state(state).count() + queued
    }

    pub fn create_province_construction(
        &mut self,
        province: ProvinceId,
        nation: NationId,
        kind: ProvinceBuildingKind,
    ) -> Result<ConstructionId, ConstructionError> {
        if province.index() >= self.provinces.len() {
            return Err(ConstructionError::UnknownTarget(province.to_string()));
        }
        if self.province_building_in_progress(province, kind) {
            return Err(ConstructionError::BuildingInProgress { province, kind });
        }
        let id = ConstructionId(self.constructions.len() as u32);
        self.constructions.push(ConstructionProject::Province {
            province,
            nation,
            kind,
            is_pop_project: false,
        });
        self.province_mut(province).pending_buildings.push(id);
        Ok(id)
    }

    pub fn create_state_construction(
        &mut self,
        state: StateInstanceId,
        nation: NationId,
        factory_type: FactoryTypeId,
        is_upgrade: bool,
    ) -> Result<ConstructionId, ConstructionError> {
        if state.index() >= self.state_instances.len() {
            return Err(ConstructionError::UnknownTarget(state.to_string()));
        }
        if factory_type.index() >= self.factory_types.len() {
            return Err(ConstructionError::UnknownTarget(factory_type.to_string()));
        }
        if self.factory_in_progress(state, factory_type) {
            return Err(ConstructionError::FactoryInProgress {
                state,
                factory_type,
            });
        }
        let id = ConstructionId(self.constructions.len() as u32);
        self.constructions.push(ConstructionProject::State {
            state,
            nation,
            factory_type,
            is_upgrade,
            is_pop_project: false,
        });
        self.state_instance_mut(state).pending_factories.push(id);
        Ok(id)
    }
}

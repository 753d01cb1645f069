//! Entity platform
//!
//! An EntityPlatform owns the entities one integration contributes to one
//! entity domain (e.g. the ecobee sensors). It assigns entity ids, rejects
//! invalid or duplicate entities, drives polling and writes every entity's
//! state into the state machine.

use std::collections::{HashMap, HashSet};

use ha_core::{EntityId, State, STATE_UNAVAILABLE, STATE_UNKNOWN};
use ha_state_machine::SharedStateMachine;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::entity::{Entity, EntityError};

/// Why an entity offered to a platform was not added
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("Entity of domain {domain} offered to {platform_domain} platform")]
    WrongDomain {
        domain: String,
        platform_domain: String,
    },

    #[error("Unable to generate an entity id for an entity of platform {0}")]
    NoEntityId(String),

    #[error("Entity id already exists - ignoring: {0}")]
    EntityIdTaken(EntityId),

    #[error("Entity {entity_id} cannot be added as {reason}")]
    Invalid {
        entity_id: EntityId,
        reason: EntityError,
    },

    #[error("Platform {platform} does not generate unique IDs. ID {unique_id} already exists - ignoring {entity_id}")]
    DuplicateUniqueId {
        platform: String,
        unique_id: String,
        entity_id: EntityId,
    },
}

/// Outcome of one poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
}

struct PlatformEntity {
    entity_id: EntityId,
    entity: Box<dyn Entity>,
}

/// Entities of one integration within one entity domain
pub struct EntityPlatform {
    domain: String,
    platform_name: String,
    states: SharedStateMachine,
    entities: Vec<PlatformEntity>,
    unique_ids: HashSet<String>,
    rejections: Vec<Rejection>,
}

impl EntityPlatform {
    pub fn new(
        domain: impl Into<String>,
        platform_name: impl Into<String>,
        states: SharedStateMachine,
    ) -> Self {
        Self {
            domain: domain.into(),
            platform_name: platform_name.into(),
            states,
            entities: Vec::new(),
            unique_ids: HashSet::new(),
            rejections: Vec::new(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn platform_name(&self) -> &str {
        &self.platform_name
    }

    /// Add entities to the platform and write their initial state
    ///
    /// With `update_before_add`, each entity is updated once first; a failed
    /// update is logged and the entity is still added. Entities that fail
    /// validation or reuse an entity id or unique id are dropped and kept in
    /// [`rejections`](Self::rejections). Returns how many entities were added.
    #[instrument(skip(self, entities), fields(domain = %self.domain, platform = %self.platform_name))]
    pub async fn add_entities(
        &mut self,
        entities: Vec<Box<dyn Entity>>,
        update_before_add: bool,
    ) -> usize {
        let mut added = 0;

        for mut entity in entities {
            if entity.domain() != self.domain {
                self.reject(Rejection::WrongDomain {
                    domain: entity.domain().to_string(),
                    platform_domain: self.domain.clone(),
                });
                continue;
            }

            if update_before_add {
                if let Err(err) = entity.update().await {
                    warn!("Update before add failed: {}", err);
                }
            }

            let entity_id = match self.assign_entity_id(entity.as_ref()) {
                Ok(entity_id) => entity_id,
                Err(rejection) => {
                    self.reject(rejection);
                    continue;
                }
            };

            if let Err(reason) = entity.validate() {
                self.reject(Rejection::Invalid { entity_id, reason });
                continue;
            }

            if let Some(unique_id) = entity.unique_id() {
                if !self.unique_ids.insert(unique_id.clone()) {
                    self.reject(Rejection::DuplicateUniqueId {
                        platform: self.platform_name.clone(),
                        unique_id,
                        entity_id,
                    });
                    continue;
                }
            }

            write_state(&self.states, &entity_id, entity.as_ref());
            debug!("Added {}", entity_id);
            self.entities.push(PlatformEntity { entity_id, entity });
            added += 1;
        }

        info!("Added {} {} entities", added, self.domain);
        added
    }

    /// Update every polling entity once, in order, and write its state
    ///
    /// A failing entity is logged and keeps its previous values; it never
    /// stops the remaining entities from updating.
    #[instrument(skip(self), fields(domain = %self.domain, platform = %self.platform_name))]
    pub async fn poll(&mut self) -> PollSummary {
        let mut summary = PollSummary::default();

        for registered in self.entities.iter_mut() {
            if !registered.entity.should_poll() {
                summary.skipped += 1;
                continue;
            }

            match registered.entity.update().await {
                Ok(()) => summary.updated += 1,
                Err(err) => {
                    warn!("Update of {} failed: {}", registered.entity_id, err);
                    summary.failed += 1;
                }
            }
            write_state(&self.states, &registered.entity_id, registered.entity.as_ref());
        }

        debug!(
            updated = summary.updated,
            failed = summary.failed,
            skipped = summary.skipped,
            "Poll cycle finished"
        );
        summary
    }

    pub fn entity(&self, entity_id: &EntityId) -> Option<&dyn Entity> {
        self.entities
            .iter()
            .find(|e| &e.entity_id == entity_id)
            .map(|e| e.entity.as_ref())
    }

    /// Entity ids in the order entities were added
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.entity_id.clone()).collect()
    }

    /// Entities turned away by `add_entities`, oldest first
    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Tear the platform down: drop all entities and remove their states
    #[instrument(skip(self), fields(domain = %self.domain, platform = %self.platform_name))]
    pub fn reset(&mut self) {
        for registered in self.entities.drain(..) {
            self.states.remove(&registered.entity_id);
        }
        self.unique_ids.clear();
        self.rejections.clear();
        info!("Platform reset");
    }

    fn reject(&mut self, rejection: Rejection) {
        error!("{}", rejection);
        self.rejections.push(rejection);
    }

    /// Pick the entity id for a new entity
    ///
    /// An id the entity asks for is used as is and must be free. Otherwise
    /// the id is generated from the friendly name, or the platform name, and
    /// taken ids get `_2`, `_3`, ...
    fn assign_entity_id(&self, entity: &dyn Entity) -> Result<EntityId, Rejection> {
        if let Some(requested) = entity.entity_id().filter(|id| id.domain() == self.domain) {
            if self.is_taken(&requested) {
                return Err(Rejection::EntityIdTaken(requested));
            }
            return Ok(requested);
        }

        let base = entity
            .friendly_name()
            .and_then(|name| EntityId::from_name(self.domain.clone(), &name).ok())
            .or_else(|| EntityId::from_name(self.domain.clone(), &self.platform_name).ok())
            .ok_or_else(|| Rejection::NoEntityId(self.platform_name.clone()))?;

        if !self.is_taken(&base) {
            return Ok(base);
        }
        (2..)
            .map(|n| base.with_suffix(n))
            .find(|candidate| !self.is_taken(candidate))
            .ok_or(Rejection::NoEntityId(self.platform_name.clone()))
    }

    fn is_taken(&self, entity_id: &EntityId) -> bool {
        self.entities.iter().any(|e| &e.entity_id == entity_id)
            || self.states.get(&entity_id.to_string()).is_some()
    }
}

/// Render an entity into a State and store it
fn write_state(states: &SharedStateMachine, entity_id: &EntityId, entity: &dyn Entity) -> State {
    let state = if entity.available() {
        entity.state().unwrap_or_else(|| STATE_UNKNOWN.to_string())
    } else {
        STATE_UNAVAILABLE.to_string()
    };

    states.set(entity_id.clone(), state, entity_attributes(entity))
}

fn entity_attributes(entity: &dyn Entity) -> HashMap<String, serde_json::Value> {
    let mut attributes = entity.state_attributes();
    if let Some(device_class) = entity.device_class() {
        attributes.insert("device_class".to_string(), json!(device_class));
    }
    if let Some(name) = entity.friendly_name() {
        attributes.insert("friendly_name".to_string(), json!(name));
    }
    if let Some(icon) = entity.icon() {
        attributes.insert("icon".to_string(), json!(icon));
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityError, EntityResult};
    use async_trait::async_trait;
    use ha_state_machine::StateMachine;
    use std::sync::Arc;

    /// Counts updates; fails every update when `fail` is set
    struct Counter {
        name: &'static str,
        entity_id: Option<&'static str>,
        unique_id: Option<&'static str>,
        count: u32,
        fail: bool,
        available: bool,
    }

    impl Counter {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                entity_id: None,
                unique_id: None,
                count: 0,
                fail: false,
                available: true,
            }
        }
    }

    #[async_trait]
    impl Entity for Counter {
        fn domain(&self) -> &'static str {
            "sensor"
        }

        fn entity_id(&self) -> Option<EntityId> {
            self.entity_id.and_then(|id| id.parse().ok())
        }

        fn unique_id(&self) -> Option<String> {
            self.unique_id.map(str::to_string)
        }

        fn name(&self) -> Option<String> {
            Some(self.name.to_string())
        }

        fn available(&self) -> bool {
            self.available
        }

        fn state(&self) -> Option<String> {
            (self.count > 0).then(|| self.count.to_string())
        }

        async fn update(&mut self) -> EntityResult<()> {
            if self.fail {
                return Err(EntityError::UpdateFailed("boom".to_string()));
            }
            self.count += 1;
            Ok(())
        }
    }

    fn platform() -> (Arc<StateMachine>, EntityPlatform) {
        let states = Arc::new(StateMachine::new());
        let platform = EntityPlatform::new("sensor", "test", states.clone());
        (states, platform)
    }

    #[tokio::test]
    async fn test_add_without_update_writes_unknown() {
        let (states, mut platform) = platform();

        let added = platform
            .add_entities(vec![Box::new(Counter::new("Den Count"))], false)
            .await;

        assert_eq!(added, 1);
        let state = states.get("sensor.den_count").unwrap();
        assert_eq!(state.state, STATE_UNKNOWN);
        assert_eq!(state.attribute::<String>("friendly_name").as_deref(), Some("Den Count"));
    }

    #[tokio::test]
    async fn test_update_before_add_and_poll() {
        let (states, mut platform) = platform();

        platform
            .add_entities(vec![Box::new(Counter::new("Den Count"))], true)
            .await;
        assert!(states.is_state("sensor.den_count", "1"));

        let summary = platform.poll().await;
        assert_eq!(summary, PollSummary { updated: 1, failed: 0, skipped: 0 });
        assert!(states.is_state("sensor.den_count", "2"));
    }

    #[tokio::test]
    async fn test_failing_entity_does_not_stop_others() {
        let (states, mut platform) = platform();

        let mut broken = Counter::new("Broken");
        broken.fail = true;
        platform
            .add_entities(vec![Box::new(broken), Box::new(Counter::new("Healthy"))], true)
            .await;

        let summary = platform.poll().await;
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.failed, 1);
        assert!(states.is_state("sensor.broken", STATE_UNKNOWN));
        assert!(states.is_state("sensor.healthy", "2"));
    }

    #[tokio::test]
    async fn test_unavailable_entity_state() {
        let (states, mut platform) = platform();

        let mut offline = Counter::new("Offline");
        offline.available = false;
        platform.add_entities(vec![Box::new(offline)], true).await;

        assert!(states.is_state("sensor.offline", STATE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_entity_id_collisions_get_suffix() {
        let (states, mut platform) = platform();

        platform
            .add_entities(
                vec![Box::new(Counter::new("Same")), Box::new(Counter::new("Same"))],
                false,
            )
            .await;

        assert_eq!(
            platform
                .entity_ids()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec!["sensor.same", "sensor.same_2"]
        );
        assert_eq!(states.entity_count(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_unique_id_is_rejected() {
        let (_, mut platform) = platform();

        let mut first = Counter::new("First");
        first.unique_id = Some("abc");
        let mut second = Counter::new("Second");
        second.unique_id = Some("abc");

        let added = platform
            .add_entities(vec![Box::new(first), Box::new(second)], false)
            .await;

        assert_eq!(added, 1);
        assert_eq!(platform.len(), 1);
        assert_eq!(
            platform.rejections()[0].to_string(),
            "Platform test does not generate unique IDs. ID abc already exists - ignoring sensor.second"
        );
    }

    #[tokio::test]
    async fn test_requested_entity_id_taken_is_rejected() {
        let (states, mut platform) = platform();

        let mut first = Counter::new("First");
        first.entity_id = Some("sensor.porch");
        let mut second = Counter::new("Second");
        second.entity_id = Some("sensor.porch");

        let added = platform
            .add_entities(vec![Box::new(first), Box::new(second)], true)
            .await;

        assert_eq!(added, 1);
        assert_eq!(states.entity_count(), 1);
        assert!(states.get("sensor.porch_2").is_none());
        assert!(matches!(
            &platform.rejections()[0],
            Rejection::EntityIdTaken(id) if id.to_string() == "sensor.porch"
        ));
        assert_eq!(
            platform.rejections()[0].to_string(),
            "Entity id already exists - ignoring: sensor.porch"
        );
    }

    #[tokio::test]
    async fn test_requested_entity_id_taken_by_other_platform_is_rejected() {
        let (states, mut platform) = platform();
        states.set("sensor.porch".parse().unwrap(), "on", HashMap::new());

        let mut counter = Counter::new("Porch");
        counter.entity_id = Some("sensor.porch");
        let added = platform.add_entities(vec![Box::new(counter)], false).await;

        assert_eq!(added, 0);
        assert!(states.is_state("sensor.porch", "on"));
    }

    #[tokio::test]
    async fn test_wrong_domain_is_ignored() {
        let states = Arc::new(StateMachine::new());
        let mut platform = EntityPlatform::new("binary_sensor", "test", states);

        let added = platform
            .add_entities(vec![Box::new(Counter::new("Den"))], false)
            .await;
        assert_eq!(added, 0);
        assert!(platform.is_empty());
        assert!(matches!(platform.rejections(), [Rejection::WrongDomain { .. }]));
    }

    #[tokio::test]
    async fn test_reset_removes_states() {
        let (states, mut platform) = platform();
        platform
            .add_entities(vec![Box::new(Counter::new("A")), Box::new(Counter::new("B"))], true)
            .await;
        assert_eq!(states.entity_count(), 2);

        platform.reset();
        assert!(platform.is_empty());
        assert_eq!(states.entity_count(), 0);
    }
}

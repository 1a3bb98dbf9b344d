//! Per-session state the core needs injected.

use sohl_content::{ContentFactory, LogicPack};
use sohl_core::{BuildContext, ClassRegistry, IdRegistry, WorldClock};

use crate::clock::SharedWorldClock;
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};

/// Class registry, id registry and world clock of one host session.
///
/// Everything the core would otherwise keep as process-wide state lives here,
/// so two sessions never share ids or registrations.
pub struct Session {
    config: RuntimeConfig,
    registry: ClassRegistry,
    ids: IdRegistry,
    clock: SharedWorldClock,
}

impl Session {
    pub fn new(config: RuntimeConfig, registry: ClassRegistry) -> Self {
        let ids = IdRegistry::from_config(&config.sohl);
        Self {
            config,
            registry,
            ids,
            clock: SharedWorldClock::default(),
        }
    }

    /// Session with the default configuration and the built-in classes.
    pub fn with_defaults() -> Self {
        Self::new(RuntimeConfig::default(), ClassRegistry::with_defaults())
    }

    pub fn with_clock(mut self, clock: SharedWorldClock) -> Self {
        self.clock = clock;
        self
    }

    /// Borrows the session for a rebuild.
    pub fn context(&mut self) -> BuildContext<'_> {
        BuildContext::new(&self.registry, &mut self.ids, &self.clock)
    }

    /// Loads a logic pack from `factory`, checked against this session's
    /// registry.
    pub fn load_pack(&self, factory: &ContentFactory, pack: &str) -> Result<LogicPack> {
        factory
            .load_logic_pack(pack, &self.registry)
            .map_err(|e| RuntimeError::Content(format!("{e:#}")))
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Mutable registry, for registering game-rule classes at startup.
    pub fn registry_mut(&mut self) -> &mut ClassRegistry {
        &mut self.registry
    }

    pub fn ids(&self) -> &IdRegistry {
        &self.ids
    }

    /// Forgets every id claimed so far.
    pub fn reset_ids(&mut self) {
        self.ids.reset();
    }

    pub fn clock(&self) -> &SharedWorldClock {
        &self.clock
    }

    pub fn world_time(&self) -> sohl_core::WorldTime {
        self.clock.world_time()
    }
}

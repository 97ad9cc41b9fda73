//! Applies configured frontends to the live registry.
//!
//! The sync owns the frontends that came from the config file. On every
//! apply it upserts entries whose definition changed, removes entries that
//! left the file, and leaves frontends added through the admin API alone.
//! A configured name the admin API has since replaced belongs to the admin
//! API: dropping it from the file no longer removes it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::schema::{FrontendConfig, FrontendDefinition};
use crate::frontend::{Frontend, FrontendName};
use crate::registry::FrontendRegistry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub upserted: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub rejected: usize,
}

/// A configured frontend as last written to the registry.
struct Applied {
    definition: FrontendDefinition,
    frontend: Arc<Frontend>,
}

pub struct ConfigSync {
    registry: FrontendRegistry,
    applied: HashMap<FrontendName, Applied>,
}

impl ConfigSync {
    pub fn new(registry: FrontendRegistry) -> Self {
        Self {
            registry,
            applied: HashMap::new(),
        }
    }

    pub fn apply(&mut self, frontends: &[FrontendConfig]) -> SyncReport {
        let mut report = SyncReport::default();
        let mut next = HashMap::with_capacity(frontends.len());

        for config in frontends {
            let frontend = match config.to_frontend() {
                Ok(frontend) => frontend,
                Err(e) => {
                    tracing::error!(frontend = %config.name, error = %e, "Skipping invalid configured frontend");
                    report.rejected += 1;
                    continue;
                }
            };
            let name = frontend.name().clone();

            let previous = self
                .applied
                .remove(&name)
                .filter(|applied| applied.definition == config.definition && self.registry.get(&name).is_some());
            let applied = match previous {
                Some(applied) => {
                    report.unchanged += 1;
                    applied
                }
                None => {
                    let frontend = Arc::new(frontend);
                    self.registry.add_or_update(frontend.clone());
                    report.upserted += 1;
                    Applied {
                        definition: config.definition.clone(),
                        frontend,
                    }
                }
            };
            next.insert(name, applied);
        }

        // Whatever is left was dropped from the file.
        for (name, applied) in self.applied.drain() {
            if self.registry.remove_if_current(&name, &applied.frontend) {
                report.removed += 1;
            } else if self.registry.get(&name).is_some() {
                tracing::info!(frontend = %name, "Keeping frontend replaced via admin API");
            }
        }
        self.applied = next;

        tracing::info!(
            upserted = report.upserted,
            removed = report.removed,
            unchanged = report.unchanged,
            rejected = report.rejected,
            "Configured frontends applied"
        );
        report
    }
}

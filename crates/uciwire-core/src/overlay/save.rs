// ── Synchronizer ──
//
// `save()` takes the pending logs of every touched configuration up front,
// pushes them in four phases (deletes, creates, changes, orders) and then
// reloads those configurations. Calls inside a phase run concurrently;
// phases never overlap. The first failing call aborts the save; remote
// effects of earlier calls are not rolled back.

use futures_util::future::try_join_all;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use super::Overlay;
use crate::error::CoreError;
use crate::model::OptionValue;
use crate::remote::ConfigService;
use crate::store::{Deletion, OverlayState, PendingLogs};

/// Outcome of a successful [`Overlay::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    /// Configurations that were pushed and reloaded.
    pub configs: Vec<String>,
    /// Pending creates and the ids the remote assigned them.
    pub created: Vec<CreatedSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedSection {
    pub config: String,
    /// Id the section had locally before the save.
    pub local_id: String,
    /// Id the remote assigned.
    pub name: String,
}

struct DeleteCall {
    config: String,
    section: String,
    options: Option<Vec<String>>,
}

struct CreateCall {
    config: String,
    local_id: String,
    section_type: String,
    name: Option<String>,
    values: IndexMap<String, OptionValue>,
}

struct SetCall {
    config: String,
    section: String,
    values: IndexMap<String, OptionValue>,
}

struct OrderCall {
    config: String,
    sections: Vec<String>,
}

#[derive(Default)]
struct SavePlan {
    deletes: Vec<DeleteCall>,
    creates: Vec<CreateCall>,
    changes: Vec<SetCall>,
    orders: Vec<OrderCall>,
}

impl SavePlan {
    fn build(state: &OverlayState, taken: &[(String, PendingLogs)]) -> Self {
        let mut plan = Self::default();

        for (config, logs) in taken {
            for (section, deletion) in &logs.deletes {
                plan.deletes.push(DeleteCall {
                    config: config.clone(),
                    section: section.clone(),
                    options: match deletion {
                        Deletion::Whole => None,
                        Deletion::Options(opts) => Some(opts.iter().cloned().collect()),
                    },
                });
            }

            for (local_id, pending) in &logs.creates {
                plan.creates.push(CreateCall {
                    config: config.clone(),
                    local_id: local_id.clone(),
                    section_type: pending.section.section_type.clone(),
                    name: pending.requested_name.clone(),
                    values: pending.section.options.clone(),
                });
            }

            for (section, values) in &logs.changes {
                plan.changes.push(SetCall {
                    config: config.clone(),
                    section: section.clone(),
                    values: values.clone(),
                });
            }

            if logs.reorder {
                let sections = state
                    .package(config)
                    .map(|pkg| pkg.submission_order(logs))
                    .unwrap_or_default();
                if !sections.is_empty() {
                    plan.orders.push(OrderCall {
                        config: config.clone(),
                        sections,
                    });
                }
            }
        }

        plan
    }
}

impl<S: ConfigService> Overlay<S> {
    /// Push every pending change to the remote and reload the touched
    /// configurations.
    ///
    /// Mutations made while the save is in flight land in fresh logs and
    /// survive the reload. If pushing fails the taken logs are merged back
    /// so a later save can retry. If only the reload fails the touched
    /// configurations are left unloaded and the next `load` fetches them.
    pub async fn save(&self) -> Result<SaveReport, CoreError> {
        let (taken, plan) = self.with_state(|state| {
            let taken = state.take_pending();
            let plan = SavePlan::build(state, &taken);
            (taken, plan)
        });

        if taken.is_empty() {
            debug!("save: nothing pending");
            return Ok(SaveReport::default());
        }
        let configs: Vec<String> = taken.iter().map(|(conf, _)| conf.clone()).collect();

        let created = match self.push(plan).await {
            Ok(created) => created,
            Err(e) => {
                warn!(error = %e, "save aborted, keeping pending changes");
                self.with_state(|state| state.restore_pending(taken));
                return Err(e);
            }
        };

        if let Err(e) = try_join_all(configs.iter().map(|conf| self.reload(conf))).await {
            // Pushed snapshots are stale; leave them unloaded.
            warn!(error = %e, "reload after save failed, dropping snapshots");
            for conf in &configs {
                self.invalidate(conf);
            }
            return Err(e);
        }

        debug!(?configs, created = created.len(), "save complete");
        Ok(SaveReport { configs, created })
    }

    async fn push(&self, plan: SavePlan) -> Result<Vec<CreatedSection>, CoreError> {
        let service = &self.inner.service;

        debug!(count = plan.deletes.len(), "save: deletes");
        try_join_all(
            plan.deletes
                .iter()
                .map(|d| service.delete(&d.config, &d.section, d.options.as_deref())),
        )
        .await?;

        debug!(count = plan.creates.len(), "save: creates");
        let created = try_join_all(plan.creates.iter().map(|c| async move {
            let name = service
                .add(&c.config, &c.section_type, c.name.as_deref(), &c.values)
                .await?;
            Ok::<_, CoreError>(CreatedSection {
                config: c.config.clone(),
                local_id: c.local_id.clone(),
                name,
            })
        }))
        .await?;

        debug!(count = plan.changes.len(), "save: changes");
        try_join_all(
            plan.changes
                .iter()
                .map(|c| service.set(&c.config, &c.section, &c.values)),
        )
        .await?;

        let orders: Vec<OrderCall> = plan
            .orders
            .into_iter()
            .map(|mut order| {
                for sid in &mut order.sections {
                    if let Some(c) = created
                        .iter()
                        .find(|c| c.config == order.config && c.local_id == *sid)
                    {
                        sid.clone_from(&c.name);
                    }
                }
                order
            })
            .collect();

        debug!(count = orders.len(), "save: orders");
        try_join_all(orders.iter().map(|o| service.order(&o.config, &o.sections))).await?;

        Ok(created)
    }
}

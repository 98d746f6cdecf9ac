//! Forest sync
//!
//! Keeps the in-memory forest in line with the cluster. Two watchers, one on
//! `Namespace` and one on `HierarchyConfiguration`, replay every observed
//! object into the forest under its write lock. Sync is the only writer of
//! parent and ownership transitions; the admission webhook only reads.
//!
//! A watcher relist (`Init`, `InitApply`..., `InitDone`) is treated as a full
//! snapshot: anything the forest still remembers that the relist did not
//! mention is forgotten when `InitDone` arrives.

mod hierarchy_config;
mod namespace;

pub use hierarchy_config::{apply_hierarchy_config, forget_hierarchy_config};
pub use namespace::{apply_namespace, forget_namespace};

use std::collections::HashSet;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace as CoreNamespace;
use kube::runtime::watcher::{self, Event};
use kube::{Api, Client, ResourceExt};
use tracing::{debug, error, info, warn};

use crate::crd::HierarchyConfiguration;
use crate::forest::{Forest, ForestState, SharedForest};

/// Interval for the periodic forest consistency check
const VERIFY_INTERVAL: Duration = Duration::from_secs(300);

/// Delay before polling a watcher again after it reported an error
const WATCH_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Names seen during an in-progress relist
#[derive(Debug, Default)]
pub struct Relist {
    seen: Option<HashSet<String>>,
}

impl Relist {
    fn begin(&mut self) {
        self.seen = Some(HashSet::new());
    }

    fn record(&mut self, name: &str) {
        if let Some(seen) = self.seen.as_mut() {
            seen.insert(name.to_string());
        }
    }

    fn finish(&mut self) -> Option<HashSet<String>> {
        self.seen.take()
    }
}

/// Replay one Namespace watch event into the forest
pub fn handle_namespace_event(forest: &Forest, relist: &mut Relist, event: Event<CoreNamespace>) {
    let mut state = forest.write();
    match event {
        Event::Init => relist.begin(),
        Event::InitApply(ns) => {
            relist.record(&ns.name_any());
            apply_namespace(&mut state, &ns);
        }
        Event::InitDone => {
            let Some(seen) = relist.finish() else {
                return;
            };
            let gone: Vec<String> = state
                .names()
                .filter(|name| !seen.contains(*name))
                .filter(|name| state.get(name).is_some_and(|ns| ns.exists()))
                .map(String::from)
                .collect();
            for name in &gone {
                forget_namespace(&mut state, name);
            }
            info!(namespaces = seen.len(), forgotten = gone.len(), "Namespace relist applied");
        }
        Event::Apply(ns) => apply_namespace(&mut state, &ns),
        Event::Delete(ns) => {
            forget_namespace(&mut state, &ns.name_any());
        }
    }
}

/// Replay one HierarchyConfiguration watch event into the forest
pub fn handle_hierarchy_config_event(
    forest: &Forest,
    relist: &mut Relist,
    event: Event<HierarchyConfiguration>,
) {
    let mut state = forest.write();
    match event {
        Event::Init => relist.begin(),
        Event::InitApply(hc) => {
            if hc.is_singleton() {
                if let Some(ns) = hc.metadata.namespace.as_deref() {
                    relist.record(ns);
                }
            }
            apply_hierarchy_config(&mut state, &hc);
        }
        Event::InitDone => {
            let Some(seen) = relist.finish() else {
                return;
            };
            let stale = configured_namespaces(&state)
                .into_iter()
                .filter(|name| !seen.contains(name))
                .collect::<Vec<_>>();
            for name in &stale {
                forget_hierarchy_config(&mut state, name);
            }
            info!(configs = seen.len(), reset = stale.len(), "HierarchyConfiguration relist applied");
        }
        Event::Apply(hc) => apply_hierarchy_config(&mut state, &hc),
        Event::Delete(hc) => {
            if !hc.is_singleton() {
                return;
            }
            if let Some(ns) = hc.metadata.namespace.as_deref() {
                forget_hierarchy_config(&mut state, ns);
            }
        }
    }
}

/// Namespaces carrying state only a HierarchyConfiguration could have set
fn configured_namespaces(state: &ForestState) -> Vec<String> {
    state
        .names()
        .filter(|name| {
            state
                .get(name)
                .is_some_and(|ns| ns.allows_cascading_delete() || ns.declared_parent().is_some())
        })
        .map(String::from)
        .collect()
}

/// Run the forest sync service until either watch stream ends
///
/// Connects with the ambient kubeconfig or in-cluster credentials. Also
/// verifies the forest periodically and logs any inconsistency it finds.
pub async fn run_forest_sync(forest: SharedForest) -> crate::Result<()> {
    let client = Client::try_default().await?;
    let ns_api: Api<CoreNamespace> = Api::all(client.clone());
    let hc_api: Api<HierarchyConfiguration> = Api::all(client);

    // Shorter than the client's read timeout so the server closes idle watches first
    let watcher_config = watcher::Config::default().timeout(25);
    let ns_watcher = watcher::watcher(ns_api, watcher_config.clone());
    let hc_watcher = watcher::watcher(hc_api, watcher_config);

    let mut ns_watcher = std::pin::pin!(ns_watcher);
    let mut hc_watcher = std::pin::pin!(hc_watcher);

    let mut ns_relist = Relist::default();
    let mut hc_relist = Relist::default();

    let mut verify_interval = tokio::time::interval(VERIFY_INTERVAL);
    verify_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("Forest sync started");

    loop {
        tokio::select! {
            event = ns_watcher.next() => match event {
                Some(Ok(event)) => handle_namespace_event(&forest, &mut ns_relist, event),
                Some(Err(e)) => {
                    warn!(error = %e, resource = "Namespace", "Watcher error, will retry");
                    tokio::time::sleep(WATCH_ERROR_BACKOFF).await;
                }
                None => break,
            },
            event = hc_watcher.next() => match event {
                Some(Ok(event)) => handle_hierarchy_config_event(&forest, &mut hc_relist, event),
                Some(Err(e)) => {
                    warn!(error = %e, resource = "HierarchyConfiguration", "Watcher error, will retry");
                    tokio::time::sleep(WATCH_ERROR_BACKOFF).await;
                }
                None => break,
            },
            _ = verify_interval.tick() => {
                match forest.verify() {
                    Ok(()) => debug!(namespaces = forest.len(), "Forest verified"),
                    Err(e) => error!(error = %e, "Forest inconsistency detected"),
                }
            }
        }
    }

    info!("Forest sync stopped");
    Ok(())
}

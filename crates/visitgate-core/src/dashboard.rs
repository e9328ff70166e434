// ── Analytics dashboard ──
//
// Six chart panels, each listening on the filter bus. A broadcast makes
// every panel update its caption and start its own fetch; each panel
// renders only its own latest response, so one failing endpoint leaves
// the others alone.

use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::debug;
use visitgate_api::DashboardClient;

use crate::bus::{FilterBus, SubscriptionId};
use crate::chart::{self, ChartKind, ChartRenderer, ChartSlot, ChartSnapshot, SlotUpdate};
use crate::error::CoreError;
use crate::filter::DateRangeFilter;
use crate::lock;

pub struct ChartPanel {
    kind: ChartKind,
    client: Arc<DashboardClient>,
    renderer: Arc<dyn ChartRenderer>,
    slot: Arc<Mutex<ChartSlot>>,
    tasks: TaskTracker,
    runtime: Handle,
}

impl ChartPanel {
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn snapshot(&self) -> ChartSnapshot {
        lock(&self.slot).snapshot()
    }

    /// Filter listener: recaption now, fetch in the background.
    fn on_filter(&self, filter: &DateRangeFilter) {
        let description = filter.description();
        let ticket = lock(&self.slot).begin(description.clone());
        self.renderer.describe(self.kind, &description);

        let kind = self.kind;
        let query = filter.to_query();
        let client = Arc::clone(&self.client);
        let renderer = Arc::clone(&self.renderer);
        let slot = Arc::clone(&self.slot);

        self.tasks.spawn_on(
            async move {
                let view = chart::load_view(&client, kind, &query).await;
                let update = lock(&slot).complete(ticket, view, renderer.as_ref());
                if update == SlotUpdate::Applied {
                    debug!(chart = %kind, "chart updated");
                }
            },
            &self.runtime,
        );
    }
}

impl std::fmt::Debug for ChartPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartPanel")
            .field("kind", &self.kind)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Dashboard {
    panels: Vec<Arc<ChartPanel>>,
    subscriptions: Vec<SubscriptionId>,
    tasks: TaskTracker,
}

impl Dashboard {
    /// Build one panel per kind and subscribe each to `bus`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn attach(
        bus: &FilterBus,
        client: Arc<DashboardClient>,
        renderer: Arc<dyn ChartRenderer>,
        kinds: &[ChartKind],
    ) -> Result<Self, CoreError> {
        let runtime = Handle::try_current().map_err(|e| CoreError::Runtime(e.to_string()))?;
        let tasks = TaskTracker::new();

        let panels: Vec<Arc<ChartPanel>> = kinds
            .iter()
            .map(|&kind| {
                Arc::new(ChartPanel {
                    kind,
                    client: Arc::clone(&client),
                    renderer: Arc::clone(&renderer),
                    slot: Arc::new(Mutex::new(ChartSlot::new(kind))),
                    tasks: tasks.clone(),
                    runtime: runtime.clone(),
                })
            })
            .collect();

        let subscriptions = panels
            .iter()
            .map(|panel| {
                let panel = Arc::clone(panel);
                bus.subscribe(move |filter| panel.on_filter(filter))
            })
            .collect();

        Ok(Self {
            panels,
            subscriptions,
            tasks,
        })
    }

    /// Unsubscribe every panel. In-flight loads still land.
    pub fn detach(&self, bus: &FilterBus) {
        for id in &self.subscriptions {
            bus.unsubscribe(*id);
        }
    }

    pub fn panels(&self) -> &[Arc<ChartPanel>] {
        &self.panels
    }

    pub fn snapshot(&self, kind: ChartKind) -> Option<ChartSnapshot> {
        self.panels
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.snapshot())
    }

    pub fn snapshots(&self) -> Vec<ChartSnapshot> {
        self.panels.iter().map(|p| p.snapshot()).collect()
    }

    /// Wait for every load started so far.
    pub async fn settle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }
}

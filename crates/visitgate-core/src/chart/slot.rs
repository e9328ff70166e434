// ── Chart slot ──
//
// One slot per chart. A slot owns at most one rendered instance and
// only accepts the response of the most recent request it issued.

use serde::Serialize;
use tracing::debug;

use super::{ChartKind, ChartView};
use crate::filter::ALL_TIME;

/// A chart drawn by some rendering backend.
pub trait RenderedChart: Send {
    /// Release whatever the backend holds for this instance.
    fn dispose(&mut self);
}

/// Draws chart views. Implemented by the presentation layer.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, kind: ChartKind, view: &ChartView, description: &str)
    -> Box<dyn RenderedChart>;

    /// Range caption changed ahead of new data arriving.
    fn describe(&self, _kind: ChartKind, _description: &str) {}
}

/// Identifies one load issued by a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

/// Result of handing a response to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotUpdate {
    Applied,
    /// A newer request was issued after this one; response dropped.
    Stale,
}

pub struct ChartSlot {
    kind: ChartKind,
    description: String,
    issued: u64,
    current: Option<Box<dyn RenderedChart>>,
    view: Option<ChartView>,
}

impl ChartSlot {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            description: ALL_TIME.to_owned(),
            issued: 0,
            current: None,
            view: None,
        }
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Last view applied to this slot.
    pub fn view(&self) -> Option<&ChartView> {
        self.view.as_ref()
    }

    pub fn is_rendered(&self) -> bool {
        self.current.is_some()
    }

    /// Start a new load for `description`, superseding any in flight.
    pub fn begin(&mut self, description: String) -> RequestTicket {
        self.issued += 1;
        self.description = description;
        RequestTicket(self.issued)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Apply a response. The previous render is disposed before the new
    /// one is drawn.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        view: ChartView,
        renderer: &dyn ChartRenderer,
    ) -> SlotUpdate {
        if !self.is_current(ticket) {
            debug!(
                chart = %self.kind,
                ticket = ticket.0,
                latest = self.issued,
                "dropping stale chart response"
            );
            return SlotUpdate::Stale;
        }

        self.dispose_current();
        self.current = Some(renderer.render(self.kind, &view, &self.description));
        self.view = Some(view);
        SlotUpdate::Applied
    }

    /// Swap in an already drawn instance, disposing the old one.
    pub fn replace(&mut self, rendered: Box<dyn RenderedChart>) {
        self.dispose_current();
        self.current = Some(rendered);
    }

    pub fn snapshot(&self) -> ChartSnapshot {
        ChartSnapshot {
            kind: self.kind,
            title: self.kind.title(),
            description: self.description.clone(),
            view: self.view.clone(),
        }
    }

    fn dispose_current(&mut self) {
        if let Some(mut old) = self.current.take() {
            old.dispose();
        }
    }
}

impl Drop for ChartSlot {
    fn drop(&mut self) {
        self.dispose_current();
    }
}

impl std::fmt::Debug for ChartSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartSlot")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("issued", &self.issued)
            .field("rendered", &self.current.is_some())
            .field("view", &self.view)
            .finish()
    }
}

/// Exportable state of one chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSnapshot {
    pub kind: ChartKind,
    pub title: &'static str,
    pub description: String,
    pub view: Option<ChartView>,
}

impl ChartSnapshot {
    pub fn file_name(&self) -> String {
        self.kind.export_file_name()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chart::ChartData;

    #[derive(Default)]
    struct Counting {
        rendered: Arc<AtomicUsize>,
        disposed: Arc<AtomicUsize>,
    }

    struct Drawn(Arc<AtomicUsize>);

    impl RenderedChart for Drawn {
        fn dispose(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl ChartRenderer for Counting {
        fn render(&self, _: ChartKind, _: &ChartView, _: &str) -> Box<dyn RenderedChart> {
            self.rendered.fetch_add(1, Ordering::SeqCst);
            Box::new(Drawn(Arc::clone(&self.disposed)))
        }
    }

    fn ready(n: u64) -> ChartView {
        ChartView::Ready(ChartData {
            labels: vec!["x".into()],
            series: vec![n],
        })
    }

    #[test]
    fn second_render_disposes_first() {
        let renderer = Counting::default();
        let mut slot = ChartSlot::new(ChartKind::TopVisitors);

        let t1 = slot.begin("Last 7 Days".into());
        assert_eq!(slot.complete(t1, ready(1), &renderer), SlotUpdate::Applied);
        let t2 = slot.begin("Last 30 Days".into());
        assert_eq!(slot.complete(t2, ready(2), &renderer), SlotUpdate::Applied);

        assert_eq!(renderer.rendered.load(Ordering::SeqCst), 2);
        assert_eq!(renderer.disposed.load(Ordering::SeqCst), 1);
        assert_eq!(slot.description(), "Last 30 Days");
    }

    #[test]
    fn stale_response_is_dropped() {
        let renderer = Counting::default();
        let mut slot = ChartSlot::new(ChartKind::VisitorTrend);

        let old = slot.begin("Last 7 Days".into());
        let new = slot.begin("Last 30 Days".into());

        assert_eq!(slot.complete(new, ready(30), &renderer), SlotUpdate::Applied);
        assert_eq!(slot.complete(old, ready(7), &renderer), SlotUpdate::Stale);

        assert_eq!(renderer.rendered.load(Ordering::SeqCst), 1);
        assert_eq!(slot.view(), Some(&ready(30)));
    }

    #[test]
    fn replace_disposes_previous_instance() {
        let renderer = Counting::default();
        let mut slot = ChartSlot::new(ChartKind::PurposeDistribution);
        assert!(!slot.is_rendered());

        let t = slot.begin(ALL_TIME.into());
        slot.complete(t, ready(3), &renderer);
        assert!(slot.is_rendered());

        slot.replace(Box::new(Drawn(Arc::clone(&renderer.disposed))));
        assert_eq!(renderer.disposed.load(Ordering::SeqCst), 1);
        assert!(slot.is_rendered());
        // The view is unchanged; only the drawn instance was swapped.
        assert_eq!(slot.view(), Some(&ready(3)));
    }

    #[test]
    fn drop_disposes_live_render() {
        let renderer = Counting::default();
        let disposed = Arc::clone(&renderer.disposed);
        {
            let mut slot = ChartSlot::new(ChartKind::RequestStatus);
            let t = slot.begin(ALL_TIME.into());
            slot.complete(t, ready(1), &renderer);
        }
        assert_eq!(disposed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn snapshot_serializes_view_state() {
        let renderer = Counting::default();
        let mut slot = ChartSlot::new(ChartKind::VisitDurations);
        let t = slot.begin(ALL_TIME.into());
        slot.complete(
            t,
            ChartView::Failed {
                message: "Failed to load durations.".into(),
            },
            &renderer,
        );

        let json: serde_json::Value =
            serde_json::from_str(&slot.snapshot().to_json().unwrap()).unwrap();
        assert_eq!(json["kind"], "visit_durations");
        assert_eq!(json["title"], "Visitor Duration");
        assert_eq!(json["view"]["state"], "failed");
        assert_eq!(slot.snapshot().file_name(), "visit_durations.json");
    }
}

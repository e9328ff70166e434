//! Terminal presentation for core's chart and notification seams.
//!
//! Charts are drawn as horizontal bar blocks onto a shared board keyed
//! by chart kind; disposing a chart takes its block off the board.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};

use owo_colors::OwoColorize;

use visitgate_core::{
    ChartKind, ChartRenderer, ChartView, Notification, NotificationKind, Notifier, RenderedChart,
};

const BAR_WIDTH: usize = 32;

// ── Chart board ─────────────────────────────────────────────────────

/// Currently drawn chart blocks.
#[derive(Debug, Default)]
pub struct ChartBoard {
    charts: Mutex<BTreeMap<ChartKind, String>>,
}

impl ChartBoard {
    pub fn get(&self, kind: ChartKind) -> Option<String> {
        self.lock().get(&kind).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<ChartKind, String>> {
        self.charts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct BoardEntry {
    kind: ChartKind,
    board: Arc<ChartBoard>,
}

impl RenderedChart for BoardEntry {
    fn dispose(&mut self) {
        self.board.lock().remove(&self.kind);
    }
}

pub struct TerminalRenderer {
    board: Arc<ChartBoard>,
    color: bool,
}

impl TerminalRenderer {
    pub fn new(board: Arc<ChartBoard>, color: bool) -> Self {
        Self { board, color }
    }
}

impl ChartRenderer for TerminalRenderer {
    fn render(
        &self,
        kind: ChartKind,
        view: &ChartView,
        description: &str,
    ) -> Box<dyn RenderedChart> {
        let block = draw(kind, view, description, self.color);
        self.board.lock().insert(kind, block);
        Box::new(BoardEntry {
            kind,
            board: Arc::clone(&self.board),
        })
    }
}

fn draw(kind: ChartKind, view: &ChartView, description: &str, color: bool) -> String {
    let mut out = String::new();
    let title = kind.title();
    if color {
        let _ = writeln!(out, "{} {}", title.bold(), format!("({description})").dimmed());
    } else {
        let _ = writeln!(out, "{title} ({description})");
    }

    match view {
        ChartView::Ready(data) => {
            let _ = writeln!(out, "  [{}]", kind.series_name());
            let max = data.series.iter().copied().max().unwrap_or(0).max(1);
            let label_width = data.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
            for (label, value) in data.labels.iter().zip(&data.series) {
                let bar = "█".repeat(bar_len(*value, max));
                let bar = if color { bar.cyan().to_string() } else { bar };
                let _ = writeln!(out, "  {label:<label_width$}  {bar} {value}");
            }
        }
        ChartView::NoData { message } => {
            let message = if color {
                message.dimmed().to_string()
            } else {
                message.clone()
            };
            let _ = writeln!(out, "  {message}");
        }
        ChartView::Failed { message } => {
            let message = if color {
                message.red().to_string()
            } else {
                message.clone()
            };
            let _ = writeln!(out, "  {message}");
        }
    }
    out
}

fn bar_len(value: u64, max: u64) -> usize {
    let width = u64::try_from(BAR_WIDTH).unwrap_or(u64::MAX);
    let len = (value.saturating_mul(width) / max).max(u64::from(value > 0));
    usize::try_from(len).unwrap_or(BAR_WIDTH)
}

// ── Notifications ───────────────────────────────────────────────────

/// Prints check-in results to stderr.
pub struct TerminalNotifier {
    color: bool,
}

impl TerminalNotifier {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) {
        let message = &notification.message;
        let mark = match notification.kind {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✗",
        };
        let line = match (self.color, notification.kind) {
            (false, _) => format!("{mark} {message}"),
            (true, NotificationKind::Success) => format!("{} {message}", mark.green()),
            (true, NotificationKind::Error) => format!("{} {}", mark.red(), message.red()),
        };
        // \r keeps lines aligned while the listener holds raw mode.
        eprint!("{line}\r\n");
    }
}

#[cfg(test)]
mod tests {
    use visitgate_core::ChartData;

    use super::*;

    #[test]
    fn dispose_removes_block_from_board() {
        let board = Arc::new(ChartBoard::default());
        let renderer = TerminalRenderer::new(Arc::clone(&board), false);
        let view = ChartView::Ready(ChartData {
            labels: vec!["Meeting".into(), "Delivery".into()],
            series: vec![4, 2],
        });

        let mut drawn = renderer.render(ChartKind::PurposeDistribution, &view, "All Time");
        let block = board.get(ChartKind::PurposeDistribution).expect("drawn");
        assert!(block.starts_with("Purpose Distribution (All Time)"));
        assert!(block.contains("[Visits]"));
        assert!(block.contains("Delivery"));

        drawn.dispose();
        assert!(board.get(ChartKind::PurposeDistribution).is_none());
    }

    #[test]
    fn bars_scale_to_largest_value() {
        assert_eq!(bar_len(10, 10), BAR_WIDTH);
        assert_eq!(bar_len(5, 10), BAR_WIDTH / 2);
        assert_eq!(bar_len(1, 1000), 1);
        assert_eq!(bar_len(0, 10), 0);
    }
}

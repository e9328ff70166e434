//! Analytics command: broadcast a date range and collect all six charts.

use std::path::Path;

use chrono::Local;
use tracing::{info, warn};

use visitgate_core::{ChartKind, ChartSnapshot, ChartView, DateRangeFilter};

use crate::cli::{AnalyticsArgs, ChartArg, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

impl From<ChartArg> for ChartKind {
    fn from(arg: ChartArg) -> Self {
        match arg {
            ChartArg::Trend => Self::VisitorTrend,
            ChartArg::TopVisitors => Self::TopVisitors,
            ChartArg::Durations => Self::VisitDurations,
            ChartArg::Purpose => Self::PurposeDistribution,
            ChartArg::Destination => Self::DestinationDistribution,
            ChartArg::Status => Self::RequestStatus,
        }
    }
}

pub async fn handle(args: AnalyticsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, board) = util::connect(global)?;
    let today = Local::now().date_naive();

    let filter = match (args.all, args.from, args.to, args.days) {
        (true, ..) => {
            let filter = DateRangeFilter::all();
            ctx.publish(&filter);
            filter
        }
        (false, Some(from), Some(to), _) => ctx.apply_range(Some(from), Some(to))?,
        (false, _, _, Some(days)) => ctx.select_quick_range(days, today)?,
        _ => ctx.start(today)?,
    };

    let spinner = util::spinner(global, format!("Loading charts ({})", filter.description()));
    ctx.settle().await;
    spinner.finish_and_clear();

    let kinds: Vec<ChartKind> = if args.chart.is_empty() {
        ChartKind::all()
    } else {
        args.chart.iter().copied().map(ChartKind::from).collect()
    };
    let snapshots: Vec<ChartSnapshot> = kinds
        .iter()
        .filter_map(|kind| ctx.dashboard().snapshot(*kind))
        .collect();

    let failed = snapshots
        .iter()
        .filter(|s| s.view.as_ref().is_some_and(ChartView::is_failed))
        .count();
    if failed > 0 {
        warn!(failed, total = snapshots.len(), "some charts failed to load");
    }

    if let Some(ref dir) = args.export {
        let written = export(dir, &snapshots)?;
        if !global.quiet {
            eprintln!("Exported {written} chart(s) to {}", dir.display());
        }
    }

    let rendered = output::render_single(
        &global.output,
        &snapshots,
        |_| {
            kinds
                .iter()
                .filter_map(|kind| board.get(*kind))
                .collect::<Vec<_>>()
                .join("\n")
        },
        |snaps| snaps.iter().map(plain_line).collect::<Vec<_>>().join("\n"),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

/// Write one `<kind>.json` per chart. Returns how many were written.
fn export(dir: &Path, snapshots: &[ChartSnapshot]) -> Result<usize, CliError> {
    std::fs::create_dir_all(dir)?;
    for snapshot in snapshots {
        let path = dir.join(snapshot.file_name());
        std::fs::write(&path, snapshot.to_json()?)?;
        info!(path = %path.display(), "chart exported");
    }
    Ok(snapshots.len())
}

/// `kind<TAB>label=value,...` or `kind<TAB>message`.
fn plain_line(snapshot: &ChartSnapshot) -> String {
    let mut line = format!("{}\t", snapshot.kind);
    match &snapshot.view {
        Some(ChartView::Ready(data)) => {
            let pairs: Vec<String> = data
                .labels
                .iter()
                .zip(&data.series)
                .map(|(label, value)| format!("{label}={value}"))
                .collect();
            line.push_str(&pairs.join(","));
        }
        Some(ChartView::NoData { message } | ChartView::Failed { message }) => {
            line.push_str(message);
        }
        None => line.push_str("pending"),
    }
    line
}

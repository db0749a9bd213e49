use super::display::{
    format_count, format_currency, format_gap, format_metric, format_percent, format_projected,
    progress_bar,
};
use crate::config::RoadmapConfig;
use crate::core::{
    compute_kpis, funnel_conversion, gap_analysis, plan_from_revenue_goal, project_from_volume,
    revenue_progress, GapStatus,
};
use crate::error::{RoadmapError, RoadmapResult};
use crate::excel::{build_report, report_file_name};
use crate::snapshot::{self, SnapshotFormat};
use crate::state::{apply_field_update, numeric_value, FieldUpdate};
use crate::storage::{StateStore, ACTIVE_TOOL_KEY, STATE_KEY};
use crate::types::{AppState, Channel, Stage};
use colored::Colorize;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, info};

const LABEL_WIDTH: usize = 32;
const PROGRESS_WIDTH: usize = 30;

fn store(config: &RoadmapConfig) -> StateStore {
    StateStore::new(&config.data_dir)
}

/// Explicit channel, else the persisted one
fn resolve_channel(store: &StateStore, channel: Option<Channel>) -> Channel {
    channel.unwrap_or_else(|| store.load_active_channel())
}

fn header(state: &AppState, channel: Channel) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        format!("📊 {}", channel.name()).bold().green(),
        format!("({})", channel.code()).dimmed()
    );
    let _ = writeln!(out, "   {}", channel.description());
    let _ = writeln!(
        out,
        "   Offer: {} @ {}\n",
        state.program_settings.offer_name.bright_blue().bold(),
        format_currency(state.program_settings.offer_price)
    );
    out
}

/// Settings, goal progress, KPI gaps, conversion ladder and plan
pub fn render_dashboard(state: &AppState, channel: Channel) -> String {
    let data = state.channel(channel);
    let settings = &state.program_settings;
    let kpis = compute_kpis(settings, &data.current_performance, channel);
    let mut out = header(state, channel);

    let progress = revenue_progress(kpis.current_revenue, settings.target_revenue_goal);
    let _ = writeln!(out, "{}", "💰 Revenue Goal Progress".bold().cyan());
    let _ = writeln!(
        out,
        "   {} {}",
        progress_bar(progress, PROGRESS_WIDTH).blue(),
        format!("{:.0}%", progress).bold()
    );
    let _ = writeln!(
        out,
        "   {} / {}\n",
        format_currency(kpis.current_revenue).bold(),
        format_currency(settings.target_revenue_goal)
    );

    let _ = writeln!(out, "{}", "📈 KPI Gap Analysis".bold().cyan());
    let _ = writeln!(
        out,
        "   {:<width$} {:>12} {:>12} {:>12}",
        "Metric",
        "Current",
        "Target",
        "Gap",
        width = LABEL_WIDTH
    );
    for row in gap_analysis(&kpis, &data.reference_targets, channel) {
        let unit = row.metric.unit();
        let gap = format!("{:>12}", format_gap(row.gap, unit));
        let gap = match row.status {
            GapStatus::Ahead => gap.green().bold(),
            GapStatus::Behind => gap.red().bold(),
            GapStatus::OnTarget => gap.dimmed(),
        };
        let _ = writeln!(
            out,
            "   {:<width$} {:>12} {:>12} {}",
            row.metric.label(),
            format_metric(row.current, unit),
            format_metric(row.target, unit),
            gap,
            width = LABEL_WIDTH
        );
    }
    out.push('\n');

    let _ = writeln!(out, "{}", "🔻 Funnel Conversion".bold().cyan());
    for stage in funnel_conversion(&kpis, channel) {
        let _ = writeln!(
            out,
            "   {:<width$} {:>12}",
            stage.stage.funnel_label(channel),
            format_percent(stage.value),
            width = LABEL_WIDTH
        );
    }
    out.push('\n');

    out.push_str(&render_plan_body(state, channel));
    out
}

pub fn render_projection(state: &AppState, channel: Channel, volume: f64) -> String {
    let data = state.channel(channel);
    let projection =
        project_from_volume(&data.reference_targets, &state.program_settings, channel, volume);
    let mut out = header(state, channel);

    let _ = writeln!(out, "{}", "🔮 Forward Projection".bold().cyan());
    let _ = writeln!(
        out,
        "   {:<width$} {:>12}",
        Stage::OutreachSent.projection_label(channel),
        format_projected(projection.volume).bold(),
        width = LABEL_WIDTH
    );
    for stage in &projection.stages {
        let label = stage.stage.projection_label(channel);
        if stage.stage == Stage::Revenue {
            let _ = writeln!(
                out,
                "   {:<width$} {:>12}",
                label.bold(),
                format_currency(stage.value).bold().green(),
                width = LABEL_WIDTH
            );
        } else {
            let _ = writeln!(
                out,
                "   {:<width$} {:>12}",
                label,
                format_projected(stage.value),
                width = LABEL_WIDTH
            );
        }
    }
    out
}

fn render_plan_body(state: &AppState, channel: Channel) -> String {
    let data = state.channel(channel);
    let plan = plan_from_revenue_goal(&data.reference_targets, &state.program_settings, channel);
    let mut out = String::new();

    let _ = writeln!(out, "{}", "🎯 Action Plan".bold().cyan());
    let _ = writeln!(
        out,
        "   Your plan to reach {}",
        format_currency(plan.revenue_goal).bright_blue().bold()
    );
    for step in &plan.steps {
        let _ = writeln!(
            out,
            "   {:<width$} {:>12}",
            step.stage.plan_label(channel),
            format_count(step.value),
            width = LABEL_WIDTH
        );
    }
    let _ = writeln!(
        out,
        "\n   ➡️  {}: {}",
        plan.final_action.stage.plan_label(channel).bold(),
        format_count(plan.final_action.value).bold().green()
    );
    out
}

pub fn render_plan(state: &AppState, channel: Channel) -> String {
    let mut out = header(state, channel);
    out.push_str(&render_plan_body(state, channel));
    out
}

/// Execute the show command
pub fn show(config: &RoadmapConfig, channel: Option<Channel>) -> RoadmapResult<()> {
    let store = store(config);
    let channel = resolve_channel(&store, channel);
    print!("{}", render_dashboard(&store.load_state(), channel));
    Ok(())
}

/// Execute the project command
pub fn project(config: &RoadmapConfig, channel: Option<Channel>, volume: f64) -> RoadmapResult<()> {
    if !volume.is_finite() || volume < 0.0 {
        return Err(RoadmapError::Validation(format!(
            "Volume must be a non-negative number, got {}",
            volume
        )));
    }
    let store = store(config);
    let channel = resolve_channel(&store, channel);
    print!("{}", render_projection(&store.load_state(), channel, volume));
    Ok(())
}

/// Execute the plan command
pub fn plan(config: &RoadmapConfig, channel: Option<Channel>) -> RoadmapResult<()> {
    let store = store(config);
    let channel = resolve_channel(&store, channel);
    print!("{}", render_plan(&store.load_state(), channel));
    Ok(())
}

/// Execute the set command: one field update, then persist
pub fn set(config: &RoadmapConfig, path: &str, value: &str) -> RoadmapResult<()> {
    let update: FieldUpdate = path.parse()?;
    let store = store(config);
    let next = apply_field_update(&store.load_state(), update, value);
    store.save_state(&next);

    let shown = match numeric_value(&next, update) {
        Some(value) => value.to_string(),
        None => next.program_settings.offer_name.clone(),
    };
    println!(
        "{} {} = {}",
        "✅ Updated".bold().green(),
        update.to_string().bright_blue(),
        shown.bold()
    );
    Ok(())
}

/// Execute the select command
pub fn select(config: &RoadmapConfig, channel: Channel) -> RoadmapResult<()> {
    store(config).save_active_channel(channel);
    println!(
        "{} {} ({})",
        "✅ Active channel:".bold().green(),
        channel.name().bright_blue().bold(),
        channel.code()
    );
    Ok(())
}

/// Execute the export command.
///
/// The report is built from a snapshot taken now; no file is written when
/// assembly fails.
pub async fn export(config: &RoadmapConfig, output: Option<PathBuf>) -> RoadmapResult<()> {
    println!("{}", "🔥 Outreach Roadmap - Excel Export".bold().green());
    let state = store(config).load_state();
    let output = output
        .unwrap_or_else(|| PathBuf::from(report_file_name(chrono::Local::now().date_naive())));

    let bytes = match build_report(state).await {
        Ok(bytes) => bytes,
        Err(e) => {
            if e.is_export_unavailable() {
                println!(
                    "{}",
                    "⚠️  Excel export is unavailable; no file was written.".yellow()
                );
            }
            return Err(e);
        }
    };
    fs::write(&output, bytes)?;
    info!(path = %output.display(), "report written");

    println!("   Output: {}", output.display().to_string().bright_blue());
    println!("{}", "✅ Export Complete!".bold().green());
    Ok(())
}

/// Execute the load command: replace the stored snapshot with a file
pub fn load(config: &RoadmapConfig, file: PathBuf) -> RoadmapResult<()> {
    let state = snapshot::load_snapshot(&file)?;
    store(config).save_state(&state);
    println!(
        "{} {}",
        "✅ Loaded snapshot from".bold().green(),
        file.display()
    );
    Ok(())
}

/// Execute the dump command: YAML to stdout, or a file by extension
pub fn dump(config: &RoadmapConfig, output: Option<PathBuf>) -> RoadmapResult<()> {
    let state = store(config).load_state();
    match output {
        Some(path) => {
            snapshot::write_snapshot(&path, &state)?;
            println!("{} {}", "✅ Snapshot written to".bold().green(), path.display());
        }
        None => print!("{}", snapshot::render_snapshot(&state, SnapshotFormat::Yaml)?),
    }
    Ok(())
}

/// Execute the reset command
pub fn reset(config: &RoadmapConfig) -> RoadmapResult<()> {
    store(config).clear()?;
    println!("{}", "✅ Reset to built-in defaults".bold().green());
    Ok(())
}

/// Execute the watch command: re-render the dashboard when the snapshot changes
pub fn watch(config: &RoadmapConfig, channel: Option<Channel>) -> RoadmapResult<()> {
    let store = store(config);
    fs::create_dir_all(store.dir())?;

    println!("{}", "👁️  Outreach Roadmap - Watch Mode".bold().green());
    println!("   Watching: {}", store.dir().display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(200), tx)
        .map_err(|e| RoadmapError::Storage(format!("Failed to create file watcher: {}", e)))?;
    debouncer
        .watcher()
        .watch(store.dir(), RecursiveMode::NonRecursive)
        .map_err(|e| RoadmapError::Storage(format!("Failed to watch directory: {}", e)))?;

    let render = |store: &StateStore| {
        let channel = resolve_channel(store, channel);
        print!("{}", render_dashboard(&store.load_state(), channel));
    };
    render(&store);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|event| {
                    event.kind == DebouncedEventKind::Any
                        && event
                            .path
                            .file_name()
                            .and_then(|name| name.to_str())
                            .is_some_and(|name| {
                                name == STATE_KEY || name == ACTIVE_TOOL_KEY
                            })
                });
                if relevant {
                    debug!("snapshot changed, re-rendering");
                    println!("\n{}", "🔄 Snapshot changed".cyan());
                    render(&store);
                }
            }
            Ok(Err(e)) => {
                println!("{}", format!("⚠️  Watch error: {:?}", e).yellow());
            }
            Err(e) => {
                return Err(RoadmapError::Storage(format!("Watch channel closed: {}", e)));
            }
        }
    }
}

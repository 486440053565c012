use anyhow::{bail, Context};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use syncwatch::{
    classify_phase, poll_cycle, row_display_name, row_number, row_progress, row_state,
    row_total_time, run_poll_loop, total_sync_time, DiagnosticsClient, MonitorConfig,
    SnapshotSyncPhase, SyncRecord, SyncStore, TrackedNode,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "syncwatch")]
#[command(about = "Monitor the sync progress of blockchain nodes over their diagnostics API", long_about = None)]
#[command(version)]
struct Args {
    /// Tracked nodes as comma-separated "id" or "id=url" entries; a bare id
    /// uses the default diagnostics URL
    #[arg(short, long, value_delimiter = ',', default_value = "node-0")]
    nodes: Vec<String>,

    /// Default diagnostics base URL for nodes without an explicit url
    #[arg(long, default_value = "http://127.0.0.1:6060/debug/diagnostics")]
    url: String,

    /// Node id to display (defaults to the first tracked node)
    #[arg(short, long)]
    active: Option<String>,

    /// Poll interval (e.g. "2s", "500ms")
    #[arg(short, long, default_value = "2s", value_parser = humantime::parse_duration)]
    interval: Duration,

    /// Poll once, print the stage table and exit
    #[arg(long)]
    once: bool,

    /// With --once, dump the merged record as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Fetch and print the node version report, then exit
    #[arg(long)]
    node_version: bool,

    /// Fetch and print the node's startup flags, then exit
    #[arg(long)]
    flags: bool,

    /// Fetch and print the reorg scan report, then exit
    #[arg(long)]
    reorgs: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_node_spec(spec: &str, default_url: &str) -> anyhow::Result<TrackedNode> {
    let (node_id, url) = match spec.split_once('=') {
        Some((id, url)) => (id, url),
        None => (spec, default_url),
    };
    if node_id.is_empty() || url.is_empty() {
        bail!("Invalid node spec '{}', expected id or id=url", spec);
    }
    Ok(TrackedNode::new(node_id, DiagnosticsClient::new(url)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("syncwatch={}", log_level))
        .init();

    let config = MonitorConfig {
        diagnostics_url: args.url.clone(),
        poll_interval: args.interval,
    };

    let nodes = args
        .nodes
        .iter()
        .map(|spec| parse_node_spec(spec, &config.diagnostics_url))
        .collect::<anyhow::Result<Vec<_>>>()?;
    if nodes.is_empty() {
        bail!("At least one node must be specified");
    }

    let active = match &args.active {
        Some(id) => {
            if !nodes.iter().any(|n| &n.node_id == id) {
                bail!("Active node '{}' is not among the tracked nodes", id);
            }
            id.clone()
        }
        None => nodes[0].node_id.clone(),
    };

    if args.node_version {
        let node = find_node(&nodes, &active);
        let version = node.client.fetch_version().await?;
        println!(
            "Node version: {} (supported: {}, commit: {})",
            version.node_version, version.supported_version, version.git_commit
        );
        return Ok(());
    }

    if args.flags {
        let node = find_node(&nodes, &active);
        let flags = node.client.fetch_flags().await?;
        println!("Node flags ({}):", flags.flags.len());
        for (name, value) in &flags.flags {
            println!("  --{}={}", name, value);
        }
        return Ok(());
    }

    if args.reorgs {
        let node = find_node(&nodes, &active);
        let report = node.client.fetch_reorgs().await?;
        let wrong = report.wrong_blocks.unwrap_or_default();
        println!(
            "Reorg scan: {} blocks scanned, {} reorged, took {}ms",
            report.total_scanned,
            wrong.len(),
            report.time_took
        );
        for block in wrong {
            println!("  reorg at block {}", block);
        }
        return Ok(());
    }

    info!("Tracking {} node(s), active: {}", nodes.len(), active);

    let store = Arc::new(SyncStore::new());

    if args.once {
        poll_cycle(&store, &nodes).await;
        let record = store
            .get(&active)
            .with_context(|| format!("No data received from node '{}'", active))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&record)?);
        } else {
            print_table(&record, &store, &active);
        }
        return Ok(());
    }

    watch(&store, nodes, &active, config).await;
    Ok(())
}

fn find_node<'a>(nodes: &'a [TrackedNode], node_id: &str) -> &'a TrackedNode {
    // The active id was validated against the tracked set above.
    nodes
        .iter()
        .find(|n| n.node_id == node_id)
        .unwrap_or(&nodes[0])
}

/// Continuous watch loop: polling runs in a background task, the display
/// reads whatever the store last committed.
async fn watch(store: &Arc<SyncStore>, nodes: Vec<TrackedNode>, active: &str, config: MonitorConfig) {
    let poll_task = tokio::spawn(run_poll_loop(Arc::clone(store), nodes, config));

    let pb = indicatif::ProgressBar::new(0);
    pb.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {percent}% {msg} | {elapsed_precise} elapsed")
            .unwrap()
            .progress_chars("█▓▒░ "),
    );
    pb.set_message("Waiting for first poll...");

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut last_table = String::new();

    loop {
        ticker.tick().await;

        let Some(record) = store.get(active) else {
            continue;
        };

        let phase = classify_phase(&record.download_status, &record.index_status);
        pb.set_length(record.download_status.total.max(1));
        pb.set_position(record.download_status.downloaded);
        pb.set_message(format!(
            "{} | total sync time {}",
            phase,
            total_sync_time(&record)
        ));

        let table = render_table(&record, store, active);
        if table != last_table {
            pb.println(&table);
            last_table = table;
        }

        if phase == SnapshotSyncPhase::Finished {
            pb.finish_with_message("✅ Snapshot sync finished!");
            break;
        }
    }

    poll_task.abort();
}

fn print_table(record: &SyncRecord, store: &SyncStore, active: &str) {
    println!("{}", render_table(record, store, active));
}

fn render_table(record: &SyncRecord, store: &SyncStore, active: &str) -> String {
    let download = &record.download_status;
    let index = &record.index_status;

    let mut out = String::new();
    out.push_str(&format!(
        "Node {} | total sync time: {}",
        record.node_id,
        total_sync_time(record)
    ));
    if let Some(files) = store.files(active) {
        out.push_str(&format!(" | {} snapshot files", files.len()));
    }
    out.push('\n');

    out.push_str(&format!(
        "{:<6} {:<26} {:<22} {:<10} {:<10}\n",
        "Stage", "Name", "State", "Progress", "Total Time"
    ));
    for stage in &record.sync_stages.stages {
        out.push_str(&format!(
            "{:<6} {:<26} {:<22} {:<10} {:<10}\n",
            row_number(stage, &record.sync_stages),
            row_display_name(stage),
            row_state(stage, download, index),
            row_progress(stage, download, index),
            row_total_time(stage, download, index),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_URL: &str = "http://127.0.0.1:6060/debug/diagnostics";

    #[test]
    fn node_spec_parses_id_and_url() {
        let node =
            parse_node_spec("node-1=http://10.0.0.5:6060/debug/diagnostics", DEFAULT_URL).unwrap();
        assert_eq!(node.node_id, "node-1");
    }

    #[test]
    fn bare_node_id_uses_default_url() {
        let node = parse_node_spec("node-1", DEFAULT_URL).unwrap();
        assert_eq!(node.node_id, "node-1");
    }

    #[test]
    fn empty_spec_parts_are_rejected() {
        assert!(parse_node_spec("=http://10.0.0.5:6060", DEFAULT_URL).is_err());
        assert!(parse_node_spec("node-1=", DEFAULT_URL).is_err());
        assert!(parse_node_spec("", DEFAULT_URL).is_err());
    }
}

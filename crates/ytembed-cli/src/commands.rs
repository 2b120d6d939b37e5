//! CLI command implementations

use crate::console::{ConsoleElement, EventRecord};
use crate::output;
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{info, warn};
use uuid::Uuid;
use ytembed_core::simulation::SimulatedProvider;
use ytembed_core::{
    can_play_type, detect_media_type, extract_id, AdapterOptions, EmbedAdapter, EmbedApiLoader,
    LoaderConfig, MediaFile, Property, ShadowState,
};

#[derive(Serialize)]
struct ExtractRow {
    url: String,
    content_id: Option<String>,
}

/// Extract content ids
pub fn extract(urls: &[String], format: &str) -> anyhow::Result<()> {
    let rows: Vec<ExtractRow> = urls
        .iter()
        .map(|url| ExtractRow {
            url: url.clone(),
            content_id: extract_id(Some(url)),
        })
        .collect();

    if output::is_json(format) {
        println!("{}", output::to_json(&rows)?);
        return Ok(());
    }

    for row in &rows {
        match row.content_id.as_deref() {
            Some("") | None => println!("{}  (no content id)", row.url),
            Some(id) => println!("{}  {}", row.url, id),
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct DetectReport<'a> {
    url: &'a str,
    media_type: Option<&'static str>,
    playable: bool,
}

/// Detect the media type of a URL
pub fn detect(url: &str, format: &str) -> anyhow::Result<()> {
    let media_type = detect_media_type(url);
    let report = DetectReport {
        url,
        media_type,
        playable: media_type.is_some_and(can_play_type),
    };

    if output::is_json(format) {
        println!("{}", output::to_json(&report)?);
        return Ok(());
    }

    println!("URL: {}", report.url);
    println!("  Type: {}", report.media_type.unwrap_or("unknown"));
    println!("  Playable: {}", report.playable);
    Ok(())
}

#[derive(Serialize)]
struct TranslateRow {
    code: i32,
    state: Option<String>,
    events: Vec<String>,
    paused: bool,
    ended: bool,
    poller: String,
}

/// Translate a sequence of state codes, threading the shadow flags through
pub fn translate(codes: &[i32], format: &str) -> anyhow::Result<()> {
    let mut shadow = ShadowState::default();
    let mut rows = Vec::with_capacity(codes.len());

    for &code in codes {
        let t = ytembed_core::translate(code, shadow);
        shadow = t.shadow;
        rows.push(TranslateRow {
            code,
            state: t.state.map(|s| s.to_string()),
            events: t.events.iter().map(|e| e.to_string()).collect(),
            paused: shadow.paused,
            ended: shadow.ended,
            poller: format!("{:?}", t.poller).to_lowercase(),
        });
    }

    if output::is_json(format) {
        println!("{}", output::to_json(&rows)?);
        return Ok(());
    }

    println!("{:>5}  {:<10}  {:<7}  {:<6}  {:<10}  events", "code", "state", "paused", "ended", "poller");
    for row in &rows {
        println!(
            "{:>5}  {:<10}  {:<7}  {:<6}  {:<10}  {}",
            row.code,
            row.state.as_deref().unwrap_or("unknown"),
            row.paused,
            row.ended,
            row.poller,
            output::join(&row.events),
        );
    }
    Ok(())
}

/// Arguments of the `simulate` command
pub struct SimulateArgs {
    pub src: String,
    pub config: Option<PathBuf>,
    pub volume: f64,
    pub autoplay: bool,
    pub states: Vec<i32>,
    pub step_ms: u64,
}

#[derive(Serialize)]
struct SimulationReport {
    run_id: Uuid,
    adapter_id: String,
    content_id: String,
    remote_calls: Vec<String>,
    events: Vec<EventRecord>,
}

/// Queue calls on a fresh adapter, bring the simulated provider up and
/// replay the given state codes
pub async fn simulate(args: SimulateArgs, format: &str) -> anyhow::Result<()> {
    let options = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            AdapterOptions::from_json(&json)?
        }
        None => AdapterOptions::default(),
    };

    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, src = %args.src, "Starting simulated run");

    let provider = Arc::new(SimulatedProvider::new());
    let loader = EmbedApiLoader::new(LoaderConfig::default(), provider.clone());
    let element = Arc::new(ConsoleElement::new("player1", args.autoplay));

    let adapter = EmbedAdapter::create(
        element.clone(),
        options,
        &[MediaFile::new(args.src.as_str())],
        &loader,
    )
    .await?;

    adapter.set(Property::Src, args.src.as_str()).await?;
    adapter.set(Property::Volume, args.volume).await?;
    adapter.play().await?;
    info!(pending = adapter.pending_calls().await, "Calls queued before ready");

    loader.on_global_ready().await;
    provider.ready_all();
    time::timeout(Duration::from_secs(5), adapter.ready())
        .await
        .context("remote player never became ready")??;

    let step = Duration::from_millis(args.step_ms);
    for code in &args.states {
        if !provider.state_change(0, *code) {
            warn!(code, "No remote player to report state for");
        }
        time::sleep(step).await;
    }

    let remote_calls = provider
        .player(0)
        .map(|player| player.calls().iter().map(|c| format!("{:?}", c)).collect())
        .unwrap_or_default();

    let report = SimulationReport {
        run_id,
        adapter_id: adapter.id().to_string(),
        content_id: adapter.content_id().to_string(),
        remote_calls,
        events: element.records(),
    };
    adapter.destroy().await;

    if output::is_json(format) {
        println!("{}", output::to_json(&report)?);
        return Ok(());
    }

    println!("Run {}", report.run_id);
    println!("  Adapter: {}", report.adapter_id);
    println!("  Content: {}", report.content_id);
    println!("\nRemote calls:");
    for (i, call) in report.remote_calls.iter().enumerate() {
        println!("  {}. {}", i + 1, call);
    }
    println!("\nEvents:");
    for record in &report.events {
        println!(
            "  {:>6}ms  {}  {:<15} {}",
            record.elapsed_ms,
            record.at.format("%H:%M:%S%.3f"),
            record.kind.to_string(),
            record.target
        );
    }

    Ok(())
}

//! Replays a scripted annotation scenario through the landmark editor.
//!
//! ```text
//! landmarker-replay <scenario.json> [config.json]
//! ```
//!
//! Every step's viewport events are logged; the final landmark group of
//! the bound asset is printed as JSON on stdout.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use landmarker_core::{
    AnnotationSession, AssetList, AssetMode, EditorCommand, EditorConfig, LandmarkGroup, LandmarkGroupJson,
    Modifiers, PlaneBridge, PointerButton, PointerEvent, Template, Vec2, ViewportEvent,
};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Deserialize)]
struct Scenario {
    width: f32,
    height: f32,
    #[serde(default = "default_zoom")]
    zoom: f32,
    #[serde(default)]
    mode: AssetMode,
    template: Template,
    assets: Vec<String>,
    /// Stored landmarks per asset id; other assets start empty.
    #[serde(default)]
    landmarks: HashMap<String, LandmarkGroupJson>,
    steps: Vec<Step>,
}

fn default_zoom() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    Down(PointerStep),
    Move(PointerStep),
    Up(PointerStep),
    Command(EditorCommand),
}

#[derive(Debug, Deserialize)]
struct PointerStep {
    x: f32,
    y: f32,
    #[serde(default)]
    button: PointerButton,
    #[serde(default)]
    shift: bool,
    #[serde(default)]
    ctrl: bool,
}

impl PointerStep {
    fn event(&self) -> PointerEvent {
        PointerEvent::new(
            Vec2::new(self.x, self.y),
            self.button,
            Modifiers {
                shift: self.shift,
                ctrl: self.ctrl,
            },
        )
    }
}

struct Replay {
    session: AnnotationSession,
    bridge: PlaneBridge,
    template: Template,
    landmarks: HashMap<String, LandmarkGroupJson>,
}

impl Replay {
    fn new(scenario: Scenario, config: EditorConfig) -> Self {
        let bridge = PlaneBridge::new(scenario.width, scenario.height).with_view(scenario.zoom, Vec2::ZERO);
        let session = AnnotationSession::new(
            config,
            scenario.mode,
            scenario.template.name.clone(),
            AssetList::new(scenario.assets),
        );
        Self {
            session,
            bridge,
            template: scenario.template,
            landmarks: scenario.landmarks,
        }
    }

    /// Stored landmarks for `asset_id`, or an empty group of the template.
    fn load(&self, asset_id: &str) -> Result<LandmarkGroup> {
        match self.landmarks.get(asset_id) {
            Some(raw) => LandmarkGroup::try_from(raw.clone())
                .with_context(|| format!("Invalid landmarks for asset {asset_id}")),
            None => self.template.empty_group().context("Invalid template"),
        }
    }

    /// Bind the pending asset, if any.
    fn serve_pending(&mut self) -> Result<()> {
        let Some(asset_id) = self.session.pending_asset().map(str::to_string) else {
            return Ok(());
        };
        let group = self.load(&asset_id)?;
        let events = self.session.asset_ready(&asset_id, group);
        log_events("ready", &events);
        Ok(())
    }

    fn run(&mut self, index: usize, step: &Step) -> Result<()> {
        let bridge = &self.bridge;
        let events = match step {
            Step::Down(p) => self.session.pointer_down(bridge, p.event()),
            Step::Move(p) => self.session.pointer_move(bridge, p.event()),
            Step::Up(p) => self.session.pointer_up(bridge, p.event()),
            Step::Command(command) => self
                .session
                .apply_command(bridge, command)
                .with_context(|| format!("Step {index} failed"))?,
        };
        log_events(&format!("step {index}"), &events);

        if events
            .iter()
            .any(|e| matches!(e, ViewportEvent::AssetRequested { .. }))
        {
            self.serve_pending()?;
        }
        Ok(())
    }
}

fn log_events(label: &str, events: &[ViewportEvent]) {
    for event in events {
        match event {
            ViewportEvent::Notification(n) => tracing::warn!("[replay] {label}: {:?} {}", n.level, n.message),
            _ => tracing::info!("[replay] {label}: {event:?}"),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(scenario_path) = args.next() else {
        bail!("usage: landmarker-replay <scenario.json> [config.json]");
    };
    let mut scenario: Scenario = read_json(Path::new(&scenario_path))?;
    let config = match args.next() {
        Some(path) => EditorConfig::from_path(&path).with_context(|| format!("Failed to load config {path}"))?,
        None => EditorConfig::default(),
    };

    tracing::info!(
        "[replay] {} step(s) over {} asset(s)",
        scenario.steps.len(),
        scenario.assets.len()
    );
    let steps = std::mem::take(&mut scenario.steps);
    let mut replay = Replay::new(scenario, config);
    replay.serve_pending()?;
    for (index, step) in steps.iter().enumerate() {
        replay.run(index, step)?;
    }

    if replay.session.has_unsaved_changes() {
        tracing::info!("[replay] finished with unsaved changes");
    }
    let landmarks = replay
        .session
        .landmarks_json()
        .context("No landmarks bound at the end of the scenario")?;
    println!("{}", serde_json::to_string_pretty(&landmarks)?);
    Ok(())
}

//! JSON scenario replay.
//!
//! A scenario declares action definitions, the downloads in flight at start,
//! and a list of steps driven against a fresh manager. Replay is synchronous
//! so the resulting display order is deterministic.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use herald_action::{
    Action, ActionContext, ActionDefinition, ActionDefinitions, ActionManager, AssetTracker,
    ImpressionCounter, Trigger,
};
use herald_core::config::MessagingConfig;
use herald_core::error::{HeraldError, Result};
use herald_core::types::ImpressionKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub definitions: Vec<ActionDefinition>,
    pub pending_downloads: Vec<String>,
    pub steps: Vec<Step>,
}

/// One action request inside an enqueue step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    pub name: String,
    pub message_id: String,
    #[serde(default)]
    pub chained: bool,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub trigger: Option<Trigger>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add { actions: Vec<ActionSpec> },
    Append { actions: Vec<ActionSpec> },
    Insert { actions: Vec<ActionSpec> },
    FinishDownload { path: String },
    FailDownload { path: String },
    VariablesChanged,
    Perform,
    Dismiss,
    Act { action: String },
    Pause,
    Resume,
    SetEnabled { enabled: bool },
    /// Perform and dismiss until nothing more is displayed.
    Drain,
}

/// Outcome of a replay.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    /// Names of displayed actions, in display order.
    pub displayed: Vec<String>,
    /// Actions left in the queue, front first.
    pub remaining: Vec<String>,
    pub impressions: Vec<ImpressionRow>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ImpressionRow {
    pub message_id: String,
    pub kind: ImpressionKind,
    pub count: u64,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let scenario: Scenario = serde_json::from_str(&content)?;
        tracing::info!(
            steps = scenario.steps.len(),
            "Scenario loaded from {}",
            path.display()
        );
        Ok(scenario)
    }

    /// Drive a fresh manager through every step.
    pub fn replay(&self, config: &MessagingConfig) -> Result<Report> {
        let tracker = Arc::new(AssetTracker::new());
        for path in &self.pending_downloads {
            tracker.begin_download(path.clone());
        }
        let impressions = Arc::new(ImpressionCounter::new());
        let definitions = Arc::new(ActionDefinitions::from_definitions(
            self.definitions.iter().cloned(),
        ));
        let manager = ActionManager::builder(config.clone())
            .readiness(tracker.clone())
            .definitions(definitions)
            .impressions(impressions.clone())
            .build();

        let mut report = Report::default();
        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!(index, step = ?step, "Replaying step");
            match step {
                Step::Add { actions } => {
                    manager.add_actions(build_actions(actions, &tracker));
                }
                Step::Append { actions } => {
                    manager.append_actions(build_actions(actions, &tracker));
                }
                Step::Insert { actions } => {
                    manager.insert_actions(build_actions(actions, &tracker));
                }
                Step::FinishDownload { path } => {
                    tracker.finish_download(path);
                }
                Step::FailDownload { path } => {
                    tracker.fail_download(path);
                }
                Step::VariablesChanged => {
                    tracker.variables_changed();
                }
                Step::Perform => {
                    if let Some(ctx) = manager.perform_available_actions()? {
                        report.displayed.push(ctx.name().to_string());
                    }
                }
                Step::Dismiss => {
                    manager.dismiss_current().map_err(|e| step_error(index, e))?;
                }
                Step::Act { action } => {
                    manager
                        .act_on_current(action)
                        .map_err(|e| step_error(index, e))?;
                }
                Step::Pause => manager.pause(),
                Step::Resume => manager.resume(),
                Step::SetEnabled { enabled } => manager.set_enabled(*enabled),
                Step::Drain => {
                    while let Some(ctx) = manager.perform_available_actions()? {
                        report.displayed.push(ctx.name().to_string());
                        manager.dismiss_current()?;
                    }
                }
            }
        }

        report.remaining = manager
            .pending()
            .iter()
            .map(|ctx| ctx.name().to_string())
            .collect();
        report.impressions = impressions
            .snapshot()
            .into_iter()
            .map(|(id, kind, count)| ImpressionRow {
                message_id: id.to_string(),
                kind,
                count,
            })
            .collect();
        Ok(report)
    }
}

fn build_actions(specs: &[ActionSpec], tracker: &Arc<AssetTracker>) -> Vec<Action> {
    specs
        .iter()
        .map(|spec| {
            let mut ctx = ActionContext::new(spec.name.clone(), spec.message_id.clone());
            if let Some(trigger) = &spec.trigger {
                ctx = ctx.with_trigger(trigger.clone());
            }
            if !spec.files.is_empty() {
                ctx = ctx.with_required_files(spec.files.iter().cloned(), tracker.clone());
            }
            if spec.chained {
                Action::Chained(ctx)
            } else {
                Action::Standalone(ctx)
            }
        })
        .collect()
}

fn step_error(index: usize, err: herald_action::SchedulerError) -> HeraldError {
    HeraldError::Scenario(format!("step {}: {}", index, err))
}

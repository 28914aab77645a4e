//! Headless gesture replay.
//!
//! A replay script describes a slide, the container it is shown in and a
//! sequence of pointer steps. Running it drives a [`DragEngine`] exactly as
//! a host would and reports the resulting geometry and history state.

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use slidecraft_core::{
    ConfigError, DragEngine, ElementData, ElementId, EngineConfig, GestureKind, HistoryEntry,
    Modifiers, PointerEvent, TransformData,
};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for replay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ReplayStep {
    /// Pointer-down on `element` at screen position (`x`, `y`).
    Down {
        element: ElementId,
        x: f64,
        y: f64,
        #[serde(default)]
        kind: GestureKind,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Pointer-move to screen position (`x`, `y`).
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Up,
    /// Window lost focus mid-gesture.
    Cancel,
    Undo,
    Redo,
}

/// A slide plus the gestures to run on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub config: EngineConfig,
    /// Screen rect of the canvas container. `None` models a detached node.
    pub container: Option<Rect>,
    pub elements: Vec<ElementData>,
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn from_json(json: &str) -> ReplayResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A committed gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Index of the `up` step.
    pub step: usize,
    pub element_id: ElementId,
    pub transform: TransformData,
}

/// A pointer-down the engine refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedStep {
    pub step: usize,
    pub reason: String,
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Slide geometry after the last step.
    pub elements: Vec<ElementData>,
    pub commits: Vec<CommitRecord>,
    pub rejected: Vec<RejectedStep>,
    /// Provisional transform if the script ended mid-gesture.
    pub provisional: Option<TransformData>,
    pub history_len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl ReplayReport {
    pub fn to_json(&self) -> ReplayResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Final geometry of `id`.
    pub fn element(&self, id: &str) -> Option<&ElementData> {
        self.elements.iter().find(|element| element.id == id)
    }
}

/// Load a replay script from a JSON file.
pub fn load_script(path: impl AsRef<Path>) -> ReplayResult<ReplayScript> {
    let json = fs::read_to_string(path.as_ref())?;
    ReplayScript::from_json(&json)
}

/// Load and run a replay script.
pub fn run_file(path: impl AsRef<Path>) -> ReplayResult<ReplayReport> {
    let script = load_script(path)?;
    run(&script)
}

/// Run `script` through a fresh engine.
pub fn run(script: &ReplayScript) -> ReplayResult<ReplayReport> {
    let mut engine = DragEngine::new(script.config.clone())?;
    let mut elements = script.elements.clone();
    let mut commits = Vec::new();
    let mut rejected = Vec::new();

    log::info!("Replaying {} steps on {} elements", script.steps.len(), elements.len());

    for (index, step) in script.steps.iter().enumerate() {
        match step {
            ReplayStep::Down {
                element,
                x,
                y,
                kind,
                modifiers,
            } => {
                let event = PointerEvent::new(*x, *y).with_modifiers(*modifiers);
                let started =
                    engine.start_drag(&event, element, *kind, &elements, script.container);
                if let Err(err) = started {
                    rejected.push(RejectedStep {
                        step: index,
                        reason: err.to_string(),
                    });
                }
            }
            ReplayStep::Move { x, y, modifiers } => {
                let event = PointerEvent::new(*x, *y).with_modifiers(*modifiers);
                engine.pointer_move(&event);
            }
            ReplayStep::Up => {
                if let Some(outcome) = engine.pointer_up() {
                    commits.push(CommitRecord {
                        step: index,
                        element_id: outcome.element_id,
                        transform: outcome.transform,
                    });
                    elements = outcome.slide;
                }
            }
            ReplayStep::Cancel => {
                engine.cancel();
            }
            ReplayStep::Undo => {
                if let Some(entry) = engine.undo() {
                    elements = restore(&entry, &elements);
                }
            }
            ReplayStep::Redo => {
                if let Some(entry) = engine.redo() {
                    elements = restore(&entry, &elements);
                }
            }
        }
    }

    Ok(ReplayReport {
        provisional: engine.provisional().copied(),
        history_len: engine.history().len(),
        can_undo: engine.can_undo(),
        can_redo: engine.can_redo(),
        elements,
        commits,
        rejected,
    })
}

fn restore(entry: &HistoryEntry, elements: &[ElementData]) -> Vec<ElementData> {
    log::debug!("Restoring snapshot of {} elements", entry.len());
    entry.restore(elements)
}

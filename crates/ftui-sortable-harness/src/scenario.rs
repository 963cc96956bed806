//! JSON scenarios: a course, a config, and a list of interaction steps.
//!
//! ```json
//! {
//!   "config": { "distance_threshold": 3 },
//!   "course": { "parts": [{ "title": "Part-1", "lessons": ["Lesson-1-1"] }] },
//!   "steps": [
//!     { "op": "click", "item": "Lesson-1-1", "modifiers": ["ctrl"] },
//!     { "op": "drag", "item": "Lesson-1-1", "to": { "end_of": "Part-1" } }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use ftui_sortable::{Modifiers, Position, SortEvent, SortableConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::nested::{Course, DropTarget, NestedLists};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKey {
    Shift,
    Alt,
    Ctrl,
    Super,
}

fn modifiers(keys: &[ModifierKey]) -> Modifiers {
    keys.iter().fold(Modifiers::NONE, |acc, key| {
        acc | match key {
            ModifierKey::Shift => Modifiers::SHIFT,
            ModifierKey::Alt => Modifiers::ALT,
            ModifierKey::Ctrl => Modifiers::CTRL,
            ModifierKey::Super => Modifiers::SUPER,
        }
    })
}

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Click {
        item: String,
        #[serde(default)]
        modifiers: Vec<ModifierKey>,
    },
    Drag {
        item: String,
        to: DropTarget,
        #[serde(default)]
        modifiers: Vec<ModifierKey>,
    },
    Press {
        item: String,
        #[serde(default)]
        modifiers: Vec<ModifierKey>,
    },
    Move {
        x: i32,
        y: i32,
    },
    MoveTo {
        to: DropTarget,
    },
    Release,
    Cancel,
    Blur,
    Background {
        #[serde(default)]
        modifiers: Vec<ModifierKey>,
    },
    SetActive {
        lesson: Option<String>,
    },
    SetDisabled {
        disabled: bool,
    },
}

impl Step {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Click { .. } => "click",
            Self::Drag { .. } => "drag",
            Self::Press { .. } => "press",
            Self::Move { .. } => "move",
            Self::MoveTo { .. } => "move_to",
            Self::Release => "release",
            Self::Cancel => "cancel",
            Self::Blur => "blur",
            Self::Background { .. } => "background",
            Self::SetActive { .. } => "set_active",
            Self::SetDisabled { .. } => "set_disabled",
        }
    }

    fn run(&self, lists: &mut NestedLists) -> Result<Vec<SortEvent>> {
        match self {
            Self::Click { item, modifiers: keys } => lists.click(item, modifiers(keys)),
            Self::Drag {
                item,
                to,
                modifiers: keys,
            } => lists.drag(item, to, modifiers(keys)),
            Self::Press { item, modifiers: keys } => lists.press(item, modifiers(keys)),
            Self::Move { x, y } => lists.pointer_move(Position::new(*x, *y)),
            Self::MoveTo { to } => {
                let at = lists.target_point(to)?;
                lists.pointer_move(at)
            }
            Self::Release => lists.release(),
            Self::Cancel => lists.cancel(),
            Self::Blur => lists.blur(),
            Self::Background { modifiers: keys } => lists.background(modifiers(keys)),
            Self::SetActive { lesson } => lists.set_active(lesson.as_deref()),
            Self::SetDisabled { disabled } => lists.set_disabled(*disabled),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: SortableConfig,
    pub course: Course,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// The nested-lists story: twenty parts, an active lesson, a multi-drag
    /// across parts, a part reorder, and the disable toggle.
    #[must_use]
    pub fn story() -> Self {
        let item = |s: &str| s.to_string();
        Self {
            config: SortableConfig::default(),
            course: Course::story(),
            steps: vec![
                Step::Click {
                    item: item("Lesson-1-1"),
                    modifiers: vec![ModifierKey::Ctrl],
                },
                Step::Click {
                    item: item("Lesson-2-3"),
                    modifiers: vec![ModifierKey::Super],
                },
                Step::Drag {
                    item: item("Lesson-1-1"),
                    to: DropTarget::Before(item("Lesson-3-1")),
                    modifiers: Vec::new(),
                },
                Step::Drag {
                    item: item("Part-3"),
                    to: DropTarget::Before(item("Part-1")),
                    modifiers: Vec::new(),
                },
                Step::SetDisabled { disabled: true },
                Step::Click {
                    item: item("Lesson-1-3"),
                    modifiers: vec![ModifierKey::Ctrl],
                },
                Step::SetDisabled { disabled: false },
                Step::Click {
                    item: item("Lesson-4-1"),
                    modifiers: Vec::new(),
                },
            ],
        }
    }
}

/// Events produced by one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub index: usize,
    pub step: Step,
    pub events: Vec<SortEvent>,
}

/// Result of replaying a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub steps: Vec<StepOutcome>,
    pub course: Course,
    /// Selected and pinned titles at the end.
    pub selected: Vec<String>,
    pub commits: usize,
}

pub fn replay(scenario: &Scenario) -> Result<Report> {
    let mut lists = NestedLists::new(scenario.course.clone(), scenario.config)?;
    let mut steps = Vec::with_capacity(scenario.steps.len());
    let mut commits = 0;
    for (index, step) in scenario.steps.iter().enumerate() {
        let events = step.run(&mut lists)?;
        commits += events.iter().filter(|e| e.is_reorder()).count();
        debug!(index, op = step.name(), events = events.len(), "step replayed");
        steps.push(StepOutcome {
            index,
            step: step.clone(),
            events,
        });
    }
    info!(steps = steps.len(), commits, "scenario replayed");
    Ok(Report {
        steps,
        course: lists.course().clone(),
        selected: lists.selected_titles(),
        commits,
    })
}

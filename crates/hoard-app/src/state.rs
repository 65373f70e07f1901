// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Variant;

/// Which record the detail scene edits. `Create` means the next save inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Create,
    Existing(i64),
}

impl EditTarget {
    pub const fn id(self) -> Option<i64> {
        match self {
            Self::Create => None,
            Self::Existing(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    List,
    Detail,
}

impl Scene {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Detail => "detail",
        }
    }
}

/// A scene together with the navigation parameter it was entered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    List { keep_selected: Option<i64> },
    Detail { target: EditTarget },
}

impl Default for SceneState {
    fn default() -> Self {
        Self::List {
            keep_selected: None,
        }
    }
}

impl SceneState {
    pub const fn scene(self) -> Scene {
        match self {
            Self::List { .. } => Scene::List,
            Self::Detail { .. } => Scene::Detail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ToList { keep_selected: Option<i64> },
    ToDetail(EditTarget),
}

impl Transition {
    pub const fn destination(self) -> SceneState {
        match self {
            Self::ToList { keep_selected } => SceneState::List { keep_selected },
            Self::ToDetail(target) => SceneState::Detail { target },
        }
    }
}

/// What a view action asks the navigation controller to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Stay,
    Goto(Transition),
    Quit,
}

/// How a UI session ended. `ResumeAt` asks the caller to start a fresh
/// session in the given scene (the terminal was resized).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    ResumeAt(SceneState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub variant: Variant,
    pub scene: SceneState,
    pub status_line: Option<String>,
}

impl AppState {
    pub fn new(variant: Variant, scene: SceneState) -> Self {
        Self {
            variant,
            scene,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Navigate(Transition),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    SceneChanged(SceneState),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Navigate(transition) => {
                self.scene = transition.destination();
                vec![AppEvent::SceneChanged(self.scene)]
            }
            AppCommand::SetStatus(message) => {
                self.status_line = Some(message.clone());
                vec![AppEvent::StatusUpdated(message)]
            }
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }
}

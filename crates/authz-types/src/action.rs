//! Action identity and execution results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// The kind of action a grant governs: the router category plus the
/// action's name within it (e.g. `bank/send`).
///
/// Grants are keyed by kind, so two actions of the same kind are
/// interchangeable as far as authorization lookup is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionKind {
    /// Routing category; selects the handler that executes the action.
    pub route: String,
    /// Action name within the route.
    pub name: String,
}

impl ActionKind {
    pub fn new(route: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.route, self.name)
    }
}

/// What a handler returns after executing one action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Handler-defined response payload.
    pub data: serde_json::Value,
    /// Human-readable log line.
    pub log: String,
    /// Events emitted while executing the action.
    pub events: Vec<Event>,
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Change notifications emitted by the editor.
//!
//! Every mutation pushes id-keyed events onto an `EventQueue`. The front end
//! drains the queue once per frame and refreshes whatever it keeps per entity;
//! the engine never reaches into the visual side.

use crate::viewport::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Marker,
    Link,
    Region,
}

/// The single selected entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Marker(String),
    Link(String),
    Region(String),
}

impl Selection {
    pub fn kind(&self) -> EntityKind {
        match self {
            Selection::Marker(_) => EntityKind::Marker,
            Selection::Link(_) => EntityKind::Link,
            Selection::Region(_) => EntityKind::Region,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Selection::Marker(id) | Selection::Link(id) | Selection::Region(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Created { kind: EntityKind, id: String },
    Updated { kind: EntityKind, id: String },
    Removed { kind: EntityKind, id: String },
    Selected(Selection),
    Deselected(Selection),
    ModeChanged(Mode),
    ViewportChanged,
    BackgroundChanged,
    PhasesChanged,
    /// Everything was replaced (new project or import).
    Reset,
}

/// FIFO of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    pub fn push(&mut self, event: Event) {
        log::trace!("event {:?}", event);
        self.events.push(event);
    }

    /// Take all pending events in emission order.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

//! Retained document state for the host UI.
//!
//! The host keeps its layout as named containers with screen rects, plus
//! top-level overlay elements inserted by widgets. An embedding GUI draws
//! this state each frame; headless runs only log the mutations.

use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Screen-space bounding box in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Unique identifier for an overlay element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element({})", self.0)
    }
}

/// A top-level element pinned over the regular layout.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Host-assigned identity
    pub id: ElementId,
    /// Stable id chosen by the widget that owns the element
    pub dom_id: String,
    /// Current text content
    pub text: String,
    /// Fixed screen position, once the owner has placed it
    pub position: Option<(f32, f32)>,
}

/// The host's retained layout state.
#[derive(Debug, Default)]
pub struct Document {
    containers: HashMap<String, Rect>,
    overlays: Vec<Overlay>,
    next_element: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or move a named layout container.
    pub fn set_container(&mut self, id: &str, rect: Rect) {
        self.containers.insert(id.to_string(), rect);
    }

    /// Drop a container from the layout.
    pub fn remove_container(&mut self, id: &str) -> bool {
        self.containers.remove(id).is_some()
    }

    /// Current bounding box of a named container.
    pub fn container_rect(&self, id: &str) -> Option<Rect> {
        self.containers.get(id).copied()
    }

    /// Insert a new overlay element at the top level, above the regular
    /// layout. Text is empty and the element is unpositioned until the
    /// owner places it.
    pub fn insert_overlay(&mut self, dom_id: &str) -> ElementId {
        self.next_element += 1;
        let id = ElementId(self.next_element);
        self.overlays.push(Overlay {
            id,
            dom_id: dom_id.to_string(),
            text: String::new(),
            position: None,
        });
        debug!("overlay '{dom_id}' inserted as {id}");
        id
    }

    /// Replace an overlay's text content.
    pub fn set_overlay_text(&mut self, id: ElementId, text: &str) {
        match self.overlays.iter_mut().find(|o| o.id == id) {
            Some(overlay) => {
                overlay.text = text.to_string();
                debug!("overlay '{}' text: {text}", overlay.dom_id);
            }
            None => debug!("set_overlay_text on unknown {id}"),
        }
    }

    /// Pin an overlay at a fixed screen position.
    pub fn set_overlay_position(&mut self, id: ElementId, left: f32, top: f32) {
        match self.overlays.iter_mut().find(|o| o.id == id) {
            Some(overlay) => {
                overlay.position = Some((left, top));
                debug!("overlay '{}' pinned at ({left}, {top})", overlay.dom_id);
            }
            None => debug!("set_overlay_position on unknown {id}"),
        }
    }

    /// Remove an overlay element. Returns false if it was not present.
    pub fn remove_overlay(&mut self, id: ElementId) -> bool {
        match self.overlays.iter().position(|o| o.id == id) {
            Some(index) => {
                let overlay = self.overlays.remove(index);
                debug!("overlay '{}' removed", overlay.dom_id);
                true
            }
            None => false,
        }
    }

    pub fn overlay(&self, id: ElementId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    /// All live overlays, in insertion order (a renderer draws these last).
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }
}

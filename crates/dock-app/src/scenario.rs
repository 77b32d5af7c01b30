// ABOUTME: TOML scenario format and the runner that replays it against a layout.
// ABOUTME: Steps address items by panel key; rejected steps are reported and skipped.

use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result};
use dock_core::{LayoutConfig, Location, Orientation, Size};
use dock_layout::{AnchorId, ItemId, Layout, LayoutError, Panel};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub canvas: Size,
    #[serde(default)]
    pub panels: Vec<Panel>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add {
        panel: String,
        location: Location,
        relative_to: Option<String>,
    },
    Remove {
        panel: String,
    },
    Hide {
        panel: String,
    },
    Restore {
        panel: String,
        #[serde(default)]
        tab_index: usize,
    },
    Resize {
        panel: String,
        length: i32,
        orientation: Orientation,
    },
    /// Drags the divider on `edge` of the panel's item
    Drag {
        panel: String,
        edge: Location,
        position: i32,
    },
    ResizeCanvas {
        width: i32,
        height: i32,
    },
    QueryDrop {
        panel: String,
        location: Location,
        relative_to: Option<String>,
    },
}

impl Scenario {
    pub fn parse(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse scenario")
    }
}

/// What a single step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied(String),
    Rejected(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Applied(msg) => write!(f, "ok: {}", msg),
            Outcome::Rejected(msg) => write!(f, "rejected: {}", msg),
        }
    }
}

pub struct Runner {
    pub layout: Layout<Panel>,
    panels: HashMap<String, Panel>,
    items: HashMap<String, ItemId>,
}

impl Runner {
    pub fn new(scenario: &Scenario, config: LayoutConfig) -> Self {
        let config = LayoutConfig {
            contents_size: scenario.canvas,
            ..config
        };
        Self {
            layout: Layout::new(config),
            panels: scenario
                .panels
                .iter()
                .map(|p| (p.key.clone(), p.clone()))
                .collect(),
            items: HashMap::new(),
        }
    }

    pub fn run(&mut self, steps: &[Step]) -> Vec<Outcome> {
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let outcome = match self.apply(step) {
                    Ok(msg) => Outcome::Applied(msg),
                    Err(msg) => Outcome::Rejected(msg),
                };
                match &outcome {
                    Outcome::Applied(msg) => tracing::info!("Step {}: {}", index + 1, msg),
                    Outcome::Rejected(msg) => tracing::warn!("Step {} rejected: {}", index + 1, msg),
                }
                outcome
            })
            .collect()
    }

    fn panel(&self, key: &str) -> Result<Panel, String> {
        self.panels
            .get(key)
            .cloned()
            .ok_or_else(|| format!("unknown panel {:?}", key))
    }

    fn item(&self, key: &str) -> Result<ItemId, String> {
        self.items
            .get(key)
            .copied()
            .ok_or_else(|| format!("panel {:?} is not in the layout", key))
    }

    fn relative(&self, key: Option<&str>) -> Result<Option<ItemId>, String> {
        key.map(|k| self.item(k)).transpose()
    }

    fn apply(&mut self, step: &Step) -> Result<String, String> {
        let failed = |e: LayoutError| e.to_string();
        match step {
            Step::Add {
                panel,
                location,
                relative_to,
            } => {
                if self.items.contains_key(panel) {
                    return Err(format!("panel {:?} is already in the layout", panel));
                }
                let content = self.panel(panel)?;
                let relative = self.relative(relative_to.as_deref())?;
                let id = self.layout.add_item(content, *location, relative).map_err(failed)?;
                // The runner holds a reference so hidden panels leave a placeholder
                self.layout.ref_item(id).map_err(failed)?;
                self.items.insert(panel.clone(), id);
                Ok(format!("added {} on the {} at {}", panel, location.label(), self.geometry(id)))
            }
            Step::Remove { panel } => {
                let id = self.item(panel)?;
                self.layout.remove_item(id).map_err(failed)?;
                self.items.remove(panel);
                Ok(format!("removed {}", panel))
            }
            Step::Hide { panel } => {
                let id = self.item(panel)?;
                let hidden = self.layout.hide_item(id).map_err(failed)?;
                if hidden.placeholder.is_none() {
                    self.items.remove(panel);
                }
                Ok(format!("hid {}", panel))
            }
            Step::Restore { panel, tab_index } => {
                let id = self.item(panel)?;
                let content = self.panel(panel)?;
                self.layout
                    .restore_placeholder(id, content, *tab_index)
                    .map_err(failed)?;
                Ok(format!("restored {} at {}", panel, self.geometry(id)))
            }
            Step::Resize {
                panel,
                length,
                orientation,
            } => {
                let id = self.item(panel)?;
                self.layout
                    .resize_item(id, *length, *orientation)
                    .map_err(failed)?;
                Ok(format!("resized {} to {}", panel, self.geometry(id)))
            }
            Step::Drag {
                panel,
                edge,
                position,
            } => {
                let anchor = self.edge_anchor(panel, *edge)?;
                let applied = self.layout.drag_anchor(anchor, *position).map_err(failed)?;
                Ok(format!("dragged {} edge of {} to {}", edge.label(), panel, applied))
            }
            Step::ResizeCanvas { width, height } => {
                let applied = self.layout.set_contents_size(Size::new(*width, *height));
                Ok(format!("canvas is {}x{}", applied.width, applied.height))
            }
            Step::QueryDrop {
                panel,
                location,
                relative_to,
            } => {
                let content = self.panel(panel)?;
                let relative = self.relative(relative_to.as_deref())?;
                let available = self
                    .layout
                    .available_length_for_drop(*location, relative)
                    .map_err(failed)?;
                let rect = self
                    .layout
                    .rect_for_drop(content.min_size, content.preferred_size, *location, relative)
                    .map_err(failed)?;
                Ok(format!(
                    "{} on the {}: available {}+{}={}, rect ({}, {}, {}x{})",
                    panel,
                    location.label(),
                    available.side1,
                    available.side2,
                    available.total(),
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height
                ))
            }
        }
    }

    fn edge_anchor(&self, panel: &str, edge: Location) -> Result<AnchorId, String> {
        let id = self.item(panel)?;
        self.layout
            .item(id)
            .map(|i| i.anchor_group().anchor(edge))
            .ok_or_else(|| format!("panel {:?} is not in the layout", panel))
    }

    fn geometry(&self, id: ItemId) -> String {
        match self.layout.item_geometry(id) {
            Some(r) => format!("({}, {}, {}x{})", r.x, r.y, r.width, r.height),
            None => "nowhere".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dock_layout::SanityFlags;
    use pretty_assertions::assert_eq;

    const SCENARIO: &str = r#"
canvas = { width = 500, height = 500 }

[[panels]]
key = "files"
min_size = { width = 100, height = 100 }

[[panels]]
key = "editor"
min_size = { width = 100, height = 100 }
preferred_size = { width = 200, height = 0 }

[[panels]]
key = "wide"
min_size = { width = 450, height = 100 }

[[steps]]
op = "add"
panel = "files"
location = "on_left"

[[steps]]
op = "query_drop"
panel = "editor"
location = "on_right"

[[steps]]
op = "add"
panel = "editor"
location = "on_right"

[[steps]]
op = "add"
panel = "wide"
location = "on_bottom"
relative_to = "editor"

[[steps]]
op = "hide"
panel = "editor"

[[steps]]
op = "restore"
panel = "editor"

[[steps]]
op = "drag"
panel = "files"
edge = "on_right"
position = 5

[[steps]]
op = "resize_canvas"
width = 800
height = 600
"#;

    #[test]
    fn replays_a_scenario() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        let mut runner = Runner::new(&scenario, LayoutConfig::default());
        let outcomes = runner.run(&scenario.steps);

        assert_eq!(outcomes.len(), 8);
        assert_eq!(
            outcomes[1],
            Outcome::Applied("editor on the right: available 393+0=393, rect (299, 1, 200x498)".to_string())
        );
        assert_eq!(
            outcomes[2],
            Outcome::Applied("added editor on the right at (299, 1, 200x498)".to_string())
        );
        assert!(matches!(outcomes[3], Outcome::Rejected(_)));
        assert_eq!(outcomes[6], Outcome::Applied("dragged right edge of files to 101".to_string()));
        assert_eq!(outcomes[7], Outcome::Applied("canvas is 800x600".to_string()));
        assert_eq!(runner.layout.visible_count(), 2);
        assert!(runner
            .layout
            .check_sanity(SanityFlags::TOPOLOGY | SanityFlags::GEOMETRY)
            .is_sane());
    }

    #[test]
    fn unknown_panels_are_rejected() {
        let scenario = Scenario::parse("canvas = { width = 300, height = 300 }").unwrap();
        let mut runner = Runner::new(&scenario, LayoutConfig::default());
        let outcomes = runner.run(&[Step::Remove {
            panel: "ghost".to_string(),
        }]);
        assert_eq!(
            outcomes,
            vec![Outcome::Rejected("panel \"ghost\" is not in the layout".to_string())]
        );
    }
}

//! Automatic placement of roadmap nodes.
//!
//! The engine works on an abstract graph: every node is a box of the same
//! size, and every edge is a directed constraint regardless of its kind. The
//! actual drawing algorithm sits behind [`LayoutBackend`], so the compiler only
//! ever deals with [`compute_layout`].
//!
//! Output is deterministic: the same nodes and edges, in the same order,
//! always produce the same coordinates. Computed layouts are committed next to
//! the content, so a stable result keeps diffs readable.

mod layered;

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde_json::Number;

pub use crate::layout::layered::Layered;

use crate::error::LayoutError;
use crate::model::{
    Breakpoints, DirectionCode, Extra, LayoutData, NodeBox, Placement, RoadmapEdge, RoadmapNode,
};

/// Requested flow of the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Top to bottom.
    #[default]
    Down,
    /// Bottom to top.
    Up,
    /// Left to right.
    Right,
    /// Right to left.
    Left,
}

impl Direction {
    /// Code recorded in `layout.json`.
    pub fn code(self) -> DirectionCode {
        match self {
            Direction::Down => DirectionCode::TB,
            Direction::Up => DirectionCode::BT,
            Direction::Right => DirectionCode::LR,
            Direction::Left => DirectionCode::RL,
        }
    }

    pub fn from_code(code: DirectionCode) -> Self {
        match code {
            DirectionCode::TB => Direction::Down,
            DirectionCode::BT => Direction::Up,
            DirectionCode::LR => Direction::Right,
            DirectionCode::RL => Direction::Left,
        }
    }

    /// Layers stack along the vertical axis.
    pub(crate) fn is_vertical(self) -> bool {
        matches!(self, Direction::Down | Direction::Up)
    }

    /// Layers are counted from the far edge of the drawing.
    pub(crate) fn is_reversed(self) -> bool {
        matches!(self, Direction::Up | Direction::Left)
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Down => f.write_str("down"),
            Direction::Up => f.write_str("up"),
            Direction::Right => f.write_str("right"),
            Direction::Left => f.write_str("left"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "down" | "tb" => Ok(Direction::Down),
            "up" | "bt" => Ok(Direction::Up),
            "right" | "lr" => Ok(Direction::Right),
            "left" | "rl" => Ok(Direction::Left),
            other => Err(format!(
                "unknown direction '{other}', expected one of: down, up, right, left"
            )),
        }
    }
}

/// Sizes and gaps used when placing nodes, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub node_width: f64,
    pub node_height: f64,
    /// Gap between neighbouring nodes of one layer.
    pub node_spacing: f64,
    /// Gap between consecutive layers.
    pub layer_spacing: f64,
    /// Gap reserved next to an edge passing through a layer.
    pub edge_spacing: f64,
    /// Margin around the whole drawing.
    pub padding: f64,
    /// Upper bound on crossing reduction sweeps.
    pub sweeps: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_width: 160.0,
            node_height: 80.0,
            node_spacing: 80.0,
            layer_spacing: 80.0,
            edge_spacing: 40.0,
            padding: 12.0,
            sweeps: 24,
        }
    }
}

/// The graph handed to a backend: node ids in input order and edges as index
/// pairs into that list. Already checked for unknown or repeated ids.
#[derive(Debug, Clone)]
pub struct LayoutInput<'a> {
    pub ids: Vec<&'a str>,
    pub arcs: Vec<(usize, usize)>,
}

impl<'a> LayoutInput<'a> {
    pub fn new(nodes: &'a [RoadmapNode], edges: &'a [RoadmapEdge]) -> Result<Self, LayoutError> {
        let mut index = HashMap::with_capacity(nodes.len());
        let mut ids = Vec::with_capacity(nodes.len());

        for node in nodes {
            if index.insert(node.id.as_str(), ids.len()).is_some() {
                return Err(LayoutError::DuplicateNode(node.id.clone()));
            }
            ids.push(node.id.as_str());
        }

        let resolve = |edge: &RoadmapEdge, id: &str| {
            index
                .get(id)
                .copied()
                .ok_or_else(|| LayoutError::DanglingEdge {
                    edge: edge.id.clone(),
                    node: id.to_string(),
                })
        };

        let arcs = edges
            .iter()
            .map(|edge| Ok((resolve(edge, edge.from.as_str())?, resolve(edge, edge.to.as_str())?)))
            .collect::<Result<_, LayoutError>>()?;

        Ok(Self { ids, arcs })
    }
}

/// Position and size of one node in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<Rect> for NodeBox {
    fn from(rect: Rect) -> Self {
        NodeBox {
            x: pixels(rect.x),
            y: pixels(rect.y),
            width: pixels(rect.width),
            height: pixels(rect.height),
        }
    }
}

/// Whole pixels are written as integers, the way layouts are authored.
fn pixels(value: f64) -> Number {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Number::from(value as i64)
    } else {
        Number::from_f64(value).unwrap_or_else(|| Number::from(0))
    }
}

/// Boxes for every input node, aligned with [`LayoutInput::ids`], plus the
/// size of the whole drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrangement {
    pub boxes: Vec<Rect>,
    pub width: f64,
    pub height: f64,
}

/// A graph drawing algorithm.
pub trait LayoutBackend {
    /// Name recorded as the `algorithm` of produced layouts.
    fn algorithm(&self) -> &'static str;

    fn arrange(&self, input: &LayoutInput, direction: Direction) -> anyhow::Result<Arrangement>;
}

/// Computes a layout for the desktop breakpoint.
pub fn compute_layout(
    backend: &dyn LayoutBackend,
    nodes: &[RoadmapNode],
    edges: &[RoadmapEdge],
    direction: Direction,
) -> Result<LayoutData, LayoutError> {
    let input = LayoutInput::new(nodes, edges)?;
    let arrangement = backend
        .arrange(&input, direction)
        .map_err(LayoutError::Backend)?;

    if arrangement.boxes.len() != input.ids.len() {
        return Err(LayoutError::Backend(anyhow::anyhow!(
            "backend placed {} of {} nodes",
            arrangement.boxes.len(),
            input.ids.len()
        )));
    }

    let nodes: BTreeMap<String, NodeBox> = input
        .ids
        .iter()
        .zip(arrangement.boxes)
        .map(|(id, rect)| (id.to_string(), NodeBox::from(rect)))
        .collect();

    Ok(LayoutData {
        algorithm: Some(backend.algorithm().to_string()),
        direction: Some(direction.code()),
        breakpoints: Some(Breakpoints {
            desktop: Some(Placement {
                nodes,
                width: Some(pixels(arrangement.width)),
                height: Some(pixels(arrangement.height)),
                extra: Extra::new(),
            }),
            ..Default::default()
        }),
        groups: None,
        extra: Extra::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str) -> RoadmapNode {
        serde_json::from_value(json!({
            "id": id,
            "title": id,
            "level": "B",
            "status": "core",
            "tags": [],
            "resources": []
        }))
        .unwrap()
    }

    fn edge(id: &str, from: &str, to: &str) -> RoadmapEdge {
        serde_json::from_value(json!({ "id": id, "from": from, "to": to, "type": "requires" }))
            .unwrap()
    }

    struct Broken;

    impl LayoutBackend for Broken {
        fn algorithm(&self) -> &'static str {
            "broken"
        }

        fn arrange(&self, _: &LayoutInput, _: Direction) -> anyhow::Result<Arrangement> {
            anyhow::bail!("no layout today")
        }
    }

    #[test]
    fn direction_codes_round_trip() {
        for direction in [Direction::Down, Direction::Up, Direction::Right, Direction::Left] {
            assert_eq!(Direction::from_code(direction.code()), direction);
        }
        assert_eq!("LR".parse::<Direction>().unwrap(), Direction::Right);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn every_node_placed_once() {
        let nodes = vec![node("html"), node("css"), node("js"), node("lonely")];
        let edges = vec![edge("e1", "html", "css"), edge("e2", "css", "js")];

        let layout =
            compute_layout(&Layered::default(), &nodes, &edges, Direction::Down).unwrap();
        let desktop = layout.desktop().unwrap();

        let keys: Vec<_> = desktop.nodes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["css", "html", "js", "lonely"]);
        assert_eq!(layout.algorithm.as_deref(), Some("layered"));
        assert_eq!(layout.direction, Some(DirectionCode::TB));
    }

    #[test]
    fn rejects_unknown_endpoints() {
        let nodes = vec![node("html")];
        let edges = vec![edge("e1", "html", "css")];

        let err = compute_layout(&Layered::default(), &nodes, &edges, Direction::Down)
            .unwrap_err();
        assert!(matches!(err, LayoutError::DanglingEdge { ref node, .. } if node == "css"));
    }

    #[test]
    fn rejects_repeated_nodes() {
        let nodes = vec![node("html"), node("html")];
        let err = compute_layout(&Layered::default(), &nodes, &[], Direction::Down).unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateNode(ref id) if id == "html"));
    }

    #[test]
    fn whole_pixels_are_integers() {
        let nodes = vec![node("html"), node("css")];
        let edges = vec![edge("e1", "html", "css")];

        let layout =
            compute_layout(&Layered::default(), &nodes, &edges, Direction::Down).unwrap();
        let json = serde_json::to_value(&layout).unwrap();

        assert_eq!(
            json["breakpoints"]["desktop"]["nodes"]["css"],
            json!({ "x": 12, "y": 172, "width": 160, "height": 80 })
        );
        assert_eq!(pixels(12.25), Number::from_f64(12.25).unwrap());
    }

    #[test]
    fn backend_failure_is_reported() {
        let nodes = vec![node("html")];
        let err = compute_layout(&Broken, &nodes, &[], Direction::Down).unwrap_err();
        assert!(matches!(err, LayoutError::Backend(_)));
    }
}

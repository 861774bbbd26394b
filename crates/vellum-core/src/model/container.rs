//! Container records: layers and groups.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::id::ContainerId;

/// Blend mode applied when compositing a container over what is below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
}

impl BlendMode {
    pub fn tag(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        [
            BlendMode::Normal,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::Overlay,
            BlendMode::Darken,
            BlendMode::Lighten,
        ]
        .into_iter()
        .find(|mode| mode.tag() == tag)
    }
}

/// A layer or group. Containers transform their children: a child's local
/// coordinates are scaled, rotated, then translated into the parent frame.
/// Child order lives in a separate ordered sequence, not on this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: ContainerId,
    pub name: Option<String>,
    pub position: Point,
    /// Degrees, normalized to [0, 360).
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub opacity: f64,
    pub blend: BlendMode,
    pub visible: bool,
    pub locked: bool,
}

impl ContainerRecord {
    pub fn new(id: ContainerId) -> Self {
        Self {
            id,
            name: None,
            position: Point::ZERO,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity: 1.0,
            blend: BlendMode::Normal,
            visible: true,
            locked: false,
        }
    }
}

/// Partial container update. Absent fields are left untouched in the
/// stored record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerPatch {
    pub name: Option<String>,
    pub position: Option<Point>,
    pub rotation: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub opacity: Option<f64>,
    pub blend: Option<BlendMode>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
}

impl ContainerPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            position: Some(Point::new(x, y)),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_container_is_identity() {
        let container = ContainerRecord::new(ContainerId::generate());
        assert_eq!(container.position, Point::ZERO);
        assert_eq!(container.rotation, 0.0);
        assert_eq!(container.scale_x, 1.0);
        assert_eq!(container.scale_y, 1.0);
        assert_eq!(container.blend, BlendMode::Normal);
        assert!(container.visible);
        assert!(!container.locked);
    }

    #[test]
    fn test_blend_tag_round_trip() {
        for mode in [
            BlendMode::Normal,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::Overlay,
            BlendMode::Darken,
            BlendMode::Lighten,
        ] {
            assert_eq!(BlendMode::from_tag(mode.tag()), Some(mode));
        }
    }
}

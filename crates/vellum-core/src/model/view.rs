//! Views (pages/slides) and their backgrounds.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::id::{TemplateId, ViewId};
use crate::model::object::ImageFit;
use crate::model::style::{GradientSpec, Paint};

/// Default canvas size of a freshly created view.
pub const DEFAULT_VIEW_SIZE: Size = Size::new(1920.0, 1080.0);

/// Sparse background definition. A view fills unset fields from its
/// template's background, when one is attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub color: Option<Paint>,
    pub gradient: Option<GradientSpec>,
    pub image: Option<String>,
    pub fit: Option<ImageFit>,
}

impl Background {
    pub fn solid(paint: Paint) -> Self {
        Self {
            color: Some(paint),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.gradient.is_none()
            && self.image.is_none()
            && self.fit.is_none()
    }
}

/// Per-field flags marking which background fields a view keeps as its own
/// while a template is attached. Unflagged fields come from the template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundOverrides {
    pub color: bool,
    pub gradient: bool,
    pub image: bool,
    pub fit: bool,
}

impl BackgroundOverrides {
    pub fn any(self) -> bool {
        self.color || self.gradient || self.image || self.fit
    }
}

/// Transition played when presenting moves onto a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    #[default]
    None,
    Fade,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    Zoom,
}

impl TransitionKind {
    pub fn tag(self) -> &'static str {
        match self {
            TransitionKind::None => "none",
            TransitionKind::Fade => "fade",
            TransitionKind::SlideLeft => "slide-left",
            TransitionKind::SlideRight => "slide-right",
            TransitionKind::SlideUp => "slide-up",
            TransitionKind::SlideDown => "slide-down",
            TransitionKind::Zoom => "zoom",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        [
            TransitionKind::None,
            TransitionKind::Fade,
            TransitionKind::SlideLeft,
            TransitionKind::SlideRight,
            TransitionKind::SlideUp,
            TransitionKind::SlideDown,
            TransitionKind::Zoom,
        ]
        .into_iter()
        .find(|kind| kind.tag() == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    pub duration_ms: u32,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            kind: TransitionKind::None,
            duration_ms: 300,
        }
    }
}

/// A page: a named rectangle in canvas space. Presentation order is kept
/// in a separate global sequence, independent of canvas placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub id: ViewId,
    pub name: String,
    pub position: Point,
    pub size: Size,
    pub background: Background,
    pub template: Option<TemplateId>,
    pub background_overrides: BackgroundOverrides,
    pub transition: Transition,
    pub hidden: bool,
}

impl ViewRecord {
    pub fn new(id: ViewId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            position: Point::ZERO,
            size: DEFAULT_VIEW_SIZE,
            background: Background::default(),
            template: None,
            background_overrides: BackgroundOverrides::default(),
            transition: Transition::default(),
            hidden: false,
        }
    }

    /// Canvas-space rectangle covered by this view.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.size.width,
            self.position.y + self.size.height,
        )
    }

    pub fn origin(&self) -> Point {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_view_has_default_canvas_rect() {
        let view = ViewRecord::new(ViewId::generate(), "Intro");
        assert_eq!(view.rect(), Rect::new(0.0, 0.0, 1920.0, 1080.0));
        assert!(!view.hidden);
        assert!(view.background.is_empty());
    }

    #[test]
    fn test_transition_tag_round_trip() {
        for kind in [
            TransitionKind::None,
            TransitionKind::Fade,
            TransitionKind::SlideLeft,
            TransitionKind::SlideRight,
            TransitionKind::SlideUp,
            TransitionKind::SlideDown,
            TransitionKind::Zoom,
        ] {
            assert_eq!(TransitionKind::from_tag(kind.tag()), Some(kind));
        }
    }
}

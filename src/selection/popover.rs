use super::{Selection, SelectionGeometry};
use crate::dom::Range;
use crate::theme::Color;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const POPOVER_OFFSET_Y_PX: f32 = 50.0;
pub const POPOVER_WIDTH_PX: f32 = 70.0;
pub const POPOVER_HEIGHT_PX: f32 = 40.0;
const POPOVER_MARGIN_LEFT_PX: f32 = -POPOVER_WIDTH_PX / 2.0;
const POPOVER_RADIUS_PX: f32 = 20.0;
const POPOVER_PADDING_PX: f32 = 10.0;
const BUTTON_GAP_PX: f32 = 10.0;
const BUTTON_SIZE_PX: f32 = 20.0;
pub const POPOVER_SHADOW: &str = "0 10px 30px 0 #00000029";

/// One highlight choice offered by the popover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HighlightAction {
    pub id: String,
    pub style_class: String,
    pub color: Color,
}

impl HighlightAction {
    pub fn new(id: impl Into<String>, style_class: impl Into<String>, color: Color) -> Self {
        Self {
            id: id.into(),
            style_class: style_class.into(),
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct PopoverButton {
    pub action_id: String,
    pub color: Color,
    /// Ring color while hovered; the popover background.
    pub hover_ring: Color,
}

impl PopoverButton {
    pub fn to_css(&self) -> String {
        format!(
            "width: {size}px; height: {size}px; border-radius: {}px; background-color: {};",
            BUTTON_SIZE_PX / 2.0,
            self.color.to_css(),
            size = BUTTON_SIZE_PX,
        )
    }
}

/// Positioned popover box, ready for a shell to draw.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct PopoverView {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub background: Color,
    pub shadow: Option<String>,
    pub buttons: Vec<PopoverButton>,
}

impl PopoverView {
    pub fn to_css(&self) -> String {
        let mut css = format!(
            "position: absolute; left: {}px; top: {}px; margin-left: {}px; width: {}px; \
             height: {}px; border-radius: {}px; padding: {}px; display: flex; \
             flex-direction: row; column-gap: {}px; background: {};",
            self.left,
            self.top,
            self.margin_left,
            self.width,
            self.height,
            POPOVER_RADIUS_PX,
            POPOVER_PADDING_PX,
            BUTTON_GAP_PX,
            self.background.to_css(),
        );
        if let Some(shadow) = &self.shadow {
            css.push_str(&format!(" box-shadow: {shadow};"));
        }
        css
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopoverOutcome {
    Committed { style_class: String },
    UnknownAction,
    NoSelection,
    CollapsedSelection,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionPopover {
    actions: Vec<HighlightAction>,
}

impl SelectionPopover {
    pub fn new(actions: Vec<HighlightAction>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[HighlightAction] {
        &self.actions
    }

    pub fn action(&self, action_id: &str) -> Option<&HighlightAction> {
        self.actions.iter().find(|action| action.id == action_id)
    }

    /// `None` whenever there is nothing to attach the popover to.
    pub fn render(
        &self,
        geometry: &SelectionGeometry,
        background: Color,
        shadow: bool,
    ) -> Option<PopoverView> {
        if geometry.is_collapsed {
            return None;
        }
        let rect = geometry.rect?;
        Some(PopoverView {
            left: rect.left + rect.width / 2.0,
            top: rect.top - POPOVER_OFFSET_Y_PX,
            width: POPOVER_WIDTH_PX,
            height: POPOVER_HEIGHT_PX,
            margin_left: POPOVER_MARGIN_LEFT_PX,
            background,
            shadow: shadow.then(|| POPOVER_SHADOW.to_string()),
            buttons: self
                .actions
                .iter()
                .map(|action| PopoverButton {
                    action_id: action.id.clone(),
                    color: action.color,
                    hover_ring: background,
                })
                .collect(),
        })
    }

    /// Run `action_id` against the selection as it is right now.
    ///
    /// Neither the selection nor the document is touched here; `commit` does the work.
    pub fn invoke<F>(&self, action_id: &str, live: &Selection, commit: F) -> PopoverOutcome
    where
        F: FnOnce(&str, Range),
    {
        let Some(action) = self.action(action_id) else {
            return PopoverOutcome::UnknownAction;
        };
        let Some(range) = live.range_at(0) else {
            return PopoverOutcome::NoSelection;
        };
        if range.is_collapsed() {
            return PopoverOutcome::CollapsedSelection;
        }
        commit(&action.style_class, range.clone());
        PopoverOutcome::Committed {
            style_class: action.style_class.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{BoundaryPoint, Document, TextAnchor};
    use crate::layout::Rect;

    fn popover() -> SelectionPopover {
        SelectionPopover::new(vec![
            HighlightAction::new("color_1", "color-1", Color::CORNSILK),
            HighlightAction::new("color_2", "color-2", Color::TURQUOISE),
        ])
    }

    fn geometry(left: f32, top: f32, width: f32, is_collapsed: bool) -> SelectionGeometry {
        SelectionGeometry {
            rect: Some(Rect {
                left,
                top,
                width,
                height: 20.0,
            }),
            is_collapsed,
        }
    }

    #[test]
    fn collapsed_geometry_renders_nothing() {
        for (left, top, width) in [(0.0, 0.0, 0.0), (100.0, 200.0, 50.0), (-5.0, 9000.0, 1.0)] {
            assert!(
                popover()
                    .render(&geometry(left, top, width, true), Color::WHITE, true)
                    .is_none()
            );
        }
    }

    #[test]
    fn missing_rect_renders_nothing() {
        let geometry = SelectionGeometry {
            rect: None,
            is_collapsed: false,
        };
        assert!(popover().render(&geometry, Color::WHITE, false).is_none());
    }

    #[test]
    fn anchors_centered_and_fifty_pixels_above() {
        let view = popover()
            .render(&geometry(100.0, 200.0, 50.0, false), Color::WHITE, false)
            .expect("popover");
        assert!((view.left - 125.0).abs() < f32::EPSILON);
        assert!((view.top - 150.0).abs() < f32::EPSILON);
        assert_eq!(view.margin_left, -35.0);
        assert!(view.shadow.is_none());
        assert_eq!(view.buttons.len(), 2);
    }

    #[test]
    fn shadow_flag_adds_box_shadow() {
        let view = popover()
            .render(&geometry(0.0, 100.0, 10.0, false), Color::PAPER_RAISED, true)
            .expect("popover");
        let css = view.to_css();
        assert!(css.contains("box-shadow: 0 10px 30px 0 #00000029;"));
        assert!(css.contains("background: #f2f2f7;"));
        assert!(css.contains("margin-left: -35px;"));
        assert!(view.buttons[1].to_css().contains("background-color: #40e0d0;"));
    }

    #[test]
    fn invoke_commits_the_live_range_with_the_action_class() {
        let doc = Document::parse_html("<p>hello world</p>");
        let range = TextAnchor::new(0, 5).resolve(&doc).expect("range");
        let mut live = Selection::new();
        live.select(range.clone());

        let mut committed = None;
        let outcome = popover().invoke("color_2", &live, |class, range| {
            committed = Some((class.to_string(), range));
        });
        assert_eq!(
            outcome,
            PopoverOutcome::Committed {
                style_class: "color-2".to_string()
            }
        );
        assert_eq!(committed, Some(("color-2".to_string(), range)));
        assert_eq!(live.range_count(), 1);
    }

    #[test]
    fn invoke_refuses_unknown_actions_and_empty_selections() {
        let doc = Document::parse_html("<p>hello</p>");
        let text = doc
            .descendants(doc.root())
            .into_iter()
            .find(|node| doc.is_text(*node))
            .expect("text");
        let mut live = Selection::new();

        let mut calls = 0;
        assert_eq!(
            popover().invoke("color_1", &live, |_, _| calls += 1),
            PopoverOutcome::NoSelection
        );
        live.select(Range::collapsed(&doc, BoundaryPoint::new(text, 1)));
        assert_eq!(
            popover().invoke("color_1", &live, |_, _| calls += 1),
            PopoverOutcome::CollapsedSelection
        );
        live.select(TextAnchor::new(0, 2).resolve(&doc).expect("range"));
        assert_eq!(
            popover().invoke("color_9", &live, |_, _| calls += 1),
            PopoverOutcome::UnknownAction
        );
        assert_eq!(calls, 0);
    }
}

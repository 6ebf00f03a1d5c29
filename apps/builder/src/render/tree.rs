//! Visual tree produced by the template renderer and consumed by the raster layout.
//!
//! Sizes are logical pixels at 1× scale. The tree carries no positions; the
//! layout engine decides those from the page width.

use serde::{Deserialize, Serialize};

use crate::render::TemplateId;

/// Logical width of a rendered résumé before capture scaling.
pub const PAGE_WIDTH_PX: f32 = 800.0;
/// Inner padding on all sides.
pub const PAGE_PADDING_PX: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const WHITE: Color = Color(255, 255, 255);
    pub const GRAY_100: Color = Color(243, 244, 246);
    pub const GRAY_200: Color = Color(229, 231, 235);
    pub const GRAY_300: Color = Color(209, 213, 219);
    pub const GRAY_400: Color = Color(156, 163, 175);
    pub const GRAY_500: Color = Color(107, 114, 128);
    pub const GRAY_600: Color = Color(75, 85, 99);
    pub const GRAY_700: Color = Color(55, 65, 81);
    pub const GRAY_800: Color = Color(31, 41, 55);
    pub const GRAY_900: Color = Color(17, 24, 39);
    pub const ROSE_100: Color = Color(255, 228, 230);
    pub const ROSE_500: Color = Color(244, 63, 94);
    pub const PURPLE_600: Color = Color(147, 51, 234);
    pub const EMERALD_500: Color = Color(16, 185, 129);
    pub const EMERALD_600: Color = Color(5, 150, 105);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontKind {
    Serif,
    Sans,
    Mono,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    Regular,
    Medium,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f32,
    pub weight: Weight,
    pub italic: bool,
    pub uppercase: bool,
    pub color: Color,
}

impl TextStyle {
    pub const fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            weight: Weight::Regular,
            italic: false,
            uppercase: false,
            color,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = Weight::Bold;
        self
    }

    pub fn medium(mut self) -> Self {
        self.weight = Weight::Medium;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    /// Text as it should be drawn, with case transforms applied.
    pub fn apply(&self, text: &str) -> String {
        if self.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Children stacked vertically with `gap` between them.
    Column { children: Vec<Node>, gap: f32 },
    /// Side-by-side columns; each gets `weight / total` of the width.
    Columns { parts: Vec<(u16, Node)>, gap: f32 },
    /// A wrapped paragraph.
    Text {
        text: String,
        style: TextStyle,
        align: Align,
    },
    /// One line with text pinned left and right (title and dates).
    Split {
        left: String,
        left_style: TextStyle,
        right: String,
        right_style: TextStyle,
    },
    /// Short items flowed on a line with a separator (contact details).
    Inline {
        items: Vec<String>,
        separator: String,
        style: TextStyle,
        align: Align,
    },
    /// Filled pills, wrapped.
    Chips {
        items: Vec<String>,
        style: TextStyle,
        fill: Color,
        align: Align,
    },
    /// Marker-prefixed items laid out in a grid of `columns`.
    Bullets {
        items: Vec<String>,
        marker: String,
        marker_color: Color,
        columns: u8,
        style: TextStyle,
    },
    /// Horizontal rule.
    Rule { color: Color, thickness: f32 },
    /// Vertical whitespace.
    Spacer { height: f32 },
}

impl Node {
    pub fn column(children: Vec<Node>, gap: f32) -> Node {
        Node::Column { children, gap }
    }

    pub fn text(text: impl Into<String>, style: TextStyle) -> Node {
        Node::Text {
            text: text.into(),
            style,
            align: Align::Left,
        }
    }

    pub fn centered(text: impl Into<String>, style: TextStyle) -> Node {
        Node::Text {
            text: text.into(),
            style,
            align: Align::Center,
        }
    }

    pub fn rule(color: Color, thickness: f32) -> Node {
        Node::Rule { color, thickness }
    }

    pub fn spacer(height: f32) -> Node {
        Node::Spacer { height }
    }

    /// Every string this node (and its children) displays, in reading order.
    pub fn collect_text(&self, out: &mut Vec<String>) {
        match self {
            Node::Column { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Node::Columns { parts, .. } => {
                for (_, child) in parts {
                    child.collect_text(out);
                }
            }
            Node::Text { text, .. } => out.push(text.clone()),
            Node::Split { left, right, .. } => {
                out.push(left.clone());
                out.push(right.clone());
            }
            Node::Inline { items, .. } | Node::Chips { items, .. } | Node::Bullets { items, .. } => {
                out.extend(items.iter().cloned())
            }
            Node::Rule { .. } | Node::Spacer { .. } => {}
        }
    }
}

/// Complete output of one template for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualTree {
    /// `None` for the placeholder view.
    pub template: Option<TemplateId>,
    pub font: FontKind,
    pub background: Color,
    pub width: f32,
    pub padding: f32,
    /// Minimum content height; the placeholder reserves a full page.
    pub min_height: f32,
    pub root: Node,
}

impl VisualTree {
    pub fn new(template: Option<TemplateId>, font: FontKind, root: Node) -> Self {
        Self {
            template,
            font,
            background: Color::WHITE,
            width: PAGE_WIDTH_PX,
            padding: PAGE_PADDING_PX,
            min_height: 0.0,
            root,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.template.is_none()
    }

    pub fn texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.collect_text(&mut out);
        out
    }
}

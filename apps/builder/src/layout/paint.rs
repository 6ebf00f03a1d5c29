//! Places a visual tree on a page and paints it.
//!
//! Every node is laid out twice: once to measure the total height (no canvas),
//! then again onto a canvas of exactly that height. Both passes run the same
//! code, so measured and painted geometry always agree.

use crate::layout::face::FontFace;
use crate::layout::raster::RasterImage;
use crate::layout::wrap::wrap_lines;
use crate::render::tree::{Align, Color, Node, TextStyle, VisualTree};

const LINE_HEIGHT: f32 = 1.5;
const CHIP_PAD_X: f32 = 12.0;
const CHIP_PAD_Y: f32 = 4.0;
const CHIP_GAP: f32 = 8.0;
const BULLET_GAP: f32 = 16.0;
const BULLET_ROW_GAP: f32 = 4.0;

/// Paints `tree` at `scale` device pixels per logical pixel. The image is as tall
/// as its content, and never shorter than the tree's minimum height.
pub fn rasterize(tree: &VisualTree, face: &dyn FontFace, scale: f32) -> RasterImage {
    let layout = Layout { face, scale };
    let width = (tree.width * scale).round().max(1.0);
    let pad = tree.padding * scale;
    let inner = (width - 2.0 * pad).max(1.0);

    let content = layout.place(&tree.root, pad, pad, inner, None);
    let height = (content + 2.0 * pad).max(tree.min_height * scale).round().max(1.0);

    let mut canvas = RasterImage::new(width as u32, height as u32, tree.background);
    layout.place(&tree.root, pad, pad, inner, Some(&mut canvas));
    canvas
}

struct Layout<'a> {
    face: &'a dyn FontFace,
    scale: f32,
}

impl Layout<'_> {
    fn px(&self, v: f32) -> f32 {
        v * self.scale
    }

    fn line_height(&self, style: &TextStyle) -> f32 {
        self.px(style.size) * LINE_HEIGHT
    }

    /// Baseline offset from the top of a line box.
    fn baseline(&self, style: &TextStyle) -> f32 {
        let size = self.px(style.size);
        let (ascent, descent) = self.face.vertical_metrics(size);
        (self.line_height(style) - (ascent + descent)) / 2.0 + ascent
    }

    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        self.face.measure(text, self.px(style.size), style.weight)
    }

    fn draw(&self, out: Option<&mut RasterImage>, text: &str, x: f32, top: f32, style: &TextStyle) {
        if let Some(canvas) = out {
            self.face.draw(
                canvas,
                text,
                x,
                top + self.baseline(style),
                self.px(style.size),
                style.weight,
                style.color,
            );
        }
    }

    fn aligned_x(&self, x: f32, width: f32, used: f32, align: Align) -> f32 {
        match align {
            Align::Left => x,
            Align::Center => x + ((width - used) / 2.0).max(0.0),
            Align::Right => x + (width - used).max(0.0),
        }
    }

    /// Lays out `node` with its top-left at (x, y) and returns its height.
    fn place(&self, node: &Node, x: f32, y: f32, width: f32, mut out: Option<&mut RasterImage>) -> f32 {
        match node {
            Node::Column { children, gap } => {
                let gap = self.px(*gap);
                let mut cursor = y;
                let mut placed_any = false;
                for child in children {
                    let top = if placed_any { cursor + gap } else { cursor };
                    let h = self.place(child, x, top, width, out.as_deref_mut());
                    if h > 0.0 {
                        cursor = top + h;
                        placed_any = true;
                    }
                }
                cursor - y
            }
            Node::Columns { parts, gap } => {
                let gap = self.px(*gap);
                let total: f32 = parts.iter().map(|(w, _)| *w as f32).sum();
                if total <= 0.0 {
                    return 0.0;
                }
                let usable = (width - gap * parts.len().saturating_sub(1) as f32).max(0.0);
                let mut col_x = x;
                let mut tallest = 0.0_f32;
                for (weight, child) in parts {
                    let col_w = usable * (*weight as f32 / total);
                    tallest = tallest.max(self.place(child, col_x, y, col_w, out.as_deref_mut()));
                    col_x += col_w + gap;
                }
                tallest
            }
            Node::Text { text, style, align } => {
                let text = style.apply(text);
                self.paragraph(&text, style, *align, x, y, width, out)
            }
            Node::Split {
                left,
                left_style,
                right,
                right_style,
            } => {
                let left = left_style.apply(left);
                let right = right_style.apply(right);
                let right_w = self.measure(&right, right_style);
                let row_h = self.line_height(left_style).max(self.line_height(right_style));

                // Right text keeps its width; the left side wraps in what remains.
                let left_w = (width - right_w - self.px(CHIP_GAP)).max(width / 2.0);
                let left_h = self.paragraph(&left, left_style, Align::Left, x, y, left_w, out.as_deref_mut());
                if !right.trim().is_empty() {
                    self.draw(out, &right, x + width - right_w, y, right_style);
                    left_h.max(row_h)
                } else {
                    left_h
                }
            }
            Node::Inline {
                items,
                separator,
                style,
                align,
            } => {
                let joiner = if separator.is_empty() {
                    "   ".to_string()
                } else {
                    format!("  {separator}  ")
                };
                let text = items
                    .iter()
                    .filter(|i| !i.is_empty())
                    .map(|i| style.apply(i))
                    .collect::<Vec<_>>()
                    .join(&joiner);
                self.paragraph(&text, style, *align, x, y, width, out)
            }
            Node::Chips {
                items,
                style,
                fill,
                align,
            } => self.chips(items, style, *fill, *align, x, y, width, out),
            Node::Bullets {
                items,
                marker,
                marker_color,
                columns,
                style,
            } => {
                let items: Vec<&String> = items.iter().filter(|i| !i.is_empty()).collect();
                if items.is_empty() {
                    return 0.0;
                }
                let cols = (*columns).max(1) as usize;
                let gap = self.px(BULLET_GAP);
                let col_w = ((width - gap * (cols - 1) as f32) / cols as f32).max(1.0);
                let marker_style = TextStyle {
                    color: *marker_color,
                    ..*style
                };
                let indent = self.measure(marker, &marker_style) + self.measure(" ", style);
                let row_gap = self.px(BULLET_ROW_GAP);

                let mut cursor = y;
                for (row, chunk) in items.chunks(cols).enumerate() {
                    if row > 0 {
                        cursor += row_gap;
                    }
                    let mut tallest = 0.0_f32;
                    for (col, item) in chunk.iter().enumerate() {
                        let cell_x = x + col as f32 * (col_w + gap);
                        self.draw(out.as_deref_mut(), marker, cell_x, cursor, &marker_style);
                        let h = self.paragraph(
                            &style.apply(item),
                            style,
                            Align::Left,
                            cell_x + indent,
                            cursor,
                            (col_w - indent).max(1.0),
                            out.as_deref_mut(),
                        );
                        tallest = tallest.max(h);
                    }
                    cursor += tallest;
                }
                cursor - y
            }
            Node::Rule { color, thickness } => {
                let h = self.px(*thickness).max(1.0);
                if let Some(canvas) = out {
                    canvas.fill_rect(x, y, width, h, *color);
                }
                h
            }
            Node::Spacer { height } => self.px(*height),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn paragraph(
        &self,
        text: &str,
        style: &TextStyle,
        align: Align,
        x: f32,
        y: f32,
        width: f32,
        mut out: Option<&mut RasterImage>,
    ) -> f32 {
        let lines = wrap_lines(text, self.face, self.px(style.size), style.weight, width);
        let line_h = self.line_height(style);
        for (i, line) in lines.iter().enumerate() {
            let used = self.measure(line, style);
            let line_x = self.aligned_x(x, width, used, align);
            self.draw(out.as_deref_mut(), line, line_x, y + i as f32 * line_h, style);
        }
        lines.len() as f32 * line_h
    }

    #[allow(clippy::too_many_arguments)]
    fn chips(
        &self,
        items: &[String],
        style: &TextStyle,
        fill: Color,
        align: Align,
        x: f32,
        y: f32,
        width: f32,
        mut out: Option<&mut RasterImage>,
    ) -> f32 {
        let pad_x = self.px(CHIP_PAD_X);
        let pad_y = self.px(CHIP_PAD_Y);
        let gap = self.px(CHIP_GAP);
        let chip_h = self.line_height(style) + 2.0 * pad_y;

        // Flow chips into rows first so each row can be aligned.
        let mut rows: Vec<Vec<(String, f32)>> = Vec::new();
        let mut row_w = 0.0_f32;
        for item in items.iter().filter(|i| !i.is_empty()) {
            let label = style.apply(item);
            let w = self.measure(&label, style) + 2.0 * pad_x;
            match rows.last_mut() {
                Some(row) if row_w + gap + w <= width => {
                    row.push((label, w));
                    row_w += gap + w;
                }
                _ => {
                    rows.push(vec![(label, w)]);
                    row_w = w;
                }
            }
        }

        for (r, row) in rows.iter().enumerate() {
            let top = y + r as f32 * (chip_h + gap);
            let used: f32 = row.iter().map(|(_, w)| w).sum::<f32>() + gap * (row.len() - 1) as f32;
            let mut cx = self.aligned_x(x, width, used, align);
            for (label, w) in row {
                if let Some(canvas) = out.as_deref_mut() {
                    canvas.fill_rect(cx, top, *w, chip_h, fill);
                }
                self.draw(out.as_deref_mut(), label, cx + pad_x, top + pad_y, style);
                cx += w + gap;
            }
        }

        if rows.is_empty() {
            0.0
        } else {
            rows.len() as f32 * chip_h + (rows.len() - 1) as f32 * gap
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::face::BlockFace;
    use crate::models::resume::ResumeDocument;
    use crate::render::render_template;
    use crate::render::tree::{Color, FontKind};
    use crate::render::TemplateId;

    fn named_document() -> ResumeDocument {
        let mut doc = ResumeDocument::default();
        doc.personal_info.full_name = "Jane Doe".to_string();
        doc.personal_info.summary = "Engineer. ".repeat(40);
        doc.skills = vec!["Rust".to_string(), "Go".to_string()];
        doc
    }

    #[test]
    fn test_width_follows_scale() {
        let tree = render_template(&named_document(), TemplateId::Professional);
        assert_eq!(rasterize(&tree, &BlockFace, 1.0).width(), 800);
        assert_eq!(rasterize(&tree, &BlockFace, 2.0).width(), 1600);
    }

    #[test]
    fn test_height_scales_with_content() {
        let short = render_template(&named_document(), TemplateId::Minimalist);
        let mut long_doc = named_document();
        long_doc.personal_info.summary = "Engineer. ".repeat(400);
        let long = render_template(&long_doc, TemplateId::Minimalist);

        let short_h = rasterize(&short, &BlockFace, 1.0).height();
        let long_h = rasterize(&long, &BlockFace, 1.0).height();
        assert!(long_h > short_h);
    }

    #[test]
    fn test_placeholder_reserves_min_height() {
        let tree = render_template(&ResumeDocument::default(), TemplateId::Modern);
        let image = rasterize(&tree, &BlockFace, 2.0);
        assert!(image.height() >= 1600);
    }

    #[test]
    fn test_text_is_painted() {
        let tree = VisualTree::new(
            None,
            FontKind::Sans,
            Node::text("Hello", TextStyle::new(16.0, Color::GRAY_900)),
        );
        let image = rasterize(&tree, &BlockFace, 1.0);
        assert!(image.rgb().chunks(3).any(|p| p == [17, 24, 39]));
    }

    #[test]
    fn test_rule_spans_content_width() {
        let tree = VisualTree::new(None, FontKind::Sans, Node::rule(Color::GRAY_900, 2.0));
        let image = rasterize(&tree, &BlockFace, 1.0);
        assert_eq!(image.pixel(32, 32), Some(Color::GRAY_900));
        assert_eq!(image.pixel(767, 33), Some(Color::GRAY_900));
        assert_eq!(image.pixel(20, 32), Some(Color::WHITE));
        assert_eq!(image.height(), 66);
    }

    #[test]
    fn test_bullet_grid_rows() {
        let style = TextStyle::new(10.0, Color::GRAY_700);
        let bullets = |n: usize| Node::Bullets {
            items: (0..n).map(|i| format!("s{i}")).collect(),
            marker: "•".to_string(),
            marker_color: Color::GRAY_900,
            columns: 3,
            style,
        };
        let layout = Layout { face: &BlockFace, scale: 1.0 };
        let one_row = layout.place(&bullets(3), 0.0, 0.0, 600.0, None);
        let two_rows = layout.place(&bullets(4), 0.0, 0.0, 600.0, None);
        assert_eq!(one_row, 15.0);
        assert_eq!(two_rows, 15.0 * 2.0 + BULLET_ROW_GAP);
    }

    #[test]
    fn test_empty_chips_take_no_space() {
        let layout = Layout { face: &BlockFace, scale: 1.0 };
        let node = Node::Chips {
            items: vec![String::new()],
            style: TextStyle::new(14.0, Color::GRAY_700),
            fill: Color::GRAY_100,
            align: Align::Left,
        };
        assert_eq!(layout.place(&node, 0.0, 0.0, 400.0, None), 0.0);
    }
}

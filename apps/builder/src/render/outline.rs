//! Plain-text rendering of a visual tree, for terminal previews.

use crate::render::tree::{Align, Node, VisualTree};

const OUTLINE_WIDTH: usize = 72;

impl VisualTree {
    /// Flattens the tree to text lines. Columns are emitted one after another.
    pub fn to_outline(&self) -> String {
        let mut lines = Vec::new();
        if let Some(template) = self.template {
            lines.push(format!("[{template}]"));
        }
        outline_node(&self.root, &mut lines);
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }
}

fn aligned(text: &str, align: Align) -> String {
    let len = text.chars().count();
    if len >= OUTLINE_WIDTH {
        return text.to_string();
    }
    let pad = OUTLINE_WIDTH - len;
    match align {
        Align::Left => text.to_string(),
        Align::Center => format!("{}{text}", " ".repeat(pad / 2)),
        Align::Right => format!("{}{text}", " ".repeat(pad)),
    }
}

fn outline_node(node: &Node, lines: &mut Vec<String>) {
    match node {
        Node::Column { children, .. } => {
            for child in children {
                outline_node(child, lines);
            }
        }
        Node::Columns { parts, .. } => {
            for (_, child) in parts {
                outline_node(child, lines);
            }
        }
        Node::Text { text, style, align } => {
            if !text.is_empty() {
                lines.push(aligned(&style.apply(text), *align));
            }
        }
        Node::Split {
            left,
            left_style,
            right,
            right_style,
        } => {
            let left = left_style.apply(left);
            let right = right_style.apply(right);
            let used = left.chars().count() + right.chars().count();
            let gap = OUTLINE_WIDTH.saturating_sub(used).max(2);
            lines.push(format!("{left}{}{right}", " ".repeat(gap)));
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
                format!(" {separator} ")
            };
            let items: Vec<String> = items
                .iter()
                .filter(|i| !i.is_empty())
                .map(|i| style.apply(i))
                .collect();
            lines.push(aligned(&items.join(&joiner), *align));
        }
        Node::Chips { items, style, align, .. } => {
            let chips: Vec<String> = items
                .iter()
                .filter(|i| !i.is_empty())
                .map(|i| format!("[{}]", style.apply(i)))
                .collect();
            lines.push(aligned(&chips.join(" "), *align));
        }
        Node::Bullets {
            items,
            marker,
            style,
            ..
        } => {
            for item in items.iter().filter(|i| !i.is_empty()) {
                lines.push(format!("{marker} {}", style.apply(item)));
            }
        }
        Node::Rule { .. } => lines.push("-".repeat(OUTLINE_WIDTH)),
        Node::Spacer { height } => {
            if *height >= 16.0 {
                lines.push(String::new());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::models::resume::ResumeDocument;
    use crate::render::{render_template, TemplateId};

    fn named_document() -> ResumeDocument {
        let mut doc = ResumeDocument::default();
        doc.personal_info.full_name = "Jane Doe".to_string();
        doc.personal_info.email = "jane@example.com".to_string();
        doc.experience[0].position = "Engineer".to_string();
        doc.experience[0].start_date = "2019".to_string();
        doc.experience[0].end_date = "2024".to_string();
        doc.skills = vec!["Rust".to_string(), "Go".to_string()];
        doc
    }

    #[test]
    fn test_outline_starts_with_template_tag() {
        let outline = render_template(&named_document(), TemplateId::Minimalist).to_outline();
        assert!(outline.starts_with("[minimalist]"));
        assert!(outline.contains("Jane Doe"));
    }

    #[test]
    fn test_outline_uppercases_executive_headings() {
        let outline = render_template(&named_document(), TemplateId::Executive).to_outline();
        assert!(outline.contains("JANE DOE"));
        assert!(outline.contains("AREAS OF EXPERTISE"));
        assert!(outline.contains("• Rust"));
    }

    #[test]
    fn test_outline_chips_and_split_lines() {
        let outline = render_template(&named_document(), TemplateId::Professional).to_outline();
        assert!(outline.contains("[Rust] [Go]"));
        let split = outline
            .lines()
            .find(|l| l.starts_with("Engineer"))
            .expect("experience title line");
        assert!(split.trim_end().ends_with("2019 - 2024"));
    }

    #[test]
    fn test_placeholder_outline() {
        let outline = render_template(&ResumeDocument::default(), TemplateId::Technical).to_outline();
        assert!(outline.contains("Resume Preview"));
        assert!(outline.contains("Fill out the form to see your resume preview"));
        assert!(!outline.contains("[technical]"));
    }
}

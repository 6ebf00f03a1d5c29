// Template Renderer: pure mapping (document, template id) → visual tree.
// No layout validates or mutates the document; identical input gives identical trees.

pub mod outline;
pub mod templates;
pub mod tree;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::resume::ResumeDocument;

pub use tree::VisualTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Professional,
    Modern,
    Creative,
    Executive,
    Minimalist,
    Technical,
}

impl TemplateId {
    pub const ALL: [TemplateId; 6] = [
        TemplateId::Professional,
        TemplateId::Modern,
        TemplateId::Creative,
        TemplateId::Executive,
        TemplateId::Minimalist,
        TemplateId::Technical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Professional => "professional",
            TemplateId::Modern => "modern",
            TemplateId::Creative => "creative",
            TemplateId::Executive => "executive",
            TemplateId::Minimalist => "minimalist",
            TemplateId::Technical => "technical",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TemplateId::Professional => "Serif, centered header, underlined sections",
            TemplateId::Modern => "Sans, accent rule, two-column body with skills sidebar",
            TemplateId::Creative => "Bold accent headings, centered summary, chip skills",
            TemplateId::Executive => "Uppercase serif headings, expertise grid",
            TemplateId::Minimalist => "Muted small headings, no rules",
            TemplateId::Technical => "Monospace, code-comment headings",
        }
    }

    /// Exact identifier match.
    pub fn from_id(id: &str) -> Option<TemplateId> {
        let id = id.trim();
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(id))
    }

    /// Identifier match, falling back to `Professional` for anything unrecognized.
    pub fn resolve(id: &str) -> TemplateId {
        TemplateId::from_id(id).unwrap_or_else(|| {
            debug!(template = id, "Unknown template id, using professional");
            TemplateId::Professional
        })
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders the document with the template named by `template_id`.
pub fn render(doc: &ResumeDocument, template_id: &str) -> VisualTree {
    render_template(doc, TemplateId::resolve(template_id))
}

/// Renders the document with a known template. A document without a name renders
/// the placeholder regardless of template.
pub fn render_template(doc: &ResumeDocument, template: TemplateId) -> VisualTree {
    if doc.personal_info.full_name.is_empty() {
        return templates::placeholder();
    }
    match template {
        TemplateId::Professional => templates::professional(doc),
        TemplateId::Modern => templates::modern(doc),
        TemplateId::Creative => templates::creative(doc),
        TemplateId::Executive => templates::executive(doc),
        TemplateId::Minimalist => templates::minimalist(doc),
        TemplateId::Technical => templates::technical(doc),
    }
}

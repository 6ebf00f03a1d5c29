//! The six résumé layouts.
//!
//! Every layout shows the same data (contact block, summary, all experience,
//! all education, all skills); they differ only in arrangement and styling.

use crate::models::resume::{EducationEntry, ExperienceEntry, ResumeDocument};
use crate::render::tree::{Align, Color, FontKind, Node, TextStyle, VisualTree};
use crate::render::TemplateId;

// Tailwind-equivalent type scale, in logical px.
const SM: f32 = 14.0;
const BASE: f32 = 16.0;
const LG: f32 = 18.0;
const XL: f32 = 20.0;
const XL2: f32 = 24.0;
const XL3: f32 = 30.0;
const XL4: f32 = 36.0;

const SECTION_GAP: f32 = 24.0;

fn contact_items(doc: &ResumeDocument) -> Vec<String> {
    let p = &doc.personal_info;
    vec![p.email.clone(), p.phone.clone(), p.location.clone()]
}

fn education_title(edu: &EducationEntry) -> String {
    format!("{} in {}", edu.degree, edu.field_of_study)
}

fn date_range(exp: &ExperienceEntry, arrow: &str) -> String {
    format!("{} {arrow} {}", exp.start_date, exp.end_date)
}

/// Title/date line, company line, description.
fn experience_block(
    exp: &ExperienceEntry,
    title: TextStyle,
    dates: TextStyle,
    company: TextStyle,
    body: TextStyle,
    arrow: &str,
) -> Node {
    Node::column(
        vec![
            Node::Split {
                left: exp.position.clone(),
                left_style: title,
                right: date_range(exp, arrow),
                right_style: dates,
            },
            Node::text(exp.company.clone(), company),
            Node::text(exp.description.clone(), body),
        ],
        4.0,
    )
}

fn education_block(edu: &EducationEntry, title: TextStyle, year: TextStyle, school: TextStyle) -> Node {
    Node::column(
        vec![
            Node::Split {
                left: education_title(edu),
                left_style: title,
                right: edu.graduation_year.clone(),
                right_style: year,
            },
            Node::text(edu.institution.clone(), school),
        ],
        2.0,
    )
}

fn section(heading: Node, mut body: Vec<Node>, gap: f32) -> Node {
    let mut children = vec![heading];
    children.append(&mut body);
    Node::column(children, gap)
}

/// Shown instead of any layout while the document has no name.
pub fn placeholder() -> VisualTree {
    let mut tree = VisualTree::new(
        None,
        FontKind::Sans,
        Node::column(
            vec![
                Node::spacer(340.0),
                Node::centered("Resume Preview", TextStyle::new(XL, Color::GRAY_400).bold()),
                Node::centered(
                    "Fill out the form to see your resume preview",
                    TextStyle::new(BASE, Color::GRAY_400),
                ),
            ],
            8.0,
        ),
    );
    tree.min_height = 800.0;
    tree
}

pub fn professional(doc: &ResumeDocument) -> VisualTree {
    let heading = |title: &str| {
        Node::column(
            vec![
                Node::text(title, TextStyle::new(LG, Color::GRAY_800).bold()),
                Node::rule(Color::GRAY_300, 1.0),
            ],
            4.0,
        )
    };
    let title = TextStyle::new(BASE, Color::GRAY_800).bold();
    let muted = TextStyle::new(SM, Color::GRAY_600);
    let sub = TextStyle::new(SM, Color::GRAY_700).italic();
    let body = TextStyle::new(SM, Color::GRAY_700);

    let root = Node::column(
        vec![
            Node::column(
                vec![
                    Node::centered(
                        doc.personal_info.full_name.clone(),
                        TextStyle::new(XL2, Color::GRAY_800).bold(),
                    ),
                    Node::Inline {
                        items: contact_items(doc),
                        separator: "|".to_string(),
                        style: muted,
                        align: Align::Center,
                    },
                ],
                8.0,
            ),
            section(
                heading("Professional Summary"),
                vec![Node::text(doc.personal_info.summary.clone(), body)],
                8.0,
            ),
            section(
                heading("Work Experience"),
                doc.experience
                    .iter()
                    .map(|e| experience_block(e, title, muted, sub, body, "-"))
                    .collect(),
                12.0,
            ),
            section(
                heading("Education"),
                doc.education
                    .iter()
                    .map(|e| education_block(e, title, muted, sub))
                    .collect(),
                8.0,
            ),
            section(
                heading("Skills"),
                vec![Node::Chips {
                    items: doc.skills.clone(),
                    style: TextStyle::new(SM, Color::GRAY_800),
                    fill: Color::GRAY_100,
                    align: Align::Left,
                }],
                8.0,
            ),
        ],
        SECTION_GAP,
    );
    VisualTree::new(Some(TemplateId::Professional), FontKind::Serif, root)
}

pub fn modern(doc: &ResumeDocument) -> VisualTree {
    let heading = |title: &str| Node::text(title, TextStyle::new(LG, Color::ROSE_500).bold());
    let title = TextStyle::new(BASE, Color::GRAY_800).bold();
    let muted = TextStyle::new(SM, Color::GRAY_600);
    let sub = TextStyle::new(SM, Color::GRAY_700).medium();
    let body = TextStyle::new(SM, Color::GRAY_700);

    let header = Node::Columns {
        parts: vec![
            (
                2,
                Node::column(
                    vec![
                        Node::text(
                            doc.personal_info.full_name.clone(),
                            TextStyle::new(XL3, Color::GRAY_800).bold(),
                        ),
                        Node::text(doc.headline(), TextStyle::new(BASE, Color::ROSE_500).medium()),
                    ],
                    4.0,
                ),
            ),
            (
                1,
                Node::column(
                    contact_items(doc)
                        .into_iter()
                        .map(|item| Node::Text {
                            text: item,
                            style: TextStyle::new(SM, Color::GRAY_800),
                            align: Align::Right,
                        })
                        .collect(),
                    2.0,
                ),
            ),
        ],
        gap: 16.0,
    };

    let main = Node::column(
        vec![
            section(
                heading("Experience"),
                doc.experience
                    .iter()
                    .map(|e| experience_block(e, title, muted, sub, body, "-"))
                    .collect(),
                12.0,
            ),
            section(
                heading("Education"),
                doc.education
                    .iter()
                    .map(|e| education_block(e, title, muted, sub))
                    .collect(),
                8.0,
            ),
        ],
        SECTION_GAP,
    );
    let side = section(
        heading("Skills"),
        vec![Node::Chips {
            items: doc.skills.clone(),
            style: TextStyle::new(SM, Color::ROSE_500),
            fill: Color::ROSE_100,
            align: Align::Left,
        }],
        12.0,
    );

    let root = Node::column(
        vec![
            header,
            Node::rule(Color::ROSE_500, 2.0),
            section(
                heading("About Me"),
                vec![Node::text(doc.personal_info.summary.clone(), body)],
                8.0,
            ),
            Node::Columns {
                parts: vec![(2, main), (1, side)],
                gap: SECTION_GAP,
            },
        ],
        SECTION_GAP,
    );
    VisualTree::new(Some(TemplateId::Modern), FontKind::Sans, root)
}

pub fn creative(doc: &ResumeDocument) -> VisualTree {
    let accent = TextStyle::new(XL, Color::ROSE_500).bold();
    let title = TextStyle::new(BASE, Color::GRAY_800).bold();
    let muted = TextStyle::new(SM, Color::GRAY_600);
    let sub = TextStyle::new(SM, Color::GRAY_700).medium();
    let body = TextStyle::new(SM, Color::GRAY_700);

    let experience = section(
        Node::column(
            vec![Node::text("Experience", accent), Node::rule(Color::PURPLE_600, 2.0)],
            4.0,
        ),
        doc.experience
            .iter()
            .map(|e| experience_block(e, title, muted, sub, body, "-"))
            .collect(),
        16.0,
    );
    let side = Node::column(
        vec![
            section(
                Node::column(
                    vec![Node::text("Education", accent), Node::rule(Color::PURPLE_600, 2.0)],
                    4.0,
                ),
                doc.education
                    .iter()
                    .map(|e| education_block(e, title, muted, sub))
                    .collect(),
                12.0,
            ),
            section(
                Node::centered("Skills", accent),
                vec![Node::Chips {
                    items: doc.skills.clone(),
                    style: TextStyle::new(SM, Color::PURPLE_600),
                    fill: Color::ROSE_100,
                    align: Align::Center,
                }],
                12.0,
            ),
        ],
        SECTION_GAP,
    );

    let root = Node::column(
        vec![
            Node::column(
                vec![
                    Node::centered(
                        doc.personal_info.full_name.clone(),
                        TextStyle::new(XL4, Color::ROSE_500).bold(),
                    ),
                    Node::Chips {
                        items: contact_items(doc),
                        style: TextStyle::new(SM, Color::GRAY_700),
                        fill: Color::GRAY_100,
                        align: Align::Center,
                    },
                ],
                12.0,
            ),
            section(
                Node::centered("About Me", accent),
                vec![Node::centered(doc.personal_info.summary.clone(), body)],
                8.0,
            ),
            Node::Columns {
                parts: vec![(7, experience), (5, side)],
                gap: 32.0,
            },
        ],
        32.0,
    );
    VisualTree::new(Some(TemplateId::Creative), FontKind::Sans, root)
}

pub fn executive(doc: &ResumeDocument) -> VisualTree {
    let heading = |title: &str| Node::text(title, TextStyle::new(LG, Color::GRAY_900).bold().uppercase());
    let title = TextStyle::new(LG, Color::GRAY_800).bold();
    let muted = TextStyle::new(SM, Color::GRAY_600).medium();
    let company = TextStyle::new(BASE, Color::GRAY_700).bold();
    let body = TextStyle::new(BASE, Color::GRAY_700);

    let experience: Vec<Node> = doc
        .experience
        .iter()
        .map(|e| {
            Node::column(
                vec![
                    Node::Split {
                        left: e.position.clone(),
                        left_style: title,
                        right: date_range(e, "-"),
                        right_style: muted,
                    },
                    Node::rule(Color::GRAY_200, 1.0),
                    Node::text(e.company.clone(), company),
                    Node::text(e.description.clone(), body),
                ],
                4.0,
            )
        })
        .collect();

    let root = Node::column(
        vec![
            Node::column(
                vec![
                    Node::centered(
                        doc.personal_info.full_name.clone(),
                        TextStyle::new(XL3, Color::GRAY_900).bold().uppercase(),
                    ),
                    Node::Inline {
                        items: contact_items(doc),
                        separator: "•".to_string(),
                        style: TextStyle::new(SM, Color::GRAY_600),
                        align: Align::Center,
                    },
                    Node::rule(Color::GRAY_800, 2.0),
                ],
                12.0,
            ),
            section(
                heading("Executive Summary"),
                vec![Node::text(doc.personal_info.summary.clone(), body.italic())],
                12.0,
            ),
            section(heading("Professional Experience"), experience, 16.0),
            section(
                heading("Education"),
                doc.education
                    .iter()
                    .map(|e| {
                        education_block(e, TextStyle::new(BASE, Color::GRAY_800).bold(), muted, body)
                    })
                    .collect(),
                12.0,
            ),
            section(
                heading("Areas of Expertise"),
                vec![Node::Bullets {
                    items: doc.skills.clone(),
                    marker: "•".to_string(),
                    marker_color: Color::GRAY_800,
                    columns: 3,
                    style: TextStyle::new(BASE, Color::GRAY_700),
                }],
                12.0,
            ),
        ],
        32.0,
    );
    VisualTree::new(Some(TemplateId::Executive), FontKind::Serif, root)
}

pub fn minimalist(doc: &ResumeDocument) -> VisualTree {
    let heading = |title: &str| Node::text(title, TextStyle::new(SM, Color::GRAY_500).uppercase());
    let title = TextStyle::new(BASE, Color::GRAY_900).medium();
    let muted = TextStyle::new(SM, Color::GRAY_500);
    let sub = TextStyle::new(SM, Color::GRAY_700);
    let body = TextStyle::new(SM, Color::GRAY_600);

    let root = Node::column(
        vec![
            Node::column(
                vec![
                    Node::text(
                        doc.personal_info.full_name.clone(),
                        TextStyle::new(XL2, Color::GRAY_900).bold(),
                    ),
                    Node::Inline {
                        items: contact_items(doc),
                        separator: String::new(),
                        style: muted,
                        align: Align::Left,
                    },
                ],
                8.0,
            ),
            Node::text(doc.personal_info.summary.clone(), TextStyle::new(BASE, Color::GRAY_700)),
            section(
                heading("Experience"),
                doc.experience
                    .iter()
                    .map(|e| experience_block(e, title, muted, sub, body, "-"))
                    .collect(),
                16.0,
            ),
            section(
                heading("Education"),
                doc.education
                    .iter()
                    .map(|e| education_block(e, title, muted, sub))
                    .collect(),
                12.0,
            ),
            section(
                heading("Skills"),
                vec![Node::Inline {
                    items: doc.skills.clone(),
                    separator: String::new(),
                    style: TextStyle::new(SM, Color::GRAY_700),
                    align: Align::Left,
                }],
                16.0,
            ),
        ],
        32.0,
    );
    VisualTree::new(Some(TemplateId::Minimalist), FontKind::Sans, root)
}

pub fn technical(doc: &ResumeDocument) -> VisualTree {
    let heading = |title: &str| Node::text(title, TextStyle::new(SM, Color::EMERALD_600).bold());
    let title = TextStyle::new(BASE, Color::GRAY_800).bold();
    let muted = TextStyle::new(SM, Color::GRAY_500);
    let sub = TextStyle::new(SM, Color::GRAY_700);
    let body = TextStyle::new(SM, Color::GRAY_600);
    let p = &doc.personal_info;

    let root = Node::column(
        vec![
            Node::column(
                vec![
                    Node::text(p.full_name.clone(), TextStyle::new(XL2, Color::GRAY_800).bold()),
                    Node::Inline {
                        items: vec![
                            format!("@: {}", p.email),
                            format!("#: {}", p.phone),
                            format!("~: {}", p.location),
                        ],
                        separator: String::new(),
                        style: TextStyle::new(SM, Color::GRAY_600),
                        align: Align::Left,
                    },
                    Node::rule(Color::EMERALD_500, 1.0),
                ],
                8.0,
            ),
            section(
                heading("// PROFILE"),
                vec![Node::text(p.summary.clone(), sub)],
                8.0,
            ),
            section(
                heading("// WORK EXPERIENCE"),
                doc.experience
                    .iter()
                    .map(|e| experience_block(e, title, muted, sub, body, "→"))
                    .collect(),
                12.0,
            ),
            section(
                heading("// EDUCATION"),
                doc.education
                    .iter()
                    .map(|e| education_block(e, title, muted, sub))
                    .collect(),
                12.0,
            ),
            section(
                heading("// TECHNICAL SKILLS"),
                vec![Node::Chips {
                    items: doc.skills.clone(),
                    style: TextStyle::new(SM, Color::EMERALD_600),
                    fill: Color::GRAY_100,
                    align: Align::Left,
                }],
                12.0,
            ),
        ],
        SECTION_GAP,
    );
    VisualTree::new(Some(TemplateId::Technical), FontKind::Mono, root)
}

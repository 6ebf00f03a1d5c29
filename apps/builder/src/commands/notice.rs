//! User-facing notices: the session's equivalent of toast messages.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub description: &'static str,
    pub variant: NoticeVariant,
}

impl Notice {
    const fn info(title: &'static str, description: &'static str) -> Self {
        Self {
            title,
            description,
            variant: NoticeVariant::Default,
        }
    }

    pub const SAVED: Notice = Notice::info(
        "Progress Saved",
        "Your resume data has been saved locally.",
    );

    pub const SUBMITTED: Notice = Notice::info(
        "Progress Saved",
        "Your resume data has been saved successfully.",
    );

    pub const EXPORT_STARTED: Notice = Notice::info(
        "Generating PDF",
        "Please wait while we prepare your resume...",
    );

    pub const EXPORT_FINISHED: Notice = Notice::info(
        "PDF Generated",
        "Your resume has been downloaded successfully.",
    );

    pub const EXPORT_FAILED: Notice = Notice {
        title: "Error",
        description: "Failed to generate PDF. Please try again.",
        variant: NoticeVariant::Destructive,
    };

    pub fn is_destructive(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_destructive() { "!!" } else { "**" };
        write!(f, "{marker} {}: {}", self.title, self.description)
    }
}

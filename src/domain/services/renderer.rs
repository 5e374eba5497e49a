use std::sync::Arc;

use tera::{Context, Tera};

use crate::error::AppError;

pub const CREDITS_TEMPLATE: &str = "credits_email.html";
pub const CREDITS_SUBJECT: &str = "Your hackathon credits are ready!";

/// Pure HTML renderer for the redemption-code email. No I/O: the template set
/// is loaded once at startup and rendering only touches memory. The engine is
/// always called with validated non-empty email and code, so the only failure
/// mode left is a template error, which the caller counts as a per-recipient
/// failure.
pub struct MessageRenderer {
    templates: Arc<Tera>,
}

impl MessageRenderer {
    pub fn new(templates: Arc<Tera>) -> Self {
        Self { templates }
    }

    pub fn render(
        &self,
        first_name: &str,
        redemption_link: &str,
        event_name: &str,
    ) -> Result<String, AppError> {
        let display_name = if first_name.trim().is_empty() {
            "there"
        } else {
            first_name
        };

        let mut context = Context::new();
        context.insert("first_name", display_name);
        context.insert("redemption_link", redemption_link);
        context.insert("event_name", event_name);

        self.templates
            .render(CREDITS_TEMPLATE, &context)
            .map_err(|e| AppError::InternalWithMsg(format!("Template render error: {:?}", e)))
    }
}

/// Template set used by the renderer, embedded at build time.
pub fn load_templates() -> Tera {
    let mut tera = Tera::default();
    tera.add_raw_template(
        CREDITS_TEMPLATE,
        include_str!("../../templates/credits_email.html"),
    )
    .expect("Failed to load credits email template");
    tera
}

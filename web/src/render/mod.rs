//! Page rendering.
//!
//! Handlers describe *what* to show with a [`Page`] and a [`TemplateData`];
//! a [`Renderer`] turns that into HTML. The production renderer is
//! [`HandlebarsRenderer`], whose templates are compiled into the binary.

use bookings_core::forms::{Form, FormErrors};
use bookings_core::session::{ERROR_KEY, FLASH_KEY, Session, SessionError, WARNING_KEY};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from template rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A template failed to compile.
    #[error("Failed to register template '{name}': {reason}")]
    Template {
        /// Template name.
        name: &'static str,
        /// Compiler message.
        reason: String,
    },

    /// Rendering a compiled template failed.
    #[error("Failed to render '{page}': {reason}")]
    Render {
        /// Page being rendered.
        page: &'static str,
        /// Renderer message.
        reason: String,
    },
}

/// Every page the site can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Landing page.
    Home,
    /// About the inn.
    About,
    /// Contact details.
    Contact,
    /// Room one.
    GeneralsQuarters,
    /// Room two.
    MajorsSuite,
    /// Date-range search form.
    SearchAvailability,
    /// Reservation form.
    MakeReservation,
    /// One-time confirmation of a stored reservation.
    ReservationSummary,
}

impl Page {
    /// Template name registered for this page.
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Contact => "contact",
            Self::GeneralsQuarters => "generals-quarters",
            Self::MajorsSuite => "majors-suite",
            Self::SearchAvailability => "search-availability",
            Self::MakeReservation => "make-reservation",
            Self::ReservationSummary => "reservation-summary",
        }
    }
}

/// A submitted form as templates see it: first values and error lists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormView {
    /// First submitted value per field.
    pub values: BTreeMap<String, String>,
    /// Error messages per field.
    pub errors: FormErrors,
}

impl From<&Form> for FormView {
    fn from(form: &Form) -> Self {
        Self {
            values: form
                .values()
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            errors: form.errors().clone(),
        }
    }
}

/// Everything a template can reference.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateData {
    /// The form being shown, if the page has one.
    pub form: Option<FormView>,
    /// Page-specific values.
    pub data: Map<String, Value>,
    /// One-shot success message.
    pub flash: Option<String>,
    /// One-shot warning.
    pub warning: Option<String>,
    /// One-shot error, typically left by a redirect.
    pub error: Option<String>,
    /// Whether the visitor is logged in.
    pub is_authenticated: bool,
}

impl TemplateData {
    /// Default data for a page view: pops the one-shot messages from the
    /// session and records whether the visitor is logged in.
    ///
    /// # Errors
    ///
    /// Returns the session error if the store fails.
    pub async fn for_session(session: &Session) -> Result<Self, SessionError> {
        Ok(Self {
            flash: session.pop(FLASH_KEY).await?,
            warning: session.pop(WARNING_KEY).await?,
            error: session.pop(ERROR_KEY).await?,
            is_authenticated: session.is_authenticated().await?,
            ..Self::default()
        })
    }

    /// Attach a form.
    #[must_use]
    pub fn with_form(mut self, form: &Form) -> Self {
        self.form = Some(FormView::from(form));
        self
    }

    /// Add a page-specific value under `key`.
    ///
    /// Values that cannot be represented as JSON are stored as `null`.
    #[must_use]
    pub fn with(mut self, key: &str, value: &impl Serialize) -> Self {
        self.data.insert(
            key.to_string(),
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
        self
    }
}

/// Turns a page and its data into HTML.
pub trait Renderer: Send + Sync {
    /// Render `page`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Render`] if the template fails.
    fn render(&self, page: Page, data: &TemplateData) -> Result<String, RenderError>;
}

const PARTIALS: [(&str, &str); 2] = [
    ("header", include_str!("../../templates/header.hbs")),
    ("footer", include_str!("../../templates/footer.hbs")),
];

const PAGES: [(Page, &str); 8] = [
    (Page::Home, include_str!("../../templates/home.hbs")),
    (Page::About, include_str!("../../templates/about.hbs")),
    (Page::Contact, include_str!("../../templates/contact.hbs")),
    (Page::GeneralsQuarters, include_str!("../../templates/generals-quarters.hbs")),
    (Page::MajorsSuite, include_str!("../../templates/majors-suite.hbs")),
    (Page::SearchAvailability, include_str!("../../templates/search-availability.hbs")),
    (Page::MakeReservation, include_str!("../../templates/make-reservation.hbs")),
    (Page::ReservationSummary, include_str!("../../templates/reservation-summary.hbs")),
];

/// Handlebars renderer over the templates embedded in this crate.
#[derive(Debug)]
pub struct HandlebarsRenderer {
    handlebars: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Compile all embedded templates.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if a template does not compile.
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();

        for (name, source) in PARTIALS {
            handlebars
                .register_partial(name, source)
                .map_err(|e| RenderError::Template {
                    name,
                    reason: e.to_string(),
                })?;
        }
        for (page, source) in PAGES {
            let name = page.template();
            handlebars
                .register_template_string(name, source)
                .map_err(|e| RenderError::Template {
                    name,
                    reason: e.to_string(),
                })?;
        }

        Ok(Self { handlebars })
    }
}

impl Renderer for HandlebarsRenderer {
    fn render(&self, page: Page, data: &TemplateData) -> Result<String, RenderError> {
        self.handlebars
            .render(page.template(), data)
            .map_err(|e| RenderError::Render {
                page: page.template(),
                reason: e.to_string(),
            })
    }
}

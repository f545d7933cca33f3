//! Field validation for submitted forms.
//!
//! [`Form`] wraps the raw submission and records every rule failure against
//! the offending field. Rules never short-circuit: calling `required`,
//! `min_length` and `is_email` on the same field keeps every message, in the
//! order the rules ran, so the visitor sees all problems in one round-trip.
//!
//! A `Form` has no reset operation. Build a fresh one for each request.
//!
//! # Example
//!
//! ```
//! use bookings_core::forms::{Form, FormValues};
//!
//! let values = FormValues::from_pairs([("first_name", "J"), ("email", "nope")]);
//! let mut form = Form::new(values);
//!
//! form.required(&["first_name", "last_name", "email"]);
//! form.min_length("first_name", 3);
//! form.is_email("email");
//!
//! assert!(!form.valid());
//! assert_eq!(form.errors().get("last_name"), Some("This field cannot be blank"));
//! assert_eq!(form.errors().get("email"), Some("Invalid email address"));
//! ```

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Message recorded for an absent or whitespace-only field.
pub const BLANK_FIELD: &str = "This field cannot be blank";

/// Message recorded for a malformed email address.
pub const INVALID_EMAIL: &str = "Invalid email address";

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is a valid regex")
});

/// Message recorded when a field is shorter than `minimum` characters.
#[must_use]
pub fn min_length_message(minimum: usize) -> String {
    format!("This field must be at least {minimum} characters long")
}

/// Raw key → values mapping as supplied by the client.
///
/// Keys may repeat in a urlencoded body; every value is kept and
/// [`FormValues::get`] returns the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormValues(BTreeMap<String, Vec<String>>);

impl FormValues {
    /// Empty submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a submission from `(key, value)` pairs, preserving order per key.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = Self::new();
        for (key, value) in pairs {
            values.add(key, value);
        }
        values
    }

    /// Decode an `application/x-www-form-urlencoded` body.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when the body is not valid urlencoded data.
    pub fn parse(body: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
        Ok(Self::from_pairs(pairs))
    }

    /// Append a value for `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// First value submitted for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Whether `key` was submitted at all, blank or not.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether the submission carries no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over keys and the first value of each.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|(key, values)| {
            values.first().map(|value| (key.as_str(), value.as_str()))
        })
    }
}

/// Field name → ordered error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    /// Append a message to `field`, keeping earlier ones.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// First message recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.messages(field).first().map(String::as_str)
    }

    /// Every message recorded for `field`, in insertion order.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether no field has a message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one message.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

/// A submission under validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    values: FormValues,
    errors: FormErrors,
}

impl Form {
    /// Start validating `values` with an empty error set.
    #[must_use]
    pub fn new(values: FormValues) -> Self {
        Self {
            values,
            errors: FormErrors::default(),
        }
    }

    /// The submission being validated.
    #[must_use]
    pub const fn values(&self) -> &FormValues {
        &self.values
    }

    /// Errors recorded so far.
    #[must_use]
    pub const fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// First submitted value for `field`, or `""`.
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).unwrap_or_default()
    }

    /// Record [`BLANK_FIELD`] for every listed field that is absent or blank.
    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            if !self.has(field) {
                self.errors.add(field, BLANK_FIELD);
            }
        }
    }

    /// Whether `field` is present with a non-blank value. Never records errors.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.values
            .get(field)
            .is_some_and(|value| !value.trim().is_empty())
    }

    /// Check that `field` has at least `minimum` characters once trimmed.
    ///
    /// An absent field records [`BLANK_FIELD`], a short one records
    /// [`min_length_message`]. Returns whether the rule passed.
    pub fn min_length(&mut self, field: &str, minimum: usize) -> bool {
        let Some(value) = self.values.get(field) else {
            self.errors.add(field, BLANK_FIELD);
            return false;
        };

        if value.trim().chars().count() < minimum {
            self.errors.add(field, min_length_message(minimum));
            return false;
        }

        true
    }

    /// Record [`INVALID_EMAIL`] when `field` holds a malformed address.
    ///
    /// Absent or blank fields are skipped; pair with [`Form::required`] to
    /// demand a value.
    pub fn is_email(&mut self, field: &str) {
        if !self.has(field) {
            return;
        }

        if !EMAIL_PATTERN.is_match(self.get(field)) {
            self.errors.add(field, INVALID_EMAIL);
        }
    }

    /// Whether no rule has failed.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the form, returning the submission and its errors.
    #[must_use]
    pub fn into_parts(self) -> (FormValues, FormErrors) {
        (self.values, self.errors)
    }
}

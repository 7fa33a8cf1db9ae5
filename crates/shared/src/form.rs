use crate::domain::NewDocumentSet;

pub const NAME_FIELD: &str = "name";
pub const QUERY_FIELD: &str = "query";
pub const NAME_MAX_CHARS: usize = 255;
pub const QUERY_MAX_CHARS: usize = 1024;

const REQUIRED_MESSAGE: &str = "This field is required";
const INVALID_CHARACTERS_MESSAGE: &str = "Contains invalid characters";

/// Raw fields as submitted by the browser. Absent inputs bind to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSetFormData {
    pub name: Option<String>,
    pub query: Option<String>,
}

impl DocumentSetFormData {
    /// Binds decoded `key=value` pairs. The first value of a repeated field
    /// wins and unknown fields are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut data = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                NAME_FIELD => &mut data.name,
                QUERY_FIELD => &mut data.query,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        data
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Bindable creation form for a document set.
///
/// An unbound form (`empty`) renders blank inputs; a bound form keeps the
/// submitted values so a rejected submission can be shown back to the user
/// alongside its errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSetForm {
    data: DocumentSetFormData,
    errors: Vec<FieldError>,
}

impl DocumentSetForm {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bind(data: DocumentSetFormData) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.data.name.as_deref().unwrap_or_default()
    }

    pub fn query(&self) -> &str {
        self.data.query.as_deref().unwrap_or_default()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |error| error.field == field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Checks every field and returns either the record to store or the
    /// form carrying all field errors found.
    pub fn validate(mut self) -> Result<NewDocumentSet, DocumentSetForm> {
        self.errors.clear();

        let name = self.name().trim().to_string();
        if name.is_empty() {
            self.errors.push(FieldError::new(NAME_FIELD, REQUIRED_MESSAGE));
        } else if has_undecodable_bytes(&name) {
            self.errors
                .push(FieldError::new(NAME_FIELD, INVALID_CHARACTERS_MESSAGE));
        } else if name.chars().count() > NAME_MAX_CHARS {
            self.errors.push(FieldError::new(
                NAME_FIELD,
                format!("Maximum length is {NAME_MAX_CHARS}"),
            ));
        }

        let query = self.query().trim().to_string();
        if has_undecodable_bytes(&query) {
            self.errors
                .push(FieldError::new(QUERY_FIELD, INVALID_CHARACTERS_MESSAGE));
        } else if query.chars().count() > QUERY_MAX_CHARS {
            self.errors.push(FieldError::new(
                QUERY_FIELD,
                format!("Maximum length is {QUERY_MAX_CHARS}"),
            ));
        }

        if self.has_errors() {
            return Err(self);
        }

        Ok(NewDocumentSet {
            name,
            query: (!query.is_empty()).then_some(query),
        })
    }
}

// Percent-decoding replaces bytes that are not UTF-8 with U+FFFD.
fn has_undecodable_bytes(value: &str) -> bool {
    value.contains(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;

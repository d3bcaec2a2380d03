//! Schema validation of rendered feeds.
//!
//! [`Validator`] parses a document with libxml2, discarding blank text
//! nodes, and checks it against a compiled XML Schema, by default the
//! bundled RSS 2.0 schema. Violations are collected rather than returned as
//! errors; each call to [`Validator::validate`] replaces the previous list.
//!
//! ```
//! use rss_writer::feed::{Channel, Feed, Item};
//! use rss_writer::validation::Validator;
//!
//! let mut channel = Channel::new();
//! channel.title("Title").url("http://example.com").description("About");
//! let mut item = Item::new();
//! item.title("First");
//! item.append_to(&mut channel);
//!
//! let mut feed = Feed::new();
//! feed.add_channel(channel);
//!
//! let mut validator = Validator::new().unwrap();
//! assert!(validator.validate(&feed.render().unwrap()));
//! assert!(validator.last_errors().is_empty());
//! ```

use std::fmt;
use std::io;
use std::path::Path;

use libxml::error::{StructuredError, XmlErrorLevel};
use libxml::parser::{Parser, ParserOptions};
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};
use thiserror::Error;

/// The RSS 2.0 schema shipped with the crate.
pub const RSS_SCHEMA: &str = include_str!("../../schema/rss-2.0.xsd");

/// Errors loading or compiling a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid schema: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// How serious a reported problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational; does not make the document invalid.
    Warning,
    /// The document violates the schema.
    Error,
    /// The document is not well-formed XML.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        })
    }
}

impl From<XmlErrorLevel> for Severity {
    fn from(level: XmlErrorLevel) -> Self {
        match level {
            XmlErrorLevel::None | XmlErrorLevel::Warning => Self::Warning,
            XmlErrorLevel::Error => Self::Error,
            XmlErrorLevel::Fatal => Self::Fatal,
        }
    }
}

/// One problem found while validating, with the 1-based source line when
/// known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub line: Option<usize>,
    pub message: String,
    pub severity: Severity,
}

impl ValidationError {
    fn fatal(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
            severity: Severity::Fatal,
        }
    }
}

impl From<StructuredError> for ValidationError {
    fn from(error: StructuredError) -> Self {
        Self {
            line: error
                .line
                .and_then(|line| usize::try_from(line).ok())
                .filter(|&line| line > 0),
            message: error
                .message
                .as_deref()
                .map(str::trim_end)
                .unwrap_or("unknown schema error")
                .to_string(),
            severity: error.level.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Validates documents against one compiled schema.
///
/// The compiled schema is reused for every call. A validator is tied to
/// the thread that created it.
pub struct Validator {
    parser: Parser,
    context: SchemaValidationContext,
    errors: Vec<ValidationError>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Validator for the bundled RSS 2.0 schema.
    pub fn new() -> Result<Self, SchemaError> {
        Self::from_buffer(RSS_SCHEMA.as_bytes())
    }

    /// Validator for the schema file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let schema = std::fs::read(path)?;
        let validator = Self::from_buffer(&schema)?;
        tracing::info!(path = %path.display(), "Loaded schema");
        Ok(validator)
    }

    /// Compiles the schema document in `schema`.
    pub fn from_buffer(schema: &[u8]) -> Result<Self, SchemaError> {
        let mut schema_parser = SchemaParserContext::from_buffer(schema);
        let context = SchemaValidationContext::from_parser(&mut schema_parser).map_err(|errors| {
            SchemaError::Invalid(
                errors
                    .into_iter()
                    .map(|e| ValidationError::from(e).to_string())
                    .collect(),
            )
        })?;
        Ok(Self {
            parser: Parser::default(),
            context,
            errors: Vec::new(),
        })
    }

    /// Returns `true` when `xml` is well-formed and conforms to the schema.
    /// Problems are available from [`last_errors`](Self::last_errors) until
    /// the next call.
    pub fn validate(&mut self, xml: &str) -> bool {
        self.errors.clear();

        let options = ParserOptions {
            recover: false,
            no_blanks: true,
            no_net: true,
            no_error: true,
            no_warning: true,
            ..ParserOptions::default()
        };
        match self.parser.parse_string_with_options(xml, options) {
            Ok(document) => {
                if let Err(errors) = self.context.validate_document(&document) {
                    self.errors.extend(errors.into_iter().map(ValidationError::from));
                    if !self.errors.iter().any(|e| e.severity >= Severity::Error) {
                        self.errors.push(ValidationError {
                            line: None,
                            message: "Document does not conform to the schema".to_string(),
                            severity: Severity::Error,
                        });
                    }
                }
            }
            Err(e) => self
                .errors
                .push(ValidationError::fatal(format!("Document is not well-formed XML ({e:?})"))),
        }

        let valid = !self.errors.iter().any(|e| e.severity >= Severity::Error);
        tracing::debug!(valid, problems = self.errors.len(), "Validated document");
        valid
    }

    pub fn last_errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

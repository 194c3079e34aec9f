use super::{Pointer, RED, RESET};
use crate::{log::Visual, region::Region};
use std::fmt::{Debug, Display, Formatter, Result};

/// The pipeline stage that produced an [`Error`].
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum ErrorKind {
    /// Tokenization failed.
    Lex,
    /// The token stream is structurally invalid.
    Parse,
    /// Evaluation of a compiled template failed.
    Render,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ErrorKind::Lex => write!(f, "lex"),
            ErrorKind::Parse => write!(f, "parse"),
            ErrorKind::Render => write!(f, "render"),
        }
    }
}

/// Describes a failure in one of the pipeline stages, and allows attaching
/// contextual help text and a visualization.
///
/// # Examples
///
/// Creating an [`Error`] that includes a [`Visual`] of type [`Pointer`]:
///
/// ```
/// use vellum::{Error, Region};
///
/// Error::parse("unexpected keyword")
///     .with_pointer("{% update name %}", Region::new(3..9))
///     .with_name("template.txt")
///     .with_help(r#"expected one of "if", "set", "for""#);
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces:
///
/// ```text
/// parse error: unexpected keyword
///   --> template.txt:1:4
///    |
///  1 | {% update name %}
///    |    ^^^^^^
///    |
///   = help: expected one of "if", "set", "for"
/// ```
pub struct Error {
    /// The stage that the [`Error`] comes from.
    kind: ErrorKind,
    /// Describes the cause of the [`Error`].
    reason: String,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the template that the [`Error`] comes from.
    name: Option<String>,
}

impl Error {
    /// Create a new [`Error`] of the given kind and reason.
    pub fn of<T>(kind: ErrorKind, reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            kind,
            reason: reason.into(),
            name: None,
            visual: None,
            help: None,
        }
    }

    /// Create a new [`ErrorKind::Lex`] error with the given reason text.
    pub fn lex<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::of(ErrorKind::Lex, reason)
    }

    /// Create a new [`ErrorKind::Parse`] error with the given reason text.
    pub fn parse<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::of(ErrorKind::Parse, reason)
    }

    /// Create a new [`ErrorKind::Render`] error with the given reason text.
    pub fn render<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::of(ErrorKind::Render, reason)
    }

    /// Create a new [`Error`] with the given reason text.
    ///
    /// The error is of kind [`ErrorKind::Render`], which is what a
    /// [`Filter`][`crate::filter::Filter`] should return.
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::of(ErrorKind::Render, reason)
    }

    /// Set the reason text, a short summary of the [`Error`].
    pub fn with_reason<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.reason = text.into();

        self
    }

    /// Set the name of the [`Template`][`crate::Template`] that the
    /// [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the [`Visual`], a visualization that helps illustrate the cause
    /// of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] over the given source text
    /// and [`Region`].
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        self.visual = Some(Box::new(Pointer::new(source, region.into())));

        self
    }

    /// Set the help text, contextual information to accompany the reason.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Set the name of the related template, unless one is already set.
    pub(crate) fn with_name_if_empty<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        if self.name.is_none() {
            self.name = Some(text.into());
        }

        self
    }

    /// Return the [`ErrorKind`] describing the originating stage.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the reason text.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Return the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the name of the template that the error is related to.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .finish()?;

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let header = format!("{RED}{} error{RESET}", self.kind);
        write!(f, "{header}: {}", self.reason)?;

        if self.visual.is_some() && f.alternate() {
            return self.visual.as_ref().unwrap().display(
                f,
                self.name.as_deref(),
                self.help.as_deref(),
            );
        }

        Ok(())
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.reason == other.reason
            && self.help == other.help
            && self.name == other.name
    }
}

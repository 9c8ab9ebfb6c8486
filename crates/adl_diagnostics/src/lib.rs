//! adl_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Diagnostics carry a numeric code, a category, the resolved message text
//! and, when known, the file and span they point at. Reporting never fails:
//! diagnostics accumulate in a [`DiagnosticCollection`] and checking carries on.

use adl_core::text::TextSpan;
use std::fmt;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g., 1001, 3003).
    pub code: u32,
    pub category: DiagnosticCategory,
    /// The message template. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The file where this diagnostic occurred, if any.
    pub file: Option<String>,
    /// The source span where this diagnostic occurred, if any.
    pub span: Option<TextSpan>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Create a diagnostic with file and span info.
    pub fn with_location(
        file: String,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file),
            span: Some(span),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(span) = self.span {
                write!(f, "({})", span.start)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} ADL{}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics accumulated during compilation.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Number of diagnostics carrying the given code.
    pub fn count_code(&self, code: u32) -> usize {
        self.diagnostics.iter().filter(|d| d.code == code).count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }

    /// Sort diagnostics by file and position. The sort is stable, so
    /// diagnostics at the same location keep their reporting order.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            let file_cmp = a.file.cmp(&b.file);
            if file_cmp != std::cmp::Ordering::Equal {
                return file_cmp;
            }
            let a_pos = a.span.map(|s| s.start).unwrap_or(0);
            let b_pos = b.span.map(|s| s.start).unwrap_or(0);
            a_pos.cmp(&b_pos)
        });
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Name resolution (1000-1099)
    // ========================================================================
    pub const UNKNOWN_IDENTIFIER_0: DiagnosticMessage = diag!(1001, Error, "Unknown identifier {0}");
    pub const NAMESPACE_DOES_NOT_HAVE_MEMBER_0: DiagnosticMessage = diag!(1002, Error, "Namespace doesn't have member {0}");
    pub const CANNOT_RESOLVE_0_IN_DECORATOR: DiagnosticMessage = diag!(1003, Error, "Cannot resolve '{0}' in decorator");
    pub const CANNOT_RESOLVE_0_IN_NON_NAMESPACE_NODE_1: DiagnosticMessage = diag!(1004, Error, "Cannot resolve '{0}' in non-namespace node {1}");
    pub const CANNOT_USE_DECORATOR_AS_TYPE: DiagnosticMessage = diag!(1005, Error, "Can't put a decorator in a type");
    pub const _0_IS_NOT_A_DECORATOR: DiagnosticMessage = diag!(1006, Error, "{0} is not a decorator");
    pub const USING_CANNOT_REFER_TO_DECORATOR: DiagnosticMessage = diag!(1007, Error, "Can't use a decorator");
    pub const USING_MUST_REFER_TO_NAMESPACE: DiagnosticMessage = diag!(1008, Error, "Using must refer to a namespace");
    pub const DUPLICATE_NAME_0: DiagnosticMessage = diag!(1009, Error, "Duplicate name: \"{0}\"");

    // ========================================================================
    // Templates (2000-2099)
    // ========================================================================
    pub const TOO_FEW_TEMPLATE_ARGUMENTS: DiagnosticMessage = diag!(2001, Error, "Too few template arguments provided.");
    pub const TOO_MANY_TEMPLATE_ARGUMENTS: DiagnosticMessage = diag!(2002, Error, "Too many template arguments provided.");
    pub const TEMPLATE_ARGUMENTS_ON_NON_TEMPLATE: DiagnosticMessage = diag!(2003, Error, "Can't pass template arguments to non-templated type");
    pub const ALIAS_RECURSIVELY_REFERENCES_ITSELF_0: DiagnosticMessage = diag!(2004, Error, "Alias type '{0}' recursively references itself.");

    // ========================================================================
    // Models (3000-3099)
    // ========================================================================
    pub const MODELS_MUST_EXTEND_OTHER_MODELS: DiagnosticMessage = diag!(3001, Error, "Models must extend other models.");
    pub const MODEL_IS_MUST_SPECIFY_A_MODEL: DiagnosticMessage = diag!(3002, Error, "Model `is` must specify another model.");
    pub const MODEL_ALREADY_HAS_PROPERTY_0: DiagnosticMessage = diag!(3003, Error, "Model already has a property named {0}");
    pub const CANNOT_OVERRIDE_INHERITED_PROPERTY_0: DiagnosticMessage = diag!(3004, Error, "Model has an inherited property named {0} which cannot be overridden");
    pub const CANNOT_SPREAD_NON_MODEL: DiagnosticMessage = diag!(3005, Error, "Cannot spread properties of non-model type.");
    pub const CANNOT_INTERSECT_NON_MODEL_TYPES: DiagnosticMessage = diag!(3006, Error, "Cannot intersect non-model types (including union types).");
    pub const INTERSECTION_DUPLICATE_PROPERTY_0: DiagnosticMessage = diag!(3007, Error, "Intersection contains duplicate property definitions for {0}");
    pub const DEFAULT_MUST_BE_A_0: DiagnosticMessage = diag!(3008, Error, "Default must be a {0}");
    pub const MODEL_RECURSIVELY_REFERENCES_ITSELF_AS_BASE_0: DiagnosticMessage = diag!(3009, Error, "Model type '{0}' recursively references itself as a base type.");

    // ========================================================================
    // Enums and interfaces (4000-4099)
    // ========================================================================
    pub const ENUM_ALREADY_HAS_MEMBER_0: DiagnosticMessage = diag!(4001, Error, "Enum already has a member named {0}");
    pub const INTERFACE_MIXIN_MUST_BE_AN_INTERFACE: DiagnosticMessage = diag!(4002, Error, "Interface mixin must be an interface");
    pub const INTERFACE_MIXINS_HAVE_DUPLICATE_MEMBER_0: DiagnosticMessage = diag!(4003, Error, "Interface mixes in a member named {0} that another mixin already provides");
    pub const INTERFACE_ALREADY_HAS_MEMBER_0: DiagnosticMessage = diag!(4004, Error, "Interface already has a member named {0}");

    // ========================================================================
    // Decorators (5000-5099)
    // ========================================================================
    pub const DECORATOR_0_FAILED_1: DiagnosticMessage = diag!(5001, Error, "Decorator @{0} failed: {1}");
    pub const DECORATOR_0_HAS_NO_IMPLEMENTATION: DiagnosticMessage = diag!(5002, Warning, "Decorator @{0} has no registered implementation");
}

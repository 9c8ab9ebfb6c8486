//! adl_compiler: Compiler orchestration.
//!
//! A [`Program`] owns the syntax tree of every source file, the compiler
//! options and the decorator implementations, and runs bind and check over
//! the whole program.

pub mod library;
pub mod logging;

use adl_ast::syntax::Statement;
use adl_ast::{Ast, NodeId, TypeId};
use adl_binder::Binder;
use adl_checker::{
    Checker, CheckerError, Decorator, DecoratorArgument, DecoratorContext, DecoratorError, DecoratorRegistry,
};
use adl_diagnostics::DiagnosticCollection;
use adl_options::{AdlConfig, CompilerOptions};
use tracing::{debug, info_span, warn};

/// Errors that stop a compilation before diagnostics can be produced.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Checker(#[from] CheckerError),
}

/// The outcome of a successful check: the checker, for querying the type
/// graph and decorator state, and the diagnostics it reported.
pub struct CheckResult<'a> {
    pub checker: Checker<'a>,
    pub diagnostics: DiagnosticCollection,
}

/// The program represents the entire compilation unit.
pub struct Program {
    /// Compiler options.
    pub options: CompilerOptions,
    /// The root file names listed by the configuration. The host supplies
    /// their contents through [`Program::add_source_file`]. Checking does
    /// not consult this list.
    pub root_files: Vec<String>,
    ast: Ast,
    registry: DecoratorRegistry,
}

impl Program {
    /// Create an empty program with the standard decorator library installed.
    pub fn new(options: CompilerOptions) -> Self {
        let mut registry = DecoratorRegistry::new();
        library::register_standard_decorators(&mut registry);
        Self {
            options,
            root_files: Vec::new(),
            ast: Ast::new(),
            registry,
        }
    }

    /// Create a program from an adlconfig.json document.
    pub fn from_config(content: &str) -> Result<Self, CompileError> {
        let AdlConfig {
            compiler_options,
            files,
        } = adl_options::parse_config(content)?;
        let mut program = Self::new(compiler_options);
        program.root_files = files;
        Ok(program)
    }

    /// Add a source file to the program. Files are bound and checked in the
    /// order they are added.
    pub fn add_source_file(&mut self, file_name: &str, statements: Vec<Statement>) -> NodeId {
        self.ast.add_file(file_name, statements)
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn registry(&self) -> &DecoratorRegistry {
        &self.registry
    }

    /// Register a decorator implementation under a dotted path such as
    /// `doc` or `My.Lib.tag`. A later registration replaces an earlier one.
    pub fn register_decorator(&mut self, path: &str, decorator: impl Decorator + 'static) {
        self.registry.register(path, decorator);
    }

    pub fn register_fn<F>(&mut self, path: &str, decorator: F)
    where
        F: Fn(&mut DecoratorContext<'_>, TypeId, &[DecoratorArgument]) -> Result<(), DecoratorError> + 'static,
    {
        self.registry.register_fn(path, decorator);
    }

    /// Run the pipeline: bind -> declare decorators -> check.
    ///
    /// Diagnostics come back sorted by file and position and capped at
    /// `maxDiagnostics`. A decorator failure outside a design-time build is
    /// returned as an error.
    pub fn check(&self) -> Result<CheckResult<'_>, CompileError> {
        let _span = info_span!("check", files = self.ast.files().len()).entered();

        let mut binder = Binder::new(&self.ast);
        binder.bind_program();
        for path in self.registry.paths() {
            if binder.declare_decorator(path).is_none() {
                warn!(path, "decorator namespace is not declared in the program");
            }
        }

        let mut checker = Checker::with_options(binder, self.registry.clone(), self.options.design_time_build);
        checker.check_program()?;

        let mut diagnostics = checker.take_diagnostics();
        diagnostics.sort();
        if let Some(max) = self.options.max_diagnostics {
            diagnostics.truncate(max);
        }
        debug!(count = diagnostics.len(), "check complete");
        Ok(CheckResult { checker, diagnostics })
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

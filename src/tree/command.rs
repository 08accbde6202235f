use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use crate::params::{ParamKind, Value};

/// Signature of a user command action.
///
/// The action receives the invoking session's output and the converted
/// arguments, in declaration order.
pub type ActionFn = dyn Fn(&mut dyn Write, &[Value]) -> io::Result<()> + Send + Sync;

/// Commands every session understands regardless of its current menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Help,
    Exit,
    History,
}

/// What runs when a leaf matches.
#[derive(Clone)]
pub enum Action {
    User(Arc<ActionFn>),
    Builtin(Builtin),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(_) => f.write_str("Action::User(..)"),
            Self::Builtin(b) => write!(f, "Action::Builtin({:?})", b),
        }
    }
}

/// Registration input for a leaf command.
///
/// ```
/// use std::io::Write;
/// use menushell::{Command, ParamKind};
///
/// let add = Command::new("add", |out, args| {
///     let sum: i64 = args.iter().filter_map(|a| a.as_i64()).sum();
///     writeln!(out, "{}", sum)
/// })
/// .params([ParamKind::Int, ParamKind::Int])
/// .help("Add two integers");
/// # let _ = add;
/// ```
pub struct Command {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) params: Vec<ParamKind>,
    pub(crate) param_desc: Vec<String>,
    pub(crate) action: Action,
}

impl Command {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut dyn Write, &[Value]) -> io::Result<()> + Send + Sync + 'static,
    {
        Self::with_action(name, Action::User(Arc::new(action)))
    }

    pub(crate) fn builtin(name: &str, builtin: Builtin, help: &str) -> Self {
        Self::with_action(name, Action::Builtin(builtin)).help(help)
    }

    fn with_action(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: name.into(),
            help: String::new(),
            params: Vec::new(),
            param_desc: Vec::new(),
            action,
        }
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = text.into();
        self
    }

    pub fn param(mut self, kind: ParamKind) -> Self {
        self.params.push(kind);
        self
    }

    pub fn params(mut self, kinds: impl IntoIterator<Item = ParamKind>) -> Self {
        self.params.extend(kinds);
        self
    }

    /// Names shown in help instead of the type labels, e.g. `<color>`.
    pub fn describe<S: Into<String>>(mut self, desc: impl IntoIterator<Item = S>) -> Self {
        self.param_desc = desc.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Registration input for a submenu.
#[derive(Debug, Clone)]
pub struct Menu {
    pub(crate) name: String,
    pub(crate) description: String,
}

impl Menu {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "(menu)".to_string(),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }
}

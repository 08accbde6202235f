//! One interactive conversation over the shared command tree.

use std::io::Write;
use std::sync::Arc;

use uuid::Uuid;

use crate::cli::Cli;
use crate::error::Result;
use crate::history::History;
use crate::tree::{Action, Builtin, CommandTree, MenuId, Target};

/// Session-local exit callback.
pub type SessionExitFn = dyn FnMut(&mut dyn Write) + Send;

/// Binds an output sink to a position in the command tree and a private
/// [`History`].
///
/// A session starts at the root menu with its history seeded from the
/// [`Cli`]'s storage. Its commands are flushed back to that storage on
/// [`Session::exit`], or when the session is dropped without exiting.
pub struct Session<W: Write> {
    id: Uuid,
    cli: Arc<Cli>,
    current: MenuId,
    builtins: CommandTree,
    out: W,
    exit_action: Option<Box<SessionExitFn>>,
    history: History,
    exited: bool,
    flushed: bool,
}

impl<W: Write> Session<W> {
    pub fn new(cli: Arc<Cli>, out: W) -> Self {
        let history_size = cli.config().history_size;
        Self::with_history_size(cli, out, history_size)
    }

    pub fn with_history_size(cli: Arc<Cli>, out: W, history_size: usize) -> Self {
        let id = Uuid::new_v4();

        let mut history = History::new(history_size);
        match cli.stored_commands() {
            Ok(commands) => history.load_commands(&commands),
            Err(e) => tracing::warn!(session_id = %id, "Failed to load history: {}", e),
        }

        let builtins = CommandTree::builtins(cli.config().history_command);
        tracing::info!(session_id = %id, "Session started");

        Self {
            id,
            current: cli.root(),
            cli,
            builtins,
            out,
            exit_action: None,
            history,
            exited: false,
            flushed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn current(&self) -> MenuId {
        self.current
    }

    pub fn set_current(&mut self, menu: MenuId) {
        self.current = menu;
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Whether `exit` has run, by command or by call.
    pub fn is_exited(&self) -> bool {
        self.exited
    }

    pub fn set_exit_action<F>(&mut self, action: F)
    where
        F: FnMut(&mut dyn Write) + Send + 'static,
    {
        self.exit_action = Some(Box::new(action));
    }

    /// Process one input line.
    ///
    /// Blank lines are ignored. Any other line is recorded in the history,
    /// then offered to the built-ins and to the current menu. Unmatched lines
    /// are reported on the output.
    pub fn feed(&mut self, line: &str) -> Result<()> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(());
        }

        self.history.new_command(line);

        let target = match self.builtins.scan(self.builtins.root(), &tokens) {
            Some(target) => Some(target),
            None => {
                let tree = self.cli.tree();
                self.current = live_menu(&tree, self.current, self.id);
                tree.scan(self.current, &tokens)
            }
        };

        match target {
            Some(Target::Invoke {
                action: Action::User(action),
                args,
            }) => {
                tracing::debug!(session_id = %self.id, command = tokens[0], "Command matched");
                action(&mut self.out, &args)?;
            }
            Some(Target::Invoke {
                action: Action::Builtin(builtin),
                ..
            }) => self.run_builtin(builtin)?,
            Some(Target::Enter(menu)) => {
                tracing::debug!(session_id = %self.id, menu = tokens[0], "Entered menu");
                self.current = menu;
            }
            None => {
                tracing::debug!(session_id = %self.id, line, "Command unknown");
                writeln!(self.out, "Command unknown: {}", line)?;
            }
        }
        Ok(())
    }

    fn run_builtin(&mut self, builtin: Builtin) -> Result<()> {
        match builtin {
            Builtin::Help => self.help(),
            Builtin::Exit => {
                self.exit();
                Ok(())
            }
            Builtin::History => self.show_history(),
        }
    }

    /// Write `<menu>> `, framed by the configured prompt decorations.
    pub fn prompt(&mut self) -> Result<()> {
        {
            let tree = self.cli.tree();
            self.current = live_menu(&tree, self.current, self.id);
            let name = tree.name(self.current.node()).unwrap_or_default();
            let config = self.cli.config();
            write!(
                self.out,
                "{}{}{}> ",
                config.before_prompt, name, config.after_prompt
            )?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// List the built-ins, then what is reachable from the current menu.
    pub fn help(&mut self) -> Result<()> {
        writeln!(self.out, "Commands available:")?;
        self.builtins
            .write_help(self.builtins.root(), &mut self.out)?;
        let tree = self.cli.tree();
        self.current = live_menu(&tree, self.current, self.id);
        tree.write_help(self.current, &mut self.out)?;
        Ok(())
    }

    pub fn show_history(&mut self) -> Result<()> {
        self.history.show(&mut self.out)?;
        Ok(())
    }

    /// Run the exit callbacks and flush the history to storage.
    pub fn exit(&mut self) {
        if let Some(action) = self.exit_action.as_mut() {
            action(&mut self.out);
        }
        self.cli.run_exit_action(&mut self.out);
        self.flush_history();
        self.exited = true;
        tracing::info!(session_id = %self.id, "Session exited");
    }

    fn flush_history(&mut self) {
        if self.flushed {
            return;
        }
        self.flushed = true;

        let commands = self.history.commands();
        if let Err(e) = self.cli.store_commands(&commands) {
            tracing::warn!(session_id = %self.id, "Failed to store history: {}", e);
        }
    }

    /// Older history entry; `line` is the text currently being edited.
    pub fn previous_cmd(&mut self, line: &str) -> String {
        self.history.previous(line)
    }

    pub fn next_cmd(&mut self) -> String {
        self.history.next()
    }

    /// Completions for a partially typed line: built-ins first, then the
    /// current menu's.
    pub fn completions(&self, line: &str) -> Vec<String> {
        let line = line.trim_start();
        let mut result = self.builtins.completions(self.builtins.root(), line);
        let tree = self.cli.tree();
        result.extend(tree.completions(live_menu(&tree, self.current, self.id), line));
        result
    }
}

/// `menu` if it still exists, else the root. A session whose menu was
/// removed elsewhere carries on from the root.
fn live_menu(tree: &CommandTree, menu: MenuId, session_id: Uuid) -> MenuId {
    if tree.is_menu(menu) {
        return menu;
    }
    tracing::debug!(%session_id, "Current menu removed, back to root");
    tree.root()
}

impl<W: Write> Drop for Session<W> {
    fn drop(&mut self) {
        self.flush_history();
    }
}

impl<W: Write> std::fmt::Debug for Session<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("current", &self.current)
            .field("history", &self.history)
            .field("exited", &self.exited)
            .finish_non_exhaustive()
    }
}

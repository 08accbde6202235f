use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::CliConfig;
use crate::error::Result;
use crate::history::{HistoryStorage, MemoryHistoryStorage};
use crate::tree::{Command, CommandTree, Handle, Menu, MenuId};

/// Process-wide exit callback, run for every session that exits.
pub type ExitFn = dyn Fn(&mut dyn Write) + Send + Sync;

/// State shared by every session: the command tree, the history storage and
/// the global exit callback.
///
/// Wrap it in an [`Arc`] and hand a clone to each [`crate::Session`].
pub struct Cli {
    tree: Arc<RwLock<CommandTree>>,
    root: MenuId,
    config: CliConfig,
    storage: Mutex<Box<dyn HistoryStorage>>,
    exit_action: Option<Box<ExitFn>>,
}

impl Cli {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self::with_config(root_name, CliConfig::default())
    }

    pub fn with_config(root_name: impl Into<String>, config: CliConfig) -> Self {
        let tree = CommandTree::new(root_name);
        let root = tree.root();
        let storage = MemoryHistoryStorage::new(config.storage_size);
        Self {
            tree: Arc::new(RwLock::new(tree)),
            root,
            config,
            storage: Mutex::new(Box::new(storage)),
            exit_action: None,
        }
    }

    /// Replace the default in-memory history storage.
    pub fn storage(mut self, storage: impl HistoryStorage + 'static) -> Self {
        self.storage = Mutex::new(Box::new(storage));
        self
    }

    pub fn exit_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut dyn Write) + Send + Sync + 'static,
    {
        self.exit_action = Some(Box::new(action));
        self
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    pub fn root(&self) -> MenuId {
        self.root
    }

    // ============================================================
    // Registration
    // ============================================================

    /// Register a leaf command under `menu`.
    pub fn insert(&self, menu: MenuId, command: Command) -> Result<Handle> {
        let name = command.name.clone();
        let node = self.write_tree().insert(menu, command)?;
        tracing::debug!(name = %name, ?node, "Command registered");
        Ok(Handle::new(&self.tree, node, menu))
    }

    /// Register a submenu under `parent`.
    pub fn insert_menu(&self, parent: MenuId, menu: Menu) -> Result<(MenuId, Handle)> {
        let name = menu.name.clone();
        let id = self.write_tree().insert_menu(parent, menu)?;
        tracing::debug!(name = %name, node = ?id.node(), "Menu registered");
        Ok((id, Handle::new(&self.tree, id.node(), parent)))
    }

    /// Shared read access to the command tree.
    pub fn tree(&self) -> RwLockReadGuard<'_, CommandTree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tree(&self) -> RwLockWriteGuard<'_, CommandTree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================================
    // Session support
    // ============================================================

    pub(crate) fn run_exit_action(&self, out: &mut dyn Write) {
        if let Some(action) = &self.exit_action {
            action(out);
        }
    }

    /// Persist the commands of a finished session.
    pub fn store_commands(&self, commands: &[String]) -> Result<()> {
        self.storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .store(commands)
    }

    /// Commands persisted so far, oldest first.
    pub fn stored_commands(&self) -> Result<Vec<String>> {
        self.storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .commands()
    }
}

impl std::fmt::Debug for Cli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cli")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

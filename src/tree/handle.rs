use std::sync::{Arc, PoisonError, RwLock, Weak};

use super::{CommandTree, MenuId, NodeId};

/// Revocable capability returned by every registration.
///
/// A handle keeps no node alive. Once the node is removed, by this handle or
/// any other path, every operation on the handle silently does nothing.
#[derive(Debug, Clone, Default)]
pub struct Handle {
    tree: Weak<RwLock<CommandTree>>,
    target: Option<(NodeId, MenuId)>,
}

impl Handle {
    pub(crate) fn new(tree: &Arc<RwLock<CommandTree>>, node: NodeId, container: MenuId) -> Self {
        Self {
            tree: Arc::downgrade(tree),
            target: Some((node, container)),
        }
    }

    pub fn enable(&self) {
        self.set_enabled(true);
    }

    pub fn disable(&self) {
        self.set_enabled(false);
    }

    fn set_enabled(&self, enabled: bool) {
        let Some((node, _)) = self.target else {
            return;
        };
        let Some(tree) = self.tree.upgrade() else {
            return;
        };
        let live = tree
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_enabled(node, enabled);
        tracing::debug!(?node, enabled, live, "Command handle toggled");
    }

    /// Detach the node from the menu it was registered in.
    pub fn remove(&self) {
        let Some((node, container)) = self.target else {
            return;
        };
        let Some(tree) = self.tree.upgrade() else {
            return;
        };
        let removed = tree
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(node, container);
        tracing::debug!(?node, removed, "Command handle removed");
    }

    /// Whether the node this handle refers to still exists.
    pub fn is_live(&self) -> bool {
        let (Some((node, _)), Some(tree)) = (self.target, self.tree.upgrade()) else {
            return false;
        };
        let live = tree
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(node);
        live
    }

    pub fn node(&self) -> Option<NodeId> {
        self.target.map(|(node, _)| node)
    }
}

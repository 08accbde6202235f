//! The command tree.
//!
//! Leaf commands and menus live in a single arena owned by [`CommandTree`].
//! Parent and child links are [`NodeId`]s, an index plus a generation, so a
//! removed node can never be reached again through a stale id: the slot's
//! generation moves on when it is freed.
//!
//! # Dispatch
//!
//! Matching walks the tree and resolves a token list to a [`Target`] without
//! running anything. The caller runs the target afterwards, once it no
//! longer borrows the tree, so actions are free to toggle or remove commands
//! through a [`Handle`].
//!
//! # Visibility
//!
//! A disabled node hides itself and its whole subtree from dispatch,
//! completion and help. The flag is checked at each node during the walk and
//! is never pushed down to the children's own flags.

mod command;
mod handle;

pub use command::{Action, ActionFn, Builtin, Command, Menu};
pub use handle::Handle;

use std::io::{self, Write};

use crate::error::{Error, Result};
use crate::params::{self, ParamKind, Value};

/// Stable identity of a node in a [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// A [`NodeId`] known to have been created as a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuId(NodeId);

impl MenuId {
    pub fn node(&self) -> NodeId {
        self.0
    }
}

impl From<MenuId> for NodeId {
    fn from(id: MenuId) -> Self {
        id.0
    }
}

/// Outcome of a successful dispatch walk.
#[derive(Debug, Clone)]
pub enum Target {
    /// A leaf matched and its arguments converted.
    Invoke { action: Action, args: Vec<Value> },
    /// A menu was named on its own and becomes the session's current menu.
    Enter(MenuId),
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

struct Node {
    name: String,
    enabled: bool,
    parent: Option<MenuId>,
    kind: NodeKind,
}

enum NodeKind {
    Leaf(LeafNode),
    Menu(MenuNode),
}

struct LeafNode {
    help: String,
    params: Vec<ParamKind>,
    param_desc: Vec<String>,
    action: Action,
}

struct MenuNode {
    description: String,
    children: Vec<NodeId>,
}

/// Arena of commands and menus rooted at a single menu.
pub struct CommandTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: MenuId,
}

impl CommandTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = Node {
            name: root_name.into(),
            enabled: true,
            parent: None,
            kind: NodeKind::Menu(MenuNode {
                description: String::new(),
                children: Vec::new(),
            }),
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root),
            }],
            free: Vec::new(),
            root: MenuId(NodeId {
                index: 0,
                generation: 0,
            }),
        }
    }

    /// Tree holding the session built-ins under an unnamed root.
    pub(crate) fn builtins(with_history: bool) -> Self {
        let mut tree = Self::new("");
        let root = tree.root();
        let mut commands = vec![
            Command::builtin("help", Builtin::Help, "This help message"),
            Command::builtin("exit", Builtin::Exit, "Quit the session"),
        ];
        if with_history {
            commands.push(Command::builtin(
                "history",
                Builtin::History,
                "Show the history",
            ));
        }
        for command in commands {
            tree.insert(root, command)
                .expect("built-in names are valid and the root is live");
        }
        tree
    }

    pub fn root(&self) -> MenuId {
        self.root
    }

    // ============================================================
    // Registration and lifecycle
    // ============================================================

    /// Append a leaf command to `menu`.
    pub fn insert(&mut self, menu: MenuId, command: Command) -> Result<NodeId> {
        let node = Node {
            name: command.name,
            enabled: true,
            parent: Some(menu),
            kind: NodeKind::Leaf(LeafNode {
                help: command.help,
                params: command.params,
                param_desc: command.param_desc,
                action: command.action,
            }),
        };
        self.attach(menu, node)
    }

    /// Append a submenu to `parent`.
    pub fn insert_menu(&mut self, parent: MenuId, menu: Menu) -> Result<MenuId> {
        let node = Node {
            name: menu.name,
            enabled: true,
            parent: Some(parent),
            kind: NodeKind::Menu(MenuNode {
                description: menu.description,
                children: Vec::new(),
            }),
        };
        self.attach(parent, node).map(MenuId)
    }

    fn attach(&mut self, parent: MenuId, node: Node) -> Result<NodeId> {
        if node.name.is_empty() || node.name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidName(node.name));
        }
        if !self.is_menu(parent) {
            return Err(Error::UnknownMenu);
        }

        let id = self.alloc(node);
        if let Some(NodeKind::Menu(menu)) = self.get_mut(parent.0).map(|n| &mut n.kind) {
            menu.children.push(id);
        }
        Ok(id)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Flip a node's flag. Returns `false` if the node no longer exists.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Detach `id` from `container` and release it with its whole subtree.
    ///
    /// Nothing happens unless both are live and `id` is one of the
    /// container's children. Returns whether the node was removed.
    pub fn remove(&mut self, id: NodeId, container: MenuId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let Some(NodeKind::Menu(menu)) = self.get_mut(container.0).map(|n| &mut n.kind) else {
            return false;
        };
        let Some(pos) = menu.children.iter().position(|&child| child == id) else {
            return false;
        };
        menu.children.remove(pos);
        self.release(id);
        true
    }

    fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return;
        };
        if slot.generation != id.generation {
            return;
        }
        let Some(node) = slot.node.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        if let NodeKind::Menu(menu) = node.kind {
            for child in menu.children {
                self.release(child);
            }
        }
    }

    // ============================================================
    // Queries
    // ============================================================

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_menu(&self, id: MenuId) -> bool {
        matches!(self.get(id.0).map(|n| &n.kind), Some(NodeKind::Menu(_)))
    }

    pub fn is_enabled(&self, id: NodeId) -> Option<bool> {
        self.get(id).map(|n| n.enabled)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<MenuId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a menu in insertion order; empty for anything else.
    pub fn children(&self, menu: MenuId) -> &[NodeId] {
        match self.get(menu.0).map(|n| &n.kind) {
            Some(NodeKind::Menu(m)) => &m.children,
            _ => &[],
        }
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ============================================================
    // Dispatch
    // ============================================================

    /// Offer `tokens` to the children of `from`, then to its parent.
    ///
    /// The parent is tried with its full menu semantics, so from a submenu
    /// the line `"<parent> <sibling> ..."` still resolves.
    pub fn scan(&self, from: MenuId, tokens: &[&str]) -> Option<Target> {
        let node = self.get(from.0).filter(|n| n.enabled)?;
        let NodeKind::Menu(menu) = &node.kind else {
            return None;
        };

        menu.children
            .iter()
            .find_map(|&child| self.exec(child, tokens))
            .or_else(|| node.parent.and_then(|parent| self.exec(parent.0, tokens)))
    }

    /// Match `tokens` against a single node and, for menus, its subtree.
    pub fn exec(&self, id: NodeId, tokens: &[&str]) -> Option<Target> {
        let node = self.get(id).filter(|n| n.enabled)?;
        let (first, rest) = tokens.split_first()?;
        if *first != node.name {
            return None;
        }

        match &node.kind {
            NodeKind::Leaf(leaf) => {
                let args = params::parse_args(&leaf.params, rest).ok()?;
                Some(Target::Invoke {
                    action: leaf.action.clone(),
                    args,
                })
            }
            NodeKind::Menu(_) if rest.is_empty() => Some(Target::Enter(MenuId(id))),
            NodeKind::Menu(menu) => menu
                .children
                .iter()
                .find_map(|&child| self.exec(child, rest)),
        }
    }

    // ============================================================
    // Completion
    // ============================================================

    /// Completions of every child of `from`, then of its parent.
    pub fn completions(&self, from: MenuId, line: &str) -> Vec<String> {
        let Some(node) = self.get(from.0).filter(|n| n.enabled) else {
            return Vec::new();
        };
        let NodeKind::Menu(menu) = &node.kind else {
            return Vec::new();
        };

        let mut result: Vec<String> = menu
            .children
            .iter()
            .flat_map(|&child| self.complete_recursive(child, line))
            .collect();
        if let Some(parent) = node.parent {
            result.extend(self.complete_recursive(parent.0, line));
        }
        result
    }

    /// Completions offered by a node for a partial line.
    pub fn complete_recursive(&self, id: NodeId, line: &str) -> Vec<String> {
        let Some(node) = self.get(id).filter(|n| n.enabled) else {
            return Vec::new();
        };

        if let NodeKind::Menu(menu) = &node.kind {
            if let Some(rest) = line.strip_prefix(node.name.as_str()) {
                let rest = rest.trim_start();
                return menu
                    .children
                    .iter()
                    .flat_map(|&child| self.complete_recursive(child, rest))
                    .map(|completion| format!("{} {}", node.name, completion))
                    .collect();
            }
        }

        if node.name.starts_with(line) {
            vec![node.name.clone()]
        } else {
            Vec::new()
        }
    }

    // ============================================================
    // Help
    // ============================================================

    /// Describe the visible children of `from`, then its parent menu.
    pub fn write_help(&self, from: MenuId, out: &mut dyn Write) -> io::Result<()> {
        let Some(node) = self.get(from.0).filter(|n| n.enabled) else {
            return Ok(());
        };
        let NodeKind::Menu(menu) = &node.kind else {
            return Ok(());
        };

        for &child in &menu.children {
            self.write_entry(child, out)?;
        }
        if let Some(parent) = node.parent {
            self.write_entry(parent.0, out)?;
        }
        Ok(())
    }

    fn write_entry(&self, id: NodeId, out: &mut dyn Write) -> io::Result<()> {
        let Some(node) = self.get(id).filter(|n| n.enabled) else {
            return Ok(());
        };

        write!(out, " - {}", node.name)?;
        let description = match &node.kind {
            NodeKind::Leaf(leaf) => {
                if leaf.param_desc.is_empty() {
                    for kind in &leaf.params {
                        write!(out, " {}", kind.label())?;
                    }
                }
                for desc in &leaf.param_desc {
                    write!(out, " <{}>", desc)?;
                }
                &leaf.help
            }
            NodeKind::Menu(menu) => &menu.description,
        };
        write!(out, "\n\t{}\n", description)
    }
}

impl std::fmt::Debug for CommandTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTree")
            .field("root", &self.root)
            .field("live", &self.len())
            .finish()
    }
}

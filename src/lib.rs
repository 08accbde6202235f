//! Embeddable interactive command engine.
//!
//! # Core Concepts
//!
//! - [`Cli`]: the shared command tree, history storage and global exit
//!   callback. One per process, shared by every session.
//! - [`Command`] / [`Menu`]: registration inputs. Menus nest, and entering a
//!   menu's name moves the session into it.
//! - [`Handle`]: returned by every registration, enables, disables or removes
//!   the command later without keeping it alive.
//! - [`Session`]: one conversation. Turns raw lines into command invocations,
//!   tracks the current menu and owns a private [`History`].
//!
//! ```
//! use std::io::Write;
//! use std::sync::Arc;
//! use menushell::{Cli, Command, Menu, ParamKind, Session};
//!
//! let cli = Cli::new("demo");
//! let (sub, _) = cli.insert_menu(cli.root(), Menu::new("sub")).unwrap();
//! cli.insert(
//!     sub,
//!     Command::new("square", |out, args| {
//!         let n = args[0].as_i64().unwrap_or_default();
//!         writeln!(out, "{}", n * n)
//!     })
//!     .param(ParamKind::Int),
//! )
//! .unwrap();
//!
//! let mut session = Session::new(Arc::new(cli), Vec::new());
//! session.feed("sub square 7").unwrap();
//! assert_eq!(session.output().as_slice(), b"49\n");
//! ```

mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod params;
pub mod server;
mod session;
pub mod tree;

pub use cli::{Cli, ExitFn};
pub use config::CliConfig;
pub use error::{Error, Result};
pub use history::{FileHistoryStorage, History, HistoryStorage, MemoryHistoryStorage};
pub use params::{ParamKind, Value};
pub use session::{Session, SessionExitFn};
pub use tree::{Command, CommandTree, Handle, Menu, MenuId, NodeId};

use std::fs;
use std::sync::Arc;

use menushell::{Cli, FileHistoryStorage, HistoryStorage, MemoryHistoryStorage, Session};
use speculate2::speculate;
use tempfile::TempDir;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

speculate! {
    describe "file storage" {
        before {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("state").join("history");
            let mut storage = FileHistoryStorage::new(&path);
        }

        it "creates the file and its directory on first store" {
            storage.store(&strings(&["one", "two"])).unwrap();
            assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
        }

        it "appends across stores and reloads everything" {
            storage.store(&strings(&["one"])).unwrap();
            storage.store(&strings(&["two", "three"])).unwrap();

            let reopened = FileHistoryStorage::new(&path);
            assert_eq!(reopened.commands().unwrap(), vec!["one", "two", "three"]);
        }

        it "treats a missing file as empty history" {
            assert!(storage.commands().unwrap().is_empty());
        }

        it "carries history between sessions of different engines" {
            let cli = Arc::new(Cli::new("app").storage(FileHistoryStorage::new(&path)));
            let mut session = Session::new(cli, Vec::new());
            session.feed("first").unwrap();
            session.feed("second").unwrap();
            session.exit();
            drop(session);

            let cli = Arc::new(Cli::new("app").storage(FileHistoryStorage::new(&path)));
            let mut session = Session::new(cli, Vec::new());
            assert_eq!(session.previous_cmd(""), "second");
            assert_eq!(session.previous_cmd("second"), "first");
            assert_eq!(storage.commands().unwrap(), vec!["first", "second"]);
        }
    }

    describe "memory storage" {
        it "keeps the newest commands up to its bound" {
            let mut storage = MemoryHistoryStorage::new(3);
            storage.store(&strings(&["a", "b"])).unwrap();
            storage.store(&strings(&["c", "d"])).unwrap();
            assert_eq!(storage.commands().unwrap(), vec!["b", "c", "d"]);
        }

        it "starts empty" {
            let storage = MemoryHistoryStorage::default();
            assert!(storage.commands().unwrap().is_empty());
        }
    }
}

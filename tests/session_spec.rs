use std::sync::{Arc, Mutex};

use menushell::{
    Cli, CliConfig, Command, HistoryStorage, Menu, MemoryHistoryStorage, ParamKind, Session,
};
use speculate2::speculate;

type Log = Arc<Mutex<Vec<String>>>;

/// Storage that records every `store` call, for checking flush behaviour.
struct RecordingStorage {
    seed: Vec<String>,
    stored: Log,
}

impl HistoryStorage for RecordingStorage {
    fn store(&mut self, commands: &[String]) -> menushell::Result<()> {
        self.stored.lock().unwrap().push(commands.join("|"));
        Ok(())
    }

    fn commands(&self) -> menushell::Result<Vec<String>> {
        Ok(self.seed.clone())
    }
}

fn take(session: &mut Session<Vec<u8>>) -> String {
    String::from_utf8(std::mem::take(session.output_mut())).unwrap()
}

fn calculator(config: CliConfig) -> Cli {
    let cli = Cli::with_config("calc", config);
    let root = cli.root();
    cli.insert(
        root,
        Command::new("add", |out, args| {
            let sum: i64 = args.iter().filter_map(|a| a.as_i64()).sum();
            writeln!(out, "{}", sum)
        })
        .params([ParamKind::Int, ParamKind::Int])
        .help("Add two integers"),
    )
    .unwrap();
    let (sub, _) = cli
        .insert_menu(root, Menu::new("text").description("String tools"))
        .unwrap();
    cli.insert(
        sub,
        Command::new("upper", |out, args| {
            writeln!(out, "{}", args[0].as_str().unwrap_or_default().to_uppercase())
        })
        .param(ParamKind::Str)
        .describe(["word"])
        .help("Upper-case a word"),
    )
    .unwrap();
    cli
}

speculate! {
    describe "feed" {
        before {
            let cli = Arc::new(calculator(CliConfig::default()));
            let mut session = Session::new(Arc::clone(&cli), Vec::new());
        }

        it "runs the matching action with converted arguments" {
            session.feed("add 2 40").unwrap();
            assert_eq!(take(&mut session), "42\n");
        }

        it "reports an unmatched line verbatim" {
            session.feed("frobnicate now").unwrap();
            assert_eq!(take(&mut session), "Command unknown: frobnicate now\n");
        }

        it "reports a line whose arguments do not convert" {
            session.feed("add two 40").unwrap();
            session.feed("add 1").unwrap();
            assert_eq!(
                take(&mut session),
                "Command unknown: add two 40\nCommand unknown: add 1\n"
            );
        }

        it "records matched and unmatched lines alike" {
            session.feed("add 1 2").unwrap();
            session.feed("nope").unwrap();
            assert_eq!(session.history().commands(), vec!["add 1 2", "nope"]);
        }

        it "ignores blank lines entirely" {
            session.feed("").unwrap();
            session.feed("   \t ").unwrap();
            assert_eq!(take(&mut session), "");
            assert!(session.history().is_empty());
        }
    }

    describe "built-ins" {
        before {
            let cli = Arc::new(calculator(CliConfig::default()));
            let mut session = Session::new(Arc::clone(&cli), Vec::new());
        }

        it "lists built-ins, then the current menu" {
            session.feed("help").unwrap();
            assert_eq!(
                take(&mut session),
                "Commands available:\n\
                 \x20- help\n\tThis help message\n\
                 \x20- exit\n\tQuit the session\n\
                 \x20- history\n\tShow the history\n\
                 \x20- add <int> <int>\n\tAdd two integers\n\
                 \x20- text\n\tString tools\n"
            );
        }

        it "includes the parent menu inside a submenu" {
            session.feed("text").unwrap();
            take(&mut session);
            session.help().unwrap();
            let help = take(&mut session);
            assert!(help.contains(" - upper <word>\n\tUpper-case a word\n"));
            assert!(help.ends_with(" - calc\n\t\n"));
        }

        it "answers built-ins from any menu" {
            session.feed("text").unwrap();
            session.feed("history").unwrap();
            assert_eq!(take(&mut session), "\ntext\nhistory\n\n");
        }

        it "marks the session exited on exit" {
            assert!(!session.is_exited());
            session.feed("exit").unwrap();
            assert!(session.is_exited());
        }

        it "omits the history command when configured off" {
            let config = CliConfig {
                history_command: false,
                ..CliConfig::default()
            };
            let mut session = Session::new(Arc::new(calculator(config)), Vec::new());
            session.feed("history").unwrap();
            assert_eq!(take(&mut session), "Command unknown: history\n");
            session.help().unwrap();
            assert!(!take(&mut session).contains(" - history"));
        }
    }

    describe "prompt" {
        it "shows the current menu name" {
            let mut session = Session::new(Arc::new(calculator(CliConfig::default())), Vec::new());
            session.prompt().unwrap();
            session.feed("text").unwrap();
            session.prompt().unwrap();
            assert_eq!(take(&mut session), "calc> text> ");
        }

        it "wraps the name in the configured decorations" {
            let config = CliConfig {
                before_prompt: "[".to_string(),
                after_prompt: "]".to_string(),
                ..CliConfig::default()
            };
            let mut session = Session::new(Arc::new(calculator(config)), Vec::new());
            session.prompt().unwrap();
            assert_eq!(take(&mut session), "[calc]> ");
        }
    }

    describe "exit" {
        before {
            let stored: Log = Arc::default();
            let storage = RecordingStorage {
                seed: vec!["old1".to_string(), "old2".to_string()],
                stored: Arc::clone(&stored),
            };
            let cli = Arc::new(
                calculator(CliConfig::default())
                    .storage(storage)
                    .exit_action(|out| {
                        let _ = writeln!(out, "global bye");
                    }),
            );
        }

        it "runs the session callback before the global one" {
            let mut session = Session::new(Arc::clone(&cli), Vec::new());
            session.set_exit_action(|out| {
                let _ = writeln!(out, "session bye");
            });
            session.feed("exit").unwrap();
            assert_eq!(take(&mut session), "session bye\nglobal bye\n");
        }

        it "flushes only the commands of this session, once" {
            let mut session = Session::new(Arc::clone(&cli), Vec::new());
            session.feed("add 1 1").unwrap();
            session.feed("exit").unwrap();
            session.exit();
            drop(session);

            assert_eq!(*stored.lock().unwrap(), vec!["add 1 1|exit"]);
        }

        it "flushes on drop when never exited" {
            let mut session = Session::new(Arc::clone(&cli), Vec::new());
            session.feed("add 2 2").unwrap();
            drop(session);

            assert_eq!(*stored.lock().unwrap(), vec!["add 2 2"]);
        }

        it "seeds the history from storage" {
            let mut session = Session::new(Arc::clone(&cli), Vec::new());
            assert_eq!(session.previous_cmd(""), "old2");
            assert_eq!(session.previous_cmd("old2"), "old1");
            assert_eq!(session.next_cmd(), "old2");
            assert!(session.history().commands().is_empty());
        }
    }

    describe "history across sessions" {
        it "hands commands from one session to the next through memory storage" {
            let cli = Arc::new(calculator(CliConfig::default()).storage(MemoryHistoryStorage::new(10)));

            let mut first = Session::new(Arc::clone(&cli), Vec::new());
            first.feed("add 1 2").unwrap();
            first.feed("text").unwrap();
            first.exit();

            let mut second = Session::new(Arc::clone(&cli), Vec::new());
            assert_eq!(second.previous_cmd(""), "text");
            assert_eq!(second.previous_cmd("text"), "add 1 2");
            assert_eq!(second.current(), cli.root());
        }

        it "keeps history and position private to each session" {
            let cli = Arc::new(calculator(CliConfig::default()));
            let mut a = Session::new(Arc::clone(&cli), Vec::new());
            let b = Session::new(Arc::clone(&cli), Vec::new());

            a.feed("text").unwrap();
            assert_ne!(a.current(), b.current());
            assert!(b.history().is_empty());
            assert_ne!(a.id(), b.id());
        }

        it "bounds the session history by the configured size" {
            let config = CliConfig {
                history_size: 2,
                ..CliConfig::default()
            };
            let mut session = Session::new(Arc::new(calculator(config)), Vec::new());
            session.feed("add 1 1").unwrap();
            session.feed("add 2 2").unwrap();
            session.feed("add 3 3").unwrap();
            assert_eq!(session.history().commands(), vec!["add 2 2", "add 3 3"]);
        }
    }

    describe "completions" {
        before {
            let cli = Arc::new(calculator(CliConfig::default()));
            let mut session = Session::new(Arc::clone(&cli), Vec::new());
        }

        it "offers built-ins before menu commands" {
            assert_eq!(session.completions("h"), vec!["help", "history"]);
            assert_eq!(session.completions("  a"), vec!["add"]);
            assert_eq!(session.completions("text u"), vec!["text upper"]);
        }

        it "completes relative to the current menu" {
            session.feed("text").unwrap();
            assert_eq!(session.completions("u"), vec!["upper"]);
            assert_eq!(session.completions("calc a"), vec!["calc add"]);
        }

        it "returns nothing for an unknown prefix" {
            assert!(session.completions("zzz").is_empty());
        }
    }
}

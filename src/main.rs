use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use menushell::{server, Cli, CliConfig, Command, FileHistoryStorage, Menu, ParamKind, Value};

#[derive(Parser)]
#[command(name = "mshell")]
#[command(about = "Interactive menu shell over a console or TCP")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Keep history in a file (the platform data directory if no path is given)
    #[arg(long, global = true, num_args = 0..=1, value_name = "PATH")]
    file_history: Option<Option<PathBuf>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single session on this terminal
    Console,
    /// Accept TCP connections, one session each
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,
    },
}

/// Initialize tracing with output to stderr (console mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "menushell=info,mshell=info".into()),
    );

    if use_stderr {
        // Console mode: stdout belongs to the session
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// The sample command tree shared by every session.
fn build_cli(config: CliConfig, file_history: Option<Option<PathBuf>>) -> anyhow::Result<Cli> {
    let mut cli = Cli::with_config("mshell", config).exit_action(|out| {
        let _ = writeln!(out, "Goodbye.");
    });
    if let Some(path) = file_history {
        let storage = match path {
            Some(path) => FileHistoryStorage::new(path),
            None => FileHistoryStorage::open_default()?,
        };
        tracing::info!("History file: {}", storage.path().display());
        cli = cli.storage(storage);
    }

    let root = cli.root();
    cli.insert(
        root,
        Command::new("hello", |out, _| writeln!(out, "Hello, world")).help("Print hello world"),
    )?;
    cli.insert(
        root,
        Command::new("answer", |out, args| writeln!(out, "The answer is: {}", args[0]))
            .param(ParamKind::Int)
            .help("Print the number you typed"),
    )?;
    cli.insert(
        root,
        Command::new("sum", |out, args| {
            let total: f64 = args.iter().filter_map(Value::as_f64).sum();
            writeln!(out, "{}", total)
        })
        .params([ParamKind::Double, ParamKind::Double])
        .describe(["lhs", "rhs"])
        .help("Add two numbers"),
    )?;
    let reverse = cli.insert(
        root,
        Command::new("reverse", |out, args| {
            let text = args[0].as_str().unwrap_or_default();
            writeln!(out, "{}", text.chars().rev().collect::<String>())
        })
        .param(ParamKind::Str)
        .help("Print a word backwards"),
    )?;
    cli.insert(
        root,
        Command::new("forget", move |out, _| {
            reverse.remove();
            writeln!(out, "'reverse' removed")
        })
        .help("Remove the reverse command for good"),
    )?;

    let (sub, sub_handle) = cli.insert_menu(root, Menu::new("sub").description("Sub menu"))?;
    cli.insert(
        sub,
        Command::new("hello", |out, _| writeln!(out, "Hello, submenu world"))
            .help("Print hello world in the submenu"),
    )?;
    cli.insert(
        sub,
        Command::new("demo", |out, _| writeln!(out, "This is a sample!"))
            .help("Print a demo string"),
    )?;
    let (subsub, _) = cli.insert_menu(sub, Menu::new("subsub").description("Nested menu"))?;
    cli.insert(
        subsub,
        Command::new("hello", |out, _| writeln!(out, "Hello, subsubmenu world"))
            .help("Print hello world in the nested menu"),
    )?;

    let lock = sub_handle.clone();
    cli.insert(
        root,
        Command::new("lock", move |out, _| {
            lock.disable();
            writeln!(out, "'sub' hidden")
        })
        .help("Hide the sub menu"),
    )?;
    cli.insert(
        root,
        Command::new("unlock", move |out, _| {
            sub_handle.enable();
            writeln!(out, "'sub' visible")
        })
        .help("Show the sub menu again"),
    )?;

    Ok(cli)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let serving = matches!(args.command, Some(Commands::Serve { .. }));
    init_tracing(!serving);

    let config = CliConfig::load().from_env();
    let cli = Arc::new(build_cli(config, args.file_history)?);

    match args.command {
        Some(Commands::Serve { port }) => {
            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("mshell listening on 127.0.0.1:{}", port);
            server::serve(cli, listener).await?;
        }
        Some(Commands::Console) | None => {
            tokio::task::spawn_blocking(move || server::run_console(cli)).await??;
        }
    }

    Ok(())
}

//! Line transports: the local console and a plain TCP listener.
//!
//! Neither does any line editing; they read whole lines, feed them to a
//! [`Session`] and print what the session wrote.

use std::io::{self, BufRead};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::cli::Cli;
use crate::error::Result;
use crate::session::Session;

/// Run one session over stdin/stdout until `exit` or end of input.
pub fn run_console(cli: Arc<Cli>) -> Result<()> {
    let mut session = Session::new(cli, io::stdout());
    let stdin = io::stdin();

    session.prompt()?;
    for line in stdin.lock().lines() {
        session.feed(&line?)?;
        if session.is_exited() {
            break;
        }
        session.prompt()?;
    }
    Ok(())
}

/// Accept connections forever, one session per connection.
pub async fn serve(cli: Arc<Cli>, listener: TcpListener) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::info!(%peer, "Connection accepted");

        let cli = Arc::clone(&cli);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(cli, stream).await {
                tracing::warn!(%peer, "Connection closed with error: {}", e);
            }
        });
    }
}

/// Drive a single session over a TCP stream.
pub async fn handle_connection(cli: Arc<Cli>, stream: TcpStream) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    let mut session = Session::new(cli, Vec::new());

    session.prompt()?;
    send(&mut session, &mut writer).await?;

    while let Some(line) = lines.next_line().await? {
        session.feed(&line)?;
        if session.is_exited() {
            send(&mut session, &mut writer).await?;
            break;
        }
        session.prompt()?;
        send(&mut session, &mut writer).await?;
    }

    writer.shutdown().await?;
    Ok(())
}

async fn send<A>(session: &mut Session<Vec<u8>>, writer: &mut A) -> Result<()>
where
    A: AsyncWrite + Unpin,
{
    let buf = std::mem::take(session.output_mut());
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

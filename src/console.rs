use crate::dispatcher::Dispatcher;
use crate::domain::commands::{Command, Outcome};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Reply {
    Ok(Outcome),
    Error(String),
}

/// Reads one JSON command per line and answers each with one JSON line. Returns once the input ends.
#[instrument(skip_all)]
pub async fn run_console<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Command>(line) {
            Ok(command) => match dispatcher.dispatch(command).await {
                Ok(outcome) => Reply::Ok(outcome),
                Err(e) => {
                    warn!("⚠️ Command failed: {}", e);
                    Reply::Error(e.to_string())
                }
            },
            Err(e) => {
                warn!("⚠️ Unreadable command: {}", e);
                Reply::Error(format!("invalid command: {}", e))
            }
        };

        let mut encoded = serde_json::to_vec(&reply)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }

    debug!("Console input closed");
    Ok(())
}

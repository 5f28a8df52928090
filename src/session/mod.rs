//! One scripted session with the MUSH.
//!
//! The MUSH speaks unframed lines of text, so there is no way to tell when a
//! reply is complete. Instead a background task drains the socket into a
//! [`Transcript`] for the whole session while the driver fires commands at a
//! fixed pace:
//!
//! ```text
//! connect <login> <password>      then wait settle_delay
//! <on_connect>
//! <finger_command> <name>         then wait query_pacing, for each name
//! ---- stop the drain, take the transcript ----
//! <on_disconnect>
//! QUIT
//! ```
//!
//! The closing lines are sent however the session ends. If the script did
//! not finish, an empty line precedes them.

mod drain;

use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::{ServerConfig, Timing};
use crate::models::Transcript;

pub const QUIT_COMMAND: &str = "QUIT";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to send {step} command: {source}")]
    Send {
        step: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to read from server: {0}")]
    Read(#[source] io::Error),

    #[error("server closed the connection")]
    ConnectionClosed,

    #[error("drain task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// How the command script and the drain task raced.
enum Outcome {
    Scripted(Result<(), SessionError>),
    DrainEnded(Result<Transcript, SessionError>),
}

pub struct SessionDriver<'a> {
    server: &'a ServerConfig,
    timing: Timing,
}

impl<'a> SessionDriver<'a> {
    pub fn new(server: &'a ServerConfig, timing: Timing) -> Self {
        Self { server, timing }
    }

    /// Open the TCP connection to the configured endpoint.
    pub async fn connect(&self) -> Result<TcpStream, SessionError> {
        let address = self.server.address();
        tracing::info!(%address, "Connecting to MUSH");
        TcpStream::connect(&address)
            .await
            .map_err(|source| SessionError::Connect { address, source })
    }

    /// Connect, finger every name, and return what the server said.
    pub async fn run_session(&self, names: &[String]) -> Result<Transcript, SessionError> {
        let stream = self.connect().await?;
        self.run(stream, names).await
    }

    /// Drive the session over an already-open stream.
    pub async fn run<S>(&self, stream: S, names: &[String]) -> Result<Transcript, SessionError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, mut writer) = tokio::io::split(stream);
        let stop = CancellationToken::new();
        let mut drainer = tokio::spawn(drain::drain(reader, self.timing.read_poll, stop.clone()));

        let outcome = tokio::select! {
            sent = self.send_script(&mut writer, names) => Outcome::Scripted(sent),
            ended = &mut drainer => Outcome::DrainEnded(ended.map_err(SessionError::from).and_then(|r| r)),
        };

        let interrupted = !matches!(outcome, Outcome::Scripted(Ok(())));
        let result = match outcome {
            Outcome::Scripted(sent) => {
                stop.cancel();
                let drained = drainer.await.map_err(SessionError::from).and_then(|r| r);
                sent.and(drained)
            }
            // The drain only finishes on its own when something went wrong.
            Outcome::DrainEnded(ended) => match ended {
                Ok(_) => Err(SessionError::ConnectionClosed),
                Err(e) => Err(e),
            },
        };

        self.close(&mut writer, interrupted).await;

        if let Ok(transcript) = &result {
            tracing::info!(bytes = transcript.len(), "Session finished");
        }
        result
    }

    async fn send_script<W>(&self, writer: &mut W, names: &[String]) -> Result<(), SessionError>
    where
        W: AsyncWrite + Unpin,
    {
        send_line(writer, "login", &self.login_command()).await?;
        tracing::debug!(delay = ?self.timing.settle_delay, "Waiting for login to settle");
        sleep(self.timing.settle_delay).await;

        send_line(writer, "on_connect", &self.server.on_connect).await?;

        tracing::info!(names = names.len(), "Fingering roster");
        for name in names {
            let command = format!("{} {}", self.server.finger_command, name);
            send_line(writer, "finger", &command).await?;
            sleep(self.timing.query_pacing).await;
        }
        Ok(())
    }

    /// Log out politely. Failures here are logged, never returned.
    ///
    /// When the script was cut short a command may be half written, so an
    /// empty line goes out first to terminate it.
    async fn close<W>(&self, writer: &mut W, interrupted: bool)
    where
        W: AsyncWrite + Unpin,
    {
        let reset = interrupted.then_some(("line reset", ""));
        let lines = reset.into_iter().chain([
            ("on_disconnect", self.server.on_disconnect.as_str()),
            ("quit", QUIT_COMMAND),
        ]);
        for (step, line) in lines {
            if let Err(e) = send_line(writer, step, line).await {
                tracing::warn!(error = %e, "Failed to send closing command");
            }
        }
        if let Err(e) = writer.shutdown().await {
            tracing::warn!(error = %e, "Failed to shut down session stream");
        }
    }

    fn login_command(&self) -> String {
        format!("connect {} {}", self.server.login, self.server.password)
    }
}

async fn send_line<W>(writer: &mut W, step: &'static str, line: &str) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
{
    let framed = format!("{line}\r\n");
    writer
        .write_all(framed.as_bytes())
        .await
        .map_err(|source| SessionError::Send { step, source })?;
    writer
        .flush()
        .await
        .map_err(|source| SessionError::Send { step, source })
}

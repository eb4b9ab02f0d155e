//! Server-side session state machine.
//!
//! One session per connected client, driven over any buffered reader/writer
//! pair so tests can run it on an in-memory duplex instead of a socket. The
//! lifecycle is an explicit state walk:
//!
//! ```text
//!    AwaitingUsername -> AwaitingKey -> Registered -> Terminated
//! ```
//!
//! Registration is a drop guard, so the username is released on every exit
//! path — confirmed quit, end of stream, or I/O failure.

use std::sync::Arc;

use sealbox_core::protocol::{
    self, Command, CommandError, ControlToken, HELP_SUMMARY, LOGIN_PROMPT, QUIT_AFFIRMATIVE,
    QUIT_CONFIRM_PROMPT, REPLY_COMMAND_NOT_FOUND, REPLY_DELIVERY_FAILED, REPLY_HELP_UNSUPPORTED,
    REPLY_NO_NEW_MESSAGES, REPLY_SYNTAX_ERROR, REPLY_USERNAME_NOT_FOUND, RESERVED_USERNAME,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::Result;
use crate::registry::MailboxRegistry;

// ----------------------------------------------------------------------------
// Registration Guard
// ----------------------------------------------------------------------------

/// A live identity in the registry. Dropping it unregisters the username,
/// whatever path the session leaves by.
struct Registration {
    registry: Arc<MailboxRegistry>,
    username: String,
}

impl Registration {
    fn new(registry: Arc<MailboxRegistry>, username: String, public_key: &str) -> Self {
        registry.register_user(&username, public_key);
        info!(username = %username, "user connected");
        Self { registry, username }
    }

    fn username(&self) -> &str {
        &self.username
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister_user(&self.username);
        info!(username = %self.username, "user disconnected");
    }
}

// ----------------------------------------------------------------------------
// Session States
// ----------------------------------------------------------------------------

enum SessionState {
    AwaitingUsername,
    AwaitingKey { username: String },
    Registered { registration: Registration },
    Terminated,
}

// ----------------------------------------------------------------------------
// Session
// ----------------------------------------------------------------------------

/// Server-side state and control flow for one connected client, from login
/// through disconnect.
pub struct Session<R, W> {
    reader: R,
    writer: W,
    registry: Arc<MailboxRegistry>,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W, registry: Arc<MailboxRegistry>) -> Self {
        Self {
            reader,
            writer,
            registry,
        }
    }

    /// Drive the session to completion. Returns `Ok` on a clean quit or end
    /// of stream; I/O errors propagate after the registration guard has
    /// released the username.
    pub async fn run(mut self) -> Result<()> {
        let mut state = SessionState::AwaitingUsername;
        loop {
            state = match state {
                SessionState::AwaitingUsername => self.await_username().await?,
                SessionState::AwaitingKey { username } => self.await_key(username).await?,
                SessionState::Registered { registration } => {
                    self.command_loop(registration).await?
                }
                SessionState::Terminated => return Ok(()),
            };
        }
    }

    /// Re-prompt until the client offers a free, valid username. The
    /// check-then-register window across concurrently connecting clients is
    /// deliberately left open.
    async fn await_username(&mut self) -> Result<SessionState> {
        loop {
            self.send_line(LOGIN_PROMPT).await?;
            self.send_line(ControlToken::Input.as_line()).await?;
            let Some(candidate) = self.recv_line().await? else {
                return Ok(SessionState::Terminated);
            };
            if candidate.is_empty()
                || candidate.contains(' ')
                || candidate == RESERVED_USERNAME
                || self.registry.is_registered(&candidate)
            {
                debug!(candidate = %candidate, "username rejected, re-prompting");
                continue;
            }
            return Ok(SessionState::AwaitingKey {
                username: candidate,
            });
        }
    }

    async fn await_key(&mut self, username: String) -> Result<SessionState> {
        self.send_line(ControlToken::SendKey.as_line()).await?;
        let Some(public_key) = self.recv_line().await? else {
            return Ok(SessionState::Terminated);
        };
        let registration = Registration::new(Arc::clone(&self.registry), username, &public_key);
        Ok(SessionState::Registered { registration })
    }

    async fn command_loop(&mut self, registration: Registration) -> Result<SessionState> {
        self.send_line(&format!("<Server> welcome, {}", registration.username()))
            .await?;
        self.send_line("type help for a list of commands").await?;
        self.send_line(ControlToken::InputCommand.as_line()).await?;

        while let Some(line) = self.recv_line().await? {
            let verb = line.split_whitespace().next().unwrap_or_default();
            info!(username = registration.username(), command = verb);

            if self.dispatch(&line, registration.username()).await? {
                return Ok(SessionState::Terminated);
            }
            self.send_line(ControlToken::InputCommand.as_line()).await?;
        }
        Ok(SessionState::Terminated)
    }

    /// Handle one command line. Returns `true` when a confirmed quit ends
    /// the session.
    async fn dispatch(&mut self, line: &str, username: &str) -> Result<bool> {
        match Command::parse(line) {
            Ok(Command::List) => {
                let names = self.registry.list_usernames();
                self.send_line(&format!("[{}]", names.join(", "))).await?;
            }
            Ok(Command::Send { receiver, body }) => {
                if !self.registry.send(&receiver, username, &body) {
                    self.send_line(REPLY_DELIVERY_FAILED).await?;
                }
            }
            Ok(Command::Receive) => {
                if !self.registry.has_pending(username) {
                    self.send_line(REPLY_NO_NEW_MESSAGES).await?;
                } else {
                    while let Some(message) = self.registry.drain_one(username) {
                        self.send_line(ControlToken::Decrypt.as_line()).await?;
                        self.send_line(&message.formatted()).await?;
                    }
                }
            }
            Ok(Command::GetKey { username: target }) => {
                match self.registry.lookup_key(&target) {
                    Some(key) => self.send_line(&key).await?,
                    None => self.send_line(REPLY_USERNAME_NOT_FOUND).await?,
                }
            }
            Ok(Command::Help { topic }) => match topic {
                None => {
                    for help_line in HELP_SUMMARY {
                        self.send_line(help_line).await?;
                    }
                }
                Some(topic) => match protocol::help_for(&topic) {
                    Some(description) => self.send_line(description).await?,
                    None => self.send_line(REPLY_HELP_UNSUPPORTED).await?,
                },
            },
            Ok(Command::Quit) => {
                self.send_line(QUIT_CONFIRM_PROMPT).await?;
                self.send_line(ControlToken::Input.as_line()).await?;
                match self.recv_line().await? {
                    Some(reply) if reply.starts_with(QUIT_AFFIRMATIVE) => {
                        self.send_line(ControlToken::Quit.as_line()).await?;
                        return Ok(true);
                    }
                    Some(_) => {}
                    // Stream ended mid-confirmation.
                    None => return Ok(true),
                }
            }
            Err(CommandError::Syntax) => self.send_line(REPLY_SYNTAX_ERROR).await?,
            Err(CommandError::Unknown(_)) => self.send_line(REPLY_COMMAND_NOT_FOUND).await?,
        }
        Ok(false)
    }

    async fn recv_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    async fn send_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

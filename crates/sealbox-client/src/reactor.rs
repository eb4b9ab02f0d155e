//! Client-side protocol reactor.
//!
//! Reads one server line at a time and reacts to control tokens; everything
//! else is plain server text and goes straight to the console. The key pair
//! and the local capacity limit exist before the loop starts, because a
//! `SENDKEY` or an encrypted exchange can arrive at any point after login.

use sealbox_core::message::split_wire_line;
use sealbox_core::protocol::{ControlToken, REPLY_USERNAME_NOT_FOUND};
use sealbox_core::{rsa, KeyPair};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::console::Console;
use crate::error::{ClientError, Result};

// ----------------------------------------------------------------------------
// Reactor
// ----------------------------------------------------------------------------

pub struct Reactor<R, W, C> {
    reader: R,
    writer: W,
    console: C,
    keys: KeyPair,
    max_chars: usize,
}

impl<R, W, C> Reactor<R, W, C>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    C: Console,
{
    pub fn new(reader: R, writer: W, console: C, keys: KeyPair) -> Result<Self> {
        let max_chars = rsa::max_plaintext_chars(&keys.public_key)?;
        Ok(Self {
            reader,
            writer,
            console,
            keys,
            max_chars,
        })
    }

    /// React to server lines until `QUIT`, end of stream, or exhausted
    /// human input.
    pub async fn run(mut self) -> Result<()> {
        loop {
            let Some(line) = self.recv_line().await? else {
                return Ok(());
            };
            match ControlToken::parse(&line) {
                Some(ControlToken::Input) => {
                    let Some(human) = self.console.read_line().await? else {
                        return Ok(());
                    };
                    self.send_line(&human).await?;
                }
                Some(ControlToken::InputCommand) => {
                    let Some(human) = self.console.read_line().await? else {
                        return Ok(());
                    };
                    self.forward_command(human).await?;
                }
                Some(ControlToken::Decrypt) => self.decrypt_next().await?,
                Some(ControlToken::SendKey) => {
                    let key = self.keys.public_key.clone();
                    self.send_line(&key).await?;
                }
                Some(ControlToken::Quit) => return Ok(()),
                None => self.console.show(&line),
            }
        }
    }

    /// A `send` line gets a pre-flight key lookup and client-side
    /// encryption; every other command is forwarded untouched. The check is
    /// on the literal lowercase verb with exactly three fields.
    async fn forward_command(&mut self, line: String) -> Result<()> {
        let fields: Vec<&str> = line.splitn(3, ' ').collect();
        if let ["send", receiver, body] = fields[..] {
            let receiver = receiver.to_owned();
            let body = body.to_owned();
            self.send_encrypted(&receiver, &body).await
        } else {
            self.send_line(&line).await
        }
    }

    /// The synchronous getkey round trip, the local capacity check, and the
    /// in-place encryption of the message body. On a local abort a bare
    /// `send` is still forwarded so the prompt/token flow stays in step with
    /// the server.
    async fn send_encrypted(&mut self, receiver: &str, body: &str) -> Result<()> {
        self.send_line(&format!("getkey {receiver}")).await?;
        let key = self
            .recv_line()
            .await?
            .ok_or(ClientError::UnexpectedEof)?;
        // Consume the INPUTC that follows the getkey reply.
        self.recv_line().await?.ok_or(ClientError::UnexpectedEof)?;

        if key == REPLY_USERNAME_NOT_FOUND {
            self.console.show("username not found");
            self.send_line("send").await
        } else if body.len() > self.max_chars {
            let notice = format!("the message cannot exceed {} characters", self.max_chars);
            self.console.show(&notice);
            self.send_line("send").await
        } else {
            let ciphertext = rsa::encrypt(body, &key)?;
            self.send_line(&format!("send {receiver} {ciphertext}")).await
        }
    }

    /// The line after a DECRYPT token: `[HH:MM]<sender> ciphertext`.
    async fn decrypt_next(&mut self) -> Result<()> {
        let line = self
            .recv_line()
            .await?
            .ok_or(ClientError::UnexpectedEof)?;
        match split_wire_line(&line) {
            Some((prefix, ciphertext)) => {
                let plaintext = rsa::decrypt(ciphertext, &self.keys.private_key)?;
                self.console.show(&format!("{prefix} {plaintext}"));
            }
            None => self.console.show(&line),
        }
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use tokio::io::{duplex, AsyncReadExt, BufReader};

    /// Pre-buffer the server's lines, run the reactor to completion (every
    /// script ends in QUIT), then collect what it wrote back.
    async fn exercise(
        server_script: &[&str],
        console: &mut ScriptedConsole,
        keys: KeyPair,
    ) -> Vec<String> {
        let (client_side, mut server_side) = duplex(65536);
        for line in server_script {
            server_side
                .write_all(format!("{line}\n").as_bytes())
                .await
                .unwrap();
        }

        let (read_half, write_half) = tokio::io::split(client_side);
        let reactor =
            Reactor::new(BufReader::new(read_half), write_half, console, keys).unwrap();
        reactor.run().await.unwrap();

        let mut sent = String::new();
        server_side.read_to_string(&mut sent).await.unwrap();
        sent.lines().map(str::to_owned).collect()
    }

    fn keys() -> KeyPair {
        KeyPair::generate(256).unwrap()
    }

    #[tokio::test]
    async fn sendkey_token_sends_the_public_key() {
        let keys = keys();
        let public_key = keys.public_key.clone();
        let mut console = ScriptedConsole::new([]);
        let sent = exercise(&["SENDKEY", "QUIT"], &mut console, keys).await;
        assert_eq!(sent, vec![public_key]);
    }

    #[tokio::test]
    async fn plain_server_text_is_shown_verbatim() {
        let mut console = ScriptedConsole::new([]);
        let sent = exercise(&["<Server> welcome, alice", "QUIT"], &mut console, keys()).await;
        assert!(sent.is_empty());
        assert_eq!(console.shown, vec!["<Server> welcome, alice"]);
    }

    #[tokio::test]
    async fn input_token_forwards_one_human_line() {
        let mut console = ScriptedConsole::new(["alice"]);
        let sent = exercise(&["INPUT", "QUIT"], &mut console, keys()).await;
        assert_eq!(sent, vec!["alice"]);
    }

    #[tokio::test]
    async fn non_send_commands_are_forwarded_untouched() {
        let mut console = ScriptedConsole::new(["list"]);
        let sent = exercise(&["INPUTC", "QUIT"], &mut console, keys()).await;
        assert_eq!(sent, vec!["list"]);
    }

    #[tokio::test]
    async fn malformed_send_is_forwarded_for_the_server_to_reject() {
        let mut console = ScriptedConsole::new(["send bob"]);
        let sent = exercise(&["INPUTC", "QUIT"], &mut console, keys()).await;
        assert_eq!(sent, vec!["send bob"]);
    }

    #[tokio::test]
    async fn send_encrypts_against_the_recipient_key() {
        let recipient = keys();
        let mut console = ScriptedConsole::new(["send bob hi"]);
        let script = [
            "INPUTC",
            recipient.public_key.as_str(),
            "INPUTC",
            "QUIT",
        ];
        let sent = exercise(&script, &mut console, keys()).await;

        assert_eq!(sent[0], "getkey bob");
        let ciphertext = sent[1].strip_prefix("send bob ").unwrap();
        assert_eq!(
            rsa::decrypt(ciphertext, &recipient.private_key).unwrap(),
            "hi"
        );
    }

    #[tokio::test]
    async fn unknown_recipient_aborts_the_send_locally() {
        let mut console = ScriptedConsole::new(["send ghost hi"]);
        let script = ["INPUTC", REPLY_USERNAME_NOT_FOUND, "INPUTC", "QUIT"];
        let sent = exercise(&script, &mut console, keys()).await;

        assert_eq!(sent, vec!["getkey ghost", "send"]);
        assert_eq!(console.shown, vec!["username not found"]);
    }

    #[tokio::test]
    async fn oversized_message_aborts_the_send_locally() {
        // A 64-bit modulus caps plaintext at 6 or 7 bytes.
        let small_keys = KeyPair::generate(64).unwrap();
        let recipient = keys();
        let mut console = ScriptedConsole::new(["send bob twelve chars"]);
        let script = [
            "INPUTC",
            recipient.public_key.as_str(),
            "INPUTC",
            "QUIT",
        ];
        let sent = exercise(&script, &mut console, small_keys).await;

        assert_eq!(sent, vec!["getkey bob", "send"]);
        assert_eq!(console.shown.len(), 1);
        assert!(console.shown[0].contains("cannot exceed"));
    }

    #[tokio::test]
    async fn decrypt_token_decrypts_and_reassembles_the_line() {
        let keys = keys();
        let ciphertext = rsa::encrypt("hi", &keys.public_key).unwrap();
        let wire = format!("[10:00]<bob> {ciphertext}");
        let mut console = ScriptedConsole::new([]);
        let sent = exercise(&["DECRYPT", wire.as_str(), "QUIT"], &mut console, keys).await;
        assert!(sent.is_empty());
        assert_eq!(console.shown, vec!["[10:00]<bob> hi"]);
    }

    #[tokio::test]
    async fn end_of_stream_ends_the_run() {
        let (client_side, server_side) = duplex(1024);
        drop(server_side);
        let (read_half, write_half) = tokio::io::split(client_side);
        let mut console = ScriptedConsole::new([]);
        let reactor =
            Reactor::new(BufReader::new(read_half), write_half, &mut console, keys()).unwrap();
        reactor.run().await.unwrap();
    }
}

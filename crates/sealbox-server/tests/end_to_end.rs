//! End-to-end exercise over real sockets: two clients register, exchange an
//! encrypted message through the server, and quit.

use std::sync::Arc;
use std::time::Duration;

use sealbox_core::message::split_wire_line;
use sealbox_core::protocol::LOGIN_PROMPT;
use sealbox_core::{rsa, KeyPair};
use sealbox_server::{Dispatcher, MailboxRegistry};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    keys: KeyPair,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Client {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        Client {
            reader: BufReader::new(read_half),
            writer: write_half,
            keys: KeyPair::generate(256).unwrap(),
        }
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        assert_ne!(
            self.reader.read_line(&mut line).await.unwrap(),
            0,
            "server closed the stream unexpectedly"
        );
        line.trim_end_matches(['\r', '\n']).to_owned()
    }

    async fn write_line(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
    }

    async fn read_until_inputc(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await;
            if line == "INPUTC" {
                return lines;
            }
            lines.push(line);
        }
    }

    async fn login(&mut self, username: &str) {
        assert_eq!(self.read_line().await, LOGIN_PROMPT);
        assert_eq!(self.read_line().await, "INPUT");
        self.write_line(username).await;
        assert_eq!(self.read_line().await, "SENDKEY");
        let key = self.keys.public_key.clone();
        self.write_line(&key).await;
        self.read_until_inputc().await;
    }
}

async fn start_server() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let registry = Arc::new(MailboxRegistry::new());
    tokio::spawn(Dispatcher::new(listener, registry).run());
    addr
}

#[tokio::test]
async fn two_clients_exchange_an_encrypted_message() {
    let addr = start_server().await;

    let mut alice = Client::connect(addr).await;
    alice.login("alice").await;
    let mut bob = Client::connect(addr).await;
    bob.login("bob").await;

    // Bob looks up alice's key and sends her an encrypted hello.
    bob.write_line("getkey alice").await;
    let reply = bob.read_until_inputc().await;
    let alice_key = &reply[0];
    assert_eq!(alice_key, &alice.keys.public_key);

    assert!("hello".len() <= rsa::max_plaintext_chars(alice_key).unwrap());
    let cipher = rsa::encrypt("hello", alice_key).unwrap();
    bob.write_line(&format!("send alice {cipher}")).await;
    assert!(bob.read_until_inputc().await.is_empty());

    // Alice drains her mailbox and decrypts with her private key.
    alice.write_line("receive").await;
    let lines = alice.read_until_inputc().await;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "DECRYPT");
    let (prefix, ciphertext) = split_wire_line(&lines[1]).unwrap();
    assert!(prefix.ends_with("<bob>"));
    assert_eq!(
        rsa::decrypt(ciphertext, &alice.keys.private_key).unwrap(),
        "hello"
    );

    // A second receive finds the mailbox empty.
    alice.write_line("receive").await;
    assert_eq!(
        alice.read_until_inputc().await,
        vec!["<Server> no new messages"]
    );
}

#[tokio::test]
async fn quit_needs_confirmation_and_releases_the_username() {
    let addr = start_server().await;

    let mut alice = Client::connect(addr).await;
    alice.login("alice").await;
    let mut bob = Client::connect(addr).await;
    bob.login("bob").await;

    // Declined quit: still in the command loop.
    bob.write_line("quit").await;
    assert_eq!(bob.read_line().await, "are you sure? (y/n)");
    assert_eq!(bob.read_line().await, "INPUT");
    bob.write_line("n").await;
    assert_eq!(bob.read_line().await, "INPUTC");
    bob.write_line("list").await;
    assert_eq!(bob.read_until_inputc().await, vec!["[alice, bob]"]);

    // Confirmed quit: session ends and the name disappears.
    bob.write_line("quit").await;
    assert_eq!(bob.read_line().await, "are you sure? (y/n)");
    assert_eq!(bob.read_line().await, "INPUT");
    bob.write_line("y").await;
    assert_eq!(bob.read_line().await, "QUIT");

    // Cleanup races the QUIT token by a hair; poll until it lands.
    for _ in 0..50 {
        alice.write_line("list").await;
        if alice.read_until_inputc().await == vec!["[alice]"] {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("bob was never unregistered");
}

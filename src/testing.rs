use anyhow::anyhow;
use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use crate::completion::{ChatBackend, ChatFuture};
use crate::model::Message;

#[derive(Debug)]
enum StubOutcome {
    Ok(String),
    Err(String),
    Echo,
}

/// Records every history it receives and answers without touching the network.
#[derive(Debug)]
pub(crate) struct StubBackend {
    pub calls: RefCell<Vec<Vec<Message>>>,
    pub api_keys: RefCell<Vec<String>>,
    outcome: StubOutcome,
}

impl StubBackend {
    fn with_outcome(outcome: StubOutcome) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            api_keys: RefCell::new(Vec::new()),
            outcome,
        }
    }

    pub fn ok(content: impl Into<String>) -> Self {
        Self::with_outcome(StubOutcome::Ok(content.into()))
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self::with_outcome(StubOutcome::Err(message.into()))
    }

    /// Replies with `re: <content of the last message>`.
    pub fn echo() -> Self {
        Self::with_outcome(StubOutcome::Echo)
    }
}

impl ChatBackend for StubBackend {
    fn chat<'a>(&'a self, api_key: &'a str, messages: &'a [Message]) -> ChatFuture<'a> {
        self.calls.borrow_mut().push(messages.to_vec());
        self.api_keys.borrow_mut().push(api_key.to_string());
        let result = match &self.outcome {
            StubOutcome::Ok(content) => Ok(content.clone()),
            StubOutcome::Err(message) => Err(anyhow!(message.clone())),
            StubOutcome::Echo => Ok(format!(
                "re: {}",
                messages
                    .last()
                    .map(|msg| msg.content.as_str())
                    .unwrap_or_default()
            )),
        };
        Box::pin(async move { result })
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let read = stream.read(&mut chunk).expect("read should succeed");
        if read == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..read]);

        let Some(header_end) = buf.windows(4).position(|window| window == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Answers exactly one request with `status` and `body`.
///
/// Returns an OpenAI-style base URL and a handle yielding the raw request.
pub(crate) fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept should succeed");
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .expect("write should succeed");
        request
    });
    (format!("http://{addr}/v1beta/openai/"), server)
}

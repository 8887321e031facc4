//! Google Calendar provider implementation.
//!
//! # Authentication Flow
//!
//! 1. The user downloads an OAuth client file (`credentials.json`) from the
//!    Google Cloud Console
//! 2. A loopback HTTP listener is bound on a free port
//! 3. The browser opens Google's consent page with a PKCE challenge
//! 4. Google redirects to the listener with the authorization code
//! 5. The code is exchanged for access and refresh tokens
//! 6. The token is persisted (`token.json`) and reused on later runs
//!
//! # Example
//!
//! ```ignore
//! use calwidget_providers::google::{CredentialManager, GoogleConfig, GoogleProvider};
//!
//! let manager = Arc::new(CredentialManager::new(GoogleConfig::new(
//!     "credentials.json",
//!     "token.json",
//! )));
//! manager.obtain().await?;
//! let provider = GoogleProvider::new(manager)?;
//! ```

mod client;
mod config;
mod credentials;
mod oauth;
mod provider;
mod tokens;

pub use client::{GoogleCalendarClient, ListEventsRequest};
pub use config::{GoogleConfig, OAuthCredentials};
pub use credentials::CredentialManager;
pub use oauth::{OAuthClient, PkceFlow};
pub use provider::GoogleProvider;
pub use tokens::{TokenInfo, TokenStorage};

/// Minimal HTTP/1.1 servers for exercising the clients against real sockets.
#[cfg(test)]
pub(crate) mod test_support {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Answers one request with `status` and `body`; returns the base URL.
    pub fn serve_once(status: &'static str, body: &'static str) -> String {
        serve_sequence(vec![(status, body)]).0
    }

    /// Answers one request per entry, in order. Each request head is sent on
    /// the returned channel.
    pub fn serve_sequence(
        responses: Vec<(&'static str, &'static str)>,
    ) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut head = String::new();
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap_or(0);
                        }
                    }
                    head.push_str(&line);
                }
                let mut request_body = vec![0; content_length];
                let _ = reader.read_exact(&mut request_body);
                let _ = tx.send(head);

                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        (base, rx)
    }
}

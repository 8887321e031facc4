//! The calendar icon at the left of the header.
//!
//! The image is downloaded once per session on the tokio runtime; the UI
//! thread only decodes the bytes. Any failure leaves the text glyph.

use gtk4 as gtk;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use tracing::debug;

pub const ICON_SIZE: i32 = 20;
pub const FALLBACK_GLYPH: &str = "📅";

/// Glyph shown until (or instead of) the downloaded image.
pub fn placeholder() -> gtk::Widget {
    gtk::Label::builder()
        .label(FALLBACK_GLYPH)
        .css_classes(["agenda-icon-glyph"])
        .build()
        .upcast()
}

/// Downloads the icon bytes.
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, reqwest::Error> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    debug!(url, size = bytes.len(), "downloaded header icon");
    Ok(bytes.to_vec())
}

/// Decodes `bytes` into a 20 px image.
pub fn image_from_bytes(bytes: &glib::Bytes) -> Result<gtk::Widget, glib::Error> {
    let texture = gdk::Texture::from_bytes(bytes)?;
    let image = gtk::Image::from_paintable(Some(&texture));
    image.set_pixel_size(ICON_SIZE);
    Ok(image.upcast())
}

/// Puts `widget` in the icon slot, replacing what was there.
pub fn show(slot: &gtk::Box, widget: &gtk::Widget) {
    while let Some(child) = slot.first_child() {
        slot.remove(&child);
    }
    slot.append(widget);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::Duration;

    fn serve_once(status: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/icon.png", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf);
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
            }
        });
        url
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn fetch_returns_body() {
        let url = serve_once("200 OK", b"\x89PNG fake");
        let bytes = fetch(&client(), &url).await.unwrap();
        assert_eq!(bytes, b"\x89PNG fake");
    }

    #[tokio::test]
    async fn fetch_rejects_http_errors() {
        let url = serve_once("404 Not Found", b"");
        assert!(fetch(&client(), &url).await.is_err());
    }
}

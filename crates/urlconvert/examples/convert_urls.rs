//! Example: Convert a few live URLs to Markdown links
//!
//! Run with: cargo run -p urlconvert --example convert_urls
//!
//! Each line of the sample document is one selection. Lines that are not
//! URLs, and URLs whose title cannot be fetched, are left alone.

use urlconvert::{Command, Converter, Span};

const DOCUMENT: &str = "https://example.com
not a url
https://www.rust-lang.org/
https://httpbin.org/status/404
https://example.com
ftp://ftp.example.com/file.txt";

#[tokio::main]
async fn main() {
    println!("urlconvert examples");
    println!("===================\n");

    let mut selections = Vec::new();
    let mut offset = 0;
    for line in DOCUMENT.lines() {
        selections.push((Span::new(offset, offset + line.len()), line.to_string()));
        offset += line.len() + 1;
    }

    let converter = Converter::builder()
        .timeout_seconds(15.0)
        .max_concurrency(4)
        .build();

    for command in [Command::Markdown, Command::Path] {
        let mut document = DOCUMENT.to_string();
        let status = converter
            .run(&selections, &command, |span, text| {
                document.replace_range(span.start..span.end, text);
            })
            .await;

        println!("{}:", command.format());
        for line in document.lines() {
            println!("   {}", line);
        }
        if let Some(message) = status.message {
            println!("   ({})\n", message);
        }
    }
}

//! Background rendering
//!
//! The background is expressed as a stylesheet: a `--apod-background` custom
//! property on `:root` plus direct background properties on `body`.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

use crate::error::ApodResult;

/// Destination for the resolved background
pub trait BackgroundSink: Send + Sync {
    fn apply(&self, image_url: &str) -> ApodResult<()>;
}

/// Escapes a value for use inside a double-quoted CSS string
fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' | '\r' => {}
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Stylesheet applying `image_url` as the page background
pub fn background_css(image_url: &str) -> String {
    let url = format!("url({})", css_string(image_url));
    format!(
        ":root {{\n  --apod-background: {url};\n}}\n\n\
         body {{\n  background-image: {url};\n  background-size: cover;\n  \
         background-position: center;\n  background-attachment: fixed;\n}}\n"
    )
}

/// Writes the stylesheet to a file
#[derive(Debug, Clone)]
pub struct CssFileSink {
    path: PathBuf,
}

impl CssFileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BackgroundSink for CssFileSink {
    fn apply(&self, image_url: &str) -> ApodResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Readers never observe a half-written stylesheet
        let tmp = self.path.with_extension("css.tmp");
        fs::write(&tmp, background_css(image_url))?;
        fs::rename(&tmp, &self.path)?;
        info!("Background written to {}", self.path.display());
        Ok(())
    }
}

/// Prints the stylesheet to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl BackgroundSink for StdoutSink {
    fn apply(&self, image_url: &str) -> ApodResult<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(background_css(image_url).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_background_css_sets_custom_property_and_body() {
        let css = background_css("https://apod.nasa.gov/apod/image/2410/a.jpg");
        assert!(css.contains("--apod-background: url(\"https://apod.nasa.gov/apod/image/2410/a.jpg\");"));
        assert!(css.contains("background-image: url(\"https://apod.nasa.gov/apod/image/2410/a.jpg\");"));
        assert!(css.contains("background-size: cover;"));
        assert!(css.contains("background-position: center;"));
        assert!(css.contains("background-attachment: fixed;"));
    }

    #[test]
    fn test_background_css_escapes_quotes() {
        let css = background_css("https://example.com/a\"b.jpg");
        assert!(css.contains("url(\"https://example.com/a\\\"b.jpg\")"));
    }

    #[test]
    fn test_css_file_sink_writes_stylesheet() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("styles").join("background.css");
        let sink = CssFileSink::new(path.clone());

        sink.apply("data:image/jpeg;base64,AAAA").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, background_css("data:image/jpeg;base64,AAAA"));
        assert!(!path.with_extension("css.tmp").exists());
    }

    #[test]
    fn test_css_file_sink_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("background.css");
        let sink = CssFileSink::new(path.clone());

        sink.apply("https://example.com/one.jpg").unwrap();
        sink.apply("https://example.com/two.jpg").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("two.jpg"));
        assert!(!content.contains("one.jpg"));
    }

    #[test]
    fn test_stdout_sink_does_not_fail() {
        assert!(StdoutSink.apply("https://example.com/a.jpg").is_ok());
    }
}

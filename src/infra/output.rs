#[cfg(feature = "clipboard-support")]
use clipboard::{ClipboardContext, ClipboardProvider};
use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::{debug, info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

const CLIPBOARD_PREVIEW_CHARS: usize = 200;

pub trait OutputWriter {
    fn write(&self, content: &str) -> anyhow::Result<()>;
}

pub struct FileWriter {
    path: PathBuf,
}

impl FileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputWriter for FileWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to file: {}", self.path.display());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, content)?;
        info!("Output written to file: {}", self.path.display());
        Ok(())
    }
}

pub struct ConsoleWriter;

impl OutputWriter for ConsoleWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to console");
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct ClipboardWriter;

#[cfg(feature = "clipboard-support")]
impl OutputWriter for ClipboardWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to clipboard");

        let mut ctx: ClipboardContext = match ClipboardProvider::new() {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!("Failed to access clipboard: {}", e);
                return Err(anyhow::anyhow!("Failed to access clipboard: {}", e));
            }
        };

        match ctx.set_contents(content.to_owned()) {
            Ok(_) => {
                info!("Output copied to clipboard (size: {} bytes)", content.len());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to copy to clipboard: {}", e);
                Err(anyhow::anyhow!("Failed to copy to clipboard: {}", e))
            }
        }
    }
}

#[cfg(not(feature = "clipboard-support"))]
impl OutputWriter for ClipboardWriter {
    fn write(&self, _content: &str) -> anyhow::Result<()> {
        warn!("Clipboard output requested but clipboard-support is disabled");
        Err(anyhow::anyhow!(
            "clipboard output requires the clipboard-support feature"
        ))
    }
}

pub fn create_writer(output_path: Option<&PathBuf>, clipboard_output: bool) -> Box<dyn OutputWriter> {
    if clipboard_output {
        return Box::new(ClipboardWriter);
    }

    match output_path {
        Some(path) => Box::new(FileWriter::new(path.clone())),
        None => Box::new(ConsoleWriter),
    }
}

fn preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() > max_chars {
        let head: String = content.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

pub fn write_output(
    formatted_content: &str,
    output_path: Option<&PathBuf>,
    clipboard_output: bool,
) -> anyhow::Result<()> {
    let writer = create_writer(output_path, clipboard_output);
    writer.write(formatted_content)?;

    if clipboard_output {
        let mut stderr = io::stderr();
        stderr.execute(SetForegroundColor(Color::Green))?;
        writeln!(stderr, "\nContext copied to clipboard!")?;
        stderr.execute(ResetColor)?;

        writeln!(stderr, "\nPreview of copied content:\n")?;
        writeln!(stderr, "{}", preview(formatted_content, CLIPBOARD_PREVIEW_CHARS))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_file_writer() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        let writer = FileWriter::new(path.clone());
        let content = "<context>\ntheme: auth\n</context>";

        writer.write(content).unwrap();

        let read_content = fs::read_to_string(path).unwrap();
        assert_eq!(read_content, content);
    }

    #[test]
    fn test_file_writer_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out/context/auth.txt");

        write_output("auth context", Some(&path), false).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "auth context");
    }

    #[test]
    fn test_create_writer() {
        let path = PathBuf::from("context.txt");
        for writer in [
            create_writer(Some(&path), false),
            create_writer(None, false),
            create_writer(None, true),
        ] {
            assert_eq!(
                std::any::type_name_of_val(&*writer),
                "dyn theme_scope::infra::output::OutputWriter"
            );
        }
    }

    #[test]
    fn test_utf8_safe_preview() {
        let content = "اهلا مرحب عبدالله This string has UTF-8 characters like: ├── ./src/file.rs";

        let short = preview(content, 20);
        assert_eq!(short.chars().count(), 23);
        assert!(short.ends_with("..."));
        assert_eq!(preview("tiny", 20), "tiny");
    }
}

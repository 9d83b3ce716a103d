use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

/// Best-effort clipboard access through the platform's own tools. Failure is
/// never fatal to a command; callers print a message and move on.
#[derive(Debug)]
pub enum ClipboardError {
    Unavailable(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "Clipboard unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ClipboardError {}

pub fn copy(text: &str) -> Result<(), ClipboardError> {
    for &(program, args) in copy_tools() {
        if matches!(pipe_to(program, args, text), Ok(true)) {
            return Ok(());
        }
    }
    Err(ClipboardError::Unavailable(
        "no clipboard tool found".to_string(),
    ))
}

pub fn paste() -> Result<String, ClipboardError> {
    for &(program, args) in paste_tools() {
        if let Ok(output) = Command::new(program)
            .args(args)
            .stderr(Stdio::null())
            .output()
        {
            if output.status.success() {
                return Ok(String::from_utf8_lossy(&output.stdout).to_string());
            }
        }
    }
    Err(ClipboardError::Unavailable(
        "no clipboard tool found".to_string(),
    ))
}

#[cfg(target_os = "macos")]
fn copy_tools() -> &'static [(&'static str, &'static [&'static str])] {
    &[("pbcopy", &[])]
}

#[cfg(target_os = "macos")]
fn paste_tools() -> &'static [(&'static str, &'static [&'static str])] {
    &[("pbpaste", &[])]
}

#[cfg(target_os = "windows")]
fn copy_tools() -> &'static [(&'static str, &'static [&'static str])] {
    &[("clip", &[])]
}

#[cfg(target_os = "windows")]
fn paste_tools() -> &'static [(&'static str, &'static [&'static str])] {
    &[("powershell", &["-NoProfile", "-Command", "Get-Clipboard"])]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn copy_tools() -> &'static [(&'static str, &'static [&'static str])] {
    &[
        ("xclip", &["-selection", "clipboard"]),
        ("xsel", &["--clipboard", "--input"]),
    ]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn paste_tools() -> &'static [(&'static str, &'static [&'static str])] {
    &[
        ("xclip", &["-selection", "clipboard", "-o"]),
        ("xsel", &["--clipboard", "--output"]),
    ]
}

fn pipe_to(program: &str, args: &[&str], text: &str) -> std::io::Result<bool> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // take() so the pipe closes before we wait, or the tool never sees EOF
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    Ok(child.wait()?.success())
}

use std::fmt;

/// Target shell as stored in the `SHELL` config key. Unknown names are kept
/// verbatim so the prompt still mentions whatever the user configured.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
    Sh,
    Cmd,
    PowerShell,
    Other(String),
}

impl ShellKind {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "bash" => ShellKind::Bash,
            "zsh" => ShellKind::Zsh,
            "fish" => ShellKind::Fish,
            "sh" => ShellKind::Sh,
            "cmd" => ShellKind::Cmd,
            "powershell" | "pwsh" => ShellKind::PowerShell,
            other => ShellKind::Other(other.to_string()),
        }
    }

    /// Human-readable name interpolated into the prompt.
    pub fn description(&self) -> &str {
        match self {
            ShellKind::Bash => "GNU Bash",
            ShellKind::Zsh => "Zsh shell",
            ShellKind::Fish => "Fish shell",
            ShellKind::Sh => "POSIX shell",
            ShellKind::Cmd => "Windows Command Prompt",
            ShellKind::PowerShell => "Windows PowerShell",
            ShellKind::Other(name) => name,
        }
    }

    /// Canonical name as written back to the config file.
    pub fn config_name(&self) -> &str {
        match self {
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
            ShellKind::Fish => "fish",
            ShellKind::Sh => "sh",
            ShellKind::Cmd => "cmd",
            ShellKind::PowerShell => "powershell",
            ShellKind::Other(name) => name,
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_shells_get_descriptions() {
        assert_eq!(ShellKind::from_name("bash").description(), "GNU Bash");
        assert_eq!(ShellKind::from_name("ZSH").description(), "Zsh shell");
        assert_eq!(ShellKind::from_name(" fish ").description(), "Fish shell");
        assert_eq!(
            ShellKind::from_name("powershell").description(),
            "Windows PowerShell"
        );
        assert_eq!(ShellKind::from_name("pwsh"), ShellKind::PowerShell);
    }

    #[test]
    fn unknown_shell_passes_through() {
        let shell = ShellKind::from_name("nushell");
        assert_eq!(shell, ShellKind::Other("nushell".to_string()));
        assert_eq!(shell.description(), "nushell");
        assert_eq!(shell.config_name(), "nushell");
    }
}

use colored::Colorize;
use std::io::{self, Write};

pub fn command(text: &str) {
    println!("{}", text.cyan());
}

pub fn success(message: &str) {
    println!("{}", format!("✓ {}", message).green());
}

pub fn error(message: &str) {
    eprintln!("{}", format!("✗ {}", message).red());
}

pub fn warning(message: &str) {
    println!("{}", format!("! {}", message).yellow());
}

pub fn info(message: &str) {
    println!("{}", message.blue());
}

pub fn prompt_yes_no(message: &str, default: bool) -> io::Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    print!("{} {}: ", message, hint);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    if answer.is_empty() {
        return Ok(default);
    }
    Ok(matches!(answer.as_str(), "y" | "yes"))
}

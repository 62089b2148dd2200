//! src/ui.rs
//! Terminal output helpers: prefixed colored messages, spinners and yes/no prompts.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::time::Duration;

pub fn step(msg: &str) {
    println!("{} {}", "==>".cyan().bold(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "==>".green().bold(), msg.green());
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn hint(msg: &str) {
    eprintln!("       {}", msg.dimmed());
}

pub fn bug_report(code: i32) {
    eprintln!(
        "{} {} exited with unexpected status {}. This is probably a bug, please file a report including the output above.",
        "Error:".red().bold(),
        env!("CARGO_PKG_NAME"),
        code
    );
}

pub fn spinner(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {elapsed_precise} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.into());
    pb
}

/// Runs `f` behind a spinner that is cleared however `f` returns.
pub fn with_spinner<T>(msg: impl Into<String>, f: impl FnOnce() -> T) -> T {
    let pb = spinner(msg);
    let result = f();
    pb.finish_and_clear();
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

/// One step of the prompt loop: a recognised answer ends it, anything else re-prompts.
fn parse_answer(input: &str) -> Option<Answer> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(Answer::Yes),
        "n" | "no" => Some(Answer::No),
        _ => None,
    }
}

/// Asks a yes/no question until a valid answer arrives. End of input is a "no".
pub fn confirm_with<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> io::Result<Answer> {
    loop {
        write!(output, "{} {} ", question.bold(), "[y/n]".dimmed())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(Answer::No);
        }

        match parse_answer(&line) {
            Some(answer) => return Ok(answer),
            None => writeln!(output, "{}", "Please answer 'y' or 'n'.".red())?,
        }
    }
}

pub fn confirm(question: &str) -> io::Result<Answer> {
    let stdin = io::stdin();
    confirm_with(question, &mut stdin.lock(), &mut io::stdout())
}

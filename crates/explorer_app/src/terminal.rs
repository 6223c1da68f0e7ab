use std::io::{self, BufRead, Write};

use explorer_core::PickerItem;
use explorer_engine::Prompter;
use explorer_logging::explorer_warn;

/// Answers the provider's questions on stdin/stdout.
pub struct TerminalPrompter;

pub fn read_answer(prompt: &str) -> Option<String> {
    print!("{prompt}");
    if let Err(err) = io::stdout().flush() {
        explorer_warn!("Cannot flush stdout: {}", err);
    }
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        Err(err) => {
            explorer_warn!("Cannot read stdin: {}", err);
            None
        }
    }
}

impl Prompter for TerminalPrompter {
    fn pick(&self, title: &str, items: &[PickerItem]) -> Option<String> {
        println!("{title}");
        for (index, item) in items.iter().enumerate() {
            match &item.description {
                Some(description) => println!("  {}) {}  [{}]", index + 1, item.label, description),
                None => println!("  {}) {}", index + 1, item.label),
            }
        }
        let answer = read_answer("choice (empty to cancel)> ")?;
        let index: usize = answer.trim().parse().ok()?;
        items
            .get(index.checked_sub(1)?)
            .map(|item| item.label.clone())
    }

    fn input(&self, prompt: &str, value: Option<&str>) -> Option<String> {
        let hint = match value {
            Some(value) if !value.is_empty() => format!("{prompt} [{value}] ('.' to cancel)> "),
            _ => format!("{prompt} ('.' to cancel)> "),
        };
        let answer = read_answer(&hint)?;
        match answer.trim() {
            "." => None,
            "" => value.map(str::to_string).or(Some(answer)),
            _ => Some(answer),
        }
    }

    fn confirm(&self, message: &str, action: &str) -> bool {
        let answer = read_answer(&format!("{message}\n{action}? [y/N]> "));
        answer.is_some_and(|a| {
            let a = a.trim();
            a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case(action)
        })
    }

    fn show_message(&self, message: &str) {
        println!("{message}");
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn set_status(&self, message: &str) {
        println!("[{message}]");
    }
}

//! Blocking console prompts for the interactive selector.
//!
//! All user interaction is synchronous line-based stdin; the selection
//! parsing is kept pure so the loop logic is testable without a terminal.

use std::io::{self, BufRead, Write};

/// Print a prompt and read one trimmed line from stdin.
///
/// Returns `None` on EOF (e.g. interrupted input), which callers treat as a
/// quiet exit.
pub fn input(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// `y/n` confirmation. Anything other than `y`/`yes` counts as no; EOF
/// counts as no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    let answer = input(&format!("{prompt} (y/n): "))?;
    Ok(answer
        .map(|s| {
            let s = s.to_ascii_lowercase();
            s == "y" || s == "yes"
        })
        .unwrap_or(false))
}

pub fn print_header(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(60));
}

pub fn print_success(message: &str) {
    println!("[ok] {message}");
}

pub fn print_error(message: &str) {
    println!("[!!] {message}");
}

pub fn print_info(message: &str) {
    println!("     {message}");
}

/// Outcome of parsing a menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// 0-based index into the menu.
    Pick(usize),
    Quit,
    Invalid,
}

/// Parse free-text menu input against a 1-based menu of `len` items.
///
/// `q` (any case) quits; non-numeric and out-of-range input is `Invalid`
/// and should re-prompt rather than error.
pub fn parse_selection(raw: &str, len: usize) -> Selection {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("q") {
        return Selection::Quit;
    }
    match raw.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Selection::Pick(n - 1),
        _ => Selection::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_choices_are_one_based() {
        assert_eq!(parse_selection("1", 6), Selection::Pick(0));
        assert_eq!(parse_selection("6", 6), Selection::Pick(5));
    }

    #[test]
    fn out_of_range_is_invalid() {
        assert_eq!(parse_selection("0", 6), Selection::Invalid);
        assert_eq!(parse_selection("7", 6), Selection::Invalid);
        assert_eq!(parse_selection("99", 6), Selection::Invalid);
    }

    #[test]
    fn non_numeric_is_invalid() {
        assert_eq!(parse_selection("", 6), Selection::Invalid);
        assert_eq!(parse_selection("openrouter", 6), Selection::Invalid);
        assert_eq!(parse_selection("1.5", 6), Selection::Invalid);
    }

    #[test]
    fn q_quits_in_any_case() {
        assert_eq!(parse_selection("q", 6), Selection::Quit);
        assert_eq!(parse_selection("Q", 6), Selection::Quit);
        assert_eq!(parse_selection("  q  ", 6), Selection::Quit);
    }
}

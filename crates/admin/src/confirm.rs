//! Interactive confirmation before destructive commands.

use std::io::{self, BufRead, Write};

/// True for answers that approve the change (`y` or `yes`, any case).
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Asks `Proceed? [y/N]` on stdout and reads the answer from stdin.
///
/// Returns `true` without prompting when `assume_yes` is set.
pub fn confirm(assume_yes: bool) -> io::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let stdin = io::stdin();
    let mut input = stdin.lock();
    confirm_with(&mut input, &mut io::stdout())
}

/// Prompt against arbitrary streams. End of input counts as "no".
pub fn confirm_with<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "Proceed? [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }
    Ok(is_affirmative(&answer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn answer(text: &str) -> (bool, String) {
        let mut input = Cursor::new(text.as_bytes().to_vec());
        let mut output = Vec::new();
        let approved = confirm_with(&mut input, &mut output).unwrap();
        (approved, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("YES\n"));
        assert!(is_affirmative("  Yes "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }

    #[test]
    fn test_confirm_with_yes() {
        let (approved, prompt) = answer("y\n");
        assert!(approved);
        assert_eq!(prompt, "Proceed? [y/N] ");
    }

    #[test]
    fn test_confirm_defaults_to_no() {
        assert!(!answer("\n").0);
        assert!(!answer("maybe\n").0);
    }

    #[test]
    fn test_confirm_eof_is_no() {
        assert!(!answer("").0);
    }

    #[test]
    fn test_confirm_skipped_with_assume_yes() {
        assert!(confirm(true).unwrap());
    }
}

//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Results go to stdout; status messages go to stderr.
pub(crate) struct Output {
    out: Term,
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
    dim: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            out: Term::stdout(),
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Print a result line.
    pub(crate) fn line(&self, msg: &str) {
        let _ = self.out.write_line(msg);
    }

    /// Print a highlighted result line (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self.out.write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// Print a de-emphasized result line.
    pub(crate) fn muted(&self, msg: &str) {
        let _ = self.out.write_line(&self.dim.apply_to(msg).to_string());
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}

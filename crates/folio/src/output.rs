//! Terminal output: status lines on stderr, command results on stdout.

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    status: Term,
    result: Term,
    green: Style,
    yellow: Style,
    red: Style,
    heading: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            result: Term::stdout(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            heading: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Plain status line.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.status.write_line(msg);
    }

    /// Green status line.
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.status.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Yellow status line.
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.status.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Red status line.
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.status.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Section heading in command results.
    pub(crate) fn heading(&self, msg: &str) {
        let _ = self.result.write_line(&self.heading.apply_to(msg).to_string());
    }

    /// One entry of a tree listing, indented by depth, URL dimmed.
    pub(crate) fn tree_entry(&self, depth: usize, label: &str, url: &str) {
        let line = format!("{}{label} {}", "  ".repeat(depth), self.dim.apply_to(url));
        let _ = self.result.write_line(&line);
    }
}

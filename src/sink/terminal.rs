//! Stdout rendering.

use async_trait::async_trait;
use colored::Colorize;

use crate::entry::{Entry, Severity};
use crate::sink::Backend;

pub(crate) struct TerminalBackend;

#[async_trait]
impl Backend for TerminalBackend {
    async fn write(&mut self, entry: Entry) {
        print!("{}", render(&entry));
    }

    async fn close(self: Box<Self>) {}
}

/// One entry as a coloured block: header line, message line, then the
/// context pairs indented four spaces with a synthetic `time:` pair last.
fn render(entry: &Entry) -> String {
    let header = format!("{} {}", entry.severity, entry.namespace);
    let header = match entry.severity {
        Severity::Debug | Severity::Info => header.cyan(),
        Severity::Warning => header.yellow(),
        Severity::Error => header.magenta(),
        Severity::Alert => header.red(),
    };

    let mut out = String::new();
    out.push_str(&format!("{header}\n"));
    out.push_str(&entry.message);
    out.push_str("\nFor context:\n");
    for (name, value) in &entry.context {
        out.push_str(&format!("    {name}: {value}\n"));
    }
    out.push_str(&format!("    time: {}\n", entry.time.to_rfc3339()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    fn sample(severity: Severity) -> Entry {
        let key = Key::detached();
        Entry::record(
            severity,
            &key,
            "api/ping",
            "hello",
            vec![("rid".to_string(), "7".to_string())],
        )
    }

    #[test]
    fn renders_header_message_and_indented_context() {
        colored::control::set_override(false);
        let entry = sample(Severity::Info);
        let rendered = render(&entry);

        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("Info api/ping"));
        assert_eq!(lines.next(), Some("hello"));
        assert_eq!(lines.next(), Some("For context:"));
        assert_eq!(lines.next(), Some("    rid: 7"));
        let time_line = lines.next().unwrap();
        assert!(time_line.starts_with("    time: "));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn every_severity_renders_its_name() {
        colored::control::set_override(false);
        for severity in [
            Severity::Debug,
            Severity::Info,
            Severity::Warning,
            Severity::Error,
            Severity::Alert,
        ] {
            let rendered = render(&sample(severity));
            assert!(rendered.starts_with(severity.as_str()));
        }
    }
}

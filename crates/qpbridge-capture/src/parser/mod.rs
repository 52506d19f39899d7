//! Splits drained host output into [`LogEntry`] records.
//!
//! The host prefixes each record with a header of the form
//! `<timestamp> [<logger>] [<level>] <origin> - <message>`. Lines that do not
//! carry a header (stack trace frames, wrapped text) continue the record in
//! progress. Parsing is a two-state machine: before the first header there is
//! no record, and stray text opens one attributed to [`UNMATCHED`]; after it,
//! every line either starts a new record or extends the current one.

use crate::entry::{LogEntry, UNMATCHED};

/// Parses one drained block into entries, in input order.
///
/// No state survives between calls: a continuation at the start of a block
/// never attaches to a record from a previous block.
#[must_use]
pub fn parse_entries(text: &str) -> Vec<LogEntry> {
    let mut parser = EntryParser::default();
    for line in text.split_inclusive('\n') {
        parser.push_line(line);
    }
    parser.finish()
}

/// Header fields of a structured host log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeaderLine<'a> {
    pub(crate) level: &'a str,
    pub(crate) origin: &'a str,
    pub(crate) message: &'a str,
}

/// Matches `line` (without its terminator) against the header grammar.
pub(crate) fn match_header(line: &str) -> Option<HeaderLine<'_>> {
    let (_timestamp, rest) = split_timestamp(line)?;
    let rest = rest.strip_prefix(" [")?;
    let (_logger, rest) = split_nonempty(rest, ']')?;
    let rest = rest.strip_prefix(" [")?;
    let (level, rest) = split_nonempty(rest, ']')?;
    let rest = rest.strip_prefix(' ')?;
    let (origin, rest) = split_nonempty(rest, ' ')?;
    let message = rest.strip_prefix("- ")?;
    Some(HeaderLine {
        level,
        origin,
        message,
    })
}

fn split_timestamp(line: &str) -> Option<(&str, &str)> {
    let end = line
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_digit() || *ch == ':' || *ch == '.'))
        .map_or(line.len(), |(index, _)| index);
    if end == 0 {
        return None;
    }
    Some(line.split_at(end))
}

fn split_nonempty(text: &str, delimiter: char) -> Option<(&str, &str)> {
    text.split_once(delimiter).filter(|(head, _)| !head.is_empty())
}

fn split_terminator(line: &str) -> (&str, &str) {
    match line.strip_suffix('\n') {
        Some(content) => (content, "\n"),
        None => (line, ""),
    }
}

#[derive(Debug)]
struct PendingEntry {
    origin: String,
    level: String,
    message: String,
}

impl PendingEntry {
    fn complete(self) -> LogEntry {
        LogEntry::new(self.origin, self.level, self.message.trim_end())
    }
}

#[derive(Debug, Default)]
enum ParserState {
    #[default]
    NoEntry,
    InEntry(PendingEntry),
}

#[derive(Debug, Default)]
struct EntryParser {
    state: ParserState,
    entries: Vec<LogEntry>,
}

impl EntryParser {
    fn push_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        let (content, terminator) = split_terminator(line);
        match match_header(content) {
            Some(header) => self.start_entry(&header, terminator),
            None => self.continue_entry(line),
        }
    }

    fn start_entry(&mut self, header: &HeaderLine<'_>, terminator: &str) {
        let next = PendingEntry {
            origin: header.origin.to_owned(),
            level: header.level.trim().to_uppercase(),
            message: format!("{}{terminator}", header.message),
        };
        let previous = std::mem::replace(&mut self.state, ParserState::InEntry(next));
        if let ParserState::InEntry(done) = previous {
            self.entries.push(done.complete());
        }
    }

    fn continue_entry(&mut self, line: &str) {
        match &mut self.state {
            ParserState::InEntry(pending) => pending.message.push_str(line),
            ParserState::NoEntry => {
                self.state = ParserState::InEntry(PendingEntry {
                    origin: UNMATCHED.to_owned(),
                    level: UNMATCHED.to_owned(),
                    message: line.to_owned(),
                });
            }
        }
    }

    fn finish(mut self) -> Vec<LogEntry> {
        if let ParserState::InEntry(done) = self.state {
            self.entries.push(done.complete());
        }
        self.entries
    }
}

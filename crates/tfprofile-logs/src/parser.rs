use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use tfprofile_types::address::{MODULE_KEYWORD, segments};
use tfprofile_types::{EventKind, Operation, ResourceEvent};

use crate::duration::parse_duration_ms;
use crate::error::{Error, Result};

/// Resource address: no whitespace or commas, except inside `[...]` index keys
const ADDRESS: &str = r"(?P<addr>[^\s\[,]+(?:\[[^\]]*\][^\s\[,]*)*)";

/// Marker on the old object of a `create_before_destroy` replacement
const DEPOSED: &str = r"(?: \(deposed object [^)]+\))?";

const START_LINE: &str = r"^{addr}{deposed}: (?P<verb>Creating|Destroying|Modifying|Reading)\.\.\.";

const PROGRESS_LINE: &str =
    r"^{addr}{deposed}: Still (?P<verb>creating|destroying|modifying|reading)\.\.\. \[[^\]]* elapsed\]";

const COMPLETE_LINE: &str =
    r"^{addr}{deposed}: (?P<verb>Creation|Destruction|Modifications|Read) complete after (?P<duration>\S+)";

fn compile(pattern: &str) -> Regex {
    let pattern = pattern.replace("{addr}", ADDRESS).replace("{deposed}", DEPOSED);
    Regex::new(&pattern).expect("static pattern is valid")
}

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| compile(r"\x1b\[[0-9;]*[A-Za-z]"));

static START: LazyLock<Regex> = LazyLock::new(|| compile(START_LINE));

static PROGRESS: LazyLock<Regex> = LazyLock::new(|| compile(PROGRESS_LINE));

static COMPLETE: LazyLock<Regex> = LazyLock::new(|| compile(COMPLETE_LINE));

static REFRESH: LazyLock<Regex> = LazyLock::new(|| compile(r"^{addr}: Refreshing state\.\.\."));

static ADDRESSED_ERROR: LazyLock<Regex> = LazyLock::new(|| compile(r"^{addr}: Error: "));

static DIAGNOSTIC_SUBJECT: LazyLock<Regex> = LazyLock::new(|| compile(r"^with {addr},?$"));

/// Line-by-line recognizer for Terraform lifecycle phrases
///
/// Most phrases are self-contained, but diagnostics span several lines:
///
/// ```text
/// │ Error: creating EC2 Instance: InvalidAMIID.NotFound
/// │
/// │   with aws_instance.web,
/// │   on main.tf line 12, in resource "aws_instance" "web":
/// ```
///
/// so the parser remembers an open `Error:` block until its `with` line
/// names the resource, or until the block closes. Without colors Terraform
/// drops the box, and the `with` line must then be the first non-blank
/// line after the header.
#[derive(Debug, Default)]
pub struct LogParser {
    /// An `Error:` diagnostic has started but not yet named its resource
    pending_error: Option<Diagnostic>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Diagnostic {
    /// Drawn inside a `╷ … ╵` box
    Boxed,
    /// Plain `-no-color` layout
    Plain,
}

impl LogParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every line of an in-memory log
    pub fn parse_lines<I, S>(lines: I) -> Result<Vec<ResourceEvent>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parser = Self::new();
        let mut events = Vec::new();
        for (index, line) in lines.into_iter().enumerate() {
            if let Some(event) = parser.parse_line(index, line.as_ref())? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Recognize a single line
    ///
    /// Unrecognized lines yield `Ok(None)`. A recognized line with a bad
    /// duration or a malformed address is an error.
    pub fn parse_line(&mut self, index: usize, line: &str) -> Result<Option<ResourceEvent>> {
        let cleaned = strip_ansi(line);
        let text = cleaned.trim();

        if text.starts_with('╵') {
            self.pending_error = None;
            return Ok(None);
        }
        let (text, layout) = match text.strip_prefix('│') {
            Some(inner) => (inner.trim(), Diagnostic::Boxed),
            None => (text, Diagnostic::Plain),
        };
        if text.is_empty() {
            return Ok(None);
        }

        // A plain diagnostic names its subject on the next line or not at all
        let pending = self.pending_error.take();
        if pending == Some(Diagnostic::Boxed) {
            self.pending_error = pending;
        }

        let event = if let Some(caps) = START.captures(text) {
            Some(resource_event(index, &caps, EventKind::StartAction)?)
        } else if let Some(caps) = PROGRESS.captures(text) {
            Some(resource_event(index, &caps, EventKind::Progress)?)
        } else if let Some(caps) = COMPLETE.captures(text) {
            let duration = &caps["duration"];
            let elapsed_ms = parse_duration_ms(duration)
                .ok_or_else(|| Error::parse(index, format!("invalid duration `{duration}`")))?;
            let event = resource_event(index, &caps, EventKind::Complete)?;
            Some(event.with_elapsed(elapsed_ms))
        } else if let Some(caps) = REFRESH.captures(text) {
            Some(resource_event(index, &caps, EventKind::Refresh)?)
        } else if let Some(caps) = ADDRESSED_ERROR.captures(text) {
            Some(resource_event(index, &caps, EventKind::Error)?)
        } else if text.starts_with("Error: ") {
            self.pending_error = Some(layout);
            None
        } else if text.starts_with("Warning: ") {
            self.pending_error = None;
            None
        } else if pending.is_some() {
            match DIAGNOSTIC_SUBJECT.captures(text) {
                Some(caps) => {
                    self.pending_error = None;
                    Some(resource_event(index, &caps, EventKind::Error)?)
                }
                None => None,
            }
        } else {
            None
        };

        if let Some(event) = &event {
            trace!(
                line = index,
                address = %event.address,
                kind = ?event.kind,
                "recognized lifecycle line"
            );
        }
        Ok(event)
    }
}

fn resource_event(index: usize, caps: &Captures<'_>, kind: EventKind) -> Result<ResourceEvent> {
    let address = &caps["addr"];
    validate_address(index, address)?;
    let operation = caps
        .name("verb")
        .map_or(Operation::NoOp, |verb| verb_operation(verb.as_str()));
    Ok(ResourceEvent::new(index, address, kind, operation))
}

fn strip_ansi(line: &str) -> Cow<'_, str> {
    if line.contains('\x1b') {
        ANSI_ESCAPE.replace_all(line, "")
    } else {
        Cow::Borrowed(line)
    }
}

fn verb_operation(verb: &str) -> Operation {
    match verb {
        "Creating" | "creating" | "Creation" => Operation::Create,
        "Destroying" | "destroying" | "Destruction" => Operation::Delete,
        "Modifying" | "modifying" | "Modifications" => Operation::Update,
        "Reading" | "reading" | "Read" => Operation::Read,
        _ => Operation::NoOp,
    }
}

/// Reject empty segments, stray characters, broken index keys and a
/// trailing `module` keyword with no module name after it
fn validate_address(index: usize, address: &str) -> Result<()> {
    let segs = segments(address);

    for seg in &segs {
        let name_end = seg.text.find('[').unwrap_or(seg.text.len());
        let (name, keys) = seg.text.split_at(name_end);
        if name.is_empty() {
            return Err(Error::parse(
                index,
                format!("empty segment in address `{address}`"),
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::parse(
                index,
                format!("invalid segment `{name}` in address `{address}`"),
            ));
        }
        if !index_keys_well_formed(keys) {
            return Err(Error::parse(
                index,
                format!("malformed index `{keys}` in address `{address}`"),
            ));
        }
    }

    let mut i = 0;
    while i < segs.len() && segs[i].text == MODULE_KEYWORD {
        if i + 1 == segs.len() {
            return Err(Error::parse(
                index,
                format!("module call without a name in address `{address}`"),
            ));
        }
        i += 2;
    }

    Ok(())
}

/// `[0]`, `["a"]`, `[0]["b"]`, or nothing
fn index_keys_well_formed(mut rest: &str) -> bool {
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return false;
        };
        let mut in_quotes = false;
        let mut close = None;
        for (i, c) in inner.char_indices() {
            match c {
                '"' => in_quotes = !in_quotes,
                ']' if !in_quotes => {
                    close = Some(i);
                    break;
                }
                _ => {}
            }
        }
        match close {
            Some(0) | None => return false,
            Some(close) => rest = &inner[close + 1..],
        }
    }
    true
}

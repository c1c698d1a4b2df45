//! LHE event parser
//!
//! Walks the XML structure of an LHE document and turns every `<event>`
//! element into an [`Event`]: the weight from the metadata line plus the
//! final-state particles with derived `pt` and rapidity.
//!
//! ## Event body layout
//! ```text
//! <event>
//!  NUP IDPRUP XWGTUP SCALUP AQEDUP AQCDUP          <- metadata, weight is token 2
//!  IDUP ISTUP MOTH1 MOTH2 ICOL1 ICOL2 PX PY PZ E M VTIM SPIN   <- one line per particle
//!  ...
//! </event>
//! ```
//!
//! The 13-column particle layout and the weight position are treated as a fixed
//! contract: token counts are validated on every line and any deviation is an
//! error. Only the character data in front of the first child element belongs
//! to the event record; trailing blocks such as `<rwgt>` are skipped.

use crate::types::{Event, EventDataset, ParseError, ParticleRecord};
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;

/// Number of whitespace separated columns on a particle line
pub const PARTICLE_FIELDS: usize = 13;

/// Token index of the event weight on the metadata line
pub const WEIGHT_TOKEN: usize = 2;

/// Status code of final-state particles
pub const FINAL_STATE: f64 = 1.0;

const EVENT_TAG: &[u8] = b"event";

type ParseResult<T> = std::result::Result<T, ParseError>;

/// Parse a whole LHE document into an event dataset
pub fn parse_document(text: &str) -> ParseResult<EventDataset> {
    EventReader::new(text).collect()
}

/// Parse the body of one `<event>` element
///
/// The body is trimmed first, so line 1 is the metadata line and every later
/// line, blank or not, must be a particle line. Errors are reported against
/// event 1; [`EventReader`] replaces this with the real position of the event
/// in the document.
pub fn parse_event_text(text: &str) -> ParseResult<Event> {
    let mut lines = text
        .trim()
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line));

    let (metadata_line, metadata) = lines
        .next()
        .ok_or(ParseError::MetadataTooShort { event: 1, found: 0 })?;
    let weight = parse_weight(metadata, metadata_line)?;

    let mut particles = Vec::new();
    for (line_no, line) in lines {
        if let Some(record) = parse_particle(line, line_no)? {
            particles.push(record);
        }
    }

    Ok(Event { weight, particles })
}

/// Parse a single particle line
///
/// Returns `Ok(None)` for particles that are not in the final state.
pub fn parse_particle_line(line: &str) -> ParseResult<Option<ParticleRecord>> {
    parse_particle(line, 1)
}

fn parse_weight(metadata: &str, line: usize) -> ParseResult<f64> {
    let tokens: Vec<&str> = metadata.split_whitespace().collect();
    let token = tokens.get(WEIGHT_TOKEN).ok_or(ParseError::MetadataTooShort {
        event: 1,
        found: tokens.len(),
    })?;
    parse_number(token, line)
}

fn parse_particle(line: &str, line_no: usize) -> ParseResult<Option<ParticleRecord>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != PARTICLE_FIELDS {
        return Err(ParseError::FieldCount {
            event: 1,
            line: line_no,
            found: tokens.len(),
        });
    }

    // Every column must be numeric, even the ones we drop
    let mut values = [0.0f64; PARTICLE_FIELDS];
    for (slot, token) in values.iter_mut().zip(&tokens) {
        *slot = parse_number(token, line_no)?;
    }

    let [pid, status, _, _, _, _, px, py, pz, e, m, _, _] = values;
    let record = ParticleRecord::from_momentum(pid, status, px, py, pz, e, m);
    Ok(record.is_final_state().then_some(record))
}

fn parse_number(token: &str, line: usize) -> ParseResult<f64> {
    token.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
        event: 1,
        line,
        token: token.to_string(),
    })
}

/// An `<event>` element whose leading text is still being collected
struct PendingEvent {
    depth: usize,
    text: String,
}

/// Iterator over the events of an LHE document
///
/// Events are yielded in document order, wherever they sit in the element
/// tree. Once the last event has been produced the remainder of the document
/// is still checked for well-formedness, so a truncated or unbalanced file
/// ends the iteration with an error instead of silently stopping. The
/// iterator is fused after the first error.
pub struct EventReader<'a> {
    reader: Reader<&'a [u8]>,
    depth: usize,
    root_seen: bool,
    root_closed: bool,
    pending: Option<PendingEvent>,
    queued: Option<String>,
    emitted: usize,
    finished: bool,
}

impl<'a> EventReader<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        reader.config_mut().check_end_names = true;

        Self {
            reader,
            depth: 0,
            root_seen: false,
            root_closed: false,
            pending: None,
            queued: None,
            emitted: 0,
            finished: false,
        }
    }

    fn malformed(&self, message: impl Into<String>) -> ParseError {
        ParseError::MalformedXml {
            position: self.reader.buffer_position(),
            message: message.into(),
        }
    }

    fn finish_event(&mut self, text: &str) -> ParseResult<Event> {
        self.emitted += 1;
        let index = self.emitted;
        log::trace!("Parsing event {}", index);
        parse_event_text(text).map_err(|e| e.in_event(index))
    }

    /// Account for a new element at the current depth
    fn open_element(&mut self) -> ParseResult<()> {
        if self.depth == 0 {
            if self.root_closed {
                return Err(self.malformed("content after the root element"));
            }
            self.root_seen = true;
        }
        Ok(())
    }

    /// Advance the XML reader until one event body is complete
    fn next_event_text(&mut self) -> ParseResult<Option<String>> {
        if let Some(text) = self.queued.take() {
            return Ok(Some(text));
        }

        loop {
            let xml_event = match self.reader.read_event() {
                Ok(ev) => ev,
                Err(e) => {
                    return Err(ParseError::MalformedXml {
                        position: self.reader.error_position(),
                        message: e.to_string(),
                    })
                }
            };

            match xml_event {
                XmlEvent::Start(start) => {
                    self.open_element()?;
                    let finished = self.pending.take().map(|p| p.text);
                    if start.name().as_ref() == EVENT_TAG {
                        self.pending = Some(PendingEvent {
                            depth: self.depth,
                            text: String::new(),
                        });
                    }
                    self.depth += 1;
                    if finished.is_some() {
                        return Ok(finished);
                    }
                }
                XmlEvent::Empty(empty) => {
                    self.open_element()?;
                    if self.depth == 0 {
                        self.root_closed = true;
                    }
                    let finished = self.pending.take().map(|p| p.text);
                    if empty.name().as_ref() == EVENT_TAG {
                        // `<event/>` has no body at all
                        match finished {
                            Some(text) => {
                                self.queued = Some(String::new());
                                return Ok(Some(text));
                            }
                            None => return Ok(Some(String::new())),
                        }
                    }
                    if finished.is_some() {
                        return Ok(finished);
                    }
                }
                XmlEvent::End(_) => {
                    self.depth = match self.depth.checked_sub(1) {
                        Some(depth) => depth,
                        None => return Err(self.malformed("unmatched closing tag")),
                    };
                    if self.depth == 0 {
                        self.root_closed = true;
                    }
                    if self.pending.as_ref().is_some_and(|p| p.depth == self.depth) {
                        return Ok(self.pending.take().map(|p| p.text));
                    }
                }
                XmlEvent::Text(text) => {
                    if self.depth == 0 {
                        if !text.iter().all(u8::is_ascii_whitespace) {
                            return Err(self.malformed("text outside the root element"));
                        }
                        continue;
                    }
                    if let Some(pending) = self.pending.as_mut() {
                        let unescaped = text.unescape().map_err(|e| ParseError::MalformedXml {
                            position: self.reader.buffer_position(),
                            message: e.to_string(),
                        })?;
                        pending.text.push_str(&unescaped);
                    }
                }
                XmlEvent::CData(cdata) => {
                    if self.depth == 0 {
                        return Err(self.malformed("CDATA outside the root element"));
                    }
                    if let Some(pending) = self.pending.as_mut() {
                        let raw = std::str::from_utf8(&cdata).map_err(|e| {
                            ParseError::MalformedXml {
                                position: self.reader.buffer_position(),
                                message: e.to_string(),
                            }
                        })?;
                        pending.text.push_str(raw);
                    }
                }
                XmlEvent::Comment(_) | XmlEvent::PI(_) => {
                    // These are child nodes too: the event's leading text ends here
                    if let Some(pending) = self.pending.take() {
                        return Ok(Some(pending.text));
                    }
                }
                XmlEvent::Eof => {
                    if self.depth > 0 {
                        return Err(self.malformed(format!(
                            "unexpected end of document, {} element(s) left open",
                            self.depth
                        )));
                    }
                    if !self.root_seen {
                        return Err(ParseError::MissingRoot);
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

impl<'a> Iterator for EventReader<'a> {
    type Item = ParseResult<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = match self.next_event_text() {
            Ok(Some(text)) => Some(self.finish_event(&text)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        };

        if !matches!(result, Some(Ok(_))) {
            self.finished = true;
        }
        result
    }
}

impl std::iter::FusedIterator for EventReader<'_> {}

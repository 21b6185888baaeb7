// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The byte-level parser (C3). One state is active at a time; every
//! transition is a small pure function from `(state, byte)` to
//! `(next_state, events)`. No indirect function-pointer dispatch: the driver
//! is a single `match` on the current state, per the design note against
//! hot-path unpredictability.

/// A CSI sequence mid-accumulation: prefix (`?`/`<`/`=`/`>`, first parameter
/// byte only), the raw numeric/`;`/`:` body, and a single intermediate byte.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CsiAccum {
    pub prefix: Option<u8>,
    pub params: Vec<u8>,
    pub intermediate: Option<u8>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct OscAccum {
    pub buf: Vec<u8>,
    pending_esc: bool,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
struct StringConsumeAccum {
    pending_esc: bool,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParserState {
    Ground,
    Escape,
    CsiParams(CsiAccum),
    OscString(OscAccum),
    /// DCS/SOS/PM/APC body: discarded, only the terminator matters.
    StringConsume(bool),
    Utf8 { expected: u8, buf: Vec<u8> },
    /// Non-final intermediate bytes after `ESC`, e.g. the `#` in `ESC # 8`.
    Nf(Vec<u8>),
}

impl Default for ParserState {
    fn default() -> Self {
        Self::Ground
    }
}

/// One parsed unit of work handed to the dispatcher. Numeric parameter
/// splitting (`;`/`:`) happens in the dispatcher, not here (§4.2); the
/// parser's job ends at recognizing sequence boundaries.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParserEvent {
    Print(char),
    Bell,
    Backspace,
    Tab,
    LineFeed,
    CarriageReturn,
    /// A single-byte `ESC x` final: `D`, `E`, `M`, `H`, `7`, `8`, `Z`, `c`,
    /// `6`, `9`.
    EscapeFinal(u8),
    Csi {
        prefix: Option<u8>,
        params: Vec<u8>,
        intermediate: Option<u8>,
        final_byte: u8,
    },
    Osc(Vec<u8>),
    Nf {
        intermediate: Vec<u8>,
        final_byte: u8,
    },
}

/// Owns the current parser state and turns an application byte stream into
/// a flat sequence of [`ParserEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    state: ParserState,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &ParserState {
        &self.state
    }

    /// Reset to `Ground`, discarding any in-progress sequence. Used by
    /// `Stop` and by an unterminated-OSC/DCS recovery path (§8).
    pub fn reset(&mut self) {
        if !matches!(self.state, ParserState::Ground) {
            debug!("parser reset from {:?} to Ground", self.state);
        }
        self.state = ParserState::Ground;
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ParserEvent> {
        let mut events = Vec::new();
        for &byte in bytes {
            self.step(byte, &mut events);
        }
        events
    }

    fn step(&mut self, byte: u8, events: &mut Vec<ParserEvent>) {
        let state = std::mem::replace(&mut self.state, ParserState::Ground);
        self.state = match state {
            ParserState::Ground => Self::ground_step(byte, events),
            ParserState::Escape => Self::escape_step(byte, events),
            ParserState::CsiParams(accum) => Self::csi_step(accum, byte, events),
            ParserState::OscString(accum) => Self::osc_step(accum, byte, events),
            ParserState::StringConsume(pending_esc) => Self::string_consume_step(pending_esc, byte),
            ParserState::Utf8 { expected, buf } => Self::utf8_step(expected, buf, byte, events),
            ParserState::Nf(intermediate) => Self::nf_step(intermediate, byte, events),
        };
    }

    fn ground_step(byte: u8, events: &mut Vec<ParserEvent>) -> ParserState {
        match byte {
            0x20..=0x7E => {
                events.push(ParserEvent::Print(byte as char));
                ParserState::Ground
            }
            0x07 => {
                events.push(ParserEvent::Bell);
                ParserState::Ground
            }
            0x08 => {
                events.push(ParserEvent::Backspace);
                ParserState::Ground
            }
            0x09 => {
                events.push(ParserEvent::Tab);
                ParserState::Ground
            }
            0x0A..=0x0C => {
                events.push(ParserEvent::LineFeed);
                ParserState::Ground
            }
            0x0D => {
                events.push(ParserEvent::CarriageReturn);
                ParserState::Ground
            }
            0x1B => ParserState::Escape,
            0x0E | 0x0F | 0x7F => ParserState::Ground,
            0xC2..=0xDF => ParserState::Utf8 {
                expected: 1,
                buf: vec![byte],
            },
            0xE0..=0xEF => ParserState::Utf8 {
                expected: 2,
                buf: vec![byte],
            },
            0xF0..=0xF4 => ParserState::Utf8 {
                expected: 3,
                buf: vec![byte],
            },
            0x80..=0x9F => Self::escape_step(byte - 0x40, events),
            _ => {
                trace!("ground: unrecognized byte {byte:#04x}, emitting Bell");
                events.push(ParserEvent::Bell);
                ParserState::Ground
            }
        }
    }

    fn escape_step(byte: u8, events: &mut Vec<ParserEvent>) -> ParserState {
        match byte {
            0x1B => ParserState::Escape,
            b'D' | b'E' | b'M' | b'H' | b'7' | b'8' | b'Z' | b'c' | b'6' | b'9' => {
                events.push(ParserEvent::EscapeFinal(byte));
                ParserState::Ground
            }
            b'[' => ParserState::CsiParams(CsiAccum::default()),
            b']' => ParserState::OscString(OscAccum::default()),
            b'P' | b'X' | 0x5E | 0x5F => ParserState::StringConsume(false),
            0x20..=0x2F => ParserState::Nf(vec![byte]),
            _ => ParserState::Ground,
        }
    }

    fn csi_step(mut accum: CsiAccum, byte: u8, events: &mut Vec<ParserEvent>) -> ParserState {
        match byte {
            0x3C..=0x3F if accum.prefix.is_none() && accum.params.is_empty() => {
                accum.prefix = Some(byte);
                ParserState::CsiParams(accum)
            }
            0x30..=0x3F => {
                accum.params.push(byte);
                ParserState::CsiParams(accum)
            }
            0x20..=0x2F => {
                accum.intermediate = Some(byte);
                ParserState::CsiParams(accum)
            }
            0x40..=0x7E => {
                events.push(ParserEvent::Csi {
                    prefix: accum.prefix,
                    params: accum.params,
                    intermediate: accum.intermediate,
                    final_byte: byte,
                });
                ParserState::Ground
            }
            _ => {
                warn!("malformed CSI sequence terminated by {byte:#04x}; discarding and beeping");
                events.push(ParserEvent::Bell);
                ParserState::Ground
            }
        }
    }

    fn osc_step(mut accum: OscAccum, byte: u8, events: &mut Vec<ParserEvent>) -> ParserState {
        if accum.pending_esc {
            return if byte == b'\\' {
                events.push(ParserEvent::Osc(accum.buf));
                ParserState::Ground
            } else {
                Self::escape_step(byte, events)
            };
        }
        match byte {
            0x07 => {
                events.push(ParserEvent::Osc(accum.buf));
                ParserState::Ground
            }
            0x9C => {
                events.push(ParserEvent::Osc(accum.buf));
                ParserState::Ground
            }
            0x1B => {
                accum.pending_esc = true;
                ParserState::OscString(accum)
            }
            _ => {
                accum.buf.push(byte);
                ParserState::OscString(accum)
            }
        }
    }

    fn string_consume_step(pending_esc: bool, byte: u8) -> ParserState {
        if pending_esc {
            return if byte == b'\\' {
                ParserState::Ground
            } else {
                ParserState::Escape
            };
        }
        match byte {
            0x07 | 0x9C => ParserState::Ground,
            0x1B => ParserState::StringConsume(true),
            _ => ParserState::StringConsume(false),
        }
    }

    fn utf8_step(expected: u8, mut buf: Vec<u8>, byte: u8, events: &mut Vec<ParserEvent>) -> ParserState {
        if byte & 0xC0 != 0x80 {
            warn!("malformed UTF-8 continuation byte {byte:#04x}; recovering to Ground");
            events.push(ParserEvent::Bell);
            return Self::ground_step(byte, events);
        }
        buf.push(byte);
        if buf.len() == usize::from(expected) + 1 {
            match std::str::from_utf8(&buf).ok().and_then(|s| s.chars().next()) {
                Some(c) => events.push(ParserEvent::Print(c)),
                None => {
                    warn!("UTF-8 sequence {buf:?} did not decode to a char");
                    events.push(ParserEvent::Bell);
                }
            }
            ParserState::Ground
        } else {
            ParserState::Utf8 { expected, buf }
        }
    }

    fn nf_step(mut intermediate: Vec<u8>, byte: u8, events: &mut Vec<ParserEvent>) -> ParserState {
        match byte {
            0x20..=0x2F => {
                intermediate.push(byte);
                ParserState::Nf(intermediate)
            }
            _ => {
                events.push(ParserEvent::Nf {
                    intermediate,
                    final_byte: byte,
                });
                ParserState::Ground
            }
        }
    }
}

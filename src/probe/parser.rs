//! Incremental parser for the terminal's replies to palette queries.
//!
//! A color report looks like `ESC ] 4 ; <index> ; rgb:rrrr/gggg/bbbb ST`,
//! where ST is BEL or `ESC \`. The device status report that closes a batch
//! comes back as `ESC [ 0 n`.

use crate::color::Rgb;

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// Longest payload accepted before a reply is treated as garbage.
const MAX_PAYLOAD: usize = 64;
/// Longest index accepted (three decimal digits).
const MAX_INDEX_DIGITS: u8 = 3;

/// One complete unit of terminal input, as recognized by [`ReplyParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A color report for `index`. Payloads in an unknown color space decode
    /// to black.
    Color { index: u8, rgb: Rgb },
    /// The status report sent after the last query. Nothing else follows.
    StatusReport,
    /// An escape sequence that is neither a color report nor a status report.
    Unexpected([u8; 2]),
    /// A color report whose index or payload could not be read. Its data is
    /// dropped and parsing carries on.
    Discarded(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    AwaitIntroducer,
    AwaitColorTag { first: Option<u8> },
    AwaitSeparator,
    AwaitIndex { value: u16, digits: u8 },
    AwaitPayload { index: Option<u8>, buf: Vec<u8> },
    Done,
}

/// Byte-at-a-time state machine over the reply stream.
///
/// Once a [`Reply::StatusReport`] or [`Reply::Unexpected`] has been produced
/// the parser is finished and ignores further input.
#[derive(Debug)]
pub struct ReplyParser {
    state: State,
}

impl ReplyParser {
    pub fn new() -> Self {
        Self {
            state: State::AwaitIntroducer,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Feed one byte, returning a reply when it completes one.
    pub fn advance(&mut self, byte: u8) -> Option<Reply> {
        let state = std::mem::replace(&mut self.state, State::AwaitIntroducer);
        let (next, reply) = match state {
            State::AwaitIntroducer => {
                if byte == ESC {
                    (State::AwaitColorTag { first: None }, None)
                } else {
                    (State::AwaitIntroducer, None)
                }
            }
            State::AwaitColorTag { first: None } => (
                State::AwaitColorTag {
                    first: Some(byte),
                },
                None,
            ),
            State::AwaitColorTag { first: Some(first) } => match [first, byte] {
                [b']', b'4'] => (State::AwaitSeparator, None),
                [b'[', b'0'] => (State::Done, Some(Reply::StatusReport)),
                tail => (State::Done, Some(Reply::Unexpected(tail))),
            },
            State::AwaitSeparator => {
                if byte == b';' {
                    (State::AwaitIndex { value: 0, digits: 0 }, None)
                } else {
                    (
                        resync(byte),
                        Some(Reply::Discarded("missing separator after color tag")),
                    )
                }
            }
            State::AwaitIndex { value, digits } => match byte {
                b'0'..=b'9' if digits < MAX_INDEX_DIGITS => (
                    State::AwaitIndex {
                        value: value * 10 + u16::from(byte - b'0'),
                        digits: digits + 1,
                    },
                    None,
                ),
                b';' if digits > 0 => (
                    State::AwaitPayload {
                        index: u8::try_from(value).ok(),
                        buf: Vec::new(),
                    },
                    None,
                ),
                _ => (
                    resync(byte),
                    Some(Reply::Discarded("malformed palette index")),
                ),
            },
            State::AwaitPayload { index, mut buf } => {
                if byte == BEL || byte == ESC {
                    let reply = match index {
                        Some(index) => Reply::Color {
                            index,
                            rgb: decode_payload(&buf),
                        },
                        None => Reply::Discarded("palette index out of range"),
                    };
                    (State::AwaitIntroducer, Some(reply))
                } else if buf.len() >= MAX_PAYLOAD {
                    (
                        State::AwaitIntroducer,
                        Some(Reply::Discarded("color payload too long")),
                    )
                } else {
                    buf.push(byte);
                    (State::AwaitPayload { index, buf }, None)
                }
            }
            State::Done => (State::Done, None),
        };
        self.state = next;
        reply
    }
}

/// State to resume in after abandoning a reply on `byte`. An ESC that cuts a
/// reply short already introduces the next one.
fn resync(byte: u8) -> State {
    if byte == ESC {
        State::AwaitColorTag { first: None }
    } else {
        State::AwaitIntroducer
    }
}

impl Default for ReplyParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a `<space>:<components>` payload.
///
/// Only the `rgb` space is understood; each of its three `/`-separated
/// components contributes its two most significant hex digits. Anything else
/// decodes to black.
pub fn decode_payload(payload: &[u8]) -> Rgb {
    let Ok(text) = std::str::from_utf8(payload) else {
        return Rgb::BLACK;
    };
    let Some(("rgb", components)) = text.split_once(':') else {
        return Rgb::BLACK;
    };
    let mut channels = components.split('/').map(component_high_byte);
    match (channels.next(), channels.next(), channels.next()) {
        (Some(Some(r)), Some(Some(g)), Some(Some(b))) => Rgb::new(r, g, b),
        _ => Rgb::BLACK,
    }
}

fn component_high_byte(component: &str) -> Option<u8> {
    let high = component.get(..2).unwrap_or(component);
    if high.is_empty() || !high.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(high, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(parser: &mut ReplyParser, input: &[u8]) -> Vec<Reply> {
        input.iter().filter_map(|&b| parser.advance(b)).collect()
    }

    #[test]
    fn parses_bel_terminated_report() {
        let mut parser = ReplyParser::new();
        let replies = feed(&mut parser, b"\x1b]4;1;rgb:cdcd/0000/0000\x07");
        assert_eq!(
            replies,
            vec![Reply::Color {
                index: 1,
                rgb: Rgb::new(0xcd, 0, 0)
            }]
        );
        assert!(!parser.is_done());
    }

    #[test]
    fn parses_st_terminated_report() {
        let mut parser = ReplyParser::new();
        let replies = feed(
            &mut parser,
            b"\x1b]4;255;rgb:eeee/eeee/eeee\x1b\\\x1b]4;0;rgb:0000/0000/0000\x1b\\",
        );
        assert_eq!(
            replies,
            vec![
                Reply::Color {
                    index: 255,
                    rgb: Rgb::grey(0xee)
                },
                Reply::Color {
                    index: 0,
                    rgb: Rgb::BLACK
                },
            ]
        );
    }

    #[test]
    fn status_report_finishes() {
        let mut parser = ReplyParser::new();
        let replies = feed(&mut parser, b"\x1b[0n\x1b]4;3;rgb:ff/ff/ff\x07");
        assert_eq!(replies, vec![Reply::StatusReport]);
        assert!(parser.is_done());
    }

    #[test]
    fn unexpected_tail_finishes() {
        let mut parser = ReplyParser::new();
        let replies = feed(&mut parser, b"\x1b]5;1;rgb:ff/ff/ff\x07");
        assert_eq!(replies, vec![Reply::Unexpected(*b"]5")]);
        assert!(parser.is_done());
    }

    #[test]
    fn noise_before_introducer_is_skipped() {
        let mut parser = ReplyParser::new();
        let replies = feed(&mut parser, b"abc\r\n\x1b]4;7;rgb:e5e5/e5e5/e5e5\x07");
        assert_eq!(
            replies,
            vec![Reply::Color {
                index: 7,
                rgb: Rgb::grey(0xe5)
            }]
        );
    }

    #[test]
    fn out_of_range_index_is_discarded() {
        let mut parser = ReplyParser::new();
        let replies = feed(&mut parser, b"\x1b]4;300;rgb:ff/ff/ff\x07\x1b]4;2;rgb:00/cd/00\x07");
        assert_eq!(
            replies,
            vec![
                Reply::Discarded("palette index out of range"),
                Reply::Color {
                    index: 2,
                    rgb: Rgb::new(0, 0xcd, 0)
                },
            ]
        );
    }

    #[test]
    fn non_numeric_index_is_discarded() {
        let mut parser = ReplyParser::new();
        let replies = feed(&mut parser, b"\x1b]4;x;rgb:ff/ff/ff\x07");
        assert_eq!(replies, vec![Reply::Discarded("malformed palette index")]);
        assert!(!parser.is_done());

        let replies = feed(&mut parser, b"\x1b]4;;rgb:ff/ff/ff\x07");
        assert_eq!(replies, vec![Reply::Discarded("malformed palette index")]);

        let replies = feed(&mut parser, b"\x1b]4;0001;rgb:ff/ff/ff\x07");
        assert_eq!(replies, vec![Reply::Discarded("malformed palette index")]);
    }

    #[test]
    fn escape_cutting_a_reply_short_starts_the_next() {
        let mut parser = ReplyParser::new();
        let replies = feed(
            &mut parser,
            b"\x1b]4\x1b]4;1;rgb:cdcd/0000/0000\x07\x1b]4;12\x1b]4;2;rgb:00/cd/00\x07\x1b[0n",
        );
        assert_eq!(
            replies,
            vec![
                Reply::Discarded("missing separator after color tag"),
                Reply::Color {
                    index: 1,
                    rgb: Rgb::new(0xcd, 0, 0)
                },
                Reply::Discarded("malformed palette index"),
                Reply::Color {
                    index: 2,
                    rgb: Rgb::new(0, 0xcd, 0)
                },
                Reply::StatusReport,
            ]
        );
    }

    #[test]
    fn overlong_payload_is_discarded() {
        let mut parser = ReplyParser::new();
        let mut input = b"\x1b]4;5;".to_vec();
        input.extend(std::iter::repeat(b'a').take(MAX_PAYLOAD + 10));
        input.extend(b"\x07\x1b]4;6;rgb:00/cdcd/cd\x07");
        let replies = feed(&mut parser, &input);
        assert_eq!(
            replies,
            vec![
                Reply::Discarded("color payload too long"),
                Reply::Color {
                    index: 6,
                    rgb: Rgb::new(0, 0xcd, 0xcd)
                },
            ]
        );
    }

    #[test]
    fn payload_decoding() {
        assert_eq!(decode_payload(b"rgb:1234/5678/9abc"), Rgb::new(0x12, 0x56, 0x9a));
        assert_eq!(decode_payload(b"rgb:f/8/0"), Rgb::new(0xf, 0x8, 0x0));
        assert_eq!(decode_payload(b"rgba:ffff/ffff/ffff/ffff"), Rgb::BLACK);
        assert_eq!(decode_payload(b"cmy:0/0/0"), Rgb::BLACK);
        assert_eq!(decode_payload(b"rgb:ffff/ffff"), Rgb::BLACK);
        assert_eq!(decode_payload(b"rgb:zz/00/00"), Rgb::BLACK);
        assert_eq!(decode_payload(b""), Rgb::BLACK);
    }
}

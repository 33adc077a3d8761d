// keymap.rs

use bytes::{Buf, BytesMut};

use crate::command::Command;
use crate::token::{Constant, Operation, Token};

const ESC: u8 = 0x1b;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Interrupt,
    Eof,
}

/// Decode raw terminal bytes into keys. An escape sequence that has not
/// been fully received stays in `buf` for the next read.
pub fn decode_keys(buf: &mut BytesMut) -> Vec<Key> {
    let mut keys = Vec::new();
    while let Some(&byte) = buf.first() {
        match byte {
            ESC => match buf.get(1) {
                Some(b'[') | Some(b'O') => {
                    // CSI/SS3: skip up to and including the final byte
                    match buf[2..].iter().position(|b| (0x40..=0x7e).contains(b)) {
                        Some(pos) => buf.advance(2 + pos + 1),
                        None => break,
                    }
                }
                _ => {
                    keys.push(Key::Escape);
                    buf.advance(1);
                }
            },
            b'\r' | b'\n' => {
                keys.push(Key::Enter);
                buf.advance(1);
            }
            0x7f | 0x08 => {
                keys.push(Key::Backspace);
                buf.advance(1);
            }
            0x03 => {
                keys.push(Key::Interrupt);
                buf.advance(1);
            }
            0x04 => {
                keys.push(Key::Eof);
                buf.advance(1);
            }
            0x20..=0x7e => {
                keys.push(Key::Char(byte as char));
                buf.advance(1);
            }
            _ => buf.advance(1),
        }
    }
    keys
}

/// Key → command table for the keypad front end.
#[derive(Debug, Default)]
pub struct Keymap {
    recall_pending: bool,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(&mut self, key: Key) -> Option<Command> {
        if std::mem::take(&mut self.recall_pending) {
            return match key {
                Key::Char(c) => c.to_digit(10).map(|n| Command::Recall(n as usize)),
                Key::Interrupt | Key::Eof => Some(Command::Quit),
                _ => None,
            };
        }
        match key {
            Key::Enter => Some(Command::Submit),
            Key::Escape => Some(Command::Clear),
            Key::Backspace => Some(Command::DeleteLast),
            Key::Interrupt | Key::Eof => Some(Command::Quit),
            Key::Char(c) => self.char_command(c),
        }
    }

    fn char_command(&mut self, c: char) -> Option<Command> {
        match c {
            '=' => Some(Command::Submit),
            'c' | 'C' => Some(Command::Clear),
            's' | 'S' => Some(Command::ToggleMode),
            'p' => Some(Command::Append(Token::Constant(Constant::Pi))),
            'e' => Some(Command::Append(Token::Constant(Constant::E))),
            'r' => {
                self.recall_pending = true;
                None
            }
            _ => Token::symbol(c)
                .map(Command::Append)
                .or_else(|| Operation::from_key(c).map(Command::Scientific)),
        }
    }
}

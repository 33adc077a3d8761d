// parser.rs

use crate::command::Command;
use crate::error::ParseError;
use crate::token::{Constant, Operation, Token};

/// Words understood by the line front end, besides operation names.
pub const COMMAND_WORDS: &[&str] = &[
    "clear", "del", "mode", "history", "recall", "quit", "exit", "pi", "e",
];

#[derive(Debug, PartialEq)]
enum Lexeme {
    Symbol(Token),
    Word(String),
    Equals,
    Space,
}

fn lex(line: &str) -> Result<Vec<Lexeme>, ParseError> {
    let mut lexemes = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => {
                if lexemes.last() != Some(&Lexeme::Space) {
                    lexemes.push(Lexeme::Space);
                }
            }
            '=' => lexemes.push(Lexeme::Equals),
            'π' => lexemes.push(Lexeme::Word("pi".to_string())),
            c if c.is_ascii_alphabetic() => {
                let mut word = c.to_ascii_lowercase().to_string();
                while let Some(&next) = chars.peek() {
                    if !next.is_ascii_alphabetic() {
                        break;
                    }
                    word.push(next.to_ascii_lowercase());
                    chars.next();
                }
                lexemes.push(Lexeme::Word(word));
            }
            c => match Token::symbol(c) {
                Some(token) => lexemes.push(Lexeme::Symbol(token)),
                None => return Err(ParseError::UnexpectedChar(c)),
            },
        }
    }
    Ok(lexemes)
}

/// Turn one input line into controller commands.
///
/// Expression characters append, `=` and operation names run a request.
/// A line that appended something and does not end in a request gets an
/// implicit submit.
pub fn parse_line(line: &str) -> Result<Vec<Command>, ParseError> {
    let mut commands = Vec::new();
    let mut lexemes = lex(line)?.into_iter().peekable();
    let mut dangling = false;
    while let Some(lexeme) = lexemes.next() {
        let command = match lexeme {
            Lexeme::Space => continue,
            Lexeme::Symbol(token) => Command::Append(token),
            Lexeme::Equals => Command::Submit,
            Lexeme::Word(word) => {
                if let Some(constant) = Constant::from_name(&word) {
                    Command::Append(Token::Constant(constant))
                } else if let Ok(operation) = word.parse::<Operation>() {
                    Command::Scientific(operation)
                } else {
                    match word.as_str() {
                        "clear" | "c" => Command::Clear,
                        "del" => Command::DeleteLast,
                        "mode" => Command::ToggleMode,
                        "history" => Command::ShowHistory,
                        "quit" | "exit" => Command::Quit,
                        "recall" => Command::Recall(recall_index(&mut lexemes)?),
                        _ => return Err(ParseError::UnknownWord(word)),
                    }
                }
            }
        };
        match command {
            Command::Append(_) => dangling = true,
            Command::Submit | Command::Scientific(_) | Command::Recall(_) | Command::Clear => {
                dangling = false
            }
            _ => {}
        }
        commands.push(command);
    }
    if dangling {
        commands.push(Command::Submit);
    }
    Ok(commands)
}

fn recall_index<I>(lexemes: &mut std::iter::Peekable<I>) -> Result<usize, ParseError>
where
    I: Iterator<Item = Lexeme>,
{
    lexemes.next_if_eq(&Lexeme::Space);
    let mut digits = String::new();
    while let Some(Lexeme::Symbol(Token::Symbol(c))) = lexemes.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(*c);
        lexemes.next();
    }
    if digits.is_empty() {
        return Err(ParseError::MissingIndex);
    }
    digits.parse().map_err(|_| ParseError::IndexTooLarge(digits))
}

// token.rs

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::UnknownOperation;

/// Characters that may be typed into the input buffer.
pub const ALLOWED_SYMBOLS: &str = "0123456789.+-*/()";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    /// Literal decimal text sent to the evaluator.
    pub fn text(self) -> String {
        match self {
            Constant::Pi => std::f64::consts::PI.to_string(),
            Constant::E => std::f64::consts::E.to_string(),
        }
    }

    /// What the display shows in place of the digits.
    pub fn symbol(self) -> &'static str {
        match self {
            Constant::Pi => "π",
            Constant::E => "e",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" | "π" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }
}

/// One appendable unit of input. Build symbols with [`Token::symbol`],
/// which checks them against [`ALLOWED_SYMBOLS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Symbol(char),
    Constant(Constant),
}

impl Token {
    pub fn symbol(c: char) -> Option<Self> {
        ALLOWED_SYMBOLS.contains(c).then_some(Token::Symbol(c))
    }

    pub fn text(self) -> String {
        match self {
            Token::Symbol(c) => c.to_string(),
            Token::Constant(k) => k.text(),
        }
    }

    pub fn display(self) -> String {
        match self {
            Token::Symbol(c) => c.to_string(),
            Token::Constant(k) => k.symbol().to_string(),
        }
    }
}

/// Scientific operations understood by the evaluation service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Sin,
    Cos,
    Tan,
    Sqrt,
    Log,
    Ln,
    Square,
    Factorial,
    Abs,
    Ceil,
    Floor,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::Sin,
        Operation::Cos,
        Operation::Tan,
        Operation::Sqrt,
        Operation::Log,
        Operation::Ln,
        Operation::Square,
        Operation::Factorial,
        Operation::Abs,
        Operation::Ceil,
        Operation::Floor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Sin => "sin",
            Operation::Cos => "cos",
            Operation::Tan => "tan",
            Operation::Sqrt => "sqrt",
            Operation::Log => "log",
            Operation::Ln => "ln",
            Operation::Square => "square",
            Operation::Factorial => "factorial",
            Operation::Abs => "abs",
            Operation::Ceil => "ceil",
            Operation::Floor => "floor",
        }
    }

    /// Keypad key bound to this operation in scientific mode.
    pub fn key(self) -> char {
        match self {
            Operation::Sin => 'n',
            Operation::Cos => 'o',
            Operation::Tan => 't',
            Operation::Sqrt => 'q',
            Operation::Log => 'g',
            Operation::Ln => 'l',
            Operation::Square => 'w',
            Operation::Factorial => '!',
            Operation::Abs => 'a',
            Operation::Ceil => 'u',
            Operation::Floor => 'd',
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        Operation::ALL.into_iter().find(|op| op.key() == key)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

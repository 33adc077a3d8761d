// command.rs

use crate::token::{Operation, Token};

/// What a front end asks the controller to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Append(Token),
    DeleteLast,
    Clear,
    Submit,
    Scientific(Operation),
    ToggleMode,
    Recall(usize),
    ShowHistory,
    Quit,
}

//! Console commands
//!
//! A line-oriented front-end over [`ContactBook`](crate::services::ContactBook):
//! - `Command`: parsing of a single input line
//! - `console`: the read/execute/print loop and the delete confirmation prompt

pub mod console;

pub use console::Console;

use crate::models::{ContactField, Theme};
use std::str::FromStr;

/// A single console instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Search(String),
    /// 1-based position in the visible list
    Select(usize),
    Show,
    Add,
    Edit,
    Set(ContactField, String),
    Save,
    Cancel,
    Delete,
    Theme(Option<Theme>),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let line = s.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_lowercase().as_str() {
            "list" | "ls" => Ok(Command::List),
            // Search keeps the raw remainder; an empty one clears the filter
            "search" | "find" => Ok(Command::Search(rest.to_string())),
            "select" | "sel" => {
                let position: usize = rest
                    .parse()
                    .map_err(|_| format!("Invalid position: '{}'", rest))?;
                if position == 0 {
                    return Err("Positions start at 1".to_string());
                }
                Ok(Command::Select(position))
            }
            "show" => Ok(Command::Show),
            "add" | "new" => Ok(Command::Add),
            "edit" => Ok(Command::Edit),
            "set" => {
                let (field, value) = match rest.split_once(char::is_whitespace) {
                    Some((field, value)) => (field, value.trim()),
                    None => (rest, ""),
                };
                if field.is_empty() {
                    return Err("Usage: set <field> <value>".to_string());
                }
                Ok(Command::Set(field.parse()?, value.to_string()))
            }
            "save" => Ok(Command::Save),
            "cancel" => Ok(Command::Cancel),
            "delete" | "rm" => Ok(Command::Delete),
            "theme" => {
                if rest.is_empty() {
                    Ok(Command::Theme(None))
                } else {
                    Ok(Command::Theme(Some(rest.parse()?)))
                }
            }
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err("Empty command".to_string()),
            other => Err(format!("Unknown command '{}'. Type 'help'.", other)),
        }
    }
}

pub const HELP_TEXT: &str = "\
Commands:
  list                  show contacts matching the current search
  search [text]         filter contacts; no text clears the filter
  select <n>            select the n-th listed contact
  show                  show the selected contact
  add                   start a new contact
  edit                  edit the selected contact
  set <field> <value>   change a field while adding or editing
                        (first, last, phone, email, address, notes)
  save                  validate and save the contact being edited
  cancel                discard the current edit
  delete                delete the selected contact
  theme [name]          show or change the theme (Default, Dark, Hacker)
  help                  show this text
  quit                  leave";

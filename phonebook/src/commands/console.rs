//! Interactive console loop
//!
//! Reads commands line by line, drives the contact book and prints the
//! outcome. Errors from book operations are printed and the loop goes on;
//! only I/O failures on the console itself end it.

use super::{Command, HELP_TEXT};
use crate::error::{AppError, Result};
use crate::models::{Contact, ContactField, Theme};
use crate::services::{BookEvent, ContactBook};
use std::io::{BufRead, Write};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Console front-end over any line reader and writer
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until `quit` or end of input
    pub async fn run(&mut self, book: &mut ContactBook) -> Result<()> {
        writeln!(self.output, "Phonebook - theme {}. Type 'help' for commands.", book.theme())?;
        self.report_events(book)?;
        self.print_welcome_or_list(book)?;

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => {
                    if let Err(e) = self.execute(book, command).await {
                        self.print_error(&e)?;
                    }
                }
                Err(message) => writeln!(self.output, "{}", message)?,
            }

            self.report_events(book)?;
        }

        tracing::info!("Console closed");
        Ok(())
    }

    async fn execute(&mut self, book: &mut ContactBook, command: Command) -> Result<()> {
        match command {
            Command::List => self.print_list(book)?,
            Command::Search(text) => {
                book.set_query(text);
                self.print_list(book)?;
            }
            Command::Select(position) => {
                let id = book
                    .visible()
                    .nth(position - 1)
                    .map(Contact::id)
                    .ok_or_else(|| {
                        AppError::Generic(format!("No contact at position {}", position))
                    })?;
                book.select(Some(id))?;
                self.print_details(book)?;
            }
            Command::Show => self.print_details(book)?,
            Command::Add => {
                book.begin_add()?;
                writeln!(
                    self.output,
                    "New contact. Use 'set <field> <value>', then 'save' or 'cancel'."
                )?;
            }
            Command::Edit => {
                book.begin_edit()?;
                writeln!(
                    self.output,
                    "Editing. Use 'set <field> <value>', then 'save' or 'cancel'."
                )?;
                self.print_details(book)?;
            }
            Command::Set(field, value) => {
                let buffer = book.edit_buffer_mut().ok_or_else(|| {
                    AppError::InvalidState("Use 'add' or 'edit' first".to_string())
                })?;
                buffer.set_field(field, value);
            }
            Command::Save => {
                let id = book.save().await?;
                let name = book.get(id).map(Contact::to_string).unwrap_or_default();
                writeln!(self.output, "Saved {}", name)?;
            }
            Command::Cancel => {
                book.cancel();
                writeln!(self.output, "Changes discarded")?;
            }
            Command::Delete => {
                let input = &mut self.input;
                let output = &mut self.output;
                let deleted = book
                    .delete_selected(|contact| confirm_delete(input, output, contact))
                    .await?;
                if deleted {
                    writeln!(self.output, "Contact deleted")?;
                    self.print_welcome_or_list(book)?;
                }
            }
            Command::Theme(None) => {
                let names: Vec<_> = Theme::ALL.iter().map(|t| t.as_str()).collect();
                writeln!(
                    self.output,
                    "Theme: {} (available: {})",
                    book.theme(),
                    names.join(", ")
                )?;
            }
            Command::Theme(Some(theme)) => book.set_theme(theme).await,
            Command::Help => writeln!(self.output, "{}", HELP_TEXT)?,
            Command::Quit => {}
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn print_error(&mut self, error: &AppError) -> Result<()> {
        match error {
            AppError::Validation(errors) => {
                writeln!(self.output, "Validation errors:")?;
                for violation in errors {
                    writeln!(self.output, "  - {}", violation)?;
                }
            }
            other => writeln!(self.output, "Error: {}", other)?,
        }
        Ok(())
    }

    fn report_events(&mut self, book: &mut ContactBook) -> Result<()> {
        for event in book.drain_events() {
            match event {
                BookEvent::PersistenceWarning(message) => {
                    writeln!(self.output, "Warning: {}", message)?
                }
                BookEvent::ThemeChanged(theme) => writeln!(self.output, "Theme set to {}", theme)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn print_welcome_or_list(&mut self, book: &ContactBook) -> Result<()> {
        if book.is_empty() {
            writeln!(
                self.output,
                "Your phonebook is empty. Type 'add' to create the first contact."
            )?;
            return Ok(());
        }
        self.print_list(book)
    }

    fn print_list(&mut self, book: &ContactBook) -> Result<()> {
        let selected = book.selected_id();
        let mut shown = 0;

        for (i, contact) in book.visible().enumerate() {
            let marker = if Some(contact.id()) == selected { '*' } else { ' ' };
            writeln!(self.output, "{}{:>3}. {}", marker, i + 1, contact)?;
            shown += 1;
        }

        if shown == 0 {
            if book.query().trim().is_empty() {
                writeln!(self.output, "No contacts")?;
            } else {
                writeln!(self.output, "No contacts match '{}'", book.query())?;
            }
        }
        Ok(())
    }

    fn print_details(&mut self, book: &ContactBook) -> Result<()> {
        let contact = match book.edit_buffer() {
            Some(contact) if book.show_details() => contact,
            _ => {
                writeln!(self.output, "No contact selected")?;
                return Ok(());
            }
        };

        for field in ContactField::ALL {
            writeln!(
                self.output,
                "{:<14}{}",
                format!("{}:", field),
                contact.field(field).unwrap_or("-")
            )?;
        }
        writeln!(
            self.output,
            "{:<14}{}",
            "Created:",
            contact.created_date.format(TIMESTAMP_FORMAT)
        )?;
        writeln!(
            self.output,
            "{:<14}{}",
            "Modified:",
            contact.modified_date.format(TIMESTAMP_FORMAT)
        )?;
        Ok(())
    }
}

/// Ask for a yes/no answer on the console; anything but yes declines
fn confirm_delete<R: BufRead, W: Write>(input: &mut R, output: &mut W, contact: &Contact) -> bool {
    if write!(
        output,
        "Are you sure you want to delete {} {}? [y/N] ",
        contact.first_name, contact.last_name
    )
    .and_then(|_| output.flush())
    .is_err()
    {
        return false;
    }

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(e) => {
            tracing::warn!("Failed to read confirmation: {}", e);
            false
        }
    }
}

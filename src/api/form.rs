//! Interactive Form - re-runs the pipeline on every edit
//!
//! Line protocol: `field=value` (or `field value`), `show`, `reset`,
//! `help`, `quit`. An invalid edit is reported and the form keeps its
//! previous values.

use std::io::{self, BufRead, Write};

use super::presenter::{render_form, render_json, render_result};
use crate::constants::{APP_NAME, APP_VERSION};
use crate::logic::features::{FormField, FormInput, InputError};
use crate::logic::pipeline::PredictionContext;

/// One parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
enum FormCommand {
    Edit { field: String, value: String },
    Show,
    Reset,
    Help,
    Quit,
    Empty,
}

fn parse_line(line: &str) -> FormCommand {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => return FormCommand::Empty,
        "show" => return FormCommand::Show,
        "reset" => return FormCommand::Reset,
        "help" | "?" => return FormCommand::Help,
        "quit" | "exit" | "q" => return FormCommand::Quit,
        _ => {}
    }

    let (field, value) = match line.split_once('=') {
        Some((field, value)) => (field, value),
        None => line.split_once(char::is_whitespace).unwrap_or((line, "")),
    };

    FormCommand::Edit {
        field: field.trim().to_string(),
        value: value.trim().to_string(),
    }
}

/// Session state: the form plus output settings
pub struct FormSession<'a> {
    ctx: &'a PredictionContext,
    form: FormInput,
    json: bool,
    predictions: u64,
}

impl<'a> FormSession<'a> {
    pub fn new(ctx: &'a PredictionContext, json: bool) -> Self {
        Self {
            ctx,
            form: FormInput::default(),
            json,
            predictions: 0,
        }
    }

    pub fn form(&self) -> &FormInput {
        &self.form
    }

    pub fn predictions(&self) -> u64 {
        self.predictions
    }

    /// Drive the form until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "{} v{} - type `help` for commands", APP_NAME, APP_VERSION)?;
        write!(out, "{}", render_form(&self.form))?;
        self.predict(out)?;

        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };

            match parse_line(&line?) {
                FormCommand::Empty => {}
                FormCommand::Quit => break,
                FormCommand::Help => self.help(out)?,
                FormCommand::Show => {
                    write!(out, "{}", render_form(&self.form))?;
                    self.predict(out)?;
                }
                FormCommand::Reset => {
                    self.form = FormInput::default();
                    write!(out, "{}", render_form(&self.form))?;
                    self.predict(out)?;
                }
                FormCommand::Edit { field, value } => match self.apply(&field, &value) {
                    Ok(()) => self.predict(out)?,
                    Err(e) => {
                        log::debug!("Rejected edit {}={}: {}", field, value, e);
                        writeln!(out, "error: {}", e)?;
                    }
                },
            }
        }

        log::info!("Form closed after {} predictions", self.predictions);
        Ok(())
    }

    fn apply(&mut self, field: &str, value: &str) -> Result<(), InputError> {
        let field = FormField::lookup(field)?;
        self.form.set(field, value)
    }

    fn predict<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self.ctx.predict(&self.form) {
            Ok(result) => {
                self.predictions += 1;
                if self.json {
                    let json = render_json(&result)
                        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
                    writeln!(out, "{}", json)
                } else {
                    writeln!(out, "---\n{}", render_result(&result))
                }
            }
            Err(e) => {
                log::error!("Prediction failed: {}", e);
                writeln!(out, "prediction failed: {}", e)
            }
        }
    }

    fn help<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Edit a field with `field=value`. Fields:")?;
        for field in FormField::ALL {
            writeln!(out, "  {:<20} {}", field.column(), field.domain())?;
        }
        writeln!(out, "Commands: show, reset, help, quit")
    }
}

// ============================================================================
// TESTS
// ============================================================================

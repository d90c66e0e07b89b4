// UI layer: terminal front end for a labeling session using `dialoguer`.
// Prompts are synchronous; the only other thread is the Ctrl+C handler,
// which saves through the same finalizer before exiting.

use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

use crate::config::Config;
use crate::error::{LabelError, Result as LabelResult};
use crate::session::{Prompter, Reply, SaveReport, Session};

/// Exit status used when the session ends through Ctrl+C.
pub const INTERRUPT_EXIT_CODE: u8 = 130;

/// Prompter backed by the process's stdin/stdout.
///
/// When stdin is a terminal the answer is read with `dialoguer::Input`;
/// otherwise (piped input) plain lines are read so the tool can be scripted.
pub struct TerminalPrompter {
    interactive: bool,
    clear_screen: bool,
    spinner: Option<ProgressBar>,
}

impl TerminalPrompter {
    pub fn new(clear_screen: bool) -> Self {
        TerminalPrompter {
            interactive: io::stdin().is_terminal(),
            clear_screen,
            spinner: None,
        }
    }
}

impl Prompter for TerminalPrompter {
    fn present(&mut self, card: &str) -> LabelResult<()> {
        let mut out = io::stdout();
        if self.clear_screen && self.interactive {
            execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        writeln!(out, "{card}")?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> LabelResult<Reply> {
        if self.interactive {
            // Empty input is allowed so it fails coercion instead of re-prompting.
            return match Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
            {
                Ok(line) => Ok(Reply::Line(line)),
                // console reports Ctrl+C in raw mode as an interrupted read
                Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Reply::Interrupted),
                Err(e) => Err(LabelError::Prompt(e)),
            };
        }

        read_reply(&mut io::stdin().lock(), &mut io::stdout(), prompt)
    }

    fn saving(&mut self) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Saving labels...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn saved(&mut self, report: Option<&SaveReport>) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        if let Some(report) = report {
            println!("{}", summary(report));
        }
    }
}

/// Line-mode prompt used when stdin is not a terminal: write `prompt`, read
/// one line and strip its terminator. EOF is [`Reply::Closed`].
pub fn read_reply<R, W>(input: &mut R, out: &mut W, prompt: &str) -> LabelResult<Reply>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{prompt}: ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(Reply::Closed);
    }
    Ok(Reply::Line(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Load the configured dataset, label it interactively and save it back.
///
/// Ctrl+C during the session saves the labels entered so far and exits with
/// [`INTERRUPT_EXIT_CODE`].
pub fn label_dataset(config: &Config) -> Result<SaveReport> {
    let session = Session::open(config)
        .with_context(|| format!("Failed to open {}", config.dataset.display()))?;
    info!(
        "labeling {} rows from {}",
        session.rows(),
        config.dataset.display()
    );

    let finalizer = session.finalizer();
    ctrlc::set_handler(move || {
        match finalizer.finalize() {
            Ok(Some(report)) => println!("\nInterrupted. {}", summary(&report)),
            Ok(None) => {}
            Err(e) => error!("failed to save on interrupt: {e}"),
        }
        std::process::exit(i32::from(INTERRUPT_EXIT_CODE));
    })
    .context("Failed to install Ctrl+C handler")?;

    // The prompter prints the summary once the save is done, even when the
    // loop stopped early.
    let mut prompter = TerminalPrompter::new(config.clear_screen);
    Ok(session.run(&mut prompter)?)
}

/// Process exit status for a finished run: 0 on success, 130 when the
/// annotator pressed Ctrl+C, 1 for any other failure.
pub fn exit_code<T>(outcome: &Result<T>) -> u8 {
    match outcome {
        Ok(_) => 0,
        Err(err) => match err.downcast_ref::<LabelError>() {
            Some(LabelError::Interrupted { .. }) => INTERRUPT_EXIT_CODE,
            _ => 1,
        },
    }
}

/// One-line description of a save.
pub fn summary(report: &SaveReport) -> String {
    format!(
        "Saved {}/{} labels as column `{}` in {}",
        report.labeled,
        report.rows,
        report.column,
        report.path.display()
    )
}

// Session module: the annotation loop and the finalizer that saves the
// labels exactly once, whether the loop finished, failed or was interrupted.
//
// The answer buffer and the loaded table live inside the `Finalizer` behind a
// mutex so the Ctrl+C handler thread can save them too. Whoever calls
// `finalize` first takes ownership and writes the file; later calls are no-ops.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, error, info, warn};

use crate::answers::AnswerBuffer;
use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{LabelError, Result};
use crate::legend::{parse_answer, render_card, PROMPT};

/// What came back from one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A line as typed, without the line terminator.
    Line(String),
    /// Input ended (EOF).
    Closed,
    /// The annotator pressed Ctrl+C.
    Interrupted,
}

/// Where the session reads answers from and shows cards to.
pub trait Prompter {
    /// Show the card for the next row.
    fn present(&mut self, card: &str) -> Result<()>;

    /// Ask for one line of input.
    fn ask(&mut self, prompt: &str) -> Result<Reply>;

    /// Called right before the labels are written.
    fn saving(&mut self) {}

    /// Called once the save attempt is over. `report` is `None` when nothing
    /// was written by this call (save failed or already done elsewhere).
    fn saved(&mut self, _report: Option<&SaveReport>) {}
}

/// What the finalizer wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub path: PathBuf,
    pub column: String,
    pub rows: usize,
    pub labeled: usize,
}

struct Pending {
    dataset: Dataset,
    answers: AnswerBuffer,
    prefix: String,
}

impl Pending {
    fn write(self) -> Result<SaveReport> {
        let Pending {
            mut dataset,
            answers,
            prefix,
        } = self;
        let column = dataset.next_label_column(&prefix);
        let rows = dataset.row_count();
        let labeled = answers.labeled();
        dataset.set_column(&column, answers.into_cells());
        let path = dataset.path().to_path_buf();
        dataset.save(&path)?;
        Ok(SaveReport {
            path,
            column,
            rows,
            labeled,
        })
    }
}

/// Owns the session state until it is saved.
pub struct Finalizer {
    pending: Mutex<Option<Pending>>,
}

impl Finalizer {
    /// Take over `dataset` with a fresh answer buffer sized to its rows.
    pub fn new(dataset: Dataset, prefix: &str) -> Self {
        let answers = AnswerBuffer::new(dataset.row_count());
        Finalizer {
            pending: Mutex::new(Some(Pending {
                dataset,
                answers,
                prefix: prefix.to_string(),
            })),
        }
    }

    /// Store `value` for row `index` (0-based).
    pub fn record(&self, index: usize, value: i64) -> Result<()> {
        let mut guard = self.pending.lock().map_err(|_| LabelError::StatePoisoned)?;
        let pending = guard.as_mut().ok_or(LabelError::AlreadyFinalized)?;
        if !pending.answers.record(index, value) {
            warn!("row {} is outside the answer buffer, ignoring", index + 1);
        }
        Ok(())
    }

    #[cfg(test)]
    fn snapshot(&self) -> Result<Option<AnswerBuffer>> {
        let guard = self.pending.lock().map_err(|_| LabelError::StatePoisoned)?;
        Ok(guard.as_ref().map(|p| p.answers.clone()))
    }

    /// Write the labels to the dataset file. Only the first call writes;
    /// the lock is held during the write so a concurrent caller waits for
    /// it and then gets `Ok(None)`.
    pub fn finalize(&self) -> Result<Option<SaveReport>> {
        let mut guard = self.pending.lock().map_err(|_| LabelError::StatePoisoned)?;
        let Some(pending) = guard.take() else {
            return Ok(None);
        };
        let report = pending.write()?;
        info!(
            "saved column {} ({}/{} labeled) to {}",
            report.column,
            report.labeled,
            report.rows,
            report.path.display()
        );
        Ok(Some(report))
    }
}

/// One pass over a dataset.
pub struct Session {
    texts: Vec<String>,
    finalizer: Arc<Finalizer>,
}

impl Session {
    /// Load the configured dataset. Fails before anything is annotated if the
    /// file cannot be read or has no text column.
    pub fn open(config: &Config) -> Result<Self> {
        let dataset = Dataset::load(&config.dataset)?;
        let texts = dataset.column(&config.text_column)?;
        Ok(Session {
            texts,
            finalizer: Arc::new(Finalizer::new(dataset, &config.column_prefix)),
        })
    }

    pub fn rows(&self) -> usize {
        self.texts.len()
    }

    /// Shared handle for saving from another thread.
    pub fn finalizer(&self) -> Arc<Finalizer> {
        Arc::clone(&self.finalizer)
    }

    /// Prompt for every row in order. Stops at the first bad or missing answer.
    pub fn annotate<P: Prompter>(&self, prompter: &mut P) -> Result<()> {
        for (index, text) in self.texts.iter().enumerate() {
            let row = index + 1;
            prompter.present(&render_card(index, text))?;
            let raw = match prompter.ask(PROMPT)? {
                Reply::Line(line) => line,
                Reply::Closed => return Err(LabelError::InputClosed { row }),
                Reply::Interrupted => return Err(LabelError::Interrupted { row }),
            };
            let value = parse_answer(&raw).ok_or_else(|| LabelError::InvalidAnswer {
                row,
                input: raw.clone(),
            })?;
            self.finalizer.record(index, value)?;
            debug!("row {row} labeled {value}");
        }
        Ok(())
    }

    /// Annotate, then save no matter how annotation ended, then report the
    /// annotation failure if there was one. A save failure takes precedence.
    pub fn run<P: Prompter>(&self, prompter: &mut P) -> Result<SaveReport> {
        let outcome = self.annotate(prompter);
        if let Err(err) = &outcome {
            error!("annotation stopped: {err}");
        }

        prompter.saving();
        let saved = self.finalizer.finalize();
        prompter.saved(saved.as_ref().ok().and_then(Option::as_ref));

        let report = saved?.ok_or(LabelError::AlreadyFinalized)?;
        outcome.map(|()| report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::fs;

    struct Script {
        answers: VecDeque<&'static str>,
        cards: Vec<String>,
        saves: usize,
        reports: Vec<Option<SaveReport>>,
    }

    impl Script {
        fn new(answers: &[&'static str]) -> Self {
            Script {
                answers: answers.iter().copied().collect(),
                cards: Vec::new(),
                saves: 0,
                reports: Vec::new(),
            }
        }
    }

    impl Prompter for Script {
        fn present(&mut self, card: &str) -> Result<()> {
            self.cards.push(card.to_string());
            Ok(())
        }

        fn ask(&mut self, _prompt: &str) -> Result<Reply> {
            Ok(match self.answers.pop_front() {
                Some("^C") => Reply::Interrupted,
                Some(line) => Reply::Line(line.to_string()),
                None => Reply::Closed,
            })
        }

        fn saving(&mut self) {
            self.saves += 1;
        }

        fn saved(&mut self, report: Option<&SaveReport>) {
            self.reports.push(report.cloned());
        }
    }

    fn session(body: &str) -> (tempfile::TempDir, Config, Session) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("experiment.csv");
        fs::write(&path, body).unwrap();
        let config = Config {
            dataset: path,
            ..Config::default()
        };
        let session = Session::open(&config).unwrap();
        (dir, config, session)
    }

    #[test]
    fn cards_are_numbered_from_one() {
        let (_dir, _config, session) = session("id,text\n1,first\n2,second\n");
        let mut script = Script::new(&["0", "1"]);
        session.run(&mut script).unwrap();
        assert_eq!(script.cards.len(), 2);
        assert!(script.cards[0].contains("TWEET #1"));
        assert!(script.cards[1].contains("TWEET #2"));
        assert!(script.cards[1].contains("second"));
        assert_eq!(script.saves, 1);
    }

    #[test]
    fn bad_answer_names_row_and_input() {
        let (_dir, _config, session) = session("id,text\n1,a\n2,b\n");
        let err = session.run(&mut Script::new(&["2", "two"])).unwrap_err();
        match err {
            LabelError::InvalidAnswer { row, input } => {
                assert_eq!(row, 2);
                assert_eq!(input, "two");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn closed_input_and_ctrl_c_are_distinct() {
        let (_dir, _config, session) = session("id,text\n1,a\n2,b\n");
        let err = session.run(&mut Script::new(&["1"])).unwrap_err();
        assert!(matches!(err, LabelError::InputClosed { row: 2 }));

        let (_dir, _config, session) = self::session("id,text\n1,a\n2,b\n");
        let err = session.run(&mut Script::new(&["1", "^C"])).unwrap_err();
        assert!(matches!(err, LabelError::Interrupted { row: 2 }));
    }

    #[test]
    fn saved_hook_gets_report_even_when_loop_fails() {
        let (_dir, _config, session) = session("id,text\n1,a\n2,b\n3,c\n");
        let mut script = Script::new(&["3", "nope"]);
        assert!(session.run(&mut script).is_err());
        let report = script.reports[0].as_ref().unwrap();
        assert_eq!(report.column, "test0");
        assert_eq!(report.labeled, 1);
        assert_eq!(report.rows, 3);
    }

    #[test]
    fn saved_hook_gets_none_when_already_finalized() {
        let (_dir, _config, session) = session("id,text\n1,a\n");
        session.finalizer().finalize().unwrap();
        let mut script = Script::new(&["1"]);
        assert!(session.run(&mut script).is_err());
        assert_eq!(script.reports, vec![None]);
    }

    #[test]
    fn finalize_runs_only_once() {
        let (_dir, config, session) = session("id,text\n1,a\n");
        let finalizer = session.finalizer();
        let first = finalizer.finalize().unwrap().unwrap();
        assert_eq!(first.column, "test0");
        assert!(finalizer.finalize().unwrap().is_none());
        assert!(matches!(
            finalizer.record(0, 1),
            Err(LabelError::AlreadyFinalized)
        ));
        let body = fs::read_to_string(&config.dataset).unwrap();
        assert_eq!(body, "id,text,test0\n1,a,-1\n");
    }

    #[test]
    fn run_after_external_finalize_reports_it() {
        let (_dir, _config, session) = session("id,text\n1,a\n");
        session.finalizer().finalize().unwrap();
        let err = session.run(&mut Script::new(&[])).unwrap_err();
        // the loop sees input end first, but the save outcome wins
        assert!(matches!(err, LabelError::AlreadyFinalized));
    }

    #[test]
    fn snapshot_tracks_recorded_answers() {
        let (_dir, _config, session) = session("id,text\n1,a\n2,b\n3,c\n");
        let _ = session.annotate(&mut Script::new(&["4"]));
        let snap = session.finalizer().snapshot().unwrap().unwrap();
        assert_eq!(snap.values(), &[4, -1, -1]);
    }

    #[test]
    fn missing_text_column_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("experiment.csv");
        fs::write(&path, "id,body\n1,a\n").unwrap();
        let config = Config {
            dataset: path,
            ..Config::default()
        };
        assert!(matches!(
            Session::open(&config),
            Err(LabelError::MissingColumn { .. })
        ));
    }
}

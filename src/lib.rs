// Library root
// -----------
// This crate exposes the labeling logic as a library; the binary
// (`main.rs`) wires it to the terminal.
//
// Module responsibilities:
// - `config`: where the dataset lives and how the session behaves.
// - `dataset`: CSV load/save, label column naming.
// - `answers`: the per-row answer buffer with its -1 sentinel.
// - `legend`: the five label codes, the card text, answer coercion.
// - `session`: the annotation loop and the save-exactly-once finalizer.
// - `ui`: dialoguer prompts, spinner and Ctrl+C handling.
// - `error`: typed errors shared by the modules above.
pub mod answers;
pub mod config;
pub mod dataset;
pub mod error;
pub mod legend;
pub mod session;
pub mod ui;

// The label legend shown on every card, plus coercion of what the annotator
// types. Coercion is deliberately loose on range: any integer is accepted.

use std::fmt;

/// The five political-sentiment categories an annotator can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Unpolitical,
    PositiveDemocrats,
    NegativeDemocrats,
    NegativeConservatives,
    PositiveConservatives,
}

impl Stance {
    pub const ALL: [Stance; 5] = [
        Stance::Unpolitical,
        Stance::PositiveDemocrats,
        Stance::NegativeDemocrats,
        Stance::NegativeConservatives,
        Stance::PositiveConservatives,
    ];

    pub fn code(self) -> i64 {
        match self {
            Stance::Unpolitical => 0,
            Stance::PositiveDemocrats => 1,
            Stance::NegativeDemocrats => 2,
            Stance::NegativeConservatives => 3,
            Stance::PositiveConservatives => 4,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Stance::Unpolitical => "Unpolitical/Undecided",
            Stance::PositiveDemocrats => "Positive to Democrats",
            Stance::NegativeDemocrats => "Negative to Democrats",
            Stance::NegativeConservatives => "Negative to Conservatives",
            Stance::PositiveConservatives => "Positive to Conservatives",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

/// Prompt text asked after every card.
pub const PROMPT: &str = "Political Opinion (0-4)";

const RULE: &str =
    "----------------------------------------------------------------------------------";

/// Build the card shown before prompting for row `index` (0-based).
pub fn render_card(index: usize, text: &str) -> String {
    let mut card = format!("\n{RULE}\n\nTWEET #{}\n\nPossible responses:\n\n", index + 1);
    for stance in Stance::ALL {
        card.push_str(&stance.to_string());
        card.push('\n');
    }
    card.push_str(&format!("\nTweet:\n\n{text}\n"));
    card
}

/// Coerce the raw entry to an integer label. Surrounding whitespace is
/// ignored; anything else that is not a plain integer yields `None`.
pub fn parse_answer(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok()
}

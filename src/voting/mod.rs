use crate::models::Poll;

// Bars at or below this share (in percent) carry no inline label
pub const LABEL_THRESHOLD: f64 = 10.0;

// Tallied result for one option
#[derive(Debug, Clone, PartialEq)]
pub struct OptionResult<'a> {
    pub label: &'a str,
    pub votes: u64,
    pub percentage: Percentage,
}

// Share of the total, rounded to one decimal place
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Percentage {
    // The poll has no votes at all
    NoVotes,
    Share(f64),
}

impl Percentage {
    pub fn of(votes: u64, total: u64) -> Self {
        if total == 0 {
            return Percentage::NoVotes;
        }
        let raw = votes as f64 / total as f64 * 100.0;
        Percentage::Share((raw * 10.0).round() / 10.0)
    }

    pub fn value(self) -> f64 {
        match self {
            Percentage::NoVotes => 0.0,
            Percentage::Share(p) => p,
        }
    }

    pub fn shows_bar_label(self) -> bool {
        self.value() > LABEL_THRESHOLD
    }
}

// "0" for a poll without votes, otherwise one decimal ("12.5", "0.0")
impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Percentage::NoVotes => write!(f, "0"),
            Percentage::Share(p) => write!(f, "{:.1}", p),
        }
    }
}

pub fn calculate_results(poll: &Poll) -> Vec<OptionResult<'_>> {
    let total = poll.total_votes();
    poll.options
        .iter()
        .zip(poll.votes.iter().copied())
        .map(|(label, votes)| OptionResult {
            label,
            votes,
            percentage: Percentage::of(votes, total),
        })
        .collect()
}

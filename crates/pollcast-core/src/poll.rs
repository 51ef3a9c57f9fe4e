//! Poll state: one question, up to twenty options, one vote per voter.
//!
//! Lifecycle: `create` → `add_option`* → `vote`/`unvote`* → `end` → `summarize`.
//! The next `create` discards everything.

use thiserror::Error;

use crate::marker::MAX_OPTIONS;

/// A poll operation rejected because of the poll's current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("no active poll")]
    NotActive,

    #[error("a poll is already active")]
    AlreadyActive,

    #[error("a poll cannot have more than {limit} options")]
    OptionLimitExceeded { limit: usize },

    #[error("poll is still active")]
    StillActive,

    #[error("no poll results to show")]
    NoResults,
}

/// A participant, identified by platform user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voter {
    pub id: String,
    /// Display name shown in the audit listing and the spreadsheet.
    pub name: String,
}

impl Voter {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A voter's current choice (1-based option index).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub voter: Voter,
    pub option: usize,
}

/// Result of a `vote` call on an active poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote was stored; carries the chosen option's text.
    Recorded { option: String },
    /// The index does not name an option of this poll (e.g. a stale reaction).
    Ignored,
}

/// Vote count for one option.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    /// 1-based position in the original option list.
    pub index: usize,
    pub option: String,
    pub count: usize,
    /// Share of all votes, 0.0..=100.0.
    pub percentage: f64,
}

/// One line of the voter audit listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterChoice {
    pub voter: String,
    pub option: String,
}

/// Final results of a closed poll.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSummary {
    pub question: String,
    pub total_votes: usize,
    /// Ranked by percentage, highest first; ties keep option order.
    pub tallies: Vec<Tally>,
    /// Current choices in the order voters first voted.
    pub choices: Vec<VoterChoice>,
}

/// Owns the single poll and its votes.
#[derive(Debug, Default)]
pub struct PollManager {
    question: String,
    options: Vec<String>,
    ballots: Vec<Ballot>,
    active: bool,
}

impl PollManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new poll, discarding the previous one's options and votes.
    pub fn create(&mut self, question: &str) -> Result<(), PollError> {
        if self.active {
            return Err(PollError::AlreadyActive);
        }
        self.question = question.to_string();
        self.options.clear();
        self.ballots.clear();
        self.active = true;
        Ok(())
    }

    /// Append an option and return its 1-based index.
    pub fn add_option(&mut self, text: &str) -> Result<usize, PollError> {
        if !self.active {
            return Err(PollError::NotActive);
        }
        if self.options.len() >= MAX_OPTIONS {
            return Err(PollError::OptionLimitExceeded { limit: MAX_OPTIONS });
        }
        self.options.push(text.to_string());
        Ok(self.options.len())
    }

    /// Record `voter`'s choice, replacing any earlier one.
    ///
    /// An overwritten vote keeps its place in the audit listing.
    pub fn vote(&mut self, voter: Voter, index: usize) -> Result<VoteOutcome, PollError> {
        if !self.active {
            return Err(PollError::NotActive);
        }
        let Some(option) = self.option(index) else {
            return Ok(VoteOutcome::Ignored);
        };
        let option = option.to_string();

        match self.ballots.iter_mut().find(|b| b.voter.id == voter.id) {
            Some(ballot) => {
                ballot.voter.name = voter.name;
                ballot.option = index;
            }
            None => self.ballots.push(Ballot {
                voter,
                option: index,
            }),
        }
        Ok(VoteOutcome::Recorded { option })
    }

    /// Drop `voter_id`'s vote. Returns the removed ballot, if there was one.
    pub fn unvote(&mut self, voter_id: &str) -> Result<Option<Ballot>, PollError> {
        if !self.active {
            return Err(PollError::NotActive);
        }
        let removed = self
            .ballots
            .iter()
            .position(|b| b.voter.id == voter_id)
            .map(|pos| self.ballots.remove(pos));
        Ok(removed)
    }

    /// Close the poll. Options and votes stay readable for `summarize`.
    pub fn end(&mut self) -> Result<(), PollError> {
        if !self.active {
            return Err(PollError::NotActive);
        }
        self.active = false;
        Ok(())
    }

    /// Tabulate a closed poll.
    pub fn summarize(&self) -> Result<PollSummary, PollError> {
        if self.active {
            return Err(PollError::StillActive);
        }
        if self.options.is_empty() || self.ballots.is_empty() {
            return Err(PollError::NoResults);
        }

        let mut counts = vec![0usize; self.options.len()];
        for ballot in &self.ballots {
            counts[ballot.option - 1] += 1;
        }

        let total = self.ballots.len();
        let mut tallies: Vec<Tally> = self
            .options
            .iter()
            .zip(counts)
            .enumerate()
            .map(|(i, (option, count))| Tally {
                index: i + 1,
                option: option.clone(),
                count,
                percentage: count as f64 / total as f64 * 100.0,
            })
            .collect();
        // Percentage is monotonic in count; `sort_by` is stable.
        tallies.sort_by(|a, b| b.count.cmp(&a.count));

        let choices = self
            .ballots
            .iter()
            .map(|b| VoterChoice {
                voter: b.voter.name.clone(),
                option: self.options[b.option - 1].clone(),
            })
            .collect();

        Ok(PollSummary {
            question: self.question.clone(),
            total_votes: total,
            tallies,
            choices,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Text of the option at 1-based `index`.
    pub fn option(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }

    pub fn vote_count(&self) -> usize {
        self.ballots.len()
    }

    /// Current choice of `voter_id`, if any.
    pub fn ballot(&self, voter_id: &str) -> Option<&Ballot> {
        self.ballots.iter().find(|b| b.voter.id == voter_id)
    }
}

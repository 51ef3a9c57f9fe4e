//! Text rendering of poll results.
//!
//! The same text is posted in the host chat and relayed to every broadcaster,
//! so it sticks to Discord-flavored Markdown (`**bold**`) that the relays
//! rewrite or show verbatim.

use std::fmt::Write;

use crate::poll::PollSummary;

/// Render the ranked percentages followed by the voter listing.
pub fn render(summary: &PollSummary) -> String {
    let mut out = String::from("**Poll Results:**\n\n");
    for tally in &summary.tallies {
        let _ = writeln!(out, "{}: {:.2}%", tally.option, tally.percentage);
    }

    out.push_str("\n**Voters and their choices:**\n");
    for choice in &summary.choices {
        let _ = writeln!(out, "{}: {}", choice.voter, choice.option);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::{PollManager, Voter};

    #[test]
    fn test_render_results() {
        let mut pm = PollManager::new();
        pm.create("Lunch?").unwrap();
        pm.add_option("Pizza").unwrap();
        pm.add_option("Sushi").unwrap();
        pm.vote(Voter::new("1", "alice"), 1).unwrap();
        pm.vote(Voter::new("2", "bob"), 1).unwrap();
        pm.vote(Voter::new("3", "carol"), 2).unwrap();
        pm.end().unwrap();

        let text = render(&pm.summarize().unwrap());
        assert_eq!(
            text,
            "**Poll Results:**\n\n\
             Pizza: 66.67%\n\
             Sushi: 33.33%\n\
             \n**Voters and their choices:**\n\
             alice: Pizza\n\
             bob: Pizza\n\
             carol: Sushi\n"
        );
    }

    #[test]
    fn test_render_lists_zero_vote_options() {
        let mut pm = PollManager::new();
        pm.create("Color?").unwrap();
        pm.add_option("Red").unwrap();
        pm.add_option("Blue").unwrap();
        pm.vote(Voter::new("1", "alice"), 2).unwrap();
        pm.end().unwrap();

        let text = render(&pm.summarize().unwrap());
        assert!(text.contains("Blue: 100.00%\nRed: 0.00%\n"));
    }
}

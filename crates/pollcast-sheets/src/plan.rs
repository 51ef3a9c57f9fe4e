//! Decide which row a vote record touches.

use pollcast_core::event::VoteRecord;

/// Timestamp format written to column A.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single write against the `A:C` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetWrite {
    /// Overwrite the 1-based `row`.
    Update { row: usize, values: [String; 3] },
    /// Add a row after the table.
    Append { values: [String; 3] },
}

/// Plan the write for `record` against the current table contents.
///
/// The voter's row is the last one whose column B matches their name.
/// Clearing a voter without a row needs no write.
pub fn plan_write(rows: &[Vec<String>], record: &VoteRecord) -> Option<SheetWrite> {
    let existing = rows
        .iter()
        .rposition(|row| row.get(1).is_some_and(|name| *name == record.voter))
        .map(|i| i + 1);

    match (&record.choice, existing) {
        (Some(choice), row) => {
            let values = [
                record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                record.voter.clone(),
                choice.clone(),
            ];
            Some(match row {
                Some(row) => SheetWrite::Update { row, values },
                None => SheetWrite::Append { values },
            })
        }
        (None, Some(row)) => Some(SheetWrite::Update {
            row,
            values: Default::default(),
        }),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn record(voter: &str, choice: Option<&str>) -> VoteRecord {
        VoteRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 5).unwrap(),
            voter: voter.to_string(),
            choice: choice.map(str::to_string),
        }
    }

    #[test]
    fn test_new_voter_appends() {
        let table = rows(&[&["Timestamp", "Name", "Choice"]]);
        assert_eq!(
            plan_write(&table, &record("alice", Some("Pizza"))),
            Some(SheetWrite::Append {
                values: [
                    "2024-05-01 09:30:05".into(),
                    "alice".into(),
                    "Pizza".into()
                ]
            })
        );
    }

    #[test]
    fn test_existing_voter_updates_row() {
        let table = rows(&[
            &["Timestamp", "Name", "Choice"],
            &["2024-05-01 09:00:00", "bob", "Sushi"],
            &["2024-05-01 09:10:00", "alice", "Sushi"],
        ]);
        match plan_write(&table, &record("alice", Some("Pizza"))) {
            Some(SheetWrite::Update { row, values }) => {
                assert_eq!(row, 3);
                assert_eq!(values[2], "Pizza");
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_names_target_last_row() {
        let table = rows(&[
            &["t", "alice", "Pizza"],
            &["t", "bob", "Pizza"],
            &["t", "alice", "Sushi"],
        ]);
        match plan_write(&table, &record("alice", None)) {
            Some(SheetWrite::Update { row, .. }) => assert_eq!(row, 3),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_clear_blanks_the_row() {
        let table = rows(&[&["t", "alice", "Pizza"]]);
        assert_eq!(
            plan_write(&table, &record("alice", None)),
            Some(SheetWrite::Update {
                row: 1,
                values: [String::new(), String::new(), String::new()]
            })
        );
    }

    #[test]
    fn test_clear_unknown_voter_is_noop() {
        let table = rows(&[&["t", "bob", "Pizza"]]);
        assert_eq!(plan_write(&table, &record("alice", None)), None);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let table = rows(&[&[], &["only-a"], &["t", "alice", "Pizza"]]);
        match plan_write(&table, &record("alice", Some("Sushi"))) {
            Some(SheetWrite::Update { row, .. }) => assert_eq!(row, 3),
            other => panic!("expected update, got {other:?}"),
        }
    }
}

use std::io::Write;

use chrono::{DateTime, Utc};
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::store::{ContentRecord, LeaderboardEntry};
use crate::ui::{format_duration, leaderboard::humanize_age};

/// Plain-text leaderboard for the `leaderboard` subcommand
pub fn leaderboard_table(entries: &[LeaderboardEntry], now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Rank", "Name", "WPM", "Accuracy", "Time", "Errors", "When"]);

    for (idx, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(format!("#{}", idx + 1)),
            Cell::new(&entry.username),
            Cell::new(entry.wpm),
            Cell::new(format!("{}%", entry.accuracy)),
            Cell::new(format_duration(entry.duration_seconds)),
            Cell::new(entry.error_count),
            Cell::new(humanize_age(entry.completed_at, now)),
        ]);
    }
    table
}

pub fn content_table(records: &[ContentRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Source", "Words", "Chars"]);

    for record in records {
        table.add_row(vec![
            Cell::new(&record.id),
            Cell::new(&record.title),
            Cell::new(record.source_type),
            Cell::new(record.word_count),
            Cell::new(record.character_count),
        ]);
    }
    table
}

pub fn write_json<W: Write, T: serde::Serialize + ?Sized>(mut w: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut w, value)?;
    writeln!(w)?;
    Ok(())
}

/// One row per entry, camelCase headers
pub fn write_leaderboard_csv<W: Write>(w: W, entries: &[LeaderboardEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}

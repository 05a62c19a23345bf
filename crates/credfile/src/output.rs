//! Rendering of store results for the terminal.

use std::io::{self, Write};

use credfile_core::{Entry, Record, Removed};
use serde::Serialize;

#[derive(Serialize)]
struct DeletedJson<'a> {
    index: i64,
    removed: &'a Removed,
}

pub fn format_record(index: impl std::fmt::Display, record: &Record) -> String {
    format!(
        "[{index}] Name: {} Username: {} Email: {} Password: {}",
        record.name, record.username, record.email, record.password
    )
}

pub fn print_entries(out: &mut impl Write, entries: &[Entry], json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, entries)?;
        return writeln!(out);
    }
    for entry in entries {
        writeln!(out, "{}", format_record(entry.index, &entry.record))?;
    }
    Ok(())
}

pub fn print_created(out: &mut impl Write, record: &Record, json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, &serde_json::json!({ "created": record }))?;
        return writeln!(out);
    }
    writeln!(out, "Password created successfully")
}

pub fn print_removed(
    out: &mut impl Write,
    index: i64,
    removed: &Removed,
    json: bool,
) -> io::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, &DeletedJson { index, removed })?;
        return writeln!(out);
    }
    match removed {
        Removed::Record(record) => writeln!(out, "Deleted: {}", format_record(index, record)),
        Removed::Malformed(raw) => writeln!(out, "Deleted: [{index}] unreadable row: {raw}"),
    }
}

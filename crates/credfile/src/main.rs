mod cli;
mod output;

use std::io::Write;
use std::path::Path;

use clap::Parser;
use eyre::{bail, WrapErr};

use cli::Command;
use credfile_core::{ensure_file_exists, open_for_read_append, remove_file, Record, Store};

fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr and default to `warn` so stdout only carries results.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let path = args.store_path()?;
    tracing::debug!(path = %path.display(), "using credential file");
    let mut out = std::io::stdout().lock();
    run(&path, args.command, args.json, &mut out)
}

fn run(path: &Path, command: Command, json: bool, out: &mut impl Write) -> eyre::Result<()> {
    match command {
        Command::All => {
            let snapshot = open_store(path)?.list().context("list records")?;
            output::print_entries(out, &snapshot.entries, json)?;
        }
        Command::Create {
            name,
            username,
            email,
            password,
        } => {
            let record = validated_record(name, username, email, password)?;
            open_store(path)?.append(&record).context("append record")?;
            output::print_created(out, &record, json)?;
        }
        Command::Delete { index } => {
            let removed = open_store(path)?.delete(index).context("delete record")?;
            output::print_removed(out, index, &removed, json)?;
        }
        Command::Search { query } => {
            if query.is_empty() {
                bail!("search query must not be empty; pass --query");
            }
            let snapshot = open_store(path)?.search(&query).context("search records")?;
            output::print_entries(out, &snapshot.entries, json)?;
        }
        Command::Purge { yes } => purge(path, yes, out)?,
    }

    Ok(())
}

/// Bootstrap the credential file and open it. The handle is dropped at the
/// end of the caller's statement.
fn open_store(path: &Path) -> eyre::Result<Store> {
    ensure_file_exists(path)
        .with_context(|| format!("create credential file {}", path.display()))?;
    open_for_read_append(path).with_context(|| format!("open credential file {}", path.display()))
}

fn validated_record(
    name: String,
    username: String,
    email: String,
    password: String,
) -> eyre::Result<Record> {
    let fields = [
        ("--name", &name),
        ("--username", &username),
        ("--email", &email),
        ("--password", &password),
    ];
    let missing: Vec<_> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(flag, _)| *flag)
        .collect();
    if !missing.is_empty() {
        bail!("all fields are required; empty: {}", missing.join(", "));
    }

    Ok(Record::new(name, username, email, password))
}

fn purge(path: &Path, yes: bool, out: &mut impl Write) -> eyre::Result<()> {
    if !yes {
        bail!(
            "refusing to remove {} without --yes; every stored credential would be lost",
            path.display()
        );
    }
    remove_file(path).with_context(|| format!("remove credential file {}", path.display()))?;
    writeln!(out, "Removed {}", path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_record_names_every_empty_field() {
        let err = validated_record("n".into(), " ".into(), "e".into(), String::new())
            .expect_err("two fields are empty");
        let message = err.to_string();
        assert!(message.contains("--username"), "{message}");
        assert!(message.contains("--password"), "{message}");
        assert!(!message.contains("--name"), "{message}");
    }

    #[test]
    fn validated_record_keeps_values_verbatim() {
        let record = validated_record(" n ".into(), "u".into(), "e".into(), "p w".into())
            .expect("all fields present");
        assert_eq!(record, Record::new(" n ", "u", "e", "p w"));
    }

    #[test]
    fn run_rejects_empty_search_query() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("creds.csv");
        let mut out = Vec::new();

        let err = run(&path, Command::Search { query: String::new() }, false, &mut out)
            .expect_err("empty query");
        assert!(err.to_string().contains("must not be empty"));
        assert!(out.is_empty());
    }

    #[test]
    fn run_searches_for_a_space() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("creds.csv");
        std::fs::write(&path, "Bank Inc,u,e,p\nNoSpace,u,e,p\n").expect("seed file");
        let mut out = Vec::new();

        run(&path, Command::Search { query: " ".into() }, false, &mut out)
            .expect("a single space is a valid query");
        assert_eq!(
            String::from_utf8(out).expect("utf-8"),
            "[0] Name: Bank Inc Username: u Email: e Password: p\n"
        );
    }

    #[test]
    fn purge_requires_confirmation() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("creds.csv");
        ensure_file_exists(&path).expect("create");

        let mut out = Vec::new();
        assert!(purge(&path, false, &mut out).is_err());
        assert!(path.exists());
        purge(&path, true, &mut out).expect("confirmed purge");
        assert!(!path.exists());
        assert!(String::from_utf8(out).expect("utf-8").starts_with("Removed "));
    }
}

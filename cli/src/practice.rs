//! Interactive practice loop
//!
//! Reads commands and SQL answers line by line. An answer may span several
//! lines; it is submitted when a line ends with `;` or a blank line follows.

use std::io::{BufRead, ErrorKind, Write};
use anyhow::Result;
use log::debug;

use sql_coach_core::tools::list_tables;
use sql_coach_core::{ChallengeSession, CoreError, Verdict};

const PROMPT_PRIMARY: &str = "sql> ";
const PROMPT_CONTINUATION: &str = " ..> ";

const HELP: &str = "\
Type a SQL query to answer the current challenge.
End it with ';' or an empty line to submit.

Commands:
  :new <difficulty>   start a challenge (beginner, intermediate, advanced)
  :skip               drop the current challenge and get another
  :tables             list the tables in the schema
  :help               show this help
  :quit               leave
";

/// Run the practice loop until `:quit` or end of input
pub fn run<R, W>(session: &ChallengeSession, difficulty: &str, input: &mut R, out: &mut W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut difficulty = difficulty.to_string();
    let mut pending = String::new();
    let mut line = String::new();

    writeln!(out, "SQL Coach practice. Type :help for commands.\n")?;
    next_challenge(session, &difficulty, out)?;

    loop {
        let prompt = if pending.is_empty() { PROMPT_PRIMARY } else { PROMPT_CONTINUATION };
        write!(out, "{}", prompt)?;
        out.flush()?;

        line.clear();
        let bytes_read = match input.read_line(&mut line) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {
                pending.clear();
                writeln!(out)?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if bytes_read == 0 {
            if !pending.trim().is_empty() {
                submit(session, &difficulty, &pending, out)?;
            }
            writeln!(out)?;
            return Ok(());
        }

        let trimmed = line.trim();

        if pending.is_empty() {
            if trimmed.is_empty() {
                continue;
            }
            if let Some(command) = trimmed.strip_prefix(':') {
                let mut parts = command.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some("quit") | Some("q") | Some("exit"), _) => return Ok(()),
                    (Some("help"), _) => write!(out, "{}", HELP)?,
                    (Some("tables"), _) => print_tables(session, out)?,
                    (Some("skip"), _) => {
                        if session.skip()?.is_none() {
                            writeln!(out, "No active challenge.")?;
                        }
                        next_challenge(session, &difficulty, out)?;
                    }
                    (Some("new"), Some(level)) => {
                        if next_challenge(session, level, out)? {
                            difficulty = level.to_lowercase();
                        }
                    }
                    (Some("new"), None) => next_challenge(session, &difficulty, out).map(|_| ())?,
                    _ => writeln!(out, "Unknown command '{}'. Type :help for commands.", trimmed)?,
                }
                continue;
            }
        } else if trimmed.is_empty() {
            submit(session, &difficulty, &pending, out)?;
            pending.clear();
            continue;
        }

        if !pending.is_empty() {
            pending.push('\n');
        }
        pending.push_str(line.trim_end_matches(['\n', '\r']));

        if trimmed.ends_with(';') {
            submit(session, &difficulty, &pending, out)?;
            pending.clear();
        }
    }
}

/// Generate and print a challenge; returns whether one was produced
fn next_challenge<W: Write>(session: &ChallengeSession, difficulty: &str, out: &mut W) -> Result<bool> {
    match session.generate_challenge(difficulty) {
        Ok(challenge) => {
            writeln!(out, "{}", challenge.render())?;
            Ok(true)
        }
        Err(CoreError::Challenge(e)) => {
            writeln!(out, "error: {}", e)?;
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn submit<W: Write>(session: &ChallengeSession, difficulty: &str, sql: &str, out: &mut W) -> Result<()> {
    debug!("Submitting answer ({} bytes)", sql.len());

    match session.submit(sql) {
        Ok(Verdict::Pass { message }) => {
            writeln!(out, "PASS: {}\n", message)?;
            next_challenge(session, difficulty, out)?;
        }
        Ok(Verdict::Fail { message }) => writeln!(out, "FAIL: {}", message)?,
        Err(CoreError::Challenge(e)) => writeln!(out, "error: {}", e)?,
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn print_tables<W: Write>(session: &ChallengeSession, out: &mut W) -> Result<()> {
    let schema = session.schema()?;
    for summary in list_tables(schema.as_ref()) {
        writeln!(out, "  {} ({} columns, {} sample rows)", summary.name, summary.column_count, summary.sample_row_count)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use sql_coach_core::models::{Column, SampleRow, Table};
    use sql_coach_core::{CoreConfig, Schema, ScriptedRandom};

    fn session() -> ChallengeSession {
        let orders = Table::new("orders", vec![
            Column::new("id", "int"),
            Column::new("status", "varchar"),
        ])
        .with_sample_row(SampleRow::from_pairs([
            ("id", Some("1".to_string())),
            ("status", Some("Pending".to_string())),
        ]));
        let schema = Arc::new(Schema::new(vec![orders]).unwrap());

        // Always pick the first table and the `status` column
        ChallengeSession::with_random(schema, &CoreConfig::default(), Box::new(ScriptedRandom::new(vec![0, 1])))
    }

    fn run_script(script: &str) -> String {
        let session = session();
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();

        run(&session, "beginner", &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_wrong_then_right_answer() {
        let out = run_script("SELECT * FROM orders;\nSELECT *\nFROM orders\nWHERE status = 'Pending';\n:quit\n");

        assert!(out.contains("Beginner Challenge: Filter orders"));
        assert!(out.contains("FAIL: Not quite."));
        assert!(out.contains("PASS: Correct!"));
        assert!(!out.contains("SELECT * FROM orders WHERE status = 'Pending';"));
    }

    #[test]
    fn test_blank_line_submits() {
        let out = run_script("select * from orders where status = 'Pending'\n\n:quit\n");
        assert!(out.contains("PASS:"));
    }

    #[test]
    fn test_commands() {
        let out = run_script(":tables\n:new intermediate\n:new expert\n:bogus\n:help\n");

        assert!(out.contains("  orders (2 columns, 1 sample rows)"));
        assert!(out.contains("error: No table with foreign keys is available for a join challenge"));
        assert!(out.contains("error: Invalid difficulty 'expert'"));
        assert!(out.contains("Unknown command ':bogus'"));
        assert!(out.contains(":skip"));
    }

    #[test]
    fn test_skip_then_answer_without_challenge() {
        let session = session();
        let mut input = Cursor::new(b":skip\n".to_vec());
        let mut out = Vec::new();

        run(&session, "beginner", &mut input, &mut out).unwrap();

        // skip replaces the challenge, so exactly one stays outstanding
        assert_eq!(session.store().len().unwrap(), 1);
    }

    #[test]
    fn test_end_of_input_submits_pending() {
        let out = run_script("SELECT * FROM orders WHERE status = 'Pending'");
        assert!(out.contains("PASS:"));
    }
}

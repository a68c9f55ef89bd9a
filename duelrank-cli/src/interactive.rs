//! Line-based voting loop: show the next pair, read a command, repeat.

use duelrank_core::{Outcome, Result, SnapshotSink, VotingSession};
use rand::Rng;
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pick(Outcome),
    Undo,
    StarLeft,
    StarRight,
    Help,
    Quit,
}

const HELP: &str = "\
  a  left wins      b  right wins     t  tie
  u  undo last      s  star left      S  star right
  ?  help           q  quit";

pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "a" | "A" | "1" => Some(Command::Pick(Outcome::AWins)),
        "b" | "B" | "2" => Some(Command::Pick(Outcome::BWins)),
        "t" | "T" | "=" => Some(Command::Pick(Outcome::Tie)),
        "u" | "U" => Some(Command::Undo),
        "s" => Some(Command::StarLeft),
        "S" => Some(Command::StarRight),
        "?" | "h" | "help" => Some(Command::Help),
        "q" | "Q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

fn star_marker<S: SnapshotSink, R: Rng>(session: &VotingSession<S, R>, item: &str) -> &'static str {
    if session.is_starred(item) {
        " *"
    } else {
        ""
    }
}

fn print_prompt<S: SnapshotSink, R: Rng>(
    session: &VotingSession<S, R>,
    out: &mut impl Write,
) -> io::Result<()> {
    let votes = session.votes().len();
    match session.next_pair() {
        Some((left, right)) => {
            writeln!(out)?;
            writeln!(out, "[{votes} votes]")?;
            writeln!(out, "  a: {left}{}", star_marker(session, left))?;
            writeln!(out, "  b: {right}{}", star_marker(session, right))?;
        }
        None => {
            writeln!(out)?;
            writeln!(out, "[{votes} votes] Nothing left to compare. u to undo, q to quit.")?;
        }
    }
    write!(out, "> ")?;
    out.flush()
}

fn toggle_star<S: SnapshotSink, R: Rng>(
    session: &mut VotingSession<S, R>,
    left: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    let Some((a, b)) = session.next_pair().cloned() else {
        return writeln!(out, "No pair to star.");
    };
    let item = if left { a } else { b };
    let now_starred = !session.is_starred(&item);
    session.star(&item, now_starred);
    writeln!(out, "{} {item}", if now_starred { "Starred" } else { "Unstarred" })
}

/// Run until `q` or end of input. Pending history is flushed on every exit,
/// including a failed read or write.
pub fn run<S, R>(
    session: &mut VotingSession<S, R>,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<()>
where
    S: SnapshotSink,
    R: Rng,
{
    let looped = vote_loop(session, input, &mut out);
    let flushed = session.flush();
    if let (Err(_), Err(e)) = (&looped, &flushed) {
        warn!(error = %e, "voting history not saved");
    }
    looped?;
    flushed?;
    Ok(())
}

fn vote_loop<S, R>(
    session: &mut VotingSession<S, R>,
    mut input: impl BufRead,
    out: &mut impl Write,
) -> io::Result<()>
where
    S: SnapshotSink,
    R: Rng,
{
    writeln!(out, "{} items. Commands:\n{HELP}", session.items().len())?;
    print_prompt(session, out)?;

    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        // A line that is not valid UTF-8 becomes an unknown command.
        let line = String::from_utf8_lossy(&buf);
        match parse_command(&line) {
            Some(Command::Pick(outcome)) => {
                if session.pick(outcome).is_none() {
                    writeln!(out, "Nothing to vote on.")?;
                }
            }
            Some(Command::Undo) => match session.undo() {
                Some(vote) => {
                    writeln!(out, "Undid {} vs {} ({})", vote.item_a, vote.item_b, vote.outcome)?
                }
                None => writeln!(out, "Nothing to undo.")?,
            },
            Some(Command::StarLeft) => toggle_star(session, true, out)?,
            Some(Command::StarRight) => toggle_star(session, false, out)?,
            Some(Command::Help) => writeln!(out, "{HELP}")?,
            Some(Command::Quit) => break,
            None if line.trim().is_empty() => {}
            None => writeln!(out, "Unknown command {:?}. ? for help.", line.trim())?,
        }

        if let Err(e) = session.poll_persistence(Instant::now()) {
            warn!(error = %e, "voting history not saved yet");
        }
        print_prompt(session, out)?;
    }

    writeln!(out)
}

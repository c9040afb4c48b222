use log::{info, warn};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;

use crate::app::Msg;
use crate::models::PollId;

pub const USAGE: &str = "\
Commands:
  list | back | cancel        show the poll list
  refresh                     reload the poll list
  new                         start a new poll
  question <text>             set the question
  option <n> <text>           set option n
  add | remove <n>            add an option row / remove option n
  create                      submit the new poll
  open <id>                   show a poll
  pick <n>                    select option n
  vote                        submit the selected option
  stats                       load server statistics for the open poll
  delete <id>                 delete a poll (asks for confirmation)
  yes | no                    confirm or cancel a pending delete
  seed                        create sample polls on the server
  help | quit";

#[derive(Debug)]
pub enum Input {
    Intent(Msg),
    Help,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("`{0}` is not a valid number")]
    InvalidNumber(String),
}

// Option positions are typed 1-based and stored 0-based
fn position(raw: &str) -> Result<usize, ParseError> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(ParseError::InvalidNumber(raw.to_string())),
    }
}

fn poll_id(raw: &str) -> Result<PollId, ParseError> {
    raw.parse()
        .map_err(|_| ParseError::InvalidNumber(raw.to_string()))
}

fn required<'a>(
    value: Option<&'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, ParseError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ParseError::MissingArgument { command, argument })
}

pub fn parse_command(line: &str) -> Result<Input, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Blank);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, Some(rest.trim())),
        None => (line, None),
    };

    let msg = match command.to_lowercase().as_str() {
        "help" | "?" => return Ok(Input::Help),
        "list" | "back" | "cancel" => Msg::ShowList,
        "refresh" => Msg::Refresh,
        "new" => Msg::NewPoll,
        "question" | "q" => Msg::SetQuestion(required(rest, "question", "the question text")?.to_string()),
        "option" | "o" => {
            let rest = required(rest, "option", "a position and text")?;
            let (n, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            Msg::SetOption(position(n)?, text.trim().to_string())
        }
        "add" => Msg::AddOption,
        "remove" => Msg::RemoveOption(position(required(rest, "remove", "a position")?)?),
        "create" | "submit" => Msg::SubmitPoll,
        "open" => Msg::OpenPoll(poll_id(required(rest, "open", "a poll id")?)?),
        "pick" => Msg::SelectOption(position(required(rest, "pick", "an option number")?)?),
        "vote" => Msg::SubmitVote,
        "stats" => Msg::ShowStats,
        "delete" => Msg::RequestDelete(poll_id(required(rest, "delete", "a poll id")?)?),
        "yes" | "y" => Msg::ConfirmDelete,
        "no" | "n" => Msg::CancelDelete,
        "seed" => Msg::SeedSamples,
        "quit" | "exit" => Msg::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Input::Intent(msg))
}

// Reads commands from stdin until EOF, which quits the client
pub async fn read_commands(tx: UnboundedSender<Msg>) {
    info!("Reading commands from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read from stdin: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            Ok(Input::Intent(msg)) => {
                if tx.send(msg).is_err() {
                    return;
                }
            }
            Ok(Input::Help) => eprintln!("{}", USAGE),
            Ok(Input::Blank) => {}
            Err(e) => eprintln!("{}", e),
        }
    }

    let _ = tx.send(Msg::Quit);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(line: &str) -> Msg {
        match parse_command(line) {
            Ok(Input::Intent(msg)) => msg,
            other => panic!("expected an intent for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn positions_are_one_based() {
        assert!(matches!(intent("pick 1"), Msg::SelectOption(0)));
        assert!(matches!(intent("remove 3"), Msg::RemoveOption(2)));
        assert_eq!(
            parse_command("pick 0").unwrap_err(),
            ParseError::InvalidNumber("0".into())
        );
    }

    #[test]
    fn option_text_keeps_inner_spaces() {
        match intent("option 2   Visual Studio Code ") {
            Msg::SetOption(1, text) => assert_eq!(text, "Visual Studio Code"),
            other => panic!("unexpected: {:?}", other),
        }
        match intent("q What is your  favourite editor?") {
            Msg::SetQuestion(text) => assert_eq!(text, "What is your  favourite editor?"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn ids_and_errors() {
        assert!(matches!(intent("OPEN 12"), Msg::OpenPoll(PollId(12))));
        assert!(matches!(intent("delete 3"), Msg::RequestDelete(PollId(3))));
        assert_eq!(
            parse_command("open").unwrap_err(),
            ParseError::MissingArgument {
                command: "open",
                argument: "a poll id"
            }
        );
        assert_eq!(
            parse_command("open abc").unwrap_err(),
            ParseError::InvalidNumber("abc".into())
        );
        assert_eq!(
            parse_command("dance").unwrap_err(),
            ParseError::Unknown("dance".into())
        );
        assert!(matches!(parse_command("   "), Ok(Input::Blank)));
        assert!(matches!(parse_command("help"), Ok(Input::Help)));
    }
}

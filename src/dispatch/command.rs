/// One classified line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Exit,
    Help,
    Status,
    /// `create <content>`; the file name is fixed, see [`CREATE_TARGET`].
    Create { content: String },
    Read { filename: String },
    Run { command: String },
    /// Anything else goes to the agent as a free-form task.
    Task(String),
}

/// Every `create` writes this file in the workspace, replacing what was there.
pub const CREATE_TARGET: &str = "user_file.txt";

impl Command {
    /// Classify a line. Surrounding whitespace is ignored; keywords match
    /// case-insensitively while payloads keep their case and inner spacing.
    /// First match wins, and anything unrecognized is a task.
    pub fn parse(line: &str) -> Command {
        let line = line.trim();

        if line.is_empty() {
            Command::Empty
        } else if line.eq_ignore_ascii_case("exit") {
            Command::Exit
        } else if line.eq_ignore_ascii_case("help") {
            Command::Help
        } else if line.eq_ignore_ascii_case("status") {
            Command::Status
        } else if let Some(content) = strip_keyword(line, "create ") {
            Command::Create {
                content: content.to_string(),
            }
        } else if let Some(filename) = strip_keyword(line, "read ") {
            Command::Read {
                filename: filename.to_string(),
            }
        } else if let Some(command) = strip_keyword(line, "run ") {
            Command::Run {
                command: command.to_string(),
            }
        } else {
            Command::Task(line.to_string())
        }
    }
}

/// `keyword` includes its trailing space, so what follows is everything after
/// the first space.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword)
        .then(|| &line[keyword.len()..])
}

//! This module defines the `Command` enum and its associated methods for parsing
//! and handling user commands in the FAT32 extraction tool.
//!
//! The `Command` enum represents the commands the user can input, such as opening a
//! volume image, extracting a file, tuning the session, or quitting the program.

/// Represents a user command in the FAT32 extraction tool.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Command to quit the program.
    Quit,
    /// Command to open a volume image, encapsulating the file path as a `String`.
    Open(String),
    /// Command to print the decoded volume header.
    Info,
    /// Command to print the volume layout.
    Print,
    /// Extract a file: path inside the volume, optional destination on the host.
    Extract(String, Option<String>),
    /// Set the directory extracted files are written to.
    Out(String),
    /// Bound the length of the cluster chains that are followed.
    Limit(usize),
    /// Skip the strict boot sector validation
    Skip,
    /// Command for an unknown input, encapsulating the raw input as a `String`.
    Unknown(String),
    /// Command for invalid input, encapsulating an error message as a `String`.
    Invalid(String),
    /// Command for an empty input.
    Empty,
}

impl Command {
    /// Parses a string into a `Command` instance.
    ///
    /// # Parameters
    /// - `s`: A string slice representing the user input.
    ///
    /// # Returns
    /// - `Command::Quit` if the input is "quit".
    /// - `Command::Open` with the file path if the input starts with "open" followed by a valid argument.
    /// - `Command::Info` if the input is "info".
    /// - `Command::Print` if the input is "print".
    /// - `Command::Extract` if the input is "extract" followed by a path and an optional destination.
    /// - `Command::Out` if the input is "out" followed by a directory.
    /// - `Command::Limit` if the input is "limit" followed by an unsigned integer.
    /// - `Command::Skip` if the input is "skip".
    /// - `Command::Unknown` if the input does not match any known command.
    /// - `Command::Invalid` if a command is missing its argument or the argument cannot be parsed.
    /// - `Command::Empty` if the input is empty or contains only whitespace.
    pub fn from_string(s: &str) -> Self {
        let mut parts = s.split_whitespace();
        match parts.next() {
            Some("quit") => Command::Quit,
            Some("open") => match parts.next() {
                Some(arg) => Command::Open(arg.to_string()),
                None => Command::Invalid(String::from(
                    "Missing arg: 'open' expects the path to a volume image.",
                )),
            },
            Some("info") => Command::Info,
            Some("print") => Command::Print,
            Some("extract") => match parts.next() {
                Some(path) => Command::Extract(path.to_string(), parts.next().map(String::from)),
                None => Command::Invalid(String::from(
                    "Missing arg: 'extract' expects the path of a file inside the volume.",
                )),
            },
            Some("out") => match parts.next() {
                Some(dir) => Command::Out(dir.to_string()),
                None => Command::Invalid(String::from(
                    "Missing arg: 'out' expects the output directory.",
                )),
            },
            Some("limit") => match parts.next() {
                Some(arg) => match arg.parse::<usize>() {
                    Ok(n) => Command::Limit(n),
                    Err(_) => Command::Invalid(String::from(
                        "Arg parsing error: 'limit' expects an unsigned integer.",
                    )),
                },
                None => Command::Invalid(String::from(
                    "Missing arg: 'limit' expects the maximum chain length.",
                )),
            },
            Some("skip") => Command::Skip,
            Some(other) => Command::Unknown(other.to_string()),
            None => Command::Empty,
        }
    }
}

//! Inbound text classification
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

/// Keywords that open a reminder request, followed by `/` (optionally after a space)
pub const REMINDER_KEYWORDS: [&str; 2] = ["یادآوری", "reminder"];

/// Recognised slash commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Join,
    SetAdmin(Option<String>),
    RemoveAdmin(Option<String>),
    Reminders,
    Unknown(String),
}

/// What an inbound text asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound<'a> {
    Command(Command),
    /// Everything after the reminder keyword and slash
    ReminderRequest(&'a str),
    Text,
}

/// Why a reminder request body could not be split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    Empty,
    MissingTitle,
}

pub fn classify(text: &str) -> Inbound<'_> {
    let text = text.trim();
    if text.starts_with('/') {
        return Inbound::Command(parse_command(text));
    }
    match reminder_body(text) {
        Some(body) => Inbound::ReminderRequest(body),
        None => Inbound::Text,
    }
}

fn parse_command(text: &str) -> Command {
    let mut parts = text.split_whitespace();
    let head = parts.next().unwrap_or_default();
    // "/setadmin@SomeBot" addresses a specific bot in groups
    let name = head
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    let arg = parts.next().map(str::to_string);

    match name.as_str() {
        "start" => Command::Start,
        "join" => Command::Join,
        "setadmin" => Command::SetAdmin(arg),
        "removeadmin" => Command::RemoveAdmin(arg),
        "reminders" => Command::Reminders,
        _ => Command::Unknown(name),
    }
}

fn reminder_body(text: &str) -> Option<&str> {
    REMINDER_KEYWORDS.iter().find_map(|keyword| {
        let head = text.get(..keyword.len())?;
        if !head.eq_ignore_ascii_case(keyword) {
            return None;
        }
        let rest = text[keyword.len()..].trim_start();
        rest.strip_prefix('/').map(str::trim)
    })
}

/// Split `<date> <title>` at the first whitespace
pub fn split_request(body: &str) -> Result<(&str, &str), RequestError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(RequestError::Empty);
    }
    match body.split_once(char::is_whitespace) {
        Some((date, title)) if !title.trim().is_empty() => Ok((date, title.trim())),
        _ => Err(RequestError::MissingTitle),
    }
}

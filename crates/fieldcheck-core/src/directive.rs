//! Directive grammar.
//!
//! A directive is the raw constraint text attached to a field, e.g.
//! `omitempty,gt(0),lt(300)` or `required|choice(AZ,AK)|message='bad state: $value'`.
//! Parsing turns it into a [`Tag`]: an ordered list of [`Check`]s plus the
//! reserved modifier flags.

use serde::{Deserialize, Serialize};

const KEYWORD_OMITEMPTY: &str = "omitempty";
const KEYWORD_SKIP_PATH: &str = "skippath";
const KEYWORD_PRESENCE: &str = "presence";
const KEYWORD_REQUIRED: &str = "required";

/// Top-level delimiter between directive segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Separator {
    #[default]
    Comma,
    Pipe,
}

impl Separator {
    pub fn as_char(self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Pipe => '|',
        }
    }
}

/// One parsed, named constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Check {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Renders the check as it would appear in a directive, e.g. `gtField(min)`.
    pub fn call(&self) -> String {
        if self.parameters.is_empty() {
            self.name.clone()
        } else {
            format!("{}({})", self.name, self.parameters.join(","))
        }
    }
}

/// Parsed directive of a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub checks: Vec<Check>,
    pub required: bool,
    pub omitempty: bool,
    pub skip_path: bool,
    pub presence: bool,
}

impl Tag {
    /// Parse a comma separated directive.
    pub fn parse(raw: &str) -> Self {
        Self::parse_with(raw, Separator::Comma)
    }

    /// Parse a directive using the given top-level separator.
    ///
    /// Parenthesized argument lists and single-quoted text are atomic: the
    /// separator inside `choice(a,b)` never splits the segment.
    pub fn parse_with(raw: &str, separator: Separator) -> Self {
        let mut tag = Tag::default();
        if raw.trim().is_empty() {
            return tag;
        }

        let mut pending_message: Option<String> = None;
        let mut flag_text = String::new();

        for segment in split_segments(raw, separator.as_char()) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            if let Some((key, rest)) = key_value(segment) {
                match key.to_ascii_lowercase().as_str() {
                    "message" => {
                        let message = unquote(rest.trim()).to_string();
                        match tag.checks.last_mut() {
                            Some(check) if check.message.is_none() => {
                                check.message = Some(message)
                            }
                            _ => pending_message = Some(message),
                        }
                        continue;
                    }
                    "name" => {
                        flag_text.push_str(rest);
                        flag_text.push(' ');
                        let mut check = parse_call(rest.trim());
                        check.message = pending_message.take();
                        push_check(&mut tag, check);
                        continue;
                    }
                    _ => {
                        flag_text.push_str(segment);
                        flag_text.push(' ');
                        let mut check = Check::new(key.trim())
                            .with_parameters([unquote(rest.trim()).to_string()]);
                        check.message = pending_message.take();
                        push_check(&mut tag, check);
                        continue;
                    }
                }
            }

            flag_text.push_str(segment);
            flag_text.push(' ');
            let mut check = parse_call(segment);
            check.message = pending_message.take();
            push_check(&mut tag, check);
        }

        let lower = flag_text.to_ascii_lowercase();
        tag.required = lower.contains(KEYWORD_REQUIRED);
        tag.omitempty = lower.contains(KEYWORD_OMITEMPTY);
        tag.skip_path = lower.contains(KEYWORD_SKIP_PATH);
        tag.presence = lower.contains(KEYWORD_PRESENCE);
        tag
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty() && !self.omitempty && !self.skip_path && !self.presence
    }
}

fn push_check(tag: &mut Tag, check: Check) {
    if check.name.is_empty() || is_keyword(&check.name) {
        return;
    }
    tag.checks.push(check);
}

fn is_keyword(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == KEYWORD_OMITEMPTY || name == KEYWORD_SKIP_PATH || name == KEYWORD_PRESENCE
}

/// One pass split on `separator`, tracking parenthesis depth and quotes.
fn split_segments(raw: &str, separator: char) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0usize;

    for (idx, ch) in raw.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            _ if ch == separator && depth == 0 && !quoted => {
                segments.push(&raw[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    segments.push(&raw[start..]);
    segments
}

/// Splits `key=value` when `=` appears before any argument list.
fn key_value(segment: &str) -> Option<(&str, &str)> {
    let eq = segment.find('=')?;
    if let Some(paren) = segment.find('(')
        && paren < eq
    {
        return None;
    }
    let key = segment[..eq].trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key, &segment[eq + 1..]))
}

/// Parses `name(arg1, arg2)`; arguments are split on unquoted commas and trimmed.
fn parse_call(text: &str) -> Check {
    let Some(open) = text.find('(') else {
        return Check::new(text.trim());
    };
    let name = text[..open].trim();
    let mut args = &text[open + 1..];
    if let Some(close) = args.rfind(')') {
        args = &args[..close];
    }
    if args.trim().is_empty() {
        return Check::new(name);
    }
    let parameters = split_segments(args, ',')
        .into_iter()
        .map(|arg| unquote(arg.trim()));
    Check::new(name).with_parameters(parameters)
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
        .unwrap_or(text)
}

use std::fmt::Display;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    Malformed,
    /// a query/stage `type` tag this reader does not know
    UnknownStageKind(String),
    TooDeep { depth: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// location inside the query document, e.g. `/query/source-query/breakout/0`
    pub path: String,
    pub text: String,
}

impl ParseError {
    const MAX_TEXT: usize = 80;

    pub fn new(message: &str, path: &str, value: &Value) -> Self {
        let mut text = value.to_string();
        if text.len() > Self::MAX_TEXT {
            let mut cut = Self::MAX_TEXT;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
            text.push_str("...");
        }
        Self { kind: ParseErrorKind::Malformed, message: message.to_string(), path: path.to_string(), text }
    }

    pub fn unknown_stage_kind(kind: &str, path: &str, value: &Value) -> Self {
        Self { kind: ParseErrorKind::UnknownStageKind(kind.to_string()), ..Self::new("Unknown query type", path, value) }
    }

    pub fn too_deep(depth: usize, max: usize, path: &str, value: &Value) -> Self {
        Self { kind: ParseErrorKind::TooDeep { depth, max }, ..Self::new("Stage nesting too deep", path, value) }
    }

    pub fn err<T>(self) -> Result<T, ParseError> {
        Err(self)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParseError: {}\n  at {} -> '{}'", self.message, self.path, self.text)
    }
}

impl std::error::Error for ParseError {}

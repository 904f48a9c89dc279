//! Input scripts for the demo.
//!
//! A script is plain text where every character is typed as a key press and
//! angle-bracket tokens stand for everything else:
//!
//! | Token        | Meaning                                   |
//! |--------------|-------------------------------------------|
//! | `<down>`     | any key name, e.g. `enter`, `ctrl+u`, `esc` |
//! | `<focus>`    | the field gains focus                     |
//! | `<blur>`     | the field loses focus                     |
//! | `<wait:MS>`  | let MS milliseconds pass                  |
//! | `<hover:N>`  | pointer over visible option N             |
//! | `<click:N>`  | click visible option N                    |
//! | `<clear>`    | press the clear button                    |
//! | `<<`         | a literal `<`                             |

use std::str::FromStr;
use std::time::Duration;

use lookup_runtime::{KeyMsg, KeyType, UnknownKey};

/// One scripted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A key press.
    Key(KeyMsg),
    /// The field gains focus.
    Focus,
    /// The field loses focus.
    Blur,
    /// Let time pass.
    Wait(Duration),
    /// Pointer over a visible option.
    Hover(usize),
    /// Click on a visible option.
    Click(usize),
    /// Press the clear button.
    Clear,
}

/// Errors produced while parsing a script.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    /// A `<` without its closing `>`.
    #[error("unterminated token starting at byte {0}")]
    Unterminated(usize),
    /// A directive argument that is not a number.
    #[error("invalid argument {arg:?} for <{directive}>")]
    InvalidArgument {
        /// The directive name.
        directive: String,
        /// The offending argument.
        arg: String,
    },
    /// A token that names neither a directive nor a key.
    #[error(transparent)]
    UnknownKey(#[from] UnknownKey),
}

/// Parses a script into steps.
///
/// # Errors
///
/// Returns a [`ScriptError`] for unterminated tokens, bad directive
/// arguments, or unknown key names.
pub fn parse(script: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    let mut rest = script;
    let mut offset = 0;

    while let Some(c) = rest.chars().next() {
        if c != '<' {
            steps.push(Step::Key(KeyMsg::from_char(c)));
            offset += c.len_utf8();
            rest = &rest[c.len_utf8()..];
            continue;
        }
        if let Some(tail) = rest.strip_prefix("<<") {
            steps.push(Step::Key(KeyMsg::from_char('<')));
            offset += 2;
            rest = tail;
            continue;
        }
        let end = rest.find('>').ok_or(ScriptError::Unterminated(offset))?;
        steps.push(token(&rest[1..end])?);
        offset += end + 1;
        rest = &rest[end + 1..];
    }

    Ok(steps)
}

fn token(body: &str) -> Result<Step, ScriptError> {
    if let Some((directive, arg)) = body.split_once(':') {
        let directive = directive.trim();
        let bad = || ScriptError::InvalidArgument {
            directive: directive.to_string(),
            arg: arg.to_string(),
        };
        return match directive {
            "wait" => arg
                .trim()
                .parse()
                .map(|ms| Step::Wait(Duration::from_millis(ms)))
                .map_err(|_| bad()),
            "hover" => arg.trim().parse().map(Step::Hover).map_err(|_| bad()),
            "click" => arg.trim().parse().map(Step::Click).map_err(|_| bad()),
            _ => Err(UnknownKey(body.to_string()).into()),
        };
    }

    match body.trim() {
        "focus" => Ok(Step::Focus),
        "blur" => Ok(Step::Blur),
        "clear" => Ok(Step::Clear),
        name => Ok(Step::Key(KeyMsg::from_type(KeyType::from_str(name)?))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_typed() {
        let steps = parse("ab").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Key(KeyMsg::from_char('a')),
                Step::Key(KeyMsg::from_char('b')),
            ]
        );
    }

    #[test]
    fn test_directives() {
        let steps = parse("<focus><wait:400><hover:2><click:1><clear><blur>").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Focus,
                Step::Wait(Duration::from_millis(400)),
                Step::Hover(2),
                Step::Click(1),
                Step::Clear,
                Step::Blur,
            ]
        );
    }

    #[test]
    fn test_key_names() {
        let steps = parse("<down><Enter><escape>").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Key(KeyMsg::from_type(KeyType::Down)),
                Step::Key(KeyMsg::from_type(KeyType::Enter)),
                Step::Key(KeyMsg::from_type(KeyType::Esc)),
            ]
        );
    }

    #[test]
    fn test_escaped_angle_bracket() {
        let steps = parse("a<<b").unwrap();
        assert_eq!(steps[1], Step::Key(KeyMsg::from_char('<')));
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn test_multibyte_text() {
        let steps = parse("ü<down>").unwrap();
        assert_eq!(steps[0], Step::Key(KeyMsg::from_char('ü')));
        assert_eq!(steps[1], Step::Key(KeyMsg::from_type(KeyType::Down)));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("ab<down"), Err(ScriptError::Unterminated(2)));
        assert!(matches!(
            parse("<wait:soon>"),
            Err(ScriptError::InvalidArgument { .. })
        ));
        assert!(matches!(parse("<warp>"), Err(ScriptError::UnknownKey(_))));
        assert!(matches!(parse("<warp:1>"), Err(ScriptError::UnknownKey(_))));
    }
}

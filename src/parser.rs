use crate::lexer::{RedirectOp, Token};
use crate::redirect::{RedirectSpec, find_redirection};

/// A single command ready for dispatch.
///
/// `argv[0]` is the command name. The redirection operator and its target
/// filename are not part of `argv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleCommand {
    pub argv: Vec<String>,
    pub redirect: Option<RedirectSpec>,
}

/// Errors that can occur while turning tokens into a [`SimpleCommand`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParsingError {
    /// A second redirection operator, or an operator where a filename was expected.
    #[error("syntax error near unexpected token `{0}'")]
    UnexpectedToken(RedirectOp),
    /// A redirection operator ended the line.
    #[error("syntax error near unexpected token `newline'")]
    UnexpectedEnd,
    /// A redirection with nothing to run in front of it.
    #[error("syntax error: missing command before `{0}'")]
    MissingCommand(RedirectOp),
}

struct CommandBuilder {
    tokens: Vec<Token>,
    pos: usize,
}

impl CommandBuilder {
    fn from(tokens: Vec<Token>) -> Self {
        CommandBuilder { tokens, pos: 0 }
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn build(mut self) -> Result<Option<SimpleCommand>, ParsingError> {
        let Some((operator_index, stream, mode)) = find_redirection(&self.tokens) else {
            if self.tokens.is_empty() {
                return Ok(None);
            }
            let argv = self.tokens.into_iter().map(into_word).collect();
            return Ok(Some(SimpleCommand { argv, redirect: None }));
        };

        let argv: Vec<String> = self.tokens[..operator_index]
            .iter()
            .cloned()
            .map(into_word)
            .collect();
        self.pos = operator_index;
        let op = match self.consume() {
            Some(Token::Redirect(op)) => op,
            _ => unreachable!("find_redirection points at an operator"),
        };
        if argv.is_empty() {
            return Err(ParsingError::MissingCommand(op));
        }

        let filename = match self.consume() {
            Some(Token::Word(word)) => word,
            Some(Token::Redirect(next)) => return Err(ParsingError::UnexpectedToken(next)),
            None => return Err(ParsingError::UnexpectedEnd),
        };

        let mut ignored = Vec::new();
        while let Some(token) = self.consume() {
            match token {
                Token::Redirect(next) => return Err(ParsingError::UnexpectedToken(next)),
                Token::Word(word) => ignored.push(word),
            }
        }
        if !ignored.is_empty() {
            tracing::warn!(?ignored, "words after redirect target are ignored");
        }

        Ok(Some(SimpleCommand {
            argv,
            redirect: Some(RedirectSpec {
                stream,
                mode,
                filename,
                operator_index,
            }),
        }))
    }
}

fn into_word(token: Token) -> String {
    match token {
        Token::Word(word) => word,
        Token::Redirect(op) => op.to_string(),
    }
}

/// Builds the command for one input line.
///
/// Returns `Ok(None)` for a line without tokens.
pub fn construct_command(tokens: Vec<Token>) -> Result<Option<SimpleCommand>, ParsingError> {
    CommandBuilder::from(tokens).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::split_into_tokens;
    use crate::redirect::{RedirectMode, TargetStream};

    fn parse(line: &str) -> Result<Option<SimpleCommand>, ParsingError> {
        construct_command(split_into_tokens(line).unwrap())
    }

    #[test]
    fn test_empty_line_has_no_command() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn test_plain_command() {
        let cmd = parse(r#"ls -l "my dir""#).unwrap().unwrap();
        assert_eq!(cmd.argv, vec!["ls", "-l", "my dir"]);
        assert_eq!(cmd.redirect, None);
    }

    #[test]
    fn test_redirect_is_split_from_argv() {
        let cmd = parse("ls -l > out.txt").unwrap().unwrap();
        assert_eq!(cmd.argv, vec!["ls", "-l"]);
        assert_eq!(
            cmd.redirect,
            Some(RedirectSpec {
                stream: TargetStream::Stdout,
                mode: RedirectMode::Truncate,
                filename: "out.txt".to_string(),
                operator_index: 2,
            })
        );
    }

    #[test]
    fn test_stderr_append_redirect() {
        let cmd = parse("cat missing 2>> 'err log'").unwrap().unwrap();
        assert_eq!(cmd.argv, vec!["cat", "missing"]);
        let redirect = cmd.redirect.unwrap();
        assert_eq!(redirect.stream, TargetStream::Stderr);
        assert_eq!(redirect.mode, RedirectMode::Append);
        assert_eq!(redirect.filename, "err log");
    }

    #[test]
    fn test_words_after_target_are_ignored() {
        let cmd = parse("echo hi > out extra words").unwrap().unwrap();
        assert_eq!(cmd.argv, vec!["echo", "hi"]);
        assert_eq!(cmd.redirect.unwrap().filename, "out");
    }

    #[test]
    fn test_missing_filename() {
        assert_eq!(parse("echo hi >"), Err(ParsingError::UnexpectedEnd));
        assert_eq!(
            parse("echo hi >").unwrap_err().to_string(),
            "syntax error near unexpected token `newline'"
        );
    }

    #[test]
    fn test_operator_instead_of_filename() {
        assert_eq!(
            parse("echo hi > 2> x"),
            Err(ParsingError::UnexpectedToken(RedirectOp::StderrTruncate))
        );
    }

    #[test]
    fn test_second_redirection_is_rejected() {
        let err = parse("echo hi > a 2>> b").unwrap_err();
        assert_eq!(err, ParsingError::UnexpectedToken(RedirectOp::StderrAppend));
        assert_eq!(err.to_string(), "syntax error near unexpected token `2>>'");
    }

    #[test]
    fn test_redirect_without_command() {
        assert_eq!(
            parse("> out"),
            Err(ParsingError::MissingCommand(RedirectOp::Truncate))
        );
    }
}

use itertools::Itertools;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("Operator expression is empty")]
    Empty,
    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("Unexpected {found} at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    #[error("Invalid operator range '{start}-{end}'")]
    InvalidRange { start: String, end: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Comma,
    Dash,
    Times,
    Id(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Open => "'('".to_string(),
            Token::Close => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dash => "'-'".to_string(),
            Token::Times => "'x'".to_string(),
            Token::Id(id) => format!("identifier '{id}'"),
        }
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Splits a word such as `1x2` or `1x` into ids joined by composition.
///
/// Only words whose pieces are all numeric are split, so alphanumeric ids like `X0` stay
/// whole. A trailing `x` composes with whatever follows the word.
fn split_composed(word: &str, offset: usize) -> Option<Vec<(Token, usize)>> {
    if !word.contains(['x', 'X']) {
        return None;
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, c) in word.char_indices() {
        if c == 'x' || c == 'X' {
            pieces.push((start, &word[start..i]));
            start = i + 1;
        }
    }
    let tail = &word[start..];
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !pieces.iter().all(|(_, s)| numeric(s)) || !(tail.is_empty() || numeric(tail)) {
        return None;
    }

    let mut tokens = Vec::new();
    for (at, piece) in pieces {
        tokens.push((Token::Id(piece.to_string()), offset + at));
        tokens.push((Token::Times, offset + at + piece.len()));
    }
    if !tail.is_empty() {
        tokens.push((Token::Id(tail.to_string()), offset + start));
    }
    Some(tokens)
}

fn lex(expr: &str) -> Result<Vec<(Token, usize)>, ExpressionError> {
    let mut tokens: Vec<(Token, usize)> = Vec::new();
    let mut chars = expr.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '(' => Token::Open,
            ')' => Token::Close,
            ',' => Token::Comma,
            '-' => Token::Dash,
            '*' => Token::Times,
            'x' | 'X' if matches!(tokens.last(), Some((Token::Close, _))) => Token::Times,
            c if is_id_char(c) => {
                let mut word = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if !is_id_char(next) {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                let after_operand = matches!(
                    tokens.last(),
                    Some((Token::Id(_), _)) | Some((Token::Close, _))
                );
                if (word == "x" || word == "X") && after_operand {
                    Token::Times
                } else if let Some(split) = split_composed(&word, offset) {
                    tokens.extend(split);
                    continue;
                } else {
                    Token::Id(word)
                }
            }
            ch => return Err(ExpressionError::UnexpectedChar { ch, offset }),
        };
        tokens.push((token, offset));
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Result<(Token, usize), ExpressionError> {
        let item = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ExpressionError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(item)
    }

    fn unexpected(token: &Token, offset: usize) -> ExpressionError {
        ExpressionError::UnexpectedToken {
            found: token.describe(),
            offset,
        }
    }

    /// expr := alt (',' alt)*
    fn expression(&mut self) -> Result<Vec<Vec<Vec<String>>>, ExpressionError> {
        let mut alternatives = vec![self.alternative()?];
        while let Some(Token::Comma) = self.peek() {
            self.pos += 1;
            alternatives.push(self.alternative()?);
        }
        if let Some((token, offset)) = self.tokens.get(self.pos) {
            return Err(Self::unexpected(token, *offset));
        }
        Ok(alternatives)
    }

    /// alt := factor (['x'] factor)*
    fn alternative(&mut self) -> Result<Vec<Vec<String>>, ExpressionError> {
        let mut factors = vec![self.factor()?];
        loop {
            match self.peek() {
                Some(Token::Times) => {
                    self.pos += 1;
                    factors.push(self.factor()?);
                }
                Some(Token::Open) => factors.push(self.factor()?),
                _ => break,
            }
        }
        Ok(factors)
    }

    /// factor := '(' item (',' item)* ')' | item
    fn factor(&mut self) -> Result<Vec<String>, ExpressionError> {
        if let Some(Token::Open) = self.peek() {
            self.pos += 1;
            let mut ids = self.item()?;
            loop {
                match self.next()? {
                    (Token::Comma, _) => ids.extend(self.item()?),
                    (Token::Close, _) => break,
                    (token, offset) => return Err(Self::unexpected(&token, offset)),
                }
            }
            Ok(ids)
        } else {
            self.item()
        }
    }

    /// item := ID | ID '-' ID
    fn item(&mut self) -> Result<Vec<String>, ExpressionError> {
        let start = match self.next()? {
            (Token::Id(id), _) => id,
            (token, offset) => return Err(Self::unexpected(&token, offset)),
        };
        if let Some(Token::Dash) = self.peek() {
            self.pos += 1;
            let end = match self.next()? {
                (Token::Id(id), _) => id,
                (token, offset) => return Err(Self::unexpected(&token, offset)),
            };
            return expand_range(&start, &end);
        }
        Ok(vec![start])
    }
}

fn expand_range(start: &str, end: &str) -> Result<Vec<String>, ExpressionError> {
    let invalid = || ExpressionError::InvalidRange {
        start: start.to_string(),
        end: end.to_string(),
    };
    let (Ok(lo), Ok(hi)) = (start.parse::<i64>(), end.parse::<i64>()) else {
        return Err(invalid());
    };
    if lo > hi {
        return Err(invalid());
    }
    Ok((lo..=hi).map(|i| i.to_string()).collect())
}

/// Expands an operator expression into explicit operator-id sequences.
///
/// Each returned sequence lists operator ids left to right as written; composing them
/// in that order gives one rigid transform. Examples: `"1-3"` gives `[1] [2] [3]`,
/// `"(1,2)x(3,4)"` gives `[1,3] [1,4] [2,3] [2,4]`, and `"(1-60)(61)"` gives sixty
/// two-operator sequences.
pub fn expand_expression(expr: &str) -> Result<Vec<Vec<String>>, ExpressionError> {
    let tokens = lex(expr)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let alternatives = parser.expression()?;

    Ok(alternatives
        .into_iter()
        .flat_map(|factors| factors.into_iter().multi_cartesian_product())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(seqs: &[&[&str]]) -> Vec<Vec<String>> {
        seqs.iter()
            .map(|s| s.iter().map(|id| id.to_string()).collect())
            .collect()
    }

    #[test]
    fn single_id_and_range() {
        assert_eq!(expand_expression("1").unwrap(), ids(&[&["1"]]));
        assert_eq!(
            expand_expression("1-3").unwrap(),
            ids(&[&["1"], &["2"], &["3"]])
        );
    }

    #[test]
    fn comma_lists_with_and_without_parentheses() {
        assert_eq!(
            expand_expression("(1,2,5-6)").unwrap(),
            ids(&[&["1"], &["2"], &["5"], &["6"]])
        );
        assert_eq!(
            expand_expression("1, 3").unwrap(),
            ids(&[&["1"], &["3"]])
        );
    }

    #[test]
    fn composition_takes_cartesian_product_in_order() {
        let seqs = expand_expression("(1,2)x(1-2)").unwrap();
        assert_eq!(
            seqs,
            ids(&[&["1", "1"], &["1", "2"], &["2", "1"], &["2", "2"]])
        );
    }

    #[test]
    fn adjacent_groups_compose() {
        let seqs = expand_expression("(1-60)(61)").unwrap();
        assert_eq!(seqs.len(), 60);
        assert_eq!(seqs[0], vec!["1".to_string(), "61".to_string()]);
        assert_eq!(seqs[59], vec!["60".to_string(), "61".to_string()]);
    }

    #[test]
    fn x_between_numeric_ids_composes() {
        assert_eq!(expand_expression("1x2").unwrap(), ids(&[&["1", "2"]]));
        assert_eq!(
            expand_expression("1x(2,3)").unwrap(),
            ids(&[&["1", "2"], &["1", "3"]])
        );
        assert_eq!(
            expand_expression("1-2x3").unwrap(),
            ids(&[&["1", "3"], &["2", "3"]])
        );
        assert_eq!(
            expand_expression("1 x 2X3").unwrap(),
            ids(&[&["1", "2", "3"]])
        );
        assert_eq!(
            expand_expression("(1-2)x3").unwrap(),
            ids(&[&["1", "3"], &["2", "3"]])
        );
    }

    #[test]
    fn alphanumeric_ids_keep_their_x() {
        assert_eq!(expand_expression("X0").unwrap(), ids(&[&["X0"]]));
        assert_eq!(
            expand_expression("(P)x(X1)").unwrap(),
            ids(&[&["P", "X1"]])
        );
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        assert_eq!(expand_expression("  ").unwrap_err(), ExpressionError::Empty);
        assert_eq!(
            expand_expression("(1,2").unwrap_err(),
            ExpressionError::UnexpectedEnd
        );
        assert_eq!(
            expand_expression("3-1").unwrap_err(),
            ExpressionError::InvalidRange {
                start: "3".into(),
                end: "1".into()
            }
        );
        assert!(matches!(
            expand_expression("1)").unwrap_err(),
            ExpressionError::UnexpectedToken { offset: 1, .. }
        ));
        assert!(matches!(
            expand_expression("1;2").unwrap_err(),
            ExpressionError::UnexpectedChar { ch: ';', offset: 1 }
        ));
        assert!(matches!(
            expand_expression("A-B").unwrap_err(),
            ExpressionError::InvalidRange { .. }
        ));
    }
}

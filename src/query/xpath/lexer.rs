//! Tokenizer for the XPath subset.

use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Slash,
    DoubleSlash,
    LBracket,
    RBracket,
    LParen,
    RParen,
    At,
    Comma,
    Pipe,
    Dot,
    DotDot,
    Star,
    ColonColon,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Name(String),
    Literal(String),
    Number(f64),
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match ch {
            '/' => {
                chars.next();
                if next_is(&mut chars, '/') {
                    Token::DoubleSlash
                } else {
                    Token::Slash
                }
            }
            '[' => single(&mut chars, Token::LBracket),
            ']' => single(&mut chars, Token::RBracket),
            '(' => single(&mut chars, Token::LParen),
            ')' => single(&mut chars, Token::RParen),
            '@' => single(&mut chars, Token::At),
            ',' => single(&mut chars, Token::Comma),
            '|' => single(&mut chars, Token::Pipe),
            '*' => single(&mut chars, Token::Star),
            '=' => single(&mut chars, Token::Eq),
            '+' => single(&mut chars, Token::Plus),
            '-' => single(&mut chars, Token::Minus),
            '!' => {
                chars.next();
                if next_is(&mut chars, '=') {
                    Token::NotEq
                } else {
                    return Err(format!("expected '=' after '!' at offset {offset}"));
                }
            }
            '<' => {
                chars.next();
                if next_is(&mut chars, '=') { Token::Le } else { Token::Lt }
            }
            '>' => {
                chars.next();
                if next_is(&mut chars, '=') { Token::Ge } else { Token::Gt }
            }
            ':' => {
                chars.next();
                if next_is(&mut chars, ':') {
                    Token::ColonColon
                } else {
                    return Err(format!("namespace prefixes are not supported (offset {offset})"));
                }
            }
            '"' | '\'' => read_literal(&mut chars, ch, offset)?,
            '.' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '.')) => {
                        chars.next();
                        Token::DotDot
                    }
                    Some(&(_, d)) if d.is_ascii_digit() => {
                        let digits = read_while(&mut chars, |c| c.is_ascii_digit());
                        parse_number(&format!("0.{digits}"))?
                    }
                    _ => Token::Dot,
                }
            }
            c if c.is_ascii_digit() => {
                let mut number = read_while(&mut chars, |c| c.is_ascii_digit());
                if next_is(&mut chars, '.') {
                    number.push('.');
                    number.push_str(&read_while(&mut chars, |c| c.is_ascii_digit()));
                }
                parse_number(&number)?
            }
            c if c.is_alphabetic() || c == '_' => Token::Name(read_while(&mut chars, |c| {
                c.is_alphanumeric() || matches!(c, '-' | '_' | '.')
            })),
            other => return Err(format!("unexpected character '{other}' at offset {offset}")),
        };

        tokens.push(token);
    }

    Ok(tokens)
}

fn single(chars: &mut Peekable<CharIndices<'_>>, token: Token) -> Token {
    chars.next();
    token
}

fn next_is(chars: &mut Peekable<CharIndices<'_>>, expected: char) -> bool {
    chars.next_if(|&(_, c)| c == expected).is_some()
}

fn read_while(chars: &mut Peekable<CharIndices<'_>>, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some((_, c)) = chars.next_if(|&(_, c)| keep(c)) {
        out.push(c);
    }
    out
}

fn read_literal(
    chars: &mut Peekable<CharIndices<'_>>,
    quote: char,
    offset: usize,
) -> Result<Token, String> {
    chars.next();
    let mut value = String::new();
    for (_, c) in chars.by_ref() {
        if c == quote {
            return Ok(Token::Literal(value));
        }
        value.push(c);
    }
    Err(format!("unterminated string literal starting at offset {offset}"))
}

fn parse_number(text: &str) -> Result<Token, String> {
    text.parse::<f64>()
        .map(Token::Number)
        .map_err(|e| format!("invalid number '{text}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_default_pattern() {
        let tokens = tokenize(r#"//*[contains(@class, "hentry")]//img[1]"#).expect("tokenize");
        assert_eq!(
            tokens,
            vec![
                Token::DoubleSlash,
                Token::Star,
                Token::LBracket,
                Token::Name("contains".into()),
                Token::LParen,
                Token::At,
                Token::Name("class".into()),
                Token::Comma,
                Token::Literal("hentry".into()),
                Token::RParen,
                Token::RBracket,
                Token::DoubleSlash,
                Token::Name("img".into()),
                Token::LBracket,
                Token::Number(1.0),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_tokenize_operators_and_dots() {
        let tokens = tokenize("..//a[last()-1 != .5]").expect("tokenize");
        assert!(tokens.starts_with(&[Token::DotDot, Token::DoubleSlash]));
        assert!(tokens.contains(&Token::Minus));
        assert!(tokens.contains(&Token::NotEq));
        assert!(tokens.contains(&Token::Number(0.5)));
    }

    #[test]
    fn test_hyphenated_names() {
        let tokens = tokenize("starts-with").expect("tokenize");
        assert_eq!(tokens, vec![Token::Name("starts-with".into())]);
    }

    #[test]
    fn test_tokenize_errors() {
        assert!(tokenize(r#"//a[@href="x]"#).is_err());
        assert!(tokenize("//svg:image").is_err());
        assert!(tokenize("//a[1 ! 2]").is_err());
        assert!(tokenize("//a#b").is_err());
    }
}

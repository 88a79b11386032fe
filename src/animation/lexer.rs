/// A single lexical unit of a CSS property value
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Text(String),
}

impl Token {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Token::Number(value) => Some(*value),
            Token::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Token::Text(text) => Some(text),
            Token::Number(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Letter,
    Digit,
    Point,
    Minus,
    Hash,
    Percent,
    Space,
    Bracket,
    Unknown,
}

impl CharClass {
    fn of(c: char) -> Self {
        match c {
            'a'..='z' | 'A'..='Z' | '_' => CharClass::Letter,
            '0'..='9' => CharClass::Digit,
            '.' => CharClass::Point,
            '-' => CharClass::Minus,
            '#' => CharClass::Hash,
            '%' => CharClass::Percent,
            // commas separate function arguments just like whitespace
            ',' => CharClass::Space,
            c if c.is_whitespace() => CharClass::Space,
            '(' | ')' => CharClass::Bracket,
            _ => CharClass::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferKind {
    Numeric,
    Textual,
}

/// Accumulates characters of one token until a flush
struct Buffer {
    kind: BufferKind,
    text: String,
}

struct Lexer {
    buffer: Option<Buffer>,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new() -> Self {
        Self {
            buffer: None,
            tokens: Vec::new(),
        }
    }

    fn start(&mut self, kind: BufferKind, c: char) {
        self.flush();
        self.buffer = Some(Buffer {
            kind,
            text: c.to_string(),
        });
    }

    fn push(&mut self, c: char) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.text.push(c);
        }
    }

    fn flush(&mut self) {
        let Some(buffer) = self.buffer.take() else {
            return;
        };

        let token = match buffer.kind {
            BufferKind::Numeric => match buffer.text.parse::<f64>() {
                Ok(value) => Token::Number(value),
                // a lone sign or a doubled point is kept as text
                Err(_) => Token::Text(buffer.text),
            },
            BufferKind::Textual => Token::Text(buffer.text),
        };
        self.tokens.push(token);
    }

    fn feed(&mut self, c: char) {
        let class = CharClass::of(c);
        let current = self.buffer.as_ref().map(|b| b.kind);

        match (class, current) {
            (CharClass::Space | CharClass::Bracket, _) => self.flush(),
            (CharClass::Unknown, _) => {}

            (CharClass::Digit | CharClass::Point, Some(BufferKind::Numeric)) => self.push(c),
            (CharClass::Digit | CharClass::Minus, Some(BufferKind::Textual)) => self.push(c),
            (CharClass::Digit | CharClass::Point | CharClass::Minus, _) => {
                self.start(BufferKind::Numeric, c)
            }

            (CharClass::Letter | CharClass::Hash | CharClass::Percent, Some(BufferKind::Textual)) => {
                self.push(c)
            }
            (CharClass::Letter | CharClass::Hash | CharClass::Percent, _) => {
                self.start(BufferKind::Textual, c)
            }
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush();
        self.tokens
    }
}

/// Tokenize a raw property value into numbers and text fragments.
///
/// Characters outside the value grammar are dropped without flushing the
/// current buffer, so `1$0px` lexes as `10` followed by `px`.
pub fn lex(raw: &str) -> Vec<Token> {
    let mut lexer = Lexer::new();
    for c in raw.chars() {
        lexer.feed(c);
    }
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Token {
        Token::Text(s.to_string())
    }

    #[test]
    fn test_lex_number_with_unit() {
        assert_eq!(lex("640px"), vec![Token::Number(640.0), text("px")]);
        assert_eq!(lex("50%"), vec![Token::Number(50.0), text("%")]);
        assert_eq!(lex("-1.5em"), vec![Token::Number(-1.5), text("em")]);
        assert_eq!(lex(".5"), vec![Token::Number(0.5)]);
    }

    #[test]
    fn test_lex_multiple_values() {
        assert_eq!(
            lex("0 10px  5"),
            vec![
                Token::Number(0.0),
                Token::Number(10.0),
                text("px"),
                Token::Number(5.0)
            ]
        );
    }

    #[test]
    fn test_lex_color_and_keyword() {
        assert_eq!(lex("#ff00aa"), vec![text("#ff00aa")]);
        assert_eq!(lex("ease-in"), vec![text("ease-in")]);
        assert_eq!(lex("  block "), vec![text("block")]);
    }

    #[test]
    fn test_lex_transform_chain() {
        assert_eq!(
            lex("translate(10px, -20px) rotate(45deg)"),
            vec![
                text("translate"),
                Token::Number(10.0),
                text("px"),
                Token::Number(-20.0),
                text("px"),
                text("rotate"),
                Token::Number(45.0),
                text("deg"),
            ]
        );
        assert_eq!(lex("translate3d(1,2,3)")[0], text("translate3d"));
    }

    #[test]
    fn test_lex_drops_unknown_characters() {
        assert_eq!(lex("1$0px"), vec![Token::Number(10.0), text("px")]);
        assert_eq!(lex("!"), vec![]);
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn test_lex_unparsable_numeric_buffer_stays_text() {
        assert_eq!(lex("-"), vec![text("-")]);
        assert_eq!(lex("1.2.3"), vec![text("1.2.3")]);
    }
}

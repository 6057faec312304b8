//! Cell expression parser.
//!
//! Operands are lexed into placeholders first. Brackets are then resolved
//! innermost-first (the first `)` with the nearest `(` before it), each
//! bracket's contents reduced pairwise from left to right, and the flat
//! remainder reduced the same way.

use quadcell_geom::{DiagnosticKind, Diagnostics, ParseError};

use crate::tree::{Rule, RuleKey, RuleTree, SurfaceLeaf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Item(usize),
    Colon,
    Open { complement: bool },
    Close,
}

struct Reducer<'t> {
    text: &'t str,
    tree: RuleTree,
    slots: Vec<Option<RuleKey>>,
}

impl RuleTree {
    /// Parse a cell expression such as `"-1 2 (3 : -4) #(5 6) #7"`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_with(text, &mut Diagnostics::new())
    }

    /// Parse, noting ignored operators in `diagnostics`.
    pub fn parse_with(text: &str, diagnostics: &mut Diagnostics) -> Result<Self, ParseError> {
        let mut reducer = Reducer {
            text,
            tree: RuleTree::new(),
            slots: Vec::new(),
        };
        let mut tokens = reducer.lex()?;

        while let Some(close) = tokens.iter().position(|t| *t == Token::Close) {
            let open = tokens[..close]
                .iter()
                .rposition(|t| matches!(t, Token::Open { .. }))
                .ok_or_else(|| reducer.unmatched())?;
            let Token::Open { complement } = tokens[open] else {
                return Err(reducer.unmatched());
            };
            let inner = reducer
                .reduce(&tokens[open + 1..close], diagnostics)?
                .ok_or_else(|| ParseError::EmptyBracket {
                    text: text.to_string(),
                })?;
            let key = if complement {
                reducer.tree.insert(Rule::GroupComplement(inner))
            } else {
                inner
            };
            let item = reducer.place(key);
            tokens.drain(open..=close);
            tokens.insert(open, item);
        }
        if tokens.iter().any(|t| matches!(t, Token::Open { .. })) {
            return Err(reducer.unmatched());
        }

        let root = reducer
            .reduce(&tokens, diagnostics)?
            .ok_or_else(|| ParseError::MalformedExpression {
                text: text.to_string(),
                remaining: 0,
            })?;
        let unused = reducer.slots.iter().filter(|s| s.is_some()).count();
        if unused != 0 {
            return Err(ParseError::MalformedExpression {
                text: text.to_string(),
                remaining: unused + 1,
            });
        }
        reducer.tree.set_root(root);
        Ok(reducer.tree)
    }
}

impl Reducer<'_> {
    fn lex(&mut self) -> Result<Vec<Token>, ParseError> {
        let text = self.text;
        let bytes = text.as_bytes();
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i];
            match c {
                b' ' | b'\t' | b'\r' | b'\n' => i += 1,
                b':' => {
                    tokens.push(Token::Colon);
                    i += 1;
                }
                b'(' => {
                    tokens.push(Token::Open { complement: false });
                    i += 1;
                }
                b')' => {
                    tokens.push(Token::Close);
                    i += 1;
                }
                b'#' => match bytes.get(i + 1) {
                    Some(b'(') => {
                        tokens.push(Token::Open { complement: true });
                        i += 2;
                    }
                    Some(d) if d.is_ascii_digit() => {
                        let (number, end) = self.number(i + 1)?;
                        tokens.push(self.item(Rule::ObjectComplement(number)));
                        i = end;
                    }
                    _ => return Err(self.unexpected(i)),
                },
                b'+' | b'-' | b'0'..=b'9' => {
                    let (number, end) = self.number(i)?;
                    tokens.push(self.item(Rule::Surface(SurfaceLeaf::new(number))));
                    i = end;
                }
                _ => return Err(self.unexpected(i)),
            }
        }
        Ok(tokens)
    }

    fn number(&self, start: usize) -> Result<(i32, usize), ParseError> {
        let bytes = self.text.as_bytes();
        let mut end = start;
        if matches!(bytes.get(end), Some(b'+' | b'-')) {
            end += 1;
        }
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        let token = &self.text[start..end];
        let number = token.parse::<i32>().map_err(|_| ParseError::NonNumeric {
            token: token.to_string(),
            text: self.text.to_string(),
        })?;
        Ok((number, end))
    }

    fn item(&mut self, rule: Rule) -> Token {
        let key = self.tree.insert(rule);
        self.place(key)
    }

    fn place(&mut self, key: RuleKey) -> Token {
        self.slots.push(Some(key));
        Token::Item(self.slots.len() - 1)
    }

    fn take(&mut self, index: usize) -> Result<RuleKey, ParseError> {
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| ParseError::DanglingPlaceholder {
                index,
                text: self.text.to_string(),
            })
    }

    /// Fold a bracket-free run of tokens left to right. A pair joins as a
    /// union when a `:` separates it, otherwise as an intersection.
    fn reduce(&mut self, tokens: &[Token], diagnostics: &mut Diagnostics) -> Result<Option<RuleKey>, ParseError> {
        let mut acc: Option<RuleKey> = None;
        let mut union = false;
        for token in tokens {
            match *token {
                Token::Colon if acc.is_some() && !union => union = true,
                Token::Colon => diagnostics.note(
                    DiagnosticKind::IgnoredOperator,
                    format_args!("':' separates no operands in '{}'", self.text),
                ),
                Token::Item(index) => {
                    let key = self.take(index)?;
                    acc = Some(match acc {
                        None => key,
                        Some(left) if union => self.tree.insert(Rule::Union(left, key)),
                        Some(left) => self.tree.insert(Rule::Intersection(left, key)),
                    });
                    union = false;
                }
                Token::Open { .. } | Token::Close => return Err(self.unmatched()),
            }
        }
        if union {
            diagnostics.note(
                DiagnosticKind::IgnoredOperator,
                format_args!("trailing ':' in '{}'", self.text),
            );
        }
        Ok(acc)
    }

    fn unmatched(&self) -> ParseError {
        ParseError::UnmatchedBracket {
            text: self.text.to_string(),
        }
    }

    fn unexpected(&self, offset: usize) -> ParseError {
        ParseError::UnexpectedCharacter {
            found: self.text[offset..].chars().next().unwrap_or('#'),
            offset,
            text: self.text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(text: &str) -> String {
        let tree = RuleTree::parse(text).unwrap();
        assert!(tree.is_consistent());
        describe(&tree, tree.root().unwrap())
    }

    fn describe(tree: &RuleTree, key: RuleKey) -> String {
        match tree.rule(key).unwrap() {
            Rule::Intersection(a, b) => format!("I({},{})", describe(tree, *a), describe(tree, *b)),
            Rule::Union(a, b) => format!("U({},{})", describe(tree, *a), describe(tree, *b)),
            Rule::Surface(leaf) => leaf.signed_id().to_string(),
            Rule::ObjectComplement(n) => format!("#{n}"),
            Rule::GroupComplement(c) => format!("C({})", describe(tree, *c)),
            Rule::Constant(v) => v.to_string(),
        }
    }

    #[test]
    fn test_parse_shapes() {
        assert_eq!(shape("3 4"), "I(3,4)");
        assert_eq!(shape("3 : 4"), "U(3,4)");
        assert_eq!(shape("3 (4 : 5)"), "I(3,U(4,5))");
        assert_eq!(shape("-1 #(2 -3)"), "I(-1,C(I(2,-3)))");
        assert_eq!(shape("#12 +4"), "I(#12,4)");
        assert_eq!(shape("((7))"), "7");
    }

    #[test]
    fn test_left_to_right_reduction() {
        assert_eq!(shape("1 : 2 3"), "I(U(1,2),3)");
        assert_eq!(shape("1 2 : 3"), "U(I(1,2),3)");
        assert_eq!(shape("1 : 2 : 3 4"), "I(U(U(1,2),3),4)");
    }

    #[test]
    fn test_nested_brackets() {
        assert_eq!(shape("1 (2 (3 : 4)) : 5"), "U(I(1,I(2,U(3,4))),5)");
        assert_eq!(shape("#((1 : 2) 3)"), "C(I(U(1,2),3))");
    }

    #[test]
    fn test_stray_colons_ignored() {
        let mut diag = Diagnostics::new();
        let tree = RuleTree::parse_with(": 1 : : 2 :", &mut diag).unwrap();
        assert_eq!(describe(&tree, tree.root().unwrap()), "U(1,2)");
        assert_eq!(diag.count(DiagnosticKind::IgnoredOperator), 3);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            RuleTree::parse("1 (2 3"),
            Err(ParseError::UnmatchedBracket { .. })
        ));
        assert!(matches!(
            RuleTree::parse("1 2) 3"),
            Err(ParseError::UnmatchedBracket { .. })
        ));
        assert!(matches!(
            RuleTree::parse("1 ( ) 2"),
            Err(ParseError::EmptyBracket { .. })
        ));
        assert!(matches!(
            RuleTree::parse("1 x 2"),
            Err(ParseError::UnexpectedCharacter { found: 'x', offset: 2, .. })
        ));
        assert!(matches!(
            RuleTree::parse("1 # 2"),
            Err(ParseError::UnexpectedCharacter { found: '#', .. })
        ));
        assert!(matches!(
            RuleTree::parse("1 - 2"),
            Err(ParseError::NonNumeric { .. })
        ));
        assert!(matches!(
            RuleTree::parse("99999999999"),
            Err(ParseError::NonNumeric { .. })
        ));
        assert!(matches!(
            RuleTree::parse("   "),
            Err(ParseError::MalformedExpression { remaining: 0, .. })
        ));
    }

    #[test]
    fn test_error_carries_text() {
        let err = RuleTree::parse("4 (5").unwrap_err();
        assert!(err.to_string().contains("4 (5"));
    }
}

use core::fmt::{self, Display};
use logos::{Lexer, Logos};

#[derive(Logos, Debug, PartialEq)]
pub enum Token<'s> {
    #[token("(")]
    LPar,

    #[token(")")]
    RPar,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    /// start of an attribute list, such as `+{"label":"x"}`
    #[token("+{")]
    AttrOpen,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[regex("[^ \t\r\n\x0C(){}\\[\\],:\"]+")]
    #[regex("\"([^\"\\\\]|\\\\.)*\"", quoted)]
    Symb(&'s str),

    #[regex(r"[ \t\r\n\f]+")]
    #[regex(r"//[^\n]*")]
    Space,

    // Logos requires one token variant to handle errors,
    // it can be named anything you wish.
    #[error]
    Error,
}

impl<'s> Display for Token<'s> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let s = match self {
            Self::LPar => "(",
            Self::RPar => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::AttrOpen => "+{",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Symb(s) => s,
            Self::Space => " ",
            Self::Error => return Err(Default::default()),
        };
        s.fmt(f)
    }
}

/// Strip the surrounding quotes of a quoted symbol.
fn quoted<'s>(lex: &mut Lexer<'s, Token<'s>>) -> &'s str {
    let s = lex.slice();
    &s[1..s.len() - 1]
}

#[test]
fn tokens() {
    use alloc::vec::Vec;
    use Token::*;
    let toks: Vec<_> = crate::lex("(∀ x , :{\"a b\" -1}) +{ // c\n").collect();
    let expected = [
        LPar,
        Symb("∀"),
        Symb("x"),
        Comma,
        Colon,
        LBrace,
        Symb("a b"),
        Symb("-1"),
        RBrace,
        RPar,
        AttrOpen,
    ];
    assert_eq!(toks, expected);
}

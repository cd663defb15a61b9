// SPDX: CC0-1.0

// recursive descent over a closed grammar; infix precedence is handled with
// the Pratt-style binding powers defined on eval::BinOp

use crate::{
    eval::{BinOp, Expr},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, Tok, TokTyp},
    stdlib, Number,
};
use core::{fmt, iter::Peekable, num::ParseFloatError};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub enum ParseErrTyp {
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    ParenMismatch,
    UnknownName,
    ExpectedExpr,
    ExpectedParen,
    Trailing,
}

impl fmt::Display for ParseErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexErr(err) => write!(f, "{err}"),
            Self::ParseNum(err) => write!(f, "invalid number: {err}"),
            Self::ParenMismatch => write!(f, "mismatched parentheses"),
            Self::UnknownName => write!(f, "unknown function or constant"),
            Self::ExpectedExpr => write!(f, "expected a value"),
            Self::ExpectedParen => write!(f, "expected '(' after function name"),
            Self::Trailing => write!(f, "unexpected input after the expression"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

struct Parser<'src> {
    toks: Peekable<Lexer<'src>>,
    src: &'src Arc<String>,
}

pub fn parse(src: &Arc<String>) -> Result<Expr, ParseErr> {
    let mut parser = Parser {
        toks: Lexer::new(src).peekable(),
        src,
    };
    let expr = parser.expr_bp(0)?;
    parser.expect_end()?;
    Ok(expr)
}

impl Parser<'_> {
    fn next_tok(&mut self) -> Result<Option<Tok>, ParseErr> {
        self.toks.next().transpose().map_err(ParseErr::from)
    }

    fn peek_typ(&mut self) -> Result<Option<TokTyp>, ParseErr> {
        match self.toks.peek() {
            None => Ok(None),
            Some(Ok(tok)) => Ok(Some(tok.typ)),
            Some(Err(err)) => Err(err.clone().into()),
        }
    }

    // just past the end of the source, for errors with nothing left to point at
    fn end_loc(&self) -> SubStr {
        SubStr::new(Arc::clone(self.src), self.src.len(), 1)
    }

    fn expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseErr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek_typ()? {
                Some(TokTyp::Op(op)) => op,
                _ => break,
            };
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break;
            }
            self.next_tok()?; // consume the operator we peeked
            let rhs = self.expr_bp(r_bp)?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // unary minus binds tighter than '^', so -2^2 parses as (-2)^2
    fn unary(&mut self) -> Result<Expr, ParseErr> {
        if let Some(TokTyp::Op(BinOp::Sub)) = self.peek_typ()? {
            self.next_tok()?;
            Ok(Expr::Neg(Box::new(self.unary()?)))
        } else {
            self.atom()
        }
    }

    fn atom(&mut self) -> Result<Expr, ParseErr> {
        let tok = match self.next_tok()? {
            Some(tok) => tok,
            None => {
                return Err(ParseErr {
                    typ: ParseErrTyp::ExpectedExpr,
                    loc: self.end_loc(),
                })
            }
        };

        match tok.typ {
            TokTyp::Number => {
                let num: Number = match tok.loc.get().parse() {
                    Ok(val) => val,
                    Err(err) => {
                        return Err(ParseErr {
                            typ: ParseErrTyp::ParseNum(err),
                            loc: tok.loc,
                        })
                    }
                };
                Ok(Expr::Num(num))
            }

            TokTyp::Ident => {
                let name = tok.loc.get();
                if name == stdlib::X {
                    Ok(Expr::X)
                } else if let Some(val) = stdlib::lookup_const(name) {
                    Ok(Expr::Num(val))
                } else if let Some(fun) = stdlib::lookup_fun(name) {
                    self.call(fun, tok.loc.clone())
                } else {
                    Err(ParseErr {
                        typ: ParseErrTyp::UnknownName,
                        loc: tok.loc,
                    })
                }
            }

            TokTyp::OpenParen => {
                let inner = self.expr_bp(0)?;
                self.expect_close_paren()?;
                Ok(inner)
            }

            TokTyp::CloseParen | TokTyp::Op(_) => Err(ParseErr {
                typ: ParseErrTyp::ExpectedExpr,
                loc: tok.loc,
            }),

            TokTyp::XGreater
            | TokTyp::XLess
            | TokTyp::XEqual
            | TokTyp::XPipe
            | TokTyp::XComma
            | TokTyp::XOpenSquareBracket
            | TokTyp::XCloseSquareBracket
            | TokTyp::XOpenCurly
            | TokTyp::XCloseCurly => unreachable!("unsupported token survived until parsing"),
        }
    }

    fn call(&mut self, fun: crate::eval::Fun, name_loc: SubStr) -> Result<Expr, ParseErr> {
        match self.next_tok()? {
            Some(tok) if tok.typ == TokTyp::OpenParen => {}
            Some(tok) => {
                return Err(ParseErr {
                    typ: ParseErrTyp::ExpectedParen,
                    loc: tok.loc,
                })
            }
            None => {
                return Err(ParseErr {
                    typ: ParseErrTyp::ExpectedParen,
                    loc: name_loc,
                })
            }
        }
        let arg = self.expr_bp(0)?;
        self.expect_close_paren()?;
        Ok(Expr::Call(fun, Box::new(arg)))
    }

    fn expect_close_paren(&mut self) -> Result<(), ParseErr> {
        match self.next_tok()? {
            Some(tok) if tok.typ == TokTyp::CloseParen => Ok(()),
            Some(tok) => Err(ParseErr {
                typ: ParseErrTyp::ParenMismatch,
                loc: tok.loc,
            }),
            None => Err(ParseErr {
                typ: ParseErrTyp::ParenMismatch,
                loc: self.end_loc(),
            }),
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseErr> {
        match self.next_tok()? {
            None => Ok(()),
            Some(tok) => Err(ParseErr {
                typ: if tok.typ == TokTyp::CloseParen {
                    ParseErrTyp::ParenMismatch
                } else {
                    ParseErrTyp::Trailing
                },
                loc: tok.loc,
            }),
        }
    }
}

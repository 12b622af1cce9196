//! Winnow parser for the grammar notation.
//!
//! Parsing works directly on the source text; whitespace and comments are
//! skipped in front of every token. The public entry point is
//! [`parse_grammar`].

use winnow::{
    Parser as _,
    ascii::multispace1,
    combinator::{alt, cut_err, delimited, eof, opt, preceded, repeat, separated, terminated},
    error::{ContextError, ErrMode},
    stream::LocatingSlice,
    token::{one_of, take_till, take_until, take_while},
};

use trestle_core::expr::{Expr, Production};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
};

/// Context attached to parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// What the parser expected at the failure position
    Expected(&'static str),
    /// A delimited token that was opened but never closed
    Unterminated(ErrorCode),
}

type Input<'src> = LocatingSlice<&'src str>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// Parses a whole grammar.
pub(crate) fn parse_grammar(source: &str) -> Result<Vec<Production>, Diagnostic> {
    grammar
        .parse(LocatingSlice::new(source))
        .map_err(|err| to_diagnostic(source, err.offset(), err.inner()))
}

fn grammar(input: &mut Input<'_>) -> IResult<Vec<Production>> {
    let productions = repeat(0.., production).parse_next(input)?;
    ws.parse_next(input)?;
    eof.context(Context::Expected("a production"))
        .parse_next(input)?;
    Ok(productions)
}

fn production(input: &mut Input<'_>) -> IResult<Production> {
    let name = preceded(ws, name).parse_next(input)?;
    cut_err(preceded(ws, alt(("::=", "="))))
        .context(Context::Expected("`=` or `::=`"))
        .parse_next(input)?;
    let expr = expression.parse_next(input)?;
    cut_err(preceded(ws, alt(('.', ';'))))
        .context(Context::Expected("`|`, a factor, `.` or `;`"))
        .parse_next(input)?;
    Ok(Production::new(name, expr))
}

fn expression(input: &mut Input<'_>) -> IResult<Expr> {
    let mut terms: Vec<Expr> = separated(1.., term, preceded(ws, '|')).parse_next(input)?;
    Ok(if terms.len() == 1 {
        terms.remove(0)
    } else {
        Expr::alternation(terms)
    })
}

fn term(input: &mut Input<'_>) -> IResult<Expr> {
    let mut factors: Vec<Expr> = repeat(0.., factor).parse_next(input)?;
    Ok(match factors.len() {
        0 => Expr::Empty,
        1 => factors.remove(0),
        _ => Expr::sequence(factors),
    })
}

fn factor(input: &mut Input<'_>) -> IResult<Expr> {
    preceded(
        ws,
        alt((
            literal,
            name.map(|name: &str| Expr::identifier(name)),
            group,
            option,
            repetition,
        )),
    )
    .parse_next(input)
}

fn group(input: &mut Input<'_>) -> IResult<Expr> {
    delimited('(', expression, closing(')', "`)`")).parse_next(input)
}

fn option(input: &mut Input<'_>) -> IResult<Expr> {
    delimited('[', expression, closing(']', "`]`"))
        .map(Expr::optional)
        .parse_next(input)
}

fn repetition(input: &mut Input<'_>) -> IResult<Expr> {
    let body = delimited('{', expression, closing('}', "`}`")).parse_next(input)?;
    let at_least_once = opt(preceded(ws, '+')).parse_next(input)?.is_some();
    Ok(if at_least_once {
        Expr::repeat_one(body)
    } else {
        Expr::repeat(body)
    })
}

fn closing<'src>(
    delimiter: char,
    expected: &'static str,
) -> impl FnMut(&mut Input<'src>) -> IResult<char> {
    move |input: &mut Input<'src>| {
        cut_err(preceded(ws, delimiter))
            .context(Context::Expected(expected))
            .parse_next(input)
    }
}

fn literal(input: &mut Input<'_>) -> IResult<Expr> {
    alt((quoted('"'), quoted('\'')))
        .map(|text: &str| {
            if text.is_empty() {
                Expr::Empty
            } else {
                Expr::literal(text)
            }
        })
        .parse_next(input)
}

fn quoted<'src>(quote: char) -> impl FnMut(&mut Input<'src>) -> IResult<&'src str> {
    move |input: &mut Input<'src>| {
        preceded(
            quote,
            cut_err(terminated(take_till(0.., [quote, '\n']), quote))
                .context(Context::Unterminated(ErrorCode::E001)),
        )
        .parse_next(input)
    }
}

fn name<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    alt((
        preceded(
            '<',
            cut_err(terminated(take_till(1.., ['>', '\n']), '>'))
                .context(Context::Unterminated(ErrorCode::E003)),
        ),
        (
            one_of(|c: char| c.is_alphabetic() || c == '_'),
            take_while(0.., |c: char| c.is_alphanumeric() || c == '_' || c == '-'),
        )
            .take(),
    ))
    .parse_next(input)
}

fn ws(input: &mut Input<'_>) -> IResult<()> {
    repeat(0.., alt((multispace1.void(), block_comment, line_comment))).parse_next(input)
}

fn block_comment(input: &mut Input<'_>) -> IResult<()> {
    preceded(
        "(*",
        cut_err(terminated(take_until(0.., "*)"), "*)"))
            .context(Context::Unterminated(ErrorCode::E002)),
    )
    .void()
    .parse_next(input)
}

fn line_comment(input: &mut Input<'_>) -> IResult<()> {
    preceded("//", take_till(0.., ['\n', '\r']))
        .void()
        .parse_next(input)
}

fn to_diagnostic(source: &str, offset: usize, error: &ContextError<Context>) -> Diagnostic {
    let found = source.get(offset..).and_then(|rest| rest.chars().next());
    let span = Span::new(offset..offset + found.map_or(0, char::len_utf8));

    let mut expected = Vec::new();
    let mut unterminated = None;
    for context in error.context() {
        match context {
            Context::Expected(what) => expected.push(*what),
            Context::Unterminated(code) => {
                unterminated.get_or_insert(*code);
            }
        }
    }

    let diagnostic = match (unterminated, found) {
        (Some(code), _) => Diagnostic::error(code.description())
            .with_code(code)
            .with_label(span, "missing closing delimiter"),
        (None, Some(c)) => Diagnostic::error(format!("unexpected character `{}`", c.escape_default()))
            .with_code(ErrorCode::E100)
            .with_label(span, "not expected here"),
        (None, None) => Diagnostic::error("unexpected end of input")
            .with_code(ErrorCode::E101)
            .with_label(span, "input ends here"),
    };

    if expected.is_empty() {
        diagnostic
    } else {
        diagnostic.with_help(format!("expected {}", expected.join(" or ")))
    }
}

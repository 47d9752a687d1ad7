use cpphlsl_lang_symbols::*;
use cpphlsl_shared::StreamLocation;
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_until, take_while};
use nom::character::complete::{anychar, char, digit0, digit1, multispace1, one_of, satisfy};
use nom::combinator::{map, opt, recognize, rest, value};
use nom::multi::many1;
use nom::sequence::{pair, tuple};
use nom::IResult;

use cpphlsl_lang_symbols::SymbolClassifier::*;

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), opt(is_not("\n"))))(input)
}

// An unterminated block comment swallows the rest of the input
fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), alt((take_until("*/"), rest)), opt(tag("*/")))))(input)
}

fn whitespace(input: &str) -> IResult<&str, ()> {
    value((), many1(alt((multispace1, line_comment, block_comment))))(input)
}

fn number(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit1, opt(pair(char('.'), digit0))))(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

// Everything up to and including the matching quote, or to the end of input
fn quoted(input: &str) -> IResult<&str, &str> {
    let (after_open, quote) = one_of("\"'")(input)?;
    let length = match after_open.find(quote) {
        Some(end) => 1 + end + 1,
        None => input.len(),
    };
    Ok((&input[length..], &input[..length]))
}

fn delimiter(input: &str) -> IResult<&str, &str> {
    alt((tag("::"), tag(":")))(input)
}

fn operator(input: &str) -> IResult<&str, &str> {
    alt((
        alt((
            tag("=="), tag("!="), tag("<="), tag(">="), tag("&&"), tag("||"),
            tag("<<"), tag(">>"), tag("++"), tag("--"), tag("->"),
        )),
        alt((
            tag("+="), tag("-="), tag("*="), tag("/="), tag("%="),
            tag("&="), tag("|="), tag("^="),
        )),
        recognize(one_of("+-*/%<>=!&|^~.?")),
    ))(input)
}

fn operator_classifier(op: &str) -> SymbolClassifier {
    match op {
        "+" | "-" | "*" | "/" | "%" | "++" | "--" => OperatorArithmetic,
        "<" | ">" | "<=" | ">=" | "==" | "!=" => OperatorRelational,
        "&&" | "||" | "!" => OperatorLogical,
        "&" | "|" | "^" | "~" | "<<" | ">>" => OperatorBitwise,
        "." | "->" => OperatorMember,
        "?" => OperatorConditional,
        _ => OperatorAssignment,
    }
}

fn token(input: &str) -> IResult<&str, (SymbolClassifier, &str)> {
    alt((
        map(quoted, |text| (StringQuote, text)),
        map(number, |text| (NumberLiteral, text)),
        map(word, |text| (if is_keyword(text) { Keyword } else { Identifier }, text)),
        map(recognize(one_of("({[")), |text| (GrouperOpen, text)),
        map(recognize(one_of(")}]")), |text| (GrouperClose, text)),
        map(tag(";"), |text| (StatementTerminator, text)),
        map(tag(","), |text| (Punctuator, text)),
        map(delimiter, |text| (Delimiter, text)),
        map(operator, |text| (operator_classifier(text), text)),
        map(recognize(anychar), |text| (Reserved, text)),
    ))(input)
}

/// Split source text into classified symbols
///
/// Lexing does not fail: characters the grammar has no use for are emitted as
/// `Reserved` symbols and left for the parser to skip.
pub fn lex(source: &str) -> Symbols {
    let mut stream = Vec::new();
    let mut remaining = source;
    loop {
        if let Ok((rest, ())) = whitespace(remaining) {
            remaining = rest;
        }
        if remaining.is_empty() {
            break;
        }
        let (rest, (classifier, text)) = match token(remaining) {
            Ok(result) => result,
            // The last alternative accepts any character
            Err(_) => break,
        };
        stream.push(Symbol {
            offset: StreamLocation((source.len() - remaining.len()) as u64),
            classifier: classifier,
            text: text.to_string(),
            index: stream.len() as u32,
        });
        remaining = rest;
    }
    log::trace!("lexed {} symbols from {} bytes", stream.len(), source.len());
    Symbols {
        stream: stream,
        source_length: source.len() as u64,
    }
}

#[cfg(test)]
fn classify(source: &str) -> Vec<(SymbolClassifier, String)> {
    lex(source).stream.into_iter().map(|symbol| (symbol.classifier, symbol.text)).collect()
}

#[cfg(test)]
fn sym(classifier: SymbolClassifier, text: &str) -> (SymbolClassifier, String) {
    (classifier, text.to_string())
}

#[test]
fn test_whitespace() {
    assert!(whitespace("").is_err());
    assert_eq!(whitespace(" \t\r\n"), Ok(("", ())));
    assert_eq!(whitespace("// comment\nx"), Ok(("x", ())));
    assert_eq!(whitespace("//"), Ok(("", ())));
    assert_eq!(whitespace("/* a * b / c */x"), Ok(("x", ())));
    assert_eq!(whitespace("/* line 1\n line 2 */ x"), Ok(("x", ())));
    assert_eq!(whitespace("/* never closed"), Ok(("", ())));
}

#[test]
fn test_token() {
    assert_eq!(token("12 "), Ok((" ", (NumberLiteral, "12"))));
    assert_eq!(token("1.25f"), Ok(("f", (NumberLiteral, "1.25"))));
    assert_eq!(token("1.2.3"), Ok((".3", (NumberLiteral, "1.2"))));
    assert_eq!(token("_name0 "), Ok((" ", (Identifier, "_name0"))));
    assert_eq!(token("namespace{"), Ok(("{", (Keyword, "namespace"))));
    assert_eq!(token("namespaces"), Ok(("", (Identifier, "namespaces"))));
    assert_eq!(token("\"a b\" c"), Ok((" c", (StringQuote, "\"a b\""))));
    assert_eq!(token("'x'"), Ok(("", (StringQuote, "'x'"))));
    assert_eq!(token("\"open"), Ok(("", (StringQuote, "\"open"))));
    assert_eq!(token("{"), Ok(("", (GrouperOpen, "{"))));
    assert_eq!(token("]"), Ok(("", (GrouperClose, "]"))));
    assert_eq!(token(";"), Ok(("", (StatementTerminator, ";"))));
    assert_eq!(token(","), Ok(("", (Punctuator, ","))));
    assert_eq!(token("::x"), Ok(("x", (Delimiter, "::"))));
    assert_eq!(token(": x"), Ok((" x", (Delimiter, ":"))));
    assert_eq!(token("<= "), Ok((" ", (OperatorRelational, "<="))));
    assert_eq!(token("<<<"), Ok(("<", (OperatorBitwise, "<<"))));
    assert_eq!(token("&&"), Ok(("", (OperatorLogical, "&&"))));
    assert_eq!(token("+="), Ok(("", (OperatorAssignment, "+="))));
    assert_eq!(token("->x"), Ok(("x", (OperatorMember, "->"))));
    assert_eq!(token("?"), Ok(("", (OperatorConditional, "?"))));
    assert_eq!(token("= ="), Ok((" =", (OperatorAssignment, "="))));
    assert_eq!(token("#include"), Ok(("include", (Reserved, "#"))));
    assert_eq!(token("é"), Ok(("", (Reserved, "é"))));
}

#[test]
fn test_lex_stream() {
    assert_eq!(classify(""), vec![]);
    assert_eq!(classify("  // only a comment\n"), vec![]);

    assert_eq!(classify("float4 _pos CPP_HLSL_SEMANTIC_NAME(SV_POSITION);"), vec![
        sym(Identifier, "float4"),
        sym(Identifier, "_pos"),
        sym(Identifier, "CPP_HLSL_SEMANTIC_NAME"),
        sym(GrouperOpen, "("),
        sym(Identifier, "SV_POSITION"),
        sym(GrouperClose, ")"),
        sym(StatementTerminator, ";"),
    ]);

    assert_eq!(classify("unsigned int _id; /* note */ A::B<C> x"), vec![
        sym(Keyword, "unsigned"),
        sym(Keyword, "int"),
        sym(Identifier, "_id"),
        sym(StatementTerminator, ";"),
        sym(Identifier, "A"),
        sym(Delimiter, "::"),
        sym(Identifier, "B"),
        sym(OperatorRelational, "<"),
        sym(Identifier, "C"),
        sym(OperatorRelational, ">"),
        sym(Identifier, "x"),
    ]);
}

#[test]
fn test_lex_offsets_and_indices() {
    let symbols = lex("struct A\n{\n};");
    let summary = symbols.stream.iter().map(|s| (s.index, s.offset.0, &s.text[..])).collect::<Vec<_>>();
    assert_eq!(summary, vec![
        (0, 0, "struct"),
        (1, 7, "A"),
        (2, 9, "{"),
        (3, 11, "}"),
        (4, 12, ";"),
    ]);
    assert_eq!(symbols.source_length, 13);
}

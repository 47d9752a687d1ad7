use std::error;
use std::fmt;
use cpphlsl_shared::StreamLocation;
use cpphlsl_lang_symbols::*;
use cpphlsl_lang_meta::{NodeId, SyntaxClassifier, SyntaxTree};

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrorType {
    /// A closing grouper of the wrong kind
    GrouperMismatch,
    /// An opening grouper that is never closed
    NoMatchingGrouper,
    /// A construct followed by a symbol it can not be followed by
    WrongSuccessor,
}

impl ErrorType {
    pub fn description(&self) -> &'static str {
        match *self {
            ErrorType::GrouperMismatch => "grouper mismatch",
            ErrorType::NoMatchingGrouper => "no matching grouper",
            ErrorType::WrongSuccessor => "wrong successor",
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ErrorMessage {
    pub offset: StreamLocation,
    pub kind: ErrorType,
    pub text: String,
}

impl error::Error for ErrorMessage {}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind.description(), self.text)
    }
}

/// Result of searching for the partner of an opening grouper
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum GrouperMatch {
    Matched(usize),
    /// Position of a closing grouper that closes the wrong kind of group
    Mismatch(usize),
    Unmatched,
}

/// Grammar independent parsing state: a cursor over the symbols, the syntax
/// tree under construction and the errors reported so far
pub struct ParserKernel<'a> {
    symbols: &'a [Symbol],
    source_length: u64,
    cursor: usize,
    tree: SyntaxTree,
    errors: Vec<ErrorMessage>,
}

impl<'a> ParserKernel<'a> {
    pub fn new(symbols: &'a Symbols) -> ParserKernel<'a> {
        ParserKernel {
            symbols: &symbols.stream,
            source_length: symbols.source_length,
            cursor: 0,
            tree: SyntaxTree::new(),
            errors: vec![],
        }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Move the cursor forward. Moving past the end is refused.
    pub fn advance(&mut self, count: usize) -> bool {
        self.advance_to(self.cursor + count)
    }

    pub fn advance_to(&mut self, position: usize) -> bool {
        if position > self.symbols.len() {
            return false;
        }
        self.cursor = position;
        true
    }

    /// If there is a symbol `count` places after the cursor
    pub fn has_next(&self, count: usize) -> bool {
        self.has_next_at(self.cursor, count)
    }

    pub fn has_next_at(&self, at: usize, count: usize) -> bool {
        at + count < self.symbols.len()
    }

    pub fn symbol_at(&self, position: usize) -> &'a Symbol {
        assert!(position < self.symbols.len(),
                "symbol {} requested from a stream of {}",
                position,
                self.symbols.len());
        &self.symbols[position]
    }

    pub fn current(&self) -> &'a Symbol {
        self.symbol_at(self.cursor)
    }

    pub fn find_forward(&self, from: usize, text: &str) -> Option<usize> {
        self.symbols.iter().skip(from).position(|symbol| symbol.text == text).map(|found| from + found)
    }

    pub fn find_forward_either(&self, from: usize, first: &str, second: &str) -> Option<usize> {
        self.symbols
            .iter()
            .skip(from)
            .position(|symbol| symbol.text == first || symbol.text == second)
            .map(|found| from + found)
    }

    /// Find the grouper closing the one at `open`, respecting nesting
    pub fn find_matching_grouper(&self, open: usize) -> GrouperMatch {
        let first = self.symbol_at(open);
        assert_eq!(first.classifier, SymbolClassifier::GrouperOpen);
        let mut expected = vec![];
        for position in open..self.symbols.len() {
            let symbol = &self.symbols[position];
            match symbol.classifier {
                SymbolClassifier::GrouperOpen => {
                    if let Some(close) = closing_grouper(&symbol.text) {
                        expected.push(close);
                    }
                }
                SymbolClassifier::GrouperClose => {
                    match expected.pop() {
                        Some(close) if close == symbol.text => {
                            if expected.is_empty() {
                                return GrouperMatch::Matched(position);
                            }
                        }
                        _ => return GrouperMatch::Mismatch(position),
                    }
                }
                _ => {}
            }
        }
        GrouperMatch::Unmatched
    }

    /// Record an error at a symbol, or at the end of the source when the
    /// position is past the last symbol
    pub fn report_error(&mut self, position: usize, kind: ErrorType, detail: Option<String>) {
        let offset = match self.symbols.get(position) {
            Some(symbol) => symbol.offset,
            None => StreamLocation(self.source_length),
        };
        let text = match detail {
            Some(text) => text,
            None => kind.description().to_string(),
        };
        log::debug!("{:?} at byte {}: {}", kind, offset.0, text);
        self.errors.push(ErrorMessage {
            offset: offset,
            kind: kind,
            text: text,
        });
    }

    /// Describe the symbol at a position for error messages
    pub fn describe(&self, position: usize) -> String {
        match self.symbols.get(position) {
            Some(symbol) => format!("'{}'", symbol.text),
            None => "end of input".to_string(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn add_node(&mut self, parent: NodeId, classifier: SyntaxClassifier, symbol_index: usize) -> NodeId {
        assert!(symbol_index < self.symbols.len(),
                "syntax node refers to symbol {} which was never lexed",
                symbol_index);
        self.tree.add(parent, classifier, symbol_index as u32)
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn errors(&self) -> &[ErrorMessage] {
        &self.errors
    }

    pub fn need_to_continue_parsing(&self) -> bool {
        self.cursor < self.symbols.len()
    }

    pub fn finish(self) -> (SyntaxTree, Vec<ErrorMessage>) {
        (self.tree, self.errors)
    }
}

#[cfg(test)]
fn lex(source: &str) -> Symbols {
    cpphlsl_transform_lexer::lex(source)
}

#[test]
fn test_cursor() {
    let symbols = lex("a b c");
    let mut kernel = ParserKernel::new(&symbols);
    assert_eq!(kernel.current().text, "a");
    assert!(kernel.has_next(2));
    assert!(!kernel.has_next(3));
    assert!(kernel.advance(2));
    assert_eq!(kernel.current().text, "c");
    assert!(!kernel.advance(2));
    assert_eq!(kernel.position(), 2);
    assert!(kernel.need_to_continue_parsing());
    assert!(kernel.advance(1));
    assert!(!kernel.need_to_continue_parsing());
    assert!(kernel.advance_to(0));
    assert!(!kernel.advance_to(4));
    assert_eq!(kernel.position(), 0);
}

#[test]
#[should_panic]
fn test_symbol_out_of_range() {
    let symbols = lex("a");
    let kernel = ParserKernel::new(&symbols);
    kernel.symbol_at(1);
}

#[test]
fn test_find_forward() {
    let symbols = lex("a ; b } c ;");
    let kernel = ParserKernel::new(&symbols);
    assert_eq!(kernel.find_forward(0, ";"), Some(1));
    assert_eq!(kernel.find_forward(2, ";"), Some(5));
    assert_eq!(kernel.find_forward(0, "x"), None);
    assert_eq!(kernel.find_forward(9, ";"), None);
    assert_eq!(kernel.find_forward_either(2, ";", "}"), Some(3));
    assert_eq!(kernel.find_forward_either(4, "}", "c"), Some(4));
    assert_eq!(kernel.find_forward_either(6, "a", "b"), None);
}

#[test]
fn test_find_matching_grouper() {
    let symbols = lex("{ ( [ ] ) { } } ( ] {");
    let kernel = ParserKernel::new(&symbols);
    assert_eq!(kernel.find_matching_grouper(0), GrouperMatch::Matched(7));
    assert_eq!(kernel.find_matching_grouper(1), GrouperMatch::Matched(4));
    assert_eq!(kernel.find_matching_grouper(5), GrouperMatch::Matched(6));
    assert_eq!(kernel.find_matching_grouper(8), GrouperMatch::Mismatch(9));
    assert_eq!(kernel.find_matching_grouper(10), GrouperMatch::Unmatched);
}

#[test]
fn test_report_error() {
    let symbols = lex("x ;");
    let mut kernel = ParserKernel::new(&symbols);
    kernel.report_error(1, ErrorType::WrongSuccessor, Some("expected name".to_string()));
    kernel.report_error(5, ErrorType::NoMatchingGrouper, None);
    let (_, errors) = kernel.finish();
    assert_eq!(errors, vec![
        ErrorMessage { offset: StreamLocation(2), kind: ErrorType::WrongSuccessor, text: "expected name".to_string() },
        ErrorMessage { offset: StreamLocation(3), kind: ErrorType::NoMatchingGrouper, text: "no matching grouper".to_string() },
    ]);
    assert_eq!(errors[0].to_string(), "wrong successor: expected name");
}

#[test]
fn test_add_node() {
    let symbols = lex("namespace N");
    let mut kernel = ParserKernel::new(&symbols);
    let root = kernel.root();
    let ns = kernel.add_node(root, SyntaxClassifier::Namespace, 1);
    assert_eq!(kernel.tree().node(ns).symbol_index, Some(1));
    assert_eq!(kernel.tree().children(root), &[ns]);
}

#[test]
#[should_panic]
fn test_add_node_unknown_symbol() {
    let symbols = lex("namespace N");
    let mut kernel = ParserKernel::new(&symbols);
    let root = kernel.root();
    kernel.add_node(root, SyntaxClassifier::Namespace, 2);
}

use cpphlsl_shared::StreamLocation;

/// Lexical category of a symbol
///
/// Groupers and operators each occupy a contiguous range of discriminants so
/// membership can be tested with a range check.
#[repr(u8)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub enum SymbolClassifier {
    /// `:` and the scope separator `::`
    Delimiter,
    NumberLiteral,
    Keyword,

    GrouperOpen,
    GrouperClose,

    StringQuote,
    StatementTerminator,
    Punctuator,

    OperatorArithmetic,
    OperatorRelational,
    OperatorLogical,
    OperatorBitwise,
    OperatorAssignment,
    OperatorMember,
    OperatorConditional,

    Identifier,
    /// Characters with no meaning in the grammar
    Reserved,
}

impl SymbolClassifier {
    const GROUPER_FIRST: u8 = SymbolClassifier::GrouperOpen as u8;
    const GROUPER_LAST: u8 = SymbolClassifier::GrouperClose as u8;
    const OPERATOR_FIRST: u8 = SymbolClassifier::OperatorArithmetic as u8;
    const OPERATOR_LAST: u8 = SymbolClassifier::OperatorConditional as u8;

    pub fn is_grouper(self) -> bool {
        let tag = self as u8;
        tag >= Self::GROUPER_FIRST && tag <= Self::GROUPER_LAST
    }

    pub fn is_operator(self) -> bool {
        let tag = self as u8;
        tag >= Self::OPERATOR_FIRST && tag <= Self::OPERATOR_LAST
    }

    /// Identifiers and keywords
    pub fn is_word(self) -> bool {
        self == SymbolClassifier::Identifier || self == SymbolClassifier::Keyword
    }
}

/// Words promoted from identifiers to keywords
pub const KEYWORDS: &[&str] = &[
    "namespace",
    "struct",
    "class",
    "union",
    "enum",
    "typedef",
    "using",
    "template",
    "typename",
    "const",
    "static",
    "unsigned",
    "signed",
    "int",
    "float",
    "double",
    "bool",
    "char",
    "short",
    "long",
    "void",
    "public",
    "private",
    "protected",
    "virtual",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// The grouper that closes an opening grouper
pub fn closing_grouper(open: &str) -> Option<&'static str> {
    match open {
        "(" => Some(")"),
        "{" => Some("}"),
        "[" => Some("]"),
        _ => None,
    }
}

/// A classified token
#[derive(PartialEq, Debug, Clone)]
pub struct Symbol {
    pub offset: StreamLocation,
    pub classifier: SymbolClassifier,
    pub text: String,
    /// Position in the symbol stream
    pub index: u32,
}

impl Symbol {
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.classifier == SymbolClassifier::Keyword && self.text == text
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Symbols {
    pub stream: Vec<Symbol>,
    /// Byte length of the lexed source
    pub source_length: u64,
}

impl Symbols {
    pub fn len(&self) -> usize {
        self.stream.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }
}

#[test]
fn test_classifier_ranges() {
    use SymbolClassifier::*;
    assert!(GrouperOpen.is_grouper());
    assert!(GrouperClose.is_grouper());
    assert!(!StringQuote.is_grouper());
    assert!(!Keyword.is_grouper());

    for op in &[OperatorArithmetic, OperatorRelational, OperatorLogical, OperatorBitwise,
                OperatorAssignment, OperatorMember, OperatorConditional] {
        assert!(op.is_operator());
        assert!(!op.is_grouper());
    }
    assert!(!Punctuator.is_operator());
    assert!(!Identifier.is_operator());
    assert!(!Delimiter.is_operator());
}

#[test]
fn test_keywords() {
    assert!(is_keyword("namespace"));
    assert!(is_keyword("unsigned"));
    assert!(!is_keyword("uint"));
    assert!(!is_keyword("Namespace"));
    assert_eq!(closing_grouper("{"), Some("}"));
    assert_eq!(closing_grouper("<"), None);
}

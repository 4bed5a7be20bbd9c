//! Typed views over [`SyntaxNode`]s.
//!
//! Every wrapper is a thin newtype that checks the node kind on construction
//! and exposes the node's fields by name. Accessors return `Option` because
//! a tree produced from malformed input may be missing any piece.

use crate::SyntaxKind::{self, *};
use crate::{GreenNode, NodeOrToken, SyntaxNode, SyntaxToken};

pub trait AstNode {
    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized;

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized;

    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($($name:ident => $kind:ident),* $(,)?) => {$(
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == $kind
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                Self::can_cast(syntax.kind()).then_some(Self(syntax))
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    )*};
}

macro_rules! ast_enum {
    ($name:ident { $($variant:ident($ty:ident) => $kind:ident),* $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name {
            $($variant($ty),)*
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $($kind)|*)
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                let node = match syntax.kind() {
                    $($kind => Self::$variant($ty(syntax)),)*
                    _ => return None,
                };
                Some(node)
            }

            fn syntax(&self) -> &SyntaxNode {
                match self {
                    $(Self::$variant(it) => &it.0,)*
                }
            }
        }
    };
}

ast_node! {
    SourceFile => SOURCE_FILE,
    FileHashtag => FILE_HASHTAG,
    DialogueNode => DIALOGUE_NODE,
    TitleHeader => TITLE_HEADER,
    WhenHeader => WHEN_HEADER,
    WhenCondition => WHEN_CONDITION,
    GenericHeader => HEADER,
    Body => BODY,
    Block => BLOCK,
    LineStmt => LINE_STMT,
    LineText => LINE_TEXT,
    Interpolation => INTERPOLATION,
    LineCondition => LINE_CONDITION,
    Hashtag => HASHTAG,
    ShortcutOptionGroup => SHORTCUT_OPTION_GROUP,
    ShortcutOption => SHORTCUT_OPTION,
    LineGroup => LINE_GROUP,
    LineGroupItem => LINE_GROUP_ITEM,
    IfStmt => IF_STMT,
    IfClause => IF_CLAUSE,
    ElseIfClause => ELSE_IF_CLAUSE,
    ElseClause => ELSE_CLAUSE,
    OnceStmt => ONCE_STMT,
    OnceClause => ONCE_CLAUSE,
    OnceElseClause => ONCE_ELSE_CLAUSE,
    SetStmt => SET_STMT,
    CallStmt => CALL_STMT,
    DeclareStmt => DECLARE_STMT,
    TypeAnnotation => TYPE_ANNOTATION,
    EnumStmt => ENUM_STMT,
    EnumCase => ENUM_CASE,
    JumpStmt => JUMP_STMT,
    ReturnStmt => RETURN_STMT,
    CommandStmt => COMMAND_STMT,
    Name => NAME,
    ParenExpr => PAREN_EXPR,
    UnaryExpr => UNARY_EXPR,
    BinaryExpr => BINARY_EXPR,
    CallExpr => CALL_EXPR,
    ArgList => ARG_LIST,
    MemberExpr => MEMBER_EXPR,
    NumberExpr => NUMBER_EXPR,
    StringExpr => STRING_EXPR,
    VariableExpr => VARIABLE_EXPR,
    IdentExpr => IDENT_EXPR,
    BoolExpr => BOOL_EXPR,
    NullExpr => NULL_EXPR,
}

ast_enum!(Header {
    Title(TitleHeader) => TITLE_HEADER,
    When(WhenHeader) => WHEN_HEADER,
    Generic(GenericHeader) => HEADER,
});

ast_enum!(Stmt {
    Line(LineStmt) => LINE_STMT,
    ShortcutOptionGroup(ShortcutOptionGroup) => SHORTCUT_OPTION_GROUP,
    LineGroup(LineGroup) => LINE_GROUP,
    If(IfStmt) => IF_STMT,
    Once(OnceStmt) => ONCE_STMT,
    Set(SetStmt) => SET_STMT,
    Call(CallStmt) => CALL_STMT,
    Declare(DeclareStmt) => DECLARE_STMT,
    Enum(EnumStmt) => ENUM_STMT,
    Jump(JumpStmt) => JUMP_STMT,
    Return(ReturnStmt) => RETURN_STMT,
    Command(CommandStmt) => COMMAND_STMT,
    Block(Block) => BLOCK,
});

ast_enum!(Expr {
    Paren(ParenExpr) => PAREN_EXPR,
    Unary(UnaryExpr) => UNARY_EXPR,
    Binary(BinaryExpr) => BINARY_EXPR,
    Call(CallExpr) => CALL_EXPR,
    Member(MemberExpr) => MEMBER_EXPR,
    Number(NumberExpr) => NUMBER_EXPR,
    String(StringExpr) => STRING_EXPR,
    Variable(VariableExpr) => VARIABLE_EXPR,
    Ident(IdentExpr) => IDENT_EXPR,
    Bool(BoolExpr) => BOOL_EXPR,
    Null(NullExpr) => NULL_EXPR,
});

fn child<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

fn children<N: AstNode>(parent: &SyntaxNode) -> impl Iterator<Item = N> + use<N> {
    parent.children().filter_map(N::cast)
}

fn token(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent.tokens().find(|token| token.kind() == kind)
}

fn has_token(parent: &SyntaxNode, kind: SyntaxKind) -> bool {
    token(parent, kind).is_some()
}

impl SourceFile {
    /// Wraps the root of a parsed file.
    pub fn new_root(green: GreenNode) -> Self {
        debug_assert_eq!(green.kind(), SOURCE_FILE);
        Self(SyntaxNode::new_root(green))
    }

    pub fn file_hashtags(&self) -> impl Iterator<Item = FileHashtag> + use<> {
        children(&self.0)
    }

    /// Well-formed dialogue nodes. Nodes that failed to parse are wrapped in
    /// `ERROR` and are not returned here.
    pub fn nodes(&self) -> impl Iterator<Item = DialogueNode> + use<> {
        children(&self.0)
    }
}

impl FileHashtag {
    pub fn text(&self) -> Option<SyntaxToken> {
        token(&self.0, HASHTAG_TEXT)
    }
}

impl DialogueNode {
    pub fn headers(&self) -> impl Iterator<Item = Header> + use<> {
        children(&self.0)
    }

    /// The value of the first `title:` header.
    pub fn title(&self) -> Option<String> {
        let header = child::<TitleHeader>(&self.0)?;
        Some(header.title()?.text_trimmed().to_owned())
    }

    pub fn body(&self) -> Option<Body> {
        child(&self.0)
    }
}

impl TitleHeader {
    pub fn title(&self) -> Option<SyntaxToken> {
        token(&self.0, REST_OF_LINE)
    }
}

impl WhenHeader {
    pub fn condition(&self) -> Option<WhenCondition> {
        child(&self.0)
    }
}

/// The shape of a `when:` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhenKind {
    Always,
    Once,
    OnceIf(Option<Expr>),
    Expr(Expr),
}

impl WhenCondition {
    pub fn kind(&self) -> Option<WhenKind> {
        if has_token(&self.0, ALWAYS_KW) {
            return Some(WhenKind::Always);
        }

        let expr = child::<Expr>(&self.0);
        if has_token(&self.0, ONCE_KW) {
            return Some(if has_token(&self.0, IF_KW) {
                WhenKind::OnceIf(expr)
            } else {
                WhenKind::Once
            });
        }

        expr.map(WhenKind::Expr)
    }
}

impl GenericHeader {
    pub fn key(&self) -> Option<SyntaxToken> {
        token(&self.0, IDENT)
    }

    pub fn value(&self) -> Option<SyntaxToken> {
        token(&self.0, REST_OF_LINE)
    }
}

impl Body {
    pub fn statements(&self) -> impl Iterator<Item = Stmt> + use<> {
        children(&self.0)
    }

    pub fn is_closed(&self) -> bool {
        has_token(&self.0, BODY_END)
    }
}

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = Stmt> + use<> {
        children(&self.0)
    }
}

impl LineStmt {
    pub fn text(&self) -> Option<LineText> {
        child(&self.0)
    }

    pub fn condition(&self) -> Option<LineCondition> {
        child(&self.0)
    }

    pub fn hashtags(&self) -> impl Iterator<Item = Hashtag> + use<> {
        children(&self.0)
    }
}

/// One piece of a dialogue line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePart {
    Text(SyntaxToken),
    Escape(SyntaxToken),
    Interpolation(Interpolation),
}

impl LineText {
    pub fn parts(&self) -> impl Iterator<Item = LinePart> + use<> {
        self.0.children_with_tokens().filter_map(|element| match element {
            NodeOrToken::Token(token) if token.kind() == TEXT => Some(LinePart::Text(token)),
            NodeOrToken::Token(token) if token.kind() == TEXT_ESCAPE => {
                Some(LinePart::Escape(token))
            }
            NodeOrToken::Node(node) => Interpolation::cast(node).map(LinePart::Interpolation),
            NodeOrToken::Token(_) => None,
        })
    }
}

impl Interpolation {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.0)
    }
}

impl LineCondition {
    pub fn is_once(&self) -> bool {
        has_token(&self.0, ONCE_KW)
    }

    pub fn condition(&self) -> Option<Expr> {
        child(&self.0)
    }
}

impl Hashtag {
    pub fn text(&self) -> Option<SyntaxToken> {
        token(&self.0, HASHTAG_TEXT)
    }
}

impl ShortcutOptionGroup {
    pub fn options(&self) -> impl Iterator<Item = ShortcutOption> + use<> {
        children(&self.0)
    }

    /// Whether the group was closed by a blank line rather than by the end
    /// of the enclosing block.
    pub fn ends_with_blank_line(&self) -> bool {
        has_token(&self.0, BLANK_LINE)
    }
}

impl ShortcutOption {
    pub fn line(&self) -> Option<LineStmt> {
        child(&self.0)
    }

    pub fn block(&self) -> Option<Block> {
        child(&self.0)
    }
}

impl LineGroup {
    pub fn items(&self) -> impl Iterator<Item = LineGroupItem> + use<> {
        children(&self.0)
    }

    pub fn ends_with_blank_line(&self) -> bool {
        has_token(&self.0, BLANK_LINE)
    }
}

impl LineGroupItem {
    pub fn line(&self) -> Option<LineStmt> {
        child(&self.0)
    }

    pub fn block(&self) -> Option<Block> {
        child(&self.0)
    }
}

impl IfStmt {
    pub fn if_clause(&self) -> Option<IfClause> {
        child(&self.0)
    }

    pub fn else_if_clauses(&self) -> impl Iterator<Item = ElseIfClause> + use<> {
        children(&self.0)
    }

    pub fn else_clause(&self) -> Option<ElseClause> {
        child(&self.0)
    }
}

impl IfClause {
    pub fn condition(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn statements(&self) -> impl Iterator<Item = Stmt> + use<> {
        children(&self.0)
    }
}

impl ElseIfClause {
    pub fn condition(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn statements(&self) -> impl Iterator<Item = Stmt> + use<> {
        children(&self.0)
    }
}

impl ElseClause {
    pub fn statements(&self) -> impl Iterator<Item = Stmt> + use<> {
        children(&self.0)
    }
}

impl OnceStmt {
    pub fn once_clause(&self) -> Option<OnceClause> {
        child(&self.0)
    }

    pub fn else_clause(&self) -> Option<OnceElseClause> {
        child(&self.0)
    }
}

impl OnceClause {
    /// The `if` guard of `<<once if ...>>`.
    pub fn condition(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn statements(&self) -> impl Iterator<Item = Stmt> + use<> {
        children(&self.0)
    }
}

impl OnceElseClause {
    pub fn statements(&self) -> impl Iterator<Item = Stmt> + use<> {
        children(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl AssignOp {
    pub fn from_kind(kind: SyntaxKind) -> Option<Self> {
        let op = match kind {
            EQ | TO_KW => Self::Assign,
            PLUS_EQ => Self::Add,
            MINUS_EQ => Self::Sub,
            STAR_EQ => Self::Mul,
            SLASH_EQ => Self::Div,
            PERCENT_EQ => Self::Rem,
            _ => return None,
        };
        Some(op)
    }
}

impl SetStmt {
    pub fn variable(&self) -> Option<VariableExpr> {
        child(&self.0)
    }

    pub fn op(&self) -> Option<AssignOp> {
        self.0.tokens().find_map(|token| AssignOp::from_kind(token.kind()))
    }

    pub fn value(&self) -> Option<Expr> {
        children::<Expr>(&self.0).nth(1)
    }
}

impl CallStmt {
    pub fn call(&self) -> Option<CallExpr> {
        child(&self.0)
    }
}

impl DeclareStmt {
    pub fn variable(&self) -> Option<VariableExpr> {
        child(&self.0)
    }

    pub fn value(&self) -> Option<Expr> {
        children::<Expr>(&self.0).nth(1)
    }

    pub fn type_annotation(&self) -> Option<TypeAnnotation> {
        child(&self.0)
    }
}

impl TypeAnnotation {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }
}

impl EnumStmt {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    /// Cases in source order, including the ones nested in an indented block.
    pub fn cases(&self) -> impl Iterator<Item = EnumCase> + use<> {
        self.0.children().flat_map(|node| match node.kind() {
            BLOCK => node.children().filter_map(EnumCase::cast).collect::<Vec<_>>(),
            _ => EnumCase::cast(node).into_iter().collect(),
        })
    }
}

impl EnumCase {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn value(&self) -> Option<Expr> {
        child(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpTarget {
    Name(Name),
    Expr(Expr),
}

impl JumpStmt {
    pub fn is_detour(&self) -> bool {
        has_token(&self.0, DETOUR_KW)
    }

    pub fn target(&self) -> Option<JumpTarget> {
        if let Some(name) = child::<Name>(&self.0) {
            return Some(JumpTarget::Name(name));
        }
        let interpolation = child::<Interpolation>(&self.0)?;
        interpolation.expr().map(JumpTarget::Expr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPart {
    Text(SyntaxToken),
    Interpolation(Interpolation),
}

impl CommandStmt {
    pub fn parts(&self) -> impl Iterator<Item = CommandPart> + use<> {
        self.0.children_with_tokens().filter_map(|element| match element {
            NodeOrToken::Token(token) if token.kind() == COMMAND_TEXT => {
                Some(CommandPart::Text(token))
            }
            NodeOrToken::Node(node) => Interpolation::cast(node).map(CommandPart::Interpolation),
            NodeOrToken::Token(_) => None,
        })
    }

    pub fn hashtags(&self) -> impl Iterator<Item = Hashtag> + use<> {
        children(&self.0)
    }
}

impl Name {
    pub fn ident(&self) -> Option<SyntaxToken> {
        token(&self.0, IDENT)
    }

    pub fn text(&self) -> String {
        self.ident().map(|ident| ident.text_trimmed().to_owned()).unwrap_or_default()
    }
}

impl ParenExpr {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn from_kind(kind: SyntaxKind) -> Option<Self> {
        match kind {
            MINUS => Some(Self::Neg),
            BANG | NOT_KW => Some(Self::Not),
            _ => None,
        }
    }
}

impl UnaryExpr {
    pub fn op(&self) -> Option<UnaryOp> {
        self.0.tokens().find_map(|token| UnaryOp::from_kind(token.kind()))
    }

    pub fn operand(&self) -> Option<Expr> {
        child(&self.0)
    }
}

/// Binary operators with keyword and symbol spellings folded together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn from_kind(kind: SyntaxKind) -> Option<Self> {
        let op = match kind {
            AND_KW | AMP2 => Self::And,
            OR_KW | PIPE2 => Self::Or,
            XOR_KW | CARET => Self::Xor,
            EQ2 | IS_KW | EQ_KW => Self::Eq,
            NEQ | NEQ_KW => Self::Neq,
            LT | LT_KW => Self::Lt,
            GT | GT_KW => Self::Gt,
            LTEQ | LTE_KW => Self::Lte,
            GTEQ | GTE_KW => Self::Gte,
            PLUS => Self::Add,
            MINUS => Self::Sub,
            STAR => Self::Mul,
            SLASH => Self::Div,
            PERCENT => Self::Rem,
            _ => return None,
        };
        Some(op)
    }

    /// Binding power; higher binds tighter. Unary operators sit above all of
    /// these at [`UnaryOp::PRECEDENCE`].
    pub fn precedence(self) -> u8 {
        match self {
            Self::And | Self::Or | Self::Xor => 2,
            Self::Eq | Self::Neq => 3,
            Self::Lt | Self::Gt | Self::Lte | Self::Gte => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::Rem => 6,
        }
    }
}

impl UnaryOp {
    pub const PRECEDENCE: u8 = 7;
}

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn op_token(&self) -> Option<SyntaxToken> {
        self.0.tokens().find(|token| BinaryOp::from_kind(token.kind()).is_some())
    }

    pub fn op(&self) -> Option<BinaryOp> {
        self.op_token().and_then(|token| BinaryOp::from_kind(token.kind()))
    }

    pub fn rhs(&self) -> Option<Expr> {
        children::<Expr>(&self.0).nth(1)
    }
}

impl CallExpr {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn args(&self) -> impl Iterator<Item = Expr> + use<> {
        child::<ArgList>(&self.0).into_iter().flat_map(|args| children::<Expr>(&args.0))
    }
}

impl MemberExpr {
    /// The optional qualifier before the dot, as in `Food.Apple`.
    pub fn type_name(&self) -> Option<Name> {
        let name = child::<Name>(&self.0)?;
        let dot = token(&self.0, DOT)?;
        (name.syntax().text_range().end() <= dot.text_range().start()).then_some(name)
    }

    pub fn member(&self) -> Option<Name> {
        let dot = token(&self.0, DOT)?;
        children::<Name>(&self.0)
            .find(|name| name.syntax().text_range().start() >= dot.text_range().end())
    }
}

impl NumberExpr {
    pub fn value(&self) -> Option<f64> {
        token(&self.0, NUMBER)?.text_trimmed().parse().ok()
    }
}

impl StringExpr {
    /// The literal's contents with quotes stripped and escapes resolved.
    pub fn value(&self) -> Option<String> {
        let token = token(&self.0, STRING)?;
        let text = token.text_trimmed();
        let inner = text.strip_prefix('"')?;
        let inner = inner.strip_suffix('"').unwrap_or(inner);

        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => value.extend(chars.next()),
                c => value.push(c),
            }
        }
        Some(value)
    }
}

impl VariableExpr {
    /// The variable name without the `$` sigil.
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, IDENT)
    }
}

impl IdentExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, IDENT)
    }
}

impl BoolExpr {
    pub fn value(&self) -> Option<bool> {
        self.0.tokens().find_map(|token| match token.kind() {
            TRUE_KW => Some(true),
            FALSE_KW => Some(false),
            _ => None,
        })
    }
}

impl NullExpr {
    pub fn null_token(&self) -> Option<SyntaxToken> {
        token(&self.0, NULL_KW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_and_symbol_spellings_agree() {
        assert_eq!(BinaryOp::from_kind(AND_KW), BinaryOp::from_kind(AMP2));
        assert_eq!(BinaryOp::from_kind(IS_KW), Some(BinaryOp::Eq));
        assert_eq!(BinaryOp::from_kind(GTE_KW), BinaryOp::from_kind(GTEQ));
        assert_eq!(UnaryOp::from_kind(NOT_KW), UnaryOp::from_kind(BANG));
        assert_eq!(BinaryOp::from_kind(EQ), None);
    }

    #[test]
    fn precedence_ladder() {
        assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Add.precedence() > BinaryOp::Lt.precedence());
        assert!(BinaryOp::Lt.precedence() > BinaryOp::Eq.precedence());
        assert!(BinaryOp::Eq.precedence() > BinaryOp::And.precedence());
        assert!(UnaryOp::PRECEDENCE > BinaryOp::Mul.precedence());
    }
}

//! Recursive-descent parser: tokens to AST (spec §4.3).
//!
//! Follows the teacher's batch-parser shape (`Parser` holding the full
//! token vector plus a cursor, `logicaffeine_language::parser`) simplified
//! to Trace's single-pass grammar — no mode-trait split is needed since
//! Trace has one surface grammar, not logicaffeine's ambiguous-vs-logic
//! dual mode.

use crate::ast::{AstArenas, BinOp, Expr, Literal, Stmt, UnOp};
use crate::error::{ParseError, MAX_ERRORS};
use crate::token::{Keyword, Operator, Token, TokenKind};
use tracec_base::{Interner, Span, Symbol};

type PResult<T> = Result<T, ParseError>;

/// Parses a full program from `tokens`. Interned identifiers are written
/// into `interner`; AST nodes are allocated from `arenas`.
///
/// Errors accumulate up to [`MAX_ERRORS`] (spec §7); on a recoverable error
/// the parser skips to the next `Newline` at the current indentation and
/// resumes, so a single malformed statement doesn't hide the rest.
pub fn parse<'a>(
    tokens: Vec<Token>,
    interner: &mut Interner,
    arenas: &'a AstArenas<'a>,
) -> (Vec<&'a Stmt<'a>>, Vec<ParseError>) {
    let mut parser = Parser { tokens, pos: 0, interner, arenas, errors: Vec::new() };
    let mut statements = Vec::new();
    parser.skip_newlines();
    while !parser.at_eof() && parser.errors.len() < MAX_ERRORS {
        match parser.parse_statement() {
            Ok(stmt) => statements.push(stmt),
            Err(err) => {
                parser.errors.push(err);
                parser.resync();
            }
        }
        parser.skip_newlines();
    }
    (statements, parser.errors)
}

struct Parser<'a, 'i> {
    tokens: Vec<Token>,
    pos: usize,
    interner: &'i mut Interner,
    arenas: &'a AstArenas<'a>,
    errors: Vec<ParseError>,
}

impl<'a, 'i> Parser<'a, 'i> {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos.min(self.tokens.len() - 1)].span
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check_op(&self, op: Operator) -> bool {
        matches!(self.peek(), TokenKind::Operator(o) if *o == op)
    }

    fn check_kw(&self, kw: Keyword) -> bool {
        matches!(self.peek(), TokenKind::Keyword(k) if *k == kw)
    }

    fn eat_op(&mut self, op: Operator) -> bool {
        if self.check_op(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: Keyword) -> bool {
        if self.check_kw(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_op(&mut self, op: Operator, expected: &str) -> PResult<Token> {
        if self.check_op(op) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_kw(&mut self, kw: Keyword, expected: &str) -> PResult<Token> {
        if self.check_kw(kw) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            found: describe(self.peek()),
            expected: expected.to_string(),
            span: self.peek_span(),
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), TokenKind::Newline) {
            self.advance();
        }
    }

    /// Recovers from a parse error by skipping to the next `Newline` (spec
    /// §4.3 "Failure modes").
    fn resync(&mut self) {
        while !matches!(self.peek(), TokenKind::Newline | TokenKind::Eof) {
            self.advance();
        }
    }

    fn intern(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    // ---- statements ----------------------------------------------------

    fn parse_statement(&mut self) -> PResult<&'a Stmt<'a>> {
        match self.peek().clone() {
            TokenKind::Keyword(Keyword::Define) => self.parse_function_def(),
            TokenKind::Keyword(Keyword::Return) => self.parse_return(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::Loop) => self.parse_loop(),
            TokenKind::Keyword(Keyword::Break) => {
                let span = self.advance().span;
                Ok(self.arenas.alloc_stmt(Stmt::Break { span }))
            }
            TokenKind::Keyword(Keyword::Continue) => {
                let span = self.advance().span;
                Ok(self.arenas.alloc_stmt(Stmt::Continue { span }))
            }
            TokenKind::Keyword(Keyword::From) => self.parse_import(),
            TokenKind::Identifier(_) if self.next_is_assignment() => self.parse_assignment(),
            _ => {
                let expr = self.parse_expr()?;
                let span = expr.span();
                Ok(self.arenas.alloc_stmt(Stmt::ExpressionStmt { expr, span }))
            }
        }
    }

    /// `name is expr` at statement position is an assignment (spec §4.3);
    /// lookahead distinguishes it from `name is expr` appearing as an
    /// equality sub-expression of a larger statement (e.g. as an
    /// expression-statement `x is y is z` is ambiguous only in theory —
    /// Trace statements never embed a bare comparison as their head, so a
    /// leading `Identifier Keyword(Is)` is always the assignment form).
    fn next_is_assignment(&self) -> bool {
        matches!(self.peek(), TokenKind::Identifier(_))
            && matches!(
                self.tokens.get(self.pos + 1).map(|t| &t.kind),
                Some(TokenKind::Keyword(Keyword::Is))
            )
    }

    fn parse_assignment(&mut self) -> PResult<&'a Stmt<'a>> {
        let name_tok = self.advance();
        let start = name_tok.span;
        let name = match name_tok.kind {
            TokenKind::Identifier(s) => self.intern(&s),
            _ => unreachable!("next_is_assignment checked this"),
        };
        self.expect_kw(Keyword::Is, "'is'")?;
        let expr = self.parse_expr()?;
        let span = start.merge(expr.span());
        Ok(self.arenas.alloc_stmt(Stmt::Assignment { name, expr, span }))
    }

    /// `define name as: <block>` (spec §6.1). The body reads its argument as
    /// the magic name `arg` (spec §3.2 invariants); the parser synthesizes
    /// that binding rather than parsing a parameter list, since the surface
    /// grammar has none.
    fn parse_function_def(&mut self) -> PResult<&'a Stmt<'a>> {
        let start = self.expect_kw(Keyword::Define, "'define'")?.span;
        let name_tok = self.advance();
        let name = match name_tok.kind {
            TokenKind::Identifier(s) => self.intern(&s),
            _ => return Err(self.unexpected("a function name")),
        };
        self.expect_kw(Keyword::As, "'as'")?;
        self.expect_op(Operator::Colon, "':'")?;
        let body = self.parse_block()?;
        let param = self.intern("arg");
        let span = start.merge(self.peek_span());
        Ok(self.arenas.alloc_stmt(Stmt::FunctionDef { name, param, body, span }))
    }

    fn parse_return(&mut self) -> PResult<&'a Stmt<'a>> {
        let start = self.advance().span;
        let expr = if matches!(self.peek(), TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let span = expr.map(|e| start.merge(e.span())).unwrap_or(start);
        Ok(self.arenas.alloc_stmt(Stmt::Return { expr, span }))
    }

    fn parse_if(&mut self) -> PResult<&'a Stmt<'a>> {
        let start = self.expect_kw(Keyword::If, "'if'")?.span;
        let cond = self.parse_expr()?;
        self.expect_op(Operator::Colon, "':'")?;
        let then_body = self.parse_block()?;
        self.skip_newlines();
        let mut else_body = Vec::new();
        if self.check_kw(Keyword::Else) {
            self.advance();
            self.expect_op(Operator::Colon, "':'")?;
            else_body = self.parse_block()?;
        }
        let span = start.merge(self.peek_span());
        Ok(self.arenas.alloc_stmt(Stmt::If { cond, then_body, else_body, span }))
    }

    fn parse_loop(&mut self) -> PResult<&'a Stmt<'a>> {
        let start = self.expect_kw(Keyword::Loop, "'loop'")?.span;
        self.expect_kw(Keyword::While, "'while'")?;
        let cond = self.parse_expr()?;
        self.expect_op(Operator::Colon, "':'")?;
        let body = self.parse_block()?;
        let span = start.merge(self.peek_span());
        Ok(self.arenas.alloc_stmt(Stmt::Loop { cond, body, span }))
    }

    fn parse_import(&mut self) -> PResult<&'a Stmt<'a>> {
        let start = self.expect_kw(Keyword::From, "'from'")?.span;
        let module_tok = self.advance();
        let module = match module_tok.kind {
            TokenKind::Identifier(s) => self.intern(&s),
            _ => return Err(self.unexpected("a module name")),
        };
        self.expect_kw(Keyword::Import, "'import'")?;
        let mut names = Vec::new();
        loop {
            let name_tok = self.advance();
            match name_tok.kind {
                TokenKind::Identifier(s) => names.push(self.intern(&s)),
                _ => return Err(self.unexpected("an imported name")),
            }
            if !self.eat_op(Operator::Comma) {
                break;
            }
        }
        let span = start.merge(self.peek_span());
        Ok(self.arenas.alloc_stmt(Stmt::Import { module, names, span }))
    }

    /// A block is `Indent stmt+ Dedent` (spec §3.2: "ends with an implicit
    /// `Dedent`"). Blank lines inside are permitted and ignored (spec §4.3).
    fn parse_block(&mut self) -> PResult<Vec<&'a Stmt<'a>>> {
        self.skip_newlines();
        let open = self.peek_span();
        if !matches!(self.peek(), TokenKind::Indent) {
            return Err(ParseError::UnexpectedToken {
                found: describe(self.peek()),
                expected: "an indented block".to_string(),
                span: open,
            });
        }
        self.advance();
        let mut body = Vec::new();
        self.skip_newlines();
        while !matches!(self.peek(), TokenKind::Dedent | TokenKind::Eof) {
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.resync();
                }
            }
            self.skip_newlines();
        }
        if matches!(self.peek(), TokenKind::Dedent) {
            self.advance();
        } else {
            return Err(ParseError::UnclosedConstruct { construct: "block".to_string(), span: open });
        }
        Ok(body)
    }

    // ---- expressions: precedence climb (spec §4.3) ---------------------

    fn parse_expr(&mut self) -> PResult<&'a Expr<'a>> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> PResult<&'a Expr<'a>> {
        let mut lhs = self.parse_and()?;
        while self.eat_kw(Keyword::Or) {
            let rhs = self.parse_and()?;
            lhs = self.bin(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> PResult<&'a Expr<'a>> {
        let mut lhs = self.parse_not()?;
        while self.eat_kw(Keyword::And) {
            let rhs = self.parse_not()?;
            lhs = self.bin(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    /// Level 3: prefix `not`, binding looser than comparisons so `not a = b`
    /// parses as `not (a = b)`.
    fn parse_not(&mut self) -> PResult<&'a Expr<'a>> {
        if self.check_kw(Keyword::Not) {
            let start = self.advance().span;
            let operand = self.parse_not()?;
            let span = start.merge(operand.span());
            return Ok(self.arenas.alloc_expr(Expr::UnaryOp { op: UnOp::Not, operand, span }));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> PResult<&'a Expr<'a>> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Operator(Operator::Eq) => BinOp::Eq,
                TokenKind::Operator(Operator::Ne) => BinOp::Ne,
                TokenKind::Operator(Operator::Lt) => BinOp::Lt,
                TokenKind::Operator(Operator::Gt) => BinOp::Gt,
                TokenKind::Operator(Operator::Le) => BinOp::Le,
                TokenKind::Operator(Operator::Ge) => BinOp::Ge,
                TokenKind::Keyword(Keyword::Is) => BinOp::Eq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = self.bin(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> PResult<&'a Expr<'a>> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Operator(Operator::Plus) => BinOp::Add,
                TokenKind::Operator(Operator::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = self.bin(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult<&'a Expr<'a>> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Operator(Operator::Star) => BinOp::Mul,
                TokenKind::Operator(Operator::Slash) => BinOp::Div,
                TokenKind::Operator(Operator::Percent) => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = self.bin(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// Level 7: unary `-`. Binds tighter than the binary operators above it
    /// but looser than postfix (level 8), so `-fact of 5` is `-(fact of 5)`.
    fn parse_unary(&mut self) -> PResult<&'a Expr<'a>> {
        if self.check_op(Operator::Minus) {
            let start = self.advance().span;
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span());
            return Ok(self.arenas.alloc_expr(Expr::UnaryOp { op: UnOp::Neg, operand, span }));
        }
        self.parse_postfix()
    }

    /// Level 8: `of <arg>`, `[ index ]` (spec §4.3). `E1 of E2` always
    /// parses as `Call{callee: E1, arg: E2}` — the disambiguation the spec
    /// calls out is resolved entirely here: there is no separate "index
    /// call" AST node, `of` is always `Call`, and `[...]` is always `Index`.
    fn parse_postfix(&mut self) -> PResult<&'a Expr<'a>> {
        let mut expr = self.parse_atom()?;
        loop {
            if self.eat_kw(Keyword::Of) {
                let arg = self.parse_unary()?;
                let span = expr.span().merge(arg.span());
                expr = self.arenas.alloc_expr(Expr::Call { callee: expr, arg, span });
            } else if self.check_op(Operator::LBracket) {
                let open = self.advance().span;
                let index = self.parse_expr()?;
                let close = self.expect_op(Operator::RBracket, "']'")?.span;
                let span = open.merge(close);
                expr = self.arenas.alloc_expr(Expr::Index { target: expr, index, span: expr.span().merge(span) });
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> PResult<&'a Expr<'a>> {
        let span = self.peek_span();
        match self.peek().clone() {
            TokenKind::Number(v) => {
                self.advance();
                Ok(self.arenas.alloc_expr(Expr::Literal { value: Literal::Num(v), span }))
            }
            TokenKind::Str(bytes) => {
                self.advance();
                Ok(self.arenas.alloc_expr(Expr::Literal { value: Literal::Str(bytes), span }))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(self.arenas.alloc_expr(Expr::Literal { value: Literal::Bool(true), span }))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(self.arenas.alloc_expr(Expr::Literal { value: Literal::Bool(false), span }))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(self.arenas.alloc_expr(Expr::Literal { value: Literal::Null, span }))
            }
            TokenKind::Interrogative(which) => {
                self.advance();
                Ok(self.arenas.alloc_expr(Expr::Interrogative { which, span }))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                let name = self.intern(&name);
                Ok(self.arenas.alloc_expr(Expr::Identifier { name, span }))
            }
            TokenKind::Operator(Operator::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_op(Operator::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Operator(Operator::LBracket) => self.parse_list_or_comprehension(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// `[ e1, e2, … ]` or `[ expr for name in iterable (if filter)? ]`
    /// (spec §4.3 "Literals").
    fn parse_list_or_comprehension(&mut self) -> PResult<&'a Expr<'a>> {
        let open = self.advance().span;
        if self.check_op(Operator::RBracket) {
            let close = self.advance().span;
            return Ok(self.arenas.alloc_expr(Expr::List { elements: Vec::new(), span: open.merge(close) }));
        }
        let first = self.parse_expr()?;
        if self.check_kw(Keyword::For) {
            return self.finish_comprehension(open, first);
        }
        let mut elements = vec![first];
        while self.eat_op(Operator::Comma) {
            elements.push(self.parse_expr()?);
        }
        let close = self.expect_op(Operator::RBracket, "']'")?.span;
        Ok(self.arenas.alloc_expr(Expr::List { elements, span: open.merge(close) }))
    }

    fn finish_comprehension(&mut self, open: Span, expr: &'a Expr<'a>) -> PResult<&'a Expr<'a>> {
        self.expect_kw(Keyword::For, "'for'")?;
        let var_tok = self.advance();
        let var = match var_tok.kind {
            TokenKind::Identifier(s) => self.intern(&s),
            _ => return Err(self.unexpected("a loop variable")),
        };
        self.expect_kw(Keyword::In, "'in'")?;
        let iterable = self.parse_expr()?;
        let filter = if self.eat_kw(Keyword::If) { Some(self.parse_expr()?) } else { None };
        let close = self.expect_op(Operator::RBracket, "']'")?.span;
        Ok(self.arenas.alloc_expr(Expr::ListComprehension {
            expr,
            var,
            iterable,
            filter,
            span: open.merge(close),
        }))
    }

    fn bin(&mut self, op: BinOp, lhs: &'a Expr<'a>, rhs: &'a Expr<'a>) -> &'a Expr<'a> {
        let span = lhs.span().merge(rhs.span());
        self.arenas.alloc_expr(Expr::BinaryOp { op, lhs, rhs, span })
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(n) => format!("number {n}"),
        TokenKind::Str(_) => "string literal".to_string(),
        TokenKind::Identifier(name) => format!("identifier '{name}'"),
        TokenKind::Keyword(k) => format!("keyword '{k:?}'"),
        TokenKind::Operator(o) => format!("operator '{o:?}'"),
        TokenKind::Newline => "newline".to_string(),
        TokenKind::Indent => "indent".to_string(),
        TokenKind::Dedent => "dedent".to_string(),
        TokenKind::Interrogative(i) => format!("interrogative '{i:?}'"),
        TokenKind::Eof => "end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstArenas;
    use crate::lexer::lex;
    use tracec_base::Arena;

    fn parse_ok<'a>(src: &str, interner: &mut Interner, arenas: &'a AstArenas<'a>) -> Vec<&'a Stmt<'a>> {
        let (tokens, lex_errors) = lex(src);
        assert!(lex_errors.is_empty(), "{lex_errors:?}");
        let (stmts, errors) = parse(tokens, interner, arenas);
        assert!(errors.is_empty(), "{errors:?}");
        stmts
    }

    #[test]
    fn parses_simple_assignment() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let stmts = parse_ok("x is 42\n", &mut interner, &arenas);
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0], Stmt::Assignment { .. }));
    }

    #[test]
    fn of_is_always_a_call() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let stmts = parse_ok("print of x\n", &mut interner, &arenas);
        match stmts[0] {
            Stmt::ExpressionStmt { expr: Expr::Call { .. }, .. } => {}
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn index_uses_brackets() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let stmts = parse_ok("print of nums[1]\n", &mut interner, &arenas);
        match stmts[0] {
            Stmt::ExpressionStmt { expr: Expr::Call { arg: Expr::Index { .. }, .. }, .. } => {}
            other => panic!("expected Call(Index), got {other:?}"),
        }
    }

    #[test]
    fn is_in_expression_position_is_equality() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let stmts = parse_ok("if arg is 0:\n  return 1\n", &mut interner, &arenas);
        match stmts[0] {
            Stmt::If { cond: Expr::BinaryOp { op: BinOp::Eq, .. }, .. } => {}
            other => panic!("expected If(Eq), got {other:?}"),
        }
    }

    #[test]
    fn function_def_parses_block() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let stmts = parse_ok("define f as:\n  return arg + 1\n", &mut interner, &arenas);
        match stmts[0] {
            Stmt::FunctionDef { body, .. } => assert_eq!(body.len(), 1),
            other => panic!("expected FunctionDef, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_block_is_an_error() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let (tokens, _) = lex("define f as:\n");
        let (_, errors) = parse(tokens, &mut interner, &arenas);
        assert!(!errors.is_empty());
    }

    #[test]
    fn list_literal_and_comprehension() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let stmts = parse_ok("xs is [1, 2, 3]\n", &mut interner, &arenas);
        match stmts[0] {
            Stmt::Assignment { expr: Expr::List { elements, .. }, .. } => assert_eq!(elements.len(), 3),
            other => panic!("expected List, got {other:?}"),
        }

        let stmts2 = parse_ok("ys is [x * 2 for x in xs if x > 0]\n", &mut interner, &arenas);
        match stmts2[0] {
            Stmt::Assignment { expr: Expr::ListComprehension { filter: Some(_), .. }, .. } => {}
            other => panic!("expected ListComprehension with filter, got {other:?}"),
        }
    }

    #[test]
    fn precedence_climbs_correctly() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let stmts = parse_ok("y is 1 + 2 * 3\n", &mut interner, &arenas);
        match stmts[0] {
            Stmt::Assignment { expr: Expr::BinaryOp { op: BinOp::Add, rhs: Expr::BinaryOp { op: BinOp::Mul, .. }, .. }, .. } => {}
            other => panic!("expected 1 + (2 * 3), got {other:?}"),
        }
    }
}

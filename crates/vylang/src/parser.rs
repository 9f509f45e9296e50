//! Tokens → AST: recursive descent with an explicit
//! precedence ladder for expressions and look-ahead-driven statement
//! dispatch. Identifiers are interned as they're recognised so the rest
//! of the pipeline only ever carries `StringId`s.

use ahash::AHashMap;

use crate::ast::{AstKind, AstNode, BinOp, PostfixOp};
use crate::error::CompileError;
use crate::intern::{Interner, StringId};
use crate::lexer::{LoopMode, Token, TokenKind};
use crate::value::Type;

const RESERVED_NATIVE_MODULES: [&str; 2] = ["vcore", "vglib"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StaticType {
    Number,
    String,
    Array,
}

impl StaticType {
    fn from_annotation(name: &str) -> Option<Self> {
        match name {
            "Number" => Some(Self::Number),
            "String" => Some(Self::String),
            "Array" => Some(Self::Array),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Number => "Number",
            Self::String => "String",
            Self::Array => "Array",
        }
    }
}

impl From<Type> for StaticType {
    fn from(t: Type) -> Self {
        match t {
            Type::Number => Self::Number,
            Type::String => Self::String,
            Type::Array => Self::Array,
            _ => unreachable!("only literal/variable static types are tracked"),
        }
    }
}

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    interner: &'a mut Interner,
    /// Lexical scope stack of declared-type annotations, used only for
    /// the parser's static `::Type` check; has nothing to do with
    /// the runtime symbol container.
    type_scopes: Vec<AHashMap<StringId, StaticType>>,
}

type PResult<T> = Result<T, CompileError>;

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, interner: &'a mut Interner) -> Self {
        Self { tokens, pos: 0, interner, type_scopes: vec![AHashMap::default()] }
    }

    pub fn parse_program(mut self) -> PResult<Vec<AstNode>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::End) {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    // --- token stream plumbing ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek().clone();
            Err(CompileError::new(tok.line, format!("expected {what}, found {tok}")))
        }
    }

    fn current_line(&self) -> u32 {
        self.peek().line
    }

    fn intern(&mut self, name: &str) -> StringId {
        self.interner.intern(name)
    }

    fn declared_type(&self, id: StringId) -> Option<StaticType> {
        self.type_scopes.iter().rev().find_map(|scope| scope.get(&id).copied())
    }

    fn declare_type(&mut self, id: StringId, ty: StaticType) {
        self.type_scopes.last_mut().expect("type scope stack is never empty").insert(id, ty);
    }

    fn push_scope(&mut self) {
        self.type_scopes.push(AHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.type_scopes.pop();
    }

    // --- statements ---

    fn parse_statement(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        match self.peek().kind {
            TokenKind::LeftBrace => self.parse_block(),
            TokenKind::Group => self.parse_group(),
            TokenKind::Function => self.parse_function_def(),
            TokenKind::Module => self.parse_module_decl(),
            TokenKind::Dismiss => self.parse_dismiss(),
            TokenKind::If => {
                let node = self.parse_if()?;
                self.matches(TokenKind::Semicolon);
                Ok(node)
            }
            TokenKind::While => {
                let node = self.parse_while()?;
                self.matches(TokenKind::Semicolon);
                Ok(node)
            }
            TokenKind::Through => {
                let node = self.parse_for()?;
                self.matches(TokenKind::Semicolon);
                Ok(node)
            }
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => {
                self.advance();
                self.expect_terminator()?;
                Ok(AstNode::new(AstKind::Break, line))
            }
            TokenKind::Continue => {
                self.advance();
                self.expect_terminator()?;
                Ok(AstNode::new(AstKind::Continue, line))
            }
            TokenKind::Const => self.parse_assignment(true),
            TokenKind::Identifier if self.looks_like_assignment() => self.parse_assignment(false),
            _ => {
                let expr = self.parse_expression()?;
                self.expect_terminator()?;
                Ok(expr)
            }
        }
    }

    /// A statement ends at `;`, or is allowed to omit it directly before
    /// a block-closing `}` or end-of-file.
    fn expect_terminator(&mut self) -> PResult<()> {
        if self.matches(TokenKind::Semicolon) {
            return Ok(());
        }
        if self.check(TokenKind::RightBrace) || self.check(TokenKind::End) {
            return Ok(());
        }
        let tok = self.peek().clone();
        Err(CompileError::new(tok.line, format!("expected ';', found {tok}")))
    }

    fn parse_block(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        self.expect(TokenKind::LeftBrace, "'{'")?;
        self.push_scope();
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::End) {
            stmts.push(self.parse_statement()?);
        }
        self.pop_scope();
        self.expect(TokenKind::RightBrace, "'}'")?;
        Ok(AstNode::new(AstKind::Block(stmts), line))
    }

    fn parse_group(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        self.advance();
        let name_tok = self.expect(TokenKind::Identifier, "group name")?;
        let name = self.intern(&name_tok.text);
        self.expect(TokenKind::LeftBrace, "'{'")?;
        self.push_scope();
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::End) {
            if self.check(TokenKind::Function) {
                let tok = self.peek().clone();
                return Err(CompileError::new(tok.line, "function definitions are forbidden inside a group"));
            }
            stmts.push(self.parse_statement()?);
        }
        self.pop_scope();
        self.expect(TokenKind::RightBrace, "'}'")?;
        self.matches(TokenKind::Semicolon);
        Ok(AstNode::new(AstKind::Group { name, body: stmts }, line))
    }

    fn parse_function_def(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        self.advance();
        let first = self.expect(TokenKind::Identifier, "function name")?;
        let (target_module, name) = if self.matches(TokenKind::DoubleColon) {
            let name_tok = self.expect(TokenKind::Identifier, "function name")?;
            (Some(first.text), name_tok.text)
        } else {
            (None, first.text)
        };
        if let Some(target) = &target_module {
            if RESERVED_NATIVE_MODULES.contains(&target.as_str()) {
                return Err(CompileError::new(
                    line,
                    format!("cannot inject a function into reserved native module '{target}'"),
                ));
            }
        }
        let id = self.intern(&name);
        let target_module = target_module.map(|t| self.intern(&t));

        self.expect(TokenKind::LeftParen, "'('")?;
        let mut param_ids = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                let p = self.expect(TokenKind::Identifier, "parameter name")?;
                param_ids.push(self.intern(&p.text).index() as u32);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "')'")?;

        self.expect(TokenKind::LeftBrace, "'{'")?;
        self.push_scope();
        let mut body = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::End) {
            body.push(self.parse_statement()?);
        }
        self.pop_scope();
        self.expect(TokenKind::RightBrace, "'}'")?;

        Ok(AstNode::new(
            AstKind::FunctionDef { target_module, id, name, param_ids, body: body.into() },
            line,
        ))
    }

    fn parse_module_decl(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        self.advance();
        let name_tok = self.expect(TokenKind::Identifier, "module name")?;
        let id = self.intern(&name_tok.text);
        self.expect_terminator()?;
        Ok(AstNode::new(AstKind::Module { id, name: name_tok.text }, line))
    }

    fn parse_dismiss(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        self.advance();
        let name_tok = self.expect(TokenKind::Identifier, "module name")?;
        let id = self.intern(&name_tok.text);
        self.expect_terminator()?;
        Ok(AstNode::new(AstKind::Dismiss { id, name: name_tok.text }, line))
    }

    fn parse_if(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        self.advance();
        let cond = self.parse_expression()?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.matches(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(AstNode::new(AstKind::If { cond: Box::new(cond), then_branch, else_branch }, line))
    }

    fn parse_while(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        self.advance();
        let cond = self.parse_expression()?;
        let body = self.parse_statement()?;
        Ok(AstNode::new(AstKind::While { cond: Box::new(cond), body: Box::new(body) }, line))
    }

    fn parse_for(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        self.advance();
        let iterator_name = if self.check(TokenKind::Identifier) && self.peek_at(1).map(|t| t.kind) == Some(TokenKind::DoubleColon) {
            let tok = self.advance();
            self.advance();
            self.intern(&tok.text)
        } else {
            self.intern("_")
        };
        let iterable = self.parse_expression()?;
        let mode = if self.matches(TokenKind::Arrow) {
            let tok = self.expect(TokenKind::LoopMode, "loop mode")?;
            tok.text.parse().unwrap_or(LoopMode::Loop)
        } else {
            LoopMode::Loop
        };
        let body = self.parse_statement()?;
        Ok(AstNode::new(
            AstKind::For { iterable: Box::new(iterable), body: Box::new(body), iterator_name, mode },
            line,
        ))
    }

    fn parse_return(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        self.advance();
        let expr = if self.check(TokenKind::Semicolon) || self.check(TokenKind::RightBrace) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_terminator()?;
        Ok(AstNode::new(AstKind::Return(expr), line))
    }

    /// Look-ahead for "identifier, then zero or more `.identifier` /
    /// `[…]`, optionally `::Type`, then `=`", without consuming.
    fn looks_like_assignment(&self) -> bool {
        let mut i = self.pos;
        if self.tokens[i].kind != TokenKind::Identifier {
            return false;
        }
        i += 1;
        loop {
            match self.tokens.get(i).map(|t| t.kind) {
                Some(TokenKind::Dot) => {
                    if self.tokens.get(i + 1).map(|t| t.kind) != Some(TokenKind::Identifier) {
                        return false;
                    }
                    i += 2;
                }
                Some(TokenKind::LeftBracket) => {
                    let mut depth = 1;
                    i += 1;
                    while depth > 0 {
                        match self.tokens.get(i).map(|t| t.kind) {
                            Some(TokenKind::LeftBracket) => depth += 1,
                            Some(TokenKind::RightBracket) => depth -= 1,
                            Some(TokenKind::End) | None => return false,
                            _ => {}
                        }
                        i += 1;
                    }
                }
                _ => break,
            }
        }
        if self.tokens.get(i).map(|t| t.kind) == Some(TokenKind::DoubleColon) {
            i += 2;
        }
        self.tokens.get(i).map(|t| t.kind) == Some(TokenKind::Equals)
    }

    fn parse_assignment(&mut self, forced_const: bool) -> PResult<AstNode> {
        let line = self.current_line();
        let is_const = forced_const || self.matches(TokenKind::Const);
        if forced_const {
            self.advance(); // consume `const`
        }
        let mut segments = vec![self.expect(TokenKind::Identifier, "identifier")?.text];
        let mut index: Option<Box<AstNode>> = None;
        loop {
            if self.matches(TokenKind::Dot) {
                segments.push(self.expect(TokenKind::Identifier, "identifier")?.text);
            } else if self.matches(TokenKind::LeftBracket) {
                index = Some(Box::new(self.parse_expression()?));
                self.expect(TokenKind::RightBracket, "']'")?;
            } else {
                break;
            }
        }
        let original_name = segments.pop().expect("at least one segment");
        let scope_path = if segments.is_empty() { None } else { Some(segments) };
        let id = self.intern(&original_name);

        let annotation = if self.matches(TokenKind::DoubleColon) {
            let type_tok = self.expect(TokenKind::Identifier, "type name")?;
            let ty = StaticType::from_annotation(&type_tok.text)
                .ok_or_else(|| CompileError::new(type_tok.line, format!("unknown type annotation '{}'", type_tok.text)))?;
            Some(ty)
        } else {
            None
        };

        self.expect(TokenKind::Equals, "'='")?;
        let rhs = self.parse_expression()?;
        self.expect_terminator()?;

        if let Some(declared) = annotation {
            if let Some(actual) = static_type_of(&rhs, &|id| self.declared_type(id)) {
                if actual != declared {
                    return Err(CompileError::new(
                        line,
                        format!("type mismatch: '{original_name}' declared as {} but assigned a {}", declared.name(), actual.name()),
                    ));
                }
            }
            self.declare_type(id, declared);
        }

        Ok(AstNode::new(
            AstKind::Assignment { id, original_name, rhs: Box::new(rhs), index, scope_path, is_const },
            line,
        ))
    }

    // --- expressions: range -> or -> and -> equality -> relational -> additive -> multiplicative -> postfix -> primary ---

    fn parse_expression(&mut self) -> PResult<AstNode> {
        self.parse_range()
    }

    fn parse_range(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        let start = self.parse_or()?;
        if self.matches(TokenKind::DoubleDot) {
            let end = self.parse_or()?;
            return Ok(AstNode::new(AstKind::Range { start: Box::new(start), end: Box::new(end) }, line));
        }
        Ok(start)
    }

    fn parse_or(&mut self) -> PResult<AstNode> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::Or) {
            let line = self.advance().line;
            let right = self.parse_and()?;
            left = AstNode::new(AstKind::BinOp { op: BinOp::Or, left: Box::new(left), right: Box::new(right) }, line);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<AstNode> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::And) {
            let line = self.advance().line;
            let right = self.parse_equality()?;
            left = AstNode::new(AstKind::BinOp { op: BinOp::And, left: Box::new(left), right: Box::new(right) }, line);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<AstNode> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::DoubleEquals => BinOp::Equal,
                TokenKind::NotEqual => BinOp::NotEqual,
                _ => break,
            };
            let line = self.advance().line;
            let right = self.parse_relational()?;
            left = AstNode::new(AstKind::BinOp { op, left: Box::new(left), right: Box::new(right) }, line);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> PResult<AstNode> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Smaller => BinOp::Less,
                TokenKind::SmallerOrEqual => BinOp::LessEqual,
                TokenKind::Greater => BinOp::Greater,
                TokenKind::GreaterOrEqual => BinOp::GreaterEqual,
                _ => break,
            };
            let line = self.advance().line;
            let right = self.parse_additive()?;
            left = AstNode::new(AstKind::BinOp { op, left: Box::new(left), right: Box::new(right) }, line);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<AstNode> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Add => BinOp::Add,
                TokenKind::Subtract => BinOp::Subtract,
                TokenKind::FloorDivide => BinOp::FloorDivide,
                TokenKind::Modulo => BinOp::Modulo,
                _ => break,
            };
            let line = self.advance().line;
            let right = self.parse_multiplicative()?;
            left = AstNode::new(AstKind::BinOp { op, left: Box::new(left), right: Box::new(right) }, line);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<AstNode> {
        let mut left = self.parse_postfix()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Multiply => BinOp::Multiply,
                TokenKind::Division => BinOp::Divide,
                _ => break,
            };
            let line = self.advance().line;
            let right = self.parse_postfix()?;
            left = AstNode::new(AstKind::BinOp { op, left: Box::new(left), right: Box::new(right) }, line);
        }
        Ok(left)
    }

    fn parse_postfix(&mut self) -> PResult<AstNode> {
        let expr = self.parse_primary()?;
        match self.peek().kind {
            TokenKind::DoubleIncrement => {
                let line = self.advance().line;
                Ok(AstNode::new(AstKind::Postfix { op: PostfixOp::Increment, target: Box::new(expr) }, line))
            }
            TokenKind::DoubleDecrement => {
                let line = self.advance().line;
                Ok(AstNode::new(AstKind::Postfix { op: PostfixOp::Decrement, target: Box::new(expr) }, line))
            }
            _ => Ok(expr),
        }
    }

    fn parse_primary(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        match self.peek().kind {
            TokenKind::Number => {
                let t = self.advance();
                Ok(AstNode::new(AstKind::Number(t.number), line))
            }
            TokenKind::String => {
                let t = self.advance();
                Ok(AstNode::new(AstKind::StringLit(t.text.into()), line))
            }
            TokenKind::True => {
                self.advance();
                Ok(AstNode::new(AstKind::Boolean(true), line))
            }
            TokenKind::False => {
                self.advance();
                Ok(AstNode::new(AstKind::Boolean(false), line))
            }
            TokenKind::Null => {
                self.advance();
                Ok(AstNode::new(AstKind::Null, line))
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(expr)
            }
            TokenKind::BuiltIn => self.parse_builtin_call(),
            TokenKind::Through => self.parse_for(),
            TokenKind::Subtract => {
                // unary minus, expressed as `0 - expr`
                self.advance();
                let operand = self.parse_postfix()?;
                Ok(AstNode::new(
                    AstKind::BinOp { op: BinOp::Subtract, left: Box::new(AstNode::new(AstKind::Number(0.0), line)), right: Box::new(operand) },
                    line,
                ))
            }
            TokenKind::Exclamatory => {
                self.advance();
                let operand = self.parse_postfix()?;
                Ok(AstNode::new(
                    AstKind::BinOp { op: BinOp::Equal, left: Box::new(operand), right: Box::new(AstNode::new(AstKind::Number(0.0), line)) },
                    line,
                ))
            }
            TokenKind::Identifier => self.parse_identifier_chain(),
            _ => {
                let tok = self.peek().clone();
                Err(CompileError::new(tok.line, format!("unexpected token {tok}")))
            }
        }
    }

    fn parse_array_literal(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        self.advance();
        let mut elements = Vec::new();
        if !self.check(TokenKind::RightBracket) {
            loop {
                elements.push(self.parse_expression()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightBracket, "']'")?;
        Ok(AstNode::new(AstKind::Array(elements), line))
    }

    fn parse_builtin_call(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        let name_tok = self.advance();
        self.expect(TokenKind::LeftParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(AstNode::new(AstKind::BuiltInCall { name: name_tok.text, args }, line))
    }

    fn parse_call_args(&mut self) -> PResult<Vec<AstNode>> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(args)
    }

    /// Parses `ident`, then resolves what it means by what follows:
    /// a call `(`, a `.member`/`.member(args)` chain (method calls, or a
    /// scoped variable/index read when the chain never calls), or a bare
    /// `[index]`.
    fn parse_identifier_chain(&mut self) -> PResult<AstNode> {
        let line = self.current_line();
        let first = self.advance();

        if self.check(TokenKind::LeftParen) {
            let args = self.parse_call_args()?;
            let id = self.intern(&first.text);
            let mut node = AstNode::new(AstKind::FunctionCall { id, name: first.text, args }, line);
            node = self.parse_trailing_chain(node)?;
            return Ok(node);
        }

        let mut segments = vec![first.text.clone()];
        loop {
            if self.check(TokenKind::Dot) && self.peek_at(1).map(|t| t.kind) == Some(TokenKind::Identifier) {
                let save = self.pos;
                self.advance();
                let member = self.advance();
                if self.check(TokenKind::LeftParen) {
                    // method call: receiver is everything parsed so far.
                    self.pos = save;
                    break;
                }
                segments.push(member.text);
            } else {
                break;
            }
        }

        let original_name = segments.pop().expect("at least one segment");
        let scope_path = if segments.is_empty() { None } else { Some(segments) };
        let id = self.intern(&original_name);

        let mut node = if self.matches(TokenKind::LeftBracket) {
            let index = self.parse_expression()?;
            self.expect(TokenKind::RightBracket, "']'")?;
            AstNode::new(AstKind::IndexAccess { id, original_name, scope_path, index: Box::new(index) }, line)
        } else {
            AstNode::new(AstKind::Variable { id, original_name, scope_path }, line)
        };

        node = self.parse_trailing_chain(node)?;
        Ok(node)
    }

    /// Consumes any remaining `.method(args)` / `.method` / `[index]`
    /// postfixes after the initial identifier/call has been parsed,
    /// building up `MethodCall`/`IndexAccess`-over-expression nodes.
    fn parse_trailing_chain(&mut self, mut node: AstNode) -> PResult<AstNode> {
        loop {
            if self.matches(TokenKind::Dot) {
                let line = self.current_line();
                let member = self.expect(TokenKind::Identifier, "method name")?;
                let args = if self.check(TokenKind::LeftParen) { self.parse_call_args()? } else { Vec::new() };
                node = AstNode::new(AstKind::MethodCall { receiver: Box::new(node), name: member.text, args }, line);
            } else {
                break;
            }
        }
        Ok(node)
    }
}

/// Best-effort static type of an expression, used only by the parser's
/// `::Type` check; returns `None` when the type can't be known
/// without running the program.
fn static_type_of(node: &AstNode, lookup: &dyn Fn(StringId) -> Option<StaticType>) -> Option<StaticType> {
    match &node.kind {
        AstKind::Number(_) => Some(StaticType::Number),
        AstKind::StringLit(_) => Some(StaticType::String),
        AstKind::Boolean(_) => Some(StaticType::Number),
        AstKind::Array(_) | AstKind::Range { .. } => Some(StaticType::Array),
        AstKind::Variable { id, scope_path: None, .. } => lookup(*id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (Vec<AstNode>, Interner) {
        let mut interner = Interner::new();
        let (tokens, _) = crate::lexer::Lexer::new(src).tokenize();
        let stmts = Parser::new(tokens, &mut interner).parse_program().expect("parse ok");
        (stmts, interner)
    }

    #[test]
    fn precedence_climbs_correctly() {
        let (stmts, _) = parse("1 + 2 * 3;");
        match &stmts[0].kind {
            AstKind::BinOp { op: BinOp::Add, right, .. } => {
                assert!(matches!(right.kind, AstKind::BinOp { op: BinOp::Multiply, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn assignment_detected_with_lookahead() {
        let (stmts, _) = parse("x = 5;");
        assert!(matches!(stmts[0].kind, AstKind::Assignment { .. }));
    }

    #[test]
    fn const_assignment_marks_is_const() {
        let (stmts, _) = parse("const pi = 3.14;");
        match &stmts[0].kind {
            AstKind::Assignment { is_const, .. } => assert!(*is_const),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn function_def_rejects_reserved_injection_target() {
        let mut interner = Interner::new();
        let (tokens, _) = crate::lexer::Lexer::new("sub vcore::foo() { }").tokenize();
        let err = Parser::new(tokens, &mut interner).parse_program().unwrap_err();
        assert!(err.message.contains("vcore"));
    }

    #[test]
    fn group_rejects_nested_function_def() {
        let mut interner = Interner::new();
        let (tokens, _) = crate::lexer::Lexer::new("group g { sub f() { } }").tokenize();
        let err = Parser::new(tokens, &mut interner).parse_program().unwrap_err();
        assert!(err.message.contains("forbidden"));
    }

    #[test]
    fn method_call_chain_parses() {
        let (stmts, _) = parse("a.push(1).size();");
        assert!(matches!(stmts[0].kind, AstKind::MethodCall { .. }));
    }

    #[test]
    fn type_mismatch_is_a_compile_error() {
        let mut interner = Interner::new();
        let (tokens, _) = crate::lexer::Lexer::new(r#"const pi :: Number = "x";"#).tokenize();
        let err = Parser::new(tokens, &mut interner).parse_program().unwrap_err();
        assert!(err.message.contains("type mismatch"));
    }

    #[test]
    fn missing_semicolon_is_a_compile_error() {
        let mut interner = Interner::new();
        let (tokens, _) = crate::lexer::Lexer::new("x = 1").tokenize();
        assert!(Parser::new(tokens, &mut interner).parse_program().is_err());
    }
}

pub mod error;
pub mod expression;
pub mod formatter;

use crate::lexer::{decode_literal, Lexer, LineBreaks, Span, Token, TokenKind};
pub use error::{ParserError, ParserErrorKind};
use expression::{
    Assignment, AssignmentOperator, Block, ControlKind, Expression, ExpressionKind, ForLoop,
    InfixOperator, ListOperator, PostfixOperator, PrefixOperator, Program, RangeOperator,
    POSTFIX_BINDING_POWER, PREFIX_BINDING_POWER,
};
use std::sync::Arc;

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    lookahead: Option<Result<Token, ParserError>>,
    /// End offset of the last consumed token.
    previous_end: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
            lookahead: None,
            previous_end: 0,
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.lexer.get_source()
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.lexer.get_line_breaks()
    }

    fn peek(&mut self) -> Result<Token, ParserError> {
        match self.lookahead {
            Some(ref token_or_error) => token_or_error.clone(),
            None => {
                let next_token = self.lexer.next_token().map_err(ParserError::from);
                self.lookahead = Some(next_token.clone());
                next_token
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParserError> {
        let token = match self.lookahead.take() {
            Some(token_or_error) => token_or_error,
            None => self.lexer.next_token().map_err(ParserError::from),
        }?;
        self.previous_end = token.span.end();
        Ok(token)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParserError> {
        let next_token = self.next_token()?;
        if next_token.kind == expected {
            Ok(next_token)
        } else if next_token.kind == TokenKind::Eof {
            Err(ParserError {
                kind: ParserErrorKind::UnexpectedEof,
                span: next_token.span,
            })
        } else {
            Err(ParserError {
                kind: ParserErrorKind::UnexpectedToken {
                    actual: next_token.kind,
                    expected,
                },
                span: next_token.span,
            })
        }
    }

    fn eat_if(&mut self, next: TokenKind) -> Result<Option<Token>, ParserError> {
        let next_token = self.peek()?;
        if next_token.kind != next {
            Ok(None)
        } else {
            self.next_token().map(Some)
        }
    }

    fn lexeme(&self, token: &Token) -> &'src str {
        &self.lexer.get_source()[token.span.range()]
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.previous_end.saturating_sub(start))
    }

    /// Tokens that can both start and continue an expression only continue it on the same line.
    fn is_on_same_line(&self, token: &Token) -> bool {
        let gap = &self.lexer.get_source()[self.previous_end..token.span.start];
        !gap.contains('\n')
    }

    fn take(expression: &mut Expression) -> Box<Expression> {
        let placeholder = Expression::new(ExpressionKind::Null, expression.span);
        Box::new(std::mem::replace(expression, placeholder))
    }

    fn synthetic_number(value: f64, at: usize) -> Expression {
        Expression::new(ExpressionKind::Number(value), Span::new(at, 0))
    }
}

// Sequences
impl<'src> Parser<'src> {
    pub fn parse(&mut self) -> Result<Program, ParserError> {
        let body = self.parse_sequence(TokenKind::Eof)?;
        let span = Span::new(0, self.lexer.get_source().len());
        Ok(Program {
            block: Block { body, span },
        })
    }

    fn parse_sequence(&mut self, terminator: TokenKind) -> Result<Vec<Expression>, ParserError> {
        let mut body = Vec::new();
        loop {
            while self.eat_if(TokenKind::Semicolon)?.is_some() {}
            let token = self.peek()?;
            if token.kind == terminator {
                break;
            }
            if token.kind == TokenKind::Eof {
                return Err(ParserError {
                    kind: ParserErrorKind::UnexpectedEof,
                    span: token.span,
                });
            }
            body.push(self.parse_expression()?);
        }
        Ok(body)
    }

    fn parse_block(&mut self, start: usize) -> Result<Block, ParserError> {
        let body = self.parse_sequence(TokenKind::RightBrace)?;
        self.expect(TokenKind::RightBrace)?;
        Ok(Block {
            body,
            span: self.span_from(start),
        })
    }

    fn parse_arguments(&mut self, closing: TokenKind) -> Result<Vec<Expression>, ParserError> {
        let mut arguments = Vec::new();
        loop {
            if self.eat_if(closing)?.is_some() {
                break;
            }
            arguments.push(self.parse_expression()?);
            if self.eat_if(TokenKind::Comma)?.is_none() {
                self.expect(closing)?;
                break;
            }
        }
        Ok(arguments)
    }
}

// Pratt parser for expressions
impl<'src> Parser<'src> {
    pub fn parse_expression(&mut self) -> Result<Expression, ParserError> {
        self.parse_expression_pratt(0)
    }

    fn peek_infix_operator(kind: TokenKind) -> Option<InfixOperator> {
        match kind {
            TokenKind::Plus => Some(InfixOperator::Add),
            TokenKind::Minus => Some(InfixOperator::Subtract),
            TokenKind::Star => Some(InfixOperator::Multiply),
            TokenKind::Slash => Some(InfixOperator::Divide),
            TokenKind::Percent => Some(InfixOperator::Modulo),
            TokenKind::GreaterThan => Some(InfixOperator::GreaterThan),
            TokenKind::LessThan => Some(InfixOperator::LessThan),
            TokenKind::GreaterThanEqual => Some(InfixOperator::GreaterThanEqual),
            TokenKind::LessThanEqual => Some(InfixOperator::LessThanEqual),
            TokenKind::EqualEqual => Some(InfixOperator::EqualEqual),
            TokenKind::AndAnd => Some(InfixOperator::And),
            TokenKind::OrOr => Some(InfixOperator::Or),
            _ => None,
        }
    }

    fn peek_assignment_operator(kind: TokenKind) -> Option<AssignmentOperator> {
        match kind {
            TokenKind::Equal => Some(AssignmentOperator::Assign),
            TokenKind::ColonEqual => Some(AssignmentOperator::Constant),
            TokenKind::PlusEqual => Some(AssignmentOperator::Compound(InfixOperator::Add)),
            TokenKind::MinusEqual => Some(AssignmentOperator::Compound(InfixOperator::Subtract)),
            TokenKind::StarEqual => Some(AssignmentOperator::Compound(InfixOperator::Multiply)),
            TokenKind::SlashEqual => Some(AssignmentOperator::Compound(InfixOperator::Divide)),
            TokenKind::PercentEqual => Some(AssignmentOperator::Compound(InfixOperator::Modulo)),
            _ => None,
        }
    }

    fn parse_expression_pratt(&mut self, min_bp: u8) -> Result<Expression, ParserError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let token = self.peek()?;
            let start = lhs.span.start;
            let same_line = self.is_on_same_line(&token);

            if POSTFIX_BINDING_POWER >= min_bp {
                let kind = match token.kind {
                    TokenKind::LeftParenthesis if same_line => {
                        self.next_token()?;
                        let arguments = self.parse_arguments(TokenKind::RightParenthesis)?;
                        Some(ExpressionKind::Call {
                            callee: Self::take(&mut lhs),
                            arguments,
                        })
                    }
                    TokenKind::LeftBracket if same_line => {
                        self.next_token()?;
                        let index = self.parse_expression()?;
                        self.expect(TokenKind::RightBracket)?;
                        Some(ExpressionKind::Index {
                            target: Self::take(&mut lhs),
                            index: Box::new(index),
                        })
                    }
                    TokenKind::Dot => {
                        self.next_token()?;
                        let name = self.expect(TokenKind::Ident)?;
                        let name = self.lexeme(&name).into();
                        self.expect(TokenKind::LeftParenthesis)?;
                        let arguments = self.parse_arguments(TokenKind::RightParenthesis)?;
                        Some(ExpressionKind::Method {
                            receiver: Self::take(&mut lhs),
                            name,
                            arguments,
                        })
                    }
                    TokenKind::PlusPlus | TokenKind::MinusMinus if same_line => {
                        self.next_token()?;
                        let operator = if token.kind == TokenKind::PlusPlus {
                            PostfixOperator::Increment
                        } else {
                            PostfixOperator::Decrement
                        };
                        Some(ExpressionKind::Postfix {
                            operator,
                            operand: Self::take(&mut lhs),
                        })
                    }
                    _ => None,
                };
                if let Some(kind) = kind {
                    lhs = Expression::new(kind, self.span_from(start));
                    continue;
                }
            }

            if let Some(operator) = Self::peek_infix_operator(token.kind) {
                let (l_bp, r_bp) = operator.get_binding_power();
                if l_bp < min_bp || (operator == InfixOperator::Subtract && !same_line) {
                    break;
                }
                self.next_token()?;
                let rhs = self.parse_expression_pratt(r_bp)?;
                lhs = Expression::new(
                    ExpressionKind::Infix {
                        operator,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    self.span_from(start),
                );
                continue;
            }

            if let Some(operator) = Self::peek_assignment_operator(token.kind) {
                let (l_bp, r_bp) = operator.get_binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.next_token()?;
                lhs = self.parse_assignment(lhs, operator, r_bp)?;
                continue;
            }

            let range = match token.kind {
                TokenKind::DoubleDot => Some(RangeOperator::Exclusive),
                TokenKind::DoubleDotEqual => Some(RangeOperator::Inclusive),
                _ => None,
            };
            if let Some(operator) = range {
                let (l_bp, r_bp) = operator.get_binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.next_token()?;
                let end = self.parse_expression_pratt(r_bp)?;
                let step = if self.eat_if(TokenKind::DoubleColon)?.is_some() {
                    self.parse_expression_pratt(r_bp)?
                } else {
                    Self::synthetic_number(1.0, self.previous_end)
                };
                lhs = Expression::new(
                    ExpressionKind::Range {
                        start: Box::new(lhs),
                        end: Box::new(end),
                        step: Box::new(step),
                        inclusive: operator == RangeOperator::Inclusive,
                    },
                    self.span_from(start),
                );
                continue;
            }

            let list = match token.kind {
                TokenKind::LeftShift => Some(ListOperator::Push),
                TokenKind::RightShift if same_line => Some(ListOperator::Shift),
                _ => None,
            };
            if let Some(operator) = list {
                let (l_bp, r_bp) = operator.get_binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.next_token()?;
                let rhs = self.parse_expression_pratt(r_bp)?;
                let kind = match operator {
                    ListOperator::Push => Self::build_push(lhs, rhs),
                    ListOperator::Shift => ExpressionKind::Shift {
                        source: Box::new(lhs),
                        target: Box::new(rhs),
                    },
                };
                lhs = Expression::new(kind, self.span_from(start));
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    /// `l[i] << v` pushes at `i`, `l << v` pushes at the end.
    fn build_push(list: Expression, value: Expression) -> ExpressionKind {
        match list.kind {
            ExpressionKind::Index { target, index } => ExpressionKind::Push {
                list: target,
                index,
                value: Box::new(value),
            },
            kind => {
                let at = list.span.end();
                ExpressionKind::Push {
                    list: Box::new(Expression::new(kind, list.span)),
                    index: Box::new(Self::synthetic_number(-1.0, at)),
                    value: Box::new(value),
                }
            }
        }
    }

    fn parse_assignment(
        &mut self,
        target: Expression,
        operator: AssignmentOperator,
        r_bp: u8,
    ) -> Result<Expression, ParserError> {
        let start = target.span.start;
        let value = self.parse_expression_pratt(r_bp)?;
        let value = match operator {
            AssignmentOperator::Compound(operator) => {
                let span = target.span.merge(&value.span);
                Expression::new(
                    ExpressionKind::Infix {
                        operator,
                        lhs: Box::new(target.clone()),
                        rhs: Box::new(value),
                    },
                    span,
                )
            }
            _ => value,
        };
        let limit = if self.eat_if(TokenKind::Arrow)?.is_some() {
            let (l_bp, _) = ListOperator::Push.get_binding_power();
            self.parse_expression_pratt(l_bp)?
        } else {
            Self::synthetic_number(-1.0, self.previous_end)
        };
        Ok(Expression::new(
            ExpressionKind::Assignment(Box::new(Assignment {
                target,
                value,
                limit,
                is_const: operator == AssignmentOperator::Constant,
                is_ref: false,
            })),
            self.span_from(start),
        ))
    }

    fn parse_prefix(&mut self) -> Result<Expression, ParserError> {
        let token = self.next_token()?;
        let start = token.span.start;
        let lexeme = self.lexeme(&token);

        let kind = match token.kind {
            TokenKind::NumericLiteral => {
                let value = lexeme.parse().map_err(|_| ParserError {
                    kind: ParserErrorKind::NonExpression(token.kind),
                    span: token.span,
                })?;
                ExpressionKind::Number(value)
            }
            TokenKind::StringLiteral => {
                let value = decode_literal(&lexeme[1..lexeme.len() - 1]);
                ExpressionKind::StringLiteral(value.into())
            }
            TokenKind::CharacterLiteral => {
                let value = decode_literal(&lexeme[1..]);
                ExpressionKind::Character(value.chars().next().unwrap_or_default())
            }
            TokenKind::Ident => ExpressionKind::Identifier(lexeme.into()),
            TokenKind::KeywordTrue => ExpressionKind::Bool(true),
            TokenKind::KeywordFalse => ExpressionKind::Bool(false),
            TokenKind::KeywordNull => ExpressionKind::Null,
            TokenKind::LeftBracket => {
                ExpressionKind::List(self.parse_arguments(TokenKind::RightBracket)?)
            }
            TokenKind::LeftBrace => ExpressionKind::Block(self.parse_block(start)?),
            TokenKind::LeftParenthesis => return self.parse_group_or_function(start),
            TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Star
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => {
                let operator = match token.kind {
                    TokenKind::Minus => PrefixOperator::Minus,
                    TokenKind::Bang => PrefixOperator::Bang,
                    TokenKind::Star => PrefixOperator::Star,
                    TokenKind::PlusPlus => PrefixOperator::Increment,
                    _ => PrefixOperator::Decrement,
                };
                let operand = self.parse_expression_pratt(PREFIX_BINDING_POWER)?;
                ExpressionKind::Prefix {
                    operator,
                    operand: Box::new(operand),
                }
            }
            TokenKind::RightShift => {
                let operand = self.parse_expression_pratt(PREFIX_BINDING_POWER)?;
                match operand.kind {
                    ExpressionKind::Index { target, index } => ExpressionKind::Pop {
                        list: target,
                        index,
                    },
                    kind => {
                        let at = operand.span.end();
                        ExpressionKind::Pop {
                            list: Box::new(Expression::new(kind, operand.span)),
                            index: Box::new(Self::synthetic_number(-1.0, at)),
                        }
                    }
                }
            }
            TokenKind::Ampersand => {
                let inner = self.parse_expression_pratt(0)?;
                match inner.kind {
                    ExpressionKind::Assignment(mut assignment) => {
                        assignment.is_ref = true;
                        ExpressionKind::Assignment(assignment)
                    }
                    _ => {
                        return Err(ParserError {
                            kind: ParserErrorKind::ExpectedAssignment,
                            span: inner.span,
                        })
                    }
                }
            }
            TokenKind::KeywordIf => {
                let condition = self.parse_expression()?;
                let success = self.parse_expression()?;
                let failure = if self.eat_if(TokenKind::KeywordElse)?.is_some() {
                    Some(Box::new(self.parse_expression()?))
                } else {
                    None
                };
                ExpressionKind::If {
                    condition: Box::new(condition),
                    success: Box::new(success),
                    failure,
                }
            }
            TokenKind::KeywordWhile => {
                let condition = self.parse_expression()?;
                let body = self.parse_expression()?;
                ExpressionKind::While {
                    condition: Box::new(condition),
                    body: Box::new(body),
                }
            }
            TokenKind::KeywordFor => ExpressionKind::For(Box::new(self.parse_for()?)),
            TokenKind::KeywordBreak | TokenKind::KeywordContinue => {
                let kind = if token.kind == TokenKind::KeywordBreak {
                    ControlKind::Break
                } else {
                    ControlKind::Continue
                };
                let next = self.peek()?;
                let carry = if next.kind == TokenKind::NumericLiteral && self.is_on_same_line(&next)
                {
                    self.next_token()?;
                    let count: f64 = self.lexeme(&next).parse().unwrap_or(f64::NAN);
                    if count.fract() != 0.0 || count > u32::MAX as f64 {
                        return Err(ParserError {
                            kind: ParserErrorKind::InvalidCarryCount(count),
                            span: next.span,
                        });
                    }
                    count as u32
                } else {
                    0
                };
                ExpressionKind::Control { kind, carry }
            }
            TokenKind::Eof => {
                return Err(ParserError {
                    kind: ParserErrorKind::UnexpectedEof,
                    span: token.span,
                })
            }
            kind => {
                return Err(ParserError {
                    kind: ParserErrorKind::NonExpression(kind),
                    span: token.span,
                })
            }
        };

        Ok(Expression::new(kind, self.span_from(start)))
    }

    fn parse_for(&mut self) -> Result<ForLoop, ParserError> {
        if self.eat_if(TokenKind::LeftParenthesis)?.is_some() {
            let initializer = self.parse_expression()?;
            self.expect(TokenKind::Semicolon)?;
            let condition = self.parse_expression()?;
            self.expect(TokenKind::Semicolon)?;
            let step = self.parse_expression()?;
            self.expect(TokenKind::RightParenthesis)?;
            let body = self.parse_expression()?;
            return Ok(ForLoop::Traditional {
                initializer,
                condition,
                step,
                body,
            });
        }

        let variable = self.expect(TokenKind::Ident)?;
        let variable = self.lexeme(&variable).into();
        let keyword = self.next_token()?;
        let is_in = match keyword.kind {
            TokenKind::KeywordIn => true,
            TokenKind::KeywordOf => false,
            actual => {
                return Err(ParserError {
                    kind: ParserErrorKind::UnexpectedToken {
                        actual,
                        expected: TokenKind::KeywordIn,
                    },
                    span: keyword.span,
                })
            }
        };
        let enumerable = self.parse_expression()?;
        let body = self.parse_expression()?;
        Ok(if is_in {
            ForLoop::In {
                variable,
                enumerable,
                body,
            }
        } else {
            ForLoop::Of {
                variable,
                enumerable,
                body,
            }
        })
    }

    /// After `(`: either a parenthesized group or a function literal.
    fn parse_group_or_function(&mut self, start: usize) -> Result<Expression, ParserError> {
        if self.eat_if(TokenKind::RightParenthesis)?.is_some() {
            self.expect(TokenKind::FatArrow)?;
            return self.parse_function_body(start, Vec::new());
        }

        let first = self.parse_expression()?;
        if self.eat_if(TokenKind::Comma)?.is_some() {
            let mut items = vec![first];
            loop {
                items.push(self.parse_expression()?);
                if self.eat_if(TokenKind::Comma)?.is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RightParenthesis)?;
            self.expect(TokenKind::FatArrow)?;
            let parameters = items
                .into_iter()
                .map(Self::into_parameter)
                .collect::<Result<Vec<_>, _>>()?;
            return self.parse_function_body(start, parameters);
        }

        self.expect(TokenKind::RightParenthesis)?;
        if self.eat_if(TokenKind::FatArrow)?.is_some() {
            let parameter = Self::into_parameter(first)?;
            return self.parse_function_body(start, vec![parameter]);
        }
        Ok(Expression::new(
            ExpressionKind::Group(Box::new(first)),
            self.span_from(start),
        ))
    }

    fn into_parameter(expression: Expression) -> Result<compact_str::CompactString, ParserError> {
        match expression.kind {
            ExpressionKind::Identifier(name) => Ok(name),
            _ => Err(ParserError {
                kind: ParserErrorKind::InvalidParameter,
                span: expression.span,
            }),
        }
    }

    fn parse_function_body(
        &mut self,
        start: usize,
        parameters: Vec<compact_str::CompactString>,
    ) -> Result<Expression, ParserError> {
        let body = self.parse_expression()?;
        let body = match body.kind {
            ExpressionKind::Block(block) => block,
            _ => Block {
                span: body.span,
                body: vec![body],
            },
        };
        Ok(Expression::new(
            ExpressionKind::Function {
                parameters,
                body: Arc::new(body),
            },
            self.span_from(start),
        ))
    }
}

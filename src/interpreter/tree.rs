use super::{ensure_sufficient_stack, indexing, operator, InterpreterConfig, SystemContext};
use crate::environment::Environment;
use crate::lexer::Span;
use crate::parser::expression::{
    Assignment, Block, ControlKind, Expression, ExpressionKind, ForLoop, PostfixOperator,
    PrefixOperator, Program,
};
use crate::value::error::{RuntimeError, RuntimeErrorKind};
use crate::value::{Control, Function, Value};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// What a loop does after its body produced a value.
enum LoopFlow {
    Next,
    Stop,
    /// A control value that still has block boundaries to cross.
    Escape(Control),
}

impl LoopFlow {
    fn from_body(value: &Value) -> Self {
        match value {
            Value::Null => LoopFlow::Stop,
            Value::Control(control) if control.carry > 0 => LoopFlow::Escape(*control),
            Value::Control(Control {
                kind: ControlKind::Break,
                ..
            }) => LoopFlow::Stop,
            _ => LoopFlow::Next,
        }
    }
}

/// An assignable location with its list and index already evaluated.
enum Place<'a> {
    Variable(&'a str),
    Element { list: Value, index: Value },
}

impl Place<'_> {
    fn read(&self, environment: &Environment) -> Result<Value, RuntimeErrorKind> {
        match self {
            Place::Variable(name) => environment
                .get_var(name)
                .ok_or_else(|| RuntimeErrorKind::UndefinedIdentifier((*name).into())),
            Place::Element { list, .. } if !list.is_indexable() => {
                Err(RuntimeErrorKind::NonIndexable(list.kind()))
            }
            Place::Element { list, index } => indexing::read_index(list, index),
        }
    }

    fn write(
        &self,
        environment: &Environment,
        value: Value,
        (is_const, is_ref, limit): (bool, bool, Option<u32>),
    ) -> Result<Value, RuntimeErrorKind> {
        match self {
            Place::Variable(name) => environment.assign_var(name, value, is_const, is_ref, limit),
            Place::Element { list, index } => indexing::write_index(list, index, value),
        }
    }
}

pub struct TreeWalkInterpreter<C: SystemContext> {
    environment: Environment,
    context: C,
    config: InterpreterConfig,
    depth: usize,
}

impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    pub fn new(context: C) -> Self {
        Self::with_config(context, InterpreterConfig::default())
    }

    pub fn with_config(context: C, config: InterpreterConfig) -> Self {
        Self {
            environment: Environment::new(),
            context,
            config,
            depth: 0,
        }
    }

    pub fn get_environment(&self) -> &Environment {
        &self.environment
    }

    pub fn get_context(&self) -> &C {
        &self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// Evaluates the program as a top-level block and returns its settled result.
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        debug!(
            expressions = program.block.body.len(),
            max_loop_iterations = self.config.max_loop_iterations,
            "running program"
        );
        let environment = self.environment.clone();
        let result = self
            .evaluate_block(&environment, &program.block, true)
            .and_then(|value| {
                value
                    .settle()
                    .map_err(|kind| RuntimeError::new(kind, program.block.span))
            });
        match result {
            Ok(ref value) => debug!(kind = %value.kind(), "program finished"),
            Err(ref error) => debug!(code = error.code(), %error, "program failed"),
        }
        result
    }

    /// Evaluates one expression in the global scope.
    pub fn evaluate(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        let environment = self.environment.clone();
        self.evaluate_expression(&environment, expression)
    }
}

// Dispatch
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn evaluate_expression(
        &mut self,
        environment: &Environment,
        expression: &Expression,
    ) -> Result<Value, RuntimeError> {
        ensure_sufficient_stack(|| self.dispatch(environment, expression))
    }

    fn dispatch(
        &mut self,
        environment: &Environment,
        expression: &Expression,
    ) -> Result<Value, RuntimeError> {
        let span = expression.span;
        let at = |kind: RuntimeErrorKind| RuntimeError::new(kind, span);

        match &expression.kind {
            ExpressionKind::Number(v) => Ok(Value::Number(*v)),
            ExpressionKind::Bool(v) => Ok(Value::Boolean(*v)),
            ExpressionKind::Null => Ok(Value::Null),
            ExpressionKind::StringLiteral(text) => Ok(Value::string(text)),
            ExpressionKind::Character(c) => Ok(Value::Character(*c)),
            ExpressionKind::Identifier(name) => environment
                .get_var(name)
                .ok_or_else(|| at(RuntimeErrorKind::UndefinedIdentifier(name.clone()))),
            ExpressionKind::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items.iter() {
                    values.push(self.evaluate_settled(environment, item)?);
                }
                Ok(Value::list(values))
            }
            ExpressionKind::Block(block) => self.evaluate_block(environment, block, false),
            ExpressionKind::Group(inner) => self.evaluate_expression(environment, inner),
            ExpressionKind::Control { kind, carry } => Ok(Value::Control(Control {
                kind: *kind,
                carry: *carry,
            })),
            ExpressionKind::Prefix { operator, operand } => {
                self.evaluate_prefix(environment, *operator, operand, span)
            }
            ExpressionKind::Postfix { operator, operand } => {
                let increment = *operator == PostfixOperator::Increment;
                let (old, _) = self.evaluate_update(environment, operand, increment, span)?;
                Ok(old)
            }
            ExpressionKind::Infix { operator, lhs, rhs } => {
                let lhs = self.evaluate_expression(environment, lhs)?;
                let rhs = self.evaluate_expression(environment, rhs)?;
                operator::evaluate_infix(*operator, &lhs, &rhs).map_err(at)
            }
            ExpressionKind::Assignment(assignment) => {
                self.evaluate_assignment(environment, assignment, span)
            }
            ExpressionKind::Call { callee, arguments } => {
                self.evaluate_call(environment, callee, arguments, span)
            }
            ExpressionKind::Function { parameters, body } => {
                Ok(Value::Function(Arc::new(Function {
                    parameters: parameters.clone(),
                    body: Arc::clone(body),
                    closure: environment.clone(),
                })))
            }
            ExpressionKind::If {
                condition,
                success,
                failure,
            } => {
                if self.evaluate_condition(environment, condition, "if")? {
                    self.evaluate_expression(environment, success)
                } else if let Some(failure) = failure {
                    self.evaluate_expression(environment, failure)
                } else {
                    Ok(Value::None)
                }
            }
            ExpressionKind::While { condition, body } => {
                self.evaluate_while(environment, condition, body)
            }
            ExpressionKind::For(for_loop) => self.evaluate_for(environment, for_loop),
            ExpressionKind::Index { target, index } => {
                let target = self.evaluate_expression(environment, target)?;
                if !target.is_indexable() {
                    return Err(at(RuntimeErrorKind::NonIndexable(target.kind())));
                }
                let index = self.evaluate_expression(environment, index)?;
                indexing::read_index(&target, &index).map_err(at)
            }
            ExpressionKind::Method {
                receiver,
                name,
                arguments,
            } => {
                let receiver = self.evaluate_expression(environment, receiver)?;
                let method = receiver.find_method(name).map_err(at)?;
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments.iter() {
                    values.push(self.evaluate_settled(environment, argument)?);
                }
                method(&receiver, values).map_err(at)
            }
            ExpressionKind::Range {
                start,
                end,
                step,
                inclusive,
            } => {
                let start = self.evaluate_expression(environment, start)?;
                let end = self.evaluate_expression(environment, end)?;
                let step = self.evaluate_expression(environment, step)?;
                indexing::range(&start, &end, &step, *inclusive).map_err(at)
            }
            ExpressionKind::Shift { source, target } => {
                self.evaluate_shift(environment, source, target, span)
            }
            ExpressionKind::Pop { list, index } => {
                let list = self.evaluate_expression(environment, list)?;
                if !matches!(list, Value::List(_)) {
                    return Ok(list);
                }
                let index = self.evaluate_expression(environment, index)?;
                indexing::pop(list, &index).map_err(at)
            }
            ExpressionKind::Push { list, index, value } => {
                let list = self.evaluate_expression(environment, list)?;
                let index = self.evaluate_expression(environment, index)?;
                let value = self.evaluate_settled(environment, value)?;
                indexing::push(list, &index, value).map_err(at)
            }
        }
    }

    /// Evaluates a value about to be stored somewhere.
    fn evaluate_settled(
        &mut self,
        environment: &Environment,
        expression: &Expression,
    ) -> Result<Value, RuntimeError> {
        self.evaluate_expression(environment, expression)?
            .settle()
            .map_err(|kind| RuntimeError::new(kind, expression.span))
    }

    fn evaluate_condition(
        &mut self,
        environment: &Environment,
        condition: &Expression,
        construct: &'static str,
    ) -> Result<bool, RuntimeError> {
        match self.evaluate_expression(environment, condition)? {
            Value::Boolean(value) => Ok(value),
            other => Err(RuntimeError::new(
                RuntimeErrorKind::NonBooleanCondition {
                    construct,
                    kind: other.kind(),
                },
                condition.span,
            )),
        }
    }
}

// Blocks and loops
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn evaluate_block(
        &mut self,
        environment: &Environment,
        block: &Block,
        stack: bool,
    ) -> Result<Value, RuntimeError> {
        let mut out = Value::None;
        for expression in block.body.iter() {
            let value = self.evaluate_expression(environment, expression)?;
            if matches!(value, Value::None) {
                continue;
            }
            out = value;
            if stack {
                environment.push_stack(&out);
            }
            if let Value::Control(control) = out {
                if control.carry > 0 {
                    trace!(kind = %control.kind, carry = control.carry, "control leaves block");
                    return Ok(Value::Control(Control {
                        carry: control.carry - 1,
                        ..control
                    }));
                }
                return Ok(match control.kind {
                    ControlKind::Break => Value::Null,
                    ControlKind::Continue => Value::Boolean(true),
                });
            }
        }
        Ok(environment.get_out(out))
    }

    fn check_iterations(&self, count: usize, span: Span) -> Result<(), RuntimeError> {
        if count >= self.config.max_loop_iterations {
            warn!(
                limit = self.config.max_loop_iterations,
                "loop hit the iteration ceiling"
            );
            return Err(RuntimeError::new(
                RuntimeErrorKind::TooManyIterations(self.config.max_loop_iterations),
                span,
            ));
        }
        Ok(())
    }

    fn evaluate_while(
        &mut self,
        environment: &Environment,
        condition: &Expression,
        body: &Expression,
    ) -> Result<Value, RuntimeError> {
        let mut count = 0;
        while self.evaluate_condition(environment, condition, "while")? {
            self.check_iterations(count, body.span)?;
            let value = self.evaluate_expression(environment, body)?;
            match LoopFlow::from_body(&value) {
                LoopFlow::Stop => break,
                LoopFlow::Escape(control) => return Ok(Value::Control(control)),
                LoopFlow::Next => count += 1,
            }
        }
        trace!(iterations = count, "while loop finished");
        Ok(Value::Number(count as f64))
    }

    fn evaluate_for(
        &mut self,
        environment: &Environment,
        for_loop: &ForLoop,
    ) -> Result<Value, RuntimeError> {
        match for_loop {
            ForLoop::Traditional {
                initializer,
                condition,
                step,
                body,
            } => {
                self.evaluate_expression(environment, initializer)?;
                let mut count = 0;
                while self.evaluate_condition(environment, condition, "for loop")? {
                    self.check_iterations(count, body.span)?;
                    let value = self.evaluate_expression(environment, body)?;
                    match LoopFlow::from_body(&value) {
                        LoopFlow::Stop => break,
                        LoopFlow::Escape(control) => return Ok(Value::Control(control)),
                        LoopFlow::Next => {}
                    }
                    self.evaluate_expression(environment, step)?;
                    count += 1;
                }
                trace!(iterations = count, "for loop finished");
                Ok(Value::Number(count as f64))
            }
            ForLoop::In {
                variable,
                enumerable,
                body,
            } => {
                let value = self.evaluate_expression(environment, enumerable)?;
                let positions = value.enumerate().ok_or_else(|| {
                    RuntimeError::new(
                        RuntimeErrorKind::NonEnumerable(value.kind()),
                        enumerable.span,
                    )
                })?;
                self.evaluate_for_each(environment, variable, positions, body)
            }
            ForLoop::Of {
                variable,
                enumerable,
                body,
            } => {
                let value = self.evaluate_expression(environment, enumerable)?;
                let items = value.iterate().ok_or_else(|| {
                    RuntimeError::new(
                        RuntimeErrorKind::NonIterable(value.kind()),
                        enumerable.span,
                    )
                })?;
                self.evaluate_for_each(environment, variable, items, body)
            }
        }
    }

    /// Binds `variable` to each item in turn. Returns the number of items.
    fn evaluate_for_each(
        &mut self,
        environment: &Environment,
        variable: &str,
        items: Vec<Value>,
        body: &Expression,
    ) -> Result<Value, RuntimeError> {
        let length = items.len();
        if length == 0 {
            return Ok(Value::Number(0.0));
        }
        let mut result = Value::Number(length as f64);
        for item in items {
            environment
                .assign_var(variable, item, false, false, None)
                .map_err(|kind| RuntimeError::new(kind, body.span))?;
            let value = match self.evaluate_expression(environment, body) {
                Ok(value) => value,
                Err(error) => {
                    environment.unsign_var(variable);
                    return Err(error);
                }
            };
            match LoopFlow::from_body(&value) {
                LoopFlow::Stop => break,
                LoopFlow::Escape(control) => {
                    result = Value::Control(control);
                    break;
                }
                LoopFlow::Next => {}
            }
        }
        environment.unsign_var(variable);
        trace!(variable, items = length, "for-each loop finished");
        Ok(result)
    }
}

// Functions
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn evaluate_call(
        &mut self,
        environment: &Environment,
        callee: &Expression,
        arguments: &[Expression],
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let at = |kind: RuntimeErrorKind| RuntimeError::new(kind, span);
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments.iter() {
            values.push(self.evaluate_settled(environment, argument)?);
        }
        let callee = self.evaluate_expression(environment, callee)?;

        match callee {
            Value::Function(function) => self.call_function(&function, values, span),
            Value::NativeFunction(native) => {
                if let Some(arity) = native.get_arity() {
                    if arity != values.len() {
                        return Err(at(RuntimeErrorKind::InvalidArgumentCount {
                            actual: values.len(),
                            expected: arity,
                        }));
                    }
                }
                trace!(name = native.get_name(), "calling native function");
                native.call(values, &mut self.context).map_err(at)
            }
            other => Err(at(RuntimeErrorKind::InvalidCallee(other.kind()))),
        }
    }

    fn call_function(
        &mut self,
        function: &Function,
        arguments: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let at = |kind: RuntimeErrorKind| RuntimeError::new(kind, span);
        if arguments.len() != function.parameters.len() {
            return Err(at(RuntimeErrorKind::InvalidArgumentCount {
                actual: arguments.len(),
                expected: function.parameters.len(),
            }));
        }
        if self.depth >= self.config.max_call_depth {
            return Err(at(RuntimeErrorKind::CallDepthExceeded(
                self.config.max_call_depth,
            )));
        }

        let frame = function.closure.new_frame();
        for (parameter, argument) in function.parameters.iter().zip(arguments) {
            frame.declare_var(parameter, argument);
        }
        trace!(depth = self.depth, parameters = function.parameters.len(), "calling function");

        self.depth += 1;
        let result = self.evaluate_block(&frame, &function.body, false);
        self.depth -= 1;
        result?.settle().map_err(at)
    }
}

// Assignment and updates
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn evaluate_assignment(
        &mut self,
        environment: &Environment,
        assignment: &Assignment,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        if !assignment.target.is_place() {
            return Err(RuntimeError::new(
                RuntimeErrorKind::InvalidAssignmentTarget,
                assignment.target.span,
            ));
        }
        let value = self.evaluate_settled(environment, &assignment.value)?;
        let limit = match self.evaluate_expression(environment, &assignment.limit)? {
            Value::Number(limit) => Environment::limit_from_number(limit),
            other => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::NonNumericLimit(other.kind()),
                    assignment.limit.span,
                ))
            }
        };
        let place = self.resolve_place(environment, &assignment.target)?;
        place
            .write(
                environment,
                value,
                (assignment.is_const, assignment.is_ref, limit),
            )
            .map_err(|kind| RuntimeError::new(kind, span))
    }

    /// Evaluates the list and index of a place once.
    fn resolve_place<'a>(
        &mut self,
        environment: &Environment,
        target: &'a Expression,
    ) -> Result<Place<'a>, RuntimeError> {
        match &target.kind {
            ExpressionKind::Identifier(name) => Ok(Place::Variable(name.as_str())),
            ExpressionKind::Index { target, index } => {
                let list = self.evaluate_expression(environment, target)?;
                let index = self.evaluate_expression(environment, index)?;
                Ok(Place::Element { list, index })
            }
            _ => Err(RuntimeError::new(
                RuntimeErrorKind::InvalidAssignmentTarget,
                target.span,
            )),
        }
    }

    fn evaluate_prefix(
        &mut self,
        environment: &Environment,
        operator: PrefixOperator,
        operand: &Expression,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match operator {
            PrefixOperator::Increment | PrefixOperator::Decrement => {
                let increment = operator == PrefixOperator::Increment;
                let (_, new) = self.evaluate_update(environment, operand, increment, span)?;
                Ok(new)
            }
            operator => {
                let value = self.evaluate_expression(environment, operand)?;
                operator::evaluate_prefix(operator, &value)
                    .map_err(|kind| RuntimeError::new(kind, span))
            }
        }
    }

    /// Stores `operand ± 1` back into `operand`. Returns the old and the new value.
    fn evaluate_update(
        &mut self,
        environment: &Environment,
        operand: &Expression,
        increment: bool,
        span: Span,
    ) -> Result<(Value, Value), RuntimeError> {
        if !operand.is_place() {
            let symbol = if increment { "++" } else { "--" };
            return Err(RuntimeError::new(
                RuntimeErrorKind::InvalidUpdateTarget(symbol),
                operand.span,
            ));
        }
        let at = |kind: RuntimeErrorKind| RuntimeError::new(kind, span);
        let place = self.resolve_place(environment, operand)?;
        let old = place.read(environment).map_err(at)?;
        let new = operator::step(&old, increment).map_err(at)?;
        place
            .write(environment, new.clone(), (false, false, None))
            .map_err(at)?;
        Ok((old, new))
    }

    /// `source >> target`: stores `source` into `target` and yields what `target` held.
    fn evaluate_shift(
        &mut self,
        environment: &Environment,
        source: &Expression,
        target: &Expression,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        if !target.is_place() {
            return Err(RuntimeError::new(
                RuntimeErrorKind::InvalidShiftTarget,
                target.span,
            ));
        }
        let place = self.resolve_place(environment, target)?;
        let previous = place.read(environment).unwrap_or_else(|kind| {
            trace!(%kind, "shift target held nothing readable");
            Value::Null
        });
        let value = self.evaluate_settled(environment, source)?;
        let value = if source.is_place() { value.copy() } else { value };
        place
            .write(environment, value, (false, false, None))
            .map_err(|kind| RuntimeError::new(kind, span))?;
        Ok(previous)
    }
}

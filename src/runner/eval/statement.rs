//! Statement execution.
//!
//! This module provides statement execution logic for the interpreter.

use std::rc::Rc;

use crate::parser::ast::{
    BlockStatementData, CatchClauseData, DeclarationType, ExpressionType, ForBindingType,
    ForInitType, ForIteratorData, HoistedDeclarations, ProgramData, StatementType,
    SwitchCaseData, VariableDeclarationData, VariableDeclarationKind,
};
use crate::runner::ds::env_record::Scope;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::ObjectKind;
use crate::runner::ds::operations::object::for_in_keys;
use crate::runner::ds::operations::test_and_comparison::strict_equality;
use crate::runner::ds::operations::type_conversion::{to_boolean, to_string};
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

use super::expression::{assign_to_expression, evaluate_expression};
use super::function::create_function_object;
use super::types::{Completion, CompletionType, EvalResult, ValueResult};

/// Run a whole script against the context's global scope.
///
/// Returns the value of the last expression statement executed.
pub fn execute_program(program: &ProgramData, ctx: &mut EvalContext) -> ValueResult {
    let global = ctx.global_scope().clone();
    hoist_declarations(&program.hoisted, &global, ctx);
    let completion = execute_statements(&program.body, ctx)?;
    Ok(completion.get_value())
}

/// Declares hoisted `var` names and function declarations in `scope`,
/// which must be the running scope.
pub fn hoist_declarations(hoisted: &HoistedDeclarations, scope: &Rc<Scope>, ctx: &mut EvalContext) {
    for name in &hoisted.var_names {
        scope.declare_var(name);
    }
    for function in &hoisted.functions {
        let value = create_function_object(function, ctx);
        scope.declare(function.name(), value, true);
    }
}

/// Execute a statement list, stopping at the first abrupt completion.
pub fn execute_statements(statements: &[StatementType], ctx: &mut EvalContext) -> EvalResult {
    let mut last_value = None;
    for stmt in statements {
        let completion = execute_statement(stmt, ctx)?;
        if completion.is_abrupt() {
            return Ok(completion);
        }
        if completion.value.is_some() {
            last_value = completion.value;
        }
    }
    Ok(Completion {
        completion_type: CompletionType::Normal,
        value: last_value,
    })
}

/// Execute a statement and return its completion.
pub fn execute_statement(stmt: &StatementType, ctx: &mut EvalContext) -> EvalResult {
    match stmt {
        StatementType::EmptyStatement { .. } | StatementType::DebuggerStatement { .. } => {
            Ok(Completion::normal())
        }

        StatementType::ExpressionStatement { expression, .. } => {
            let value = evaluate_expression(expression, ctx)?;
            Ok(Completion::normal_with_value(value))
        }

        StatementType::BlockStatement(block) => execute_block_statement(block, ctx),

        StatementType::DeclarationStatement(decl) => execute_declaration(decl, ctx),

        StatementType::IfStatement {
            test,
            consequent,
            alternate,
            ..
        } => {
            let test_val = evaluate_expression(test, ctx)?;
            if to_boolean(&test_val) {
                execute_statement(consequent, ctx)
            } else if let Some(alternate) = alternate {
                execute_statement(alternate, ctx)
            } else {
                Ok(Completion::normal())
            }
        }

        StatementType::WhileStatement { test, body, .. } => {
            execute_while_statement(test, body, ctx)
        }

        StatementType::DoWhileStatement { test, body, .. } => {
            execute_do_while_statement(body, test, ctx)
        }

        StatementType::ForStatement {
            init,
            test,
            update,
            body,
            ..
        } => execute_for_statement(init.as_ref(), test.as_ref(), update.as_ref(), body, ctx),

        StatementType::ForInStatement(data) => execute_for_in_statement(data, ctx),

        StatementType::ForOfStatement(data) => execute_for_of_statement(data, ctx),

        StatementType::SwitchStatement {
            discriminant,
            cases,
            ..
        } => execute_switch_statement(discriminant, cases, ctx),

        StatementType::BreakStatement { .. } => Ok(Completion::break_completion()),

        StatementType::ContinueStatement { .. } => Ok(Completion::continue_completion()),

        StatementType::ReturnStatement { argument, .. } => {
            let value = match argument {
                Some(arg) => evaluate_expression(arg, ctx)?,
                None => JsValue::Undefined,
            };
            Ok(Completion::return_value(value))
        }

        StatementType::ThrowStatement { argument, .. } => {
            let value = evaluate_expression(argument, ctx)?;
            Err(JErrorType::Thrown(value))
        }

        StatementType::TryStatement {
            block,
            handler,
            finalizer,
            ..
        } => execute_try_statement(block, handler.as_ref(), finalizer.as_ref(), ctx),
    }
}

/// Execute a block statement in its own scope.
fn execute_block_statement(block: &BlockStatementData, ctx: &mut EvalContext) -> EvalResult {
    ctx.push_block_scope();
    let completion = execute_statements(&block.body, ctx);
    ctx.pop_block_scope();
    completion
}

fn execute_declaration(decl: &DeclarationType, ctx: &mut EvalContext) -> EvalResult {
    match decl {
        DeclarationType::VariableDeclaration(var_decl) => {
            execute_variable_declaration(var_decl, ctx)?;
            Ok(Completion::normal())
        }
        // Function declarations are bound when their scope is entered.
        DeclarationType::FunctionDeclaration(_) => Ok(Completion::normal()),
    }
}

fn execute_variable_declaration(
    var_decl: &VariableDeclarationData,
    ctx: &mut EvalContext,
) -> Result<(), JErrorType> {
    for declarator in &var_decl.declarations {
        let name = declarator.id.name.as_str();
        let value = match &declarator.init {
            Some(init) => Some(evaluate_expression(init, ctx)?),
            None => None,
        };
        bind_declared_name(var_decl.kind, name, value, ctx)?;
    }
    Ok(())
}

fn bind_declared_name(
    kind: VariableDeclarationKind,
    name: &str,
    value: Option<JsValue>,
    ctx: &mut EvalContext,
) -> Result<(), JErrorType> {
    match kind {
        VariableDeclarationKind::Var => {
            let scope = ctx.current_scope().variable_scope();
            match value {
                Some(v) => {
                    if !scope.set_own_binding(name, v.clone())? {
                        scope.declare(name, v, true);
                    }
                }
                None => scope.declare_var(name),
            }
        }
        VariableDeclarationKind::Let | VariableDeclarationKind::Const => {
            ctx.current_scope().declare(
                name,
                value.unwrap_or(JsValue::Undefined),
                kind == VariableDeclarationKind::Let,
            );
        }
    }
    Ok(())
}

/// Outcome of one loop body run.
enum LoopControl {
    Next,
    Exit,
    Propagate(Completion),
}

fn loop_control(completion: Completion) -> LoopControl {
    match completion.completion_type {
        CompletionType::Normal | CompletionType::Continue => LoopControl::Next,
        CompletionType::Break => LoopControl::Exit,
        CompletionType::Return => LoopControl::Propagate(completion),
    }
}

fn execute_while_statement(
    test: &ExpressionType,
    body: &StatementType,
    ctx: &mut EvalContext,
) -> EvalResult {
    loop {
        ctx.tick()?;
        let test_val = evaluate_expression(test, ctx)?;
        if !to_boolean(&test_val) {
            break;
        }
        match loop_control(execute_statement(body, ctx)?) {
            LoopControl::Next => {}
            LoopControl::Exit => break,
            LoopControl::Propagate(c) => return Ok(c),
        }
    }
    Ok(Completion::normal())
}

fn execute_do_while_statement(
    body: &StatementType,
    test: &ExpressionType,
    ctx: &mut EvalContext,
) -> EvalResult {
    loop {
        ctx.tick()?;
        match loop_control(execute_statement(body, ctx)?) {
            LoopControl::Next => {}
            LoopControl::Exit => break,
            LoopControl::Propagate(c) => return Ok(c),
        }
        let test_val = evaluate_expression(test, ctx)?;
        if !to_boolean(&test_val) {
            break;
        }
    }
    Ok(Completion::normal())
}

fn execute_for_statement(
    init: Option<&ForInitType>,
    test: Option<&ExpressionType>,
    update: Option<&ExpressionType>,
    body: &StatementType,
    ctx: &mut EvalContext,
) -> EvalResult {
    ctx.push_block_scope();
    let result = run_for_loop(init, test, update, body, ctx);
    ctx.pop_block_scope();
    result
}

fn run_for_loop(
    init: Option<&ForInitType>,
    test: Option<&ExpressionType>,
    update: Option<&ExpressionType>,
    body: &StatementType,
    ctx: &mut EvalContext,
) -> EvalResult {
    // `let` bindings get a fresh copy per iteration so closures see their own value.
    let mut per_iteration: Vec<String> = vec![];
    match init {
        Some(ForInitType::VariableDeclaration(decl)) => {
            execute_variable_declaration(decl, ctx)?;
            if decl.kind == VariableDeclarationKind::Let {
                per_iteration = decl
                    .declarations
                    .iter()
                    .map(|d| d.id.name.clone())
                    .collect();
            }
        }
        Some(ForInitType::Expression(expr)) => {
            evaluate_expression(expr, ctx)?;
        }
        None => {}
    }

    loop {
        ctx.tick()?;
        if let Some(test) = test {
            let test_val = evaluate_expression(test, ctx)?;
            if !to_boolean(&test_val) {
                break;
            }
        }
        match loop_control(execute_statement(body, ctx)?) {
            LoopControl::Next => {}
            LoopControl::Exit => break,
            LoopControl::Propagate(c) => return Ok(c),
        }
        if !per_iteration.is_empty() {
            copy_iteration_scope(&per_iteration, ctx);
        }
        if let Some(update) = update {
            evaluate_expression(update, ctx)?;
        }
    }
    Ok(Completion::normal())
}

fn copy_iteration_scope(names: &[String], ctx: &mut EvalContext) {
    let current = ctx.current_scope().clone();
    let outer = match current.outer() {
        Some(outer) => outer.clone(),
        None => return,
    };
    let next = Scope::new_block(outer);
    for name in names {
        next.declare(name, current.get_own_binding(name).unwrap_or(JsValue::Undefined), true);
    }
    ctx.replace_scope(next);
}

/// Binds the loop variable of a `for-in`/`for-of` for one iteration.
fn bind_iteration_value(left: &ForBindingType, value: JsValue, ctx: &mut EvalContext) -> Result<(), JErrorType> {
    match left {
        ForBindingType::Declaration { kind, id } => bind_declared_name(*kind, &id.name, Some(value), ctx),
        ForBindingType::Target(target) => assign_to_expression(target, value, ctx),
    }
}

fn execute_iteration<I>(data: &ForIteratorData, values: I, ctx: &mut EvalContext) -> EvalResult
where
    I: FnMut(&mut EvalContext, usize) -> Result<Option<JsValue>, JErrorType>,
{
    let mut values = values;
    let mut index = 0;
    loop {
        ctx.tick()?;
        let value = match values(ctx, index)? {
            Some(v) => v,
            None => break,
        };
        index += 1;
        ctx.push_block_scope();
        let outcome = bind_iteration_value(&data.left, value, ctx)
            .and_then(|_| execute_statement(&data.body, ctx));
        ctx.pop_block_scope();
        match loop_control(outcome?) {
            LoopControl::Next => {}
            LoopControl::Exit => break,
            LoopControl::Propagate(c) => return Ok(c),
        }
    }
    Ok(Completion::normal())
}

fn execute_for_in_statement(data: &ForIteratorData, ctx: &mut EvalContext) -> EvalResult {
    let object = evaluate_expression(&data.right, ctx)?;
    let keys = for_in_keys(&object);
    execute_iteration(data, |_, i| Ok(keys.get(i).map(|k| JsValue::String(k.clone()))), ctx)
}

fn execute_for_of_statement(data: &ForIteratorData, ctx: &mut EvalContext) -> EvalResult {
    let iterable = evaluate_expression(&data.right, ctx)?;
    match &iterable {
        JsValue::String(s) => {
            let chars: Vec<JsValue> = s.chars().map(|c| JsValue::String(c.to_string())).collect();
            execute_iteration(data, |_, i| Ok(chars.get(i).cloned()), ctx)
        }
        JsValue::Object(o) if matches!(o.borrow().kind, ObjectKind::Array(_)) => {
            let array = o.clone();
            execute_iteration(
                data,
                |_, i| {
                    Ok(match &array.borrow().kind {
                        ObjectKind::Array(items) => items.get(i).cloned(),
                        _ => None,
                    })
                },
                ctx,
            )
        }
        _ => Err(JErrorType::TypeError(format!(
            "{} is not iterable",
            to_string(&iterable)
        ))),
    }
}

fn execute_switch_statement(
    discriminant: &ExpressionType,
    cases: &[SwitchCaseData],
    ctx: &mut EvalContext,
) -> EvalResult {
    let value = evaluate_expression(discriminant, ctx)?;
    let mut start = None;
    for (i, case) in cases.iter().enumerate() {
        if let Some(test) = &case.test {
            let test_val = evaluate_expression(test, ctx)?;
            if strict_equality(&value, &test_val) {
                start = Some(i);
                break;
            }
        }
    }
    let start = match start.or_else(|| cases.iter().position(|c| c.test.is_none())) {
        Some(s) => s,
        None => return Ok(Completion::normal()),
    };

    ctx.push_block_scope();
    let mut result = Ok(Completion::normal());
    for case in &cases[start..] {
        match execute_statements(&case.consequent, ctx) {
            Ok(c) if c.is_normal() => {}
            Ok(c) if c.completion_type == CompletionType::Break => break,
            other => {
                result = other;
                break;
            }
        }
    }
    ctx.pop_block_scope();
    result
}

/// Converts an engine error into the value a `catch` clause receives.
pub fn error_to_value(error: JErrorType, ctx: &EvalContext) -> JsValue {
    match error {
        JErrorType::Thrown(value) => value,
        other => ctx.realm.new_error(other.name(), &other.message()),
    }
}

fn execute_try_statement(
    block: &BlockStatementData,
    handler: Option<&CatchClauseData>,
    finalizer: Option<&BlockStatementData>,
    ctx: &mut EvalContext,
) -> EvalResult {
    let saved_scope = ctx.current_scope().clone();
    let mut result = execute_block_statement(block, ctx);

    if let (Err(error), Some(handler)) = (&result, handler) {
        if error.is_catchable() {
            ctx.replace_scope(saved_scope.clone());
            let caught = match std::mem::replace(&mut result, Ok(Completion::normal())) {
                Err(e) => error_to_value(e, ctx),
                Ok(_) => JsValue::Undefined,
            };
            result = execute_catch_clause(handler, caught, ctx);
        }
    }

    if let Some(finalizer) = finalizer {
        match &result {
            Err(e) if !e.is_catchable() => return result,
            Err(_) => {
                ctx.replace_scope(saved_scope);
            }
            Ok(_) => {}
        }
        let final_completion = execute_block_statement(finalizer, ctx)?;
        if final_completion.is_abrupt() {
            return Ok(final_completion);
        }
    }
    result
}

fn execute_catch_clause(handler: &CatchClauseData, caught: JsValue, ctx: &mut EvalContext) -> EvalResult {
    ctx.push_block_scope();
    if let Some(param) = &handler.param {
        ctx.current_scope().declare(&param.name, caught, true);
    }
    let result = execute_block_statement(&handler.body, ctx);
    ctx.pop_block_scope();
    result
}

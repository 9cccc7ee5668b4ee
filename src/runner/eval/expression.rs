//! Expression evaluation.
//!
//! This module provides the core expression evaluation logic for the interpreter.
//! It handles all expression types defined in the AST.

use crate::parser::ast::{
    AssignmentOperator, BinaryOperator, ExpressionOrSpreadElement, ExpressionType, LiteralData,
    LiteralType, LogicalOperator, MemberExpressionType, NumberLiteralType, PropertyData,
    PropertyKeyType, TemplatePartType, UnaryOperator, UpdateOperator,
};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::ObjectKind;
use crate::runner::ds::operations::object::{
    delete_property, get_property, has_property, instance_of, set_property,
};
use crate::runner::ds::operations::test_and_comparison::{
    less_than, loose_equality, strict_equality,
};
use crate::runner::ds::operations::type_conversion::{
    get_type, to_boolean, to_int32, to_number, to_property_key, to_string, to_uint32,
    TYPE_STR_UNDEFINED,
};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::plugin::types::EvalContext;

use super::function::{call_function, construct, create_function_object, to_string_with_ctx};
use super::types::{Reference, ValueResult};

/// Evaluate an expression and return its value.
pub fn evaluate_expression(expr: &ExpressionType, ctx: &mut EvalContext) -> ValueResult {
    match expr {
        ExpressionType::Literal(lit) => Ok(evaluate_literal(lit, ctx)),

        ExpressionType::Identifier(id) => ctx.get_binding(&id.name),

        ExpressionType::ThisExpression { .. } => Ok(ctx.this_value()),

        ExpressionType::ArrayExpression { elements, .. } => {
            evaluate_array_expression(elements, ctx)
        }

        ExpressionType::ObjectExpression { properties, .. } => {
            evaluate_object_expression(properties, ctx)
        }

        ExpressionType::FunctionOrArrowExpression(data) => {
            Ok(create_function_object(data, ctx))
        }

        ExpressionType::UnaryExpression {
            operator, argument, ..
        } => evaluate_unary_expression(*operator, argument, ctx),

        ExpressionType::UpdateExpression {
            operator,
            argument,
            prefix,
            ..
        } => evaluate_update_expression(*operator, argument, *prefix, ctx),

        ExpressionType::BinaryExpression {
            operator,
            left,
            right,
            ..
        } => {
            let left_val = evaluate_expression(left, ctx)?;
            let right_val = evaluate_expression(right, ctx)?;
            apply_binary_operator(*operator, &left_val, &right_val, ctx)
        }

        ExpressionType::LogicalExpression {
            operator,
            left,
            right,
            ..
        } => {
            let left_val = evaluate_expression(left, ctx)?;
            if short_circuits(*operator, &left_val) {
                Ok(left_val)
            } else {
                evaluate_expression(right, ctx)
            }
        }

        ExpressionType::AssignmentExpression {
            operator,
            left,
            right,
            ..
        } => evaluate_assignment_expression(*operator, left, right, ctx),

        ExpressionType::ConditionalExpression {
            test,
            consequent,
            alternate,
            ..
        } => {
            let test_val = evaluate_expression(test, ctx)?;
            if to_boolean(&test_val) {
                evaluate_expression(consequent, ctx)
            } else {
                evaluate_expression(alternate, ctx)
            }
        }

        ExpressionType::CallExpression {
            callee, arguments, ..
        } => evaluate_call_expression(callee, arguments, ctx),

        ExpressionType::NewExpression {
            callee, arguments, ..
        } => {
            let constructor = evaluate_expression(callee, ctx)?;
            let args = evaluate_arguments(arguments, ctx)?;
            if !constructor.is_callable() {
                return Err(JErrorType::TypeError(format!(
                    "{} is not a constructor",
                    expression_label(callee)
                )));
            }
            construct(&constructor, args, ctx)
        }

        ExpressionType::MemberExpression(member) => {
            let (base, key) = evaluate_member_parts(member, ctx)?;
            get_property(ctx, &base, &key)
        }

        ExpressionType::SequenceExpression { expressions, .. } => {
            let mut result = JsValue::Undefined;
            for expr in expressions {
                result = evaluate_expression(expr, ctx)?;
            }
            Ok(result)
        }

        ExpressionType::TemplateLiteral { parts, .. } => {
            let mut out = String::new();
            for part in parts {
                match part {
                    TemplatePartType::Text(text) => out.push_str(text),
                    TemplatePartType::Substitution(expr) => {
                        let value = evaluate_expression(expr, ctx)?;
                        let text = to_string_with_ctx(&value, ctx)?;
                        JErrorType::check_string_length(out.len() + text.len())?;
                        out.push_str(&text);
                    }
                }
            }
            Ok(JsValue::String(out))
        }
    }
}

/// Evaluate a literal and return its value.
fn evaluate_literal(lit: &LiteralData, ctx: &EvalContext) -> JsValue {
    match &lit.value {
        LiteralType::NullLiteral => JsValue::Null,
        LiteralType::BooleanLiteral(b) => JsValue::Boolean(*b),
        LiteralType::StringLiteral(s) => JsValue::String(s.clone()),
        LiteralType::NumberLiteral(NumberLiteralType::IntegerLiteral(i)) => {
            JsValue::Number(JsNumberType::Integer(*i))
        }
        LiteralType::NumberLiteral(NumberLiteralType::FloatLiteral(f)) => JsValue::from_f64(*f),
        LiteralType::RegExpLiteral(re) => ctx.realm.new_regexp(&re.pattern, &re.flags),
    }
}

/// Values produced by a spread operand.
fn spread_values(value: JsValue) -> Result<Vec<JsValue>, JErrorType> {
    if let JsValue::String(s) = &value {
        return Ok(s.chars().map(|c| JsValue::String(c.to_string())).collect());
    }
    if let JsValue::Object(o) = &value {
        if let ObjectKind::Array(items) = &o.borrow().kind {
            return Ok(items.clone());
        }
    }
    Err(JErrorType::TypeError(format!(
        "{} is not iterable",
        to_string(&value)
    )))
}

fn evaluate_arguments(
    arguments: &[ExpressionOrSpreadElement],
    ctx: &mut EvalContext,
) -> Result<Vec<JsValue>, JErrorType> {
    let mut values = Vec::with_capacity(arguments.len());
    for arg in arguments {
        match arg {
            ExpressionOrSpreadElement::Expression(e) => values.push(evaluate_expression(e, ctx)?),
            ExpressionOrSpreadElement::SpreadElement(e) => {
                let spread = evaluate_expression(e, ctx)?;
                values.extend(spread_values(spread)?);
            }
        }
    }
    Ok(values)
}

fn evaluate_array_expression(
    elements: &[Option<ExpressionOrSpreadElement>],
    ctx: &mut EvalContext,
) -> ValueResult {
    let mut items = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            None => items.push(JsValue::Undefined),
            Some(ExpressionOrSpreadElement::Expression(e)) => {
                items.push(evaluate_expression(e, ctx)?)
            }
            Some(ExpressionOrSpreadElement::SpreadElement(e)) => {
                let spread = evaluate_expression(e, ctx)?;
                items.extend(spread_values(spread)?);
                JErrorType::check_array_length(items.len())?;
            }
        }
    }
    Ok(ctx.realm.new_array(items))
}

fn evaluate_object_expression(properties: &[PropertyData], ctx: &mut EvalContext) -> ValueResult {
    let object = ctx.realm.new_object_value();
    for property in properties {
        match property {
            PropertyData::Init { key, value } => {
                let key = match key {
                    PropertyKeyType::Static(s) => s.clone(),
                    PropertyKeyType::Computed(expr) => {
                        let k = evaluate_expression(expr, ctx)?;
                        to_string_with_ctx(&k, ctx)?
                    }
                };
                let value = evaluate_expression(value, ctx)?;
                set_property(&object, &key, value)?;
            }
            PropertyData::Spread(expr) => {
                let source = evaluate_expression(expr, ctx)?;
                copy_own_properties(&source, &object)?;
            }
        }
    }
    Ok(object)
}

/// Copies own enumerable properties, as `{...source}` and `Object.assign` do.
pub fn copy_own_properties(source: &JsValue, target: &JsValue) -> Result<(), JErrorType> {
    match source {
        JsValue::Object(o) => {
            let entries: Vec<(String, JsValue)> = {
                let b = o.borrow();
                b.own_keys()
                    .into_iter()
                    .map(|k| {
                        let v = b.get_own_property(&k).unwrap_or(JsValue::Undefined);
                        (k, v)
                    })
                    .collect()
            };
            for (k, v) in entries {
                set_property(target, &k, v)?;
            }
        }
        JsValue::String(s) => {
            for (i, c) in s.chars().enumerate() {
                set_property(target, &i.to_string(), JsValue::String(c.to_string()))?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn evaluate_member_parts(
    member: &MemberExpressionType,
    ctx: &mut EvalContext,
) -> Result<(JsValue, String), JErrorType> {
    match member {
        MemberExpressionType::SimpleMemberExpression {
            object, property, ..
        } => Ok((evaluate_expression(object, ctx)?, property.clone())),
        MemberExpressionType::ComputedMemberExpression {
            object, property, ..
        } => {
            let base = evaluate_expression(object, ctx)?;
            let key = evaluate_expression(property, ctx)?;
            let key = match &key {
                JsValue::Object(_) => to_string_with_ctx(&key, ctx)?,
                _ => to_property_key(&key),
            };
            Ok((base, key))
        }
    }
}

/// Short source-like label for error messages.
fn expression_label(expr: &ExpressionType) -> String {
    match expr {
        ExpressionType::Identifier(id) => id.name.clone(),
        ExpressionType::ThisExpression { .. } => "this".to_string(),
        ExpressionType::MemberExpression(MemberExpressionType::SimpleMemberExpression {
            object,
            property,
            ..
        }) => format!("{}.{}", expression_label(object), property),
        ExpressionType::MemberExpression(MemberExpressionType::ComputedMemberExpression {
            object,
            ..
        }) => format!("{}[...]", expression_label(object)),
        ExpressionType::CallExpression { callee, .. } => format!("{}(...)", expression_label(callee)),
        _ => "expression".to_string(),
    }
}

fn evaluate_call_expression(
    callee: &ExpressionType,
    arguments: &[ExpressionOrSpreadElement],
    ctx: &mut EvalContext,
) -> ValueResult {
    let (func, this_value) = match callee {
        ExpressionType::MemberExpression(member) => {
            let (base, key) = evaluate_member_parts(member, ctx)?;
            (get_property(ctx, &base, &key)?, base)
        }
        other => (evaluate_expression(other, ctx)?, JsValue::Undefined),
    };
    let args = evaluate_arguments(arguments, ctx)?;
    if !func.is_callable() {
        return Err(JErrorType::TypeError(format!(
            "{} is not a function",
            expression_label(callee)
        )));
    }
    call_function(&func, this_value, args, ctx)
}

// ============================================================================
// References
// ============================================================================

fn get_reference(expr: &ExpressionType, ctx: &mut EvalContext) -> Result<Reference, JErrorType> {
    match expr {
        ExpressionType::Identifier(id) => Ok(Reference::Binding(id.name.clone())),
        ExpressionType::MemberExpression(member) => {
            let (base, key) = evaluate_member_parts(member, ctx)?;
            Ok(Reference::Property { base, key })
        }
        _ => Err(JErrorType::SyntaxError(
            "Invalid left-hand side in assignment".to_string(),
        )),
    }
}

fn get_reference_value(reference: &Reference, ctx: &mut EvalContext) -> ValueResult {
    match reference {
        Reference::Binding(name) => ctx.get_binding(name),
        Reference::Property { base, key } => get_property(ctx, base, key),
    }
}

fn put_value(reference: &Reference, value: JsValue, ctx: &mut EvalContext) -> Result<(), JErrorType> {
    match reference {
        Reference::Binding(name) => ctx.set_binding(name, value),
        Reference::Property { base, key } => set_property(base, key, value),
    }
}

/// Assigns `value` to an identifier or member expression.
pub fn assign_to_expression(
    target: &ExpressionType,
    value: JsValue,
    ctx: &mut EvalContext,
) -> Result<(), JErrorType> {
    let reference = get_reference(target, ctx)?;
    put_value(&reference, value, ctx)
}

fn short_circuits(operator: LogicalOperator, left: &JsValue) -> bool {
    match operator {
        LogicalOperator::And => !to_boolean(left),
        LogicalOperator::Or => to_boolean(left),
        LogicalOperator::NullishCoalescing => !left.is_nullish(),
    }
}

fn evaluate_assignment_expression(
    operator: AssignmentOperator,
    left: &ExpressionType,
    right: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    let reference = get_reference(left, ctx)?;

    let logical = match operator {
        AssignmentOperator::LogicalOrEquals => Some(LogicalOperator::Or),
        AssignmentOperator::LogicalAndEquals => Some(LogicalOperator::And),
        AssignmentOperator::NullishEquals => Some(LogicalOperator::NullishCoalescing),
        _ => None,
    };
    if let Some(logical) = logical {
        let current = get_reference_value(&reference, ctx)?;
        if short_circuits(logical, &current) {
            return Ok(current);
        }
        let value = evaluate_expression(right, ctx)?;
        put_value(&reference, value.clone(), ctx)?;
        return Ok(value);
    }

    let final_value = match operator.binary_operator() {
        Some(binary) => {
            let current = get_reference_value(&reference, ctx)?;
            let rhs_value = evaluate_expression(right, ctx)?;
            apply_binary_operator(binary, &current, &rhs_value, ctx)?
        }
        None => evaluate_expression(right, ctx)?,
    };
    put_value(&reference, final_value.clone(), ctx)?;
    Ok(final_value)
}

fn evaluate_unary_expression(
    operator: UnaryOperator,
    argument: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    match operator {
        UnaryOperator::TypeOf => {
            if let ExpressionType::Identifier(id) = argument {
                if !ctx.has_binding(&id.name) {
                    return Ok(JsValue::from_str(TYPE_STR_UNDEFINED));
                }
            }
            let value = evaluate_expression(argument, ctx)?;
            Ok(JsValue::from_str(get_type(&value)))
        }
        UnaryOperator::Void => {
            evaluate_expression(argument, ctx)?;
            Ok(JsValue::Undefined)
        }
        UnaryOperator::LogicalNot => {
            let value = evaluate_expression(argument, ctx)?;
            Ok(JsValue::Boolean(!to_boolean(&value)))
        }
        UnaryOperator::Minus => {
            let value = evaluate_expression(argument, ctx)?;
            Ok(match to_numeric(&value, ctx)? {
                JsNumberType::Integer(i) if i != 0 => JsValue::Number(JsNumberType::Integer(-i)),
                n => JsValue::from_f64(-n.as_f64()),
            })
        }
        UnaryOperator::Plus => {
            let value = evaluate_expression(argument, ctx)?;
            Ok(JsValue::Number(to_numeric(&value, ctx)?))
        }
        UnaryOperator::BitwiseNot => {
            let value = evaluate_expression(argument, ctx)?;
            Ok(JsValue::from_i64(!to_int32(&value) as i64))
        }
        UnaryOperator::Delete => match argument {
            ExpressionType::MemberExpression(member) => {
                let (base, key) = evaluate_member_parts(member, ctx)?;
                Ok(JsValue::Boolean(delete_property(&base, &key)?))
            }
            ExpressionType::Identifier(_) => Ok(JsValue::Boolean(false)),
            other => {
                evaluate_expression(other, ctx)?;
                Ok(JsValue::Boolean(true))
            }
        },
    }
}

fn evaluate_update_expression(
    operator: UpdateOperator,
    argument: &ExpressionType,
    prefix: bool,
    ctx: &mut EvalContext,
) -> ValueResult {
    let reference = get_reference(argument, ctx)?;
    let current = get_reference_value(&reference, ctx)?;
    let old_value = to_numeric(&current, ctx)?;
    let delta = match operator {
        UpdateOperator::PlusPlus => 1,
        UpdateOperator::MinusMinus => -1,
    };
    let new_value = match old_value {
        JsNumberType::Integer(i) => match i.checked_add(delta) {
            Some(n) => JsValue::Number(JsNumberType::Integer(n)),
            None => JsValue::from_f64(i as f64 + delta as f64),
        },
        ref n => JsValue::from_f64(n.as_f64() + delta as f64),
    };
    put_value(&reference, new_value.clone(), ctx)?;
    Ok(if prefix {
        new_value
    } else {
        JsValue::Number(old_value)
    })
}

// ============================================================================
// Operators
// ============================================================================

/// Objects convert through their string form; everything else is unchanged.
fn to_primitive(value: &JsValue, ctx: &mut EvalContext) -> ValueResult {
    match value {
        JsValue::Object(_) => Ok(JsValue::String(to_string_with_ctx(value, ctx)?)),
        _ => Ok(value.clone()),
    }
}

fn to_numeric(value: &JsValue, ctx: &mut EvalContext) -> Result<JsNumberType, JErrorType> {
    match value {
        JsValue::Number(n) => Ok(n.clone()),
        JsValue::Object(_) => {
            let primitive = to_primitive(value, ctx)?;
            Ok(JsNumberType::from_f64(to_number(&primitive)))
        }
        _ => Ok(JsNumberType::from_f64(to_number(value))),
    }
}

fn integer_pair(left: &JsValue, right: &JsValue) -> Option<(i64, i64)> {
    match (left, right) {
        (JsValue::Number(JsNumberType::Integer(a)), JsValue::Number(JsNumberType::Integer(b))) => {
            Some((*a, *b))
        }
        _ => None,
    }
}

/// Applies a binary operator to two evaluated operands.
pub fn apply_binary_operator(
    operator: BinaryOperator,
    left: &JsValue,
    right: &JsValue,
    ctx: &mut EvalContext,
) -> ValueResult {
    Ok(match operator {
        BinaryOperator::Add => {
            if let Some((a, b)) = integer_pair(left, right) {
                if let Some(sum) = a.checked_add(b) {
                    return Ok(JsValue::from_i64(sum));
                }
            }
            let l = to_primitive(left, ctx)?;
            let r = to_primitive(right, ctx)?;
            if matches!(l, JsValue::String(_)) || matches!(r, JsValue::String(_)) {
                let (l, r) = (to_string(&l), to_string(&r));
                JErrorType::check_string_length(l.len() + r.len())?;
                JsValue::String(l + &r)
            } else {
                JsValue::from_f64(to_number(&l) + to_number(&r))
            }
        }
        BinaryOperator::Subtract => {
            if let Some(diff) = integer_pair(left, right).and_then(|(a, b)| a.checked_sub(b)) {
                return Ok(JsValue::from_i64(diff));
            }
            let (a, b) = numeric_pair(left, right, ctx)?;
            JsValue::from_f64(a - b)
        }
        BinaryOperator::Multiply => {
            if let Some(product) = integer_pair(left, right).and_then(|(a, b)| a.checked_mul(b)) {
                return Ok(JsValue::from_i64(product));
            }
            let (a, b) = numeric_pair(left, right, ctx)?;
            JsValue::from_f64(a * b)
        }
        BinaryOperator::Divide => {
            let (a, b) = numeric_pair(left, right, ctx)?;
            JsValue::from_f64(a / b)
        }
        BinaryOperator::Modulo => {
            let (a, b) = numeric_pair(left, right, ctx)?;
            JsValue::from_f64(a % b)
        }
        BinaryOperator::Exponent => {
            let (a, b) = numeric_pair(left, right, ctx)?;
            JsValue::from_f64(a.powf(b))
        }

        BinaryOperator::LessThan => JsValue::Boolean(less_than(left, right) == Some(true)),
        BinaryOperator::GreaterThan => JsValue::Boolean(less_than(right, left) == Some(true)),
        BinaryOperator::LessThanEqual => JsValue::Boolean(less_than(right, left) == Some(false)),
        BinaryOperator::GreaterThanEqual => JsValue::Boolean(less_than(left, right) == Some(false)),

        BinaryOperator::StrictlyEqual => JsValue::Boolean(strict_equality(left, right)),
        BinaryOperator::StrictlyUnequal => JsValue::Boolean(!strict_equality(left, right)),
        BinaryOperator::LooselyEqual => JsValue::Boolean(loose_equality(left, right)),
        BinaryOperator::LooselyUnequal => JsValue::Boolean(!loose_equality(left, right)),

        BinaryOperator::BitwiseAnd => JsValue::from_i64((to_int32(left) & to_int32(right)) as i64),
        BinaryOperator::BitwiseOr => JsValue::from_i64((to_int32(left) | to_int32(right)) as i64),
        BinaryOperator::BitwiseXor => JsValue::from_i64((to_int32(left) ^ to_int32(right)) as i64),
        BinaryOperator::BitwiseLeftShift => {
            let shift = to_uint32(right) & 31;
            JsValue::from_i64(to_int32(left).wrapping_shl(shift) as i64)
        }
        BinaryOperator::BitwiseRightShift => {
            let shift = to_uint32(right) & 31;
            JsValue::from_i64((to_int32(left) >> shift) as i64)
        }
        BinaryOperator::BitwiseUnsignedRightShift => {
            let shift = to_uint32(right) & 31;
            JsValue::from_i64((to_uint32(left) >> shift) as i64)
        }

        BinaryOperator::InstanceOf => JsValue::Boolean(instance_of(ctx, left, right)?),
        BinaryOperator::In => {
            let key = to_property_key(left);
            JsValue::Boolean(has_property(ctx, right, &key)?)
        }
    })
}

fn numeric_pair(left: &JsValue, right: &JsValue, ctx: &mut EvalContext) -> Result<(f64, f64), JErrorType> {
    Ok((
        to_numeric(left, ctx)?.as_f64(),
        to_numeric(right, ctx)?.as_f64(),
    ))
}

use std::rc::Rc;

use pest::error::{Error, ErrorVariant, LineColLocation};
use pest::iterators::Pair;
use pest::{Parser, Span};
use pest_derive::Parser;

use super::ast::*;
use super::util::{numeric_property_key, parse_numeric_token, unescape_string, NumericToken};
use crate::runner::ds::error::JErrorType;

#[derive(Parser)]
#[grammar = "parser/js_grammar.pest"] // relative to src
pub struct JsParser;

impl JsParser {
    /// Parses a whole script into its AST, reporting failures as `SyntaxError`.
    pub fn parse_to_ast_from_str(script: &str) -> Result<ProgramData, JErrorType> {
        parse_to_ast(script).map_err(|e| to_syntax_error(&e))
    }
}

pub fn parse_to_ast(script: &str) -> Result<ProgramData, Error<Rule>> {
    let mut pairs = JsParser::parse(Rule::script, script)?;
    let script_pair = pairs.next().ok_or_else(|| {
        Error::new_from_pos(
            ErrorVariant::CustomError {
                message: "Empty parse result".to_string(),
            },
            pest::Position::from_start(script),
        )
    })?;
    AstBuilder::new().build_ast_from_script(script_pair)
}

fn to_syntax_error(error: &Error<Rule>) -> JErrorType {
    let (line, column) = match &error.line_col {
        LineColLocation::Pos(pos) => *pos,
        LineColLocation::Span(start, _) => *start,
    };
    let message = match &error.variant {
        ErrorVariant::CustomError { message } => message.clone(),
        ErrorVariant::ParsingError { .. } => "Unexpected token".to_string(),
    };
    JErrorType::SyntaxError(format!(
        "{} at line {}, column {}",
        message, line, column
    ))
}

fn get_unexpected_error(id: i32, pair: &Pair<Rule>) -> Error<Rule> {
    let message = format!("Unexpected state reached [{:?}] - {}", pair.as_rule(), id);
    Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span())
}

fn get_custom_error(message: &str, span: Span) -> Error<Rule> {
    Error::new_from_span(
        ErrorVariant::CustomError {
            message: message.to_string(),
        },
        span,
    )
}

fn expect_next<'i, I: Iterator<Item = Pair<'i, Rule>>>(
    iter: &mut I,
    span: Span<'i>,
) -> Result<Pair<'i, Rule>, Error<Rule>> {
    iter.next()
        .ok_or_else(|| get_custom_error("Unexpected end of construct", span))
}

fn get_meta(pair: &Pair<Rule>) -> Meta {
    let span = pair.as_span();
    Meta::new(span.start(), span.end())
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_break
            | Rule::kw_case
            | Rule::kw_catch
            | Rule::kw_class
            | Rule::kw_const
            | Rule::kw_continue
            | Rule::kw_debugger
            | Rule::kw_default
            | Rule::kw_delete
            | Rule::kw_do
            | Rule::kw_else
            | Rule::kw_enum
            | Rule::kw_export
            | Rule::kw_extends
            | Rule::kw_false
            | Rule::kw_finally
            | Rule::kw_for
            | Rule::kw_function
            | Rule::kw_if
            | Rule::kw_import
            | Rule::kw_in
            | Rule::kw_instanceof
            | Rule::kw_let
            | Rule::kw_new
            | Rule::kw_null
            | Rule::kw_of
            | Rule::kw_return
            | Rule::kw_super
            | Rule::kw_switch
            | Rule::kw_this
            | Rule::kw_throw
            | Rule::kw_true
            | Rule::kw_try
            | Rule::kw_typeof
            | Rule::kw_var
            | Rule::kw_void
            | Rule::kw_while
            | Rule::kw_with
    )
}

/// Inner pairs of `pair` with keyword tokens removed.
fn significant_pairs<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

/// Builds the AST and collects hoisted declarations per function body.
struct AstBuilder {
    hoisting: Vec<HoistedDeclarations>,
    arguments_seen: Vec<bool>,
}

impl AstBuilder {
    fn new() -> Self {
        AstBuilder {
            hoisting: Vec::new(),
            arguments_seen: Vec::new(),
        }
    }

    fn current_hoisting(&mut self) -> Option<&mut HoistedDeclarations> {
        self.hoisting.last_mut()
    }

    fn build_ast_from_script(&mut self, pair: Pair<Rule>) -> Result<ProgramData, Error<Rule>> {
        let meta = get_meta(&pair);
        self.hoisting.push(HoistedDeclarations::default());
        self.arguments_seen.push(false);
        let mut body = vec![];
        let mut failure = None;
        for inner_pair in pair.into_inner() {
            if inner_pair.as_rule() == Rule::EOI {
                continue;
            }
            match self.build_ast_from_statement(inner_pair) {
                Ok(s) => body.push(s),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        self.arguments_seen.pop();
        let hoisted = self.hoisting.pop().unwrap_or_default();
        match failure {
            Some(e) => Err(e),
            None => Ok(ProgramData {
                meta,
                body,
                hoisted,
            }),
        }
    }

    // ===== Statements =====

    fn build_ast_from_statement(&mut self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        Ok(match pair.as_rule() {
            Rule::block_statement => StatementType::BlockStatement(self.build_ast_from_block(pair)?),
            Rule::variable_statement => {
                let declaration_pair = expect_next(&mut pair.into_inner(), span)?;
                StatementType::DeclarationStatement(DeclarationType::VariableDeclaration(
                    self.build_ast_from_variable_declaration(declaration_pair)?,
                ))
            }
            Rule::function_declaration => {
                let f = Rc::new(self.build_ast_from_function(pair)?);
                if let Some(h) = self.current_hoisting() {
                    h.functions.push(f.clone());
                }
                StatementType::DeclarationStatement(DeclarationType::FunctionDeclaration(f))
            }
            Rule::empty_statement => StatementType::EmptyStatement { meta },
            Rule::debugger_statement => StatementType::DebuggerStatement { meta },
            Rule::if_statement => {
                let mut inner = significant_pairs(pair);
                let test = self.build_ast_from_expression(expect_next(&mut inner, span)?)?;
                let consequent =
                    Box::new(self.build_ast_from_statement(expect_next(&mut inner, span)?)?);
                let alternate = match inner.next() {
                    Some(p) => Some(Box::new(self.build_ast_from_statement(p)?)),
                    None => None,
                };
                StatementType::IfStatement {
                    meta,
                    test,
                    consequent,
                    alternate,
                }
            }
            Rule::for_in_statement => self.build_ast_from_for_in_statement(pair)?,
            Rule::for_statement => self.build_ast_from_for_statement(pair)?,
            Rule::while_statement => {
                let mut inner = significant_pairs(pair);
                let test = self.build_ast_from_expression(expect_next(&mut inner, span)?)?;
                let body = Box::new(self.build_ast_from_statement(expect_next(&mut inner, span)?)?);
                StatementType::WhileStatement { meta, test, body }
            }
            Rule::do_while_statement => {
                let mut inner = significant_pairs(pair);
                let body = Box::new(self.build_ast_from_statement(expect_next(&mut inner, span)?)?);
                let test = self.build_ast_from_expression(expect_next(&mut inner, span)?)?;
                StatementType::DoWhileStatement { meta, test, body }
            }
            Rule::continue_statement => StatementType::ContinueStatement { meta },
            Rule::break_statement => StatementType::BreakStatement { meta },
            Rule::return_statement => {
                let argument = match significant_pairs(pair).next() {
                    Some(p) => Some(self.build_ast_from_expression(p)?),
                    None => None,
                };
                StatementType::ReturnStatement { meta, argument }
            }
            Rule::throw_statement => {
                let argument =
                    self.build_ast_from_expression(expect_next(&mut significant_pairs(pair), span)?)?;
                StatementType::ThrowStatement { meta, argument }
            }
            Rule::try_statement => self.build_ast_from_try_statement(pair)?,
            Rule::switch_statement => self.build_ast_from_switch_statement(pair)?,
            Rule::expression_statement => {
                let expression =
                    self.build_ast_from_expression(expect_next(&mut pair.into_inner(), span)?)?;
                StatementType::ExpressionStatement { meta, expression }
            }
            _ => return Err(get_unexpected_error(1, &pair)),
        })
    }

    fn build_ast_from_block(&mut self, pair: Pair<Rule>) -> Result<BlockStatementData, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut body = vec![];
        for inner_pair in pair.into_inner() {
            body.push(self.build_ast_from_statement(inner_pair)?);
        }
        Ok(BlockStatementData { meta, body })
    }

    fn build_ast_from_variable_declaration(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<VariableDeclarationData, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let kind = get_variable_kind(&expect_next(&mut inner, span)?)?;
        let mut declarations = vec![];
        for declarator_pair in inner {
            let declarator_meta = get_meta(&declarator_pair);
            let declarator_span = declarator_pair.as_span();
            let mut parts = declarator_pair.into_inner();
            let id = self.build_identifier(expect_next(&mut parts, declarator_span)?);
            let init = match parts.next() {
                Some(p) => Some(self.build_ast_from_assignment_expression(p)?),
                None => None,
            };
            if kind == VariableDeclarationKind::Var {
                if let Some(h) = self.current_hoisting() {
                    h.add_var_name(&id.name);
                }
            }
            declarations.push(VariableDeclaratorData {
                meta: declarator_meta,
                id,
                init,
            });
        }
        Ok(VariableDeclarationData {
            meta,
            kind,
            declarations,
        })
    }

    fn build_ast_from_for_statement(&mut self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let mut inner = significant_pairs(pair);
        let init = match expect_next(&mut inner, span)?.into_inner().next() {
            Some(p) if p.as_rule() == Rule::variable_declaration => Some(
                ForInitType::VariableDeclaration(self.build_ast_from_variable_declaration(p)?),
            ),
            Some(p) => Some(ForInitType::Expression(self.build_ast_from_expression(p)?)),
            None => None,
        };
        let test = match expect_next(&mut inner, span)?.into_inner().next() {
            Some(p) => Some(self.build_ast_from_expression(p)?),
            None => None,
        };
        let update = match expect_next(&mut inner, span)?.into_inner().next() {
            Some(p) => Some(self.build_ast_from_expression(p)?),
            None => None,
        };
        let body = Box::new(self.build_ast_from_statement(expect_next(&mut inner, span)?)?);
        Ok(StatementType::ForStatement {
            meta,
            init,
            test,
            update,
            body,
        })
    }

    fn build_ast_from_for_in_statement(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let mut inner = significant_pairs(pair);
        let binding_pair = expect_next(&mut inner, span)?;
        let binding_span = binding_pair.as_span();
        let mut binding_inner = binding_pair.into_inner();
        let first = expect_next(&mut binding_inner, binding_span)?;
        let left = if first.as_rule() == Rule::var_kind {
            let kind = get_variable_kind(&first)?;
            let id = self.build_identifier(expect_next(&mut binding_inner, binding_span)?);
            if kind == VariableDeclarationKind::Var {
                if let Some(h) = self.current_hoisting() {
                    h.add_var_name(&id.name);
                }
            }
            ForBindingType::Declaration { kind, id }
        } else {
            let target = self.build_ast_from_left_hand_side_expression(first)?;
            if !target.is_assignment_target() {
                return Err(get_custom_error("Invalid left-hand side in for loop", binding_span));
            }
            ForBindingType::Target(target)
        };
        let is_of = expect_next(&mut inner, span)?.as_str() == "of";
        let right = self.build_ast_from_expression(expect_next(&mut inner, span)?)?;
        let body = Box::new(self.build_ast_from_statement(expect_next(&mut inner, span)?)?);
        let data = ForIteratorData {
            meta,
            left,
            right,
            body,
        };
        Ok(if is_of {
            StatementType::ForOfStatement(data)
        } else {
            StatementType::ForInStatement(data)
        })
    }

    fn build_ast_from_try_statement(&mut self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let mut inner = significant_pairs(pair);
        let block = self.build_ast_from_block(expect_next(&mut inner, span)?)?;
        let mut handler = None;
        let mut finalizer = None;
        for clause in inner {
            match clause.as_rule() {
                Rule::catch_clause => {
                    let clause_meta = get_meta(&clause);
                    let mut param = None;
                    let mut body = None;
                    for p in significant_pairs(clause) {
                        match p.as_rule() {
                            Rule::identifier => param = Some(self.build_identifier(p)),
                            Rule::block_statement => body = Some(self.build_ast_from_block(p)?),
                            _ => return Err(get_unexpected_error(2, &p)),
                        }
                    }
                    let body = body.ok_or_else(|| get_custom_error("Missing catch block", span))?;
                    handler = Some(CatchClauseData {
                        meta: clause_meta,
                        param,
                        body,
                    });
                }
                Rule::finally_clause => {
                    let clause_span = clause.as_span();
                    let block_pair = expect_next(&mut significant_pairs(clause), clause_span)?;
                    finalizer = Some(self.build_ast_from_block(block_pair)?);
                }
                _ => return Err(get_unexpected_error(3, &clause)),
            }
        }
        if handler.is_none() && finalizer.is_none() {
            return Err(get_custom_error("Missing catch or finally after try", span));
        }
        Ok(StatementType::TryStatement {
            meta,
            block,
            handler,
            finalizer,
        })
    }

    fn build_ast_from_switch_statement(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let mut inner = significant_pairs(pair);
        let discriminant = self.build_ast_from_expression(expect_next(&mut inner, span)?)?;
        let mut cases = vec![];
        for case_pair in inner {
            let case_meta = get_meta(&case_pair);
            let case_span = case_pair.as_span();
            let mut parts = case_pair.into_inner();
            let test = match significant_pairs(expect_next(&mut parts, case_span)?).next() {
                Some(p) => Some(self.build_ast_from_expression(p)?),
                None => None,
            };
            let mut consequent = vec![];
            for statement_pair in parts {
                consequent.push(self.build_ast_from_statement(statement_pair)?);
            }
            cases.push(SwitchCaseData {
                meta: case_meta,
                test,
                consequent,
            });
        }
        Ok(StatementType::SwitchStatement {
            meta,
            discriminant,
            cases,
        })
    }

    // ===== Functions =====

    /// Builds a function declaration or expression.
    fn build_ast_from_function(&mut self, pair: Pair<Rule>) -> Result<FunctionData, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let source: Rc<str> = Rc::from(pair.as_str());
        let mut inner = significant_pairs(pair);
        let mut next = expect_next(&mut inner, span)?;
        let id = if next.as_rule() == Rule::identifier {
            let id = self.build_identifier_without_tracking(next);
            next = expect_next(&mut inner, span)?;
            Some(id)
        } else {
            None
        };
        let body_pair = expect_next(&mut inner, span)?;
        self.build_function_from_parts(meta, source, id, Some(next), body_pair, false)
    }

    fn build_ast_from_arrow_function(&mut self, pair: Pair<Rule>) -> Result<FunctionData, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let source: Rc<str> = Rc::from(pair.as_str());
        let mut inner = pair.into_inner();
        let params_pair = expect_next(&mut expect_next(&mut inner, span)?.into_inner(), span)?;
        let body_pair = expect_next(&mut expect_next(&mut inner, span)?.into_inner(), span)?;
        self.build_function_from_parts(meta, source, None, Some(params_pair), body_pair, true)
    }

    fn build_function_from_parts(
        &mut self,
        meta: Meta,
        source: Rc<str>,
        id: Option<IdentifierData>,
        params_pair: Option<Pair<Rule>>,
        body_pair: Pair<Rule>,
        is_arrow: bool,
    ) -> Result<FunctionData, Error<Rule>> {
        self.hoisting.push(HoistedDeclarations::default());
        self.arguments_seen.push(false);
        let parts = self.build_function_params_and_body(params_pair, body_pair);
        let hoisted = self.hoisting.pop().unwrap_or_default();
        let uses_arguments = self.arguments_seen.pop().unwrap_or(false);
        if is_arrow && uses_arguments {
            if let Some(parent) = self.arguments_seen.last_mut() {
                *parent = true;
            }
        }
        let (params, body) = parts?;
        Ok(FunctionData {
            meta,
            id,
            params,
            body,
            hoisted,
            is_arrow,
            uses_arguments: uses_arguments && !is_arrow,
            source,
        })
    }

    fn build_function_params_and_body(
        &mut self,
        params_pair: Option<Pair<Rule>>,
        body_pair: Pair<Rule>,
    ) -> Result<(Vec<ParameterData>, FunctionBodyType), Error<Rule>> {
        let mut params = vec![];
        if let Some(params_pair) = params_pair {
            if params_pair.as_rule() == Rule::identifier {
                params.push(ParameterData {
                    name: params_pair.as_str().to_string(),
                    default: None,
                    rest: false,
                });
            } else {
                for param_pair in params_pair.into_inner() {
                    let param_span = param_pair.as_span();
                    let mut parts = param_pair.into_inner().peekable();
                    let rest = parts
                        .peek()
                        .map_or(false, |p| p.as_rule() == Rule::rest_marker);
                    if rest {
                        parts.next();
                    }
                    let name = expect_next(&mut parts, param_span)?.as_str().to_string();
                    let default = match parts.next() {
                        Some(p) => Some(self.build_ast_from_assignment_expression(p)?),
                        None => None,
                    };
                    params.push(ParameterData {
                        name,
                        default,
                        rest,
                    });
                }
            }
        }
        let body = match body_pair.as_rule() {
            Rule::function_body => {
                let mut statements = vec![];
                for statement_pair in body_pair.into_inner() {
                    statements.push(self.build_ast_from_statement(statement_pair)?);
                }
                FunctionBodyType::Block(statements)
            }
            _ => FunctionBodyType::Expression(Box::new(
                self.build_ast_from_assignment_expression(body_pair)?,
            )),
        };
        Ok((params, body))
    }

    // ===== Expressions =====

    fn build_ast_from_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut expressions = vec![];
        for inner_pair in pair.into_inner() {
            expressions.push(self.build_ast_from_assignment_expression(inner_pair)?);
        }
        if expressions.len() == 1 {
            if let Some(e) = expressions.pop() {
                return Ok(e);
            }
        }
        Ok(ExpressionType::SequenceExpression { meta, expressions })
    }

    fn build_ast_from_assignment_expression(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let first = expect_next(&mut inner, span)?;
        if first.as_rule() == Rule::arrow_function {
            return Ok(ExpressionType::FunctionOrArrowExpression(Rc::new(
                self.build_ast_from_arrow_function(first)?,
            )));
        }
        let left = self.build_ast_from_operand(first)?;
        match inner.next() {
            None => Ok(left),
            Some(op_pair) => {
                let operator = AssignmentOperator::from_token(op_pair.as_str())
                    .ok_or_else(|| get_unexpected_error(4, &op_pair))?;
                if !left.is_assignment_target() {
                    return Err(get_custom_error("Invalid left-hand side in assignment", span));
                }
                let right = self.build_ast_from_assignment_expression(expect_next(&mut inner, span)?)?;
                Ok(ExpressionType::AssignmentExpression {
                    meta,
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
        }
    }

    /// Builds any rule between `conditional_expression` and
    /// `left_hand_side_expression` in the precedence ladder.
    fn build_ast_from_operand(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        match pair.as_rule() {
            Rule::conditional_expression => self.build_ast_from_conditional_expression(pair),
            Rule::logical_or
            | Rule::logical_and
            | Rule::bitwise_or
            | Rule::bitwise_xor
            | Rule::bitwise_and
            | Rule::equality
            | Rule::relational
            | Rule::shift
            | Rule::additive
            | Rule::multiplicative => self.build_ast_from_binary_level(pair),
            Rule::exponentiation => self.build_ast_from_exponentiation(pair),
            Rule::unary_expression => self.build_ast_from_unary_expression(pair),
            Rule::postfix_expression => self.build_ast_from_postfix_expression(pair),
            Rule::left_hand_side_expression => self.build_ast_from_left_hand_side_expression(pair),
            _ => Err(get_unexpected_error(5, &pair)),
        }
    }

    fn build_ast_from_conditional_expression(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let test = self.build_ast_from_operand(expect_next(&mut inner, span)?)?;
        match inner.next() {
            None => Ok(test),
            Some(consequent_pair) => {
                let consequent = self.build_ast_from_assignment_expression(consequent_pair)?;
                let alternate =
                    self.build_ast_from_assignment_expression(expect_next(&mut inner, span)?)?;
                Ok(ExpressionType::ConditionalExpression {
                    meta,
                    test: Box::new(test),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                })
            }
        }
    }

    fn build_ast_from_binary_level(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let mut left = self.build_ast_from_operand(expect_next(&mut inner, span)?)?;
        while let Some(op_pair) = inner.next() {
            let right = self.build_ast_from_operand(expect_next(&mut inner, span)?)?;
            let meta = Meta::new(left.get_meta().start_index, right.get_meta().end_index);
            let token = op_pair.as_str();
            left = match token {
                "||" | "&&" | "??" => ExpressionType::LogicalExpression {
                    meta,
                    operator: match token {
                        "||" => LogicalOperator::Or,
                        "&&" => LogicalOperator::And,
                        _ => LogicalOperator::NullishCoalescing,
                    },
                    left: Box::new(left),
                    right: Box::new(right),
                },
                _ => ExpressionType::BinaryExpression {
                    meta,
                    operator: BinaryOperator::from_token(token)
                        .ok_or_else(|| get_unexpected_error(6, &op_pair))?,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn build_ast_from_exponentiation(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let base = self.build_ast_from_operand(expect_next(&mut inner, span)?)?;
        match inner.next() {
            None => Ok(base),
            Some(_) => {
                let exponent = self.build_ast_from_operand(expect_next(&mut inner, span)?)?;
                Ok(ExpressionType::BinaryExpression {
                    meta,
                    operator: BinaryOperator::Exponent,
                    left: Box::new(base),
                    right: Box::new(exponent),
                })
            }
        }
    }

    fn build_ast_from_unary_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let mut operators = vec![];
        let mut operand = None;
        for inner_pair in pair.into_inner() {
            if inner_pair.as_rule() == Rule::prefix_op {
                operators.push(inner_pair);
            } else {
                operand = Some(self.build_ast_from_postfix_expression(inner_pair)?);
            }
        }
        let mut expression = match operand {
            Some(e) => e,
            None => return Err(get_custom_error("Missing operand", span)),
        };
        for op_pair in operators.into_iter().rev() {
            let argument = Box::new(expression);
            expression = match op_pair.as_str() {
                "++" | "--" => {
                    if !argument.is_assignment_target() {
                        return Err(get_custom_error(
                            "Invalid left-hand side expression in prefix operation",
                            op_pair.as_span(),
                        ));
                    }
                    ExpressionType::UpdateExpression {
                        meta,
                        operator: if op_pair.as_str() == "++" {
                            UpdateOperator::PlusPlus
                        } else {
                            UpdateOperator::MinusMinus
                        },
                        argument,
                        prefix: true,
                    }
                }
                token => ExpressionType::UnaryExpression {
                    meta,
                    operator: match token {
                        "-" => UnaryOperator::Minus,
                        "+" => UnaryOperator::Plus,
                        "!" => UnaryOperator::LogicalNot,
                        "~" => UnaryOperator::BitwiseNot,
                        "typeof" => UnaryOperator::TypeOf,
                        "void" => UnaryOperator::Void,
                        "delete" => UnaryOperator::Delete,
                        _ => return Err(get_unexpected_error(7, &op_pair)),
                    },
                    argument,
                },
            };
        }
        Ok(expression)
    }

    fn build_ast_from_postfix_expression(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let argument = self.build_ast_from_left_hand_side_expression(expect_next(&mut inner, span)?)?;
        match inner.next() {
            None => Ok(argument),
            Some(op_pair) => {
                if !argument.is_assignment_target() {
                    return Err(get_custom_error(
                        "Invalid left-hand side expression in postfix operation",
                        span,
                    ));
                }
                Ok(ExpressionType::UpdateExpression {
                    meta,
                    operator: if op_pair.as_str() == "++" {
                        UpdateOperator::PlusPlus
                    } else {
                        UpdateOperator::MinusMinus
                    },
                    argument: Box::new(argument),
                    prefix: false,
                })
            }
        }
    }

    fn build_ast_from_left_hand_side_expression(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let start = pair.as_span().start();
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let mut expression = self.build_ast_from_primary_expression(expect_next(&mut inner, span)?)?;
        for suffix in inner {
            expression = self.apply_suffix(expression, suffix, start)?;
        }
        Ok(expression)
    }

    fn apply_suffix(
        &mut self,
        object: ExpressionType,
        suffix: Pair<Rule>,
        start: usize,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = Meta::new(start, suffix.as_span().end());
        let span = suffix.as_span();
        Ok(match suffix.as_rule() {
            Rule::call_arguments => ExpressionType::CallExpression {
                meta,
                callee: Box::new(object),
                arguments: self.build_arguments(suffix)?,
            },
            Rule::dot_member => ExpressionType::MemberExpression(
                MemberExpressionType::SimpleMemberExpression {
                    meta,
                    object: Box::new(object),
                    property: expect_next(&mut suffix.into_inner(), span)?.as_str().to_string(),
                },
            ),
            Rule::index_member => ExpressionType::MemberExpression(
                MemberExpressionType::ComputedMemberExpression {
                    meta,
                    object: Box::new(object),
                    property: Box::new(
                        self.build_ast_from_expression(expect_next(&mut suffix.into_inner(), span)?)?,
                    ),
                },
            ),
            _ => return Err(get_unexpected_error(8, &suffix)),
        })
    }

    fn build_arguments(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<Vec<ExpressionOrSpreadElement>, Error<Rule>> {
        let mut arguments = vec![];
        for argument_pair in pair.into_inner() {
            arguments.push(self.build_spreadable(argument_pair)?);
        }
        Ok(arguments)
    }

    /// Builds an `argument` or non-empty `array_slot`.
    fn build_spreadable(&mut self, pair: Pair<Rule>) -> Result<ExpressionOrSpreadElement, Error<Rule>> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let first = expect_next(&mut inner, span)?;
        if first.as_rule() == Rule::spread_marker {
            let e = self.build_ast_from_assignment_expression(expect_next(&mut inner, span)?)?;
            Ok(ExpressionOrSpreadElement::SpreadElement(e))
        } else {
            Ok(ExpressionOrSpreadElement::Expression(
                self.build_ast_from_assignment_expression(first)?,
            ))
        }
    }

    fn build_ast_from_new_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        let mut inner = significant_pairs(pair);
        let target_pair = expect_next(&mut inner, span)?;
        let target_start = target_pair.as_span().start();
        let target_span = target_pair.as_span();
        let mut target_inner = target_pair.into_inner();
        let mut callee =
            self.build_ast_from_primary_expression(expect_next(&mut target_inner, target_span)?)?;
        for suffix in target_inner {
            callee = self.apply_suffix(callee, suffix, target_start)?;
        }
        let arguments = match inner.next() {
            Some(p) => self.build_arguments(p)?,
            None => vec![],
        };
        Ok(ExpressionType::NewExpression {
            meta,
            callee: Box::new(callee),
            arguments,
        })
    }

    fn build_ast_from_primary_expression(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let span = pair.as_span();
        Ok(match pair.as_rule() {
            Rule::new_expression => self.build_ast_from_new_expression(pair)?,
            Rule::function_expression => {
                ExpressionType::FunctionOrArrowExpression(Rc::new(self.build_ast_from_function(pair)?))
            }
            Rule::this_expression => ExpressionType::ThisExpression { meta },
            Rule::null_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::NullLiteral,
            }),
            Rule::boolean_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::BooleanLiteral(pair.as_str() == "true"),
            }),
            Rule::numeric_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::NumberLiteral(build_number_literal(&pair)?),
            }),
            Rule::string_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::StringLiteral(build_string_literal(pair)?),
            }),
            Rule::identifier => ExpressionType::Identifier(self.build_identifier(pair)),
            Rule::array_literal => self.build_ast_from_array_literal(pair)?,
            Rule::object_literal => self.build_ast_from_object_literal(pair)?,
            Rule::template_literal => self.build_ast_from_template_literal(pair)?,
            Rule::regex_literal => {
                let mut inner = pair.into_inner();
                let pattern = expect_next(&mut inner, span)?.as_str().to_string();
                let flags = inner.next().map(|p| p.as_str().to_string()).unwrap_or_default();
                ExpressionType::Literal(LiteralData {
                    meta,
                    value: LiteralType::RegExpLiteral(RegExpLiteralData { pattern, flags }),
                })
            }
            Rule::paren_expression => {
                self.build_ast_from_expression(expect_next(&mut pair.into_inner(), span)?)?
            }
            _ => return Err(get_unexpected_error(9, &pair)),
        })
    }

    fn build_ast_from_array_literal(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut elements = vec![];
        for slot in pair.into_inner() {
            if slot.clone().into_inner().next().is_none() {
                elements.push(None);
            } else {
                elements.push(Some(self.build_spreadable(slot)?));
            }
        }
        if let Some(None) = elements.last() {
            elements.pop();
        }
        Ok(ExpressionType::ArrayExpression { meta, elements })
    }

    fn build_ast_from_object_literal(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut properties = vec![];
        for property_pair in pair.into_inner() {
            let property_span = property_pair.as_span();
            properties.push(match property_pair.as_rule() {
                Rule::property_assignment => {
                    let mut inner = property_pair.into_inner();
                    let key = self.build_property_key(expect_next(&mut inner, property_span)?)?;
                    let value =
                        self.build_ast_from_assignment_expression(expect_next(&mut inner, property_span)?)?;
                    PropertyData::Init { key, value }
                }
                Rule::method_property => {
                    let method_meta = get_meta(&property_pair);
                    let source: Rc<str> = Rc::from(property_pair.as_str());
                    let mut inner = property_pair.into_inner();
                    let key = self.build_property_key(expect_next(&mut inner, property_span)?)?;
                    let params_pair = expect_next(&mut inner, property_span)?;
                    let body_pair = expect_next(&mut inner, property_span)?;
                    let id = match &key {
                        PropertyKeyType::Static(name) => Some(IdentifierData {
                            meta: method_meta,
                            name: name.clone(),
                        }),
                        PropertyKeyType::Computed(_) => None,
                    };
                    let f = self.build_function_from_parts(
                        method_meta,
                        source,
                        id,
                        Some(params_pair),
                        body_pair,
                        false,
                    )?;
                    PropertyData::Init {
                        key,
                        value: ExpressionType::FunctionOrArrowExpression(Rc::new(f)),
                    }
                }
                Rule::spread_property => {
                    let e = self.build_ast_from_assignment_expression(expect_next(
                        &mut property_pair.into_inner(),
                        property_span,
                    )?)?;
                    PropertyData::Spread(e)
                }
                Rule::shorthand_property => {
                    let id = self.build_identifier(expect_next(&mut property_pair.into_inner(), property_span)?);
                    PropertyData::Init {
                        key: PropertyKeyType::Static(id.name.clone()),
                        value: ExpressionType::Identifier(id),
                    }
                }
                _ => return Err(get_unexpected_error(10, &property_pair)),
            });
        }
        Ok(ExpressionType::ObjectExpression { meta, properties })
    }

    fn build_property_key(&mut self, pair: Pair<Rule>) -> Result<PropertyKeyType, Error<Rule>> {
        let span = pair.as_span();
        let key_pair = expect_next(&mut pair.into_inner(), span)?;
        Ok(match key_pair.as_rule() {
            Rule::computed_property_name => {
                let key_span = key_pair.as_span();
                PropertyKeyType::Computed(Box::new(self.build_ast_from_assignment_expression(
                    expect_next(&mut key_pair.into_inner(), key_span)?,
                )?))
            }
            Rule::identifier_name => PropertyKeyType::Static(key_pair.as_str().to_string()),
            Rule::string_literal => PropertyKeyType::Static(build_string_literal(key_pair)?),
            Rule::numeric_literal => PropertyKeyType::Static(numeric_property_key(key_pair.as_str())),
            _ => return Err(get_unexpected_error(11, &key_pair)),
        })
    }

    fn build_ast_from_template_literal(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut parts = vec![];
        for part in pair.into_inner() {
            let part_span = part.as_span();
            parts.push(match part.as_rule() {
                Rule::template_chars => TemplatePartType::Text(unescape_string(part.as_str())),
                Rule::template_substitution => TemplatePartType::Substitution(
                    self.build_ast_from_expression(expect_next(&mut part.into_inner(), part_span)?)?,
                ),
                _ => return Err(get_unexpected_error(12, &part)),
            });
        }
        Ok(ExpressionType::TemplateLiteral { meta, parts })
    }

    fn build_identifier(&mut self, pair: Pair<Rule>) -> IdentifierData {
        if pair.as_str() == "arguments" {
            if let Some(seen) = self.arguments_seen.last_mut() {
                *seen = true;
            }
        }
        self.build_identifier_without_tracking(pair)
    }

    fn build_identifier_without_tracking(&self, pair: Pair<Rule>) -> IdentifierData {
        IdentifierData {
            meta: get_meta(&pair),
            name: pair.as_str().to_string(),
        }
    }
}

fn get_variable_kind(pair: &Pair<Rule>) -> Result<VariableDeclarationKind, Error<Rule>> {
    Ok(match pair.as_str() {
        "var" => VariableDeclarationKind::Var,
        "let" => VariableDeclarationKind::Let,
        "const" => VariableDeclarationKind::Const,
        _ => return Err(get_unexpected_error(13, pair)),
    })
}

fn build_number_literal(pair: &Pair<Rule>) -> Result<NumberLiteralType, Error<Rule>> {
    match parse_numeric_token(pair.as_str()) {
        Some(NumericToken::Integer(i)) => Ok(NumberLiteralType::IntegerLiteral(i)),
        Some(NumericToken::Float(f)) => Ok(NumberLiteralType::FloatLiteral(f)),
        None => Err(get_custom_error("Invalid numeric literal", pair.as_span())),
    }
}

fn build_string_literal(pair: Pair<Rule>) -> Result<String, Error<Rule>> {
    let span = pair.as_span();
    let body = expect_next(&mut pair.into_inner(), span)?;
    Ok(unescape_string(body.as_str()))
}

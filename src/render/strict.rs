use std::collections::HashSet;

use tera::ast::{Expr, ExprVal, FunctionCall, Node};
use tera::{Context, Value};

/// Find the first value a template references that the context does not hold.
///
/// Tera already fails on undefined names in output and loop expressions, but
/// treats them as false inside `{% if %}` conditions. This walks the parsed
/// template so conditions are held to the same rule. Names bound by `for`,
/// `set` and `set_global` are local, and names guarded by `is defined` are
/// trusted inside the guarded branch. A value piped through `default` is
/// allowed to be missing.
pub fn find_undefined(ast: &[Node], context: &Context) -> Option<String> {
    let mut checker = Checker {
        context,
        scopes: vec![HashSet::new()],
    };
    checker.nodes(ast).err()
}

struct Checker<'a> {
    context: &'a Context,
    /// Local names and guarded paths, innermost last.
    scopes: Vec<HashSet<String>>,
}

type Missing = std::result::Result<(), String>;

impl Checker<'_> {
    fn nodes(&mut self, nodes: &[Node]) -> Missing {
        for node in nodes {
            self.node(node)?;
        }
        Ok(())
    }

    fn node(&mut self, node: &Node) -> Missing {
        match node {
            Node::VariableBlock(_, expr) => self.expr(expr),
            Node::Set(_, set) => {
                self.expr(&set.value)?;
                let scope = if set.global {
                    self.scopes.first_mut()
                } else {
                    self.scopes.last_mut()
                };
                if let Some(scope) = scope {
                    scope.insert(set.key.clone());
                }
                Ok(())
            }
            Node::Forloop(_, forloop, _) => {
                self.expr(&forloop.container)?;
                let mut locals: HashSet<String> =
                    [forloop.value.clone(), "loop".to_string()].into_iter().collect();
                if let Some(key) = &forloop.key {
                    locals.insert(key.clone());
                }
                self.scoped(locals, |c| c.nodes(&forloop.body))?;
                if let Some(empty_body) = &forloop.empty_body {
                    self.nodes(empty_body)?;
                }
                Ok(())
            }
            Node::If(branches, _) => {
                let mut ruled_out = HashSet::new();
                for (_, condition, body) in &branches.conditions {
                    let (defined, undefined) = defined_guards(condition);
                    let mut guards = defined;
                    guards.extend(ruled_out.iter().cloned());
                    self.scoped(guards, |c| {
                        c.expr(condition)?;
                        c.nodes(body)
                    })?;
                    ruled_out.extend(undefined);
                }
                if let Some((_, body)) = &branches.otherwise {
                    self.scoped(ruled_out, |c| c.nodes(body))?;
                }
                Ok(())
            }
            Node::FilterSection(_, section, _) => {
                self.call(&section.filter)?;
                self.nodes(&section.body)
            }
            Node::Block(_, block, _) => self.nodes(&block.body),
            _ => Ok(()),
        }
    }

    fn scoped<F>(&mut self, locals: HashSet<String>, f: F) -> Missing
    where
        F: FnOnce(&mut Self) -> Missing,
    {
        self.scopes.push(locals);
        let result = f(self);
        self.scopes.pop();
        result
    }

    fn expr(&mut self, expr: &Expr) -> Missing {
        for filter in &expr.filters {
            self.call(filter)?;
        }
        let has_default = expr.filters.iter().any(|f| f.name == "default");
        match &expr.val {
            ExprVal::Ident(_) if has_default => Ok(()),
            val => self.val(val),
        }
    }

    fn val(&mut self, val: &ExprVal) -> Missing {
        match val {
            ExprVal::Ident(ident) => self.ident(ident),
            ExprVal::Math(math) => {
                self.expr(&math.lhs)?;
                self.expr(&math.rhs)
            }
            ExprVal::Logic(logic) => {
                self.expr(&logic.lhs)?;
                self.expr(&logic.rhs)
            }
            ExprVal::Test(test) => {
                if test.name != "defined" && test.name != "undefined" {
                    self.ident(&test.ident)?;
                }
                test.args.iter().try_for_each(|arg| self.expr(arg))
            }
            ExprVal::FunctionCall(call) => self.call(call),
            ExprVal::MacroCall(call) => call.args.values().try_for_each(|arg| self.expr(arg)),
            ExprVal::Array(items) => items.iter().try_for_each(|item| self.expr(item)),
            ExprVal::StringConcat(concat) => {
                concat.values.iter().try_for_each(|value| self.val(value))
            }
            ExprVal::In(in_expr) => {
                self.expr(&in_expr.lhs)?;
                self.expr(&in_expr.rhs)
            }
            _ => Ok(()),
        }
    }

    fn call(&mut self, call: &FunctionCall) -> Missing {
        call.args.values().try_for_each(|arg| self.expr(arg))
    }

    fn ident(&self, ident: &str) -> Missing {
        // Dynamic subscripts are resolved by Tera at render time.
        let path = ident.split('[').next().unwrap_or(ident);
        if path.is_empty() || path.starts_with("__tera") || self.is_local(path) {
            return Ok(());
        }
        if resolve(self.context, path) {
            Ok(())
        } else {
            Err(path.to_string())
        }
    }

    fn is_local(&self, path: &str) -> bool {
        let root = path.split('.').next().unwrap_or(path);
        self.scopes.iter().any(|scope| {
            scope.contains(root)
                || scope.iter().any(|guard| {
                    path == guard
                        || path
                            .strip_prefix(guard.as_str())
                            .is_some_and(|rest| rest.starts_with('.'))
                })
        })
    }
}

fn resolve(context: &Context, path: &str) -> bool {
    let mut segments = path.split('.');
    let Some(mut current) = segments.next().and_then(|root| context.get(root)) else {
        return false;
    };
    for segment in segments {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return false,
        }
    }
    true
}

/// Paths a condition proves defined when true, and when false.
fn defined_guards(condition: &Expr) -> (HashSet<String>, HashSet<String>) {
    let mut when_true = HashSet::new();
    let mut when_false = HashSet::new();
    collect_guards(condition, condition.negated, &mut when_true, &mut when_false);
    (when_true, when_false)
}

fn collect_guards(
    expr: &Expr,
    negated: bool,
    when_true: &mut HashSet<String>,
    when_false: &mut HashSet<String>,
) {
    match &expr.val {
        ExprVal::Test(test) if test.name == "defined" || test.name == "undefined" => {
            let proves_defined = (test.name == "defined") != (test.negated != negated);
            if proves_defined {
                when_true.insert(test.ident.clone());
            } else {
                when_false.insert(test.ident.clone());
            }
        }
        ExprVal::Logic(logic) => {
            collect_guards(&logic.lhs, negated != logic.lhs.negated, when_true, when_false);
            collect_guards(&logic.rhs, negated != logic.rhs.negated, when_true, when_false);
        }
        _ => {}
    }
}

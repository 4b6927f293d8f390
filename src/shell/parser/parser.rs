use thiserror::Error;

use super::ast::{Command, Pipeline, Redirect, RedirectOp, Statement, StatementOp};
use super::lexer::tokenize;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing target after '{0}' redirection")]
    MissingRedirectTarget(RedirectOp),
    #[error("empty pipeline")]
    EmptyPipeline,
}

/// Parses one input line into the three-level command structure.
///
/// An empty or whitespace-only line yields a `Command` with zero
/// statements; that is a legal boundary case, not an error.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let mut command = Command {
        raw: line.to_string(),
        statements: Vec::new(),
    };

    for (segment, operator) in split_statements(line) {
        let mut pipelines = Vec::new();
        for stage in split_pipes(&segment) {
            pipelines.push(parse_pipeline(&stage)?);
        }
        if pipelines.is_empty() {
            continue;
        }
        command.statements.push(Statement {
            pipelines,
            operator,
        });
    }

    // The operator is the one *following* a statement, so the last
    // statement never carries one, even for input like "echo a;".
    if let Some(last) = command.statements.last_mut() {
        last.operator = StatementOp::None;
    }

    Ok(command)
}

/// Splits a line on top-level `;` and `&&`, outside of quotes, pairing
/// each segment with the operator that followed it. A lone `&` is not an
/// operator. Empty segments are dropped.
pub fn split_statements(line: &str) -> Vec<(String, StatementOp)> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            current.push(c);
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            ';' => segments.push((std::mem::take(&mut current), StatementOp::Seq)),
            '&' if chars.peek() == Some(&'&') => {
                chars.next();
                segments.push((std::mem::take(&mut current), StatementOp::And));
            }
            _ => current.push(c),
        }
    }
    segments.push((current, StatementOp::None));

    segments
        .into_iter()
        .filter_map(|(segment, operator)| {
            let segment = segment.trim();
            (!segment.is_empty()).then(|| (segment.to_string(), operator))
        })
        .collect()
}

/// Splits one statement on top-level `|`, outside of quotes. Empty
/// stages are dropped.
pub fn split_pipes(statement: &str) -> Vec<String> {
    let mut stages = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in statement.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            current.push(c);
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            '|' => stages.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    stages.push(current);

    stages
        .into_iter()
        .filter_map(|stage| {
            let stage = stage.trim();
            (!stage.is_empty()).then(|| stage.to_string())
        })
        .collect()
}

/// Parses one pipeline stage: the first token is the command, redirect
/// operators consume the following token as their target, everything
/// else is an argument.
pub fn parse_pipeline(stage: &str) -> Result<Pipeline, ParseError> {
    let mut tokens = tokenize(stage).into_iter();
    let command = tokens.next().ok_or(ParseError::EmptyPipeline)?;
    let mut pipeline = Pipeline {
        command,
        ..Pipeline::default()
    };

    while let Some(token) = tokens.next() {
        let op = match token.as_str() {
            "<" => Some(RedirectOp::Input),
            ">" => Some(RedirectOp::Output),
            ">>" => Some(RedirectOp::Append),
            _ => None,
        };
        match op {
            Some(op) => {
                let target = tokens
                    .next()
                    .ok_or(ParseError::MissingRedirectTarget(op))?;
                let redirect = Redirect { op, target };
                if op == RedirectOp::Input {
                    pipeline.stdin = Some(redirect);
                } else {
                    pipeline.stdout = Some(redirect);
                }
            }
            None => pipeline.args.push(token),
        }
    }

    Ok(pipeline)
}

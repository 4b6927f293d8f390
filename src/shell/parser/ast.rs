use std::fmt;

/// Parse result of one input line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Command {
    pub raw: String,
    pub statements: Vec<Statement>,
}

/// One `;`/`&&`-delimited unit. Always holds at least one pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub pipelines: Vec<Pipeline>,
    /// Operator that follows this statement. The last statement of a
    /// command always carries `StatementOp::None`.
    pub operator: StatementOp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatementOp {
    #[default]
    None,
    /// `;`
    Seq,
    /// `&&`
    And,
}

/// One `|`-delimited stage of a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    pub command: String,
    pub args: Vec<String>,
    pub stdin: Option<Redirect>,
    pub stdout: Option<Redirect>,
    /// Representable but never produced by the current grammar; reserved
    /// for a future `2>` extension.
    pub stderr: Option<Redirect>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub op: RedirectOp,
    /// Taken verbatim from the token following the operator.
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOp {
    /// `<`
    Input,
    /// `>`
    Output,
    /// `>>`
    Append,
}

impl fmt::Display for RedirectOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            RedirectOp::Input => "<",
            RedirectOp::Output => ">",
            RedirectOp::Append => ">>",
        };
        f.write_str(op)
    }
}

impl fmt::Display for StatementOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            StatementOp::None => "",
            StatementOp::Seq => ";",
            StatementOp::And => "&&",
        };
        f.write_str(op)
    }
}

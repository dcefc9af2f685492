use std::fmt::{self, Display};

use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program<'de> {
    pub statements: Vec<Statement<'de>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'de> {
    Let {
        token: Token<'de>,
        name: Identifier<'de>,
        value: Expression<'de>,
    },
    Return {
        token: Token<'de>,
        value: Expression<'de>,
    },
    Expression {
        token: Token<'de>,
        expression: Expression<'de>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement<'de> {
    /// The opening `{`.
    pub token: Token<'de>,
    pub statements: Vec<Statement<'de>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier<'de> {
    pub token: Token<'de>,
    pub value: &'de str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression<'de> {
    Identifier(Identifier<'de>),
    Integer {
        token: Token<'de>,
        value: i64,
    },
    Boolean {
        token: Token<'de>,
        value: bool,
    },
    Prefix {
        token: Token<'de>,
        operator: &'de str,
        right: Box<Expression<'de>>,
    },
    Infix {
        token: Token<'de>,
        left: Box<Expression<'de>>,
        operator: &'de str,
        right: Box<Expression<'de>>,
    },
    If {
        token: Token<'de>,
        condition: Box<Expression<'de>>,
        consequence: BlockStatement<'de>,
        alternative: Option<BlockStatement<'de>>,
    },
    Function {
        token: Token<'de>,
        parameters: Vec<Identifier<'de>>,
        body: BlockStatement<'de>,
    },
    Call {
        /// The `(` that opened the argument list.
        token: Token<'de>,
        function: Box<Expression<'de>>,
        arguments: Vec<Expression<'de>>,
    },
}

impl<'de> Statement<'de> {
    pub fn token(&self) -> &Token<'de> {
        match self {
            Statement::Let { token, .. }
            | Statement::Return { token, .. }
            | Statement::Expression { token, .. } => token,
        }
    }
}

impl<'de> Expression<'de> {
    pub fn token(&self) -> &Token<'de> {
        match self {
            Expression::Identifier(ident) => &ident.token,
            Expression::Integer { token, .. }
            | Expression::Boolean { token, .. }
            | Expression::Prefix { token, .. }
            | Expression::Infix { token, .. }
            | Expression::If { token, .. }
            | Expression::Function { token, .. }
            | Expression::Call { token, .. } => token,
        }
    }
}

struct Separated<'a, T>(&'a [T]);

impl<T: Display> Display for Separated<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl Display for Program<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl Display for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { token, name, value } => {
                write!(f, "{} {name} = {value};", token.literal)
            }
            Statement::Return { token, value } => write!(f, "{} {value};", token.literal),
            Statement::Expression { expression, .. } => write!(f, "{expression}"),
        }
    }
}

impl Display for BlockStatement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl Display for Identifier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value)
    }
}

impl Display for Expression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{ident}"),
            Expression::Integer { token, .. } | Expression::Boolean { token, .. } => {
                f.write_str(token.literal)
            }
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({operator}{right})"),
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => write!(f, "({left} {operator} {right})"),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if{condition} {consequence}")?;
                if let Some(alternative) = alternative {
                    write!(f, "else {alternative}")?;
                }
                Ok(())
            }
            Expression::Function {
                token,
                parameters,
                body,
            } => write!(f, "{}({}) {body}", token.literal, Separated(parameters.as_slice())),
            Expression::Call {
                function,
                arguments,
                ..
            } => write!(f, "{function}({})", Separated(arguments.as_slice())),
        }
    }
}

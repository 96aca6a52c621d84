use std::fmt::{Display, Formatter};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleInitializerError {
    #[error("Invalid main method format '{0}', expected full.name.Object.main")]
    InvalidMainMethodFormat(String),
}

/// An entry point invoked automatically when the linked output is loaded.
///
/// Initializers parsed from the command line always target a
/// `main(Array[String])` style method and carry no explicit arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleInitializer {
    owner: String,
    method: String,
    args: Vec<String>,
}

impl ModuleInitializer {
    pub fn main_method_with_args(
        owner: impl Into<String>,
        method: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        ModuleInitializer {
            owner: owner.into(),
            method: method.into(),
            args,
        }
    }

    /// Parses `full.name.Object.main`, splitting at the last `.`
    pub fn parse(token: &str) -> Result<Self, ModuleInitializerError> {
        let (owner, method) = token
            .rsplit_once('.')
            .ok_or_else(|| ModuleInitializerError::InvalidMainMethodFormat(token.to_owned()))?;

        Ok(ModuleInitializer::main_method_with_args(
            owner,
            method,
            Vec::new(),
        ))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Display for ModuleInitializer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.owner, self.method)
    }
}

use std::fmt::{Display, Formatter};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleKindError {
    #[error("Unknown module kind '{0}', expected one of: NoModule, ESModule, CommonJSModule")]
    UnknownModuleKind(String),
}

/// Packaging style of the emitted JavaScript.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ModuleKind {
    #[default]
    NoModule,
    ESModule,
    CommonJSModule,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 3] = [
        ModuleKind::NoModule,
        ModuleKind::ESModule,
        ModuleKind::CommonJSModule,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModuleKind::NoModule => "NoModule",
            ModuleKind::ESModule => "ESModule",
            ModuleKind::CommonJSModule => "CommonJSModule",
        }
    }

    /// Case-sensitive lookup by display name.
    pub fn parse(token: &str) -> Result<Self, ModuleKindError> {
        ModuleKind::ALL
            .into_iter()
            .find(|kind| kind.name() == token)
            .ok_or_else(|| ModuleKindError::UnknownModuleKind(token.to_owned()))
    }
}

impl Display for ModuleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

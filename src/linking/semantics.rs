/// How a runtime check behaves in linked code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CheckedBehavior {
    Compliant,
    Fatal,
    Unchecked,
}

impl CheckedBehavior {
    fn optimized(self) -> Self {
        match self {
            CheckedBehavior::Fatal => CheckedBehavior::Unchecked,
            other => other,
        }
    }
}

/// Strictness choices for runtime checks in the linked program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Semantics {
    pub as_instance_ofs: CheckedBehavior,
    pub array_index_out_of_bounds: CheckedBehavior,
    pub module_init: CheckedBehavior,
    pub production_mode: bool,
}

impl Semantics {
    pub fn with_as_instance_ofs(self, behavior: CheckedBehavior) -> Self {
        Semantics {
            as_instance_ofs: behavior,
            ..self
        }
    }

    /// Production variant: fatal checks become unchecked, compliant ones stay.
    pub fn optimized(self) -> Self {
        Semantics {
            as_instance_ofs: self.as_instance_ofs.optimized(),
            array_index_out_of_bounds: self.array_index_out_of_bounds.optimized(),
            module_init: self.module_init.optimized(),
            production_mode: true,
        }
    }
}

impl Default for Semantics {
    fn default() -> Self {
        Semantics {
            as_instance_ofs: CheckedBehavior::Fatal,
            array_index_out_of_bounds: CheckedBehavior::Fatal,
            module_init: CheckedBehavior::Unchecked,
            production_mode: false,
        }
    }
}

/// Language features the emitted JavaScript may rely on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum EsFeatures {
    #[default]
    Es5_1,
    Es2015,
}

impl EsFeatures {
    pub fn use_ecmascript_2015(&self) -> bool {
        matches!(self, EsFeatures::Es2015)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimized_keeps_compliant_checks() {
        let semantics = Semantics::default()
            .with_as_instance_ofs(CheckedBehavior::Compliant)
            .optimized();

        assert_eq!(semantics.as_instance_ofs, CheckedBehavior::Compliant);
        assert_eq!(
            semantics.array_index_out_of_bounds,
            CheckedBehavior::Unchecked
        );
        assert!(semantics.production_mode);
    }
}

//! Pipeline stages: one ASLi directive with its arguments.

use std::fmt;

/// Directive prefix reserved by the ASLi script language.
pub const DIRECTIVE_PREFIX: char = ':';

/// Every directive the driver knows how to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    FilterReachableFrom,
    FilterUnlistedFunctions,
    FilterListedVariables,
    XformNamedType,
    XformDesugar,
    XformBittuples,
    XformLower,
    XformIntBitslices,
    XformGetset,
    XformValid,
    XformConstprop,
    XformMonomorphize,
    XformTuples,
    XformHoistLets,
    XformBitslices,
    XformCase,
    XformWrap,
    XformBounded,
    CheckMonomorphization,
    GenerateC,
    GenerateMlir,
    Show,
    Quit,
}

impl StageKind {
    pub const ALL: [StageKind; 23] = [
        StageKind::FilterReachableFrom,
        StageKind::FilterUnlistedFunctions,
        StageKind::FilterListedVariables,
        StageKind::XformNamedType,
        StageKind::XformDesugar,
        StageKind::XformBittuples,
        StageKind::XformLower,
        StageKind::XformIntBitslices,
        StageKind::XformGetset,
        StageKind::XformValid,
        StageKind::XformConstprop,
        StageKind::XformMonomorphize,
        StageKind::XformTuples,
        StageKind::XformHoistLets,
        StageKind::XformBitslices,
        StageKind::XformCase,
        StageKind::XformWrap,
        StageKind::XformBounded,
        StageKind::CheckMonomorphization,
        StageKind::GenerateC,
        StageKind::GenerateMlir,
        StageKind::Show,
        StageKind::Quit,
    ];

    /// Directive name as written in a script (without the prefix).
    pub fn name(self) -> &'static str {
        match self {
            StageKind::FilterReachableFrom => "filter_reachable_from",
            StageKind::FilterUnlistedFunctions => "filter_unlisted_functions",
            StageKind::FilterListedVariables => "filter_listed_variables",
            StageKind::XformNamedType => "xform_named_type",
            StageKind::XformDesugar => "xform_desugar",
            StageKind::XformBittuples => "xform_bittuples",
            StageKind::XformLower => "xform_lower",
            StageKind::XformIntBitslices => "xform_int_bitslices",
            StageKind::XformGetset => "xform_getset",
            StageKind::XformValid => "xform_valid",
            StageKind::XformConstprop => "xform_constprop",
            StageKind::XformMonomorphize => "xform_monomorphize",
            StageKind::XformTuples => "xform_tuples",
            StageKind::XformHoistLets => "xform_hoist_lets",
            StageKind::XformBitslices => "xform_bitslices",
            StageKind::XformCase => "xform_case",
            StageKind::XformWrap => "xform_wrap",
            StageKind::XformBounded => "xform_bounded",
            StageKind::CheckMonomorphization => "check_monomorphization",
            StageKind::GenerateC => "generate_c",
            StageKind::GenerateMlir => "generate_mlir",
            StageKind::Show => "show",
            StageKind::Quit => "quit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        StageKind::ALL.into_iter().find(|k| k.name() == name)
    }

    /// One-line description written above the directive in a script.
    pub fn summary(self) -> &'static str {
        match self {
            StageKind::FilterReachableFrom => {
                "Discard any code not reachable from the list of exported functions"
            }
            StageKind::FilterUnlistedFunctions => {
                "Delete the ASL definitions of functions on the import list"
            }
            StageKind::FilterListedVariables => {
                "Remove thread-local state variables, they are provided out-of-band"
            }
            StageKind::XformNamedType => "Eliminate 'typedef'",
            StageKind::XformDesugar => "Eliminate bit,int arithmetic operations like \"'000' + 3\"",
            StageKind::XformBittuples => {
                "Eliminate bit-tuples like \"[x,y] = z;\" and \"x[7:0, 15:8]\""
            }
            StageKind::XformLower => "Convert all bit-slice operations to use the +: syntax",
            StageKind::XformIntBitslices => {
                "Eliminate slices of integers by first converting the integer to a bitvector"
            }
            StageKind::XformGetset => "Convert use of getter/setter syntax to function calls",
            StageKind::XformValid => "Instrument assignments of UNKNOWN to track valid values",
            StageKind::XformConstprop => "Perform constant propagation without unrolling loops",
            StageKind::XformMonomorphize => {
                "Create specialized versions of every bitwidth-polymorphic function"
            }
            StageKind::XformTuples => {
                "Change functions returning multiple results to return a record"
            }
            StageKind::XformHoistLets => "Lift let-expressions as high as possible out of an expression",
            StageKind::XformBitslices => {
                "Convert bitslice operations to a combination of AND/OR and shift operations"
            }
            StageKind::XformCase => "Convert case statements C cannot express to if statements",
            StageKind::XformWrap => "Wrap global variables into accessor functions",
            StageKind::XformBounded => {
                "Represent constrained integers by an integer of exactly the right size"
            }
            StageKind::CheckMonomorphization => {
                "Check that all definitions are bitwidth-monomorphic"
            }
            StageKind::GenerateC => "Generate C code from the remaining definitions",
            StageKind::GenerateMlir => "Generate MLIR from the remaining definitions",
            StageKind::Show => "Dump the current definitions",
            StageKind::Quit => "Done",
        }
    }

    /// Whether this stage rewrites definitions (as opposed to filtering,
    /// checking, dumping or generating code).
    pub fn is_lowering(self) -> bool {
        self.name().starts_with("xform_")
    }

    pub fn is_codegen(self) -> bool {
        matches!(self, StageKind::GenerateC | StageKind::GenerateMlir)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A directive plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stage {
    pub kind: StageKind,
    pub args: Vec<String>,
}

impl Stage {
    pub fn new(kind: StageKind) -> Self {
        Self {
            kind,
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(kind: StageKind, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Snapshot dumps interleaved for diagnostics write to a file; the
    /// final `--show-final-asl` dump does not.
    pub fn is_snapshot(&self) -> bool {
        self.kind == StageKind::Show && self.has_arg("--output")
    }
}

impl fmt::Display for Stage {
    /// Script line for this stage, e.g. `:xform_constprop --nounroll`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", DIRECTIVE_PREFIX, self.kind.name())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in StageKind::ALL {
            assert_eq!(StageKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(StageKind::from_name("xform_unknown"), None);
    }

    #[test]
    fn test_stage_display() {
        let stage = Stage::with_args(
            StageKind::FilterReachableFrom,
            ["--keep-builtins", "exports"],
        );
        assert_eq!(stage.to_string(), ":filter_reachable_from --keep-builtins exports");
        assert_eq!(Stage::new(StageKind::Quit).to_string(), ":quit");
    }

    #[test]
    fn test_stage_classification() {
        assert!(StageKind::XformMonomorphize.is_lowering());
        assert!(!StageKind::FilterReachableFrom.is_lowering());
        assert!(!StageKind::CheckMonomorphization.is_lowering());
        assert!(StageKind::GenerateMlir.is_codegen());
    }
}

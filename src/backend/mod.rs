// This module is the backend profile table. A backend identifier selects two independent
// things: the code generation directive (and its runtime flag) that ends the ASLi script,
// and the flags the native compiler and linker need to build what that directive emits.
// The two families are separate tables so callers can resolve native flags (for
// --print-c-flags) without a code generator, and so the interpreter backend, which has no
// code generator at all, still resolves to an (empty) native profile. Native flags depend
// on optional third-party installs located through environment variables; SystemC needs
// its install to link and reports MissingEnvironment instead of silently dropping flags.

//! Backend profile table.
//!
//! - [`Backend`] - registered backend identifiers
//! - [`codegen_profile`] - which ASLi directive generates code for a backend
//! - [`native_profile`] - backend-specific native compile and link flags
//! - [`install`] - flags contributed by the ASLi runtime itself

pub mod install;

pub use install::CompilerInstall;

use std::fmt;
use std::str::FromStr;

use crate::core::env::{HostEnv, AC_TYPES_DIR, SC_TYPES_DIR};
use crate::core::{DriverError, DriverResult};

/// Registered backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Backend {
    /// Algorithmic C types (C++).
    Ac,
    /// C23 `_BitInt` runtime.
    #[default]
    C23,
    /// Run directly in the ASLi interpreter, no code generation.
    Interpreter,
    /// Portable C runtime without compiler extensions.
    Fallback,
    /// MLIR output executed by `asl-opt`.
    Mlir,
    /// SystemC types (C++).
    Sc,
}

impl Backend {
    pub const ALL: [Backend; 6] = [
        Backend::Ac,
        Backend::C23,
        Backend::Interpreter,
        Backend::Fallback,
        Backend::Mlir,
        Backend::Sc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Ac => "ac",
            Backend::C23 => "c23",
            Backend::Interpreter => "interpreter",
            Backend::Fallback => "fallback",
            Backend::Mlir => "mlir",
            Backend::Sc => "sc",
        }
    }

    /// Backends whose runtime is a C++ library, forcing C++ generation.
    pub fn requires_cxx(self) -> bool {
        matches!(self, Backend::Ac | Backend::Sc)
    }

    /// Backends whose runtime handles bit slices natively, so the
    /// shift/mask lowering of slices is suppressed.
    pub fn native_bitslices(self) -> bool {
        matches!(self, Backend::Ac | Backend::Sc)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| DriverError::UnknownBackend {
                name: s.to_string(),
                table: "registered",
            })
    }
}

/// Kind of output a code generation directive produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodegenKind {
    /// C or C++ source files split into exceptions/vars/funs.
    C,
    /// A single MLIR file.
    Mlir,
}

/// How ASLi generates code for a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodegenProfile {
    pub backend: Backend,
    pub kind: CodegenKind,
    /// Flags selecting the runtime, placed right after the directive name.
    pub flags: &'static [&'static str],
}

impl CodegenProfile {
    /// ASLi directive name.
    pub fn directive(&self) -> &'static str {
        match self.kind {
            CodegenKind::C => "generate_c",
            CodegenKind::Mlir => "generate_mlir",
        }
    }
}

const CODEGEN_TABLE: &[CodegenProfile] = &[
    CodegenProfile { backend: Backend::Ac, kind: CodegenKind::C, flags: &["--runtime=ac"] },
    CodegenProfile { backend: Backend::C23, kind: CodegenKind::C, flags: &["--runtime=c23"] },
    CodegenProfile { backend: Backend::Fallback, kind: CodegenKind::C, flags: &["--runtime=fallback"] },
    CodegenProfile { backend: Backend::Sc, kind: CodegenKind::C, flags: &["--runtime=sc"] },
    CodegenProfile { backend: Backend::Mlir, kind: CodegenKind::Mlir, flags: &[] },
];

/// Look up the code generation profile of `backend`.
pub fn codegen_profile(backend: Backend) -> DriverResult<CodegenProfile> {
    CODEGEN_TABLE
        .iter()
        .find(|p| p.backend == backend)
        .copied()
        .ok_or_else(|| DriverError::UnknownBackend {
            name: backend.name().to_string(),
            table: "code generation",
        })
}

/// Backend-specific native compile/link flags.
///
/// These come on top of the flags of the ASLi runtime library (see
/// [`CompilerInstall`]) and the language standard flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeProfile {
    pub c_flags: Vec<String>,
    pub ld_flags: Vec<String>,
    /// Generated code is C++ and needs a C++-capable compiler.
    pub cxx: bool,
}

/// Resolve the native profile of `backend` against the environment.
pub fn native_profile(backend: Backend, env: &HostEnv) -> DriverResult<NativeProfile> {
    let include = |var: &str| env.get(var).map(|dir| format!("-I{dir}/include"));

    let profile = match backend {
        Backend::Ac => NativeProfile {
            c_flags: std::iter::once("-DASL_AC".to_string())
                .chain(include(AC_TYPES_DIR))
                .collect(),
            ld_flags: Vec::new(),
            cxx: true,
        },
        Backend::C23 => NativeProfile {
            c_flags: vec!["-DASL_C23".to_string()],
            ..NativeProfile::default()
        },
        Backend::Interpreter => NativeProfile::default(),
        Backend::Fallback => NativeProfile {
            c_flags: vec!["-DASL_FALLBACK".to_string()],
            ..NativeProfile::default()
        },
        Backend::Sc => {
            let sc_dir = env
                .get(SC_TYPES_DIR)
                .ok_or(DriverError::MissingEnvironment {
                    var: SC_TYPES_DIR,
                    backend: "SystemC",
                })?;
            NativeProfile {
                c_flags: vec!["-DASL_SC".to_string(), format!("-I{sc_dir}/include")],
                ld_flags: vec![format!("-L{sc_dir}/lib"), "-lsystemc".to_string()],
                cxx: true,
            }
        }
        Backend::Mlir => {
            return Err(DriverError::UnknownBackend {
                name: backend.name().to_string(),
                table: "native",
            })
        }
    };
    Ok(profile)
}

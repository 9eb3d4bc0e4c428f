//! Resolution error types and diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::platform::PlatformType;
use crate::util::diagnostic::Diagnostic;

/// A configuration that cannot produce a build.
///
/// These errors are deterministic: the same inputs always fail the same
/// way, so they are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ConfigError {
    #[error("unknown platform type `{value}`")]
    #[diagnostic(
        code(fatbin::config::unknown_platform_type),
        help("valid platform types are: ios, watchos, tvos, macos, visionos")
    )]
    UnknownPlatformType { value: String },

    #[error("unknown cpu `{value}`")]
    #[diagnostic(
        code(fatbin::config::unknown_cpu),
        help("use the `<platform>_<cpu>` form, e.g. `ios_x86_64` or `watchos_armv7k`")
    )]
    UnknownCpu { value: String },

    #[error("unsupported architecture `{cpu}` for platform type `{platform_type}`")]
    #[diagnostic(code(fatbin::config::unsupported_architecture))]
    UnsupportedArchitecture {
        platform_type: PlatformType,
        cpu: String,
    },

    #[error("no architectures requested for `{target}`")]
    #[diagnostic(code(fatbin::config::empty_architectures))]
    EmptyArchitectures { target: String },

    #[error("architecture `{cpu}` requested more than once for `{target}`")]
    #[diagnostic(code(fatbin::config::duplicate_architecture))]
    DuplicateArchitecture { target: String, cpu: String },

    #[error("`{path}` would be written by more than one action of `{target}`")]
    #[diagnostic(code(fatbin::config::conflicting_output))]
    ConflictingOutput { target: String, path: String },

    #[error("no `{field}` given and no default registered for platform type `{platform_type}`")]
    #[diagnostic(code(fatbin::config::missing_default))]
    MissingDefault {
        field: String,
        platform_type: PlatformType,
    },

    #[error("invalid version `{value}` for `{field}`")]
    #[diagnostic(
        code(fatbin::config::invalid_version),
        help("versions are dot-separated alphanumeric components, e.g. `12.4` or `7.3.1`")
    )]
    InvalidVersion { field: String, value: String },
}

impl ConfigError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigError::UnknownPlatformType { value } => {
                Diagnostic::error(format!("unknown platform type `{}`", value))
                    .with_context(format!(
                        "supported platform types: {}",
                        PlatformType::ALL
                            .iter()
                            .map(|p| p.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                    .with_suggestion("Pass one of the supported values to `--platform-type`")
            }

            ConfigError::UnknownCpu { value } => {
                Diagnostic::error(format!("unknown cpu `{}`", value)).with_suggestion(
                    "Prefix the cpu with its platform, e.g. `ios_arm64` or `darwin_x86_64`",
                )
            }

            ConfigError::UnsupportedArchitecture { platform_type, cpu } => {
                Diagnostic::error(format!(
                    "`{}` is not a {} architecture",
                    cpu, platform_type
                ))
                .with_context(format!(
                    "{} architectures: {}",
                    platform_type,
                    platform_type.known_cpus().join(", ")
                ))
                .with_suggestion(format!(
                    "Remove `{}` from the {} cpu list",
                    cpu, platform_type
                ))
            }

            ConfigError::EmptyArchitectures { target } => Diagnostic::error(format!(
                "universal binary `{}` has no architectures",
                target
            ))
            .with_suggestion("Request at least one cpu with `--arch`"),

            ConfigError::DuplicateArchitecture { target, cpu } => Diagnostic::error(format!(
                "`{}` appears more than once in the architectures of `{}`",
                cpu, target
            ))
            .with_suggestion("List each cpu once"),

            ConfigError::ConflictingOutput { target, path } => Diagnostic::error(format!(
                "two actions of `{}` would write `{}`",
                target, path
            ))
            .with_context("sources with the same file name in one target share an object path")
            .with_suggestion("Rename one of the sources")
            .with_suggestion("Give each dependency a name distinct from the binary and each other"),

            ConfigError::MissingDefault {
                field,
                platform_type,
            } => Diagnostic::error(format!(
                "cannot resolve `{}` for {}",
                field, platform_type
            ))
            .with_context("no explicit value was given and the version table has no default")
            .with_suggestion(format!("Pass `{}` explicitly", field.replace('_', "-")))
            .with_suggestion("Add a default to the [xcode] table in .fatbin/config.toml"),

            ConfigError::InvalidVersion { field, value } => {
                Diagnostic::error(format!("invalid version `{}` for `{}`", value, field))
                    .with_context("versions look like `12.4` or `7.3.1`")
            }
        }
    }
}

/// A failed variable lookup on a planned action.
///
/// A missing variable is distinct from a variable that resolved to an
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum LookupError {
    #[error("action `{action}` has no variable `{name}`")]
    #[diagnostic(code(fatbin::lookup::variable_not_found))]
    VariableNotFound { action: String, name: String },

    #[error("action `{action}` carries no build variables")]
    #[diagnostic(code(fatbin::lookup::no_variables))]
    NoVariables { action: String },

    #[error("no action with id {id}")]
    #[diagnostic(code(fatbin::lookup::unknown_action))]
    UnknownAction { id: usize },
}

impl LookupError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            LookupError::VariableNotFound { action, name } => {
                Diagnostic::error(format!("variable `{}` not found on `{}`", name, action))
                    .with_suggestion("Run `fatbin vars` to list the resolved variables")
            }
            LookupError::NoVariables { action } => {
                Diagnostic::error(format!("`{}` carries no build variables", action))
                    .with_context("combine actions span every architecture")
                    .with_suggestion("Query one of the per-architecture link actions instead")
            }
            LookupError::UnknownAction { id } => {
                Diagnostic::error(format!("no action with id {}", id))
            }
        }
    }
}

//! Universal binary build requests.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::platform::{Architecture, PlatformType};

/// Default directory for planned outputs.
pub const DEFAULT_OUT_DIR: &str = "fatbin-out";

/// A static library linked into every architecture slice of a binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryTarget {
    /// Library name (the archive is `lib<name>.a`)
    pub name: String,
    /// Library sources
    #[serde(default)]
    pub srcs: Vec<PathBuf>,
}

impl LibraryTarget {
    /// Create a library target.
    pub fn new(name: impl Into<String>, srcs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        LibraryTarget {
            name: name.into(),
            srcs: srcs.into_iter().map(Into::into).collect(),
        }
    }

    /// Archive file name, e.g. `liba.a`.
    pub fn archive_filename(&self) -> String {
        format!("lib{}.a", self.name)
    }
}

/// A request for one multi-architecture binary.
///
/// The platform type is fixed for the whole target; every architecture is
/// paired with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversalBinaryTarget {
    /// Logical target name
    pub name: String,
    /// Platform family of every slice
    pub platform_type: PlatformType,
    /// Architectures in request order
    pub architectures: Vec<Architecture>,
    /// Binary sources
    #[serde(default)]
    pub srcs: Vec<PathBuf>,
    /// Static library dependencies
    #[serde(default)]
    pub deps: Vec<LibraryTarget>,
    /// Root of all planned outputs
    pub out_dir: PathBuf,
}

impl UniversalBinaryTarget {
    /// Create a request with no sources or dependencies.
    pub fn new(name: impl Into<String>, platform_type: PlatformType) -> Self {
        UniversalBinaryTarget {
            name: name.into(),
            platform_type,
            architectures: Vec::new(),
            srcs: Vec::new(),
            deps: Vec::new(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
        }
    }

    /// Add an architecture.
    pub fn arch(mut self, cpu: impl Into<String>) -> Self {
        self.architectures.push(Architecture::new(cpu));
        self
    }

    /// Add a binary source.
    pub fn src(mut self, path: impl Into<PathBuf>) -> Self {
        self.srcs.push(path.into());
        self
    }

    /// Add a library dependency.
    pub fn dep(mut self, lib: LibraryTarget) -> Self {
        self.deps.push(lib);
        self
    }

    /// Set the output directory.
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Directory holding one architecture's outputs, e.g. `fatbin-out/ios-arm64`.
    pub fn arch_dir(&self, arch: &Architecture) -> PathBuf {
        self.out_dir
            .join(format!("{}-{}", self.platform_type, arch.cpu()))
    }

    /// Output path of one architecture's binary.
    pub fn arch_binary(&self, arch: &Architecture) -> PathBuf {
        self.arch_dir(arch)
            .join("bin")
            .join(format!("{}_bin", self.name))
    }

    /// Output path of the combined binary.
    pub fn universal_binary(&self) -> PathBuf {
        self.out_dir.join(format!("{}_lipobin", self.name))
    }

    /// Object file path for a source of `owner`, e.g. `obj/app/main.m.o`.
    ///
    /// The source extension is kept so `main.c` and `main.m` stay apart.
    pub fn object_path(&self, arch: &Architecture, owner: &str, src: &Path) -> PathBuf {
        let file_name = src
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| src.display().to_string());
        self.arch_dir(arch)
            .join("obj")
            .join(owner)
            .join(format!("{}.o", file_name))
    }

    /// Archive path of a dependency.
    pub fn archive_path(&self, arch: &Architecture, lib: &LibraryTarget) -> PathBuf {
        self.arch_dir(arch).join("lib").join(lib.archive_filename())
    }

    /// Every file one architecture's slice writes, in emission order.
    pub fn slice_outputs(&self, arch: &Architecture) -> Vec<PathBuf> {
        let mut outputs: Vec<PathBuf> = self
            .srcs
            .iter()
            .map(|src| self.object_path(arch, &self.name, src))
            .collect();
        for lib in &self.deps {
            outputs.extend(lib.srcs.iter().map(|src| self.object_path(arch, &lib.name, src)));
            outputs.push(self.archive_path(arch, lib));
        }
        outputs.push(self.arch_binary(arch));
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_layout() {
        let target = UniversalBinaryTarget::new("bin", PlatformType::Watchos)
            .arch("armv7k")
            .out_dir("/out");
        let arch = &target.architectures[0];

        assert_eq!(
            target.arch_binary(arch),
            PathBuf::from("/out/watchos-armv7k/bin/bin_bin")
        );
        assert_eq!(target.universal_binary(), PathBuf::from("/out/bin_lipobin"));
        assert_eq!(
            target.object_path(arch, "a", Path::new("x/a.cc")),
            PathBuf::from("/out/watchos-armv7k/obj/a/a.cc.o")
        );
    }

    #[test]
    fn test_object_path_keeps_extension() {
        let target = UniversalBinaryTarget::new("app", PlatformType::Ios).arch("arm64");
        let arch = &target.architectures[0];
        assert_ne!(
            target.object_path(arch, "app", Path::new("app/main.c")),
            target.object_path(arch, "app", Path::new("app/main.m"))
        );
    }

    #[test]
    fn test_slice_outputs() {
        let target = UniversalBinaryTarget::new("app", PlatformType::Ios)
            .arch("arm64")
            .src("main.c")
            .dep(LibraryTarget::new("a", ["a.c"]))
            .out_dir("/out");
        let arch = &target.architectures[0];
        assert_eq!(
            target.slice_outputs(arch),
            vec![
                PathBuf::from("/out/ios-arm64/obj/app/main.c.o"),
                PathBuf::from("/out/ios-arm64/obj/a/a.c.o"),
                PathBuf::from("/out/ios-arm64/lib/liba.a"),
                PathBuf::from("/out/ios-arm64/bin/app_bin"),
            ]
        );
    }

    #[test]
    fn test_archive_filename() {
        let lib = LibraryTarget::new("a", ["a.cc"]);
        assert_eq!(lib.archive_filename(), "liba.a");
        assert_eq!(lib.srcs, vec![PathBuf::from("a.cc")]);
    }

    #[test]
    fn test_default_out_dir() {
        let target = UniversalBinaryTarget::new("app", PlatformType::Ios);
        assert_eq!(target.out_dir, PathBuf::from(DEFAULT_OUT_DIR));
        assert!(target.architectures.is_empty());
    }
}

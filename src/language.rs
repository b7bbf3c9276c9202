//! Content and path heuristics describing what kind of file a blob is.

use crate::git::Blob;
use crate::model::{FileChange, UNKNOWN_LANGUAGE};
use std::path::Path;
use std::sync::LazyLock;
use tokei::{Config, LanguageType};

/// Attributes attached to a file once its blob has been found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKind {
    pub binary: bool,
    pub image: bool,
    pub vendored: bool,
    pub generated: bool,
    pub language: String,
}

impl FileKind {
    pub fn apply_to(self, file: &mut FileChange) {
        file.binary = self.binary;
        file.image = self.image;
        file.vendored = self.vendored;
        file.generated = self.generated;
        file.language = self.language;
    }
}

pub trait FileClassifier {
    fn classify(&self, blob: &Blob) -> FileKind;
}

/// Classifies by file name, extension and a NUL-byte probe of the contents.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

const BINARY_PROBE_LEN: usize = 8192;

static TOKEI_CONFIG: LazyLock<Config> = LazyLock::new(Config::default);

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "tif", "tiff", "webp", "psd",
];

const VENDOR_DIRS: &[&str] = &[
    "vendor/",
    "vendors/",
    "third_party/",
    "thirdparty/",
    "node_modules/",
    "bower_components/",
    "Godeps/_workspace/",
];

const GENERATED_NAMES: &[&str] = &[
    "Cargo.lock",
    "Gemfile.lock",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "composer.lock",
    "poetry.lock",
    "go.sum",
];

const GENERATED_SUFFIXES: &[&str] = &[
    ".min.js",
    ".min.css",
    ".js.map",
    ".css.map",
    ".pb.go",
    "_pb2.py",
    ".designer.cs",
];

impl FileClassifier for HeuristicClassifier {
    fn classify(&self, blob: &Blob) -> FileKind {
        let binary = is_binary(&blob.data);
        let image = is_image(&blob.path);
        let language = if binary {
            UNKNOWN_LANGUAGE.to_string()
        } else {
            detect_language(&blob.path)
                .unwrap_or(UNKNOWN_LANGUAGE)
                .to_string()
        };
        FileKind {
            binary,
            image,
            vendored: is_vendored(&blob.path),
            generated: is_generated(&blob.path),
            language,
        }
    }
}

pub fn is_binary(data: &[u8]) -> bool {
    data.iter().take(BINARY_PROBE_LEN).any(|&b| b == 0)
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn is_image(path: &str) -> bool {
    extension(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_vendored(path: &str) -> bool {
    VENDOR_DIRS
        .iter()
        .any(|dir| path.starts_with(dir) || path.contains(&format!("/{dir}")))
}

pub fn is_generated(path: &str) -> bool {
    let name = file_name(path);
    GENERATED_NAMES.contains(&name) || GENERATED_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Language label for a path, or `None` when nothing matches.
pub fn detect_language(path: &str) -> Option<&'static str> {
    LanguageType::from_path(path, &TOKEI_CONFIG).map(LanguageType::name)
}

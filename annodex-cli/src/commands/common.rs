use std::path::Path;

use anyhow::Context;
use annodex::{ClassModifiers, DecodeConfig, SparseIndex};

use crate::app::GlobalOptions;

/// Open an index, memory-mapped, with the validation level chosen on the command line.
pub fn load_index(path: &Path, opts: &GlobalOptions) -> anyhow::Result<SparseIndex> {
    let config = if opts.strict {
        DecodeConfig::strict()
    } else {
        DecodeConfig::minimal()
    };

    SparseIndex::from_file_with_config(path, config)
        .with_context(|| format!("failed to load index: {}", path.display()))
}

/// Short kind label derived from the class flags.
pub fn class_kind(modifiers: ClassModifiers) -> &'static str {
    if modifiers.contains(ClassModifiers::ANNOTATION) {
        "annotation"
    } else if modifiers.contains(ClassModifiers::INTERFACE) {
        "interface"
    } else if modifiers.contains(ClassModifiers::ENUM) {
        "enum"
    } else if modifiers.contains(ClassModifiers::MODULE) {
        "module"
    } else {
        "class"
    }
}

/// Space separated modifier keywords, e.g. `public abstract`.
pub fn modifier_keywords(modifiers: ClassModifiers) -> String {
    let keywords = [
        (ClassModifiers::PUBLIC, "public"),
        (ClassModifiers::ABSTRACT, "abstract"),
        (ClassModifiers::FINAL, "final"),
        (ClassModifiers::SYNTHETIC, "synthetic"),
    ];

    keywords
        .iter()
        .filter(|(flag, _)| modifiers.contains(*flag))
        .map(|(_, keyword)| *keyword)
        .collect::<Vec<_>>()
        .join(" ")
}

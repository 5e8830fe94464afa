//! Extension → language mapping, the registry's single source of truth
//! (§4.1).

use crate::model::Language;

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "py" | "pyi" => Some(Language::Python),
            "ts" | "tsx" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "go" => Some(Language::Go),
            _ => None,
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py", "pyi"],
            Language::TypeScript => &["ts", "tsx"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::Go => &["go"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Go => "go",
        }
    }

    /// Template-aware languages additionally emit `TemplateSlot`s (§4.2).
    /// None of the presently-supported grammars embed an HTML templating
    /// layer directly; JSX/TSX come closest (`dangerouslySetInnerHTML`) and
    /// are handled inline by the TypeScript/JavaScript structural generator
    /// rather than through a dedicated template CST.
    pub fn is_template_aware(&self) -> bool {
        matches!(self, Language::TypeScript | Language::JavaScript)
    }

    pub fn tree_sitter_language(&self) -> tree_sitter::Language {
        match self {
            Language::Python => tree_sitter_python::language(),
            Language::TypeScript => tree_sitter_typescript::language_tsx(),
            Language::JavaScript => tree_sitter_javascript::language(),
            Language::Go => tree_sitter_go::language(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_round_trips() {
        for lang in [Language::Python, Language::TypeScript, Language::JavaScript, Language::Go] {
            for ext in lang.extensions() {
                assert_eq!(Language::from_extension(ext), Some(lang));
            }
        }
    }

    #[test]
    fn unknown_extension_is_none() {
        assert_eq!(Language::from_extension("exe"), None);
    }
}

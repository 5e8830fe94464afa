//! Base-type normalization (§4.5 step 1): case folding plus an ecosystem
//! alias table, e.g. `pysqlite2.dbapi2.Cursor -> sqlite3.Cursor`. Ported
//! from `trcr/index/normalizer.py`'s `TypeNormalizer`/`DEFAULT_ALIASES`;
//! the Python version is explicit about thread-safety through immutability,
//! which the `Arc`-wrapped alias table here gets for free.

use std::collections::BTreeMap;
use std::sync::Arc;

/// `(source, target)` pairs mirroring `DEFAULT_ALIASES` — modules that
/// moved, were renamed, or expose a compatibility shim around a canonical
/// implementation the rule files are written against.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("pysqlite2.dbapi2.Cursor", "sqlite3.Cursor"),
    ("pysqlite2.dbapi2.Connection", "sqlite3.Connection"),
    ("MySQLdb.cursors.Cursor", "pymysql.cursors.Cursor"),
    ("psycopg2cffi.extensions.cursor", "psycopg2.extensions.cursor"),
    ("simplejson.JSONEncoder", "json.JSONEncoder"),
    ("cElementTree.Element", "xml.etree.ElementTree.Element"),
];

#[derive(Debug, Clone)]
pub struct NormalizationConfig {
    pub aliases: BTreeMap<String, String>,
    pub case_fold: bool,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            aliases: DEFAULT_ALIASES.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            case_fold: false,
        }
    }
}

/// Immutable and cheaply cloneable (`Arc`-backed config) so a single
/// normalizer can be shared across parallel compiler/matcher workers
/// without synchronization.
#[derive(Debug, Clone)]
pub struct TypeNormalizer {
    config: Arc<NormalizationConfig>,
}

impl TypeNormalizer {
    pub fn new(config: NormalizationConfig) -> Self {
        Self { config: Arc::new(config) }
    }

    pub fn normalize(&self, base_type: &str) -> String {
        let folded = if self.config.case_fold {
            base_type.to_ascii_lowercase()
        } else {
            base_type.to_string()
        };
        self.config.aliases.get(&folded).cloned().unwrap_or(folded)
    }
}

impl Default for TypeNormalizer {
    fn default() -> Self {
        Self::new(NormalizationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliased_module_normalizes_to_canonical_form() {
        let normalizer = TypeNormalizer::default();
        assert_eq!(normalizer.normalize("pysqlite2.dbapi2.Cursor"), "sqlite3.Cursor");
    }

    #[test]
    fn unaliased_type_passes_through_unchanged() {
        let normalizer = TypeNormalizer::default();
        assert_eq!(normalizer.normalize("requests.Session"), "requests.Session");
    }

    #[test]
    fn case_folding_is_opt_in() {
        let normalizer = TypeNormalizer::new(NormalizationConfig { case_fold: true, ..NormalizationConfig::default() });
        assert_eq!(normalizer.normalize("PYSQLITE2.DBAPI2.CURSOR"), "sqlite3.Cursor");
    }
}

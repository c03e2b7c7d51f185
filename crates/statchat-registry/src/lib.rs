//! Statistic registry: the catalog of 70 player metrics and the phrases used
//! when a metric is zero.
//!
//! Both tables are YAML documents compiled once at startup. The builtin
//! copies are embedded in the binary; `load` reads a replacement from disk.
//!
//! ```ignore
//! use statchat_registry::{StatRegistry, ZeroPhraseTable};
//!
//! let registry = StatRegistry::builtin()?;
//! let zeros = ZeroPhraseTable::builtin()?;
//! zeros.validate_against(&registry)?;
//!
//! let goals = registry.get("G").unwrap();
//! assert_eq!(goals.question_for("Luke Bangs"), "How many goals has Luke Bangs scored?");
//! ```

pub mod definition;
pub mod error;
pub mod registry;
pub mod zero_phrase;

pub use definition::{
    AliasPattern, Category, ExtractionPattern, LabelKind, NounForms, StatDefinition, ValueQuery,
    ValueShape,
};
pub use error::RegistryError;
pub use registry::{StatRegistry, BUILTIN_STAT_COUNT};
pub use zero_phrase::{ZeroPhraseTable, ZeroRule};

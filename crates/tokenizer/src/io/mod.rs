//! Reading and writing models and vocabularies.
//!
//! Every reader validates as it goes and reports the 1-based line of the
//! first bad record; nothing is returned from a file that fails to parse.

pub mod format;
pub mod load;
pub mod save;

pub use format::{ModelFormat, SerializedModel};
pub use load::{ModelLoader, VocabularyLoader};
pub use save::{ModelSaver, VocabularySaver};

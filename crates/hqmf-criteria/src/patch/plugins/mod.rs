//! Standard patches, in the order they run:
//!
//! - code-list: specific occurrences take their source's code list
//! - variable-name: variables are described by their id extension
//! - variable-subsets: verbose references become variable groupers
//! - variable-data-criteria: source variables embed their grouper
//! - descriptions: generated titles are replaced by the referenced criteria's

pub mod code_list;
pub mod descriptions;
pub mod variable_data_criteria;
pub mod variable_name;
pub mod variable_subsets;

pub use code_list::*;
pub use descriptions::*;
pub use variable_data_criteria::*;
pub use variable_name::*;
pub use variable_subsets::*;

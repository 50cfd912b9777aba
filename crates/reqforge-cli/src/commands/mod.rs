//! Command implementations.

pub mod extract;
pub mod generate;
pub mod materialize;

pub use self::extract::execute_extract;
pub use self::generate::execute_generate;
pub use self::generate_tests::execute_tests;
pub use self::materialize::execute_materialize;

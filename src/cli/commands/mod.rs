//! One module per subcommand.

pub mod backup;
pub mod migrate;
pub mod restore;
pub mod version;

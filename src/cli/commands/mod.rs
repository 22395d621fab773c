//! One module per subcommand.

pub mod completions;
pub mod get;
pub mod init;
pub mod save;
pub mod serve;

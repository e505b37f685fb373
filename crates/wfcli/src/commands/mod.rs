//! Command implementations. Each takes already-parsed `clap` arguments and
//! returns `Result<(), ExitError>` so `main()` owns the process exit code.

pub mod events;
pub mod inspect;
pub mod validate;

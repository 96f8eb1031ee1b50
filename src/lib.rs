pub mod artifacts;
pub mod commands;
pub mod config;
pub mod dates;
pub mod external;
pub mod fs;
pub mod inventory;
pub mod journal;
pub mod process;
pub mod verify;

pub mod byte_utils;
pub mod contract;
pub mod error;
pub mod fake;
pub mod governance;
pub mod msg;
pub mod registry;
pub mod replay;
pub mod state;
pub mod transaction;
pub mod vaa;
pub mod verify;

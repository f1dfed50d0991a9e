pub mod dhan;
pub mod telegram;

pub use dhan::{DhanClient, HistoricalQuery};
pub use telegram::TelegramClient;

//! Stock Pool Module
//!
//! The user's tracked symbols (symbol -> company name) and favorites, stored as
//! JSON files in a data directory.

pub mod pool;
pub mod storage;

pub use pool::{Favorites, StockPool};
pub use storage::{StorageManager, FAVORITE_STOCKS_FILE, STOCK_POOL_FILE};

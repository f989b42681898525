pub mod export;
pub mod settings_cache;
pub mod spreadsheet;
pub mod username_filter;

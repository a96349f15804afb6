mod scrape;
mod serve;

pub use scrape::run_scrape;
pub use serve::run_serve;

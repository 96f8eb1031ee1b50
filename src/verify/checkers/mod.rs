//! One checker per pipeline stage, registered in pipeline order

pub mod catalog_index;
pub mod hathifiles;
pub mod hathifiles_database;
pub mod hathifiles_listing;
pub mod hathifiles_redirects;
pub mod populate_rights;
pub mod post_zephir;

pub use catalog_index::CatalogIndex;
pub use hathifiles::Hathifiles;
pub use hathifiles_database::HathifilesDatabase;
pub use hathifiles_listing::HathifilesListing;
pub use hathifiles_redirects::HathifilesRedirects;
pub use populate_rights::PopulateRights;
pub use post_zephir::PostZephir;

use anyhow::Result;

use super::engine::Checker;

pub fn default_checkers() -> Result<Vec<Box<dyn Checker>>> {
    let checkers: Vec<Box<dyn Checker>> = vec![
        Box::new(PostZephir::new()?),
        Box::new(PopulateRights::default()),
        Box::new(Hathifiles::new()?),
        Box::new(HathifilesDatabase),
        Box::new(HathifilesListing::default()),
        Box::new(HathifilesRedirects::new()?),
        Box::new(CatalogIndex),
    ];
    Ok(checkers)
}

pub mod collection;
pub mod form;
pub mod images;
pub mod save;
pub mod table;

pub use collection::{CollectionError, IndexedCollection};
pub use form::{slugify, CoverChoice, FormError, FormErrors, TourForm};
pub use images::{ImageError, PendingImage};
pub use save::{CompensationReport, RetryPolicy, SaveError, SaveReport, SaveStep, TourSaveSaga};
pub use table::TourTable;

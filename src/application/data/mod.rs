// Loading, inspection, cleaning and alignment of the raw tables
pub mod aligner;
pub mod cleaner;
pub mod extract;
pub mod loader;
pub mod quality;
pub mod validation;

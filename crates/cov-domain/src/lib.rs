// cov-domain library entry point
pub mod artifact;
pub mod filter;
pub mod output_dir;
pub mod error;
pub use artifact::Artifact;
pub use filter::ArtifactFilter;
pub use output_dir::CoverageOutputDir;
pub use error::DomainError;

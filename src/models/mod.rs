//! Copilot model listing from the public models.dev manifest.

pub mod manifest;

pub use manifest::{fetch_manifest, list_models, verify_models, ManifestModel, ModelListing};

/// Shown with every listing: the manifest is not a live Copilot listing.
pub const LISTING_DISCLAIMER: &str = "Listing is from Models.dev (filtered/merged), not a live Copilot model listing. \
Whether a model actually works depends on your GitHub Copilot subscription and settings.";

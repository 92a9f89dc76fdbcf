//! Service layer for the wallpaper gallery.
//! - Turns raw request parameters into validated, immutable values.
//! - Talks to the outside world only through traits (`WallpaperRepository`,
//!   `MediaStore`, `IdentityVerifier`), each with a production and an in-memory implementation.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod runtime;
pub mod identity;
pub mod media;
pub mod wallpaper;
#[cfg(test)]
pub mod test_support;

pub use wallpaper::service::WallpaperService;

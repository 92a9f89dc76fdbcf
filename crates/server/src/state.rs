use std::sync::Arc;

use service::identity::IdentityVerifier;
use service::WallpaperService;

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub wallpapers: Arc<WallpaperService>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl ServerState {
    pub fn new(wallpapers: WallpaperService, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { wallpapers: Arc::new(wallpapers), verifier }
    }
}

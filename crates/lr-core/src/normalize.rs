//! Dev-mode path normalization.
//!
//! Position files written in production reference a fixed root
//! (`/var/log/app`). In dev mode that root is swapped for a local one so
//! the same position file can be replayed against a local checkout.

use std::path::{Path, PathBuf};

use lr_config::PathRewrite;

/// Map a recorded path to the path observable on this host.
///
/// With `rewrite == None` the path is returned unchanged. Otherwise a path
/// under `production_root` (matched component-wise) is moved under
/// `local_root`; any other path is left alone.
pub fn normalize(path: &Path, rewrite: Option<&PathRewrite>) -> PathBuf {
    let Some(rewrite) = rewrite else {
        return path.to_path_buf();
    };

    match path.strip_prefix(&rewrite.production_root) {
        Ok(rest) if rest.as_os_str().is_empty() => rewrite.local_root.clone(),
        Ok(rest) => rewrite.local_root.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

//! Rename composed from read, write, and delete.

use super::traits::{Deleter, Reader, Writer};
use crate::error::{FsError, FsResult, catalog};
use crate::path;

/// Move `from` to `to` in three steps: read, write, delete.
///
/// There is no rollback:
///
/// | Step fails | Observable state |
/// |------------|------------------|
/// | read | nothing changed |
/// | write | nothing changed at `from`; `to` may be untouched or (on an ambiguous transient failure) written |
/// | delete | the object exists at both `from` and `to`; reported as `Permanent` |
///
/// Renaming a path onto itself is a no-op.
pub async fn rename_via_copy<F>(fs: &F, from: &str, to: &str) -> FsResult<()>
where
    F: Reader + Writer + Deleter + ?Sized,
{
    if path::object_key(from) == path::object_key(to) {
        return Ok(());
    }

    let mut content = fs.read(from).await?;
    fs.write(to, &mut content).await?;

    if let Err(e) = fs.delete(from).await {
        log_warn!(
            from = %crate::logging_impl::sanitize_for_log(from),
            to = %crate::logging_impl::sanitize_for_log(to),
            error = %e,
            "rename copied destination but failed to remove source"
        );
        return Err(FsError::permanent(catalog::rename_incomplete(
            from,
            to,
            e.message(),
        )));
    }

    log_debug!(
        from = %crate::logging_impl::sanitize_for_log(from),
        to = %crate::logging_impl::sanitize_for_log(to),
        "renamed"
    );
    Ok(())
}

use crate::error::{FrameError, Result};

/// Normalize a stack path to `<owner>/<path>`.
///
/// A single leading `/` marks an absolute path whose first segment is the
/// owner; any other path is owned by `user`. Empty and slash-only paths
/// are rejected rather than naming a stack with no path.
pub fn normalize_stack_path(user: &str, stack: &str) -> Result<String> {
    let normalized = match stack.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None if stack.is_empty() => String::new(),
        None => format!("{user}/{stack}"),
    };

    if normalized.trim_matches('/').is_empty() {
        return Err(FrameError::InvalidStack(stack.to_string()));
    }
    Ok(normalized)
}

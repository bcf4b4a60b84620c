// src/utils/log.rs

//! Server-style presentation helpers on top of the `log` facade.
//!
//! Level filtering and timestamps come from the installed logger.

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    ::log::info!("{}", border);
    ::log::info!("  {}", title);
    ::log::info!("{}", border);
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    ::log::info!("[STEP {}/{}] {}", step_num, total, message);
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    ::log::info!("    {}", message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    ::log::info!("[SUMMARY] {}", title);
    for (key, value) in items {
        ::log::info!("    {}: {}", key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_without_logger() {
        // No logger installed: the facade drops records silently.
        header("title");
        step(1, 2, "step");
        sub_item("item");
        summary("done", &[("count", "3".to_string())]);
    }
}

use std::env;
use std::path::PathBuf;

/// True for empty strings and strings made only of whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn non_blank(value: &str) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    Some(value.to_string())
}

/// Directory holding the running executable, if the platform can tell us.
pub fn current_exe_dir() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    exe.parent().map(|dir| dir.to_path_buf())
}

/// Render an argv for log output, quoting where a shell would need it.
pub fn display_argv(program: &str, args: &[String]) -> String {
    let mut words = Vec::with_capacity(args.len() + 1);
    words.push(program);
    words.extend(args.iter().map(String::as_str));
    shell_words::join(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection_covers_whitespace_only_values() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(is_blank("\t\n"));
        assert!(!is_blank(" a "));
        assert_eq!(non_blank("  "), None);
        assert_eq!(non_blank("video/mp4"), Some("video/mp4".to_string()));
    }

    #[test]
    fn display_argv_quotes_spaces() {
        let args = vec!["-n".to_string(), "my song".to_string()];
        assert_eq!(display_argv("shfs_admin", &args), "shfs_admin -n 'my song'");
    }
}

//! Utility functions for the package manager.

/// Normalize a package name for comparison.
///
/// Python distribution names are case-insensitive, and runs of `-`, `_` and
/// `.` are equivalent.
///
/// # Examples
///
/// ```
/// use reqfix_pm::util::normalize_package_name;
///
/// assert_eq!(normalize_package_name("Flask"), "flask");
/// assert_eq!(normalize_package_name("python_dotenv"), "python-dotenv");
/// assert_eq!(normalize_package_name("zope.interface"), "zope-interface");
/// assert_eq!(normalize_package_name("foo__-bar"), "foo-bar");
/// ```
pub fn normalize_package_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;

    for ch in name.trim().chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('-');
            }
            in_separator = true;
        } else {
            normalized.extend(ch.to_lowercase());
            in_separator = false;
        }
    }

    normalized
}

/// Check whether two package names refer to the same distribution.
pub fn same_package(a: &str, b: &str) -> bool {
    normalize_package_name(a) == normalize_package_name(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize_package_name("NumPy"), "numpy");
        assert_eq!(normalize_package_name("PyYAML"), "pyyaml");
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize_package_name("opencv_python"), "opencv-python");
        assert_eq!(normalize_package_name("opencv-python"), "opencv-python");
        assert_eq!(normalize_package_name("a.b_c-d"), "a-b-c-d");
        assert_eq!(normalize_package_name("a-_.b"), "a-b");
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_package_name("  flask "), "flask");
    }

    #[test]
    fn test_same_package() {
        assert!(same_package("Pillow", "pillow"));
        assert!(same_package("python-dotenv", "python_dotenv"));
        assert!(!same_package("pillow", "pillow-heif"));
        assert!(!same_package("torch", "torchvision"));
    }
}

//! Windows path helpers that work the same on any build host

/// Express `path` relative to the directory `base`.
///
/// Comparison is case-insensitive and both `\` and `/` separate segments;
/// the result uses `\`. When the two paths do not share a root the input
/// is returned unchanged.
pub fn make_relative(path: &str, base: &str) -> String {
    let path_parts = segments(path);
    let base_parts = segments(base);

    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
        .count();

    if common == 0 {
        return path.to_string();
    }

    let mut parts: Vec<&str> = std::iter::repeat("..")
        .take(base_parts.len() - common)
        .collect();
    parts.extend(&path_parts[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("\\")
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split(['\\', '/'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_directory() {
        assert_eq!(
            make_relative(r"E:\A\B\Content\readme.txt", r"E:\A\B\Install Files"),
            r"..\Content\readme.txt"
        );
    }

    #[test]
    fn test_nested_and_case_insensitive() {
        assert_eq!(make_relative(r"c:\Work\bin\app.exe", r"C:\work"), r"bin\app.exe");
        assert_eq!(make_relative(r"C:\work\", r"C:\work"), ".");
        assert_eq!(make_relative("C:/a/b/c.txt", r"C:\a\x\y"), r"..\..\b\c.txt");
    }

    #[test]
    fn test_different_roots() {
        assert_eq!(make_relative(r"D:\data\x.txt", r"C:\work"), r"D:\data\x.txt");
    }
}

//! Symbolic folder tokens
//!
//! Maps the `%Token%` placeholders accepted in directory paths to the
//! well-known directory ids the installer runtime resolves on the target
//! machine.

use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[A-Za-z0-9_]+%").expect("valid placeholder regex"));

/// Placeholder token to directory id. Lookup is case-sensitive.
pub const FOLDER_MAPPINGS: &[(&str, &str)] = &[
    ("%AdminTools%", "AdminToolsFolder"),
    ("%AdminToolsFolder%", "AdminToolsFolder"),
    ("%AppData%", "AppDataFolder"),
    ("%AppDataFolder%", "AppDataFolder"),
    ("%CommonAppData%", "CommonAppDataFolder"),
    ("%CommonAppDataFolder%", "CommonAppDataFolder"),
    ("%CommonFiles%", "CommonFilesFolder"),
    ("%CommonFilesFolder%", "CommonFilesFolder"),
    ("%CommonFiles64%", "CommonFiles64Folder"),
    ("%CommonFiles64Folder%", "CommonFiles64Folder"),
    ("%Desktop%", "DesktopFolder"),
    ("%DesktopFolder%", "DesktopFolder"),
    ("%Favorites%", "FavoritesFolder"),
    ("%FavoritesFolder%", "FavoritesFolder"),
    ("%Fonts%", "FontsFolder"),
    ("%FontsFolder%", "FontsFolder"),
    ("%LocalAppData%", "LocalAppDataFolder"),
    ("%LocalAppDataFolder%", "LocalAppDataFolder"),
    ("%MyPictures%", "MyPicturesFolder"),
    ("%MyPicturesFolder%", "MyPicturesFolder"),
    ("%NetHood%", "NetHoodFolder"),
    ("%NetHoodFolder%", "NetHoodFolder"),
    ("%Personal%", "PersonalFolder"),
    ("%PersonalFolder%", "PersonalFolder"),
    ("%PrintHood%", "PrintHoodFolder"),
    ("%PrintHoodFolder%", "PrintHoodFolder"),
    ("%ProgramFiles%", "ProgramFilesFolder"),
    ("%ProgramFilesFolder%", "ProgramFilesFolder"),
    ("%ProgramFiles64%", "ProgramFiles64Folder"),
    ("%ProgramFiles64Folder%", "ProgramFiles64Folder"),
    ("%ProgramMenu%", "ProgramMenuFolder"),
    ("%ProgramMenuFolder%", "ProgramMenuFolder"),
    ("%Recent%", "RecentFolder"),
    ("%RecentFolder%", "RecentFolder"),
    ("%SendTo%", "SendToFolder"),
    ("%SendToFolder%", "SendToFolder"),
    ("%StartMenu%", "StartMenuFolder"),
    ("%StartMenuFolder%", "StartMenuFolder"),
    ("%Startup%", "StartupFolder"),
    ("%StartupFolder%", "StartupFolder"),
    ("%System%", "SystemFolder"),
    ("%SystemFolder%", "SystemFolder"),
    ("%System16%", "System16Folder"),
    ("%System16Folder%", "System16Folder"),
    ("%System64%", "System64Folder"),
    ("%System64Folder%", "System64Folder"),
    ("%Temp%", "TempFolder"),
    ("%TempFolder%", "TempFolder"),
    ("%Template%", "TemplateFolder"),
    ("%TemplateFolder%", "TemplateFolder"),
    ("%Windows%", "WindowsFolder"),
    ("%WindowsFolder%", "WindowsFolder"),
    ("%WindowsVolume%", "WindowsVolume"),
];

/// Directory ids that live inside the current user's profile.
///
/// Components installed beneath one of these need a per-user registry key
/// path and an uninstall-time folder removal.
pub const USER_PROFILE_FOLDERS: &[&str] = &[
    "AppDataFolder",
    "DesktopFolder",
    "LocalAppDataFolder",
    "PersonalFolder",
    "ProgramMenuFolder",
    "StartMenuFolder",
    "StartupFolder",
    "TempFolder",
];

/// Resolve a `%Token%` placeholder to its directory id
pub fn folder_for_token(token: &str) -> Option<&'static str> {
    FOLDER_MAPPINGS
        .iter()
        .find(|(t, _)| *t == token)
        .map(|(_, id)| *id)
}

/// Resolve a directory path segment that names a symbolic folder.
///
/// Accepts both the `%Token%` form and the bare id (`ProgramFilesFolder`).
/// 64-bit packages map the program-files tokens to their 64-bit folders.
pub fn symbolic_folder(segment: &str, win64: bool) -> Option<&'static str> {
    let id = folder_for_token(segment).or_else(|| {
        FOLDER_MAPPINGS
            .iter()
            .find(|(_, id)| *id == segment)
            .map(|(_, id)| *id)
    })?;

    if win64 && segment.starts_with('%') {
        return Some(match id {
            "ProgramFilesFolder" => "ProgramFiles64Folder",
            "CommonFilesFolder" => "CommonFiles64Folder",
            other => other,
        });
    }
    Some(id)
}

/// Whether a directory id is one of the well-known folders
pub fn is_symbolic_folder_id(id: &str) -> bool {
    FOLDER_MAPPINGS.iter().any(|(_, known)| *known == id)
}

pub fn is_user_profile_folder(id: &str) -> bool {
    USER_PROFILE_FOLDERS.contains(&id)
}

/// Replace every known placeholder with its directory id; unknown tokens
/// are left untouched.
pub fn expand_placeholders(text: &str) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures| {
            let token = &caps[0];
            folder_for_token(token).unwrap_or(token).to_string()
        })
        .into_owned()
}

/// Placeholder tokens in `text` that have no mapping
pub fn unknown_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| folder_for_token(token).is_none())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_lookup_is_case_sensitive() {
        assert_eq!(folder_for_token("%ProgramFiles%"), Some("ProgramFilesFolder"));
        assert_eq!(folder_for_token("%programfiles%"), None);
    }

    #[test]
    fn test_expand_placeholders() {
        assert_eq!(
            expand_placeholders(r"%ProgramFiles%\My Company"),
            r"ProgramFilesFolder\My Company"
        );
        assert_eq!(expand_placeholders("%Bogus%\\x"), "%Bogus%\\x");
    }

    #[test]
    fn test_unknown_placeholders() {
        assert_eq!(
            unknown_placeholders(r"%ProgramFiles%\%Nope%\x"),
            vec!["%Nope%".to_string()]
        );
        assert!(unknown_placeholders("\"%1\"").is_empty());
    }

    #[test]
    fn test_symbolic_folder_win64() {
        assert_eq!(symbolic_folder("%ProgramFiles%", true), Some("ProgramFiles64Folder"));
        assert_eq!(symbolic_folder("%ProgramFiles%", false), Some("ProgramFilesFolder"));
        assert_eq!(symbolic_folder("ProgramFilesFolder", true), Some("ProgramFilesFolder"));
        assert_eq!(symbolic_folder("My App", false), None);
    }

    #[test]
    fn test_user_profile_folders() {
        assert!(is_user_profile_folder("DesktopFolder"));
        assert!(!is_user_profile_folder("ProgramFilesFolder"));
    }
}

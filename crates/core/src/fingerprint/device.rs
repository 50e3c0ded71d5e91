//! Substring-based device classification.
//!
//! Parses a raw client-identifier string (a user agent or the mobile app's
//! own identifier) into a coarse classification. Matching is lower-cased
//! substring search in priority order; unrecognized strings classify as
//! unknown rather than erroring.

use super::types::{DeviceInfo, DeviceType, MAX_RAW_CLIENT_LEN};

/// Classifies a raw client-identifier string.
#[must_use]
pub fn classify_device(raw_client: &str) -> DeviceInfo {
    let lower = raw_client.to_lowercase();

    let device_type = if lower.is_empty() {
        DeviceType::Unknown
    } else if contains_any(&lower, &["mobile", "android", "iphone"]) {
        DeviceType::Mobile
    } else if contains_any(&lower, &["tablet", "ipad"]) {
        DeviceType::Tablet
    } else if lower.contains("electron") {
        DeviceType::Desktop
    } else if contains_any(&lower, &["mozilla", "chrome", "safari", "applewebkit"]) {
        DeviceType::Web
    } else {
        DeviceType::Unknown
    };

    DeviceInfo {
        device_type,
        os: detect_os(&lower),
        app: detect_app(&lower),
        raw: truncate(raw_client),
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Extracts the OS name, with a version suffix for iOS/Android when the
/// identifier carries one.
fn detect_os(lower: &str) -> String {
    if lower.contains("android") {
        return match extract_version(lower, "android ") {
            Some(v) => format!("Android {v}"),
            None => "Android".to_string(),
        };
    }
    if contains_any(lower, &["iphone", "ipad", "ios"]) {
        // iOS user agents carry "OS 16_6" style versions.
        return match extract_version(lower, "os ") {
            Some(v) => format!("iOS {v}"),
            None => "iOS".to_string(),
        };
    }
    if lower.contains("windows") {
        return "Windows".to_string();
    }
    if contains_any(lower, &["mac os x", "macos", "macintosh"]) {
        return "macOS".to_string();
    }
    if lower.contains("linux") {
        return "Linux".to_string();
    }
    "Unknown".to_string()
}

/// Extracts the browser or application name.
fn detect_app(lower: &str) -> String {
    if lower.contains("civitrack") {
        return "CiviTrack App".to_string();
    }
    if lower.contains("electron") {
        return "Electron".to_string();
    }
    if lower.contains("edg") {
        return "Edge".to_string();
    }
    if lower.contains("firefox") {
        return "Firefox".to_string();
    }
    if lower.contains("chrome") {
        return "Chrome".to_string();
    }
    if lower.contains("safari") {
        return "Safari".to_string();
    }
    "Unknown".to_string()
}

/// Reads a dotted version number following `marker`, accepting the
/// underscore-separated form iOS user agents use.
fn extract_version(lower: &str, marker: &str) -> Option<String> {
    let start = lower.find(marker)? + marker.len();
    let version: String = lower[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '_')
        .map(|c| if c == '_' { '.' } else { c })
        .collect();

    if version.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        Some(version.trim_end_matches('.').to_string())
    } else {
        None
    }
}

fn truncate(raw: &str) -> String {
    if raw.len() <= MAX_RAW_CLIENT_LEN {
        return raw.to_string();
    }
    let mut end = MAX_RAW_CLIENT_LEN;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X)",
        DeviceType::Mobile
    )]
    #[case("Mozilla/5.0 (Linux; Android 13; Pixel 7)", DeviceType::Mobile)]
    #[case("Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X)", DeviceType::Tablet)]
    #[case("CiviTrack/2.1 Electron/27.0 (Windows NT 10.0)", DeviceType::Desktop)]
    #[case(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0",
        DeviceType::Web
    )]
    #[case("curl/8.4.0", DeviceType::Unknown)]
    #[case("", DeviceType::Unknown)]
    fn test_device_type_priority(#[case] raw: &str, #[case] expected: DeviceType) {
        assert_eq!(classify_device(raw).device_type, expected);
    }

    #[test]
    fn test_android_version_extracted() {
        let info = classify_device("Mozilla/5.0 (Linux; Android 13; Pixel 7) Mobile");
        assert_eq!(info.os, "Android 13");
    }

    #[test]
    fn test_ios_version_extracted_with_underscores() {
        let info = classify_device("Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X)");
        assert_eq!(info.os, "iOS 16.6");
    }

    #[test]
    fn test_browser_detection_edge_before_chrome() {
        // Edge user agents also contain "Chrome".
        let info = classify_device("Mozilla/5.0 (Windows NT 10.0) Chrome/120.0 Edg/120.0");
        assert_eq!(info.app, "Edge");
    }

    #[test]
    fn test_raw_is_truncated() {
        let long = "x".repeat(1000);
        let info = classify_device(&long);
        assert_eq!(info.raw.len(), MAX_RAW_CLIENT_LEN);
    }

    #[test]
    fn test_empty_identifier_is_unknown() {
        let info = classify_device("");
        assert_eq!(info.device_type, DeviceType::Unknown);
        assert_eq!(info.os, "Unknown");
        assert!(info.raw.is_empty());
    }
}

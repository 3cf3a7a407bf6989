//! Info.plist generation for the `.app` bundle.

use super::icon::ICNS_FILE_NAME;

const INFO_PLIST_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleExecutable</key>
	<string>{executable}</string>
	<key>CFBundleIconFile</key>
	<string>{icon_file}</string>
	<key>CFBundleIdentifier</key>
	<string>{bundle_identifier}</string>
	<key>NSHighResolutionCapable</key>
	<true/>
	<key>LSUIElement</key>
	<true/>
</dict>
</plist>
"#;

/// Escapes the characters XML does not allow verbatim in text nodes.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders Info.plist for `executable` and `bundle_identifier`.
///
/// The icon file, high resolution flag and background agent flag
/// (`LSUIElement`) are fixed.
pub fn render_info_plist(executable: &str, bundle_identifier: &str) -> String {
    INFO_PLIST_TEMPLATE
        .replace("{executable}", &escape_xml(executable))
        .replace("{icon_file}", ICNS_FILE_NAME)
        .replace("{bundle_identifier}", &escape_xml(bundle_identifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_executable_and_identifier() {
        let plist = render_info_plist("Greeter", "com.example.greeter");
        assert!(plist.contains("<key>CFBundleExecutable</key>\n\t<string>Greeter</string>"));
        assert!(plist.contains("<key>CFBundleIdentifier</key>\n\t<string>com.example.greeter</string>"));
        assert!(plist.contains("<string>icon.icns</string>"));
        assert!(plist.contains("<key>NSHighResolutionCapable</key>\n\t<true/>"));
        assert!(plist.contains("<key>LSUIElement</key>\n\t<true/>"));
        assert!(!plist.contains('{'));
    }

    #[test]
    fn escapes_markup_in_values() {
        let plist = render_info_plist("Tom&Jerry", "com.example.<x>");
        assert!(plist.contains("<string>Tom&amp;Jerry</string>"));
        assert!(plist.contains("<string>com.example.&lt;x&gt;</string>"));
    }
}

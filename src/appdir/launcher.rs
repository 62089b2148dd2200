//! src/appdir/launcher.rs
//! Points the desktop entry at the bundled binary and writes the `AppRun` entry point.

use super::{AppDir, AppLayout};
use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

pub const LAUNCHER_NAME: &str = "AppRun";

/// Replaces every line starting with `key` by `key` followed by `value`.
fn rewrite_key(content: &str, key: &str, value: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for line in content.lines() {
        if line.starts_with(key) {
            out.push_str(key);
            out.push_str(value);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

pub fn rewrite_desktop_entry(content: &str, layout: &AppLayout) -> String {
    let content = rewrite_key(content, "Exec=", layout.binary);
    rewrite_key(&content, "Icon=", layout.binary)
}

/// Shell entry point. It resolves its own directory through symlinks, makes the
/// bundled binaries executable and execs the application in its place.
pub fn launcher_script(layout: &AppLayout) -> String {
    format!(
        r#"#!/bin/sh
HERE="$(dirname "$(readlink -f "$0")")"
chmod +x "$HERE/{binary}" "$HERE/{helper}" 2>/dev/null
exec "$HERE/{binary}" {flag} "$@"
"#,
        binary = layout.binary,
        helper = layout.sandbox_helper,
        flag = layout.launch_flag,
    )
}

/// Rewrites the desktop entry in place and writes an executable `AppRun`.
pub fn configure(appdir: &AppDir, layout: &AppLayout) -> Result<PathBuf> {
    let desktop = fs::read_to_string(&appdir.desktop)
        .with_context(|| format!("reading {}", appdir.desktop.display()))?;
    fs::write(&appdir.desktop, rewrite_desktop_entry(&desktop, layout))
        .with_context(|| format!("writing {}", appdir.desktop.display()))?;

    let launcher = appdir.root.join(LAUNCHER_NAME);
    fs::write(&launcher, launcher_script(layout))
        .with_context(|| format!("writing {}", launcher.display()))?;
    fs::set_permissions(&launcher, fs::Permissions::from_mode(0o755))?;

    Ok(launcher)
}

#[cfg(test)]
mod tests {
    use super::super::STACHER7;
    use super::*;
    use std::process::Command;
    use tempfile::tempdir;

    const DESKTOP: &str = "\
[Desktop Entry]
Name=Stacher7
Exec=/opt/Stacher7/stacher7 %U
Terminal=false
Type=Application
Icon=stacher7-original
StartupWMClass=Stacher7
Comment=Download videos
Categories=Utility;
";

    #[test]
    fn desktop_keys_are_rewritten() {
        let out = rewrite_desktop_entry(DESKTOP, &STACHER7);
        assert!(out.contains("\nExec=stacher7\n"));
        assert!(out.contains("\nIcon=stacher7\n"));
        assert!(!out.contains("/opt/Stacher7"));
        assert!(out.contains("StartupWMClass=Stacher7\n"));
        assert!(out.contains("Categories=Utility;\n"));
        assert_eq!(out.lines().count(), DESKTOP.lines().count());
    }

    #[test]
    fn keys_must_start_the_line() {
        let out = rewrite_desktop_entry("TryExec=/usr/bin/x\nX-Icon=foo\n", &STACHER7);
        assert_eq!(out, "TryExec=/usr/bin/x\nX-Icon=foo\n");
    }

    #[test]
    fn script_has_one_exec_line_with_flag_first() {
        let script = launcher_script(&STACHER7);
        assert!(script.starts_with("#!/bin/sh\n"));
        let exec_lines: Vec<&str> = script.lines().filter(|l| l.trim_start().starts_with("exec ")).collect();
        assert_eq!(exec_lines, [r#"exec "$HERE/stacher7" --no-sandbox "$@""#]);
        assert!(script.contains(r#"chmod +x "$HERE/stacher7" "$HERE/chrome-sandbox""#));
        assert!(script.contains("readlink -f"));
    }

    #[test]
    fn configure_writes_executable_launcher() {
        let root = tempdir().unwrap();
        let appdir = AppDir {
            root: root.path().to_path_buf(),
            desktop: root.path().join("stacher7.desktop"),
            icon: root.path().join("stacher7.png"),
        };
        fs::write(&appdir.desktop, DESKTOP).unwrap();

        let launcher = configure(&appdir, &STACHER7).unwrap();

        assert_eq!(launcher, root.path().join("AppRun"));
        let mode = fs::metadata(&launcher).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert!(fs::read_to_string(&appdir.desktop).unwrap().contains("Exec=stacher7\n"));
    }

    #[test]
    fn launcher_execs_binary_through_a_symlink() {
        let root = tempdir().unwrap();
        let appdir = AppDir {
            root: root.path().join("Stacher7.AppDir"),
            desktop: root.path().join("Stacher7.AppDir/stacher7.desktop"),
            icon: root.path().join("Stacher7.AppDir/stacher7.png"),
        };
        fs::create_dir(&appdir.root).unwrap();
        fs::write(&appdir.desktop, DESKTOP).unwrap();
        // Not executable yet: the launcher has to chmod it.
        fs::write(appdir.root.join("stacher7"), "#!/bin/sh\nprintf '%s|' \"$@\"\n").unwrap();
        fs::write(appdir.root.join("chrome-sandbox"), "").unwrap();
        let launcher = configure(&appdir, &STACHER7).unwrap();
        let link = root.path().join("run-stacher");
        std::os::unix::fs::symlink(&launcher, &link).unwrap();

        let out = Command::new(&link).args(["a b", "c"]).output().unwrap();

        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout), "--no-sandbox|a b|c|");
        let mode = fs::metadata(appdir.root.join("chrome-sandbox")).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }
}

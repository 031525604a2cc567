//! Input discovery: list the images in a directory and derive output names.
//!
//! Only the top level of the source directory is scanned. An entry qualifies
//! when it is a regular file (symlinks are followed) whose final extension
//! matches one of the configured extensions, ignoring case.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// True when the final extension of `path` is one of `extensions`
/// (lower-case, no dot), compared case-insensitively.
pub fn is_supported_image(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// File name with only the final `.`-delimited suffix removed.
///
/// `scan.page.1.jpeg` → `scan.page.1`.
pub fn base_name(path: &Path) -> OsString {
    path.file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default()
}

/// `<dest_dir>/<base name>.pdf` for the given image.
pub fn output_path(dest_dir: &Path, image: &Path) -> PathBuf {
    let mut name = base_name(image);
    name.push(".pdf");
    dest_dir.join(name)
}

/// List the supported images directly inside `dir`.
///
/// With `sort` the result is ordered by file name; otherwise entries keep
/// the order the filesystem returned them in.
pub fn discover_images(dir: &Path, extensions: &[String], sort: bool) -> io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !is_supported_image(&path, extensions) {
            continue;
        }
        // fs::metadata follows symlinks; a dangling link is just skipped.
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => images.push(path),
            _ => debug!("Skipping non-file entry: {}", path.display()),
        }
    }

    if sort {
        images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }

    debug!("Discovered {} images in {}", images.len(), dir.display());
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_EXTENSIONS;

    fn exts() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        std::fs::write(&p, b"img").unwrap();
        p
    }

    #[test]
    fn extension_match_ignores_case() {
        let e = exts();
        for name in ["a.jpg", "a.JPG", "a.Jpeg", "a.png", "a.TIF", "a.tiff"] {
            assert!(is_supported_image(Path::new(name), &e), "{name}");
        }
        for name in ["a.txt", "a.pdf", "jpg", "a.jpg.bak", ".png"] {
            assert!(!is_supported_image(Path::new(name), &e), "{name}");
        }
    }

    #[test]
    fn base_name_strips_only_last_extension() {
        assert_eq!(base_name(Path::new("scan.page.1.jpeg")), "scan.page.1");
        assert_eq!(base_name(Path::new("/x/photo.JPG")), "photo");
        assert_eq!(base_name(Path::new("-dash name.png")), "-dash name");
    }

    #[test]
    fn output_path_uses_pdf_suffix() {
        let out = output_path(Path::new("/out"), Path::new("/in/scan.page.1.tiff"));
        assert_eq!(out, PathBuf::from("/out/scan.page.1.pdf"));
    }

    #[test]
    fn discovery_is_flat_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.png");
        touch(dir.path(), "a.JPG");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "-leading dash & more.tif");
        std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub"), "deep.png");

        let found = discover_images(dir.path(), &exts(), true).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["-leading dash & more.tif", "a.JPG", "b.png"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_images_are_followed_and_dangling_links_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let target = touch(dir.path(), "real.png");
        std::os::unix::fs::symlink(&target, dir.path().join("link.png")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.png"), dir.path().join("dangling.png"))
            .unwrap();

        let found = discover_images(dir.path(), &exts(), true).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn unsorted_discovery_returns_same_set() {
        let dir = tempfile::tempdir().unwrap();
        for n in ["c.png", "a.png", "b.png"] {
            touch(dir.path(), n);
        }
        let mut found = discover_images(dir.path(), &exts(), false).unwrap();
        found.sort();
        assert_eq!(found.len(), 3);
        assert!(found[0].ends_with("a.png"));
    }
}

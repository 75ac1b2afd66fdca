//! Utility functions and constants
//!
//! **Used by**: main (command-line files), app (dropped files)

/// Media file type detection
pub mod media {
    use log::{debug, warn};
    use std::path::{Path, PathBuf};

    /// Supported image file extensions
    pub const IMAGE_EXTS: &[&str] = &[
        "png", "jpg", "jpeg", "gif", "webp", "tif", "tiff", "tga", "bmp",
    ];

    /// Check if file is an image format
    pub fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| IMAGE_EXTS.contains(&s.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Expand inputs into a flat list of images.
    ///
    /// Files are kept in the given order whatever their extension (the strip
    /// shows unreadable ones as placeholders). A directory contributes its
    /// images, sorted by name, non-recursively.
    pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for input in inputs {
            if !input.is_dir() {
                out.push(input.clone());
                continue;
            }
            let entries = match std::fs::read_dir(input) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Failed to read dir {}: {}", input.display(), e);
                    continue;
                }
            };
            let mut images: Vec<PathBuf> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && is_image(path))
                .collect();
            images.sort();
            debug!("{}: {} images", input.display(), images.len());
            out.extend(images);
        }
        out
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_is_image_ignores_case() {
            assert!(is_image(Path::new("a/B.JPG")));
            assert!(is_image(Path::new("x.webp")));
            assert!(!is_image(Path::new("notes.txt")));
            assert!(!is_image(Path::new("no_extension")));
        }

        #[test]
        fn test_expand_dir_sorted_and_filtered() {
            let tmp = tempfile::tempdir().unwrap();
            for name in ["b.png", "a.jpg", "c.txt"] {
                std::fs::write(tmp.path().join(name), b"x").unwrap();
            }
            std::fs::create_dir(tmp.path().join("sub.png")).unwrap();
            let loose = PathBuf::from("/elsewhere/z.gif");

            let out = expand_inputs(&[loose.clone(), tmp.path().to_path_buf()]);
            assert_eq!(
                out,
                vec![loose, tmp.path().join("a.jpg"), tmp.path().join("b.png")]
            );
        }
    }
}

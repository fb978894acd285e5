use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

use uuid::Uuid;

/// Destination name for one uploaded object.
///
/// Each capture gets a fresh random token so repeated uploads of the same
/// local file never collide in the bucket. The source file's extension is
/// kept so the stored object stays recognizable; a source without an
/// extension uploads under the bare token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObjectKey(String);

impl RemoteObjectKey {
    /// Build a key for `source`, e.g. `/tmp/a.jpg` becomes `<uuid>.jpg`.
    pub fn for_file(source: &Path) -> Self {
        let token = Uuid::new_v4();

        match source.extension().and_then(OsStr::to_str) {
            Some(extension) if !extension.is_empty() => {
                Self(format!("{token}.{extension}"))
            }
            _ => Self(token.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_keeps_the_source_extension() {
        let key = RemoteObjectKey::for_file(Path::new("/tmp/a.jpg"));

        let (stem, extension) = key.as_str().rsplit_once('.').unwrap();
        assert_eq!(extension, "jpg");
        assert!(Uuid::parse_str(stem).is_ok());
    }

    #[test]
    fn only_the_last_extension_survives() {
        let key = RemoteObjectKey::for_file(Path::new("shots/archive.tar.gz"));

        assert!(key.as_str().ends_with(".gz"));
    }

    #[test]
    fn extensionless_source_uses_the_bare_token() {
        let key = RemoteObjectKey::for_file(Path::new("/tmp/capture"));

        assert!(Uuid::parse_str(key.as_str()).is_ok());
    }

    #[test]
    fn repeated_uploads_never_collide() {
        let source = Path::new("/tmp/a.jpg");

        let first = RemoteObjectKey::for_file(source);
        let second = RemoteObjectKey::for_file(source);

        assert_ne!(first, second);
    }
}

use std::{fs, io, path::Path};

use tracing::{Level, instrument};

use crate::error::StorageError;

/// Asegura que `path` exista, creando los padres si hace falta.
#[instrument(level = Level::TRACE, err)]
pub fn ensure_dir(path: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Comprueba que se pueda escribir en el directorio `path`.
#[instrument(level = Level::TRACE, err)]
pub fn check_writable(path: &Path) -> Result<(), StorageError> {
    let meta = fs::metadata(path)?;
    if meta.permissions().readonly() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("Sin permiso de escritura en {}", path.display()),
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_dir_creates_nested_dirs() {
        let tmp = tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        check_writable(&nested).unwrap();
    }

    #[test]
    fn check_writable_fails_for_missing_dir() {
        let tmp = tempdir().unwrap();
        assert!(check_writable(&tmp.path().join("missing")).is_err());
    }
}

//! Discovery de artifacts en el directorio de build.
//!
//! Lista sólo el nivel superior (no recursivo). Un archivo es elegible si su
//! nombre empieza con el prefijo del filtro y es un archivo regular que el
//! usuario actual puede ejecutar (`access(2)` con `X_OK`, igual que `test -x`).
//! Los symlinks se siguen, igual que `test -f`/`-x`.
//!
//! El resultado se ordena por nombre: el orden de `read_dir` depende de la
//! plataforma y queremos corridas reproducibles.

use std::fs;
use std::path::Path;

use cov_domain::{Artifact, ArtifactFilter};
use log::debug;

use crate::errors::CoreError;

pub fn discover_artifacts(build_dir: &Path, filter: &ArtifactFilter) -> Result<Vec<Artifact>, CoreError> {
    let discovery_err = |e: std::io::Error| CoreError::Discovery { path: build_dir.to_path_buf(),
                                                                   reason: e.to_string() };
    debug!("discover:start build_dir={} prefix={}", build_dir.display(), filter.prefix());
    let entries = fs::read_dir(build_dir).map_err(discovery_err)?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(discovery_err)?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            debug!("discover:skip non-utf8 name={:?}", file_name);
            continue;
        };
        if !filter.matches_name(name) {
            continue;
        }
        let path = entry.path();
        // fs::metadata sigue symlinks; uno roto simplemente no es elegible
        let meta = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                debug!("discover:skip unreadable path={} err={e}", path.display());
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }
        let artifact = Artifact::new(path.clone(), is_executable(&path))?;
        if filter.accepts(&artifact) {
            found.push(artifact);
        } else {
            debug!("discover:skip not executable path={}", path.display());
        }
    }
    found.sort_by(|a, b| a.base_name().cmp(b.base_name()));
    debug!("discover:done count={}", found.len());
    Ok(found)
}

/// Pregunta al kernel con uid/gid reales: los bits de modo solos no dicen si
/// el usuario actual es dueño, miembro del grupo u otro.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};
    access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("exe"))
        .unwrap_or(false)
}

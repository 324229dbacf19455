use owlmetry_order::TermCatalogue;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Exit code for precondition and operational failures. Individual
/// run failures inside a completed matrix never use it.
pub const EXIT_PRECONDITION: i32 = 2;

pub fn load_catalogue_or_exit(path: &str) -> TermCatalogue {
    TermCatalogue::load(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_PRECONDITION);
    })
}

pub fn read_json_file_or_exit<T>(path: &str, label: &str) -> T
where
    T: serde::de::DeserializeOwned,
{
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read {label} at {path}: {e}");
        std::process::exit(EXIT_PRECONDITION);
    });
    serde_json::from_slice::<T>(&bytes).unwrap_or_else(|e| {
        eprintln!("error: failed to parse {label} JSON at {path}: {e}");
        std::process::exit(EXIT_PRECONDITION);
    })
}

/// Source ontology files in `dir`, sorted by name.
pub fn list_owl_inputs(dir: &Path) -> Result<Vec<String>, String> {
    let entries = fs::read_dir(dir).map_err(|e| format!("{}: {e}", dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| e.to_string())?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(".owl") && entry.path().is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Byte sizes of the named inputs, for the size-descending ordering.
pub fn input_sizes(dir: &Path, names: &[String]) -> BTreeMap<String, u64> {
    names
        .iter()
        .map(|name| {
            let size = fs::metadata(dir.join(name)).map(|m| m.len()).unwrap_or(0);
            (name.clone(), size)
        })
        .collect()
}

/// Persist a write-once artifact: refuses to overwrite, writes through
/// a temp file, fsyncs, then renames into place.
pub fn write_once(path: &Path, content: &[u8]) -> Result<(), String> {
    if path.exists() {
        return Err(format!(
            "refusing to overwrite existing output: {}",
            path.display()
        ));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| format!("{}: {e}", parent.display()))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), String> {
        let mut file =
            File::create(&tmp_path).map_err(|e| format!("{}: {e}", tmp_path.display()))?;
        file.write_all(content)
            .map_err(|e| format!("{}: {e}", tmp_path.display()))?;
        file.sync_all()
            .map_err(|e| format!("{}: {e}", tmp_path.display()))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        format!("{} -> {}: {e}", tmp_path.display(), path.display())
    })
}

pub fn write_once_or_exit(path: &Path, content: &[u8]) {
    write_once(path, content).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_PRECONDITION);
    });
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(prefix: &str) -> PathBuf {
        let unique = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "owlmetry-support-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        path
    }

    #[test]
    fn write_once_refuses_to_overwrite() {
        let dir = temp_dir("once");
        let target = dir.join("results.json");
        write_once(&target, b"{}").expect("first write should succeed");
        let second = write_once(&target, b"{}");
        assert!(second.is_err());
        assert!(second.unwrap_err().contains("refusing to overwrite"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn list_owl_inputs_filters_and_sorts() {
        let dir = temp_dir("inputs");
        fs::write(dir.join("go.owl"), b"x").expect("fixture");
        fs::write(dir.join("chebi.owl"), b"x").expect("fixture");
        fs::write(dir.join("notes.txt"), b"x").expect("fixture");
        let names = list_owl_inputs(&dir).expect("listing should succeed");
        assert_eq!(names, vec!["chebi.owl".to_string(), "go.owl".to_string()]);
        let _ = fs::remove_dir_all(dir);
    }
}

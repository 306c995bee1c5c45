use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use crate::program::Program;

/// Repository for the saved program collection.
///
/// The store is the source of truth, not memory: callers re-load before
/// list/lookup operations so concurrent edits from another instance are
/// picked up rather than clobbered.
pub trait ProgramStore {
    fn load(&self) -> Vec<Program>;
    fn save(&self, programs: &[Program]) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileProgramStore {
    path: PathBuf,
}

impl FileProgramStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "kondi") {
            pd.data_local_dir().join("programs.json")
        } else {
            PathBuf::from("kondi_programs.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl ProgramStore for FileProgramStore {
    fn load(&self) -> Vec<Program> {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(programs) = serde_json::from_slice::<Vec<Program>>(&bytes) {
                return programs;
            }
        }
        // missing or corrupt document degrades to an empty collection
        Vec::new()
    }

    fn save(&self, programs: &[Program]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(programs).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// Guarded create used by the program form: empty and duplicate names are
/// rejected so the dropdown stays unambiguous.
pub fn create_program(
    store: &dyn ProgramStore,
    name: &str,
) -> Result<Program, CreateProgramError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CreateProgramError::EmptyName);
    }

    let mut programs = store.load();
    if programs.iter().any(|p| p.name == name) {
        return Err(CreateProgramError::DuplicateName);
    }

    let id = chrono::Local::now().timestamp_millis() as u64;
    let program = Program::new(id, name);
    programs.push(program.clone());
    store
        .save(&programs)
        .map_err(CreateProgramError::Io)?;
    Ok(program)
}

#[derive(Debug)]
pub enum CreateProgramError {
    EmptyName,
    DuplicateName,
    Io(std::io::Error),
}

impl std::fmt::Display for CreateProgramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateProgramError::EmptyName => write!(f, "please enter a program name"),
            CreateProgramError::DuplicateName => {
                write!(f, "a program with this name already exists")
            }
            CreateProgramError::Io(e) => write!(f, "could not save programs: {e}"),
        }
    }
}

impl std::error::Error for CreateProgramError {}

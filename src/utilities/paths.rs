//! Default on-disk locations.
//!
//! Everything lives under the user's home directory:
//!
//! - `~/.romanai_lab_state/` for `config.json` and the `memory.log` transcript
//! - `~/.romanai_spacetime/` for engine memory (`memory.jsonl`)
//!
//! `ROMANAI_STATE_DIR` and `ROMANAI_MEMORY_DIR` override the two roots.

use std::env;
use std::path::PathBuf;

/// Config file name inside the state directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Transcript file name inside the state directory.
pub const TRANSCRIPT_FILE_NAME: &str = "memory.log";

/// The user's home directory, falling back to the system temp dir.
pub fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
}

/// Directory for lab configuration and transcript.
pub fn lab_state_dir() -> PathBuf {
    env::var_os("ROMANAI_STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".romanai_lab_state"))
}

/// Directory for engine memory logs.
pub fn memory_dir() -> PathBuf {
    env::var_os("ROMANAI_MEMORY_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".romanai_spacetime"))
}

pub fn config_path() -> PathBuf {
    lab_state_dir().join(CONFIG_FILE_NAME)
}

pub fn transcript_path() -> PathBuf {
    lab_state_dir().join(TRANSCRIPT_FILE_NAME)
}

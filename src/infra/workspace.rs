use std::env;
use std::path::PathBuf;

/// Where the ML-Agents training environment lives inside a project checkout.
const INSTALL_SUBDIR: &str = "MLAgentsEnv/mlagents-env/Lib/site-packages";

/// Look for the ML-Agents install under any of the given roots.
pub fn locate_install_in(roots: &[PathBuf]) -> Option<PathBuf> {
    roots
        .iter()
        .map(|root| root.join(INSTALL_SUBDIR))
        .find(|candidate| candidate.is_dir())
}

/// Candidate roots: the working directory, then the directory holding the
/// probe binary. Mirrors running the original diagnostic from either the
/// project root or the environment's Scripts directory.
pub fn candidate_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        roots.push(cwd);
    }
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            roots.push(dir.to_path_buf());
        }
    }
    roots
}

/// Resolve the ML-Agents install, or the candidate paths that were tried so
/// the caller can warn and continue.
pub fn locate_install() -> Result<PathBuf, Vec<PathBuf>> {
    let roots = candidate_roots();
    match locate_install_in(&roots) {
        Some(found) => Ok(found),
        None => Err(roots
            .iter()
            .map(|root| root.join(INSTALL_SUBDIR))
            .collect()),
    }
}

use std::fmt;
use std::path::Path;

const REQUIRED_TOOLS: [&str; 2] = ["yarn", "npm"];
const REQUIRED_MANIFESTS: [&str; 2] = ["package.json", "yarn.lock"];

/// Whether a directory can be enumerated as a yarn project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Applicable,
    MissingTool(&'static str),
    MissingManifest(&'static str),
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detection::Applicable => write!(f, "yarn project detected"),
            Detection::MissingTool(tool) => write!(f, "`{}` is not available on PATH", tool),
            Detection::MissingManifest(file) => write!(f, "no {} found", file),
        }
    }
}

/// A yarn project needs `yarn` and `npm` on PATH plus `package.json` and
/// `yarn.lock` in its root.
pub fn detect_yarn_project(path: &Path) -> Detection {
    if let Some(tool) = REQUIRED_TOOLS.into_iter().find(|t| which::which(t).is_err()) {
        return Detection::MissingTool(tool);
    }
    check_manifests(path)
}

fn check_manifests(path: &Path) -> Detection {
    match REQUIRED_MANIFESTS
        .into_iter()
        .find(|file| !path.join(file).exists())
    {
        Some(file) => Detection::MissingManifest(file),
        None => Detection::Applicable,
    }
}

//! Task document for the studies: physical parameters, study settings and output options.
//!
//! ```text
//! physics
//! source: 2e-8
//! source_exponent: 0
//! diffusivity: 1e-10
//! radius: 0.5
//! outer_concentration: 20.0
//! study
//! schemes: forward, central
//! initial_grid_size: 5
//! refinements: 8
//! profile_points: 5
//! linear_solver: thomas
//! output
//! results_dir: results
//! loglevel: info
//! log_file: false
//! ```
//! Every key is optional, missing keys keep their default values.
use super::FD_scheme::Scheme;
use super::error::DiffusionError;
use super::grid::{RadialGrid, refinement_sizes};
use super::problem::PillarParameters;
use crate::Utils::logger::parse_loglevel;
use crate::Utils::task_parser::{DocumentMap, SectionMap, Value, parse_document_as, parse_task_file};
use crate::somelinalg::linear_sys_solvers_depot::LinearSolverKind;
use log::warn;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const PHYSICS: &str = "physics";
const STUDY: &str = "study";
const OUTPUT: &str = "output";

const PHYSICS_KEYS: [&str; 5] = [
    "source",
    "source_exponent",
    "diffusivity",
    "radius",
    "outer_concentration",
];
const STUDY_KEYS: [&str; 5] = [
    "schemes",
    "initial_grid_size",
    "refinements",
    "profile_points",
    "linear_solver",
];
const OUTPUT_KEYS: [&str; 3] = ["results_dir", "loglevel", "log_file"];

#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    pub params: PillarParameters,
    pub schemes: Vec<Scheme>,
    pub initial_grid_size: usize,
    pub refinements: usize,
    /// number of nodes of the concentration profile plots
    pub profile_points: usize,
    pub linear_solver: LinearSolverKind,
    pub results_dir: PathBuf,
    pub loglevel: String,
    /// also write the log into a timestamped file in `results_dir`
    pub log_file: bool,
}

impl Default for TaskConfig {
    fn default() -> Self {
        TaskConfig {
            params: PillarParameters::default(),
            schemes: vec![Scheme::Forward, Scheme::Central],
            initial_grid_size: 5,
            refinements: 8,
            profile_points: 5,
            linear_solver: LinearSolverKind::default(),
            results_dir: PathBuf::from("results"),
            loglevel: "info".to_string(),
            log_file: false,
        }
    }
}

/// all known titles and keys, missing ones are filled with None by the parser
fn template() -> DocumentMap {
    let section = |keys: &[&str]| -> SectionMap { keys.iter().map(|k| (k.to_string(), None)).collect() };
    let mut template = HashMap::new();
    template.insert(PHYSICS.to_string(), section(&PHYSICS_KEYS[..]));
    template.insert(STUDY.to_string(), section(&STUDY_KEYS[..]));
    template.insert(OUTPUT.to_string(), section(&OUTPUT_KEYS[..]));
    template
}

fn values<'a>(doc: &'a DocumentMap, title: &str, key: &str) -> Option<&'a Vec<Value>> {
    doc.get(title).and_then(|s| s.get(key)).and_then(|v| v.as_ref())
}

fn single<'a>(doc: &'a DocumentMap, title: &str, key: &str) -> Result<Option<&'a Value>, DiffusionError> {
    match values(doc, title, key).map(|v| v.as_slice()) {
        None | Some([]) => Ok(None),
        Some([value]) => Ok(Some(value)),
        Some(many) => Err(DiffusionError::TaskParse(format!(
            "{}.{} expects a single value, got {}",
            title,
            key,
            many.len()
        ))),
    }
}

fn type_error(title: &str, key: &str, expected: &str, value: &Value) -> DiffusionError {
    DiffusionError::TaskParse(format!("{}.{}: expected {}, got `{}`", title, key, expected, value))
}

fn get_float(doc: &DocumentMap, title: &str, key: &str, default: f64) -> Result<f64, DiffusionError> {
    match single(doc, title, key)? {
        None => Ok(default),
        Some(v) => v.as_float().ok_or_else(|| type_error(title, key, "a number", v)),
    }
}

fn get_usize(doc: &DocumentMap, title: &str, key: &str, default: usize) -> Result<usize, DiffusionError> {
    match single(doc, title, key)? {
        None => Ok(default),
        Some(v) => v
            .as_integer()
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| type_error(title, key, "a non-negative integer", v)),
    }
}

fn get_bool(doc: &DocumentMap, title: &str, key: &str, default: bool) -> Result<bool, DiffusionError> {
    match single(doc, title, key)? {
        None => Ok(default),
        Some(v) => v.as_boolean().ok_or_else(|| type_error(title, key, "true or false", v)),
    }
}

fn get_string(doc: &DocumentMap, title: &str, key: &str) -> Result<Option<String>, DiffusionError> {
    Ok(single(doc, title, key)?.map(|v| v.to_string()))
}

impl FromStr for TaskConfig {
    type Err = DiffusionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let doc = parse_document_as(input, Some(&template()))?;
        TaskConfig::from_document(&doc)
    }
}

impl TaskConfig {
    /// typed settings from a parsed task document, unknown titles and keys are ignored with a warning
    pub fn from_document(doc: &DocumentMap) -> Result<TaskConfig, DiffusionError> {
        for (title, section) in doc {
            let known: &[&str] = match title.as_str() {
                PHYSICS => &PHYSICS_KEYS,
                STUDY => &STUDY_KEYS,
                OUTPUT => &OUTPUT_KEYS,
                _ => {
                    warn!("unknown section `{}` in task document is ignored", title);
                    continue;
                }
            };
            for key in section.keys().filter(|k| !known.contains(&k.as_str())) {
                warn!("unknown key `{}.{}` in task document is ignored", title, key);
            }
        }

        let default = TaskConfig::default();
        let d = default.params;
        let params = PillarParameters {
            source: get_float(doc, PHYSICS, "source", d.source)?,
            source_exponent: get_float(doc, PHYSICS, "source_exponent", d.source_exponent)?,
            diffusivity: get_float(doc, PHYSICS, "diffusivity", d.diffusivity)?,
            radius: get_float(doc, PHYSICS, "radius", d.radius)?,
            outer_concentration: get_float(doc, PHYSICS, "outer_concentration", d.outer_concentration)?,
        };
        params.validate()?;

        let schemes = match values(doc, STUDY, "schemes") {
            None => default.schemes,
            Some(list) if list.is_empty() => default.schemes,
            Some(list) => list
                .iter()
                .map(|v| Scheme::parse(&v.to_string()))
                .collect::<Result<Vec<_>, _>>()?,
        };
        let initial_grid_size = get_usize(doc, STUDY, "initial_grid_size", default.initial_grid_size)?;
        let refinements = get_usize(doc, STUDY, "refinements", default.refinements)?;
        if refinements < 2 {
            return Err(DiffusionError::TaskParse(format!(
                "{}.refinements must be at least 2 to estimate an order, got {}",
                STUDY, refinements
            )));
        }
        // rejects too small initial grids and refinements beyond the largest grid
        refinement_sizes(initial_grid_size, refinements)?;
        let profile_points = get_usize(doc, STUDY, "profile_points", default.profile_points)?;
        if profile_points < RadialGrid::MIN_POINTS {
            return Err(DiffusionError::InvalidGridSize(profile_points));
        }
        if profile_points > RadialGrid::MAX_POINTS {
            return Err(DiffusionError::GridTooLarge {
                initial_grid_size: profile_points,
                level: 0,
                max: RadialGrid::MAX_POINTS,
            });
        }
        let linear_solver = match get_string(doc, STUDY, "linear_solver")? {
            None => default.linear_solver,
            Some(name) => LinearSolverKind::from_str(name.trim())
                .map_err(|_| DiffusionError::UnknownLinearSolver(name.clone()))?,
        };

        let results_dir = get_string(doc, OUTPUT, "results_dir")?
            .map(PathBuf::from)
            .unwrap_or(default.results_dir);
        let loglevel = get_string(doc, OUTPUT, "loglevel")?.unwrap_or(default.loglevel);
        parse_loglevel(&loglevel)?;
        let log_file = get_bool(doc, OUTPUT, "log_file", default.log_file)?;

        Ok(TaskConfig {
            params,
            schemes,
            initial_grid_size,
            refinements,
            profile_points,
            linear_solver,
            results_dir,
            loglevel,
            log_file,
        })
    }

    pub fn from_file(path: &Path) -> Result<TaskConfig, DiffusionError> {
        let doc = parse_task_file(path, Some(&template()))?;
        TaskConfig::from_document(&doc)
    }

    /// directory for the log file, if file logging is on
    pub fn log_dir(&self) -> Option<&Path> {
        if self.log_file { Some(self.results_dir.as_path()) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL_TASK: &str = "physics
source: 4e-8
source_exponent: 2
diffusivity: 1e-10
radius: 0.25
outer_concentration: 10.0
study
schemes: central
initial_grid_size: 9
refinements: 4
profile_points: 17
linear_solver: band
output
results_dir: out
loglevel: debug
log_file: true
";

    #[test]
    fn test_full_task() {
        let cfg = TaskConfig::from_str(FULL_TASK).unwrap();
        assert_eq!(cfg.params.source, 4e-8);
        assert_eq!(cfg.params.source_exponent, 2.0);
        assert_eq!(cfg.params.radius, 0.25);
        assert_eq!(cfg.params.outer_concentration, 10.0);
        assert_eq!(cfg.schemes, vec![Scheme::Central]);
        assert_eq!(cfg.initial_grid_size, 9);
        assert_eq!(cfg.refinements, 4);
        assert_eq!(cfg.profile_points, 17);
        assert_eq!(cfg.linear_solver, LinearSolverKind::BandedLU);
        assert_eq!(cfg.results_dir, PathBuf::from("out"));
        assert_eq!(cfg.loglevel, "debug");
        assert!(cfg.log_file);
        assert_eq!(cfg.log_dir(), Some(Path::new("out")));
    }

    #[test]
    fn test_partial_task_uses_defaults() {
        let cfg = TaskConfig::from_str("# only the radius\nphysics\nradius: 1.0\n").unwrap();
        let default = TaskConfig::default();
        assert_eq!(cfg.params.radius, 1.0);
        assert_eq!(cfg.params.source, default.params.source);
        assert_eq!(cfg.schemes, default.schemes);
        assert_eq!(cfg.refinements, 8);
        assert_eq!(cfg.linear_solver, LinearSolverKind::Thomas);
        assert_eq!(cfg.log_dir(), None);
    }

    #[test]
    fn test_bad_values() {
        assert!(matches!(
            TaskConfig::from_str("study\nschemes: upwind"),
            Err(DiffusionError::UnknownScheme(_))
        ));
        assert!(matches!(
            TaskConfig::from_str("study\nlinear_solver: gmres"),
            Err(DiffusionError::UnknownLinearSolver(_))
        ));
        assert!(matches!(
            TaskConfig::from_str("study\ninitial_grid_size: 2"),
            Err(DiffusionError::InvalidGridSize(2))
        ));
        assert!(matches!(
            TaskConfig::from_str("physics\ndiffusivity: -1.0"),
            Err(DiffusionError::InvalidParameter { name: "diffusivity", .. })
        ));
        assert!(matches!(
            TaskConfig::from_str("physics\nradius: big"),
            Err(DiffusionError::TaskParse(_))
        ));
        assert!(matches!(
            TaskConfig::from_str("physics\nradius: 0.1, 0.2"),
            Err(DiffusionError::TaskParse(_))
        ));
        assert!(matches!(
            TaskConfig::from_str("output\nloglevel: chatty"),
            Err(DiffusionError::UnknownLogLevel(_))
        ));
    }

    #[test]
    fn test_empty_task_is_default() {
        for input in ["", "# comments only\n// nothing else\n", "physics\n", "physics\nstudy\noutput"] {
            assert_eq!(TaskConfig::from_str(input).unwrap(), TaskConfig::default());
        }
    }

    #[test]
    fn test_unknown_sections_and_keys_are_ignored() {
        let task = "plotting\ncolor: red\nphysics\nradius: 0.25\ntemperature: 300\nstudy\nrefinements: 3\n";
        let cfg = TaskConfig::from_str(task).unwrap();
        assert_eq!(cfg.params.radius, 0.25);
        assert_eq!(cfg.refinements, 3);
        assert_eq!(cfg.params.source, TaskConfig::default().params.source);
    }

    #[test]
    fn test_grid_limits() {
        assert!(matches!(
            TaskConfig::from_str("study\nrefinements: 70"),
            Err(DiffusionError::GridTooLarge { initial_grid_size: 5, .. })
        ));
        assert!(matches!(
            TaskConfig::from_str("study\ninitial_grid_size: 0"),
            Err(DiffusionError::InvalidGridSize(0))
        ));
        assert!(matches!(
            TaskConfig::from_str("study\ninitial_grid_size: 100000000\nrefinements: 2"),
            Err(DiffusionError::GridTooLarge { .. })
        ));
        assert!(matches!(
            TaskConfig::from_str("study\nprofile_points: 100000000"),
            Err(DiffusionError::GridTooLarge { .. })
        ));
        let deepest = TaskConfig::from_str("study\nrefinements: 23").unwrap();
        assert_eq!(deepest.refinements, 23);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", FULL_TASK).unwrap();
        let cfg = TaskConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg, TaskConfig::from_str(FULL_TASK).unwrap());
        assert!(matches!(
            TaskConfig::from_file(Path::new("/definitely/not/here.txt")),
            Err(DiffusionError::Io(_))
        ));
    }
}

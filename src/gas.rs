//! Gas medium properties
//!
//! The gas table must load successfully before the model is
//! constructed; a missing environment variable or unreadable table is
//! fatal. Loading happens once per process, guarded, because the data
//! files back every concurrent track thereafter.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Why gas initialization failed.
#[derive(Clone, PartialEq)]
pub enum SetupError {
    MissingEnv(String),
    Unreadable(PathBuf),
    Malformed(PathBuf, String),
}

impl fmt::Debug for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SetupError::MissingEnv(var) => write!(f, "Environment variable {} is not defined, cannot locate gas data.", var),
            SetupError::Unreadable(path) => write!(f, "Unable to read gas data file \"{}\".", path.display()),
            SetupError::Malformed(path, cause) => write!(f, "Gas table \"{}\" is malformed: {}.", path.display(), cause),
        }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for SetupError {}

/// Bulk properties of the working gas, read from a table file.
#[derive(Clone, Debug)]
pub struct GasMedium {
    composition: String,
    pressure: f64,
    temperature: f64,
}

impl GasMedium {
    /// Parses the table format: one `key value` pair per line, `#`
    /// starts a comment. Required keys: `composition`, `pressure`
    /// (bar), `temperature` (K).
    pub fn parse(text: &str, origin: &Path) -> Result<Self, SetupError> {
        let mut composition: Option<String> = None;
        let mut pressure: Option<f64> = None;
        let mut temperature: Option<f64> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let key = tokens.next().unwrap();
            let rest: Vec<&str> = tokens.collect();
            match key {
                "composition" => {
                    if rest.is_empty() {
                        return Err(SetupError::Malformed(origin.to_owned(), "empty composition".to_owned()));
                    }
                    composition = Some(rest.join(" "));
                },
                "pressure" => {
                    pressure = rest.first()
                        .and_then(|s| s.parse::<f64>().ok())
                        .filter(|p| *p > 0.0);
                    if pressure.is_none() {
                        return Err(SetupError::Malformed(origin.to_owned(), "pressure must be a positive number".to_owned()));
                    }
                },
                "temperature" => {
                    temperature = rest.first().and_then(|s| s.parse::<f64>().ok());
                    if temperature.is_none() {
                        return Err(SetupError::Malformed(origin.to_owned(), "temperature must be a number".to_owned()));
                    }
                },
                _ => {}, // tolerated, tables carry engine-specific extras
            }
        }

        match (composition, pressure, temperature) {
            (Some(composition), Some(pressure), Some(temperature)) => Ok(GasMedium {
                composition,
                pressure,
                temperature,
            }),
            (c, p, _) => {
                let missing = if c.is_none() {
                    "composition"
                } else if p.is_none() {
                    "pressure"
                } else {
                    "temperature"
                };
                Err(SetupError::Malformed(origin.to_owned(), format!("missing key '{}'", missing)))
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SetupError> {
        let text = fs::read_to_string(path)
            .map_err(|_| SetupError::Unreadable(path.to_owned()))?;
        Self::parse(&text, path)
    }

    pub fn composition(&self) -> &str {
        &self.composition
    }

    /// Pressure, in bar
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /// Temperature, in K
    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// Resolves a table path from the input deck: used as given if it
/// exists, otherwise joined onto the directory named by `ELVER_DATA`.
pub fn resolve_data_path(name: &str) -> Result<PathBuf, SetupError> {
    let direct = PathBuf::from(name);
    if direct.exists() {
        return Ok(direct);
    }
    std::env::var("ELVER_DATA")
        .map(|dir| Path::new(&dir).join(name))
        .map_err(|_| SetupError::MissingEnv("ELVER_DATA".to_owned()))
}

static MEDIUM: OnceLock<Result<GasMedium, SetupError>> = OnceLock::new();

/// Loads the gas table (and checks the optional ion-mobility file is
/// readable) exactly once per process; concurrent callers block until
/// the first load completes. Every call reports the one outcome.
pub fn initialize(table: &str, mobility: Option<&str>) -> Result<&'static GasMedium, SetupError> {
    let table = table.to_owned();
    let mobility = mobility.map(str::to_owned);
    MEDIUM.get_or_init(move || {
        let path = resolve_data_path(&table)?;
        let medium = GasMedium::from_file(&path)?;
        if let Some(name) = mobility {
            let path = resolve_data_path(&name)?;
            fs::metadata(&path).map_err(|_| SetupError::Unreadable(path))?;
        }
        Ok(medium)
    }).as_ref().map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
# test table
composition  Xe 100
pressure     10.0
temperature  293.15
# trailing engine extras are ignored
e_transverse_diffusion 0.001
";

    #[test]
    fn parses_a_table() {
        let gas = GasMedium::parse(TABLE, Path::new("test.gas")).unwrap();
        assert_eq!(gas.composition(), "Xe 100");
        assert_eq!(gas.pressure(), 10.0);
        assert_eq!(gas.temperature(), 293.15);
    }

    #[test]
    fn rejects_missing_keys() {
        let err = GasMedium::parse("composition Xe 100\n", Path::new("test.gas")).unwrap_err();
        match err {
            SetupError::Malformed(_, cause) => assert!(cause.contains("pressure")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn rejects_nonpositive_pressure() {
        let text = "composition Xe 100\npressure -1.0\ntemperature 293.0\n";
        assert!(GasMedium::parse(text, Path::new("test.gas")).is_err());
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = GasMedium::from_file(Path::new("/no/such/table.gas")).unwrap_err();
        assert_eq!(err, SetupError::Unreadable(PathBuf::from("/no/such/table.gas")));
    }
}

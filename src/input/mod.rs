//! Parse input configuration file

use std::path::Path;
use yaml_rust::{YamlLoader, yaml::Yaml};
use evalexpr::*;

use crate::constants::*;

mod error;
mod types;
mod timing;

pub use error::*;
use types::*;
pub use timing::*;

/// Represents the input configuration, which defines values
/// for simulation parameters, and any automatic values
/// for those parameters.
pub struct Config {
    input: Yaml,
    ctx: HashMapContext,
}

impl Config {
    /// Loads a configuration file.
    /// Fails if the file cannot be opened or if it is not
    /// YAML-formatted.
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|_| InputError::InvalidFile)?;
        Self::from_string(&contents)
    }

    /// Loads a YAML configuration from a string.
    /// Fails if the string is not formatted correctly.
    pub fn from_string(s: &str) -> Result<Self, InputError> {
        let input = YamlLoader::load_from_str(s)
            .map_err(|_| InputError::InvalidFile)?;
        let input = input.first()
            .ok_or(InputError::InvalidFile)?;

        Ok(Config {
            input: input.clone(),
            ctx: HashMapContext::new(),
        })
    }

    /// Loads automatic values for constants and keywords, and
    /// evaluates mathematical expressions given in the specified
    /// `section`. The defaults cover the unit system of this crate
    /// (cm, ns, eV, bar), so a deck may write `pressure: 10 * bar`
    /// or `gap: 7 * mm`.
    pub fn with_context(&mut self, section: &str) -> Result<&mut Self, InputError> {
        use helper::context_function;

        let mut ctx = context_map! {
            "cm" => 1.0,
            "mm" => MM,
            "m" => 100.0,
            "ns" => 1.0,
            "us" => MICROSECOND,
            "eV" => 1.0,
            "keV" => 1.0e3,
            "bar" => BAR,
            "torr" => TORR,
            "atm" => 1.01325,
            "pi" => std::f64::consts::PI,
        }.unwrap();

        context_function!(ctx, "sqrt",   f64::sqrt);
        context_function!(ctx, "cbrt",   f64::cbrt);
        context_function!(ctx, "abs",    f64::abs);
        context_function!(ctx, "exp",    f64::exp);
        context_function!(ctx, "ln",     f64::ln);
        context_function!(ctx, "floor",  f64::floor);
        context_function!(ctx, "ceil",   f64::ceil);
        context_function!(ctx, "round",  f64::round);

        self.ctx = ctx;

        // Read in from 'constants' block if it exists
        if self.input[section].is_badvalue() {
            return Ok(self);
        }

        for (a, b) in self.input[section].as_hash().unwrap() {
            // grab the value, if possible
            let (key, value) = match (a, b) {
                (Yaml::String(k), Yaml::Integer(i)) => (Some(k), Some(*i as f64)),
                (Yaml::String(k), Yaml::Real(s)) => (Some(k), s.parse::<f64>().ok()),
                (Yaml::String(k), Yaml::String(s)) => (Some(k), eval_number_with_context(s, &self.ctx).ok()),
                _ => (None, None),
            };

            // insert it into the context so it's available for the next read
            if let Some(v) = value {
                let key = key.unwrap(); // if value.is_some() so is key
                self.ctx.set_value(key.clone(), Value::from(v))
                    .map_err(|_| {
                        eprintln!("Failed to insert {} = {} from constants block into context.", key, v);
                        InputError::CouldNotParse(format!("{}:{}", section, key))
                    })?
            } else if let Some(k) = key {
                // found a key, value pair but parsing failed
                Err(InputError::CouldNotParse(format!("{}:{}", section, k)))?
            }
        }

        Ok(self)
    }

    /// Locates a key-value pair in the configuration file and attempts
    /// to parse the value as the specified type.
    /// The path to the key-value pair is specified by a string of
    /// colon-separated sections, e.g. `'section:subsection:key'`.
    pub fn read<T, S>(&self, path: S) -> Result<T, InputError>
    where
        T: FromYaml,
        S: AsRef<str>,
    {
        let address: Vec<&str> = path.as_ref().split(':').collect();
        let value = address.iter()
          .try_fold(&self.input, |y, s| {
              if y[*s].is_badvalue() {
                  Err(InputError::MissingField(path.as_ref().to_owned(), s.to_string()))
              } else {
                  Ok(&y[*s])
              }
          });
        value.and_then(|arg| T::from_yaml(arg.clone(), &self.ctx).map_err(|_| InputError::CouldNotParse(path.as_ref().to_owned())))
    }
}

mod helper {
    macro_rules! context_function {
        ($ctx:expr, $name:literal, $func:expr) => {
            $ctx.set_function(
                $name.to_string(),
                Function::new(|arg| {
                    let x = arg.as_number()?;
                    Ok(Value::Float($func(x)))
                })
            ).unwrap()
        };
    }

    pub(super) use context_function;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parser() {
        let text = "---
        control:
          electrons: 4000
          seed_energy: 7.0
          table: xe_10bar.gas
          dump: true

        el:
          gap: 7 * mm
          field: drive * 1000

        constants:
          drive: 11.4

        window:
          center: [0.0, 0.0, 10 * cm]

        deep:
          nested:
            key: 2 * pi
        ";

        let mut config = Config::from_string(text).unwrap();
        config.with_context("constants").unwrap();

        // Plain usize
        let n: usize = config.read("control:electrons").unwrap();
        assert_eq!(n, 4000);

        // Plain f64
        let e0: f64 = config.read("control:seed_energy").unwrap();
        assert_eq!(e0, 7.0);

        // String
        let table: String = config.read("control:table").unwrap();
        assert_eq!(table, "xe_10bar.gas");

        // Boolean
        let dump: bool = config.read("control:dump").unwrap();
        assert!(dump);

        // Unit expression
        let gap: f64 = config.read("el:gap").unwrap();
        assert!((gap - 0.7).abs() < 1.0e-12);

        // Constants block feeds later expressions
        let field: f64 = config.read("el:field").unwrap();
        assert!((field - 11400.0).abs() < 1.0e-9);

        // Array of f64, evaluating expressions
        let center: Vec<f64> = config.read("window:center").unwrap();
        assert_eq!(center, vec![0.0, 0.0, 10.0]);

        // Deep path
        let key: f64 = config.read("deep:nested:key").unwrap();
        assert_eq!(key, 2.0 * std::f64::consts::PI);

        // Missing path reports which component failed
        let missing: Result<f64, _> = config.read("el:pressure");
        assert!(matches!(missing.unwrap_err(), InputError::MissingField(..)));
    }
}

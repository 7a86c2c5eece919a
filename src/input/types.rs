//! YAML-readable types

use std::convert::TryFrom;
use yaml_rust::yaml::Yaml;
use evalexpr::{HashMapContext, eval_number_with_context};

/// Types that can be parsed from a YAML-formatted file
pub trait FromYaml: Sized {
    type Error;
    /// Attempt to parse the YAML field as the specified type, using
    /// the supplied context for named variables and constants.
    fn from_yaml(arg: Yaml, ctx: &HashMapContext) -> Result<Self, Self::Error>;
}

// Atomic

impl FromYaml for bool {
    type Error = ();
    fn from_yaml(arg: Yaml, _ctx: &HashMapContext) -> Result<Self, Self::Error> {
        match arg {
            Yaml::Boolean(b) => Ok(b),
            _ => Err(())
        }
    }
}

impl FromYaml for String {
    type Error = ();
    fn from_yaml(arg: Yaml, _ctx: &HashMapContext) -> Result<Self, Self::Error> {
        match arg {
            Yaml::String(s) => Ok(s),
            Yaml::Integer(i) => Ok(i.to_string()),
            Yaml::Real(s) => Ok(s),
            Yaml::Boolean(b) => Ok(b.to_string()),
            _ => Err(())
        }
    }
}

// Numbers: f64, i64, usize

impl FromYaml for f64 {
    type Error = ();
    fn from_yaml(arg: Yaml, ctx: &HashMapContext) -> Result<Self, Self::Error> {
        match arg {
            Yaml::Real(s) => {
                s.parse::<f64>().or(Err(()))
            },
            Yaml::Integer(i) => {
                Ok(i as f64)
            },
            Yaml::String(s) => {
                eval_number_with_context(&s, ctx)
                    .or(Err(()))
            },
            _ => Err(())
        }
    }
}

impl FromYaml for i64 {
    type Error = ();
    fn from_yaml(arg: Yaml, _ctx: &HashMapContext) -> Result<Self, Self::Error> {
        match arg {
            Yaml::Integer(i) => Ok(i),
            _ => Err(())
        }
    }
}

impl FromYaml for usize {
    type Error = ();
    fn from_yaml(arg: Yaml, ctx: &HashMapContext) -> Result<Self, Self::Error> {
        let i: i64 = FromYaml::from_yaml(arg, ctx)?;
        usize::try_from(i).map_err(|_| ())
    }
}

// Vecs

impl FromYaml for Vec<f64> {
    type Error = ();
    fn from_yaml(arg: Yaml, ctx: &HashMapContext) -> Result<Self, Self::Error> {
        match arg {
            Yaml::Array(array) => {
                array.into_iter()
                    .map(|y| FromYaml::from_yaml(y, ctx))
                    .collect()
            },
            single => {
                let x: f64 = FromYaml::from_yaml(single, ctx)?;
                Ok(vec![x])
            },
        }
    }
}

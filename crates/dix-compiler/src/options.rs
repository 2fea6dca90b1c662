// Compile-time configuration: direction, dictionary type and entry filters.

use std::fmt;
use std::str::FromStr;

use crate::DixError;

/// Which side of the dictionary is read as input.
///
/// `LR` compiles left-to-right (analysis for a monodix, source-to-target for
/// a bidix); `RL` compiles the reverse direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    LR,
    RL,
}

impl Direction {
    /// Value of the `r` entry attribute that restricts an entry to this direction.
    pub fn restriction(self) -> &'static str {
        match self {
            Direction::LR => "LR",
            Direction::RL => "RL",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::LR => Direction::RL,
            Direction::RL => Direction::LR,
        }
    }
}

impl FromStr for Direction {
    type Err = DixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lr" => Ok(Direction::LR),
            "rl" => Ok(Direction::RL),
            other => Err(DixError::UnknownDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LR => f.write_str("lr"),
            Direction::RL => f.write_str("rl"),
        }
    }
}

/// Dictionary type, read once from the `type` attribute of `<dictionary>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DixType {
    #[default]
    Standard,
    /// Separable/sequential dictionaries: wildcards `<t/>`, `<w/>` and the
    /// `<$>` join marker.
    Separable,
}

impl DixType {
    pub fn from_type_attr(value: &str) -> Self {
        match value {
            "separable" | "sequential" => DixType::Separable,
            _ => DixType::Standard,
        }
    }
}

/// Options of one compilation.
///
/// The variant filters compare against entry attributes: `alt`, `v` and `vl`
/// when compiling RL, `vr` when compiling LR. `None` behaves like an empty
/// configured value, so entries carrying the attribute are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    pub direction: Direction,
    pub alt: Option<String>,
    pub var: Option<String>,
    pub var_left: Option<String>,
    pub var_right: Option<String>,
    /// Emit `>` for `<m/>` morpheme boundaries instead of dropping them.
    pub keep_boundaries: bool,
}

impl CompilerOptions {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn with_var(mut self, var: impl Into<String>) -> Self {
        self.var = Some(var.into());
        self
    }

    pub fn with_var_left(mut self, var_left: impl Into<String>) -> Self {
        self.var_left = Some(var_left.into());
        self
    }

    pub fn with_var_right(mut self, var_right: impl Into<String>) -> Self {
        self.var_right = Some(var_right.into());
        self
    }

    pub fn with_keep_boundaries(mut self, keep_boundaries: bool) -> Self {
        self.keep_boundaries = keep_boundaries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_direction() {
        assert_eq!("lr".parse::<Direction>().unwrap(), Direction::LR);
        assert_eq!("rl".parse::<Direction>().unwrap(), Direction::RL);
        assert!(matches!(
            "both".parse::<Direction>(),
            Err(DixError::UnknownDirection(d)) if d == "both"
        ));
        assert_eq!(Direction::RL.to_string(), "rl");
    }

    #[test]
    fn restriction_attribute() {
        assert_eq!(Direction::LR.restriction(), "LR");
        assert_eq!(Direction::RL.restriction(), "RL");
        assert_eq!(Direction::LR.opposite(), Direction::RL);
        assert_eq!(Direction::RL.opposite().restriction(), "LR");
    }

    #[test]
    fn dictionary_type_from_attribute() {
        assert_eq!(DixType::from_type_attr("separable"), DixType::Separable);
        assert_eq!(DixType::from_type_attr("sequential"), DixType::Separable);
        assert_eq!(DixType::from_type_attr(""), DixType::Standard);
        assert_eq!(DixType::from_type_attr("Separable"), DixType::Standard);
    }

    #[test]
    fn builder_sets_fields() {
        let opts = CompilerOptions::new(Direction::RL)
            .with_alt("oc")
            .with_var_left("gascon")
            .with_keep_boundaries(true);
        assert_eq!(opts.direction, Direction::RL);
        assert_eq!(opts.alt.as_deref(), Some("oc"));
        assert_eq!(opts.var, None);
        assert_eq!(opts.var_left.as_deref(), Some("gascon"));
        assert!(opts.keep_boundaries);
    }
}

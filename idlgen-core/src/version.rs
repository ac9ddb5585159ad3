use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

/// Module version as declared in the model (`major.minor`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Version {
    major: u32,
    minor: u32,
}

impl TryFrom<String> for Version {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 2 {
            return Err(format!("invalid version '{}', expected 'X.Y'", s));
        }
        Ok(Self {
            major: parts[0].parse().map_err(|_| "invalid major")?,
            minor: parts[1].parse().map_err(|_| "invalid minor")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Version::new(1, 0).to_string(), "1.0");
        assert_eq!(Version::default().to_string(), "0.0");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("1.0".parse::<Version>().unwrap(), Version::new(1, 0));
        assert_eq!("10.20".parse::<Version>().unwrap(), Version::new(10, 20));
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("1".parse::<Version>().is_err());
        assert!("1.2.3".parse::<Version>().is_err());
        assert!("a.b".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(Version::new(1, 0) < Version::new(1, 1));
        assert!(Version::new(2, 0) > Version::new(1, 9));
    }

    #[test]
    fn test_serde_roundtrip() {
        #[derive(Serialize, Deserialize)]
        struct Module {
            version: Version,
        }
        let module: Module = serde_json::from_str(r#"{"version": "1.2"}"#).unwrap();
        assert_eq!(module.version, Version::new(1, 2));
        assert_eq!(
            serde_json::to_string(&module).unwrap(),
            r#"{"version":"1.2"}"#
        );
    }
}

//! Declaration addresses.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

/// Block identifier of managed resource declarations. Their addresses omit
/// the kind, every other declaration keeps it.
pub const RESOURCE_KIND: &str = "resource";

/// Unique key of a top-level declaration: its kind plus its labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub kind: String,
    pub labels: Vec<String>,
}

impl Address {
    pub fn new<I, S>(kind: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: kind.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Address of a managed resource, e.g. `azurerm_subnet.app`.
    pub fn resource(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(RESOURCE_KIND, [resource_type.into(), name.into()])
    }

    /// The resource type label of a `resource` or `data` declaration.
    pub fn resource_type(&self) -> Option<&str> {
        match self.kind.as_str() {
            RESOURCE_KIND | "data" => self.labels.first().map(String::as_str),
            _ => None,
        }
    }

    /// Parses an address as printed by the planner.
    ///
    /// Instance keys (`[0]`, `["a"]`) are dropped and so is any `module.x`
    /// prefix, since the working set only holds the root module's files.
    pub fn from_plan_address(address: &str) -> Option<Self> {
        static INSTANCE_KEY: OnceLock<Regex> = OnceLock::new();
        let instance_key =
            INSTANCE_KEY.get_or_init(|| Regex::new(r#"\[[^\]]*\]"#).expect("valid regex"));

        let stripped = instance_key.replace_all(address, "");
        let mut parts: Vec<&str> = stripped.split('.').collect();
        while parts.len() > 2 && parts[0] == "module" {
            parts.drain(..2);
        }
        parts.join(".").parse().ok()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind != RESOURCE_KIND {
            write!(f, "{}", self.kind)?;
            if !self.labels.is_empty() {
                write!(f, ".")?;
            }
        }
        write!(f, "{}", self.labels.join("."))
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(format!("Invalid address: {}", s));
        }

        match parts.as_slice() {
            ["data", ty, name] => Ok(Address::new("data", [*ty, *name])),
            [kind @ ("module" | "output" | "variable" | "provider"), rest @ ..] => {
                Ok(Address::new(*kind, rest.iter().copied()))
            }
            ["locals"] | ["terraform"] => Ok(Address::new(parts[0], Vec::<String>::new())),
            [ty, name] => Ok(Address::resource(*ty, *name)),
            _ => Err(format!("Invalid address: {}", s)),
        }
    }
}

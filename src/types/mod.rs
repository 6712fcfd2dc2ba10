use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Identity of one underlying method implementation.
///
/// Two names are aliases exactly when they are bound to the same `ImplId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImplId(pub String);

impl ImplId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImplId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Class,
    Module,
    /// Receiver-specific scope, e.g. the singleton side of a module
    Singleton,
    /// Bare function-style scope with no visibility sections
    Scope,
}

impl OwnerKind {
    /// Separator placed between owner and method name in qualified names.
    pub fn separator(&self) -> char {
        match self {
            OwnerKind::Class | OwnerKind::Module => '#',
            OwnerKind::Singleton | OwnerKind::Scope => '.',
        }
    }
}

impl FromStr for OwnerKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(OwnerKind::Class),
            "module" => Ok(OwnerKind::Module),
            "singleton" => Ok(OwnerKind::Singleton),
            "scope" => Ok(OwnerKind::Scope),
            _ => Err("Unknown owner kind"),
        }
    }
}

/// The type or receiver scope a method is bound on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    pub kind: OwnerKind,
}

impl Owner {
    pub fn new(name: impl Into<String>, kind: OwnerKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// `Owner#name` for instance methods, `Owner.name` for singleton and scope methods.
    pub fn qualify(&self, method: &str) -> String {
        format!("{}{}{method}", self.name, self.kind.separator())
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OwnerKind::Singleton => write!(f, "#<Class:{}>", self.name),
            _ => f.write_str(&self.name),
        }
    }
}

/// Where a callable's text begins. Lines are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocator {
    pub path: PathBuf,
    pub line: u32,
}

impl SourceLocator {
    pub fn new(path: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// Lookup order used when classifying a bound name.
    pub const PRIORITY: [Visibility; 3] =
        [Visibility::Private, Visibility::Protected, Visibility::Public];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "protected" => Ok(Visibility::Protected),
            "private" => Ok(Visibility::Private),
            _ => Err("Unknown visibility"),
        }
    }
}

/// Resolved metadata for one callable.
///
/// An empty `docstring` means the callable is known to have none. `source` is
/// either the body text, an explanatory placeholder, or `None` when nothing
/// could be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub docstring: String,
    pub source: Option<String>,
    pub aliases: BTreeSet<String>,
    pub visibility: Visibility,
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "visibility: {}", self.visibility)?;
        if !self.aliases.is_empty() {
            let aliases: Vec<&str> = self.aliases.iter().map(String::as_str).collect();
            writeln!(f, "aliases: {}", aliases.join(", "))?;
        }
        if !self.docstring.is_empty() {
            writeln!(f)?;
            write!(f, "{}", self.docstring)?;
        }
        if let Some(source) = &self.source {
            writeln!(f)?;
            write!(f, "{source}")?;
            if !source.ends_with('\n') {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

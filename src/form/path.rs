use std::fmt;

/// Dotted address of a control inside the tree, e.g. `emailGroup.email` or `addresses.0.city`.
///
/// Segments are kept as strings; list controls interpret them as indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ControlPath {
    segments: Vec<String>,
}

impl ControlPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(dotted: &str) -> Self {
        let segments = dotted
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// True when `self` equals `other` or lies underneath it.
    pub fn starts_with(&self, other: &ControlPath) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for ControlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl From<&str> for ControlPath {
    fn from(value: &str) -> Self {
        ControlPath::parse(value)
    }
}

impl From<String> for ControlPath {
    fn from(value: String) -> Self {
        ControlPath::parse(&value)
    }
}

impl From<&ControlPath> for ControlPath {
    fn from(value: &ControlPath) -> Self {
        value.clone()
    }
}

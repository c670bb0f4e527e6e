use std::fmt;

pub type JobId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Stylesheet,
    Image,
    VideoPoster,
    Video,
    Font,
}

impl ResourceKind {
    /// Resources whose body must decode as a raster image to count as loaded.
    pub fn is_raster(self) -> bool {
        matches!(self, ResourceKind::Image | ResourceKind::VideoPoster)
    }
}

/// Where a fatal hook failure happened. Reported to the caller's error channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorLocation {
    BeforeGetContent,
    BeforePrint,
    Print,
}

impl ErrorLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorLocation::BeforeGetContent => "onBeforeGetContent",
            ErrorLocation::BeforePrint => "onBeforePrint",
            ErrorLocation::Print => "print",
        }
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

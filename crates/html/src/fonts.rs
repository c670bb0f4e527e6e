#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontFaceStatus {
    Unloaded,
    Loading,
    Loaded,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    pub source: String,
    pub weight: Option<String>,
    pub style: Option<String>,
    pub status: FontFaceStatus,
}

impl FontFace {
    pub fn new(
        family: impl Into<String>,
        source: impl Into<String>,
        weight: Option<String>,
        style: Option<String>,
    ) -> Self {
        Self {
            family: family.into(),
            source: source.into(),
            weight,
            style,
            status: FontFaceStatus::Unloaded,
        }
    }

    /// The URL inside a `url(...)` source descriptor, or the source itself when it is bare.
    pub fn source_url(&self) -> Option<&str> {
        let src = self.source.trim();
        let Some(rest) = src.strip_prefix("url(") else {
            return (!src.is_empty()).then_some(src);
        };
        let inner = rest.split(')').next()?.trim();
        let inner = inner.trim_matches(|c| c == '"' || c == '\'');
        (!inner.is_empty()).then_some(inner)
    }
}

/// `document.fonts`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontFaceSet {
    faces: Vec<FontFace>,
}

impl FontFaceSet {
    pub fn add(&mut self, face: FontFace) -> usize {
        self.faces.push(face);
        self.faces.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&FontFace> {
        self.faces.get(index)
    }

    pub fn set_status(&mut self, index: usize, status: FontFaceStatus) {
        if let Some(face) = self.faces.get_mut(index) {
            face.status = status;
        }
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FontFace> {
        self.faces.iter()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Visibility {
    pub visible: bool,
}

impl Visibility {
    pub fn visible() -> Self {
        Self { visible: true }
    }

    pub fn hidden() -> Self {
        Self { visible: false }
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::visible()
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        Self { visible }
    }
}

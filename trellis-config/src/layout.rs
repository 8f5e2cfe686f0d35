#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Layout {
    /// Number of workspaces every output starts with.
    #[knuffel(child, unwrap(argument), default = 9)]
    pub workspaces: u8,
    /// Extra space reserved along the output edges.
    #[knuffel(child, default)]
    pub struts: Struts,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            workspaces: 9,
            struts: Default::default(),
        }
    }
}

#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Struts {
    #[knuffel(child, unwrap(argument), default)]
    pub left: i32,
    #[knuffel(child, unwrap(argument), default)]
    pub right: i32,
    #[knuffel(child, unwrap(argument), default)]
    pub top: i32,
    #[knuffel(child, unwrap(argument), default)]
    pub bottom: i32,
}

impl Struts {
    /// Adds two sets of reserved edges together.
    pub fn combine(self, other: Self) -> Self {
        Self {
            left: self.left + other.left,
            right: self.right + other.right,
            top: self.top + other.top,
            bottom: self.bottom + other.bottom,
        }
    }
}

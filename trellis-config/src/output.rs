use trellis_ipc::ConfiguredMode;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Outputs(pub Vec<Output>);

/// Desired state of one output.
///
/// The same type describes entries loaded from the config file and entries requested at runtime
/// by a configuration client.
#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Output {
    #[knuffel(child)]
    pub off: bool,
    #[knuffel(argument)]
    pub name: String,
    #[knuffel(child)]
    pub position: Option<Position>,
    #[knuffel(child, unwrap(argument, str))]
    pub mode: Option<ConfiguredMode>,
}

impl Output {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.off
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl Default for Output {
    fn default() -> Self {
        Self {
            off: false,
            name: String::new(),
            position: None,
            mode: None,
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    #[knuffel(property)]
    pub x: i32,
    #[knuffel(property)]
    pub y: i32,
}

impl FromIterator<Output> for Outputs {
    fn from_iter<T: IntoIterator<Item = Output>>(iter: T) -> Self {
        Self(Vec::from_iter(iter))
    }
}

impl Outputs {
    pub fn find(&self, name: &str) -> Option<&Output> {
        self.0.iter().find(|o| o.matches(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Output> {
        self.0.iter_mut().find(|o| o.matches(name))
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Output> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

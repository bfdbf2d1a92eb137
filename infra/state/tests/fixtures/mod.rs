use plaza_world_state::StateSlice;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loading {
    pub message: String,
    pub visible: bool,
}

impl StateSlice for Loading {
    const NAME: &'static str = "loading";
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub ready: bool,
}

impl StateSlice for Session {
    const NAME: &'static str = "session";
}

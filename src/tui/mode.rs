// state local to the tui; nothing here reaches the sound service
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub show_help: bool,
}
